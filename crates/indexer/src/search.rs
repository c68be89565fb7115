//! In-memory full-text search over filtered posts, backed by Tantivy.
//!
//! Each post becomes one document with five text fields (title, summary,
//! tags, category, child). A query term matches exactly (BM25), by prefix or
//! within a small edit distance; every field clause carries the field boost
//! and query terms are OR-combined.

use folio_core::{Category, Error, Post, Result};
use serde::{Deserialize, Serialize};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, FuzzyTermQuery, Occur, Query, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, STORED, Schema, TEXT, Value};
use tantivy::tokenizer::TokenStream;
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term, doc};
use tracing::debug;

/// Summaries are cut to this many characters
pub const SUMMARY_LIMIT: usize = 280;

/// Tantivy's Levenshtein automata stop at distance 2
pub const MAX_EDIT_DISTANCE: u8 = 2;

const WRITER_BUDGET: usize = 15_000_000;
const PREFIX_WEIGHT: f32 = 0.375;
const FUZZY_WEIGHT: f32 = 0.45;

/// One searchable post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDoc {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub summary: String,
    pub date: String,
    /// Lowercased
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<String>,
}

impl SearchDoc {
    pub fn from_post(post: &Post, categories: &[Category]) -> Self {
        let tags: Vec<String> = post.tags.iter().map(|t| t.to_lowercase()).collect();
        let (category, child) = derive_category(&tags, categories);

        SearchDoc {
            id: post.id.clone(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            summary: post
                .summary
                .as_deref()
                .map(|s| s.chars().take(SUMMARY_LIMIT).collect())
                .unwrap_or_default(),
            date: post.date.clone(),
            tags,
            category,
            child,
        }
    }
}

/// Match lowercased tags against the category tree.
///
/// The first category whose slug is a tag wins, and its first child whose
/// slug is a tag becomes the child. Children of other categories are never
/// paired with it. With no category tag, the first matching child anywhere
/// sets both the child and its parent.
pub fn derive_category(tags: &[String], categories: &[Category]) -> (Option<String>, Option<String>) {
    let has = |slug: &str| {
        let slug = slug.to_lowercase();
        tags.iter().any(|t| *t == slug)
    };

    if let Some(cat) = categories.iter().find(|c| has(&c.slug)) {
        let child = cat.children.iter().find(|ch| has(&ch.slug));
        return (Some(cat.slug.clone()), child.map(|ch| ch.slug.clone()));
    }

    categories
        .iter()
        .find_map(|cat| {
            cat.children
                .iter()
                .find(|ch| has(&ch.slug))
                .map(|ch| (Some(cat.slug.clone()), Some(ch.slug.clone())))
        })
        .unwrap_or((None, None))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Allowed edit distance as a fraction of the query term length
    pub fuzzy: f64,
    /// Match index terms that start with the query term
    pub prefix: bool,
    /// Upper bound on the edit distance, at most [`MAX_EDIT_DISTANCE`]
    pub max_fuzzy: u8,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fuzzy: 0.2,
            prefix: true,
            max_fuzzy: MAX_EDIT_DISTANCE,
        }
    }
}

impl SearchOptions {
    fn max_distance(&self, term: &str) -> u8 {
        let len = term.chars().count() as f64;
        let distance = (len * self.fuzzy).round().min(u8::MAX as f64) as u8;
        distance.min(self.max_fuzzy).min(MAX_EDIT_DISTANCE)
    }
}

/// A ranked result; serializes as the document plus `score`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub doc: SearchDoc,
    pub score: f32,
}

/// Serialized form consumed by the browser search page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPayload {
    pub options: SearchOptions,
    pub docs: Vec<SearchDoc>,
}

impl SearchPayload {
    /// Documents with fields derived from the category tree
    pub fn from_posts(posts: &[Post], categories: &[Category], options: SearchOptions) -> Self {
        Self {
            options,
            docs: posts
                .iter()
                .map(|p| SearchDoc::from_post(p, categories))
                .collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Clone, Copy)]
struct Fields {
    position: Field,
    title: Field,
    summary: Field,
    tags: Field,
    category: Field,
    child: Field,
}

impl Fields {
    fn boosted(&self) -> [(Field, f32); 5] {
        [
            (self.title, 2.0),
            (self.summary, 1.0),
            (self.tags, 1.5),
            (self.category, 1.0),
            (self.child, 1.0),
        ]
    }
}

fn index_error(e: tantivy::TantivyError) -> Error {
    Error::SearchIndex(e.to_string())
}

pub struct SearchIndex {
    payload: SearchPayload,
    index: Index,
    reader: IndexReader,
    fields: Fields,
}

impl SearchIndex {
    pub fn new(docs: Vec<SearchDoc>, options: SearchOptions) -> Result<Self> {
        let mut builder = Schema::builder();
        let fields = Fields {
            position: builder.add_u64_field("position", STORED),
            title: builder.add_text_field("title", TEXT),
            summary: builder.add_text_field("summary", TEXT),
            tags: builder.add_text_field("tags", TEXT),
            category: builder.add_text_field("category", TEXT),
            child: builder.add_text_field("child", TEXT),
        };

        let index = Index::create_in_ram(builder.build());
        let mut writer: IndexWriter = index
            .writer_with_num_threads(1, WRITER_BUDGET)
            .map_err(index_error)?;

        for (position, d) in docs.iter().enumerate() {
            writer
                .add_document(doc!(
                    fields.position => position as u64,
                    fields.title => d.title.as_str(),
                    fields.summary => d.summary.as_str(),
                    fields.tags => d.tags.join(" "),
                    fields.category => d.category.clone().unwrap_or_default(),
                    fields.child => d.child.clone().unwrap_or_default(),
                ))
                .map_err(index_error)?;
        }
        writer.commit().map_err(index_error)?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(index_error)?;

        debug!(docs = docs.len(), "built search index");

        Ok(Self {
            payload: SearchPayload { options, docs },
            index,
            reader,
            fields,
        })
    }

    /// Index posts with document fields derived from the category tree
    pub fn from_posts(posts: &[Post], categories: &[Category], options: SearchOptions) -> Result<Self> {
        Self::from_payload(SearchPayload::from_posts(posts, categories, options))
    }

    pub fn from_payload(payload: SearchPayload) -> Result<Self> {
        Self::new(payload.docs, payload.options)
    }

    pub fn docs(&self) -> &[SearchDoc] {
        &self.payload.docs
    }

    pub fn len(&self) -> usize {
        self.payload.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.docs.is_empty()
    }

    pub fn options(&self) -> SearchOptions {
        self.payload.options
    }

    pub fn payload(&self) -> &SearchPayload {
        &self.payload
    }

    /// Ranked matches, ties in document order; an empty or whitespace query returns nothing
    pub fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let terms = self.query_terms(query);
        if terms.is_empty() || self.is_empty() {
            return Ok(Vec::new());
        }

        let query = self.build_query(&terms);
        let searcher = self.reader.searcher();
        let top = searcher
            .search(&query, &TopDocs::with_limit(self.len()))
            .map_err(index_error)?;

        let mut ranked = Vec::with_capacity(top.len());
        for (score, address) in top {
            let stored: TantivyDocument = searcher.doc(address).map_err(index_error)?;
            let position = stored
                .get_first(self.fields.position)
                .and_then(|v| v.as_u64())
                .and_then(|p| usize::try_from(p).ok())
                .filter(|p| *p < self.len())
                .ok_or_else(|| Error::SearchIndex("stored document without position".to_string()))?;
            ranked.push((position, score));
        }
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

        Ok(ranked
            .into_iter()
            .map(|(position, score)| SearchHit {
                doc: self.payload.docs[position].clone(),
                score,
            })
            .collect())
    }

    /// Distinct query tokens, produced by the same analyzer the fields use
    fn query_terms(&self, query: &str) -> Vec<String> {
        let Some(mut analyzer) = self.index.tokenizers().get("default") else {
            return Vec::new();
        };

        let mut terms: Vec<String> = Vec::new();
        let mut stream = analyzer.token_stream(query);
        while stream.advance() {
            let text = &stream.token().text;
            if !terms.iter().any(|t| t == text) {
                terms.push(text.clone());
            }
        }
        terms
    }

    fn build_query(&self, terms: &[String]) -> BooleanQuery {
        let options = self.payload.options;
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        for text in terms {
            let distance = options.max_distance(text);
            for (field, boost) in self.fields.boosted() {
                let term = Term::from_field_text(field, text);

                clauses.push((
                    Occur::Should,
                    Box::new(BoostQuery::new(
                        Box::new(TermQuery::new(term.clone(), IndexRecordOption::WithFreqs)),
                        boost,
                    )),
                ));
                if options.prefix {
                    clauses.push((
                        Occur::Should,
                        Box::new(BoostQuery::new(
                            Box::new(FuzzyTermQuery::new_prefix(term.clone(), 0, true)),
                            boost * PREFIX_WEIGHT,
                        )),
                    ));
                }
                if distance > 0 {
                    clauses.push((
                        Occur::Should,
                        Box::new(BoostQuery::new(
                            Box::new(FuzzyTermQuery::new(term, distance, true)),
                            boost * FUZZY_WEIGHT,
                        )),
                    ));
                }
            }
        }

        BooleanQuery::new(clauses)
    }
}
