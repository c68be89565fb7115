//! Static CSS and browser scripts embedded in generated pages.

pub const STYLE: &str = r#"
        :root, [data-scheme="light"] {
            --bg: #fbfbfa;
            --surface: #ffffff;
            --text: #1c1c1e;
            --muted: #6b6b70;
            --border: #e4e4e7;
            --accent: #2f6fde;
        }

        [data-scheme="dark"] {
            --bg: #151517;
            --surface: #1e1e21;
            --text: #ececef;
            --muted: #9a9aa2;
            --border: #2c2c31;
            --accent: #7aa7ff;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
            line-height: 1.6;
            color: var(--text);
            background: var(--bg);
        }

        a { color: inherit; }

        .container { max-width: 1080px; margin: 0 auto; padding: 2rem 1rem 4rem; }

        .navbar {
            display: flex;
            align-items: center;
            gap: 1.5rem;
            max-width: 1080px;
            margin: 0 auto;
            padding: 1rem;
            border-bottom: 1px solid var(--border);
        }
        .navbar .brand { font-weight: 700; text-decoration: none; }
        .navbar ul { display: flex; gap: 1rem; list-style: none; flex: 1; }
        .navbar ul a { color: var(--muted); text-decoration: none; padding: 0.25rem 0; }
        .navbar ul a:hover, .navbar ul a.active { color: var(--text); }
        .navbar ul a.active { border-bottom: 1px solid var(--text); }
        .scheme-toggle { background: none; border: 1px solid var(--border); color: var(--text); border-radius: 999px; padding: 0.2rem 0.6rem; cursor: pointer; }

        .preview-badge { position: fixed; top: 0.5rem; right: 0.5rem; background: var(--accent); color: #fff; padding: 0.2rem 0.6rem; border-radius: 4px; font-size: 0.75rem; font-weight: 700; }

        .hero { padding: 2rem 0; }
        .hero h1 { font-size: 2rem; }
        .hero .tagline, .muted { color: var(--muted); }
        .hero .avatar { width: 36px; height: 36px; border-radius: 50%; object-fit: cover; vertical-align: middle; margin-right: 0.5rem; }
        .breadcrumbs { color: var(--muted); font-size: 0.9rem; display: flex; gap: 0.5rem; }

        .search-form input {
            width: 100%;
            margin-top: 1rem;
            padding: 0.75rem 1rem;
            border-radius: 8px;
            border: 1px solid var(--border);
            background: var(--surface);
            color: var(--text);
            font-size: 1rem;
        }

        .grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 1rem; margin-top: 1rem; }
        .card { display: block; background: var(--surface); border: 1px solid var(--border); border-radius: 10px; overflow: hidden; text-decoration: none; }
        .card:hover { border-color: var(--accent); }
        .card .thumb { aspect-ratio: 16 / 9; background: var(--border); }
        .card .thumb img { width: 100%; height: 100%; object-fit: cover; }
        .card .body { padding: 0.75rem 1rem; }
        .card h3 { font-size: 1.05rem; }
        .card .excerpt { color: var(--muted); font-size: 0.9rem; }
        .card .meta, .result .meta { color: var(--muted); font-size: 0.8rem; display: flex; gap: 0.5rem; flex-wrap: wrap; margin-top: 0.5rem; }

        .shell { display: grid; grid-template-columns: 200px 1fr; gap: 2rem; }
        .tag-list { list-style: none; }
        .tag-list a { display: inline-block; padding: 0.15rem 0; color: var(--muted); text-decoration: none; }
        .tag-list a.active { color: var(--accent); font-weight: 600; }
        .toolbar { display: flex; justify-content: space-between; align-items: center; }
        .sort a { color: var(--muted); text-decoration: none; margin-left: 0.75rem; }
        .sort a.active { color: var(--text); font-weight: 600; }

        .empty { padding: 2rem; text-align: center; color: var(--muted); border: 1px dashed var(--border); border-radius: 10px; }
        .badge { display: inline-block; padding: 0 0.4rem; border-radius: 4px; background: var(--border); text-decoration: none; }

        .results { list-style: none; margin-top: 1.5rem; display: grid; gap: 0.75rem; }
        .result a { display: block; padding: 1rem; border: 1px solid var(--border); border-radius: 10px; background: var(--surface); text-decoration: none; }

        article.post { max-width: 720px; margin: 0 auto; }
        article.post h1 { font-size: 2.2rem; line-height: 1.25; }
        article.post .cover { width: 100%; border-radius: 10px; margin: 1rem 0; }
        article.post .content { margin-top: 1.5rem; }
        article.post .content p, article.post .content ul, article.post .content ol, article.post .content pre { margin: 1rem 0; }
        article.post .content pre { padding: 1rem; overflow-x: auto; background: var(--surface); border-radius: 8px; }
        .comments { margin-top: 3rem; }
        .comments iframe { width: 100% !important; }

        .site-footer { text-align: center; color: var(--muted); font-size: 0.85rem; padding: 2rem 0; }

        @media (max-width: 720px) {
            .shell { grid-template-columns: 1fr; }
            .navbar ul { display: none; }
        }
"#;

/// Client-side tag filter and sort for static category pages.
///
/// Reads `t` (active tag) and `s` (`new`/`old`) and mirrors what the preview
/// server renders for the same query.
pub const CATEGORY_JS: &str = r#"<script>
    (function () {
        var params = new URLSearchParams(window.location.search);
        var active = (params.get('t') || '').trim().toLowerCase();
        var sort = params.get('s') === 'old' ? 'old' : 'new';
        var grid = document.querySelector('[data-listing]');
        if (!grid) return;

        var cards = Array.prototype.slice.call(grid.querySelectorAll('[data-post]'));
        var shown = 0;
        cards.forEach(function (card) {
            var tags = JSON.parse(card.getAttribute('data-tags') || '[]');
            var visible = !active || tags.indexOf(active) !== -1;
            card.hidden = !visible;
            if (visible) shown += 1;
        });
        cards.sort(function (a, b) {
            var ad = Number(a.getAttribute('data-sort')) || 0;
            var bd = Number(b.getAttribute('data-sort')) || 0;
            return sort === 'old' ? ad - bd : bd - ad;
        });
        cards.forEach(function (card) { grid.appendChild(card); });

        var count = document.querySelector('[data-shown]');
        if (count) count.textContent = String(shown);
        var empty = document.querySelector('[data-empty]');
        if (empty) empty.hidden = shown !== 0;
        var filtered = document.querySelector('[data-filtered]');
        if (filtered) {
            filtered.hidden = !active;
            filtered.querySelector('strong').textContent = '#' + active;
        }

        document.querySelectorAll('[data-tag-link]').forEach(function (a) {
            var tag = a.getAttribute('data-tag-link');
            a.classList.toggle('active', tag === active);
            a.setAttribute('href', '?t=' + encodeURIComponent(tag) + '&s=' + sort);
        });
        document.querySelectorAll('[data-sort-link]').forEach(function (a) {
            var value = a.getAttribute('data-sort-link');
            a.classList.toggle('active', value === sort);
            a.setAttribute('href', (active ? '?t=' + encodeURIComponent(active) + '&s=' : '?s=') + value);
        });
    })();
</script>"#;

/// MiniSearch build loaded by the search page ahead of `search.js`
pub const MINISEARCH_URL: &str = "https://cdn.jsdelivr.net/npm/minisearch@7.1.2/dist/umd/index.min.js";

/// Browser search: loads the serialized documents into MiniSearch with the
/// same field boosts and fuzzy/prefix options the Rust index uses.
pub const SEARCH_JS: &str = r#"(function () {
    'use strict';

    var FIELDS = ['title', 'summary', 'tags', 'category', 'child'];
    var STORED = ['title', 'slug', 'summary', 'date', 'tags', 'category', 'child'];

    function buildIndex(payload) {
        var opts = payload.options || {};
        var index = new MiniSearch({
            idField: 'slug',
            fields: FIELDS,
            storeFields: STORED,
            extractField: function (doc, field) {
                var value = doc[field];
                return Array.isArray(value) ? value.join(' ') : value;
            },
            searchOptions: {
                boost: { title: 2, tags: 1.5 },
                fuzzy: opts.fuzzy,
                prefix: opts.prefix !== false,
                maxFuzzy: opts.max_fuzzy,
                combineWith: 'OR'
            }
        });
        index.addAll(payload.docs || []);
        return index;
    }

    function search(index, query) {
        if (!query.trim()) return [];
        return index.search(query);
    }

    function esc(s) {
        return String(s || '').replace(/[&<>"']/g, function (c) {
            return { '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#x27;' }[c];
        });
    }

    function renderResults(target, query, hits) {
        if (!query.trim()) {
            target.innerHTML = '<div class="empty">Type to search. Try a category name or a tag.</div>';
            return;
        }
        if (!hits.length) {
            target.innerHTML = '<div class="empty">No results for <strong>' + esc(query) + '</strong>.</div>';
            return;
        }
        target.innerHTML = '<ul class="results">' + hits.map(function (doc) {
            var meta = [];
            if (doc.date) meta.push('<span>' + esc(doc.date) + '</span>');
            if (doc.category) meta.push('<span class="badge">#' + esc(doc.category) + '</span>');
            if (doc.category && doc.child) meta.push('<span class="badge">#' + esc(doc.child) + '</span>');
            (doc.tags || []).slice(0, 3).forEach(function (t) { meta.push('<small>#' + esc(t) + '</small>'); });
            return '<li class="result"><a href="/' + encodeURIComponent(doc.slug) + '">' +
                '<h3>' + esc(doc.title) + '</h3>' +
                (doc.summary ? '<p class="muted">' + esc(doc.summary) + '</p>' : '') +
                '<div class="meta">' + meta.join('') + '</div></a></li>';
        }).join('') + '</ul>';
    }

    var script = document.currentScript;
    var source = script && script.getAttribute('data-index');
    var form = document.getElementById('search-form');
    var input = document.getElementById('search-input');
    var target = document.getElementById('search-results');
    if (!source || !input || !target || typeof MiniSearch === 'undefined') return;

    var initial = (new URL(window.location.href).searchParams.get('q') || '').trim();
    input.value = initial;

    fetch(source).then(function (r) { return r.json(); }).then(function (payload) {
        var index = buildIndex(payload);
        var run = function () { renderResults(target, input.value, search(index, input.value)); };
        input.addEventListener('input', run);
        run();
    });

    if (form) {
        form.addEventListener('submit', function (e) {
            e.preventDefault();
            var query = input.value.trim();
            if (!query) return;
            var url = new URL(window.location.href);
            url.searchParams.set('q', query);
            window.history.replaceState({}, '', url.toString());
        });
    }
})();
"#;
