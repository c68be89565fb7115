// Derived views over filtered posts: category listings and full-text search

pub mod category;
pub mod search;

pub use category::{CategoryView, SortOrder, category_view};
pub use search::{SearchDoc, SearchHit, SearchIndex, SearchOptions, SearchPayload};
