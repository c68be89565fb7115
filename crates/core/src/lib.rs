pub mod config;
pub mod date;
pub mod error;
pub mod filter;
pub mod post;
pub mod source;
pub mod types;

pub use config::{apply_env_overrides, parse_site_toml};
pub use date::ReferenceTime;
pub use error::{Error, Result};
pub use filter::{FilterOutcome, FilterPolicy, filter_posts, filter_posts_with_report};
pub use post::{DateValue, Post, PostStatus, PostType, RawPost};
pub use types::*;
