// src/feed/mod.rs
pub mod decode;
pub mod fetch;
pub mod types;

pub use decode::decode;
pub use fetch::{FeedFetcher, HttpFeedFetcher};
pub use types::{AdvFeed, AdvItem, ContentFeed, ContentItem, DefaultAdv, Feed, FeedKind};
