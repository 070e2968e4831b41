// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod errors;
pub mod feed;
pub mod interleave;
pub mod loader;
pub mod metrics;
pub mod response;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, create_router_with_metrics, router, AppState};
pub use crate::config::Settings;
pub use crate::errors::{ErrorRecord, ErrorSink, FetchError, PipelineError};
pub use crate::feed::{FeedFetcher, HttpFeedFetcher};
pub use crate::loader::{load_feeds, LoadedFeeds};
pub use crate::response::{build_response, Envelope, ResponseItem};
