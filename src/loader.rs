// src/loader.rs
//! Fork-join loading of both feeds.
//!
//! Each feed runs fetch + decode on its own task; the caller resumes only after both
//! tasks have finished. Failures never abort the sibling task, they are appended to a
//! shared `ErrorSink` and the feed falls back to an empty collection.

use std::sync::Arc;
use std::time::Instant;

use metrics::{counter, histogram};
use tokio::task::JoinHandle;

use crate::config::Settings;
use crate::errors::{ErrorRecord, ErrorSink, PipelineError};
use crate::feed::decode::decode;
use crate::feed::fetch::FeedFetcher;
use crate::feed::types::{AdvFeed, ContentFeed, Feed, FeedKind};
use crate::metrics::ensure_metrics_described;

/// Result of one load: both collections plus every error recorded along the way.
/// A non-empty `errors` means the collections must not be used.
#[derive(Debug, Default)]
pub struct LoadedFeeds {
    pub content: ContentFeed,
    pub ads: AdvFeed,
    pub errors: Vec<ErrorRecord>,
}

impl LoadedFeeds {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Load both configured feeds concurrently and wait for both.
pub async fn load_feeds(fetcher: Arc<dyn FeedFetcher>, settings: &Settings) -> LoadedFeeds {
    load_pair(fetcher, &settings.content_url, &settings.ads_url).await
}

pub async fn load_pair(
    fetcher: Arc<dyn FeedFetcher>,
    content_url: &str,
    ads_url: &str,
) -> LoadedFeeds {
    ensure_metrics_described();
    let sink = Arc::new(ErrorSink::new());

    let content_task = spawn_pipeline::<ContentFeed>(&fetcher, content_url, &sink);
    let ads_task = spawn_pipeline::<AdvFeed>(&fetcher, ads_url, &sink);

    let (content, ads) = tokio::join!(
        join_pipeline(content_task, FeedKind::Content, &sink),
        join_pipeline(ads_task, FeedKind::Advertisement, &sink),
    );

    // Both tasks are finished, so the sink is normally no longer shared.
    let errors = match Arc::try_unwrap(sink) {
        Ok(sink) => sink.into_entries(),
        Err(shared) => shared.entries(),
    };

    LoadedFeeds {
        content,
        ads,
        errors,
    }
}

fn spawn_pipeline<F: Feed>(
    fetcher: &Arc<dyn FeedFetcher>,
    url: &str,
    sink: &Arc<ErrorSink>,
) -> JoinHandle<F> {
    let fetcher = Arc::clone(fetcher);
    let sink = Arc::clone(sink);
    let url = url.to_string();
    tokio::spawn(async move {
        match run_pipeline::<F>(fetcher.as_ref(), &url).await {
            Ok(feed) => feed,
            Err(err) => {
                report(&sink, &err);
                F::default()
            }
        }
    })
}

// A panicking pipeline must still count as a failure of its feed.
async fn join_pipeline<F: Feed>(task: JoinHandle<F>, kind: FeedKind, sink: &ErrorSink) -> F {
    match task.await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!(feed = %kind, error = %e, "feed loader task failed");
            report(sink, &PipelineError::Aborted { kind });
            F::default()
        }
    }
}

/// Fetch and decode a single feed. A failed fetch skips decoding.
pub async fn run_pipeline<F: Feed>(
    fetcher: &dyn FeedFetcher,
    url: &str,
) -> Result<F, PipelineError> {
    let kind = F::KIND;
    let t0 = Instant::now();
    let fetched = fetcher.fetch(url).await;
    let ms = t0.elapsed().as_secs_f64() * 1_000.0;
    histogram!("feed_fetch_ms", "kind" => kind.as_str()).record(ms);

    let bytes = fetched.map_err(|source| PipelineError::Fetch { kind, source })?;
    let feed = decode::<F>(&bytes)?;

    tracing::debug!(
        feed = %kind,
        items = feed.item_count(),
        status = feed.status(),
        "feed decoded"
    );
    Ok(feed)
}

fn report(sink: &ErrorSink, err: &PipelineError) {
    let kind = match err {
        PipelineError::Fetch { kind, .. }
        | PipelineError::InvalidJson { kind, .. }
        | PipelineError::Decode { kind, .. }
        | PipelineError::Aborted { kind } => kind.as_str(),
        PipelineError::Merge(_) => "merge",
    };
    tracing::warn!(feed = kind, code = err.code(), error = %err, "feed pipeline failed");
    counter!("feed_errors_total", "kind" => kind, "stage" => err.stage()).increment(1);
    sink.record(err);
}
