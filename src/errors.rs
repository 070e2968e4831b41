//! Error kinds raised while loading and mixing feeds, plus the per-request
//! aggregator that collects them.

use std::sync::Mutex;

use serde::Serialize;
use thiserror::Error;

use crate::feed::types::FeedKind;

/// Code reported for any failure reaching or decoding a feed.
pub const CODE_FEED_UNAVAILABLE: u16 = 503;
/// Code reported when the combined response could not be built.
pub const CODE_MERGE_FAILED: u16 = 502;

/// Transport-level failure of a single feed request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("reading body from {url} failed: {reason}")]
    Body { url: String, reason: String },
}

/// Anything that can go wrong between launching a feed request and writing the envelope.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Error of getting content for {kind} structure: {source}")]
    Fetch {
        kind: FeedKind,
        #[source]
        source: FetchError,
    },

    #[error("Error of preparing structure {kind}: body is not a valid json")]
    InvalidJson {
        kind: FeedKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error of preparing structure {kind}: {source}")]
    Decode {
        kind: FeedKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("Error of preparing structure {kind}: loader task aborted")]
    Aborted { kind: FeedKind },

    #[error("Error while combining content with ads: {0}")]
    Merge(String),
}

impl PipelineError {
    pub fn code(&self) -> u16 {
        match self {
            PipelineError::Merge(_) => CODE_MERGE_FAILED,
            _ => CODE_FEED_UNAVAILABLE,
        }
    }

    /// Short stage label used for logs and metrics.
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Fetch { .. } => "fetch",
            PipelineError::InvalidJson { .. } => "invalid_json",
            PipelineError::Decode { .. } => "decode",
            PipelineError::Aborted { .. } => "aborted",
            PipelineError::Merge(_) => "merge",
        }
    }
}

/// One entry of the failure envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub code: u16,
    pub message: String,
}

impl From<&PipelineError> for ErrorRecord {
    fn from(err: &PipelineError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Append-only, request-scoped error collection shared by the loader tasks.
#[derive(Debug, Default)]
pub struct ErrorSink {
    inner: Mutex<Vec<ErrorRecord>>,
}

impl ErrorSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, code: u16, message: impl Into<String>) {
        let record = ErrorRecord {
            code,
            message: message.into(),
        };
        self.lock().push(record);
    }

    pub fn record(&self, err: &PipelineError) {
        self.lock().push(ErrorRecord::from(err));
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Copy of every entry in insertion order.
    pub fn entries(&self) -> Vec<ErrorRecord> {
        self.lock().clone()
    }

    pub fn into_entries(self) -> Vec<ErrorRecord> {
        match self.inner.into_inner() {
            Ok(v) => v,
            Err(poison) => poison.into_inner(),
        }
    }

    // A panic while holding the lock cannot leave a half-written Vec behind,
    // so a poisoned guard is still usable.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ErrorRecord>> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poison) => poison.into_inner(),
        }
    }
}
