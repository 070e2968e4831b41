// src/response.rs
//! Final JSON envelope: either the mixed content or the collected errors, never both.

use serde::Serialize;

use crate::config::Settings;
use crate::errors::{ErrorRecord, PipelineError};
use crate::interleave::{interleave, slot_count};
use crate::loader::LoadedFeeds;

pub use crate::feed::types::{AdvItem, ContentItem, DefaultAdv};

/// One element of the mixed sequence. Serialized untagged, so each variant keeps
/// exactly its own field set on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseItem {
    Content(ContentItem),
    Advertisement(AdvItem),
    DefaultAdv(DefaultAdv),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Success {
        #[serde(rename = "httpStatus")]
        http_status: u16,
        content: Vec<ResponseItem>,
    },
    Failure {
        error: Vec<ErrorRecord>,
    },
}

impl Envelope {
    pub fn success(content: Vec<ResponseItem>) -> Self {
        Envelope::Success {
            http_status: 200,
            content,
        }
    }

    pub fn failure(error: Vec<ErrorRecord>) -> Self {
        Envelope::Failure { error }
    }
}

/// Body written when even the error envelope cannot be serialized.
const LAST_RESORT_BODY: &[u8] =
    br#"{"error":[{"code":502,"message":"Error while combining content with ads"}]}"#;

/// Turn the loader output into the response body.
///
/// Any recorded error suppresses interleaving entirely. A failure to serialize the
/// mixed content is itself reported as a 502 in the error envelope.
pub fn build_response(loaded: LoadedFeeds, settings: &Settings) -> Vec<u8> {
    let LoadedFeeds {
        content,
        ads,
        mut errors,
    } = loaded;

    if errors.is_empty() {
        let articles = content.items().len();
        let slots = slot_count(articles, settings.frequency);
        let mixed = interleave(
            content.into_items(),
            ads.into_items(),
            settings.frequency,
            &settings.default_adv_label,
        );
        tracing::info!(
            content = articles,
            slots,
            items = mixed.len(),
            "mixed response built"
        );
        match serde_json::to_vec(&Envelope::success(mixed)) {
            Ok(body) => return body,
            Err(e) => {
                let err = PipelineError::Merge(e.to_string());
                tracing::error!(error = %err, "serializing mixed content failed");
                errors.push(ErrorRecord::from(&err));
            }
        }
    }

    serde_json::to_vec(&Envelope::failure(errors)).unwrap_or_else(|e| {
        tracing::error!(error = %e, "serializing error envelope failed");
        LAST_RESORT_BODY.to_vec()
    })
}
