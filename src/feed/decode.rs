// src/feed/decode.rs
use serde::de::IgnoredAny;

use crate::errors::PipelineError;
use crate::feed::types::Feed;

/// Validate `bytes` as JSON, then decode the whole payload as `F`.
///
/// Syntax problems (including an empty body) surface as `InvalidJson`; a well-formed
/// document of the wrong shape surfaces as `Decode`. There is no partial result.
pub fn decode<F: Feed>(bytes: &[u8]) -> Result<F, PipelineError> {
    serde_json::from_slice::<IgnoredAny>(bytes).map_err(|source| PipelineError::InvalidJson {
        kind: F::KIND,
        source,
    })?;

    serde_json::from_slice::<F>(bytes).map_err(|source| PipelineError::Decode {
        kind: F::KIND,
        source,
    })
}
