// src/feed/types.rs
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Which of the two upstream feeds a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedKind {
    Content,
    Advertisement,
}

impl FeedKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FeedKind::Content => "content",
            FeedKind::Advertisement => "advertisement",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decodable feed wrapper bound to its kind.
pub trait Feed: DeserializeOwned + Default + Send + 'static {
    const KIND: FeedKind;

    /// The `httpStatus` reported inside the payload (data, not a gate).
    fn status(&self) -> i64;
    fn item_count(&self) -> usize;
}

// Missing fields decode to zero values; a field of the wrong type is an error.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "harvesterId")]
    pub harvester_id: String,
    #[serde(rename = "cerebro-score")]
    pub score: f32,
    pub url: String,
    pub title: String,
    #[serde(rename = "cleanImage")]
    pub clean_image: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "harvesterId")]
    pub harvester_id: String,
    #[serde(rename = "commercialPartner")]
    pub commercial_partner: String,
    #[serde(rename = "logoURL")]
    pub logo_url: String,
    #[serde(rename = "cerebro-score")]
    pub score: f32,
    pub url: String,
    pub title: String,
    #[serde(rename = "cleanImage")]
    pub clean_image: String,
}

/// Placeholder emitted once the advertisement feed runs out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultAdv {
    #[serde(rename = "type")]
    pub kind: String,
}

impl DefaultAdv {
    pub fn new(label: impl Into<String>) -> Self {
        Self { kind: label.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Items<T> {
    pub items: Vec<T>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContentFeed {
    #[serde(rename = "httpStatus")]
    pub status: i64,
    pub response: Items<ContentItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AdvFeed {
    #[serde(rename = "httpStatus")]
    pub status: i64,
    pub response: Items<AdvItem>,
}

impl ContentFeed {
    pub fn items(&self) -> &[ContentItem] {
        &self.response.items
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        self.response.items
    }
}

impl AdvFeed {
    pub fn items(&self) -> &[AdvItem] {
        &self.response.items
    }

    pub fn into_items(self) -> Vec<AdvItem> {
        self.response.items
    }
}

impl Feed for ContentFeed {
    const KIND: FeedKind = FeedKind::Content;

    fn status(&self) -> i64 {
        self.status
    }

    fn item_count(&self) -> usize {
        self.response.items.len()
    }
}

impl Feed for AdvFeed {
    const KIND: FeedKind = FeedKind::Advertisement;

    fn status(&self) -> i64 {
        self.status
    }

    fn item_count(&self) -> usize {
        self.response.items.len()
    }
}
