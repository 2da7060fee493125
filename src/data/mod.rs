//! Core data models for comicshelf
//!
//! This module contains the credentials used to sign requests and the
//! response types of the Marvel `/comics` endpoint. The response is an
//! external contract: it is decoded by shape and not transformed.

pub mod client;
pub mod signing;

pub use client::{ClientConfig, ComicsClient, ComicsError, ComicsSource};
pub use signing::{sign, SignedRequestParams};

use std::fmt;

use serde::{Deserialize, Serialize};

/// `code` value of a successful response
pub const SUCCESS_CODE: i64 = 200;

/// API key pair issued by the Marvel developer portal
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Public key, sent as `apikey`
    pub public_key: String,
    /// Private key, only ever fed into the digest
    pub private_key: String,
}

impl Credentials {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Top-level wrapper returned by the `/comics` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComicsResponse {
    /// Application-level status code; 200 on success
    pub code: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub copyright: String,
    #[serde(default)]
    pub attribution_text: String,
    #[serde(default, rename = "attributionHTML")]
    pub attribution_html: String,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub data: ComicDataContainer,
}

impl ComicsResponse {
    /// Whether the application-level code reports success
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}

/// One page of comics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComicDataContainer {
    pub offset: u32,
    pub limit: u32,
    pub total: u32,
    pub count: u32,
    pub results: Vec<Comic>,
}

/// A single comic issue, trade paperback or collection
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Comic {
    pub id: u64,
    pub digital_id: u64,
    pub title: String,
    pub issue_number: f64,
    pub variant_description: String,
    /// Null for many older issues
    pub description: Option<String>,
    pub modified: String,
    pub isbn: String,
    pub upc: String,
    pub diamond_code: String,
    pub ean: String,
    pub issn: String,
    pub format: String,
    pub page_count: u32,
    pub text_objects: Vec<TextObject>,
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    pub urls: Vec<Link>,
    pub series: ResourceSummary,
    pub variants: Vec<ResourceSummary>,
    pub collections: Vec<ResourceSummary>,
    pub collected_issues: Vec<serde_json::Value>,
    pub dates: Vec<ComicDate>,
    pub prices: Vec<ComicPrice>,
    pub thumbnail: Image,
    pub images: Vec<Image>,
    pub creators: ResourceList<CreatorSummary>,
    pub characters: ResourceList<ResourceSummary>,
    pub stories: ResourceList<StorySummary>,
    pub events: ResourceList<ResourceSummary>,
}

impl Comic {
    /// Looks up a date by its `type` (e.g. `onsaleDate`)
    pub fn date(&self, kind: &str) -> Option<&str> {
        self.dates
            .iter()
            .find(|d| d.kind == kind)
            .map(|d| d.date.as_str())
    }

    /// Looks up a price by its `type` (e.g. `printPrice`)
    pub fn price(&self, kind: &str) -> Option<f64> {
        self.prices.iter().find(|p| p.kind == kind).map(|p| p.price)
    }
}

/// Descriptive text attached to a comic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextObject {
    #[serde(rename = "type")]
    pub kind: String,
    pub language: String,
    pub text: String,
}

/// Public web link (detail, purchase, reader...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Link {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

/// Lightweight reference to a related entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSummary {
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    pub name: String,
}

/// Creator reference with the role they played on the comic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreatorSummary {
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    pub name: String,
    pub role: String,
}

/// Story reference with its story type (cover, interiorStory...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorySummary {
    #[serde(rename = "resourceURI")]
    pub resource_uri: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Group of related-entity references
///
/// `available` is the total number of related entities, `returned` how many
/// of them are listed in `items`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceList<T> {
    pub available: u32,
    #[serde(rename = "collectionURI")]
    pub collection_uri: String,
    pub items: Vec<T>,
    pub returned: u32,
}

/// A dated event in the comic's life (on sale, FOC...)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComicDate {
    #[serde(rename = "type")]
    pub kind: String,
    pub date: String,
}

/// A price point for the comic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComicPrice {
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
}

/// Image location split into path and extension
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    pub path: String,
    pub extension: String,
}

impl Image {
    /// Full URL for a rendition variant such as `portrait_xlarge`
    pub fn url(&self, variant: &str) -> String {
        format!("{}/{}.{}", self.path, variant, self.extension)
    }
}
