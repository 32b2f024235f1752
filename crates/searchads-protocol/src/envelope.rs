//! Response envelopes

use crate::error::ErrorEnvelope;
use serde::{Deserialize, Serialize};

/// Pagination state reported alongside list responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageDetail {
    /// Total number of matching items; `0` when the server does not report it
    pub total_results: i64,
    /// Offset of the first item in this page
    pub start_index: i64,
    /// Number of items the server intended to return
    pub items_per_page: i64,
}

impl PageDetail {
    /// The total count, if the server reported a usable one.
    pub fn total(&self) -> Option<i64> {
        (self.total_results > 0).then_some(self.total_results)
    }
}

/// Envelope for single-object responses: `{data: T, pagination?, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    /// The payload
    #[serde(default)]
    pub data: Option<T>,
    /// Pagination metadata, rarely present on single objects
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageDetail>,
    /// Error block, present only on failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

/// Envelope for list and find responses: `{data: [T], pagination?, error?}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiListResponse<T> {
    /// The page of items; absent or `null` decodes as empty
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    pub data: Vec<T>,
    /// Pagination metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageDetail>,
    /// Error block, present only on failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorEnvelope>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
