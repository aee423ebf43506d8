/// Shared data structures
///
/// These structs flow between the catalog, the result loader and the UI.
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::tags::TagSet;
use crate::error::FitResult;

/// A fit as stored in the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct FitRecord {
    /// Unique database ID
    pub id: i64,
    pub description: String,
    /// Image URL, empty when the fit was posted without one
    pub image: String,
    pub tags: TagSet,
    /// Unix timestamp (seconds)
    pub created_at: i64,
}

/// Output of the size recommendation, consumed by the result view
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SizeResult {
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
}

impl SizeResult {
    /// Image to show, ignoring empty strings
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref().filter(|s| !s.is_empty())
    }

    /// Size label to show, ignoring empty strings
    pub fn size(&self) -> Option<&str> {
        self.size.as_deref().filter(|s| !s.is_empty())
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Read a result file written by the recommendation service
pub async fn load_size_result(path: impl AsRef<Path>) -> FitResult<SizeResult> {
    let raw = tokio::fs::read_to_string(path).await?;
    Ok(SizeResult::from_json(&raw)?)
}
