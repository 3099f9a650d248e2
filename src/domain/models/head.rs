use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Listing record summarising an object without its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadEntry {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub e_tag: Option<String>,
    pub version: Option<String>,
}

/// Options for a single page of listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct ListOptions {
    /// Only keys starting with this string
    #[builder(into)]
    pub prefix: Option<String>,
    /// Resume strictly after this key
    #[builder(into)]
    pub marker: Option<String>,
    /// Requested page size; the backend may return fewer
    pub limit: Option<usize>,
}

impl ListOptions {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            ..Self::default()
        }
    }
}
