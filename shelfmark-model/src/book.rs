use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::BookId;

/// One catalog entry as stored and served.
///
/// `created_at` is stamped exactly once on insert; `updated_at` stays
/// `None` until the first subsequent mutation and is re-stamped on every
/// write after that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub isbn: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub publisher: Option<String>,
    pub page_count: Option<i32>,
    pub genre: Option<String>,
    pub description: Option<String>,
    pub cover_image_url: Option<String>,
    pub rating: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Book {
    pub fn has_cover_image(&self) -> bool {
        self.cover_image_url
            .as_deref()
            .is_some_and(|url| !url.is_empty())
    }
}

/// Caller-supplied book state, used for both create and full-replace
/// update. Identifier and timestamps are server-owned and absent here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub page_count: Option<i32>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image_url: Option<String>,
    #[serde(default)]
    pub rating: Option<Decimal>,
}

impl BookPayload {
    /// ISBN normalized for uniqueness checks: empty and whitespace-only
    /// values count as absent.
    pub fn isbn_trimmed(&self) -> Option<&str> {
        self.isbn
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}
