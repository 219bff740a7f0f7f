//! Directory API response types.

use serde::Deserialize;

/// Envelope for `GET /businesses/search`: `{ "businesses": [...], "total": n }`.
#[derive(Debug, Deserialize)]
pub(crate) struct BusinessSearchResponse {
    #[serde(default)]
    pub businesses: Vec<Business>,
}

/// A single business returned by the directory search.
#[derive(Debug, Clone, Deserialize)]
pub struct Business {
    pub name: String,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: u32,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Business {
    /// Primary category title, or an empty string when the directory sent none.
    #[must_use]
    pub fn primary_category(&self) -> &str {
        self.categories.first().map_or("", |c| c.title.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub title: String,
}
