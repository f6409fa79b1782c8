// src/ingest/types.rs
use anyhow::Result;

/// One published thing as reported by a source system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedItem {
    pub identifier: String, // unique within its source, e.g. "/repositories/2/resources/123"
    pub title: String,      // normalized display title
    pub url: String,        // public link shown in the announcement
}

impl PublishedItem {
    pub fn new(
        identifier: impl Into<String>,
        title: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            url: url.into(),
        }
    }
}

#[async_trait::async_trait]
pub trait Source: Send + Sync {
    /// Stable short name used in logs and in the run report.
    fn name(&self) -> &'static str;

    /// Section heading used when announcing this source's items.
    fn heading(&self) -> &'static str;

    /// Fetch everything currently published, deduplicated by identifier.
    async fn fetch_published(&self) -> Result<Vec<PublishedItem>>;
}
