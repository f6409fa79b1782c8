// src/notify/mod.rs
pub mod teams;

use anyhow::Result;

use crate::ingest::types::PublishedItem;
use crate::period::ReportingPeriod;

pub use teams::TeamsNotifier;

/// Everything new from one source in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub heading: String, // e.g. "Newly Published Collections"
    pub period: ReportingPeriod,
    pub items: Vec<PublishedItem>,
}

#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver the announcement. `Ok` only when the channel accepted it.
    async fn notify(&self, announcement: &Announcement) -> Result<()>;
}
