// src/pipeline.rs
//! fetch → load known → diff → notify → persist, once per source.

use crate::diff::diff;
use crate::error::PipelineError;
use crate::ingest::types::Source;
use crate::notify::{Announcement, Notifier};
use crate::period::ReportingPeriod;
use crate::state::StateStore;

pub const DEFAULT_MAX_ITEMS_PER_CARD: usize = 50;

/// A source together with the state object that remembers what it already reported.
pub struct SourcePipeline {
    pub source: Box<dyn Source>,
    pub state_key: String,
    /// Most items sent in a single announcement.
    pub card_limit: usize,
}

impl SourcePipeline {
    pub fn new(source: Box<dyn Source>, state_key: impl Into<String>) -> Self {
        Self {
            source,
            state_key: state_key.into(),
            card_limit: DEFAULT_MAX_ITEMS_PER_CARD,
        }
    }

    pub fn with_card_limit(mut self, limit: usize) -> Self {
        self.card_limit = limit.max(1);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceSummary {
    pub fetched: usize,
    pub known_before: usize,
    pub announced: usize,
    pub known_after: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub source: &'static str,
    pub result: Result<SourceSummary, PipelineError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub outcomes: Vec<SourceOutcome>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn announced(&self) -> usize {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok())
            .map(|s| s.announced)
            .sum()
    }

    pub fn errors(&self) -> impl Iterator<Item = &PipelineError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }
}

/// Run one source end to end.
///
/// New items go out in announcements of at most `card_limit` items. State is
/// written after each accepted announcement, so a failed post leaves its items
/// (and every later batch) unknown and they are retried on the next run.
/// Nothing is posted or written when there is nothing new.
pub async fn run_pipeline(
    pipeline: &SourcePipeline,
    store: &StateStore,
    notifier: &dyn Notifier,
    period: ReportingPeriod,
) -> Result<SourceSummary, PipelineError> {
    let name = pipeline.source.name();

    let current = pipeline
        .source
        .fetch_published()
        .await
        .map_err(|e| PipelineError::fetch(name, e))?;

    let mut known = store
        .load(&pipeline.state_key)
        .await
        .map_err(|e| PipelineError::storage(name, e))?;

    let fresh = diff(&current, &known);
    let mut summary = SourceSummary {
        fetched: current.len(),
        known_before: known.len(),
        announced: 0,
        known_after: known.len(),
    };

    if fresh.is_empty() {
        tracing::info!(source = name, fetched = summary.fetched, "nothing new");
        return Ok(summary);
    }

    let batches = fresh.len().div_ceil(pipeline.card_limit);
    for (i, chunk) in fresh.chunks(pipeline.card_limit).enumerate() {
        let announcement = Announcement {
            heading: pipeline.source.heading().to_string(),
            period,
            items: chunk.to_vec(),
        };
        if let Err(e) = notifier.notify(&announcement).await {
            if i > 0 {
                tracing::warn!(
                    source = name,
                    batch = i + 1,
                    batches,
                    persisted = summary.announced,
                    "announcement interrupted; earlier batches were saved"
                );
            }
            return Err(PipelineError::notify(name, e));
        }

        known.extend(chunk.iter().map(|it| it.identifier.as_str()));
        store
            .save(&pipeline.state_key, &known)
            .await
            .map_err(|e| PipelineError::storage(name, e))?;
        summary.announced += chunk.len();
    }

    summary.known_after = known.len();
    tracing::info!(
        source = name,
        fetched = summary.fetched,
        announced = summary.announced,
        batches,
        known = summary.known_after,
        "announced new items"
    );
    Ok(summary)
}

/// Run every pipeline in order. A failing source is logged and does not stop the rest.
pub async fn run_all(
    pipelines: &[SourcePipeline],
    store: &StateStore,
    notifier: &dyn Notifier,
    period: ReportingPeriod,
) -> RunReport {
    let mut outcomes = Vec::with_capacity(pipelines.len());
    for p in pipelines {
        let result = run_pipeline(p, store, notifier, period).await;
        if let Err(e) = &result {
            tracing::error!(source = p.source.name(), error = %e, "source pipeline failed");
        }
        outcomes.push(SourceOutcome {
            source: p.source.name(),
            result,
        });
    }
    RunReport { outcomes }
}
