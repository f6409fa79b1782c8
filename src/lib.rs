// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod diff;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod period;
pub mod pipeline;
pub mod state;

// ---- Re-exports for stable public API ----
pub use crate::config::{Config, Settings};
pub use crate::error::{ConfigError, PipelineError};
pub use crate::ingest::types::{PublishedItem, Source};
pub use crate::notify::{Announcement, Notifier};
pub use crate::pipeline::{RunReport, SourcePipeline};
pub use crate::state::{KnownSet, StateStore};

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use reqwest::Client;
use tracing::info;

use crate::ingest::providers::{MapSource, RecordsSource};
use crate::notify::TeamsNotifier;
use crate::period::ReportingPeriod;
use crate::state::S3ObjectStore;

/// Single scheduled invocation: read config from the environment, then announce
/// whatever both sources published since the last successful run.
pub async fn run() -> Result<RunReport, ConfigError> {
    let config = Config::from_env()?;
    let settings = Settings::load_default()?;
    info!(?config, ?settings, "configuration loaded");
    run_with(&config, &settings, chrono::Utc::now().date_naive()).await
}

pub async fn run_with(
    config: &Config,
    settings: &Settings,
    today: NaiveDate,
) -> Result<RunReport, ConfigError> {
    let client = http_client(settings)?;
    let period = ReportingPeriod::previous_month(today);

    let store = StateStore::new(Arc::new(S3ObjectStore::new(&config.storage).await));
    let notifier = TeamsNotifier::new(client.clone(), config.teams_url.clone());
    let pipelines = build_pipelines(config, settings, &client, period);

    Ok(pipeline::run_all(&pipelines, &store, &notifier, period).await)
}

/// One shared client for every remote call.
pub fn http_client(settings: &Settings) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(Duration::from_secs(settings.http_timeout_secs))
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::HttpClient(e.to_string()))
}

/// Records first, then maps; each with its own state object.
pub fn build_pipelines(
    config: &Config,
    settings: &Settings,
    client: &Client,
    period: ReportingPeriod,
) -> Vec<SourcePipeline> {
    let records = RecordsSource::new(
        client.clone(),
        config.archivesspace.clone(),
        settings.dimes_baseurl.clone(),
    )
    .with_paging(settings.page_size, settings.max_pages);

    let maps = MapSource::new(
        client.clone(),
        config.cartographer_baseurl.clone(),
        settings.dimes_baseurl.clone(),
        period.from_timestamp(),
    )
    .with_max_pages(settings.max_pages);

    vec![
        SourcePipeline::new(Box::new(records), settings.records_state_key.clone())
            .with_card_limit(settings.max_items_per_card),
        SourcePipeline::new(Box::new(maps), settings.maps_state_key.clone())
            .with_card_limit(settings.max_items_per_card),
    ]
}
