// src/error.rs
use thiserror::Error;

/// Problems detected before any work starts. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("settings: {0}")]
    Settings(String),

    #[error("http client: {0}")]
    HttpClient(String),
}

/// Failure of one source's pipeline. Other sources keep running.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    #[error("[{source_name}] fetch failed: {detail}")]
    Fetch {
        source_name: &'static str,
        detail: String,
    },

    #[error("[{source_name}] state storage failed: {detail}")]
    Storage {
        source_name: &'static str,
        detail: String,
    },

    #[error("[{source_name}] notification failed: {detail}")]
    Notify {
        source_name: &'static str,
        detail: String,
    },
}

impl PipelineError {
    pub fn fetch(source_name: &'static str, e: anyhow::Error) -> Self {
        Self::Fetch {
            source_name,
            detail: format!("{e:#}"),
        }
    }

    pub fn storage(source_name: &'static str, e: anyhow::Error) -> Self {
        Self::Storage {
            source_name,
            detail: format!("{e:#}"),
        }
    }

    pub fn notify(source_name: &'static str, e: anyhow::Error) -> Self {
        Self::Notify {
            source_name,
            detail: format!("{e:#}"),
        }
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Fetch { source_name, .. }
            | Self::Storage { source_name, .. }
            | Self::Notify { source_name, .. } => source_name,
        }
    }
}
