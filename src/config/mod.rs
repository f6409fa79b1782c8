// src/config/mod.rs
//! Runtime configuration.
//!
//! Secrets and endpoints come from the environment and are all required; the
//! process refuses to start if any is missing. Non-secret tunables live in
//! [`settings::Settings`].

pub mod settings;

use std::fmt;

use reqwest::Url;

use crate::error::ConfigError;

pub use settings::Settings;

pub const ENV_ACCESS_KEY_ID: &str = "ACCESS_KEY_ID";
pub const ENV_SECRET_ACCESS_KEY: &str = "SECRET_ACCESS_KEY";
pub const ENV_BUCKET_NAME: &str = "BUCKET_NAME";
pub const ENV_AS_BASEURL: &str = "AS_BASEURL";
pub const ENV_AS_USERNAME: &str = "AS_USERNAME";
pub const ENV_AS_PASSWORD: &str = "AS_PASSWORD";
pub const ENV_CARTOGRAPHER_BASEURL: &str = "CARTOGRAPHER_BASEURL";
pub const ENV_TEAMS_URL: &str = "TEAMS_URL";
pub const ENV_AWS_REGION: &str = "AWS_REGION";
pub const ENV_S3_ENDPOINT_URL: &str = "S3_ENDPOINT_URL";

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Clone)]
pub struct StorageConfig {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub bucket: String,
    pub region: String,
    /// S3-compatible endpoint (MinIO, localstack); AWS default when None.
    pub endpoint: Option<String>,
}

#[derive(Clone)]
pub struct ArchivesSpaceConfig {
    pub baseurl: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub archivesspace: ArchivesSpaceConfig,
    pub cartographer_baseurl: String,
    pub teams_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from any key lookup. Blank values count as missing.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| -> Option<String> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let storage = StorageConfig {
            access_key_id: required(ENV_ACCESS_KEY_ID)?,
            secret_access_key: required(ENV_SECRET_ACCESS_KEY)?,
            bucket: required(ENV_BUCKET_NAME)?,
            region: get(ENV_AWS_REGION).unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: get(ENV_S3_ENDPOINT_URL)
                .map(|u| http_url(ENV_S3_ENDPOINT_URL, u))
                .transpose()?,
        };

        let archivesspace = ArchivesSpaceConfig {
            baseurl: http_url(ENV_AS_BASEURL, required(ENV_AS_BASEURL)?)?,
            username: required(ENV_AS_USERNAME)?,
            password: required(ENV_AS_PASSWORD)?,
        };

        Ok(Self {
            storage,
            archivesspace,
            cartographer_baseurl: http_url(
                ENV_CARTOGRAPHER_BASEURL,
                required(ENV_CARTOGRAPHER_BASEURL)?,
            )?,
            teams_url: http_url(ENV_TEAMS_URL, required(ENV_TEAMS_URL)?)?,
        })
    }
}

/// Accept only absolute http(s) URLs; strips a trailing slash.
fn http_url(key: &'static str, raw: String) -> Result<String, ConfigError> {
    let parsed = Url::parse(&raw).map_err(|e| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid {
            key,
            reason: format!("unsupported scheme {:?}", parsed.scheme()),
        });
    }
    Ok(raw.trim_end_matches('/').to_string())
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageConfig")
            .field("access_key_id", &redact(&self.access_key_id))
            .field("secret_access_key", &"***")
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl fmt::Debug for ArchivesSpaceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchivesSpaceConfig")
            .field("baseurl", &self.baseurl)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("storage", &self.storage)
            .field("archivesspace", &self.archivesspace)
            .field("cartographer_baseurl", &self.cartographer_baseurl)
            .field("teams_url", &webhook_host(&self.teams_url))
            .finish()
    }
}

/// Webhook URLs carry their credential in the path; only the host is loggable.
pub fn webhook_host(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| format!("{}://{h}/***", u.scheme())))
        .unwrap_or_else(|| "***".to_string())
}

// Only the length and last 4 chars, enough to tell keys apart in logs.
fn redact(s: &str) -> String {
    let n = s.chars().count();
    let tail: String = s.chars().skip(n.saturating_sub(4)).collect();
    format!("len={n} ..{tail}")
}
