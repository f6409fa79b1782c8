// src/config/settings.rs
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::ingest::dimes::DEFAULT_DIMES_BASEURL;
use crate::pipeline::DEFAULT_MAX_ITEMS_PER_CARD;

pub const ENV_SETTINGS_PATH: &str = "NOTIFIER_SETTINGS_PATH";

fn default_dimes_baseurl() -> String {
    DEFAULT_DIMES_BASEURL.to_string()
}
fn default_records_state_key() -> String {
    // same object the job has always written to
    "results.json".to_string()
}
fn default_maps_state_key() -> String {
    "maps.json".to_string()
}
fn default_http_timeout_secs() -> u64 {
    30
}
fn default_page_size() -> u32 {
    50
}
fn default_max_pages() -> u32 {
    200
}
fn default_max_items_per_card() -> usize {
    DEFAULT_MAX_ITEMS_PER_CARD
}

/// Non-secret tunables. Every field has a default, so an absent file is fine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default = "default_dimes_baseurl")]
    pub dimes_baseurl: String,
    #[serde(default = "default_records_state_key")]
    pub records_state_key: String,
    #[serde(default = "default_maps_state_key")]
    pub maps_state_key: String,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
    /// ArchivesSpace search page size.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound on pages walked per source.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Larger batches are split over several cards to stay under the
    /// webhook payload limit.
    #[serde(default = "default_max_items_per_card")]
    pub max_items_per_card: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dimes_baseurl: default_dimes_baseurl(),
            records_state_key: default_records_state_key(),
            maps_state_key: default_maps_state_key(),
            http_timeout_secs: default_http_timeout_secs(),
            page_size: default_page_size(),
            max_pages: default_max_pages(),
            max_items_per_card: default_max_items_per_card(),
        }
    }
}

impl Settings {
    /// Load from an explicit path. TOML or JSON, picked by extension.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::Settings(format!("reading {}: {e}", path.display()))
        })?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let parsed = if ext == "json" {
            serde_json::from_str::<Settings>(&content).map_err(|e| e.to_string())
        } else {
            toml::from_str::<Settings>(&content).map_err(|e| e.to_string())
        };
        parsed
            .map_err(|e| ConfigError::Settings(format!("parsing {}: {e}", path.display())))?
            .validated()
    }

    /// Load using env var + fallbacks:
    /// 1) $NOTIFIER_SETTINGS_PATH
    /// 2) config/notifier.toml
    /// 3) config/notifier.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self, ConfigError> {
        if let Ok(p) = std::env::var(ENV_SETTINGS_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from(&pb);
            }
            return Err(ConfigError::Settings(format!(
                "{ENV_SETTINGS_PATH} points to non-existent path {}",
                pb.display()
            )));
        }
        for candidate in ["config/notifier.toml", "config/notifier.json"] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from(&p);
            }
        }
        Ok(Self::default())
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        self.dimes_baseurl = self.dimes_baseurl.trim().trim_end_matches('/').to_string();
        self.records_state_key = self.records_state_key.trim().to_string();
        self.maps_state_key = self.maps_state_key.trim().to_string();

        if self.dimes_baseurl.is_empty() {
            return Err(ConfigError::Settings("dimes_baseurl is empty".into()));
        }
        if self.records_state_key.is_empty() || self.maps_state_key.is_empty() {
            return Err(ConfigError::Settings("state keys must not be empty".into()));
        }
        if self.records_state_key == self.maps_state_key {
            return Err(ConfigError::Settings(
                "records_state_key and maps_state_key must differ".into(),
            ));
        }
        if self.http_timeout_secs == 0 {
            self.http_timeout_secs = default_http_timeout_secs();
        }
        self.page_size = self.page_size.clamp(1, 250);
        self.max_pages = self.max_pages.max(1);
        self.max_items_per_card = self.max_items_per_card.max(1);
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs};

    #[test]
    fn toml_overrides_and_defaults_mix() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("notifier.toml");
        fs::write(
            &p,
            r#"
dimes_baseurl = "https://dimes.test/"
maps_state_key = " maps-v2.json "
page_size = 1000
"#,
        )
        .unwrap();
        let s = Settings::load_from(&p).unwrap();
        assert_eq!(s.dimes_baseurl, "https://dimes.test");
        assert_eq!(s.maps_state_key, "maps-v2.json");
        assert_eq!(s.records_state_key, "results.json");
        assert_eq!(s.page_size, 250);
        assert_eq!(s.http_timeout_secs, 30);
        assert_eq!(s.max_items_per_card, 50);
    }

    #[test]
    fn zero_card_limit_is_raised_to_one() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("notifier.toml");
        fs::write(&p, "max_items_per_card = 0\n").unwrap();
        assert_eq!(Settings::load_from(&p).unwrap().max_items_per_card, 1);
    }

    #[test]
    fn json_is_accepted_and_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("notifier.json");
        fs::write(&p, r#"{"http_timeout_secs": 5}"#).unwrap();
        assert_eq!(Settings::load_from(&p).unwrap().http_timeout_secs, 5);

        fs::write(&p, r#"{"http_timeout": 5}"#).unwrap();
        assert!(matches!(
            Settings::load_from(&p),
            Err(ConfigError::Settings(_))
        ));
    }

    #[test]
    fn same_state_key_for_both_sources_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("notifier.toml");
        fs::write(&p, "records_state_key = \"maps.json\"\n").unwrap();
        assert!(Settings::load_from(&p).is_err());
    }

    #[serial_test::serial]
    #[test]
    fn default_uses_env_then_fallbacks() {
        // Isolate CWD so the repo's own config/ is not picked up
        let old = env::current_dir().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        env::set_current_dir(tmp.path()).unwrap();
        env::remove_var(ENV_SETTINGS_PATH);

        // Nothing on disk → defaults
        assert_eq!(Settings::load_default().unwrap(), Settings::default());

        // Fallback TOML in ./config/
        fs::create_dir_all(tmp.path().join("config")).unwrap();
        fs::write(tmp.path().join("config/notifier.toml"), "page_size = 10\n").unwrap();
        assert_eq!(Settings::load_default().unwrap().page_size, 10);

        // Env takes precedence
        let p_env = tmp.path().join("elsewhere.json");
        fs::write(&p_env, r#"{"page_size": 20}"#).unwrap();
        env::set_var(ENV_SETTINGS_PATH, p_env.display().to_string());
        assert_eq!(Settings::load_default().unwrap().page_size, 20);

        // Env pointing nowhere is an error, not a silent default
        env::set_var(ENV_SETTINGS_PATH, tmp.path().join("missing.toml").display().to_string());
        assert!(Settings::load_default().is_err());
        env::remove_var(ENV_SETTINGS_PATH);

        env::set_current_dir(&old).unwrap();
    }
}
