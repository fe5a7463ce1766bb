//! Application configuration management.
//!
//! This module handles loading the application configuration,
//! which includes the Data Dragon version and locale, the upstream hosts,
//! and where the navigation history is kept.
//!
//! Configuration is stored at `~/.config/riftcodex/config.json`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "riftcodex";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// History log file name in the cache directory
const HISTORY_FILE: &str = "history.log";

const DEFAULT_DATA_VERSION: &str = "14.14.1";
const DEFAULT_LOCALE: &str = "en_US";
const DEFAULT_DDRAGON_BASE: &str = "https://ddragon.leagueoflegends.com";
const DEFAULT_ITEMS_URL: &str =
    "https://cdn.merakianalytics.com/riot/lol/resources/latest/en-US/items.json";
const DEFAULT_GAME_MODES_URL: &str = "https://static.developer.riotgames.com/docs/lol/gameModes.json";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = crate::api::client::REQUEST_TIMEOUT_SECS;

/// Environment variable overriding `data_version`
pub const ENV_DATA_VERSION: &str = "RIFTCODEX_DATA_VERSION";

/// Environment variable overriding `locale`
pub const ENV_LOCALE: &str = "RIFTCODEX_LOCALE";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data Dragon patch version, e.g. `14.14.1`
    pub data_version: String,
    pub locale: String,
    pub ddragon_base: String,
    pub items_url: String,
    pub game_modes_url: String,
    pub request_timeout_secs: u64,
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_version: DEFAULT_DATA_VERSION.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            ddragon_base: DEFAULT_DDRAGON_BASE.to_string(),
            items_url: DEFAULT_ITEMS_URL.to_string(),
            game_modes_url: DEFAULT_GAME_MODES_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            history_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in production)
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(version) = lookup(ENV_DATA_VERSION).filter(|v| !v.trim().is_empty()) {
            self.data_version = version.trim().to_string();
        }
        if let Some(locale) = lookup(ENV_LOCALE).filter(|v| !v.trim().is_empty()) {
            self.locale = locale.trim().to_string();
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        match self.history_file {
            Some(ref path) => Ok(path.clone()),
            None => Ok(self.cache_dir()?.join(HISTORY_FILE)),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    // ===== Derived URLs =====

    fn cdn(&self) -> String {
        format!("{}/cdn", self.ddragon_base.trim_end_matches('/'))
    }

    pub fn champions_url(&self) -> String {
        format!("{}/{}/data/{}/champion.json", self.cdn(), self.data_version, self.locale)
    }

    /// Detail URL template; `{id}` is replaced with the champion id
    pub fn champion_detail_template(&self) -> String {
        format!("{}/{}/data/{}/champion/{{id}}.json", self.cdn(), self.data_version, self.locale)
    }

    pub fn summoner_spells_url(&self) -> String {
        format!("{}/{}/data/{}/summoner.json", self.cdn(), self.data_version, self.locale)
    }

    pub fn champion_splash_url(&self, champion_id: &str) -> String {
        self.champion_skin_url(champion_id, "0")
    }

    pub fn champion_skin_url(&self, champion_id: &str, skin_num: &str) -> String {
        format!("{}/img/champion/splash/{}_{}.jpg", self.cdn(), champion_id, skin_num)
    }

    pub fn champion_icon_url(&self, champion_id: &str) -> String {
        format!("{}/{}/img/champion/{}.png", self.cdn(), self.data_version, champion_id)
    }

    pub fn summoner_spell_icon_url(&self, spell_id: &str) -> String {
        format!("{}/{}/img/spell/{}.png", self.cdn(), self.data_version, spell_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_urls() {
        let config = Config::default();
        assert_eq!(
            config.champions_url(),
            "https://ddragon.leagueoflegends.com/cdn/14.14.1/data/en_US/champion.json"
        );
        assert_eq!(
            config.champion_detail_template().replace("{id}", "Ahri"),
            "https://ddragon.leagueoflegends.com/cdn/14.14.1/data/en_US/champion/Ahri.json"
        );
        assert_eq!(
            config.champion_splash_url("Ahri"),
            "https://ddragon.leagueoflegends.com/cdn/img/champion/splash/Ahri_0.jpg"
        );
        assert_eq!(
            config.champion_skin_url("Ahri", "7"),
            "https://ddragon.leagueoflegends.com/cdn/img/champion/splash/Ahri_7.jpg"
        );
        assert_eq!(
            config.champion_icon_url("Ahri"),
            "https://ddragon.leagueoflegends.com/cdn/14.14.1/img/champion/Ahri.png"
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(r#"{"locale": "ko_KR"}"#).expect("partial config");
        assert_eq!(config.locale, "ko_KR");
        assert_eq!(config.data_version, DEFAULT_DATA_VERSION);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_overrides(|key| match key {
            ENV_DATA_VERSION => Some(" 14.15.1 ".to_string()),
            ENV_LOCALE => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.data_version, "14.15.1");
        // Blank values are ignored
        assert_eq!(config.locale, DEFAULT_LOCALE);
    }

    #[test]
    fn test_history_path_override() {
        let config = Config {
            history_file: Some(PathBuf::from("/tmp/rc-history.log")),
            ..Config::default()
        };
        assert_eq!(config.history_path().expect("path"), PathBuf::from("/tmp/rc-history.log"));
    }
}
