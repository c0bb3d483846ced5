use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::dedup::{DEFAULT_GENERAL_THRESHOLD, DEFAULT_TITLE_THRESHOLD};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    pub title_threshold: f64,
    pub general_threshold: f64,
    pub normalize_urls: bool,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            title_threshold: DEFAULT_TITLE_THRESHOLD,
            general_threshold: DEFAULT_GENERAL_THRESHOLD,
            normalize_urls: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub batch_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            batch_file: "data/incoming.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            file: "data/postings.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub file: String,
    pub level: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: "logs/posting-dedup.log".to_string(),
            level: Some("info".to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub dedup: DedupConfig,
    pub input: InputConfig,
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let explicit_path = std::env::var("CONFIG_FILE").ok();
        let config = if let Some(path) = explicit_path {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(anyhow!("config file {:?} not found", path));
            }
            Self::load_from_file(&path)?
        } else {
            match locate_default_config() {
                Some(path) => Self::load_from_file(&path)?,
                None => AppConfig::default(),
            }
        };

        Self::apply_env_overrides(config)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {:?}", path))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {:?}", path))?;
        Ok(config)
    }

    fn apply_env_overrides(mut config: AppConfig) -> anyhow::Result<AppConfig> {
        if let Some(threshold) = parse_optional_env("DEDUP_TITLE_THRESHOLD")? {
            config.dedup.title_threshold = threshold;
        }

        if let Some(threshold) = parse_optional_env("DEDUP_GENERAL_THRESHOLD")? {
            config.dedup.general_threshold = threshold;
        }

        if let Some(normalize) = parse_optional_env("DEDUP_NORMALIZE_URLS")? {
            config.dedup.normalize_urls = normalize;
        }

        if let Ok(batch_file) = std::env::var("BATCH_FILE") {
            config.input.batch_file = batch_file;
        }

        if let Ok(store_file) = std::env::var("STORE_FILE") {
            config.store.file = store_file;
        }

        if let Ok(log_file) = std::env::var("LOG_FILE_PATH") {
            config.logging.file = log_file;
        }

        if let Ok(log_level) = std::env::var("LOG_LEVEL") {
            config.logging.level = Some(log_level);
        }

        Ok(config)
    }
}

fn parse_optional_env<T>(key: &str) -> anyhow::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(v) => Ok(Some(
            v.trim()
                .parse::<T>()
                .with_context(|| format!("{key} must be a valid value"))?,
        )),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn locate_default_config() -> Option<PathBuf> {
    [
        PathBuf::from("config/config.yaml"),
        PathBuf::from("../config/config.yaml"),
    ]
    .into_iter()
    .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_detector_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.dedup.title_threshold, 0.9);
        assert_eq!(config.dedup.general_threshold, 0.85);
        assert!(!config.dedup.normalize_urls);
        assert_eq!(config.logging.level.as_deref(), Some("info"));
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "dedup:\n  general_threshold: 0.7\nstore:\n  file: /tmp/leads.json"
        )
        .unwrap();

        let config = AppConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.dedup.general_threshold, 0.7);
        assert_eq!(config.dedup.title_threshold, 0.9);
        assert_eq!(config.store.file, "/tmp/leads.json");
        assert_eq!(config.input.batch_file, "data/incoming.json");
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dedup: [not, a, map").unwrap();

        let err = AppConfig::load_from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }
}
