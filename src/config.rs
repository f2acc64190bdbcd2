use crate::dataset::{ProcessingConfig, UploadTarget};
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Errors encountered while assembling the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required setting was provided neither as a flag nor as an environment variable.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Setting contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
    /// Processing config file could not be read or parsed.
    #[error("Failed to load processing config from {path}: {reason}")]
    ProcessConfig {
        /// File that was requested.
        path: PathBuf,
        /// Read or parse failure.
        reason: String,
    },
}

/// Values supplied on the command line; each one takes precedence over its environment variable.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Overrides `DATASET_API_BASE`.
    pub api_base: Option<String>,
    /// Overrides `DATASET_ID`.
    pub dataset_id: Option<String>,
    /// Overrides `DATASET_API_KEY`.
    pub api_key: Option<String>,
    /// Overrides `UPLOAD_ROOT`.
    pub root: Option<PathBuf>,
    /// Overrides `UPLOAD_RECURSIVE`.
    pub recursive: Option<bool>,
    /// Overrides `DATASET_PROCESS_CONFIG`.
    pub process_config: Option<PathBuf>,
    /// Overrides `DATASET_TIMEOUT_SECS`.
    pub timeout_secs: Option<u64>,
}

/// Everything a run needs, resolved once at process start.
#[derive(Debug)]
pub struct Config {
    /// Destination API, dataset, and credential.
    pub target: UploadTarget,
    /// Directory whose files are uploaded.
    pub root: PathBuf,
    /// Whether subdirectories are descended into.
    pub recursive: bool,
    /// Processing config shared by every upload.
    pub processing: ProcessingConfig,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
}

impl Config {
    /// Merge command-line overrides with the process environment.
    pub fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::load_with(overrides, |key| env::var(key).ok())
    }

    /// Merge overrides with settings resolved through `lookup`.
    pub fn load_with<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |value: Option<String>, key: &str| {
            value
                .filter(|value| !value.trim().is_empty())
                .or_else(|| setting(key))
                .ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
        };

        let target = UploadTarget {
            api_base: required(overrides.api_base, "DATASET_API_BASE")?,
            dataset_id: required(overrides.dataset_id, "DATASET_ID")?,
            api_key: required(overrides.api_key, "DATASET_API_KEY")?,
        };

        let root = match overrides.root {
            Some(root) => root,
            None => setting("UPLOAD_ROOT")
                .map(PathBuf::from)
                .ok_or_else(|| ConfigError::MissingVariable("UPLOAD_ROOT".into()))?,
        };

        let recursive = match overrides.recursive {
            Some(recursive) => recursive,
            None => setting("UPLOAD_RECURSIVE")
                .map(|value| {
                    parse_bool(&value)
                        .ok_or_else(|| ConfigError::InvalidValue("UPLOAD_RECURSIVE".into()))
                })
                .transpose()?
                .unwrap_or(true),
        };

        let processing = match overrides
            .process_config
            .or_else(|| setting("DATASET_PROCESS_CONFIG").map(PathBuf::from))
        {
            Some(path) => load_processing_config(&path)?,
            None => ProcessingConfig::default(),
        };

        let timeout_secs = match overrides.timeout_secs {
            Some(secs) => Some(secs),
            None => setting("DATASET_TIMEOUT_SECS")
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue("DATASET_TIMEOUT_SECS".into()))
                })
                .transpose()?,
        };

        let config = Self {
            target,
            root,
            recursive,
            processing,
            timeout: timeout_secs.map(Duration::from_secs),
        };

        tracing::debug!(
            api_base = %config.target.api_base,
            dataset_id = %config.target.dataset_id,
            root = %config.root.display(),
            recursive = config.recursive,
            timeout = ?config.timeout,
            "Loaded configuration"
        );

        Ok(config)
    }
}

/// Read a processing config document from a JSON file.
pub fn load_processing_config(path: &Path) -> Result<ProcessingConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::ProcessConfig {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|err| ConfigError::ProcessConfig {
        path: path.to_path_buf(),
        reason: err.to_string(),
    })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{IndexingTechnique, ProcessMode};
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const BASE_ENV: &[(&str, &str)] = &[
        ("DATASET_API_BASE", "localhost"),
        ("DATASET_ID", "b9379f84"),
        ("DATASET_API_KEY", "dataset-key"),
        ("UPLOAD_ROOT", "../output/"),
    ];

    #[test]
    fn loads_required_settings_from_environment() {
        let config =
            Config::load_with(ConfigOverrides::default(), env_of(BASE_ENV)).expect("config");

        assert_eq!(config.target.api_base, "localhost");
        assert_eq!(config.target.dataset_id, "b9379f84");
        assert_eq!(config.target.api_key, "dataset-key");
        assert_eq!(config.root, PathBuf::from("../output/"));
        assert!(config.recursive);
        assert_eq!(config.processing, ProcessingConfig::default());
        assert!(config.timeout.is_none());
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = ConfigOverrides {
            dataset_id: Some("other".into()),
            root: Some(PathBuf::from("/data")),
            recursive: Some(false),
            timeout_secs: Some(30),
            ..ConfigOverrides::default()
        };
        let config = Config::load_with(overrides, env_of(BASE_ENV)).expect("config");

        assert_eq!(config.target.dataset_id, "other");
        assert_eq!(config.root, PathBuf::from("/data"));
        assert!(!config.recursive);
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn blank_required_value_is_missing() {
        let error = Config::load_with(
            ConfigOverrides::default(),
            env_of(&[
                ("DATASET_API_BASE", "localhost"),
                ("DATASET_ID", "  "),
                ("DATASET_API_KEY", "key"),
                ("UPLOAD_ROOT", "."),
            ]),
        )
        .expect_err("blank dataset id");

        assert!(matches!(error, ConfigError::MissingVariable(key) if key == "DATASET_ID"));
    }

    #[test]
    fn blank_overrides_fall_back_to_environment() {
        let overrides = ConfigOverrides {
            api_key: Some(String::new()),
            dataset_id: Some("  ".into()),
            ..ConfigOverrides::default()
        };
        let config = Config::load_with(overrides, env_of(BASE_ENV)).expect("config");

        assert_eq!(config.target.api_key, "dataset-key");
        assert_eq!(config.target.dataset_id, "b9379f84");
    }

    #[test]
    fn blank_override_without_environment_is_missing() {
        let overrides = ConfigOverrides {
            api_key: Some(" ".into()),
            ..ConfigOverrides::default()
        };
        let error = Config::load_with(
            overrides,
            env_of(&[
                ("DATASET_API_BASE", "localhost"),
                ("DATASET_ID", "ds"),
                ("UPLOAD_ROOT", "."),
            ]),
        )
        .expect_err("blank api key");

        assert!(matches!(error, ConfigError::MissingVariable(key) if key == "DATASET_API_KEY"));
    }

    #[test]
    fn invalid_recursive_flag_is_rejected() {
        let mut pairs = BASE_ENV.to_vec();
        pairs.push(("UPLOAD_RECURSIVE", "sometimes"));

        let error =
            Config::load_with(ConfigOverrides::default(), env_of(&pairs)).expect_err("invalid");

        assert!(matches!(error, ConfigError::InvalidValue(key) if key == "UPLOAD_RECURSIVE"));
    }

    #[test]
    fn processing_config_can_be_loaded_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rules.json");
        std::fs::write(
            &path,
            r#"{
                "indexing_technique": "economy",
                "process_rule": {
                    "rules": {
                        "pre_processing_rules": [{"id": "remove_extra_spaces", "enabled": false}],
                        "segmentation": {"separator": "\n\n", "max_tokens": 1000}
                    },
                    "mode": "custom"
                }
            }"#,
        )
        .expect("write rules");

        let overrides = ConfigOverrides {
            process_config: Some(path),
            ..ConfigOverrides::default()
        };
        let config = Config::load_with(overrides, env_of(BASE_ENV)).expect("config");

        assert_eq!(
            config.processing.indexing_technique,
            IndexingTechnique::Economy
        );
        assert_eq!(config.processing.process_rule.mode, ProcessMode::Custom);
        assert_eq!(
            config.processing.process_rule.rules.segmentation.max_tokens,
            1000
        );
    }

    #[test]
    fn malformed_processing_config_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("rules.json");
        std::fs::write(&path, "{ not json").expect("write rules");

        let error = load_processing_config(&path).expect_err("malformed");
        assert!(matches!(error, ConfigError::ProcessConfig { .. }));
    }
}
