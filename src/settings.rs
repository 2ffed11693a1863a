use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::executor::{ExecutorConfig, FailureDetection, Toolchain};
use crate::model::Language;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("config file {} not found", .0.display())]
    Missing(PathBuf),
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Service configuration. Every field has a default, so a partial file (or
/// none at all) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct Settings {
    pub version: u32,
    pub host: String,
    pub port: u16,
    /// Languages accepted by the service; templates are loaded for these only.
    pub languages: Vec<Language>,
    pub templates_dir: PathBuf,
    /// Root for per-request scopes. None = OS temp dir.
    pub work_dir: Option<PathBuf>,
    pub compile_timeout_secs: u64,
    pub run_timeout_secs: u64,
    pub failure_detection: FailureDetection,
    pub toolchain: Toolchain,
}

const SETTINGS_VERSION: u32 = 1;

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            host: "127.0.0.1".into(),
            port: 8080,
            languages: Language::ALL.to_vec(),
            templates_dir: PathBuf::from(crate::paths::TEMPLATES_DIR),
            work_dir: None,
            compile_timeout_secs: 10,
            run_timeout_secs: 5,
            failure_detection: FailureDetection::default(),
            toolchain: Toolchain::default(),
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.languages.is_empty() {
            return Err(SettingsError::Invalid("`languages` must not be empty".into()));
        }
        if self.compile_timeout_secs == 0 || self.run_timeout_secs == 0 {
            return Err(SettingsError::Invalid("timeouts must be at least one second".into()));
        }
        Ok(())
    }

    pub fn is_enabled(&self, language: Language) -> bool {
        self.languages.contains(&language)
    }

    pub fn templates_root(&self) -> PathBuf {
        crate::paths::resolve_templates_dir(&self.templates_dir)
    }

    pub fn executor_config(&self) -> ExecutorConfig {
        ExecutorConfig {
            work_root: self
                .work_dir
                .clone()
                .unwrap_or_else(crate::paths::default_work_root),
            toolchain: self.toolchain.clone(),
            compile_timeout: Duration::from_secs(self.compile_timeout_secs),
            run_timeout: Duration::from_secs(self.run_timeout_secs),
            failure_detection: self.failure_detection,
        }
    }
}

/// Load settings from `explicit`, or from the default location if it
/// exists. Only an explicitly named file is required to exist.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    let settings = match explicit {
        Some(path) => read_settings(path)?,
        None => {
            let path = crate::paths::default_config_path();
            if path.exists() {
                read_settings(&path)?
            } else {
                log::debug!("no config at {}, using defaults", path.display());
                Settings::default()
            }
        }
    };
    settings.validate()?;
    Ok(settings)
}

fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    let data = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            SettingsError::Missing(path.to_path_buf())
        } else {
            SettingsError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let settings = serde_json::from_str(&data).map_err(|source| SettingsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded config from {}", path.display());
    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn write(dir: &Path, json: &str) -> PathBuf {
        let path = dir.join("crackview.json");
        std::fs::write(&path, json).unwrap();
        path
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            r#"{"port": 9000, "languages": ["python", "c++"], "toolchain": {"cpp": "g++"}}"#,
        );
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(settings.port, 9000);
        assert_eq!(settings.host, "127.0.0.1");
        assert_eq!(settings.languages, vec![Language::Python, Language::Cpp]);
        assert_eq!(settings.toolchain.cpp, "g++");
        assert_eq!(settings.toolchain.javac, "javac");
        assert_eq!(settings.failure_detection, FailureDetection::StderrHeuristic);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, SettingsError::Missing(_)));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "{ port: ");
        let err = load_settings(Some(&path)).unwrap_err();
        assert!(matches!(err, SettingsError::Json { .. }));
        assert!(err.to_string().contains("crackview.json"));
    }

    #[test]
    fn validation_rejects_empty_languages_and_zero_timeouts() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{"languages": []}"#);
        assert!(matches!(load_settings(Some(&path)), Err(SettingsError::Invalid(_))));
        let path = write(dir.path(), r#"{"run_timeout_secs": 0}"#);
        assert!(matches!(load_settings(Some(&path)), Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn exit_status_detection_is_selectable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), r#"{"failure_detection": "exit_status"}"#);
        let settings = load_settings(Some(&path)).unwrap();
        assert_eq!(
            settings.executor_config().failure_detection,
            FailureDetection::ExitStatus
        );
    }

    #[test]
    fn executor_config_uses_configured_work_dir() {
        let settings = Settings {
            work_dir: Some(PathBuf::from("/srv/crackview")),
            compile_timeout_secs: 3,
            ..Settings::default()
        };
        let config = settings.executor_config();
        assert_eq!(config.work_root, PathBuf::from("/srv/crackview"));
        assert_eq!(config.compile_timeout, Duration::from_secs(3));
    }

    #[test]
    fn defaults_serialize_round_trip() {
        let json = serde_json::to_string_pretty(&Settings::default()).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Settings::default());
    }
}
