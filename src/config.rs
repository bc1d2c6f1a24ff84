//! Runtime configuration.
//!
//! Values are layered: built-in defaults, then the TOML config file, then
//! `STATION_*` environment variables, then command-line flags. A missing
//! config file is not an error; an unreadable or malformed one is.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::remote::ProjectId;

pub const ENV_STATION_CONFIG: &str = "STATION_CONFIG";
pub const ENV_STATION_API_URL: &str = "STATION_API_URL";
pub const ENV_STATION_CHAT_URL: &str = "STATION_CHAT_URL";
pub const ENV_STATION_PROJECT: &str = "STATION_PROJECT";

const APP_DIR_NAME: &str = "station";
const CONFIG_FILE_NAME: &str = "config.toml";
const LOG_FILE_NAME: &str = "station.log";
const DEFAULT_API_URL: &str = "http://localhost:8080";
const DEFAULT_CHAT_URL: &str = "http://localhost:5000/chat";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Origin of the project backend; API paths are appended to it.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Full URL of the chat endpoint.
    #[serde(default = "default_chat_url")]
    pub chat_url: String,
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            chat_url: default_chat_url(),
            project_id: None,
            request_timeout_secs: default_request_timeout_secs(),
            log_file: None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_owned()
}

fn default_chat_url() -> String {
    DEFAULT_CHAT_URL.to_owned()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Command-line values that take precedence over everything else.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub api_url: Option<String>,
    pub chat_url: Option<String>,
    pub project_id: Option<u64>,
}

/// `<config dir>/station`, if the platform has a config directory.
pub fn app_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Config file to read: the explicit path, else `$STATION_CONFIG`, else the
/// platform default.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env(ENV_STATION_CONFIG).filter(|p| !p.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    app_config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

impl Config {
    /// Load, layer and validate the configuration for this process.
    pub fn load(explicit: Option<&Path>, overrides: &ConfigOverrides) -> AppResult<Self> {
        let env = |key: &str| std::env::var(key).ok();
        let mut config = match resolve_config_path(explicit, env) {
            Some(path) => Self::from_file(&path, explicit.is_some())?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.apply_overrides(overrides);
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Read a config file. A missing file yields defaults unless `required`.
    pub fn from_file(path: &Path, required: bool) -> AppResult<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(AppError::ConfigRead {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&raw).map_err(|source| AppError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> AppResult<()> {
        if let Some(url) = env(ENV_STATION_API_URL) {
            self.api_url = url;
        }
        if let Some(url) = env(ENV_STATION_CHAT_URL) {
            self.chat_url = url;
        }
        if let Some(raw) = env(ENV_STATION_PROJECT) {
            let id = raw.trim().parse::<u64>().map_err(|_| {
                AppError::configuration(format!("{ENV_STATION_PROJECT} must be a project id, got '{raw}'"))
            })?;
            self.project_id = Some(ProjectId(id));
        }
        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(url) = &overrides.api_url {
            self.api_url = url.clone();
        }
        if let Some(url) = &overrides.chat_url {
            self.chat_url = url.clone();
        }
        if let Some(id) = overrides.project_id {
            self.project_id = Some(ProjectId(id));
        }
    }

    fn normalize(&mut self) {
        self.api_url = self.api_url.trim().trim_end_matches('/').to_owned();
        self.chat_url = self.chat_url.trim().to_owned();
    }

    pub fn validate(&self) -> AppResult<()> {
        validate_http_url("api_url", &self.api_url)?;
        validate_http_url("chat_url", &self.chat_url)?;
        if self.request_timeout_secs == 0 {
            return Err(AppError::configuration(
                "request_timeout_secs must be greater than zero",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Where the log file goes: `log_file` if set, else next to the config.
    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            app_config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(LOG_FILE_NAME)
        })
    }
}

fn validate_http_url(field: &str, value: &str) -> AppResult<()> {
    let url = reqwest::Url::parse(value).map_err(|e| {
        AppError::configuration(format!("{field} is not a valid URL ('{value}'): {e}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") || !url.has_host() {
        return Err(AppError::configuration(format!(
            "{field} must be an http(s) URL, got '{value}'"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn missing_optional_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::from_file(&dir.path().join("absent.toml"), false).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = Config::from_file(&dir.path().join("absent.toml"), true);
        assert!(matches!(result, Err(AppError::ConfigRead { .. })));
    }

    #[test]
    fn file_values_are_read() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
api_url = "https://board.example.com/"
project_id = 7
request_timeout_secs = 5
"#,
        );
        let mut config = Config::from_file(&path, true).unwrap();
        config.normalize();
        assert_eq!(config.api_url, "https://board.example.com");
        assert_eq!(config.chat_url, DEFAULT_CHAT_URL);
        assert_eq!(config.project_id, Some(ProjectId(7)));
        assert_eq!(config.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "api_url = [1, 2");
        assert!(matches!(
            Config::from_file(&path, true),
            Err(AppError::ConfigParse { .. })
        ));
        let path = write_config(&dir, "colour = \"blue\"");
        assert!(matches!(
            Config::from_file(&path, true),
            Err(AppError::ConfigParse { .. })
        ));
    }

    #[test]
    fn flags_beat_env_beat_file() {
        let mut config = Config {
            api_url: "http://file:1".to_string(),
            project_id: Some(ProjectId(1)),
            ..Config::default()
        };
        config
            .apply_env(env_from(&[
                (ENV_STATION_API_URL, "http://env:2"),
                (ENV_STATION_CHAT_URL, "http://env:2/chat"),
                (ENV_STATION_PROJECT, "2"),
            ]))
            .unwrap();
        config.apply_overrides(&ConfigOverrides {
            api_url: Some("http://flag:3".to_string()),
            chat_url: None,
            project_id: Some(3),
        });

        assert_eq!(config.api_url, "http://flag:3");
        assert_eq!(config.chat_url, "http://env:2/chat");
        assert_eq!(config.project_id, Some(ProjectId(3)));
    }

    #[test]
    fn bad_project_env_is_rejected() {
        let mut config = Config::default();
        let result = config.apply_env(env_from(&[(ENV_STATION_PROJECT, "roadmap")]));
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let config = Config {
            api_url: "ftp://example.com".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            chat_url: "http://".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        for bad in [
            "http://exa mple.com",
            "http://:::",
            "https://?x",
            "http://host:99999",
            "localhost:8080",
        ] {
            let config = Config {
                api_url: bad.to_string(),
                ..Config::default()
            };
            assert!(
                matches!(config.validate(), Err(AppError::Configuration(_))),
                "{bad} should be rejected"
            );
        }

        let config = Config {
            request_timeout_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        assert!(Config::default().validate().is_ok());
        let config = Config {
            api_url: "https://board.example.com:8443".to_string(),
            chat_url: "http://10.0.0.5:5000/chat".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_path_resolution_order() {
        let explicit = PathBuf::from("/tmp/explicit.toml");
        let env = env_from(&[(ENV_STATION_CONFIG, "/tmp/env.toml")]);
        assert_eq!(resolve_config_path(Some(explicit.as_path()), &env), Some(explicit.clone()));
        assert_eq!(
            resolve_config_path(None, &env),
            Some(PathBuf::from("/tmp/env.toml"))
        );
        let fallback = resolve_config_path(None, env_from(&[]));
        assert_eq!(fallback, app_config_dir().map(|d| d.join(CONFIG_FILE_NAME)));
    }

    #[test]
    fn log_path_prefers_configured_file() {
        let config = Config {
            log_file: Some(PathBuf::from("/tmp/station-test.log")),
            ..Config::default()
        };
        assert_eq!(config.log_path(), PathBuf::from("/tmp/station-test.log"));
        assert!(Config::default().log_path().ends_with(LOG_FILE_NAME));
    }
}
