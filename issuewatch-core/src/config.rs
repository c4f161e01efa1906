//! Runtime configuration.
//!
//! An [`AppConfig`] is assembled once at startup from defaults, an optional
//! TOML file and command-line flags, then handed to the services that need it.

use crate::error::ConfigError;
use crate::types::{WebhookKind, WebhookTarget};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_SOURCE_HOST: &str = "https://github.com";
pub const DEFAULT_CACHE_FILE: &str = ".local/cache/issue_cache.txt";
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(10 * 60);
pub const DEFAULT_NOTIFY_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub github_repo: String,
    pub discord_hook_url: Option<String>,
    pub google_chat_hook_url: Option<String>,
    pub refresh_interval: Duration,
    pub cache_file: PathBuf,
    /// Pause after each newly seen issue, to stay under webhook rate limits.
    pub notify_delay: Duration,
    pub source_host: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            github_repo: String::new(),
            discord_hook_url: None,
            google_chat_hook_url: None,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            notify_delay: DEFAULT_NOTIFY_DELAY,
            source_host: DEFAULT_SOURCE_HOST.to_string(),
        }
    }
}

/// Keys accepted in a TOML configuration file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub github_repo: Option<String>,
    pub discord_hook_url: Option<String>,
    pub google_chat_hook_url: Option<String>,
    #[serde(default, with = "humantime_serde")]
    pub refresh_interval: Option<Duration>,
    pub cache_file: Option<PathBuf>,
    #[serde(default, with = "humantime_serde")]
    pub notify_delay: Option<Duration>,
    pub source_host: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::Unreadable {
                path: path.display().to_string(),
                reason: e.to_string(),
            },
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

impl AppConfig {
    /// Overlays the values present in `file` onto `self`.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(repo) = file.github_repo {
            self.github_repo = repo;
        }
        if file.discord_hook_url.is_some() {
            self.discord_hook_url = file.discord_hook_url;
        }
        if file.google_chat_hook_url.is_some() {
            self.google_chat_hook_url = file.google_chat_hook_url;
        }
        if let Some(interval) = file.refresh_interval {
            self.refresh_interval = interval;
        }
        if let Some(cache_file) = file.cache_file {
            self.cache_file = cache_file;
        }
        if let Some(delay) = file.notify_delay {
            self.notify_delay = delay;
        }
        if let Some(host) = file.source_host {
            self.source_host = host;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.github_repo.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "github_repo".to_string(),
            });
        }
        check_url("github_repo", &self.github_repo)?;
        check_url("source_host", &self.source_host)?;

        let targets = self.webhook_targets();
        if targets.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one webhook URL (discord_hook_url or google_chat_hook_url) is required"
                    .to_string(),
            });
        }
        for target in &targets {
            let field = match target.kind {
                WebhookKind::Discord => "discord_hook_url",
                WebhookKind::GoogleChat => "google_chat_hook_url",
            };
            check_url(field, &target.url)?;
        }

        if self.refresh_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                field: "refresh_interval".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Configured webhook targets, Discord first. Empty URLs count as unset.
    pub fn webhook_targets(&self) -> Vec<WebhookTarget> {
        [
            (WebhookKind::Discord, &self.discord_hook_url),
            (WebhookKind::GoogleChat, &self.google_chat_hook_url),
        ]
        .into_iter()
        .filter_map(|(kind, url)| match url {
            Some(url) if !url.trim().is_empty() => Some(WebhookTarget::new(kind, url.trim())),
            _ => None,
        })
        .collect()
    }
}

fn check_url(field: &str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value.trim())
        .map(|_| ())
        .map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        })
}

/// Parses durations such as `10m`, `30s`, `500ms` or `1h 30m`.
pub fn parse_duration(input: &str) -> Result<Duration, ConfigError> {
    humantime::parse_duration(input.trim()).map_err(|e| ConfigError::InvalidValue {
        field: "duration".to_string(),
        value: format!("{input} ({e})"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            github_repo: "https://github.com/o/r/issues".to_string(),
            discord_hook_url: Some("https://discord.com/api/webhooks/1/abc".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("10m").unwrap(), Duration::from_secs(600));
        assert_eq!(parse_duration("30s").unwrap(), Duration::from_secs(30));
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
        assert_eq!(parse_duration("1h 30m").unwrap(), Duration::from_secs(5400));
        assert_eq!(parse_duration(" 2h ").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_parse_duration_rejects_garbage() {
        for input in ["", "10", "m", "10x", "-3s"] {
            assert!(parse_duration(input).is_err(), "Expected '{}' to fail", input);
        }
    }

    #[test]
    fn test_parse_duration_overflow_is_an_error() {
        for input in [
            "307445734561825861m",
            "18446744073709551615s18446744073709551615s",
            "99999999999999999999999h",
        ] {
            assert!(
                matches!(parse_duration(input), Err(ConfigError::InvalidValue { .. })),
                "Expected '{}' to be rejected",
                input
            );
        }
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.refresh_interval, Duration::from_secs(600));
        assert_eq!(config.cache_file, PathBuf::from(".local/cache/issue_cache.txt"));
        assert_eq!(config.notify_delay, Duration::from_millis(500));
        assert_eq!(config.source_host, "https://github.com");
    }

    #[test]
    fn test_validate_accepts_single_webhook() {
        assert!(valid_config().validate().is_ok());

        let config = AppConfig {
            discord_hook_url: None,
            google_chat_hook_url: Some("https://chat.googleapis.com/v1/spaces/x".to_string()),
            ..valid_config()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_repo() {
        let config = AppConfig {
            github_repo: String::new(),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingField { field }) if field == "github_repo"
        ));
    }

    #[test]
    fn test_validate_requires_a_webhook() {
        let config = AppConfig {
            discord_hook_url: Some(String::new()),
            google_chat_hook_url: None,
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_bad_webhook_url() {
        let config = AppConfig {
            google_chat_hook_url: Some("not a url".to_string()),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "google_chat_hook_url"
        ));
    }

    #[test]
    fn test_webhook_targets_order() {
        let config = AppConfig {
            google_chat_hook_url: Some("https://chat.example/hook".to_string()),
            ..valid_config()
        };
        let kinds: Vec<_> = config.webhook_targets().iter().map(|t| t.kind).collect();
        assert_eq!(kinds, vec![WebhookKind::Discord, WebhookKind::GoogleChat]);
    }

    #[test]
    fn test_apply_file() {
        let file = FileConfig::from_toml_str(
            r#"
            github_repo = "https://github.com/o/r/issues"
            google_chat_hook_url = "https://chat.example/hook"
            refresh_interval = "5m"
            cache_file = "/tmp/seen.txt"
            "#,
        )
        .unwrap();

        let mut config = AppConfig::default();
        config.apply_file(file);

        assert_eq!(config.github_repo, "https://github.com/o/r/issues");
        assert_eq!(config.refresh_interval, Duration::from_secs(300));
        assert_eq!(config.cache_file, PathBuf::from("/tmp/seen.txt"));
        assert_eq!(config.notify_delay, DEFAULT_NOTIFY_DELAY);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_rejects_bad_duration() {
        let result = FileConfig::from_toml_str("refresh_interval = \"307445734561825861m\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        let result = FileConfig::from_toml_str("notify_delay = \"soon\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_file_rejects_unknown_keys() {
        let result = FileConfig::from_toml_str("github_repository = \"x\"");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
