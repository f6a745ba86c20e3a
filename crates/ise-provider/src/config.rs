//! # Provider Configuration
//!
//! Connection settings for the ISE node, loaded from an optional TOML file
//! and then overridden by `ISE_*` environment variables.
//!
//! ```toml
//! base_url = "https://ise.example.com"
//! username = "admin"
//! password = "secret"
//! debug = false
//! ssl_verify = true
//! use_api_gateway = false
//! use_csrf_token = false
//! ```
//!
//! | Variable | Field |
//! |----------|-------|
//! | `ISE_BASE_URL` | `base_url` |
//! | `ISE_USERNAME` | `username` |
//! | `ISE_PASSWORD` | `password` |
//! | `ISE_DEBUG` | `debug` |
//! | `ISE_SSL_VERIFY` | `ssl_verify` |
//! | `ISE_USE_API_GATEWAY` | `use_api_gateway` |
//! | `ISE_USE_CSRF_TOKEN` | `use_csrf_token` |

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Settings handed to the SDK client.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    /// Raises the default log level to `debug`.
    pub debug: bool,
    pub ssl_verify: bool,
    pub use_api_gateway: bool,
    pub use_csrf_token: bool,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: String::new(),
            password: String::new(),
            debug: false,
            ssl_verify: true,
            use_api_gateway: false,
            use_csrf_token: false,
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("debug", &self.debug)
            .field("ssl_verify", &self.ssl_verify)
            .field("use_api_gateway", &self.use_api_gateway)
            .field("use_csrf_token", &self.use_csrf_token)
            .finish()
    }
}

impl ProviderConfig {
    /// Loads the file at `path` (if any), applies the process environment,
    /// and validates the result.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let content =
                    fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
                Self::from_toml(&content)?
            }
            None => Self::default(),
        };
        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Overrides fields from `ISE_*` variables resolved through `lookup`.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        for (key, field) in [
            ("ISE_BASE_URL", &mut self.base_url),
            ("ISE_USERNAME", &mut self.username),
            ("ISE_PASSWORD", &mut self.password),
        ] {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        }
        for (key, field) in [
            ("ISE_DEBUG", &mut self.debug),
            ("ISE_SSL_VERIFY", &mut self.ssl_verify),
            ("ISE_USE_API_GATEWAY", &mut self.use_api_gateway),
            ("ISE_USE_CSRF_TOKEN", &mut self.use_csrf_token),
        ] {
            if let Some(value) = lookup(key) {
                *field = parse_flag(key, &value)?;
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.is_empty() {
            return Err(ConfigError::Invalid("base_url must be set".to_string()));
        }
        let url = url::Url::parse(&self.base_url)
            .map_err(|e| ConfigError::Invalid(format!("base_url is not a valid URL: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "base_url must use http or https, got {}",
                url.scheme()
            )));
        }
        if self.username.is_empty() {
            return Err(ConfigError::Invalid("username must be set".to_string()));
        }
        if self.password.is_empty() {
            return Err(ConfigError::Invalid("password must be set".to_string()));
        }
        Ok(())
    }

    /// Base URL of the ERS configuration API on this node.
    pub fn ers_url(&self) -> String {
        format!("{}/ers/config/", self.base_url.trim_end_matches('/'))
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid(format!(
            "{key} must be a boolean, got `{other}`"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = ProviderConfig::from_toml(
            r#"
            base_url = "https://ise-a.example.com"
            username = "admin"
            password = "from-file"
            "#,
        )
        .unwrap();

        config
            .apply_env(env(&[("ISE_PASSWORD", "from-env"), ("ISE_SSL_VERIFY", "false")]))
            .unwrap();

        assert_eq!(config.password, "from-env");
        assert!(!config.ssl_verify);
        assert_eq!(config.base_url, "https://ise-a.example.com");
        config.validate().unwrap();
    }

    #[test]
    fn debug_output_hides_password() {
        let config = ProviderConfig {
            password: "hunter2".into(),
            ..ProviderConfig::default()
        };
        assert!(!format!("{config:?}").contains("hunter2"));
    }

    #[test]
    fn rejects_bad_values() {
        let mut config = ProviderConfig::default();
        assert!(matches!(
            config.apply_env(env(&[("ISE_DEBUG", "maybe")])),
            Err(ConfigError::Invalid(_))
        ));

        config.base_url = "ftp://ise".into();
        config.username = "admin".into();
        config.password = "secret".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            ProviderConfig::from_toml("unknown = 1"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn ers_url_joins_base() {
        let config = ProviderConfig {
            base_url: "https://ise.example.com/".into(),
            ..ProviderConfig::default()
        };
        assert_eq!(config.ers_url(), "https://ise.example.com/ers/config/");
    }
}
