//! TOML-based configuration for usertag.
//!
//! Every section is optional; a missing file section falls back to the
//! defaults used by the login pages (cookie `full_usernames`, 30 days,
//! four-digit discriminators).

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::ConfigError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level application configuration loaded from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Username cache cookie settings.
    #[serde(default)]
    pub cookie: CookieConfig,

    /// Account naming settings.
    #[serde(default)]
    pub accounts: AccountConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,
}

// ---------------------------------------------------------------------------
// Cookie
// ---------------------------------------------------------------------------

/// `SameSite` attribute of the cache cookie.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Settings for the cookie holding the base -> full username mapping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Cookie name (default `full_usernames`).
    #[serde(default = "default_cookie_name")]
    pub name: String,

    /// Lifetime in days (default 30).
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// Cookie path (default `/`).
    #[serde(default = "default_path")]
    pub path: String,

    /// Send only over HTTPS.
    #[serde(default = "default_true")]
    pub secure: bool,

    /// Hide from scripts. Off by default: the login page script reads it.
    #[serde(default)]
    pub http_only: bool,

    #[serde(default)]
    pub same_site: SameSite,
}

fn default_cookie_name() -> String {
    "full_usernames".into()
}
fn default_max_age_days() -> u32 {
    30
}
fn default_path() -> String {
    "/".into()
}
fn default_true() -> bool {
    true
}

impl CookieConfig {
    /// Lifetime in seconds, as used for `Max-Age`.
    pub fn max_age_secs(&self) -> u64 {
        u64::from(self.max_age_days) * 24 * 60 * 60
    }
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: default_cookie_name(),
            max_age_days: default_max_age_days(),
            path: default_path(),
            secure: true,
            http_only: false,
            same_site: SameSite::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Account naming configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Administrator login name. The admin account has no discriminator.
    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    /// Highest discriminator handed out at registration (default 9999).
    #[serde(default = "default_discriminator_max")]
    pub discriminator_max: u16,

    /// Zero-padded width of rendered discriminators (default 4).
    #[serde(default = "default_discriminator_width")]
    pub discriminator_width: usize,
}

fn default_admin_username() -> String {
    "admin".into()
}
fn default_discriminator_max() -> u16 {
    9999
}
fn default_discriminator_width() -> usize {
    4
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            discriminator_max: default_discriminator_max(),
            discriminator_width: default_discriminator_width(),
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum tracing level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Load an [`AppConfig`] from a TOML file at the given path.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "loading configuration");

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        debug!("configuration parsed successfully");
        Ok(config)
    }

    /// Validate that all fields are sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = &self.cookie.name;
        if name.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "cookie.name".into(),
                detail: "cookie name must not be empty".into(),
            });
        }
        if name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '=' | ';' | ','))
        {
            return Err(ConfigError::InvalidValue {
                field: "cookie.name".into(),
                detail: format!("'{}' contains characters not allowed in a cookie name", name),
            });
        }
        if self.cookie.max_age_days == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cookie.max_age_days".into(),
                detail: "cookie lifetime must be > 0".into(),
            });
        }
        if self.cookie.same_site == SameSite::None && !self.cookie.secure {
            return Err(ConfigError::InvalidValue {
                field: "cookie.same_site".into(),
                detail: "SameSite=None requires secure = true".into(),
            });
        }
        if self.accounts.admin_username.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "accounts.admin_username".into(),
                detail: "admin username must not be empty".into(),
            });
        }
        if self.accounts.admin_username.contains(crate::identity::SEPARATOR) {
            return Err(ConfigError::InvalidValue {
                field: "accounts.admin_username".into(),
                detail: "admin username must not contain '#'".into(),
            });
        }
        if !(1..=9999).contains(&self.accounts.discriminator_max) {
            return Err(ConfigError::InvalidValue {
                field: "accounts.discriminator_max".into(),
                detail: "must be between 1 and 9999".into(),
            });
        }
        if !(1..=8).contains(&self.accounts.discriminator_width) {
            return Err(ConfigError::InvalidValue {
                field: "accounts.discriminator_width".into(),
                detail: "must be between 1 and 8".into(),
            });
        }

        Ok(())
    }

    /// Convenience: load and validate in one call.
    pub fn load_and_validate<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::load_from_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate the file if given, otherwise use the defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load_and_validate(p),
            None => {
                debug!("no configuration file given, using defaults");
                Ok(Self::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_toml() -> &'static str {
        r#"
[cookie]
name = "known_users"
max_age_days = 7
path = "/auth"
secure = true
http_only = false
same_site = "lax"

[accounts]
admin_username = "root"
discriminator_max = 999
discriminator_width = 3

[log]
level = "debug"
"#
    }

    #[test]
    fn test_parse_full_config() {
        let config: AppConfig = toml::from_str(sample_toml()).expect("failed to parse toml");
        assert_eq!(config.cookie.name, "known_users");
        assert_eq!(config.cookie.max_age_secs(), 7 * 86_400);
        assert_eq!(config.cookie.same_site, SameSite::Lax);
        assert_eq!(config.accounts.admin_username, "root");
        assert_eq!(config.accounts.discriminator_width, 3);
        assert_eq!(config.log.level, "debug");
        config.validate().unwrap();
    }

    #[test]
    fn test_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.cookie.name, "full_usernames");
        assert_eq!(config.cookie.max_age_secs(), 2_592_000);
        assert_eq!(config.cookie.path, "/");
        assert!(config.cookie.secure);
        assert!(!config.cookie.http_only);
        assert_eq!(config.cookie.same_site, SameSite::Strict);
        assert_eq!(config.accounts.admin_username, "admin");
        assert_eq!(config.accounts.discriminator_max, 9999);
        assert_eq!(config.accounts.discriminator_width, 4);
        assert_eq!(config.log.level, "warn");
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("usertag.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(sample_toml().as_bytes()).unwrap();

        let config = AppConfig::load_and_validate(&path).expect("load failed");
        assert_eq!(config.cookie.path, "/auth");
    }

    #[test]
    fn test_file_not_found() {
        let result = AppConfig::load_from_file("/nonexistent/usertag.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_load_or_default_without_path() {
        let config = AppConfig::load_or_default(None::<&Path>).unwrap();
        assert_eq!(config.cookie.name, "full_usernames");
    }

    #[test]
    fn test_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[cookie\nname = ").unwrap();

        let result = AppConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validate_rejects_bad_cookie_name() {
        let mut config = AppConfig::default();
        config.cookie.name = "full usernames".into();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "cookie.name"
        ));

        config.cookie.name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_insecure_same_site_none() {
        let mut config = AppConfig::default();
        config.cookie.same_site = SameSite::None;
        config.cookie.secure = false;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "cookie.same_site"
        ));
    }

    #[test]
    fn test_validate_rejects_discriminator_range() {
        let mut config = AppConfig::default();
        config.accounts.discriminator_max = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.accounts.discriminator_width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. })
                if field == "accounts.discriminator_width"
        ));
    }

    #[test]
    fn test_validate_rejects_admin_with_separator() {
        let mut config = AppConfig::default();
        config.accounts.admin_username = "admin#0001".into();
        assert!(config.validate().is_err());
    }
}
