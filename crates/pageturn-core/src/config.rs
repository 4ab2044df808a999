//! Application configuration.
//!
//! Sources, highest priority first:
//! 1. `PAGETURN_*` environment variables
//! 2. `pageturn.toml` (explicit path, or the nearest one walking up from the
//!    working directory)
//! 3. Built-in defaults

use std::path::{Path, PathBuf};

use pageturn_commerce::money::Currency;
use pageturn_commerce::search::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::ConfigError;

/// File names searched for, in order, in each directory.
pub const CONFIG_FILE_NAMES: [&str; 2] = ["pageturn.toml", ".pageturn.toml"];

pub const DATABASE_URL_ENV_VAR: &str = "PAGETURN_DATABASE_URL";
pub const SECRET_KEY_ENV_VAR: &str = "PAGETURN_SECRET_KEY";
pub const TOKEN_EXPIRE_ENV_VAR: &str = "PAGETURN_TOKEN_EXPIRE_MINUTES";
pub const LOG_LEVEL_ENV_VAR: &str = "PAGETURN_LOG_LEVEL";

const DEFAULT_SECRET_KEY: &str = "default_secret_key_change_me";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Database connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sqlx connection URL, e.g. `sqlite://pageturn.db`.
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://pageturn.db".to_string(),
            max_connections: 5,
        }
    }
}

/// Catalog behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// ISO code of the currency all prices are stored in.
    pub currency: String,

    /// Page size used when a listing request does not give one.
    pub default_page_size: i64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            currency: Currency::default().code().to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl CatalogConfig {
    /// The configured currency.
    pub fn currency(&self) -> Result<Currency, ConfigError> {
        Currency::from_code(&self.currency).ok_or_else(|| {
            ConfigError::Invalid(format!("unknown currency code: {:?}", self.currency))
        })
    }
}

/// Token settings. The bookstore only consumes verified user ids, but the
/// values are kept here so every process reads them from one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub secret_key: String,
    pub algorithm: String,
    pub access_token_expire_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: DEFAULT_SECRET_KEY.to_string(),
            algorithm: "HS256".to_string(),
            access_token_expire_minutes: 30,
        }
    }
}

impl AuthConfig {
    /// Check if the built-in development secret is still in use.
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (for development).
    #[default]
    Human,
    /// JSON format (for log aggregation).
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Human => "human",
            LogFormat::Json => "json",
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, e.g. `info` or `pageturn_db=debug,info`.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Human,
        }
    }
}

impl AppConfig {
    /// Load, apply environment overrides and validate.
    ///
    /// With no explicit path, the nearest config file above the working
    /// directory is used; if there is none the defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match std::env::current_dir().ok().and_then(|cwd| find_config(&cwd)) {
                Some(found) => Self::from_file(&found)?,
                None => {
                    debug!("no config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;

        if config.auth.uses_default_secret() {
            warn!("using the default secret key; set {SECRET_KEY_ENV_VAR} in production");
        }
        Ok(config)
    }

    /// Read a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|message| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        })?;
        debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Parse TOML text.
    pub fn from_toml(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Apply overrides looked up through `var`.
    pub fn apply_env_overrides<F>(&mut self, var: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = var(DATABASE_URL_ENV_VAR) {
            self.database.url = url;
        }

        if let Some(key) = var(SECRET_KEY_ENV_VAR) {
            self.auth.secret_key = key;
        }

        if let Some(minutes) = var(TOKEN_EXPIRE_ENV_VAR) {
            self.auth.access_token_expire_minutes =
                minutes.trim().parse().map_err(|_| ConfigError::Env {
                    name: TOKEN_EXPIRE_ENV_VAR,
                    value: minutes.clone(),
                })?;
        }

        if let Some(level) = var(LOG_LEVEL_ENV_VAR) {
            self.logging.level = level;
        }

        Ok(())
    }

    /// Reject settings the application cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::Invalid("database.url must not be empty".into()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "database.max_connections must be at least 1".into(),
            ));
        }

        self.catalog.currency()?;
        if !(1..=MAX_PAGE_SIZE).contains(&self.catalog.default_page_size) {
            return Err(ConfigError::Invalid(format!(
                "catalog.default_page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        if self.auth.secret_key.is_empty() {
            return Err(ConfigError::Invalid("auth.secret_key must not be empty".into()));
        }
        if self.auth.access_token_expire_minutes <= 0 {
            return Err(ConfigError::Invalid(
                "auth.access_token_expire_minutes must be positive".into(),
            ));
        }

        Ok(())
    }
}

/// Find the nearest config file in `start` or one of its ancestors.
pub fn find_config(start: &Path) -> Option<PathBuf> {
    start.ancestors().find_map(|dir| {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|candidate| candidate.is_file())
    })
}

/// Starter `pageturn.toml` written by `pageturn init`.
pub fn generate_default_config(database_url: &str) -> String {
    format!(
        r#"# Pageturn configuration

[database]
url = "{database_url}"
max_connections = 5

[catalog]
currency = "USD"
default_page_size = {DEFAULT_PAGE_SIZE}

[auth]
# Override with {SECRET_KEY_ENV_VAR} outside development.
secret_key = "{DEFAULT_SECRET_KEY}"
algorithm = "HS256"
access_token_expire_minutes = 30

[logging]
level = "info"
format = "human"
"#
    )
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
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        config.validate().unwrap();
        assert_eq!(config.catalog.currency().unwrap(), Currency::USD);
        assert_eq!(config.catalog.default_page_size, 20);
        assert!(config.auth.uses_default_secret());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config = AppConfig::from_toml(
            r#"
[database]
url = "sqlite:///var/lib/pageturn/store.db"

[catalog]
currency = "eur"

[logging]
format = "json"
"#,
        )
        .unwrap();

        assert_eq!(config.database.url, "sqlite:///var/lib/pageturn/store.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.catalog.currency().unwrap(), Currency::EUR);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_generated_config_parses() {
        let config = AppConfig::from_toml(&generate_default_config("sqlite://shop.db")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.database.url, "sqlite://shop.db");
        assert_eq!(config, {
            let mut expected = AppConfig::default();
            expected.database.url = "sqlite://shop.db".into();
            expected
        });
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[
                (DATABASE_URL_ENV_VAR, "sqlite::memory:"),
                (SECRET_KEY_ENV_VAR, "s3cret"),
                (TOKEN_EXPIRE_ENV_VAR, " 90 "),
                (LOG_LEVEL_ENV_VAR, "debug"),
            ]))
            .unwrap();

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.auth.secret_key, "s3cret");
        assert_eq!(config.auth.access_token_expire_minutes, 90);
        assert_eq!(config.logging.level, "debug");
        assert!(!config.auth.uses_default_secret());
    }

    #[test]
    fn test_env_override_rejects_bad_number() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(env(&[(TOKEN_EXPIRE_ENV_VAR, "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { name: TOKEN_EXPIRE_ENV_VAR, .. }));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.database.url = "  ".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.catalog.currency = "XYZ".into();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.catalog.default_page_size = MAX_PAGE_SIZE + 1;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.secret_key.clear();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.auth.access_token_expire_minutes = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_find_config_walks_up() {
        let root = std::env::temp_dir().join(format!("pageturn-config-{}", std::process::id()));
        let nested = root.join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("pageturn.toml"), "[catalog]\ncurrency = \"GBP\"\n").unwrap();

        let found = find_config(&nested).unwrap();
        assert_eq!(found, root.join("pageturn.toml"));
        let config = AppConfig::load(Some(&found)).unwrap();
        assert_eq!(config.catalog.currency().unwrap(), Currency::GBP);

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_from_file_reports_path() {
        let err = AppConfig::from_file(Path::new("/nonexistent/pageturn.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/pageturn.toml"));
    }
}
