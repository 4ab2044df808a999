//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use pageturn_commerce::money::Currency;
use pageturn_core::{find_config, AppConfig};
use pageturn_db::{Db, SqliteCatalogStore};

use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Application configuration.
    pub config: AppConfig,
    /// File the configuration came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context, reading the config file if one is given or found.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let config_path = match config_path {
            Some(path) => Some(resolve(&cwd, path)),
            None => find_config(&cwd),
        };
        let config = AppConfig::load(config_path.as_deref()).with_context(|| match &config_path {
            Some(path) => format!("Failed to load config from {}", path.display()),
            None => "Failed to load default config".to_string(),
        })?;

        Ok(Self {
            config,
            config_path,
            output,
            cwd,
        })
    }

    /// The configured store currency.
    pub fn currency(&self) -> Result<Currency> {
        Ok(self.config.catalog.currency()?)
    }

    /// Open the configured database.
    pub async fn open_db(&self) -> Result<Db> {
        let db = &self.config.database;
        self.output.debug(&format!("Opening database {}", db.url));
        Db::open(&db.url, db.max_connections)
            .await
            .with_context(|| format!("Failed to open database {}", db.url))
    }

    /// Open the configured database as a catalog store.
    pub async fn store(&self) -> Result<SqliteCatalogStore> {
        let db = self.open_db().await?;
        Ok(SqliteCatalogStore::new(&db, self.currency()?))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        resolve(&self.cwd, path)
    }
}

fn resolve(cwd: &Path, path: &str) -> PathBuf {
    let path = PathBuf::from(path);
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}
