//! Initialize a config file and the database schema.

use anyhow::{Context as _, Result};
use dialoguer::Confirm;
use pageturn_core::{generate_default_config, AppConfig, CONFIG_FILE_NAMES};
use pageturn_db::Db;

use super::InitArgs;
use crate::context::Context;

/// Run the init command.
pub async fn run(args: InitArgs, ctx: &Context) -> Result<()> {
    ctx.output.header("Initializing Pageturn");

    let config_path = ctx.cwd.join(CONFIG_FILE_NAMES[0]);
    let database_url = args
        .database_url
        .clone()
        .unwrap_or_else(|| ctx.config.database.url.clone());

    let write_config = if !config_path.exists() {
        true
    } else if !args.force {
        ctx.output
            .info(&format!("Keeping existing {}", config_path.display()));
        false
    } else if args.yes {
        true
    } else {
        Confirm::new()
            .with_prompt(format!("Overwrite {}?", config_path.display()))
            .default(false)
            .interact()?
    };

    let config = if write_config {
        let content = generate_default_config(&database_url);
        std::fs::write(&config_path, &content)
            .with_context(|| format!("Failed to write {}", config_path.display()))?;
        ctx.output
            .success(&format!("Wrote {}", config_path.display()));
        AppConfig::from_toml(&content).map_err(anyhow::Error::msg)?
    } else {
        ctx.config.clone()
    };

    let db = Db::open(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;
    db.migrate().await.context("Failed to create schema")?;
    db.close().await;

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "config": config_path,
            "database_url": config.database.url,
        }));
        return Ok(());
    }

    ctx.output
        .success(&format!("Schema ready in {}", config.database.url));
    ctx.output.info("");
    ctx.output.info("Next steps:");
    ctx.output.list_item("pageturn seed catalog.toml");
    ctx.output.list_item("pageturn books list");

    Ok(())
}
