//! Configuration inspection commands.

use anyhow::Result;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Path => show_path(ctx),
    }
}

fn redacted(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let mut config = ctx.config.clone();
    config.auth.secret_key = redacted(&config.auth.secret_key);

    if ctx.output.is_json() {
        ctx.output.json(&config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");

    ctx.output.info("");
    ctx.output.info("[database]");
    ctx.output.kv("url", &config.database.url);
    ctx.output
        .kv("max_connections", &config.database.max_connections.to_string());

    ctx.output.info("");
    ctx.output.info("[catalog]");
    ctx.output.kv("currency", &config.catalog.currency);
    ctx.output.kv(
        "default_page_size",
        &config.catalog.default_page_size.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("[auth]");
    ctx.output.kv("secret_key", &config.auth.secret_key);
    ctx.output.kv("algorithm", &config.auth.algorithm);
    ctx.output.kv(
        "access_token_expire_minutes",
        &config.auth.access_token_expire_minutes.to_string(),
    );

    ctx.output.info("");
    ctx.output.info("[logging]");
    ctx.output.kv("level", &config.logging.level);
    ctx.output.kv("format", config.logging.format.as_str());

    if ctx.config.auth.uses_default_secret() {
        ctx.output.info("");
        ctx.output.warn("The default secret key is in use");
    }

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    let path = ctx.config_path.as_ref().map(|p| p.display().to_string());
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({ "path": path }));
        return Ok(());
    }
    match path {
        Some(path) => println!("{}", path),
        None => ctx.output.info("No config file found; using defaults"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redacted() {
        assert_eq!(redacted(""), "");
        assert_eq!(redacted("s3cret"), "********");
    }
}
