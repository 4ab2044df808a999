//! Pageturn CLI - operate a Pageturn bookstore database.
//!
//! Commands:
//! - `pageturn init` - Write a config file and create the schema
//! - `pageturn seed` - Load authors, categories, books and discounts from TOML
//! - `pageturn books` - List, search and show books
//! - `pageturn orders` - Place and inspect orders
//! - `pageturn reviews` - List, add and delete reviews
//! - `pageturn cart` - Show and replace a user's cart
//! - `pageturn config` - Inspect configuration

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{BooksArgs, CartArgs, ConfigArgs, InitArgs, OrdersArgs, ReviewsArgs, SeedArgs};

/// Pageturn CLI - manage the bookstore catalog and orders
#[derive(Parser)]
#[command(name = "pageturn")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a config file and the database schema
    Init(InitArgs),

    /// Load catalog data from a TOML file
    Seed(SeedArgs),

    /// Browse the catalog
    Books(BooksArgs),

    /// Place and inspect orders
    Orders(OrdersArgs),

    /// Manage book reviews
    Reviews(ReviewsArgs),

    /// Manage shopping carts
    Cart(CartArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let output = output::Output::new(cli.verbose, cli.json);

    let ctx = match context::Context::load(cli.config.as_deref(), output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let level = pageturn_observability::level_for_verbosity(
        &ctx.config.logging.level,
        u8::from(cli.verbose),
    );
    let logging = pageturn_core::LoggingConfig {
        level,
        format: ctx.config.logging.format,
    };
    if let Err(e) = pageturn_observability::try_init_logging(&logging) {
        ctx.output.warn(&format!("logging disabled: {}", e));
    }

    let result = match cli.command {
        Commands::Init(args) => commands::init::run(args, &ctx).await,
        Commands::Seed(args) => commands::seed::run(args, &ctx).await,
        Commands::Books(args) => commands::books::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Reviews(args) => commands::reviews::run(args, &ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
