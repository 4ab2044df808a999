//! CLI command implementations.

pub mod books;
pub mod cart;
pub mod config;
pub mod init;
pub mod orders;
pub mod reviews;
pub mod seed;

use anyhow::{anyhow, Context as _, Result};
use chrono::NaiveDate;
use clap::{Args, Subcommand};
use pageturn_commerce::catalog::today;
use pageturn_commerce::{AuthorId, BookId, CategoryId, OrderId, ReviewId, UserId};

/// Arguments for the init command.
#[derive(Args)]
pub struct InitArgs {
    /// Database URL to write into the new config.
    #[arg(long)]
    pub database_url: Option<String>,

    /// Overwrite an existing config file.
    #[arg(short, long)]
    pub force: bool,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the seed command.
#[derive(Args)]
pub struct SeedArgs {
    /// TOML file with authors, categories, books, discounts and reviews.
    pub file: String,
}

/// Arguments for the books command.
#[derive(Args)]
pub struct BooksArgs {
    #[command(subcommand)]
    pub command: BooksCommand,
}

#[derive(Subcommand)]
pub enum BooksCommand {
    /// List books with filters and sorting.
    List {
        /// Only books in this category.
        #[arg(long)]
        category: Option<CategoryId>,

        /// Only books by this author.
        #[arg(long)]
        author: Option<AuthorId>,

        /// Minimum average rating (1-5).
        #[arg(long)]
        min_rating: Option<i64>,

        /// Case-insensitive match on title or author name.
        #[arg(short, long)]
        search: Option<String>,

        /// on_sale, on_sale_home, popularity, recommended, price_asc or price_desc.
        #[arg(long, default_value = "on_sale")]
        sort: String,

        #[arg(long, default_value = "0")]
        offset: i64,

        /// Page size (default from config).
        #[arg(short, long)]
        limit: Option<i64>,

        /// Price as of this date (YYYY-MM-DD) instead of today.
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Search by title or author name, ordered by title.
    Search {
        term: String,

        #[arg(long, default_value = "0")]
        offset: i64,

        #[arg(short, long)]
        limit: Option<i64>,

        #[arg(long)]
        as_of: Option<String>,
    },
    /// Show one book with its author, category and price.
    Show {
        id: BookId,

        #[arg(long)]
        as_of: Option<String>,
    },
    /// List categories.
    Categories {
        #[arg(long, default_value = "0")]
        offset: i64,

        #[arg(short, long, default_value = "100")]
        limit: i64,
    },
    /// List authors.
    Authors {
        #[arg(long, default_value = "0")]
        offset: i64,

        #[arg(short, long, default_value = "100")]
        limit: i64,
    },
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: OrdersCommand,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// Place an order. Items are BOOK_ID:QUANTITY.
    Place {
        /// Ordering user.
        #[arg(short, long)]
        user: UserId,

        /// Items, e.g. `3:2 7:1`.
        #[arg(required = true)]
        items: Vec<String>,

        /// Price as of this date (YYYY-MM-DD) instead of today.
        #[arg(long)]
        as_of: Option<String>,
    },
    /// List a user's orders, newest first.
    List {
        #[arg(short, long)]
        user: UserId,
    },
    /// Show one order with its line items.
    Show { id: OrderId },
}

/// Arguments for the reviews command.
#[derive(Args)]
pub struct ReviewsArgs {
    #[command(subcommand)]
    pub command: ReviewsCommand,
}

#[derive(Subcommand)]
pub enum ReviewsCommand {
    /// List reviews of a book.
    List {
        book: BookId,

        /// date_desc or date_asc.
        #[arg(long, default_value = "date_desc")]
        sort: String,

        /// Only reviews with this rating.
        #[arg(long)]
        rating: Option<i64>,

        #[arg(long, default_value = "0")]
        offset: i64,

        #[arg(short, long, default_value = "10")]
        limit: i64,
    },
    /// Add a review.
    Add {
        book: BookId,

        #[arg(short, long)]
        user: UserId,

        /// Rating from 1 to 5.
        #[arg(short, long)]
        rating: i64,

        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        details: Option<String>,
    },
    /// Delete a review. Only its author or an admin may.
    Delete {
        book: BookId,
        review: ReviewId,

        #[arg(short, long)]
        user: UserId,

        /// Act as an administrator.
        #[arg(long)]
        admin: bool,

        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: CartCommand,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// Show a user's cart.
    Show {
        #[arg(short, long)]
        user: UserId,
    },
    /// Replace a user's cart. Items are BOOK_ID:QUANTITY; none empties it.
    Set {
        #[arg(short, long)]
        user: UserId,

        items: Vec<String>,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Print the config file path in use.
    Path,
}

/// Parse `BOOK_ID:QUANTITY`.
pub fn parse_item(raw: &str) -> Result<(BookId, i64)> {
    let (book, quantity) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("Invalid item '{}': expected BOOK_ID:QUANTITY", raw))?;
    let book: BookId = book
        .parse()
        .with_context(|| format!("Invalid book id in '{}'", raw))?;
    let quantity: i64 = quantity
        .trim()
        .parse()
        .with_context(|| format!("Invalid quantity in '{}'", raw))?;
    Ok((book, quantity))
}

/// Parse an optional `YYYY-MM-DD`, defaulting to today.
pub fn as_of_date(raw: Option<&str>) -> Result<NaiveDate> {
    match raw {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .with_context(|| format!("Invalid date '{}': expected YYYY-MM-DD", raw)),
        None => Ok(today()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item() {
        assert_eq!(parse_item("3:2").unwrap(), (BookId::new(3), 2));
        assert_eq!(parse_item(" 12 : 8").unwrap(), (BookId::new(12), 8));
    }

    #[test]
    fn test_parse_item_rejects_garbage() {
        assert!(parse_item("3").is_err());
        assert!(parse_item("x:2").is_err());
        assert!(parse_item("3:two").is_err());
    }

    #[test]
    fn test_as_of_date() {
        assert_eq!(
            as_of_date(Some("2024-05-10")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
        );
        assert!(as_of_date(Some("10/05/2024")).is_err());
        assert_eq!(as_of_date(None).unwrap(), today());
    }
}
