//! Load catalog data from a TOML seed file.
//!
//! Books refer to authors and categories by name, discounts and reviews refer
//! to books by title. Every reference must resolve within the same file.

use std::collections::{HashMap, HashSet};

use anyhow::{bail, Context as _, Result};
use chrono::NaiveDate;
use pageturn_commerce::prelude::*;
use pageturn_db::{NewBook, NewDiscount, SqliteCatalogStore};
use serde::Deserialize;

use super::SeedArgs;
use crate::context::Context;

/// Contents of a seed file.
#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub authors: Vec<SeedAuthor>,
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub books: Vec<SeedBook>,
    #[serde(default)]
    pub discounts: Vec<SeedDiscount>,
    #[serde(default)]
    pub reviews: Vec<SeedReview>,
}

#[derive(Debug, Deserialize)]
pub struct SeedAuthor {
    pub name: String,
    pub bio: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedCategory {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedBook {
    pub title: String,
    pub author: String,
    pub category: String,
    /// Decimal string, e.g. `"10.00"`.
    pub list_price: String,
    pub summary: Option<String>,
    pub cover: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SeedDiscount {
    pub book: String,
    pub price: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SeedReview {
    pub book: String,
    pub user: UserId,
    pub rating: i64,
    pub title: String,
    pub details: Option<String>,
}

impl SeedFile {
    /// Parse seed TOML.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse seed file")
    }

    /// Number of rows the file will insert.
    pub fn row_count(&self) -> usize {
        self.authors.len()
            + self.categories.len()
            + self.books.len()
            + self.discounts.len()
            + self.reviews.len()
    }

    /// Check that names are unique, references resolve and prices parse.
    pub fn check(&self, currency: Currency) -> Result<()> {
        let authors = unique_names("author", self.authors.iter().map(|a| a.name.as_str()))?;
        let categories =
            unique_names("category", self.categories.iter().map(|c| c.name.as_str()))?;
        let books = unique_names("book", self.books.iter().map(|b| b.title.as_str()))?;

        for book in &self.books {
            if !authors.contains(book.author.as_str()) {
                bail!("Book '{}' refers to unknown author '{}'", book.title, book.author);
            }
            if !categories.contains(book.category.as_str()) {
                bail!(
                    "Book '{}' refers to unknown category '{}'",
                    book.title,
                    book.category
                );
            }
            parse_price(&book.list_price, currency)
                .with_context(|| format!("Book '{}'", book.title))?;
        }

        for discount in &self.discounts {
            if !books.contains(discount.book.as_str()) {
                bail!("Discount refers to unknown book '{}'", discount.book);
            }
            parse_price(&discount.price, currency)
                .with_context(|| format!("Discount on '{}'", discount.book))?;
        }

        for review in &self.reviews {
            if !books.contains(review.book.as_str()) {
                bail!("Review refers to unknown book '{}'", review.book);
            }
        }

        Ok(())
    }

    /// Insert everything, reporting each row to `tick`.
    pub async fn apply(
        &self,
        store: &SqliteCatalogStore,
        currency: Currency,
        mut tick: impl FnMut(&str),
    ) -> Result<SeedSummary> {
        self.check(currency)?;

        let mut author_ids = HashMap::new();
        for author in &self.authors {
            let id = store.insert_author(&author.name, author.bio.as_deref()).await?;
            author_ids.insert(author.name.as_str(), id);
            tick(&author.name);
        }

        let mut category_ids = HashMap::new();
        for category in &self.categories {
            let id = store
                .insert_category(&category.name, category.description.as_deref())
                .await?;
            category_ids.insert(category.name.as_str(), id);
            tick(&category.name);
        }

        let mut book_ids = HashMap::new();
        for book in &self.books {
            let (Some(&author_id), Some(&category_id)) = (
                author_ids.get(book.author.as_str()),
                category_ids.get(book.category.as_str()),
            ) else {
                bail!("Unresolved reference in book '{}'", book.title);
            };
            let id = store
                .insert_book(&NewBook {
                    category_id,
                    author_id,
                    title: book.title.clone(),
                    summary: book.summary.clone(),
                    list_price: parse_price(&book.list_price, currency)?,
                    cover: book.cover.clone(),
                })
                .await
                .with_context(|| format!("Failed to insert book '{}'", book.title))?;
            book_ids.insert(book.title.as_str(), id);
            tick(&book.title);
        }

        for discount in &self.discounts {
            let book_id = resolve_book(&book_ids, &discount.book)?;
            store
                .insert_discount(&NewDiscount {
                    book_id,
                    start_date: discount.start_date,
                    end_date: discount.end_date,
                    discount_price: parse_price(&discount.price, currency)?,
                })
                .await
                .with_context(|| format!("Failed to insert discount on '{}'", discount.book))?;
            tick(&discount.book);
        }

        for review in &self.reviews {
            let book_id = resolve_book(&book_ids, &review.book)?;
            let mut draft = ReviewDraft::new(review.title.clone(), review.rating);
            if let Some(details) = &review.details {
                draft = draft.with_details(details.clone());
            }
            create_review(store, book_id, &Customer::new(review.user), &draft)
                .await
                .with_context(|| format!("Failed to insert review of '{}'", review.book))?;
            tick(&review.book);
        }

        Ok(SeedSummary {
            authors: self.authors.len(),
            categories: self.categories.len(),
            books: self.books.len(),
            discounts: self.discounts.len(),
            reviews: self.reviews.len(),
        })
    }
}

/// Rows inserted per table.
#[derive(Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct SeedSummary {
    pub authors: usize,
    pub categories: usize,
    pub books: usize,
    pub discounts: usize,
    pub reviews: usize,
}

fn unique_names<'a>(
    kind: &str,
    names: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            bail!("Duplicate {} '{}'", kind, name);
        }
    }
    Ok(seen)
}

fn parse_price(raw: &str, currency: Currency) -> Result<Money> {
    let price = Money::parse(raw, currency)?;
    if !price.is_positive() {
        bail!("Price must be positive, got {}", raw);
    }
    Ok(price)
}

fn resolve_book(ids: &HashMap<&str, BookId>, title: &str) -> Result<BookId> {
    ids.get(title)
        .copied()
        .with_context(|| format!("Unknown book '{}'", title))
}

/// Run the seed command.
pub async fn run(args: SeedArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.file);
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read seed file: {}", path.display()))?;
    let seed = SeedFile::parse(&content)?;
    let currency = ctx.currency()?;
    seed.check(currency)?;

    let db = ctx.open_db().await?;
    db.migrate().await.context("Failed to create schema")?;
    let store = SqliteCatalogStore::new(&db, currency);

    ctx.output.header(&format!("Seeding from {}", path.display()));
    let progress = ctx.output.progress(seed.row_count() as u64, "rows");
    let summary = seed
        .apply(&store, currency, |label| {
            progress.set_message(label.to_string());
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();
    let summary = summary?;

    if ctx.output.is_json() {
        ctx.output.json(&summary);
        return Ok(());
    }
    ctx.output.success("Catalog seeded");
    ctx.output.kv("authors", &summary.authors.to_string());
    ctx.output.kv("categories", &summary.categories.to_string());
    ctx.output.kv("books", &summary.books.to_string());
    ctx.output.kv("discounts", &summary.discounts.to_string());
    ctx.output.kv("reviews", &summary.reviews.to_string());
    Ok(())
}
