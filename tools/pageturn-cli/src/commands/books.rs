//! Catalog browsing commands.

use anyhow::Result;
use pageturn_commerce::prelude::*;

use super::{as_of_date, BooksArgs, BooksCommand};
use crate::context::Context;
use crate::output::{format_price, format_rating, truncate};

const TITLE_WIDTH: usize = 40;
const AUTHOR_WIDTH: usize = 24;

/// Run the books command.
pub async fn run(args: BooksArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store().await?;
    let default_limit = ctx.config.catalog.default_page_size;

    match args.command {
        BooksCommand::List {
            category,
            author,
            min_rating,
            search,
            sort,
            offset,
            limit,
            as_of,
        } => {
            let mut query = BookQuery::new()
                .with_sort(sort.parse()?)
                .with_page(offset, limit.unwrap_or(default_limit));
            if let Some(id) = category {
                query = query.with_category(id);
            }
            if let Some(id) = author {
                query = query.with_author(id);
            }
            if let Some(rating) = min_rating {
                query = query.with_min_rating(rating);
            }
            if let Some(term) = search {
                query = query.with_search(term);
            }

            let page = list_books(&store, &query, as_of_date(as_of.as_deref())?).await?;
            print_page(ctx, query.sort.display_name(), &page);
        }
        BooksCommand::Search {
            term,
            offset,
            limit,
            as_of,
        } => {
            let search = TitleSearch::new(term).with_page(offset, limit.unwrap_or(default_limit));
            let page = search_books(&store, &search, as_of_date(as_of.as_deref())?).await?;
            print_page(ctx, &format!("Results for \"{}\"", search.term), &page);
        }
        BooksCommand::Show { id, as_of } => {
            let details = get_book_details(&store, id, as_of_date(as_of.as_deref())?).await?;
            print_details(ctx, &details);
        }
        BooksCommand::Categories { offset, limit } => {
            let categories = list_categories(&store, PageRequest::new(offset, limit)).await?;
            if ctx.output.is_json() {
                ctx.output.json(&categories);
                return Ok(());
            }
            ctx.output.header("Categories");
            for category in &categories {
                ctx.output
                    .list_item(&format!("{:>4}  {}", category.id, category.name));
            }
        }
        BooksCommand::Authors { offset, limit } => {
            let authors = list_authors(&store, PageRequest::new(offset, limit)).await?;
            if ctx.output.is_json() {
                ctx.output.json(&authors);
                return Ok(());
            }
            ctx.output.header("Authors");
            for author in &authors {
                ctx.output
                    .list_item(&format!("{:>4}  {}", author.id, author.name));
            }
        }
    }

    Ok(())
}

fn print_page(ctx: &Context, title: &str, page: &BookPage) {
    if ctx.output.is_json() {
        ctx.output.json(page);
        return;
    }

    ctx.output.header(title);
    if page.is_empty() {
        ctx.output.info("No books found");
        return;
    }

    let rows: Vec<Vec<String>> = page
        .items
        .iter()
        .map(|book| {
            vec![
                book.id.to_string(),
                truncate(&book.title, TITLE_WIDTH),
                truncate(&book.author.name, AUTHOR_WIDTH),
                format_price(&book.effective_price, &book.list_price),
                format_rating(book.average_rating, book.review_count),
            ]
        })
        .collect();
    ctx.output
        .table(&["ID", "TITLE", "AUTHOR", "PRICE", "RATING"], &rows);

    let first = page.offset + 1;
    let last = page.offset + page.len() as i64;
    ctx.output.info("");
    ctx.output
        .info(&format!("Showing {}-{} of {}", first, last, page.total_count));
    if page.has_next() {
        ctx.output.info(&format!(
            "Next page: --offset {}",
            page.offset + page.limit
        ));
    }
}

fn print_details(ctx: &Context, details: &BookDetails) {
    if ctx.output.is_json() {
        ctx.output.json(details);
        return;
    }

    let book = &details.book;
    ctx.output.header(&book.title);
    ctx.output.kv("id", &book.id.to_string());
    ctx.output.kv("author", &details.author.name);
    ctx.output.kv("category", &details.category.name);
    ctx.output.kv(
        "price",
        &format_price(&details.effective_price(), &book.list_price),
    );
    if let Some(summary) = &book.summary {
        ctx.output.kv("summary", summary);
    }
    if let Some(cover) = &book.cover {
        ctx.output.kv("cover", cover);
    }

    if !book.discounts.is_empty() {
        ctx.output.info("");
        ctx.output.info("Discounts:");
        for discount in &book.discounts {
            let until = discount
                .end_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "open".to_string());
            ctx.output.list_item(&format!(
                "#{} {} from {} until {}",
                discount.id,
                discount.discount_price.display(),
                discount.start_date,
                until
            ));
        }
    }
}
