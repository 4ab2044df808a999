//! Review commands.

use anyhow::Result;
use dialoguer::Confirm;
use pageturn_commerce::prelude::*;

use super::{ReviewsArgs, ReviewsCommand};
use crate::context::Context;

/// Run the reviews command.
pub async fn run(args: ReviewsArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store().await?;

    match args.command {
        ReviewsCommand::List {
            book,
            sort,
            rating,
            offset,
            limit,
        } => {
            let mut query = ReviewQuery::new()
                .with_sort(sort.parse()?)
                .with_page(offset, limit);
            if let Some(rating) = rating {
                query = query.with_rating(rating);
            }
            let reviews = list_reviews(&store, book, &query).await?;

            if ctx.output.is_json() {
                ctx.output.json(&reviews);
                return Ok(());
            }
            ctx.output.header(&format!("Reviews of book {}", book));
            if reviews.is_empty() {
                ctx.output.info("No reviews");
            }
            for review in &reviews {
                print_review(ctx, review);
            }
        }
        ReviewsCommand::Add {
            book,
            user,
            rating,
            title,
            details,
        } => {
            let mut draft = ReviewDraft::new(title, rating);
            if let Some(details) = details {
                draft = draft.with_details(details);
            }
            let review = create_review(&store, book, &Customer::new(user), &draft).await?;

            if ctx.output.is_json() {
                ctx.output.json(&review);
                return Ok(());
            }
            ctx.output
                .success(&format!("Review #{} added to book {}", review.id, book));
        }
        ReviewsCommand::Delete {
            book,
            review,
            user,
            admin,
            yes,
        } => {
            let actor = if admin {
                Customer::admin(user)
            } else {
                Customer::new(user)
            };

            if !yes && !ctx.output.is_json() {
                let confirmed = Confirm::new()
                    .with_prompt(format!("Delete review #{}?", review))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    ctx.output.warn("Deletion cancelled");
                    return Ok(());
                }
            }

            delete_review(&store, book, review, &actor).await?;
            if ctx.output.is_json() {
                ctx.output
                    .json(&serde_json::json!({ "deleted": review }));
                return Ok(());
            }
            ctx.output.success(&format!("Review #{} deleted", review));
        }
    }

    Ok(())
}

fn print_review(ctx: &Context, review: &Review) {
    let stars = "★".repeat(review.rating as usize);
    ctx.output.info("");
    ctx.output.list_item(&format!(
        "#{} {:<5} {}  (user {}, {})",
        review.id,
        stars,
        review.title,
        review.user_id,
        review.created_at.format("%Y-%m-%d")
    ));
    if let Some(details) = &review.details {
        ctx.output.kv("details", details);
    }
}
