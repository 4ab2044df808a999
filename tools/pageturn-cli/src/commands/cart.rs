//! Cart commands.

use anyhow::Result;
use pageturn_commerce::prelude::*;

use super::{parse_item, CartArgs, CartCommand};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store().await?;

    let (user, cart) = match args.command {
        CartCommand::Show { user } => (user, get_cart(&store, user).await?),
        CartCommand::Set { user, items } => {
            let lines = items
                .iter()
                .map(|raw| parse_item(raw).map(|(book, qty)| CartLine::new(book, qty)))
                .collect::<Result<Vec<_>>>()?;
            let cart = replace_cart(&store, user, &lines).await?;
            ctx.output
                .success(&format!("Cart for user {} updated", user));
            (user, cart)
        }
    };

    if ctx.output.is_json() {
        ctx.output.json(&cart);
        return Ok(());
    }

    ctx.output.header(&format!("Cart for user {}", user));
    if cart.is_empty() {
        ctx.output.info("Cart is empty");
    }
    for item in &cart {
        ctx.output
            .list_item(&format!("book {} x{}", item.book_id, item.quantity));
    }
    Ok(())
}
