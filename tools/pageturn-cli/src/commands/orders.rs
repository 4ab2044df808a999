//! Order commands.

use anyhow::Result;
use pageturn_commerce::prelude::*;

use super::{as_of_date, parse_item, OrdersArgs, OrdersCommand};
use crate::context::Context;

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store().await?;

    match args.command {
        OrdersCommand::Place { user, items, as_of } => {
            let items = items
                .iter()
                .map(|raw| parse_item(raw).map(|(book, qty)| RequestedItem::new(book, qty)))
                .collect::<Result<Vec<_>>>()?;
            ctx.output
                .debug(&format!("Placing order for user {} with {} lines", user, items.len()));

            let order = match place_order(&store, user, &items, as_of_date(as_of.as_deref())?).await {
                Ok(order) => order,
                Err(e) => {
                    for id in e.unavailable_ids() {
                        ctx.output.warn(&format!("Book {} is not available", id));
                    }
                    return Err(e.into());
                }
            };

            if ctx.output.is_json() {
                ctx.output.json(&order);
                return Ok(());
            }
            ctx.output.success(&format!(
                "Order #{} placed: {}",
                order.id,
                order.total_amount.display()
            ));
            print_order(ctx, &order);
        }
        OrdersCommand::List { user } => {
            let orders = list_orders(&store, user).await?;
            if ctx.output.is_json() {
                ctx.output.json(&orders);
                return Ok(());
            }
            ctx.output.header(&format!("Orders for user {}", user));
            if orders.is_empty() {
                ctx.output.info("No orders");
            }
            for order in &orders {
                ctx.output.list_item(&format!(
                    "#{}  {}  {} copies  {}",
                    order.id,
                    order.created_at.format("%Y-%m-%d %H:%M"),
                    order.item_count(),
                    order.total_amount.display()
                ));
            }
        }
        OrdersCommand::Show { id } => {
            let order = get_order(&store, id).await?;
            if ctx.output.is_json() {
                ctx.output.json(&order);
                return Ok(());
            }
            ctx.output.header(&format!("Order #{}", order.id));
            print_order(ctx, &order);
        }
    }

    Ok(())
}

fn print_order(ctx: &Context, order: &Order) {
    ctx.output.kv("user", &order.user_id.to_string());
    ctx.output
        .kv("date", &order.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
    ctx.output.kv("total", &order.total_amount.display());
    ctx.output.info("");
    for item in &order.items {
        ctx.output.list_item(&format!(
            "book {} x{} @ {}",
            item.book_id,
            item.quantity,
            item.unit_price.display()
        ));
    }
}
