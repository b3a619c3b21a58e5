//! Cart commands.

use anyhow::{Context as _, Result};
use cart_core::prelude::*;
use cart_kv::JsonFileStore;

use super::{AddArgs, ItemArgs};
use crate::context::Context;

/// Open the configured store and run `f` inside its provider scope.
///
/// Waits for the cart to be persisted before returning.
async fn with_cart<F>(ctx: &Context, f: F) -> Result<Cart>
where
    F: FnOnce(&CartStore) -> Result<Option<Mutation>, CartError>,
{
    let backend = JsonFileStore::open(&ctx.store_path)
        .await
        .with_context(|| format!("Failed to open cart store {}", ctx.store_path.display()))?;
    let provider = CartProvider::mount(backend, ctx.config.cart.clone()).await?;

    let mutation = provider.sync_scope(|| -> Result<Option<Mutation>, CartError> {
        let cart = use_cart()?;
        f(&cart)
    })?;

    provider
        .store()
        .flush()
        .await
        .context("Cart changed but could not be saved")?;

    if let Some(mutation) = mutation {
        if mutation.changed() {
            ctx.output.success(&format!("Item {}", mutation));
        } else {
            ctx.output.warn("Item is not in the cart");
        }
    }

    Ok(provider.store().snapshot())
}

/// Print the cart.
pub async fn show(ctx: &Context) -> Result<()> {
    let cart = with_cart(ctx, |_| Ok(None)).await?;
    ctx.output.header("Cart");
    ctx.output.cart(&cart);
    Ok(())
}

/// Add a product to the cart.
pub async fn add(args: AddArgs, ctx: &Context) -> Result<()> {
    let item = NewLineItem::new(args.id, args.title, args.image_url, args.price);
    let cart = with_cart(ctx, |cart| cart.add_to_cart(item).map(Some)).await?;
    ctx.output.cart(&cart);
    Ok(())
}

/// Raise a product's quantity.
pub async fn increment(args: ItemArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);
    let cart = with_cart(ctx, |cart| Ok(Some(cart.increment(&id)))).await?;
    ctx.output.cart(&cart);
    Ok(())
}

/// Lower a product's quantity, removing it at zero.
pub async fn decrement(args: ItemArgs, ctx: &Context) -> Result<()> {
    let id = ProductId::new(args.id);
    let cart = with_cart(ctx, |cart| Ok(Some(cart.decrement(&id)))).await?;
    ctx.output.cart(&cart);
    Ok(())
}
