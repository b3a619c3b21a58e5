//! Configuration commands.

use anyhow::Result;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "cart": ctx.config.cart,
            "store_path": ctx.store_path,
        }));
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    ctx.output.info("[cart]");
    ctx.output.kv("storage_key", &ctx.config.cart.storage_key);
    ctx.output.kv(
        "on_decode_error",
        &format!("{:?}", ctx.config.cart.on_decode_error).to_lowercase(),
    );
    ctx.output
        .kv("persist_unchanged", &ctx.config.cart.persist_unchanged.to_string());

    ctx.output.info("[store]");
    ctx.output.kv("path", &ctx.store_path.display().to_string());

    if ctx.output.is_verbose() {
        ctx.output.info("");
        println!("{}", ctx.config.to_toml()?);
    }
    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.config.cart.validate()?;
    ctx.output.success("Configuration is valid");
    Ok(())
}
