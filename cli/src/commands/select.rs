//! SELECT command - Call the select placeholder.

use anyhow::Result;

use super::{Context, make_text_request};

/// Execute the select command.
pub async fn execute(ctx: &Context) -> Result<()> {
    let url = ctx.url("/select");
    let text = make_text_request(ctx, || ctx.client.get(&url)).await?;
    println!("{text}");
    Ok(())
}
