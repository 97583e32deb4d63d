//! QUERY command - Send a query envelope.

use anyhow::Result;
use clap::Args;
use quire_core::{QueryBody, Validate};

use super::{Context, make_text_request};

/// Arguments for the query command.
#[derive(Args)]
pub struct QueryArgs {
    /// User the query is made for
    pub username: String,
}

/// Execute the query command.
pub async fn execute(ctx: &Context, args: QueryArgs) -> Result<()> {
    let body = QueryBody {
        username: args.username,
    };
    body.validate()?;

    let url = ctx.url("/query");
    let text = make_text_request(ctx, || ctx.client.get(&url).json(&body)).await?;
    println!("{text}");
    Ok(())
}
