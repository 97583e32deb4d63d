//! INSERT command - Insert a payload; the server broadcasts it to watchers.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quire_core::{InsertBody, Validate};

use super::{Context, make_empty_request};

/// Arguments for the insert command.
#[derive(Args)]
pub struct InsertArgs {
    /// Submitting user
    pub username: String,

    /// Payload content
    pub content: String,
}

/// Execute the insert command.
///
/// Inserts are not idempotent, so a retried request after a server-side
/// failure may record the payload twice.
pub async fn execute(ctx: &Context, args: InsertArgs) -> Result<()> {
    let body = InsertBody {
        username: args.username,
        content: args.content,
    };
    body.validate()?;

    let url = ctx.url("/insert");
    let status = make_empty_request(ctx, || ctx.client.put(&url).json(&body)).await?;

    if ctx.human {
        println!("{} ({})", "Inserted".green().bold(), status);
    } else {
        println!("{}", serde_json::json!({ "status": status.as_u16() }));
    }
    Ok(())
}
