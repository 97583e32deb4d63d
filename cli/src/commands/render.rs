//! RENDER command - Render one entry through the server.

use anyhow::Result;
use clap::Args;
use quire_core::EntryId;
use quire_render::strip_tags;
use serde::Serialize;

use super::{Context, HumanReadable, loading, make_request, output};

/// Arguments for the render command.
#[derive(Args)]
pub struct RenderArgs {
    /// Entry id (position in the server's listing)
    pub id: EntryId,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub id: EntryId,
    pub html: String,
}

impl HumanReadable for RenderResponse {
    fn print_human(&self) {
        println!("{}", strip_tags(&self.html).trim_end());
    }
}

/// Execute the render command.
pub async fn execute(ctx: &Context, args: RenderArgs) -> Result<()> {
    loading(&format!("entry {}", args.id));
    let url = ctx.url(&format!("/parse/{}", args.id));
    let html: String = make_request(ctx, || ctx.client.get(&url)).await?;

    output(&RenderResponse { id: args.id, html }, ctx.human)
}
