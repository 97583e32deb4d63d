//! RESCAN command - Ask the server to re-read its content directory.

use anyhow::Result;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::{Context, HumanReadable, make_request, output};

#[derive(Debug, Deserialize, Serialize)]
pub struct RescanResponse {
    pub entries: usize,
}

impl HumanReadable for RescanResponse {
    fn print_human(&self) {
        println!(
            "{} {} entries loaded",
            "Rescanned:".green().bold(),
            self.entries
        );
    }
}

/// Execute the rescan command.
pub async fn execute(ctx: &Context) -> Result<()> {
    let url = ctx.url("/entries/rescan");
    let response: RescanResponse = make_request(ctx, || ctx.client.post(&url)).await?;

    output(&response, ctx.human)
}
