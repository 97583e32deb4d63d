//! TREE command - Show entries with their timestamped segments.

use anyhow::Result;
use colored::Colorize;
use quire_core::Node;
use serde::{Deserialize, Serialize};

use super::{Context, HumanReadable, loading, make_request, output, truncate};

#[derive(Debug, Deserialize, Serialize)]
pub struct TreeResponse {
    pub nodes: Vec<Node>,
}

impl HumanReadable for TreeResponse {
    fn print_human(&self) {
        println!("{}", "Entry Tree".green().bold());
        println!("{}", "=".repeat(60));

        if self.nodes.is_empty() {
            println!("  {}", "(No entries)".dimmed());
            return;
        }

        for node in &self.nodes {
            println!();
            println!("  {} {}", format!("[{}]", node.id).cyan(), node.title.bold());
            for segment in &node.segments {
                println!(
                    "    {} {}",
                    segment.display_timestamp().yellow(),
                    truncate(&segment.title, 50)
                );
            }
        }
    }
}

/// Execute the tree command.
pub async fn execute(ctx: &Context) -> Result<()> {
    loading("entry tree");
    let url = ctx.url("/entries/tree");
    let response: TreeResponse = make_request(ctx, || ctx.client.get(&url)).await?;

    output(&response, ctx.human)
}
