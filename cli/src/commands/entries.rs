//! ENTRIES command - List entries and show each one rendered.

use anyhow::Result;
use clap::{Args, ValueEnum};
use colored::Colorize;
use quire_render::{MarkdownRenderer, strip_tags};
use serde::{Deserialize, Serialize};

use super::{Context, HumanReadable, loading, make_request, output};

/// Which entries to list.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum Filter {
    #[default]
    All,
    Titled,
}

impl Filter {
    fn as_query(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Titled => "titled",
        }
    }
}

/// Arguments for the entries command.
#[derive(Args)]
pub struct EntriesArgs {
    /// Restrict to entries with a heading title
    #[arg(short, long, value_enum, default_value_t = Filter::All)]
    pub filter: Filter,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    entries: Vec<ListedEntry>,
}

#[derive(Debug, Deserialize)]
struct ListedEntry {
    id: usize,
    title: String,
    file: String,
    source: String,
}

/// An entry with its rendered HTML.
#[derive(Debug, Serialize)]
pub struct RenderedEntry {
    pub id: usize,
    pub title: String,
    pub file: String,
    pub html: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct RenderedEntries(pub Vec<RenderedEntry>);

impl HumanReadable for RenderedEntries {
    fn print_human(&self) {
        if self.0.is_empty() {
            println!("  {}", "(No entries)".dimmed());
            return;
        }

        for entry in &self.0 {
            println!(
                "{} {} {}",
                format!("[{}]", entry.id).cyan(),
                entry.title.green().bold(),
                format!("({})", entry.file).dimmed()
            );
            println!("{}", "-".repeat(60));
            println!("{}", strip_tags(&entry.html).trim_end());
            println!();
        }
    }
}

/// Execute the entries command.
pub async fn execute(ctx: &Context, args: EntriesArgs) -> Result<()> {
    loading("entries");
    let url = ctx.url(&format!("/entries?filter={}", args.filter.as_query()));
    let response: ListResponse = make_request(ctx, || ctx.client.get(&url)).await?;

    let renderer = MarkdownRenderer::new();
    let rendered = RenderedEntries(
        response
            .entries
            .into_iter()
            .map(|entry| RenderedEntry {
                html: renderer.render(&entry.source),
                id: entry.id,
                title: entry.title,
                file: entry.file,
            })
            .collect(),
    );

    output(&rendered, ctx.human)
}
