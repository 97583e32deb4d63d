//! WATCH command - Stream realtime events from `/ws`.

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use futures::StreamExt;
use quire_core::InsertRecord;
use serde::Deserialize;
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{Context, format_timestamp, truncate};

/// Event as pushed by the server.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Event {
    Inserted(InsertRecord),
    Rescanned {
        entries: usize,
        timestamp: DateTime<Utc>,
    },
}

impl Event {
    fn print_human(&self) {
        match self {
            Self::Inserted(record) => println!(
                "{} {} {} {}",
                format_timestamp(&record.received_at).dimmed(),
                "+ inserted".green().bold(),
                record.username.cyan(),
                truncate(&record.content, 60)
            ),
            Self::Rescanned { entries, timestamp } => println!(
                "{} {} {} entries",
                format_timestamp(timestamp).dimmed(),
                "~ rescanned".yellow().bold(),
                entries
            ),
        }
    }
}

/// Map an http(s) base URL to the matching ws(s) endpoint.
fn ws_url(base_url: &str) -> Result<String> {
    let rest = if let Some(rest) = base_url.strip_prefix("https://") {
        format!("wss://{rest}")
    } else if let Some(rest) = base_url.strip_prefix("http://") {
        format!("ws://{rest}")
    } else {
        bail!("unsupported server URL {base_url:?}, expected http:// or https://");
    };
    Ok(format!("{rest}/ws"))
}

/// Execute the watch command.
pub async fn execute(ctx: &Context) -> Result<()> {
    let url = ws_url(&ctx.base_url)?;
    let (mut socket, _) = connect_async(url.as_str())
        .await
        .with_context(|| format!("failed to connect to {url}"))?;
    eprintln!("{} {}", "Watching".green().bold(), url.dimmed());

    while let Some(message) = socket.next().await {
        match message.context("realtime connection failed")? {
            Message::Text(text) => {
                if !ctx.human {
                    println!("{}", text.as_str());
                    continue;
                }
                match serde_json::from_str::<Event>(&text) {
                    Ok(event) => event.print_human(),
                    Err(_) => println!("{}", text.as_str()),
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    eprintln!("{}", "Connection closed".dimmed());
    Ok(())
}
