//! Command implementations and shared request plumbing.

pub mod entries;
pub mod insert;
pub mod query;
pub mod render;
pub mod rescan;
pub mod select;
pub mod tree;
pub mod watch;

use std::time::Duration;

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Utc};
use colored::Colorize;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// Default attempts per request, including the first.
pub const DEFAULT_ATTEMPTS: u32 = 3;

const BASE_BACKOFF: Duration = Duration::from_millis(200);
const MAX_BACKOFF: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings shared by every command.
pub struct Context {
    pub client: reqwest::Client,
    pub base_url: String,
    pub human: bool,
    pub attempts: u32,
}

impl Context {
    pub fn new(base_url: &str, human: bool, attempts: u32) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            human,
            attempts: attempts.max(1),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Output that has a formatted, colored rendition for `--human`.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    msg: String,
}

/// Print a response as JSON or in human-readable form.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Print a one-line loading state to stderr.
pub fn loading(what: &str) {
    eprintln!("{}", format!("Loading {what}...").dimmed());
}

/// Send a request, retrying on connection errors, timeouts and 5xx.
///
/// `build` is called once per attempt. After the last attempt the failure
/// is returned as-is.
pub async fn send_with_retry<F>(ctx: &Context, build: F) -> Result<Response>
where
    F: Fn() -> RequestBuilder,
{
    let mut attempt = 1;
    loop {
        let last = attempt >= ctx.attempts;
        match build().send().await {
            Ok(response) if response.status().is_server_error() && !last => {
                eprintln!(
                    "{} server returned {}, retrying ({}/{})",
                    "Warning:".yellow(),
                    response.status(),
                    attempt,
                    ctx.attempts
                );
            }
            Ok(response) => return Ok(response),
            Err(e) if is_retryable(&e) && !last => {
                eprintln!(
                    "{} {}, retrying ({}/{})",
                    "Warning:".yellow(),
                    e,
                    attempt,
                    ctx.attempts
                );
            }
            Err(e) => {
                return Err(e).with_context(|| format!("request failed after {attempt} attempt(s)"));
            }
        }

        tokio::time::sleep(backoff(attempt)).await;
        attempt += 1;
    }
}

fn is_retryable(error: &reqwest::Error) -> bool {
    error.is_connect() || error.is_timeout()
}

/// Delay after the given failed attempt (1-based).
fn backoff(attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    BASE_BACKOFF.saturating_mul(factor).min(MAX_BACKOFF)
}

/// Turn a non-success response into an error carrying the server's message.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    bail!("{}", describe_error(status, &body))
}

fn describe_error(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(error) => format!("{} ({}): {}", error.code, status, error.msg),
        Err(_) if body.trim().is_empty() => format!("server returned {status}"),
        Err(_) => format!("server returned {status}: {}", body.trim()),
    }
}

/// Send a request and decode a JSON response.
pub async fn make_request<T, F>(ctx: &Context, build: F) -> Result<T>
where
    T: DeserializeOwned,
    F: Fn() -> RequestBuilder,
{
    let response = check_status(send_with_retry(ctx, build).await?).await?;
    response
        .json::<T>()
        .await
        .context("failed to decode server response")
}

/// Send a request and return the response body as text.
pub async fn make_text_request<F>(ctx: &Context, build: F) -> Result<String>
where
    F: Fn() -> RequestBuilder,
{
    let response = check_status(send_with_retry(ctx, build).await?).await?;
    Ok(response.text().await?)
}

/// Send a request whose success carries no body; returns the status.
pub async fn make_empty_request<F>(ctx: &Context, build: F) -> Result<StatusCode>
where
    F: Fn() -> RequestBuilder,
{
    let response = check_status(send_with_retry(ctx, build).await?).await?;
    Ok(response.status())
}

/// Format a timestamp for display.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Truncate a string to `max` characters, adding an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        assert_eq!(backoff(1), Duration::from_millis(200));
        assert_eq!(backoff(2), Duration::from_millis(400));
        assert_eq!(backoff(3), Duration::from_millis(800));
        assert_eq!(backoff(10), MAX_BACKOFF);
        assert_eq!(backoff(u32::MAX), MAX_BACKOFF);
    }

    #[test]
    fn test_describe_structured_error() {
        let msg = describe_error(
            StatusCode::BAD_REQUEST,
            r#"{"code":"INTERNAL_ERROR","msg":"Something happened..."}"#,
        );
        assert_eq!(msg, "INTERNAL_ERROR (400 Bad Request): Something happened...");
    }

    #[test]
    fn test_describe_plain_error() {
        assert_eq!(
            describe_error(StatusCode::REQUEST_TIMEOUT, ""),
            "server returned 408 Request Timeout"
        );
        assert_eq!(
            describe_error(StatusCode::NOT_FOUND, "nope\n"),
            "server returned 404 Not Found: nope"
        );
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
    }

    #[test]
    fn test_context_trims_trailing_slash() {
        let ctx = Context::new("http://localhost:3000/", false, 0).unwrap();
        assert_eq!(ctx.url("/select"), "http://localhost:3000/select");
        assert_eq!(ctx.attempts, 1);
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_after_bounded_attempts() {
        // Port 9 on loopback is closed in test environments.
        let ctx = Context::new("http://127.0.0.1:9", false, 2).unwrap();
        let err = make_text_request(&ctx, || ctx.client.get(ctx.url("/select")))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("after 2 attempt(s)"));
    }
}
