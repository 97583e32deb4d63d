//! quire-render: Markdown rendering for the Quire content service
//!
//! Converts markdown to HTML that is safe to insert into a page:
//! - Raw HTML in the source is escaped, never passed through
//! - Single newlines stay soft breaks (no `<br>` insertion)
//! - Fenced code with a known language is highlighted into classed spans
//! - Unknown or missing languages fall back to a plain code block
//! - `javascript:`-style link destinations are neutralized
//!
//! # Usage
//!
//! ```rust,ignore
//! use quire_render::MarkdownRenderer;
//!
//! let renderer = MarkdownRenderer::new();
//! let html = renderer.render("# Hello\n\n```rust\nfn main() {}\n```");
//! ```

pub mod highlight;
pub mod renderer;
pub mod text;

pub use highlight::Highlighter;
pub use renderer::MarkdownRenderer;
pub use text::{escape_html, is_safe_url, strip_tags};
