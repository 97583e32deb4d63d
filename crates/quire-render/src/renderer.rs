//! Markdown to HTML rendering.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::highlight::Highlighter;
use crate::text::{escape_html, is_safe_url};

/// Renders markdown to sanitized HTML.
///
/// Cheap to share behind an `Arc`; rendering takes `&self`.
#[derive(Debug, Default)]
pub struct MarkdownRenderer {
    highlighter: Highlighter,
}

impl MarkdownRenderer {
    /// Creates a renderer with the bundled syntax definitions.
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
        }
    }

    /// Returns the highlighter used for code fences.
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    /// Renders `markdown` to HTML.
    ///
    /// Never fails: raw HTML is escaped, unsafe link destinations become
    /// `#`, and code fences that cannot be highlighted are emitted as plain
    /// escaped blocks.
    pub fn render(&self, markdown: &str) -> String {
        let options = Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH;
        let parser = Parser::new_ext(markdown, options);

        let mut events: Vec<Event<'_>> = Vec::new();
        // Buffered events of the fenced block currently being read.
        let mut fence: Option<(String, Vec<Event<'_>>)> = None;

        for event in parser {
            if let Some((lang, buffered)) = fence.as_mut() {
                let closes = matches!(event, Event::End(TagEnd::CodeBlock));
                buffered.push(event);
                if closes {
                    let lang = std::mem::take(lang);
                    let buffered = std::mem::take(buffered);
                    fence = None;
                    events.extend(self.finish_fence(&lang, buffered));
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info))) => {
                    let lang = info.split_whitespace().next().unwrap_or("").to_string();
                    fence = Some((lang, vec![event]));
                }
                other => events.push(sanitize(other)),
            }
        }

        // An unterminated fence at end of input still closes in the parser,
        // but keep whatever was buffered if it somehow did not.
        if let Some((_, buffered)) = fence {
            events.extend(buffered);
        }

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    /// Replaces a buffered fenced block with highlighted HTML, or returns the
    /// buffered events untouched so the default plain block is rendered.
    fn finish_fence<'a>(&self, lang: &str, buffered: Vec<Event<'a>>) -> Vec<Event<'a>> {
        if lang.is_empty() {
            return buffered;
        }

        let code: String = buffered
            .iter()
            .filter_map(|event| match event {
                Event::Text(text) => Some(text.as_ref()),
                _ => None,
            })
            .collect();

        match self.highlighter.highlight(lang, &code) {
            Some(highlighted) => {
                let block = format!(
                    "<pre><code class=\"language-{}\">{}</code></pre>\n",
                    escape_html(lang),
                    highlighted
                );
                vec![Event::Html(CowStr::from(block))]
            }
            None => buffered,
        }
    }
}

/// Neutralizes raw HTML and unsafe link destinations.
fn sanitize(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Link {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => Event::Start(Tag::Image {
            link_type,
            dest_url: safe_destination(dest_url),
            title,
            id,
        }),
        other => other,
    }
}

fn safe_destination(dest: CowStr<'_>) -> CowStr<'_> {
    if is_safe_url(&dest) {
        dest
    } else {
        tracing::debug!(dest = &*dest, "Neutralized unsafe link destination");
        CowStr::Borrowed("#")
    }
}
