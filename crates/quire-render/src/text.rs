//! HTML text helpers: escaping, tag stripping, and URL scheme checks.

/// Escapes `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Removes tags from rendered HTML and decodes the entities the renderer
/// produces, leaving the plain text content.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Returns false for destinations a browser would execute or load from the
/// local machine: `javascript:`, `vbscript:`, `file:`, and `data:` other
/// than common raster images.
pub fn is_safe_url(url: &str) -> bool {
    // Browsers ignore whitespace and control characters inside the scheme.
    let normalized: String = url
        .trim()
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_ascii_control())
        .take(32)
        .collect::<String>()
        .to_ascii_lowercase();

    const BLOCKED: &[&str] = &["javascript:", "vbscript:", "file:"];
    const IMAGE_DATA: &[&str] = &[
        "data:image/gif;",
        "data:image/png;",
        "data:image/jpeg;",
        "data:image/webp;",
    ];

    if BLOCKED.iter().any(|scheme| normalized.starts_with(scheme)) {
        return false;
    }
    if normalized.starts_with("data:") {
        return IMAGE_DATA.iter().any(|prefix| normalized.starts_with(prefix));
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(
            strip_tags("<p>Fish &amp; <em>chips</em> &lt;3</p>\n"),
            "Fish & chips <3\n"
        );
    }

    #[test]
    fn test_strip_tags_does_not_double_decode() {
        assert_eq!(strip_tags("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_safe_urls() {
        assert!(is_safe_url("https://example.com"));
        assert!(is_safe_url("/relative/path"));
        assert!(is_safe_url("#anchor"));
        assert!(is_safe_url("mailto:someone@example.com"));
        assert!(is_safe_url("data:image/png;base64,AAAA"));
    }

    #[test]
    fn test_unsafe_urls() {
        assert!(!is_safe_url("javascript:alert(1)"));
        assert!(!is_safe_url("  JavaScript:alert(1)"));
        assert!(!is_safe_url("java\tscript:alert(1)"));
        assert!(!is_safe_url("vbscript:msgbox"));
        assert!(!is_safe_url("file:///etc/passwd"));
        assert!(!is_safe_url("data:text/html;base64,PHNjcmlwdD4="));
    }
}
