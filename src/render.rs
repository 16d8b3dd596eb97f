//! Markdown rendering with allow-list sanitization.
//!
//! Feedback comes from a third-party model and is treated as untrusted input:
//! it is converted to HTML and then cleaned before it reaches a template.

use pulldown_cmark::{html, Event, Options, Parser};
use std::collections::{HashMap, HashSet};

const ALLOWED_TAGS: &[&str] = &[
    "p", "br", "hr", "pre", "code", "span", "em", "strong", "del", "blockquote", "ul", "ol", "li",
    "a", "h1", "h2", "h3", "h4", "table", "thead", "tbody", "tr", "th", "td",
];

const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Convert Markdown to HTML. Single newlines become `<br>`.
pub fn markdown_to_html(input: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(input, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Strip everything outside the allow-list. Script and style bodies are dropped.
pub fn sanitize_html(input: &str) -> String {
    let tags: HashSet<&str> = ALLOWED_TAGS.iter().copied().collect();

    let mut attributes: HashMap<&str, HashSet<&str>> = HashMap::new();
    attributes.insert("a", ["href", "title"].into_iter().collect());
    attributes.insert("code", ["class"].into_iter().collect());
    attributes.insert("span", ["class"].into_iter().collect());

    ammonia::Builder::new()
        .tags(tags)
        .tag_attributes(attributes)
        .generic_attributes(HashSet::new())
        .url_schemes(ALLOWED_URL_SCHEMES.iter().copied().collect())
        .clean(input)
        .to_string()
}

/// Render untrusted Markdown to embeddable HTML.
///
/// Returns `None` for empty input or when nothing survives sanitization.
pub fn markdown_to_safe_html(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        return None;
    }

    let clean = sanitize_html(&markdown_to_html(input));
    if clean.trim().is_empty() {
        tracing::debug!("Sanitized feedback is empty; rendering none");
        return None;
    }
    Some(clean)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markdown() {
        let html = markdown_to_safe_html("Good job! Consider mentioning **RAII**.").unwrap();
        assert_eq!(html.trim(), "<p>Good job! Consider mentioning <strong>RAII</strong>.</p>");
    }

    #[test]
    fn test_code_block_keeps_language_class() {
        let html = markdown_to_safe_html("```cpp\nint main() { return 0; }\n```").unwrap();
        assert!(html.contains("<pre><code class=\"language-cpp\">"));
        assert!(html.contains("int main()"));
    }

    #[test]
    fn test_lists_and_emphasis() {
        let html = markdown_to_safe_html("- *one*\n- two").unwrap();
        assert!(html.contains("<ul>"));
        assert!(html.contains("<em>one</em>"));

        let html = markdown_to_safe_html("1. first\n2. second").unwrap();
        assert!(html.contains("<ol>"));
        assert!(html.contains("second"));
    }

    #[test]
    fn test_soft_breaks_become_br() {
        let html = markdown_to_safe_html("line one\nline two").unwrap();
        assert!(html.contains("<br>"));
    }

    #[test]
    fn test_tables() {
        let html = markdown_to_safe_html("| a | b |\n|---|---|\n| 1 | 2 |").unwrap();
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_links_are_kept_with_rel() {
        let html = markdown_to_safe_html("[docs](https://en.cppreference.com)").unwrap();
        assert!(html.contains("href=\"https://en.cppreference.com\""));
        assert!(html.contains("rel=\"noopener noreferrer\""));
    }

    #[test]
    fn test_script_tags_are_removed() {
        let html = markdown_to_safe_html("Nice.\n\n<script>alert('x')</script>\n\nBye").unwrap();
        assert!(!html.contains("<script"));
        assert!(!html.contains("alert('x')"));
        assert!(html.contains("Nice."));
    }

    #[test]
    fn test_inline_event_handlers_are_removed() {
        let html = markdown_to_safe_html("<img src=x onerror=alert(1)> <b onclick=\"x()\">hi</b>")
            .unwrap_or_default();
        assert!(!html.contains("onerror"));
        assert!(!html.contains("onclick"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_javascript_links_are_neutralised() {
        let html = markdown_to_safe_html("[click](javascript:alert(1))").unwrap();
        assert!(html.contains("click"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn test_empty_after_sanitization() {
        assert_eq!(markdown_to_safe_html(""), None);
        assert_eq!(markdown_to_safe_html("   \n"), None);
        assert_eq!(markdown_to_safe_html("<script>alert(1)</script>"), None);
        assert_eq!(markdown_to_safe_html("<style>body{}</style>"), None);
    }

    #[test]
    fn test_unicode_is_preserved() {
        let html = markdown_to_safe_html("Schön — `std::move` → ✓").unwrap();
        assert!(html.contains("Schön — <code>std::move</code> → ✓"));
    }
}
