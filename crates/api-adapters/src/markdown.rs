//! # Markdown formatter
//!
//! User text goes through `pulldown-cmark`, bare URLs become links, and the
//! resulting HTML is cleaned by `ammonia` before it reaches a template.

use std::collections::HashSet;

use ammonia::Builder;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd, TextMergeStream};
use regex::Regex;

static BARE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"https?://[^\s<>"'()\[\]]*[^\s<>"'()\[\].,;:!?]"#).expect("static url pattern")
});

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut builder = Builder::default();
    builder
        .url_schemes(HashSet::from(["http", "https", "mailto"]))
        .link_rel(Some("noopener noreferrer"))
        .set_tag_attribute_value("a", "target", "_blank");
    builder
});

/// Renders user-authored markdown to sanitized HTML.
///
/// The source is suffixed with a blank line so a lone line still closes as a
/// paragraph.
pub fn render(source: &str) -> String {
    let source = format!("{source}\n\n");
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);

    let events = autolink(TextMergeStream::new(Parser::new_ext(&source, options)));
    let mut raw = String::with_capacity(source.len() * 2);
    html::push_html(&mut raw, events.into_iter());
    SANITIZER.clean(&raw).to_string()
}

/// Splits text events around bare URLs. Text already inside a link or a
/// code block is left alone.
fn autolink<'a>(parser: impl Iterator<Item = Event<'a>>) -> Vec<Event<'a>> {
    let mut out = Vec::new();
    let mut in_link = 0usize;
    let mut in_code = false;

    for event in parser {
        match event {
            Event::Start(Tag::Link { .. }) => {
                in_link += 1;
                out.push(event);
            }
            Event::End(TagEnd::Link) => {
                in_link = in_link.saturating_sub(1);
                out.push(event);
            }
            Event::Start(Tag::CodeBlock(_)) => {
                in_code = true;
                out.push(event);
            }
            Event::End(TagEnd::CodeBlock) => {
                in_code = false;
                out.push(event);
            }
            Event::Text(text) if in_link == 0 && !in_code && BARE_URL.is_match(&text) => {
                link_text(&text, &mut out);
            }
            other => out.push(other),
        }
    }
    out
}

fn link_text<'a>(text: &str, out: &mut Vec<Event<'a>>) {
    let mut last = 0;
    for found in BARE_URL.find_iter(text) {
        if found.start() > last {
            out.push(Event::Text(CowStr::from(text[last..found.start()].to_string())));
        }
        let url = found.as_str().to_string();
        out.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: CowStr::from(url.clone()),
            title: CowStr::from(""),
            id: CowStr::from(""),
        }));
        out.push(Event::Text(CowStr::from(url)));
        out.push(Event::End(TagEnd::Link));
        last = found.end();
    }
    if last < text.len() {
        out.push(Event::Text(CowStr::from(text[last..].to_string())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_single_line_is_a_paragraph() {
        assert_eq!(render("hello").trim(), "<p>hello</p>");
    }

    #[test]
    fn scripts_and_handlers_are_stripped() {
        let out = render("hi <script>alert(1)</script><b onclick=\"x()\">there</b>");
        assert!(!out.contains("<script"));
        assert!(!out.contains("onclick"));
        assert!(out.contains("there"));
    }

    #[test]
    fn links_open_safely() {
        let out = render("[docs](https://doc.rust-lang.org)");
        assert!(out.contains(r#"href="https://doc.rust-lang.org""#));
        assert!(out.contains(r#"rel="noopener noreferrer""#));
        assert!(out.contains(r#"target="_blank""#));
    }

    #[test]
    fn javascript_urls_lose_their_href() {
        let out = render("[click](javascript:alert(1))");
        assert!(!out.contains("javascript"));
        assert!(out.contains("click"));
    }

    #[test]
    fn bare_urls_become_links() {
        let out = render("see https://example.com/a_b.");
        assert!(out.contains(r#"<a href="https://example.com/a_b""#));
        assert!(out.contains("https://example.com/a_b</a>."));
    }

    #[test]
    fn urls_in_code_and_links_are_not_relinked() {
        let code = render("```\nhttps://example.com\n```");
        assert!(!code.contains("<a "));

        let linked = render("[https://example.com](https://example.com)");
        assert_eq!(linked.matches("<a ").count(), 1);
    }
}
