//! Markdown rendering for the live preview
//!
//! Converts the editor text into HTML for the preview container. Empty text
//! is replaced by a fixed placeholder. Headings get slug ids for anchor
//! links, and raw HTML in the source is escaped rather than injected.

use crate::theme::Theme;
use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd, html};
use std::collections::{HashMap, HashSet};

/// Heading shown while the editor is empty
pub const PLACEHOLDER_HEADING: &str = "Preview will appear here";

/// Instruction shown under the placeholder heading
pub const PLACEHOLDER_INSTRUCTION: &str = "Start typing Markdown in the editor to see it rendered.";

/// Markdown rendered in place of an empty document
pub const PLACEHOLDER_MARKDOWN: &str =
    "# Preview will appear here\n\nStart typing Markdown in the editor to see it rendered.\n";

/// Markdown extensions understood by both the preview and the exporter
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES
}

/// The text the renderer actually sees: the document, or the placeholder
pub fn preview_source(text: &str) -> &str {
    if text.is_empty() {
        PLACEHOLDER_MARKDOWN
    } else {
        text
    }
}

/// What the preview container displays for a given text and theme
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPreview {
    /// Inner HTML of the preview container
    pub html: String,
    /// CSS class of the preview container
    pub class: &'static str,
}

impl RenderedPreview {
    pub fn new(text: &str, theme: Theme) -> Self {
        Self {
            html: render_html(text),
            class: theme.css_class(),
        }
    }
}

/// Convert heading text to a URL-friendly slug
/// "Quick Start" -> "quick-start"
pub(crate) fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());

    for c in text.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
        } else if (c.is_whitespace() || c == '-' || c == '_') && !slug.is_empty() {
            slug.push('-');
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }

    slug
}

/// Render Markdown (or the placeholder, for empty text) to HTML
pub fn render_html(text: &str) -> String {
    let parser = Parser::new_ext(preview_source(text), parser_options());
    let mut events: Vec<Event> = parser.map(escape_raw_html).collect();
    assign_heading_ids(&mut events);

    let mut output = String::new();
    html::push_html(&mut output, events.into_iter());
    output
}

/// Turn raw HTML into visible text so the webview never executes it
fn escape_raw_html(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        Event::Start(Tag::HtmlBlock) => Event::Start(Tag::Paragraph),
        Event::End(TagEnd::HtmlBlock) => Event::End(TagEnd::Paragraph),
        other => other,
    }
}

/// Give every heading a unique slug id; duplicates get `-1`, `-2`, ...
fn assign_heading_ids(events: &mut [Event<'_>]) {
    let mut headings: Vec<(usize, String)> = Vec::new();
    let mut current: Option<(usize, String)> = None;

    for (idx, event) in events.iter().enumerate() {
        match event {
            Event::Start(Tag::Heading { .. }) => current = Some((idx, String::new())),
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, heading_text)) = current.as_mut() {
                    heading_text.push_str(text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(done) = current.take() {
                    headings.push(done);
                }
            }
            _ => {}
        }
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    for (idx, heading_text) in headings {
        let base = slugify(&heading_text);
        let mut slug = base.clone();
        // A suffixed slug may itself be another heading's plain slug
        if used.contains(&slug) {
            let suffix = next_suffix.entry(base.clone()).or_insert(1);
            loop {
                let candidate = format!("{base}-{suffix}");
                *suffix += 1;
                if !used.contains(&candidate) {
                    slug = candidate;
                    break;
                }
            }
        }
        used.insert(slug.clone());

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[idx]
            && id.is_none()
        {
            *id = Some(CowStr::from(slug));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_renders_as_h1() {
        let html = render_html("# Hello");
        assert!(html.contains("<h1 id=\"hello\">Hello</h1>"), "got: {html}");
    }

    #[test]
    fn test_empty_text_shows_placeholder() {
        let html = render_html("");
        assert!(html.contains(&format!(">{PLACEHOLDER_HEADING}</h1>")));
        assert!(html.contains(&format!("<p>{PLACEHOLDER_INSTRUCTION}</p>")));
    }

    #[test]
    fn test_whitespace_is_not_empty() {
        assert_eq!(preview_source(" "), " ");
        assert_eq!(preview_source(""), PLACEHOLDER_MARKDOWN);
    }

    #[test]
    fn test_render_is_pure() {
        let text = "## Notes\n\n- one\n- *two*\n\n```rust\nfn main() {}\n```";
        assert_eq!(render_html(text), render_html(text));
        assert_eq!(
            RenderedPreview::new(text, Theme::Colorful),
            RenderedPreview::new(text, Theme::Colorful)
        );
    }

    #[test]
    fn test_preview_class_follows_theme() {
        let simple = RenderedPreview::new("text", Theme::Simple);
        let colorful = RenderedPreview::new("text", Theme::Colorful);
        assert_eq!(simple.html, colorful.html);
        assert_eq!(simple.class, "markdown-simple");
        assert_eq!(colorful.class, "markdown-colorful");
    }

    #[test]
    fn test_raw_html_is_escaped() {
        let html = render_html("<script>alert(1)</script>\n\nand <b>inline</b>");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("&lt;b&gt;inline&lt;/b&gt;"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Quick Start"), "quick-start");
        assert_eq!(slugify("Environment & Lighting"), "environment--lighting");
        assert_eq!(slugify("  Trailing -"), "trailing");
    }

    #[test]
    fn test_duplicate_headings_get_suffixes() {
        let html = render_html("# Intro\n\n## Intro\n\n### Intro");
        assert!(html.contains("id=\"intro\""));
        assert!(html.contains("id=\"intro-1\""));
        assert!(html.contains("id=\"intro-2\""));
    }

    #[test]
    fn test_suffixed_ids_do_not_clash_with_numbered_headings() {
        let html = render_html("# Intro\n\n# Intro\n\n# Intro 1");
        assert_eq!(html.matches("id=\"intro-1\"").count(), 1);
        assert!(html.contains("id=\"intro-1-1\""));

        let html = render_html("# Intro 1\n\n# Intro\n\n# Intro");
        assert_eq!(html.matches("id=\"intro-1\"").count(), 1);
        assert!(html.contains("id=\"intro-2\""));
    }

    #[test]
    fn test_gfm_extensions() {
        let html = render_html("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n\n- [x] done");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
        assert!(html.contains("type=\"checkbox\""));
    }
}
