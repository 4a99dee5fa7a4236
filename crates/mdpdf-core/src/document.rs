//! Structured view of the rendered preview
//!
//! The exporter does not lay out HTML; it lays out the same pulldown-cmark
//! event stream the preview renders, folded into a small block tree.

use crate::markdown::{parser_options, preview_source};
use pulldown_cmark::{Alignment, CodeBlockKind, Event, Parser, Tag, TagEnd};

/// Inline formatting of a text run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanStyle {
    pub bold: bool,
    pub italic: bool,
    pub code: bool,
    pub strike: bool,
    /// Link target, if the run is inside a link
    pub link: Option<String>,
}

/// A run of text with uniform formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::default(),
        }
    }
}

/// An image reference as written in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub url: String,
    pub alt: String,
    pub title: String,
}

/// One entry of a list
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    /// `Some` for task list items
    pub checked: Option<bool>,
    pub blocks: Vec<Block>,
}

/// A table cell's content
pub type Cell = Vec<Span>;

/// Block-level element of the rendered document
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Heading { level: u8, content: Vec<Span> },
    Paragraph(Vec<Span>),
    CodeBlock { language: Option<String>, code: String },
    Quote(Vec<Block>),
    List { start: Option<u64>, items: Vec<ListItem> },
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Cell>,
        rows: Vec<Vec<Cell>>,
    },
    /// A paragraph consisting only of an image
    Image(ImageRef),
    Rule,
    Footnote { label: String, blocks: Vec<Block> },
}

/// The rendered document handed to the exporter
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Render editor text the way the preview shows it (placeholder included)
    pub fn render(text: &str) -> Self {
        Self::from_markdown(preview_source(text))
    }

    /// Fold raw Markdown into blocks
    pub fn from_markdown(markdown: &str) -> Self {
        let mut builder = Builder::default();
        for event in Parser::new_ext(markdown, parser_options()) {
            builder.event(event);
        }
        builder.finish()
    }

    /// All images referenced by image blocks, in document order
    pub fn images(&self) -> Vec<&ImageRef> {
        fn walk<'a>(blocks: &'a [Block], out: &mut Vec<&'a ImageRef>) {
            for block in blocks {
                match block {
                    Block::Image(image) => out.push(image),
                    Block::Quote(inner) | Block::Footnote { blocks: inner, .. } => walk(inner, out),
                    Block::List { items, .. } => {
                        for item in items {
                            walk(&item.blocks, out);
                        }
                    }
                    _ => {}
                }
            }
        }

        let mut out = Vec::new();
        walk(&self.blocks, &mut out);
        out
    }
}

/// Where inline content is currently being collected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InlineTarget {
    Paragraph,
    Heading(u8),
    Cell,
    /// Text directly inside a tight list item
    Implicit,
}

#[derive(Debug)]
enum InlineItem {
    Span(Span),
    Image(ImageRef),
}

#[derive(Debug)]
enum Container {
    Quote(Vec<Block>),
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item {
        checked: Option<bool>,
        blocks: Vec<Block>,
    },
    Footnote {
        label: String,
        blocks: Vec<Block>,
    },
    Table {
        alignments: Vec<Alignment>,
        header: Vec<Cell>,
        rows: Vec<Vec<Cell>>,
        row: Vec<Cell>,
    },
}

impl Container {
    fn blocks_mut(&mut self) -> Option<&mut Vec<Block>> {
        match self {
            Self::Quote(blocks) | Self::Item { blocks, .. } | Self::Footnote { blocks, .. } => {
                Some(blocks)
            }
            Self::List { .. } | Self::Table { .. } => None,
        }
    }
}

#[derive(Debug, Default)]
struct Builder {
    blocks: Vec<Block>,
    stack: Vec<Container>,
    target: Option<InlineTarget>,
    inline: Vec<InlineItem>,
    bold: u32,
    italic: u32,
    strike: u32,
    links: Vec<String>,
    code_block: Option<(Option<String>, String)>,
    image: Option<ImageRef>,
}

impl Builder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(tag) => self.end(tag),
            Event::Text(text) | Event::Html(text) | Event::InlineHtml(text) => {
                if let Some((_, code)) = self.code_block.as_mut() {
                    code.push_str(&text);
                } else if let Some(image) = self.image.as_mut() {
                    image.alt.push_str(&text);
                } else {
                    self.push_text(&text, false);
                }
            }
            Event::Code(text) => self.push_text(&text, true),
            Event::InlineMath(text) | Event::DisplayMath(text) => self.push_text(&text, true),
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_text("\n", false),
            Event::FootnoteReference(label) => self.push_text(&format!("[{label}]"), false),
            Event::TaskListMarker(done) => {
                if let Some(Container::Item { checked, .. }) = self.stack.last_mut() {
                    *checked = Some(done);
                }
            }
            Event::Rule => {
                self.flush_implicit();
                self.push_block(Block::Rule);
            }
        }
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::HtmlBlock => self.open(InlineTarget::Paragraph),
            Tag::Heading { level, .. } => self.open(InlineTarget::Heading(level as u8)),
            Tag::BlockQuote { .. } => {
                self.flush_implicit();
                self.stack.push(Container::Quote(Vec::new()));
            }
            Tag::CodeBlock(kind) => {
                self.flush_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code_block = Some((language, String::new()));
            }
            Tag::List(start) => {
                self.flush_implicit();
                self.stack.push(Container::List {
                    start,
                    items: Vec::new(),
                });
            }
            Tag::Item => {
                self.flush_implicit();
                self.stack.push(Container::Item {
                    checked: None,
                    blocks: Vec::new(),
                });
            }
            Tag::FootnoteDefinition(label) => {
                self.flush_implicit();
                self.stack.push(Container::Footnote {
                    label: label.to_string(),
                    blocks: Vec::new(),
                });
            }
            Tag::Table(alignments) => {
                self.flush_implicit();
                self.stack.push(Container::Table {
                    alignments,
                    header: Vec::new(),
                    rows: Vec::new(),
                    row: Vec::new(),
                });
            }
            Tag::TableHead | Tag::TableRow => {
                if let Some(Container::Table { row, .. }) = self.stack.last_mut() {
                    row.clear();
                }
            }
            Tag::TableCell => self.open(InlineTarget::Cell),
            Tag::Emphasis => self.italic += 1,
            Tag::Strong => self.bold += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link { dest_url, .. } => self.links.push(dest_url.to_string()),
            Tag::Image {
                dest_url, title, ..
            } => {
                self.image = Some(ImageRef {
                    url: dest_url.to_string(),
                    alt: String::new(),
                    title: title.to_string(),
                });
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::HtmlBlock => self.close_paragraph(),
            TagEnd::Heading(_) => {
                if let Some(InlineTarget::Heading(level)) = self.target.take() {
                    let content = self.take_spans();
                    self.push_block(Block::Heading { level, content });
                }
            }
            TagEnd::BlockQuote { .. } => {
                self.flush_implicit();
                if let Some(Container::Quote(blocks)) = self.stack.pop() {
                    self.push_block(Block::Quote(blocks));
                }
            }
            TagEnd::CodeBlock => {
                if let Some((language, mut code)) = self.code_block.take() {
                    if code.ends_with('\n') {
                        code.pop();
                    }
                    self.push_block(Block::CodeBlock { language, code });
                }
            }
            TagEnd::List(_) => {
                if let Some(Container::List { start, items }) = self.stack.pop() {
                    self.push_block(Block::List { start, items });
                }
            }
            TagEnd::Item => {
                self.flush_implicit();
                if let Some(Container::Item { checked, blocks }) = self.stack.pop()
                    && let Some(Container::List { items, .. }) = self.stack.last_mut()
                {
                    items.push(ListItem { checked, blocks });
                }
            }
            TagEnd::FootnoteDefinition => {
                self.flush_implicit();
                if let Some(Container::Footnote { label, blocks }) = self.stack.pop() {
                    self.push_block(Block::Footnote { label, blocks });
                }
            }
            TagEnd::TableCell => {
                self.target = None;
                let cell = self.take_spans();
                if let Some(Container::Table { row, .. }) = self.stack.last_mut() {
                    row.push(cell);
                }
            }
            TagEnd::TableHead => {
                if let Some(Container::Table { header, row, .. }) = self.stack.last_mut() {
                    *header = std::mem::take(row);
                }
            }
            TagEnd::TableRow => {
                if let Some(Container::Table { rows, row, .. }) = self.stack.last_mut() {
                    rows.push(std::mem::take(row));
                }
            }
            TagEnd::Table => {
                if let Some(Container::Table {
                    alignments,
                    header,
                    rows,
                    ..
                }) = self.stack.pop()
                {
                    self.push_block(Block::Table {
                        alignments,
                        header,
                        rows,
                    });
                }
            }
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link => {
                self.links.pop();
            }
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    self.ensure_target();
                    self.inline.push(InlineItem::Image(image));
                }
            }
            _ => {}
        }
    }

    fn open(&mut self, target: InlineTarget) {
        self.flush_implicit();
        self.target = Some(target);
    }

    /// Inline content outside any paragraph belongs to a tight list item
    fn ensure_target(&mut self) {
        if self.target.is_none() {
            self.target = Some(InlineTarget::Implicit);
        }
    }

    fn flush_implicit(&mut self) {
        if self.target == Some(InlineTarget::Implicit) {
            self.close_paragraph();
        }
    }

    fn push_text(&mut self, text: &str, code: bool) {
        self.ensure_target();
        let style = SpanStyle {
            bold: self.bold > 0,
            italic: self.italic > 0,
            code,
            strike: self.strike > 0,
            link: self.links.last().cloned(),
        };

        if let Some(InlineItem::Span(last)) = self.inline.last_mut()
            && last.style == style
        {
            last.text.push_str(text);
            return;
        }
        self.inline.push(InlineItem::Span(Span {
            text: text.to_string(),
            style,
        }));
    }

    /// Drain inline items as spans, images degrading to their alt text
    fn take_spans(&mut self) -> Vec<Span> {
        self.inline
            .drain(..)
            .map(|item| match item {
                InlineItem::Span(span) => span,
                InlineItem::Image(image) => Span::plain(image.alt),
            })
            .collect()
    }

    fn close_paragraph(&mut self) {
        if self.target.take().is_none() && self.inline.is_empty() {
            return;
        }

        let only_images = self.inline.iter().all(|item| match item {
            InlineItem::Image(_) => true,
            InlineItem::Span(span) => span.text.trim().is_empty(),
        }) && self
            .inline
            .iter()
            .any(|item| matches!(item, InlineItem::Image(_)));

        if only_images {
            let images: Vec<ImageRef> = self
                .inline
                .drain(..)
                .filter_map(|item| match item {
                    InlineItem::Image(image) => Some(image),
                    InlineItem::Span(_) => None,
                })
                .collect();
            for image in images {
                self.push_block(Block::Image(image));
            }
            return;
        }

        let spans = self.take_spans();
        if spans.iter().any(|span| !span.text.is_empty()) {
            self.push_block(Block::Paragraph(spans));
        }
    }

    fn push_block(&mut self, block: Block) {
        let target = self.stack.iter_mut().rev().find_map(Container::blocks_mut);
        match target {
            Some(blocks) => blocks.push(block),
            None => self.blocks.push(block),
        }
    }

    fn finish(mut self) -> Document {
        self.flush_implicit();
        Document {
            blocks: self.blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markdown::{PLACEHOLDER_HEADING, PLACEHOLDER_INSTRUCTION};

    fn text_of(spans: &[Span]) -> String {
        spans.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_heading() {
        let doc = Document::render("# Hello");
        assert_eq!(
            doc.blocks,
            vec![Block::Heading {
                level: 1,
                content: vec![Span::plain("Hello")],
            }]
        );
    }

    #[test]
    fn test_empty_renders_placeholder() {
        let doc = Document::render("");
        assert_eq!(doc.blocks.len(), 2);
        match &doc.blocks[0] {
            Block::Heading { level: 1, content } => {
                assert_eq!(text_of(content), PLACEHOLDER_HEADING);
            }
            other => panic!("expected heading, got {other:?}"),
        }
        match &doc.blocks[1] {
            Block::Paragraph(spans) => assert_eq!(text_of(spans), PLACEHOLDER_INSTRUCTION),
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn test_inline_styles() {
        let doc = Document::from_markdown("a **b** *c* `d` ~~e~~ [f](https://x.io)");
        let Block::Paragraph(spans) = &doc.blocks[0] else {
            panic!("expected paragraph");
        };
        assert!(spans.iter().any(|s| s.text == "b" && s.style.bold));
        assert!(spans.iter().any(|s| s.text == "c" && s.style.italic));
        assert!(spans.iter().any(|s| s.text == "d" && s.style.code));
        assert!(spans.iter().any(|s| s.text == "e" && s.style.strike));
        assert!(spans
            .iter()
            .any(|s| s.text == "f" && s.style.link.as_deref() == Some("https://x.io")));
    }

    #[test]
    fn test_tight_and_task_lists() {
        let doc = Document::from_markdown("- one\n- [x] two\n  - nested");
        let Block::List { start, items } = &doc.blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(*start, None);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].checked, None);
        assert_eq!(items[1].checked, Some(true));
        assert!(matches!(&items[0].blocks[0], Block::Paragraph(s) if text_of(s) == "one"));
        assert!(matches!(&items[1].blocks[1], Block::List { .. }));
    }

    #[test]
    fn test_ordered_list_start() {
        let doc = Document::from_markdown("3. three\n4. four");
        assert!(matches!(
            &doc.blocks[0],
            Block::List { start: Some(3), items } if items.len() == 2
        ));
    }

    #[test]
    fn test_code_block() {
        let doc = Document::from_markdown("```rust ignore\nfn main() {}\n```");
        assert_eq!(
            doc.blocks[0],
            Block::CodeBlock {
                language: Some("rust".to_string()),
                code: "fn main() {}".to_string(),
            }
        );
    }

    #[test]
    fn test_quote_and_rule() {
        let doc = Document::from_markdown("> quoted\n\n---");
        assert!(matches!(&doc.blocks[0], Block::Quote(inner) if inner.len() == 1));
        assert_eq!(doc.blocks[1], Block::Rule);
    }

    #[test]
    fn test_table() {
        let doc = Document::from_markdown("| a | b |\n|:--|--:|\n| 1 | 2 |\n| 3 | 4 |");
        let Block::Table {
            alignments,
            header,
            rows,
        } = &doc.blocks[0]
        else {
            panic!("expected table");
        };
        assert_eq!(alignments, &vec![Alignment::Left, Alignment::Right]);
        assert_eq!(header.len(), 2);
        assert_eq!(rows.len(), 2);
        assert_eq!(text_of(&rows[1][1]), "4");
    }

    #[test]
    fn test_standalone_image_becomes_block() {
        let doc =
            Document::from_markdown("![logo](img/logo.png \"Logo\")\n\ntext ![x](y.png) inline");
        assert_eq!(
            doc.blocks[0],
            Block::Image(ImageRef {
                url: "img/logo.png".to_string(),
                alt: "logo".to_string(),
                title: "Logo".to_string(),
            })
        );
        assert!(matches!(&doc.blocks[1], Block::Paragraph(s) if text_of(s) == "text x inline"));
        assert_eq!(doc.images().len(), 1);
    }

    #[test]
    fn test_hard_break_kept_as_newline() {
        let doc = Document::from_markdown("line one  \nline two");
        assert!(matches!(
            &doc.blocks[0],
            Block::Paragraph(s) if text_of(s) == "line one\nline two"
        ));
    }
}
