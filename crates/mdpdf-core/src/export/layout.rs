//! Block layout in CSS pixels
//!
//! The preview is laid out at the width it was captured at, as one continuous
//! column. Every leaf block becomes a [`Fragment`] at an absolute offset in
//! that column; pagination later slices the column into pages. Container
//! blocks (quotes, lists, footnotes) decorate the fragments of their children
//! instead of producing their own.

use crate::document::{Block, Document, ImageRef, ListItem, Span, SpanStyle};
use crate::export::fonts::Font;
use crate::export::images::ImageSet;
use crate::theme::{Palette, Rgb};
use pulldown_cmark::Alignment;

/// Padding of the preview container on every side
pub const CONTENT_PADDING: f32 = 24.0;

const MIN_CONTENT_WIDTH: f32 = 32.0;
const BODY_SIZE: f32 = 16.0;
const BODY_LINE_HEIGHT: f32 = 1.5;
const HEADING_LINE_HEIGHT: f32 = 1.25;
/// Heading font sizes in em, h1 through h6
const HEADING_SCALE: [f32; 6] = [2.0, 1.5, 1.17, 1.0, 0.83, 0.67];
/// Heading vertical margins, in em of the heading's own size
const HEADING_MARGIN: [f32; 6] = [0.67, 0.83, 1.0, 1.33, 1.67, 2.33];
const BLOCK_MARGIN: f32 = 16.0;
const LIST_ITEM_GAP: f32 = 4.0;
const RULE_MARGIN: f32 = 24.0;
const RULE_HEIGHT: f32 = 2.0;
const LIST_INDENT: f32 = 40.0;
const MARKER_GAP: f32 = 8.0;
const CHECKBOX_SIZE: f32 = 12.0;
const QUOTE_BAR: f32 = 4.0;
const QUOTE_INDENT: f32 = 20.0;
const CODE_SIZE: f32 = 13.0;
const CODE_LINE_HEIGHT: f32 = 1.45;
const CODE_PADDING: f32 = 12.0;
const INLINE_CODE_SCALE: f32 = 0.875;
const CELL_PADDING_X: f32 = 8.0;
const CELL_PADDING_Y: f32 = 6.0;
const TAB_WIDTH: usize = 4;
/// Share of the font size above the baseline
const ASCENT: f32 = 0.8;
const BULLET: &str = "\u{2022}";

/// A drawing primitive, positioned relative to its fragment's top edge
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    /// A run of text; `y` is the baseline
    Text {
        x: f32,
        y: f32,
        text: String,
        font: Font,
        size: f32,
        color: Rgb,
    },
    /// A filled rectangle; `y` is the top edge
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        color: Rgb,
    },
    /// An image from the [`ImageSet`], by index
    Image {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        index: usize,
    },
    /// A clickable area pointing at a URL
    Link {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
        url: String,
    },
}

impl Item {
    /// Move the item down by `dy`
    pub fn shift(&mut self, dy: f32) {
        match self {
            Self::Text { y, .. }
            | Self::Rect { y, .. }
            | Self::Image { y, .. }
            | Self::Link { y, .. } => *y += dy,
        }
    }
}

/// A laid out leaf block
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    /// Offset of the top edge from the top of the column
    pub top: f32,
    pub height: f32,
    /// Drawing primitives, relative to `top`
    pub items: Vec<Item>,
    /// Offsets relative to `top` where the fragment may be split, ascending
    pub breakpoints: Vec<f32>,
    /// Baseline of the first line of text
    pub first_baseline: Option<f32>,
}

/// The whole column
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub width: f32,
    /// Column height including the container padding
    pub height: f32,
    pub fragments: Vec<Fragment>,
}

/// Lay out a document in a column `width` CSS pixels wide
///
/// Images are shrunk to fit `max_image_height` so that each one fits on a
/// single page.
pub fn layout_document(
    document: &Document,
    palette: &Palette,
    images: &ImageSet,
    width: f32,
    max_image_height: f32,
) -> Layout {
    let frame = Frame {
        x: CONTENT_PADDING,
        width: (width - 2.0 * CONTENT_PADDING).max(MIN_CONTENT_WIDTH),
        color: palette.text,
        compact: false,
    };
    let mut layouter = Layouter {
        palette,
        images,
        max_image_height: max_image_height.max(1.0),
        fragments: Vec::new(),
        cursor: CONTENT_PADDING,
        pending_margin: None,
    };
    for block in &document.blocks {
        layouter.block(block, frame);
    }

    Layout {
        width,
        height: layouter.cursor + CONTENT_PADDING,
        fragments: layouter.fragments,
    }
}

/// Horizontal extent and inherited style of a block container
#[derive(Debug, Clone, Copy)]
struct Frame {
    x: f32,
    width: f32,
    color: Rgb,
    /// Inside a list item, where paragraphs sit closer together
    compact: bool,
}

impl Frame {
    fn indent(self, by: f32) -> Self {
        Self {
            x: self.x + by,
            width: (self.width - by).max(MIN_CONTENT_WIDTH),
            ..self
        }
    }

    fn paragraph_margin(self) -> f32 {
        if self.compact {
            LIST_ITEM_GAP
        } else {
            BLOCK_MARGIN
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    line_height: f32,
    bold: bool,
    color: Rgb,
}

impl TextStyle {
    fn body(color: Rgb) -> Self {
        Self {
            size: BODY_SIZE,
            line_height: BODY_SIZE * BODY_LINE_HEIGHT,
            bold: false,
            color,
        }
    }
}

enum Marker {
    Text(String),
    Checkbox(bool),
}

struct Layouter<'a> {
    palette: &'a Palette,
    images: &'a ImageSet,
    max_image_height: f32,
    fragments: Vec<Fragment>,
    /// Bottom edge of the last placed fragment
    cursor: f32,
    /// Collapsed margin waiting below the last fragment; `None` before the first
    pending_margin: Option<f32>,
}

impl Layouter<'_> {
    fn block(&mut self, block: &Block, frame: Frame) {
        match block {
            Block::Heading { level, content } => self.heading(*level, content, frame),
            Block::Paragraph(spans) => {
                let body = self.inline(spans, TextStyle::body(frame.color), frame, Alignment::None);
                let margin = frame.paragraph_margin();
                self.place(margin, body, margin);
            }
            Block::CodeBlock { code, .. } => self.code_block(code, frame),
            Block::Quote(blocks) => self.quote(blocks, frame),
            Block::List { start, items } => self.list(*start, items, frame),
            Block::Table {
                alignments,
                header,
                rows,
            } => self.table(alignments, header, rows, frame),
            Block::Image(image) => self.image(image, frame),
            Block::Rule => self.rule(frame),
            Block::Footnote { label, blocks } => {
                self.collapse(BLOCK_MARGIN);
                let inner = Frame {
                    compact: true,
                    ..frame.indent(LIST_INDENT)
                };
                self.marked(Marker::Text(format!("[{label}]")), blocks, inner);
                self.collapse(BLOCK_MARGIN);
            }
        }
    }

    /// Append a fragment below the cursor, collapsing adjacent margins
    fn place(&mut self, margin_top: f32, mut fragment: Fragment, margin_bottom: f32) {
        let gap = self.pending_margin.map_or(0.0, |m| m.max(margin_top));
        fragment.top = self.cursor + gap;
        self.cursor = fragment.top + fragment.height;
        self.pending_margin = Some(margin_bottom);
        self.fragments.push(fragment);
    }

    /// Merge a container margin into the pending one
    fn collapse(&mut self, margin: f32) {
        if let Some(pending) = self.pending_margin.as_mut() {
            *pending = pending.max(margin);
        }
    }

    fn heading(&mut self, level: u8, content: &[Span], frame: Frame) {
        let idx = usize::from(level.clamp(1, 6)) - 1;
        let size = BODY_SIZE * HEADING_SCALE[idx];
        let style = TextStyle {
            size,
            line_height: size * HEADING_LINE_HEIGHT,
            bold: true,
            color: self.palette.heading(level),
        };
        let mut body = self.inline(content, style, frame, Alignment::None);
        // Headings are never split
        body.breakpoints.clear();

        if level <= 2 {
            let y = body.height + size * 0.3;
            body.items.push(Item::Rect {
                x: frame.x,
                y,
                width: frame.width,
                height: 1.0,
                color: self.palette.rule,
            });
            body.height = y + 1.0;
        }

        let margin = HEADING_MARGIN[idx] * size;
        self.place(margin, body, margin);
    }

    fn code_block(&mut self, code: &str, frame: Frame) {
        let line_height = CODE_SIZE * CODE_LINE_HEIGHT;
        let inner = (frame.width - 2.0 * CODE_PADDING).max(CODE_SIZE);
        let columns = ((inner / Font::Mono.text_width("M", CODE_SIZE)).floor() as usize).max(1);

        let mut body = Fragment::default();
        let mut y = CODE_PADDING;
        for (i, line) in wrap_code(code, columns).into_iter().enumerate() {
            if i > 0 {
                body.breakpoints.push(y);
            }
            let baseline = baseline_in(y, line_height, CODE_SIZE);
            body.first_baseline.get_or_insert(baseline);
            if !line.is_empty() {
                body.items.push(Item::Text {
                    x: frame.x + CODE_PADDING,
                    y: baseline,
                    text: line,
                    font: Font::Mono,
                    size: CODE_SIZE,
                    color: self.palette.code_text,
                });
            }
            y += line_height;
        }
        body.height = y + CODE_PADDING;
        body.items.insert(
            0,
            Item::Rect {
                x: frame.x,
                y: 0.0,
                width: frame.width,
                height: body.height,
                color: self.palette.code_background,
            },
        );

        self.place(BLOCK_MARGIN, body, BLOCK_MARGIN);
    }

    fn quote(&mut self, blocks: &[Block], frame: Frame) {
        self.collapse(BLOCK_MARGIN);
        let start = self.fragments.len();
        let inner = Frame {
            color: self.palette.quote_text,
            compact: false,
            ..frame.indent(QUOTE_INDENT)
        };
        for block in blocks {
            self.block(block, inner);
        }

        // The bar runs through the gaps between the quote's fragments
        let end = self.fragments.len();
        for i in start..end {
            let height = if i + 1 < end {
                self.fragments[i + 1].top - self.fragments[i].top
            } else {
                self.fragments[i].height
            };
            self.fragments[i].items.insert(
                0,
                Item::Rect {
                    x: frame.x,
                    y: 0.0,
                    width: QUOTE_BAR,
                    height,
                    color: self.palette.quote_bar,
                },
            );
        }
        self.collapse(BLOCK_MARGIN);
    }

    fn list(&mut self, start: Option<u64>, items: &[ListItem], frame: Frame) {
        let margin = if frame.compact { 0.0 } else { BLOCK_MARGIN };
        self.collapse(margin);
        let inner = Frame {
            compact: true,
            ..frame.indent(LIST_INDENT)
        };
        for (number, item) in (start.unwrap_or(1)..).zip(items) {
            let marker = match (item.checked, start) {
                (Some(done), _) => Marker::Checkbox(done),
                (None, Some(_)) => Marker::Text(format!("{number}.")),
                (None, None) => Marker::Text(BULLET.to_string()),
            };
            self.marked(marker, &item.blocks, inner);
        }
        self.collapse(margin);
    }

    /// Lay out `blocks` and hang a marker left of their first line
    fn marked(&mut self, marker: Marker, blocks: &[Block], inner: Frame) {
        let start = self.fragments.len();
        for block in blocks {
            self.block(block, inner);
        }
        if self.fragments.len() == start {
            let line_height = BODY_SIZE * BODY_LINE_HEIGHT;
            let empty = Fragment {
                height: line_height,
                first_baseline: Some(baseline_in(0.0, line_height, BODY_SIZE)),
                ..Fragment::default()
            };
            self.place(LIST_ITEM_GAP, empty, LIST_ITEM_GAP);
        }

        let fragment = &mut self.fragments[start];
        let baseline = fragment
            .first_baseline
            .unwrap_or_else(|| baseline_in(0.0, BODY_SIZE * BODY_LINE_HEIGHT, BODY_SIZE));
        match marker {
            Marker::Text(text) => {
                let width = Font::Regular.text_width(&text, BODY_SIZE);
                fragment.items.push(Item::Text {
                    x: inner.x - width - MARKER_GAP,
                    y: baseline,
                    text,
                    font: Font::Regular,
                    size: BODY_SIZE,
                    color: inner.color,
                });
            }
            Marker::Checkbox(done) => {
                let x = inner.x - CHECKBOX_SIZE - MARKER_GAP;
                let y = baseline - CHECKBOX_SIZE + 1.0;
                fragment
                    .items
                    .extend(outline(x, y, CHECKBOX_SIZE, CHECKBOX_SIZE, inner.color));
                if done {
                    fragment.items.push(Item::Rect {
                        x: x + 3.0,
                        y: y + 3.0,
                        width: CHECKBOX_SIZE - 6.0,
                        height: CHECKBOX_SIZE - 6.0,
                        color: inner.color,
                    });
                }
            }
        }
    }

    fn table(
        &mut self,
        alignments: &[Alignment],
        header: &[Vec<Span>],
        rows: &[Vec<Vec<Span>>],
        frame: Frame,
    ) {
        let columns = rows.iter().map(Vec::len).fold(header.len(), usize::max);
        if columns == 0 {
            return;
        }
        let column_width = frame.width / columns as f32;
        let border = self.palette.table_border;

        let mut body = Fragment::default();
        let mut y = 0.0;
        let all_rows = std::iter::once((header, true))
            .chain(rows.iter().map(|r| (r.as_slice(), false)));
        for (i, (row, is_header)) in all_rows.enumerate() {
            if i > 0 {
                body.breakpoints.push(y);
            }
            let style = TextStyle {
                bold: is_header,
                ..TextStyle::body(frame.color)
            };
            let cells: Vec<Fragment> = (0..columns)
                .map(|c| {
                    let spans = row.get(c).map_or(&[][..], Vec::as_slice);
                    let align = alignments.get(c).copied().unwrap_or(Alignment::None);
                    let cell_frame = Frame {
                        x: frame.x + c as f32 * column_width + CELL_PADDING_X,
                        width: (column_width - 2.0 * CELL_PADDING_X).max(1.0),
                        ..frame
                    };
                    self.inline(spans, style, cell_frame, align)
                })
                .collect();
            let tallest = cells.iter().map(|c| c.height).fold(0.0, f32::max);
            let row_height = tallest + 2.0 * CELL_PADDING_Y;

            if is_header {
                body.items.push(Item::Rect {
                    x: frame.x,
                    y,
                    width: frame.width,
                    height: row_height,
                    color: self.palette.table_header,
                });
            }
            for cell in cells {
                if body.first_baseline.is_none() {
                    body.first_baseline = cell.first_baseline.map(|b| b + y + CELL_PADDING_Y);
                }
                for mut item in cell.items {
                    item.shift(y + CELL_PADDING_Y);
                    body.items.push(item);
                }
            }

            body.items.push(Item::Rect {
                x: frame.x,
                y,
                width: frame.width,
                height: 1.0,
                color: border,
            });
            for c in 0..=columns {
                let x = frame.x + c as f32 * column_width;
                body.items.push(Item::Rect {
                    x: if c == columns { x - 1.0 } else { x },
                    y,
                    width: 1.0,
                    height: row_height,
                    color: border,
                });
            }
            y += row_height;
        }
        body.items.push(Item::Rect {
            x: frame.x,
            y,
            width: frame.width,
            height: 1.0,
            color: border,
        });
        body.height = y + 1.0;

        self.place(BLOCK_MARGIN, body, BLOCK_MARGIN);
    }

    fn image(&mut self, image: &ImageRef, frame: Frame) {
        let placed = self
            .images
            .index_of(&image.url)
            .and_then(|index| self.images.get(index).map(|img| (index, img.natural_size())));

        let margin = frame.paragraph_margin();
        match placed {
            Some((index, (w, h))) if w > 0 && h > 0 => {
                let (natural_w, natural_h) = (w as f32, h as f32);
                let mut width = natural_w.min(frame.width);
                let mut height = natural_h * width / natural_w;
                if height > self.max_image_height {
                    width *= self.max_image_height / height;
                    height = self.max_image_height;
                }
                let body = Fragment {
                    height,
                    items: vec![Item::Image {
                        x: frame.x,
                        y: 0.0,
                        width,
                        height,
                        index,
                    }],
                    ..Fragment::default()
                };
                self.place(margin, body, margin);
            }
            _ => {
                let text = if image.alt.is_empty() { &image.url } else { &image.alt };
                let alt = [Span {
                    text: text.clone(),
                    style: SpanStyle {
                        italic: true,
                        ..SpanStyle::default()
                    },
                }];
                let body = self.inline(&alt, TextStyle::body(frame.color), frame, Alignment::None);
                self.place(margin, body, margin);
            }
        }
    }

    fn rule(&mut self, frame: Frame) {
        let body = Fragment {
            height: RULE_HEIGHT,
            items: vec![Item::Rect {
                x: frame.x,
                y: 0.0,
                width: frame.width,
                height: RULE_HEIGHT,
                color: self.palette.rule,
            }],
            ..Fragment::default()
        };
        self.place(RULE_MARGIN, body, RULE_MARGIN);
    }

    fn inline(&self, spans: &[Span], style: TextStyle, frame: Frame, align: Alignment) -> Fragment {
        let mut breaker = LineBreaker {
            palette: self.palette,
            style,
            width: frame.width,
            current: Line::default(),
            done: Vec::new(),
        };
        for token in tokenize(spans) {
            match token {
                Token::Chunk(pieces) => breaker.chunk(&pieces),
                Token::Space => breaker.current.space_pending = !breaker.current.runs.is_empty(),
                Token::Break => breaker.newline(),
            }
        }
        breaker.finish(frame.x, align)
    }
}

fn baseline_in(line_top: f32, line_height: f32, size: f32) -> f32 {
    line_top + (line_height - size) / 2.0 + size * ASCENT
}

/// Four 1px rects tracing a box
fn outline(x: f32, y: f32, width: f32, height: f32, color: Rgb) -> [Item; 4] {
    let rect = |x, y, width, height| Item::Rect {
        x,
        y,
        width,
        height,
        color,
    };
    [
        rect(x, y, width, 1.0),
        rect(x, y + height - 1.0, width, 1.0),
        rect(x, y, 1.0, height),
        rect(x + width - 1.0, y, 1.0, height),
    ]
}

/// Split code into display lines, expanding tabs and wrapping at `columns`
fn wrap_code(code: &str, columns: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for raw in code.split('\n') {
        let chars: Vec<char> = expand_tabs(raw.trim_end_matches('\r')).chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }
        lines.extend(chars.chunks(columns).map(|chunk| chunk.iter().collect::<String>()));
    }
    lines
}

fn expand_tabs(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut column = 0;
    for ch in line.chars() {
        if ch == '\t' {
            let fill = TAB_WIDTH - column % TAB_WIDTH;
            out.extend(std::iter::repeat_n(' ', fill));
            column += fill;
        } else {
            out.push(ch);
            column += 1;
        }
    }
    out
}

struct Piece<'s> {
    text: &'s str,
    style: &'s SpanStyle,
}

enum Token<'s> {
    /// Words with no whitespace between them; lines only break between chunks
    Chunk(Vec<Piece<'s>>),
    Space,
    Break,
}

fn tokenize(spans: &[Span]) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chunk: Vec<Piece<'_>> = Vec::new();

    for span in spans {
        let mut word_start = None;
        for (i, ch) in span.text.char_indices() {
            if ch.is_whitespace() {
                if let Some(start) = word_start.take() {
                    chunk.push(Piece {
                        text: &span.text[start..i],
                        style: &span.style,
                    });
                }
                if !chunk.is_empty() {
                    tokens.push(Token::Chunk(std::mem::take(&mut chunk)));
                }
                if ch == '\n' {
                    tokens.push(Token::Break);
                } else if !matches!(tokens.last(), Some(Token::Space)) {
                    tokens.push(Token::Space);
                }
            } else if word_start.is_none() {
                word_start = Some(i);
            }
        }
        if let Some(start) = word_start {
            chunk.push(Piece {
                text: &span.text[start..],
                style: &span.style,
            });
        }
    }
    if !chunk.is_empty() {
        tokens.push(Token::Chunk(chunk));
    }
    tokens
}

#[derive(Debug, Clone, PartialEq)]
struct RunStyle {
    font: Font,
    size: f32,
    color: Rgb,
    code: bool,
    strike: bool,
    link: Option<String>,
}

#[derive(Debug)]
struct Run {
    x: f32,
    width: f32,
    text: String,
    style: RunStyle,
}

#[derive(Debug, Default)]
struct Line {
    runs: Vec<Run>,
    width: f32,
    space_pending: bool,
}

struct LineBreaker<'p> {
    palette: &'p Palette,
    style: TextStyle,
    width: f32,
    current: Line,
    done: Vec<Line>,
}

impl LineBreaker<'_> {
    fn run_style(&self, span: &SpanStyle) -> RunStyle {
        let size = if span.code {
            self.style.size * INLINE_CODE_SCALE
        } else {
            self.style.size
        };
        let color = if span.link.is_some() {
            self.palette.link
        } else if span.code {
            self.palette.code_text
        } else {
            self.style.color
        };
        RunStyle {
            font: Font::for_style(self.style.bold || span.bold, span.italic, span.code),
            size,
            color,
            code: span.code,
            strike: span.strike,
            link: span.link.clone(),
        }
    }

    fn newline(&mut self) {
        self.done.push(std::mem::take(&mut self.current));
    }

    fn chunk(&mut self, pieces: &[Piece<'_>]) {
        let styled: Vec<(RunStyle, &str, f32)> = pieces
            .iter()
            .map(|piece| {
                let style = self.run_style(piece.style);
                let width = style.font.text_width(piece.text, style.size);
                (style, piece.text, width)
            })
            .collect();
        let Some((first_style, _, _)) = styled.first() else {
            return;
        };
        let chunk_width: f32 = styled.iter().map(|(_, _, w)| w).sum();

        let space = if self.current.space_pending {
            first_style.font.text_width(" ", first_style.size)
        } else {
            0.0
        };
        self.current.space_pending = false;
        let has_content = !self.current.runs.is_empty();
        if has_content && self.current.width + space + chunk_width > self.width {
            self.newline();
        } else if space > 0.0 {
            let joins = self
                .current
                .runs
                .last()
                .is_some_and(|run| run.style == *first_style);
            if joins {
                self.append(" ", first_style.clone(), space);
            } else {
                self.current.width += space;
            }
        }

        for (style, text, width) in styled {
            if self.current.width + width > self.width {
                self.split_word(text, &style);
            } else {
                self.append(text, style, width);
            }
        }
    }

    /// Place a word too long for any line, breaking between characters
    fn split_word(&mut self, text: &str, style: &RunStyle) {
        let mut buf = String::new();
        let mut buf_width = 0.0;
        for ch in text.chars() {
            let advance = f32::from(style.font.advance(ch)) * style.size / 1000.0;
            let used = self.current.width + buf_width;
            if used + advance > self.width && used > 0.0 {
                if !buf.is_empty() {
                    self.append(&std::mem::take(&mut buf), style.clone(), buf_width);
                }
                buf_width = 0.0;
                self.newline();
            }
            buf.push(ch);
            buf_width += advance;
        }
        if !buf.is_empty() {
            self.append(&buf, style.clone(), buf_width);
        }
    }

    fn append(&mut self, text: &str, style: RunStyle, width: f32) {
        let line = &mut self.current;
        match line.runs.last_mut() {
            Some(last)
                if last.style == style && (last.x + last.width - line.width).abs() < 0.01 =>
            {
                last.text.push_str(text);
                last.width += width;
            }
            _ => line.runs.push(Run {
                x: line.width,
                width,
                text: text.to_string(),
                style,
            }),
        }
        line.width += width;
    }

    fn finish(mut self, x0: f32, align: Alignment) -> Fragment {
        self.newline();
        let line_height = self.style.line_height;
        let mut body = Fragment::default();
        let mut y = 0.0;

        for (i, line) in self.done.into_iter().enumerate() {
            if i > 0 {
                body.breakpoints.push(y);
            }
            let slack = (self.width - line.width).max(0.0);
            let offset = match align {
                Alignment::Center => slack / 2.0,
                Alignment::Right => slack,
                Alignment::Left | Alignment::None => 0.0,
            };
            let baseline = baseline_in(y, line_height, self.style.size);
            body.first_baseline.get_or_insert(baseline);

            for run in line.runs {
                let x = x0 + offset + run.x;
                emit_run(&mut body.items, run, x, y, line_height, baseline, self.palette);
            }
            y += line_height;
        }
        body.height = y;
        body
    }
}

fn emit_run(
    items: &mut Vec<Item>,
    run: Run,
    x: f32,
    line_top: f32,
    line_height: f32,
    baseline: f32,
    palette: &Palette,
) {
    let Run {
        width, text, style, ..
    } = run;
    if style.code {
        items.push(Item::Rect {
            x: x - 2.0,
            y: baseline - style.size * 0.95,
            width: width + 4.0,
            height: style.size * 1.25,
            color: palette.code_background,
        });
    }
    items.push(Item::Text {
        x,
        y: baseline,
        text,
        font: style.font,
        size: style.size,
        color: style.color,
    });
    if style.strike {
        items.push(Item::Rect {
            x,
            y: baseline - style.size * 0.3,
            width,
            height: 1.0,
            color: style.color,
        });
    }
    if let Some(url) = style.link {
        items.push(Item::Rect {
            x,
            y: baseline + 2.0,
            width,
            height: 1.0,
            color: style.color,
        });
        items.push(Item::Link {
            x,
            y: line_top,
            width,
            height: line_height,
            url,
        });
    }
}
