//! PDF serialization of paginated content

use crate::export::fonts::{Font, encode_win_ansi};
use crate::export::images::{EncodedImage, ImageFilter, ImageSet, encode_image};
use crate::export::layout::Item;
use crate::export::options::ExportOptions;
use crate::export::paginate::Page;
use crate::theme::Rgb;
use crate::{Error, Result};
use flate2::Compression;
use flate2::write::ZlibEncoder;
use pdf_writer::types::{ActionType, AnnotationType};
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, Str, TextStr};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::Write;
use tracing::debug;

const PRODUCER: &str = concat!("mdpdf ", env!("CARGO_PKG_VERSION"));

/// Placement of the content box on the paper
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    /// Paper size in points
    pub page_width: f32,
    pub page_height: f32,
    /// Top-left corner of the content box, in points from the top-left of the paper
    pub left: f32,
    pub top: f32,
    /// Points per CSS pixel
    pub scale: f32,
    /// Content box height in points
    pub content_height: f32,
}

impl PageGeometry {
    /// Fit a capture `viewport_width` CSS pixels wide to the printable width
    pub fn new(options: &ExportOptions, viewport_width: f32) -> Result<Self> {
        let (page_width, page_height) = options.page.size();
        let (printable_width, printable_height) = options.printable_area()?;
        if !(viewport_width.is_finite() && viewport_width > 0.0) {
            return Err(Error::Layout(format!(
                "cannot fit a capture {viewport_width}px wide"
            )));
        }
        Ok(Self {
            page_width,
            page_height,
            left: options.margins.left,
            top: options.margins.top,
            scale: printable_width / viewport_width,
            content_height: printable_height,
        })
    }

    /// Height of one page's content box in CSS pixels
    pub fn content_height_px(&self) -> f32 {
        self.content_height / self.scale
    }

    fn x(&self, x: f32) -> f32 {
        self.left + x * self.scale
    }

    /// PDF user space has its origin at the bottom left
    fn y(&self, y: f32) -> f32 {
        self.page_height - self.top - y * self.scale
    }

    fn len(&self, v: f32) -> f32 {
        v * self.scale
    }
}

/// Serialize `pages` into a complete PDF file
pub fn write_pdf(
    pages: &[Page],
    images: &ImageSet,
    geometry: &PageGeometry,
    options: &ExportOptions,
) -> Result<Vec<u8>> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let info_id = alloc.bump();
    let font_ids: Vec<(Font, Ref)> = Font::ALL.iter().map(|&font| (font, alloc.bump())).collect();

    let mut pdf = Pdf::new();

    // Each image is encoded once, at the largest size it is drawn at
    let mut display: BTreeMap<usize, (f32, f32)> = BTreeMap::new();
    for item in pages.iter().flat_map(|page| &page.items) {
        if let Item::Image {
            index,
            width,
            height,
            ..
        } = item
        {
            let size = display.entry(*index).or_insert((0.0, 0.0));
            *size = (size.0.max(*width), size.1.max(*height));
        }
    }
    let mut xobjects: BTreeMap<usize, (Ref, String)> = BTreeMap::new();
    for (&index, &size) in &display {
        let Some(image) = images.get(index) else {
            continue;
        };
        let encoded = encode_image(image, size, options.capture.scale, &options.image)?;
        debug!(
            index,
            width = encoded.width,
            height = encoded.height,
            bytes = encoded.data.len(),
            "embedding image"
        );
        let id = alloc.bump();
        write_image(&mut pdf, id, &encoded, options.compress)?;
        xobjects.insert(index, (id, format!("Im{index}")));
    }

    let mut page_ids = Vec::with_capacity(pages.len());
    for page in pages {
        let page_id = alloc.bump();
        let content_id = alloc.bump();
        page_ids.push(page_id);

        let (content, links) = page_content(page, geometry, &xobjects);
        write_stream(&mut pdf, content_id, &content, options.compress)?;
        let link_ids: Vec<Ref> = links.iter().map(|_| alloc.bump()).collect();

        let mut page_writer = pdf.page(page_id);
        page_writer.media_box(Rect::new(0.0, 0.0, geometry.page_width, geometry.page_height));
        page_writer.parent(tree_id);
        page_writer.contents(content_id);
        if !link_ids.is_empty() {
            page_writer.annotations(link_ids.iter().copied());
        }
        let mut resources = page_writer.resources();
        let mut fonts = resources.fonts();
        for (font, id) in &font_ids {
            fonts.pair(Name(font.resource_name().as_bytes()), *id);
        }
        fonts.finish();
        if !xobjects.is_empty() {
            let mut objects = resources.x_objects();
            for (id, name) in xobjects.values() {
                objects.pair(Name(name.as_bytes()), *id);
            }
            objects.finish();
        }
        resources.finish();
        page_writer.finish();

        for (id, (rect, url)) in link_ids.into_iter().zip(links) {
            let mut annotation = pdf.annotation(id);
            annotation.subtype(AnnotationType::Link);
            annotation.rect(rect);
            annotation.border(0.0, 0.0, 0.0, None);
            annotation
                .action()
                .action_type(ActionType::Uri)
                .uri(Str(url.as_bytes()));
            annotation.finish();
        }
    }

    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(i32::try_from(page_ids.len()).unwrap_or(i32::MAX));
    let title = options
        .filename
        .strip_suffix(".pdf")
        .unwrap_or(&options.filename);
    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr(PRODUCER));
    for (font, id) in &font_ids {
        pdf.type1_font(*id)
            .base_font(Name(font.base_name().as_bytes()))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    Ok(pdf.finish())
}

/// Build a page's content stream and collect its link areas
fn page_content(
    page: &Page,
    geometry: &PageGeometry,
    xobjects: &BTreeMap<usize, (Ref, String)>,
) -> (Vec<u8>, Vec<(Rect, String)>) {
    let mut content = Content::new();
    let mut links = Vec::new();
    let mut fill: Option<Rgb> = None;
    let mut set_fill = |content: &mut Content, color: Rgb| {
        if fill != Some(color) {
            let [r, g, b] = color.to_unit();
            content.set_fill_rgb(r, g, b);
            fill = Some(color);
        }
    };

    for item in &page.items {
        match item {
            Item::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                set_fill(&mut content, *color);
                content.rect(
                    geometry.x(*x),
                    geometry.y(*y + *height),
                    geometry.len(*width),
                    geometry.len(*height),
                );
                content.fill_nonzero();
            }
            Item::Text {
                x,
                y,
                text,
                font,
                size,
                color,
            } => {
                set_fill(&mut content, *color);
                content.begin_text();
                content.set_font(Name(font.resource_name().as_bytes()), geometry.len(*size));
                content.set_text_matrix([1.0, 0.0, 0.0, 1.0, geometry.x(*x), geometry.y(*y)]);
                content.show(Str(&encode_win_ansi(text)));
                content.end_text();
            }
            Item::Image {
                x,
                y,
                width,
                height,
                index,
            } => {
                let Some((_, name)) = xobjects.get(index) else {
                    continue;
                };
                let (w, h) = (geometry.len(*width), geometry.len(*height));
                content.save_state();
                content.transform([w, 0.0, 0.0, h, geometry.x(*x), geometry.y(*y) - h]);
                content.x_object(Name(name.as_bytes()));
                content.restore_state();
            }
            Item::Link {
                x,
                y,
                width,
                height,
                url,
            } => {
                let rect = Rect::new(
                    geometry.x(*x),
                    geometry.y(*y + *height),
                    geometry.x(*x + *width),
                    geometry.y(*y),
                );
                links.push((rect, url.clone()));
            }
        }
    }

    (content.finish(), links)
}

fn write_stream(pdf: &mut Pdf, id: Ref, data: &[u8], compress: bool) -> Result<()> {
    if compress {
        let compressed = deflate(data)?;
        pdf.stream(id, &compressed).filter(Filter::FlateDecode);
    } else {
        pdf.stream(id, data).finish();
    }
    Ok(())
}

fn write_image(pdf: &mut Pdf, id: Ref, encoded: &EncodedImage, compress: bool) -> Result<()> {
    let (data, filter) = match encoded.filter {
        ImageFilter::Dct => (Cow::Borrowed(encoded.data.as_slice()), Some(Filter::DctDecode)),
        ImageFilter::Raw if compress => {
            (Cow::Owned(deflate(&encoded.data)?), Some(Filter::FlateDecode))
        }
        ImageFilter::Raw => (Cow::Borrowed(encoded.data.as_slice()), None),
    };

    let mut image = pdf.image_xobject(id, &data);
    if let Some(filter) = filter {
        image.filter(filter);
    }
    image.width(i32::try_from(encoded.width).unwrap_or(i32::MAX));
    image.height(i32::try_from(encoded.height).unwrap_or(i32::MAX));
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();
    Ok(())
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
