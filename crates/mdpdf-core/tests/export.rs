//! Integration tests for the preview to PDF pipeline

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use image::{Rgb, RgbImage};
use mdpdf_core::document::Document;
use mdpdf_core::export::images::ImageSet;
use mdpdf_core::export::layout::{Item, layout_document};
use mdpdf_core::export::options::{CaptureOptions, PageBreakMode};
use mdpdf_core::export::paginate::{Page, paginate};
use mdpdf_core::export::pdf::PageGeometry;
use mdpdf_core::prelude::*;
use std::path::PathBuf;

fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("mdpdf-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

/// 26 one-line paragraphs followed by a 20-line code block that straddles
/// the first page break at the default capture width
fn straddling_document() -> String {
    let mut markdown = String::new();
    for i in 0..26 {
        markdown.push_str(&format!("paragraph {i}\n\n"));
    }
    markdown.push_str("```\n");
    for i in 0..20 {
        markdown.push_str(&format!("code line {i}\n"));
    }
    markdown.push_str("```\n");
    markdown
}

fn paginate_with(markdown: &str, mode: PageBreakMode) -> Vec<Page> {
    let options = ExportOptions::default().with_page_break(mode);
    let geometry = PageGeometry::new(&options, Viewport::DEFAULT.width).expect("geometry");
    let palette = Theme::Simple.palette();
    let layout = layout_document(
        &Document::from_markdown(markdown),
        &palette,
        &ImageSet::default(),
        Viewport::DEFAULT.width,
        geometry.content_height_px(),
    );
    paginate(&layout, geometry.content_height_px(), mode)
}

/// Indices of the pages showing any text that starts with `prefix`
fn pages_with(pages: &[Page], prefix: &str) -> Vec<usize> {
    pages
        .iter()
        .enumerate()
        .filter(|(_, page)| {
            page.items
                .iter()
                .any(|item| matches!(item, Item::Text { text, .. } if text.starts_with(prefix)))
        })
        .map(|(i, _)| i)
        .collect()
}

#[test]
fn hello_renders_single_letter_page() {
    let capture = PreviewCapture::new("# Hello", Theme::Simple, Viewport::DEFAULT);
    let pdf = render_pdf(&capture, &ExportOptions::default()).expect("render");

    assert!(pdf.bytes.starts_with(b"%PDF-"));
    assert_eq!(pdf.page_count, 1);
    assert!(contains(&pdf.bytes, "/MediaBox [0 0 612 792]"));
    assert!(contains(&pdf.bytes, "/FlateDecode"));
}

#[test]
fn empty_editor_exports_placeholder() {
    let capture = PreviewCapture::new("", Theme::Simple, Viewport::DEFAULT);
    let options = ExportOptions::default().with_compress(false);
    let pdf = render_pdf(&capture, &options).expect("render");

    assert!(contains(&pdf.bytes, "(Preview will appear here) Tj"));
}

#[test]
fn long_document_spans_pages() {
    let markdown = (0..200)
        .map(|i| format!("Paragraph number {i} with some text."))
        .collect::<Vec<_>>()
        .join("\n\n");
    let capture = PreviewCapture::new(&markdown, Theme::Simple, Viewport::DEFAULT);
    let pdf = render_pdf(&capture, &ExportOptions::default()).expect("render");

    assert!(pdf.page_count > 1);
    assert!(contains(&pdf.bytes, &format!("/Count {}", pdf.page_count)));
}

#[test]
fn avoid_all_keeps_block_together() {
    let pages = paginate_with(&straddling_document(), PageBreakMode::AvoidAll);
    assert_eq!(pages_with(&pages, "code line"), vec![1]);
    assert_eq!(pages_with(&pages, "paragraph 25"), vec![0]);
}

#[test]
fn auto_mode_splits_block_between_lines() {
    let pages = paginate_with(&straddling_document(), PageBreakMode::Auto);
    assert_eq!(pages_with(&pages, "code line"), vec![0, 1]);
}

#[test]
fn wider_capture_shrinks_content() {
    let narrow = PageGeometry::new(&ExportOptions::default(), 468.0).expect("geometry");
    let wide = PageGeometry::new(&ExportOptions::default(), 936.0).expect("geometry");
    assert!(wide.scale < narrow.scale);
    assert!(wide.content_height_px() > narrow.content_height_px());
}

#[test]
fn themes_produce_different_output() {
    let options = ExportOptions::default().with_compress(false);
    let simple = render_pdf(
        &PreviewCapture::new("# Title", Theme::Simple, Viewport::DEFAULT),
        &options,
    )
    .expect("render");
    let colorful = render_pdf(
        &PreviewCapture::new("# Title", Theme::Colorful, Viewport::DEFAULT),
        &options,
    )
    .expect("render");
    assert_ne!(simple.bytes, colorful.bytes);
}

#[test]
fn local_image_is_embedded() {
    let dir = scratch_dir("image");
    let mut img = RgbImage::new(40, 20);
    for pixel in img.pixels_mut() {
        *pixel = Rgb([200, 30, 30]);
    }
    img.save(dir.join("pic.png")).expect("write png");

    let capture = PreviewCapture::new("![pic](pic.png)", Theme::Simple, Viewport::DEFAULT)
        .with_base_dir(&dir);
    let pdf = render_pdf(&capture, &ExportOptions::default()).expect("render");

    assert!(contains(&pdf.bytes, "/Subtype /Image"));
    assert!(contains(&pdf.bytes, "/DCTDecode"));

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn blocked_remote_image_falls_back_to_alt_text() {
    let options = ExportOptions::default()
        .with_compress(false)
        .with_capture(CaptureOptions {
            use_cors: false,
            ..CaptureOptions::default()
        });
    let capture = PreviewCapture::new(
        "![remote logo](https://example.com/logo.png)",
        Theme::Simple,
        Viewport::DEFAULT,
    );
    let pdf = render_pdf(&capture, &options).expect("render");

    assert!(!contains(&pdf.bytes, "/Subtype /Image"));
    assert!(contains(&pdf.bytes, "(remote logo) Tj"));
}

#[test]
fn file_exporter_avoids_name_collisions() {
    let dir = scratch_dir("download");
    let exporter = FileExporter::new(DownloadDir::new(&dir));
    let capture = PreviewCapture::new("# Hello", Theme::Simple, Viewport::DEFAULT);
    let options = ExportOptions::default();

    let first = exporter.export(&capture, &options).expect("first export");
    let second = exporter.export(&capture, &options).expect("second export");

    assert_eq!(first, dir.join("markdown-converted.pdf"));
    assert_eq!(second, dir.join("markdown-converted (1).pdf"));
    for path in [&first, &second] {
        let bytes = std::fs::read(path).expect("read export");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn trigger_exports_once_to_download_dir() {
    let dir = scratch_dir("trigger");
    let trigger = ExportTrigger::new(
        std::sync::Arc::new(FileExporter::new(DownloadDir::new(&dir))),
        ExportOptions::default(),
    );
    let capture = PreviewCapture::new("# Hello", Theme::Simple, Viewport::DEFAULT);

    let job = trigger.fire(capture.clone()).expect("export starts");
    assert!(trigger.fire(capture).is_none());
    let path = job.await.expect("export succeeds");

    assert!(path.exists());
    assert!(!trigger.is_busy());
    let saved = std::fs::read_dir(&dir).expect("list dir").count();
    assert_eq!(saved, 1);

    let _ = std::fs::remove_dir_all(&dir);
}
