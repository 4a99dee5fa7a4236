//! Image capture for exported documents
//!
//! Images are resolved from local paths or, when cross-origin capture is
//! enabled, fetched over HTTP(S). Each placed image is flattened onto white,
//! resampled to its displayed size times the capture scale, and encoded for
//! embedding.

use crate::document::ImageRef;
use crate::export::options::{CaptureOptions, ImageEncoding, ImageOptions};
use crate::{Error, Result};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A decoded source image
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub pixels: DynamicImage,
}

impl LoadedImage {
    /// Natural size in pixels, which is also its CSS pixel size
    pub fn natural_size(&self) -> (u32, u32) {
        (self.pixels.width(), self.pixels.height())
    }
}

/// Images available to the layout, keyed by source URL
#[derive(Debug, Default)]
pub struct ImageSet {
    images: Vec<LoadedImage>,
    by_url: HashMap<String, usize>,
}

impl ImageSet {
    /// Load every image the document references; failures are logged and skipped
    pub fn load<'a>(
        refs: impl IntoIterator<Item = &'a ImageRef>,
        base_dir: Option<&Path>,
        capture: &CaptureOptions,
    ) -> Self {
        let mut set = Self::default();
        for image_ref in refs {
            if set.by_url.contains_key(&image_ref.url) {
                continue;
            }
            match load_image(&image_ref.url, base_dir, capture.use_cors) {
                Ok(image) => {
                    debug!(url = %image_ref.url, size = ?image.natural_size(), "loaded image");
                    set.insert(&image_ref.url, image);
                }
                Err(e) => warn!("Image {} replaced by its alt text: {}", image_ref.url, e),
            }
        }
        set
    }

    pub fn insert(&mut self, url: &str, image: LoadedImage) -> usize {
        let index = self.images.len();
        self.images.push(image);
        self.by_url.insert(url.to_string(), index);
        index
    }

    /// Index of a loaded image
    pub fn index_of(&self, url: &str) -> Option<usize> {
        self.by_url.get(url).copied()
    }

    pub fn get(&self, index: usize) -> Option<&LoadedImage> {
        self.images.get(index)
    }

    /// Number of images that loaded successfully
    pub fn loaded_count(&self) -> usize {
        self.images.len()
    }
}

/// Where an image reference points
#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Remote(String),
    Local(PathBuf),
}

fn classify(url: &str, base_dir: Option<&Path>) -> Result<Source> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(Source::Remote(url.to_string()));
    }
    if url.starts_with("data:") {
        return Err(Error::Export("inline data URIs are not captured".to_string()));
    }

    let path = PathBuf::from(url.strip_prefix("file://").unwrap_or(url));
    if path.is_absolute() {
        return Ok(Source::Local(path));
    }
    Ok(Source::Local(match base_dir {
        Some(dir) => dir.join(path),
        None => path,
    }))
}

fn load_image(url: &str, base_dir: Option<&Path>, use_cors: bool) -> Result<LoadedImage> {
    let bytes = match classify(url, base_dir)? {
        Source::Remote(_) if !use_cors => {
            return Err(Error::Export(
                "cross-origin capture is disabled".to_string(),
            ));
        }
        Source::Remote(remote) => fetch(&remote)?,
        Source::Local(path) => std::fs::read(&path)?,
    };
    let pixels = image::load_from_memory(&bytes)?;
    Ok(LoadedImage { pixels })
}

fn fetch(url: &str) -> Result<Vec<u8>> {
    let fetch_error = |reason: String| Error::Fetch {
        url: url.to_string(),
        reason,
    };
    let mut response = ureq::get(url).call().map_err(|e| fetch_error(e.to_string()))?;
    response
        .body_mut()
        .read_to_vec()
        .map_err(|e| fetch_error(e.to_string()))
}

/// Stream filter an encoded image needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFilter {
    /// JPEG data
    Dct,
    /// Raw 8-bit RGB samples
    Raw,
}

/// Image data ready to be written as an XObject
#[derive(Debug, Clone)]
pub struct EncodedImage {
    pub width: u32,
    pub height: u32,
    pub filter: ImageFilter,
    pub data: Vec<u8>,
}

/// Flatten, resample, and encode an image placed at `display` CSS pixels
pub fn encode_image(
    image: &LoadedImage,
    display: (f32, f32),
    scale: f32,
    options: &ImageOptions,
) -> Result<EncodedImage> {
    let rgb = flatten_on_white(&image.pixels);
    let (natural_w, natural_h) = (rgb.width(), rgb.height());

    // Never upsample past the source resolution
    let target_w = ((display.0 * scale).round() as u32).clamp(1, natural_w.max(1));
    let target_h = ((display.1 * scale).round() as u32).clamp(1, natural_h.max(1));
    let rgb = if (target_w, target_h) == (natural_w, natural_h) {
        rgb
    } else {
        image::imageops::resize(&rgb, target_w, target_h, FilterType::Lanczos3)
    };

    match options.encoding {
        ImageEncoding::Jpeg => {
            let mut data = Vec::new();
            JpegEncoder::new_with_quality(&mut data, options.jpeg_quality()).encode_image(&rgb)?;
            Ok(EncodedImage {
                width: target_w,
                height: target_h,
                filter: ImageFilter::Dct,
                data,
            })
        }
        ImageEncoding::Png => Ok(EncodedImage {
            width: target_w,
            height: target_h,
            filter: ImageFilter::Raw,
            data: rgb.into_raw(),
        }),
    }
}

/// Composite transparent pixels over white, as a JPEG capture does
fn flatten_on_white(pixels: &DynamicImage) -> RgbImage {
    let rgba = pixels.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (src, dst) in rgba.pixels().zip(rgb.pixels_mut()) {
        let alpha = u32::from(src[3]);
        for c in 0..3 {
            let blended = (u32::from(src[c]) * alpha + 255 * (255 - alpha)) / 255;
            dst[c] = blended as u8;
        }
    }
    rgb
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn checker(width: u32, height: u32) -> LoadedImage {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 0])
            }
        });
        LoadedImage {
            pixels: DynamicImage::ImageRgba8(img),
        }
    }

    #[test]
    fn test_classify_sources() {
        assert_eq!(
            classify("https://example.com/a.png", None).ok(),
            Some(Source::Remote("https://example.com/a.png".to_string()))
        );
        assert_eq!(
            classify("img/a.png", Some(Path::new("/docs"))).ok(),
            Some(Source::Local(PathBuf::from("/docs/img/a.png")))
        );
        assert_eq!(
            classify("file:///tmp/a.png", Some(Path::new("/docs"))).ok(),
            Some(Source::Local(PathBuf::from("/tmp/a.png")))
        );
        assert!(classify("data:image/png;base64,AAAA", None).is_err());
    }

    #[test]
    fn test_remote_blocked_without_cors() {
        let err = load_image("https://example.com/a.png", None, false);
        assert!(matches!(err, Err(Error::Export(_))));
    }

    #[test]
    fn test_flatten_transparent_to_white() {
        let rgb = flatten_on_white(&checker(2, 1).pixels);
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(1, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_encode_resamples_to_display_times_scale() {
        let image = checker(400, 200);
        let encoded = encode_image(&image, (100.0, 50.0), 2.0, &ImageOptions::default())
            .expect("encoding succeeds");
        assert_eq!((encoded.width, encoded.height), (200, 100));
        assert_eq!(encoded.filter, ImageFilter::Dct);
        // JPEG SOI marker
        assert_eq!(&encoded.data[..2], &[0xff, 0xd8]);
    }

    #[test]
    fn test_encode_never_upsamples() {
        let image = checker(10, 10);
        let encoded = encode_image(&image, (10.0, 10.0), 2.0, &ImageOptions::default())
            .expect("encoding succeeds");
        assert_eq!((encoded.width, encoded.height), (10, 10));
    }

    #[test]
    fn test_png_encoding_keeps_raw_samples() {
        let options = ImageOptions {
            encoding: ImageEncoding::Png,
            quality: 1.0,
        };
        let encoded = encode_image(&checker(4, 4), (4.0, 4.0), 1.0, &options)
            .expect("encoding succeeds");
        assert_eq!(encoded.filter, ImageFilter::Raw);
        assert_eq!(encoded.data.len(), 4 * 4 * 3);
    }

    #[test]
    fn test_image_set_skips_missing_files() {
        let refs = [ImageRef {
            url: "/definitely/not/here.png".to_string(),
            alt: "missing".to_string(),
            title: String::new(),
        }];
        let set = ImageSet::load(refs.iter(), None, &CaptureOptions::default());
        assert_eq!(set.loaded_count(), 0);
        assert_eq!(set.index_of("/definitely/not/here.png"), None);
    }
}
