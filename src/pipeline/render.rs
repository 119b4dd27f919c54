//! Page image output: render a page and write it under the images tree.
//!
//! Layout is `<images_dir>/<slug>/page_<n>.<ext>`. Existing files are left
//! alone when `skip_existing_images` is set, which makes re-runs cheap.
//! Every failure here is a [`PageError`]: a page without an image still
//! contributes its items, and the rest of the document carries on.
//!
//! Images are encoded into a temp file next to the target and renamed into
//! place, so an interrupted run never leaves a truncated image that a later
//! skip-existing run would keep.

use crate::config::{ExtractConfig, ImageFormat};
use crate::error::PageError;
use crate::pipeline::document::LookBook;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::DynamicImage;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// What happened to a page's image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// The file already existed and skip-existing was on.
    Skipped,
}

/// Directory holding one source's page images.
pub fn source_image_dir(images_dir: &Path, slug: &str) -> PathBuf {
    images_dir.join(slug)
}

/// `<images_dir>/<slug>/page_<n>.<ext>` for a 1-based page number.
pub fn page_image_path(images_dir: &Path, slug: &str, page_num: usize, format: ImageFormat) -> PathBuf {
    source_image_dir(images_dir, slug).join(format!("page_{}.{}", page_num, format.extension()))
}

/// Encode `img` to `path` in `format`, replacing any existing file.
///
/// Alpha is dropped: pages are rendered onto an opaque background and JPEG
/// has no alpha channel anyway.
pub fn save_page_image(
    img: &DynamicImage,
    path: &Path,
    format: ImageFormat,
    jpg_quality: u8,
) -> Result<(), image::ImageError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let tmp = crate::atomic::output_temp_file(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file());
        let rgb = img.to_rgb8();
        match format {
            ImageFormat::Jpg => {
                rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut writer, jpg_quality))?
            }
            ImageFormat::Png => rgb.write_with_encoder(PngEncoder::new(&mut writer))?,
        }
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| image::ImageError::IoError(e.error))?;
    Ok(())
}

/// Render page `index` of `book` to its image path, honouring skip-existing.
pub fn render_page_image(
    book: &dyn LookBook,
    index: usize,
    slug: &str,
    config: &ExtractConfig,
) -> Result<RenderOutcome, PageError> {
    let page_num = index + 1;
    let path = page_image_path(&config.images_dir(), slug, page_num, config.image_format);

    if config.skip_existing_images && path.exists() {
        debug!(path = %path.display(), "image exists, skipping render");
        return Ok(RenderOutcome::Skipped);
    }

    let image = book.render_page(index, config.scale).map_err(|e| {
        warn!("Failed to render {} page {}: {}", slug, page_num, e);
        PageError::RenderFailed {
            source_slug: slug.to_string(),
            page: page_num,
            detail: e.to_string(),
        }
    })?;

    save_page_image(&image, &path, config.image_format, config.jpg_quality).map_err(|e| {
        warn!("Failed to write {}: {}", path.display(), e);
        PageError::ImageWriteFailed {
            source_slug: slug.to_string(),
            page: page_num,
            path: path.display().to_string(),
            detail: e.to_string(),
        }
    })?;

    Ok(RenderOutcome::Rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn red_page() -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 12, Rgba([200, 10, 10, 255])))
    }

    #[test]
    fn path_layout() {
        let p = page_image_path(Path::new("/out/images"), "resort", 3, ImageFormat::Png);
        assert_eq!(p, PathBuf::from("/out/images/resort/page_3.png"));
        let p = page_image_path(Path::new("images"), "a-2", 12, ImageFormat::Jpg);
        assert_eq!(p, PathBuf::from("images/a-2/page_12.jpg"));
    }

    #[test]
    fn saves_jpeg_and_png() {
        let dir = tempfile::tempdir().unwrap();
        for format in [ImageFormat::Jpg, ImageFormat::Png] {
            let path = dir.path().join(format!("page_1.{}", format.extension()));
            save_page_image(&red_page(), &path, format, 80).expect("save");
            let back = image::open(&path).expect("decodable");
            assert_eq!((back.width(), back.height()), (8, 12));
        }
    }

    #[cfg(unix)]
    #[test]
    fn page_images_get_normal_permissions() {
        use crate::atomic::tests::{mode, plain_write_mode};

        let dir = tempfile::tempdir().unwrap();
        for format in [ImageFormat::Jpg, ImageFormat::Png] {
            let path = dir.path().join(format!("page_1.{}", format.extension()));
            save_page_image(&red_page(), &path, format, 80).unwrap();
            assert_eq!(mode(&path), plain_write_mode(dir.path()));
        }
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("page_1.jpg");
        assert!(save_page_image(&red_page(), &path, ImageFormat::Jpg, 80).is_err());
    }
}
