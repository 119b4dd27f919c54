//! Configuration types for look-book extraction.
//!
//! All run behaviour is controlled through [`ExtractConfig`], built via its
//! [`ExtractConfigBuilder`]. The category tables travel inside the config as
//! a shared [`Taxonomy`], so every pipeline stage receives the same explicit
//! configuration and there is no process-wide state.

use crate::error::CatalogError;
use crate::progress::ProgressCallback;
use crate::taxonomy::Taxonomy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Configuration for an extraction run.
///
/// # Example
/// ```rust
/// use lookbook_catalog::{ExtractConfig, ImageFormat};
///
/// let config = ExtractConfig::builder()
///     .pdf_dir("pdfs")
///     .output_dir("site")
///     .image_format(ImageFormat::Png)
///     .scale(1.5)
///     .build()
///     .unwrap();
/// assert!(config.catalog_path().ends_with("data/collections.json"));
/// ```
#[derive(Clone)]
pub struct ExtractConfig {
    /// Directory scanned for `*.pdf` look books. Default: `pdfs`.
    pub pdf_dir: PathBuf,

    /// Root for `images/` and `data/`. Default: current directory.
    pub output_dir: PathBuf,

    /// Render scale factor applied to each page's native size. Default: 2.0.
    ///
    /// 2.0 keeps item text on the page image legible on a phone screen
    /// without ballooning the image folder.
    pub scale: f32,

    /// Image format for rendered pages. Default: [`ImageFormat::Jpg`].
    pub image_format: ImageFormat,

    /// JPEG quality, 1–100. Ignored for PNG. Default: 85.
    pub jpg_quality: u8,

    /// Render page images at all. Default: true. When false only text is read.
    pub render_images: bool,

    /// Leave an existing page image alone instead of re-rendering. Default: true.
    pub skip_existing_images: bool,

    /// Delete prior images and the catalog before running. Default: false.
    pub clean: bool,

    /// Log and skip documents that fail to open instead of aborting. Default: false.
    pub keep_going: bool,

    /// Category tables and line-filter data.
    pub taxonomy: Arc<Taxonomy>,

    /// Optional per-document/per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            pdf_dir: PathBuf::from("pdfs"),
            output_dir: PathBuf::from("."),
            scale: 2.0,
            image_format: ImageFormat::default(),
            jpg_quality: 85,
            render_images: true,
            skip_existing_images: true,
            clean: false,
            keep_going: false,
            taxonomy: Arc::new(Taxonomy::default()),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ExtractConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractConfig")
            .field("pdf_dir", &self.pdf_dir)
            .field("output_dir", &self.output_dir)
            .field("scale", &self.scale)
            .field("image_format", &self.image_format)
            .field("jpg_quality", &self.jpg_quality)
            .field("render_images", &self.render_images)
            .field("skip_existing_images", &self.skip_existing_images)
            .field("clean", &self.clean)
            .field("keep_going", &self.keep_going)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn ExtractProgressCallback>"),
            )
            .finish()
    }
}

impl ExtractConfig {
    /// Create a new builder for `ExtractConfig`.
    pub fn builder() -> ExtractConfigBuilder {
        ExtractConfigBuilder {
            config: Self::default(),
        }
    }

    /// `<output_dir>/images`
    pub fn images_dir(&self) -> PathBuf {
        self.output_dir.join("images")
    }

    /// `<output_dir>/data`
    pub fn data_dir(&self) -> PathBuf {
        self.output_dir.join("data")
    }

    /// `<output_dir>/data/collections.json`
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir().join(crate::catalog::CATALOG_FILE_NAME)
    }
}

/// Builder for [`ExtractConfig`].
#[derive(Debug)]
pub struct ExtractConfigBuilder {
    config: ExtractConfig,
}

impl ExtractConfigBuilder {
    pub fn pdf_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.pdf_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.config.output_dir = dir.as_ref().to_path_buf();
        self
    }

    pub fn scale(mut self, scale: f32) -> Self {
        self.config.scale = scale;
        self
    }

    pub fn image_format(mut self, format: ImageFormat) -> Self {
        self.config.image_format = format;
        self
    }

    pub fn jpg_quality(mut self, quality: u8) -> Self {
        self.config.jpg_quality = quality;
        self
    }

    pub fn render_images(mut self, v: bool) -> Self {
        self.config.render_images = v;
        self
    }

    pub fn skip_existing_images(mut self, v: bool) -> Self {
        self.config.skip_existing_images = v;
        self
    }

    pub fn clean(mut self, v: bool) -> Self {
        self.config.clean = v;
        self
    }

    pub fn keep_going(mut self, v: bool) -> Self {
        self.config.keep_going = v;
        self
    }

    pub fn taxonomy(mut self, taxonomy: Taxonomy) -> Self {
        self.config.taxonomy = Arc::new(taxonomy);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractConfig, CatalogError> {
        let c = &self.config;
        if !(c.scale.is_finite() && c.scale > 0.0) {
            return Err(CatalogError::InvalidConfig(format!(
                "scale must be a positive number, got {}",
                c.scale
            )));
        }
        if !(1..=100).contains(&c.jpg_quality) {
            return Err(CatalogError::InvalidConfig(format!(
                "JPEG quality must be 1–100, got {}",
                c.jpg_quality
            )));
        }
        Ok(self.config)
    }
}

/// Output format for rendered page images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// Lossy, small; the default for photo-heavy look books.
    #[default]
    Jpg,
    /// Lossless.
    Png,
}

impl ImageFormat {
    /// File extension without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpg => "jpg",
            ImageFormat::Png => "png",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = ExtractConfig::default();
        assert_eq!(c.scale, 2.0);
        assert_eq!(c.image_format, ImageFormat::Jpg);
        assert_eq!(c.jpg_quality, 85);
        assert!(c.render_images);
        assert!(c.skip_existing_images);
        assert!(!c.clean);
        assert!(!c.keep_going);
    }

    #[test]
    fn rejects_non_positive_scale() {
        assert!(ExtractConfig::builder().scale(0.0).build().is_err());
        assert!(ExtractConfig::builder().scale(-1.0).build().is_err());
        assert!(ExtractConfig::builder().scale(f32::NAN).build().is_err());
        assert!(ExtractConfig::builder().scale(0.5).build().is_ok());
    }

    #[test]
    fn rejects_out_of_range_quality() {
        assert!(ExtractConfig::builder().jpg_quality(0).build().is_err());
        assert!(ExtractConfig::builder().jpg_quality(101).build().is_err());
        assert!(ExtractConfig::builder().jpg_quality(100).build().is_ok());
    }

    #[test]
    fn output_layout() {
        let c = ExtractConfig::builder().output_dir("/srv/site").build().unwrap();
        assert_eq!(c.images_dir(), PathBuf::from("/srv/site/images"));
        assert_eq!(
            c.catalog_path(),
            PathBuf::from("/srv/site/data/collections.json")
        );
    }

    #[test]
    fn debug_hides_callback() {
        let dbg = format!("{:?}", ExtractConfig::default());
        assert!(dbg.contains("scale"));
        assert!(dbg.contains("progress_callback: None"));
    }
}
