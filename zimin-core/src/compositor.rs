//! Image Compositor - Single Entry Point
//!
//! CRITICAL: compose validates all three texts before touching the disk.
//! Missing templates and invalid text abort with no output file.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ZiminConfig;
use crate::region::{disjoint, Region, DEFAULT_REGIONS};
use crate::validation::{RenderRequest, TextRejection};

#[cfg(feature = "test-hooks")]
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "test-hooks")]
static TEMPLATE_LOAD_COUNT: AtomicU32 = AtomicU32::new(0);

#[cfg(feature = "test-hooks")]
pub fn get_template_load_count() -> u32 {
    TEMPLATE_LOAD_COUNT.load(Ordering::SeqCst)
}

#[cfg(feature = "test-hooks")]
pub fn reset_template_load_count() {
    TEMPLATE_LOAD_COUNT.store(0, Ordering::SeqCst);
}

#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] TextRejection),

    #[error("Template image not found: {}", .0.display())]
    MissingResource(PathBuf),

    #[error("Rendering support not compiled in")]
    Unavailable,

    #[error("Text regions overlap: {0:?}")]
    OverlappingRegions([Region; 3]),

    #[error("Render failure: {0}")]
    RenderFailure(String),
}

impl ComposeError {
    /// Message safe to show an end user; internal detail stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            ComposeError::InvalidInput(rejection) => format!("input error: {rejection}"),
            ComposeError::MissingResource(_) | ComposeError::Unavailable => {
                "failed to generate image, resource incomplete".to_string()
            }
            ComposeError::RenderFailure(_) | ComposeError::OverlappingRegions(_) => {
                "unknown error while generating image".to_string()
            }
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, ComposeError::InvalidInput(_))
    }
}

#[cfg(feature = "render")]
impl From<image::ImageError> for ComposeError {
    fn from(e: image::ImageError) -> Self {
        ComposeError::RenderFailure(e.to_string())
    }
}

impl From<std::io::Error> for ComposeError {
    fn from(e: std::io::Error) -> Self {
        ComposeError::RenderFailure(e.to_string())
    }
}

/// Erases three regions of a template and writes new text into them.
///
/// Holds only immutable settings; one instance serves concurrent calls.
#[derive(Debug, Clone)]
pub struct Compositor {
    template_path: PathBuf,
    font_path: PathBuf,
    font_size: u32,
    text_color: [u8; 3],
    regions: [Region; 3],
    max_text_length: usize,
}

impl Compositor {
    pub fn new(config: &ZiminConfig, data_dir: &Path) -> Self {
        Self {
            template_path: config.base_image_path(data_dir),
            font_path: config.font_path(data_dir),
            font_size: config.font_size,
            text_color: config.text_color(),
            regions: DEFAULT_REGIONS,
            max_text_length: config.max_text_length,
        }
    }

    /// Replace the slot rectangles, for templates with another layout.
    /// A later slot's erase would wipe an earlier slot's text, so the
    /// rectangles must not share any pixel.
    pub fn with_regions(mut self, regions: [Region; 3]) -> Result<Self, ComposeError> {
        if !disjoint(&regions) {
            tracing::error!(?regions, "Rejected overlapping text regions");
            return Err(ComposeError::OverlappingRegions(regions));
        }
        self.regions = regions;
        Ok(self)
    }

    pub fn template_path(&self) -> &Path {
        &self.template_path
    }

    pub fn font_path(&self) -> &Path {
        &self.font_path
    }

    pub fn regions(&self) -> &[Region; 3] {
        &self.regions
    }

    pub fn max_text_length(&self) -> usize {
        self.max_text_length
    }

    /// Whether this build can decode, draw and encode images.
    pub fn is_available() -> bool {
        cfg!(feature = "render")
    }

    /// Template must exist; a missing font only degrades rendering.
    pub fn check_resources(&self) -> bool {
        let template_ok = self.template_path.is_file();
        if !template_ok {
            tracing::warn!(path = %self.template_path.display(), "Template image not found");
        }
        if !self.font_path.is_file() {
            tracing::warn!(path = %self.font_path.display(), "Font file not found");
        }
        template_ok
    }

    /// Compose `[left, middle, right]` onto the template and write a PNG
    /// into `output_dir`, returning its path.
    pub fn compose(&self, texts: [&str; 3], output_dir: &Path) -> Result<PathBuf, ComposeError> {
        // MANDATORY: validation happens before any I/O.
        let request = RenderRequest::new(texts, self.max_text_length)?;

        if !Self::is_available() {
            tracing::error!("Image rendering support is not available");
            return Err(ComposeError::Unavailable);
        }

        if !self.template_path.is_file() {
            tracing::error!(path = %self.template_path.display(), "Template image not found");
            return Err(ComposeError::MissingResource(self.template_path.clone()));
        }

        self.render(&request, output_dir).map_err(|e| {
            tracing::error!(error = %e, "Failed to compose image");
            e
        })
    }

    /// Collapsed form of [`compose`](Self::compose): only invalid input is
    /// reported as an error, every other failure is logged and becomes `None`.
    pub fn generate(
        &self,
        texts: [&str; 3],
        output_dir: &Path,
    ) -> Result<Option<PathBuf>, TextRejection> {
        match self.compose(texts, output_dir) {
            Ok(path) => Ok(Some(path)),
            Err(ComposeError::InvalidInput(rejection)) => Err(rejection),
            Err(_) => Ok(None),
        }
    }

    #[cfg(feature = "render")]
    fn render(&self, request: &RenderRequest, output_dir: &Path) -> Result<PathBuf, ComposeError> {
        use crate::canvas::{fill_region, write_png, WHITE};
        use crate::font::GlyphFont;
        use crate::region::Slot;
        use image::Rgb;
        use std::fs::OpenOptions;
        use std::io::{BufWriter, Write};

        #[cfg(feature = "test-hooks")]
        TEMPLATE_LOAD_COUNT.fetch_add(1, Ordering::SeqCst);

        let mut img = image::open(&self.template_path)?.to_rgb8();
        let font = GlyphFont::load(&self.font_path, self.font_size);
        let color = Rgb(self.text_color);

        for slot in Slot::ALL {
            let region = &self.regions[slot.index()];
            let text = &request.texts()[slot.index()];

            fill_region(&mut img, region, WHITE);

            let size = font.measure(text);
            let (x, y) = region.centered_origin(size.width, size.height);
            font.draw(&mut img, x, y, color, text);

            tracing::debug!(?slot, text = %text, x, y, width = size.width, height = size.height, "Drew slot");
        }

        std::fs::create_dir_all(output_dir)?;
        let output_path = output_dir.join(format!("zimin-{}.png", uuid::Uuid::new_v4()));
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&output_path)?;

        let mut writer = BufWriter::new(file);
        let encoded = write_png(&img, &mut writer)
            .map_err(ComposeError::from)
            .and_then(|_| writer.flush().map_err(ComposeError::from));
        if let Err(e) = encoded {
            // Never hand back a half-written file.
            drop(writer);
            let _ = std::fs::remove_file(&output_path);
            return Err(e);
        }

        tracing::info!(
            path = %output_path.display(),
            font = ?font.source(),
            width = img.width(),
            height = img.height(),
            "Composed image"
        );
        Ok(output_path)
    }

    #[cfg(not(feature = "render"))]
    fn render(&self, _request: &RenderRequest, _output_dir: &Path) -> Result<PathBuf, ComposeError> {
        Err(ComposeError::Unavailable)
    }
}
