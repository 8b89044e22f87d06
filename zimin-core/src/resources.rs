//! Resource bootstrap: directories, presence checks, artifact reads.
//!
//! Nothing here is fatal. Missing files are reported and left for the
//! operator to provide; there is no download path.

use std::io;
use std::path::{Path, PathBuf};

use crate::config::ZiminConfig;

/// Create each directory (and parents) if missing.
pub fn ensure_dirs_exist(dirs: &[&Path]) -> io::Result<()> {
    for dir in dirs {
        std::fs::create_dir_all(dir)?;
        tracing::debug!(dir = %dir.display(), "Directory ready");
    }
    Ok(())
}

/// Result of the startup check.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ResourceReport {
    pub template: PathBuf,
    pub template_present: bool,
    pub font: PathBuf,
    pub font_present: bool,
}

impl ResourceReport {
    /// A missing font still renders with the fallback.
    pub fn is_complete(&self) -> bool {
        self.template_present
    }
}

/// Create the data and cache directories and warn about missing files.
pub fn initialize_resources(
    config: &ZiminConfig,
    data_dir: &Path,
    cache_dir: &Path,
) -> io::Result<ResourceReport> {
    tracing::info!("Checking zimin resources");
    ensure_dirs_exist(&[data_dir, cache_dir])?;

    let template = config.base_image_path(data_dir);
    let template_present = template.is_file();
    if !template_present {
        tracing::warn!(
            path = %template.display(),
            "Template image missing; place '{}' in {}",
            config.base_image_filename,
            data_dir.display()
        );
    }

    let font = config.font_path(data_dir);
    let font_present = font.is_file();
    if !font_present {
        tracing::warn!(
            path = %font.display(),
            "Font missing; place '{}' in {} or the built-in font (no CJK) is used",
            config.font_filename,
            data_dir.display()
        );
    }

    tracing::info!("Resource check complete");
    Ok(ResourceReport {
        template,
        template_present,
        font,
        font_present,
    })
}

/// Copy a local image into the data directory as the template.
pub fn copy_default_template(
    source: &Path,
    config: &ZiminConfig,
    data_dir: &Path,
) -> io::Result<PathBuf> {
    ensure_dirs_exist(&[data_dir])?;
    let target = config.base_image_path(data_dir);
    std::fs::copy(source, &target)?;
    tracing::info!(from = %source.display(), to = %target.display(), "Installed template image");
    Ok(target)
}

/// Read a generated artifact; failures are logged and yield `None`.
pub fn read_image_bytes(path: &Path) -> Option<Vec<u8>> {
    match std::fs::read(path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Failed to read image file");
            None
        }
    }
}
