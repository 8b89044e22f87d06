//! Configuration - one immutable struct, built once at startup

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_MAX_TEXT_LENGTH: usize = 15;
pub const DEFAULT_FONT_SIZE: u32 = 50;
pub const MAX_FONT_SIZE: u32 = 1024;
pub const DEFAULT_BASE_IMAGE: &str = "zimin.jpg";
pub const DEFAULT_FONT: &str = "simhei.ttf";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid config {path}: font_size must be 1..={max}, got {value}")]
    FontSize { path: PathBuf, value: u32, max: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZiminConfig {
    #[serde(default = "default_true")]
    pub enable_zi_min: bool,
    /// Template image, relative to the data directory.
    #[serde(default = "default_base_image")]
    pub base_image_filename: String,
    /// Outline font, relative to the data directory.
    #[serde(default = "default_font")]
    pub font_filename: String,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    #[serde(default)]
    pub text_color_r: u8,
    #[serde(default)]
    pub text_color_g: u8,
    #[serde(default)]
    pub text_color_b: u8,
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

fn default_true() -> bool { true }
fn default_base_image() -> String { DEFAULT_BASE_IMAGE.to_string() }
fn default_font() -> String { DEFAULT_FONT.to_string() }
fn default_font_size() -> u32 { DEFAULT_FONT_SIZE }
fn default_max_text_length() -> usize { DEFAULT_MAX_TEXT_LENGTH }

impl Default for ZiminConfig {
    fn default() -> Self {
        Self {
            enable_zi_min: true,
            base_image_filename: default_base_image(),
            font_filename: default_font(),
            font_size: DEFAULT_FONT_SIZE,
            text_color_r: 0,
            text_color_g: 0,
            text_color_b: 0,
            max_text_length: DEFAULT_MAX_TEXT_LENGTH,
        }
    }
}

impl ZiminConfig {
    pub fn from_toml_str(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        if config.font_size == 0 || config.font_size > MAX_FONT_SIZE {
            return Err(ConfigError::FontSize {
                path: path.to_path_buf(),
                value: config.font_size,
                max: MAX_FONT_SIZE,
            });
        }
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents, path)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Load from `path` when given and present, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.is_file() => Self::load(p),
            Some(p) => {
                tracing::warn!(path = %p.display(), "Config file not found, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    pub fn text_color(&self) -> [u8; 3] {
        [self.text_color_r, self.text_color_g, self.text_color_b]
    }

    pub fn base_image_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.base_image_filename)
    }

    pub fn font_path(&self, data_dir: &Path) -> PathBuf {
        data_dir.join(&self.font_filename)
    }
}
