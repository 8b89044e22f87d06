//! Zimin Core - Template Text Replacement Engine
//!
//! # Guarantees
//! 1. Texts are validated before any image I/O
//! 2. Regions are erased white before new text is drawn
//! 3. Output is always PNG, one fresh file per call
//! 4. Same inputs render byte-identical output
//! 5. A missing font degrades, a missing template fails

pub mod config;
pub mod validation;
pub mod region;
pub mod compositor;
pub mod resources;
pub mod command;
pub mod hashing;

#[cfg(feature = "render")]
pub mod canvas;
#[cfg(feature = "render")]
pub mod font;

pub use config::{ConfigError, ZiminConfig};
pub use validation::{validate_text, RenderRequest, TextRejection, TextValidator};
pub use region::{Region, Slot, DEFAULT_REGIONS, VERTICAL_NUDGE};
pub use compositor::{ComposeError, Compositor};
pub use command::{handle_command, parse_args, CommandError, Reply};
pub use hashing::{file_sha256, sha256_hex};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
