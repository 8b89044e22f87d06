//! Regions - fixed text slots in template pixel space
//!
//! The rectangles match one template layout (1000x400). Replacing the
//! template means recalibrating these by hand.

use serde::{Deserialize, Serialize};

/// Upward shift applied after centering, as a fraction of text height.
/// Tuned against the outline font metrics; recalibrate for other fonts.
pub const VERTICAL_NUDGE: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    Left,
    Middle,
    Right,
}

impl Slot {
    pub const ALL: [Slot; 3] = [Slot::Left, Slot::Middle, Slot::Right];

    pub fn index(self) -> usize {
        match self {
            Slot::Left => 0,
            Slot::Middle => 1,
            Slot::Right => 2,
        }
    }
}

/// Rectangle with inclusive corners: `[left, right] x [top, bottom]`.
///
/// The erased area is one pixel wider and taller than `width() x height()`,
/// which is the span used for centering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Region {
    pub const fn new(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn overlaps(&self, other: &Region) -> bool {
        self.left <= other.right
            && other.left <= self.right
            && self.top <= other.bottom
            && other.top <= self.bottom
    }

    /// Top-left draw origin that centers a `text_w x text_h` box here,
    /// shifted up by `VERTICAL_NUDGE * text_h`.
    ///
    /// Text larger than the region yields an origin outside it; nothing
    /// is clipped.
    pub fn centered_origin(&self, text_w: f32, text_h: f32) -> (f32, f32) {
        let x = self.left as f32 + (self.width() as f32 - text_w) / 2.0;
        let y = self.top as f32 + (self.height() as f32 - text_h) / 2.0;
        (x, y - text_h * VERTICAL_NUDGE)
    }
}

pub const DEFAULT_REGIONS: [Region; 3] = [
    Region::new(100, 150, 230, 220),
    Region::new(430, 150, 560, 220),
    Region::new(660, 150, 940, 220),
];

/// True when no two regions share a pixel.
pub fn disjoint(regions: &[Region]) -> bool {
    regions.iter().enumerate().all(|(i, a)| {
        regions[i + 1..].iter().all(|b| !a.overlaps(b))
    })
}
