// THEORY:
// A `BoundingBox` is the final, minimal summary of one moving region: the
// smallest axis-aligned rectangle around it, in ROI-local pixel coordinates.
// It is a "dumb" data container; it knows its own geometry and how to shift
// itself into frame coordinates for a collaborator that draws on the full frame.

use crate::core_modules::roi::Roi;
use serde::{Deserialize, Serialize};

pub type Area = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> Area {
        self.width as Area * self.height as Area
    }

    /// One past the right-most column.
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// One past the bottom-most row.
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// The same rectangle expressed in the coordinates of the frame `roi` was
    /// cut from.
    pub fn to_frame_coords(&self, roi: &Roi) -> BoundingBox {
        BoundingBox {
            x: self.x + roi.upper_left.x,
            y: self.y + roi.upper_left.y,
            ..*self
        }
    }
}
