// THEORY:
// The ROI Extractor narrows every frame down to the rectangle the operator cares
// about (a doorway, a needle gauge, a strip of driveway). Everything downstream
// works in ROI-local coordinates, so the crop is the one place where frame
// coordinates and ROI coordinates meet.
//
// The crop is a borrowed view, not a copy: the grayscale stage reads straight
// through it into its own single-channel buffer.

use crate::core_modules::frame::{Byte, Frame, PixelLayout};
use crate::error::MotionError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A pixel coordinate. Deserializes from either `{ x, y }` or `[x, y]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// A rectangle in frame coordinates. `upper_left` is inclusive, `bottom_right`
/// is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Roi {
    pub upper_left: Point,
    pub bottom_right: Point,
}

impl Roi {
    pub fn new(upper_left: (u32, u32), bottom_right: (u32, u32)) -> Self {
        Self::from_points(upper_left.into(), bottom_right.into())
    }

    pub const fn from_points(upper_left: Point, bottom_right: Point) -> Self {
        Self {
            upper_left,
            bottom_right,
        }
    }

    /// The ROI covering a whole `width` x `height` frame.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new((0, 0), (width, height))
    }

    pub fn width(&self) -> u32 {
        self.bottom_right.x.saturating_sub(self.upper_left.x)
    }

    pub fn height(&self) -> u32 {
        self.bottom_right.y.saturating_sub(self.upper_left.y)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Whether the ROI is non-empty and lies inside a `width` x `height` frame.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        !self.is_empty() && self.bottom_right.x <= width && self.bottom_right.y <= height
    }

    /// Borrows the part of `frame` covered by this ROI.
    pub fn crop<'a>(&self, frame: &'a Frame) -> Result<RoiView<'a>, MotionError> {
        if !self.fits(frame.width(), frame.height()) {
            return Err(MotionError::OutOfBounds {
                roi: *self,
                width: frame.width(),
                height: frame.height(),
            });
        }
        Ok(RoiView { frame, roi: *self })
    }
}

impl fmt::Display for Roi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {})-({}, {})",
            self.upper_left.x, self.upper_left.y, self.bottom_right.x, self.bottom_right.y
        )
    }
}

/// A read-only window onto the ROI of one frame.
#[derive(Debug, Clone, Copy)]
pub struct RoiView<'a> {
    frame: &'a Frame,
    roi: Roi,
}

impl<'a> RoiView<'a> {
    pub fn width(&self) -> u32 {
        self.roi.width()
    }

    pub fn height(&self) -> u32 {
        self.roi.height()
    }

    pub fn layout(&self) -> PixelLayout {
        self.frame.layout()
    }

    pub fn roi(&self) -> Roi {
        self.roi
    }

    /// The channel bytes of the pixel at ROI-local (x, y).
    pub fn pixel(&self, x: u32, y: u32) -> &'a [Byte] {
        self.frame
            .pixel(self.roi.upper_left.x + x, self.roi.upper_left.y + y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crop_translates_to_local_coordinates() {
        let frame = Frame::from_gray_fn(10, 10, |x, y| (y * 10 + x) as u8).unwrap();
        let view = Roi::new((2, 3), (6, 8)).crop(&frame).unwrap();
        assert_eq!((view.width(), view.height()), (4, 5));
        assert_eq!(view.pixel(0, 0), &[32]);
        assert_eq!(view.pixel(3, 4), &[75]);
    }

    #[test]
    fn crop_rejects_roi_past_frame_edge() {
        let frame = Frame::uniform(10, 10, PixelLayout::Gray, 0).unwrap();
        let err = Roi::new((5, 5), (11, 10)).crop(&frame).unwrap_err();
        assert!(matches!(err, MotionError::OutOfBounds { width: 10, height: 10, .. }));
    }

    #[test]
    fn inverted_corners_are_empty() {
        let roi = Roi::new((8, 2), (4, 9));
        assert!(roi.is_empty());
        assert!(!roi.fits(100, 100));
    }

    #[test]
    fn full_frame_roi_fits_exactly() {
        assert!(Roi::full_frame(640, 480).fits(640, 480));
        assert!(!Roi::full_frame(640, 480).fits(639, 480));
    }
}
