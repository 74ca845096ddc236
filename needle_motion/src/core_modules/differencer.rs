// THEORY:
// The Frame Differencer answers "how far is each pixel from what the scene
// normally looks like here?". It is the pairwise-comparison step of the
// pipeline: the current smoothed frame on one side, the background snapshot on
// the other, and the absolute intensity gap as the result. Sign is irrelevant;
// a dark object on a light floor moves just as much as a light one on a dark
// floor.

use crate::error::MotionError;
use image::{GrayImage, Luma};

pub type IntensityMap = GrayImage;

/// `|gray[p] - background[p]|` for every pixel.
pub fn difference(gray: &GrayImage, background: &GrayImage) -> Result<IntensityMap, MotionError> {
    if gray.dimensions() != background.dimensions() {
        return Err(MotionError::dimension_mismatch(background.dimensions(), gray.dimensions()));
    }
    let (width, height) = gray.dimensions();
    Ok(IntensityMap::from_fn(width, height, |x, y| {
        Luma([gray.get_pixel(x, y)[0].abs_diff(background.get_pixel(x, y)[0])])
    }))
}
