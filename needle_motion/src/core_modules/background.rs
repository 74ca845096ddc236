// THEORY:
// The `BackgroundModel` is the memory of the detector and the only piece of state
// that survives from one frame to the next. It holds a floating-point running
// average of the smoothed scene:
//
//     bg[p] = alpha * gray[p] + (1 - alpha) * bg[p]
//
// Key architectural principles:
// 1.  **Born Initialized**: A model only exists once there is a first frame to
//     seed it with. `initialize` is a constructor, so "update before initialize"
//     and "initialize twice" cannot be written down at all; the detection state
//     machine simply holds no model until its first frame.
// 2.  **Float Accumulator, Integer Snapshot**: The estimate is kept in `f32` so
//     that slow drifts (a cloud passing, the sun moving) accumulate instead of
//     vanishing in 8-bit rounding. The differencer gets an 8-bit snapshot with
//     every value rounded half to even and saturated into 0..=255.
// 3.  **O(1) History**: There is no frame ring buffer. One estimate, one alpha.

use crate::error::MotionError;
use image::{GrayImage, ImageBuffer, Luma};

pub type SmoothingFactor = f32;
pub type FloatGrayImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Exponentially-smoothed estimate of the static scene.
#[derive(Debug, Clone)]
pub struct BackgroundModel {
    estimate: FloatGrayImage,
    smoothing_factor: SmoothingFactor,
}

impl BackgroundModel {
    /// Seeds the model with the first smoothed grayscale frame.
    pub fn initialize(gray: &GrayImage, smoothing_factor: SmoothingFactor) -> Self {
        let (width, height) = gray.dimensions();
        let estimate = FloatGrayImage::from_fn(width, height, |x, y| Luma([gray.get_pixel(x, y)[0] as f32]));
        Self {
            estimate,
            smoothing_factor,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.estimate.dimensions()
    }

    pub fn smoothing_factor(&self) -> SmoothingFactor {
        self.smoothing_factor
    }

    /// The raw floating-point estimate.
    pub fn estimate(&self) -> &FloatGrayImage {
        &self.estimate
    }

    /// Blends `gray` into the estimate and returns the new 8-bit snapshot.
    pub fn update(&mut self, gray: &GrayImage) -> Result<GrayImage, MotionError> {
        if gray.dimensions() != self.estimate.dimensions() {
            return Err(MotionError::dimension_mismatch(self.estimate.dimensions(), gray.dimensions()));
        }

        let alpha = self.smoothing_factor;
        for (bg, current) in self.estimate.pixels_mut().zip(gray.pixels()) {
            bg[0] = alpha * current[0] as f32 + (1.0 - alpha) * bg[0];
        }

        Ok(self.snapshot())
    }

    /// The current estimate rounded (ties to even) and saturated to 8 bits.
    pub fn snapshot(&self) -> GrayImage {
        let (width, height) = self.estimate.dimensions();
        GrayImage::from_fn(width, height, |x, y| {
            Luma([self.estimate.get_pixel(x, y)[0].round_ties_even().clamp(0.0, 255.0) as u8])
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_after_initialize_is_the_seed_frame() {
        let gray = GrayImage::from_fn(6, 4, |x, y| Luma([(x * 40 + y) as u8]));
        let model = BackgroundModel::initialize(&gray, 0.5);
        assert_eq!(model.snapshot(), gray);
    }

    #[test]
    fn update_applies_exponential_smoothing() {
        let seed = GrayImage::from_pixel(2, 2, Luma([100]));
        let mut model = BackgroundModel::initialize(&seed, 0.25);

        let snapshot = model.update(&GrayImage::from_pixel(2, 2, Luma([200]))).unwrap();
        assert_eq!(model.estimate().get_pixel(0, 0)[0], 125.0);
        assert_eq!(snapshot.get_pixel(1, 1)[0], 125);

        model.update(&GrayImage::from_pixel(2, 2, Luma([200]))).unwrap();
        assert!((model.estimate().get_pixel(0, 0)[0] - 143.75).abs() < 1e-4);
    }

    #[test]
    fn snapshot_rounds_halves_to_even() {
        let mut model = BackgroundModel::initialize(&GrayImage::from_pixel(1, 1, Luma([0])), 0.5);
        let snapshot = model.update(&GrayImage::from_pixel(1, 1, Luma([255]))).unwrap();
        assert_eq!(snapshot.get_pixel(0, 0)[0], 128);

        let mut model = BackgroundModel::initialize(&GrayImage::from_pixel(1, 1, Luma([128])), 0.5);
        let snapshot = model.update(&GrayImage::from_pixel(1, 1, Luma([129]))).unwrap();
        assert_eq!(model.estimate().get_pixel(0, 0)[0], 128.5);
        assert_eq!(snapshot.get_pixel(0, 0)[0], 128);
    }

    #[test]
    fn alpha_one_tracks_latest_frame() {
        let mut model = BackgroundModel::initialize(&GrayImage::from_pixel(3, 3, Luma([10])), 1.0);
        let latest = GrayImage::from_fn(3, 3, |x, _| Luma([(x * 70) as u8]));
        assert_eq!(model.update(&latest).unwrap(), latest);
    }

    #[test]
    fn update_rejects_resized_frame() {
        let mut model = BackgroundModel::initialize(&GrayImage::new(4, 4), 0.5);
        let err = model.update(&GrayImage::new(4, 5)).unwrap_err();
        assert!(matches!(
            err,
            MotionError::DimensionMismatch {
                expected_width: 4,
                expected_height: 4,
                actual_width: 4,
                actual_height: 5
            }
        ));
    }
}
