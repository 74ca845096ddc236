// THEORY:
// `MotionConfig` is the complete set of knobs for one pipeline instance. It is
// plain data with serde support, so a collaborator can load it from whatever file
// format it likes. The field names and aliases accept the keys of the classic
// `conf.json` layout (`resolution`, `upper_left`, `bottom_right`,
// `delta_thresh`, `min_area`), and unknown keys such as `fps` are ignored.
//
// Validation is explicit and happens once, when a pipeline is configured.

use crate::core_modules::bounding_box::Area;
use crate::core_modules::grayscale::DEFAULT_BLUR_KERNEL_SIZE;
use crate::core_modules::region_extractor::Connectivity;
use crate::core_modules::roi::{Point, Roi};
use crate::core_modules::threshold::DEFAULT_DILATE_ITERATIONS;
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DELTA_THRESHOLD: u32 = 5;
pub const DEFAULT_MIN_AREA: Area = 5000;
pub const DEFAULT_SMOOTHING_FACTOR: f64 = 0.5;

/// Width and height of the frames a pipeline will be fed. Deserializes from
/// `{ width, height }` or `[width, height]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub width: u32,
    pub height: u32,
}

impl FrameSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn as_tuple(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    /// Dimensions every processed frame must have.
    #[serde(rename = "resolution", alias = "frame_size")]
    pub frame_size: FrameSize,
    /// Inclusive upper-left corner of the region of interest.
    pub upper_left: Point,
    /// Exclusive bottom-right corner of the region of interest.
    pub bottom_right: Point,
    /// Minimum region area, in pixels, for a region to count as movement.
    #[serde(default = "default_min_area")]
    pub min_area: Area,
    /// Intensity difference a pixel must exceed to be foreground.
    #[serde(default = "default_delta_threshold", alias = "delta_thresh")]
    pub delta_threshold: u32,
    /// Weight of the newest frame in the running background average.
    #[serde(default = "default_smoothing_factor")]
    pub smoothing_factor: f64,
    #[serde(default = "default_blur_kernel_size")]
    pub blur_kernel_size: u32,
    #[serde(default = "default_dilate_iterations")]
    pub dilate_iterations: u8,
    #[serde(default)]
    pub connectivity: Connectivity,
}

fn default_min_area() -> Area {
    DEFAULT_MIN_AREA
}

fn default_delta_threshold() -> u32 {
    DEFAULT_DELTA_THRESHOLD
}

fn default_smoothing_factor() -> f64 {
    DEFAULT_SMOOTHING_FACTOR
}

fn default_blur_kernel_size() -> u32 {
    DEFAULT_BLUR_KERNEL_SIZE
}

fn default_dilate_iterations() -> u8 {
    DEFAULT_DILATE_ITERATIONS
}

impl MotionConfig {
    /// A configuration for `frame_size` frames watching `roi`, with every
    /// tunable at its default.
    pub fn new(frame_size: FrameSize, roi: Roi) -> Self {
        Self {
            frame_size,
            upper_left: roi.upper_left,
            bottom_right: roi.bottom_right,
            min_area: DEFAULT_MIN_AREA,
            delta_threshold: DEFAULT_DELTA_THRESHOLD,
            smoothing_factor: DEFAULT_SMOOTHING_FACTOR,
            blur_kernel_size: DEFAULT_BLUR_KERNEL_SIZE,
            dilate_iterations: DEFAULT_DILATE_ITERATIONS,
            connectivity: Connectivity::default(),
        }
    }

    pub fn with_min_area(mut self, min_area: Area) -> Self {
        self.min_area = min_area;
        self
    }

    pub fn with_delta_threshold(mut self, delta_threshold: u32) -> Self {
        self.delta_threshold = delta_threshold;
        self
    }

    pub fn with_smoothing_factor(mut self, smoothing_factor: f64) -> Self {
        self.smoothing_factor = smoothing_factor;
        self
    }

    pub fn with_blur_kernel_size(mut self, blur_kernel_size: u32) -> Self {
        self.blur_kernel_size = blur_kernel_size;
        self
    }

    pub fn with_dilate_iterations(mut self, dilate_iterations: u8) -> Self {
        self.dilate_iterations = dilate_iterations;
        self
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn roi(&self) -> Roi {
        Roi::from_points(self.upper_left, self.bottom_right)
    }

    /// The delta threshold as an 8-bit cutoff. Only meaningful once validated.
    pub(crate) fn cutoff(&self) -> u8 {
        self.delta_threshold.min(u8::MAX as u32) as u8
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let FrameSize { width, height } = self.frame_size;
        if width == 0 || height == 0 {
            return Err(ConfigurationError::EmptyFrameSize { width, height });
        }

        let roi = self.roi();
        if roi.is_empty() {
            return Err(ConfigurationError::EmptyRoi { roi });
        }
        if !roi.fits(width, height) {
            return Err(ConfigurationError::RoiOutOfBounds { roi, width, height });
        }

        let alpha = self.smoothing_factor;
        if !alpha.is_finite() || alpha <= 0.0 || alpha > 1.0 {
            return Err(ConfigurationError::SmoothingFactor(alpha));
        }

        if self.delta_threshold > u8::MAX as u32 {
            return Err(ConfigurationError::DeltaThreshold(self.delta_threshold));
        }

        if self.blur_kernel_size == 0 || self.blur_kernel_size % 2 == 0 {
            return Err(ConfigurationError::BlurKernelSize(self.blur_kernel_size));
        }

        Ok(())
    }
}
