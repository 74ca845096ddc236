// THEORY:
// Every way the detector can refuse work is spelled out here as a typed error.
// The pipeline performs no I/O, so there is nothing transient to retry: an error
// is either a bad configuration (fatal to that pipeline instance) or a badly
// shaped frame (the caller may skip it and carry on).

use crate::core_modules::roi::Roi;
use thiserror::Error;

/// Raised by `configure` when a parameter is out of range or the ROI cannot
/// be placed on the declared frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("frame size must be non-zero, got {width}x{height}")]
    EmptyFrameSize { width: u32, height: u32 },
    #[error("region of interest {roi} has no area")]
    EmptyRoi { roi: Roi },
    #[error("region of interest {roi} does not fit a {width}x{height} frame")]
    RoiOutOfBounds { roi: Roi, width: u32, height: u32 },
    #[error("smoothing factor {0} is outside (0, 1]")]
    SmoothingFactor(f64),
    #[error("delta threshold {0} is outside the 8-bit intensity range")]
    DeltaThreshold(u32),
    #[error("blur kernel size {0} must be a positive odd number")]
    BlurKernelSize(u32),
    #[error("pipeline has already processed frames; its configuration is fixed")]
    AlreadyProcessing,
}

/// Raised when a caller hands over a pixel buffer that cannot be a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },
    #[error("frame buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// The error type of the per-frame API.
#[derive(Debug, Error)]
pub enum MotionError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(
        "frame is {actual_width}x{actual_height}, pipeline expects {expected_width}x{expected_height}"
    )]
    DimensionMismatch {
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error("region of interest {roi} lies outside a {width}x{height} frame")]
    OutOfBounds { roi: Roi, width: u32, height: u32 },
    #[error("frame source failed")]
    Source(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl MotionError {
    pub(crate) fn dimension_mismatch(expected: (u32, u32), actual: (u32, u32)) -> Self {
        MotionError::DimensionMismatch {
            expected_width: expected.0,
            expected_height: expected.1,
            actual_width: actual.0,
            actual_height: actual.1,
        }
    }
}
