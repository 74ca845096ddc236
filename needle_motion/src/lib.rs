// THEORY:
// This file is the entry point of the `needle_motion` library crate. It exposes
// `MotionPipeline` and its data structures (`MotionConfig`, `Frame`,
// `DetectionResult`, ...) as the interface of the detector. The per-stage
// modules under `core_modules` stay public so each stage can be used and tested
// on its own, but a typical consumer only needs the re-exports below.
//
// The crate performs no capture, display or file I/O. Collaborators feed it
// frames through `FrameSource` and receive results through `DetectionSink`.

pub mod collaborators;
pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use collaborators::{DetectionSink, FrameSource, RunSummary, TimestampedFrame};
pub use config::{FrameSize, MotionConfig};
pub use core_modules::bounding_box::BoundingBox;
pub use core_modules::detection::{DetectionResult, Timestamp};
pub use core_modules::frame::{Frame, PixelLayout};
pub use core_modules::region_extractor::Connectivity;
pub use core_modules::roi::{Point, Roi};
pub use error::{ConfigurationError, FrameError, MotionError};
pub use parallel_pipeline::{ParallelError, ParallelPipeline};
pub use pipeline::{MotionPipeline, PipelineState};
