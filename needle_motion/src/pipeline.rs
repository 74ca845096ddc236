// THEORY:
// The `pipeline` module is the top-level API of the detector. `MotionPipeline`
// owns the background model and sequences every other stage for each frame:
//
//     Frame -> ROI crop -> grayscale + blur -> background update
//           -> difference -> threshold -> dilate -> regions -> DetectionResult
//
// Key architectural principles:
// 1.  **Explicit State Machine**: The pipeline is either `Uninitialized` (no
//     background yet) or `Active`. The very first frame seeds the background
//     and reports no movement, because there is nothing to compare it with.
//     Every later frame is a full detection pass. There is no way back.
// 2.  **Single Owner of State**: The background model lives inside the `Active`
//     state and is only reachable through `&mut self`. One pipeline, one
//     writer. Watching several ROIs in parallel means several pipelines.
// 3.  **Fixed Geometry**: The frame size and ROI are validated once at
//     configuration time. A frame of any other size is rejected with a typed
//     error before it can touch the background; the pipeline never guesses a
//     new ROI.

use crate::collaborators::{DetectionSink, FrameSource, RunSummary, TimestampedFrame};
use crate::config::MotionConfig;
use crate::core_modules::background::BackgroundModel;
use crate::core_modules::detection::{DetectionResult, Timestamp};
use crate::core_modules::differencer::difference;
use crate::core_modules::frame::Frame;
use crate::core_modules::grayscale::GrayscaleSmoother;
use crate::core_modules::region_extractor::region_extractor;
use crate::core_modules::threshold::{dilate, threshold};
use crate::error::{ConfigurationError, MotionError};
use log::{debug, info, warn};

/// Externally visible phase of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Uninitialized,
    Active,
}

enum DetectorState {
    Uninitialized,
    Active(BackgroundModel),
}

/// A single-ROI motion detector.
pub struct MotionPipeline {
    config: MotionConfig,
    smoother: GrayscaleSmoother,
    state: DetectorState,
    frames_processed: u64,
}

impl MotionPipeline {
    pub fn new(config: MotionConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            smoother: GrayscaleSmoother::new(config.blur_kernel_size),
            config,
            state: DetectorState::Uninitialized,
            frames_processed: 0,
        })
    }

    /// Replaces the configuration. Only allowed before the first frame.
    pub fn configure(&mut self, config: MotionConfig) -> Result<(), ConfigurationError> {
        if self.frames_processed > 0 {
            warn!("rejecting reconfiguration after {} processed frame(s)", self.frames_processed);
            return Err(ConfigurationError::AlreadyProcessing);
        }
        config.validate()?;
        self.smoother = GrayscaleSmoother::new(config.blur_kernel_size);
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &MotionConfig {
        &self.config
    }

    pub fn state(&self) -> PipelineState {
        match self.state {
            DetectorState::Uninitialized => PipelineState::Uninitialized,
            DetectorState::Active(_) => PipelineState::Active,
        }
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// The background model, once the first frame has seeded it.
    pub fn background(&self) -> Option<&BackgroundModel> {
        match &self.state {
            DetectorState::Uninitialized => None,
            DetectorState::Active(background) => Some(background),
        }
    }

    /// Runs one frame through the pipeline.
    pub fn process(&mut self, frame: &Frame, timestamp: Timestamp) -> Result<DetectionResult, MotionError> {
        let expected = self.config.frame_size.as_tuple();
        if frame.dimensions() != expected {
            return Err(MotionError::dimension_mismatch(expected, frame.dimensions()));
        }

        let view = self.config.roi().crop(frame)?;
        let gray = self.smoother.apply(&view);
        let sequence = self.frames_processed;

        let boxes = if let DetectorState::Active(background) = &mut self.state {
            let snapshot = background.update(&gray)?;
            let delta = difference(&gray, &snapshot)?;
            let mask = dilate(&threshold(&delta, self.config.cutoff()), self.config.dilate_iterations);
            region_extractor::extract_regions(&mask, self.config.min_area, self.config.connectivity)
        } else {
            info!("starting background model from frame {sequence}");
            self.state = DetectorState::Active(BackgroundModel::initialize(
                &gray,
                self.config.smoothing_factor as f32,
            ));
            Vec::new()
        };

        self.frames_processed += 1;
        debug!("frame {sequence}: {} moving region(s)", boxes.len());
        Ok(DetectionResult::new(sequence, timestamp, boxes))
    }

    /// Drives the pipeline from `source` into `sink` until the source is
    /// exhausted. Stops at the first error.
    pub fn run<S, K>(&mut self, source: &mut S, sink: &mut K) -> Result<RunSummary, MotionError>
    where
        S: FrameSource + ?Sized,
        K: DetectionSink + ?Sized,
    {
        let mut summary = RunSummary::default();
        while let Some(next) = source.next_frame() {
            let TimestampedFrame { frame, timestamp } = next.map_err(|err| MotionError::Source(err.into()))?;
            let result = self.process(&frame, timestamp)?;
            summary.record(&result);
            sink.on_result(&result);
        }
        info!(
            "run finished: {} frame(s), {} with movement",
            summary.frames, summary.frames_with_movement
        );
        Ok(summary)
    }
}
