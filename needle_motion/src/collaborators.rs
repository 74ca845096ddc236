// THEORY:
// The pipeline knows nothing about cameras, files or screens. These two traits
// are the seams where those collaborators plug in: a `FrameSource` hands frames
// in, a `DetectionSink` takes results out. The driving loop
// (`MotionPipeline::run`) only ever talks to these traits.

use crate::core_modules::detection::{DetectionResult, Timestamp};
use crate::core_modules::frame::Frame;
use std::convert::Infallible;

/// A frame together with the moment it was captured.
#[derive(Debug, Clone)]
pub struct TimestampedFrame {
    pub frame: Frame,
    pub timestamp: Timestamp,
}

impl TimestampedFrame {
    pub fn new(frame: Frame, timestamp: Timestamp) -> Self {
        Self { frame, timestamp }
    }

    /// Stamps `frame` with the current local time.
    pub fn now(frame: Frame) -> Self {
        Self::new(frame, chrono::Local::now())
    }
}

/// Anything that can produce frames until it runs dry.
pub trait FrameSource {
    type Error: Into<Box<dyn std::error::Error + Send + Sync>>;

    /// The next frame, `None` once the source is exhausted.
    fn next_frame(&mut self) -> Option<Result<TimestampedFrame, Self::Error>>;
}

/// Any iterator of frames is an infallible source.
impl<I> FrameSource for I
where
    I: Iterator<Item = TimestampedFrame>,
{
    type Error = Infallible;

    fn next_frame(&mut self) -> Option<Result<TimestampedFrame, Self::Error>> {
        self.next().map(Ok)
    }
}

/// Receives every result the pipeline emits, in order.
pub trait DetectionSink {
    fn on_result(&mut self, result: &DetectionResult);
}

/// Collects results in memory.
impl DetectionSink for Vec<DetectionResult> {
    fn on_result(&mut self, result: &DetectionResult) {
        self.push(result.clone());
    }
}

/// Totals over one `run` of the driving loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: u64,
    pub frames_with_movement: u64,
    pub boxes: u64,
}

impl RunSummary {
    pub(crate) fn record(&mut self, result: &DetectionResult) {
        self.frames += 1;
        if result.movement_detected() {
            self.frames_with_movement += 1;
        }
        self.boxes += result.boxes().len() as u64;
    }
}
