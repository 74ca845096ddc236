// THEORY:
// A `DetectionResult` is the single output the pipeline produces per frame. It
// is the only thing a collaborator (an overlay drawer, an alerting hook, a JSON
// logger) ever needs to look at.
//
// The "movement" flag is never stored independently of the boxes: it is derived
// from them at construction, so a result claiming movement with no boxes (or
// boxes with no movement) cannot exist.

use crate::core_modules::bounding_box::{Area, BoundingBox};
use chrono::{DateTime, Local};
use serde::Serialize;

pub type Timestamp = DateTime<Local>;

/// Strftime pattern of the human-readable timestamp label.
pub const TIMESTAMP_LABEL_FORMAT: &str = "%A %d %B %Y %I:%M:%S%p";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    sequence: u64,
    timestamp: Timestamp,
    movement_detected: bool,
    boxes: Vec<BoundingBox>,
}

impl DetectionResult {
    pub fn new(sequence: u64, timestamp: Timestamp, boxes: Vec<BoundingBox>) -> Self {
        Self {
            sequence,
            timestamp,
            movement_detected: !boxes.is_empty(),
            boxes,
        }
    }

    /// A result that reports nothing, as produced for the seeding frame.
    pub fn quiet(sequence: u64, timestamp: Timestamp) -> Self {
        Self::new(sequence, timestamp, Vec::new())
    }

    /// 0-based index of the frame within its pipeline.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn movement_detected(&self) -> bool {
        self.movement_detected
    }

    /// Boxes in ROI-local coordinates, in region discovery order.
    pub fn boxes(&self) -> &[BoundingBox] {
        &self.boxes
    }

    pub fn total_box_area(&self) -> Area {
        self.boxes.iter().map(BoundingBox::area).sum()
    }

    pub fn status_text(&self) -> &'static str {
        if self.movement_detected { "Movement" } else { "No movement" }
    }

    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_LABEL_FORMAT).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at_noon() -> Timestamp {
        Local.with_ymd_and_hms(2024, 3, 8, 12, 5, 9).unwrap()
    }

    #[test]
    fn movement_flag_follows_boxes() {
        let quiet = DetectionResult::quiet(0, at_noon());
        assert!(!quiet.movement_detected());
        assert_eq!(quiet.status_text(), "No movement");

        let busy = DetectionResult::new(1, at_noon(), vec![BoundingBox::new(0, 0, 4, 5)]);
        assert!(busy.movement_detected());
        assert_eq!(busy.status_text(), "Movement");
        assert_eq!(busy.total_box_area(), 20);
    }

    #[test]
    fn timestamp_label_uses_long_form() {
        let result = DetectionResult::quiet(0, at_noon());
        assert_eq!(result.timestamp_label(), "Friday 08 March 2024 12:05:09PM");
    }
}
