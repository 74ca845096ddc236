use log::{error, info};
use needle_motion::{DetectionResult, DetectionSink};
use std::io::Write;

/// Logs every result and, in JSON mode, writes it to `out` as one line.
pub struct ReportSink<W: Write> {
    out: W,
    json: bool,
    frames: u64,
    frames_with_movement: u64,
}

impl<W: Write> ReportSink<W> {
    pub fn new(out: W, json: bool) -> Self {
        Self {
            out,
            json,
            frames: 0,
            frames_with_movement: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn frames_with_movement(&self) -> u64 {
        self.frames_with_movement
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DetectionSink for ReportSink<W> {
    fn on_result(&mut self, result: &DetectionResult) {
        self.frames += 1;
        if result.movement_detected() {
            self.frames_with_movement += 1;
        }

        info!(
            "[{}] frame {}: {} ({} region(s))",
            result.timestamp_label(),
            result.sequence(),
            result.status_text(),
            result.boxes().len()
        );

        if self.json {
            let written = serde_json::to_string(result)
                .map_err(anyhow::Error::from)
                .and_then(|line| writeln!(self.out, "{line}").map_err(anyhow::Error::from));
            if let Err(err) = written {
                error!("failed to write result for frame {}: {err:#}", result.sequence());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use needle_motion::BoundingBox;

    #[test]
    fn counts_frames_and_writes_json_lines() {
        let mut sink = ReportSink::new(Vec::new(), true);
        sink.on_result(&DetectionResult::quiet(0, Local::now()));
        sink.on_result(&DetectionResult::new(1, Local::now(), vec![BoundingBox::new(1, 2, 3, 4)]));

        assert_eq!(sink.frames(), 2);
        assert_eq!(sink.frames_with_movement(), 1);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["movement_detected"], false);
        assert_eq!(lines[1]["boxes"][0]["width"], 3);
    }

    #[test]
    fn plain_mode_writes_nothing() {
        let mut sink = ReportSink::new(Vec::new(), false);
        sink.on_result(&DetectionResult::quiet(0, Local::now()));
        assert!(sink.into_inner().is_empty());
    }
}
