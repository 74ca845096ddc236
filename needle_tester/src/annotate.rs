//! Draws the watched region and the detected boxes onto a copy of the frame,
//! along with a status bar, and writes it out as a PNG.

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;
use needle_motion::{BoundingBox, DetectionResult, Frame, Roi};
use std::path::{Path, PathBuf};

const ROI_COLOUR: Rgb<u8> = Rgb([0, 255, 0]);
const BOX_COLOUR: Rgb<u8> = Rgb([200, 50, 100]);
const MOVEMENT_COLOUR: Rgb<u8> = Rgb([255, 0, 0]);
const QUIET_COLOUR: Rgb<u8> = Rgb([0, 0, 255]);
const LINE_THICKNESS: u32 = 2;
const STATUS_BAR_HEIGHT: u32 = 6;

fn outline(canvas: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, colour: Rgb<u8>) {
    for inset in 0..LINE_THICKNESS {
        if width <= 2 * inset || height <= 2 * inset {
            break;
        }
        let rect = Rect::at((x + inset) as i32, (y + inset) as i32).of_size(width - 2 * inset, height - 2 * inset);
        draw_hollow_rect_mut(canvas, rect, colour);
    }
}

/// Renders `result` over `frame`. Boxes are ROI-local and are shifted into
/// frame coordinates here.
pub fn render(frame: &Frame, roi: &Roi, result: &DetectionResult) -> RgbImage {
    let mut canvas = frame.to_rgb_image();

    outline(&mut canvas, roi.upper_left.x, roi.upper_left.y, roi.width(), roi.height(), ROI_COLOUR);
    for bbox in result.boxes() {
        let BoundingBox { x, y, width, height } = bbox.to_frame_coords(roi);
        outline(&mut canvas, x, y, width, height, BOX_COLOUR);
    }

    let status = if result.movement_detected() { MOVEMENT_COLOUR } else { QUIET_COLOUR };
    let bar_height = STATUS_BAR_HEIGHT.min(canvas.height());
    let bar = Rect::at(0, 0).of_size(canvas.width(), bar_height);
    draw_filled_rect_mut(&mut canvas, bar, status);
    canvas
}

/// Where the annotated copy of `source` goes inside `out_dir`.
pub fn output_path(out_dir: &Path, source: Option<&Path>, sequence: u64) -> PathBuf {
    let stem = source
        .and_then(Path::file_stem)
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| format!("frame_{sequence:06}"));
    out_dir.join(format!("{stem}_annotated.png"))
}

pub fn save(canvas: &RgbImage, path: &Path) -> Result<()> {
    canvas.save(path).with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use needle_motion::PixelLayout;

    #[test]
    fn draws_roi_and_boxes_in_frame_coordinates() {
        let frame = Frame::uniform(40, 30, PixelLayout::Gray, 0).unwrap();
        let roi = Roi::new((5, 8), (35, 28));
        let result = DetectionResult::new(1, Local::now(), vec![BoundingBox::new(4, 4, 10, 6)]);

        let canvas = render(&frame, &roi, &result);

        assert_eq!(*canvas.get_pixel(5, 27), ROI_COLOUR);
        assert_eq!(*canvas.get_pixel(6, 20), ROI_COLOUR);
        assert_eq!(*canvas.get_pixel(9, 12), BOX_COLOUR);
        assert_eq!(*canvas.get_pixel(18, 17), BOX_COLOUR);
        assert_eq!(*canvas.get_pixel(14, 14), Rgb([0, 0, 0]));
        assert_eq!(*canvas.get_pixel(20, 0), MOVEMENT_COLOUR);
    }

    #[test]
    fn quiet_frames_get_quiet_status_bar() {
        let frame = Frame::uniform(20, 20, PixelLayout::Gray, 0).unwrap();
        let result = DetectionResult::quiet(0, Local::now());
        let canvas = render(&frame, &Roi::full_frame(20, 20), &result);
        assert_eq!(*canvas.get_pixel(10, 2), QUIET_COLOUR);
    }

    #[test]
    fn output_names_follow_the_source_file() {
        let dir = Path::new("out");
        assert_eq!(
            output_path(dir, Some(Path::new("frames/cam_0001.jpg")), 3),
            dir.join("cam_0001_annotated.png")
        );
        assert_eq!(output_path(dir, None, 7), dir.join("frame_000007_annotated.png"));
    }
}
