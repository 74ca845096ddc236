// THEORY:
// The Thresholder makes the binary decision per pixel: moving or not. It then
// dilates the result, because a real object rarely differs from the background
// uniformly. A person in a patterned shirt produces a mask full of gaps; without
// dilation the region extractor would see a dozen small fragments, most of which
// the area filter would throw away. Two passes of a 3x3 square close those gaps
// at the price of a slightly larger box around the object.

use image::{GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology;

use crate::core_modules::differencer::IntensityMap;

pub type BinaryMask = GrayImage;
pub type Cutoff = u8;

pub const FOREGROUND: u8 = 255;
pub const BACKGROUND: u8 = 0;
pub const DEFAULT_DILATE_ITERATIONS: u8 = 2;

/// Foreground wherever the intensity is strictly greater than `cutoff`.
pub fn threshold(intensity: &IntensityMap, cutoff: Cutoff) -> BinaryMask {
    let (width, height) = intensity.dimensions();
    BinaryMask::from_fn(width, height, |x, y| {
        if intensity.get_pixel(x, y)[0] > cutoff {
            Luma([FOREGROUND])
        } else {
            Luma([BACKGROUND])
        }
    })
}

/// Grows the foreground by `iterations` passes of a 3x3 square. Repeating a 3x3
/// square `n` times reaches the same pixels as one `(2n + 1)`-wide square, which
/// is what the chessboard-norm dilation computes directly.
pub fn dilate(mask: &BinaryMask, iterations: u8) -> BinaryMask {
    if iterations == 0 {
        return mask.clone();
    }
    morphology::dilate(mask, Norm::LInf, iterations)
}

pub fn is_foreground(pixel: &Luma<u8>) -> bool {
    pixel[0] != BACKGROUND
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count_foreground(mask: &BinaryMask) -> usize {
        mask.pixels().filter(|p| is_foreground(p)).count()
    }

    #[test]
    fn threshold_is_strict() {
        let intensity = IntensityMap::from_fn(3, 1, |x, _| Luma([[24, 25, 26][x as usize]]));
        let mask = threshold(&intensity, 25);
        assert_eq!(mask.get_pixel(0, 0)[0], BACKGROUND);
        assert_eq!(mask.get_pixel(1, 0)[0], BACKGROUND);
        assert_eq!(mask.get_pixel(2, 0)[0], FOREGROUND);
    }

    #[test]
    fn two_iterations_grow_a_point_to_five_by_five() {
        let mut mask = BinaryMask::new(11, 11);
        mask.put_pixel(5, 5, Luma([FOREGROUND]));
        let dilated = dilate(&mask, 2);
        assert_eq!(count_foreground(&dilated), 25);
        assert!(is_foreground(dilated.get_pixel(3, 3)));
        assert!(is_foreground(dilated.get_pixel(7, 7)));
        assert!(!is_foreground(dilated.get_pixel(2, 5)));
    }

    #[test]
    fn dilation_bridges_a_two_pixel_gap() {
        let mut mask = BinaryMask::new(12, 3);
        for x in [3, 4, 7, 8] {
            mask.put_pixel(x, 1, Luma([FOREGROUND]));
        }
        let dilated = dilate(&mask, 1);
        assert!((3..=8).all(|x| is_foreground(dilated.get_pixel(x, 1))));
    }

    #[test]
    fn zero_iterations_leave_mask_untouched() {
        let mut mask = BinaryMask::new(4, 4);
        mask.put_pixel(1, 2, Luma([FOREGROUND]));
        assert_eq!(dilate(&mask, 0), mask);
    }

    #[test]
    fn dilation_stops_at_image_border() {
        let mut mask = BinaryMask::new(6, 6);
        mask.put_pixel(0, 0, Luma([FOREGROUND]));
        assert_eq!(count_foreground(&dilate(&mask, 2)), 9);
    }
}
