// THEORY:
// The Grayscale Smoother turns a colour crop into the single intensity channel
// that every later stage compares, and takes the sensor noise out of it.
//
// Key architectural principles:
// 1.  **Luma Only**: Motion shows up as a change in brightness. Colour adds cost
//     and little signal, so each pixel is reduced to its Rec. 601 luma.
// 2.  **Heavy Low-Pass**: Single-pixel sensor noise would otherwise survive the
//     differencer and the threshold. A wide Gaussian (21x21 by default) spreads
//     any such speck far below the cutoff while a real object, being large,
//     keeps its contrast.
// 3.  **Automatic Sigma**: The standard deviation follows from the kernel size,
//     so there is a single knob. Kernel coefficients are computed once per
//     pipeline, not per frame.
// 4.  **Float Passes, One Rounding**: Both blur passes run over `f32` and the
//     result is rounded to 8 bits once, so a uniform crop comes out unchanged.
// 5.  **Pure**: Given the same crop, the output is the same bytes. No state.

use crate::core_modules::frame::PixelLayout;
use crate::core_modules::roi::RoiView;
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::separable_filter_equal;

type FloatLumaImage = ImageBuffer<Luma<f32>, Vec<f32>>;

pub type Luminance = f64;
pub type Sigma = f32;

pub const DEFAULT_BLUR_KERNEL_SIZE: u32 = 21;

const RED_WEIGHT: Luminance = 0.299;
const GREEN_WEIGHT: Luminance = 0.587;
const BLUE_WEIGHT: Luminance = 0.114;

/// Rec. 601 luma of one pixel, rounded to the 8-bit range.
pub fn luma(layout: PixelLayout, pixel: &[u8]) -> u8 {
    match layout.rgb_offsets() {
        Some((r, g, b)) => {
            let luminance = RED_WEIGHT * pixel[r] as Luminance
                + GREEN_WEIGHT * pixel[g] as Luminance
                + BLUE_WEIGHT * pixel[b] as Luminance;
            luminance.round().clamp(0.0, 255.0) as u8
        }
        None => pixel[0],
    }
}

/// Reduces a crop to one luma channel, same dimensions as the crop.
pub fn to_grayscale(view: &RoiView<'_>) -> GrayImage {
    let layout = view.layout();
    GrayImage::from_fn(view.width(), view.height(), |x, y| {
        Luma([luma(layout, view.pixel(x, y))])
    })
}

/// The standard deviation a Gaussian of `kernel_size` taps is given when none
/// is specified: `0.3 * ((k - 1) / 2 - 1) + 0.8`.
pub fn auto_sigma(kernel_size: u32) -> Sigma {
    0.3 * ((kernel_size as Sigma - 1.0) * 0.5 - 1.0) + 0.8
}

/// A normalized 1D Gaussian of `kernel_size` taps (expected odd) with the
/// automatic sigma.
pub fn gaussian_kernel(kernel_size: u32) -> Vec<f32> {
    let half = (kernel_size / 2) as i64;
    let sigma = auto_sigma(kernel_size);
    let two_sigma_sq = 2.0 * sigma * sigma;

    let mut kernel: Vec<f32> = (-half..=half)
        .map(|i| {
            let x = i as f32;
            (-x * x / two_sigma_sq).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for coefficient in &mut kernel {
        *coefficient /= sum;
    }
    kernel
}

/// Luma conversion followed by a separable Gaussian blur. Kernel size 1
/// disables the blur.
#[derive(Debug, Clone)]
pub struct GrayscaleSmoother {
    kernel_size: u32,
    kernel: Vec<f32>,
}

impl GrayscaleSmoother {
    pub fn new(kernel_size: u32) -> Self {
        Self {
            kernel_size,
            kernel: gaussian_kernel(kernel_size),
        }
    }

    pub fn kernel_size(&self) -> u32 {
        self.kernel_size
    }

    pub fn smooth(&self, gray: &GrayImage) -> GrayImage {
        if self.kernel_size <= 1 {
            return gray.clone();
        }
        let (width, height) = gray.dimensions();
        let intensity = FloatLumaImage::from_fn(width, height, |x, y| Luma([gray.get_pixel(x, y)[0] as f32]));
        let blurred = separable_filter_equal(&intensity, &self.kernel);
        GrayImage::from_fn(width, height, |x, y| {
            Luma([blurred.get_pixel(x, y)[0].round().clamp(0.0, 255.0) as u8])
        })
    }

    pub fn apply(&self, view: &RoiView<'_>) -> GrayImage {
        self.smooth(&to_grayscale(view))
    }
}

impl Default for GrayscaleSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_BLUR_KERNEL_SIZE)
    }
}
