// THEORY:
// The `Frame` module is the entry point of raw data into the detector. A `Frame`
// is a "dumb" data container: a rectangular block of interleaved bytes plus the
// layout needed to interpret them. It is produced by a capture collaborator
// (camera, file reader, test fixture) and is never mutated afterwards.
//
// Key architectural principles:
// 1.  **Validated Construction**: A frame can only be built if its buffer length
//     matches `width * height * channels`. Every downstream stage may therefore
//     index pixels without re-checking the buffer.
// 2.  **Layout Awareness**: Cameras disagree on channel order. Pi cameras hand out
//     BGR, the `image` crate works in RGB(A), test fixtures are often plain gray.
//     `PixelLayout` records which one this buffer uses so that the grayscale
//     stage can pick the right bytes for the luma weights.
// 3.  **Interop, not Ownership of I/O**: The module converts to and from the
//     `image` crate's buffers so collaborators can decode and draw with it, but
//     it never touches a file or a device itself.

use crate::error::FrameError;
use image::{DynamicImage, GrayImage, Rgb, RgbImage, RgbaImage};
use serde::{Deserialize, Serialize};

pub type Byte = u8;
pub type Bytes = Vec<Byte>;
pub type Channels = usize;

/// Channel count and order of the bytes in a `Frame`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PixelLayout {
    Gray,
    Rgb,
    Bgr,
    Rgba,
    Bgra,
}

impl PixelLayout {
    pub const fn channels(self) -> Channels {
        match self {
            PixelLayout::Gray => 1,
            PixelLayout::Rgb | PixelLayout::Bgr => 3,
            PixelLayout::Rgba | PixelLayout::Bgra => 4,
        }
    }

    /// Byte offsets of the red, green and blue channels within one pixel.
    /// Single-channel layouts have none.
    pub const fn rgb_offsets(self) -> Option<(usize, usize, usize)> {
        match self {
            PixelLayout::Gray => None,
            PixelLayout::Rgb | PixelLayout::Rgba => Some((0, 1, 2)),
            PixelLayout::Bgr | PixelLayout::Bgra => Some((2, 1, 0)),
        }
    }
}

/// An immutable, validated block of interleaved pixel bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: u32,
    height: u32,
    layout: PixelLayout,
    data: Bytes,
}

impl Frame {
    pub fn new(width: u32, height: u32, layout: PixelLayout, data: Bytes) -> Result<Self, FrameError> {
        if width == 0 || height == 0 {
            return Err(FrameError::ZeroDimensions { width, height });
        }
        let expected = width as usize * height as usize * layout.channels();
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// A frame where every channel of every pixel holds `value`.
    pub fn uniform(width: u32, height: u32, layout: PixelLayout, value: Byte) -> Result<Self, FrameError> {
        let len = width as usize * height as usize * layout.channels();
        Self::new(width, height, layout, vec![value; len])
    }

    /// Builds a single-channel frame by evaluating `intensity` at every (x, y),
    /// row by row.
    pub fn from_gray_fn<F>(width: u32, height: u32, mut intensity: F) -> Result<Self, FrameError>
    where
        F: FnMut(u32, u32) -> Byte,
    {
        let mut data = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                data.push(intensity(x, y));
            }
        }
        Self::new(width, height, PixelLayout::Gray, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn channels(&self) -> Channels {
        self.layout.channels()
    }

    pub fn as_bytes(&self) -> &[Byte] {
        &self.data
    }

    /// The channel bytes of the pixel at (x, y).
    ///
    /// Panics if the coordinate lies outside the frame, like slice indexing.
    pub fn pixel(&self, x: u32, y: u32) -> &[Byte] {
        let channels = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * channels;
        &self.data[start..start + channels]
    }

    /// Re-packs the frame as RGB, for collaborators that draw or encode it.
    pub fn to_rgb_image(&self) -> RgbImage {
        let offsets = self.layout.rgb_offsets();
        RgbImage::from_fn(self.width, self.height, |x, y| {
            let pixel = self.pixel(x, y);
            match offsets {
                Some((r, g, b)) => Rgb([pixel[r], pixel[g], pixel[b]]),
                None => Rgb([pixel[0]; 3]),
            }
        })
    }
}

impl TryFrom<GrayImage> for Frame {
    type Error = FrameError;

    fn try_from(image: GrayImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Frame::new(width, height, PixelLayout::Gray, image.into_raw())
    }
}

impl TryFrom<RgbImage> for Frame {
    type Error = FrameError;

    fn try_from(image: RgbImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Frame::new(width, height, PixelLayout::Rgb, image.into_raw())
    }
}

impl TryFrom<RgbaImage> for Frame {
    type Error = FrameError;

    fn try_from(image: RgbaImage) -> Result<Self, Self::Error> {
        let (width, height) = image.dimensions();
        Frame::new(width, height, PixelLayout::Rgba, image.into_raw())
    }
}

impl TryFrom<&DynamicImage> for Frame {
    type Error = FrameError;

    /// 8-bit gray, RGB and RGBA images are taken as they are; everything else
    /// is converted to RGB first.
    fn try_from(image: &DynamicImage) -> Result<Self, Self::Error> {
        if let Some(gray) = image.as_luma8() {
            Frame::try_from(gray.clone())
        } else if let Some(rgba) = image.as_rgba8() {
            Frame::try_from(rgba.clone())
        } else {
            Frame::try_from(image.to_rgb8())
        }
    }
}
