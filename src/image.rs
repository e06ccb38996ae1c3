use crate::Error;
use ::image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use log::*;
use std::borrow::Cow;

/// BT.709 luma, rounded to the nearest 8-bit level.
fn luma709(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.2126 * f32::from(r) + 0.7152 * f32::from(g) + 0.0722 * f32::from(b);
    y.round() as u8
}

/// Obtain an 8-bit grayscale view of `input`.
///
/// A `Luma8` input is aliased rather than copied: the returned buffer borrows
/// the caller's pixels for the duration of the processing call. RGB and RGBA
/// inputs are converted with BT.709 luma weights into an owned buffer; the
/// alpha channel is ignored. Every other encoding fails with
/// [`Error::UnsupportedFormat`] before any pixel is touched.
pub fn gray_from_dynamic(input: &DynamicImage) -> Result<Cow<'_, GrayImage>, Error> {
    match input {
        DynamicImage::ImageLuma8(gray) => {
            debug!(
                "Using the {} x {} 8-bit input directly as the grayscale buffer",
                gray.width(),
                gray.height()
            );
            Ok(Cow::Borrowed(gray))
        }
        DynamicImage::ImageRgb8(rgb) => {
            debug!("Converting a {} x {} RGB image", rgb.width(), rgb.height());
            Ok(Cow::Owned(ImageBuffer::from_fn(
                rgb.width(),
                rgb.height(),
                |x, y| {
                    let p = rgb[(x, y)];
                    Luma([luma709(p[0], p[1], p[2])])
                },
            )))
        }
        DynamicImage::ImageRgba8(rgba) => {
            debug!(
                "Converting a {} x {} RGBA image",
                rgba.width(),
                rgba.height()
            );
            Ok(Cow::Owned(ImageBuffer::from_fn(
                rgba.width(),
                rgba.height(),
                |x, y| {
                    let p = rgba[(x, y)];
                    Luma([luma709(p[0], p[1], p[2])])
                },
            )))
        }
        other => Err(Error::UnsupportedFormat(other.color())),
    }
}

/// Pixel encodings accepted on the raw-buffer path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawFormat {
    /// One byte per pixel, 8-bit intensity.
    Luma8,
    /// Three bytes per pixel: R, G, B.
    Rgb8,
    /// Four bytes per pixel: R, G, B and one padding byte.
    Rgbx8,
    /// Four bytes per pixel: R, G, B, A.
    Rgba8,
}

impl RawFormat {
    /// Bytes occupied by one pixel.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            RawFormat::Luma8 => 1,
            RawFormat::Rgb8 => 3,
            RawFormat::Rgbx8 | RawFormat::Rgba8 => 4,
        }
    }
}

/// A borrowed view over a locked pixel buffer.
///
/// This is the entry point for framebuffer-style callers that hold pixels in
/// a foreign allocation with row padding. The view only borrows the bytes,
/// so the buffer is released when the processing call returns, on success
/// and on every failure path alike.
#[derive(Debug, Clone, Copy)]
pub struct RawPixels<'a> {
    format: RawFormat,
    width: u32,
    height: u32,
    /// Distance between the starts of consecutive rows, in bytes.
    stride: usize,
    data: &'a [u8],
}

impl<'a> RawPixels<'a> {
    /// Wrap a locked pixel buffer, validating that `stride` rows of `width`
    /// pixels fit inside `data`. The final row does not need stride padding.
    pub fn new(
        format: RawFormat,
        width: u32,
        height: u32,
        stride: usize,
        data: &'a [u8],
    ) -> Result<Self, Error> {
        let row = format.bytes_per_pixel() * width as usize;
        let needed = match height as usize {
            0 => 0,
            rows => stride * (rows - 1) + row,
        };
        if stride < row || data.len() < needed {
            return Err(Error::BadStride {
                stride,
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            format,
            width,
            height,
            stride,
            data,
        })
    }

    /// The pixel encoding of the buffer.
    pub fn format(&self) -> RawFormat {
        self.format
    }

    /// The image width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// The image height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Materialize the view into an owned grayscale buffer, honoring the row
    /// stride. Color formats are converted with BT.709 luma weights.
    pub(crate) fn to_gray(self) -> GrayImage {
        let bpp = self.format.bytes_per_pixel();
        ImageBuffer::from_fn(self.width, self.height, |x, y| {
            let i = y as usize * self.stride + x as usize * bpp;
            match self.format {
                RawFormat::Luma8 => Luma([self.data[i]]),
                RawFormat::Rgb8 | RawFormat::Rgbx8 | RawFormat::Rgba8 => {
                    Luma([luma709(self.data[i], self.data[i + 1], self.data[i + 2])])
                }
            }
        })
    }
}
