use ::image::GrayImage;
use derive_more::{Deref, DerefMut};
use ndarray::Array2;

/// A summed-area table over an 8-bit grayscale image.
///
/// The table carries a one-pixel zero border so rectangle queries need no
/// edge special-casing: entry `[y + 1, x + 1]` holds the sum of every pixel
/// at or above-left of `(x, y)`. Rows index first, matching `ndarray`.
#[derive(Debug, Clone, Deref, DerefMut)]
pub struct IntegralImage(pub Array2<u64>);

impl IntegralImage {
    /// Build the table in a single pass over the image.
    pub fn from_gray(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        let mut table = Array2::zeros((height as usize + 1, width as usize + 1));
        for y in 0..height as usize {
            let mut row_sum = 0u64;
            for x in 0..width as usize {
                row_sum += u64::from(image.get_pixel(x as u32, y as u32)[0]);
                table[[y + 1, x + 1]] = table[[y, x + 1]] + row_sum;
            }
        }
        Self(table)
    }

    /// The width of the source image in pixels.
    pub fn width(&self) -> u32 {
        (self.0.dim().1 - 1) as u32
    }

    /// The height of the source image in pixels.
    pub fn height(&self) -> u32 {
        (self.0.dim().0 - 1) as u32
    }

    /// The sum of the `w` x `h` rectangle whose top-left pixel is `(x, y)`.
    /// The rectangle must lie fully inside the image.
    pub fn sum_rect(&self, x: u32, y: u32, w: u32, h: u32) -> u64 {
        let (x0, y0) = (x as usize, y as usize);
        let (x1, y1) = (x0 + w as usize, y0 + h as usize);
        self.0[[y1, x1]] + self.0[[y0, x0]] - self.0[[y0, x1]] - self.0[[y1, x0]]
    }

    /// The mean intensity over the same rectangle as
    /// [`IntegralImage::sum_rect`]. An empty rectangle has mean zero.
    pub fn mean_rect(&self, x: u32, y: u32, w: u32, h: u32) -> f64 {
        let area = u64::from(w) * u64::from(h);
        if area == 0 {
            return 0.0;
        }
        self.sum_rect(x, y, w, h) as f64 / area as f64
    }
}
