//! End-to-end run of the extraction pipeline with simple collaborators:
//! a brightness-threshold corner detector and a descriptor computer that
//! compares integral-image window means around each keypoint.

use image::{DynamicImage, GrayImage, Luma, RgbImage};
use kpextract::{
    CornerDetector, DescriptorComputer, Descriptors, Error, FeatureExtractor, IntegralImage,
    RawFormat, RawPixels, SiftKeypoint,
};

/// Flags every pixel brighter than the threshold as a candidate, scanning
/// rows top to bottom.
struct BrightPixels {
    threshold: u8,
}

impl CornerDetector for BrightPixels {
    fn detect(&mut self, gray: &GrayImage) -> Result<Vec<(u32, u32)>, Error> {
        let mut points = Vec::new();
        for (x, y, pixel) in gray.enumerate_pixels() {
            if pixel[0] > self.threshold {
                points.push((x, y));
            }
        }
        Ok(points)
    }
}

/// Compares the mean of a window centered on the keypoint against means at
/// pattern offsets; each comparison contributes one descriptor bit.
struct MeanComparison;

impl DescriptorComputer for MeanComparison {
    type Pattern = Vec<(i32, i32)>;

    fn build_pattern(&self, octaves: u32, scale: f32) -> Vec<(i32, i32)> {
        let radius = (scale / octaves.max(1) as f32).ceil() as i32;
        vec![
            (radius, 0),
            (-radius, 0),
            (0, radius),
            (0, -radius),
            (radius, radius),
            (-radius, -radius),
            (radius, -radius),
            (-radius, radius),
        ]
    }

    fn compute(
        &mut self,
        _gray: &GrayImage,
        integral: &IntegralImage,
        pattern: &Vec<(i32, i32)>,
        extended: bool,
        keypoints: &mut [SiftKeypoint],
    ) -> Result<(), Error> {
        let len = if extended { 128 } else { 64 };
        let window_mean = |cx: i32, cy: i32| -> f64 {
            let x = cx.clamp(1, integral.width() as i32 - 2) as u32;
            let y = cy.clamp(1, integral.height() as i32 - 2) as u32;
            integral.mean_rect(x - 1, y - 1, 3, 3)
        };
        for keypoint in keypoints {
            let (cx, cy) = (keypoint.x as i32, keypoint.y as i32);
            let center = window_mean(cx, cy);
            let mut descriptor = vec![0u8; len];
            for (bit, &(dx, dy)) in pattern.iter().cycle().take(len * 8).enumerate() {
                if window_mean(cx + dx, cy + dy) > center {
                    descriptor[bit >> 3] |= 1 << (bit & 7);
                }
            }
            keypoint.descriptor = Some(descriptor);
        }
        Ok(())
    }
}

fn dotted_image() -> DynamicImage {
    let mut gray = GrayImage::from_pixel(32, 32, Luma([20]));
    gray.put_pixel(5, 7, Luma([250]));
    gray.put_pixel(20, 13, Luma([240]));
    gray.put_pixel(28, 30, Luma([255]));
    DynamicImage::ImageLuma8(gray)
}

fn extractor() -> FeatureExtractor<BrightPixels, MeanComparison> {
    FeatureExtractor::new(BrightPixels { threshold: 200 }, MeanComparison)
}

#[test]
fn bright_dots_become_keypoints_with_descriptors() {
    let mut extractor = extractor();
    let keypoints = extractor.extract(&dotted_image()).unwrap();
    let coords: Vec<(f32, f32)> = keypoints.iter().map(|k| (k.x, k.y)).collect();
    assert_eq!(coords, vec![(5.0, 7.0), (20.0, 13.0), (28.0, 30.0)]);
    for keypoint in &keypoints {
        let descriptor = keypoint.descriptor.as_ref().unwrap();
        assert_eq!(descriptor.len(), 64);
        assert_eq!(keypoint.descriptor_hex().len(), 128);
        assert_eq!(keypoint.descriptor_binary().len(), 8 * 64);
        assert_eq!(keypoint.scale, SiftKeypoint::DEFAULT_SCALE);
    }
}

#[test]
fn uniform_image_yields_no_keypoints() {
    let mut extractor = extractor();
    let uniform = DynamicImage::ImageLuma8(GrayImage::from_pixel(24, 24, Luma([90])));
    let keypoints = extractor.extract(&uniform).unwrap();
    assert!(keypoints.is_empty());
}

#[test]
fn color_image_with_descriptors_disabled() {
    let mut extractor = extractor();
    extractor.set_descriptors(Descriptors::Disabled);
    let mut rgb = RgbImage::from_pixel(16, 16, image::Rgb([10, 10, 10]));
    rgb.put_pixel(8, 8, image::Rgb([255, 255, 255]));
    let keypoints = extractor
        .extract(&DynamicImage::ImageRgb8(rgb))
        .unwrap();
    assert_eq!(keypoints.len(), 1);
    assert!(keypoints[0].descriptor.is_none());
}

#[test]
fn extended_mode_doubles_the_descriptor() {
    let mut extractor = extractor();
    extractor.set_descriptors(Descriptors::Extended);
    let keypoints = extractor.extract(&dotted_image()).unwrap();
    assert_eq!(keypoints[0].descriptor.as_ref().unwrap().len(), 128);
}

#[test]
fn scale_change_alters_descriptor_content() {
    // a second bright pixel two columns over is only visible to the tight
    // pattern; the default wide pattern samples flat background everywhere
    let mut gray = GrayImage::from_pixel(32, 32, Luma([20]));
    gray.put_pixel(10, 10, Luma([250]));
    gray.put_pixel(12, 10, Luma([255]));
    let image = DynamicImage::ImageLuma8(gray);

    let mut extractor = extractor();
    let wide = extractor.extract(&image).unwrap();

    extractor.set_scale(4.0);
    let tight = extractor.extract(&image).unwrap();
    assert_ne!(wide[0].descriptor, tight[0].descriptor);
}

#[test]
fn raw_locked_buffer_path() {
    // 8x4 grayscale with rows padded to a stride of 10
    let mut data = vec![15u8; 4 * 10];
    data[2 * 10 + 6] = 230; // pixel (6, 2)
    let view = RawPixels::new(RawFormat::Luma8, 8, 4, 10, &data).unwrap();

    let mut extractor = extractor();
    let keypoints = extractor.extract_raw(view).unwrap();
    assert_eq!(keypoints.len(), 1);
    assert_eq!((keypoints[0].x, keypoints[0].y), (6.0, 2.0));
}

#[test]
fn unsupported_encoding_is_rejected() {
    let mut extractor = extractor();
    let input = DynamicImage::ImageRgb32F(image::Rgb32FImage::from_pixel(
        4,
        4,
        image::Rgb([0.5, 0.5, 0.5]),
    ));
    assert!(matches!(
        extractor.extract(&input),
        Err(Error::UnsupportedFormat(_))
    ));
}
