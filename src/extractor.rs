use crate::image::{gray_from_dynamic, RawPixels};
use crate::integral::IntegralImage;
use crate::keypoint::SiftKeypoint;
use crate::Error;
use ::image::{DynamicImage, GrayImage};
use log::*;

/// Locates integer-coordinate interest point candidates in a grayscale
/// image.
pub trait CornerDetector {
    /// Returns candidate pixel coordinates, in detection order. The
    /// extractor preserves this order in its output.
    fn detect(&mut self, gray: &GrayImage) -> Result<Vec<(u32, u32)>, Error>;
}

/// Computes per-keypoint descriptors from a grayscale buffer, its integral
/// image and a geometric sampling pattern.
pub trait DescriptorComputer {
    /// The geometric sampling pattern, sized by octave count and scale.
    type Pattern;

    /// Build the sampling pattern for the given octave count and scale.
    fn build_pattern(&self, octaves: u32, scale: f32) -> Self::Pattern;

    /// Fill in the descriptor of every keypoint in `keypoints`, in place.
    /// `extended` selects the longer descriptor variant.
    fn compute(
        &mut self,
        gray: &GrayImage,
        integral: &IntegralImage,
        pattern: &Self::Pattern,
        extended: bool,
        keypoints: &mut [SiftKeypoint],
    ) -> Result<(), Error>;
}

/// Selects whether and how descriptors are computed after detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Descriptors {
    /// Detection only; every keypoint keeps an absent descriptor.
    Disabled,
    /// The regular descriptor length.
    #[default]
    Standard,
    /// The extended descriptor length.
    Extended,
}

/// The cached sampling pattern together with the parameters it was built
/// for. A pattern is only usable in the `Valid` state; parameter changes
/// demote it to `Stale` so the next extraction rebuilds it.
#[derive(Debug)]
enum PatternCache<P> {
    /// No pattern has ever been built.
    NotBuilt,
    /// A pattern was built, but `octaves` or `scale` changed since.
    Stale,
    /// Ready for use with the recorded parameters.
    Valid {
        octaves: u32,
        scale: f32,
        pattern: P,
    },
}

impl<P> PatternCache<P> {
    fn invalidate(&mut self) {
        if let PatternCache::Valid { .. } = self {
            *self = PatternCache::Stale;
        }
    }

    /// Return the cached pattern, rebuilding unless the cache is `Valid`
    /// for exactly these parameters.
    fn ensure(&mut self, octaves: u32, scale: f32, build: impl FnOnce(u32, f32) -> P) -> &P {
        let usable = matches!(
            self,
            PatternCache::Valid {
                octaves: o,
                scale: s,
                ..
            } if *o == octaves && *s == scale
        );
        if !usable {
            debug!(
                "Building the sampling pattern for octaves={}, scale={}",
                octaves, scale
            );
            *self = PatternCache::Valid {
                octaves,
                scale,
                pattern: build(octaves, scale),
            };
        }
        match self {
            PatternCache::Valid { pattern, .. } => pattern,
            PatternCache::NotBuilt | PatternCache::Stale => {
                unreachable!("the pattern was just built")
            }
        }
    }
}

/// Drives a corner detector and a descriptor computer over single images.
///
/// The extractor owns its collaborators and the descriptor configuration.
/// The grayscale buffer and integral image are per-call state; only the
/// sampling pattern is cached, keyed by the current octave count and scale.
///
/// One extractor serves one thread. Cached state is mutated in place with
/// no synchronization, which is why every entry point takes `&mut self`;
/// use one extractor per thread for concurrent work.
pub struct FeatureExtractor<C, D: DescriptorComputer> {
    corners: C,
    computer: D,
    descriptors: Descriptors,
    octaves: u32,
    scale: f32,
    pattern: PatternCache<D::Pattern>,
}

impl<C: CornerDetector, D: DescriptorComputer> FeatureExtractor<C, D> {
    /// The default number of octaves covered by the sampling pattern.
    pub const DEFAULT_OCTAVES: u32 = 4;
    /// The default pattern scale in pixel units.
    pub const DEFAULT_SCALE: f32 = 22.0;

    /// Create an extractor around the given collaborators with standard
    /// descriptors, default octaves and default scale.
    pub fn new(corners: C, computer: D) -> Self {
        Self {
            corners,
            computer,
            descriptors: Descriptors::default(),
            octaves: Self::DEFAULT_OCTAVES,
            scale: Self::DEFAULT_SCALE,
            pattern: PatternCache::NotBuilt,
        }
    }

    /// The current descriptor mode.
    pub fn descriptors(&self) -> Descriptors {
        self.descriptors
    }

    /// Select the descriptor mode. The cached pattern is unaffected; the
    /// mode only picks the output length at computation time.
    pub fn set_descriptors(&mut self, descriptors: Descriptors) {
        self.descriptors = descriptors;
    }

    /// The number of octaves the sampling pattern spans.
    pub fn octaves(&self) -> u32 {
        self.octaves
    }

    /// Set the octave count. A changed value marks the cached pattern stale
    /// so the next extraction rebuilds it; setting the current value leaves
    /// the cache untouched.
    pub fn set_octaves(&mut self, octaves: u32) {
        if self.octaves != octaves {
            self.octaves = octaves;
            self.pattern.invalidate();
        }
    }

    /// The pattern scale in pixel units.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Set the pattern scale. A changed value marks the cached pattern
    /// stale so the next extraction rebuilds it; setting the current value
    /// leaves the cache untouched.
    pub fn set_scale(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = scale;
            self.pattern.invalidate();
        }
    }

    /// Detect keypoints in `image` and, unless descriptors are disabled,
    /// compute their descriptors in place.
    ///
    /// Accepts 8-bit grayscale, RGB and RGBA images; any other encoding
    /// fails with [`Error::UnsupportedFormat`] before any work happens.
    /// Grayscale input is used directly as the working buffer without a
    /// copy. Collaborator failures propagate unchanged and no partial list
    /// is returned.
    pub fn extract(&mut self, image: &DynamicImage) -> Result<Vec<SiftKeypoint>, Error> {
        let gray = gray_from_dynamic(image)?;
        self.extract_gray(&gray)
    }

    /// The locked-pixel-buffer variant of [`FeatureExtractor::extract`].
    ///
    /// The borrow on `pixels` ends when this returns, on success and on
    /// every failure path, so the caller can unlock the buffer immediately
    /// afterwards.
    pub fn extract_raw(&mut self, pixels: RawPixels<'_>) -> Result<Vec<SiftKeypoint>, Error> {
        let gray = pixels.to_gray();
        self.extract_gray(&gray)
    }

    fn extract_gray(&mut self, gray: &GrayImage) -> Result<Vec<SiftKeypoint>, Error> {
        trace!("Computing the integral image.");
        let integral = IntegralImage::from_gray(gray);
        trace!("Detecting corner candidates.");
        let corners = self.corners.detect(gray)?;
        let mut keypoints: Vec<SiftKeypoint> = corners
            .into_iter()
            .map(|(x, y)| SiftKeypoint::new(x as f32, y as f32))
            .collect();
        if self.descriptors != Descriptors::Disabled {
            let extended = self.descriptors == Descriptors::Extended;
            let computer = &self.computer;
            let pattern = self.pattern.ensure(self.octaves, self.scale, |octaves, scale| {
                computer.build_pattern(octaves, scale)
            });
            trace!("Computing descriptors.");
            self.computer
                .compute(gray, &integral, pattern, extended, &mut keypoints)?;
        }
        info!("Extracted {} features", keypoints.len());
        Ok(keypoints)
    }
}
