//! Typed building blocks for feature-point pipelines: keypoint data holders
//! with descriptor serialization, grayscale/integral-image plumbing, and a
//! [`FeatureExtractor`] that drives a pluggable corner detector and
//! descriptor computer over single images.
//!
//! The detection and description algorithms themselves are collaborator
//! traits ([`CornerDetector`], [`DescriptorComputer`]); bind them to whatever
//! implementation suits your application.

mod extractor;
mod image;
mod integral;
mod keypoint;
mod surf;

pub use crate::extractor::{CornerDetector, DescriptorComputer, Descriptors, FeatureExtractor};
pub use crate::image::{gray_from_dynamic, RawFormat, RawPixels};
pub use crate::integral::IntegralImage;
pub use crate::keypoint::{FeaturePoint, SiftKeypoint};
pub use crate::surf::{LaplacianSign, SurfPoint};

use thiserror::Error;

/// Errors produced by the extraction pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The input image uses a pixel encoding the pipeline does not accept.
    #[error("unsupported pixel format {0:?}")]
    UnsupportedFormat(::image::ColorType),

    /// A raw pixel buffer's geometry does not add up.
    #[error("stride {stride} cannot cover {width}x{height} pixels in a buffer of {len} bytes")]
    BadStride {
        stride: usize,
        width: u32,
        height: u32,
        len: usize,
    },

    /// A failure surfaced unchanged from a corner detector or descriptor
    /// computer.
    #[error(transparent)]
    Collaborator(#[from] Box<dyn std::error::Error + Send + Sync>),
}
