use crate::keypoint::FeaturePoint;
use cv_core::nalgebra::Point2;
use cv_core::ImagePoint;

/// The sign of the Laplacian response at a detected blob.
///
/// Matching pipelines use this as a cheap pre-filter: a dark blob on a light
/// background never matches a light blob on a dark background, so candidate
/// pairs with opposite signs can be rejected without comparing descriptors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LaplacianSign {
    /// Light blob on a dark background.
    Negative,
    /// Flat response.
    Zero,
    /// Dark blob on a light background.
    Positive,
}

impl LaplacianSign {
    /// Classify a raw Laplacian response by its sign.
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            LaplacianSign::Positive
        } else if value < 0.0 {
            LaplacianSign::Negative
        } else {
            LaplacianSign::Zero
        }
    }

    /// The sign as `-1`, `0` or `1`.
    pub fn signum(self) -> i8 {
        match self {
            LaplacianSign::Negative => -1,
            LaplacianSign::Zero => 0,
            LaplacianSign::Positive => 1,
        }
    }
}

/// A blob-style interest point carrying the detector strength and Laplacian
/// sign alongside an optional gradient-histogram descriptor.
///
/// The descriptor holds 64 entries in standard mode and 128 in extended
/// mode; it stays absent until a descriptor pass computes it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SurfPoint {
    /// The horizontal coordinate in pixel units.
    pub x: f64,
    /// The vertical coordinate in pixel units.
    pub y: f64,
    /// The characteristic scale at which the point was detected.
    pub scale: f64,
    /// The dominant gradient orientation in radians.
    pub orientation: f64,
    /// The magnitude of response from the detector.
    pub response: f64,
    /// The sign of the Laplacian response at the point.
    pub laplacian: LaplacianSign,
    /// The descriptor vector, absent until computed.
    pub descriptor: Option<Vec<f64>>,
}

impl SurfPoint {
    /// Create a point from the values a detector knows at detection time.
    /// Orientation and response default to zero; the descriptor is absent.
    pub fn new(x: f64, y: f64, scale: f64, laplacian: LaplacianSign) -> Self {
        Self {
            x,
            y,
            scale,
            orientation: 0.0,
            response: 0.0,
            laplacian,
            descriptor: None,
        }
    }
}

impl FeaturePoint for SurfPoint {
    fn x(&self) -> f64 {
        self.x
    }

    fn y(&self) -> f64 {
        self.y
    }
}

impl ImagePoint for SurfPoint {
    fn image_point(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }
}
