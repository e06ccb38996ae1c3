use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cv_core::nalgebra::Point2;
use cv_core::ImagePoint;
use std::fmt::Write as _;

/// The minimal capability set shared by feature-point holders: coordinate
/// access and explicit conversions to the common point representations.
///
/// The library-neutral projection comes from the [`ImagePoint`] supertrait.
pub trait FeaturePoint: ImagePoint {
    /// The horizontal coordinate, +x facing right from the left edge.
    fn x(&self) -> f64;

    /// The vertical coordinate, +y facing down from the top edge.
    fn y(&self) -> f64;

    /// The integer pixel containing the point, truncating toward zero.
    fn to_pixel(&self) -> (i32, i32) {
        (self.x() as i32, self.y() as i32)
    }

    /// The point as single-precision coordinates.
    fn to_point(&self) -> (f32, f32) {
        (self.x() as f32, self.y() as f32)
    }
}

/// A point of interest in an image with an optional binary descriptor.
///
/// The extractor creates one of these per corner candidate, with the scale
/// and orientation left at their defaults and no descriptor. A descriptor
/// pass fills `descriptor` in place; consumers should treat it as write-once.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SiftKeypoint {
    /// The horizontal coordinate in pixel units.
    pub x: f32,
    /// The vertical coordinate in pixel units.
    pub y: f32,
    /// The characteristic scale at which the point was detected.
    pub scale: f32,
    /// The dominant gradient orientation in radians.
    pub orientation: f32,
    /// The binary descriptor, absent until a descriptor pass computes it.
    pub descriptor: Option<Vec<u8>>,
}

impl SiftKeypoint {
    /// The characteristic scale assigned to fresh corner candidates.
    pub const DEFAULT_SCALE: f32 = 6.0;

    /// Create a keypoint at the given coordinates with default scale, zero
    /// orientation and no descriptor.
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            scale: Self::DEFAULT_SCALE,
            orientation: 0.0,
            descriptor: None,
        }
    }

    /// Create a keypoint with explicit scale and orientation.
    pub fn with_scale(x: f32, y: f32, scale: f32, orientation: f32) -> Self {
        Self {
            x,
            y,
            scale,
            orientation,
            descriptor: None,
        }
    }

    /// Render the descriptor as lowercase hexadecimal, two characters per
    /// byte. Returns the empty string when no descriptor has been computed.
    pub fn descriptor_hex(&self) -> String {
        let mut out = String::with_capacity(2 * self.descriptor_len());
        for byte in self.descriptor.iter().flatten() {
            let _ = write!(out, "{:02x}", byte);
        }
        out
    }

    /// Render the descriptor as a bit string, eight `'1'`/`'0'` characters
    /// per byte with the least significant bit first. Returns the empty
    /// string when no descriptor has been computed.
    pub fn descriptor_binary(&self) -> String {
        let mut out = String::with_capacity(8 * self.descriptor_len());
        for byte in self.descriptor.iter().flatten() {
            for bit in 0..8 {
                out.push(if byte & (1 << bit) != 0 { '1' } else { '0' });
            }
        }
        out
    }

    /// Render the descriptor as standard base64. Returns the empty string
    /// when no descriptor has been computed.
    pub fn descriptor_base64(&self) -> String {
        STANDARD.encode(self.descriptor.as_deref().unwrap_or_default())
    }

    fn descriptor_len(&self) -> usize {
        self.descriptor.as_ref().map_or(0, Vec::len)
    }
}

impl FeaturePoint for SiftKeypoint {
    fn x(&self) -> f64 {
        f64::from(self.x)
    }

    fn y(&self) -> f64 {
        f64::from(self.y)
    }
}

impl ImagePoint for SiftKeypoint {
    fn image_point(&self) -> Point2<f64> {
        Point2::new(f64::from(self.x), f64::from(self.y))
    }
}
