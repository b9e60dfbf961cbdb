//! Reference ellipsoid constants

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// GRS80 semi-major axis in meters
pub const GRS80_A: f64 = 6378137.0;

/// GRS80 flattening, as used by the station tooling this crate serves
pub const GRS80_F: f64 = 0.00335281068118;

/// WGS84 flattening (1 / 298.257223563)
pub const WGS84_F: f64 = 1.0 / 298.257223563;

/// Reference ellipsoid used by all coordinate transforms
///
/// The eccentricity `e` and semi-minor axis `b` are derived once at
/// construction and never change afterwards. Serialized form holds only
/// `a` and `f`; deserializing rebuilds the derived constants.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "EllipsoidParams", into = "EllipsoidParams")
)]
pub struct Ellipsoid {
    a: f64,
    f: f64,
    e: f64,
    b: f64,
}

impl Ellipsoid {
    /// Create an ellipsoid from its semi-major axis (meters) and flattening
    pub fn new(a: f64, f: f64) -> Self {
        let e = (2.0 * f - f * f).sqrt();
        let b = a * (1.0 - e * e).sqrt();
        Self { a, f, e, b }
    }

    /// GRS80, the process-wide default
    pub fn grs80() -> Self {
        Self::new(GRS80_A, GRS80_F)
    }

    pub fn wgs84() -> Self {
        Self::new(GRS80_A, WGS84_F)
    }

    /// Semi-major axis in meters
    #[inline]
    pub fn a(&self) -> f64 {
        self.a
    }

    /// Flattening
    #[inline]
    pub fn f(&self) -> f64 {
        self.f
    }

    /// First eccentricity
    #[inline]
    pub fn e(&self) -> f64 {
        self.e
    }

    /// First eccentricity squared
    #[inline]
    pub fn e2(&self) -> f64 {
        self.e * self.e
    }

    /// Semi-minor axis in meters
    #[inline]
    pub fn b(&self) -> f64 {
        self.b
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Self::grs80()
    }
}

/// Defining parameters of an ellipsoid, as read from configuration
#[cfg(feature = "serde")]
#[derive(Serialize, Deserialize)]
pub struct EllipsoidParams {
    pub a: f64,
    pub f: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<EllipsoidParams> for Ellipsoid {
    type Error = String;

    fn try_from(params: EllipsoidParams) -> Result<Self, Self::Error> {
        let EllipsoidParams { a, f } = params;
        if !a.is_finite() || a <= 0.0 {
            return Err(format!("semi-major axis must be positive, got {a}"));
        }
        if !f.is_finite() || !(0.0..1.0).contains(&f) {
            return Err(format!("flattening must be in [0, 1), got {f}"));
        }
        Ok(Self::new(a, f))
    }
}

#[cfg(feature = "serde")]
impl From<Ellipsoid> for EllipsoidParams {
    fn from(ellipsoid: Ellipsoid) -> Self {
        Self {
            a: ellipsoid.a,
            f: ellipsoid.f,
        }
    }
}
