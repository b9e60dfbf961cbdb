//! Geodetic <-> earth-centered cartesian conversions
//!
//! Both directions are single closed-form passes. The inverse conversion is a
//! non-iterative approximation: its accuracy degrades for large heights and
//! near the poles, and it is kept exactly as is because stored station
//! coordinates were produced with it.
//!
//! The half-angle longitude `2·atan2(y, x + p)` is undefined on the negative
//! x half-axis (`y == 0`, `x < 0`) and yields 0 there instead of 180. Points
//! off that half-line, even by a fraction of a millimeter, come out right.

use crate::Ellipsoid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Geodetic coordinates: degrees and ellipsoidal height in meters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geodetic {
    pub lon: f64,
    pub lat: f64,
    pub h: f64,
}

/// Earth-centered, earth-fixed cartesian coordinates in meters
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Ecef {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Ecef {
    /// Projection onto the equatorial (x, y) plane
    #[inline]
    pub fn planar(&self) -> geo::Point<f64> {
        geo::Point::new(self.x, self.y)
    }
}

/// Coordinate conversions bound to a reference ellipsoid
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordinateTransform {
    ellipsoid: Ellipsoid,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl CoordinateTransform {
    pub fn new(ellipsoid: Ellipsoid) -> Self {
        Self { ellipsoid }
    }

    #[inline]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Convert geodetic coordinates (degrees, meters) to ECEF (meters)
    pub fn geodetic_to_ecef(&self, lon: f64, lat: f64, h: f64) -> Ecef {
        let a = self.ellipsoid.a();
        let e = self.ellipsoid.e();
        let (lon, lat) = (lon.to_radians(), lat.to_radians());

        let n = a / (1.0 - (e * lat.sin()).powi(2)).sqrt();

        Ecef {
            x: (n + h) * lat.cos() * lon.cos(),
            y: (n + h) * lat.cos() * lon.sin(),
            z: (n * (1.0 - e * e) + h) * lat.sin(),
        }
    }

    /// Convert ECEF coordinates (meters) to geodetic (degrees, meters)
    ///
    /// Returned longitude lies in (-180, 180), see the module docs for the
    /// antimeridian half-axis.
    pub fn ecef_to_geodetic(&self, x: f64, y: f64, z: f64) -> Geodetic {
        let a = self.ellipsoid.a();
        let f = self.ellipsoid.f();
        let e2 = self.ellipsoid.e2();

        let p = (x * x + y * y).sqrt();
        let r = (x * x + y * y + z * z).sqrt();
        let u = (z / p * (1.0 - f + e2 * a / r)).atan2(1.0);

        let lon = 2.0 * y.atan2(x + p);
        let lat = (z * (1.0 - f) + e2 * a * u.sin().powi(3))
            .atan2((1.0 - f) * (p - e2 * a * u.cos().powi(3)));
        let h = p * lat.cos() + z * lat.sin() - a * (1.0 - e2 * lat.sin().powi(2)).sqrt();

        Geodetic {
            lon: lon.to_degrees(),
            lat: lat.to_degrees(),
            h,
        }
    }
}

/// Normalize a longitude into both conventions
///
/// Returns `(lon180, lon360)` where `lon180` is the input shifted down by a
/// full turn when above 180, and `lon360` the input shifted up when negative.
#[inline]
pub fn normalize_longitude(lon: f64) -> (f64, f64) {
    let lon180 = if lon > 180.0 { lon - 360.0 } else { lon };
    let lon360 = if lon < 0.0 { lon + 360.0 } else { lon };
    (lon180, lon360)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_equator_prime_meridian() {
        let transform = CoordinateTransform::default();
        let ecef = transform.geodetic_to_ecef(0.0, 0.0, 0.0);
        assert_abs_diff_eq!(ecef.x, 6378137.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.y, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_north_pole_on_semi_minor_axis() {
        let transform = CoordinateTransform::default();
        let ecef = transform.geodetic_to_ecef(0.0, 90.0, 0.0);
        assert_abs_diff_eq!(ecef.x, 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ecef.z, transform.ellipsoid().b(), epsilon = 1e-3);
    }

    #[test]
    fn test_known_station_braz() {
        // BRAZ (Brasilia) published cartesian coordinates
        let transform = CoordinateTransform::default();
        let geo = transform.ecef_to_geodetic(4115014.0800, -4550641.5499, -1741444.0356);
        assert_abs_diff_eq!(geo.lon, -47.877869, epsilon = 1e-6);
        assert_abs_diff_eq!(geo.lat, -15.947475, epsilon = 1e-6);
        assert_abs_diff_eq!(geo.h, 1106.0224, epsilon = 1e-3);
    }

    #[test]
    fn test_roundtrip() {
        let transform = CoordinateTransform::default();
        let samples = [
            (2.33, 48.8, 0.0),
            (-61.5275, 16.2623, 35.0),
            (-47.878, -15.947, 1106.022),
            (179.9, -45.0, 12.5),
            (-179.9, 70.0, 3000.0),
            (135.0, -85.0, 2800.0),
            (0.0, 0.0, -50.0),
        ];

        for (lon, lat, h) in samples {
            let ecef = transform.geodetic_to_ecef(lon, lat, h);
            let geo = transform.ecef_to_geodetic(ecef.x, ecef.y, ecef.z);
            assert_abs_diff_eq!(geo.lon, lon, epsilon = 1e-6);
            assert_abs_diff_eq!(geo.lat, lat, epsilon = 1e-6);
            assert_abs_diff_eq!(geo.h, h, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_ecef_longitude_range() {
        let transform = CoordinateTransform::default();
        // Western hemisphere comes back negative, antimeridian as +180
        let west = transform.ecef_to_geodetic(0.0, -6378137.0, 0.0);
        assert_abs_diff_eq!(west.lon, -90.0, epsilon = 1e-9);

        let ecef = transform.geodetic_to_ecef(180.0, 0.0, 0.0);
        let anti = transform.ecef_to_geodetic(ecef.x, ecef.y, ecef.z);
        assert_abs_diff_eq!(anti.lon, 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_x_half_axis_degenerates() {
        let transform = CoordinateTransform::default();
        let a = transform.ellipsoid().a();

        let on_axis = transform.ecef_to_geodetic(-a, 0.0, 0.0);
        assert_eq!(on_axis.lon, 0.0);

        let beside = transform.ecef_to_geodetic(-a, 1e-3, 0.0);
        assert_abs_diff_eq!(beside.lon, 180.0, epsilon = 1e-6);
    }

    #[test]
    fn test_normalize_longitude() {
        assert_eq!(normalize_longitude(312.1221), (312.1221 - 360.0, 312.1221));
        assert_eq!(normalize_longitude(-47.8779), (-47.8779, -47.8779 + 360.0));
        assert_eq!(normalize_longitude(180.0), (180.0, 180.0));
        assert_eq!(normalize_longitude(0.0), (0.0, 0.0));
    }

    #[test]
    fn test_normalize_longitude_relationship() {
        let mut lon = -179.5;
        while lon < 360.0 {
            let (lon180, lon360) = normalize_longitude(lon);
            assert!(lon180 > -180.0 && lon180 <= 180.0);
            assert!((0.0..360.0).contains(&lon360));
            if lon180 < 0.0 {
                assert_abs_diff_eq!(lon360, lon180 + 360.0, epsilon = 1e-9);
            } else {
                assert_abs_diff_eq!(lon360, lon180, epsilon = 1e-9);
            }
            lon += 7.25;
        }
    }

    #[test]
    fn test_ecef_planar_projection() {
        let ecef = Ecef {
            x: 3.0,
            y: 4.0,
            z: 12.0,
        };
        assert_eq!(ecef.planar(), geo::Point::new(3.0, 4.0));
    }
}
