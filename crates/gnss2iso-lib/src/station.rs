//! Station construction from geodetic or cartesian coordinates
//!
//! A [`Station`] always carries both coordinate representations. Exactly one
//! of them is supplied by the caller through [`StationInput`]; the other is
//! derived with a [`CoordinateTransform`].

use crate::{
    AttributeValue, Attributes, CoordinateTransform, Ecef, GeoError, Result, normalize_longitude,
};
use geo::Point;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// ISO code carried by stations that have not been resolved to a country
pub const UNKNOWN_ISO: &str = "000";

/// Name given to stations built without one
pub const DEFAULT_STATION_NAME: &str = "station1";

/// Recognised station fields
///
/// Cartesian coordinates take precedence when `x`, `y` and `z` are all set.
/// Anything else about the station goes into `metadata`.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StationInput {
    /// Longitude in degrees, either (-180, 180] or [0, 360)
    pub lon: Option<f64>,
    /// Latitude in degrees
    pub lat: Option<f64>,
    /// Ellipsoidal height in meters (defaults to 0)
    pub h: Option<f64>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
    pub name: Option<String>,
    pub iso: Option<String>,
    pub metadata: Attributes,
}

impl StationInput {
    /// Input from geodetic coordinates at zero height
    pub fn geodetic(lon: f64, lat: f64) -> Self {
        Self {
            lon: Some(lon),
            lat: Some(lat),
            ..Default::default()
        }
    }

    /// Input from ECEF coordinates in meters
    pub fn cartesian(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            z: Some(z),
            ..Default::default()
        }
    }

    pub fn with_height(mut self, h: f64) -> Self {
        self.h = Some(h);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_iso(mut self, iso: impl Into<String>) -> Self {
        self.iso = Some(iso.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    fn cartesian_triple(&self) -> Option<(f64, f64, f64)> {
        Some((self.x?, self.y?, self.z?))
    }

    fn geodetic_pair(&self) -> Option<(f64, f64)> {
        Some((self.lon?, self.lat?))
    }
}

/// A located entity with consistent geodetic and cartesian coordinates
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Station {
    name: String,
    /// Longitude in (-180, 180]
    lon: f64,
    /// Longitude in [0, 360)
    lon360: f64,
    lat: f64,
    h: f64,
    xyz: Ecef,
    iso: String,
    metadata: Attributes,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl Station {
    /// Build a station from its input fields
    ///
    /// Fails with [`GeoError::InvalidInput`] when neither the cartesian triple
    /// nor the longitude/latitude pair is complete, when the longitude is in
    /// neither the (-180, 180] nor the [0, 360) convention, or when the
    /// coordinates do not describe a position on or near the ellipsoid.
    pub fn new(input: StationInput, transform: &CoordinateTransform) -> Result<Self> {
        let (lon, lat, h, xyz) = if let Some((x, y, z)) = input.cartesian_triple() {
            ensure_finite(&[x, y, z], "cartesian coordinates")?;
            let geodetic = transform.ecef_to_geodetic(x, y, z);
            (geodetic.lon, geodetic.lat, geodetic.h, Ecef { x, y, z })
        } else if let Some((lon, lat)) = input.geodetic_pair() {
            let h = input.h.unwrap_or(0.0);
            ensure_finite(&[lon, lat, h], "geodetic coordinates")?;
            if !(-90.0..=90.0).contains(&lat) {
                return Err(GeoError::InvalidInput(format!(
                    "latitude {lat} outside [-90, 90]"
                )));
            }
            if !(-180.0..360.0).contains(&lon) {
                return Err(GeoError::InvalidInput(format!(
                    "longitude {lon} outside [-180, 360)"
                )));
            }
            (lon, lat, h, transform.geodetic_to_ecef(lon, lat, h))
        } else {
            return Err(GeoError::InvalidInput(format!(
                "'x' 'y' 'z' or 'lon' 'lat' must be specified, got {input:?}"
            )));
        };

        // The earth center has no geodetic position
        ensure_finite(&[lon, lat, h], "derived coordinates")?;

        let (lon180, lon360) = normalize_longitude(lon);

        Ok(Self {
            name: input
                .name
                .unwrap_or_else(|| DEFAULT_STATION_NAME.to_string()),
            lon: lon180,
            lon360,
            lat,
            h,
            xyz,
            iso: input.iso.unwrap_or_else(|| UNKNOWN_ISO.to_string()),
            metadata: input.metadata,
        })
    }

    /// Station from geodetic coordinates on the default ellipsoid
    pub fn from_geodetic(lon: f64, lat: f64, h: f64) -> Result<Self> {
        Self::new(
            StationInput::geodetic(lon, lat).with_height(h),
            &CoordinateTransform::default(),
        )
    }

    /// Station from ECEF coordinates on the default ellipsoid
    pub fn from_ecef(x: f64, y: f64, z: f64) -> Result<Self> {
        Self::new(
            StationInput::cartesian(x, y, z),
            &CoordinateTransform::default(),
        )
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Longitude in degrees within (-180, 180]
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Longitude in degrees within [0, 360)
    #[inline]
    pub fn lon360(&self) -> f64 {
        self.lon360
    }

    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Ellipsoidal height in meters
    #[inline]
    pub fn h(&self) -> f64 {
        self.h
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.xyz.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.xyz.y
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.xyz.z
    }

    /// Country code, [`UNKNOWN_ISO`] until resolved
    #[inline]
    pub fn iso(&self) -> &str {
        &self.iso
    }

    pub fn set_iso(&mut self, iso: impl Into<String>) {
        self.iso = iso.into();
    }

    #[inline]
    pub fn metadata(&self) -> &Attributes {
        &self.metadata
    }

    /// 2-D point at (lon, lat)
    #[inline]
    pub fn point(&self) -> Point<f64> {
        Point::new(self.lon, self.lat)
    }

    /// Cartesian position
    #[inline]
    pub fn point_xyz(&self) -> Ecef {
        self.xyz
    }
}

fn ensure_finite(values: &[f64], what: &str) -> Result<()> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(GeoError::InvalidInput(format!(
            "{what} must be finite, got {values:?}"
        )))
    }
}
