//! Coordinate reference systems and dataset reprojection

use crate::{CoordinateTransform, GeoError, PolygonDataset, Result};
use geo::{Coord, MapCoords};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The two coordinate reference systems the resolver works with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Crs {
    /// Longitude/latitude in degrees (EPSG:4326)
    #[default]
    Geographic,
    /// Earth-centered cartesian in meters (EPSG:4978)
    Geocentric,
}

impl Crs {
    pub fn epsg(&self) -> u32 {
        match self {
            Crs::Geographic => 4326,
            Crs::Geocentric => 4978,
        }
    }

    /// Parse an EPSG code, returning `None` for unsupported systems
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 => Some(Crs::Geographic),
            4978 => Some(Crs::Geocentric),
            _ => None,
        }
    }

    /// Linear unit of coordinates (and of distances computed in this CRS)
    pub fn unit(&self) -> &'static str {
        match self {
            Crs::Geographic => "degree",
            Crs::Geocentric => "meter",
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Converts a dataset into another coordinate reference system
///
/// Implementations return a new dataset and leave the input untouched.
pub trait Reprojector: Send + Sync {
    fn reproject(&self, dataset: &PolygonDataset, target: Crs) -> Result<PolygonDataset>;
}

/// Reprojection through the closed-form ellipsoidal transform
///
/// Geographic vertices are lifted onto the ellipsoid surface (zero height)
/// and their `x`/`y` components kept, so planar distances are measured in
/// the equatorial plane of the geocentric frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct EllipsoidReprojector {
    transform: CoordinateTransform,
}

impl EllipsoidReprojector {
    pub fn new(transform: CoordinateTransform) -> Self {
        Self { transform }
    }
}

impl Reprojector for EllipsoidReprojector {
    fn reproject(&self, dataset: &PolygonDataset, target: Crs) -> Result<PolygonDataset> {
        match (dataset.crs(), target) {
            (from, to) if from == to => Ok(dataset.clone()),
            (Crs::Geographic, Crs::Geocentric) => {
                tracing::debug!(
                    "Reprojecting {} features to {}",
                    dataset.len(),
                    target
                );
                let transform = self.transform;
                Ok(dataset.map_geometries(target, |geometry| {
                    geometry.map_coords(|c| {
                        let ecef = transform.geodetic_to_ecef(c.x, c.y, 0.0);
                        Coord {
                            x: ecef.x,
                            y: ecef.y,
                        }
                    })
                }))
            }
            (from, to) => Err(GeoError::UnsupportedReprojection { from, to }),
        }
    }
}
