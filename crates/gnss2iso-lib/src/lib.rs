//! gnss2iso - Station Coordinates and Country Resolution
//!
//! This library converts GNSS station positions between geodetic
//! (longitude/latitude/height) and earth-centered cartesian coordinates, and
//! resolves the country or territory owning a station from a polygon dataset
//! such as the Natural Earth admin-0 map units.
//!
//! # Architecture
//!
//! - **[`Ellipsoid`]**: Immutable reference ellipsoid constants (GRS80 by default)
//! - **[`CoordinateTransform`]**: Closed-form geodetic <-> ECEF conversions
//! - **[`Station`]**: A located entity holding both coordinate representations
//! - **[`PolygonDataset`]**: Ordered polygon features with attribute tables and a CRS tag
//! - **[`CountryResolver`]**: Attribute, ISO code and country distance queries
//!
//! # Example
//!
//! ```ignore
//! let resolver = CountryResolver::new(dataset, ResolverConfig::default());
//! let paris = Station::from_geodetic(2.33, 48.8, 0.0)?;
//! let iso = resolver.get_iso(&paris, &QueryOptions::default())?;
//! assert_eq!(iso.code, "FRA");
//! ```
//!
//! # Sentinels
//!
//! Absence of a country is an expected outcome (offshore points, polar
//! stations, gaps in coverage). It is reported with [`UNKNOWN_ISO`] and
//! [`UNKNOWN_COUNTRY_DISTANCE`] rather than errors.

mod attributes;
mod crs;
mod dataset;
mod ellipsoid;
mod resolver;
mod station;
mod transform;
mod validation;

#[cfg(test)]
mod fixtures;

// Public API exports
pub use attributes::{AttributeValue, Attributes};
pub use crs::{Crs, EllipsoidReprojector, Reprojector};
pub use dataset::{BoundingBox, PolygonDataset, PolygonFeature};
pub use ellipsoid::Ellipsoid;
pub use resolver::{
    CountryResolver, IsoMatch, Locator, QueryOptions, Resolution, ResolverConfig, Strategy,
    UNKNOWN_COUNTRY_DISTANCE,
};
pub use station::{DEFAULT_STATION_NAME, Station, StationInput, UNKNOWN_ISO};
pub use transform::{CoordinateTransform, Ecef, Geodetic, normalize_longitude};
pub use validation::{Conflict, Overlap, ValidationReport};

/// Error types for the library
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Empty dataset: no feature to compare against")]
    EmptyDataset,

    #[error("Feature {feature} has no attribute '{field}'")]
    MissingAttribute { field: String, feature: usize },

    #[error("Unsupported reprojection from {from} to {to}")]
    UnsupportedReprojection { from: Crs, to: Crs },

    #[error("Geometry fault in feature {index} ({kind}): {message}")]
    GeometryFault {
        index: usize,
        kind: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, GeoError>;
