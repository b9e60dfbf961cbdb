//! Synthetic country polygons shared by the unit tests
//!
//! Coarse boxes around real territories, with Natural Earth field names.

use crate::{Attributes, Crs, PolygonDataset, PolygonFeature};
use geo::{Geometry, LineString, Polygon};

pub const FRA: usize = 0;
pub const GLP: usize = 1;
pub const BRA: usize = 2;
pub const GUF: usize = 3;
pub const ESP: usize = 4;

pub fn attributes(iso: &str, sov: &str, name: &str) -> Attributes {
    let mut attributes = Attributes::new();
    attributes.insert("ISO_A3_EH".to_string(), iso.into());
    attributes.insert("SOV_A3".to_string(), sov.into());
    attributes.insert("NAME_LONG".to_string(), name.into());
    attributes
}

pub fn polygon(coords: &[(f64, f64)]) -> Geometry<f64> {
    Geometry::Polygon(Polygon::new(LineString::from(coords.to_vec()), Vec::new()))
}

pub fn rectangle(x0: f64, y0: f64, x1: f64, y1: f64) -> Geometry<f64> {
    polygon(&[(x0, y0), (x1, y0), (x1, y1), (x0, y1)])
}

/// France, Guadeloupe, Brazil, French Guiana and Spain, in that order
pub fn world() -> PolygonDataset {
    let features = vec![
        PolygonFeature::new(
            rectangle(-5.0, 42.3, 8.2, 51.1),
            attributes("FRA", "FR1", "France"),
        ),
        PolygonFeature::new(
            rectangle(-61.9, 15.8, -61.0, 16.6),
            attributes("GLP", "FR1", "Guadeloupe"),
        ),
        PolygonFeature::new(
            polygon(&[
                (-74.0, -34.0),
                (-34.8, -34.0),
                (-34.8, -5.0),
                (-50.0, 1.5),
                (-74.0, 1.5),
            ]),
            attributes("BRA", "BRA", "Brazil"),
        ),
        PolygonFeature::new(
            rectangle(-54.6, 2.1, -51.6, 5.8),
            attributes("GUF", "FR1", "French Guiana"),
        ),
        PolygonFeature::new(
            rectangle(-9.3, 36.0, 3.3, 42.3),
            attributes("ESP", "ESP", "Spain"),
        ),
    ];
    PolygonDataset::new(features, Crs::Geographic)
}
