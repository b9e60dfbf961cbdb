//! Polygon dataset storage
//!
//! A [`PolygonDataset`] is delivered fully built by an external loader. Each
//! feature caches its bounding rectangle so queries can discard most
//! features before any exact geometric predicate runs.

use crate::{AttributeValue, Attributes, Crs};
use geo::{BoundingRect, Coord, Geometry, Intersects, Point, Rect};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Axis-aligned extent of a dataset, in the dataset CRS units
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoundingBox {
    pub lon_min: f64,
    pub lon_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    pub fn from_rect(rect: Rect<f64>) -> Self {
        Self {
            lon_min: rect.min().x,
            lon_max: rect.max().x,
            lat_min: rect.min().y,
            lat_max: rect.max().y,
        }
    }

    pub fn to_rect(&self) -> Rect<f64> {
        Rect::new(
            Coord {
                x: self.lon_min,
                y: self.lat_min,
            },
            Coord {
                x: self.lon_max,
                y: self.lat_max,
            },
        )
    }

    /// Strict containment: points on the edge are outside
    pub fn contains(&self, point: &Point<f64>) -> bool {
        point.x() > self.lon_min
            && point.x() < self.lon_max
            && point.y() > self.lat_min
            && point.y() < self.lat_max
    }

    /// Whether any part of `rect` lies within the box (edges included)
    pub fn intersects(&self, rect: &Rect<f64>) -> bool {
        self.to_rect().intersects(rect)
    }

    fn union(&self, rect: &Rect<f64>) -> Self {
        Self {
            lon_min: self.lon_min.min(rect.min().x),
            lon_max: self.lon_max.max(rect.max().x),
            lat_min: self.lat_min.min(rect.min().y),
            lat_max: self.lat_max.max(rect.max().y),
        }
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bbox: lon({},{}), lat:({},{})",
            self.lon_min, self.lon_max, self.lat_min, self.lat_max
        )
    }
}

/// A named polygon feature: geometry plus its attribute table
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonFeature {
    geometry: Geometry<f64>,
    attributes: Attributes,
    /// Cached bounding rectangle (None for empty geometries)
    bounds: Option<Rect<f64>>,
}

impl PolygonFeature {
    pub fn new(geometry: Geometry<f64>, attributes: Attributes) -> Self {
        let bounds = geometry.bounding_rect();
        Self {
            geometry,
            attributes,
            bounds,
        }
    }

    #[inline]
    pub fn geometry(&self) -> &Geometry<f64> {
        &self.geometry
    }

    #[inline]
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    #[inline]
    pub fn attribute(&self, field: &str) -> Option<&AttributeValue> {
        self.attributes.get(field)
    }

    #[inline]
    pub fn bounds(&self) -> Option<Rect<f64>> {
        self.bounds
    }

    /// Replace the geometry in place, refreshing the cached bounds
    pub(crate) fn set_geometry(&mut self, geometry: Geometry<f64>) {
        self.bounds = geometry.bounding_rect();
        self.geometry = geometry;
    }
}

/// Ordered polygon features with a bounding box and a CRS tag
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolygonDataset {
    features: Vec<PolygonFeature>,
    bounding_box: Option<BoundingBox>,
    crs: Crs,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PolygonDataset {
    pub fn new(features: Vec<PolygonFeature>, crs: Crs) -> Self {
        let bounding_box = Self::compute_bounding_box(&features);
        Self {
            features,
            bounding_box,
            crs,
        }
    }

    fn compute_bounding_box(features: &[PolygonFeature]) -> Option<BoundingBox> {
        features
            .iter()
            .filter_map(PolygonFeature::bounds)
            .fold(None, |acc: Option<BoundingBox>, rect| match acc {
                Some(bbox) => Some(bbox.union(&rect)),
                None => Some(BoundingBox::from_rect(rect)),
            })
    }

    #[inline]
    pub fn features(&self) -> &[PolygonFeature] {
        &self.features
    }

    #[inline]
    pub fn feature(&self, index: usize) -> Option<&PolygonFeature> {
        self.features.get(index)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Overall extent, `None` when no feature has a geometry
    #[inline]
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.bounding_box
    }

    #[inline]
    pub fn crs(&self) -> Crs {
        self.crs
    }

    /// Field names present in at least one feature
    pub fn fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .features
            .iter()
            .flat_map(|feature| feature.attributes.keys().map(String::as_str))
            .collect();
        fields.sort_unstable();
        fields.dedup();
        fields
    }

    /// Indices of the features whose text value in any of `fields` equals `value`
    pub fn indices_matching(&self, fields: &[&str], value: &str) -> Vec<usize> {
        self.features
            .iter()
            .enumerate()
            .filter(|(_, feature)| {
                fields.iter().any(|field| {
                    feature
                        .attribute(field)
                        .and_then(AttributeValue::as_str)
                        .is_some_and(|v| v == value)
                })
            })
            .map(|(index, _)| index)
            .collect()
    }

    /// New dataset holding clones of the features at `indices`, in that order
    pub fn select(&self, indices: &[usize]) -> Self {
        let features = indices
            .iter()
            .filter_map(|&index| self.features.get(index).cloned())
            .collect();
        Self::new(features, self.crs)
    }

    /// New dataset with every geometry passed through `f`, tagged with `crs`
    pub fn map_geometries(
        &self,
        crs: Crs,
        f: impl Fn(&Geometry<f64>) -> Geometry<f64>,
    ) -> Self {
        let features = self
            .features
            .iter()
            .map(|feature| PolygonFeature::new(f(&feature.geometry), feature.attributes.clone()))
            .collect();
        Self::new(features, crs)
    }

    pub(crate) fn features_mut(&mut self) -> &mut [PolygonFeature] {
        &mut self.features
    }

    /// Recompute the overall bounding box after in-place geometry edits
    pub(crate) fn refresh_bounding_box(&mut self) {
        self.bounding_box = Self::compute_bounding_box(&self.features);
    }
}
