//! One-time geometry audit of a polygon dataset
//!
//! Country polygons are expected to tile the plane without overlapping: a
//! point may sit on a shared border but never inside two countries. The
//! audit repairs self-intersecting geometries, then compares every pair of
//! features and reports those sharing a non-zero area.
//!
//! The pairwise scan is O(n²) in the number of features (pruned by bounding
//! boxes) and is meant to run once when a new dataset is adopted.

use crate::{GeoError, PolygonDataset, PolygonFeature};
use geo::{
    Area, BooleanOps, BoundingRect, CoordsIter, Geometry, Intersects, MultiPolygon, Rect,
    Validation,
};
use rayon::prelude::*;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// How two polygonal geometries relate
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Overlap {
    Disjoint,
    /// Shared border lines or corner points only
    Boundary,
    /// Shared area, in squared CRS units
    Area(f64),
}

impl Overlap {
    pub fn between(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> Self {
        if !a.intersects(b) {
            return Overlap::Disjoint;
        }
        let area = a.intersection(b).unsigned_area();
        if area > 0.0 {
            Overlap::Area(area)
        } else {
            Overlap::Boundary
        }
    }
}

/// Two features sharing an area
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Conflict {
    pub first: usize,
    pub second: usize,
    pub area: f64,
}

/// Outcome of [`PolygonDataset::validate`]
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// Features whose geometry was replaced by its repaired version
    pub repaired: Vec<usize>,
    /// Non-polygonal, empty or unrepairable features left out of the scan
    pub skipped: Vec<usize>,
    /// Features whose processing failed, with the cause
    pub faults: Vec<GeoError>,
    /// Overlapping feature pairs, ordered by first then second index
    pub conflicts: Vec<Conflict>,
}

impl ValidationReport {
    /// No two features share an area
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// A feature taking part in the pairwise scan
struct Candidate {
    index: usize,
    polygons: MultiPolygon<f64>,
    bounds: Rect<f64>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl PolygonDataset {
    /// Repair invalid geometries in place, then look for overlapping features
    ///
    /// `name_field` is only used to label log messages. Faults raised while
    /// processing a feature are recorded in the report and never abort the
    /// scan.
    pub fn validate(&mut self, name_field: &str) -> ValidationReport {
        tracing::info!("Checking the validity of {} geometries ...", self.len());

        let mut report = ValidationReport::default();
        let mut candidates = Vec::with_capacity(self.len());

        for (index, feature) in self.features_mut().iter_mut().enumerate() {
            match prepare(index, feature, name_field, &mut report) {
                Ok(Some(candidate)) => candidates.push(candidate),
                Ok(None) => report.skipped.push(index),
                Err(fault) => {
                    tracing::warn!("{fault}");
                    report.faults.push(fault);
                }
            }
        }
        if !report.repaired.is_empty() {
            self.refresh_bounding_box();
        }

        let scans: Vec<std::result::Result<Vec<Conflict>, GeoError>> = (0..candidates.len())
            .into_par_iter()
            .map(|position| {
                let current = &candidates[position];
                catch_unwind(AssertUnwindSafe(|| {
                    overlaps_with_later(current, &candidates[position + 1..])
                }))
                .map_err(|panic| GeoError::GeometryFault {
                    index: current.index,
                    kind: "MultiPolygon",
                    message: panic_message(panic),
                })
            })
            .collect();

        for scan in scans {
            match scan {
                Ok(conflicts) => {
                    for conflict in conflicts {
                        tracing::warn!(
                            "Intersection btw {} & {}: area {}",
                            self.label(conflict.first, name_field),
                            self.label(conflict.second, name_field),
                            conflict.area
                        );
                        report.conflicts.push(conflict);
                    }
                }
                Err(fault) => {
                    tracing::warn!("{fault}");
                    report.faults.push(fault);
                }
            }
        }

        if report.is_valid() {
            tracing::info!(" --> valid dataset: no polygon intersection");
        } else {
            tracing::info!(
                " --> invalid dataset: {} overlapping pairs",
                report.conflicts.len()
            );
        }

        report
    }

    fn label(&self, index: usize, name_field: &str) -> String {
        let name = self
            .feature(index)
            .and_then(|feature| feature.attribute(name_field))
            .map(|value| value.to_string())
            .unwrap_or_default();
        format!("({index}, '{name}')")
    }
}

/// Turn a feature into a scan candidate, repairing it first if needed
fn prepare(
    index: usize,
    feature: &mut PolygonFeature,
    name_field: &str,
    report: &mut ValidationReport,
) -> Result<Option<Candidate>, GeoError> {
    let kind = geometry_kind(feature.geometry());
    let name = feature
        .attribute(name_field)
        .map(|value| value.to_string())
        .unwrap_or_default();

    if !feature
        .geometry()
        .coords_iter()
        .all(|c| c.x.is_finite() && c.y.is_finite())
    {
        return Err(GeoError::GeometryFault {
            index,
            kind,
            message: "non-finite coordinate".to_string(),
        });
    }

    let Some(mut polygons) = polygonal(feature.geometry()) else {
        tracing::warn!("'({index}, {name})' geometry: {kind}, skipped");
        return Ok(None);
    };
    if polygons.0.is_empty() {
        tracing::warn!("'({index}, {name})' geometry: empty {kind}, skipped");
        return Ok(None);
    }

    if !polygons.is_valid() {
        polygons = catch_unwind(AssertUnwindSafe(|| repair(&polygons))).map_err(|panic| {
            GeoError::GeometryFault {
                index,
                kind,
                message: panic_message(panic),
            }
        })?;
        feature.set_geometry(Geometry::MultiPolygon(polygons.clone()));
        report.repaired.push(index);
        tracing::debug!("'({index}, {name})' {kind} repaired");

        if polygons.0.is_empty() || !polygons.is_valid() {
            tracing::warn!("'({index}, {name})' geometry still invalid after repair, skipped");
            return Ok(None);
        }
    }

    Ok(polygons.bounding_rect().map(|bounds| Candidate {
        index,
        polygons,
        bounds,
    }))
}

fn overlaps_with_later(current: &Candidate, later: &[Candidate]) -> Vec<Conflict> {
    later
        .iter()
        .filter(|other| current.bounds.intersects(&other.bounds))
        .filter_map(|other| match Overlap::between(&current.polygons, &other.polygons) {
            Overlap::Area(area) => Some(Conflict {
                first: current.index,
                second: other.index,
                area,
            }),
            Overlap::Disjoint | Overlap::Boundary => None,
        })
        .collect()
}

/// Zero-width overlay: rebuilds the rings so they no longer cross themselves
fn repair(polygons: &MultiPolygon<f64>) -> MultiPolygon<f64> {
    polygons.union(&MultiPolygon::new(Vec::new()))
}

fn polygonal(geometry: &Geometry<f64>) -> Option<MultiPolygon<f64>> {
    match geometry {
        Geometry::Polygon(polygon) => Some(MultiPolygon::new(vec![polygon.clone()])),
        Geometry::MultiPolygon(polygons) => Some(polygons.clone()),
        Geometry::Rect(rect) => Some(MultiPolygon::new(vec![rect.to_polygon()])),
        Geometry::Triangle(triangle) => Some(MultiPolygon::new(vec![triangle.to_polygon()])),
        _ => None,
    }
}

fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "geometry kernel panicked".to_string()
    }
}
