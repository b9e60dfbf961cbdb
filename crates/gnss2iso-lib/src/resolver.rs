//! CountryResolver - attribute, ISO code and country distance queries
//!
//! The resolver owns a [`PolygonDataset`] and answers point queries against
//! it with one of two strategies:
//!
//! - [`Strategy::Nearest`]: the feature at minimum distance from the probe.
//!   A match always exists unless the dataset has no geometry.
//! - [`Strategy::Inclusion`]: features intersecting the probe. May find
//!   nothing, in which case lookups fall back to sentinel values.
//!
//! The probe is the query point, or a disk around it when a buffer is given.
//! Distances in both strategies are measured in the dataset CRS units.

use crate::{
    Attributes, CoordinateTransform, Crs, Ellipsoid, EllipsoidReprojector, GeoError,
    PolygonDataset, PolygonFeature, Reprojector, Result, Station, StationInput, UNKNOWN_ISO,
    validation::ValidationReport,
};
use geo::{
    BoundingRect, Coord, Distance, Euclidean, Geometry, Intersects, LineString, Point, Polygon,
    Rect,
};
use rayon::prelude::*;
use std::borrow::Cow;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Distance reported for country codes absent from the dataset
pub const UNKNOWN_COUNTRY_DISTANCE: f64 = -1.0;

/// How a probe is matched against the dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strategy {
    /// Minimum distance, always yields a feature
    #[default]
    Nearest,
    /// Geometric intersection, may yield nothing
    Inclusion,
}

/// Per-query options
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QueryOptions {
    /// Radius of the disk replacing the query point, in dataset CRS units.
    /// 0 queries the bare point.
    pub buffer: f64,
    pub strategy: Strategy,
    /// Attach the probe-to-feature distance to the result
    pub include_distance: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            buffer: 0.0,
            strategy: Strategy::Nearest,
            include_distance: false,
        }
    }
}

impl QueryOptions {
    pub fn nearest() -> Self {
        Self::default()
    }

    pub fn inclusion() -> Self {
        Self {
            strategy: Strategy::Inclusion,
            ..Self::default()
        }
    }

    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = buffer;
        self
    }

    pub fn with_distance(mut self) -> Self {
        self.include_distance = true;
        self
    }
}

/// Resolver configuration
///
/// Field names default to the Natural Earth admin-0 map units schema.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ResolverConfig {
    /// Field holding the unit-level ISO 3166-1 alpha-3 code
    pub unit_code_field: String,
    /// Field holding the sovereignty-level code
    pub sovereignty_code_field: String,
    /// Field holding the long country name
    pub name_field: String,
    /// Codes that never designate a country
    pub reserved_codes: Vec<String>,
    /// CRS in which country distances are measured
    pub metric_crs: Crs,
    pub ellipsoid: Ellipsoid,
    /// Vertices per quarter circle when buffering a point
    pub buffer_segments: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            unit_code_field: "ISO_A3_EH".to_string(),
            sovereignty_code_field: "SOV_A3".to_string(),
            name_field: "NAME_LONG".to_string(),
            reserved_codes: vec!["ZZZ".to_string()],
            metric_crs: Crs::Geocentric,
            ellipsoid: Ellipsoid::default(),
            buffer_segments: 16,
        }
    }
}

/// Where a query is located
#[derive(Debug, Clone, Copy)]
pub enum Locator<'a> {
    /// Longitude/latitude in degrees, normalized like a station
    Coordinates { lon: f64, lat: f64 },
    Station(&'a Station),
    /// A point already expressed in the dataset CRS
    Point(Point<f64>),
}

impl<'a> From<&'a Station> for Locator<'a> {
    fn from(station: &'a Station) -> Self {
        Locator::Station(station)
    }
}

impl From<Point<f64>> for Locator<'_> {
    fn from(point: Point<f64>) -> Self {
        Locator::Point(point)
    }
}

impl From<(f64, f64)> for Locator<'_> {
    fn from((lon, lat): (f64, f64)) -> Self {
        Locator::Coordinates { lon, lat }
    }
}

/// A matched feature with the requested attributes
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Resolution {
    /// Index of the chosen feature in the dataset
    pub feature: usize,
    /// Requested fields of the chosen feature
    pub attributes: Attributes,
    /// Probe-to-feature distance, when requested
    pub distance: Option<f64>,
    /// Other features the probe intersects (inclusion strategy only)
    pub alternates: Vec<usize>,
}

impl Resolution {
    #[inline]
    pub fn is_ambiguous(&self) -> bool {
        !self.alternates.is_empty()
    }
}

/// Result of an ISO code lookup
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct IsoMatch {
    /// Country code, [`UNKNOWN_ISO`] when nothing matched
    pub code: String,
    pub distance: Option<f64>,
}

impl IsoMatch {
    fn unknown() -> Self {
        Self {
            code: UNKNOWN_ISO.to_string(),
            distance: None,
        }
    }

    #[inline]
    pub fn is_known(&self) -> bool {
        self.code != UNKNOWN_ISO
    }
}

impl fmt::Display for IsoMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.distance {
            Some(distance) => write!(f, "{} ({})", self.code, distance),
            None => write!(f, "{}", self.code),
        }
    }
}

/// Query region built from a locator
struct Probe {
    point: Point<f64>,
    region: Geometry<f64>,
    bounds: Rect<f64>,
}

/// Feature selected by a strategy
struct Selection {
    index: usize,
    distance: Option<f64>,
    alternates: Vec<usize>,
}

/// Country lookup engine over an owned polygon dataset
pub struct CountryResolver {
    dataset: PolygonDataset,
    config: ResolverConfig,
    transform: CoordinateTransform,
    reprojector: Box<dyn Reprojector>,
}

#[cfg_attr(feature = "profiling", profiling::all_functions)]
impl CountryResolver {
    pub fn new(dataset: PolygonDataset, config: ResolverConfig) -> Self {
        let transform = CoordinateTransform::new(config.ellipsoid);
        tracing::debug!(
            "Country resolver over {} features ({}), {}",
            dataset.len(),
            dataset.crs(),
            dataset
                .bounding_box()
                .map(|bbox| bbox.to_string())
                .unwrap_or_else(|| "no extent".to_string())
        );
        Self {
            dataset,
            config,
            transform,
            reprojector: Box::new(EllipsoidReprojector::new(transform)),
        }
    }

    /// Replace the reprojection backend used for country distances
    pub fn with_reprojector(mut self, reprojector: Box<dyn Reprojector>) -> Self {
        self.reprojector = reprojector;
        self
    }

    #[inline]
    pub fn dataset(&self) -> &PolygonDataset {
        &self.dataset
    }

    #[inline]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    #[inline]
    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    pub fn into_dataset(self) -> PolygonDataset {
        self.dataset
    }

    /// Whether `point` lies strictly inside the dataset bounding box
    ///
    /// Useful to catch coordinates in the wrong convention (radians, or
    /// longitudes in [0, 360) against a (-180, 180] dataset).
    pub fn check_point(&self, point: &Point<f64>) -> bool {
        match self.dataset.bounding_box() {
            Some(bbox) if bbox.contains(point) => true,
            Some(bbox) => {
                tracing::warn!(
                    "Station ({}, {}) not in dataset {}",
                    point.x(),
                    point.y(),
                    bbox
                );
                false
            }
            None => {
                tracing::warn!("Dataset has no extent, cannot contain any station");
                false
            }
        }
    }

    /// Attributes `fields` of the feature matching `source`
    ///
    /// Returns `Ok(None)` when the inclusion strategy finds no feature.
    /// Fails with [`GeoError::EmptyDataset`] when the nearest strategy has
    /// nothing to compare against, and with [`GeoError::MissingAttribute`]
    /// when the matched feature lacks one of the requested fields.
    pub fn get_attributes<'a>(
        &self,
        source: impl Into<Locator<'a>>,
        fields: &[&str],
        options: &QueryOptions,
    ) -> Result<Option<Resolution>> {
        let point = self.locate(&source.into())?;
        let probe = self.build_probe(point, options.buffer)?;

        let selection = match options.strategy {
            Strategy::Nearest => Some(self.select_nearest(&probe)?),
            Strategy::Inclusion => self.select_inclusion(&probe),
        };
        let Some(selection) = selection else {
            return Ok(None);
        };

        let feature = &self.dataset.features()[selection.index];
        let attributes = project_fields(feature, selection.index, fields)?;

        let distance = if options.include_distance {
            Some(
                selection
                    .distance
                    .unwrap_or_else(|| Euclidean.distance(&probe.region, feature.geometry())),
            )
        } else {
            None
        };

        Ok(Some(Resolution {
            feature: selection.index,
            attributes,
            distance,
            alternates: selection.alternates,
        }))
    }

    /// Unit-level ISO code of the feature matching `source`
    ///
    /// Yields [`UNKNOWN_ISO`] when nothing matched.
    pub fn get_iso<'a>(
        &self,
        source: impl Into<Locator<'a>>,
        options: &QueryOptions,
    ) -> Result<IsoMatch> {
        let field = self.config.unit_code_field.as_str();
        let Some(resolution) = self.get_attributes(source, &[field], options)? else {
            return Ok(IsoMatch::unknown());
        };

        let code = match resolution.attributes.get(field) {
            Some(value) if value.is_null() => UNKNOWN_ISO.to_string(),
            Some(value) => value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string()),
            None => UNKNOWN_ISO.to_string(),
        };

        Ok(IsoMatch {
            code,
            distance: resolution.distance,
        })
    }

    /// Resolve the ISO code of `station` and store it on the station
    pub fn locate_station(&self, station: &mut Station, options: &QueryOptions) -> Result<IsoMatch> {
        let iso = self.get_iso(&*station, options)?;
        station.set_iso(iso.code.clone());
        Ok(iso)
    }

    /// Distance from `source` to the country `iso`, in the metric CRS units
    ///
    /// Features match when either their unit-level or sovereignty-level code
    /// equals `iso`; the minimum distance over all matches is returned.
    /// Unknown and reserved codes yield [`UNKNOWN_COUNTRY_DISTANCE`].
    pub fn get_country_distance<'a>(
        &self,
        iso: &str,
        source: impl Into<Locator<'a>>,
    ) -> Result<f64> {
        if self.config.reserved_codes.iter().any(|code| code == iso) {
            tracing::debug!("'{iso}' is a reserved code, no country distance");
            return Ok(UNKNOWN_COUNTRY_DISTANCE);
        }

        let fields = [
            self.config.unit_code_field.as_str(),
            self.config.sovereignty_code_field.as_str(),
        ];
        let indices = self.dataset.indices_matching(&fields, iso);
        if indices.is_empty() {
            tracing::debug!("Unknown country code '{iso}'");
            return Ok(UNKNOWN_COUNTRY_DISTANCE);
        }

        let station = self.station(&source.into())?;
        let countries = self
            .reprojector
            .reproject(&self.dataset.select(&indices), self.config.metric_crs)?;

        let origin = match self.config.metric_crs {
            Crs::Geocentric => station.point_xyz().planar(),
            Crs::Geographic => station.point(),
        };
        let origin = Geometry::Point(origin);

        let distance = countries
            .features()
            .iter()
            .filter(|feature| feature.bounds().is_some())
            .map(|feature| Euclidean.distance(&origin, feature.geometry()))
            .min_by(f64::total_cmp);

        match distance {
            Some(distance) => Ok(distance),
            None => {
                tracing::warn!("Country '{iso}' has no geometry");
                Ok(UNKNOWN_COUNTRY_DISTANCE)
            }
        }
    }

    /// Repair and audit the dataset geometries, see [`PolygonDataset::validate`]
    ///
    /// O(n²) in the number of features: run once per dataset, not per query.
    pub fn validate_geometries(&mut self) -> bool {
        self.validate().is_valid()
    }

    /// Like [`Self::validate_geometries`], returning the full report
    pub fn validate(&mut self) -> ValidationReport {
        let name_field = self.config.name_field.clone();
        self.dataset.validate(&name_field)
    }

    /// Query point in the dataset CRS
    fn locate(&self, source: &Locator<'_>) -> Result<Point<f64>> {
        match source {
            Locator::Point(point) => Ok(*point),
            Locator::Station(station) => Ok(station.point()),
            Locator::Coordinates { .. } => Ok(self.station(source)?.point()),
        }
    }

    fn station<'a>(&self, source: &Locator<'a>) -> Result<Cow<'a, Station>> {
        let (lon, lat) = match *source {
            Locator::Station(station) => return Ok(Cow::Borrowed(station)),
            Locator::Coordinates { lon, lat } => (lon, lat),
            Locator::Point(point) => (point.x(), point.y()),
        };
        Station::new(StationInput::geodetic(lon, lat), &self.transform).map(Cow::Owned)
    }

    fn build_probe(&self, point: Point<f64>, buffer: f64) -> Result<Probe> {
        if !buffer.is_finite() || buffer < 0.0 {
            return Err(GeoError::InvalidInput(format!(
                "buffer must be a non-negative distance, got {buffer}"
            )));
        }

        let region = if buffer > 0.0 {
            Geometry::Polygon(disk(point, buffer, self.config.buffer_segments))
        } else {
            Geometry::Point(point)
        };
        let bounds = region
            .bounding_rect()
            .unwrap_or_else(|| Rect::new(point.0, point.0));

        Ok(Probe {
            point,
            region,
            bounds,
        })
    }

    /// Feature at minimum distance, lowest index on ties
    fn select_nearest(&self, probe: &Probe) -> Result<Selection> {
        let (index, distance) = self
            .dataset
            .features()
            .par_iter()
            .enumerate()
            .filter(|(_, feature)| feature.bounds().is_some())
            .map(|(index, feature)| (index, Euclidean.distance(&probe.region, feature.geometry())))
            .filter(|(_, distance)| !distance.is_nan())
            .min_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)))
            .ok_or(GeoError::EmptyDataset)?;

        tracing::debug!(
            "Nearest feature to ({}, {}): {index} at {distance}",
            probe.point.x(),
            probe.point.y()
        );

        Ok(Selection {
            index,
            distance: Some(distance),
            alternates: Vec::new(),
        })
    }

    /// First intersecting feature by dataset order, others as alternates
    fn select_inclusion(&self, probe: &Probe) -> Option<Selection> {
        let bbox = self.dataset.bounding_box()?;
        if !bbox.intersects(&probe.bounds) {
            tracing::warn!(
                "Station ({}, {}) not in dataset {}",
                probe.point.x(),
                probe.point.y(),
                bbox
            );
            return None;
        }

        let mut candidates = self
            .dataset
            .features()
            .iter()
            .enumerate()
            .filter(|(_, feature)| {
                feature
                    .bounds()
                    .is_some_and(|bounds| bounds.intersects(&probe.bounds))
            })
            .filter(|(_, feature)| probe.region.intersects(feature.geometry()))
            .map(|(index, _)| index);

        let Some(index) = candidates.next() else {
            tracing::warn!(
                "No country found for station ({}, {})",
                probe.point.x(),
                probe.point.y()
            );
            return None;
        };

        let alternates: Vec<usize> = candidates.collect();
        if !alternates.is_empty() {
            tracing::warn!(
                "Station ({}, {}) in multiple countries/polygons: {:?}, keeping {index}",
                probe.point.x(),
                probe.point.y(),
                std::iter::once(index)
                    .chain(alternates.iter().copied())
                    .collect::<Vec<_>>()
            );
        }

        Some(Selection {
            index,
            distance: None,
            alternates,
        })
    }
}

/// Regular polygon approximating a circle of `radius` around `center`
fn disk(center: Point<f64>, radius: f64, quarter_segments: usize) -> Polygon<f64> {
    let segments = 4 * quarter_segments.max(1);
    let ring: Vec<Coord<f64>> = (0..segments)
        .map(|i| {
            let angle = std::f64::consts::TAU * i as f64 / segments as f64;
            Coord {
                x: center.x() + radius * angle.cos(),
                y: center.y() + radius * angle.sin(),
            }
        })
        .collect();
    Polygon::new(LineString::from(ring), Vec::new())
}

fn project_fields(feature: &PolygonFeature, index: usize, fields: &[&str]) -> Result<Attributes> {
    fields
        .iter()
        .map(|&field| {
            feature
                .attribute(field)
                .map(|value| (field.to_string(), value.clone()))
                .ok_or_else(|| GeoError::MissingAttribute {
                    field: field.to_string(),
                    feature: index,
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AttributeValue;
    use crate::fixtures::{self, ESP, FRA, GLP};
    use approx::assert_abs_diff_eq;

    fn resolver() -> CountryResolver {
        CountryResolver::new(fixtures::world(), ResolverConfig::default())
    }

    fn antille() -> Station {
        Station::new(
            StationInput::geodetic(-61.5275, 16.2623).with_name("antille"),
            &CoordinateTransform::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_paris_nearest_is_france_at_zero() {
        let resolver = resolver();
        let paris = Station::from_geodetic(2.33, 48.8, 0.0).unwrap();

        let iso = resolver
            .get_iso(&paris, &QueryOptions::nearest().with_distance())
            .unwrap();
        assert_eq!(iso.code, "FRA");
        assert_eq!(iso.distance, Some(0.0));
        assert_eq!(iso.to_string(), "FRA (0)");
    }

    #[test]
    fn test_unit_and_sovereignty_codes_diverge() {
        let resolver = resolver();
        let resolution = resolver
            .get_attributes(
                &antille(),
                &["ISO_A3_EH", "SOV_A3", "NAME_LONG"],
                &QueryOptions::default(),
            )
            .unwrap()
            .unwrap();

        assert_eq!(resolution.feature, GLP);
        assert_eq!(resolution.attributes["ISO_A3_EH"].as_str(), Some("GLP"));
        assert_eq!(resolution.attributes["SOV_A3"].as_str(), Some("FR1"));
        assert_eq!(
            resolution.attributes["NAME_LONG"].as_str(),
            Some("Guadeloupe")
        );
        assert!(resolution.distance.is_none());
        assert!(!resolution.is_ambiguous());
    }

    #[test]
    fn test_locators_agree() {
        let resolver = resolver();
        let options = QueryOptions::inclusion();

        let from_coordinates = resolver.get_iso((-52.365, 4.822), &options).unwrap();
        let from_point = resolver
            .get_iso(Point::new(-52.365, 4.822), &options)
            .unwrap();
        let cayenne = Station::from_geodetic(-52.365, 4.822, 0.0).unwrap();
        let from_station = resolver.get_iso(&cayenne, &options).unwrap();

        assert_eq!(from_coordinates.code, "GUF");
        assert_eq!(from_point, from_coordinates);
        assert_eq!(from_station, from_coordinates);
    }

    #[test]
    fn test_coordinates_are_normalized() {
        let resolver = resolver();
        let options = QueryOptions::inclusion();

        // Cayenne in the [0, 360) convention
        let iso = resolver.get_iso((360.0 - 52.365, 4.822), &options).unwrap();
        assert_eq!(iso.code, "GUF");

        // Paris shifted a full turn is in neither convention
        assert!(matches!(
            resolver.get_iso((2.33 + 360.0, 48.8), &options),
            Err(GeoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_nearest_with_buffer_shrinks_distance() {
        let resolver = resolver();
        let point_distance = (20.7_f64.powi(2) + 6.0_f64.powi(2)).sqrt();

        // Disk edges sit inside the circle by at most r * (1 - cos(pi / 64))
        let buffered = resolver
            .get_iso(
                (-30.0, 30.0),
                &QueryOptions::nearest().with_buffer(2.0).with_distance(),
            )
            .unwrap();
        assert_eq!(buffered.code, "ESP");
        let distance = buffered.distance.unwrap();
        assert!(distance >= point_distance - 2.0 - 1e-9);
        assert_abs_diff_eq!(distance, point_distance - 2.0, epsilon = 5e-3);

        // A disk reaching the polygon measures zero
        let reaching = resolver
            .get_iso(
                (-30.0, 30.0),
                &QueryOptions::nearest().with_buffer(25.0).with_distance(),
            )
            .unwrap();
        assert_eq!(reaching.distance, Some(0.0));
    }

    #[test]
    fn test_null_unit_code_is_unknown() {
        let mut attributes = fixtures::attributes("XXX", "XXX", "Nowhere");
        attributes.insert("ISO_A3_EH".to_string(), AttributeValue::Null);
        let dataset = PolygonDataset::new(
            vec![PolygonFeature::new(
                fixtures::rectangle(0.0, 0.0, 1.0, 1.0),
                attributes,
            )],
            Crs::Geographic,
        );
        let resolver = CountryResolver::new(dataset, ResolverConfig::default());

        let iso = resolver.get_iso((0.5, 0.5), &QueryOptions::nearest()).unwrap();
        assert_eq!(iso.code, UNKNOWN_ISO);
        assert!(!iso.is_known());
    }

    #[test]
    fn test_nearest_distance_zero_iff_contained() {
        let resolver = resolver();
        let options = QueryOptions::nearest().with_distance();

        let inside = resolver.get_iso((-47.878, -15.947), &options).unwrap();
        assert_eq!(inside.code, "BRA");
        assert_eq!(inside.distance, Some(0.0));

        // Mid-Atlantic: closest polygon is the Spain corner at (-9.3, 36)
        let offshore = resolver.get_iso((-30.0, 30.0), &options).unwrap();
        assert_eq!(offshore.code, "ESP");
        let expected = (20.7_f64.powi(2) + 6.0_f64.powi(2)).sqrt();
        assert_abs_diff_eq!(offshore.distance.unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_inclusion_not_found() {
        let resolver = resolver();
        let options = QueryOptions::inclusion();

        // Inside the dataset extent but over the ocean
        let ocean = resolver.get_attributes((-30.0, 30.0), &["ISO_A3_EH"], &options);
        assert!(ocean.unwrap().is_none());
        assert_eq!(resolver.get_iso((-30.0, 30.0), &options).unwrap().code, "000");

        // Outside the dataset extent, even with a buffer
        let far = resolver
            .get_iso((100.0, 10.0), &options.with_buffer(5.0).with_distance())
            .unwrap();
        assert_eq!(far, IsoMatch::unknown());
        assert!(!far.is_known());
    }

    #[test]
    fn test_buffer_reaches_nearby_coast() {
        let resolver = resolver();
        // 0.1 degree west of the Guadeloupe polygon
        let offshore = (-62.0, 16.2);

        let bare = resolver.get_iso(offshore, &QueryOptions::inclusion()).unwrap();
        assert_eq!(bare.code, UNKNOWN_ISO);

        let buffered = resolver
            .get_iso(offshore, &QueryOptions::inclusion().with_buffer(0.2))
            .unwrap();
        assert_eq!(buffered.code, "GLP");
    }

    #[test]
    fn test_ambiguous_match_keeps_first_and_reports_alternates() {
        let resolver = resolver();
        // On the France/Spain border
        let resolution = resolver
            .get_attributes((0.0, 42.3), &["ISO_A3_EH"], &QueryOptions::inclusion())
            .unwrap()
            .unwrap();

        assert_eq!(resolution.feature, FRA);
        assert_eq!(resolution.alternates, vec![ESP]);
        assert!(resolution.is_ambiguous());

        let nearest = resolver
            .get_iso((0.0, 42.3), &QueryOptions::nearest().with_distance())
            .unwrap();
        assert_eq!(nearest.code, "FRA");
        assert_eq!(nearest.distance, Some(0.0));
    }

    #[test]
    fn test_inclusion_distance_is_zero() {
        let resolver = resolver();
        let resolution = resolver
            .get_attributes(
                (-62.0, 16.2),
                &["ISO_A3_EH"],
                &QueryOptions::inclusion().with_buffer(0.2).with_distance(),
            )
            .unwrap()
            .unwrap();
        assert_eq!(resolution.distance, Some(0.0));
    }

    #[test]
    fn test_missing_field_is_an_error() {
        let resolver = resolver();
        let result = resolver.get_attributes((2.33, 48.8), &["POP_EST"], &QueryOptions::default());
        assert!(matches!(
            result,
            Err(GeoError::MissingAttribute { feature: FRA, .. })
        ));
    }

    #[test]
    fn test_invalid_buffer_is_an_error() {
        let resolver = resolver();
        let result = resolver.get_iso((2.33, 48.8), &QueryOptions::default().with_buffer(-1.0));
        assert!(matches!(result, Err(GeoError::InvalidInput(_))));
    }

    #[test]
    fn test_empty_dataset() {
        let resolver = CountryResolver::new(
            PolygonDataset::new(Vec::new(), Crs::Geographic),
            ResolverConfig::default(),
        );

        assert!(matches!(
            resolver.get_iso((2.33, 48.8), &QueryOptions::nearest()),
            Err(GeoError::EmptyDataset)
        ));
        assert_eq!(
            resolver
                .get_iso((2.33, 48.8), &QueryOptions::inclusion())
                .unwrap()
                .code,
            UNKNOWN_ISO
        );
    }

    #[test]
    fn test_country_distance() {
        let resolver = resolver();
        let paris = Station::from_geodetic(2.33, 48.8, 0.0).unwrap();
        let antille = antille();

        assert_eq!(resolver.get_country_distance("FRA", &paris).unwrap(), 0.0);
        // Guadeloupe is administered by France: matched through SOV_A3
        assert_eq!(resolver.get_country_distance("FR1", &antille).unwrap(), 0.0);
        assert_eq!(resolver.get_country_distance("GLP", &antille).unwrap(), 0.0);

        let to_france = resolver.get_country_distance("FRA", &antille).unwrap();
        assert!(to_france > 1.0e6 && to_france < 1.0e7);

        let from_coordinates = resolver.get_country_distance("FRA", (-61.5275, 16.2623)).unwrap();
        assert_abs_diff_eq!(from_coordinates, to_france, epsilon = 1e-6);
    }

    #[test]
    fn test_country_distance_unknown_codes() {
        let resolver = resolver();
        for station in [
            Station::from_geodetic(2.33, 48.8, 0.0).unwrap(),
            antille(),
            Station::from_geodetic(0.0, -89.0, 2800.0).unwrap(),
        ] {
            assert_eq!(
                resolver.get_country_distance("ZZZ", &station).unwrap(),
                UNKNOWN_COUNTRY_DISTANCE
            );
            assert_eq!(
                resolver.get_country_distance("QQQ", &station).unwrap(),
                UNKNOWN_COUNTRY_DISTANCE
            );
        }
    }

    #[test]
    fn test_country_distance_in_native_crs() {
        let config = ResolverConfig {
            metric_crs: Crs::Geographic,
            ..ResolverConfig::default()
        };
        let resolver = CountryResolver::new(fixtures::world(), config);
        let distance = resolver.get_country_distance("ESP", (-30.0, 30.0)).unwrap();
        let expected = (20.7_f64.powi(2) + 6.0_f64.powi(2)).sqrt();
        assert_abs_diff_eq!(distance, expected, epsilon = 1e-9);
    }

    #[test]
    fn test_locate_station_sets_iso() {
        let resolver = resolver();
        let mut station = antille();
        assert_eq!(station.iso(), UNKNOWN_ISO);

        let iso = resolver
            .locate_station(&mut station, &QueryOptions::default())
            .unwrap();
        assert_eq!(iso.code, "GLP");
        assert_eq!(station.iso(), "GLP");
    }

    #[test]
    fn test_check_point() {
        let resolver = resolver();
        assert!(resolver.check_point(&Point::new(2.33, 48.8)));
        assert!(!resolver.check_point(&Point::new(362.33, 48.8)));
        // Points on the extent edge are outside
        assert!(!resolver.check_point(&Point::new(-74.0, 0.0)));
    }

    #[test]
    fn test_disk_shape() {
        let circle = disk(Point::new(10.0, 20.0), 2.0, 16);
        // Closed ring: 64 vertices plus the closing one
        assert_eq!(circle.exterior().0.len(), 65);
        for coord in circle.exterior().coords() {
            let radius = ((coord.x - 10.0).powi(2) + (coord.y - 20.0).powi(2)).sqrt();
            assert_abs_diff_eq!(radius, 2.0, epsilon = 1e-12);
        }
    }
}
