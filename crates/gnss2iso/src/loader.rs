//! GeoJSON ingestion into a [`PolygonDataset`]
//!
//! GeoJSON coordinates are always WGS84 longitude/latitude, so datasets come
//! out tagged [`Crs::Geographic`].

use crate::error::{CliError, Result};
use geo::{Geometry, GeometryCollection};
use geojson::GeoJson;
use gnss2iso_lib::{AttributeValue, Attributes, Crs, PolygonDataset, PolygonFeature};
use serde_json::Value;
use std::path::Path;

pub fn load_dataset(path: &Path) -> Result<PolygonDataset> {
    tracing::info!("Loading dataset {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = parse_dataset(&text)?;
    tracing::info!(
        "Loaded {} features, {}",
        dataset.len(),
        dataset
            .bounding_box()
            .map(|bbox| bbox.to_string())
            .unwrap_or_else(|| "no extent".to_string())
    );
    Ok(dataset)
}

pub fn parse_dataset(text: &str) -> Result<PolygonDataset> {
    let features = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection.features,
        GeoJson::Feature(feature) => vec![feature],
        GeoJson::Geometry(_) => {
            return Err(CliError::Dataset(
                "expected a FeatureCollection, found a bare geometry".to_string(),
            ));
        }
    };

    let features = features
        .into_iter()
        .map(convert_feature)
        .collect::<Result<Vec<_>>>()?;

    Ok(PolygonDataset::new(features, Crs::Geographic))
}

fn convert_feature(feature: geojson::Feature) -> Result<PolygonFeature> {
    let geometry = match feature.geometry {
        Some(geometry) => Geometry::<f64>::try_from(geometry)?,
        None => Geometry::GeometryCollection(GeometryCollection::default()),
    };

    let attributes: Attributes = feature
        .properties
        .unwrap_or_default()
        .into_iter()
        .map(|(key, value)| (key, to_attribute(value)))
        .collect();

    Ok(PolygonFeature::new(geometry, attributes))
}

/// Scalar JSON values map one to one; arrays and objects are kept as JSON text
pub fn to_attribute(value: Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null,
        Value::Bool(b) => AttributeValue::Bool(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => AttributeValue::Integer(i),
            None => AttributeValue::Number(n.as_f64().unwrap_or(f64::NAN)),
        },
        Value::String(s) => AttributeValue::Text(s),
        other => AttributeValue::Text(other.to_string()),
    }
}
