use std::path::PathBuf;

/// Errors surfaced by the command-line front end
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Geo(#[from] gnss2iso_lib::GeoError),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Unsupported EPSG code {0}, expected 4326 or 4978")]
    UnsupportedCrs(u32),
}

pub type Result<T> = std::result::Result<T, CliError>;
