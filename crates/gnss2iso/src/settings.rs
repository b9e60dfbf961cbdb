use clap::{Args, Parser, Subcommand, ValueEnum};
use gnss2iso_lib::{QueryOptions, StationInput, Strategy};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// gnss2iso - Country codes and coordinates of GNSS stations
pub struct Settings {
    /// GeoJSON FeatureCollection of country polygons (e.g. Natural Earth admin-0 map units)
    #[clap(short, long, value_name = "FILE", global = true)]
    pub dataset: Option<PathBuf>,

    /// JSON file overriding the resolver configuration (field names, ellipsoid, ...)
    #[clap(short, long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[clap(long, default_value = "false", global = true)]
    pub json: bool,

    /// Log query decisions (debug level) unless RUST_LOG says otherwise
    #[clap(short, long, default_value = "false", global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Convert a station position and print both coordinate representations
    Station {
        #[clap(flatten)]
        station: StationArgs,
    },
    /// ISO 3166-1 alpha-3 code of the country owning a station
    Iso {
        #[clap(flatten)]
        station: StationArgs,
        #[clap(flatten)]
        query: QueryArgs,
    },
    /// Selected attributes of the feature matching a station
    Attributes {
        #[clap(flatten)]
        station: StationArgs,
        #[clap(flatten)]
        query: QueryArgs,
        /// Attribute names, comma separated
        #[clap(short, long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
    },
    /// Distance from a station to a country, in the metric CRS units
    Distance {
        #[clap(flatten)]
        station: StationArgs,
        /// Unit or sovereignty ISO code of the country
        #[clap(long)]
        country: String,
        /// EPSG code of the CRS distances are measured in (4978 or 4326)
        #[clap(long)]
        epsg: Option<u32>,
    },
    /// Repair the dataset geometries and report overlapping features
    Validate,
}

/// Station position, geodetic or cartesian
#[derive(Args, Debug, Clone)]
pub struct StationArgs {
    /// Longitude in degrees
    #[clap(long, allow_negative_numbers = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Latitude in degrees
    #[clap(long, allow_negative_numbers = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Ellipsoidal height in meters
    #[clap(long, allow_negative_numbers = true, default_value = "0.0")]
    pub height: f64,

    /// Geocentric X in meters (takes precedence over lon/lat)
    #[clap(short, long, allow_negative_numbers = true, requires_all = ["y", "z"])]
    pub x: Option<f64>,

    /// Geocentric Y in meters
    #[clap(short, long, allow_negative_numbers = true)]
    pub y: Option<f64>,

    /// Geocentric Z in meters
    #[clap(short, long, allow_negative_numbers = true)]
    pub z: Option<f64>,

    /// Station name
    #[clap(short, long)]
    pub name: Option<String>,
}

impl StationArgs {
    pub fn to_input(&self) -> StationInput {
        let mut input = StationInput {
            lon: self.lon,
            lat: self.lat,
            h: Some(self.height),
            x: self.x,
            y: self.y,
            z: self.z,
            ..StationInput::default()
        };
        if let Some(name) = &self.name {
            input = input.with_name(name.clone());
        }
        input
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyArg {
    /// Closest feature, always answers on a non-empty dataset
    #[default]
    Nearest,
    /// Features intersecting the (buffered) point only
    Inclusion,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    /// Matching strategy
    #[clap(short, long, value_enum, default_value_t = StrategyArg::Nearest)]
    pub strategy: StrategyArg,

    /// Buffer radius around the station, in dataset CRS units
    #[clap(short, long, default_value = "0.0")]
    pub buffer: f64,

    /// Also report the station-to-feature distance
    #[clap(long, default_value = "false")]
    pub distance: bool,
}

impl QueryArgs {
    pub fn to_options(&self) -> QueryOptions {
        let strategy = match self.strategy {
            StrategyArg::Nearest => Strategy::Nearest,
            StrategyArg::Inclusion => Strategy::Inclusion,
        };
        QueryOptions {
            buffer: self.buffer,
            strategy,
            include_distance: self.distance,
        }
    }
}
