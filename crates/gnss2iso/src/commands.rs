use crate::error::{CliError, Result};
use crate::loader::load_dataset;
use crate::settings::{Command, Settings};
use gnss2iso_lib::{
    CoordinateTransform, CountryResolver, Crs, PolygonDataset, ResolverConfig, Station,
    UNKNOWN_COUNTRY_DISTANCE,
};
use serde_json::json;
use std::path::Path;
use std::process::ExitCode;

/// Execute the parsed command, printing its result on stdout
pub fn run(settings: &Settings) -> Result<ExitCode> {
    let config = load_config(settings.config.as_deref())?;

    match &settings.command {
        Command::Station { station } => {
            let transform = CoordinateTransform::new(config.ellipsoid);
            let station = Station::new(station.to_input(), &transform)?;
            let inside = match &settings.dataset {
                Some(path) => Some(
                    CountryResolver::new(load_dataset(path)?, config).check_point(&station.point()),
                ),
                None => None,
            };
            print_station(&station, inside, settings.json)?;
        }

        Command::Iso { station, query } => {
            let resolver = open_resolver(settings, config)?;
            let mut station = Station::new(station.to_input(), resolver.transform())?;
            resolver.check_point(&station.point());

            let iso = resolver.locate_station(&mut station, &query.to_options())?;
            if settings.json {
                print_json(&json!({ "station": station.name(), "iso": iso }))?;
            } else {
                println!("{}: {}", station.name(), iso);
            }
        }

        Command::Attributes {
            station,
            query,
            fields,
        } => {
            let resolver = open_resolver(settings, config)?;
            let station = Station::new(station.to_input(), resolver.transform())?;
            resolver.check_point(&station.point());

            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            let resolution = resolver.get_attributes(&station, &fields, &query.to_options())?;
            if settings.json {
                print_json(&json!({ "station": station.name(), "match": resolution }))?;
            } else {
                match resolution {
                    Some(resolution) => {
                        println!("{}: feature {}", station.name(), resolution.feature);
                        for (field, value) in &resolution.attributes {
                            println!("  {field}: {value}");
                        }
                        if let Some(distance) = resolution.distance {
                            println!("  distance: {distance}");
                        }
                        if resolution.is_ambiguous() {
                            println!("  also intersects: {:?}", resolution.alternates);
                        }
                    }
                    None => println!("{}: no feature matched", station.name()),
                }
            }
        }

        Command::Distance {
            station,
            country,
            epsg,
        } => {
            let mut config = config;
            if let Some(code) = *epsg {
                config.metric_crs = Crs::from_epsg(code).ok_or(CliError::UnsupportedCrs(code))?;
            }
            let resolver = open_resolver(settings, config)?;
            let station = Station::new(station.to_input(), resolver.transform())?;

            let distance = resolver.get_country_distance(country, &station)?;
            if settings.json {
                print_json(&json!({
                    "station": station.name(),
                    "country": country,
                    "distance": distance,
                    "unit": resolver.config().metric_crs.unit(),
                }))?;
            } else if distance == UNKNOWN_COUNTRY_DISTANCE {
                println!("{}: unknown country '{country}'", station.name());
            } else {
                println!(
                    "{} -> {country}: {distance} {}",
                    station.name(),
                    resolver.config().metric_crs.unit()
                );
            }
        }

        Command::Validate => {
            let mut resolver = open_resolver(settings, config)?;
            let report = resolver.validate();
            if settings.json {
                let faults: Vec<String> = report.faults.iter().map(ToString::to_string).collect();
                print_json(&json!({
                    "valid": report.is_valid(),
                    "repaired": report.repaired,
                    "skipped": report.skipped,
                    "faults": faults,
                    "conflicts": report.conflicts,
                }))?;
            } else {
                println!(
                    "{} features, {} repaired, {} skipped, {} faults",
                    resolver.dataset().len(),
                    report.repaired.len(),
                    report.skipped.len(),
                    report.faults.len()
                );
                for conflict in &report.conflicts {
                    println!(
                        "overlap: {} & {} (area {})",
                        conflict.first, conflict.second, conflict.area
                    );
                }
                println!("valid: {}", report.is_valid());
            }
            if !report.is_valid() {
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn load_config(path: Option<&Path>) -> Result<ResolverConfig> {
    let Some(path) = path else {
        return Ok(ResolverConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config(&text)
}

/// Resolver configuration from JSON, missing keys taking their defaults
fn parse_config(text: &str) -> Result<ResolverConfig> {
    let config: ResolverConfig = serde_json::from_str(text)?;
    tracing::debug!("Resolver configuration: {config:?}");
    Ok(config)
}

fn open_resolver(settings: &Settings, config: ResolverConfig) -> Result<CountryResolver> {
    let path = settings.dataset.as_deref().ok_or_else(|| {
        CliError::Dataset("this command needs a dataset, pass --dataset FILE".to_string())
    })?;
    let dataset = load_dataset(path)?;
    check_fields(&dataset, &config);
    Ok(CountryResolver::new(dataset, config))
}

/// Warn about configured code fields the dataset never carries
fn check_fields(dataset: &PolygonDataset, config: &ResolverConfig) -> Vec<String> {
    let fields = dataset.fields();
    let missing: Vec<String> = [&config.unit_code_field, &config.sovereignty_code_field]
        .into_iter()
        .filter(|field| !fields.contains(&field.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        tracing::warn!("Dataset has no {missing:?} field, available: {fields:?}");
    }
    missing
}

fn print_station(station: &Station, inside: Option<bool>, json: bool) -> Result<()> {
    if json {
        return print_json(&json!({ "station": station, "in_dataset_extent": inside }));
    }

    println!("{}", station.name());
    println!(
        "  lon: {} (lon360: {}), lat: {}, h: {}",
        station.lon(),
        station.lon360(),
        station.lat(),
        station.h()
    );
    println!(
        "  x: {}, y: {}, z: {}",
        station.x(),
        station.y(),
        station.z()
    );
    if let Some(inside) = inside {
        println!("  in dataset extent: {inside}");
    }
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
