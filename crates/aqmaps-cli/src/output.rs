//! Flight artifacts: the move log and the annotated readings map.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use aqmaps_core::{marker_style, FlightRecord, MarkerStyle, Sensor};
use chrono::NaiveDate;
use serde_json::{json, Map, Value};

/// Files written for one flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub move_log: PathBuf,
    pub readings_map: PathBuf,
}

pub fn move_log_file_name(date: NaiveDate) -> String {
    format!("flightpath-{}.txt", date.format("%d-%m-%Y"))
}

pub fn readings_file_name(date: NaiveDate) -> String {
    format!("readings-{}.geojson", date.format("%d-%m-%Y"))
}

/// One line per move:
/// `number,lon_before,lat_before,heading,lon_after,lat_after,location`.
/// The location is empty when no sensor was read on that move.
pub fn render_move_log(record: &FlightRecord) -> String {
    let mut log = String::new();
    for m in record.moves() {
        let location = m.sensor.map(|s| s.location.as_str()).unwrap_or("");
        // writing to a String cannot fail
        let _ = writeln!(
            log,
            "{},{},{},{},{},{},{}",
            m.number, m.before.lon, m.before.lat, m.heading, m.after.lon, m.after.lat, location
        );
    }
    log
}

fn sensor_feature(sensor: &Sensor, style: MarkerStyle) -> Value {
    let mut properties = Map::new();
    properties.insert("location".into(), json!(sensor.location));
    properties.insert("rgb-string".into(), json!(style.color));
    properties.insert("marker-color".into(), json!(style.color));
    if let Some(symbol) = style.symbol {
        properties.insert("marker-symbol".into(), json!(symbol.as_str()));
    }

    json!({
        "type": "Feature",
        "geometry": {
            "type": "Point",
            "coordinates": [sensor.position.lon, sensor.position.lat]
        },
        "properties": properties
    })
}

/// GeoJSON FeatureCollection of the flight path and every sensor marker.
pub fn build_readings_map(record: &FlightRecord) -> Value {
    let path: Vec<[f64; 2]> = record.positions.iter().map(|p| [p.lon, p.lat]).collect();

    let mut features = vec![json!({
        "type": "Feature",
        "geometry": {
            "type": "LineString",
            "coordinates": path
        },
        "properties": {}
    })];

    features.extend(
        record
            .visited_sensors()
            .map(|sensor| sensor_feature(sensor, marker_style(sensor.reading, sensor.battery))),
    );
    features.extend(
        record
            .unvisited_sensors()
            .map(|sensor| sensor_feature(sensor, MarkerStyle::UNVISITED)),
    );

    json!({
        "type": "FeatureCollection",
        "features": features
    })
}

/// Render both artifacts, then write them into `dir`.
pub async fn write_outputs(
    dir: &Path,
    date: NaiveDate,
    record: &FlightRecord,
) -> Result<OutputPaths> {
    let move_log = render_move_log(record);
    let readings = serde_json::to_string_pretty(&build_readings_map(record))
        .context("Failed to serialize readings map")?;

    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let paths = OutputPaths {
        move_log: dir.join(move_log_file_name(date)),
        readings_map: dir.join(readings_file_name(date)),
    };

    tokio::fs::write(&paths.move_log, move_log)
        .await
        .with_context(|| format!("Failed to write {}", paths.move_log.display()))?;
    tokio::fs::write(&paths.readings_map, readings)
        .await
        .with_context(|| format!("Failed to write {}", paths.readings_map.display()))?;

    tracing::info!(
        move_log = %paths.move_log.display(),
        readings = %paths.readings_map.display(),
        "Wrote flight outputs"
    );
    Ok(paths)
}
