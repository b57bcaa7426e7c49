//! Wire formats of the data service and their conversion into core types.

use anyhow::{anyhow, bail, Context, Result};
use aqmaps_core::{BuildingPolygon, Coordinate, Sensor};
use chrono::{Datelike, NaiveDate};
use serde::Deserialize;

/// One row of the daily air-quality list.
#[derive(Debug, Clone, Deserialize)]
pub struct SensorEntry {
    pub location: String,
    pub battery: f64,
    #[serde(default)]
    pub reading: Option<RawReading>,
}

/// Readings arrive as strings, occasionally as bare numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawReading {
    Number(f64),
    Text(String),
}

impl RawReading {
    pub fn value(&self) -> Option<f64> {
        match self {
            RawReading::Number(value) => Some(*value).filter(|v| v.is_finite()),
            RawReading::Text(text) => parse_reading(text),
        }
    }
}

impl SensorEntry {
    pub fn into_sensor(self, position: Coordinate) -> Sensor {
        let reading = self.reading.as_ref().and_then(RawReading::value);
        Sensor {
            location: self.location,
            position,
            battery: self.battery,
            reading,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct WordDetails {
    pub coordinates: WordCoordinates,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct WordCoordinates {
    pub lng: f64,
    pub lat: f64,
}

impl WordDetails {
    pub fn position(&self) -> Result<Coordinate> {
        Ok(Coordinate::checked(self.coordinates.lng, self.coordinates.lat)?)
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    #[serde(default)]
    properties: Option<FeatureProperties>,
    geometry: Geometry,
}

#[derive(Debug, Default, Deserialize)]
struct FeatureProperties {
    #[serde(default)]
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

/// `"null"`, `"NaN"` and anything non-numeric become an absent reading.
pub fn parse_reading(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

pub fn maps_path(date: NaiveDate) -> String {
    format!(
        "/maps/{:04}/{:02}/{:02}/air-quality-data.json",
        date.year(),
        date.month(),
        date.day()
    )
}

/// Details path for a `w1.w2.w3` location.
pub fn words_path(location: &str) -> Result<String> {
    let words: Vec<&str> = location.split('.').collect();
    match words.as_slice() {
        [first, second, third] if words.iter().all(|w| !w.is_empty()) => {
            Ok(format!("/words/{first}/{second}/{third}/details.json"))
        }
        _ => Err(anyhow!("location '{location}' is not three dot-separated words")),
    }
}

pub const NO_FLY_ZONES_PATH: &str = "/buildings/no-fly-zones.geojson";

/// Outer rings of every polygon feature, in document order.
pub fn parse_no_fly_zones(body: &str) -> Result<Vec<BuildingPolygon>> {
    let collection: FeatureCollection =
        serde_json::from_str(body).context("Failed to parse no-fly-zone collection")?;

    collection
        .features
        .into_iter()
        .enumerate()
        .map(|(idx, feature)| -> Result<BuildingPolygon> {
            let name = feature.properties.unwrap_or_default().name;
            if feature.geometry.kind != "Polygon" {
                bail!(
                    "no-fly feature {idx} is a {}, expected Polygon",
                    feature.geometry.kind
                );
            }
            let rings: Vec<Vec<Vec<f64>>> = serde_json::from_value(feature.geometry.coordinates)
                .with_context(|| format!("no-fly feature {idx} has malformed coordinates"))?;
            let outer = rings
                .into_iter()
                .next()
                .with_context(|| format!("no-fly feature {idx} has no rings"))?;
            let ring = outer
                .into_iter()
                .map(|position| -> Result<Coordinate> {
                    match position.as_slice() {
                        [lon, lat, ..] => Ok(Coordinate::checked(*lon, *lat)?),
                        _ => Err(anyhow!("no-fly feature {idx} has a short position")),
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(BuildingPolygon::new(name, ring))
        })
        .collect()
}
