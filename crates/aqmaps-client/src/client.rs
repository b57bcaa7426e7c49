//! Data service HTTP client.

use anyhow::{Context, Result};
use aqmaps_core::{BuildingPolygon, Coordinate, Sensor};
use chrono::NaiveDate;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::payload::{
    maps_path, parse_no_fly_zones, words_path, SensorEntry, WordDetails, NO_FLY_ZONES_PATH,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the sensor and building data service.
#[derive(Debug, Clone)]
pub struct DataServiceClient {
    client: Client,
    base_url: String,
}

impl DataServiceClient {
    /// Create a client for `base_url`, e.g. `http://localhost:9898`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, path: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, "GET");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to reach data service at {url}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Data service request {} failed: {} {}",
                url,
                status,
                body
            ));
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body from {url}"))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.get_text(path).await?;
        serde_json::from_str(&body).with_context(|| format!("Failed to parse response from {path}"))
    }

    /// Sensors scheduled for `date`, in list order, with resolved positions.
    pub async fn fetch_sensors(&self, date: NaiveDate) -> Result<Vec<Sensor>> {
        let entries: Vec<SensorEntry> = self
            .get_json(&maps_path(date))
            .await
            .with_context(|| format!("Failed to fetch sensor list for {date}"))?;

        let mut sensors = Vec::with_capacity(entries.len());
        for entry in entries {
            let position = self.resolve_location(&entry.location).await?;
            sensors.push(entry.into_sensor(position));
        }

        tracing::info!(count = sensors.len(), %date, "Fetched sensors");
        Ok(sensors)
    }

    /// Position of a what3words location.
    pub async fn resolve_location(&self, location: &str) -> Result<Coordinate> {
        let path = words_path(location)?;
        let details: WordDetails = self
            .get_json(&path)
            .await
            .with_context(|| format!("Failed to resolve location {location}"))?;
        details.position()
    }

    pub async fn fetch_no_fly_zones(&self) -> Result<Vec<BuildingPolygon>> {
        let body = self
            .get_text(NO_FLY_ZONES_PATH)
            .await
            .context("Failed to fetch no-fly zones")?;
        let polygons = parse_no_fly_zones(&body)?;
        tracing::info!(count = polygons.len(), "Fetched no-fly zones");
        Ok(polygons)
    }
}
