//! Map marker styling for sensor readings.

use serde::{Deserialize, Serialize};

/// Color used for sensors that were never read or gave no usable reading.
pub const UNVISITED_COLOR: &str = "#aaaaaa";

/// Below this battery level the reading is not trusted.
pub const LOW_BATTERY_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerSymbol {
    Lighthouse,
    Danger,
    Cross,
}

impl MarkerSymbol {
    pub fn as_str(self) -> &'static str {
        match self {
            MarkerSymbol::Lighthouse => "lighthouse",
            MarkerSymbol::Danger => "danger",
            MarkerSymbol::Cross => "cross",
        }
    }
}

/// Color and optional icon of one sensor marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub symbol: Option<MarkerSymbol>,
}

impl MarkerStyle {
    pub const UNVISITED: MarkerStyle = MarkerStyle {
        color: UNVISITED_COLOR,
        symbol: None,
    };
}

// Upper bound (exclusive) of each 32-wide reading band.
const BANDS: [(f64, &str, MarkerSymbol); 8] = [
    (32.0, "#00ff00", MarkerSymbol::Lighthouse),
    (64.0, "#40ff00", MarkerSymbol::Lighthouse),
    (96.0, "#80ff00", MarkerSymbol::Lighthouse),
    (128.0, "#c0ff00", MarkerSymbol::Lighthouse),
    (160.0, "#ffc000", MarkerSymbol::Danger),
    (192.0, "#ff8000", MarkerSymbol::Danger),
    (224.0, "#ff4000", MarkerSymbol::Danger),
    (256.0, "#ff0000", MarkerSymbol::Danger),
];

/// Style of a visited sensor.
///
/// A low battery overrides the reading. Missing, negative and out-of-range
/// readings fall back to the unvisited style.
pub fn marker_style(reading: Option<f64>, battery: f64) -> MarkerStyle {
    if battery < LOW_BATTERY_THRESHOLD {
        return MarkerStyle {
            color: "#000000",
            symbol: Some(MarkerSymbol::Cross),
        };
    }

    let Some(value) = reading.filter(|v| *v >= 0.0) else {
        return MarkerStyle::UNVISITED;
    };

    BANDS
        .iter()
        .find(|(upper, _, _)| value < *upper)
        .map(|(_, color, symbol)| MarkerStyle {
            color: *color,
            symbol: Some(*symbol),
        })
        .unwrap_or(MarkerStyle::UNVISITED)
}
