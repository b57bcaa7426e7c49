//! Flight constraints and airspace bounds.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::Coordinate;

/// Configuration for a planning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRules {
    /// Distance covered by every move, in degrees
    pub step_length: f64,
    /// A sensor is read when the drone ends a move strictly closer than this
    pub connect_range: f64,
    /// Hard cap on moves per flight
    pub max_moves: usize,
    /// Confinement rectangle the drone must stay inside
    pub airspace: Airspace,
    /// Corrective passes toward the airspace centre when a move leaves it
    pub confinement_passes: usize,
}

impl Default for FlightRules {
    fn default() -> Self {
        Self {
            step_length: 0.0003,
            connect_range: 0.0002,
            max_moves: 150,
            airspace: Airspace::default(),
            confinement_passes: 1,
        }
    }
}

impl FlightRules {
    pub fn validate(&self) -> Result<()> {
        if !(self.step_length.is_finite() && self.step_length > 0.0) {
            return Err(CoreError::InvalidRules(format!(
                "step length must be positive, got {}",
                self.step_length
            )));
        }
        if !(self.connect_range.is_finite() && self.connect_range > 0.0) {
            return Err(CoreError::InvalidRules(format!(
                "connect range must be positive, got {}",
                self.connect_range
            )));
        }
        if self.confinement_passes == 0 {
            return Err(CoreError::InvalidRules(
                "at least one confinement pass is required".to_string(),
            ));
        }
        self.airspace.validate()
    }
}

/// Open rectangle of permitted positions. Points on the boundary are outside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Airspace {
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
}

impl Default for Airspace {
    fn default() -> Self {
        // George Square campus confinement area
        Self {
            min_lon: -3.192473,
            max_lon: -3.184319,
            min_lat: 55.942617,
            max_lat: 55.946233,
        }
    }
}

impl Airspace {
    pub fn contains(&self, position: Coordinate) -> bool {
        position.lat < self.max_lat
            && position.lat > self.min_lat
            && position.lon < self.max_lon
            && position.lon > self.min_lon
    }

    pub fn centre(&self) -> Coordinate {
        Coordinate::new(
            (self.min_lon + self.max_lon) / 2.0,
            (self.min_lat + self.max_lat) / 2.0,
        )
    }

    fn validate(&self) -> Result<()> {
        if self.min_lon >= self.max_lon || self.min_lat >= self.max_lat {
            return Err(CoreError::InvalidRules(format!(
                "airspace bounds are empty: lon [{}, {}], lat [{}, {}]",
                self.min_lon, self.max_lon, self.min_lat, self.max_lat
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_are_valid() {
        assert!(FlightRules::default().validate().is_ok());
    }

    #[test]
    fn airspace_excludes_boundary() {
        let airspace = Airspace::default();
        assert!(airspace.contains(Coordinate::new(-3.1879, 55.9445)));
        assert!(!airspace.contains(Coordinate::new(airspace.min_lon, 55.9445)));
        assert!(!airspace.contains(Coordinate::new(-3.1879, airspace.max_lat)));
        assert!(!airspace.contains(Coordinate::new(-3.1, 55.9445)));
    }

    #[test]
    fn centre_is_midpoint() {
        let centre = Airspace::default().centre();
        assert!((centre.lon - (-3.188396)).abs() < 1e-9);
        assert!((centre.lat - 55.944425).abs() < 1e-9);
    }

    #[test]
    fn rejects_zero_confinement_passes() {
        let rules = FlightRules {
            confinement_passes: 0,
            ..FlightRules::default()
        };
        assert!(matches!(rules.validate(), Err(CoreError::InvalidRules(_))));
    }
}
