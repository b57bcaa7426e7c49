//! Core data models for the aqmaps planner.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::movement::Heading;

/// A planar (longitude, latitude) position in degrees.
///
/// Equality is exact floating-point equality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Build a coordinate, rejecting NaN and infinite components.
    pub fn checked(lon: f64, lat: f64) -> Result<Self> {
        if lon.is_finite() && lat.is_finite() {
            Ok(Self { lon, lat })
        } else {
            Err(CoreError::InvalidCoordinate { lon, lat })
        }
    }
}

/// Index of a sensor in the list fetched for the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SensorId(pub usize);

/// An air-quality sensor the drone must visit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sensor {
    /// what3words address, e.g. "slips.mass.baking"
    pub location: String,
    pub position: Coordinate,
    pub battery: f64,
    /// Parsed reading; `None` when the service reported "null" or "NaN"
    #[serde(default)]
    pub reading: Option<f64>,
}

/// Raw building outline as delivered by the data service.
///
/// `ring` is closed: the first vertex is repeated as the last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingPolygon {
    #[serde(default)]
    pub name: Option<String>,
    pub ring: Vec<Coordinate>,
}

impl BuildingPolygon {
    pub fn new(name: Option<String>, ring: Vec<Coordinate>) -> Self {
        Self { name, ring }
    }
}

/// Why a flight stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Returned within one step of the launch point
    ClosedLoop,
    /// Hit the move budget first
    MoveBudgetExhausted,
}

/// Completed flight, produced once by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightRecord {
    pub launch: Coordinate,
    /// Every position visited, starting with the launch point
    pub positions: Vec<Coordinate>,
    /// One heading per move, derived from consecutive positions
    pub headings: Vec<Heading>,
    /// One entry per move: the sensor connected on that move, if any
    pub connections: Vec<Option<SensorId>>,
    /// All sensors scheduled for the day, indexed by `SensorId`
    pub sensors: Vec<Sensor>,
    pub termination: Termination,
}

/// A single move of a completed flight.
#[derive(Debug, Clone, Copy)]
pub struct Move<'a> {
    /// 1-based move number
    pub number: usize,
    pub before: Coordinate,
    pub heading: Heading,
    pub after: Coordinate,
    pub sensor: Option<&'a Sensor>,
}

impl FlightRecord {
    pub fn moves_made(&self) -> usize {
        self.headings.len()
    }

    pub fn sensor(&self, id: SensorId) -> Option<&Sensor> {
        self.sensors.get(id.0)
    }

    /// Moves in flight order.
    pub fn moves(&self) -> impl Iterator<Item = Move<'_>> + '_ {
        self.positions
            .windows(2)
            .zip(self.headings.iter())
            .zip(self.connections.iter())
            .enumerate()
            .map(move |(idx, ((pair, heading), connection))| Move {
                number: idx + 1,
                before: pair[0],
                heading: *heading,
                after: pair[1],
                sensor: connection.and_then(|id| self.sensor(id)),
            })
    }

    /// Sensors connected during the flight, in visiting order.
    pub fn visited_sensors(&self) -> impl Iterator<Item = &Sensor> + '_ {
        self.connections
            .iter()
            .flatten()
            .filter_map(move |id| self.sensor(*id))
    }

    /// Sensors never connected, in service order.
    pub fn unvisited_sensors(&self) -> impl Iterator<Item = &Sensor> + '_ {
        self.sensors
            .iter()
            .enumerate()
            .filter(move |(idx, _)| !self.connections.contains(&Some(SensorId(*idx))))
            .map(|(_, sensor)| sensor)
    }

    pub fn final_position(&self) -> Coordinate {
        self.positions.last().copied().unwrap_or(self.launch)
    }
}
