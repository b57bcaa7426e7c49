//! Flight planning loop.
//!
//! The drone greedily flies toward the nearest unvisited sensor, one fixed
//! step at a time, then heads back to the launch point. Every move goes
//! through the avoidance pipeline before it is committed.

use crate::avoidance::AvoidancePipeline;
use crate::error::Result;
use crate::models::{Coordinate, FlightRecord, Sensor, SensorId, Termination};
use crate::movement::{heading_between, step};
use crate::no_fly::NoFlyRegistry;
use crate::rules::FlightRules;
use crate::spatial::euclidean_distance;

/// Mutable state of one flight in progress.
#[derive(Debug, Clone)]
pub struct DroneState {
    pub position: Coordinate,
    /// Every position flown so far, launch first
    pub history: Vec<Coordinate>,
    pub moves_made: usize,
    /// Sensor connected on each move, parallel to the moves
    pub connections: Vec<Option<SensorId>>,
}

impl DroneState {
    pub fn new(launch: Coordinate) -> Self {
        Self {
            position: launch,
            history: vec![launch],
            moves_made: 0,
            connections: Vec::new(),
        }
    }

    /// Commit one move.
    pub fn advance(&mut self, next: Coordinate, connection: Option<SensorId>) {
        self.position = next;
        self.history.push(next);
        self.moves_made += 1;
        self.connections.push(connection);
    }
}

/// Plans flights over a fixed set of no-fly buildings.
#[derive(Debug, Clone)]
pub struct FlightPlanner {
    registry: NoFlyRegistry,
    rules: FlightRules,
}

impl FlightPlanner {
    pub fn new(registry: NoFlyRegistry, rules: FlightRules) -> Result<Self> {
        rules.validate()?;
        Ok(Self { registry, rules })
    }

    pub fn registry(&self) -> &NoFlyRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &FlightRules {
        &self.rules
    }

    /// Fly from `launch` past every reachable sensor and back.
    pub fn plan(&self, launch: Coordinate, sensors: Vec<Sensor>) -> FlightRecord {
        tracing::info!(
            sensors = sensors.len(),
            buildings = self.registry.len(),
            "Planning flight from ({}, {})",
            launch.lon,
            launch.lat
        );

        let pipeline = AvoidancePipeline::new(&self.registry, &self.rules);
        let mut state = DroneState::new(launch);
        let mut pending: Vec<SensorId> = (0..sensors.len()).map(SensorId).collect();

        while state.moves_made < self.rules.max_moves {
            let Some(target) = nearest_pending(&sensors, &pending, state.position) else {
                break;
            };
            let target_position = sensors[pending[target].0].position;
            let next = self.next_position(&pipeline, &state, target_position);

            let connection = nearest_pending(&sensors, &pending, next).and_then(|idx| {
                let id = pending[idx];
                let distance = euclidean_distance(next, sensors[id.0].position);
                if distance < self.rules.connect_range {
                    pending.remove(idx);
                    tracing::debug!(
                        sensor = %sensors[id.0].location,
                        move_number = state.moves_made + 1,
                        "Connected to sensor"
                    );
                    Some(id)
                } else {
                    None
                }
            });

            state.advance(next, connection);
        }

        while state.moves_made < self.rules.max_moves && !self.is_home(launch, state.position) {
            let next = self.next_position(&pipeline, &state, launch);
            state.advance(next, None);
        }

        let termination = if pending.is_empty() && self.is_home(launch, state.position) {
            Termination::ClosedLoop
        } else {
            Termination::MoveBudgetExhausted
        };

        tracing::info!(
            moves = state.moves_made,
            visited = sensors.len() - pending.len(),
            unvisited = pending.len(),
            ?termination,
            "Flight planned"
        );

        let headings = state
            .history
            .windows(2)
            .map(|pair| heading_between(pair[0], pair[1]))
            .collect();

        FlightRecord {
            launch,
            positions: state.history,
            headings,
            connections: state.connections,
            sensors,
            termination,
        }
    }

    fn next_position(
        &self,
        pipeline: &AvoidancePipeline<'_>,
        state: &DroneState,
        target: Coordinate,
    ) -> Coordinate {
        let heading = heading_between(state.position, target);
        let desired = step(heading, state.position, self.rules.step_length);
        pipeline.legal_next_position(state.position, desired, &state.history)
    }

    fn is_home(&self, launch: Coordinate, position: Coordinate) -> bool {
        euclidean_distance(position, launch) < self.rules.step_length
    }
}

/// Index into `pending` of the closest sensor. The first of equal distances wins.
fn nearest_pending(sensors: &[Sensor], pending: &[SensorId], from: Coordinate) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, id) in pending.iter().enumerate() {
        let distance = euclidean_distance(from, sensors[id.0].position);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((idx, distance)),
        }
    }
    best.map(|(idx, _)| idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor(location: &str, lon: f64, lat: f64) -> Sensor {
        Sensor {
            location: location.to_string(),
            position: Coordinate::new(lon, lat),
            battery: 80.0,
            reading: Some(100.0),
        }
    }

    fn planner() -> FlightPlanner {
        FlightPlanner::new(NoFlyRegistry::default(), FlightRules::default()).unwrap()
    }

    #[test]
    fn drone_state_tracks_moves() {
        let launch = Coordinate::new(-3.1879, 55.9445);
        let mut state = DroneState::new(launch);
        assert_eq!(state.history, vec![launch]);

        let next = Coordinate::new(-3.1876, 55.9445);
        state.advance(next, Some(SensorId(2)));
        assert_eq!(state.position, next);
        assert_eq!(state.moves_made, 1);
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.connections, vec![Some(SensorId(2))]);
    }

    #[test]
    fn nearest_pending_prefers_first_on_ties() {
        let sensors = vec![
            sensor("a.a.a", 1.0, 0.0),
            sensor("b.b.b", -1.0, 0.0),
            sensor("c.c.c", 0.5, 0.0),
        ];
        let origin = Coordinate::new(0.0, 0.0);
        assert_eq!(nearest_pending(&sensors, &[SensorId(0), SensorId(1)], origin), Some(0));
        assert_eq!(nearest_pending(&sensors, &[SensorId(1), SensorId(0)], origin), Some(0));
        assert_eq!(
            nearest_pending(&sensors, &[SensorId(0), SensorId(1), SensorId(2)], origin),
            Some(2)
        );
        assert_eq!(nearest_pending(&sensors, &[], origin), None);
    }

    #[test]
    fn no_sensors_means_no_moves() {
        let launch = Coordinate::new(-3.1879, 55.9445);
        let record = planner().plan(launch, Vec::new());
        assert_eq!(record.moves_made(), 0);
        assert_eq!(record.positions, vec![launch]);
        assert_eq!(record.termination, Termination::ClosedLoop);
    }

    #[test]
    fn connects_to_sensor_one_step_away() {
        let launch = Coordinate::new(-3.1879, 55.9445);
        let target = step(crate::movement::Heading::EAST, launch, 0.0003);
        let record = planner().plan(launch, vec![sensor("x.y.z", target.lon, target.lat)]);

        assert_eq!(record.connections[0], Some(SensorId(0)));
        assert_eq!(record.termination, Termination::ClosedLoop);
        assert_eq!(record.headings.len(), record.connections.len());
        assert_eq!(record.positions.len(), record.moves_made() + 1);
    }

    #[test]
    fn rejects_invalid_rules() {
        let rules = FlightRules {
            step_length: 0.0,
            ..FlightRules::default()
        };
        assert!(FlightPlanner::new(NoFlyRegistry::default(), rules).is_err());
    }
}
