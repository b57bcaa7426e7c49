pub mod avoidance;
pub mod error;
pub mod markers;
pub mod models;
pub mod movement;
pub mod no_fly;
pub mod planner;
pub mod rules;
pub mod spatial;

pub use avoidance::AvoidancePipeline;
pub use error::{CoreError, Result};
pub use markers::{marker_style, MarkerStyle, MarkerSymbol, UNVISITED_COLOR};
pub use models::{
    BuildingPolygon, Coordinate, FlightRecord, Move, Sensor, SensorId, Termination,
};
pub use movement::{heading_between, is_valid_heading, step, Heading};
pub use no_fly::{Building, BuildingId, Edge, NoFlyRegistry, VertexId};
pub use planner::{DroneState, FlightPlanner};
pub use rules::{Airspace, FlightRules};
pub use spatial::{euclidean_distance, segments_intersect, Line, Segment};
