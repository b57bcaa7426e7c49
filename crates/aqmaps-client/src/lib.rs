//! aqmaps data service client
//!
//! Fetches the day's sensor list, what3words positions and no-fly buildings.

pub mod client;
pub mod payload;

pub use client::{DataServiceClient, DEFAULT_TIMEOUT};
pub use payload::{parse_no_fly_zones, parse_reading, SensorEntry, WordDetails};
