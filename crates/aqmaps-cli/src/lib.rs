//! aqmaps CLI - configuration and output writers for the `aqmaps` binary.

pub mod config;
pub mod output;

pub use config::Config;
pub use output::{build_readings_map, render_move_log, write_outputs, OutputPaths};
