//! Runtime configuration from environment.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use aqmaps_core::FlightRules;

#[derive(Debug, Clone)]
pub struct Config {
    /// Scheme and host of the data service, without the port
    pub host: String,
    pub output_dir: PathBuf,
    pub http_timeout: Duration,
    pub confinement_passes: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            host: lookup("AQMAPS_HOST").unwrap_or_else(|| "http://localhost".to_string()),
            output_dir: lookup("AQMAPS_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(".")),
            http_timeout: lookup("AQMAPS_HTTP_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(Duration::from_secs(10)),
            confinement_passes: lookup("AQMAPS_CONFINEMENT_PASSES")
                .and_then(|s| s.parse().ok())
                .filter(|passes| *passes > 0)
                .unwrap_or(1),
        }
    }

    pub fn flight_rules(&self) -> FlightRules {
        FlightRules {
            confinement_passes: self.confinement_passes,
            ..FlightRules::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]);
        assert_eq!(config.host, "http://localhost");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.flight_rules().confinement_passes, 1);
    }

    #[test]
    fn overrides_from_environment() {
        let config = config(&[
            ("AQMAPS_HOST", "http://data.example"),
            ("AQMAPS_OUTPUT_DIR", "/tmp/flights"),
            ("AQMAPS_HTTP_TIMEOUT_SECS", "3"),
            ("AQMAPS_CONFINEMENT_PASSES", "3"),
        ]);
        assert_eq!(config.host, "http://data.example");
        assert_eq!(config.output_dir, PathBuf::from("/tmp/flights"));
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert_eq!(config.flight_rules().confinement_passes, 3);
        assert_eq!(config.flight_rules().max_moves, 150);
    }

    #[test]
    fn unparseable_values_fall_back() {
        let config = config(&[
            ("AQMAPS_HTTP_TIMEOUT_SECS", "soon"),
            ("AQMAPS_CONFINEMENT_PASSES", "0"),
        ]);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert_eq!(config.confinement_passes, 1);
    }
}
