use std::time::Duration;

use crate::api::{DEFAULT_BASE_URL, DEFAULT_TOP_N};
use crate::cli::Args;
use crate::units::Units;

/// Runtime settings gathered from the command line and the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base_url: String,
    pub poll_interval: Duration,
    pub top_n: usize,
    pub units: Units,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: Duration::from_secs(10),
            top_n: DEFAULT_TOP_N,
            units: Units::Metric,
        }
    }
}

impl Config {
    /// `.env` must already be loaded, clap reads the base URL variable
    /// while parsing.
    pub fn from_args(args: &Args) -> Self {
        let api_base_url = args
            .api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string();
        Self {
            api_base_url,
            poll_interval: Duration::from_secs(args.interval),
            top_n: DEFAULT_TOP_N,
            units: if args.imperial {
                Units::Imperial
            } else {
                Units::Metric
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn blank_base_url_falls_back_to_default() {
        let args = Args::try_parse_from(["rincon-fire", "--api-url", "  "]).unwrap();
        assert_eq!(Config::from_args(&args).api_base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn flags_map_onto_config() {
        let args = Args::try_parse_from([
            "rincon-fire",
            "--api-url",
            "http://api:9000/",
            "--interval",
            "30",
            "--imperial",
        ])
        .unwrap();
        let config = Config::from_args(&args);
        assert_eq!(config.api_base_url, "http://api:9000/");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.units, Units::Imperial);
        assert_eq!(config.top_n, 5);
    }
}
