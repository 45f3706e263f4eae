//! Benchmark settings and their command-line overrides.

use log::LevelFilter;
use thiserror::Error;

const TREE_SIZE: usize = 100_000;
const LOOKUPS: usize = 10_000_000;
const SEED: u64 = 54783;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Number of distinct keys loaded into each tree.
    pub tree_size: usize,
    /// Number of random lookups timed per implementation.
    pub lookups: usize,
    pub seed: u64,
    pub log_level: LevelFilter,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            tree_size: TREE_SIZE,
            lookups: LOOKUPS,
            seed: SEED,
            log_level: LevelFilter::Info,
        }
    }
}

impl BenchConfig {
    /// Parses `--size N --lookups N --seed N --log-level LEVEL` on top of the
    /// defaults. `args` excludes the program name.
    pub fn from_args<I>(args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = BenchConfig::default();
        let mut args = args.into_iter();
        while let Some(flag) = args.next() {
            let value = match flag.as_str() {
                "--size" | "--lookups" | "--seed" | "--log-level" => args
                    .next()
                    .ok_or_else(|| ConfigError::MissingValue(flag.clone()))?,
                _ => return Err(ConfigError::UnknownFlag(flag)),
            };
            let invalid = || ConfigError::InvalidValue {
                flag: flag.clone(),
                value: value.clone(),
            };
            match flag.as_str() {
                "--size" => config.tree_size = value.parse().map_err(|_| invalid())?,
                "--lookups" => config.lookups = value.parse().map_err(|_| invalid())?,
                "--seed" => config.seed = value.parse().map_err(|_| invalid())?,
                _ => config.log_level = value.parse().map_err(|_| invalid())?,
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<BenchConfig, ConfigError> {
        BenchConfig::from_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn no_flags_gives_defaults() {
        assert_eq!(parse(&[]).unwrap(), BenchConfig::default());
    }

    #[test]
    fn flags_override_defaults() {
        let config = parse(&["--size", "500", "--seed", "7", "--log-level", "trace"]).unwrap();
        assert_eq!(config.tree_size, 500);
        assert_eq!(config.seed, 7);
        assert_eq!(config.lookups, LOOKUPS);
        assert_eq!(config.log_level, LevelFilter::Trace);
    }

    #[test]
    fn bad_input_is_rejected() {
        assert_eq!(
            parse(&["--verbose"]),
            Err(ConfigError::UnknownFlag("--verbose".to_string()))
        );
        assert_eq!(
            parse(&["--size"]),
            Err(ConfigError::MissingValue("--size".to_string()))
        );
        assert_eq!(
            parse(&["--lookups", "many"]),
            Err(ConfigError::InvalidValue {
                flag: "--lookups".to_string(),
                value: "many".to_string(),
            })
        );
    }
}
