use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::enums::OrphanPolicy;

/// Application-level constants
pub const APP_NAME: &str = "AnalyzerSim";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Database file name inside the data directory.
pub const DATABASE_FILE: &str = "analyzersim.db";

pub const DEFAULT_TICK_MS: u64 = 1000;

pub const ENV_DATABASE: &str = "ANALYZER_SIM_DB";
pub const ENV_TICK_MS: &str = "ANALYZER_SIM_TICK_MS";
pub const ENV_SEED: &str = "ANALYZER_SIM_SEED";
pub const ENV_ORPHAN_POLICY: &str = "ANALYZER_SIM_ORPHAN_POLICY";

/// Get the application data directory
/// ~/AnalyzerSim/, or the working directory when no home is known
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Default database location
pub fn database_path() -> PathBuf {
    app_data_dir().join(DATABASE_FILE)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,analyzer_sim_lib=debug"
}

/// Runtime settings, read from the environment with defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    pub database_path: PathBuf,
    /// Host timer period between scheduler ticks.
    pub tick_interval: Duration,
    /// Fixed seed for result synthesis; `None` seeds from entropy.
    pub rng_seed: Option<u64>,
    pub orphan_policy: OrphanPolicy,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            database_path: database_path(),
            tick_interval: Duration::from_millis(DEFAULT_TICK_MS),
            rng_seed: None,
            orphan_policy: OrphanPolicy::default(),
        }
    }
}

impl SimulatorConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = lookup(ENV_DATABASE).filter(|p| !p.trim().is_empty()) {
            config.database_path = PathBuf::from(path.trim());
        }
        if let Some(ms) = parse_var::<u64>(&lookup, ENV_TICK_MS) {
            if ms == 0 {
                tracing::warn!(key = ENV_TICK_MS, "Tick interval must be positive; using default");
            } else {
                config.tick_interval = Duration::from_millis(ms);
            }
        }
        if let Some(seed) = parse_var::<u64>(&lookup, ENV_SEED) {
            config.rng_seed = Some(seed);
        }
        if let Some(policy) = parse_var::<OrphanPolicy>(&lookup, ENV_ORPHAN_POLICY) {
            config.orphan_policy = policy;
        }

        config
    }
}

fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring invalid configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn app_data_dir_ends_with_app_name() {
        assert!(app_data_dir().ends_with("AnalyzerSim"));
    }

    #[test]
    fn database_under_app_data() {
        let db = database_path();
        assert!(db.starts_with(app_data_dir()));
        assert!(db.ends_with("analyzersim.db"));
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(SimulatorConfig::from_lookup(lookup(&[])), SimulatorConfig::default());
    }

    #[test]
    fn environment_overrides() {
        let config = SimulatorConfig::from_lookup(lookup(&[
            (ENV_DATABASE, "/tmp/sim.db"),
            (ENV_TICK_MS, "250"),
            (ENV_SEED, "42"),
            (ENV_ORPHAN_POLICY, "purge"),
        ]));
        assert_eq!(config.database_path, PathBuf::from("/tmp/sim.db"));
        assert_eq!(config.tick_interval, Duration::from_millis(250));
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.orphan_policy, OrphanPolicy::Purge);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = SimulatorConfig::from_lookup(lookup(&[
            (ENV_TICK_MS, "0"),
            (ENV_SEED, "lucky"),
            (ENV_ORPHAN_POLICY, "shred"),
        ]));
        assert_eq!(config, SimulatorConfig::default());
    }
}
