//! Locator configuration.
//!
//! Loaded from JSON (always) or TOML (`toml` feature). Every field has a
//! default, so an empty document is a valid configuration.

use crate::error::{LocatorError, Result};
use crate::index::grid::{DEFAULT_CELL_SIZE, validate_cell_size};
use crate::index::{Pruning, Strategy};
use crate::record::Coordinate;
use serde::de::Error;
use std::path::PathBuf;

/// Environment variable that overrides the default data file location.
pub const DATA_PATH_ENV: &str = "VEHICLE_POSITIONS_PATH";

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_FILE: &str = "VehiclePositions.dat";

/// Query set used when none is configured.
pub const DEFAULT_QUERIES: [(f32, f32); 10] = [
    (34.544909, -102.100843),
    (32.345544, -99.123124),
    (33.234235, -100.214124),
    (35.195739, -95.348899),
    (31.895839, -97.789573),
    (32.895839, -101.789573),
    (34.115839, -100.225732),
    (32.335839, -99.992232),
    (33.535339, -94.792232),
    (32.234235, -100.222222),
];

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "Config::default_data_path")]
    pub data_path: PathBuf,

    #[serde(default)]
    pub strategy: Strategy,

    /// Grid cell size in degrees; only used by [`Strategy::Grid`].
    #[serde(default = "Config::default_cell_size")]
    pub cell_size: f32,

    /// Far-side pruning rule; only used by [`Strategy::KdTree`].
    #[serde(default)]
    pub pruning: Pruning,

    #[serde(default = "Config::default_queries")]
    pub queries: Vec<Coordinate>,
}

impl Config {
    fn default_data_path() -> PathBuf {
        PathBuf::from(DEFAULT_DATA_FILE)
    }

    const fn default_cell_size() -> f32 {
        DEFAULT_CELL_SIZE
    }

    fn default_queries() -> Vec<Coordinate> {
        DEFAULT_QUERIES.iter().copied().map(Coordinate::from).collect()
    }

    pub fn with_data_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.data_path = path.into();
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = cell_size;
        self
    }

    pub fn with_pruning(mut self, pruning: Pruning) -> Self {
        self.pruning = pruning;
        self
    }

    pub fn with_queries<I>(mut self, queries: I) -> Self
    where
        I: IntoIterator<Item = Coordinate>,
    {
        self.queries = queries.into_iter().collect();
        self
    }

    /// Replace `data_path` with the value of [`DATA_PATH_ENV`] when it is set and non-empty.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(path) = std::env::var(DATA_PATH_ENV)
            && !path.is_empty()
        {
            log::debug!("Using data path from {DATA_PATH_ENV}: {path}");
            self.data_path = PathBuf::from(path);
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_cell_size(self.cell_size)?;

        if self.data_path.as_os_str().is_empty() {
            return Err(LocatorError::InvalidConfig(
                "data path must not be empty".to_string(),
            ));
        }

        if let Some(bad) = self.queries.iter().find(|q| !q.is_finite()) {
            return Err(LocatorError::InvalidConfig(format!(
                "query coordinate ({}, {}) is not finite",
                bad.latitude, bad.longitude
            )));
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml(toml_str: &str) -> std::result::Result<Self, toml::de::Error> {
        let config: Config = toml::from_str(toml_str)?;
        if let Err(e) = config.validate() {
            return Err(toml::de::Error::custom(e));
        }
        Ok(config)
    }

    #[cfg(feature = "toml")]
    pub fn to_toml(&self) -> std::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Load from a `.json` or (with the `toml` feature) `.toml` file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            #[cfg(feature = "toml")]
            Some("toml") => {
                Self::from_toml(&text).map_err(|e| LocatorError::InvalidConfig(e.to_string()))
            }
            _ => Self::from_json(&text).map_err(|e| LocatorError::InvalidConfig(e.to_string())),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: Self::default_data_path(),
            strategy: Strategy::default(),
            cell_size: Self::default_cell_size(),
            pruning: Pruning::default(),
            queries: Self::default_queries(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data_path, PathBuf::from("VehiclePositions.dat"));
        assert_eq!(config.strategy, Strategy::KdTree);
        assert_eq!(config.pruning, Pruning::Planar);
        assert_eq!(config.cell_size, 0.1);
        assert_eq!(config.queries.len(), 10);
        assert_eq!(config.queries[0], Coordinate::new(34.544909, -102.100843));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = Config::from_json("{}").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_json_round_trip() {
        let config = Config::default()
            .with_strategy(Strategy::Grid)
            .with_cell_size(0.25)
            .with_pruning(Pruning::GreatCircle)
            .with_queries([Coordinate::new(1.0, 2.0)]);
        let json = config.to_json().unwrap();
        assert_eq!(Config::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_json_field_names() {
        let config = Config::from_json(
            r#"{"strategy": "grid", "cell_size": 0.5, "pruning": "great_circle",
                "queries": [{"latitude": 1.0, "longitude": 2.0}]}"#,
        )
        .unwrap();
        assert_eq!(config.strategy, Strategy::Grid);
        assert_eq!(config.cell_size, 0.5);
        assert_eq!(config.pruning, Pruning::GreatCircle);
        assert_eq!(config.queries, vec![Coordinate::new(1.0, 2.0)]);
    }

    #[test]
    fn test_rejects_unknown_fields() {
        assert!(Config::from_json(r#"{"cellsize": 1.0}"#).is_err());
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        assert!(Config::from_json(r#"{"cell_size": 0.0}"#).is_err());
        assert!(Config::default().with_cell_size(-2.0).validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_query() {
        let config = Config::default().with_queries([Coordinate::new(f32::NAN, 0.0)]);
        assert!(matches!(
            config.validate(),
            Err(LocatorError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locator.json");
        std::fs::write(&path, r#"{"data_path": "/data/positions.dat"}"#).unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.data_path, PathBuf::from("/data/positions.dat"));
    }

    #[cfg(feature = "toml")]
    #[test]
    fn test_toml_round_trip() {
        let config = Config::default().with_strategy(Strategy::Linear);
        let text = config.to_toml().unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), config);
    }
}
