use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::error::Error;
use crate::flyby::{validate_grid, FlybyDriver};
use crate::orbit::{build_propagator, GroundStation, OrbitConfig};
use crate::signal::{AtmosphereConfig, LinkModelConfig, NoiseConfig, RadioConfig};
use crate::tracking::AntennaConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Invalid(#[from] Error),
}

/// Everything needed to simulate one flyby, as read from a YAML file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlybyConfig {
    pub ground_station: StationConfig,
    pub orbit: OrbitConfig,
    #[serde(default)]
    pub radio: RadioConfig,
    #[serde(default)]
    pub antenna: AntennaConfig,
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub atmosphere: Option<AtmosphereConfig>,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

/// Station location, either as explicit fields or a `"lat, lon"` string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum StationConfig {
    Coordinates {
        name: Option<String>,
        coordinates: String,
        #[serde(default, alias = "elevation_m")]
        altitude_m: Option<f64>,
    },
    Explicit(GroundStation),
}

impl StationConfig {
    pub fn station(&self) -> Result<GroundStation, Error> {
        match self {
            StationConfig::Coordinates {
                coordinates,
                altitude_m,
                ..
            } => GroundStation::from_coordinates(coordinates, *altitude_m),
            StationConfig::Explicit(station) => {
                station.validate()?;
                Ok(*station)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_duration")]
    pub duration_sec: f64,
    #[serde(default = "default_time_step")]
    pub time_step_sec: f64,
}

fn default_duration() -> f64 {
    600.0
}

fn default_time_step() -> f64 {
    1.0
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            duration_sec: default_duration(),
            time_step_sec: default_time_step(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), Error> {
        validate_grid(self.duration_sec, self.time_step_sec)
    }
}

impl FlybyConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: FlybyConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    pub fn link_config(&self) -> LinkModelConfig {
        LinkModelConfig {
            radio: self.radio,
            atmosphere: self.atmosphere,
            noise: self.noise,
        }
    }

    /// Checks every section, including the orbit source and the time grid.
    pub fn validate(&self) -> Result<(), Error> {
        self.build_driver()?;
        self.simulation.validate()
    }

    pub fn build_driver(&self) -> Result<FlybyDriver, Error> {
        let station = self.ground_station.station()?;
        let propagator = build_propagator(station, &self.orbit)?;
        FlybyDriver::new(propagator, self.link_config(), self.antenna)
    }
}
