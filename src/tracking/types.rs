use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Pointing {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
}

impl Pointing {
    pub fn new(azimuth_deg: f64, elevation_deg: f64) -> Self {
        Self {
            azimuth_deg,
            elevation_deg,
        }
    }
}

fn default_beamwidth() -> f64 {
    10.0
}

fn default_slew_rate() -> f64 {
    5.0
}

fn default_pointing_error() -> f64 {
    0.0
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AntennaConfig {
    #[serde(default = "default_beamwidth")]
    pub beamwidth_deg: f64,
    #[serde(default = "default_slew_rate")]
    pub slew_rate_deg_s: f64,
    /// RMS mechanical pointing error folded into every error figure.
    #[serde(default = "default_pointing_error")]
    pub pointing_error_deg: f64,
    /// Initial pointing; when absent the mount starts on the first target.
    #[serde(default)]
    pub start: Option<Pointing>,
    /// Where the mount slews while the satellite is below the horizon.
    /// When absent it holds its last pointing.
    #[serde(default)]
    pub park: Option<Pointing>,
}

impl Default for AntennaConfig {
    fn default() -> Self {
        Self {
            beamwidth_deg: default_beamwidth(),
            slew_rate_deg_s: default_slew_rate(),
            pointing_error_deg: default_pointing_error(),
            start: None,
            park: None,
        }
    }
}

impl AntennaConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.beamwidth_deg > 0.0) || !self.beamwidth_deg.is_finite() {
            return Err(Error::config(format!(
                "antenna beamwidth must be > 0, got {} deg",
                self.beamwidth_deg
            )));
        }
        if !(self.slew_rate_deg_s > 0.0) || !self.slew_rate_deg_s.is_finite() {
            return Err(Error::config(format!(
                "antenna slew rate must be > 0, got {} deg/s",
                self.slew_rate_deg_s
            )));
        }
        if !(self.pointing_error_deg >= 0.0) || !self.pointing_error_deg.is_finite() {
            return Err(Error::config(format!(
                "antenna pointing error must be >= 0, got {} deg",
                self.pointing_error_deg
            )));
        }
        for (name, pointing) in [("start", self.start), ("park", self.park)] {
            if let Some(p) = pointing {
                if !p.azimuth_deg.is_finite() || !(-90.0..=90.0).contains(&p.elevation_deg) {
                    return Err(Error::config(format!(
                        "antenna {} pointing ({}, {}) is invalid",
                        name, p.azimuth_deg, p.elevation_deg
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn half_beamwidth_deg(&self) -> f64 {
        self.beamwidth_deg / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LockState {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackingSample {
    /// Mount pointing after this step's motion.
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub pointing_error_deg: f64,
    pub in_beam: bool,
    pub lock: LockState,
}
