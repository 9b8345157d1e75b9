use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_threshold_deg() -> f64 {
    10.0
}

fn default_db_per_km() -> f64 {
    0.1
}

/// Extra slant-path attenuation applied only close to the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct AtmosphereConfig {
    #[serde(default = "default_threshold_deg")]
    pub threshold_deg: f64,
    #[serde(default = "default_db_per_km")]
    pub db_per_km: f64,
}

impl Default for AtmosphereConfig {
    fn default() -> Self {
        Self {
            threshold_deg: default_threshold_deg(),
            db_per_km: default_db_per_km(),
        }
    }
}

impl AtmosphereConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.threshold_deg.is_finite() {
            return Err(Error::config("atmosphere threshold_deg must be finite"));
        }
        if !(self.db_per_km >= 0.0) || !self.db_per_km.is_finite() {
            return Err(Error::config(format!(
                "atmosphere db_per_km must be >= 0, got {}",
                self.db_per_km
            )));
        }
        Ok(())
    }

    pub fn loss_db(&self, elevation_deg: f64, range_km: f64) -> f64 {
        if elevation_deg < self.threshold_deg {
            self.db_per_km * range_km
        } else {
            0.0
        }
    }
}
