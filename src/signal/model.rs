use serde::Deserialize;

use crate::error::Result;
use crate::orbit::GeometrySample;
use crate::signal::atmosphere::AtmosphereConfig;
use crate::signal::budget::{evaluate_link, RadioConfig, SignalSample};
use crate::signal::noise::{NoiseConfig, NoiseSource};

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct LinkModelConfig {
    pub radio: RadioConfig,
    #[serde(default)]
    pub atmosphere: Option<AtmosphereConfig>,
    #[serde(default)]
    pub noise: NoiseConfig,
}

impl LinkModelConfig {
    pub fn new(radio: RadioConfig) -> Self {
        Self {
            radio,
            atmosphere: None,
            noise: NoiseConfig::disabled(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.radio.validate()?;
        if let Some(atmosphere) = &self.atmosphere {
            atmosphere.validate()?;
        }
        self.noise.validate()
    }
}

/// Link budget with elevation-dependent attenuation and noise injection.
///
/// Holds the noise RNG, so one instance belongs to one simulation run.
pub struct LinkModel {
    config: LinkModelConfig,
    noise: NoiseSource,
}

impl LinkModel {
    pub fn new(config: LinkModelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            noise: NoiseSource::new(&config.noise)?,
            config,
        })
    }

    pub fn radio(&self) -> &RadioConfig {
        &self.config.radio
    }

    /// Evaluates the link for a line-of-sight geometry.
    ///
    /// Callers must not pass below-horizon geometry; there is no link to model.
    pub fn evaluate(&mut self, geometry: &GeometrySample) -> Result<SignalSample> {
        let extra_atmospheric_loss_db = self
            .config
            .atmosphere
            .map(|atm| atm.loss_db(geometry.elevation_deg, geometry.range_km))
            .unwrap_or(0.0);
        let noise_offset_db = self.noise.sample_db();
        evaluate_link(
            geometry.range_km,
            geometry.range_rate_km_s,
            &self.config.radio,
            extra_atmospheric_loss_db,
            noise_offset_db,
        )
    }
}
