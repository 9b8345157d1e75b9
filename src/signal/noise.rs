use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Zero-mean Gaussian perturbation of the noise floor, in dB.
///
/// `std_dev_db = 0` turns injection off and never touches the RNG.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub std_dev_db: f64,
    /// Without a seed every run draws from OS entropy and is not reproducible.
    pub seed: Option<u64>,
}

impl NoiseConfig {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn gaussian(std_dev_db: f64, seed: u64) -> Self {
        Self {
            std_dev_db,
            seed: Some(seed),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.std_dev_db >= 0.0) || !self.std_dev_db.is_finite() {
            return Err(Error::config(format!(
                "noise std_dev_db must be >= 0, got {}",
                self.std_dev_db
            )));
        }
        Ok(())
    }
}

pub struct NoiseSource {
    dist: Option<Normal<f64>>,
    rng: StdRng,
}

impl NoiseSource {
    pub fn new(config: &NoiseConfig) -> Result<Self> {
        config.validate()?;
        let dist = if config.std_dev_db > 0.0 {
            Some(
                Normal::new(0.0, config.std_dev_db)
                    .map_err(|e| Error::config(format!("noise distribution: {}", e)))?,
            )
        } else {
            None
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self { dist, rng })
    }

    pub fn sample_db(&mut self) -> f64 {
        match &self.dist {
            Some(dist) => dist.sample(&mut self.rng),
            None => 0.0,
        }
    }
}
