mod circular;
pub mod frames;
mod ground_station;
mod sgp;
pub mod tle;
mod types;

use serde::Deserialize;

pub use circular::{CircularOrbit, CircularPropagator, KM_PER_DEGREE, MEAN_EARTH_RADIUS_KM};
pub use ground_station::{GroundStation, EARTH_ROTATION_RAD_S};
pub use sgp::{SgpPropagator, TleOrbit, DEFAULT_VALIDITY_HOURS};
pub use types::{GeometrySample, SubPoint, HORIZON_ELEVATION_DEG};

use crate::error::{Error, Result};

/// Satellite position relative to the ground station as a function of time.
///
/// Implementations are pure in `time_sec` for a fixed configuration; they may
/// cache derived constants but never mutate between queries.
pub trait Propagator: Send + Sync {
    fn position_at(&self, time_sec: f64) -> Result<GeometrySample>;

    /// Short human-readable label used in log lines.
    fn describe(&self) -> String;
}

impl<P: Propagator + ?Sized> Propagator for Box<P> {
    fn position_at(&self, time_sec: f64) -> Result<GeometrySample> {
        (**self).position_at(time_sec)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum OrbitConfig {
    Circular(CircularOrbit),
    Tle(TleOrbit),
}

/// Picks the propagation variant for a configuration.
pub fn build_propagator(station: GroundStation, orbit: &OrbitConfig) -> Result<Box<dyn Propagator>> {
    match orbit {
        OrbitConfig::Circular(params) => Ok(Box::new(CircularPropagator::new(station, *params)?)),
        OrbitConfig::Tle(source) => Ok(Box::new(SgpPropagator::new(station, source)?)),
    }
}

pub(crate) fn check_time(time_sec: f64) -> Result<()> {
    if time_sec >= 0.0 && time_sec.is_finite() {
        Ok(())
    } else {
        Err(Error::domain(format!(
            "simulation time must be finite and >= 0, got {}",
            time_sec
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factory_selects_variant_from_model_tag() {
        let station = GroundStation::default();
        let circular: OrbitConfig =
            serde_yaml::from_str("model: circular\naltitude_km: 500\nvelocity_km_s: 7.8\n").unwrap();
        let prop = build_propagator(station, &circular).unwrap();
        assert!(prop.describe().starts_with("circular"));

        let tle: OrbitConfig = serde_yaml::from_str(&format!(
            "model: tle\ntle: |\n{}\n",
            tle::ISS_TLE
                .lines()
                .map(|l| format!("  {}", l))
                .collect::<Vec<_>>()
                .join("\n")
        ))
        .unwrap();
        let prop = build_propagator(station, &tle).unwrap();
        assert!(prop.describe().starts_with("SGP4"));
    }

    #[test]
    fn factory_surfaces_configuration_errors() {
        let station = GroundStation::default();
        let orbit: OrbitConfig = serde_yaml::from_str("model: tle\n").unwrap();
        assert!(matches!(
            build_propagator(station, &orbit),
            Err(Error::Configuration(_))
        ));
    }
}
