use crate::angles::{normalize_azimuth, shortest_delta};
use crate::error::{Error, Result};
use crate::tracking::types::{AntennaConfig, LockState, Pointing, TrackingSample};

/// Slew-limited antenna mount with beam-lock detection.
///
/// Owns the only state carried between time steps. One controller serves one
/// simulation run.
#[derive(Debug, Clone)]
pub struct AntennaController {
    config: AntennaConfig,
    pointing: Option<Pointing>,
    lock: LockState,
}

impl AntennaController {
    pub fn new(config: AntennaConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pointing: config.start.map(normalize),
            lock: LockState::Unlocked,
        })
    }

    pub fn config(&self) -> &AntennaConfig {
        &self.config
    }

    /// Current mount pointing, `None` until the first step seeds it.
    pub fn pointing(&self) -> Option<Pointing> {
        self.pointing
    }

    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    /// Moves toward the target for `dt_sec` and reports the residual error.
    pub fn step(
        &mut self,
        target_azimuth_deg: f64,
        target_elevation_deg: f64,
        dt_sec: f64,
    ) -> Result<TrackingSample> {
        check_dt(dt_sec)?;
        if !target_azimuth_deg.is_finite() || !target_elevation_deg.is_finite() {
            return Err(Error::domain(format!(
                "target ({}, {}) is not finite",
                target_azimuth_deg, target_elevation_deg
            )));
        }
        let target = Pointing::new(normalize_azimuth(target_azimuth_deg), target_elevation_deg);

        let current = self.pointing.unwrap_or(target);
        let updated = slew(current, target, self.config.slew_rate_deg_s * dt_sec);
        self.pointing = Some(updated);

        let az_error = shortest_delta(target.azimuth_deg - updated.azimuth_deg);
        let el_error = target.elevation_deg - updated.elevation_deg;
        let rms = self.config.pointing_error_deg;
        let pointing_error_deg = (az_error * az_error + el_error * el_error + rms * rms).sqrt();

        let in_beam = pointing_error_deg < self.config.half_beamwidth_deg();
        self.set_lock(if in_beam {
            LockState::Locked
        } else {
            LockState::Unlocked
        });

        Ok(TrackingSample {
            azimuth_deg: updated.azimuth_deg,
            elevation_deg: updated.elevation_deg,
            pointing_error_deg,
            in_beam,
            lock: self.lock,
        })
    }

    /// Slews toward the park pointing while there is nothing to track.
    ///
    /// Without a configured park the mount holds still. `last_target` seeds
    /// the pointing if no step has happened yet.
    pub fn park(&mut self, dt_sec: f64, last_target: Pointing) -> Result<Pointing> {
        check_dt(dt_sec)?;
        let current = self.pointing.unwrap_or_else(|| normalize(last_target));
        let target = self.config.park.map(normalize).unwrap_or(current);
        let updated = slew(current, target, self.config.slew_rate_deg_s * dt_sec);
        self.pointing = Some(updated);
        self.set_lock(LockState::Unlocked);
        Ok(updated)
    }

    fn set_lock(&mut self, next: LockState) {
        if next != self.lock {
            log::debug!("antenna {} -> {}", self.lock, next);
            self.lock = next;
        }
    }
}

fn check_dt(dt_sec: f64) -> Result<()> {
    if dt_sec >= 0.0 && dt_sec.is_finite() {
        Ok(())
    } else {
        Err(Error::domain(format!(
            "time step must be finite and >= 0, got {}",
            dt_sec
        )))
    }
}

fn normalize(p: Pointing) -> Pointing {
    Pointing::new(
        normalize_azimuth(p.azimuth_deg),
        p.elevation_deg.clamp(-90.0, 90.0),
    )
}

/// Rate-limited move on each axis independently; azimuth takes the short way.
fn slew(current: Pointing, target: Pointing, max_delta_deg: f64) -> Pointing {
    let az_step = shortest_delta(target.azimuth_deg - current.azimuth_deg)
        .clamp(-max_delta_deg, max_delta_deg);
    let el_step = (target.elevation_deg - current.elevation_deg).clamp(-max_delta_deg, max_delta_deg);

    Pointing::new(
        normalize_azimuth(current.azimuth_deg + az_step),
        (current.elevation_deg + el_step).clamp(-90.0, 90.0),
    )
}
