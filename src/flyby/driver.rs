use thiserror::Error;

use crate::error::{Error, Result};
use crate::flyby::cancel::CancelToken;
use crate::flyby::record::FlybyRecord;
use crate::orbit::{GeometrySample, Propagator};
use crate::signal::{LinkModel, LinkModelConfig};
use crate::tracking::{AntennaConfig, AntennaController, Pointing};

/// Absorbs float noise when the duration is an exact multiple of the step.
const GRID_EPSILON: f64 = 1e-9;

/// Largest grid a run accepts.
pub const MAX_STEPS: usize = 100_000_000;

/// Upper bound on the up-front allocation in `collect_timeline`.
const PREALLOC_RECORDS: usize = 1 << 16;

/// A run that stopped on an error, with the records produced before it.
#[derive(Debug, Error)]
#[error("flyby aborted after {} records: {}", .records.len(), .error)]
pub struct RunFailure {
    pub records: Vec<FlybyRecord>,
    #[source]
    pub error: Error,
}

/// Orchestrates propagation, link budget and tracking over a time grid.
pub struct FlybyDriver<P = Box<dyn Propagator>> {
    propagator: P,
    link: LinkModelConfig,
    antenna: AntennaConfig,
}

impl<P: Propagator> FlybyDriver<P> {
    pub fn new(propagator: P, link: LinkModelConfig, antenna: AntennaConfig) -> Result<Self> {
        link.validate()?;
        antenna.validate()?;
        Ok(Self {
            propagator,
            link,
            antenna,
        })
    }

    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    pub fn link_config(&self) -> &LinkModelConfig {
        &self.link
    }

    pub fn antenna_config(&self) -> &AntennaConfig {
        &self.antenna
    }

    /// Starts a lazy run over `t = 0, step, 2*step, ... <= duration`.
    ///
    /// Every call builds fresh tracking state and a fresh noise RNG, so two
    /// runs over the same seeded configuration yield identical records.
    pub fn simulate(&self, duration_sec: f64, time_step_sec: f64) -> Result<FlybyRun<'_, P>> {
        self.simulate_with_cancel(duration_sec, time_step_sec, CancelToken::new())
    }

    pub fn simulate_with_cancel(
        &self,
        duration_sec: f64,
        time_step_sec: f64,
        cancel: CancelToken,
    ) -> Result<FlybyRun<'_, P>> {
        let steps = grid_steps(duration_sec, time_step_sec)?;
        log::info!(
            "simulating {} s in {} steps of {} s over {}",
            duration_sec,
            steps,
            time_step_sec,
            self.propagator.describe()
        );

        Ok(FlybyRun {
            driver: self,
            link: LinkModel::new(self.link)?,
            antenna: AntennaController::new(self.antenna)?,
            duration_sec,
            time_step_sec,
            steps,
            next: 0,
            cancel,
            finished: false,
            was_visible: None,
        })
    }

    /// Runs to completion, keeping the partial timeline if a step fails.
    pub fn run(
        &self,
        duration_sec: f64,
        time_step_sec: f64,
    ) -> std::result::Result<Vec<FlybyRecord>, RunFailure> {
        self.simulate(duration_sec, time_step_sec)
            .map_err(|error| RunFailure {
                records: Vec::new(),
                error,
            })?
            .collect_timeline()
    }
}

pub(crate) fn validate_grid(duration_sec: f64, time_step_sec: f64) -> Result<()> {
    grid_steps(duration_sec, time_step_sec).map(|_| ())
}

/// Number of grid points for a positive duration and step.
fn grid_steps(duration_sec: f64, time_step_sec: f64) -> Result<usize> {
    if !(duration_sec > 0.0) || !duration_sec.is_finite() {
        return Err(Error::config(format!(
            "duration must be > 0, got {} s",
            duration_sec
        )));
    }
    if !(time_step_sec > 0.0) || !time_step_sec.is_finite() {
        return Err(Error::config(format!(
            "time step must be > 0, got {} s",
            time_step_sec
        )));
    }
    let count = (duration_sec / time_step_sec + GRID_EPSILON).floor() + 1.0;
    if !(count <= MAX_STEPS as f64) {
        return Err(Error::config(format!(
            "{} s in steps of {} s exceeds the limit of {} grid points",
            duration_sec, time_step_sec, MAX_STEPS
        )));
    }
    Ok(count as usize)
}

/// Iterator over the records of one flyby run.
///
/// Yields at most one `Err`, after which it is exhausted.
pub struct FlybyRun<'a, P> {
    driver: &'a FlybyDriver<P>,
    link: LinkModel,
    antenna: AntennaController,
    duration_sec: f64,
    time_step_sec: f64,
    steps: usize,
    next: usize,
    cancel: CancelToken,
    finished: bool,
    was_visible: Option<bool>,
}

impl<P: Propagator> FlybyRun<'_, P> {
    pub fn total_steps(&self) -> usize {
        self.steps
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn collect_timeline(self) -> std::result::Result<Vec<FlybyRecord>, RunFailure> {
        let mut records = Vec::with_capacity(self.steps.min(PREALLOC_RECORDS));
        for item in self {
            match item {
                Ok(record) => records.push(record),
                Err(error) => return Err(RunFailure { records, error }),
            }
        }
        Ok(records)
    }

    fn time_at(&self, index: usize) -> f64 {
        (index as f64 * self.time_step_sec).min(self.duration_sec)
    }

    fn compute(&mut self, time_sec: f64) -> Result<FlybyRecord> {
        let geometry = self.driver.propagator.position_at(time_sec)?;
        let dt_sec = if self.next == 0 {
            0.0
        } else {
            time_sec - self.time_at(self.next - 1)
        };

        let visible = geometry.visible();
        self.log_visibility(time_sec, &geometry);

        if visible {
            let signal = self.link.evaluate(&geometry)?;
            let tracking =
                self.antenna
                    .step(geometry.azimuth_deg, geometry.elevation_deg, dt_sec)?;
            Ok(FlybyRecord {
                time_sec,
                geometry,
                signal: Some(signal),
                tracking: Some(tracking),
                antenna: Pointing::new(tracking.azimuth_deg, tracking.elevation_deg),
            })
        } else {
            let last_target = Pointing::new(geometry.azimuth_deg, geometry.elevation_deg);
            let antenna = self.antenna.park(dt_sec, last_target)?;
            Ok(FlybyRecord {
                time_sec,
                geometry,
                signal: None,
                tracking: None,
                antenna,
            })
        }
    }

    fn log_visibility(&mut self, time_sec: f64, geometry: &GeometrySample) {
        let visible = geometry.visible();
        match self.was_visible {
            Some(false) if visible => log::debug!(
                "AOS at t={} s, azimuth {:.2} deg",
                time_sec,
                geometry.azimuth_deg
            ),
            Some(true) if !visible => log::debug!(
                "LOS at t={} s, azimuth {:.2} deg",
                time_sec,
                geometry.azimuth_deg
            ),
            _ => {}
        }
        self.was_visible = Some(visible);
    }
}

impl<P: Propagator> Iterator for FlybyRun<'_, P> {
    type Item = Result<FlybyRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.next >= self.steps {
            return None;
        }
        if self.cancel.is_cancelled() {
            log::info!("flyby cancelled after {} records", self.next);
            self.finished = true;
            return None;
        }

        let time_sec = self.time_at(self.next);
        match self.compute(time_sec) {
            Ok(record) => {
                self.next += 1;
                if self.next == self.steps {
                    log::info!("flyby complete: {} records", self.steps);
                }
                Some(Ok(record))
            }
            Err(e) => {
                log::warn!("flyby aborted at t={} s: {}", time_sec, e);
                self.finished = true;
                Some(Err(e))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.finished {
            (0, Some(0))
        } else {
            (0, Some(self.steps - self.next))
        }
    }
}
