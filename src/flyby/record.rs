use serde::Serialize;

use crate::orbit::GeometrySample;
use crate::signal::SignalSample;
use crate::tracking::{Pointing, TrackingSample};

/// Everything computed for one time step of the flyby.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FlybyRecord {
    pub time_sec: f64,
    pub geometry: GeometrySample,
    /// `None` while the satellite is below the horizon.
    pub signal: Option<SignalSample>,
    /// `None` while the satellite is below the horizon.
    pub tracking: Option<TrackingSample>,
    /// Mount pointing after this step, tracked or parked.
    pub antenna: Pointing,
}

impl FlybyRecord {
    pub fn visible(&self) -> bool {
        self.geometry.visible()
    }
}
