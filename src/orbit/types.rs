use serde::Serialize;

pub const HORIZON_ELEVATION_DEG: f64 = 0.0;

/// Point on the Earth's surface directly below the satellite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubPoint {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

/// Station-relative look angles and range of the satellite at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeometrySample {
    pub azimuth_deg: f64,
    pub elevation_deg: f64,
    pub range_km: f64,
    /// Negative while the satellite closes on the station.
    pub range_rate_km_s: f64,
    pub subpoint: SubPoint,
}

impl GeometrySample {
    pub fn visible(&self) -> bool {
        self.elevation_deg >= HORIZON_ELEVATION_DEG
    }
}
