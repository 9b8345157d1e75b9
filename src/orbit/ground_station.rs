use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const EARTH_ROTATION_RAD_S: f64 = 7.292_115e-5;

// WGS-84
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.00669437999014;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    #[serde(default, alias = "altitude_m")]
    pub elevation_m: f64,
}

impl Default for GroundStation {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            elevation_m: 0.0,
        }
    }
}

impl GroundStation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Result<Self> {
        let station = Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
        };
        station.validate()?;
        Ok(station)
    }

    /// Parses `"lat, lon"` the way station coordinates are written in config files.
    pub fn from_coordinates(coordinates: &str, elevation_m: Option<f64>) -> Result<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() != 2 {
            return Err(Error::config(format!(
                "expected 'lat, lon' coordinates, got '{}'",
                coordinates
            )));
        }
        let parse = |s: &str| {
            s.parse::<f64>()
                .map_err(|e| Error::config(format!("invalid coordinate '{}': {}", s, e)))
        };
        Self::new(parse(parts[0])?, parse(parts[1])?, elevation_m.unwrap_or(0.0))
    }

    pub fn validate(&self) -> Result<()> {
        if !(-90.0..=90.0).contains(&self.latitude_deg) {
            return Err(Error::config(format!(
                "ground station latitude {} outside [-90, 90]",
                self.latitude_deg
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude_deg) {
            return Err(Error::config(format!(
                "ground station longitude {} outside [-180, 180]",
                self.longitude_deg
            )));
        }
        if !(self.elevation_m >= 0.0) || !self.elevation_m.is_finite() {
            return Err(Error::config(format!(
                "ground station elevation {} m must be >= 0",
                self.elevation_m
            )));
        }
        Ok(())
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.elevation_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - WGS84_E2) + alt_km) * sin_lat,
        ]
    }

    pub fn velocity_ecef_km_s(&self) -> [f64; 3] {
        let pos = self.position_ecef_km();
        [
            -EARTH_ROTATION_RAD_S * pos[1],
            EARTH_ROTATION_RAD_S * pos[0],
            0.0,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_coordinate_string() {
        let station = GroundStation::from_coordinates("37.7749, -122.4194", Some(10.0)).unwrap();
        assert_eq!(station.latitude_deg, 37.7749);
        assert_eq!(station.longitude_deg, -122.4194);
        assert_eq!(station.elevation_m, 10.0);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(matches!(
            GroundStation::new(91.0, 0.0, 0.0),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            GroundStation::new(0.0, -181.0, 0.0),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            GroundStation::new(0.0, 0.0, -1.0),
            Err(Error::Configuration(_))
        ));
        assert!(GroundStation::from_coordinates("north", None).is_err());
    }

    #[test]
    fn equator_station_sits_on_semi_major_axis() {
        let station = GroundStation::default();
        let [x, y, z] = station.position_ecef_km();
        assert!((x - WGS84_A_KM).abs() < 1e-9);
        assert!(y.abs() < 1e-9);
        assert!(z.abs() < 1e-9);
        let v = station.velocity_ecef_km_s();
        assert!((v[1] - EARTH_ROTATION_RAD_S * WGS84_A_KM).abs() < 1e-12);
    }
}
