use serde::{Deserialize, Serialize};

use crate::angles::{normalize_azimuth, shortest_delta, wrap_longitude};
use crate::error::{Error, Result};
use crate::orbit::{check_time, GeometrySample, GroundStation, Propagator, SubPoint};

pub const MEAN_EARTH_RADIUS_KM: f64 = 6371.0;
/// Flattened-Earth scale used to turn degree deltas into ground distance.
pub const KM_PER_DEGREE: f64 = 111.0;

fn default_earth_radius() -> f64 {
    MEAN_EARTH_RADIUS_KM
}

/// Circular, equatorial orbit parameterization for the simplified model.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct CircularOrbit {
    pub altitude_km: f64,
    pub velocity_km_s: f64,
    #[serde(default = "default_earth_radius")]
    pub earth_radius_km: f64,
    /// Sub-satellite longitude at t = 0.
    #[serde(default)]
    pub start_longitude_deg: f64,
}

impl CircularOrbit {
    pub fn new(altitude_km: f64, velocity_km_s: f64) -> Self {
        Self {
            altitude_km,
            velocity_km_s,
            earth_radius_km: MEAN_EARTH_RADIUS_KM,
            start_longitude_deg: 0.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.altitude_km > 0.0) || !self.altitude_km.is_finite() {
            return Err(Error::config(format!(
                "circular orbit altitude {} km must be > 0",
                self.altitude_km
            )));
        }
        if !(self.velocity_km_s >= 0.0) || !self.velocity_km_s.is_finite() {
            return Err(Error::config(format!(
                "circular orbit velocity {} km/s must be >= 0",
                self.velocity_km_s
            )));
        }
        if !(self.earth_radius_km > 0.0) || !self.earth_radius_km.is_finite() {
            return Err(Error::config(format!(
                "earth radius {} km must be > 0",
                self.earth_radius_km
            )));
        }
        if !self.start_longitude_deg.is_finite() {
            return Err(Error::config("start longitude must be finite"));
        }
        Ok(())
    }

    pub fn orbital_radius_km(&self) -> f64 {
        self.earth_radius_km + self.altitude_km
    }
}

/// Linear-in-time circular propagation with flattened-Earth look angles.
#[derive(Debug, Clone)]
pub struct CircularPropagator {
    station: GroundStation,
    orbit: CircularOrbit,
    angular_velocity_rad_s: f64,
}

impl CircularPropagator {
    pub fn new(station: GroundStation, orbit: CircularOrbit) -> Result<Self> {
        station.validate()?;
        orbit.validate()?;
        Ok(Self {
            station,
            orbit,
            angular_velocity_rad_s: orbit.velocity_km_s / orbit.orbital_radius_km(),
        })
    }

    pub fn angular_velocity_rad_s(&self) -> f64 {
        self.angular_velocity_rad_s
    }
}

impl Propagator for CircularPropagator {
    fn position_at(&self, time_sec: f64) -> Result<GeometrySample> {
        check_time(time_sec)?;

        let swept_deg = (self.angular_velocity_rad_s * time_sec).to_degrees();
        let sat_lat = 0.0;
        let sat_lon = wrap_longitude(self.orbit.start_longitude_deg + swept_deg);

        let lat_delta = sat_lat - self.station.latitude_deg;
        let lon_delta = shortest_delta(sat_lon - self.station.longitude_deg);
        let north_km = lat_delta * KM_PER_DEGREE;
        let east_km = lon_delta * KM_PER_DEGREE;
        let altitude_km = self.orbit.altitude_km;

        let range_km = (north_km * north_km + east_km * east_km + altitude_km * altitude_km).sqrt();
        let azimuth_deg = normalize_azimuth(east_km.atan2(north_km).to_degrees());
        let elevation_deg = (altitude_km / range_km).asin().to_degrees();

        // d(range)/dt with latitude fixed; only the east component moves.
        let east_rate_km_s = self.angular_velocity_rad_s.to_degrees() * KM_PER_DEGREE;
        // `+ 0.0` folds a -0.0 product into +0.0 when the satellite is at rest.
        let range_rate_km_s = east_km * east_rate_km_s / range_km + 0.0;

        Ok(GeometrySample {
            azimuth_deg,
            elevation_deg,
            range_km,
            range_rate_km_s,
            subpoint: SubPoint {
                latitude_deg: sat_lat,
                longitude_deg: sat_lon,
                altitude_km,
            },
        })
    }

    fn describe(&self) -> String {
        format!(
            "circular orbit at {} km, {} km/s",
            self.orbit.altitude_km, self.orbit.velocity_km_s
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn san_francisco() -> GroundStation {
        GroundStation::new(37.7749, -122.4194, 10.0).unwrap()
    }

    #[test]
    fn position_is_deterministic() {
        let prop = CircularPropagator::new(san_francisco(), CircularOrbit::new(500.0, 7.8)).unwrap();
        for t in [0.0, 1.0, 123.456, 600.0] {
            let a = prop.position_at(t).unwrap();
            let b = prop.position_at(t).unwrap();
            assert_eq!(a.range_km.to_bits(), b.range_km.to_bits());
            assert_eq!(a.azimuth_deg.to_bits(), b.azimuth_deg.to_bits());
            assert_eq!(a.elevation_deg.to_bits(), b.elevation_deg.to_bits());
            assert_eq!(a.range_rate_km_s.to_bits(), b.range_rate_km_s.to_bits());
        }
    }

    #[test]
    fn angular_velocity_follows_orbital_radius() {
        let prop = CircularPropagator::new(san_francisco(), CircularOrbit::new(500.0, 7.8)).unwrap();
        assert!((prop.angular_velocity_rad_s() - 7.8 / 6871.0).abs() < 1e-15);
        let s = prop.position_at(100.0).unwrap();
        let expected_lon = (7.8 / 6871.0 * 100.0_f64).to_degrees();
        assert!((s.subpoint.longitude_deg - expected_lon).abs() < 1e-9);
        assert_eq!(s.subpoint.latitude_deg, 0.0);
    }

    #[test]
    fn range_uses_flattened_earth() {
        let prop = CircularPropagator::new(san_francisco(), CircularOrbit::new(500.0, 7.8)).unwrap();
        let s = prop.position_at(0.0).unwrap();
        let north = -37.7749 * 111.0;
        let east = 122.4194 * 111.0;
        let expected = (north * north + east * east + 500.0 * 500.0_f64).sqrt();
        assert!((s.range_km - expected).abs() < 1e-9);
        assert!((s.elevation_deg - (500.0 / expected).asin().to_degrees()).abs() < 1e-12);
        assert!(s.visible());
        // Station is north-west of the subpoint: the satellite lies to the south-east.
        assert!(s.azimuth_deg > 90.0 && s.azimuth_deg < 180.0);
    }

    #[test]
    fn range_rate_matches_finite_difference() {
        let prop = CircularPropagator::new(san_francisco(), CircularOrbit::new(500.0, 7.8)).unwrap();
        let h = 1e-3;
        let before = prop.position_at(300.0 - h).unwrap().range_km;
        let after = prop.position_at(300.0 + h).unwrap().range_km;
        let numeric = (after - before) / (2.0 * h);
        let analytic = prop.position_at(300.0).unwrap().range_rate_km_s;
        assert!((numeric - analytic).abs() < 1e-6, "{} vs {}", numeric, analytic);
        assert!(analytic > 0.0);
    }

    #[test]
    fn stationary_satellite_has_exactly_zero_range_rate() {
        let station = GroundStation::new(10.0, 20.0, 0.0).unwrap();
        let prop = CircularPropagator::new(station, CircularOrbit::new(500.0, 0.0)).unwrap();
        let s = prop.position_at(42.0).unwrap();
        assert_eq!(s.range_rate_km_s, 0.0);
        assert!(s.range_rate_km_s.is_sign_positive());
    }

    #[test]
    fn rejects_invalid_orbit() {
        let station = san_francisco();
        assert!(matches!(
            CircularPropagator::new(station, CircularOrbit::new(0.0, 7.8)),
            Err(Error::Configuration(_))
        ));
        assert!(matches!(
            CircularPropagator::new(station, CircularOrbit::new(500.0, -1.0)),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn negative_time_is_a_domain_error() {
        let prop = CircularPropagator::new(san_francisco(), CircularOrbit::new(500.0, 7.8)).unwrap();
        assert!(matches!(prop.position_at(-1.0), Err(Error::Domain(_))));
    }
}
