use std::path::PathBuf;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use sgp4::{Constants, Elements};

use crate::angles::normalize_azimuth;
use crate::error::{Error, Result};
use crate::orbit::frames::{
    dot, ecef_to_enu, ecef_to_geodetic, norm, sub, teme_to_ecef_position, teme_to_ecef_velocity,
};
use crate::orbit::tle::{parse_tle, read_tle_file, TleLines};
use crate::orbit::{check_time, GeometrySample, GroundStation, Propagator, SubPoint};

pub const DEFAULT_VALIDITY_HOURS: f64 = 72.0;

fn default_validity_hours() -> f64 {
    DEFAULT_VALIDITY_HOURS
}

/// Element-set source for the SGP4 propagator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TleOrbit {
    /// Inline 2- or 3-line element text.
    #[serde(default)]
    pub tle: Option<String>,
    #[serde(default)]
    pub tle_file: Option<PathBuf>,
    /// Instant mapped to t = 0; defaults to the element epoch.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Half-width of the window around the epoch in which elements are trusted.
    #[serde(default = "default_validity_hours")]
    pub validity_hours: f64,
}

impl TleOrbit {
    pub fn inline(tle: impl Into<String>) -> Self {
        Self {
            tle: Some(tle.into()),
            tle_file: None,
            start: None,
            validity_hours: DEFAULT_VALIDITY_HOURS,
        }
    }

    pub fn lines(&self) -> Result<TleLines> {
        match (&self.tle, &self.tle_file) {
            (Some(text), None) => parse_tle(text),
            (None, Some(path)) => read_tle_file(path),
            (Some(_), Some(_)) => Err(Error::config(
                "orbit specifies both 'tle' and 'tle_file'; pick one",
            )),
            (None, None) => Err(Error::config("orbit is missing 'tle' or 'tle_file'")),
        }
    }
}

/// SGP4 propagation of a two-line element set with topocentric look angles.
pub struct SgpPropagator {
    station: GroundStation,
    elements: Elements,
    constants: Constants,
    start: DateTime<Utc>,
    validity_minutes: f64,
}

impl SgpPropagator {
    pub fn new(station: GroundStation, orbit: &TleOrbit) -> Result<Self> {
        let lines = orbit.lines()?;
        Self::from_lines(station, &lines, orbit.start, orbit.validity_hours)
    }

    pub fn from_lines(
        station: GroundStation,
        lines: &TleLines,
        start: Option<DateTime<Utc>>,
        validity_hours: f64,
    ) -> Result<Self> {
        station.validate()?;
        if !(validity_hours > 0.0) || !validity_hours.is_finite() {
            return Err(Error::config(format!(
                "validity window {} h must be > 0",
                validity_hours
            )));
        }

        let elements = Elements::from_tle(
            lines.name.clone(),
            lines.line1.as_bytes(),
            lines.line2.as_bytes(),
        )?;
        let constants = Constants::from_elements(&elements)?;
        let start = start.unwrap_or_else(|| elements.datetime.and_utc());

        Ok(Self {
            station,
            elements,
            constants,
            start,
            validity_minutes: validity_hours * 60.0,
        })
    }

    pub fn epoch(&self) -> DateTime<Utc> {
        self.elements.datetime.and_utc()
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn object_name(&self) -> Option<&str> {
        self.elements.object_name.as_deref()
    }

    /// Instant for `time_sec` after `start`; `OutOfRange` past the calendar limits.
    pub fn timestamp_at(&self, time_sec: f64) -> Result<DateTime<Utc>> {
        // saturating cast, the checked add rejects the clamped extremes
        let offset = Duration::microseconds((time_sec * 1e6).round() as i64);
        self.start
            .checked_add_signed(offset)
            .ok_or_else(|| Error::OutOfRange {
                time_sec,
                reason: format!(
                    "{} s after {} is not a representable instant",
                    time_sec, self.start
                ),
            })
    }
}

impl Propagator for SgpPropagator {
    fn position_at(&self, time_sec: f64) -> Result<GeometrySample> {
        check_time(time_sec)?;
        let timestamp = self.timestamp_at(time_sec)?;
        let out_of_range = |reason: String| Error::OutOfRange { time_sec, reason };

        let minutes = self
            .elements
            .datetime_to_minutes_since_epoch(&timestamp.naive_utc())
            .map_err(|e| out_of_range(e.to_string()))?;
        if minutes.0.abs() > self.validity_minutes {
            return Err(out_of_range(format!(
                "{} is {:.1} h from the element epoch, window is {:.1} h",
                timestamp,
                minutes.0 / 60.0,
                self.validity_minutes / 60.0
            )));
        }

        let prediction = self
            .constants
            .propagate(minutes)
            .map_err(|e| out_of_range(e.to_string()))?;

        let sidereal = sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(
            &timestamp.naive_utc(),
        ));

        let sat_ecef = teme_to_ecef_position(prediction.position, sidereal);
        let sat_vel_ecef =
            teme_to_ecef_velocity(prediction.position, prediction.velocity, sidereal);

        let dr = sub(sat_ecef, self.station.position_ecef_km());
        let range_km = norm(dr);
        if !(range_km > 0.0) {
            return Err(Error::domain(format!(
                "satellite coincides with the ground station at t={}s",
                time_sec
            )));
        }

        let (east, north, up) = ecef_to_enu(dr, self.station.lat_rad(), self.station.lon_rad());
        let azimuth_deg = normalize_azimuth(east.atan2(north).to_degrees());
        let elevation_deg = (up / range_km).clamp(-1.0, 1.0).asin().to_degrees();

        let los_unit = [dr[0] / range_km, dr[1] / range_km, dr[2] / range_km];
        let rel_vel = sub(sat_vel_ecef, self.station.velocity_ecef_km_s());
        let range_rate_km_s = dot(rel_vel, los_unit) + 0.0;

        let (latitude_deg, longitude_deg, altitude_km) = ecef_to_geodetic(sat_ecef);

        Ok(GeometrySample {
            azimuth_deg,
            elevation_deg,
            range_km,
            range_rate_km_s,
            subpoint: SubPoint {
                latitude_deg,
                longitude_deg,
                altitude_km,
            },
        })
    }

    fn describe(&self) -> String {
        format!(
            "SGP4 {} (NORAD {}) from {}",
            self.object_name().unwrap_or("unnamed"),
            self.elements.norad_id,
            self.start
        )
    }
}
