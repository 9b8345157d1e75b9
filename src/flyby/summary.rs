use serde::Serialize;

use crate::flyby::record::FlybyRecord;
use crate::tracking::LockState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Stats {
    pub min: f64,
    pub mean: f64,
    pub max: f64,
    pub count: usize,
}

impl Stats {
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        (count > 0).then(|| Stats {
            min,
            mean: sum / count as f64,
            max,
            count,
        })
    }
}

/// Aggregate view over a flyby timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlybySummary {
    pub total_records: usize,
    pub visible_records: usize,
    pub visible_fraction: f64,
    pub first_visible_sec: Option<f64>,
    pub last_visible_sec: Option<f64>,
    pub range_km: Option<Stats>,
    pub snr_db: Option<Stats>,
    pub doppler_hz: Option<Stats>,
    pub pointing_error_deg: Option<Stats>,
    /// Share of visible records with the target inside the beam.
    pub in_beam_fraction: f64,
    /// Share of visible records at or above the SNR threshold.
    pub link_up_fraction: f64,
    pub lock_acquisitions: usize,
}

impl FlybySummary {
    pub fn from_records(records: &[FlybyRecord]) -> Self {
        let visible: Vec<&FlybyRecord> = records.iter().filter(|r| r.visible()).collect();
        let signals = || visible.iter().filter_map(|r| r.signal);
        let tracking = || visible.iter().filter_map(|r| r.tracking);

        let fraction = |n: usize, of: usize| if of == 0 { 0.0 } else { n as f64 / of as f64 };

        let mut lock_acquisitions = 0;
        let mut was_locked = false;
        for record in records {
            let locked = record
                .tracking
                .is_some_and(|t| t.lock == LockState::Locked);
            if locked && !was_locked {
                lock_acquisitions += 1;
            }
            was_locked = locked;
        }

        FlybySummary {
            total_records: records.len(),
            visible_records: visible.len(),
            visible_fraction: fraction(visible.len(), records.len()),
            first_visible_sec: visible.first().map(|r| r.time_sec),
            last_visible_sec: visible.last().map(|r| r.time_sec),
            range_km: Stats::from_values(visible.iter().map(|r| r.geometry.range_km)),
            snr_db: Stats::from_values(signals().map(|s| s.snr_db)),
            doppler_hz: Stats::from_values(signals().map(|s| s.doppler_hz)),
            pointing_error_deg: Stats::from_values(tracking().map(|t| t.pointing_error_deg)),
            in_beam_fraction: fraction(tracking().filter(|t| t.in_beam).count(), visible.len()),
            link_up_fraction: fraction(signals().filter(|s| s.link_up).count(), visible.len()),
            lock_acquisitions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::{GeometrySample, SubPoint};
    use crate::signal::SignalSample;
    use crate::tracking::{Pointing, TrackingSample};

    fn record(time_sec: f64, elevation_deg: f64, snr_db: f64, error: f64) -> FlybyRecord {
        let geometry = GeometrySample {
            azimuth_deg: 90.0,
            elevation_deg,
            range_km: 1000.0 + time_sec,
            range_rate_km_s: -1.0,
            subpoint: SubPoint {
                latitude_deg: 0.0,
                longitude_deg: 0.0,
                altitude_km: 500.0,
            },
        };
        if elevation_deg < 0.0 {
            return FlybyRecord {
                time_sec,
                geometry,
                signal: None,
                tracking: None,
                antenna: Pointing::new(0.0, 90.0),
            };
        }
        let in_beam = error < 5.0;
        FlybyRecord {
            time_sec,
            geometry,
            signal: Some(SignalSample {
                doppler_hz: 1000.0 * time_sec,
                path_loss_db: 150.0,
                atmospheric_loss_db: 0.0,
                received_power_dbm: -100.0,
                noise_floor_dbm: -100.0 - snr_db,
                snr_db,
                link_margin_db: snr_db - 10.0,
                link_up: snr_db >= 10.0,
                visible: true,
            }),
            tracking: Some(TrackingSample {
                azimuth_deg: 90.0,
                elevation_deg,
                pointing_error_deg: error,
                in_beam,
                lock: if in_beam {
                    LockState::Locked
                } else {
                    LockState::Unlocked
                },
            }),
            antenna: Pointing::new(90.0, elevation_deg),
        }
    }

    #[test]
    fn empty_timeline_has_no_statistics() {
        let summary = FlybySummary::from_records(&[]);
        assert_eq!(summary.total_records, 0);
        assert_eq!(summary.visible_fraction, 0.0);
        assert_eq!(summary.snr_db, None);
        assert_eq!(summary.first_visible_sec, None);
    }

    #[test]
    fn aggregates_visible_records_only() {
        let records = vec![
            record(0.0, -5.0, 0.0, 0.0),
            record(1.0, 10.0, 8.0, 1.0),
            record(2.0, 20.0, 14.0, 7.0),
            record(3.0, 15.0, 20.0, 2.0),
            record(4.0, -1.0, 0.0, 0.0),
        ];
        let summary = FlybySummary::from_records(&records);

        assert_eq!(summary.total_records, 5);
        assert_eq!(summary.visible_records, 3);
        assert!((summary.visible_fraction - 0.6).abs() < 1e-12);
        assert_eq!(summary.first_visible_sec, Some(1.0));
        assert_eq!(summary.last_visible_sec, Some(3.0));

        let snr = summary.snr_db.unwrap();
        assert_eq!((snr.min, snr.max, snr.count), (8.0, 20.0, 3));
        assert!((snr.mean - 14.0).abs() < 1e-12);

        let doppler = summary.doppler_hz.unwrap();
        assert_eq!((doppler.min, doppler.max), (1000.0, 3000.0));

        assert!((summary.in_beam_fraction - 2.0 / 3.0).abs() < 1e-12);
        assert!((summary.link_up_fraction - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(summary.pointing_error_deg.unwrap().max, 7.0);
        // locked at 1, lost at 2, reacquired at 3
        assert_eq!(summary.lock_acquisitions, 2);
    }
}
