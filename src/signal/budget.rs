use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const SPEED_OF_LIGHT_M_S: f64 = 2.997_924_58e8;
pub const BOLTZMANN_J_K: f64 = 1.380_649e-23;
pub const FREE_SPACE_EXPONENT: f64 = 2.0;

/// Static radio parameters of the link. Defaults describe a UHF cubesat downlink.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RadioConfig {
    pub frequency_hz: f64,
    pub tx_power_dbm: f64,
    pub tx_gain_db: f64,
    pub rx_gain_db: f64,
    pub bandwidth_hz: f64,
    pub system_noise_temp_k: f64,
    /// 2.0 is free space.
    pub path_loss_exponent: f64,
    pub snr_threshold_db: f64,
    /// Fixed attenuation added to every sample.
    pub atmospheric_loss_db: f64,
}

impl Default for RadioConfig {
    fn default() -> Self {
        Self {
            frequency_hz: 437e6,
            tx_power_dbm: 30.0,
            tx_gain_db: 0.0,
            rx_gain_db: 10.0,
            bandwidth_hz: 20_000.0,
            system_noise_temp_k: 290.0,
            path_loss_exponent: FREE_SPACE_EXPONENT,
            snr_threshold_db: 10.0,
            atmospheric_loss_db: 0.0,
        }
    }
}

impl RadioConfig {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("frequency_hz", self.frequency_hz),
            ("bandwidth_hz", self.bandwidth_hz),
            ("system_noise_temp_k", self.system_noise_temp_k),
            ("path_loss_exponent", self.path_loss_exponent),
        ];
        for (name, value) in positive {
            if !(value > 0.0) || !value.is_finite() {
                return Err(Error::config(format!("radio {} must be > 0, got {}", name, value)));
            }
        }
        let finite = [
            ("tx_power_dbm", self.tx_power_dbm),
            ("tx_gain_db", self.tx_gain_db),
            ("rx_gain_db", self.rx_gain_db),
            ("snr_threshold_db", self.snr_threshold_db),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(Error::config(format!("radio {} must be finite", name)));
            }
        }
        if !(self.atmospheric_loss_db >= 0.0) || !self.atmospheric_loss_db.is_finite() {
            return Err(Error::config(format!(
                "radio atmospheric_loss_db must be >= 0, got {}",
                self.atmospheric_loss_db
            )));
        }
        Ok(())
    }
}

/// Link quality for one line-of-sight geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SignalSample {
    pub doppler_hz: f64,
    pub path_loss_db: f64,
    pub atmospheric_loss_db: f64,
    pub received_power_dbm: f64,
    pub noise_floor_dbm: f64,
    pub snr_db: f64,
    pub link_margin_db: f64,
    pub link_up: bool,
    pub visible: bool,
}

/// Doppler offset of the carrier; closing range (negative rate) shifts up.
pub fn doppler_shift_hz(range_rate_km_s: f64, frequency_hz: f64) -> f64 {
    -(range_rate_km_s * 1000.0 / SPEED_OF_LIGHT_M_S) * frequency_hz + 0.0
}

/// Log-distance path loss anchored to the free-space constant term.
pub fn path_loss_db(range_km: f64, frequency_hz: f64, exponent: f64) -> f64 {
    let range_m = range_km * 1000.0;
    10.0 * exponent * range_m.log10()
        + 20.0 * frequency_hz.log10()
        + 20.0 * (4.0 * PI / SPEED_OF_LIGHT_M_S).log10()
}

pub fn free_space_path_loss_db(range_km: f64, frequency_hz: f64) -> f64 {
    path_loss_db(range_km, frequency_hz, FREE_SPACE_EXPONENT)
}

/// kTB thermal noise power in dBm.
pub fn thermal_noise_dbm(system_noise_temp_k: f64, bandwidth_hz: f64) -> f64 {
    10.0 * (BOLTZMANN_J_K * system_noise_temp_k * bandwidth_hz * 1000.0).log10()
}

pub fn received_power_dbm(radio: &RadioConfig, path_loss_db: f64, atmospheric_loss_db: f64) -> f64 {
    radio.tx_power_dbm + radio.tx_gain_db + radio.rx_gain_db - path_loss_db - atmospheric_loss_db
}

/// Deterministic link budget for a range and range rate.
///
/// Uses the radio's fixed atmospheric loss and no noise perturbation.
pub fn evaluate(range_km: f64, range_rate_km_s: f64, radio: &RadioConfig) -> Result<SignalSample> {
    evaluate_link(range_km, range_rate_km_s, radio, 0.0, 0.0)
}

pub(crate) fn evaluate_link(
    range_km: f64,
    range_rate_km_s: f64,
    radio: &RadioConfig,
    extra_atmospheric_loss_db: f64,
    noise_offset_db: f64,
) -> Result<SignalSample> {
    if !(radio.frequency_hz > 0.0) {
        return Err(Error::domain(format!(
            "carrier frequency must be > 0, got {} Hz",
            radio.frequency_hz
        )));
    }
    if !(radio.bandwidth_hz > 0.0) {
        return Err(Error::domain(format!(
            "bandwidth must be > 0, got {} Hz",
            radio.bandwidth_hz
        )));
    }
    if !(radio.system_noise_temp_k > 0.0) {
        return Err(Error::domain(format!(
            "system noise temperature must be > 0, got {} K",
            radio.system_noise_temp_k
        )));
    }
    if !(range_km > 0.0) || !range_km.is_finite() {
        return Err(Error::domain(format!("range must be > 0, got {} km", range_km)));
    }
    if !range_rate_km_s.is_finite() {
        return Err(Error::domain("range rate must be finite"));
    }

    let doppler_hz = doppler_shift_hz(range_rate_km_s, radio.frequency_hz);
    let path_loss_db = path_loss_db(range_km, radio.frequency_hz, radio.path_loss_exponent);
    let atmospheric_loss_db = radio.atmospheric_loss_db + extra_atmospheric_loss_db;
    let received_power_dbm = received_power_dbm(radio, path_loss_db, atmospheric_loss_db);
    let noise_floor_dbm =
        thermal_noise_dbm(radio.system_noise_temp_k, radio.bandwidth_hz) + noise_offset_db;
    let snr_db = received_power_dbm - noise_floor_dbm;
    let link_margin_db = snr_db - radio.snr_threshold_db;

    Ok(SignalSample {
        doppler_hz,
        path_loss_db,
        atmospheric_loss_db,
        received_power_dbm,
        noise_floor_dbm,
        snr_db,
        link_margin_db,
        link_up: link_margin_db >= 0.0,
        visible: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const S_BAND: f64 = 2.4e9;

    fn radio() -> RadioConfig {
        RadioConfig {
            frequency_hz: S_BAND,
            tx_power_dbm: 20.0,
            tx_gain_db: 20.0,
            rx_gain_db: 20.0,
            bandwidth_hz: 1e6,
            ..RadioConfig::default()
        }
    }

    #[test]
    fn doppler_sign_follows_range_rate() {
        assert!(doppler_shift_hz(-7.0, S_BAND) > 0.0);
        assert!(doppler_shift_hz(7.0, S_BAND) < 0.0);
        assert_eq!(doppler_shift_hz(0.0, S_BAND), 0.0);
        assert!(doppler_shift_hz(0.0, S_BAND).is_sign_positive());
        assert!(doppler_shift_hz(-7.0, S_BAND) > doppler_shift_hz(-7.0, 1e9));
    }

    #[test]
    fn doppler_magnitude() {
        // 1 m/s closing at 2.4 GHz is about 8 Hz.
        let d = doppler_shift_hz(-0.001, S_BAND);
        assert!((d - 8.0055).abs() < 1e-3, "doppler = {}", d);
    }

    #[test]
    fn path_loss_increases_with_range_and_frequency() {
        let mut previous = free_space_path_loss_db(0.1, S_BAND);
        for range in [1.0, 100.0, 500.0, 2000.0, 10_000.0] {
            let loss = free_space_path_loss_db(range, S_BAND);
            assert!(loss > previous);
            previous = loss;
        }
        assert!(free_space_path_loss_db(500.0, S_BAND) > free_space_path_loss_db(500.0, 1e9));
        // Well-known figure: ~154 dB at 500 km, 2.4 GHz.
        let loss = free_space_path_loss_db(500.0, S_BAND);
        assert!((loss - 154.03).abs() < 0.05, "fspl = {}", loss);
    }

    #[test]
    fn exponent_two_is_free_space() {
        assert_eq!(
            path_loss_db(750.0, S_BAND, 2.0),
            free_space_path_loss_db(750.0, S_BAND)
        );
        assert!(path_loss_db(750.0, S_BAND, 2.5) > path_loss_db(750.0, S_BAND, 2.0));
    }

    #[test]
    fn thermal_noise_at_room_temperature() {
        // -174 dBm/Hz at 290 K, so -114 dBm in 1 MHz.
        let n = thermal_noise_dbm(290.0, 1e6);
        assert!((n + 113.98).abs() < 0.05, "noise = {}", n);
        assert!(thermal_noise_dbm(290.0, 1e7) > n);
    }

    #[test]
    fn evaluate_composes_the_budget() {
        let radio = RadioConfig {
            atmospheric_loss_db: 2.0,
            ..radio()
        };
        let s = evaluate(500.0, -3.0, &radio).unwrap();
        let expected_rx = 60.0 - free_space_path_loss_db(500.0, S_BAND) - 2.0;
        assert!((s.received_power_dbm - expected_rx).abs() < 1e-9);
        assert!((s.snr_db - (expected_rx - thermal_noise_dbm(290.0, 1e6))).abs() < 1e-9);
        assert_eq!(s.link_margin_db, s.snr_db - radio.snr_threshold_db);
        assert_eq!(s.link_up, s.link_margin_db >= 0.0);
        assert!(s.visible);
        assert!(s.doppler_hz > 0.0);
    }

    #[test]
    fn snr_drops_with_range() {
        let near = evaluate(500.0, 0.0, &radio()).unwrap();
        let far = evaluate(2000.0, 0.0, &radio()).unwrap();
        assert!(far.snr_db < near.snr_db);
    }

    #[test]
    fn invalid_inputs_are_domain_errors() {
        let mut bad = radio();
        bad.frequency_hz = 0.0;
        assert!(matches!(evaluate(500.0, 0.0, &bad), Err(Error::Domain(_))));

        let mut bad = radio();
        bad.bandwidth_hz = -1.0;
        assert!(matches!(evaluate(500.0, 0.0, &bad), Err(Error::Domain(_))));

        assert!(matches!(evaluate(0.0, 0.0, &radio()), Err(Error::Domain(_))));
        assert!(matches!(evaluate(-5.0, 0.0, &radio()), Err(Error::Domain(_))));
    }

    #[test]
    fn validate_flags_bad_static_parameters() {
        assert!(radio().validate().is_ok());
        let bad = RadioConfig {
            path_loss_exponent: 0.0,
            ..radio()
        };
        assert!(matches!(bad.validate(), Err(Error::Configuration(_))));
        let bad = RadioConfig {
            atmospheric_loss_db: -1.0,
            ..radio()
        };
        assert!(matches!(bad.validate(), Err(Error::Configuration(_))));
    }
}
