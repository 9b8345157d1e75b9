//! Frame rotations between TEME, ECEF, ENU and geodetic coordinates.

use crate::orbit::ground_station::{EARTH_ROTATION_RAD_S, WGS84_A_KM, WGS84_E2};

pub fn teme_to_ecef_position(pos_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    [
        pos_teme[0] * cos_gmst + pos_teme[1] * sin_gmst,
        -pos_teme[0] * sin_gmst + pos_teme[1] * cos_gmst,
        pos_teme[2],
    ]
}

pub fn teme_to_ecef_velocity(pos_teme: [f64; 3], vel_teme: [f64; 3], gmst: f64) -> [f64; 3] {
    let cos_gmst = gmst.cos();
    let sin_gmst = gmst.sin();
    let pos = teme_to_ecef_position(pos_teme, gmst);
    let rotated = [
        vel_teme[0] * cos_gmst + vel_teme[1] * sin_gmst,
        -vel_teme[0] * sin_gmst + vel_teme[1] * cos_gmst,
        vel_teme[2],
    ];
    // Remove the frame's own rotation (omega x r).
    [
        rotated[0] + EARTH_ROTATION_RAD_S * pos[1],
        rotated[1] - EARTH_ROTATION_RAD_S * pos[0],
        rotated[2],
    ]
}

/// Rotates an ECEF difference vector into the station's (east, north, up) frame.
pub fn ecef_to_enu(dr: [f64; 3], lat_rad: f64, lon_rad: f64) -> (f64, f64, f64) {
    let sin_lat = lat_rad.sin();
    let cos_lat = lat_rad.cos();
    let sin_lon = lon_rad.sin();
    let cos_lon = lon_rad.cos();

    let east = -sin_lon * dr[0] + cos_lon * dr[1];
    let north = -sin_lat * cos_lon * dr[0] - sin_lat * sin_lon * dr[1] + cos_lat * dr[2];
    let up = cos_lat * cos_lon * dr[0] + cos_lat * sin_lon * dr[1] + sin_lat * dr[2];
    (east, north, up)
}

/// Geodetic latitude/longitude in degrees and height in km for an ECEF point.
///
/// Fixed-point iteration on latitude; converges well below a millimetre
/// for LEO altitudes within a handful of rounds.
pub fn ecef_to_geodetic(pos: [f64; 3]) -> (f64, f64, f64) {
    let [x, y, z] = pos;
    let lon = y.atan2(x);
    let p = (x * x + y * y).sqrt();

    let mut lat = z.atan2(p * (1.0 - WGS84_E2));
    let mut height = 0.0;
    for _ in 0..6 {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        height = if lat.cos().abs() > 1e-12 {
            p / lat.cos() - n
        } else {
            z.abs() - n * (1.0 - WGS84_E2)
        };
        lat = z.atan2(p * (1.0 - WGS84_E2 * n / (n + height)));
    }

    (lat.to_degrees(), lon.to_degrees(), height)
}

pub fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orbit::GroundStation;

    #[test]
    fn zenith_is_straight_up() {
        let station = GroundStation::new(45.0, 10.0, 0.0).unwrap();
        let base = station.position_ecef_km();
        let (lat, lon) = (station.lat_rad(), station.lon_rad());
        let up = [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()];
        let dr = [up[0] * 500.0, up[1] * 500.0, up[2] * 500.0];
        let (e, n, u) = ecef_to_enu(dr, lat, lon);
        assert!(e.abs() < 1e-9);
        assert!(n.abs() < 1e-9);
        assert!((u - 500.0).abs() < 1e-9);
        assert!(norm(sub(base, base)) == 0.0);
    }

    #[test]
    fn geodetic_round_trip_of_station() {
        let station = GroundStation::new(37.7749, -122.4194, 1200.0).unwrap();
        let (lat, lon, h) = ecef_to_geodetic(station.position_ecef_km());
        assert!((lat - 37.7749).abs() < 1e-7, "lat = {}", lat);
        assert!((lon + 122.4194).abs() < 1e-9, "lon = {}", lon);
        assert!((h - 1.2).abs() < 1e-6, "h = {}", h);
    }

    #[test]
    fn rotation_preserves_length() {
        let pos = [6878.0, 120.0, -40.0];
        let rotated = teme_to_ecef_position(pos, 1.234);
        assert!((norm(rotated) - norm(pos)).abs() < 1e-9);
    }
}
