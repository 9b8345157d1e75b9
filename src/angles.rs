//! Angle wrapping helpers shared by the propagators and the tracking loop.

/// Normalizes an azimuth into [0, 360).
pub fn normalize_azimuth(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid rounds tiny negative inputs up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Signed shortest angular delta in (-180, 180].
pub fn shortest_delta(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 {
        180.0
    } else {
        wrapped
    }
}

/// Normalizes a longitude into [-180, 180).
pub fn wrap_longitude(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped >= 180.0 {
        -180.0
    } else {
        wrapped
    }
}
