//! Stateless frame conversions: ECEF, geodetic and local topocentric.
//! Angles are expressed in radians in this module.
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use nalgebra::{Matrix3, Vector3};

use crate::constants::Wgs84;

/// Below this horizontal distance (m), the target is considered
/// to be at the zenith of the origin.
const ZENITH_THRESHOLD: f64 = 1.0E-20;

/// Below this distance (m) to the polar axis, the point is on the axis.
const POLAR_THRESHOLD: f64 = 1.0E-6;

/// Converts ECEF coordinates (m) to geodetic (latitude rad, longitude rad, height m)
/// on the WGS84 ellipsoid. Closed form, using the geocentric latitude
/// and the parametric latitude as intermediates (no iteration).
/// Points on the polar axis resolve to ±90° latitude.
pub fn ecef2geodetic(ecef: &Vector3<f64>) -> (f64, f64, f64) {
    let (x, y, z) = (ecef[0], ecef[1], ecef[2]);
    let a = Wgs84::A;
    let e2 = Wgs84::E2;

    let r = (x * x + y * y + z * z).sqrt();
    let p = (x * x + y * y).sqrt();
    let lon = y.atan2(x);

    if p < POLAR_THRESHOLD {
        let b = a * (1.0 - e2).sqrt();
        return (FRAC_PI_2.copysign(z), lon, z.abs() - b);
    }

    // geocentric latitude
    let lat_c = z.atan2(p);

    // parametric latitude
    let psi = (lat_c.tan() / (1.0 - e2).sqrt()).atan();

    let (sin_c, cos_c) = lat_c.sin_cos();
    let (sin_psi, cos_psi) = psi.sin_cos();

    let lat = ((r * sin_c + e2 * a / (1.0 - e2).sqrt() * sin_psi.powi(3))
        / (r * cos_c - e2 * a * cos_psi.powi(3)))
    .atan();

    let (sin_lat, cos_lat) = lat.sin_cos();
    let n = a / (1.0 - e2 * sin_lat.powi(2)).sqrt();

    // the better conditioned projection
    let h = if lat.abs() <= FRAC_PI_4 {
        p / cos_lat - n
    } else {
        z / sin_lat - n * (1.0 - e2)
    };
    (lat, lon, h)
}

/// Converts geodetic coordinates (rad, rad, m) to ECEF (m)
pub fn geodetic2ecef(lat: f64, lon: f64, h: f64) -> Vector3<f64> {
    let a = Wgs84::A;
    let e2 = Wgs84::E2;
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    let n = a / (1.0 - e2 * sin_lat.powi(2)).sqrt();
    Vector3::new(
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - e2) + h) * sin_lat,
    )
}

/// ECEF to local (east, north, up) rotation matrix, at this geodetic origin.
pub fn enu_rotation(lat: f64, lon: f64) -> Matrix3<f64> {
    let (sin_lat, cos_lat) = lat.sin_cos();
    let (sin_lon, cos_lon) = lon.sin_cos();
    Matrix3::new(
        -sin_lon,
        cos_lon,
        0.0,
        -sin_lat * cos_lon,
        -sin_lat * sin_lon,
        cos_lat,
        cos_lat * cos_lon,
        cos_lat * sin_lon,
        sin_lat,
    )
}

/// Projects an ECEF difference vector (target - origin) into
/// the local topocentric frame described by `rotation`.
pub fn ecef2enu(rotation: &Matrix3<f64>, dxyz: &Vector3<f64>) -> Vector3<f64> {
    rotation * dxyz
}

/// Converts topocentric (east, north, up) to (azimuth rad, elevation rad, range m).
/// Azimuth is wrapped to [0, 2π). A target at the zenith (or coincident
/// with the origin) yields (0, π/2).
pub fn enu2azelrange(enu: &Vector3<f64>) -> (f64, f64, f64) {
    let (e, n, u) = (enu[0], enu[1], enu[2]);
    let range = enu.norm();
    let h_dist = (e * e + n * n).sqrt();
    if h_dist < ZENITH_THRESHOLD {
        return (0.0, FRAC_PI_2, range);
    }
    let mut az = e.atan2(n);
    if az < 0.0 {
        az += 2.0 * std::f64::consts::PI;
    }
    let el = u.atan2(h_dist);
    (az, el, range)
}
