//! Positions expressed in ECEF, geodetic and local topocentric frames.
use std::sync::OnceLock;

use nalgebra::{Matrix3, Vector3};

mod transform;

pub use transform::{ecef2enu, ecef2geodetic, enu2azelrange, enu_rotation, geodetic2ecef};

/// Geodetic coordinates on the WGS84 ellipsoid
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Geodetic {
    /// Latitude in decimal degrees
    pub latitude_ddeg: f64,
    /// Longitude in decimal degrees
    pub longitude_ddeg: f64,
    /// Height above ellipsoid (m)
    pub height_m: f64,
}

impl Geodetic {
    pub fn new(latitude_ddeg: f64, longitude_ddeg: f64, height_m: f64) -> Self {
        Self {
            latitude_ddeg,
            longitude_ddeg,
            height_m,
        }
    }
}

/// Local topocentric (east, north, up) vector, in meters
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Enu {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

/// Line of sight description, from an observer to a target
#[derive(Debug, Copy, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AzElRange {
    /// Azimuth in decimal degrees, clockwise from north, in [0, 360)
    pub azimuth_deg: f64,
    /// Elevation in decimal degrees
    pub elevation_deg: f64,
    /// Range (m)
    pub range_m: f64,
}

/// Derived representations, computed on first access
#[derive(Debug, Clone, Copy)]
struct Derived {
    /// (lat rad, lon rad, h m)
    geodetic: (f64, f64, f64),
    /// ECEF to ENU rotation at this position
    rotation: Matrix3<f64>,
}

/// A position, simultaneously expressible in ECEF, geodetic and
/// as the origin of a local topocentric frame.
/// ECEF is authoritative and immutable; derived frames are lazily
/// computed and cached. Use [Coordinates::with_ecef] to move the position.
#[derive(Debug, Clone)]
pub struct Coordinates {
    ecef: Vector3<f64>,
    derived: OnceLock<Derived>,
}

impl PartialEq for Coordinates {
    fn eq(&self, other: &Self) -> bool {
        self.ecef == other.ecef
    }
}

impl Coordinates {
    /// Builds [Coordinates] from ECEF (m)
    pub fn from_ecef(x_m: f64, y_m: f64, z_m: f64) -> Self {
        Self::from_ecef_vector(Vector3::new(x_m, y_m, z_m))
    }

    /// Builds [Coordinates] from ECEF [Vector3] (m)
    pub fn from_ecef_vector(ecef: Vector3<f64>) -> Self {
        Self {
            ecef,
            derived: OnceLock::new(),
        }
    }

    /// Builds [Coordinates] from [Geodetic] coordinates
    pub fn from_geodetic(geo: Geodetic) -> Self {
        let (lat, lon) = (geo.latitude_ddeg.to_radians(), geo.longitude_ddeg.to_radians());
        let coords = Self::from_ecef_vector(geodetic2ecef(lat, lon, geo.height_m));
        let _ = coords.derived.set(Derived {
            geodetic: (lat, lon, geo.height_m),
            rotation: enu_rotation(lat, lon),
        });
        coords
    }

    /// Returns new [Coordinates] at this ECEF position. Cached representations
    /// are not carried over.
    pub fn with_ecef(&self, ecef: Vector3<f64>) -> Self {
        Self::from_ecef_vector(ecef)
    }

    fn derived(&self) -> &Derived {
        self.derived.get_or_init(|| {
            let geodetic = ecef2geodetic(&self.ecef);
            Derived {
                geodetic,
                rotation: enu_rotation(geodetic.0, geodetic.1),
            }
        })
    }

    /// ECEF coordinates (m)
    pub fn ecef(&self) -> Vector3<f64> {
        self.ecef
    }

    /// [Geodetic] coordinates
    pub fn geodetic(&self) -> Geodetic {
        let (lat, lon, h) = self.derived().geodetic;
        Geodetic::new(lat.to_degrees(), lon.to_degrees(), h)
    }

    /// Returns the ECEF to ENU rotation matrix, with self as origin
    pub fn enu_rotation(&self) -> Matrix3<f64> {
        self.derived().rotation
    }

    /// Returns the [Enu] vector pointing to `target`, with self as origin.
    pub fn enu(&self, target: &Self) -> Enu {
        let enu = ecef2enu(&self.derived().rotation, &(target.ecef - self.ecef));
        Enu {
            east: enu[0],
            north: enu[1],
            up: enu[2],
        }
    }

    /// Returns [AzElRange] of `target`, seen from self.
    pub fn azelrange(&self, target: &Self) -> AzElRange {
        let enu = self.enu(target);
        let (az, el, range) = enu2azelrange(&Vector3::new(enu.east, enu.north, enu.up));
        AzElRange {
            azimuth_deg: az.to_degrees(),
            elevation_deg: el.to_degrees(),
            range_m: range,
        }
    }
}

impl From<Vector3<f64>> for Coordinates {
    fn from(ecef: Vector3<f64>) -> Self {
        Self::from_ecef_vector(ecef)
    }
}

impl From<Geodetic> for Coordinates {
    fn from(geo: Geodetic) -> Self {
        Self::from_geodetic(geo)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn geodetic_roundtrip() {
        let origin = Geodetic::new(52.0, 5.0, 50.0);
        let coords = Coordinates::from_geodetic(origin);
        // go through ECEF only, to bypass the initial cache
        let ecef = coords.ecef();
        let coords = Coordinates::from_ecef(ecef[0], ecef[1], ecef[2]);
        let geo = coords.geodetic();
        assert!((geo.latitude_ddeg - 52.0).abs() < 1.0E-6);
        assert!((geo.longitude_ddeg - 5.0).abs() < 1.0E-6);
        assert!((geo.height_m - 50.0).abs() < 1.0E-3);
    }
    #[test]
    fn coincident_target() {
        let rx = Coordinates::from_geodetic(Geodetic::new(52.0, 5.0, 50.0));
        let azelr = rx.azelrange(&rx.clone());
        assert_eq!(azelr.azimuth_deg, 0.0);
        assert!((azelr.elevation_deg - 90.0).abs() < 1.0E-12);
        assert_eq!(azelr.range_m, 0.0);
    }
    #[test]
    fn zenith_target() {
        let rx = Coordinates::from_geodetic(Geodetic::new(45.0, 10.0, 0.0));
        let sv = Coordinates::from_geodetic(Geodetic::new(45.0, 10.0, 20_000_000.0));
        let azelr = rx.azelrange(&sv);
        assert!((azelr.elevation_deg - 90.0).abs() < 1.0E-6);
        assert!((azelr.range_m - 20_000_000.0).abs() < 1.0E-3);
        let enu = rx.enu(&sv);
        assert!(enu.east.abs() < 1.0E-3);
        assert!(enu.north.abs() < 1.0E-3);
    }
    #[test]
    fn northern_target() {
        let rx = Coordinates::from_geodetic(Geodetic::new(0.0, 0.0, 0.0));
        let target = Coordinates::from_geodetic(Geodetic::new(1.0, 0.0, 0.0));
        let azelr = rx.azelrange(&target);
        assert!(azelr.azimuth_deg.abs() < 1.0E-6 || (azelr.azimuth_deg - 360.0).abs() < 1.0E-6);
        assert!(azelr.elevation_deg < 0.0, "below the local horizon");

        let target = Coordinates::from_geodetic(Geodetic::new(0.0, 1.0, 0.0));
        let azelr = rx.azelrange(&target);
        assert!((azelr.azimuth_deg - 90.0).abs() < 1.0E-6);
    }
    #[test]
    fn moving_drops_cache() {
        let coords = Coordinates::from_geodetic(Geodetic::new(52.0, 5.0, 50.0));
        let moved = coords.with_ecef(Vector3::new(6378137.0, 0.0, 0.0));
        let geo = moved.geodetic();
        assert!(geo.latitude_ddeg.abs() < 1.0E-9);
        assert!(geo.longitude_ddeg.abs() < 1.0E-9);
        assert!(geo.height_m.abs() < 1.0E-3);
        assert_ne!(moved, coords);
    }
}
