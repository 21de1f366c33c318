//! Geodetic coordinate types and WGS84 conversions

pub mod geodesic;
pub mod projection;

use nalgebra::Vector2;
use thiserror::Error;

/// Errors raised by the geodesy routines
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeodesyError {
    #[error("latitude {0} is outside [-90, 90] degrees")]
    InvalidLatitude(f64),
    #[error("longitude {0} is outside [-180, 180] degrees")]
    InvalidLongitude(f64),
    #[error("bearing is undefined between coincident points at a pole")]
    UndefinedBearing,
    #[error("geodesic inverse did not converge (near-antipodal points)")]
    NonConvergent,
    #[error("UTM zone {0} is outside [1, 60]")]
    InvalidZone(u8),
}

/// A WGS84 geodetic position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodeticCoordinate {
    /// Latitude in degrees, [-90, 90]
    pub latitude: f64,
    /// Longitude in degrees, [-180, 180]
    pub longitude: f64,
}

impl GeodeticCoordinate {
    /// Create a coordinate, validating the latitude and longitude ranges
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeodesyError> {
        let coordinate = GeodeticCoordinate {
            latitude,
            longitude,
        };
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Check the range invariants
    pub fn validate(&self) -> Result<(), GeodesyError> {
        if !self.latitude.is_finite() || self.latitude.abs() > 90.0 {
            return Err(GeodesyError::InvalidLatitude(self.latitude));
        }
        if !self.longitude.is_finite() || self.longitude.abs() > 180.0 {
            return Err(GeodesyError::InvalidLongitude(self.longitude));
        }
        Ok(())
    }

    /// True when the coordinate sits exactly on a pole
    pub fn is_pole(&self) -> bool {
        self.latitude.abs() == 90.0
    }
}

/// Planar displacement from the reference point, in meters.
///
/// The y axis points toward geodetic north and the x axis toward
/// geodetic east. Valid only near the reference point, where the
/// tangent-plane approximation holds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LocalOffset {
    pub x: f64,
    pub y: f64,
}

impl LocalOffset {
    /// Straight-line magnitude of the offset in meters
    pub fn magnitude(&self) -> f64 {
        Vector2::new(self.x, self.y).norm()
    }
}

pub use geodesic::{initial_bearing, inverse_distance, local_offset};
