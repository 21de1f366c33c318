//! Fixed-zone UTM forward projection on the WGS84 ellipsoid

use super::geodesic::{WGS84_A, WGS84_F};
use super::{GeodesyError, GeodeticCoordinate};

/// Scale factor on the central meridian
const SCALE_FACTOR: f64 = 0.9996;
/// False easting applied in every zone, meters
const FALSE_EASTING: f64 = 500_000.0;
/// False northing applied south of the equator, meters
const FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

/// Central meridian of a UTM zone, in degrees
fn central_meridian(zone: u8) -> f64 {
    f64::from(zone) * 6.0 - 183.0
}

/// Project a geodetic coordinate into a fixed UTM zone.
///
/// Returns (easting, northing) in meters. The zone is a configuration
/// value and is never inferred from the longitude, so the result is
/// only meaningful for coordinates near the configured zone.
pub fn utm_forward(
    coordinate: &GeodeticCoordinate,
    zone: u8,
) -> Result<(f64, f64), GeodesyError> {
    coordinate.validate()?;
    if !(1..=60).contains(&zone) {
        return Err(GeodesyError::InvalidZone(zone));
    }

    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);

    let lat = coordinate.latitude.to_radians();
    let delta_lon = (coordinate.longitude - central_meridian(zone)).to_radians();

    let (sin_lat, cos_lat) = lat.sin_cos();
    let nu = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let t2 = lat.tan() * lat.tan();
    let c = ep2 * cos_lat * cos_lat;
    let a = cos_lat * delta_lon;

    // Meridional arc length from the equator
    let m = WGS84_A
        * ((1.0 - e2 / 4.0 - 3.0 * e2 * e2 / 64.0 - 5.0 * e2 * e2 * e2 / 256.0) * lat
            - (3.0 * e2 / 8.0 + 3.0 * e2 * e2 / 32.0 + 45.0 * e2 * e2 * e2 / 1024.0)
                * (2.0 * lat).sin()
            + (15.0 * e2 * e2 / 256.0 + 45.0 * e2 * e2 * e2 / 1024.0) * (4.0 * lat).sin()
            - (35.0 * e2 * e2 * e2 / 3072.0) * (6.0 * lat).sin());

    let easting = FALSE_EASTING
        + SCALE_FACTOR
            * nu
            * (a + (1.0 - t2 + c) * a.powi(3) / 6.0
                + (5.0 - 18.0 * t2 + t2 * t2 + 72.0 * c - 58.0 * ep2) * a.powi(5) / 120.0);

    let mut northing = SCALE_FACTOR
        * (m + nu
            * lat.tan()
            * (a * a / 2.0
                + (5.0 - t2 + 9.0 * c + 4.0 * c * c) * a.powi(4) / 24.0
                + (61.0 - 58.0 * t2 + t2 * t2 + 600.0 * c - 330.0 * ep2) * a.powi(6) / 720.0));
    if coordinate.latitude < 0.0 {
        northing += FALSE_NORTHING_SOUTH;
    }

    Ok((easting, northing))
}
