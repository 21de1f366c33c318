//! WGS84 geodesic inverse solution and initial bearing

use super::{GeodesyError, GeodeticCoordinate, LocalOffset};

/// WGS84 semi-major axis in meters
pub const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// WGS84 semi-minor axis in meters
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

const MAX_ITERATIONS: usize = 200;
const CONVERGENCE_THRESHOLD: f64 = 1e-12;

/// Geodesic surface distance between two points on the WGS84 ellipsoid,
/// in meters, using the Vincenty inverse solution.
///
/// The iteration fails to converge for near-antipodal point pairs; that
/// case is reported as [`GeodesyError::NonConvergent`] instead of
/// returning a silently wrong distance.
pub fn inverse_distance(
    from: &GeodeticCoordinate,
    to: &GeodeticCoordinate,
) -> Result<f64, GeodesyError> {
    from.validate()?;
    to.validate()?;

    if from == to {
        return Ok(0.0);
    }

    // Reduced latitudes on the auxiliary sphere
    let u1 = ((1.0 - WGS84_F) * from.latitude.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * to.latitude.to_radians().tan()).atan();
    let l = (to.longitude - from.longitude).to_radians();

    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    for _ in 0..MAX_ITERATIONS {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
            + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
        .sqrt();
        if sin_sigma == 0.0 {
            // Coincident points
            return Ok(0.0);
        }
        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos2_alpha = 1.0 - sin_alpha * sin_alpha;
        let cos_2sigma_m = if cos2_alpha == 0.0 {
            // Equatorial line
            0.0
        } else {
            cos_sigma - 2.0 * sin_u1 * sin_u2 / cos2_alpha
        };
        let c = WGS84_F / 16.0 * cos2_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos2_alpha));

        let lambda_prev = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m
                            + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        if (lambda - lambda_prev).abs() < CONVERGENCE_THRESHOLD {
            let u_sq =
                cos2_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
            let a =
                1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
            let b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
            let delta_sigma = b
                * sin_sigma
                * (cos_2sigma_m
                    + b / 4.0
                        * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                            - b / 6.0
                                * cos_2sigma_m
                                * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                                * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));
            return Ok(WGS84_B * a * (sigma - delta_sigma));
        }
    }

    Err(GeodesyError::NonConvergent)
}

/// Initial compass bearing from one point toward another, in degrees.
///
/// Uses the standard forward-azimuth formula and normalizes the result
/// into [0, 360), with 0 at geodetic north and angles increasing
/// clockwise.
pub fn initial_bearing(
    from: &GeodeticCoordinate,
    to: &GeodeticCoordinate,
) -> Result<f64, GeodesyError> {
    from.validate()?;
    to.validate()?;

    if from == to && from.is_pole() {
        return Err(GeodesyError::UndefinedBearing);
    }

    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let x = delta_lon.sin() * lat2.cos();
    let y = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lon.cos();

    let bearing = x.atan2(y).to_degrees();
    Ok((bearing + 360.0) % 360.0)
}

/// Planar offset of a measured point from a reference point.
///
/// Projects the geodesic distance along the initial bearing, so x is
/// the east component and y the north component of the displacement.
pub fn local_offset(
    reference: &GeodeticCoordinate,
    measured: &GeodeticCoordinate,
) -> Result<LocalOffset, GeodesyError> {
    let distance = inverse_distance(reference, measured)?;
    let bearing = initial_bearing(reference, measured)?.to_radians();

    Ok(LocalOffset {
        x: distance * bearing.sin(),
        y: distance * bearing.cos(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> GeodeticCoordinate {
        GeodeticCoordinate::new(59.350791, 18.067825).unwrap()
    }

    #[test]
    fn test_offset_at_reference_is_zero() {
        let offset = local_offset(&reference(), &reference()).unwrap();
        assert_eq!(offset.x, 0.0);
        assert_eq!(offset.y, 0.0);
    }

    #[test]
    fn test_bearing_due_east() {
        let measured = GeodeticCoordinate::new(59.350791, 18.077825).unwrap();
        let bearing = initial_bearing(&reference(), &measured).unwrap();
        // Same latitude, small eastward step
        assert!((bearing - 90.0).abs() < 0.1);
    }

    #[test]
    fn test_offset_due_east() {
        let measured = GeodeticCoordinate::new(59.350791, 18.077825).unwrap();
        let offset = local_offset(&reference(), &measured).unwrap();
        assert!(offset.x > 0.0);
        assert!(offset.y.abs() < 0.1);
        // ~569 m for 0.01 degrees of longitude at this latitude
        assert!((offset.x - 569.0).abs() < 5.0);
    }

    #[test]
    fn test_bearing_due_north() {
        let measured = GeodeticCoordinate::new(59.351791, 18.067825).unwrap();
        let bearing = initial_bearing(&reference(), &measured).unwrap();
        assert!(bearing.abs() < 1e-9);
    }

    #[test]
    fn test_offset_due_north() {
        let measured = GeodeticCoordinate::new(59.351791, 18.067825).unwrap();
        let offset = local_offset(&reference(), &measured).unwrap();
        assert!(offset.x.abs() < 1e-6);
        assert!(offset.y > 0.0);
        // ~111.4 m for 0.001 degrees of latitude
        assert!((offset.y - 111.4).abs() < 1.0);
    }

    #[test]
    fn test_distance_symmetric_under_argument_swap() {
        let measured = GeodeticCoordinate::new(59.360791, 18.087825).unwrap();
        let forward = inverse_distance(&reference(), &measured).unwrap();
        let backward = inverse_distance(&measured, &reference()).unwrap();
        assert!((forward - backward).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_bearing_differs_by_half_turn() {
        let measured = GeodeticCoordinate::new(59.350791, 18.077825).unwrap();
        let forward = initial_bearing(&reference(), &measured).unwrap();
        let backward = initial_bearing(&measured, &reference()).unwrap();
        assert!(((backward - forward).abs() - 180.0).abs() < 0.1);
    }

    #[test]
    fn test_bearing_normalized() {
        let west = GeodeticCoordinate::new(59.350791, 18.057825).unwrap();
        let south = GeodeticCoordinate::new(59.340791, 18.067825).unwrap();
        for target in [west, south] {
            let bearing = initial_bearing(&reference(), &target).unwrap();
            assert!((0.0..360.0).contains(&bearing));
        }
        let west_bearing = initial_bearing(&reference(), &west).unwrap();
        assert!((west_bearing - 270.0).abs() < 0.1);
    }

    #[test]
    fn test_offset_bit_identical_for_identical_inputs() {
        let measured = GeodeticCoordinate::new(59.352345, 18.071234).unwrap();
        let first = local_offset(&reference(), &measured).unwrap();
        let second = local_offset(&reference(), &measured).unwrap();
        assert_eq!(first.x.to_bits(), second.x.to_bits());
        assert_eq!(first.y.to_bits(), second.y.to_bits());
    }

    #[test]
    fn test_bearing_undefined_at_coincident_pole() {
        let pole = GeodeticCoordinate::new(90.0, 0.0).unwrap();
        assert_eq!(
            local_offset(&pole, &pole),
            Err(GeodesyError::UndefinedBearing)
        );
    }

    #[test]
    fn test_invalid_input_rejected() {
        let invalid = GeodeticCoordinate {
            latitude: 120.0,
            longitude: 0.0,
        };
        assert_eq!(
            inverse_distance(&reference(), &invalid),
            Err(GeodesyError::InvalidLatitude(120.0))
        );
        assert!(local_offset(&invalid, &reference()).is_err());
    }
}
