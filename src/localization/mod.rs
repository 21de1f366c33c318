//! Fixed-frame localization built on the geodesy primitives

use crate::geodesy::{self, projection, GeodesyError, GeodeticCoordinate, LocalOffset};
use crate::lifecycle::{LifecycleNode, LifecycleNodeBase, State};
use std::any::Any;
use std::collections::HashMap;

/// Reference point used when no parameters are supplied
pub const DEFAULT_REFERENCE: GeodeticCoordinate = GeodeticCoordinate {
    latitude: 59.350791,
    longitude: 18.067825,
};

/// UTM zone used when no parameters are supplied
pub const DEFAULT_UTM_ZONE: u8 = 34;

/// Planar vehicle state derived from a single GPS fix.
///
/// The projector has no heading or speed information, so yaw and
/// velocity are always zero and the covariance is left unknown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleState {
    pub x: f64,
    pub y: f64,
    pub yaw: f64,
    pub velocity: f64,
    pub covariance: [f64; 16],
}

/// The reference point expressed in the fixed UTM zone.
///
/// Carries identity orientation and zero elevation by construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorTransform {
    /// UTM easting of the reference point, meters
    pub easting: f64,
    /// UTM northing of the reference point, meters
    pub northing: f64,
}

/// Localization stack projecting GPS fixes into the fixed local frame.
///
/// The reference point and UTM zone are set once, before
/// `on_configure`, and stay immutable for the lifetime of the
/// component. Offset computation borrows `&self` only and is safe to
/// call from concurrent subscription callbacks.
pub struct LocalizationStack {
    base: LifecycleNodeBase,
    reference: GeodeticCoordinate,
    utm_zone: u8,
    publish_frame_transform: bool,
    anchor: Option<AnchorTransform>,
}

impl LocalizationStack {
    /// Create a new localization stack with the default reference point
    pub fn new() -> Self {
        LocalizationStack {
            base: LifecycleNodeBase::new("localization_stack"),
            reference: DEFAULT_REFERENCE,
            utm_zone: DEFAULT_UTM_ZONE,
            publish_frame_transform: true,
            anchor: None,
        }
    }

    /// Create a localization stack anchored at a specific reference point
    pub fn with_reference(reference: GeodeticCoordinate, utm_zone: u8) -> Self {
        LocalizationStack {
            base: LifecycleNodeBase::new("localization_stack"),
            reference,
            utm_zone,
            publish_frame_transform: true,
            anchor: None,
        }
    }

    /// Configure the stack with parameters.
    ///
    /// Accepted keys: `reference_latitude`, `reference_longitude`,
    /// `utm_zone`. Rejected once the component has been configured,
    /// since the reference point is immutable after initialization.
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<(), String> {
        if self.base.is_configured() {
            return Err("Reference point is immutable after configuration".to_string());
        }

        if let Some(&latitude) = params.get("reference_latitude") {
            if !latitude.is_finite() || latitude.abs() > 90.0 {
                return Err("Reference latitude must be within [-90, 90]".to_string());
            }
            self.reference.latitude = latitude;
        }

        if let Some(&longitude) = params.get("reference_longitude") {
            if !longitude.is_finite() || longitude.abs() > 180.0 {
                return Err("Reference longitude must be within [-180, 180]".to_string());
            }
            self.reference.longitude = longitude;
        }

        if let Some(&zone) = params.get("utm_zone") {
            if !(1.0..=60.0).contains(&zone) || zone.fract() != 0.0 {
                return Err("UTM zone must be an integer within [1, 60]".to_string());
            }
            self.utm_zone = zone as u8;
        }

        Ok(())
    }

    /// Reference point the local frame is anchored to
    pub fn reference(&self) -> GeodeticCoordinate {
        self.reference
    }

    /// Fixed UTM zone used for the anchor projection
    pub fn utm_zone(&self) -> u8 {
        self.utm_zone
    }

    /// Whether the per-fix frame transform should be emitted
    pub fn publish_frame_transform(&self) -> bool {
        self.publish_frame_transform
    }

    /// Enable or disable the per-fix frame transform output
    pub fn set_publish_frame_transform(&mut self, enabled: bool) {
        self.publish_frame_transform = enabled;
    }

    /// Offset of a measured fix from the reference point
    pub fn local_offset(
        &self,
        measured: &GeodeticCoordinate,
    ) -> Result<LocalOffset, GeodesyError> {
        geodesy::local_offset(&self.reference, measured)
    }

    /// Vehicle-state record for a measured fix
    pub fn vehicle_state(
        &self,
        measured: &GeodeticCoordinate,
    ) -> Result<VehicleState, GeodesyError> {
        let offset = self.local_offset(measured)?;
        Ok(VehicleState {
            x: offset.x,
            y: offset.y,
            yaw: 0.0,
            velocity: 0.0,
            covariance: [0.0; 16],
        })
    }

    /// Anchor computed during configuration, if any
    pub fn anchor(&self) -> Option<AnchorTransform> {
        self.anchor
    }

    /// Project the reference point into the fixed UTM zone
    pub fn compute_anchor(&self) -> Result<AnchorTransform, GeodesyError> {
        let (easting, northing) = projection::utm_forward(&self.reference, self.utm_zone)?;
        Ok(AnchorTransform { easting, northing })
    }
}

impl Default for LocalizationStack {
    fn default() -> Self {
        LocalizationStack::new()
    }
}

impl LifecycleNode for LocalizationStack {
    fn on_configure(&mut self) -> Result<(), String> {
        println!("Configuring localization stack");
        self.reference.validate().map_err(|e| e.to_string())?;
        self.anchor = Some(self.compute_anchor().map_err(|e| e.to_string())?);
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_activate(&mut self) -> Result<(), String> {
        println!("Activating localization stack");
        self.base.set_state(State::Active);
        Ok(())
    }

    fn on_deactivate(&mut self) -> Result<(), String> {
        println!("Deactivating localization stack");
        self.base.set_state(State::Inactive);
        Ok(())
    }

    fn on_cleanup(&mut self) -> Result<(), String> {
        println!("Cleaning up localization stack");
        self.anchor = None;
        self.base.set_state(State::Unconfigured);
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_stack() -> LocalizationStack {
        let mut stack = LocalizationStack::new();
        stack.on_configure().unwrap();
        stack.on_activate().unwrap();
        stack
    }

    #[test]
    fn test_configure_accepts_valid_parameters() {
        let mut stack = LocalizationStack::new();
        let mut params = HashMap::new();
        params.insert("reference_latitude".to_string(), 48.8584);
        params.insert("reference_longitude".to_string(), 2.2945);
        params.insert("utm_zone".to_string(), 31.0);
        stack.configure(&params).unwrap();
        assert_eq!(stack.reference().latitude, 48.8584);
        assert_eq!(stack.utm_zone(), 31);
    }

    #[test]
    fn test_configure_rejects_bad_latitude() {
        let mut stack = LocalizationStack::new();
        let mut params = HashMap::new();
        params.insert("reference_latitude".to_string(), 100.0);
        assert!(stack.configure(&params).is_err());
    }

    #[test]
    fn test_configure_rejects_fractional_zone() {
        let mut stack = LocalizationStack::new();
        let mut params = HashMap::new();
        params.insert("utm_zone".to_string(), 34.5);
        assert!(stack.configure(&params).is_err());
    }

    #[test]
    fn test_reference_immutable_after_configure() {
        let mut stack = configured_stack();
        let mut params = HashMap::new();
        params.insert("reference_latitude".to_string(), 10.0);
        assert!(stack.configure(&params).is_err());
        assert_eq!(stack.reference(), DEFAULT_REFERENCE);
    }

    #[test]
    fn test_vehicle_state_has_zero_heading_and_velocity() {
        let stack = configured_stack();
        let measured = GeodeticCoordinate::new(59.350791, 18.077825).unwrap();
        let state = stack.vehicle_state(&measured).unwrap();
        assert!(state.x > 0.0);
        assert!(state.y.abs() < 0.1);
        assert_eq!(state.yaw, 0.0);
        assert_eq!(state.velocity, 0.0);
        assert_eq!(state.covariance, [0.0; 16]);
    }

    #[test]
    fn test_vehicle_state_rejects_invalid_fix() {
        let stack = configured_stack();
        let invalid = GeodeticCoordinate {
            latitude: -91.0,
            longitude: 0.0,
        };
        assert!(stack.vehicle_state(&invalid).is_err());
    }

    #[test]
    fn test_anchor_set_by_configure() {
        let mut stack = LocalizationStack::new();
        assert!(stack.anchor().is_none());
        stack.on_configure().unwrap();
        let anchor = stack.anchor().unwrap();
        assert!(anchor.easting < 500_000.0);
        assert!(anchor.northing > 6_000_000.0);
    }

    #[test]
    fn test_anchor_invariant_across_calls() {
        let stack = configured_stack();
        let first = stack.compute_anchor().unwrap();
        let second = stack.compute_anchor().unwrap();
        assert_eq!(first.easting.to_bits(), second.easting.to_bits());
        assert_eq!(first.northing.to_bits(), second.northing.to_bits());
    }

    #[test]
    fn test_configure_fails_for_invalid_reference() {
        let reference = GeodeticCoordinate {
            latitude: 95.0,
            longitude: 0.0,
        };
        let mut stack = LocalizationStack::with_reference(reference, 34);
        assert!(stack.on_configure().is_err());
        assert!(stack.anchor().is_none());
    }
}
