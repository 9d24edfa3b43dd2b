//! Per-axis control definitions.
//!
//! `ControlProfile` is the single source of truth for how every slider maps
//! onto the device. The update loop reads it for both directions: slider to
//! device when the user moves a control, device to slider when readings come
//! back.

use serde::{Deserialize, Serialize};

use crate::device::DeviceCapabilities;
use crate::domain::{ControlDomain, Gamma};
use crate::error::MappingError;
use crate::mapping;

/// Shortest exposure the duration slider reaches, in seconds.
pub const MIN_EXPOSURE_DURATION: f64 = 1.0 / 1000.0;
/// Longest exposure the duration slider reaches, in seconds.
pub const MAX_EXPOSURE_DURATION: f64 = 1.0 / 3.0;
/// Exposure duration response. Most of the slider travel covers fast shutter
/// speeds.
pub const EXPOSURE_DURATION_GAMMA: f64 = 5.0;

pub const MIN_TEMPERATURE: f64 = 3000.0;
pub const MAX_TEMPERATURE: f64 = 8000.0;

pub const MIN_TINT: f64 = -150.0;
pub const MAX_TINT: f64 = 150.0;

/// Zoom response. Keeps fine control near 1x.
pub const ZOOM_FACTOR_GAMMA: f64 = 3.333;

/// Identifies one manual control axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControlKind {
    LensPosition,
    Iso,
    ExposureDuration,
    Temperature,
    Tint,
    ZoomFactor,
    TorchLevel,
}

impl ControlKind {
    /// Human-readable label for UI and log output.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LensPosition => "Lens Position",
            Self::Iso => "ISO",
            Self::ExposureDuration => "Exposure Duration",
            Self::Temperature => "Temperature",
            Self::Tint => "Tint",
            Self::ZoomFactor => "Video Zoom Factor",
            Self::TorchLevel => "Torch Level",
        }
    }

    pub fn all() -> &'static [Self] {
        const ALL: [ControlKind; 7] = [
            ControlKind::LensPosition,
            ControlKind::Iso,
            ControlKind::ExposureDuration,
            ControlKind::Temperature,
            ControlKind::Tint,
            ControlKind::ZoomFactor,
            ControlKind::TorchLevel,
        ];
        &ALL
    }
}

/// One slider's physical domain and response curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlAxis {
    pub domain: ControlDomain,
    #[serde(default)]
    pub gamma: Gamma,
}

impl ControlAxis {
    pub fn new(min: f64, max: f64, gamma: f64) -> Result<Self, MappingError> {
        Ok(Self {
            domain: ControlDomain::new(min, max)?,
            gamma: Gamma::new(gamma)?,
        })
    }

    /// Slider position to physical value. Does not clamp.
    pub fn to_physical(&self, normalized: f64) -> f64 {
        mapping::forward(
            normalized,
            self.domain.min(),
            self.domain.max(),
            self.gamma.get(),
        )
    }

    /// Physical value to slider position. Does not clamp.
    pub fn to_normalized(&self, physical: f64) -> f64 {
        mapping::inverse(
            physical,
            self.domain.min(),
            self.domain.max(),
            self.gamma.get(),
        )
    }
}

/// Mapping configuration for every control axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlProfile {
    pub lens_position: ControlAxis,
    pub iso: ControlAxis,
    pub exposure_duration: ControlAxis,
    pub temperature: ControlAxis,
    pub tint: ControlAxis,
    pub zoom_factor: ControlAxis,
    pub torch_level: ControlAxis,
    /// Upper bound for white balance gains sent to the device.
    pub max_white_balance_gain: f32,
}

impl ControlProfile {
    /// Build a profile for a device's active format.
    ///
    /// Fails with [`MappingError::InvalidDomain`] when the device reports a
    /// degenerate ISO or zoom range.
    pub fn for_device(caps: &DeviceCapabilities) -> Result<Self, MappingError> {
        let profile = Self {
            lens_position: ControlAxis::new(0.0, 1.0, 1.0)?,
            iso: ControlAxis::new(caps.min_iso as f64, caps.max_iso as f64, 1.0)?,
            exposure_duration: ControlAxis::new(
                MIN_EXPOSURE_DURATION,
                MAX_EXPOSURE_DURATION,
                EXPOSURE_DURATION_GAMMA,
            )?,
            temperature: ControlAxis::new(MIN_TEMPERATURE, MAX_TEMPERATURE, 1.0)?,
            tint: ControlAxis::new(MIN_TINT, MAX_TINT, 1.0)?,
            zoom_factor: ControlAxis::new(
                caps.min_zoom_factor,
                caps.max_zoom_factor,
                ZOOM_FACTOR_GAMMA,
            )?,
            torch_level: ControlAxis::new(0.0, 1.0, 1.0)?,
            max_white_balance_gain: caps.max_white_balance_gain,
        };
        tracing::debug!(
            iso_min = caps.min_iso,
            iso_max = caps.max_iso,
            zoom_max = caps.max_zoom_factor,
            "built control profile"
        );
        Ok(profile)
    }

    /// Parse a profile from JSON. Domains and exponents are validated while
    /// deserializing.
    pub fn from_json(json: &str) -> Result<Self, MappingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn axis(&self, kind: ControlKind) -> &ControlAxis {
        match kind {
            ControlKind::LensPosition => &self.lens_position,
            ControlKind::Iso => &self.iso,
            ControlKind::ExposureDuration => &self.exposure_duration,
            ControlKind::Temperature => &self.temperature,
            ControlKind::Tint => &self.tint,
            ControlKind::ZoomFactor => &self.zoom_factor,
            ControlKind::TorchLevel => &self.torch_level,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn caps() -> DeviceCapabilities {
        DeviceCapabilities {
            min_iso: 25.0,
            max_iso: 1600.0,
            min_zoom_factor: 1.0,
            max_zoom_factor: 16.0,
            max_white_balance_gain: 4.0,
            has_torch: true,
        }
    }

    #[test]
    fn test_profile_for_device_uses_device_ranges() {
        let profile = ControlProfile::for_device(&caps()).unwrap();
        assert_eq!(profile.iso.domain.min(), 25.0);
        assert_eq!(profile.iso.domain.max(), 1600.0);
        assert_eq!(profile.zoom_factor.gamma.get(), ZOOM_FACTOR_GAMMA);
        assert_eq!(profile.exposure_duration.gamma.get(), EXPOSURE_DURATION_GAMMA);
    }

    #[test]
    fn test_profile_rejects_degenerate_iso_range() {
        let mut caps = caps();
        caps.max_iso = caps.min_iso;
        assert!(matches!(
            ControlProfile::for_device(&caps),
            Err(MappingError::InvalidDomain { .. })
        ));
    }

    #[test]
    fn test_axis_temperature_midpoint() {
        let profile = ControlProfile::for_device(&caps()).unwrap();
        let axis = profile.axis(ControlKind::Temperature);
        assert!((axis.to_physical(0.5) - 5500.0).abs() < EPSILON);
        assert!((axis.to_normalized(5500.0) - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_axis_tint_is_centered() {
        let profile = ControlProfile::for_device(&caps()).unwrap();
        assert!(profile.tint.to_physical(0.5).abs() < EPSILON);
    }

    #[test]
    fn test_zoom_slider_keeps_fine_control_near_one() {
        let profile = ControlProfile::for_device(&caps()).unwrap();
        // A quarter of the travel stays well under 2x.
        assert!(profile.zoom_factor.to_physical(0.25) < 1.2);
        assert!((profile.zoom_factor.to_physical(1.0) - 16.0).abs() < EPSILON);
    }

    #[test]
    fn test_profile_json_round_trips_and_validates() {
        let profile = ControlProfile::for_device(&caps()).unwrap();
        let json = serde_json::to_string(&profile).unwrap();
        let parsed = ControlProfile::from_json(&json).unwrap();
        assert_eq!(parsed, profile);

        let broken = json.replace("1600.0", "25.0");
        assert!(matches!(
            ControlProfile::from_json(&broken),
            Err(MappingError::Profile(_))
        ));
    }

    #[test]
    fn test_all_kinds_have_axes() {
        let profile = ControlProfile::for_device(&caps()).unwrap();
        for kind in ControlKind::all() {
            let axis = profile.axis(*kind);
            assert!(axis.domain.span() > 0.0, "{}", kind.label());
        }
    }
}
