//! Explicit control state.
//!
//! `ControlState` is everything the controls display. Only
//! [`update`](crate::update::update) mutates it; renderers read it.

use serde::{Deserialize, Serialize};

use crate::controls::{ControlKind, ControlProfile};
use crate::device::{ExposureMode, FocusMode, WhiteBalanceMode};
use crate::domain::ControlDomain;
use crate::mapping::{clamp_normalized, rescale};

/// Which control group the HUD shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HudSegment {
    #[default]
    Focus,
    Exposure,
    Zoom,
    Torch,
    WhiteBalance,
}

impl HudSegment {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::Exposure => "Exposure",
            Self::Zoom => "Zoom",
            Self::Torch => "Torch",
            Self::WhiteBalance => "WB",
        }
    }
}

/// Application lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenePhase {
    Active,
    Inactive,
    Background,
}

/// System thermal pressure, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum ThermalState {
    #[default]
    Nominal,
    Fair,
    Serious,
    Critical,
}

/// Slider positions, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SliderValues {
    pub lens_position: f64,
    pub exposure_duration: f64,
    pub iso: f64,
    pub zoom_factor: f64,
    pub torch_level: f64,
    pub temperature: f64,
    pub tint: f64,
}

impl Default for SliderValues {
    fn default() -> Self {
        Self {
            lens_position: 0.0,
            exposure_duration: 0.5,
            iso: 0.5,
            zoom_factor: 0.0,
            torch_level: 0.0,
            temperature: 0.5,
            tint: 0.5,
        }
    }
}

impl SliderValues {
    pub fn get(&self, kind: ControlKind) -> f64 {
        match kind {
            ControlKind::LensPosition => self.lens_position,
            ControlKind::Iso => self.iso,
            ControlKind::ExposureDuration => self.exposure_duration,
            ControlKind::Temperature => self.temperature,
            ControlKind::Tint => self.tint,
            ControlKind::ZoomFactor => self.zoom_factor,
            ControlKind::TorchLevel => self.torch_level,
        }
    }

    pub fn set(&mut self, kind: ControlKind, value: f64) {
        let slot = match kind {
            ControlKind::LensPosition => &mut self.lens_position,
            ControlKind::Iso => &mut self.iso,
            ControlKind::ExposureDuration => &mut self.exposure_duration,
            ControlKind::Temperature => &mut self.temperature,
            ControlKind::Tint => &mut self.tint,
            ControlKind::ZoomFactor => &mut self.zoom_factor,
            ControlKind::TorchLevel => &mut self.torch_level,
        };
        *slot = value;
    }
}

/// Everything the manual controls display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlState {
    pub sliders: SliderValues,
    /// Portion of the lens axis the lens slider spans, in normalized lens
    /// units. Full travel by default.
    pub lens_range: ControlDomain,
    pub focus_mode: FocusMode,
    pub exposure_mode: ExposureMode,
    pub white_balance_mode: WhiteBalanceMode,
    pub can_set_lens_position: bool,
    pub hud_visible: bool,
    pub selected_segment: HudSegment,
    pub cover_visible: bool,
    pub recording: bool,
    /// A start or stop request is waiting on the device.
    pub recording_pending: bool,
    /// Preview rotation in degrees.
    pub rotation_angle: f64,
    /// Recorded for a future throttling indicator; never surfaced yet.
    pub thermal_state: ThermalState,
    /// Message to show in an alert, if any.
    pub alert: Option<String>,
}

impl Default for ControlState {
    fn default() -> Self {
        Self {
            sliders: SliderValues::default(),
            lens_range: ControlDomain::UNIT,
            focus_mode: FocusMode::default(),
            exposure_mode: ExposureMode::default(),
            white_balance_mode: WhiteBalanceMode::default(),
            can_set_lens_position: false,
            hud_visible: false,
            selected_segment: HudSegment::default(),
            cover_visible: false,
            recording: false,
            recording_pending: false,
            rotation_angle: 0.0,
            thermal_state: ThermalState::default(),
            alert: None,
        }
    }
}

impl ControlState {
    /// Whether a slider currently drives the device.
    pub fn is_enabled(&self, kind: ControlKind) -> bool {
        match kind {
            ControlKind::LensPosition => self.can_set_lens_position,
            ControlKind::Iso | ControlKind::ExposureDuration => {
                self.exposure_mode == ExposureMode::Custom
            }
            ControlKind::Temperature | ControlKind::Tint => {
                self.white_balance_mode == WhiteBalanceMode::Locked
            }
            ControlKind::ZoomFactor | ControlKind::TorchLevel => true,
        }
    }

    /// Physical lens position selected by the lens slider.
    pub fn lens_target(&self, profile: &ControlProfile) -> f64 {
        let window = rescale(0.0, 1.0, self.lens_range.min(), self.lens_range.max());
        profile
            .lens_position
            .to_physical(window(self.sliders.lens_position))
    }

    /// Lens slider position displaying a physical lens position.
    pub fn lens_slider_for(&self, profile: &ControlProfile, position: f64) -> f64 {
        let axis = &profile.lens_position;
        let normalized = axis.to_normalized(axis.domain.clamp(position));
        let window = rescale(self.lens_range.min(), self.lens_range.max(), 0.0, 1.0);
        clamp_normalized(window(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceCapabilities;

    const EPSILON: f64 = 1e-9;

    fn profile() -> ControlProfile {
        ControlProfile::for_device(&DeviceCapabilities {
            min_iso: 25.0,
            max_iso: 1600.0,
            min_zoom_factor: 1.0,
            max_zoom_factor: 16.0,
            max_white_balance_gain: 4.0,
            has_torch: true,
        })
        .unwrap()
    }

    #[test]
    fn test_default_sliders_match_initial_positions() {
        let state = ControlState::default();
        assert_eq!(state.sliders.exposure_duration, 0.5);
        assert_eq!(state.sliders.iso, 0.5);
        assert_eq!(state.sliders.temperature, 0.5);
        assert_eq!(state.sliders.zoom_factor, 0.0);
        assert!(state.alert.is_none());
    }

    #[test]
    fn test_lens_target_full_range_is_identity() {
        let mut state = ControlState::default();
        state.sliders.lens_position = 0.3;
        assert!((state.lens_target(&profile()) - 0.3).abs() < EPSILON);
    }

    #[test]
    fn test_lens_range_narrows_target() {
        let mut state = ControlState::default();
        state.lens_range = ControlDomain::new(0.2, 0.4).unwrap();
        state.sliders.lens_position = 0.5;
        let target = state.lens_target(&profile());
        assert!((target - 0.3).abs() < EPSILON);
        let back = state.lens_slider_for(&profile(), target);
        assert!((back - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_lens_slider_clamps_outside_working_range() {
        let mut state = ControlState::default();
        state.lens_range = ControlDomain::new(0.2, 0.4).unwrap();
        assert_eq!(state.lens_slider_for(&profile(), 0.9), 1.0);
        assert_eq!(state.lens_slider_for(&profile(), 0.0), 0.0);
    }

    #[test]
    fn test_enabled_controls_follow_modes() {
        let mut state = ControlState::default();
        assert!(!state.is_enabled(ControlKind::Iso));
        assert!(state.is_enabled(ControlKind::ZoomFactor));
        state.exposure_mode = ExposureMode::Custom;
        assert!(state.is_enabled(ControlKind::ExposureDuration));
        assert!(!state.is_enabled(ControlKind::Tint));
    }

    #[test]
    fn test_slider_values_get_set() {
        let mut sliders = SliderValues::default();
        for (i, kind) in ControlKind::all().iter().enumerate() {
            sliders.set(*kind, i as f64 / 10.0);
        }
        for (i, kind) in ControlKind::all().iter().enumerate() {
            assert_eq!(sliders.get(*kind), i as f64 / 10.0);
        }
    }
}
