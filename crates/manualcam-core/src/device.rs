//! The capture device collaborator.
//!
//! Everything the control layer needs from the platform capture framework is
//! expressed through [`CaptureDevice`]. Implementations own locking the
//! device for configuration; each mutating call is one lock/apply/unlock
//! cycle and reports failure through [`DeviceError`].

use serde::{Deserialize, Serialize};

use crate::error::DeviceError;
use crate::white_balance::{TemperatureTint, WhiteBalanceGains};

/// Focus modes the controls expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FocusMode {
    /// Device keeps refocusing on its own.
    #[default]
    ContinuousAuto,
    /// Lens held at a fixed position; the lens slider is live.
    Locked,
}

impl FocusMode {
    pub fn display_name(self) -> &'static str {
        match self {
            FocusMode::ContinuousAuto => "Continuous",
            FocusMode::Locked => "Locked",
        }
    }
}

/// Exposure modes the controls expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExposureMode {
    #[default]
    ContinuousAuto,
    /// Duration and ISO come from the sliders.
    Custom,
}

impl ExposureMode {
    pub fn display_name(self) -> &'static str {
        match self {
            ExposureMode::ContinuousAuto => "Auto",
            ExposureMode::Custom => "Custom",
        }
    }
}

/// White balance modes the controls expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WhiteBalanceMode {
    #[default]
    ContinuousAuto,
    /// Gains held fixed; temperature and tint sliders are live.
    Locked,
}

impl WhiteBalanceMode {
    pub fn display_name(self) -> &'static str {
        match self {
            WhiteBalanceMode::ContinuousAuto => "Auto",
            WhiteBalanceMode::Locked => "Locked",
        }
    }
}

/// Static properties of the active device format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceCapabilities {
    pub min_iso: f32,
    pub max_iso: f32,
    pub min_zoom_factor: f64,
    pub max_zoom_factor: f64,
    pub max_white_balance_gain: f32,
    pub has_torch: bool,
}

/// A snapshot of the device's current physical settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DeviceReadings {
    /// Lens position, 0 (closest) to 1 (furthest).
    pub lens_position: f32,
    pub iso: f32,
    /// Exposure duration in seconds.
    pub exposure_duration: f64,
    pub zoom_factor: f64,
    /// White balance gains already resolved to temperature and tint.
    pub white_balance: TemperatureTint,
    pub focus_mode: FocusMode,
    pub exposure_mode: ExposureMode,
    pub white_balance_mode: WhiteBalanceMode,
}

/// Normalized point of interest in the frame, `(0, 0)` top-left.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub x: f64,
    pub y: f64,
}

impl PointOfInterest {
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
}

/// Operations the platform capture framework provides.
///
/// Calls may block while the device is locked, so callers serialize them on
/// a worker rather than issuing them from the UI loop.
pub trait CaptureDevice: Send {
    /// Static properties of the active format.
    fn capabilities(&self) -> DeviceCapabilities;

    /// Current physical settings.
    fn readings(&self) -> Result<DeviceReadings, DeviceError>;

    /// Current lens position. Cheap; used for periodic readback.
    fn lens_position(&self) -> f32;

    /// Switch focus mode. Locking holds the lens at its current position.
    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<(), DeviceError>;

    /// Move the lens. Only honored while focus is locked.
    fn set_lens_position(&mut self, position: f32) -> Result<(), DeviceError>;

    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), DeviceError>;

    /// Apply a custom exposure. `None` keeps the current value of that
    /// component.
    fn set_custom_exposure(
        &mut self,
        duration: Option<f64>,
        iso: Option<f32>,
    ) -> Result<(), DeviceError>;

    /// Torch level in `(0, 1]`; `0` turns the torch off.
    fn set_torch_level(&mut self, level: f32) -> Result<(), DeviceError>;

    fn set_zoom_factor(&mut self, factor: f64) -> Result<(), DeviceError>;

    /// Switch white balance mode. Locking holds the current gains.
    fn set_white_balance_mode(&mut self, mode: WhiteBalanceMode) -> Result<(), DeviceError>;

    /// Lock white balance with explicit gains. Gains must already be within
    /// `[1, max_white_balance_gain]`.
    fn set_white_balance_gains(&mut self, gains: WhiteBalanceGains) -> Result<(), DeviceError>;

    /// Gains that neutralize the scene's average color.
    fn gray_world_gains(&self) -> WhiteBalanceGains;

    /// Device gains producing the given temperature and tint.
    fn gains_for(&self, values: TemperatureTint) -> WhiteBalanceGains;

    /// Temperature and tint corresponding to device gains.
    fn temperature_tint_for(&self, gains: WhiteBalanceGains) -> TemperatureTint;

    /// Refocus and re-meter at a point, switching continuous modes back on.
    /// Locked focus and custom exposure are left alone.
    fn focus_at_point(
        &mut self,
        point: PointOfInterest,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        monitor_subject_area: bool,
    ) -> Result<(), DeviceError>;

    fn start_recording(&mut self) -> Result<(), DeviceError>;

    /// Stop recording. `Ok(true)` when the recording finished cleanly.
    fn stop_recording(&mut self) -> Result<bool, DeviceError>;
}
