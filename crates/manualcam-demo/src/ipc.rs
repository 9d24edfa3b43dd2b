//! JSON-lines message contracts between the controller and its UI.
//!
//! One message per line, serialized as `{"type": ..., "data": ...}`.

use serde::{Deserialize, Serialize};

use manualcam_core::device::{ExposureMode, FocusMode, WhiteBalanceMode};
use manualcam_core::orientation::DeviceOrientation;
use manualcam_core::state::{HudSegment, ScenePhase, ThermalState};
use manualcam_core::{Action, ControlState};

/// Messages from the controller to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ControllerToUi {
    /// Full control state after it changed, or on request.
    StateChanged {
        state: ControlState,
    },

    /// A message could not be handled.
    Error {
        message: String,
    },
}

/// Messages from the UI to the controller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToController {
    /// Request a fresh snapshot of the control state.
    RequestState,
    SetFocusMode { mode: FocusMode },
    SetLensPosition { value: f64 },
    SetLensRange { min: f64, max: f64 },
    SetExposureMode { mode: ExposureMode },
    SetExposureDuration { value: f64 },
    SetIso { value: f64 },
    SetZoomFactor { value: f64 },
    SetTorchLevel { value: f64 },
    SetWhiteBalanceMode { mode: WhiteBalanceMode },
    SetTemperature { value: f64 },
    SetTint { value: f64 },
    LockGrayWorld,
    ToggleHud,
    SelectSegment { segment: HudSegment },
    ToggleCover,
    ToggleRecording,
    SceneChanged { phase: ScenePhase },
    SubjectAreaChanged,
    OrientationChanged { orientation: DeviceOrientation },
    ThermalStateChanged { state: ThermalState },
    DismissAlert,
    /// Shut the controller down.
    Quit,
}

impl UiToController {
    /// The control action this message requests, if it is one.
    ///
    /// Slider values are normalized positions in `[0, 1]`.
    pub fn into_action(self) -> Option<Action> {
        let action = match self {
            Self::RequestState | Self::Quit => return None,
            Self::SetFocusMode { mode } => Action::SetFocusMode(mode),
            Self::SetLensPosition { value } => Action::SetLensSlider(value),
            Self::SetLensRange { min, max } => Action::SetLensRange { min, max },
            Self::SetExposureMode { mode } => Action::SetExposureMode(mode),
            Self::SetExposureDuration { value } => Action::SetExposureDurationSlider(value),
            Self::SetIso { value } => Action::SetIsoSlider(value),
            Self::SetZoomFactor { value } => Action::SetZoomSlider(value),
            Self::SetTorchLevel { value } => Action::SetTorchSlider(value),
            Self::SetWhiteBalanceMode { mode } => Action::SetWhiteBalanceMode(mode),
            Self::SetTemperature { value } => Action::SetTemperatureSlider(value),
            Self::SetTint { value } => Action::SetTintSlider(value),
            Self::LockGrayWorld => Action::LockGrayWorld,
            Self::ToggleHud => Action::ToggleHud,
            Self::SelectSegment { segment } => Action::SelectSegment(segment),
            Self::ToggleCover => Action::ToggleCover,
            Self::ToggleRecording => Action::ToggleRecording,
            Self::SceneChanged { phase } => Action::SceneChanged(phase),
            Self::SubjectAreaChanged => Action::SubjectAreaChanged,
            Self::OrientationChanged { orientation } => Action::OrientationChanged(orientation),
            Self::ThermalStateChanged { state } => Action::ThermalStateChanged(state),
            Self::DismissAlert => Action::DismissAlert,
        };
        Some(action)
    }
}
