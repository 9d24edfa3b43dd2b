//! The control update loop.
//!
//! User input, device results, and environment changes all arrive as an
//! [`Action`]. [`update`] applies it to [`ControlState`] and returns the
//! [`DeviceCommand`]s the caller must run. Outcomes of those commands come
//! back as further actions, so there are no completion callbacks and no
//! hidden timers: the caller decides when to send [`Action::PollTick`].
//!
//! ```text
//! state ──render──▶ UI ──Action──▶ update ──DeviceCommand──▶ worker
//!   ▲                                 │                         │
//!   └─────────────mutates─────────────┘◀────────Action──────────┘
//! ```

use crate::controls::{ControlAxis, ControlProfile};
use crate::device::{
    DeviceReadings, ExposureMode, FocusMode, PointOfInterest, WhiteBalanceMode,
};
use crate::domain::ControlDomain;
use crate::mapping::clamp_normalized;
use crate::orientation::{DeviceOrientation, rotation_angle};
use crate::state::{ControlState, HudSegment, ScenePhase, ThermalState};
use crate::white_balance::TemperatureTint;

/// Everything that can change control state.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    // User input
    SetFocusMode(FocusMode),
    SetLensSlider(f64),
    /// Narrow or widen the lens slider's working range, in normalized lens
    /// units.
    SetLensRange { min: f64, max: f64 },
    SetExposureMode(ExposureMode),
    SetExposureDurationSlider(f64),
    SetIsoSlider(f64),
    SetZoomSlider(f64),
    SetTorchSlider(f64),
    SetWhiteBalanceMode(WhiteBalanceMode),
    SetTemperatureSlider(f64),
    SetTintSlider(f64),
    LockGrayWorld,
    ToggleHud,
    SelectSegment(HudSegment),
    ToggleCover,
    ToggleRecording,
    SceneChanged(ScenePhase),
    SubjectAreaChanged,
    DismissAlert,
    /// Time to read the lens position back from the device.
    PollTick,

    // Device results
    ReadingsReceived(DeviceReadings),
    LensPositionPolled(f32),
    GrayWorldApplied(TemperatureTint),
    /// A device command failed. State is resynchronized from the device.
    CommandFailed {
        command: DeviceCommand,
        message: String,
    },
    RecordingStarted,
    RecordingFinished { success: bool },

    // Environment
    OrientationChanged(DeviceOrientation),
    ThermalStateChanged(ThermalState),
}

/// Work for the capture device. Each command is applied in one device
/// configuration lock.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCommand {
    ReadSettings,
    PollLensPosition,
    SetFocusMode(FocusMode),
    SetLensPosition(f32),
    SetExposureMode(ExposureMode),
    /// `None` keeps the device's current value for that component.
    SetCustomExposure {
        duration: Option<f64>,
        iso: Option<f32>,
    },
    SetTorchLevel(f32),
    SetZoomFactor(f64),
    SetWhiteBalanceMode(WhiteBalanceMode),
    /// Lock white balance at a temperature and tint. Gains are derived and
    /// clamped to `max_gain` by the executor.
    SetWhiteBalance {
        values: TemperatureTint,
        max_gain: f32,
    },
    /// Lock white balance at gray-world gains, clamped to `max_gain`.
    LockGrayWorld {
        max_gain: f32,
    },
    FocusAtPoint {
        point: PointOfInterest,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        monitor_subject_area: bool,
    },
    StartRecording,
    StopRecording,
}

impl DeviceCommand {
    /// What the command sets, for error messages.
    pub fn context(&self) -> &'static str {
        match self {
            Self::ReadSettings => "initial camera settings",
            Self::PollLensPosition => "lens position readback",
            Self::SetFocusMode(_) => "focus mode",
            Self::SetLensPosition(_) => "lens position",
            Self::SetExposureMode(_) => "exposure mode",
            Self::SetCustomExposure { iso: Some(_), duration: None } => "ISO",
            Self::SetCustomExposure { .. } => "exposure duration",
            Self::SetTorchLevel(_) => "torch level",
            Self::SetZoomFactor(_) => "zoom factor",
            Self::SetWhiteBalanceMode(_) => "white balance mode",
            Self::SetWhiteBalance { .. } => "white balance gains",
            Self::LockGrayWorld { .. } => "gray world",
            Self::FocusAtPoint { .. } => "point of interest",
            Self::StartRecording => "movie recording",
            Self::StopRecording => "movie recording",
        }
    }
}

/// Apply one action and return the device commands it requires.
pub fn update(
    state: &mut ControlState,
    action: Action,
    profile: &ControlProfile,
) -> Vec<DeviceCommand> {
    match action {
        Action::SetFocusMode(mode) => {
            state.focus_mode = mode;
            state.can_set_lens_position = mode == FocusMode::Locked;
            vec![DeviceCommand::SetFocusMode(mode)]
        }
        Action::SetLensSlider(value) => {
            state.sliders.lens_position = slider_input("lens position", value);
            if state.focus_mode != FocusMode::Locked {
                return Vec::new();
            }
            let position = state.lens_target(profile);
            vec![DeviceCommand::SetLensPosition(position as f32)]
        }
        Action::SetLensRange { min, max } => {
            match ControlDomain::new(min, max) {
                Ok(range) if range.min() >= 0.0 && range.max() <= 1.0 => {
                    tracing::debug!(min, max, "lens slider range changed");
                    state.lens_range = range;
                }
                _ => {
                    tracing::warn!(min, max, "rejected lens slider range");
                    state.alert = Some(format!(
                        "Lens slider range [{min}, {max}] must lie within [0, 1] with min below max"
                    ));
                }
            }
            Vec::new()
        }
        Action::SetExposureMode(mode) => {
            state.exposure_mode = mode;
            vec![DeviceCommand::SetExposureMode(mode)]
        }
        Action::SetExposureDurationSlider(value) => {
            let value = slider_input("exposure duration", value);
            state.sliders.exposure_duration = value;
            if state.exposure_mode != ExposureMode::Custom {
                return Vec::new();
            }
            let seconds = profile.exposure_duration.to_physical(value);
            vec![DeviceCommand::SetCustomExposure {
                duration: Some(seconds),
                iso: None,
            }]
        }
        Action::SetIsoSlider(value) => {
            let value = slider_input("ISO", value);
            state.sliders.iso = value;
            if state.exposure_mode != ExposureMode::Custom {
                return Vec::new();
            }
            let iso = profile.iso.to_physical(value);
            vec![DeviceCommand::SetCustomExposure {
                duration: None,
                iso: Some(iso as f32),
            }]
        }
        Action::SetZoomSlider(value) => {
            let value = slider_input("zoom factor", value);
            state.sliders.zoom_factor = value;
            vec![DeviceCommand::SetZoomFactor(
                profile.zoom_factor.to_physical(value),
            )]
        }
        Action::SetTorchSlider(value) => {
            let value = slider_input("torch level", value);
            state.sliders.torch_level = value;
            vec![DeviceCommand::SetTorchLevel(
                profile.torch_level.to_physical(value) as f32,
            )]
        }
        Action::SetWhiteBalanceMode(mode) => {
            state.white_balance_mode = mode;
            vec![DeviceCommand::SetWhiteBalanceMode(mode)]
        }
        Action::SetTemperatureSlider(value) => {
            state.sliders.temperature = slider_input("temperature", value);
            white_balance_command(state, profile)
        }
        Action::SetTintSlider(value) => {
            state.sliders.tint = slider_input("tint", value);
            white_balance_command(state, profile)
        }
        Action::LockGrayWorld => {
            if state.white_balance_mode != WhiteBalanceMode::Locked {
                return Vec::new();
            }
            vec![DeviceCommand::LockGrayWorld {
                max_gain: profile.max_white_balance_gain,
            }]
        }
        Action::ToggleHud => {
            state.hud_visible = !state.hud_visible;
            Vec::new()
        }
        Action::SelectSegment(segment) => {
            state.selected_segment = segment;
            Vec::new()
        }
        Action::ToggleCover => {
            state.cover_visible = !state.cover_visible;
            Vec::new()
        }
        Action::ToggleRecording => {
            if state.recording_pending {
                tracing::debug!("recording toggle ignored while a change is in flight");
                return Vec::new();
            }
            state.recording_pending = true;
            if state.recording {
                vec![DeviceCommand::StopRecording]
            } else {
                vec![DeviceCommand::StartRecording]
            }
        }
        Action::SceneChanged(phase) => {
            tracing::info!(?phase, "scene phase changed");
            match phase {
                ScenePhase::Inactive | ScenePhase::Background if state.recording => {
                    state.recording_pending = true;
                    vec![DeviceCommand::StopRecording]
                }
                _ => Vec::new(),
            }
        }
        Action::SubjectAreaChanged => vec![DeviceCommand::FocusAtPoint {
            point: PointOfInterest::CENTER,
            focus_mode: state.focus_mode,
            exposure_mode: state.exposure_mode,
            monitor_subject_area: false,
        }],
        Action::DismissAlert => {
            state.alert = None;
            Vec::new()
        }
        Action::PollTick => vec![DeviceCommand::PollLensPosition],
        Action::ReadingsReceived(readings) => {
            apply_readings(state, &readings, profile);
            Vec::new()
        }
        Action::LensPositionPolled(position) => {
            state.sliders.lens_position = state.lens_slider_for(profile, position as f64);
            Vec::new()
        }
        Action::GrayWorldApplied(values) => {
            state.sliders.temperature = readback(&profile.temperature, values.temperature as f64);
            state.sliders.tint = readback(&profile.tint, values.tint as f64);
            Vec::new()
        }
        Action::CommandFailed { command, message } => {
            let context = command.context();
            tracing::warn!(context, %message, "device command failed");
            state.alert = Some(format!("Error setting {context}: {message}"));
            match command {
                DeviceCommand::ReadSettings | DeviceCommand::PollLensPosition => Vec::new(),
                DeviceCommand::StartRecording | DeviceCommand::StopRecording => {
                    state.recording_pending = false;
                    vec![DeviceCommand::ReadSettings]
                }
                _ => vec![DeviceCommand::ReadSettings],
            }
        }
        Action::RecordingStarted => {
            state.recording_pending = false;
            state.recording = true;
            Vec::new()
        }
        Action::RecordingFinished { success } => {
            if !success {
                tracing::warn!("recording did not finish successfully");
            }
            state.recording_pending = false;
            state.recording = false;
            Vec::new()
        }
        Action::OrientationChanged(orientation) => {
            state.rotation_angle = rotation_angle(orientation);
            Vec::new()
        }
        Action::ThermalStateChanged(thermal) => {
            // TODO: surface a throttling hint once the HUD has a slot for it.
            tracing::debug!(?thermal, "thermal state changed");
            state.thermal_state = thermal;
            Vec::new()
        }
    }
}

/// Clamp a slider input, logging when it strayed out of range.
fn slider_input(control: &'static str, value: f64) -> f64 {
    let clamped = clamp_normalized(value);
    if clamped != value {
        tracing::warn!(control, value, clamped, "slider value out of range");
    }
    clamped
}

/// Slider position displaying a device reading, clamped into the axis first.
fn readback(axis: &ControlAxis, physical: f64) -> f64 {
    clamp_normalized(axis.to_normalized(axis.domain.clamp(physical)))
}

fn white_balance_command(state: &ControlState, profile: &ControlProfile) -> Vec<DeviceCommand> {
    if state.white_balance_mode != WhiteBalanceMode::Locked {
        return Vec::new();
    }
    let values = TemperatureTint {
        temperature: profile.temperature.to_physical(state.sliders.temperature) as f32,
        tint: profile.tint.to_physical(state.sliders.tint) as f32,
    };
    vec![DeviceCommand::SetWhiteBalance {
        values,
        max_gain: profile.max_white_balance_gain,
    }]
}

fn apply_readings(state: &mut ControlState, readings: &DeviceReadings, profile: &ControlProfile) {
    state.focus_mode = readings.focus_mode;
    state.exposure_mode = readings.exposure_mode;
    state.white_balance_mode = readings.white_balance_mode;
    state.can_set_lens_position = readings.focus_mode == FocusMode::Locked;

    let sliders = &mut state.sliders;
    sliders.iso = readback(&profile.iso, readings.iso as f64);
    sliders.exposure_duration = readback(&profile.exposure_duration, readings.exposure_duration);
    sliders.zoom_factor = readback(&profile.zoom_factor, readings.zoom_factor);
    sliders.temperature = readback(&profile.temperature, readings.white_balance.temperature as f64);
    sliders.tint = readback(&profile.tint, readings.white_balance.tint as f64);
    state.sliders.lens_position = state.lens_slider_for(profile, readings.lens_position as f64);
}
