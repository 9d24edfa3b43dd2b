//! Serialized device worker.
//!
//! Device configuration calls block while the device is locked, and the
//! device must never be configured from two places at once. The worker owns
//! the device on a dedicated thread and runs commands strictly in submission
//! order. Every outcome is reported back as an [`Action`].

use std::thread::JoinHandle;

use tokio::sync::mpsc;

use manualcam_core::device::CaptureDevice;
use manualcam_core::white_balance::normalize_gains;
use manualcam_core::{Action, DeviceCommand, DeviceError};

use crate::error::DemoError;

/// Handle for submitting commands to the device worker.
pub struct DeviceWorker {
    commands: mpsc::UnboundedSender<DeviceCommand>,
}

impl DeviceWorker {
    /// Spawn the worker thread. Outcomes are sent on `results`; the worker
    /// exits when every `DeviceWorker` is dropped or `results` closes.
    pub fn spawn(
        mut device: Box<dyn CaptureDevice>,
        results: mpsc::UnboundedSender<Action>,
    ) -> Result<(Self, JoinHandle<()>), DemoError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<DeviceCommand>();
        let thread = std::thread::Builder::new()
            .name("device-worker".into())
            .spawn(move || {
                tracing::info!("device worker started");
                while let Some(command) = rx.blocking_recv() {
                    let Some(action) = execute(device.as_mut(), &command) else {
                        continue;
                    };
                    if results.send(action).is_err() {
                        break;
                    }
                }
                tracing::info!("device worker stopped");
            })?;
        Ok((Self { commands: tx }, thread))
    }

    pub fn submit(&self, command: DeviceCommand) -> Result<(), DemoError> {
        tracing::debug!(?command, "submitting device command");
        self.commands
            .send(command)
            .map_err(|_| DemoError::WorkerStopped)
    }
}

/// Run one command against the device.
///
/// Returns the action carrying the command's result, if it has one worth
/// reporting.
pub fn execute(device: &mut dyn CaptureDevice, command: &DeviceCommand) -> Option<Action> {
    let outcome: Result<Option<Action>, DeviceError> = match command {
        DeviceCommand::ReadSettings => device.readings().map(|r| Some(Action::ReadingsReceived(r))),
        DeviceCommand::PollLensPosition => {
            Ok(Some(Action::LensPositionPolled(device.lens_position())))
        }
        DeviceCommand::SetFocusMode(mode) => device.set_focus_mode(*mode).map(|()| None),
        DeviceCommand::SetLensPosition(position) => {
            device.set_lens_position(*position).map(|()| None)
        }
        DeviceCommand::SetExposureMode(mode) => device.set_exposure_mode(*mode).map(|()| None),
        DeviceCommand::SetCustomExposure { duration, iso } => {
            device.set_custom_exposure(*duration, *iso).map(|()| None)
        }
        DeviceCommand::SetTorchLevel(level) => device.set_torch_level(*level).map(|()| None),
        DeviceCommand::SetZoomFactor(factor) => device.set_zoom_factor(*factor).map(|()| None),
        DeviceCommand::SetWhiteBalanceMode(mode) => {
            device.set_white_balance_mode(*mode).map(|()| None)
        }
        DeviceCommand::SetWhiteBalance { values, max_gain } => {
            let gains = normalize_gains(device.gains_for(*values), *max_gain);
            device.set_white_balance_gains(gains).map(|()| None)
        }
        DeviceCommand::LockGrayWorld { max_gain } => {
            let gains = normalize_gains(device.gray_world_gains(), *max_gain);
            device.set_white_balance_gains(gains).map(|()| {
                Some(Action::GrayWorldApplied(device.temperature_tint_for(gains)))
            })
        }
        DeviceCommand::FocusAtPoint {
            point,
            focus_mode,
            exposure_mode,
            monitor_subject_area,
        } => device
            .focus_at_point(*point, *focus_mode, *exposure_mode, *monitor_subject_area)
            .map(|()| None),
        DeviceCommand::StartRecording => device
            .start_recording()
            .map(|()| Some(Action::RecordingStarted)),
        DeviceCommand::StopRecording => device
            .stop_recording()
            .map(|success| Some(Action::RecordingFinished { success })),
    };

    match outcome {
        Ok(action) => action,
        Err(error) => {
            tracing::warn!(context = command.context(), %error, "device command failed");
            Some(Action::CommandFailed {
                command: command.clone(),
                message: error.to_string(),
            })
        }
    }
}
