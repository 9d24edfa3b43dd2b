//! ManualCam demo: headless manual camera controller.
//!
//! Reads UI messages as JSON lines on stdin, drives a simulated capture
//! device, and writes state updates as JSON lines on stdout. Logs go to
//! stderr.

mod config;
mod controller;
mod device_sim;
mod error;
mod ipc;
mod worker;

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use manualcam_core::ControlProfile;
use manualcam_core::device::CaptureDevice;

use crate::config::DemoConfig;
use crate::device_sim::SimulatedDevice;
use crate::error::DemoError;

fn load_profile(config: &DemoConfig, device: &dyn CaptureDevice) -> Result<ControlProfile, DemoError> {
    match &config.profile_path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading control profile");
            let json = std::fs::read_to_string(path)?;
            Ok(ControlProfile::from_json(&json)?)
        }
        None => Ok(ControlProfile::for_device(&device.capabilities())?),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = DemoConfig::default();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_filter))
        .with_writer(std::io::stderr)
        .init();

    let device = SimulatedDevice::new(SimulatedDevice::default_capabilities());
    let handle = device.handle();
    // Subject sits closer than the lens' resting position.
    handle.set_focus_target(0.35);
    let profile = match load_profile(&config, &device) {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to build control profile: {e}");
            return ExitCode::FAILURE;
        }
    };

    match controller::run(config, profile, Box::new(device)).await {
        Ok(()) => {
            tracing::debug!(device = ?handle.snapshot(), "simulated device at shutdown");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Controller failed: {e}");
            ExitCode::FAILURE
        }
    }
}
