//! ManualCam Core — domain layer for manual camera controls.
//!
//! This crate contains the slider-to-physical mapping math, per-axis control
//! profiles, and the explicit control state with its update function. No
//! async runtime, I/O, or platform capture dependencies.

pub mod controls;
pub mod device;
pub mod domain;
pub mod error;
pub mod mapping;
pub mod orientation;
pub mod state;
pub mod update;
pub mod white_balance;

// Re-exports for convenience.
pub use controls::{ControlAxis, ControlKind, ControlProfile};
pub use device::{CaptureDevice, DeviceCapabilities, DeviceReadings};
pub use domain::{ControlDomain, Gamma};
pub use error::{DeviceError, MappingError};
pub use mapping::{forward, inverse, rescale};
pub use state::ControlState;
pub use update::{Action, DeviceCommand, update};
