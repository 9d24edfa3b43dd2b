//! Device orientation to preview rotation.

use serde::{Deserialize, Serialize};

/// Physical orientation reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
    FaceUp,
    FaceDown,
    Unknown,
}

/// Rotation in degrees to apply to the preview connection.
///
/// Flat and unknown orientations keep the preview upright.
pub fn rotation_angle(orientation: DeviceOrientation) -> f64 {
    match orientation {
        DeviceOrientation::LandscapeLeft => 90.0,
        DeviceOrientation::LandscapeRight => 270.0,
        DeviceOrientation::PortraitUpsideDown => 180.0,
        _ => 0.0,
    }
}
