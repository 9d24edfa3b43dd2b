//! White balance values exchanged with the capture device.
//!
//! The device works in per-channel gains; the UI works in color temperature
//! (Kelvin) and tint. Converting between the two is device-specific and is
//! left to [`CaptureDevice`](crate::device::CaptureDevice).

use serde::{Deserialize, Serialize};

/// Lowest gain a device accepts on any channel.
pub const MIN_WHITE_BALANCE_GAIN: f32 = 1.0;

/// Per-channel device white balance gains.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WhiteBalanceGains {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
}

impl WhiteBalanceGains {
    /// Unity gains on every channel.
    pub const UNITY: Self = Self {
        red: 1.0,
        green: 1.0,
        blue: 1.0,
    };
}

/// Color temperature in Kelvin and green–magenta tint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureTint {
    pub temperature: f32,
    pub tint: f32,
}

/// Clamp every channel into `[1.0, max_gain]`.
///
/// Gains derived from a temperature/tint pair can fall outside what the
/// device accepts, and applying them unclamped is rejected by the device.
pub fn normalize_gains(gains: WhiteBalanceGains, max_gain: f32) -> WhiteBalanceGains {
    let max_gain = max_gain.max(MIN_WHITE_BALANCE_GAIN);
    let clamp = |g: f32| g.clamp(MIN_WHITE_BALANCE_GAIN, max_gain);
    WhiteBalanceGains {
        red: clamp(gains.red),
        green: clamp(gains.green),
        blue: clamp(gains.blue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_gains_clamps_both_ends() {
        let gains = WhiteBalanceGains {
            red: 0.4,
            green: 1.7,
            blue: 9.0,
        };
        let result = normalize_gains(gains, 4.0);
        assert_eq!(result.red, 1.0);
        assert_eq!(result.green, 1.7);
        assert_eq!(result.blue, 4.0);
    }

    #[test]
    fn test_normalize_gains_unity_is_unchanged() {
        assert_eq!(
            normalize_gains(WhiteBalanceGains::UNITY, 4.0),
            WhiteBalanceGains::UNITY
        );
    }

    #[test]
    fn test_normalize_gains_tolerates_max_below_one() {
        let result = normalize_gains(WhiteBalanceGains::UNITY, 0.5);
        assert_eq!(result, WhiteBalanceGains::UNITY);
    }
}
