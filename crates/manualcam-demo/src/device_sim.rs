//! In-process stand-in for a platform capture device.
//!
//! State lives behind an `Arc<Mutex<_>>` so a [`SimulatedDeviceHandle`] can
//! inspect or perturb it while the worker thread owns the device.

use std::sync::Arc;

use parking_lot::Mutex;

use manualcam_core::device::{
    CaptureDevice, DeviceCapabilities, DeviceReadings, ExposureMode, FocusMode, PointOfInterest,
    WhiteBalanceMode,
};
use manualcam_core::white_balance::{
    MIN_WHITE_BALANCE_GAIN, TemperatureTint, WhiteBalanceGains,
};
use manualcam_core::DeviceError;

/// Kelvin per unit of red or blue gain in the simulated sensor model.
const KELVIN_PER_GAIN: f32 = 2500.0;
/// Tint units per unit of green gain.
const TINT_PER_GAIN: f32 = 150.0;
/// Fraction of the remaining distance continuous autofocus covers per query.
const FOCUS_STEP: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct SimulatedState {
    pub lens_position: f32,
    /// Where continuous autofocus is heading.
    pub focus_target: f32,
    pub iso: f32,
    pub exposure_duration: f64,
    pub zoom_factor: f64,
    pub torch_level: f32,
    pub gains: WhiteBalanceGains,
    /// Gains that would neutralize the simulated scene.
    pub scene_gains: WhiteBalanceGains,
    pub focus_mode: FocusMode,
    pub exposure_mode: ExposureMode,
    pub white_balance_mode: WhiteBalanceMode,
    pub point_of_interest: PointOfInterest,
    pub subject_area_monitoring: bool,
    pub recording: bool,
    /// Returned by the next mutating call, then cleared.
    pub fail_next: Option<DeviceError>,
}

/// Simulated capture device.
pub struct SimulatedDevice {
    caps: DeviceCapabilities,
    state: Arc<Mutex<SimulatedState>>,
}

/// Shared view of a [`SimulatedDevice`]'s state.
#[derive(Clone)]
pub struct SimulatedDeviceHandle {
    state: Arc<Mutex<SimulatedState>>,
}

impl SimulatedDeviceHandle {
    pub fn snapshot(&self) -> SimulatedState {
        self.state.lock().clone()
    }

    /// Make the next mutating device call fail with `error`.
    pub fn fail_next(&self, error: DeviceError) {
        self.state.lock().fail_next = Some(error);
    }

    pub fn set_focus_target(&self, target: f32) {
        self.state.lock().focus_target = target.clamp(0.0, 1.0);
    }
}

impl SimulatedDevice {
    /// A wide-angle back camera.
    pub fn default_capabilities() -> DeviceCapabilities {
        DeviceCapabilities {
            min_iso: 32.0,
            max_iso: 3072.0,
            min_zoom_factor: 1.0,
            max_zoom_factor: 16.0,
            max_white_balance_gain: 4.0,
            has_torch: true,
        }
    }

    pub fn new(caps: DeviceCapabilities) -> Self {
        let neutral = WhiteBalanceGains {
            red: 2.0,
            green: 2.0,
            blue: 2.0,
        };
        let state = SimulatedState {
            lens_position: 0.5,
            focus_target: 0.5,
            iso: caps.min_iso,
            exposure_duration: 1.0 / 60.0,
            zoom_factor: caps.min_zoom_factor,
            torch_level: 0.0,
            gains: neutral,
            scene_gains: neutral,
            focus_mode: FocusMode::ContinuousAuto,
            exposure_mode: ExposureMode::ContinuousAuto,
            white_balance_mode: WhiteBalanceMode::ContinuousAuto,
            point_of_interest: PointOfInterest::CENTER,
            subject_area_monitoring: true,
            recording: false,
            fail_next: None,
        };
        Self {
            caps,
            state: Arc::new(Mutex::new(state)),
        }
    }

    pub fn handle(&self) -> SimulatedDeviceHandle {
        SimulatedDeviceHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Lock the device for configuration and run `f` on its state.
    fn configure<T>(
        &self,
        f: impl FnOnce(&mut SimulatedState) -> Result<T, DeviceError>,
    ) -> Result<T, DeviceError> {
        let mut state = self.state.lock();
        if let Some(error) = state.fail_next.take() {
            return Err(error);
        }
        f(&mut state)
    }
}

impl CaptureDevice for SimulatedDevice {
    fn capabilities(&self) -> DeviceCapabilities {
        self.caps
    }

    fn readings(&self) -> Result<DeviceReadings, DeviceError> {
        let state = self.state.lock();
        Ok(DeviceReadings {
            lens_position: state.lens_position,
            iso: state.iso,
            exposure_duration: state.exposure_duration,
            zoom_factor: state.zoom_factor,
            white_balance: self.temperature_tint_for(state.gains),
            focus_mode: state.focus_mode,
            exposure_mode: state.exposure_mode,
            white_balance_mode: state.white_balance_mode,
        })
    }

    fn lens_position(&self) -> f32 {
        let mut state = self.state.lock();
        if state.focus_mode == FocusMode::ContinuousAuto {
            let delta = state.focus_target - state.lens_position;
            state.lens_position += delta * FOCUS_STEP;
        }
        state.lens_position
    }

    fn set_focus_mode(&mut self, mode: FocusMode) -> Result<(), DeviceError> {
        self.configure(|state| {
            state.focus_mode = mode;
            Ok(())
        })
    }

    fn set_lens_position(&mut self, position: f32) -> Result<(), DeviceError> {
        self.configure(|state| {
            if state.focus_mode == FocusMode::Locked {
                state.lens_position = position.clamp(0.0, 1.0);
            }
            Ok(())
        })
    }

    fn set_exposure_mode(&mut self, mode: ExposureMode) -> Result<(), DeviceError> {
        self.configure(|state| {
            state.exposure_mode = mode;
            Ok(())
        })
    }

    fn set_custom_exposure(
        &mut self,
        duration: Option<f64>,
        iso: Option<f32>,
    ) -> Result<(), DeviceError> {
        let caps = self.caps;
        self.configure(|state| {
            state.exposure_mode = ExposureMode::Custom;
            if let Some(duration) = duration {
                state.exposure_duration = duration;
            }
            if let Some(iso) = iso {
                state.iso = iso.clamp(caps.min_iso, caps.max_iso);
            }
            Ok(())
        })
    }

    fn set_torch_level(&mut self, level: f32) -> Result<(), DeviceError> {
        let has_torch = self.caps.has_torch;
        self.configure(|state| {
            if !has_torch {
                return Err(DeviceError::Unsupported("torch"));
            }
            state.torch_level = if level > 0.0 { level.min(1.0) } else { 0.0 };
            Ok(())
        })
    }

    fn set_zoom_factor(&mut self, factor: f64) -> Result<(), DeviceError> {
        let caps = self.caps;
        self.configure(|state| {
            state.zoom_factor = factor.clamp(caps.min_zoom_factor, caps.max_zoom_factor);
            Ok(())
        })
    }

    fn set_white_balance_mode(&mut self, mode: WhiteBalanceMode) -> Result<(), DeviceError> {
        self.configure(|state| {
            state.white_balance_mode = mode;
            Ok(())
        })
    }

    fn set_white_balance_gains(&mut self, gains: WhiteBalanceGains) -> Result<(), DeviceError> {
        let max = self.caps.max_white_balance_gain;
        self.configure(|state| {
            let in_range = |g: f32| (MIN_WHITE_BALANCE_GAIN..=max).contains(&g);
            if !(in_range(gains.red) && in_range(gains.green) && in_range(gains.blue)) {
                return Err(DeviceError::Unsupported(
                    "white balance gains outside the device range",
                ));
            }
            state.white_balance_mode = WhiteBalanceMode::Locked;
            state.gains = gains;
            Ok(())
        })
    }

    fn gray_world_gains(&self) -> WhiteBalanceGains {
        self.state.lock().scene_gains
    }

    fn gains_for(&self, values: TemperatureTint) -> WhiteBalanceGains {
        WhiteBalanceGains {
            red: 1.0 + (values.temperature - 3000.0) / KELVIN_PER_GAIN,
            green: 1.0 + (values.tint + 150.0) / TINT_PER_GAIN,
            blue: 1.0 + (8000.0 - values.temperature) / KELVIN_PER_GAIN,
        }
    }

    fn temperature_tint_for(&self, gains: WhiteBalanceGains) -> TemperatureTint {
        TemperatureTint {
            temperature: 3000.0 + (gains.red - 1.0) * KELVIN_PER_GAIN,
            tint: (gains.green - 1.0) * TINT_PER_GAIN - 150.0,
        }
    }

    fn focus_at_point(
        &mut self,
        point: PointOfInterest,
        focus_mode: FocusMode,
        exposure_mode: ExposureMode,
        monitor_subject_area: bool,
    ) -> Result<(), DeviceError> {
        self.configure(|state| {
            if focus_mode != FocusMode::Locked {
                state.point_of_interest = point;
                state.focus_mode = focus_mode;
            }
            if exposure_mode != ExposureMode::Custom {
                state.exposure_mode = exposure_mode;
            }
            state.subject_area_monitoring = monitor_subject_area;
            Ok(())
        })
    }

    fn start_recording(&mut self) -> Result<(), DeviceError> {
        self.configure(|state| {
            state.recording = true;
            Ok(())
        })
    }

    fn stop_recording(&mut self) -> Result<bool, DeviceError> {
        self.configure(|state| {
            let was_recording = state.recording;
            state.recording = false;
            Ok(was_recording)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_temperature_tint_round_trips_through_gains() {
        let device = SimulatedDevice::new(SimulatedDevice::default_capabilities());
        for (temperature, tint) in [(3000.0, -150.0), (5500.0, 0.0), (8000.0, 150.0)] {
            let values = TemperatureTint { temperature, tint };
            let back = device.temperature_tint_for(device.gains_for(values));
            assert!((back.temperature - temperature).abs() < 1e-2);
            assert!((back.tint - tint).abs() < 1e-3);
        }
    }

    #[test]
    fn test_lens_only_moves_when_focus_locked() {
        let mut device = SimulatedDevice::new(SimulatedDevice::default_capabilities());
        device.set_lens_position(0.9).unwrap();
        assert_eq!(device.handle().snapshot().lens_position, 0.5);

        device.set_focus_mode(FocusMode::Locked).unwrap();
        device.set_lens_position(0.9).unwrap();
        assert_eq!(device.lens_position(), 0.9);
    }

    #[test]
    fn test_continuous_focus_drifts_toward_target() {
        let device = SimulatedDevice::new(SimulatedDevice::default_capabilities());
        device.handle().set_focus_target(1.0);
        let first = device.lens_position();
        let second = device.lens_position();
        assert!(first > 0.5 && second > first && second < 1.0);
    }

    #[test]
    fn test_out_of_range_gains_are_rejected() {
        let mut device = SimulatedDevice::new(SimulatedDevice::default_capabilities());
        let result = device.set_white_balance_gains(WhiteBalanceGains {
            red: 0.5,
            green: 1.0,
            blue: 1.0,
        });
        assert!(matches!(result, Err(DeviceError::Unsupported(_))));
    }

    #[test]
    fn test_injected_failure_applies_once() {
        let mut device = SimulatedDevice::new(SimulatedDevice::default_capabilities());
        device
            .handle()
            .fail_next(DeviceError::LockFailed("busy".into()));
        assert!(device.set_zoom_factor(2.0).is_err());
        assert!(device.set_zoom_factor(2.0).is_ok());
        assert_eq!(device.handle().snapshot().zoom_factor, 2.0);
    }

    #[test]
    fn test_torch_requires_hardware() {
        let mut caps = SimulatedDevice::default_capabilities();
        caps.has_torch = false;
        let mut device = SimulatedDevice::new(caps);
        assert_eq!(
            device.set_torch_level(0.5),
            Err(DeviceError::Unsupported("torch"))
        );
    }
}
