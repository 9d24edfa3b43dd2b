//! Orchestration loop.
//!
//! Owns the control state and is the only place it changes. UI messages and
//! device results become actions, actions go through `update`, and the
//! resulting device commands go to the worker.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{Instant, MissedTickBehavior};

use manualcam_core::device::CaptureDevice;
use manualcam_core::{Action, ControlProfile, ControlState, DeviceCommand, update};

use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::ipc::{ControllerToUi, UiToController};
use crate::worker::DeviceWorker;

/// Messages queued for the UI, drained after every loop turn.
#[derive(Default)]
pub struct OutboundUiMessages {
    messages: Vec<ControllerToUi>,
}

impl OutboundUiMessages {
    pub fn send(&mut self, msg: ControllerToUi) {
        self.messages.push(msg);
    }

    pub fn drain(&mut self) -> Vec<ControllerToUi> {
        std::mem::take(&mut self.messages)
    }
}

/// Control state plus the means to act on it.
pub struct Controller {
    state: ControlState,
    profile: ControlProfile,
    worker: DeviceWorker,
    pub outbound: OutboundUiMessages,
}

impl Controller {
    pub fn new(profile: ControlProfile, worker: DeviceWorker) -> Self {
        Self {
            state: ControlState::default(),
            profile,
            worker,
            outbound: OutboundUiMessages::default(),
        }
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    /// Apply an action, submit the commands it produced, and queue a state
    /// update for the UI if anything visible changed.
    pub fn dispatch(&mut self, action: Action) -> Result<(), DemoError> {
        let before = self.state.clone();
        let commands = update(&mut self.state, action, &self.profile);
        for command in commands {
            self.worker.submit(command)?;
        }
        if self.state != before {
            self.outbound.send(ControllerToUi::StateChanged {
                state: self.state.clone(),
            });
        }
        Ok(())
    }

    /// Handle one parsed UI message. Returns `false` when the UI asked to
    /// quit.
    pub fn handle_ui(&mut self, msg: UiToController) -> Result<bool, DemoError> {
        match msg {
            UiToController::Quit => return Ok(false),
            UiToController::RequestState => {
                self.outbound.send(ControllerToUi::StateChanged {
                    state: self.state.clone(),
                });
            }
            other => {
                if let Some(action) = other.into_action() {
                    self.dispatch(action)?;
                }
            }
        }
        Ok(true)
    }

    /// Handle one raw input line. Malformed lines are reported to the UI and
    /// otherwise ignored.
    pub fn handle_line(&mut self, line: &str) -> Result<bool, DemoError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(true);
        }
        match serde_json::from_str::<UiToController>(line) {
            Ok(msg) => self.handle_ui(msg),
            Err(e) => {
                tracing::warn!("Ignoring malformed UI message: {e}");
                self.outbound.send(ControllerToUi::Error {
                    message: format!("malformed message: {e}"),
                });
                Ok(true)
            }
        }
    }
}

/// Run the controller on stdin/stdout until stdin closes or the UI sends
/// `Quit`.
pub async fn run(
    config: DemoConfig,
    profile: ControlProfile,
    device: Box<dyn CaptureDevice>,
) -> Result<(), DemoError> {
    let (results_tx, mut results_rx) = mpsc::unbounded_channel();
    let (worker, worker_thread) = DeviceWorker::spawn(device, results_tx)?;
    let mut controller = Controller::new(profile, worker);

    controller.worker.submit(DeviceCommand::ReadSettings)?;

    tracing::info!(poll_interval = ?config.poll_interval, "controller running");

    serve(
        &mut controller,
        &mut results_rx,
        tokio::io::stdin(),
        tokio::io::stdout(),
        config.poll_interval,
    )
    .await?;

    tracing::info!(recording = controller.state().recording, "controller shutting down");
    drop(controller);
    if worker_thread.join().is_err() {
        tracing::error!("device worker panicked");
    }
    Ok(())
}

/// Drive the controller from JSON lines on `input`, writing one JSON line
/// per outbound message to `output`. Returns when `input` reaches EOF or the
/// UI sends `Quit`.
///
/// The first lens poll fires one `poll_interval` after start.
pub async fn serve<R, W>(
    controller: &mut Controller,
    results: &mut mpsc::UnboundedReceiver<Action>,
    input: R,
    mut output: W,
    poll_interval: Duration,
) -> Result<(), DemoError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    let mut ticker = tokio::time::interval_at(Instant::now() + poll_interval, poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let keep_running = tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => controller.handle_line(&line)?,
                None => false,
            },
            _ = ticker.tick() => {
                controller.dispatch(Action::PollTick)?;
                true
            }
            Some(action) = results.recv() => {
                controller.dispatch(action)?;
                true
            }
        };

        for msg in controller.outbound.drain() {
            let mut json = serde_json::to_string(&msg)?;
            json.push('\n');
            output.write_all(json.as_bytes()).await?;
        }
        output.flush().await?;

        if !keep_running {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device_sim::SimulatedDevice;
    use manualcam_core::device::FocusMode;

    fn controller() -> (
        Controller,
        mpsc::UnboundedReceiver<Action>,
        crate::device_sim::SimulatedDeviceHandle,
    ) {
        let device = SimulatedDevice::new(SimulatedDevice::default_capabilities());
        let handle = device.handle();
        let profile = ControlProfile::for_device(&device.capabilities()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        let (worker, _thread) = DeviceWorker::spawn(Box::new(device), tx).unwrap();
        (Controller::new(profile, worker), rx, handle)
    }

    #[test]
    fn test_request_state_always_replies() {
        let (mut controller, _rx, _handle) = controller();
        assert!(controller.handle_line(r#"{"type":"RequestState"}"#).unwrap());
        assert_eq!(controller.outbound.drain().len(), 1);
    }

    #[test]
    fn test_malformed_line_reports_error() {
        let (mut controller, _rx, _handle) = controller();
        assert!(controller.handle_line("{not json").unwrap());
        let msgs = controller.outbound.drain();
        assert!(matches!(msgs.as_slice(), [ControllerToUi::Error { .. }]));
    }

    #[test]
    fn test_quit_stops_loop() {
        let (mut controller, _rx, _handle) = controller();
        assert!(!controller.handle_line(r#"{"type":"Quit"}"#).unwrap());
    }

    #[test]
    fn test_poll_without_change_sends_nothing() {
        let (mut controller, _rx, _handle) = controller();
        controller.dispatch(Action::PollTick).unwrap();
        assert!(controller.outbound.drain().is_empty());
    }

    #[test]
    fn test_locked_lens_slider_reaches_device() {
        let (mut controller, mut rx, handle) = controller();
        controller
            .handle_line(r#"{"type":"SetFocusMode","data":{"mode":"Locked"}}"#)
            .unwrap();
        controller
            .handle_line(r#"{"type":"SetLensPosition","data":{"value":0.9}}"#)
            .unwrap();
        controller.dispatch(Action::PollTick).unwrap();

        let polled = rx.blocking_recv().unwrap();
        assert_eq!(polled, Action::LensPositionPolled(0.9));
        controller.dispatch(polled).unwrap();

        let snapshot = handle.snapshot();
        assert_eq!(snapshot.focus_mode, FocusMode::Locked);
        assert!((controller.state().sliders.lens_position - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_device_failure_becomes_alert() {
        let (mut controller, mut rx, handle) = controller();
        handle.fail_next(manualcam_core::DeviceError::Unavailable);
        controller
            .handle_line(r#"{"type":"SetZoomFactor","data":{"value":0.5}}"#)
            .unwrap();
        let failed = rx.blocking_recv().unwrap();
        controller.dispatch(failed).unwrap();
        assert_eq!(
            controller.state().alert.as_deref(),
            Some("Error setting zoom factor: capture device is unavailable")
        );
    }

    #[test]
    fn test_failed_focus_lock_resyncs_from_device() {
        let (mut controller, mut rx, handle) = controller();
        handle.fail_next(manualcam_core::DeviceError::LockFailed("busy".into()));
        controller
            .handle_line(r#"{"type":"SetFocusMode","data":{"mode":"Locked"}}"#)
            .unwrap();

        let failed = rx.blocking_recv().unwrap();
        assert!(matches!(failed, Action::CommandFailed { .. }));
        controller.dispatch(failed).unwrap();
        let readings = rx.blocking_recv().unwrap();
        assert!(matches!(readings, Action::ReadingsReceived(_)));
        controller.dispatch(readings).unwrap();

        let state = controller.state();
        assert_eq!(state.focus_mode, FocusMode::ContinuousAuto);
        assert!(!state.can_set_lens_position);
        assert_eq!(
            state.alert.as_deref(),
            Some("Error setting focus mode: could not lock device for configuration: busy")
        );

        // Lens slider no longer drives the device.
        controller
            .handle_line(r#"{"type":"SetLensPosition","data":{"value":0.9}}"#)
            .unwrap();
        controller.dispatch(Action::PollTick).unwrap();
        assert_eq!(rx.blocking_recv().unwrap(), Action::LensPositionPolled(0.5));
    }

    fn output_messages(output: &[u8]) -> Vec<ControllerToUi> {
        std::str::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_serve_stops_on_quit() {
        let (mut controller, mut rx, _handle) = controller();
        let input = b"{\"type\":\"RequestState\"}\n{\"type\":\"Quit\"}\n{\"type\":\"RequestState\"}\n";
        let mut output = Vec::new();

        serve(
            &mut controller,
            &mut rx,
            &input[..],
            &mut output,
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

        let msgs = output_messages(&output);
        assert!(matches!(msgs.as_slice(), [ControllerToUi::StateChanged { .. }]));
        assert!(output.ends_with(b"\n"));
    }

    #[tokio::test]
    async fn test_serve_writes_one_line_per_message_until_eof() {
        let (mut controller, mut rx, _handle) = controller();
        let input = b"{\"type\":\"SetTorchLevel\",\"data\":{\"value\":0.5}}\nnot json\n";
        let mut output = Vec::new();

        serve(
            &mut controller,
            &mut rx,
            &input[..],
            &mut output,
            Duration::from_secs(3600),
        )
        .await
        .unwrap();

        let msgs = output_messages(&output);
        match msgs.as_slice() {
            [ControllerToUi::StateChanged { state }, ControllerToUi::Error { .. }] => {
                assert_eq!(state.sliders.torch_level, 0.5);
            }
            other => panic!("unexpected messages: {other:?}"),
        }
    }
}
