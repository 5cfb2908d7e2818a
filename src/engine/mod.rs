mod worker;


use std::time::{Duration, Instant};

use crate::{
    config::{ConfigError, DebounceTiming, EngineConfig, MotionThresholds},
    debounce::DebounceBank,
    dispatch::{ActionRequest, bindings, dispatch},
    motion::{MotionSample, MotionTracker},
    normalize::Normalizer,
    pointer::PointerChannel,
    pose::{PoseClassifier, PoseEstimate},
    types::{GestureEvent, GestureKind, HandFrame, Mode, PoseLabel, Sensitivity},
};

pub use worker::{ControlMessage, EngineInput, start_engine};

/// Control-plane state. Changes apply between frames, never during one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlContext {
    pub mode: Mode,
    pub sensitivity: Sensitivity,
    pub enabled: bool,
}

impl Default for ControlContext {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            sensitivity: Sensitivity::default(),
            enabled: true,
        }
    }
}

/// Everything one frame produced, for callers that want more than the actions.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    /// `None` when the tick was hand-lost, skipped or paused.
    pub pose: Option<PoseEstimate>,
    pub events: Vec<GestureEvent>,
    pub actions: Vec<ActionRequest>,
}

pub struct GestureEngine {
    config: EngineConfig,
    context: ControlContext,
    normalizer: Normalizer,
    classifier: PoseClassifier,
    motion: MotionTracker,
    debounce: DebounceBank,
    pointer: PointerChannel,
    last_tick: Option<Instant>,
    /// Actions raised by control changes, delivered with the next tick.
    pending: Vec<ActionRequest>,
}

impl GestureEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let context = ControlContext::default();
        log::info!(
            "gesture engine ready: {} at sensitivity {}",
            context.mode,
            context.sensitivity
        );
        log_bindings(context.mode);

        Ok(Self {
            normalizer: Normalizer::new(config.min_hand_scale),
            classifier: PoseClassifier::new(&config),
            motion: MotionTracker::new(&config),
            debounce: DebounceBank::new(),
            pointer: PointerChannel::new(&config),
            last_tick: None,
            pending: Vec::new(),
            context,
            config,
        })
    }

    pub fn context(&self) -> ControlContext {
        self.context
    }

    /// Debounce state of one gesture kind; `None` for kinds that never debounce.
    #[cfg(test)]
    pub fn gesture_state(&self, kind: GestureKind) -> Option<crate::debounce::DebounceState> {
        self.debounce.state(kind)
    }

    /// Runs one tick. `None` means no hand was detected.
    pub fn process_frame(&mut self, frame: Option<&HandFrame>) -> TickReport {
        let mut report = TickReport {
            actions: std::mem::take(&mut self.pending),
            ..TickReport::default()
        };
        if !self.context.enabled {
            return report;
        }

        let Some(frame) = frame else {
            report.actions.extend(self.reset_tracking());
            return report;
        };
        let normalized = match self.normalizer.normalize(frame) {
            Ok(normalized) => normalized,
            Err(reason) => {
                log::debug!("frame skipped: {reason}");
                report.actions.extend(self.reset_tracking());
                return report;
            }
        };

        let dt = self.frame_interval(frame.timestamp, &mut report.actions);
        self.last_tick = Some(frame.timestamp);

        let sensitivity = self.context.sensitivity;
        let timing = DebounceTiming::new(&self.config, sensitivity);
        let thresholds = MotionThresholds::new(&self.config, sensitivity);

        let pose = self.classifier.classify(&normalized, sensitivity);
        log::trace!(
            "{} hand: {} ({:.2}), fingers {:?}, hold {:?}",
            normalized.handedness.label(),
            pose.label.label(),
            pose.confidence,
            pose.fingers.map(|f| f.as_array()),
            self.debounce.state(GestureKind::PoseHeld(pose.label))
        );
        let signals = self.motion.update(
            MotionSample::from_frame(&normalized),
            pose.label.allows_motion(),
            &thresholds,
        );

        let mut active = Vec::with_capacity(signals.len() + 1);
        if pose.label != PoseLabel::Unknown {
            active.push((GestureKind::PoseHeld(pose.label), pose.confidence));
        }
        active.extend(signals.iter().map(|signal| (signal.kind, signal.magnitude)));

        let events = self.debounce.step(&active, dt, &timing, frame.timestamp);
        if events.iter().any(|event| event.kind.is_motion()) {
            // a finished motion must not keep feeding the next one
            self.motion.clear();
        }

        let mode = self.context.mode;
        if mode == Mode::MouseControl {
            report.actions.extend(self.pointer.track(pose.label, &normalized));
        }

        for event in &events {
            log::debug!("confirmed {} ({:.2})", event.kind, event.magnitude);
            let Some(action) = dispatch(mode, event) else {
                continue;
            };
            log::info!("{}: {} -> {:?}", mode, event.kind, action);
            if mode == Mode::MouseControl {
                self.pointer.note_discrete(&action);
            }
            report.actions.push(action);
        }

        report.pose = Some(pose);
        report.events = events;
        report
    }

    fn frame_interval(&mut self, now: Instant, actions: &mut Vec<ActionRequest>) -> Duration {
        let Some(previous) = self.last_tick else {
            return self.config.nominal_frame_interval;
        };
        let dt = now.saturating_duration_since(previous);
        if dt > self.config.max_frame_gap {
            log::debug!("tracking gap of {dt:?}, resetting gestures");
            actions.extend(self.reset_tracking());
            return self.config.nominal_frame_interval;
        }
        dt
    }

    /// Hand-lost handling: every machine back to Idle, no motion history, no held button.
    fn reset_tracking(&mut self) -> Option<ActionRequest> {
        if !self.debounce.all_idle() {
            log::debug!("dropping gesture progress");
        }
        self.debounce.reset_all();
        self.motion.clear();
        self.last_tick = None;
        self.pointer.release()
    }

    fn reset_for_control_change(&mut self) {
        if let Some(action) = self.reset_tracking() {
            self.pending.push(action);
        }
    }

    pub fn apply(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::SetMode { mode } => self.set_mode(mode),
            ControlMessage::SetSensitivity { value } => self.set_sensitivity(value),
            ControlMessage::AdjustSensitivity { delta } => self.adjust_sensitivity(delta),
            ControlMessage::CycleMode => {
                self.cycle_mode();
            }
            ControlMessage::SetEnabled { enabled } => self.set_enabled(enabled),
            ControlMessage::ToggleEnabled => {
                self.toggle_enabled();
            }
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode == self.context.mode {
            return;
        }
        log::info!("mode: {} -> {}", self.context.mode, mode);
        self.context.mode = mode;
        self.reset_for_control_change();
        log_bindings(mode);
    }

    pub fn cycle_mode(&mut self) -> Mode {
        self.set_mode(self.context.mode.next());
        self.context.mode
    }

    /// Out-of-range values are clamped, never rejected.
    pub fn set_sensitivity(&mut self, value: f32) {
        self.update_sensitivity(Sensitivity::new(value));
    }

    pub fn adjust_sensitivity(&mut self, delta: f32) {
        self.update_sensitivity(self.context.sensitivity.adjusted(delta));
    }

    fn update_sensitivity(&mut self, sensitivity: Sensitivity) {
        if sensitivity != self.context.sensitivity {
            log::info!("sensitivity: {sensitivity}");
            self.context.sensitivity = sensitivity;
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled == self.context.enabled {
            return;
        }
        log::info!("gesture control {}", if enabled { "enabled" } else { "paused" });
        self.context.enabled = enabled;
        self.reset_for_control_change();
    }

    pub fn toggle_enabled(&mut self) -> bool {
        self.set_enabled(!self.context.enabled);
        self.context.enabled
    }
}

fn log_bindings(mode: Mode) {
    for binding in bindings(mode) {
        log::debug!("  {:<14} {:?}", binding.gesture.to_string(), binding.action);
    }
    if mode == Mode::MouseControl {
        log::debug!("  {:<14} move cursor", "open hand");
        log::debug!("  {:<14} scroll", "fist");
    }
}
