use std::time::Duration;

use crate::types::Sensitivity;

/// Tunable thresholds for the whole engine.
///
/// Distances on the hand are measured in hand-lengths (wrist to middle-finger
/// base), so none of them depend on camera resolution or how far the hand is
/// from the camera. Time and motion thresholds are the values used at
/// sensitivity 1.0 and are divided by the active sensitivity every frame.
#[derive(Clone, Debug)]
pub struct EngineConfig {
    /// Frames whose wrist to middle-MCP distance is below this (detector units) are skipped.
    pub min_hand_scale: f32,
    /// How much farther than its PIP joint a fingertip must reach to count as extended.
    pub finger_extension_margin: f32,
    /// Lateral thumb-tip offset beyond the thumb MCP required for an extended thumb.
    pub thumb_lateral_margin: f32,
    /// Measurements this close to their margin are ambiguous and resolve to `Unknown`.
    pub ambiguity_band: f32,
    /// Thumb-tip to index-tip distance below which the hand is pinching.
    pub pinch_distance: f32,

    pub motion_window: Duration,
    pub motion_capacity: usize,
    /// Centroid travel across the motion window, in hand-lengths.
    pub swipe_threshold: f32,
    pub rotation_threshold_deg: f32,
    pub min_rotation_threshold_deg: f32,
    /// Relative change of hand scale across the motion window.
    pub push_pull_threshold: f32,

    pub hold_duration: Duration,
    pub cooldown_duration: Duration,
    pub min_cooldown: Duration,
    /// Interval credited to the first frame after a reset.
    pub nominal_frame_interval: Duration,
    /// Frames further apart than this are treated as a tracking gap.
    pub max_frame_gap: Duration,

    /// Exponential smoothing weight kept from the previous cursor position.
    pub cursor_smoothing: f32,
    /// Minimum per-frame palm travel (hand-lengths) that produces a scroll.
    pub scroll_deadzone: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_hand_scale: 0.01,
            finger_extension_margin: 0.10,
            thumb_lateral_margin: 0.30,
            ambiguity_band: 0.04,
            pinch_distance: 0.20,
            motion_window: Duration::from_millis(500),
            motion_capacity: 64,
            swipe_threshold: 1.5,
            rotation_threshold_deg: 25.0,
            min_rotation_threshold_deg: 15.0,
            push_pull_threshold: 0.25,
            hold_duration: Duration::from_millis(300),
            cooldown_duration: Duration::from_millis(800),
            min_cooldown: Duration::from_millis(300),
            nominal_frame_interval: Duration::from_micros(33_334),
            max_frame_gap: Duration::from_millis(250),
            cursor_smoothing: 0.3,
            scroll_deadzone: 0.05,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },
    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },
    #[error("{0} must be a non-zero duration")]
    ZeroDuration(&'static str),
    #[error("motion window capacity must hold at least 2 samples, got {0}")]
    WindowCapacity(usize),
    #[error("cursor smoothing must be within [0, 1), got {0}")]
    Smoothing(f32),
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("min_hand_scale", self.min_hand_scale),
            ("pinch_distance", self.pinch_distance),
            ("swipe_threshold", self.swipe_threshold),
            ("rotation_threshold_deg", self.rotation_threshold_deg),
            ("push_pull_threshold", self.push_pull_threshold),
        ];
        for (name, value) in positive {
            // written so that NaN fails too
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        let non_negative = [
            ("finger_extension_margin", self.finger_extension_margin),
            ("thumb_lateral_margin", self.thumb_lateral_margin),
            ("ambiguity_band", self.ambiguity_band),
            ("min_rotation_threshold_deg", self.min_rotation_threshold_deg),
            ("scroll_deadzone", self.scroll_deadzone),
        ];
        for (name, value) in non_negative {
            if !(value >= 0.0) {
                return Err(ConfigError::Negative { name, value });
            }
        }

        let durations = [
            ("motion_window", self.motion_window),
            ("nominal_frame_interval", self.nominal_frame_interval),
            ("max_frame_gap", self.max_frame_gap),
        ];
        for (name, value) in durations {
            if value.is_zero() {
                return Err(ConfigError::ZeroDuration(name));
            }
        }

        if self.motion_capacity < 2 {
            return Err(ConfigError::WindowCapacity(self.motion_capacity));
        }
        if !(0.0..1.0).contains(&self.cursor_smoothing) {
            return Err(ConfigError::Smoothing(self.cursor_smoothing));
        }
        Ok(())
    }
}

fn scale_duration(base: Duration, sensitivity: Sensitivity) -> Duration {
    Duration::from_secs_f64(base.as_secs_f64() / f64::from(sensitivity.get()))
}

/// Hold and cooldown gates for the current sensitivity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebounceTiming {
    pub hold: Duration,
    pub cooldown: Duration,
}

impl DebounceTiming {
    pub fn new(config: &EngineConfig, sensitivity: Sensitivity) -> Self {
        Self {
            hold: scale_duration(config.hold_duration, sensitivity),
            cooldown: scale_duration(config.cooldown_duration, sensitivity).max(config.min_cooldown),
        }
    }
}

/// Motion thresholds for the current sensitivity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionThresholds {
    pub swipe: f32,
    pub rotation_deg: f32,
    pub push_pull: f32,
}

impl MotionThresholds {
    pub fn new(config: &EngineConfig, sensitivity: Sensitivity) -> Self {
        let s = sensitivity.get();
        Self {
            swipe: config.swipe_threshold / s,
            rotation_deg: (config.rotation_threshold_deg / s).max(config.min_rotation_threshold_deg),
            push_pull: config.push_pull_threshold / s,
        }
    }
}
