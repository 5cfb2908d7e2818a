use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use crate::{
    config::{EngineConfig, MotionThresholds},
    types::{
        GestureKind, NormalizedHandFrame, PushPullDirection, RotateDirection, SwipeDirection,
    },
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSample {
    pub time: Instant,
    /// Landmark mean in detector units.
    pub centroid: [f32; 2],
    pub orientation_deg: f32,
    pub hand_scale: f32,
}

impl MotionSample {
    pub fn from_frame(frame: &NormalizedHandFrame) -> Self {
        Self {
            time: frame.timestamp,
            centroid: frame.centroid,
            orientation_deg: frame.orientation_deg,
            hand_scale: frame.hand_scale,
        }
    }
}

/// A motion condition that is true on the current frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionSignal {
    pub kind: GestureKind,
    pub magnitude: f32,
}

/// Rolling history bounded both by time span and sample count.
#[derive(Clone, Debug)]
pub struct MotionWindow {
    samples: VecDeque<MotionSample>,
    span: Duration,
    capacity: usize,
}

impl MotionWindow {
    pub fn new(span: Duration, capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            span,
            capacity,
        }
    }

    pub fn push(&mut self, sample: MotionSample) {
        self.samples.push_back(sample);
        while let Some(front) = self.samples.front() {
            if sample.time.saturating_duration_since(front.time) > self.span
                || self.samples.len() > self.capacity
            {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn oldest(&self) -> Option<&MotionSample> {
        self.samples.front()
    }

    pub fn newest(&self) -> Option<&MotionSample> {
        self.samples.back()
    }

    /// Time covered by the samples currently held.
    #[cfg(test)]
    pub fn covered(&self) -> Duration {
        match (self.oldest(), self.newest()) {
            (Some(a), Some(b)) => b.time.saturating_duration_since(a.time),
            _ => Duration::ZERO,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &MotionSample> {
        self.samples.iter()
    }

    fn endpoints(&self) -> Option<(&MotionSample, &MotionSample)> {
        if self.len() < 2 {
            return None;
        }
        Some((self.oldest()?, self.newest()?))
    }
}

/// One motion pattern evaluated over the window each frame.
///
/// Adding a motion gesture means adding a detector here and a
/// `GestureKind` variant for it; the debounce bank picks it up by slot.
pub trait MotionDetector: Send {
    fn name(&self) -> &'static str;
    fn detect(&self, window: &MotionWindow, thresholds: &MotionThresholds) -> Option<MotionSignal>;
}

/// Centroid travel between the oldest and newest sample, in hand-lengths.
pub struct SwipeDetector;

impl MotionDetector for SwipeDetector {
    fn name(&self) -> &'static str {
        "swipe"
    }

    fn detect(&self, window: &MotionWindow, thresholds: &MotionThresholds) -> Option<MotionSignal> {
        let (oldest, newest) = window.endpoints()?;
        let dx = newest.centroid[0] - oldest.centroid[0];
        let dy = newest.centroid[1] - oldest.centroid[1];
        let scale = (oldest.hand_scale + newest.hand_scale) / 2.0;
        let travel = dx.hypot(dy) / scale;
        if travel <= thresholds.swipe {
            return None;
        }

        // image y grows downward
        let direction = if dx.abs() >= dy.abs() {
            if dx > 0.0 {
                SwipeDirection::Right
            } else {
                SwipeDirection::Left
            }
        } else if dy < 0.0 {
            SwipeDirection::Up
        } else {
            SwipeDirection::Down
        };
        Some(MotionSignal {
            kind: GestureKind::Swipe(direction),
            magnitude: travel,
        })
    }
}

/// Signed sum of frame-to-frame changes of the wrist to middle-MCP angle.
pub struct RotationDetector;

impl MotionDetector for RotationDetector {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn detect(&self, window: &MotionWindow, thresholds: &MotionThresholds) -> Option<MotionSignal> {
        window.endpoints()?;
        let mut total = 0.0f32;
        let mut previous: Option<f32> = None;
        for sample in window.iter() {
            if let Some(prev) = previous {
                total += wrap_degrees(sample.orientation_deg - prev);
            }
            previous = Some(sample.orientation_deg);
        }

        if total.abs() <= thresholds.rotation_deg {
            return None;
        }
        // positive angles turn clockwise on screen
        let direction = if total > 0.0 {
            RotateDirection::Right
        } else {
            RotateDirection::Left
        };
        Some(MotionSignal {
            kind: GestureKind::Rotate(direction),
            magnitude: total.abs(),
        })
    }
}

/// Relative change of apparent hand size between the window's endpoints.
pub struct PushPullDetector;

impl MotionDetector for PushPullDetector {
    fn name(&self) -> &'static str {
        "push/pull"
    }

    fn detect(&self, window: &MotionWindow, thresholds: &MotionThresholds) -> Option<MotionSignal> {
        let (oldest, newest) = window.endpoints()?;
        let change = newest.hand_scale / oldest.hand_scale - 1.0;
        let direction = if change > thresholds.push_pull {
            PushPullDirection::Push
        } else if change < -thresholds.push_pull {
            PushPullDirection::Pull
        } else {
            return None;
        };
        Some(MotionSignal {
            kind: GestureKind::PushPull(direction),
            magnitude: change.abs(),
        })
    }
}

/// Maps an angle difference into `(-180, 180]`.
fn wrap_degrees(delta: f32) -> f32 {
    let wrapped = (delta + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 { 180.0 } else { wrapped }
}

pub struct MotionTracker {
    window: MotionWindow,
    detectors: Vec<Box<dyn MotionDetector>>,
}

impl MotionTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            window: MotionWindow::new(config.motion_window, config.motion_capacity),
            detectors: vec![
                Box::new(SwipeDetector),
                Box::new(RotationDetector),
                Box::new(PushPullDetector),
            ],
        }
    }

    /// Appends the sample and returns every motion condition true this frame.
    /// A pose that does not allow motion clears the history instead.
    pub fn update(
        &mut self,
        sample: MotionSample,
        motion_allowed: bool,
        thresholds: &MotionThresholds,
    ) -> Vec<MotionSignal> {
        if !motion_allowed {
            self.window.clear();
            return Vec::new();
        }

        self.window.push(sample);
        self.detectors
            .iter()
            .filter_map(|detector| {
                let signal = detector.detect(&self.window, thresholds)?;
                log::trace!(
                    "{} detector: {} ({:.2})",
                    detector.name(),
                    signal.kind,
                    signal.magnitude
                );
                Some(signal)
            })
            .collect()
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    #[cfg(test)]
    pub fn window(&self) -> &MotionWindow {
        &self.window
    }
}
