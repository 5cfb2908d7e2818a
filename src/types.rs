use std::{fmt, str::FromStr, time::Instant};

use serde::Deserialize;

pub const NUM_LANDMARKS: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_MCP: usize = 2;
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;

/// (mcp, pip, tip) for index, middle, ring and pinky.
pub const FINGER_JOINTS: [(usize, usize, usize); 4] = [(5, 6, 8), (9, 10, 12), (13, 14, 16), (17, 18, 20)];

/// `[x, y, depth]` in detector-native units (image-normalized, y pointing down).
pub type Point3 = [f32; 3];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}

impl Handedness {
    pub fn label(&self) -> &'static str {
        match self {
            Handedness::Left => "left",
            Handedness::Right => "right",
            Handedness::Unknown => "unknown",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("expected 21 landmarks, got {0}")]
    LandmarkCount(usize),
}

/// One tick of landmark-source output. Points keep the source's fixed semantic order.
#[derive(Clone, Debug)]
pub struct HandFrame {
    pub timestamp: Instant,
    pub landmarks: [Point3; NUM_LANDMARKS],
    pub handedness: Handedness,
}

impl HandFrame {
    pub fn new(timestamp: Instant, landmarks: [Point3; NUM_LANDMARKS], handedness: Handedness) -> Self {
        Self {
            timestamp,
            landmarks,
            handedness,
        }
    }

    pub fn from_points(
        timestamp: Instant,
        points: &[Point3],
        handedness: Handedness,
    ) -> Result<Self, FrameError> {
        let landmarks: [Point3; NUM_LANDMARKS] = points
            .try_into()
            .map_err(|_| FrameError::LandmarkCount(points.len()))?;
        Ok(Self::new(timestamp, landmarks, handedness))
    }
}

/// A frame re-expressed with the wrist at the origin and one hand-length as the unit.
///
/// `centroid` and `palm` stay in detector units so that motion and cursor
/// tracking can see where the hand is in the image.
#[derive(Clone, Debug)]
pub struct NormalizedHandFrame {
    pub timestamp: Instant,
    pub points: [Point3; NUM_LANDMARKS],
    pub hand_scale: f32,
    pub centroid: [f32; 2],
    pub palm: [f32; 2],
    pub orientation_deg: f32,
    pub handedness: Handedness,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PoseLabel {
    Fist,
    OpenHand,
    Pointing,
    PeaceSign,
    ThumbsUp,
    Pinch,
    Unknown,
}

impl PoseLabel {
    #[cfg(test)]
    pub const KNOWN: [PoseLabel; 6] = [
        PoseLabel::Fist,
        PoseLabel::OpenHand,
        PoseLabel::Pointing,
        PoseLabel::PeaceSign,
        PoseLabel::ThumbsUp,
        PoseLabel::Pinch,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PoseLabel::Fist => "fist",
            PoseLabel::OpenHand => "open hand",
            PoseLabel::Pointing => "pointing",
            PoseLabel::PeaceSign => "peace sign",
            PoseLabel::ThumbsUp => "thumbs up",
            PoseLabel::Pinch => "pinch",
            PoseLabel::Unknown => "unknown",
        }
    }

    /// Whether swipe/rotation/push-pull detection runs while this pose is held.
    pub fn allows_motion(&self) -> bool {
        matches!(
            self,
            PoseLabel::OpenHand | PoseLabel::Pointing | PoseLabel::PeaceSign | PoseLabel::Unknown
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Left,
    Right,
    Up,
    Down,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RotateDirection {
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PushPullDirection {
    Push,
    Pull,
}

/// Identifies one debounced gesture. Each value owns its own debounce machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    PoseHeld(PoseLabel),
    Swipe(SwipeDirection),
    Rotate(RotateDirection),
    PushPull(PushPullDirection),
}

impl GestureKind {
    pub const COUNT: usize = 14;

    pub const ALL: [GestureKind; Self::COUNT] = [
        GestureKind::PoseHeld(PoseLabel::Fist),
        GestureKind::PoseHeld(PoseLabel::OpenHand),
        GestureKind::PoseHeld(PoseLabel::Pointing),
        GestureKind::PoseHeld(PoseLabel::PeaceSign),
        GestureKind::PoseHeld(PoseLabel::ThumbsUp),
        GestureKind::PoseHeld(PoseLabel::Pinch),
        GestureKind::Swipe(SwipeDirection::Left),
        GestureKind::Swipe(SwipeDirection::Right),
        GestureKind::Swipe(SwipeDirection::Up),
        GestureKind::Swipe(SwipeDirection::Down),
        GestureKind::Rotate(RotateDirection::Left),
        GestureKind::Rotate(RotateDirection::Right),
        GestureKind::PushPull(PushPullDirection::Push),
        GestureKind::PushPull(PushPullDirection::Pull),
    ];

    /// Position in [`GestureKind::ALL`]; `None` for `PoseHeld(Unknown)`, which never debounces.
    pub fn slot(self) -> Option<usize> {
        let slot = match self {
            GestureKind::PoseHeld(PoseLabel::Fist) => 0,
            GestureKind::PoseHeld(PoseLabel::OpenHand) => 1,
            GestureKind::PoseHeld(PoseLabel::Pointing) => 2,
            GestureKind::PoseHeld(PoseLabel::PeaceSign) => 3,
            GestureKind::PoseHeld(PoseLabel::ThumbsUp) => 4,
            GestureKind::PoseHeld(PoseLabel::Pinch) => 5,
            GestureKind::PoseHeld(PoseLabel::Unknown) => return None,
            GestureKind::Swipe(SwipeDirection::Left) => 6,
            GestureKind::Swipe(SwipeDirection::Right) => 7,
            GestureKind::Swipe(SwipeDirection::Up) => 8,
            GestureKind::Swipe(SwipeDirection::Down) => 9,
            GestureKind::Rotate(RotateDirection::Left) => 10,
            GestureKind::Rotate(RotateDirection::Right) => 11,
            GestureKind::PushPull(PushPullDirection::Push) => 12,
            GestureKind::PushPull(PushPullDirection::Pull) => 13,
        };
        Some(slot)
    }

    pub fn is_motion(&self) -> bool {
        !matches!(self, GestureKind::PoseHeld(_))
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GestureKind::PoseHeld(pose) => f.write_str(pose.label()),
            GestureKind::Swipe(SwipeDirection::Left) => f.write_str("swipe left"),
            GestureKind::Swipe(SwipeDirection::Right) => f.write_str("swipe right"),
            GestureKind::Swipe(SwipeDirection::Up) => f.write_str("swipe up"),
            GestureKind::Swipe(SwipeDirection::Down) => f.write_str("swipe down"),
            GestureKind::Rotate(RotateDirection::Left) => f.write_str("rotate left"),
            GestureKind::Rotate(RotateDirection::Right) => f.write_str("rotate right"),
            GestureKind::PushPull(PushPullDirection::Push) => f.write_str("push"),
            GestureKind::PushPull(PushPullDirection::Pull) => f.write_str("pull"),
        }
    }
}

/// A gesture that passed its hold gate. `magnitude` is the pose confidence or
/// the peak motion magnitude observed while the gesture was a candidate.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub magnitude: f32,
    #[allow(dead_code)]
    pub timestamp: Instant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    MediaControl,
    MouseControl,
    WindowManagement,
    Presentation,
}

impl Mode {
    #[cfg(test)]
    pub const ALL: [Mode; 4] = [
        Mode::MediaControl,
        Mode::MouseControl,
        Mode::WindowManagement,
        Mode::Presentation,
    ];

    pub fn next(self) -> Mode {
        match self {
            Mode::MediaControl => Mode::MouseControl,
            Mode::MouseControl => Mode::WindowManagement,
            Mode::WindowManagement => Mode::Presentation,
            Mode::Presentation => Mode::MediaControl,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::MediaControl => "MEDIA CONTROL",
            Mode::MouseControl => "MOUSE CONTROL",
            Mode::WindowManagement => "WINDOW MANAGEMENT",
            Mode::Presentation => "PRESENTATION MODE",
        })
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown control mode `{0}` (expected media, mouse, window or presentation)")]
pub struct ModeParseError(String);

impl FromStr for Mode {
    type Err = ModeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "media" | "media_control" => Ok(Mode::MediaControl),
            "mouse" | "mouse_control" => Ok(Mode::MouseControl),
            "window" | "window_management" => Ok(Mode::WindowManagement),
            "presentation" | "presentation_mode" => Ok(Mode::Presentation),
            _ => Err(ModeParseError(s.to_string())),
        }
    }
}

/// Sensitivity factor, always within `[MIN, MAX]`.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Sensitivity(f32);

impl Sensitivity {
    pub const MIN: f32 = 0.3;
    pub const MAX: f32 = 3.0;

    /// Clamps into range. NaN has no meaningful clamp and falls back to 1.0.
    pub fn new(value: f32) -> Self {
        if value.is_nan() {
            log::warn!("ignoring NaN sensitivity, using 1.0");
            return Self::default();
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    pub fn adjusted(self, delta: f32) -> Self {
        Self::new(self.0 + delta)
    }
}

impl Default for Sensitivity {
    fn default() -> Self {
        Self(1.0)
    }
}

impl fmt::Display for Sensitivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}x", self.0)
    }
}
