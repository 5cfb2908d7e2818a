//! Synthetic hands for tests.
//!
//! Hands are laid out in hand-length units with the wrist at the origin and
//! the middle-finger base at `(0, -1)` (image y points down), then rotated,
//! scaled and placed in detector space.

use std::{
    sync::OnceLock,
    time::{Duration, Instant},
};

use crate::types::{HandFrame, Handedness, NUM_LANDMARKS, PoseLabel, Point3};

/// Camera tick slightly above 1/30 s so that nine frames cover a full 300 ms.
pub const FRAME: Duration = Duration::from_micros(33_334);

pub fn frame_time(index: u32) -> Instant {
    static BASE: OnceLock<Instant> = OnceLock::new();
    *BASE.get_or_init(Instant::now) + FRAME * index
}

const FINGER_MCPS: [(f32, f32); 4] = [(-0.35, -0.95), (0.0, -1.0), (0.3, -0.95), (0.55, -0.85)];

#[derive(Clone, Debug)]
pub struct HandBuilder {
    /// thumb, index, middle, ring, pinky
    extended: [bool; 5],
    pinch: bool,
    origin: (f32, f32),
    scale: f32,
    rotation_deg: f32,
}

impl HandBuilder {
    pub fn new(pose: PoseLabel) -> Self {
        let (extended, pinch) = match pose {
            PoseLabel::Fist => ([false; 5], false),
            PoseLabel::OpenHand => ([true; 5], false),
            PoseLabel::Pointing => ([false, true, false, false, false], false),
            PoseLabel::PeaceSign => ([false, true, true, false, false], false),
            PoseLabel::ThumbsUp => ([true, false, false, false, false], false),
            PoseLabel::Pinch => ([false; 5], true),
            // thumb, index and middle out: not in the decision table
            PoseLabel::Unknown => ([true, true, true, false, false], false),
        };
        Self::with_fingers(extended, pinch)
    }

    pub fn with_fingers(extended: [bool; 5], pinch: bool) -> Self {
        Self {
            extended,
            pinch,
            origin: (0.5, 0.7),
            scale: 0.1,
            rotation_deg: 0.0,
        }
    }

    /// Wrist position in detector units.
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.origin = (x, y);
        self
    }

    /// Wrist to middle-MCP distance in detector units.
    pub fn scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    /// Clockwise on screen for positive angles.
    pub fn rotation(mut self, degrees: f32) -> Self {
        self.rotation_deg = degrees;
        self
    }

    fn canonical_points(&self) -> [[f32; 2]; NUM_LANDMARKS] {
        let mut pts = [[0.0f32; 2]; NUM_LANDMARKS];
        pts[1] = [-0.3, -0.25];
        pts[2] = [-0.55, -0.45];
        if self.pinch {
            pts[3] = [-0.8, -0.9];
            pts[4] = [-0.6, -1.25];
        } else if self.extended[0] {
            pts[3] = [-0.85, -0.6];
            pts[4] = [-1.1, -0.75];
        } else {
            pts[3] = [-0.35, -0.6];
            pts[4] = [-0.05, -0.5];
        }

        for (finger, &(mx, my)) in FINGER_MCPS.iter().enumerate() {
            let base = 5 + finger * 4;
            pts[base] = [mx, my];
            if finger == 0 && self.pinch {
                pts[base + 1] = [-0.45, -1.35];
                pts[base + 2] = [-0.55, -1.4];
                pts[base + 3] = [-0.62, -1.3];
            } else if self.extended[finger + 1] {
                pts[base + 1] = [mx, my - 0.45];
                pts[base + 2] = [mx, my - 0.75];
                pts[base + 3] = [mx, my - 1.0];
            } else {
                pts[base + 1] = [mx, my - 0.4];
                pts[base + 2] = [mx, my - 0.1];
                pts[base + 3] = [mx, my + 0.15];
            }
        }
        pts
    }

    pub fn build(&self, timestamp: Instant) -> HandFrame {
        let (sin, cos) = self.rotation_deg.to_radians().sin_cos();
        let mut landmarks: [Point3; NUM_LANDMARKS] = [[0.0; 3]; NUM_LANDMARKS];
        for (out, [x, y]) in landmarks.iter_mut().zip(self.canonical_points()) {
            *out = [
                self.origin.0 + self.scale * (x * cos - y * sin),
                self.origin.1 + self.scale * (x * sin + y * cos),
                0.0,
            ];
        }
        HandFrame::new(timestamp, landmarks, Handedness::Right)
    }
}
