use crate::{
    config::EngineConfig,
    types::{
        FINGER_JOINTS, INDEX_TIP, MIDDLE_MCP, NormalizedHandFrame, Point3, PoseLabel, Sensitivity,
        THUMB_MCP, THUMB_TIP,
    },
};

/// Reach beyond the margin (hand-lengths) at which a finger reading counts as fully certain.
const FULL_CONFIDENCE_EXCESS: f32 = 0.3;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates {
    pub thumb: bool,
    pub index: bool,
    pub middle: bool,
    pub ring: bool,
    pub pinky: bool,
}

impl FingerStates {
    pub fn from_array([thumb, index, middle, ring, pinky]: [bool; 5]) -> Self {
        Self {
            thumb,
            index,
            middle,
            ring,
            pinky,
        }
    }

    pub fn as_array(&self) -> [bool; 5] {
        [self.thumb, self.index, self.middle, self.ring, self.pinky]
    }
}

/// One entry of the pose decision table. Rules must be mutually exclusive;
/// a new pose is a new `PoseLabel` variant plus a rule here.
pub struct PoseRule {
    pub label: PoseLabel,
    pub matches: fn(&FingerStates) -> bool,
}

pub const POSE_RULES: &[PoseRule] = &[
    PoseRule {
        label: PoseLabel::OpenHand,
        matches: |f| f.as_array() == [true; 5],
    },
    PoseRule {
        label: PoseLabel::Fist,
        matches: |f| f.as_array() == [false; 5],
    },
    PoseRule {
        label: PoseLabel::Pointing,
        matches: |f| f.as_array() == [false, true, false, false, false],
    },
    PoseRule {
        label: PoseLabel::PeaceSign,
        matches: |f| f.as_array() == [false, true, true, false, false],
    },
    PoseRule {
        label: PoseLabel::ThumbsUp,
        matches: |f| f.as_array() == [true, false, false, false, false],
    },
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PoseEstimate {
    pub label: PoseLabel,
    pub confidence: f32,
    /// `None` when the hand was pinching or a finger reading was ambiguous.
    pub fingers: Option<FingerStates>,
}

impl PoseEstimate {
    fn unknown() -> Self {
        Self {
            label: PoseLabel::Unknown,
            confidence: 0.0,
            fingers: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct FingerReading {
    extended: bool,
    certainty: f32,
}

pub struct PoseClassifier {
    pinch_distance: f32,
    finger_margin: f32,
    thumb_margin: f32,
    ambiguity_band: f32,
}

impl PoseClassifier {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            pinch_distance: config.pinch_distance,
            finger_margin: config.finger_extension_margin,
            thumb_margin: config.thumb_lateral_margin,
            ambiguity_band: config.ambiguity_band,
        }
    }

    /// Pinch reach grows with the square root of sensitivity.
    pub fn pinch_threshold(&self, sensitivity: Sensitivity) -> f32 {
        self.pinch_distance * sensitivity.get().sqrt()
    }

    pub fn classify(&self, frame: &NormalizedHandFrame, sensitivity: Sensitivity) -> PoseEstimate {
        let points = &frame.points;

        let pinch_limit = self.pinch_threshold(sensitivity);
        let pinch_gap = distance3(points[THUMB_TIP], points[INDEX_TIP]);
        if pinch_gap < pinch_limit {
            return PoseEstimate {
                label: PoseLabel::Pinch,
                confidence: 1.0 - pinch_gap / pinch_limit,
                fingers: None,
            };
        }

        let mut readings = [FingerReading {
            extended: false,
            certainty: 0.0,
        }; 5];
        let Some(thumb) = self.read(self.thumb_extension(points), self.thumb_margin) else {
            return PoseEstimate::unknown();
        };
        readings[0] = thumb;
        for (slot, &(_mcp, pip, tip)) in readings[1..].iter_mut().zip(FINGER_JOINTS.iter()) {
            let reach = norm3(points[tip]) - norm3(points[pip]);
            let Some(reading) = self.read(reach, self.finger_margin) else {
                return PoseEstimate::unknown();
            };
            *slot = reading;
        }

        let fingers = FingerStates::from_array(readings.map(|r| r.extended));
        let confidence = readings.iter().map(|r| r.certainty).sum::<f32>() / readings.len() as f32;

        POSE_RULES
            .iter()
            .find(|rule| (rule.matches)(&fingers))
            .map(|rule| PoseEstimate {
                label: rule.label,
                confidence,
                fingers: Some(fingers),
            })
            .unwrap_or(PoseEstimate {
                label: PoseLabel::Unknown,
                confidence: 0.0,
                fingers: Some(fingers),
            })
    }

    /// Lateral offset of the thumb tip from the palm axis, relative to the thumb MCP.
    fn thumb_extension(&self, points: &[Point3]) -> f32 {
        // normalization makes the wrist->middle-MCP vector unit length in the image plane
        let axis = [points[MIDDLE_MCP][0], points[MIDDLE_MCP][1]];
        let lateral = |p: Point3| (axis[0] * p[1] - axis[1] * p[0]).abs();
        lateral(points[THUMB_TIP]) - lateral(points[THUMB_MCP])
    }

    fn read(&self, measurement: f32, margin: f32) -> Option<FingerReading> {
        let excess = measurement - margin;
        if excess.abs() <= self.ambiguity_band {
            return None;
        }
        Some(FingerReading {
            extended: excess > 0.0,
            certainty: (excess.abs() / FULL_CONFIDENCE_EXCESS).min(1.0),
        })
    }
}

fn norm3(p: Point3) -> f32 {
    (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt()
}

fn distance3(a: Point3, b: Point3) -> f32 {
    ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        normalize::Normalizer,
        test_support::{HandBuilder, frame_time},
    };

    fn classify_at(builder: &HandBuilder, sensitivity: f32) -> PoseEstimate {
        let config = EngineConfig::default();
        let frame = Normalizer::new(config.min_hand_scale)
            .normalize(&builder.build(frame_time(0)))
            .unwrap();
        PoseClassifier::new(&config).classify(&frame, Sensitivity::new(sensitivity))
    }

    #[test]
    fn every_pose_is_recognized_at_any_placement() {
        for pose in PoseLabel::KNOWN {
            for (rotation, x, y, scale) in [
                (0.0, 0.5, 0.7, 0.1),
                (35.0, 0.2, 0.4, 0.05),
                (-60.0, 0.8, 0.9, 0.2),
                (180.0, 0.5, 0.2, 0.08),
            ] {
                let builder = HandBuilder::new(pose).at(x, y).scale(scale).rotation(rotation);
                let estimate = classify_at(&builder, 1.0);
                assert_eq!(estimate.label, pose, "rotation {rotation}");
                assert!(estimate.confidence > 0.5 && estimate.confidence <= 1.0);
            }
        }
    }

    #[test]
    fn combinations_outside_the_table_are_unknown() {
        for fingers in [
            [true, true, true, false, false],
            [false, false, false, true, false],
            [false, true, false, false, true],
            [true, true, true, true, false],
        ] {
            let estimate = classify_at(&HandBuilder::with_fingers(fingers, false), 1.0);
            assert_eq!(estimate.label, PoseLabel::Unknown, "{fingers:?}");
            assert_eq!(estimate.confidence, 0.0);
        }
    }

    #[test]
    fn pinch_wins_over_extended_fingers() {
        let ok_sign = HandBuilder::with_fingers([false, false, true, true, true], true);
        assert_eq!(classify_at(&ok_sign, 1.0).label, PoseLabel::Pinch);
        assert_eq!(classify_at(&ok_sign, Sensitivity::MIN).label, PoseLabel::Pinch);
    }

    #[test]
    fn high_sensitivity_does_not_turn_other_poses_into_pinch() {
        for pose in PoseLabel::KNOWN {
            if pose == PoseLabel::Pinch {
                continue;
            }
            let estimate = classify_at(&HandBuilder::new(pose), Sensitivity::MAX);
            assert_eq!(estimate.label, pose);
        }
    }

    #[test]
    fn borderline_finger_resolves_to_unknown() {
        let config = EngineConfig::default();
        let mut frame = Normalizer::new(config.min_hand_scale)
            .normalize(&HandBuilder::new(PoseLabel::OpenHand).build(frame_time(0)))
            .unwrap();

        // put the index tip exactly one margin beyond its PIP joint
        let pip = frame.points[6];
        let target = norm3(pip) + config.finger_extension_margin;
        let k = target / norm3(pip);
        frame.points[INDEX_TIP] = [pip[0] * k, pip[1] * k, pip[2] * k];

        let estimate = PoseClassifier::new(&config).classify(&frame, Sensitivity::default());
        assert_eq!(estimate.label, PoseLabel::Unknown);
        assert_eq!(estimate.fingers, None);
    }

    #[test]
    fn rule_table_is_mutually_exclusive() {
        for bits in 0u8..32 {
            let fingers = FingerStates::from_array(std::array::from_fn(|i| bits & (1 << i) != 0));
            let hits = POSE_RULES.iter().filter(|r| (r.matches)(&fingers)).count();
            assert!(hits <= 1, "{fingers:?} matched {hits} rules");
        }
    }
}
