use crate::types::{HandFrame, MIDDLE_MCP, NUM_LANDMARKS, NormalizedHandFrame, Point3, WRIST};

#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("hand scale {0} is below the minimum")]
    DegenerateScale(f32),
    #[error("landmark {0} has a non-finite coordinate")]
    NonFinite(usize),
}

/// Re-anchors frames on the wrist and rescales them to one hand-length.
#[derive(Clone, Debug)]
pub struct Normalizer {
    min_hand_scale: f32,
}

impl Normalizer {
    pub fn new(min_hand_scale: f32) -> Self {
        Self { min_hand_scale }
    }

    pub fn normalize(&self, frame: &HandFrame) -> Result<NormalizedHandFrame, SkipReason> {
        if let Some(idx) = frame
            .landmarks
            .iter()
            .position(|p| p.iter().any(|c| !c.is_finite()))
        {
            return Err(SkipReason::NonFinite(idx));
        }

        let wrist = frame.landmarks[WRIST];
        let middle_mcp = frame.landmarks[MIDDLE_MCP];
        let dx = middle_mcp[0] - wrist[0];
        let dy = middle_mcp[1] - wrist[1];
        let hand_scale = (dx * dx + dy * dy).sqrt();
        if hand_scale < self.min_hand_scale {
            return Err(SkipReason::DegenerateScale(hand_scale));
        }

        let mut points: [Point3; NUM_LANDMARKS] = [[0.0; 3]; NUM_LANDMARKS];
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        for (out, p) in points.iter_mut().zip(frame.landmarks.iter()) {
            *out = [
                (p[0] - wrist[0]) / hand_scale,
                (p[1] - wrist[1]) / hand_scale,
                (p[2] - wrist[2]) / hand_scale,
            ];
            sum_x += p[0];
            sum_y += p[1];
        }

        let n = NUM_LANDMARKS as f32;
        Ok(NormalizedHandFrame {
            timestamp: frame.timestamp,
            points,
            hand_scale,
            centroid: [sum_x / n, sum_y / n],
            palm: [(wrist[0] + middle_mcp[0]) / 2.0, (wrist[1] + middle_mcp[1]) / 2.0],
            orientation_deg: dy.atan2(dx).to_degrees(),
            handedness: frame.handedness,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{HandBuilder, frame_time};
    use crate::types::PoseLabel;

    #[test]
    fn wrist_becomes_origin_and_middle_mcp_unit_length() {
        let frame = HandBuilder::new(PoseLabel::OpenHand)
            .at(0.4, 0.6)
            .scale(0.12)
            .build(frame_time(0));
        let normalized = Normalizer::new(0.01).normalize(&frame).unwrap();

        assert!((normalized.hand_scale - 0.12).abs() < 1e-5);
        assert_eq!(normalized.points[WRIST], [0.0, 0.0, 0.0]);
        let mcp = normalized.points[MIDDLE_MCP];
        assert!(((mcp[0] * mcp[0] + mcp[1] * mcp[1]).sqrt() - 1.0).abs() < 1e-4);
        assert!((normalized.orientation_deg + 90.0).abs() < 1e-3);
    }

    #[test]
    fn translation_and_scale_do_not_change_normalized_points() {
        let normalizer = Normalizer::new(0.01);
        let small = HandBuilder::new(PoseLabel::PeaceSign)
            .at(0.2, 0.3)
            .scale(0.05)
            .build(frame_time(0));
        let large = HandBuilder::new(PoseLabel::PeaceSign)
            .at(0.7, 0.8)
            .scale(0.2)
            .build(frame_time(0));

        let a = normalizer.normalize(&small).unwrap();
        let b = normalizer.normalize(&large).unwrap();
        for (pa, pb) in a.points.iter().zip(b.points.iter()) {
            assert!((pa[0] - pb[0]).abs() < 1e-4 && (pa[1] - pb[1]).abs() < 1e-4);
        }
    }

    #[test]
    fn degenerate_hand_is_skipped() {
        let frame = HandBuilder::new(PoseLabel::Fist)
            .scale(0.001)
            .build(frame_time(0));
        assert!(matches!(
            Normalizer::new(0.01).normalize(&frame),
            Err(SkipReason::DegenerateScale(_))
        ));
    }

    #[test]
    fn non_finite_landmark_is_skipped() {
        let mut frame = HandBuilder::new(PoseLabel::Fist).build(frame_time(0));
        frame.landmarks[7][1] = f32::NAN;
        assert_eq!(
            Normalizer::new(0.01).normalize(&frame).unwrap_err(),
            SkipReason::NonFinite(7)
        );
    }
}
