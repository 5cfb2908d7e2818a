use crate::{
    config::EngineConfig,
    dispatch::ActionRequest,
    types::{NormalizedHandFrame, PoseLabel},
};

/// Per-frame cursor, scroll and drag output for mouse control.
///
/// Unlike the gesture tables this path is not debounced: every frame with a
/// steering pose yields a cursor move.
#[derive(Clone, Debug)]
pub struct PointerChannel {
    smoothing: f32,
    scroll_deadzone: f32,
    cursor: Option<[f32; 2]>,
    last_scroll_y: Option<f32>,
    dragging: bool,
}

impl PointerChannel {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            smoothing: config.cursor_smoothing,
            scroll_deadzone: config.scroll_deadzone,
            cursor: None,
            last_scroll_y: None,
            dragging: false,
        }
    }

    #[cfg(test)]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn track(&mut self, pose: PoseLabel, frame: &NormalizedHandFrame) -> Vec<ActionRequest> {
        let mut actions = Vec::new();

        if self.dragging && pose != PoseLabel::ThumbsUp {
            self.dragging = false;
            actions.push(ActionRequest::DragEnd);
        }

        let steering = matches!(pose, PoseLabel::OpenHand | PoseLabel::Pointing)
            || (self.dragging && pose == PoseLabel::ThumbsUp);
        if steering {
            let [x, y] = self.smooth(frame.palm);
            actions.push(ActionRequest::CursorMove { x, y });
        }

        if pose == PoseLabel::Fist {
            let y = frame.palm[1];
            if let Some(previous) = self.last_scroll_y {
                // hand moving up (smaller y) scrolls up
                let amount = (previous - y) / frame.hand_scale;
                if amount.abs() > self.scroll_deadzone {
                    actions.push(ActionRequest::Scroll { amount });
                }
            }
            self.last_scroll_y = Some(y);
        } else {
            self.last_scroll_y = None;
        }

        actions
    }

    /// Called for every discrete action dispatched in mouse mode.
    pub fn note_discrete(&mut self, action: &ActionRequest) {
        if *action == ActionRequest::DragStart {
            self.dragging = true;
        }
    }

    /// Forgets all tracking. Returns a `DragEnd` when a drag was in progress.
    pub fn release(&mut self) -> Option<ActionRequest> {
        self.cursor = None;
        self.last_scroll_y = None;
        if self.dragging {
            self.dragging = false;
            Some(ActionRequest::DragEnd)
        } else {
            None
        }
    }

    fn smooth(&mut self, palm: [f32; 2]) -> [f32; 2] {
        let target = palm.map(|v| v.clamp(0.0, 1.0));
        let next = match self.cursor {
            Some(prev) => [
                lerp(prev[0], target[0], 1.0 - self.smoothing),
                lerp(prev[1], target[1], 1.0 - self.smoothing),
            ],
            None => target,
        };
        self.cursor = Some(next);
        next
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
