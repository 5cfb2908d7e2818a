use std::time::{Duration, Instant};

use crate::{
    config::DebounceTiming,
    types::{GestureEvent, GestureKind},
};

/// `Confirmed` is never stored: a machine that passes its hold gate emits and
/// lands in `Cooldown` within the same step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum DebounceState {
    #[default]
    Idle,
    Candidate {
        held: Duration,
        peak: f32,
    },
    Cooldown {
        elapsed: Duration,
    },
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DebounceMachine {
    state: DebounceState,
}

impl DebounceMachine {
    pub fn state(&self) -> DebounceState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = DebounceState::Idle;
    }

    /// Advances the machine by one frame of `dt`.
    ///
    /// `active` carries the condition's magnitude when it is true this frame.
    /// Returns the peak magnitude seen during the hold when the gesture confirms.
    pub fn step(&mut self, active: Option<f32>, dt: Duration, timing: &DebounceTiming) -> Option<f32> {
        if let DebounceState::Cooldown { elapsed } = &mut self.state {
            *elapsed += dt;
            if *elapsed < timing.cooldown {
                return None;
            }
            // re-armed: this frame's condition is evaluated from Idle
            self.state = DebounceState::Idle;
        }

        let Some(magnitude) = active else {
            self.state = DebounceState::Idle;
            return None;
        };

        let (held, peak) = match self.state {
            DebounceState::Candidate { held, peak } => (held + dt, peak.max(magnitude)),
            _ => (dt, magnitude),
        };

        if held >= timing.hold {
            self.state = DebounceState::Cooldown {
                elapsed: Duration::ZERO,
            };
            Some(peak)
        } else {
            self.state = DebounceState::Candidate { held, peak };
            None
        }
    }
}

/// One machine per debounced gesture kind, indexed by [`GestureKind::slot`].
#[derive(Clone, Debug, Default)]
pub struct DebounceBank {
    machines: [DebounceMachine; GestureKind::COUNT],
}

impl DebounceBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps every machine. Kinds missing from `active` are false this frame.
    pub fn step(
        &mut self,
        active: &[(GestureKind, f32)],
        dt: Duration,
        timing: &DebounceTiming,
        now: Instant,
    ) -> Vec<GestureEvent> {
        let mut events = Vec::new();
        for (machine, kind) in self.machines.iter_mut().zip(GestureKind::ALL) {
            let magnitude = active
                .iter()
                .find(|(candidate, _)| *candidate == kind)
                .map(|&(_, magnitude)| magnitude);
            if let Some(peak) = machine.step(magnitude, dt, timing) {
                events.push(GestureEvent {
                    kind,
                    magnitude: peak,
                    timestamp: now,
                });
            }
        }
        events
    }

    pub fn reset_all(&mut self) {
        self.machines.iter_mut().for_each(DebounceMachine::reset);
    }

    pub fn state(&self, kind: GestureKind) -> Option<DebounceState> {
        kind.slot().map(|slot| self.machines[slot].state())
    }

    pub fn all_idle(&self) -> bool {
        self.machines
            .iter()
            .all(|m| m.state() == DebounceState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::EngineConfig,
        test_support::{FRAME, frame_time},
        types::{PoseLabel, Sensitivity, SwipeDirection},
    };

    const FIST: GestureKind = GestureKind::PoseHeld(PoseLabel::Fist);
    const SWIPE_LEFT: GestureKind = GestureKind::Swipe(SwipeDirection::Left);

    fn timing(sensitivity: f32) -> DebounceTiming {
        DebounceTiming::new(&EngineConfig::default(), Sensitivity::new(sensitivity))
    }

    /// Frames (1-based) on which the machine emits while the condition is held for `frames`.
    fn emissions(frames: u32, timing: &DebounceTiming) -> Vec<u32> {
        let mut machine = DebounceMachine::default();
        (1..=frames)
            .filter(|_| machine.step(Some(1.0), FRAME, timing).is_some())
            .collect()
    }

    #[test]
    fn short_holds_never_emit() {
        for s in [0.3, 0.5, 1.0, 1.7, 2.0, 3.0] {
            let timing = timing(s);
            let needed = (1..).find(|n| FRAME * *n >= timing.hold).unwrap();
            let mut machine = DebounceMachine::default();
            for _ in 1..needed {
                assert_eq!(machine.step(Some(1.0), FRAME, &timing), None, "sensitivity {s}");
            }
            assert!(machine.step(Some(1.0), FRAME, &timing).is_some(), "sensitivity {s}");
        }
    }

    #[test]
    fn sustained_condition_emits_once_then_after_cooldown() {
        // 9 frames of hold, then 24 frames of cooldown before re-arming
        assert_eq!(emissions(40, &timing(1.0)), vec![9]);
        assert_eq!(emissions(41, &timing(1.0)), vec![9, 41]);
    }

    #[test]
    fn broken_condition_reverts_to_idle() {
        let timing = timing(1.0);
        let mut machine = DebounceMachine::default();
        for _ in 0..8 {
            assert_eq!(machine.step(Some(1.0), FRAME, &timing), None);
        }
        assert_eq!(machine.step(None, FRAME, &timing), None);
        assert_eq!(machine.state(), DebounceState::Idle);
        for _ in 0..8 {
            assert_eq!(machine.step(Some(1.0), FRAME, &timing), None);
        }
        assert!(machine.step(Some(1.0), FRAME, &timing).is_some());
    }

    #[test]
    fn cooldown_ignores_the_condition_dropping() {
        let timing = timing(1.0);
        let mut machine = DebounceMachine::default();
        let emitted = (0..9).filter_map(|_| machine.step(Some(1.0), FRAME, &timing)).count();
        assert_eq!(emitted, 1);
        machine.step(None, FRAME, &timing);
        assert!(matches!(machine.state(), DebounceState::Cooldown { .. }));
    }

    #[test]
    fn event_carries_peak_magnitude() {
        let timing = timing(1.0);
        let mut machine = DebounceMachine::default();
        let magnitudes = [0.4, 0.9, 0.5, 0.6, 0.7, 0.3, 0.5, 0.5, 0.5];
        let peak = magnitudes
            .iter()
            .filter_map(|m| machine.step(Some(*m), FRAME, &timing))
            .last();
        assert_eq!(peak, Some(0.9));
    }

    #[test]
    fn bank_machines_are_independent() {
        let timing = timing(1.0);
        let mut bank = DebounceBank::new();
        let mut fist_events = 0;
        let mut swipe_events = 0;
        for i in 1..=12 {
            // the swipe only starts on frame 4
            let mut active = vec![(FIST, 0.8)];
            if i >= 4 {
                active.push((SWIPE_LEFT, 2.0));
            }
            for event in bank.step(&active, FRAME, &timing, frame_time(i)) {
                match event.kind {
                    FIST => {
                        assert_eq!(i, 9);
                        fist_events += 1;
                    }
                    SWIPE_LEFT => {
                        assert_eq!(i, 12);
                        swipe_events += 1;
                    }
                    other => panic!("unexpected {other}"),
                }
            }
        }
        assert_eq!((fist_events, swipe_events), (1, 1));
    }

    #[test]
    fn reset_all_returns_every_machine_to_idle() {
        let timing = timing(1.0);
        let mut bank = DebounceBank::new();
        for i in 1..=10 {
            bank.step(&[(FIST, 1.0), (SWIPE_LEFT, 2.0)], FRAME, &timing, frame_time(i));
        }
        assert!(matches!(bank.state(FIST), Some(DebounceState::Cooldown { .. })));
        assert!(!bank.all_idle());

        bank.reset_all();
        assert!(bank.all_idle());
        assert_eq!(bank.state(GestureKind::PoseHeld(PoseLabel::Unknown)), None);
    }
}
