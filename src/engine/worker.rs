use std::thread;

use crossbeam_channel::{Receiver, Sender};
use serde::Deserialize;

use super::GestureEngine;
use crate::{
    dispatch::ActionRequest,
    types::{HandFrame, Mode},
};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    SetMode { mode: Mode },
    SetSensitivity { value: f32 },
    AdjustSensitivity { delta: f32 },
    CycleMode,
    SetEnabled { enabled: bool },
    ToggleEnabled,
}

/// Frames and control messages share one channel so that a control message
/// always lands exactly between the frames it was sent between.
#[derive(Clone, Debug)]
pub enum EngineInput {
    Frame(Option<HandFrame>),
    Control(ControlMessage),
}

/// Actions produced by one frame. Frames without actions are not published.
#[derive(Clone, Debug, PartialEq)]
pub struct TickActions {
    /// Zero-based index of the frame among all frames received.
    pub tick: u64,
    pub actions: Vec<ActionRequest>,
}

pub fn start_engine(
    engine: GestureEngine,
    input_rx: Receiver<EngineInput>,
    action_tx: Sender<TickActions>,
) -> thread::JoinHandle<()> {
    log::info!("starting gesture engine worker");
    thread::spawn(move || run_engine_loop(engine, input_rx, action_tx))
}

// Unlike a camera preview, every frame matters here: skipping one would
// corrupt hold timing, so the loop never drops stale input.
fn run_engine_loop(
    mut engine: GestureEngine,
    input_rx: Receiver<EngineInput>,
    action_tx: Sender<TickActions>,
) {
    let mut tick = 0u64;
    let mut handless = 0u64;
    let mut confirmed = 0usize;
    for input in input_rx.iter() {
        match input {
            EngineInput::Control(message) => engine.apply(message),
            EngineInput::Frame(frame) => {
                let report = engine.process_frame(frame.as_ref());
                let index = tick;
                tick += 1;
                if report.pose.is_none() {
                    handless += 1;
                }
                confirmed += report.events.len();
                if report.actions.is_empty() {
                    continue;
                }
                let batch = TickActions {
                    tick: index,
                    actions: report.actions,
                };
                if action_tx.send(batch).is_err() {
                    log::warn!("action receiver dropped, stopping gesture engine");
                    return;
                }
            }
        }
    }
    log::info!(
        "gesture engine stopped after {tick} frames ({handless} without a usable hand), {confirmed} gestures confirmed"
    );
}
