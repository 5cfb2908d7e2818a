//! JSON-lines landmark traces.
//!
//! One record per camera tick:
//!
//! ```text
//! {"t_ms": 0, "landmarks": [[0.51, 0.72, 0.0], ...], "handedness": "right"}
//! {"t_ms": 33.3, "landmarks": null}
//! {"t_ms": 66.7, "control": [{"type": "set_mode", "mode": "mouse_control"}], "landmarks": [...]}
//! ```
//!
//! A missing or null `landmarks` field is a tick without a hand. Control
//! messages are applied before the record's frame. Blank lines and lines
//! starting with `#` are ignored.

use std::{
    io::BufRead,
    time::{Duration, Instant},
};

use serde::Deserialize;

use crate::{
    engine::{ControlMessage, EngineInput},
    types::{FrameError, HandFrame, Handedness, Point3},
};

#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    #[error("failed to read trace")]
    Io(#[from] std::io::Error),
    #[error("line {line}: malformed record")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: bad hand")]
    Frame {
        line: usize,
        #[source]
        source: FrameError,
    },
    #[error("line {line}: timestamp {t_ms} is not a non-negative number of milliseconds")]
    Timestamp { line: usize, t_ms: f64 },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct TraceRecord {
    t_ms: f64,
    #[serde(default)]
    landmarks: Option<Vec<Point3>>,
    #[serde(default)]
    handedness: Handedness,
    #[serde(default)]
    control: Vec<ControlMessage>,
}

/// Parses a whole trace into engine input, with `t_ms` measured from `base`.
pub fn parse_trace(reader: impl BufRead, base: Instant) -> Result<Vec<EngineInput>, TraceError> {
    let mut inputs = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let record: TraceRecord = serde_json::from_str(trimmed).map_err(|source| TraceError::Json {
            line: line_no,
            source,
        })?;
        let timestamp = Duration::try_from_secs_f64(record.t_ms / 1000.0)
            .ok()
            .and_then(|offset| base.checked_add(offset))
            .ok_or(TraceError::Timestamp {
                line: line_no,
                t_ms: record.t_ms,
            })?;

        inputs.extend(record.control.into_iter().map(EngineInput::Control));
        let frame = record
            .landmarks
            .map(|points| HandFrame::from_points(timestamp, &points, record.handedness))
            .transpose()
            .map_err(|source| TraceError::Frame {
                line: line_no,
                source,
            })?;
        inputs.push(EngineInput::Frame(frame));
    }
    log::debug!("parsed {} trace inputs", inputs.len());
    Ok(inputs)
}
