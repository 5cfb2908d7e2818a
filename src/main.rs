mod config;
mod debounce;
mod dispatch;
mod engine;
mod motion;
mod normalize;
mod pointer;
mod pose;
mod replay;
mod types;

#[cfg(test)]
mod test_support;

use std::{
    fs::File,
    io::{self, BufRead, BufReader, Write},
    path::PathBuf,
    time::Instant,
};

use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel::{bounded, unbounded};
use serde::Serialize;

use config::EngineConfig;
use dispatch::ActionRequest;
use engine::{EngineInput, GestureEngine, start_engine};
use types::{Mode, Sensitivity};

const USAGE: &str = "usage: gesture-control [--mode media|mouse|window|presentation] [--sensitivity N] [TRACE|-]";

struct Args {
    /// `None` reads the trace from stdin.
    trace: Option<PathBuf>,
    mode: Mode,
    sensitivity: f32,
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let mut parsed = Args {
        trace: None,
        mode: Mode::default(),
        sensitivity: Sensitivity::default().get(),
    };

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            "--mode" => {
                let value = args.next().context("--mode needs a value")?;
                parsed.mode = value.parse()?;
            }
            "--sensitivity" => {
                let value = args.next().context("--sensitivity needs a value")?;
                parsed.sensitivity = value
                    .parse()
                    .with_context(|| format!("invalid sensitivity `{value}`"))?;
            }
            "-" => parsed.trace = None,
            other if other.starts_with("--") => bail!("unknown option `{other}`\n{USAGE}"),
            path => {
                if parsed.trace.is_some() {
                    bail!("only one trace can be replayed at a time\n{USAGE}");
                }
                parsed.trace = Some(PathBuf::from(path));
            }
        }
    }
    Ok(parsed)
}

#[derive(Serialize)]
struct ActionLine<'a> {
    tick: u64,
    #[serde(flatten)]
    action: &'a ActionRequest,
}

fn main() -> Result<()> {
    env_logger::init();

    let args = parse_args()?;

    let reader: Box<dyn BufRead> = match &args.trace {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("failed to open {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };
    let inputs = replay::parse_trace(reader, Instant::now()).context("failed to parse trace")?;
    let frames = inputs
        .iter()
        .filter(|input| matches!(input, EngineInput::Frame(_)))
        .count();
    log::info!("replaying {frames} frames");

    let mut engine =
        GestureEngine::new(EngineConfig::default()).context("invalid engine configuration")?;
    engine.set_mode(args.mode);
    engine.set_sensitivity(args.sensitivity);
    let context = engine.context();
    log::info!(
        "replaying in {} at sensitivity {}",
        context.mode,
        context.sensitivity
    );

    let (input_tx, input_rx) = bounded(64);
    let (action_tx, action_rx) = unbounded();
    let worker = start_engine(engine, input_rx, action_tx);

    for input in inputs {
        input_tx
            .send(input)
            .map_err(|_| anyhow!("gesture engine stopped early"))?;
    }
    drop(input_tx);

    let mut out = io::stdout().lock();
    for batch in action_rx.iter() {
        for action in &batch.actions {
            let line = serde_json::to_string(&ActionLine {
                tick: batch.tick,
                action,
            })?;
            writeln!(out, "{line}")?;
        }
    }

    worker
        .join()
        .map_err(|_| anyhow!("gesture engine thread panicked"))?;
    Ok(())
}
