#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Turret Defence scenario headlessly.

mod scenario;
mod simulation;

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use turret_defence_rendering::{present_text, FrameRecorder};

use crate::{scenario::Scenario, simulation::Simulation};

/// Runs towers against a scripted roster of enemies and reports the outcome.
#[derive(Debug, Parser)]
#[command(name = "turret-defence", version, about)]
struct Args {
    /// Scenario file to run; the built-in scenario is used when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,
    /// Overrides the number of ticks declared by the scenario.
    #[arg(long)]
    ticks: Option<u32>,
    /// Overrides the tick length in milliseconds.
    #[arg(long)]
    dt_ms: Option<u64>,
    /// Prints every recorded frame.
    #[arg(long)]
    frames: bool,
    /// Emits the final report as JSON.
    #[arg(long)]
    json: bool,
}

/// Entry point for the Turret Defence command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env().add_directive("turret_defence=info".parse()?))
        .init();

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::builtin()?,
    };
    let ticks = args.ticks.unwrap_or(scenario.ticks);
    let dt = Duration::from_millis(args.dt_ms.unwrap_or(scenario.dt_ms));

    let mut simulation = Simulation::new(&scenario)?;
    let mut recorder = FrameRecorder::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    info!(ticks, dt = ?dt, "simulation starting");
    for _ in 0..ticks {
        simulation.tick(dt, &mut recorder);
        let frame = recorder.finish_frame();
        if args.frames {
            present_text(&frame, &mut out)?;
        }
    }

    let report = simulation.report();
    info!(shots = report.total_shots(), "simulation finished");
    if args.json {
        serde_json::to_writer_pretty(&mut out, &report).context("failed to encode report")?;
        writeln!(out)?;
    } else {
        report.write_text(&mut out)?;
    }

    Ok(())
}
