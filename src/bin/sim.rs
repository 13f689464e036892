// Copyright (c) 2026 Pegasus Heavy Industries LLC
// Licensed under the MIT License

//! tempctl-sim: headless runner that drives a single adjustment run on a
//! tokio interval and reports the outcome. Ctrl-C cancels the run.

use clap::Parser;
use std::process::ExitCode;
use temperature_control::config::{self, Config};
use temperature_control::controller::{ControlEvent, Controller};
use temperature_control::error::parse_temperature;
use temperature_control::state::ControlState;
use tokio::sync::mpsc;
use tokio::time::{self, Duration, MissedTickBehavior};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "tempctl-sim", about = "Run one temperature adjustment headlessly")]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: String,

    /// Desired temperature, entered as text (rounded to the nearest 0.5).
    #[arg(short, long)]
    desired: Option<String>,

    /// Initial current temperature.
    #[arg(long, default_value_t = 25.0, value_parser = parse_temperature)]
    start: f64,

    /// Step size per tick (0.1 - 1.0, rounded to one decimal).
    #[arg(long, value_parser = parse_temperature)]
    step: Option<f64>,

    /// Override the tick interval in milliseconds.
    #[arg(short, long)]
    interval_ms: Option<u64>,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config_path = config::resolve_config_path(Some(&cli.config));
    let cfg = config::load_config(&config_path).unwrap_or_else(|e| {
        log::warn!("Could not load config: {e}, using defaults");
        Config::default()
    });

    let interval = match cli.interval_ms {
        Some(0) => anyhow::bail!("--interval-ms must be greater than 0"),
        Some(ms) => Duration::from_millis(ms),
        None => cfg.simulation.tick_interval(),
    };

    let mut controller = Controller::with_state(
        ControlState {
            current_c: cli.start,
            ..ControlState::default()
        },
        interval,
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    controller.subscribe(move |event| {
        let _ = tx.send(event.clone());
    });

    if let Some(step) = cli.step {
        controller.on_step_changed_by_slider(step);
    }
    if let Some(text) = &cli.desired {
        if let Err(e) = controller.on_desired_changed_by_text(text) {
            eprintln!("{e}");
            return Ok(ExitCode::from(2));
        }
    }

    let Some(token) = controller.on_adjust_pressed() else {
        anyhow::bail!("a run is already in progress");
    };

    // Signal handler
    let token_for_signal = token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        log::info!("Received interrupt, stopping at the next tick");
        token_for_signal.cancel();
    });

    // Tick loop: the cancellation token is observed at the start of each tick.
    let mut ticker = time::interval_at(time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut outcome = None;

    while controller.is_running() {
        ticker.tick().await;
        controller.tick();

        while let Ok(event) = rx.try_recv() {
            match event {
                ControlEvent::Redraw {
                    current_c,
                    desired_c,
                } => {
                    println!(
                        "tick {:>4}  current {current_c:>6.1}°C  desired {desired_c:>6.1}°C",
                        controller.state().iterations
                    );
                }
                ControlEvent::Stabilized { .. } | ControlEvent::Cancelled { .. } => {
                    outcome = Some(event);
                }
                ControlEvent::Notice(message) => log::info!("{message}"),
            }
        }
    }

    match outcome {
        Some(event @ ControlEvent::Stabilized { .. }) => {
            if let Some(message) = event.message() {
                println!("{message}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(event) => {
            if let Some(message) = event.message() {
                println!("{message}");
            }
            Ok(ExitCode::from(130))
        }
        None => Ok(ExitCode::SUCCESS),
    }
}
