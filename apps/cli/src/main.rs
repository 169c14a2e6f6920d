use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use orchestrator_cell::{HyperparameterOverrides, RunRequest};
use shared_config::AppConfig;

/// Run one cyclic scheduling set of the ED decision-support engine from the
/// command line, mirroring what `POST /api/simulation/run` does over HTTP.
#[derive(Debug, Parser)]
#[command(name = "ed-sim", version, about)]
struct Cli {
    /// Number of days to simulate.
    #[arg(long, default_value_t = 28)]
    days: u32,

    /// Label of a configured arrival-rate function; defaults to the
    /// config's `defaultArrivalFunction`.
    #[arg(long)]
    arrival_function: Option<String>,

    /// Triage classifier to use (CTAS, ESI, MTS); defaults to CTAS.
    #[arg(long)]
    triage_classifier: Option<String>,

    /// Force every arrival to this triage level instead of classifying it.
    #[arg(long)]
    triage_level: Option<String>,

    /// Mean interarrival time override, in minutes.
    #[arg(long)]
    interarrival_time: Option<f64>,

    /// Treatment-room capacity override.
    #[arg(long)]
    treatment_capacity: Option<usize>,

    /// Waiting-room capacity override.
    #[arg(long)]
    waiting_capacity: Option<usize>,

    /// RNG seed for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Directory the hourly CSV log is written into.
    #[arg(long, default_value = ".")]
    log_dir: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = match AppConfig::from_env_or_default() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let hyperparameters = if cli.interarrival_time.is_some()
        || cli.treatment_capacity.is_some()
        || cli.waiting_capacity.is_some()
    {
        Some(HyperparameterOverrides {
            interarrival_time: cli.interarrival_time,
            treatment_capacity: cli.treatment_capacity,
            waiting_capacity: cli.waiting_capacity,
        })
    } else {
        None
    };

    let request = RunRequest {
        days: cli.days,
        arrival_function: cli.arrival_function,
        triage_classifier: cli.triage_classifier,
        triage_level: cli.triage_level,
        hyperparameters,
        seed: cli.seed,
    };

    info!(days = request.days, "starting simulation run");

    match orchestrator_cell::run(&config, &request, &cli.log_dir) {
        Ok(outcome) => {
            let rejection_rate = if outcome.total_arrivals > 0 {
                100.0 * outcome.patients_rejected as f64 / outcome.total_arrivals as f64
            } else {
                0.0
            };
            println!("hours simulated:     {}", outcome.hourly.len());
            println!("total arrivals:      {}", outcome.total_arrivals);
            println!("patients processed:  {}", outcome.patients_processed);
            println!("patients rejected:   {} ({:.1}%)", outcome.patients_rejected, rejection_rate);
            for (class, schedule) in &outcome.roster {
                println!(
                    "roster[{class:?}]: feasible={} staff={} cost={:.2}",
                    schedule.feasible,
                    schedule.assignments.len(),
                    schedule.total_cost
                );
            }
            match &outcome.log_path {
                Some(path) => println!("hourly log written to {}", path.display()),
                None => println!("hourly log was not written (see warnings above)"),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "simulation run failed");
            ExitCode::FAILURE
        }
    }
}
