use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use segment_tracker::config::parse_warn_after;
use segment_tracker::{SegmentTracker, TrackerConfig, report};

#[derive(Parser, Debug)]
#[command(
    name = "segment-tracker",
    about = "Time pipeline stages and warn when one runs too long",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Commands,
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a command as a timed segment and print a summary
    Run {
        /// Segment label (defaults to the program name)
        #[arg(long)]
        label: Option<String>,
        /// Number of times to run the command
        #[arg(long, default_value_t = 1)]
        repeat: u32,
        /// Seconds before a long-running warning (overrides SEGMENT_TRACKER_WARN_AFTER_SECS)
        #[arg(long, value_parser = warn_after_arg)]
        warn_after: Option<Duration>,
        /// Command and arguments to run
        #[arg(trailing_var_arg = true, required = true, num_args = 1..)]
        command: Vec<String>,
    },
}

fn warn_after_arg(raw: &str) -> Result<Duration, String> {
    parse_warn_after(raw).ok_or_else(|| format!("expected a positive number of seconds, got '{raw}'"))
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(level)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn run_once(tracker: &SegmentTracker, label: &str, command: &[String]) -> Result<bool> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| anyhow!("no command given"))?;

    let guard = tracker.scope(label)?;
    let status = Command::new(program)
        .args(args)
        .status()
        .with_context(|| format!("failed to spawn {program}"))?;
    let elapsed = guard.finish()?;

    if status.success() {
        info!(label, elapsed_secs = elapsed.as_secs_f64(), "run completed");
    } else {
        warn!(label, %status, elapsed_secs = elapsed.as_secs_f64(), "run failed");
    }
    Ok(status.success())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Run {
            label,
            repeat,
            warn_after,
            command,
        } => {
            let mut config = TrackerConfig::from_env();
            if let Some(warn_after) = warn_after {
                config = config.with_warn_after(warn_after);
            }
            let label = match label {
                Some(label) => label,
                None => command
                    .first()
                    .cloned()
                    .ok_or_else(|| anyhow!("no command given"))?,
            };
            info!(
                label,
                repeat,
                warn_after_secs = config.warn_after.as_secs_f64(),
                "starting run"
            );

            let tracker = SegmentTracker::with_config(config);
            let mut failures = 0u32;
            for _ in 0..repeat {
                if !run_once(&tracker, &label, &command)? {
                    failures += 1;
                }
            }

            print!("{}", report::render_table(&tracker.summary()));
            info!(
                label,
                runs = repeat,
                failures,
                total_secs = tracker.total_time(None).as_secs_f64(),
                "run flow completed"
            );
            if failures > 0 {
                return Err(anyhow!("{failures} of {repeat} runs of {label} failed"));
            }
        }
    }

    Ok(())
}
