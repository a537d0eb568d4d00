//! CLI entry point for the livability scorer.
//!
//! Provides subcommands for classifying a commune, printing a tier's amenity
//! query plan, scoring a facts document and listing calibration profiles.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use livability::{
    output::{ScoreRecord, append_record, print_json, print_pretty, summary},
    parser::read_facts,
    pipeline::score_locality,
    plan::query_plan,
    scoring::{CompositeScorer, ProfileName, ScoringProfile},
    tier::{CityTier, classify_tier},
};
use std::ffi::OsStr;
use std::path::Path;
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "livability")]
#[command(about = "Scores the livability of French communes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a commune into a city tier
    Classify {
        #[arg(long)]
        population: u64,

        /// Inhabitants per km²
        #[arg(long)]
        density: f64,
    },
    /// Print the amenity query plan of a tier as JSON
    Plan {
        /// Tier name, e.g. "Metropolis" or "smalltown"
        #[arg(long)]
        tier: CityTier,
    },
    /// Score a locality facts document
    Score {
        /// Path to a JSON facts document
        #[arg(value_name = "FACTS_JSON")]
        facts: String,

        /// Built-in calibration profile
        #[arg(short, long, default_value = "excellence", conflicts_with = "profile_file")]
        profile: ProfileName,

        /// JSON calibration profile to use instead of a built-in one
        #[arg(long)]
        profile_file: Option<String>,

        /// CSV file to append the scores to
        #[arg(long)]
        history: Option<String>,

        /// Print the full report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// List built-in calibration profiles
    Profiles,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/livability.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("livability.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("RUST_LOG")
                .from_env_lossy(),
        );

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .with_env_var("RUST_LOG_JSON")
                .from_env_lossy(),
        );

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            population,
            density,
        } => {
            let tier = classify_tier(Some(population), Some(density))?;
            println!("{tier}");
        }
        Commands::Plan { tier } => {
            println!("{}", serde_json::to_string_pretty(query_plan(tier))?);
        }
        Commands::Score {
            facts,
            profile,
            profile_file,
            history,
            json,
        } => {
            let profile = match profile_file {
                Some(path) => ScoringProfile::load(&path)?,
                None => ScoringProfile::builtin(profile)?,
            };
            let scorer = CompositeScorer::new(profile)?;

            let facts = read_facts(&facts)?;
            let report = score_locality(&facts, &scorer)
                .with_context(|| format!("failed to score '{}'", facts.commune.name.as_deref().unwrap_or("unknown")))?;

            print_pretty(&report);
            if json {
                println!("{}", print_json(&report)?);
            } else {
                println!("{}", summary(&report));
            }

            if let Some(path) = history {
                append_record(&path, &ScoreRecord::from_report(&report, Utc::now()))?;
            }
        }
        Commands::Profiles => {
            for name in ProfileName::ALL {
                let profile = ScoringProfile::builtin(name)?;
                let w = profile.weights;
                info!(profile = %name, version = profile.version, "Built-in profile");
                println!(
                    "{name:<12} v{}  work {:.2}  transport {:.2}  public services {:.2}  education {:.2}  commerce {:.2}  health {:.2}  composite bonus {}",
                    profile.version,
                    w.work,
                    w.transport,
                    w.public_services,
                    w.education,
                    w.commerce,
                    w.health,
                    if profile.composite_bonus.is_some() { "yes" } else { "no" },
                );
            }
        }
    }

    Ok(())
}
