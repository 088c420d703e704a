mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use calgrid_core::config::AppConfig;
use chrono::NaiveDate;
use chrono_tz::Tz;
use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "calgrid")]
#[command(version, about = "Fetch calgrid calendars and events and preview the time-grid layout")]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (-q warnings only, -qq errors only)
    #[arg(short = 'q', long = "quiet", action = ArgAction::Count, global = true)]
    quiet: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List events from the API, grouped by day
    Events {
        /// Only show events starting on this date (YYYY-MM-DD)
        #[arg(long)]
        day: Option<String>,

        /// Time zone for display (defaults to the system zone)
        #[arg(long)]
        tz: Option<String>,
    },
    /// List calendars in display order
    Calendars,
    /// Lay out events from a local JSON file and print their rectangles
    Layout {
        /// JSON array of event payloads, as returned by GET /events
        #[arg(short, long)]
        file: PathBuf,

        /// Day to lay out (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        day: Option<String>,

        /// Lay out the whole week containing --day
        #[arg(long)]
        week: bool,

        /// Pixels per minute
        #[arg(long, default_value_t = 1.0)]
        height: f64,

        /// Pixels per day column
        #[arg(long, default_value_t = 200.0)]
        width: f64,

        /// Time zone the day boundaries are taken in
        #[arg(long)]
        tz: Option<String>,

        /// Print the position map as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet)?;

    match cli.command {
        Commands::Events { day, tz } => {
            let config = AppConfig::load()?;
            let tz = resolve_tz(tz.as_deref())?;
            let day = day.as_deref().map(parse_day).transpose()?;
            commands::events::run(&config, tz, day).await
        }
        Commands::Calendars => {
            let config = AppConfig::load()?;
            commands::calendars::run(&config).await
        }
        Commands::Layout {
            file,
            day,
            week,
            height,
            width,
            tz,
            json,
        } => {
            let tz = resolve_tz(tz.as_deref())?;
            let day = day.as_deref().map(parse_day).transpose()?;
            commands::layout::run(commands::layout::LayoutArgs {
                file,
                day,
                week,
                height,
                width,
                tz,
                json,
            })
        }
    }
}

fn init_tracing(verbose: u8, quiet: u8) -> Result<()> {
    let default_level = if quiet >= 2 {
        "error"
    } else if quiet == 1 {
        "warn"
    } else if verbose >= 3 {
        "trace"
    } else if verbose == 2 {
        "debug"
    } else if verbose == 1 {
        "info"
    } else {
        "warn"
    };

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .map_err(|e| anyhow!("invalid RUST_LOG / log filter: {e}"))?;

    let init_result = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();

    if let Err(err) = init_result {
        debug!(error = %err, "tracing subscriber already set, continuing");
    }

    Ok(())
}

fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{value}', expected YYYY-MM-DD"))
}

/// The named zone, or the system zone, falling back to UTC.
fn resolve_tz(name: Option<&str>) -> Result<Tz> {
    if let Some(name) = name {
        return name
            .parse::<Tz>()
            .map_err(|e| anyhow!("Unknown time zone '{name}': {e}"));
    }

    match iana_time_zone::get_timezone() {
        Ok(system) => Ok(system.parse::<Tz>().unwrap_or_else(|_| {
            debug!(zone = %system, "system zone not in tz database, using UTC");
            Tz::UTC
        })),
        Err(e) => {
            debug!(error = %e, "could not determine system zone, using UTC");
            Ok(Tz::UTC)
        }
    }
}
