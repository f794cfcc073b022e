//! `timecode` CLI — compile, normalize and reconcile time codes from the command line.
//!
//! ## Usage
//!
//! ```sh
//! # Compile an inclusion and an exclusion code to JSON
//! timecode compile --include "2023/7/10-2023/7/12 21:00-22:00 America/Los_Angeles" \
//!     --exclude "2023/7/11 21:00-22:00 America/Los_Angeles"
//!
//! # Print the canonical form of a code
//! timecode canonical "tdy 9.30-10.30 PST weekly"
//!
//! # Diff persisted rows (JSON array) against an edited code
//! timecode reconcile -i rows.json --include "2023/7/10-2023/7/13 9-10 UTC"
//! ```
//!
//! Settings come from `timecode.toml` (or `--config`), then `TIMECODE_*`
//! environment variables, then the `--tz`/`--wkst`/`--now` flags.

mod config;

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use timecode_engine::reconcile::OccurrenceRow;
use timecode_engine::settings::parse_weekday_code;
use timecode_engine::zones::resolve_zone;
use timecode_engine::{
    compile_code, parse_time_codes, reconcile, AbbreviationTable, CompileContext, Settings,
};
use tracing_subscriber::EnvFilter;

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "timecode", version, about = "Time-code compiler CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./timecode.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Current time as RFC 3339 (defaults to the system clock)
    #[arg(long, global = true)]
    now: Option<String>,

    /// Default zone for lines without one (IANA name or abbreviation)
    #[arg(long, global = true)]
    tz: Option<String>,

    /// First day of the week: MO, TU, WE, TH, FR, SA or SU
    #[arg(long, global = true)]
    wkst: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile inclusion and exclusion codes and print the result as JSON
    Compile {
        /// Inclusion code
        #[arg(long, default_value = "")]
        include: String,
        /// Exclusion code
        #[arg(long, default_value = "")]
        exclude: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Print the canonical form of a code
    Canonical {
        /// The code to normalize
        code: String,
    },
    /// Reconcile persisted rows against a code and print the plan as JSON
    Reconcile {
        /// Rows as a JSON array (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<String>,
        /// Inclusion code
        #[arg(long, default_value = "")]
        include: String,
        /// Exclusion code
        #[arg(long, default_value = "")]
        exclude: String,
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load(cli.config.as_deref())?;
    init_tracing(&config.log_level);

    let settings = apply_overrides(config.settings, cli.tz.as_deref(), cli.wkst.as_deref())?;
    let now = match cli.now.as_deref() {
        Some(now) => DateTime::parse_from_rfc3339(now)
            .with_context(|| format!("Invalid --now timestamp: {}", now))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };
    let ctx = CompileContext::new(now, &settings);
    tracing::debug!(?settings, %now, "resolved compile context");

    match cli.command {
        Commands::Compile {
            include,
            exclude,
            output,
        } => {
            let result = parse_time_codes(&include, &exclude, &ctx)
                .context("Failed to compile time codes")?;
            let json = serde_json::to_string_pretty(&result)?;
            write_output(output.as_deref(), &json)?;
        }
        Commands::Canonical { code } => {
            let compiled = compile_code(&code, &ctx).context("Failed to compile time code")?;
            println!("{}", compiled.canonical);
        }
        Commands::Reconcile {
            input,
            include,
            exclude,
            output,
        } => {
            let rows_json = read_input(input.as_deref())?;
            let rows: Vec<OccurrenceRow> =
                serde_json::from_str(&rows_json).context("Failed to parse occurrence rows")?;
            let result = parse_time_codes(&include, &exclude, &ctx)
                .context("Failed to compile time codes")?;
            let plan = reconcile(&rows, &result);
            let json = serde_json::to_string_pretty(&plan)?;
            write_output(output.as_deref(), &json)?;
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn apply_overrides(mut settings: Settings, tz: Option<&str>, wkst: Option<&str>) -> Result<Settings> {
    if let Some(tz) = tz {
        settings.time_zone = resolve_zone(tz, AbbreviationTable::global())
            .with_context(|| format!("Invalid --tz: {}", tz))?;
    }
    if let Some(wkst) = wkst {
        settings.week_start = parse_weekday_code(wkst).with_context(|| {
            format!("Invalid --wkst: '{}'. Expected one of MO, TU, WE, TH, FR, SA, SU", wkst)
        })?;
    }
    Ok(settings)
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}

fn write_output(path: Option<&str>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write file: {}", path))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
