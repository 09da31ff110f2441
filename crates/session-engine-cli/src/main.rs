//! `sessions` CLI — check and book clinic sessions against an exported agenda.
//!
//! The agenda is a JSON array of session rows using the sheet's column
//! headers (`SessaoID`, `PacienteID`, `Data`, `HoraInicio`, `HoraFim`, ...).
//!
//! ## Usage
//!
//! ```sh
//! # Is Tuesday 14/01/2025 15:00-15:50 free for patient P-7?
//! sessions check --existing agenda.json --patient P-7 --date 14/01/2025 \
//!     --start 15:00 --end 15:50
//!
//! # Book Tuesdays and Thursdays for 12 weeks, writing the updated agenda
//! sessions recur --existing agenda.json --patient P-7 --from 06/01/2025 \
//!     --weekdays tue,thu --start 15:00 --end 15:50 --weeks 12 -o agenda.new.json
//!
//! # Read the agenda from stdin, with debug logging on stderr
//! cat agenda.json | RUST_LOG=debug sessions check --existing - ...
//! ```

use anyhow::{Context, Result};
use chrono::{Local, Weekday};
use clap::{Parser, Subcommand};
use std::io::{self, Read};
use std::process;

use session_engine::ids::{assign_ids, SessionIdGenerator};
use session_engine::parse::{parse_date, parse_time};
use session_engine::{
    check_single, generate_recurring_with_config, load_bookings, weekday_from_index,
    BookingInterval, BookingStatus, RecurrenceRequest, ResolverConfig, SessionDetails, SessionRow,
};

/// Exit status when the proposed slot is taken.
const EXIT_CONFLICT: i32 = 2;

#[derive(Parser)]
#[command(
    name = "sessions",
    version,
    about = "Clinic session conflict checking and recurring booking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether a single session slot is free
    Check {
        /// Agenda JSON file ("-" reads from stdin)
        #[arg(short, long)]
        existing: String,
        /// Patient id the session is for
        #[arg(short, long)]
        patient: String,
        /// Session date (DD/MM/YYYY, YYYY-MM-DD or DD-MM-YYYY)
        #[arg(short, long)]
        date: String,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM); omit for a point booking
        #[arg(long)]
        end: Option<String>,
    },
    /// Generate a weekly series, skipping conflicting slots
    Recur {
        /// Agenda JSON file ("-" reads from stdin)
        #[arg(short, long)]
        existing: String,
        /// Patient id the sessions are for
        #[arg(short, long)]
        patient: String,
        /// Any date in the first week of the series
        #[arg(long)]
        from: String,
        /// Comma-separated weekdays: names (mon,thu) or indices (0=Monday)
        #[arg(short, long)]
        weekdays: String,
        /// Start time (HH:MM)
        #[arg(long)]
        start: String,
        /// End time (HH:MM); omit for point bookings
        #[arg(long)]
        end: Option<String>,
        /// Number of weeks to generate
        #[arg(long)]
        weeks: u32,
        /// Status for the new sessions (default: scheduled)
        #[arg(long)]
        status: Option<String>,
        /// Professional attending the sessions
        #[arg(long)]
        professional: Option<String>,
        /// Session kind (e.g. therapy, evaluation)
        #[arg(long)]
        kind: Option<String>,
        /// Resolver configuration TOML file
        #[arg(long)]
        config: Option<String>,
        /// Write the agenda plus accepted sessions (with ids) to this file
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check {
            existing,
            patient,
            date,
            start,
            end,
        } => {
            let (_, bookings) = read_agenda(&existing)?;

            let date = parse_date(&date).context("Invalid --date")?;
            let start = parse_time(&start).context("Invalid --start")?;
            let end = end
                .as_deref()
                .map(parse_time)
                .transpose()
                .context("Invalid --end")?;
            let proposed = BookingInterval::new(patient.trim(), date, start, end)?;

            let result = check_single(&bookings, &proposed);
            println!("{}", serde_json::to_string_pretty(&result)?);

            if !result.ok {
                process::exit(EXIT_CONFLICT);
            }
        }
        Commands::Recur {
            existing,
            patient,
            from,
            weekdays,
            start,
            end,
            weeks,
            status,
            professional,
            kind,
            config,
            output,
        } => {
            let (rows, bookings) = read_agenda(&existing)?;

            let config = match config {
                Some(path) => ResolverConfig::load(&path)
                    .with_context(|| format!("Failed to load config: {}", path))?,
                None => ResolverConfig::default(),
            };

            let start_date = parse_date(&from).context("Invalid --from")?;
            let start = parse_time(&start).context("Invalid --start")?;
            let end = end
                .as_deref()
                .map(parse_time)
                .transpose()
                .context("Invalid --end")?;
            let weekdays = parse_weekdays(&weekdays)?;

            let details = SessionDetails {
                professional: professional.unwrap_or_default(),
                kind: kind.unwrap_or_default(),
                ..SessionDetails::default()
            };
            let status = status
                .as_deref()
                .map(BookingStatus::from_label)
                .unwrap_or_default();
            let request =
                RecurrenceRequest::new(patient.trim(), start_date, weekdays, start, end, weeks)
                    .with_status(status)
                    .with_details(details);

            let mut result = generate_recurring_with_config(&bookings, &request, &config)?;

            if let Some(path) = output {
                let mut generator = SessionIdGenerator::default();
                assign_ids(&mut result.accepted, &mut generator, Local::now().naive_local());

                let mut out_rows = rows;
                out_rows.extend(result.accepted.iter().map(SessionRow::from_booking));
                let json = serde_json::to_string_pretty(&out_rows)?;
                std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write file: {}", path))?;
            }

            println!("{}", serde_json::to_string_pretty(&result)?);
            eprintln!("{}", result.summary());
            for skipped in &result.skipped {
                eprintln!(
                    "  skipped {}: {} conflicting session(s)",
                    session_engine::parse::format_date(skipped.date),
                    skipped.conflicts.len()
                );
            }
        }
    }

    Ok(())
}

/// Parse `--weekdays`: comma-separated names (`mon`, `Tuesday`) or indices
/// (0 = Monday).
fn parse_weekdays(raw: &str) -> Result<Vec<Weekday>> {
    let mut days = Vec::new();

    for part in raw.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let day = match trimmed.parse::<u8>() {
            Ok(index) => weekday_from_index(index)?,
            Err(_) => trimmed
                .parse::<Weekday>()
                .map_err(|_| anyhow::anyhow!("Unknown weekday: '{}'", trimmed))?,
        };
        days.push(day);
    }

    Ok(days)
}

/// Read the agenda and convert its rows, keeping the raw rows for rewriting.
fn read_agenda(path: &str) -> Result<(Vec<SessionRow>, Vec<BookingInterval>)> {
    let json = read_input(path)?;
    let rows: Vec<SessionRow> =
        serde_json::from_str(&json).with_context(|| format!("Invalid agenda JSON: {}", path))?;

    let (bookings, errors) = load_bookings(rows.clone());
    if !errors.is_empty() {
        log::warn!(
            "{} of {} agenda rows could not be read and were ignored",
            errors.len(),
            rows.len()
        );
    }

    Ok((rows, bookings))
}

fn read_input(path: &str) -> Result<String> {
    match path {
        "-" => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
        path => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
    }
}
