//! `slots` CLI — query slot availability, conflicts, and recurrence previews
//! from a JSON snapshot of schedules and bookings.
//!
//! ## Usage
//!
//! ```sh
//! # Candidate slots for a practitioner on a date
//! slots avail -s clinic.json -r dr-rao -d 2024-06-03
//!
//! # Bookings colliding with an ad-hoc window
//! slots conflicts -s clinic.json -r dr-rao -d 2024-06-03 --from 09:00 --to 10:00
//!
//! # Preview a repeat rule (green/red dates in the dialog)
//! slots expand -s clinic.json -r dr-rao --start 2024-06-03 --freq weekly \
//!     --weekdays monday,wednesday --count 4 --from 09:00 --to 09:30
//!
//! # Mark time unavailable, writing the updated snapshot back out
//! slots block -s clinic.json -r dr-rao -d 2024-06-03 --from 10:00 --to 12:00 \
//!     --reason "ward rounds" -o updated.json
//! ```
//!
//! All commands accept `--now` to pin "now" for reproducible output; it
//! defaults to the local wall clock.

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime, Weekday};
use clap::{Parser, Subcommand, ValueEnum};
use slot_engine::timeutil::parse_time;
use slot_engine::types::WeekdaySet;
use slot_engine::{EndCondition, Engine, Frequency, RecurrenceRule, Snapshot};

#[derive(Parser)]
#[command(name = "slots", version, about = "Slot availability and recurrence queries")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show candidate slots for a resource on a date
    Avail {
        /// Snapshot file with schedules and bookings
        #[arg(short, long)]
        snapshot: String,
        /// Practitioner or service unit name
        #[arg(short, long)]
        resource: String,
        /// Target date (YYYY-MM-DD)
        #[arg(short, long)]
        date: NaiveDate,
        /// Pin "now" (YYYY-MM-DDTHH:MM:SS) instead of the local clock
        #[arg(long)]
        now: Option<String>,
    },
    /// List bookings colliding with a time window
    Conflicts {
        #[arg(short, long)]
        snapshot: String,
        #[arg(short, long)]
        resource: String,
        #[arg(short, long)]
        date: NaiveDate,
        /// Window start (HH:MM or HH:MM:SS)
        #[arg(long)]
        from: String,
        /// Window end (HH:MM or HH:MM:SS)
        #[arg(long)]
        to: String,
    },
    /// Expand a repeat rule into occurrence dates with conflict flags
    Expand {
        #[arg(short, long)]
        snapshot: String,
        #[arg(short, long)]
        resource: String,
        /// First date of the series (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,
        #[arg(long, value_enum)]
        freq: FreqArg,
        /// Repeat every N frequency units (ignored for daily)
        #[arg(long, default_value_t = 1)]
        interval: u32,
        /// Comma-separated weekday names, required for weekly rules
        #[arg(long)]
        weekdays: Option<String>,
        /// Last date of the series (mutually exclusive with --count)
        #[arg(long)]
        until: Option<NaiveDate>,
        /// Maximum number of occurrences (mutually exclusive with --until)
        #[arg(long)]
        count: Option<u32>,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        #[arg(long)]
        now: Option<String>,
    },
    /// Mark a window unavailable (refused if any booking collides)
    Block {
        #[arg(short, long)]
        snapshot: String,
        #[arg(short, long)]
        resource: String,
        #[arg(short, long)]
        date: NaiveDate,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
        /// Free-text reason stored on the block
        #[arg(long)]
        reason: Option<String>,
        /// Write the updated snapshot here (input file is never touched)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FreqArg {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl From<FreqArg> for Frequency {
    fn from(arg: FreqArg) -> Self {
        match arg {
            FreqArg::Daily => Frequency::Daily,
            FreqArg::Weekly => Frequency::Weekly,
            FreqArg::Monthly => Frequency::Monthly,
            FreqArg::Yearly => Frequency::Yearly,
        }
    }
}

fn load_snapshot(path: &str) -> Result<Snapshot> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading snapshot {path}"))?;
    Snapshot::from_json(&text).with_context(|| format!("parsing snapshot {path}"))
}

fn resolve_now(now: Option<&str>) -> Result<NaiveDateTime> {
    match now {
        Some(text) => text
            .parse()
            .map_err(|_| anyhow!("invalid --now value: {text} (expected YYYY-MM-DDTHH:MM:SS)")),
        None => Ok(Local::now().naive_local()),
    }
}

fn parse_weekdays(text: Option<&str>) -> Result<WeekdaySet> {
    let mut set = WeekdaySet::EMPTY;
    let Some(text) = text else {
        return Ok(set);
    };
    for name in text.split(',') {
        let day: Weekday = name
            .trim()
            .parse()
            .map_err(|_| anyhow!("unknown weekday: {name}"))?;
        set.insert(day);
    }
    Ok(set)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Avail {
            snapshot,
            resource,
            date,
            now,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let engine = Engine::new(snapshot.clone(), snapshot);
            let slots = engine.available_slots(&resource, date, resolve_now(now.as_deref())?)?;
            println!("{}", serde_json::to_string_pretty(&slots)?);
        }
        Commands::Conflicts {
            snapshot,
            resource,
            date,
            from,
            to,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let engine = Engine::new(snapshot.clone(), snapshot);
            let hits =
                engine.check_conflicts(&resource, date, parse_time(&from)?, parse_time(&to)?)?;
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        Commands::Expand {
            snapshot,
            resource,
            start,
            freq,
            interval,
            weekdays,
            until,
            count,
            from,
            to,
            now,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let engine = Engine::new(snapshot.clone(), snapshot);
            let rule = RecurrenceRule {
                frequency: freq.into(),
                interval,
                weekdays: parse_weekdays(weekdays.as_deref())?,
                start_date: start,
                from_time: parse_time(&from)?,
                to_time: parse_time(&to)?,
                end: EndCondition::from_options(until, count)?,
            };
            let occurrences =
                engine.expand_recurrence(&resource, &rule, resolve_now(now.as_deref())?)?;
            println!("{}", serde_json::to_string_pretty(&occurrences)?);
        }
        Commands::Block {
            snapshot,
            resource,
            date,
            from,
            to,
            reason,
            output,
        } => {
            let snapshot = load_snapshot(&snapshot)?;
            let mut engine = Engine::new(snapshot.clone(), snapshot);
            let block = engine.create_unavailability(
                &resource,
                date,
                parse_time(&from)?,
                parse_time(&to)?,
                reason,
            )?;
            println!("{}", serde_json::to_string_pretty(&block)?);
            if let Some(path) = output {
                std::fs::write(&path, engine.store().to_json()?)
                    .with_context(|| format!("writing snapshot {path}"))?;
            }
        }
    }

    Ok(())
}
