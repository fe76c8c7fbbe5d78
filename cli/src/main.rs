//! UVV compliance tracker CLI
//!
//! Tracks machines under periodic (UVV) inspection, shows their compliance
//! status and the shared change log. Every command authenticates against the
//! credential table in the config file.
//!
//! Usage:
//!   uvv --user Felix --password ... login
//!   uvv --user Felix --password ... list --status red
//!   uvv --user Felix --password ... add --equipment-number fg-100 --department Yard --inspection 2024-05
//!   uvv --user Felix --password ... edit FG-100 --inspection 06/2025
//!   uvv --user Felix --password ... changes --all

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use uvv_audit::{describe_change, StoreChangeWriter};
use uvv_config::TrackerConfig;
use uvv_contracts::{
    error::{UvvError, UvvResult},
    machine::{MachineDraft, StoredMachine},
    options::OptionField,
    status::ComplianceStatus,
};
use uvv_core::{
    filter::MachineFilter,
    notice::LoginNotice,
    relevance::select_relevant_changes_within,
    status::{format_for_display, record_status},
    Tracker,
};
use uvv_store::JsonFileStore;

// ── CLI definition ────────────────────────────────────────────────────────────

/// UVV: machinery inspection compliance tracker.
#[derive(Parser)]
#[command(
    name = "uvv",
    about = "Machinery inspection compliance tracker",
    long_about = "Tracks machines under periodic inspection, derives their compliance\n\
                  status (green / yellow / red) and keeps a shared change log."
)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, global = true, default_value = "uvv.toml")]
    config: PathBuf,

    /// User to sign in as.
    #[arg(long, global = true, default_value = "")]
    user: String,

    /// Password for `--user`.
    #[arg(long, global = true, default_value = "")]
    password: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in, then show machines needing attention and recent changes.
    Login,
    /// List machines, optionally filtered.
    List(FilterArgs),
    /// Create a machine.
    Add(MachineArgs),
    /// Edit a machine. Pass an empty string to clear an optional field.
    Edit {
        /// Store id of the machine (see `list`).
        id: String,
        #[command(flatten)]
        fields: MachineArgs,
    },
    /// Delete a machine.
    Delete {
        /// Store id of the machine (see `list`).
        id: String,
    },
    /// Add a value to the manufacturer or department list.
    AddOption {
        #[arg(value_enum)]
        field: OptionArg,
        value: String,
    },
    /// Show change log entries. Defaults to changes since the last login or
    /// within the look-back window, whichever reaches further back.
    Changes {
        /// Show the whole log.
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    equipment_number: Option<String>,
    #[arg(long)]
    manufacturer: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    service_type: Option<String>,
    #[arg(long)]
    operating_hours: Option<String>,
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Args)]
struct MachineArgs {
    #[arg(long)]
    equipment_number: Option<String>,
    #[arg(long)]
    manufacturer: Option<String>,
    #[arg(long)]
    model: Option<String>,
    #[arg(long)]
    department: Option<String>,
    #[arg(long)]
    service_type: Option<String>,
    #[arg(long)]
    operating_hours: Option<String>,
    /// Month of the last inspection, `YYYY-MM` or `MM/YYYY`.
    #[arg(long)]
    inspection: Option<String>,
    #[arg(long)]
    comment: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    Green,
    Yellow,
    Red,
}

impl From<StatusArg> for ComplianceStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Green => ComplianceStatus::Green,
            StatusArg::Yellow => ComplianceStatus::Yellow,
            StatusArg::Red => ComplianceStatus::Red,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OptionArg {
    Manufacturer,
    Department,
}

impl From<OptionArg> for OptionField {
    fn from(arg: OptionArg) -> Self {
        match arg {
            OptionArg::Manufacturer => OptionField::Manufacturer,
            OptionArg::Department => OptionField::Department,
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("uvv error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> UvvResult<()> {
    let mut tracker = open_session(&cli.config, &cli.user, &cli.password)?;
    let now = Utc::now();
    debug!(user = %cli.user, config = %cli.config.display(), "session opened");

    match cli.command {
        Command::Login => login(&mut tracker, now),
        Command::List(args) => {
            tracker.load()?;
            list(&tracker, &args.into_filter(), now)
        }
        Command::Add(fields) => {
            tracker.load()?;
            let draft = fields.apply_to(MachineDraft::default())?;
            let outcome = tracker.save(&draft, None, now)?;
            println!("{} {} (status: {})", outcome.id, outcome.change.as_str(), outcome.status);
            Ok(())
        }
        Command::Edit { id, fields } => {
            tracker.load()?;
            let current = tracker
                .machine(&id)
                .ok_or_else(|| UvvError::UnknownMachine { id: id.clone() })?;
            let draft = fields.apply_to(MachineDraft::from_record(&current.record))?;
            let outcome = tracker.save(&draft, Some(&id), now)?;
            println!("{} {} (status: {})", outcome.id, outcome.change.as_str(), outcome.status);
            Ok(())
        }
        Command::Delete { id } => {
            tracker.load()?;
            tracker.delete(&id, now)?;
            println!("{} deleted", id);
            Ok(())
        }
        Command::AddOption { field, value } => {
            tracker.load()?;
            let field = OptionField::from(field);
            if tracker.add_option(field, &value)? {
                println!("added '{}' to {}", value.trim(), field);
            } else {
                println!("'{}' not added to {}: empty or already listed", value.trim(), field);
            }
            Ok(())
        }
        Command::Changes { all } => {
            tracker.load()?;
            changes(&tracker, all, now)
        }
    }
}

/// Authenticate against the config and wire a tracker to the data file.
fn open_session(config_path: &Path, user: &str, password: &str) -> UvvResult<Tracker> {
    let config = TrackerConfig::from_file(config_path)?;
    config.authenticate(user, password)?;

    let store = Arc::new(JsonFileStore::open(&config.data_file)?);
    let changes = StoreChangeWriter::new(Box::new(store.clone()));

    Ok(Tracker::new(Box::new(store), Box::new(changes), user)
        .with_lookback(config.lookback()?))
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn login(tracker: &mut Tracker, now: DateTime<Utc>) -> UvvResult<()> {
    let previous = tracker.sign_in(now)?;
    tracker.load()?;

    println!("Signed in as {}.", tracker.user());
    match previous {
        Some(at) => println!("Last login: {}", at.format("%Y-%m-%d %H:%M UTC")),
        None => println!("First login."),
    }
    println!();

    let notice = tracker.login_notice(previous, now)?;
    print_notice(&notice, tracker.user());
    Ok(())
}

fn list(tracker: &Tracker, filter: &MachineFilter, now: DateTime<Utc>) -> UvvResult<()> {
    let today = now.date_naive();
    let machines = tracker.filter(filter, today);
    if machines.is_empty() {
        println!("No machines.");
        return Ok(());
    }

    println!(
        "{:<14} {:<14} {:<12} {:<14} {:<12} {:>8}  {:<10} {:<7} {}",
        "ID", "MANUFACTURER", "MODEL", "DEPARTMENT", "SERVICE", "HOURS", "INSPECTED", "STATUS", "COMMENT"
    );
    for machine in machines {
        print_row(machine, record_status(&machine.record, today));
    }
    Ok(())
}

fn changes(tracker: &Tracker, all: bool, now: DateTime<Utc>) -> UvvResult<()> {
    let events = tracker.load_changes()?;
    let lines: Vec<String> = if all {
        let mut sorted: Vec<_> = events.iter().collect();
        sorted.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        sorted
            .into_iter()
            .map(|e| describe_change(e, tracker.user()))
            .collect()
    } else {
        let last_login = tracker.last_login()?;
        select_relevant_changes_within(&events, last_login, now, tracker.lookback())
            .into_iter()
            .map(|e| describe_change(e, tracker.user()))
            .collect()
    };

    if lines.is_empty() {
        println!("No changes.");
    }
    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

// ── Output ────────────────────────────────────────────────────────────────────

fn print_notice(notice: &LoginNotice, user: &str) {
    if notice.is_empty() {
        println!("All machines are compliant and nothing changed recently.");
        return;
    }

    if !notice.attention.is_empty() {
        println!("Needs attention:");
        for item in &notice.attention {
            let machine = &item.machine;
            print!(
                "  [{:<6}] {:<14} {:<14} last inspection {}",
                item.status.as_str(),
                machine.record.equipment_number,
                machine.record.department,
                format_for_display(machine.record.inspection_due.as_deref())
            );
            match &item.recent_transition {
                Some(event) => println!("  (changed by {})", event.user),
                None => println!(),
            }
        }
        println!();
    }

    if !notice.changes.is_empty() {
        println!("Recent changes:");
        for event in &notice.changes {
            println!("  {}", describe_change(event, user));
        }
    }
}

fn print_row(machine: &StoredMachine, status: ComplianceStatus) {
    let r = &machine.record;
    let hours = r.operating_hours.map(|h| h.to_string()).unwrap_or_default();
    println!(
        "{:<14} {:<14} {:<12} {:<14} {:<12} {:>8}  {:<10} {:<7} {}",
        machine.id,
        r.manufacturer.as_deref().unwrap_or(""),
        r.model.as_deref().unwrap_or(""),
        r.department,
        r.service_type.as_deref().unwrap_or(""),
        hours,
        format_for_display(r.inspection_due.as_deref()),
        status.as_str(),
        r.comment.as_deref().unwrap_or("")
    );
}

// ── Argument conversion ───────────────────────────────────────────────────────

impl FilterArgs {
    fn into_filter(self) -> MachineFilter {
        MachineFilter {
            equipment_number: self.equipment_number,
            manufacturer: self.manufacturer,
            model: self.model,
            department: self.department,
            service_type: self.service_type,
            operating_hours: self.operating_hours,
            status: self.status.map(ComplianceStatus::from),
            comment: self.comment,
        }
    }
}

impl MachineArgs {
    /// Overlay the given flags on `draft`. An empty string clears an optional
    /// field.
    fn apply_to(self, mut draft: MachineDraft) -> UvvResult<MachineDraft> {
        if let Some(v) = self.equipment_number {
            draft.equipment_number = v;
        }
        if let Some(v) = self.department {
            draft.department = v;
        }
        if let Some(v) = self.manufacturer {
            draft.manufacturer = Some(v);
        }
        if let Some(v) = self.model {
            draft.model = Some(v);
        }
        if let Some(v) = self.service_type {
            draft.service_type = Some(v);
        }
        if let Some(v) = self.inspection {
            draft.inspection_due = Some(v);
        }
        if let Some(v) = self.comment {
            draft.comment = Some(v);
        }
        if let Some(v) = self.operating_hours {
            draft.operating_hours = parse_hours(&v)?;
        }
        Ok(draft)
    }
}

fn parse_hours(raw: &str) -> UvvResult<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.replace(',', ".")
        .parse::<f64>()
        .map(Some)
        .map_err(|_| UvvError::Validation {
            reason: format!("operating hours '{}' is not a number", raw),
        })
}
