//! `fleetctl` - CLI for fleetstate
//!
//! This binary provides the command-line interface for recording aircraft
//! state, scheduling maintenance and reading the fleet's audit history.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde::Serialize;

use fleetstate::cli::{AircraftCommand, Cli, Command, ConfigCommand, MaintenanceCommand};
use fleetstate::{
    init_logging, Aircraft, AircraftStatus, Config, Fleet, HistorySnapshot, MaintenanceWindow,
    NewAircraft, ScheduleRequest,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone()).context("failed to load configuration")?;
    let output = Output { json: cli.json };

    match cli.command {
        Command::Aircraft(cmd) => handle_aircraft(&open(&config)?, output, cmd),
        Command::Maintenance(cmd) => handle_maintenance(&open(&config)?, output, cmd),
        Command::Dashboard => handle_dashboard(&open(&config)?, &config, output),
        Command::Config(cmd) => handle_config(&config, output, cmd),
    }
}

fn open(config: &Config) -> Result<Fleet> {
    Fleet::open(config).with_context(|| {
        format!(
            "failed to open fleet database at {}",
            config.database_path().display()
        )
    })
}

#[derive(Debug, Clone, Copy)]
struct Output {
    json: bool,
}

impl Output {
    /// Print `value` as JSON, or run `plain` for human-readable output.
    fn emit<T: Serialize>(self, value: &T, plain: impl FnOnce(&T)) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            plain(value);
        }
        Ok(())
    }
}

fn handle_aircraft(fleet: &Fleet, output: Output, cmd: AircraftCommand) -> Result<()> {
    let registry = fleet.registry();
    match cmd {
        AircraftCommand::Add(args) => {
            let aircraft = registry.create(NewAircraft::from(args))?;
            output.emit(&aircraft, print_aircraft)
        }
        AircraftCommand::Update(args) => {
            let aircraft = registry.apply_update(args.id, &args.to_update())?;
            output.emit(&aircraft, print_aircraft)
        }
        AircraftCommand::Show { aircraft } => {
            let aircraft = match aircraft.parse::<i64>() {
                Ok(id) => registry.get(id)?,
                Err(_) => registry.get_by_registration(&aircraft)?,
            };
            output.emit(&aircraft, print_aircraft)
        }
        AircraftCommand::List { status } => {
            let list = fleet
                .query()
                .list_filtered(status.map(AircraftStatus::from))?;
            output.emit(&list, |list| print_aircraft_table(list))
        }
        AircraftCommand::History { id } => {
            let aircraft = registry.get(id)?;
            let history = fleet.ledger().list_for(id)?;
            output.emit(&history, |history| {
                println!("History of {}", aircraft.registration);
                print_history(history);
            })
        }
        AircraftCommand::Remove { id, purge } => {
            if purge {
                let report = fleet.retirement().retire(id)?;
                output.emit(&report, |report| {
                    println!(
                        "Removed aircraft {id} with {} maintenance window(s) and {} history snapshot(s).",
                        report.windows, report.snapshots
                    );
                })
            } else {
                match registry.delete(id) {
                    Err(err) if err.is_conflict() => {
                        bail!("{err}; use --purge to remove them together with the aircraft")
                    }
                    result => result?,
                }
                output.emit(&serde_json::json!({ "removed": id }), |_| {
                    println!("Removed aircraft {id}.");
                })
            }
        }
    }
}

fn handle_maintenance(fleet: &Fleet, output: Output, cmd: MaintenanceCommand) -> Result<()> {
    let scheduler = fleet.scheduler();
    match cmd {
        MaintenanceCommand::Schedule {
            aircraft_id,
            date,
            duration,
        } => {
            let request = ScheduleRequest::parse(aircraft_id, &date, duration.as_deref())?;
            let window = scheduler.submit(&request)?;
            output.emit(&window, |window| print_windows(std::slice::from_ref(window)))
        }
        MaintenanceCommand::Upcoming { limit } => {
            let windows = scheduler.list_upcoming(limit)?;
            output.emit(&windows, |windows| print_windows(windows))
        }
        MaintenanceCommand::Windows { aircraft_id } => {
            let windows = scheduler.windows_for(aircraft_id)?;
            output.emit(&windows, |windows| print_windows(windows))
        }
        MaintenanceCommand::Advance { window_id } => {
            let window = scheduler.advance(window_id)?;
            output.emit(&window, |window| print_windows(std::slice::from_ref(window)))
        }
    }
}

fn handle_dashboard(fleet: &Fleet, config: &Config, output: Output) -> Result<()> {
    let summary = fleet.query().dashboard(&config.dashboard)?;
    output.emit(&summary, |summary| {
        println!("Fleet overview");
        println!("--------------");
        println!("Aircraft:        {}", summary.total);
        println!("Flying:          {}", summary.flying);
        println!("In maintenance:  {}", summary.in_maintenance);
        println!();
        println!("Upcoming maintenance");
        print_windows(&summary.upcoming);
        println!();
        println!("In maintenance");
        print_aircraft_table(&summary.maintenance_cards);
    })
}

fn handle_config(config: &Config, output: Output, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => output.emit(config, |config| {
            println!("Current Configuration");
            println!("=====================");
            println!();
            println!("[Storage]");
            println!("  Database path:      {}", config.database_path().display());
            println!("  Busy timeout (ms):  {}", config.storage.busy_timeout_ms);
            println!();
            println!("[Dashboard]");
            println!("  Upcoming limit:     {}", config.dashboard.upcoming_limit);
            println!("  Maintenance cards:  {}", config.dashboard.maintenance_cards);
        }),
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
            Ok(())
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
            Ok(())
        }
    }
}

fn print_aircraft(aircraft: &Aircraft) {
    let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "-".to_string());

    println!("{} (id {})", aircraft.registration, aircraft.id);
    println!("  Status:       {}", aircraft.status);
    println!("  Location:     {}", show(&aircraft.current_location));
    println!("  Commander:    {}", show(&aircraft.commander));
    println!("  Co-pilot:     {}", show(&aircraft.co_pilot));
    println!("  Mechanic:     {}", show(&aircraft.mechanic));
    println!("  Mission:      {}", show(&aircraft.mission));
    println!(
        "  Airframe:     {} {}",
        show(&aircraft.manufacturer),
        show(&aircraft.model)
    );
    println!("  Home base:    {}", show(&aircraft.home_base));
    println!("  Updated:      {}", aircraft.updated_at.to_rfc3339());
}

fn print_aircraft_table(list: &[Aircraft]) {
    if list.is_empty() {
        println!("  (none)");
        return;
    }
    for aircraft in list {
        println!(
            "  {:>4}  {:<10}  {:<11}  {}",
            aircraft.id,
            aircraft.registration,
            aircraft.status.as_str(),
            aircraft.current_location.as_deref().unwrap_or("-")
        );
    }
}

fn print_history(history: &[HistorySnapshot]) {
    if history.is_empty() {
        println!("  (no recorded changes)");
        return;
    }
    for snapshot in history {
        println!(
            "  {}  {:<11}  {}  {}",
            snapshot.recorded_at.format("%Y-%m-%d %H:%M:%S"),
            snapshot.status.as_str(),
            snapshot.location.as_deref().unwrap_or("-"),
            snapshot.mission.as_deref().unwrap_or("-")
        );
    }
}

fn print_windows(windows: &[MaintenanceWindow]) {
    if windows.is_empty() {
        println!("  (none)");
        return;
    }
    for window in windows {
        let last_day = window
            .last_day()
            .map_or_else(|| "?".to_string(), |day| day.to_string());
        println!(
            "  {:>4}  aircraft {:<4}  {} to {}  {} day(s)  {}",
            window.id,
            window.aircraft_id,
            window.scheduled_date,
            last_day,
            window.duration_days,
            window.state
        );
    }
}
