//! Club Fan Tracker
//!
//! Reads the member list of a Umamusume club from the running game client
//! and records every member's fan count in a CSV table, one column per day.
//!
//! Usage:
//!   club-fan-tracker           capture the club list and update the table
//!   club-fan-tracker report    write fan statistics and the history chart
//!   club-fan-tracker select    select and save a new capture region

mod analysis;
mod capture;
mod ocr;
mod paths;
mod region;
mod table;
mod tracker;

use anyhow::{anyhow, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

const LOG_FILE: &str = "club_fan_tracker.log";

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    append_to_log_file(&line);
}

/// Best effort: a missing logs directory must not stop the run.
fn append_to_log_file(line: &str) {
    let log_path = paths::get_logs_dir().join(LOG_FILE);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let _ = file.write_all(line.as_bytes());
    }
}

/// Subcommand selected on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Track,
    Report,
    Select,
}

fn parse_command(arg: Option<&str>) -> Result<Command> {
    match arg {
        None => Ok(Command::Track),
        Some("report") => Ok(Command::Report),
        Some("select") => Ok(Command::Select),
        Some(other) => Err(anyhow!(
            "Unknown command '{}'. Expected no argument, 'report' or 'select'.",
            other
        )),
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        let log_msg = format!("[PANIC]{} {}\n", location, msg);
        eprint!("{}", log_msg);
        append_to_log_file(&log_msg);
    }));

    // Ensure output directories exist
    paths::ensure_directories()?;

    // Load configuration
    tracker::init_config();
    let config = tracker::get_config();

    let arg = std::env::args().nth(1);
    let result = parse_command(arg.as_deref()).and_then(|command| match command {
        Command::Track => {
            log("Starting club fan capture...");
            tracker::run_tracker(config)
        }
        Command::Report => {
            log("Generating fan report...");
            analysis::generate_report(config).map(|(chart, json)| {
                log(&format!(
                    "Report complete: {} and {}",
                    chart.display(),
                    json.display()
                ));
            })
        }
        Command::Select => tracker::select_only(config),
    });

    if let Err(e) = &result {
        log(&format!("❌ {:#}", e));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command(None).unwrap(), Command::Track);
        assert_eq!(parse_command(Some("report")).unwrap(), Command::Report);
        assert_eq!(parse_command(Some("select")).unwrap(), Command::Select);
        assert!(parse_command(Some("scan")).is_err());
    }
}
