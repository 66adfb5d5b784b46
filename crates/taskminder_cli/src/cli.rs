use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use taskminder_core::{parse_deadline, Frequency, Priority};

#[derive(Parser, Debug)]
#[command(name = "taskminder")]
#[command(version)]
#[command(about = "Track tasks with deadlines, recurrence and reminders")]
pub struct Cli {
    /// SQLite database file (defaults to ~/.taskminder.db)
    #[arg(long, global = true, env = "TASKMINDER_DB")]
    pub db: Option<PathBuf>,

    /// Log level: trace|debug|info|warn|error
    #[arg(long, global = true, env = "TASKMINDER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files (defaults to ~/.taskminder/logs)
    #[arg(long, global = true, env = "TASKMINDER_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new task
    Add(AddArgs),
    /// Show active tasks, most urgent first
    List,
    /// Show completed tasks, newest first
    History,
    /// Mark a task completed (recurring tasks get their next occurrence)
    Complete {
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Delete a task permanently
    Delete {
        #[arg(value_name = "ID")]
        id: i64,
    },
    /// Delete every completed task
    ClearHistory,
    /// Write a task as an .ics calendar file
    Export {
        #[arg(value_name = "ID")]
        id: i64,
        /// Output directory
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },
    /// Show or change reminder settings
    Settings {
        #[command(subcommand)]
        action: Option<SettingsAction>,
    },
    /// Poll deadlines and fire reminders until interrupted
    Watch {
        /// Seconds between deadline checks
        #[arg(long, default_value_t = 10)]
        interval_secs: u64,
        /// Stop after this many checks (at least one)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        ticks: Option<u64>,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    #[arg(value_name = "TITLE")]
    pub title: String,
    /// Deadline, e.g. 2024-06-01T09:00 (UTC) or RFC 3339
    #[arg(short, long, value_parser = parse_deadline_arg)]
    pub deadline: Option<DateTime<Utc>>,
    #[arg(long = "desc", default_value = "")]
    pub description: String,
    #[arg(short, long)]
    pub category: Option<String>,
    /// urgent|important|normal
    #[arg(short, long, value_parser = parse_priority_arg)]
    pub priority: Option<Priority>,
    /// once|daily|weekly
    #[arg(short, long, value_parser = parse_frequency_arg)]
    pub frequency: Option<Frequency>,
}

#[derive(Subcommand, Debug)]
pub enum SettingsAction {
    /// Print current settings
    Show,
    /// Update alert toggles
    Set {
        #[arg(long)]
        sound: Option<bool>,
        #[arg(long)]
        vibrate: Option<bool>,
    },
    /// Switch between light and dark theme
    ToggleTheme,
}

fn parse_deadline_arg(value: &str) -> Result<DateTime<Utc>, String> {
    parse_deadline(value).ok_or_else(|| format!("invalid deadline `{value}`"))
}

fn parse_priority_arg(value: &str) -> Result<Priority, String> {
    Priority::parse(value).ok_or_else(|| format!("invalid priority `{value}`"))
}

fn parse_frequency_arg(value: &str) -> Result<Frequency, String> {
    Frequency::parse(value).ok_or_else(|| format!("invalid frequency `{value}`"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_parses_typed_fields() {
        let cli = Cli::parse_from([
            "taskminder",
            "add",
            "Pay bill",
            "--deadline",
            "2024-01-01T10:00",
            "--priority",
            "Urgent",
            "--frequency",
            "daily",
        ]);
        let Commands::Add(args) = cli.command else {
            panic!("expected add command");
        };
        assert_eq!(args.title, "Pay bill");
        assert_eq!(args.priority, Some(Priority::Urgent));
        assert_eq!(args.frequency, Some(Frequency::Daily));
        assert_eq!(args.deadline, parse_deadline("2024-01-01T10:00"));
    }

    #[test]
    fn add_rejects_unknown_priority() {
        let result = Cli::try_parse_from(["taskminder", "add", "x", "--priority", "asap"]);
        assert!(result.is_err());
    }

    #[test]
    fn watch_defaults_to_ten_second_interval() {
        let cli = Cli::parse_from(["taskminder", "watch"]);
        assert!(matches!(
            cli.command,
            Commands::Watch {
                interval_secs: 10,
                ticks: None
            }
        ));
    }

    #[test]
    fn watch_rejects_zero_tick_budget() {
        let result = Cli::try_parse_from(["taskminder", "watch", "--ticks", "0"]);
        assert!(result.is_err());

        let cli = Cli::parse_from(["taskminder", "watch", "--ticks", "3"]);
        assert!(matches!(cli.command, Commands::Watch { ticks: Some(3), .. }));
    }

    #[test]
    fn global_db_flag_is_accepted_after_subcommand() {
        let cli = Cli::parse_from(["taskminder", "list", "--db", "/tmp/t.db"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/t.db")));
    }
}
