//! Command-line surface over `taskminder_core`.
//!
//! # Responsibility
//! - Map subcommands onto lifecycle, export and polling operations.
//! - Render core data as plain text; no business rules live here.

mod cli;
mod sinks;

use chrono::Utc;
use clap::Parser;
use cli::{AddArgs, Cli, Commands, SettingsAction};
use log::info;
use sinks::{TerminalAlerts, TerminalNotifier};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use taskminder_core::db::open_db;
use taskminder_core::{
    default_log_level, export_file_name, export_ics, init_logging, is_overdue, load_settings,
    order_active, order_history, save_settings, Frequency, LoggingConfig, PollingLoop,
    ReminderScheduler, Settings, SqliteKeyValueStore, SystemClock, Task, TaskDraft, TaskError,
    TaskService, TaskStore,
};

const DB_FILE_NAME: &str = ".taskminder.db";
const LOG_DIR_NAME: &str = ".taskminder/logs";

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let level = cli
        .log_level
        .unwrap_or_else(|| default_log_level().to_string());
    // Logging is best-effort for the CLI; commands still run without it.
    let logging = match cli.log_dir {
        Some(dir) => Ok(dir),
        None => home_path(LOG_DIR_NAME),
    }
    .and_then(|dir| {
        LoggingConfig::new(&level, &dir)
            .and_then(|config| init_logging(&config))
            .map_err(Into::into)
    });
    if let Err(err) = logging {
        eprintln!("warning: logging disabled: {err}");
    }

    let db_path = match cli.db {
        Some(path) => path,
        None => home_path(DB_FILE_NAME)?,
    };
    let conn = open_db(&db_path)?;
    let mut store = TaskStore::open(SqliteKeyValueStore::new(&conn));

    match cli.command {
        Commands::Add(args) => add(&mut store, args),
        Commands::List => {
            list(&store);
            Ok(())
        }
        Commands::History => {
            history(&store);
            Ok(())
        }
        Commands::Complete { id } => {
            let result = TaskService::new(&mut store, SystemClock).complete_task(id)?;
            match result.successor.and_then(|next| store.get(next)) {
                Some(next) => println!(
                    "Task {id} completed. Next occurrence {} due {}.",
                    next.id,
                    format_deadline(next)
                ),
                None => println!("Task {id} completed. Moved to history."),
            }
            Ok(())
        }
        Commands::Delete { id } => {
            TaskService::new(&mut store, SystemClock).delete_task(id)?;
            println!("Task {id} deleted.");
            Ok(())
        }
        Commands::ClearHistory => {
            let removed = TaskService::new(&mut store, SystemClock).clear_history()?;
            println!("Cleared {removed} completed task(s).");
            Ok(())
        }
        Commands::Export { id, out } => export(&store, id, &out),
        Commands::Settings { action } => settings(store.backend_mut(), action),
        Commands::Watch {
            interval_secs,
            ticks,
        } => watch(&mut store, Duration::from_secs(interval_secs.max(1)), ticks),
    }
}

fn add(store: &mut TaskStore<SqliteKeyValueStore<'_>>, args: AddArgs) -> CliResult<()> {
    let draft = TaskDraft {
        title: args.title,
        description: args.description,
        category: args.category,
        priority: args.priority,
        deadline: args.deadline,
        frequency: args.frequency,
    };
    let task = TaskService::new(store, SystemClock).create_task(draft)?;
    println!("Task saved with id {}.", task.id);
    Ok(())
}

fn list(store: &TaskStore<SqliteKeyValueStore<'_>>) {
    let active = order_active(store.tasks());
    if active.is_empty() {
        println!("No active tasks.");
        return;
    }

    let now = Utc::now();
    for task in active {
        let overdue = if is_overdue(task, now) { " OVERDUE" } else { "" };
        let repeat = match task.frequency {
            Frequency::Once => String::new(),
            other => format!(" (repeats {other})"),
        };
        println!(
            "{:>14}  [{:<9}] {}  #{}  due {}{}{}",
            task.id,
            task.priority,
            task.title,
            task.category,
            format_deadline(task),
            overdue,
            repeat
        );
        if !task.description.is_empty() {
            println!("{:>16}{}", "", task.description);
        }
    }
}

fn history(store: &TaskStore<SqliteKeyValueStore<'_>>) {
    let done = order_history(store.tasks());
    if done.is_empty() {
        println!("No history yet.");
        return;
    }

    for task in done {
        let finished = task
            .completed_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:>14}  {}  completed {}", task.id, task.title, finished);
    }
}

fn export(store: &TaskStore<SqliteKeyValueStore<'_>>, id: i64, out: &Path) -> CliResult<()> {
    let task = store.get(id).ok_or(TaskError::NotFound(id))?;
    let path = out.join(export_file_name(task));
    std::fs::write(&path, export_ics(task))?;
    info!("event=task_export module=cli status=ok task_id={id}");
    println!("Wrote {}", path.display());
    Ok(())
}

fn settings(kv: &mut SqliteKeyValueStore<'_>, action: Option<SettingsAction>) -> CliResult<()> {
    let mut current = load_settings(&*kv);
    match action.unwrap_or(SettingsAction::Show) {
        SettingsAction::Show => {}
        SettingsAction::Set { sound, vibrate } => {
            if let Some(sound) = sound {
                current.sound = sound;
            }
            if let Some(vibrate) = vibrate {
                current.vibrate = vibrate;
            }
            save_settings(kv, &current)?;
        }
        SettingsAction::ToggleTheme => {
            current.theme = current.theme.toggled();
            save_settings(kv, &current)?;
        }
    }
    print_settings(&current);
    Ok(())
}

fn print_settings(settings: &Settings) {
    println!("sound:   {}", settings.sound);
    println!("vibrate: {}", settings.vibrate);
    println!("theme:   {}", settings.theme.as_str());
}

fn watch(
    store: &mut TaskStore<SqliteKeyValueStore<'_>>,
    interval: Duration,
    max_ticks: Option<u64>,
) -> CliResult<()> {
    // The polling loop re-reads settings before every tick.
    let settings = load_settings(store.backend());
    let mut scheduler =
        ReminderScheduler::new(TerminalNotifier::default(), TerminalAlerts, settings);
    let polling = PollingLoop::new(SystemClock, interval);
    let stop = AtomicBool::new(false);
    let mut waited = 0;

    println!(
        "Watching deadlines every {}s. Press Ctrl+C to stop.",
        interval.as_secs()
    );
    polling.run(&mut scheduler, store, &stop, |interval| {
        waited += 1;
        if max_ticks.is_some_and(|limit| waited >= limit) {
            stop.store(true, Ordering::SeqCst);
            return;
        }
        std::thread::sleep(interval);
    });
    Ok(())
}

fn format_deadline(task: &Task) -> String {
    task.deadline.format("%a %d %b %Y %H:%M UTC").to_string()
}

/// Resolves `relative` under the user's home directory.
fn home_path(relative: &str) -> CliResult<PathBuf> {
    let home = dirs::home_dir()
        .ok_or("cannot locate the home directory; pass --db and --log-dir explicitly")?;
    Ok(home.join(relative))
}

#[cfg(test)]
mod tests {
    use super::{home_path, DB_FILE_NAME, LOG_DIR_NAME};

    #[test]
    fn default_paths_are_absolute_under_home() {
        let db = home_path(DB_FILE_NAME).unwrap();
        assert!(db.is_absolute());
        assert!(db.ends_with(DB_FILE_NAME));

        let logs = home_path(LOG_DIR_NAME).unwrap();
        assert!(logs.is_absolute());
        assert_eq!(logs.parent(), db.parent().map(|home| home.join(".taskminder")).as_deref());
    }
}
