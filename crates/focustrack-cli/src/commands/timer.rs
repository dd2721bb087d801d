use std::time::Duration;

use clap::Subcommand;
use focustrack_core::engine::ticker;
use focustrack_core::{Config, Database, Event, FocusEngine, Session, SessionKind};
use serde::Serialize;

use super::{open_engine, MAX_DURATION_SECS};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Start a session
    Start {
        /// Session kind: focus, short-break, long-break, custom (default: active preset)
        #[arg(long)]
        kind: Option<SessionKind>,
        /// Length in seconds, at most one week (default: the preset for the kind)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_SECS))]
        duration: Option<u64>,
    },
    /// Pause the running session
    Pause,
    /// Resume the paused session
    Resume,
    /// Complete the session now
    Complete,
    /// Cancel the session
    Cancel,
    /// Print current session state as JSON
    Status,
    /// Follow the running session until it completes
    Watch {
        /// Tick interval in milliseconds (default: timer.tick_interval_ms)
        #[arg(long)]
        interval_ms: Option<u64>,
    },
}

#[derive(Serialize)]
struct TimerStatus<'a> {
    running: bool,
    remaining_secs: u64,
    session: Option<&'a Session>,
}

fn print_status(engine: &FocusEngine<Database>) -> Result<(), Box<dyn std::error::Error>> {
    let status = TimerStatus {
        running: engine.is_running(),
        remaining_secs: engine.remaining_secs(),
        session: engine.current_session(),
    };
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}

/// Print the event, or the unchanged state when the command did not apply.
fn print_outcome(
    engine: &FocusEngine<Database>,
    event: Option<Event>,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => println!("{}", serde_json::to_string_pretty(&event)?),
        None => print_status(engine)?,
    }
    Ok(())
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;
    if let Some(recovered) = engine.recovered() {
        eprintln!("{}", serde_json::to_string(recovered)?);
    }

    match action {
        TimerAction::Start { kind, duration } => {
            let kind = kind.unwrap_or(engine.settings().active_preset);
            let event = match duration {
                Some(secs) => engine.start_session(kind, secs),
                None => engine.start_preset_session(kind),
            };
            if event.is_none() {
                eprintln!("a session is already active");
            }
            print_outcome(&engine, event)?;
        }
        TimerAction::Pause => {
            let event = engine.pause_session();
            print_outcome(&engine, event)?;
        }
        TimerAction::Resume => {
            let event = engine.resume_session();
            print_outcome(&engine, event)?;
        }
        TimerAction::Complete => {
            let event = engine.complete_session();
            print_outcome(&engine, event)?;
        }
        TimerAction::Cancel => {
            let event = engine.cancel_session();
            print_outcome(&engine, event)?;
        }
        TimerAction::Status => {
            // Tick so a session that has run out is completed
            let event = engine.tick();
            print_status(&engine)?;
            if let Some(event @ Event::SessionCompleted { .. }) = event {
                println!("{}", serde_json::to_string_pretty(&event)?);
            }
        }
        TimerAction::Watch { interval_ms } => {
            let interval_ms =
                interval_ms.unwrap_or_else(|| Config::load_or_default().timer.tick_interval_ms);
            let period = Duration::from_millis(interval_ms.max(1));

            let runtime = tokio::runtime::Runtime::new()?;
            let last = runtime.block_on(ticker::drive(&mut engine, period, |event| {
                if let Ok(line) = serde_json::to_string(event) {
                    println!("{line}");
                }
            }));
            if last.is_none() {
                print_status(&engine)?;
            }
        }
    }
    Ok(())
}
