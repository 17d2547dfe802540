use colored::Colorize;
use std::fmt::Write;

use super::Fetch;
use crate::models::progress::DATE_FORMAT;
use crate::models::ProgressLog;

/// Render the progress history, newest first as delivered by the adapter
pub fn render_history(history: &Fetch<Vec<ProgressLog>>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", "Progress History".bold());
    let _ = writeln!(out);

    match history {
        Fetch::NotFetched => {
            let _ = writeln!(out, "Loading history...");
        }
        Fetch::Empty => {
            let _ = writeln!(out, "No workouts logged yet.");
            let _ = writeln!(out, "Use 'fitlog progress log' to record one.");
        }
        Fetch::Failed(e) => {
            let _ = writeln!(out, "{} {}", "✗ Could not load history:".red(), e);
        }
        Fetch::Loaded(logs) => {
            let mut current_date = None;
            for log in logs {
                if current_date != Some(log.workout_date) {
                    current_date = Some(log.workout_date);
                    let _ = writeln!(
                        out,
                        "{}",
                        log.workout_date.format(DATE_FORMAT).to_string().cyan()
                    );
                }
                let _ = writeln!(out, "  {}", entry_line(log));
            }
        }
    }

    out
}

/// Single-entry confirmation shown after logging
pub fn render_entry(log: &ProgressLog) -> String {
    format!(
        "{} {}  {}",
        "✓ Logged".green(),
        log.workout_date.format(DATE_FORMAT),
        entry_line(log)
    )
}

fn entry_line(log: &ProgressLog) -> String {
    let weight = match log.weight_used {
        Some(weight) => format!(" @ {}", weight),
        None => String::new(),
    };
    format!(
        "{} / {}: {} sets, reps {}{}",
        log.workout_name, log.exercise_name, log.sets_completed, log.reps_achieved, weight
    )
}
