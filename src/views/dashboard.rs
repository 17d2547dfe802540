use colored::Colorize;
use std::fmt::Write;

use super::Fetch;
use crate::models::{User, WorkoutPlan};

/// Render the dashboard: greeting plus the user's workout plan
pub fn render(user: Option<&User>, plan: &Fetch<WorkoutPlan>) -> String {
    let mut out = String::new();

    let who = user
        .and_then(|u| u.email.as_deref())
        .unwrap_or("athlete");
    let _ = writeln!(out, "{}", format!("Welcome back, {}!", who).bold());
    let _ = writeln!(out);

    match plan {
        Fetch::NotFetched => {
            let _ = writeln!(out, "Loading workout plan...");
        }
        Fetch::Empty => {
            let _ = writeln!(out, "{}", "No workout plan assigned yet.".yellow());
        }
        Fetch::Failed(e) => {
            let _ = writeln!(out, "{} {}", "✗ Could not load workout plan:".red(), e);
        }
        Fetch::Loaded(plan) => render_plan(&mut out, plan),
    }

    out
}

fn render_plan(out: &mut String, plan: &WorkoutPlan) {
    let _ = writeln!(out, "{}", plan.name.bold().cyan());
    if let Some(description) = plan.description.as_deref().filter(|d| !d.trim().is_empty()) {
        let _ = writeln!(out, "{}", description.dimmed());
    }
    let _ = writeln!(out);

    if plan.exercises.is_empty() {
        let _ = writeln!(out, "This plan has no exercises.");
        return;
    }

    let width = plan
        .exercises
        .iter()
        .map(|e| e.name.chars().count())
        .max()
        .unwrap_or(0);

    for (i, exercise) in plan.exercises.iter().enumerate() {
        let _ = writeln!(
            out,
            "  {:>2}. {:<width$}  {} x {}",
            i + 1,
            exercise.name,
            exercise.sets,
            exercise.reps,
            width = width
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{} exercises, {} sets total",
        plan.exercises.len(),
        plan.total_sets()
    );
}
