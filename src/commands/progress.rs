use anyhow::{bail, Result};
use chrono::Local;
use clap::{Args, Subcommand};
use dialoguer::Input;

use super::{is_interactive, open, spinner, CommandContext};
use crate::models::progress::DATE_FORMAT;
use crate::models::NewProgressLog;
use crate::routes::Route;
use crate::views::{self, Fetch};

#[derive(Args)]
pub struct ProgressCommand {
    #[command(subcommand)]
    action: Option<ProgressAction>,
}

#[derive(Subcommand)]
enum ProgressAction {
    /// Record a completed exercise
    Log(LogProgressCommand),
}

impl ProgressCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        match self.action {
            Some(ProgressAction::Log(cmd)) => cmd.execute(ctx).await,
            None => open::show(ctx, Route::Progress.path()).await,
        }
    }
}

#[derive(Args)]
pub struct LogProgressCommand {
    /// Workout name, e.g. "Leg Day"
    #[arg(short, long)]
    workout: Option<String>,

    /// Exercise name, e.g. "Squat"
    #[arg(short, long)]
    exercise: Option<String>,

    /// Sets completed
    #[arg(short, long)]
    sets: Option<i32>,

    /// Reps achieved, free form (e.g. "8,8,7")
    #[arg(short, long)]
    reps: Option<String>,

    /// Weight used
    #[arg(long)]
    weight: Option<f64>,

    /// Workout date as YYYY-MM-DD (defaults to today)
    #[arg(short, long)]
    date: Option<String>,
}

impl LogProgressCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        if ctx.app.session().user_id().is_none() {
            println!("You are not logged in.");
            println!();
            println!("Use 'fitlog login --redirect {}' to authenticate.", Route::Progress.path());
            bail!("Not logged in");
        }

        let entry = self.into_entry()?;

        let pb = spinner("Saving entry...");
        let result = ctx.app.log_progress(&entry).await;
        pb.finish_and_clear();

        let log = match result {
            Ok(log) => log,
            Err(e) => {
                println!("✗ Failed to log progress: {}", e);
                return Err(e.into());
            }
        };

        println!("{}", views::progress::render_entry(&log));
        println!();

        // Show the refreshed history so the new entry appears in context
        let user_id = log.user_id.clone();
        let history = Fetch::from_list(ctx.app.data().fetch_progress_history(&user_id).await);
        print!("{}", views::progress::render_history(&history));

        Ok(())
    }

    /// Fill missing fields from prompts when attached to a terminal
    fn into_entry(self) -> Result<NewProgressLog> {
        let interactive = is_interactive();

        let workout_name = text_field(self.workout, "Workout", interactive)?;
        let exercise_name = text_field(self.exercise, "Exercise", interactive)?;
        let sets_completed = match self.sets {
            Some(sets) => sets,
            None if interactive => Input::new().with_prompt("Sets completed").interact_text()?,
            None => bail!("--sets is required"),
        };
        let reps_achieved = text_field(self.reps, "Reps achieved", interactive)?;
        let weight_used = match self.weight {
            Some(weight) => Some(weight),
            None if interactive => {
                let raw: String = Input::new()
                    .with_prompt("Weight used (blank for none)")
                    .allow_empty(true)
                    .interact_text()?;
                let raw = raw.trim();
                if raw.is_empty() {
                    None
                } else {
                    Some(raw.parse()?)
                }
            }
            None => None,
        };
        let workout_date = self
            .date
            .unwrap_or_else(|| Local::now().date_naive().format(DATE_FORMAT).to_string());

        Ok(NewProgressLog {
            workout_name,
            exercise_name,
            sets_completed,
            reps_achieved,
            weight_used,
            workout_date,
        })
    }
}

fn text_field(value: Option<String>, prompt: &str, interactive: bool) -> Result<String> {
    match value {
        Some(value) => Ok(value),
        None if interactive => Ok(Input::new().with_prompt(prompt).interact_text()?),
        None => bail!("{} is required", prompt.to_lowercase()),
    }
}
