use anyhow::{bail, Result};
use clap::Args;

use super::{is_interactive, prompt_credentials, spinner, CommandContext};
use crate::app::Screen;
use crate::views;

#[derive(Args)]
pub struct OpenCommand {
    /// Location to open, e.g. `/dashboard`
    location: String,
}

impl OpenCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        show(ctx, &self.location).await
    }
}

/// Navigate to `location` and print the resulting screen.
///
/// A redirect to the login view prompts for credentials when attached to a
/// terminal and continues to the original location after signing in.
pub(crate) async fn show(ctx: &CommandContext, location: &str) -> Result<()> {
    let pb = spinner("Loading...");
    let screen = ctx.app.navigate(location).await;
    pb.finish_and_clear();

    let redirect = match &screen {
        Screen::Login {
            redirect: Some(route),
        } => *route,
        _ => {
            print!("{}", views::render(&screen));
            if let Screen::NotFound(location) = &screen {
                bail!("No view at {}", location);
            }
            return Ok(());
        }
    };

    if !is_interactive() {
        print!("{}", views::render(&screen));
        bail!("Not logged in");
    }

    println!("Login required to open {}.", redirect);
    println!();
    let credentials = prompt_credentials(None, None)?;
    let pb = spinner("Logging in...");
    let result = ctx.app.login(&credentials, Some(redirect)).await;
    pb.finish_and_clear();
    let screen = result?;
    println!();
    print!("{}", views::render(&screen));

    Ok(())
}
