use anyhow::Result;
use clap::Args;

use super::{prompt_credentials, spinner, CommandContext};
use crate::routes::Route;
use crate::views;

#[derive(Args)]
pub struct LoginCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(long, env = "FITLOG_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Location to open after signing in, e.g. `/progress`
    #[arg(long)]
    redirect: Option<String>,
}

impl LoginCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        println!("Fitlog - Login");
        println!();

        let credentials = prompt_credentials(self.email, self.password)?;
        let redirect = self.redirect.as_deref().map(Route::parse);

        let pb = spinner(&format!("Logging in as {}...", credentials.email));
        let result = ctx.app.login(&credentials, redirect).await;
        pb.finish_and_clear();

        match result {
            Ok(screen) => {
                println!("✓ Login successful!");
                println!();
                print!("{}", views::render(&screen));
                Ok(())
            }
            Err(e) => {
                println!("✗ Login failed: {}", e);
                Err(e.into())
            }
        }
    }
}
