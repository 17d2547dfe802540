use anyhow::Result;
use clap::Args;
use dialoguer::{Input, Password};

use super::{spinner, CommandContext};
use crate::models::Credentials;
use crate::views;

#[derive(Args)]
pub struct RegisterCommand {
    /// Account email (prompted when omitted)
    #[arg(short, long)]
    email: Option<String>,

    /// Account password (prompted when omitted)
    #[arg(long, env = "FITLOG_PASSWORD", hide_env_values = true)]
    password: Option<String>,
}

impl RegisterCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        println!("Fitlog - Create account");
        println!();

        let email = match self.email {
            Some(email) => email,
            None => Input::new().with_prompt("Email").interact_text()?,
        };
        let password = match self.password {
            Some(password) => password,
            None => Password::new()
                .with_prompt("Password")
                .with_confirmation("Confirm password", "Passwords do not match")
                .interact()?,
        };
        let credentials = Credentials::new(email, password);

        let pb = spinner("Creating account...");
        let result = ctx.app.register(&credentials, None).await;
        pb.finish_and_clear();

        match result {
            Ok(Some(screen)) => {
                println!("✓ Account created and signed in!");
                println!();
                print!("{}", views::render(&screen));
                Ok(())
            }
            Ok(None) => {
                println!("✓ Account created!");
                println!();
                println!("Check {} for a confirmation link,", credentials.email);
                println!("then use 'fitlog login' to sign in.");
                Ok(())
            }
            Err(e) => {
                println!("✗ Registration failed: {}", e);
                Err(e.into())
            }
        }
    }
}
