use anyhow::Result;
use clap::Args;

use super::CommandContext;

#[derive(Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        if ctx.app.session().user_id().is_none() {
            println!("You are not logged in.");
            println!();
            println!("Use 'fitlog login' to authenticate.");
            return Ok(());
        }

        println!("Fetching user information...");
        println!();

        match ctx.client.auth().get_user().await {
            Ok(user) => {
                println!("✓ Authenticated as:");
                println!();
                println!("  Email:    {}", user.email.as_deref().unwrap_or("-"));
                println!("  User ID:  {}", user.id);
                Ok(())
            }
            Err(e) => {
                println!("✗ Failed to fetch user information: {}", e);
                println!();
                println!("Your session may have expired.");
                println!("Use 'fitlog login' to authenticate again.");
                Err(e.into())
            }
        }
    }
}
