use anyhow::Result;
use clap::Args;

use super::CommandContext;

#[derive(Args)]
pub struct LogoutCommand {}

impl LogoutCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        if !ctx.app.session().state().is_authenticated() {
            println!("You are not logged in.");
            return Ok(());
        }

        ctx.app.logout().await?;
        println!("✓ Logged out successfully!");

        Ok(())
    }
}
