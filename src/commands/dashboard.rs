use anyhow::Result;
use clap::Args;

use super::{open, CommandContext};
use crate::routes::Route;

#[derive(Args)]
pub struct DashboardCommand {}

impl DashboardCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        open::show(ctx, Route::Dashboard.path()).await
    }
}
