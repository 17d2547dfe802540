mod dashboard;
mod login;
mod logout;
mod open;
mod progress;
mod register;
mod whoami;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use indicatif::ProgressBar;
use std::io::IsTerminal;
use std::sync::Arc;
use std::time::Duration;

use crate::app::App;
use crate::config::Config;
use crate::models::Credentials;
use crate::supabase::SupabaseClient;

pub use dashboard::DashboardCommand;
pub use login::LoginCommand;
pub use logout::LogoutCommand;
pub use open::OpenCommand;
pub use progress::{LogProgressCommand, ProgressCommand};
pub use register::RegisterCommand;
pub use whoami::WhoamiCommand;

#[derive(Parser)]
#[command(name = "fitlog")]
#[command(about = "Workout plan and progress log for your hosted training account", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new account
    Register(RegisterCommand),

    /// Sign in
    Login(LoginCommand),

    /// Sign out and forget the stored session
    Logout(LogoutCommand),

    /// Show current user information
    Whoami(WhoamiCommand),

    /// Show your workout plan
    Dashboard(DashboardCommand),

    /// Show progress history or log a workout
    Progress(ProgressCommand),

    /// Open a view by location, e.g. `/progress`
    Open(OpenCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub async fn execute(self) -> Result<()> {
        if self.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        match self.command {
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
            command => {
                let ctx = CommandContext::init().await?;
                match command {
                    Commands::Register(cmd) => cmd.execute(&ctx).await,
                    Commands::Login(cmd) => cmd.execute(&ctx).await,
                    Commands::Logout(cmd) => cmd.execute(&ctx).await,
                    Commands::Whoami(cmd) => cmd.execute(&ctx).await,
                    Commands::Dashboard(cmd) => cmd.execute(&ctx).await,
                    Commands::Progress(cmd) => cmd.execute(&ctx).await,
                    Commands::Open(cmd) => cmd.execute(&ctx).await,
                    Commands::Completions { .. } => Ok(()),
                }
            }
        }
    }
}

/// Everything a command needs: the backend client and the running app
pub(crate) struct CommandContext {
    pub client: Arc<SupabaseClient>,
    pub app: App,
}

impl CommandContext {
    /// Read configuration, connect, and wait for the initial session read.
    ///
    /// Missing configuration stops here before anything else runs.
    async fn init() -> Result<Self> {
        let config = Config::from_env().context("Invalid startup configuration")?;
        tracing::debug!("Loaded configuration: {:?}", config);

        let client = Arc::new(SupabaseClient::new(&config).context("Failed to create API client")?);
        let app = App::from_client(Arc::clone(&client));
        app.session().ready().await;

        Ok(Self { client, app })
    }
}

pub(crate) fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub(crate) fn is_interactive() -> bool {
    std::io::stdin().is_terminal()
}

/// Ask for whatever part of the credentials was not supplied
pub(crate) fn prompt_credentials(email: Option<String>, password: Option<String>) -> Result<Credentials> {
    let email = match email {
        Some(email) => email,
        None => Input::new().with_prompt("Email").interact_text()?,
    };
    let password = match password {
        Some(password) => password,
        None => Password::new().with_prompt("Password").interact()?,
    };
    Ok(Credentials::new(email, password))
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
