mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use deep_research::config::ResearchConfig;
use deep_research::stores::SettingsPatch;

#[derive(Parser)]
#[command(
    name = "deep-research",
    version,
    about = "Research worker and client for AI-gateway backed deep research"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the research worker
    Serve {
        /// Address to bind (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to bind (overrides config)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Store the worker credential
    Login {
        /// Shared secret configured on the worker
        key: String,
    },
    /// Forget the stored worker credential
    Logout,
    /// Show which worker the client talks to and whether it is logged in
    Whoami,
    /// Inspect or change research settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
    /// Send a prompt to the worker and print the answer
    Generate {
        prompt: String,
        /// Model to use (defaults to the task model from settings)
        #[arg(long)]
        model: Option<String>,
        /// Wait for the full response instead of streaming
        #[arg(long)]
        no_stream: bool,
    },
    /// List the models offered for research
    Models,
    /// Browse research sessions on the worker
    Sessions {
        #[command(subcommand)]
        action: SessionsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one or more settings
    #[command(allow_negative_numbers = true)]
    Set {
        #[arg(long)]
        core_model: Option<String>,
        #[arg(long)]
        task_model: Option<String>,
        #[arg(long)]
        thinking_budget: Option<i64>,
        #[arg(long)]
        depth: Option<i64>,
        #[arg(long)]
        wide: Option<i64>,
        #[arg(long)]
        parallel_search: Option<i64>,
        #[arg(long)]
        report_tone: Option<String>,
        #[arg(long)]
        min_words: Option<i64>,
        /// Comma-separated model identifiers
        #[arg(long, value_delimiter = ',')]
        model_list: Option<Vec<String>>,
    },
    /// Restore default settings
    Reset,
}

#[derive(Subcommand)]
enum SessionsAction {
    /// List recent sessions
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one session with its tasks and logs
    Show {
        id: String,
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ResearchConfig::load()?;

    // stdout is for command output; logs go to stderr.
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            deep_research::server::serve(config).await?;
        }
        Command::Login { key } => cli::auth::login(&config, &key)?,
        Command::Logout => cli::auth::logout(&config)?,
        Command::Whoami => cli::auth::whoami(&config),
        Command::Settings { action } => match action {
            SettingsAction::Show => cli::settings::show(&config),
            SettingsAction::Set {
                core_model,
                task_model,
                thinking_budget,
                depth,
                wide,
                parallel_search,
                report_tone,
                min_words,
                model_list,
            } => {
                let patch = SettingsPatch {
                    core_model,
                    task_model,
                    thinking_budget,
                    depth,
                    wide,
                    parallel_search,
                    report_tone,
                    min_words,
                    model_list,
                };
                cli::settings::set(&config, patch)?;
            }
            SettingsAction::Reset => cli::settings::reset(&config)?,
        },
        Command::Generate {
            prompt,
            model,
            no_stream,
        } => cli::generate::generate(&config, &prompt, model, !no_stream).await?,
        Command::Models => cli::generate::models(&config),
        Command::Sessions { action } => match action {
            SessionsAction::List { json } => cli::sessions::list(&config, json).await?,
            SessionsAction::Show { id, json } => cli::sessions::show(&config, &id, json).await?,
        },
    }

    Ok(())
}
