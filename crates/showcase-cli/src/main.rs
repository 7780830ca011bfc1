//! Showcase Sync CLI
//!
//! The `showcase` command regenerates the `projects.json` document behind a
//! static portfolio page.
//!
//! ## Commands
//!
//! - `sync`: fetch every configured repository and write the document
//! - `discover`: build the document from a user's most recently pushed repos
//! - `validate`: check the project list without touching the network

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use showcase_core::{
    default_user_agent, load_projects, run_discover, run_sync, ClientConfig, Credential,
    DiscoverSettings, GitHubClient, OutputStyle, SyncSettings, SyncSummary, DEFAULT_API_URL,
    DEFAULT_DISCOVER_LIMIT,
};
use tracing::{error, info, Level};

#[derive(Parser)]
#[command(name = "showcase")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Generate portfolio project metadata from the GitHub API", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured repository and write the output document
    Sync {
        /// Project list (JSON with a top-level `projects` array)
        #[arg(short, long, env = "SHOWCASE_CONFIG", default_value = "projects.config.json")]
        config: PathBuf,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Build the output document from a user's most recently pushed repositories
    Discover {
        /// GitHub login whose repositories are listed
        #[arg(short, long)]
        user: String,

        /// Number of repositories to keep
        #[arg(short, long, default_value_t = DEFAULT_DISCOVER_LIMIT)]
        limit: usize,

        #[command(flatten)]
        output: OutputArgs,

        #[command(flatten)]
        api: ApiArgs,
    },

    /// Check the project list and report how many projects it holds
    Validate {
        /// Project list (JSON with a top-level `projects` array)
        #[arg(short, long, env = "SHOWCASE_CONFIG", default_value = "projects.config.json")]
        config: PathBuf,
    },
}

#[derive(Args)]
struct OutputArgs {
    /// Output document path (overwritten on every run)
    #[arg(short, long, env = "SHOWCASE_OUTPUT", default_value = "projects.json")]
    output: PathBuf,

    /// Write minified JSON instead of pretty-printed
    #[arg(long)]
    compact: bool,
}

impl OutputArgs {
    fn style(&self) -> OutputStyle {
        if self.compact {
            OutputStyle::Compact
        } else {
            OutputStyle::Pretty
        }
    }
}

#[derive(Args)]
struct ApiArgs {
    /// GitHub API base URL
    #[arg(long, env = "SHOWCASE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// User-Agent sent with every request
    #[arg(long, default_value_t = default_user_agent())]
    user_agent: String,

    /// Request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Read the API token from this file instead of the environment
    #[arg(long)]
    token_file: Option<PathBuf>,
}

impl ApiArgs {
    /// Resolve the credential once; the client never reads the environment.
    fn client(&self) -> Result<GitHubClient> {
        let credential = match &self.token_file {
            Some(path) => Some(Credential::from_file(path)?),
            None => Credential::from_env(),
        };
        if credential.is_none() {
            info!("no GitHub token found, using unauthenticated rate limits");
        }

        let config = ClientConfig::new(&self.api_url)
            .with_user_agent(&self.user_agent)
            .with_credential(credential)
            .with_timeout(self.timeout_secs.map(Duration::from_secs));
        Ok(GitHubClient::new(config)?)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    showcase_core::init_tracing(cli.json, level);

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Sync {
            config,
            output,
            api,
        } => cmd_sync(&config, &output, &api).await,
        Commands::Discover {
            user,
            limit,
            output,
            api,
        } => cmd_discover(&user, limit, &output, &api).await,
        Commands::Validate { config } => cmd_validate(&config),
    }
}

async fn cmd_sync(config: &Path, output: &OutputArgs, api: &ApiArgs) -> Result<()> {
    let client = api.client()?;
    let settings = SyncSettings {
        config_path: config.to_path_buf(),
        output_path: output.output.clone(),
        style: output.style(),
    };

    let summary = run_sync(&settings, Arc::new(client))
        .await
        .context("Sync failed, no output written")?;
    print_summary(&summary);
    Ok(())
}

async fn cmd_discover(
    user: &str,
    limit: usize,
    output: &OutputArgs,
    api: &ApiArgs,
) -> Result<()> {
    let client = api.client()?;
    let settings = DiscoverSettings {
        user: user.to_string(),
        limit,
        output_path: output.output.clone(),
        style: output.style(),
    };

    let summary = run_discover(&settings, &client)
        .await
        .with_context(|| format!("Discovery for user '{}' failed, no output written", user))?;
    print_summary(&summary);
    Ok(())
}

fn cmd_validate(config: &Path) -> Result<()> {
    let projects = load_projects(config)?;
    println!("{}: {} project(s)", config.display(), projects.len());
    for project in &projects {
        println!("  {}", project.repo);
    }
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!(
        "Wrote {} project(s) to {} ({} ok, {} failed)",
        summary.total,
        summary.output.display(),
        summary.succeeded,
        summary.failed
    );
}
