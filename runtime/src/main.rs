//! `kaveri` — scrape the Karnataka administrative hierarchy.

use clap::{Parser, Subcommand};
use kaveri_runtime::cli::{creds_cmd, output, run_cmd};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "kaveri",
    version,
    about = "Scrape the Kaveri village hierarchy with change detection"
)]
struct Cli {
    /// Suppress the summary and lower logging to warnings.
    #[arg(long, global = true)]
    quiet: bool,

    /// Print the summary as JSON on stdout.
    #[arg(long, global = true)]
    json: bool,

    /// Emit log events as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch the hierarchy, rewrite outputs, and report changes.
    ///
    /// Exit status: 0 changed, 2 unchanged, 1 failed.
    Run {
        /// Config document with scraper settings and credentials.
        #[arg(long, default_value = "config.json")]
        config: PathBuf,

        /// Directory holding the five output files.
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        /// Where timestamped backups go [default: <data-dir>/backups].
        #[arg(long)]
        backup_dir: Option<PathBuf>,
    },
    /// Copy KAVERI_AUTH and KAVERI_COOKIE into the config document.
    UpdateCreds {
        #[arg(long, default_value = "config.json")]
        config: PathBuf,
    },
}

fn init_tracing(quiet: bool, json: bool) {
    let default = if quiet {
        "warn"
    } else {
        "kaveri_runtime=info,kaveri=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.quiet {
        std::env::set_var(output::QUIET_ENV, "1");
    }
    if cli.json {
        std::env::set_var(output::JSON_ENV, "1");
    }
    init_tracing(cli.quiet, cli.log_json);
    info!("kaveri v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Run {
            config,
            data_dir,
            backup_dir,
        } => {
            let outcome = run_cmd::run(&config, &data_dir, backup_dir.as_deref()).await;
            ExitCode::from(outcome.exit_code())
        }
        Command::UpdateCreds { config } => match creds_cmd::run(&config) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                error!(error = %format!("{e:#}"), "failed to update credentials");
                ExitCode::FAILURE
            }
        },
    }
}
