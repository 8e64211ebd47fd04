mod config;
mod editor;
mod exec;
mod pr;
mod review;
mod status;
mod target;
mod workspace;

use std::error::Error;
use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use colored::Colorize;
use tracing::{debug, info, info_span, Instrument};
use tracing_subscriber::EnvFilter;

use config::{Config, EDITOR_ENV};
use editor::EditorCommand;
use exec::ProcessRunner;
use pr::GitHubClient;
use review::{Review, ReviewError, ReviewOutcome};
use status::TerminalStatus;
use target::RunOptions;

/// ric: review a GitHub repository or pull request in your editor.
///
/// Clones the target into a fresh temporary directory and opens it with
/// the editor command (default `code --wait`, override with VIC_EDITOR_COMMAND).
#[derive(Parser, Debug)]
#[command(
    name = "ric",
    version,
    about,
    override_usage = "ric [OPTIONS] <GitHub repo or pull-request URL>"
)]
struct Cli {
    /// GitHub repository or pull request URL
    /// (e.g., https://github.com/org/repo or https://github.com/org/repo/pull/42)
    url: Option<String>,

    /// Clone with full history (`--deep`) or shallow (`--deep=false`).
    /// By default PRs are cloned with full depth and repos with depth 1.
    #[arg(
        short,
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    deep: Option<bool>,

    /// Editor command for this run, overriding VIC_EDITOR_COMMAND and .ric.toml
    #[arg(short, long, value_name = "CMD")]
    editor: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => return usage_exit(&err),
    };

    let Some(url) = cli.url.clone() else {
        let _ = Cli::command().print_help();
        return ExitCode::from(1);
    };

    match run(&cli, &url).instrument(info_span!("ric", url = %url)).await {
        Ok(outcome) => {
            info!(
                workspace = %outcome.workspace.path().display(),
                clone_url = %outcome.source.clone_url,
                branch = %outcome.source.branch,
                "done"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            ExitCode::from(1)
        }
    }
}

async fn run(cli: &Cli, url: &str) -> Result<ReviewOutcome, ReviewError> {
    let target = target::parse_target(url)?;
    let options = RunOptions::resolve(cli.deep, &target);
    debug!(
        owner = %target.owner,
        repo = %target.repo,
        pr = target.pr_number,
        deep = options.is_deep(),
        "classified target"
    );

    let config = Config::load()?;
    let editor_command =
        config.editor_command(cli.editor.as_deref(), std::env::var(EDITOR_ENV).ok());
    debug!(editor = %editor_command, "resolved editor command");

    let client = GitHubClient::new(config.api_url(), config.github_token());
    let runner = ProcessRunner;
    let status = TerminalStatus::new();

    let review = Review {
        pull_requests: &client,
        runner: &runner,
        status: &status,
        editor: EditorCommand::new(&editor_command)?,
        web_url: config.web_url(),
        workspace_root: std::env::temp_dir(),
    };
    review.run(&target, options).await
}

/// `--help` and `--version` succeed; any other argument error exits 1.
fn usage_exit(err: &clap::Error) -> ExitCode {
    let _ = err.print();
    if err.use_stderr() {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

/// The single place errors reach the user.
fn report_error(err: &ReviewError) {
    eprintln!("{}", "\n\nAn error occurred:\n".red().bold().underline());
    eprintln!("{err}");
    let mut source = err.source();
    while let Some(cause) = source {
        eprintln!("  caused by: {cause}");
        source = cause.source();
    }
}
