//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use careerwatch_core::{Pipeline, ProgressReporter, RunOutcome, SilentProgress, watch};
use careerwatch_crawler::Fetcher;
use careerwatch_notify::{NotificationMessage, NotificationSink, Notifier};
use careerwatch_shared::{AppConfig, JobRecord, init_config, load_config, load_config_from};

/// Exit status of a run that aborted (fetch failed or nothing extracted).
const EXIT_ABORTED: u8 = 2;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// careerwatch: get notified about new relevant job postings.
#[derive(Parser)]
#[command(
    name = "careerwatch",
    version,
    about = "Watch a careers page and send a webhook message for each new relevant posting.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Config file (defaults to ~/.careerwatch/careerwatch.toml).
    #[arg(long, global = true, env = "CAREERWATCH_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run once: fetch, filter, notify about new jobs, save the seen set.
    Run,

    /// Show what a run would find, without notifying or saving.
    Check {
        /// Also list postings the keyword filter rejects.
        #[arg(short, long)]
        all: bool,
    },

    /// Run now and then daily at the configured time until Ctrl-C.
    Watch,

    /// Send a sample new-job message and a "no new jobs" message.
    NotifyTest,

    /// Manage configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "careerwatch=info",
        1 => "careerwatch=debug",
        _ => "careerwatch=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Command::Run => cmd_run(cli.config).await,
        Command::Check { all } => cmd_check(cli.config, all).await.map(|()| ExitCode::SUCCESS),
        Command::Watch => cmd_watch(cli.config).await.map(|()| ExitCode::SUCCESS),
        Command::NotifyTest => cmd_notify_test(cli.config).await.map(|()| ExitCode::SUCCESS),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().map(|()| ExitCode::SUCCESS),
            ConfigAction::Show => cmd_config_show(cli.config).map(|()| ExitCode::SUCCESS),
        },
    }
}

fn resolve_config(path: Option<PathBuf>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config_from(&path)?,
        None => load_config()?,
    };
    Ok(config)
}

fn build_pipeline(config: &AppConfig) -> Result<Pipeline<Fetcher, Notifier>> {
    let fetcher = Fetcher::from_config(&config.fetch)?;
    let notifier = Notifier::from_config(&config.notify)?;
    Ok(Pipeline::from_config(config, fetcher, notifier)?)
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config_path: Option<PathBuf>) -> Result<ExitCode> {
    let config = resolve_config(config_path)?;
    let pipeline = build_pipeline(&config)?;

    info!(url = %pipeline.url(), "checking careers page");

    let reporter = CliProgress::new();
    let outcome = pipeline.run(&reporter).await;

    match outcome {
        RunOutcome::Completed(report) => {
            println!();
            println!("  Run completed ({})", report.strategy);
            println!("  Jobs found:     {}", report.fetched);
            println!("  Relevant:       {}", report.relevant);
            println!("  Already seen:   {}", report.already_seen);
            println!("  New:            {}", report.new_jobs.len());
            for job in &report.new_jobs {
                println!("    + {job}");
            }
            if report.notify_failures > 0 {
                println!("  Notify errors:  {}", report.notify_failures);
            }
            if !report.saved {
                println!("  Warning: seen jobs were not saved to {}", pipeline.store().path().display());
            }
            println!();
            Ok(ExitCode::SUCCESS)
        }
        RunOutcome::Aborted(reason) => {
            eprintln!("Run aborted: {reason}");
            Ok(ExitCode::from(EXIT_ABORTED))
        }
    }
}

async fn cmd_check(config_path: Option<PathBuf>, all: bool) -> Result<()> {
    let config = resolve_config(config_path)?;
    let pipeline = build_pipeline(&config)?;

    let reporter = CliProgress::new();
    let candidates = pipeline.preview(&reporter).await;
    reporter.finish();
    let candidates = candidates?;

    let relevant = candidates.iter().filter(|c| c.relevance.is_relevant()).count();
    println!();
    println!("  {} jobs on the page, {relevant} relevant", candidates.len());
    println!();

    for candidate in candidates.iter().filter(|c| all || c.relevance.is_relevant()) {
        let status = match (candidate.relevance.is_relevant(), candidate.seen) {
            (true, false) => "NEW ",
            (true, true) => "seen",
            (false, _) => "    ",
        };
        println!("  [{status}] {}  ({})", candidate.job.title, candidate.relevance);
        if candidate.relevance.is_relevant() {
            println!("          {}", candidate.job.apply_link);
        }
    }
    println!();

    Ok(())
}

async fn cmd_watch(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let pipeline = build_pipeline(&config)?;

    println!("Watching {} daily at {}. Press Ctrl+C to stop.", pipeline.url(), config.schedule.time);
    watch(&pipeline, &config.schedule, &SilentProgress).await?;
    Ok(())
}

async fn cmd_notify_test(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let notifier = Notifier::from_config(&config.notify)?;
    if !notifier.is_enabled() {
        bail!(
            "no webhook URL configured: set {} or notify.webhook_url",
            config.notify.webhook_url_env
        );
    }

    let sample = NotificationMessage::new_job(
        &config.site.company,
        JobRecord::new(
            "Electrical Engineer - Test",
            "https://jobs.ashbyhq.com/openai/test-job-001",
            "https://openai.com/careers/test-job-001",
        ),
    );

    notifier.send(&sample).await?;
    println!("Sent sample job notification.");
    notifier.send(&NotificationMessage::NoNewJobs).await?;
    println!("Sent \"no new jobs\" notification.");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config_path)?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn finish(&self) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn done(&self, _outcome: &RunOutcome) {
        self.finish();
    }
}
