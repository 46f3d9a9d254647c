//! MockMate: mock-test scoring and analytics CLI

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use mockmate::analytics::AnalyticsAggregator;
use mockmate::config::{build_ignore_set, load_config, write_starter_config, Config, CONFIG_FILENAME};
use mockmate::history::{
    self, list_history, load_history, load_or_default, save_history, HistorySort, Repository,
};
use mockmate::import::import_path;
use mockmate::reporter::{ConsoleReporter, JsonReporter};
use mockmate::scoring::{score_history, ScoringEngine};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// MockMate: score mock-test attempts and summarize your practice
#[derive(Parser, Debug)]
#[command(name = "mockmate")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file (default: search .mockmaterc.json in current dir and parents)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (debug logging and per-question detail)
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Number of parallel threads for batch scoring (default: number of CPU cores)
    #[arg(long, value_name = "N", global = true)]
    jobs: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score one attempt, or every completed attempt when --attempt is omitted
    Score {
        /// History JSON file with tests, attempts and stats
        #[arg(long)]
        data: PathBuf,

        /// Attempt id to score
        #[arg(long)]
        attempt: Option<String>,

        /// Output format as JSON
        #[arg(long, short)]
        json: bool,

        /// Minimum score percentage (exit 1 if below)
        #[arg(long, short)]
        threshold: Option<f64>,
    },

    /// Show accuracy, trend, engagement, distribution, streak and milestones
    Dashboard {
        #[arg(long)]
        data: PathBuf,

        /// Day to treat as today, YYYY-MM-DD (default: current local day)
        #[arg(long)]
        today: Option<NaiveDate>,

        #[arg(long, short)]
        json: bool,
    },

    /// List completed attempts
    History {
        #[arg(long)]
        data: PathBuf,

        /// Sort key: date, score or name
        #[arg(long, default_value = "date")]
        sort: HistorySort,

        /// Ascending order (default: descending)
        #[arg(long)]
        asc: bool,

        #[arg(long, short)]
        json: bool,
    },

    /// Give an attempt a custom name
    Rename {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        attempt: String,

        #[arg(long)]
        name: String,
    },

    /// Delete an attempt from the history
    Delete {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        attempt: String,
    },

    /// Validate test JSON files and optionally add them to a history file
    Import {
        /// Test file or directory of test files
        path: PathBuf,

        /// History file to add the imported tests to (created if missing)
        #[arg(long)]
        data: Option<PathBuf>,

        #[arg(long, short)]
        json: bool,
    },

    /// Create .mockmaterc.json with sensible defaults
    Init {
        /// Minimum score percentage (e.g. 60)
        #[arg(long)]
        threshold: Option<f64>,

        /// Directory in which to create config (default: current)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::from(2)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn run(args: Args) -> Result<ExitCode> {
    if let Commands::Init { threshold, dir } = &args.command {
        return run_init(*threshold, dir.as_deref());
    }

    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let config = load_config(&cwd, args.config.as_deref())?;

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    match args.command {
        Commands::Score {
            data,
            attempt,
            json,
            threshold,
        } => {
            let config = config.merge_with_cli(threshold);
            run_score(&config, &data, attempt.as_deref(), json, args.verbose)
        }
        Commands::Dashboard { data, today, json } => run_dashboard(&config, &data, today, json),
        Commands::History {
            data,
            sort,
            asc,
            json,
        } => {
            let history = load_history(&data)?;
            let entries = list_history(&history, sort, asc);
            if json {
                println!("{}", JsonReporter::new().pretty().report_history(&entries));
            } else {
                ConsoleReporter::new().report_history(&entries);
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rename {
            data,
            attempt,
            name,
        } => {
            let mut history = load_history(&data)?;
            history::rename_attempt(&mut history, &attempt, &name)?;
            save_history(&data, &history)?;
            println!("{} Renamed {} to {}", "✓".green(), attempt, name.trim().bold());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Delete { data, attempt } => {
            let mut history = load_history(&data)?;
            history::delete_attempt(&mut history, &attempt)?;
            save_history(&data, &history)?;
            println!("{} Deleted {}", "✓".green(), attempt);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Import { path, data, json } => run_import(&config, &path, data.as_deref(), json),
        Commands::Init { .. } => Ok(ExitCode::SUCCESS),
    }
}

fn run_score(
    config: &Config,
    data: &Path,
    attempt_id: Option<&str>,
    json: bool,
    verbose: bool,
) -> Result<ExitCode> {
    let history = load_history(data)?;
    let engine = ScoringEngine::from_config(config);

    let below_threshold = |percentage: f64| {
        config
            .pass_threshold
            .is_some_and(|threshold| percentage < threshold)
    };

    let Some(attempt_id) = attempt_id else {
        let batch = score_history(&engine, &history);
        info!(
            "Scored {} attempts ({} failed)",
            batch.results.len(),
            batch.failures.len()
        );
        if json {
            println!("{}", JsonReporter::new().pretty().report_batch(&batch));
        } else {
            ConsoleReporter::new().report_batch(&batch);
        }
        if !batch.failures.is_empty() {
            return Ok(ExitCode::from(2));
        }
        if batch
            .results
            .values()
            .any(|r| below_threshold(r.score_percentage))
        {
            return Ok(ExitCode::from(1));
        }
        return Ok(ExitCode::SUCCESS);
    };

    let attempt = history
        .attempt_by_id(attempt_id)
        .with_context(|| format!("Attempt not found: {}", attempt_id))?;
    let test = history.test_by_id(&attempt.test_id).with_context(|| {
        format!(
            "Test not found for attempt {}: {}",
            attempt_id, attempt.test_id
        )
    })?;
    let result = engine.compute_attempt_result(test, attempt)?;
    let display_name = attempt.custom_name.as_deref().unwrap_or(&test.name);

    if json {
        println!(
            "{}",
            JsonReporter::new()
                .pretty()
                .report_attempt(display_name, &result)
        );
    } else {
        let mut reporter = ConsoleReporter::new();
        if verbose {
            reporter = reporter.verbose();
        }
        reporter.report_attempt(display_name, &result);
    }

    if below_threshold(result.score_percentage) {
        if !json {
            eprintln!(
                "{}: Score {:.1}% is below threshold {}%",
                "Failed".red().bold(),
                result.score_percentage,
                config.pass_threshold.unwrap_or_default()
            );
        }
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::SUCCESS)
}

fn run_dashboard(
    config: &Config,
    data: &Path,
    today: Option<NaiveDate>,
    json: bool,
) -> Result<ExitCode> {
    let history = load_history(data)?;
    let aggregator = AnalyticsAggregator::from_config(config);
    let today =
        today.unwrap_or_else(|| Utc::now().with_timezone(aggregator.offset()).date_naive());
    debug!("Dashboard for {} (offset {})", today, aggregator.offset());

    let dashboard = aggregator.dashboard(history.user_stats(), history.attempts(), today);
    if json {
        println!("{}", JsonReporter::new().pretty().report_dashboard(&dashboard));
    } else {
        ConsoleReporter::new()
            .with_settings(*history.settings())
            .report_dashboard(&dashboard);
    }
    Ok(ExitCode::SUCCESS)
}

fn run_import(config: &Config, path: &Path, data: Option<&Path>, json: bool) -> Result<ExitCode> {
    if !path.exists() {
        anyhow::bail!("Path not found: {}", path.display());
    }
    let ignore_set = if config.ignore.is_empty() {
        None
    } else {
        Some(build_ignore_set(&config.ignore)?)
    };

    let report = import_path(path, ignore_set.as_ref());
    if report.tests.is_empty() && report.failures.is_empty() {
        eprintln!("{}: No test files found", "Warning".yellow());
        return Ok(ExitCode::from(2));
    }

    if let Some(data) = data {
        let mut history = load_or_default(data)?;
        for test in &report.tests {
            history::add_test(&mut history, test.clone());
        }
        save_history(data, &history)?;
        info!("Added {} tests to {}", report.tests.len(), data.display());
    }

    if json {
        println!("{}", JsonReporter::new().pretty().report_import(&report));
    } else {
        ConsoleReporter::new().report_import(&report);
    }

    if report.is_clean() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(2))
    }
}

fn run_init(threshold: Option<f64>, dir: Option<&Path>) -> Result<ExitCode> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let dir = dir.unwrap_or(&cwd);
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() {
        eprintln!(
            "{}: {} already exists; use --dir to write elsewhere or remove it first",
            "Warning".yellow(),
            config_path.display()
        );
        return Ok(ExitCode::SUCCESS);
    }

    let written = write_starter_config(dir, threshold)?;
    println!("{} Created {}", "✓".green(), written.display());
    Ok(ExitCode::SUCCESS)
}
