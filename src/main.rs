//! @ai:module:intent CLI for the vmbench harness
//! @ai:module:layer presentation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use vmbench::{
    config::{results_path, SessionConfig},
    key::Key,
    metrics::{MetricsAggregator, MetricsAggregatorTrait, SessionResults},
    planner::{get_session_info, SessionInfo},
    report::ReportGenerator,
    runner::{create_executor, RunOptions},
};

#[derive(Parser)]
#[command(name = "vmbench")]
#[command(about = "Run benchmark x VM x variant sessions and collect iteration timings")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a benchmark session
    Run {
        /// Path to the session file
        #[arg(short, long)]
        config: PathBuf,

        /// Log the commands without executing them
        #[arg(long)]
        dry_run: bool,

        /// Results file (defaults to <config>_results.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the planned work for a session
    Info {
        /// Path to the session file
        #[arg(short, long)]
        config: PathBuf,
    },

    /// Check whether a key is skipped by the session's rules
    Check {
        /// Path to the session file
        #[arg(short, long)]
        config: PathBuf,

        /// Key in bench:vm:variant form
        key: String,
    },

    /// Write an example session file
    Init {
        /// Output path for the session file
        #[arg(short, long, default_value = "session.toml")]
        output: PathBuf,
    },

    /// Generate a summary from an existing results file
    Report {
        /// Path to results JSON file
        #[arg(short, long)]
        results: PathBuf,

        /// Output directory for the summary
        #[arg(short, long, default_value = "reports")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("vmbench=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            dry_run,
            output,
        } => run_session(config, dry_run, output),
        Commands::Info { config } => show_info(config),
        Commands::Check { config, key } => check_key(config, &key),
        Commands::Init { output } => init_config(output),
        Commands::Report { results, output } => generate_reports(results, output),
    }
}

/// @ai:intent Load and validate a session file
/// @ai:effects fs:read
fn load_config(path: &Path) -> Result<SessionConfig> {
    SessionConfig::load(path).with_context(|| format!("Failed to load session {}", path.display()))
}

/// @ai:intent Execute a session and write its results next to the config
/// @ai:effects io, fs:write
fn run_session(config_path: PathBuf, dry_run: bool, output: Option<PathBuf>) -> Result<()> {
    let output = match output {
        Some(path) => path,
        None => results_path(&config_path)?,
    };

    let config = load_config(&config_path)?;
    let info = get_session_info(&config)?;
    print_session_info(&info);

    let executor = create_executor(config, RunOptions { dry_run });
    let results = executor.execute_all(&info)?;

    ReportGenerator::new()
        .generate_all(&results, &output)
        .with_context(|| format!("Failed to write results to {}", output.display()))?;

    print_summary(&results);
    println!("Results saved to {}", output.display());
    Ok(())
}

/// @ai:effects fs:read
fn show_info(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)?;
    let info = get_session_info(&config)?;

    print_session_info(&info);
    print_keys("Keys to run", &info.non_skipped_keys);
    print_keys("Skipped keys", &info.skipped_keys);
    Ok(())
}

/// @ai:intent Report whether a key matches any skip rule
/// @ai:effects fs:read
fn check_key(config_path: PathBuf, key: &str) -> Result<()> {
    let config = load_config(&config_path)?;
    let matcher = config.skip_matcher()?;
    let key = Key::parse(key)?;

    match matcher.matching_rule(&key) {
        Some(rule) => println!("{} is skipped by rule {}", key, rule),
        None => println!("{} is not skipped", key),
    }

    Ok(())
}

fn init_config(output: PathBuf) -> Result<()> {
    let config = SessionConfig::example();
    config.save(&output)?;
    println!("Session file saved to {}", output.display());
    Ok(())
}

fn generate_reports(results_path: PathBuf, output_dir: PathBuf) -> Result<()> {
    let results = SessionResults::load(&results_path)
        .with_context(|| format!("Failed to read results {}", results_path.display()))?;

    let summary = ReportGenerator::new().generate_summary(&results, &output_dir)?;

    println!("Summary generated at {}", summary.display());
    Ok(())
}

fn print_session_info(info: &SessionInfo) {
    println!();
    println!("Session");
    println!("=======");
    println!("{:<30} {:>12}", "Keys:", info.total_keys());
    println!("{:<30} {:>12}", "Skipped keys:", info.skipped_keys.len());
    println!("{:<30} {:>12}", "Process executions:", info.n_proc_execs);
    println!("{:<30} {:>12}", "In-process iterations:", info.n_in_proc_iters);
    println!();
}

fn print_keys<'a>(title: &str, keys: impl IntoIterator<Item = &'a Key>) {
    println!("{}:", title);

    for key in keys {
        println!("  {}", key);
    }

    println!();
}

fn print_summary(results: &SessionResults) {
    let summaries = MetricsAggregator::new().summarize(results);

    println!();
    println!("Benchmark Results");
    println!("=================");
    println!();
    println!(
        "{:<40} {:>6} {:>6} {:>12}",
        "Key", "Execs", "Fails", "Mean (s)"
    );
    println!("{}", "-".repeat(67));

    for s in &summaries {
        let mean = s
            .mean
            .map(|m| format!("{:.6}", m))
            .unwrap_or_else(|| "-".to_string());
        println!("{:<40} {:>6} {:>6} {:>12}", s.key.to_string(), s.executions, s.failures, mean);
    }

    println!();

    if results.total_failures() > 0 {
        println!(
            "Warning: {} executions failed, see the results file for diagnostics",
            results.total_failures()
        );
    }
}
