//! PMD History Miner - run PMD over every commit of a git repository
//!
//! # Usage
//! ```bash
//! pmd-history /path/to/repository --ruleset rules.xml
//! pmd-history https://github.com/org/project.git --ruleset rules.xml --max-commits 50
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pmd_history::analyzer::{PmdInstallation, PmdRunner};
use pmd_history::config::{CliOverrides, MinerConfig};
use pmd_history::git::{GitRepository, RepoSource, VersionControlSource};
use pmd_history::models::SkippedCommit;
use pmd_history::output::OutputStore;
use pmd_history::pipeline::{Pipeline, PipelineOptions};
use pmd_history::progress::Progress;
use pmd_history::report::format_summary;
use pmd_history::stats;

/// PMD History Miner - static analysis warnings across a repository's history
#[derive(Parser)]
#[command(name = "pmd-history")]
#[command(about = "Run PMD on every commit of a git repository", long_about = None)]
struct Cli {
    /// Local path or remote URL (http://, https://, git@) of the repository
    #[arg(value_name = "REPOSITORY")]
    repository: String,

    /// Directory for per-commit artifacts and the summary
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// PMD ruleset file
    #[arg(short, long)]
    ruleset: Option<PathBuf>,

    /// Analyze at most this many commits, oldest first
    #[arg(short, long)]
    max_commits: Option<usize>,

    /// PMD release to look up in the cache directory
    #[arg(long)]
    pmd_version: Option<String>,

    /// Existing PMD installation to use instead of the cache directory
    #[arg(long)]
    pmd_path: Option<PathBuf>,

    /// Require an existing PMD installation
    #[arg(long)]
    skip_download: bool,

    /// Per-commit analyzer timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Verbose logging (disables the progress bar)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            output_dir: self.output_dir.clone(),
            ruleset: self.ruleset.clone(),
            max_commits: self.max_commits,
            pmd_version: self.pmd_version.clone(),
            pmd_path: self.pmd_path.clone(),
            skip_download: self.skip_download.then_some(true),
            verbose: self.verbose.then_some(true),
            analyzer_timeout_secs: self.timeout,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("✗ {e:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "warn,pmd_history=debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = MinerConfig::load(&cli.overrides()).context("Invalid configuration")?;
    init_tracing(config.verbose);

    let installation =
        PmdInstallation::locate(&config.pmd_options()).context("PMD is not available")?;
    let runner = PmdRunner::new(installation, config.analyzer_timeout())?;
    runner.check_java().context("Java check failed")?;

    let source = RepoSource::parse(&cli.repository);
    let location = match &source {
        RepoSource::Local(path) => std::fs::canonicalize(path)
            .unwrap_or_else(|_| path.clone())
            .to_string_lossy()
            .to_string(),
        RepoSource::Remote(url) => url.clone(),
    };
    let mut repo = GitRepository::open(source)
        .with_context(|| format!("Failed to open repository {}", cli.repository))?;

    let outcome = mine(&mut repo, &runner, &config, &location);
    if let Err(e) = repo.cleanup() {
        tracing::warn!("Failed to restore repository state: {}", e);
    }
    outcome
}

fn mine(
    repo: &mut GitRepository,
    runner: &PmdRunner,
    config: &MinerConfig,
    location: &str,
) -> anyhow::Result<()> {
    let commits = repo
        .list_commits(config.max_commits)
        .context("Failed to list commits")?;
    let store = OutputStore::create(&config.output_dir).with_context(|| {
        format!(
            "Failed to create output directory {}",
            config.output_dir.display()
        )
    })?;
    let options = PipelineOptions {
        ruleset: resolve_ruleset(config.ruleset()?),
        survey: config.survey_options(),
    };

    println!();
    println!("  Repository: {}", location);
    println!("  PMD:        {}", runner.installation().home.display());
    println!("  Commits:    {}", commits.len());
    println!();

    let started = Instant::now();
    let progress = Progress::bar(commits.len() as u64, !config.verbose);
    let acc = Pipeline::new(repo, runner, &store, &options).run(&commits, &progress);
    progress.finish("done");
    let elapsed = started.elapsed();

    let summary = stats::summarize(&acc.results);
    let report = format_summary(location, &summary, Utc::now());
    store.write_summary(&report).context("Failed to write summary")?;
    store
        .write_skipped(&acc.skipped)
        .context("Failed to write skipped commit list")?;

    print_run_report(acc.results.len(), &acc.skipped, elapsed, store.root());
    Ok(())
}

/// Existing ruleset files are passed to PMD as absolute paths; anything else
/// (such as a built-in `category/java/...` reference) is passed through.
fn resolve_ruleset(ruleset: &Path) -> PathBuf {
    std::fs::canonicalize(ruleset).unwrap_or_else(|_| ruleset.to_path_buf())
}

fn print_run_report(
    processed: usize,
    skipped: &[SkippedCommit],
    elapsed: std::time::Duration,
    output: &Path,
) {
    println!();
    println!("  Processed:  {}", processed);
    println!("  Skipped:    {}", skipped.len());
    for entry in skipped {
        println!("    {}  {}", entry.commit, entry.error);
    }
    println!("  Elapsed:    {:.1}s", elapsed.as_secs_f64());
    if processed > 0 {
        println!(
            "  Per commit: {:.2}s",
            elapsed.as_secs_f64() / processed as f64
        );
    }
    println!("  Output:     {}", output.display());
    println!();
}
