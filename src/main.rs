use anyhow::Context;
use clap::{Parser, Subcommand};
use flowkeeper::app::{handle_fatal_error, init_logging, AppConfig};
use flowkeeper::archive::{HealthChecker, Organizer};
use flowkeeper::config::{load_config, ArchiveConfig};
use flowkeeper::dedupe::Deduplicator;
use flowkeeper::validate::{FileValidation, JsonSchema, QualityChecker, Validator};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Keep a collection of exported workflow JSON files tidy
#[derive(Parser)]
#[command(name = "flowkeeper", version)]
#[command(about = "Deduplicate, organize, scrub and validate n8n workflow exports", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv adds line numbers)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// TOML file overriding categories and credential mappings
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove older copies of workflows that exist more than once
    Dedupe {
        /// Directory to scan for workflow JSON files
        root: PathBuf,

        /// Show what would be removed without touching any file
        #[arg(long)]
        dry_run: bool,
    },
    /// Write scrubbed, categorized workflows and their docs to an archive
    Organize {
        /// Directory containing raw workflow exports
        source: PathBuf,

        /// Archive directory to write into
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Validate workflow files against a JSON Schema
    Validate {
        /// Files or directories to validate
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// JSON Schema to validate against instead of the bundled one
        #[arg(short, long)]
        schema: Option<PathBuf>,
    },
    /// Check an organized archive for missing docs and leftover secrets
    Health {
        /// Archive directory produced by `organize`
        archive: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    let app_config = AppConfig::new(cli.verbose).with_config_path(cli.config.clone());
    init_logging(&app_config);

    match run(cli.command, &app_config) {
        Ok(code) => std::process::exit(code),
        Err(e) => handle_fatal_error(e, app_config.verbose),
    }
}

fn run(command: Commands, app_config: &AppConfig) -> anyhow::Result<i32> {
    let config = load_config(app_config.config_path.as_deref())
        .context("Failed to load archive configuration")?;
    debug!(
        "Using {} categories and {} credential mappings",
        config.categories.len(),
        config.credentials.len()
    );

    match command {
        Commands::Dedupe { root, dry_run } => run_dedupe(&root, dry_run),
        Commands::Organize { source, output } => run_organize(config, &source, &output),
        Commands::Validate { paths, schema } => run_validate(&config, &paths, schema.as_deref()),
        Commands::Health { archive } => run_health(&config, &archive),
    }
}

fn run_dedupe(root: &Path, dry_run: bool) -> anyhow::Result<i32> {
    let deduplicator = Deduplicator::new(root);

    if dry_run {
        let entries = deduplicator
            .scan()
            .with_context(|| format!("Failed to scan {}", root.display()))?;
        let plan = Deduplicator::plan(&entries);

        if plan.is_empty() {
            println!("No duplicates found in {} files", entries.len());
            return Ok(0);
        }

        for group in &plan.groups {
            println!("{}", group.identity);
            println!("  keep   {}", group.survivor.path.display());
            for duplicate in &group.redundant {
                println!("  remove {}", duplicate.path.display());
            }
        }
        println!(
            "\nDry run: {} files would be removed across {} workflows",
            plan.redundant_count(),
            plan.groups.len()
        );
        return Ok(0);
    }

    let report = deduplicator
        .run()
        .with_context(|| format!("Failed to deduplicate {}", root.display()))?;

    println!("Duplicate workflows: {}", report.duplicate_groups);
    println!("Files removed:       {}", report.files_removed);
    println!("Directories pruned:  {}", report.directories_pruned);

    if report.is_clean() {
        Ok(0)
    } else {
        for failure in &report.failures {
            eprintln!("❌ {}: {}", failure.path.display(), failure.error);
        }
        Ok(1)
    }
}

fn run_organize(config: ArchiveConfig, source: &Path, output: &Path) -> anyhow::Result<i32> {
    let organizer = Organizer::new(config, output)?;
    let report = organizer
        .organize(source)
        .with_context(|| format!("Failed to organize {}", source.display()))?;

    for skipped in &report.skipped {
        eprintln!("⚠️  Skipped {}: {}", skipped.path.display(), skipped.error);
    }

    println!(
        "Organized {} workflows into {}",
        report.organized.len(),
        organizer.output().display()
    );
    for (category, count) in report.by_category() {
        println!("  {category}: {count}");
    }
    if report.duplicates_collapsed > 0 {
        println!("Older duplicates ignored: {}", report.duplicates_collapsed);
    }

    Ok(0)
}

fn run_validate(
    config: &ArchiveConfig,
    paths: &[PathBuf],
    schema_path: Option<&Path>,
) -> anyhow::Result<i32> {
    let schema = match schema_path {
        Some(path) => JsonSchema::from_file(path)
            .with_context(|| format!("Failed to load schema {}", path.display()))?,
        None => JsonSchema::workflow().context("Bundled workflow schema is unusable")?,
    };
    let validator = Validator::new(schema, QualityChecker::new(config.sticky_note_type.clone()));

    let (results, summary) = validator.validate_paths(paths);

    for result in &results {
        match result {
            FileValidation::Checked { path, outcome } if outcome.valid => {
                println!("✅ {}", path.display());
                for warning in &outcome.warnings {
                    println!("   ⚠️  {warning}");
                }
            }
            FileValidation::Checked { path, outcome } => {
                println!("❌ {}", path.display());
                for error in &outcome.errors {
                    println!("   {error}");
                }
            }
            FileValidation::Unreadable { path, error } => {
                println!("❌ {}", path.display());
                println!("   {error}");
            }
        }
    }

    println!(
        "\nValidated {} files: {} passed, {} failed, {} with warnings",
        summary.total(),
        summary.valid,
        summary.invalid,
        summary.files_with_warnings()
    );

    Ok(summary.exit_code())
}

fn run_health(config: &ArchiveConfig, archive: &Path) -> anyhow::Result<i32> {
    let report = HealthChecker::new(config)
        .check(archive)
        .with_context(|| format!("Failed to check {}", archive.display()))?;

    for check in &report.checks {
        println!("{check}");
    }
    println!(
        "\nWorkflows: {}  Passed: {}  Failed: {}  Warnings: {}  Success rate: {:.1}%",
        report.total_workflows,
        report.passed(),
        report.failed(),
        report.warnings(),
        report.success_rate()
    );

    Ok(if report.is_healthy() { 0 } else { 1 })
}
