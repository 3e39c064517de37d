//! cms-migrate CLI - batch migration of legacy CMS content.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use cms_migrate::config::validate;
use cms_migrate::{
    cleanup, source, CleanupRunner, Config, Entity, MemoryStore, MigrateError, MigrationRunner,
    Reporter, RunSummary,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser)]
#[command(name = "cms-migrate")]
#[command(about = "Batch migration of legacy CMS content into a destination store")]
#[command(version)]
struct Cli {
    /// Path to YAML configuration file with source credentials
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Output JSON summary to stdout
    #[arg(long)]
    output_json: bool,

    /// Log format: text or json
    #[arg(long, default_value = "text")]
    log_format: String,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info")]
    verbosity: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate one entity type from the legacy source
    Migrate {
        /// Entity to migrate
        #[arg(value_enum)]
        entity: EntityArg,

        /// Simulate only: report intended actions without writing
        #[arg(long, num_args = 0..=1, action = ArgAction::Set,
              default_value_t = true, default_missing_value = "true")]
        dry_run: bool,

        /// Mirror log lines to the console
        #[arg(long, num_args = 0..=1, action = ArgAction::Set,
              default_value_t = false, default_missing_value = "true")]
        logs: bool,

        /// Source offset to start from
        #[arg(long, default_value_t = 0)]
        offset: u64,

        /// Rows per page (must be greater than zero)
        #[arg(long, default_value_t = 200)]
        batch: u64,

        /// Stop after this many pages (for chunked, resumable runs)
        #[arg(long)]
        batch_limit: Option<u32>,

        /// Path to the log file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Delete migration artifacts (always asks for confirmation)
    Cleanup {
        /// Simulate only: report what would be deleted
        #[arg(long, num_args = 0..=1, action = ArgAction::Set,
              default_value_t = true, default_missing_value = "true")]
        dry_run: bool,

        /// Path to the log file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EntityArg {
    Article,
    Category,
    User,
}

impl From<EntityArg> for Entity {
    fn from(value: EntityArg) -> Self {
        match value {
            EntityArg::Article => Entity::Article,
            EntityArg::Category => Entity::Category,
            EntityArg::User => Entity::User,
        }
    }
}

/// Asks the operator on stdin. Anything but an explicit yes is a refusal,
/// EOF included, so non-interactive invocations never delete.
fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} ");
    io::stdout().flush().ok();

    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(n) if n > 0 => matches!(line.trim(), "y" | "Y" | "yes"),
        _ => false,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.format_detailed());
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> Result<(), MigrateError> {
    let cli = Cli::parse();

    setup_logging(&cli.verbosity, &cli.log_format)
        .map_err(MigrateError::Config)?;

    // A missing config file is fine: it means no source credentials, and the
    // engine runs against the inert connector.
    let mut config = if cli.config.exists() {
        let loaded = Config::load(&cli.config)?;
        info!("loaded configuration from {:?}", cli.config);
        loaded
    } else {
        info!("no configuration file at {:?}, source is inert", cli.config);
        Config::default()
    };

    match cli.command {
        Commands::Migrate {
            entity,
            dry_run,
            logs,
            offset,
            batch,
            batch_limit,
            log_file,
        } => {
            config.migration.dry_run = dry_run;
            config.migration.logs = logs;
            config.migration.offset = offset;
            config.migration.batch = batch;
            config.migration.batch_limit = batch_limit;
            if log_file.is_some() {
                config.migration.log_file = log_file;
            }
            validate(&config)?;

            let connector = source::connect(&config.source).await?;
            let store = Arc::new(MemoryStore::new());
            let reporter = Reporter::new(
                config.migration.log_file.as_deref(),
                config.migration.logs,
            )?;

            let runner = MigrationRunner::new(
                config.migration,
                entity.into(),
                connector,
                store,
                reporter,
            );
            let summary = runner.run().await?;

            if cli.output_json {
                println!("{}", summary.to_json()?);
            } else {
                print_summary(&summary);
            }
        }

        Commands::Cleanup { dry_run, log_file } => {
            validate(&config)?;

            let store = Arc::new(MemoryStore::new());
            // Cleanup needs operator interaction, so console output is
            // always on here.
            let reporter = Reporter::new(log_file.as_deref(), true)?;

            let runner = CleanupRunner::new(store, reporter, dry_run);
            let summary = runner
                .run(&cleanup::default_targets(), &mut confirm_on_stdin)
                .await?;

            if cli.output_json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let status_msg = if summary.dry_run {
        "Dry run completed!"
    } else {
        "Migration completed!"
    };
    println!("\n{}", status_msg);
    println!("  Run ID: {}", summary.run_id);
    println!("  Entity: {}", summary.entity);
    println!("  Duration: {:.2}s", summary.duration_seconds);
    println!(
        "  Found: {}  Added: {}  Updated: {}  Skipped: {}  Failed: {}",
        summary.counters.found,
        summary.counters.added,
        summary.counters.updated,
        summary.counters.skipped,
        summary.counters.failed
    );
    println!("  Next offset: {}", summary.next_offset);
}

fn setup_logging(verbosity: &str, format: &str) -> Result<(), String> {
    let level = match verbosity.to_lowercase().as_str() {
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false);

    if format == "json" {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
