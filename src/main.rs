use clap::{Parser, Subcommand};
use debtor_risk_lib::commands::db::{self, SqliteDebtorStore};
use debtor_risk_lib::commands::report;
use debtor_risk_lib::commands::scoring::run_risk_pass;
use debtor_risk_lib::commands::settings::AppConfig;
use debtor_risk_lib::error::{RiskError, StoreError};
use debtor_risk_lib::models::debtor::{CollectionStatus, NewDebtor};
use std::path::PathBuf;

const EXIT_SUCCESS: i32 = 0;
const EXIT_CONNECTION: i32 = 1;
const EXIT_QUERY: i32 = 2;
const EXIT_ROLLED_BACK: i32 = 3;
const EXIT_CONFIG: i32 = 4;
const EXIT_NOT_FOUND: i32 = 5;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recompute risk scores and priority tiers for every debtor (default)
    Run,
    /// Create the database file if needed and apply schema migrations
    Init,
    /// Register a new debtor with a pending priority
    Add {
        #[arg(long)]
        name: String,
        /// Amount owed
        #[arg(long)]
        debt: f64,
        #[arg(long)]
        days_overdue: u32,
    },
    /// List debtors by priority, most urgent first
    List,
    /// Update the collection status of a debtor
    SetStatus {
        id: i64,
        /// not-contacted | contacted | in-progress | paid
        status: CollectionStatus,
    },
    /// Show portfolio statistics
    Stats,
}

#[derive(Parser, Debug)]
#[command(name = "risk-calculator")]
#[command(about = "Debtor collection risk scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the debtor database (overrides DB_PATH)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    /// Print the run report as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(err) => {
            let err = RiskError::from(err);
            eprintln!("{}", report::format_failure(&err));
            std::process::exit(exit_code(&err));
        }
    };
    init_logging(config.environment.default_log_filter(), cli.verbose);

    let config = match cli.database {
        Some(path) => config.with_database(path),
        None => config,
    };

    let outcome = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run(&config, cli.json),
        Commands::Init => init(&config),
        Commands::Add {
            name,
            debt,
            days_overdue,
        } => add(
            &config,
            NewDebtor {
                name,
                debt_amount: debt,
                days_overdue,
            },
        ),
        Commands::List => list(&config),
        Commands::SetStatus { id, status } => set_status(&config, id, status),
        Commands::Stats => stats(&config),
    };

    match outcome {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(err) => {
            log::error!("{err}");
            eprintln!("{}", report::format_failure(&err));
            std::process::exit(exit_code(&err));
        }
    }
}

fn init_logging(default_filter: &str, verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.format_timestamp_secs().init();
}

fn run(config: &AppConfig, json: bool) -> Result<(), RiskError> {
    if !json {
        let executed_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        println!("{}", report::format_banner(&executed_at));
    }

    let result = run_risk_pass(&config.store, |scored| {
        if !json {
            println!("{}", report::format_record_line(scored));
        }
    })?;

    if json {
        let raw = serde_json::to_string_pretty(&result)?;
        println!("{raw}");
        return Ok(());
    }

    println!("\nSuccessfully updated {} debtors\n", result.updated_count);
    println!("{}", report::format_summary_table(&result.summary));
    Ok(())
}

fn init(config: &AppConfig) -> Result<(), RiskError> {
    let store = SqliteDebtorStore::open(&config.store.path, true).map_err(|source| {
        RiskError::Connection {
            database: config.store.to_string(),
            source,
        }
    })?;
    close(store);
    println!("Debtor database ready at {}", config.store.path.display());
    Ok(())
}

fn add(config: &AppConfig, debtor: NewDebtor) -> Result<(), RiskError> {
    let store = open(config)?;
    let id = db::insert_debtor(store.connection(), &debtor)
        .map_err(|err| RiskError::Query(err.into()))?;
    close(store);
    println!("Registered debtor {id} ({})", debtor.name);
    Ok(())
}

fn list(config: &AppConfig) -> Result<(), RiskError> {
    let store = open(config)?;
    let rows = db::list_debtors(store.connection()).map_err(RiskError::Query)?;
    close(store);
    println!("{}", report::format_debtor_list(&rows));
    Ok(())
}

fn set_status(config: &AppConfig, id: i64, status: CollectionStatus) -> Result<(), RiskError> {
    let store = open(config)?;
    let outcome = db::set_collection_status(store.connection(), id, status);
    close(store);
    outcome.map_err(|err| match err {
        StoreError::UnknownDebtor(id) => RiskError::NotFound(id),
        other => RiskError::Query(other),
    })?;
    println!("Debtor {id} status set to {status}");
    Ok(())
}

fn stats(config: &AppConfig) -> Result<(), RiskError> {
    let store = open(config)?;
    let statistics = db::portfolio_statistics(store.connection())
        .map_err(|err| RiskError::Query(err.into()))?;
    close(store);
    println!("{}", report::format_statistics(&statistics));
    Ok(())
}

fn open(config: &AppConfig) -> Result<SqliteDebtorStore, RiskError> {
    SqliteDebtorStore::open(&config.store.path, config.store.create_if_missing).map_err(|source| {
        RiskError::Connection {
            database: config.store.to_string(),
            source,
        }
    })
}

fn close(store: SqliteDebtorStore) {
    if let Err(err) = store.close() {
        log::warn!("failed to close debtor database cleanly: {err}");
    }
}

fn exit_code(err: &RiskError) -> i32 {
    match err {
        RiskError::Config(_) => EXIT_CONFIG,
        RiskError::Connection { .. } => EXIT_CONNECTION,
        RiskError::Fetch(_)
        | RiskError::Summary { .. }
        | RiskError::Query(_)
        | RiskError::Render(_) => EXIT_QUERY,
        RiskError::Transaction(_) | RiskError::Update { .. } | RiskError::Commit { .. } => {
            EXIT_ROLLED_BACK
        }
        RiskError::NotFound(_) => EXIT_NOT_FOUND,
    }
}
