//! # Presswork Backoffice CLI
//!
//! Runs the periodic jobs of the back-office engine:
//!
//! - `sweep` - the daily recurring-expense pass: materializes due
//!   occurrences, advances templates and emits reminders
//! - `reconcile` - recomputes order totals (one order or all), settling
//!   any drift left behind by best-effort recomputes

use chrono::{NaiveDate, Utc};
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use backoffice::{AppConfig, ExpenseService, OrderService};
use presswork_db::{Database, DbConfig};

enum Command {
    Sweep { as_of: Option<NaiveDate> },
    Reconcile { order_id: Option<String> },
    Help,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let command = parse_args(env::args().skip(1).collect())?;
    if matches!(command, Command::Help) {
        print_help();
        return Ok(());
    }

    // Load configuration
    let config = AppConfig::load()?;
    info!(db = %config.database_path, "Configuration loaded");

    // Connect to database (runs migrations)
    let db = Database::new(
        DbConfig::new(&config.database_path).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database ready");

    match command {
        Command::Sweep { as_of } => run_sweep(&db, &config, as_of).await?,
        Command::Reconcile { order_id } => run_reconcile(&db, order_id).await?,
        Command::Help => unreachable!(),
    }

    db.close().await;
    Ok(())
}

async fn run_sweep(
    db: &Database,
    config: &AppConfig,
    as_of: Option<NaiveDate>,
) -> Result<(), Box<dyn std::error::Error>> {
    let today = as_of.unwrap_or_else(|| Utc::now().date_naive());
    info!(%today, "Running recurring expense sweep");

    let service = ExpenseService::new(db.clone()).with_reminders(config.reminders_enabled);
    let report = service.run_recurring_sweep(today).await?;

    println!("Sweep report ({}):", today);
    println!("  templates scanned:    {}", report.scanned);
    println!("  occurrences created:  {}", report.occurrences_created);
    println!("  reminders sent:       {}", report.reminders_sent);
    println!("  failures:             {}", report.errors.len());
    for failure in &report.errors {
        println!("    {} - {}", failure.expense_id, failure.message);
        error!(expense_id = %failure.expense_id, message = %failure.message, "Sweep failure");
    }

    Ok(())
}

async fn run_reconcile(
    db: &Database,
    order_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = OrderService::new(db.clone());

    let order_ids = match order_id {
        Some(id) => vec![id],
        None => db.orders().list_ids().await?,
    };
    info!(count = order_ids.len(), "Reconciling order totals");

    let mut settled = 0usize;
    let mut failed = 0usize;
    for id in &order_ids {
        match service.recompute_totals(id).await {
            outcome if outcome.is_done() => settled += 1,
            outcome => {
                failed += 1;
                println!("  {} - {}", id, outcome.failure().unwrap_or("unknown failure"));
            }
        }
    }

    println!("Reconciled {} orders ({} failed)", settled, failed);
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Command, Box<dyn std::error::Error>> {
    let Some(subcommand) = args.first() else {
        return Ok(Command::Help);
    };

    match subcommand.as_str() {
        "sweep" => {
            let mut as_of = None;
            let mut i = 1;
            while i < args.len() {
                if args[i] == "--date" && i + 1 < args.len() {
                    as_of = Some(NaiveDate::parse_from_str(&args[i + 1], "%Y-%m-%d")?);
                    i += 1;
                }
                i += 1;
            }
            Ok(Command::Sweep { as_of })
        }
        "reconcile" => {
            let mut order_id = None;
            let mut i = 1;
            while i < args.len() {
                if args[i] == "--order" && i + 1 < args.len() {
                    order_id = Some(args[i + 1].clone());
                    i += 1;
                }
                i += 1;
            }
            Ok(Command::Reconcile { order_id })
        }
        _ => Ok(Command::Help),
    }
}

fn print_help() {
    println!("Presswork Backoffice");
    println!();
    println!("Usage: backoffice <COMMAND>");
    println!();
    println!("Commands:");
    println!("  sweep [--date YYYY-MM-DD]   Run the recurring expense sweep");
    println!("  reconcile [--order <ID>]    Recompute order totals (all orders by default)");
    println!();
    println!("Environment:");
    println!("  PRESSWORK_DB_PATH              Database file (default: ./presswork.db)");
    println!("  PRESSWORK_DB_MAX_CONNECTIONS   Pool size (default: 5)");
    println!("  PRESSWORK_REMINDERS_ENABLED    Sweep reminders (default: true)");
    println!("  RUST_LOG                       Tracing filter (default: info)");
}
