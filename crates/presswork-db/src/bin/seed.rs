//! # Seed Data Generator
//!
//! Populates the database with development data: a client book, ledger
//! accounts with allocation rules, a material purchase and a couple of
//! recurring expense templates.
//!
//! ## Usage
//! ```bash
//! cargo run -p presswork-db --bin seed
//!
//! # Specify database path
//! cargo run -p presswork-db --bin seed -- --db ./data/presswork.db
//! ```

use chrono::{Datelike, NaiveDate, Utc};
use std::env;
use uuid::Uuid;

use presswork_core::profit::ProfitSettings;
use presswork_core::recurrence::{Recurrence, RecurrenceFrequency, RecurrenceRule};
use presswork_core::{
    Account, AccountType, AllocationRule, Client, Expense, MaterialPurchase, PaymentStatus,
    SourceType,
};
use presswork_db::{Database, DbConfig};

const CLIENTS: &[(&str, &str)] = &[
    ("Mehran Traders", "0300-1234567"),
    ("City School Campus II", "021-3456789"),
    ("Kashif Electronics", "0333-9876543"),
    ("Alamgir Welfare Trust", "021-6543210"),
    ("Decent Caterers", "0301-1112223"),
];

const ACCOUNTS: &[(&str, AccountType)] = &[
    ("Owner Draw", AccountType::Profit),
    ("Reinvestment", AccountType::Profit),
    ("Tax Reserve", AccountType::Custom),
    ("Wages Pool", AccountType::Labor),
    ("Operating", AccountType::Revenue),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./presswork_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Presswork Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./presswork_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Presswork Seed Data Generator");
    println!("=============================");
    println!("Database: {}", db_path);
    println!();

    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.clients().list_active().await?;
    if !existing.is_empty() {
        println!("⚠ Database already has {} clients", existing.len());
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();
    let today = now.date_naive();

    // Clients
    for (name, phone) in CLIENTS {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: Some(phone.to_string()),
            email: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.clients().insert(&client).await?;
    }
    println!("✓ Seeded {} clients", CLIENTS.len());

    // Accounts + allocation rules for profit
    let mut account_ids = Vec::new();
    for (name, account_type) in ACCOUNTS {
        let account = Account {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            account_type: *account_type,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.accounts().insert(&account).await?;
        account_ids.push(account.id);
    }
    println!("✓ Seeded {} accounts", ACCOUNTS.len());

    // 50% owner draw, 30% reinvestment, 15% tax reserve (5% unallocated)
    for (account_id, bps) in account_ids.iter().zip([5000_i64, 3000, 1500]) {
        let rule = AllocationRule {
            id: Uuid::new_v4().to_string(),
            source_type: SourceType::Profit,
            account_id: account_id.clone(),
            percent_bps: bps,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.allocation_rules().insert(&rule).await?;
    }
    println!("✓ Seeded profit allocation rules (95% allocated)");

    // A partially paid material purchase, ready for an installment plan
    let purchase = MaterialPurchase {
        id: Uuid::new_v4().to_string(),
        supplier_name: "Karachi Paper Mart".to_string(),
        material_name: "80gsm offset paper (reams)".to_string(),
        purchase_date: today,
        quantity: 200,
        unit_price_cents: 1_250,
        total_cents: 250_000,
        paid_cents: 50_000,
        payment_status: PaymentStatus::PartiallyPaid,
        created_at: now,
        updated_at: now,
    };
    db.purchases().insert(&purchase).await?;
    println!("✓ Seeded material purchase ({})", purchase.supplier_name);

    // Recurring expense templates
    let rent = Expense {
        id: Uuid::new_v4().to_string(),
        category: "rent".to_string(),
        item_name: "Shop rent".to_string(),
        expense_date: today,
        total_cents: 4_500_000,
        paid_cents: 0,
        payment_status: PaymentStatus::Unpaid,
        is_recurring: true,
        recurrence_json: Some(serde_json::to_string(&Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(1),
        })?),
        recurrence_end_date: None,
        next_occurrence_date: NaiveDate::from_ymd_opt(today.year(), today.month(), 1),
        reminder_days: Some(3),
        created_at: now,
        updated_at: now,
    };
    db.expenses().insert(&rent).await?;

    let internet = Expense {
        id: Uuid::new_v4().to_string(),
        category: "utilities".to_string(),
        item_name: "Internet".to_string(),
        expense_date: today,
        total_cents: 350_000,
        paid_cents: 0,
        payment_status: PaymentStatus::Unpaid,
        is_recurring: true,
        recurrence_json: Some(serde_json::to_string(&Recurrence {
            frequency: RecurrenceFrequency::Monthly,
            rule: RecurrenceRule::DayOfMonth(15),
        })?),
        recurrence_end_date: None,
        next_occurrence_date: NaiveDate::from_ymd_opt(today.year(), today.month(), 15),
        reminder_days: Some(2),
        created_at: now,
        updated_at: now,
    };
    db.expenses().insert(&internet).await?;
    println!("✓ Seeded 2 recurring expense templates");

    // Default profit settings (30% on unit price, labor off)
    db.profit_settings()
        .save(&ProfitSettings::default())
        .await?;
    println!("✓ Seeded profit settings");

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
