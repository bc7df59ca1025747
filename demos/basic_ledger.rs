//! Basic ledger usage example
//!
//! Run with `RUST_LOG=debug` to see the ledger's own events.

use bookkeeping_core::utils::MemoryStorage;
use bookkeeping_core::{patterns, AccountType, DraftBuilder, Ledger, LedgerConfig};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
[chart]
cash_accounts = ["1000", "1010"]

[limits]
max_account_name_length = 60
max_description_length = 200
"#;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    println!("Bookkeeping Core - Basic Ledger Example\n");

    let config = LedgerConfig::from_toml_str(CONFIG)?;
    let ledger = Ledger::with_config(MemoryStorage::new(), config);

    // 1. Chart of accounts
    println!("Setting up Chart of Accounts...");
    let accounts = ledger.setup_standard_chart_of_accounts().await?;
    let bank = ledger
        .create_account_with_code(
            "1010",
            "Bank",
            AccountType::Asset,
            Some("Business current account".to_string()),
        )
        .await?;

    for account in ledger.list_accounts(None).await? {
        println!(
            "  {:>6}  {:<24} {}",
            account.code_or_empty(),
            account.name,
            account.account_type
        );
    }
    println!();

    // 2. Business transactions
    println!("Recording Business Transactions...\n");
    let jan = |day| NaiveDate::from_ymd_opt(2024, 1, day).unwrap();

    let investment = patterns::owner_investment(
        jan(1),
        "Initial owner investment",
        &bank.id,
        &accounts["owners_capital"].id,
        BigDecimal::from(50000),
    )?;
    ledger.post(investment).await?;
    println!("  Recorded: Owner investment of 50,000");

    let equipment = patterns::asset_purchase(
        jan(5),
        "Office computer and printer",
        &accounts["equipment"].id,
        &bank.id,
        BigDecimal::from(15000),
    )?;
    ledger.post(equipment).await?;
    println!("  Recorded: Equipment purchase of 15,000");

    let stock = patterns::purchase_on_credit(
        jan(8),
        "Stock from wholesaler",
        &accounts["inventory"].id,
        &accounts["accounts_payable"].id,
        BigDecimal::from(6000),
    )?;
    ledger.post(stock).await?;
    println!("  Recorded: Stock bought on credit for 6,000");

    let sale = DraftBuilder::new(jan(10), "Sale of goods")
        .created_by("demo")
        .debit(&accounts["cash"].id, BigDecimal::from(4000), Some("Paid at counter".to_string()))
        .debit(&accounts["accounts_receivable"].id, BigDecimal::from(8000), None)
        .credit(&accounts["sales_revenue"].id, BigDecimal::from(12000), None)
        .build()?;
    ledger.post(sale).await?;
    println!("  Recorded: Sale of 12,000 (4,000 cash, 8,000 on account)");

    let rent = patterns::expense_payment(
        jan(15),
        "Monthly rent payment",
        &accounts["rent_expense"].id,
        &bank.id,
        BigDecimal::from(8000),
    )?;
    ledger.post(rent).await?;
    println!("  Recorded: Rent payment of 8,000");

    // a draft the user forgot to balance never reaches the ledger
    let mistake = DraftBuilder::new(jan(20), "Utilities")
        .debit(&accounts["utilities_expense"].id, BigDecimal::from(500), None)
        .credit(&bank.id, BigDecimal::from(450), None);
    if let Err(err) = ledger.record(mistake.draft()).await {
        println!("  Rejected: {}", err);
    }

    // 3. Reports
    println!("\nGenerating Financial Reports...\n");

    let trial_balance = ledger.trial_balance().await?;
    println!("Trial Balance:");
    for row in &trial_balance.rows {
        println!(
            "  {:<24} {:>10} {:>10}",
            row.name, row.debit, row.credit
        );
    }
    println!(
        "  {:<24} {:>10} {:>10}",
        "Total", trial_balance.total_debit, trial_balance.total_credit
    );
    println!(
        "  Balanced: {}\n",
        if trial_balance.is_balanced() { "Yes" } else { "No" }
    );

    let balance_sheet = ledger.balance_sheet().await?;
    println!("Balance Sheet:");
    for section in balance_sheet
        .assets
        .iter()
        .chain(&balance_sheet.liabilities_and_equity)
    {
        println!("  {}:", section.category);
        for item in &section.items {
            println!("    {}: {}", item.name, item.amount);
        }
        println!("    Total: {}", section.total);
    }
    println!("  Total Assets: {}", balance_sheet.total_assets);
    println!(
        "  Total Liabilities & Equity: {}",
        balance_sheet.total_liabilities_and_equity
    );
    println!("  Unclosed result: {}\n", balance_sheet.difference());

    let income_statement = ledger.profit_and_loss_for_period(jan(1), jan(31)).await?;
    println!("Profit & Loss for January 2024:");
    println!("  Revenue:  {}", income_statement.total_revenue);
    println!("  Expenses: {}", income_statement.total_expenses);
    println!("  Net Income: {}\n", income_statement.net_income);

    let cash_flow = ledger.cash_flow(jan(1), jan(31)).await?;
    println!("Cash Flow for January 2024:");
    println!("  Operating: {}", cash_flow.net_operating_cash_flow);
    println!("  Investing: {}", cash_flow.net_investing_cash_flow);
    println!("  Financing: {}", cash_flow.net_financing_cash_flow);
    println!("  Net:       {}\n", cash_flow.net_cash_flow);

    let integrity = ledger.verify_integrity().await?;
    if integrity.is_valid {
        println!("Ledger integrity check passed");
    } else {
        for issue in &integrity.issues {
            println!("  Issue: {}", issue);
        }
    }

    println!("\nJSON trial balance:");
    println!("{}", serde_json::to_string_pretty(&trial_balance)?);

    Ok(())
}
