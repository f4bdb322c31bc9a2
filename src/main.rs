// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use family_budget::finance::{format_inr, loan_quote, BudgetRule};
use family_budget::pages::banking::LoanType;
use family_budget::pages::schemes::{eligible, EligibilityQuery};
use family_budget::pages::{seed_all, FinancialSummary};
use family_budget::{init_logging, AppConfig, LocalStore};
use std::fs::File;
use std::path::PathBuf;
use tracing::info;

const DEFAULT_TUI_LOG: &str = "family-budget.log";

#[derive(Debug, Parser)]
#[command(
    name = "family-budget",
    about = "Household budgeting dashboard for Indian families",
    version
)]
struct Cli {
    /// SQLite file holding the local store (`:memory:` for a throwaway session)
    #[arg(long, global = true, env = "BUDGET_DB")]
    db: Option<String>,

    /// Tracing filter, e.g. `family_budget=debug`
    #[arg(long, global = true, env = "BUDGET_LOG")]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Interactive terminal dashboard (default).
    Tui,

    /// Print this month's printable summary.
    Summary(SummaryArgs),

    /// Loan EMI calculator.
    Emi(EmiArgs),

    /// Government schemes you may be eligible for.
    Schemes(SchemeArgs),

    /// Split a monthly income by a needs/wants/savings rule.
    Split(SplitArgs),

    /// Overwrite every page with sample data.
    Seed,

    /// Erase every stored key (the audit log is kept).
    Reset,
}

#[derive(Debug, Args)]
struct SummaryArgs {
    /// Also write the month's expense lines as CSV
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct EmiArgs {
    #[arg(long)]
    principal: f64,
    /// Annual interest rate in percent; defaults to the loan type's rate
    #[arg(long)]
    rate: Option<f64>,
    #[arg(long, default_value_t = 12)]
    months: u32,
    /// home, car, personal, education or gold
    #[arg(long, default_value = "personal")]
    loan_type: String,
}

#[derive(Debug, Args)]
struct SchemeArgs {
    #[arg(long)]
    income: f64,
    #[arg(long)]
    state: String,
    #[arg(long)]
    category: Option<String>,
}

#[derive(Debug, Args)]
struct SplitArgs {
    #[arg(long)]
    income: f64,
    #[arg(long, default_value_t = 50.0)]
    needs: f64,
    #[arg(long, default_value_t = 30.0)]
    wants: f64,
    #[arg(long, default_value_t = 20.0)]
    savings: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env();
    if let Some(db) = &cli.db {
        config.db_path = (db != ":memory:").then(|| PathBuf::from(db));
    }
    if let Some(filter) = &cli.log {
        config.log_filter = filter.clone();
    }

    let command = cli.command.unwrap_or(Commands::Tui);

    // The TUI owns the terminal, so its logs always go to a file
    let log_file = match (&command, &config.log_file) {
        (_, Some(path)) => Some(path.clone()),
        (Commands::Tui, None) => Some(PathBuf::from(DEFAULT_TUI_LOG)),
        _ => None,
    };
    init_logging(&config.log_filter, log_file.as_deref())?;

    match command {
        Commands::Tui => run_ui_mode(&config),
        Commands::Summary(args) => run_summary(&config, args),
        Commands::Emi(args) => run_emi(args),
        Commands::Schemes(args) => run_schemes(args),
        Commands::Split(args) => run_split(args),
        Commands::Seed => {
            let store = open_store(&config)?;
            seed_all(&store)?;
            println!("✓ Sample data written for every page");
            Ok(())
        }
        Commands::Reset => {
            let store = open_store(&config)?;
            let removed = store.clear()?;
            println!("✓ Cleared {} stored keys", removed);
            Ok(())
        }
    }
}

fn open_store(config: &AppConfig) -> Result<LocalStore> {
    let store = match &config.db_path {
        Some(path) => LocalStore::open(path)
            .with_context(|| format!("failed to open store at {}", path.display()))?,
        None => LocalStore::open_in_memory()?,
    };
    Ok(store)
}

fn run_summary(config: &AppConfig, args: SummaryArgs) -> Result<()> {
    let store = open_store(config)?;
    let today = chrono::Local::now().date_naive();
    let summary = FinancialSummary::from_store(&store, today)?;

    print!("{}", summary.render_text());

    if let Some(path) = args.csv {
        let file = File::create(&path).with_context(|| format!("failed to create {}", path.display()))?;
        summary.write_csv(file)?;
        info!(path = %path.display(), "summary CSV written");
        println!("\n✓ Expense lines written to {}", path.display());
    }
    Ok(())
}

fn run_emi(args: EmiArgs) -> Result<()> {
    let loan_type = parse_loan_type(&args.loan_type)
        .with_context(|| format!("unknown loan type `{}`", args.loan_type))?;
    let rate = args.rate.unwrap_or(loan_type.annual_rate());
    let quote = loan_quote(args.principal, rate, args.months);

    println!("💰 EMI Calculator ({:?} loan)", loan_type);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Principal       {:>16}", format_inr(quote.principal));
    println!("  Rate            {:>15.2}%", quote.annual_rate);
    println!("  Tenure          {:>10} months", quote.tenure_months);
    println!("  Monthly EMI     {:>16}", format_inr(quote.emi));
    println!("  Total interest  {:>16}", format_inr(quote.total_interest));
    println!("  Total payment   {:>16}", format_inr(quote.total_payment));
    Ok(())
}

fn parse_loan_type(name: &str) -> Option<LoanType> {
    match name.trim().to_ascii_lowercase().as_str() {
        "home" => Some(LoanType::Home),
        "car" => Some(LoanType::Car),
        "personal" => Some(LoanType::Personal),
        "education" => Some(LoanType::Education),
        "gold" => Some(LoanType::Gold),
        _ => None,
    }
}

fn run_schemes(args: SchemeArgs) -> Result<()> {
    let query = EligibilityQuery {
        annual_income: args.income,
        state: args.state,
        category: args.category,
    };
    let schemes = eligible(&query)?;

    println!(
        "🏛️  {} schemes for {} / {}",
        schemes.len(),
        format_inr(query.annual_income),
        query.state
    );
    for s in schemes {
        println!("  • {} [{}]: {}", s.name, s.category, s.benefit);
    }
    Ok(())
}

fn run_split(args: SplitArgs) -> Result<()> {
    let rule = BudgetRule::new(args.needs, args.wants, args.savings)?;
    let split = rule.split(args.income);

    println!("📊 {}/{}/{} split of {}", rule.needs, rule.wants, rule.savings, format_inr(args.income));
    println!("  Needs    {:>14}", format_inr(split.needs));
    println!("  Wants    {:>14}", format_inr(split.wants));
    println!("  Savings  {:>14}", format_inr(split.savings));
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: &AppConfig) -> Result<()> {
    let store = open_store(config)?;
    let today = chrono::Local::now().date_naive();

    let mut app = ui::App::new(store, today)?;
    ui::run_ui(&mut app)?;

    println!("✅ See you next time");
    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: &AppConfig) -> Result<()> {
    anyhow::bail!(
        "TUI mode not available; rebuild with `--features tui` or run the web server with `--features server`"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["family-budget", "emi", "--principal", "500000", "--months", "240"]).unwrap();
        match cli.command {
            Some(Commands::Emi(args)) => {
                assert_eq!(args.principal, 500000.0);
                assert_eq!(args.months, 240);
                assert_eq!(args.loan_type, "personal");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = Cli::try_parse_from(["family-budget"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_summary_csv_flag() {
        let cli = Cli::try_parse_from(["family-budget", "--db", ":memory:", "summary", "--csv", "out.csv"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some(":memory:"));
        match cli.command {
            Some(Commands::Summary(args)) => assert_eq!(args.csv, Some(PathBuf::from("out.csv"))),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_loan_type_names() {
        assert_eq!(parse_loan_type(" Home "), Some(LoanType::Home));
        assert_eq!(parse_loan_type("boat"), None);
    }
}
