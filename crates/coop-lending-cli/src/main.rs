mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::{
    EligibilityArgs, FundsArgs, InterestArgs, PaymentArgs, QuoteArgs, TenureArgs, ThriftArgs,
};
use commands::schedule::ScheduleArgs;

/// Cooperative credit society loan calculations
#[derive(Parser)]
#[command(
    name = "coopl",
    version,
    about = "Cooperative credit society loan calculations",
    long_about = "A CLI for the society's lending arithmetic with decimal precision. \
                  Supports level-payment quotes, loan tenure, monthly interest, \
                  collateral fund requirements and month-by-month repayment schedules."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Bank settings file (JSON or YAML); defaults apply when omitted
    #[arg(long, global = true)]
    settings: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Level monthly payment for an annuity loan
    Payment(PaymentArgs),
    /// Months needed to retire a loan at a fixed payment
    Tenure(TenureArgs),
    /// One month of simple interest on an outstanding balance
    Interest(InterestArgs),
    /// Share and guaranteed fund required for a loan amount
    RequiredFunds(FundsArgs),
    /// Check a member's fund balances against a loan request
    Eligibility(EligibilityArgs),
    /// One month of thrift interest at the society's thrift rate
    ThriftInterest(ThriftArgs),
    /// Quote a new loan: payment, tenure, totals and required funds
    Quote(QuoteArgs),
    /// Project the month-by-month repayment schedule of a loan record
    Schedule(ScheduleArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let settings = match input::file::read_settings(cli.settings.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Payment(args) => commands::amortization::run_payment(args, &settings),
        Commands::Tenure(args) => commands::amortization::run_tenure(args, &settings),
        Commands::Interest(args) => commands::amortization::run_interest(args, &settings),
        Commands::RequiredFunds(args) => commands::amortization::run_required_funds(args, &settings),
        Commands::Eligibility(args) => commands::amortization::run_eligibility(args, &settings),
        Commands::ThriftInterest(args) => commands::amortization::run_thrift_interest(args, &settings),
        Commands::Quote(args) => commands::amortization::run_quote(args, &settings),
        Commands::Schedule(args) => commands::schedule::run_schedule(args, settings),
        Commands::Version => {
            println!("coopl {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
