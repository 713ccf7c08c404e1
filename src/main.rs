//! loan-bank - interactive month-by-month loan servicing simulator

use std::io;

use anyhow::Result;
use clap::Parser;
use loan_servicing_rs::menu::Session;
use loan_servicing_rs::{BankConfig, Decimal};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "loan-bank")]
#[command(about = "Menu-driven savings and installment loan simulator", long_about = None)]
struct Cli {
    /// Loan annual interest rate in percent; skips the startup prompt
    #[arg(short, long)]
    rate: Option<Decimal>,

    /// Print the final bank state as JSON on exit
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // logs go to stderr so they never mix with the menu
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // an out-of-range --rate fails here with the config error
    let preset = cli.rate.map(BankConfig::standard).transpose()?;

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout());
    let bank = session.start(preset)?;

    if cli.json {
        if let Some(bank) = bank {
            println!("{}", bank.to_json_pretty()?);
        }
    }

    Ok(())
}
