/// json state - dump the registry and a month-end report
use loan_servicing_rs::{Bank, BankConfig, Money};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut bank = Bank::new(BankConfig::standard(dec!(18))?)?;

    let alice = bank.create_customer("Alice")?;
    bank.deposit(alice, Money::from_major(1_000))?;

    let bob = bank.create_customer("Bob")?;
    let loan_id = bank.initiate_loan(bob, Money::from_major(5_000))?;
    bank.apply_payment(bob, loan_id, Money::from_major(150))?;

    let report = bank.advance_month();

    println!("=== month-end report ===");
    println!("{}", report.to_json_pretty()?);

    println!("\n=== bank state ===");
    println!("{}", bank.to_json_pretty()?);

    Ok(())
}
