/// delinquency cycle - underpay, repeat, then cure
use loan_servicing_rs::{Bank, BankConfig, Money, SafeTimeProvider, TimeSource};
use chrono::{TimeZone, Utc};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== delinquency cycle ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    ));
    let mut bank = Bank::with_time(BankConfig::standard(dec!(10))?, time)?;

    let account = bank.create_customer("Lily")?;
    let loan_id = bank.initiate_loan(account, Money::from_major(1_000))?;

    // two underpayments: the first slip is free, the second costs the late fee
    for _ in 0..2 {
        bank.apply_payment(account, loan_id, Money::from_major(6))?;
        let report = bank.advance_month();
        let summary = &report.loans[0];
        println!(
            "{}  rule {:?}  balance ${}  minimum ${}  fee ${}  status {}",
            bank.time().now().format("%Y-%m-%d"),
            summary.rule,
            summary.balance,
            summary.minimum_due,
            summary.late_fee,
            summary.status,
        );
    }

    // paying the full minimum, penalty included, cures the loan
    let minimum = bank.current_minimum_due(account, loan_id)?;
    bank.apply_payment(account, loan_id, minimum)?;
    let report = bank.advance_month();
    println!("after paying ${}: {:?}, {}", minimum, report.loans[0].rule, report.loans[0].status);

    // pay it off
    let balance = bank.current_balance(account, loan_id)?;
    bank.apply_payment(account, loan_id, balance + Money::from_major(100))?;
    println!("\nfinal state: {}", bank.current_state(account, loan_id)?);

    print!("\n{}", bank.statements());

    Ok(())
}
