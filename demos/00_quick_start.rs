/// quick start - open a bank, lend, pay, advance a month
use loan_servicing_rs::{Bank, BankConfig, Decimal, Money};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 12% loans, savings earn a quarter of that
    let mut bank = Bank::new(BankConfig::standard(Decimal::from(12))?)?;

    let account = bank.create_customer("Dan")?;
    bank.deposit(account, Money::from_major(1_500))?;

    let loan_id = bank.initiate_loan(account, Money::from_major(10_000))?;
    println!("minimum due at origination: ${}", bank.current_minimum_due(account, loan_id)?);

    bank.apply_payment(account, loan_id, Money::from_major(250))?;
    bank.advance_month();

    print!("{}", bank.statements());

    Ok(())
}
