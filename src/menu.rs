//! Line-oriented text session over any reader/writer pair.
//!
//! End of input at any prompt ends the session cleanly.

use std::io::{BufRead, Write};
use std::str::FromStr;

use anyhow::Result;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::bank::Bank;
use crate::config::{BankConfig, BankLimits};
use crate::decimal::Money;
use crate::errors::BankError;
use crate::types::{AccountNumber, LoanId, PaymentOutcome};

/// label printed as the upper bound for amounts with no real ceiling
pub const UNBOUNDED_LABEL: &str = "1.7976931348623157E308";

const MENU: &str = "\
--- Main Menu ---
1. Create customer
2. Deposit to savings
3. Withdraw from savings
4. Initiate loan
5. Make loan payment
6. Advance to next month
7. Print statements
0. Exit";

/// inclusive numeric range accepted at a prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub minimum: Decimal,
    pub maximum: Option<Decimal>,
}

impl Bounds {
    pub fn new(minimum: Decimal, maximum: Decimal) -> Self {
        Self { minimum, maximum: Some(maximum) }
    }

    pub fn at_least(minimum: Decimal) -> Self {
        Self { minimum, maximum: None }
    }

    pub fn contains(&self, value: Decimal) -> bool {
        value >= self.minimum && self.maximum.map_or(true, |max| value <= max)
    }

    /// re-prompt shown when a value falls outside the range
    pub fn reprompt(&self) -> String {
        match self.maximum {
            Some(max) => format!("Enter a value between {:.1} and {:.1}:", self.minimum, max),
            None => format!("Enter a value between {:.1} and {}:", self.minimum, UNBOUNDED_LABEL),
        }
    }
}

/// what the menu loop does after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// interactive session driving a bank
pub struct Session<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// ask for the loan rate (unless a validated config is preset), then
    /// run the menu until exit. returns the bank if the session got past
    /// rate intake
    pub fn start(&mut self, preset: Option<BankConfig>) -> Result<Option<Bank>> {
        let config = match preset {
            Some(config) => config,
            None => match self.prompt_rate(&BankLimits::default())? {
                Some(rate) => BankConfig::standard(rate)?,
                None => return Ok(None),
            },
        };

        let mut bank = Bank::new(config)?;
        self.run(&mut bank)?;
        Ok(Some(bank))
    }

    /// read the bank-wide loan rate in percent
    pub fn prompt_rate(&mut self, limits: &BankLimits) -> Result<Option<Decimal>> {
        let bounds = Bounds::new(
            limits.minimum_loan_rate.as_percentage(),
            limits.maximum_loan_rate.as_percentage(),
        );
        write!(
            self.output,
            "Enter loan annual interest rate ({:.1}-{:.1}): ",
            bounds.minimum,
            limits.maximum_loan_rate.as_percentage()
        )?;
        self.output.flush()?;
        self.read_in_range(bounds)
    }

    /// menu loop
    pub fn run(&mut self, bank: &mut Bank) -> Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            write!(self.output, "Choose an option: ")?;
            self.output.flush()?;

            let Some(choice) = self.read_choice()? else {
                return Ok(());
            };
            debug!(choice, "menu option selected");

            let flow = match choice {
                1 => self.create_customer(bank)?,
                2 => self.deposit(bank)?,
                3 => self.withdraw(bank)?,
                4 => self.initiate_loan(bank)?,
                5 => self.make_payment(bank)?,
                6 => self.advance_month(bank)?,
                7 => self.print_statements(bank)?,
                _ => {
                    writeln!(self.output, "Goodbye.")?;
                    Flow::Exit
                }
            };

            if flow == Flow::Exit {
                return Ok(());
            }
        }
    }

    fn create_customer(&mut self, bank: &mut Bank) -> Result<Flow> {
        loop {
            self.prompt("Customer name: ")?;
            let Some(name) = self.read_line()? else {
                return Ok(Flow::Exit);
            };
            match bank.create_customer(&name) {
                Ok(account) => {
                    writeln!(self.output, "Created customer {} with account #{}", name.trim(), account)?;
                    return Ok(Flow::Continue);
                }
                Err(BankError::InvalidCustomerName) => {
                    writeln!(self.output, "Name cannot be empty.")?;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn deposit(&mut self, bank: &mut Bank) -> Result<Flow> {
        let Some(account) = self.read_customer(bank)? else {
            return Ok(Flow::Exit);
        };
        let Some(account) = account else {
            return Ok(Flow::Continue);
        };
        let Some(amount) = self.read_amount("Amount to deposit: ", Bounds::at_least(Decimal::ZERO))? else {
            return Ok(Flow::Exit);
        };

        match bank.deposit(account, amount) {
            Ok(balance) => {
                writeln!(self.output, "Deposited ${}. New savings balance: ${}", amount, balance)?;
            }
            Err(BankError::AmountOverflow { balance, .. }) => {
                writeln!(self.output, "Deposit rejected: amount too large (balance ${}).", balance)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Flow::Continue)
    }

    fn withdraw(&mut self, bank: &mut Bank) -> Result<Flow> {
        let Some(account) = self.read_customer(bank)? else {
            return Ok(Flow::Exit);
        };
        let Some(account) = account else {
            return Ok(Flow::Continue);
        };
        let Some(amount) = self.read_amount("Amount to withdraw: ", Bounds::at_least(Decimal::ZERO))? else {
            return Ok(Flow::Exit);
        };

        match bank.withdraw(account, amount) {
            Ok(balance) => {
                writeln!(self.output, "Withdrew ${}. New savings balance: ${}", amount, balance)?;
            }
            Err(BankError::InsufficientFunds { available, .. }) => {
                writeln!(self.output, "Failed withdrawal: insufficient funds (available ${}).", available)?;
            }
            Err(e) => return Err(e.into()),
        }
        Ok(Flow::Continue)
    }

    fn initiate_loan(&mut self, bank: &mut Bank) -> Result<Flow> {
        let Some(account) = self.read_customer(bank)? else {
            return Ok(Flow::Exit);
        };
        let Some(account) = account else {
            return Ok(Flow::Continue);
        };

        match bank.check_loan_slot(account) {
            Ok(()) => {}
            Err(BankError::LoanLimitReached { limit, .. }) => {
                writeln!(self.output, "You already have {} loans!", limit)?;
                return Ok(Flow::Continue);
            }
            Err(e) => return Err(e.into()),
        }

        let limits = &bank.config().limits;
        let bounds = Bounds::new(limits.minimum_principal.as_decimal(), limits.maximum_principal.as_decimal());
        let Some(principal) = self.read_amount("Loan amount: ", bounds)? else {
            return Ok(Flow::Exit);
        };

        let loan_id = bank.initiate_loan(account, principal)?;
        writeln!(self.output, "Created loan ID #{}", loan_id)?;
        Ok(Flow::Continue)
    }

    fn make_payment(&mut self, bank: &mut Bank) -> Result<Flow> {
        let Some(account) = self.read_customer(bank)? else {
            return Ok(Flow::Exit);
        };
        let Some(account) = account else {
            return Ok(Flow::Continue);
        };

        // closed loans still take the id and amount; the payment is ignored
        if bank.customer(account)?.loans.is_empty() {
            writeln!(self.output, "No active loans.")?;
            return Ok(Flow::Continue);
        }

        self.prompt("Loan ID to pay: ")?;
        let Some(loan_id) = self.read_parsed::<LoanId>("Enter a valid loan ID:")? else {
            return Ok(Flow::Exit);
        };
        if bank.loan(account, loan_id).is_err() {
            writeln!(self.output, "Loan not found.")?;
            return Ok(Flow::Continue);
        }

        let Some(amount) = self.read_amount("Payment amount: ", Bounds::at_least(Decimal::ZERO))? else {
            return Ok(Flow::Exit);
        };

        match bank.apply_payment(account, loan_id, amount)? {
            PaymentOutcome::Applied { applied, remaining_balance } => {
                writeln!(self.output, "Paid ${} on loan #{}. Remaining balance: ${}", applied, loan_id, remaining_balance)?;
            }
            PaymentOutcome::PaidOff { applied } => {
                writeln!(self.output, "Paid ${} on loan #{}. Loan #{} closed.", applied, loan_id, loan_id)?;
            }
            PaymentOutcome::Ignored => {}
        }
        Ok(Flow::Continue)
    }

    fn advance_month(&mut self, bank: &mut Bank) -> Result<Flow> {
        writeln!(self.output, "Advancing to next month...")?;
        let report = bank.advance_month();
        debug!(month = report.month, loans = report.loans_serviced, "month advanced");
        Ok(Flow::Continue)
    }

    fn print_statements(&mut self, bank: &mut Bank) -> Result<Flow> {
        write!(self.output, "{}", bank.statements())?;
        Ok(Flow::Continue)
    }

    /// ask for an account number. outer `None` is end of input,
    /// inner `None` means the customer does not exist
    fn read_customer(&mut self, bank: &Bank) -> Result<Option<Option<AccountNumber>>> {
        self.prompt("Account number: ")?;
        let Some(account) = self.read_parsed::<AccountNumber>("Enter a valid account number:")? else {
            return Ok(None);
        };
        if bank.customer(account).is_err() {
            writeln!(self.output, "No such customer.")?;
            return Ok(Some(None));
        }
        Ok(Some(Some(account)))
    }

    fn read_amount(&mut self, label: &str, bounds: Bounds) -> Result<Option<Money>> {
        self.prompt(label)?;
        Ok(self.read_in_range(bounds)?.map(Money::from_decimal))
    }

    fn read_choice(&mut self) -> Result<Option<u32>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.trim().parse::<i64>() {
                Ok(choice @ 0..=7) => return Ok(Some(choice as u32)),
                _ => writeln!(self.output, "Enter a number between 0 and 7:")?,
            }
        }
    }

    fn read_in_range(&mut self, bounds: Bounds) -> Result<Option<Decimal>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match Decimal::from_str(line.trim()) {
                Ok(value) if bounds.contains(value) => return Ok(Some(value)),
                _ => writeln!(self.output, "{}", bounds.reprompt())?,
            }
        }
    }

    fn read_parsed<T: FromStr>(&mut self, reprompt: &str) -> Result<Option<T>> {
        loop {
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match line.trim().parse::<T>() {
                Ok(value) => return Ok(Some(value)),
                Err(_) => writeln!(self.output, "{}", reprompt)?,
            }
        }
    }

    fn prompt(&mut self, label: &str) -> Result<()> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        Ok(())
    }

    /// next input line without its terminator, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            warn!("input closed, ending session");
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn run(lines: &[&str]) -> (String, Option<Bank>) {
        let input = Cursor::new(lines.join("\n") + "\n");
        let mut session = Session::new(input, Vec::new());
        let bank = session.start(None).unwrap();
        (String::from_utf8(session.into_output()).unwrap(), bank)
    }

    #[test]
    fn test_bounds_labels() {
        assert_eq!(Bounds::new(dec!(6), dec!(18)).reprompt(), "Enter a value between 6.0 and 18.0:");
        assert_eq!(
            Bounds::new(dec!(500.00), dec!(50000.00)).reprompt(),
            "Enter a value between 500.0 and 50000.0:"
        );
        assert_eq!(
            Bounds::at_least(Decimal::ZERO).reprompt(),
            "Enter a value between 0.0 and 1.7976931348623157E308:"
        );
    }

    #[test]
    fn test_rate_prompt_rejects_out_of_range() {
        let (out, bank) = run(&["5.75", "18.25", "12.25", "0"]);
        assert!(out.contains("Enter loan annual interest rate"));
        assert_eq!(out.matches("Enter a value between 6.0 and 18.0:").count(), 2);
        assert!(out.contains("--- Main Menu ---"));
        assert_eq!(bank.unwrap().config().loan_rate().as_percentage(), dec!(12.25));
    }

    #[test]
    fn test_empty_input_never_reaches_menu() {
        let (out, bank) = run(&["", ""]);
        assert!(out.contains("Enter loan annual interest rate"));
        assert!(!out.contains("Main Menu"));
        assert!(bank.is_none());
    }

    #[test]
    fn test_menu_range() {
        let (out, _) = run(&["12", "-1", "8", "0"]);
        assert_eq!(out.matches("Enter a number between 0 and 7:").count(), 2);
    }

    #[test]
    fn test_loan_and_statement_flow() {
        let (out, _) = run(&["12", "1", "Dan", "4", "1000", "10000", "6", "7", "0"]);
        assert!(out.contains("Created loan ID #1"));
        assert!(out.contains("Advancing to next month..."));
        assert!(out.contains("--- Month 2 Statements ---"));
        assert!(out.contains("Customer: Dan (Account #1000)"));
        assert!(out.contains("Loan #1 balance: $10100.00"));
        assert!(out.contains("Minimum payment due: $201.00"));
        assert!(out.contains("  Opened loan #1 for $10000.00"));
    }

    #[test]
    fn test_loan_amount_reprompt() {
        let (out, _) = run(&["12", "1", "Dan", "4", "1000", "499", "50001", "5000", "0"]);
        assert_eq!(out.matches("Enter a value between 500.0 and 50000.0:").count(), 2);
        assert!(out.contains("Created loan ID #1"));
    }

    #[test]
    fn test_fourth_loan_rejected() {
        let (out, _) = run(&[
            "12", "1", "Dan", "4", "1000", "500", "4", "1000", "500", "4", "1000", "500", "4", "1000", "0",
        ]);
        assert!(out.contains("Created loan ID #3"));
        assert!(out.contains("You already have 3 loans!"));
    }

    #[test]
    fn test_payment_flow() {
        let (out, _) = run(&["12", "1", "Dan", "4", "1000", "5000", "5", "1000", "1", "100", "7", "0"]);
        assert!(out.contains("Loan ID to pay:"));
        assert!(out.contains("Payment amount:"));
        assert!(out.contains("Paid $100.00 on loan #1"));
    }

    #[test]
    fn test_payment_without_customer() {
        let (out, _) = run(&["10", "5", "1000"]);
        assert!(out.contains("No such customer."));
    }

    #[test]
    fn test_payment_without_active_loans() {
        let (out, _) = run(&["10", "1", "Brad", "5", "1000", "0"]);
        assert!(out.contains("No active loans."));
        assert!(!out.contains("Loan ID to pay:"));
        assert!(!out.contains("Payment amount:"));
    }

    #[test]
    fn test_payment_on_closed_loan_keeps_menu_in_sync() {
        let (out, bank) = run(&[
            "10", "1", "collin", "4", "1000", "1000", "5", "1000", "1", "1000", "5", "1000", "1", "50", "6", "6",
            "6", "7", "0",
        ]);
        let bank = bank.unwrap();

        assert!(out.contains("Paid $1000.00 on loan #1. Loan #1 closed."));
        assert!(!out.contains("Paid $50"));
        assert_eq!(out.matches("Loan ID to pay:").count(), 2);
        assert!(!out.contains("No active loans."));
        assert!(!out.contains("Customer: 50"));
        assert!(!out.contains("(Delinquent)"));
        assert!(out.contains("--- Month 4 Statements ---"));
        assert!(out.contains("Loan #1 balance: $0.00 (Closed)"));
        assert_eq!(bank.customers().count(), 1);
        assert_eq!(bank.month(), 4);
    }

    #[test]
    fn test_oversized_deposit_rejected() {
        let (out, bank) = run(&[
            "10", "1", "Brad", "2", "1000", "70000000000000000000000000000", "2", "1000",
            "70000000000000000000000000000", "7", "0",
        ]);
        let bank = bank.unwrap();

        assert_eq!(out.matches("Deposit rejected: amount too large").count(), 1);
        assert!(out.contains("--- Month 1 Statements ---"));
        assert_eq!(
            bank.customer(1000).unwrap().savings.balance(),
            Money::from_decimal(dec!(70000000000000000000000000000))
        );
    }

    #[test]
    fn test_unknown_loan_id() {
        let (out, _) = run(&["10", "1", "Brad", "4", "1000", "1000", "5", "1000", "2", "0"]);
        assert!(out.contains("Loan not found."));
    }

    #[test]
    fn test_savings_flows() {
        let (out, _) = run(&[
            "12", "1", "Brad", "2", "1000", "5000", "3", "1000", "6000", "3", "1000", "-100", "600", "7", "0",
        ]);
        assert!(out.contains("Failed withdrawal"));
        assert!(out.contains("Enter a value between 0.0 and 1.7976931348623157E308:"));
        assert!(out.contains("  Withdrew $600.00"));
        assert!(out.contains("Savings balance: $4400.00"));
    }

    #[test]
    fn test_deposit_rounding() {
        let (out, _) = run(&["12", "1", "Brad", "2", "1000", "99.996", "2", "1000", "99.994", "7", "0"]);
        assert!(out.contains("  Deposited $100.00"));
        assert!(out.contains("  Deposited $99.99"));
    }

    #[test]
    fn test_savings_interest_after_month() {
        let (out, _) = run(&["6.0", "1", "Bob", "2", "1000", "2000", "6", "7", "0"]);
        assert!(out.contains("Savings balance: $2002.50"));
    }

    #[test]
    fn test_no_advance_without_option_six() {
        let (out, _) = run(&["12", "1", "Brad", "2", "1000", "100", "7", "0"]);
        assert!(!out.contains("Advancing to next month..."));
        assert!(out.contains("--- Month 1 Statements ---"));
    }

    #[test]
    fn test_preset_rate_skips_prompt() {
        let input = Cursor::new("0\n");
        let mut session = Session::new(input, Vec::new());
        let preset = BankConfig::standard(dec!(9)).unwrap();
        let bank = session.start(Some(preset)).unwrap().unwrap();
        let out = String::from_utf8(session.into_output()).unwrap();

        assert!(!out.contains("Enter loan annual interest rate"));
        assert_eq!(bank.config().savings_rate().as_percentage(), dec!(2.25));
    }

    #[test]
    fn test_preset_rate_outside_limits_never_starts() {
        let preset: anyhow::Result<Option<BankConfig>> =
            Some(dec!(19)).map(BankConfig::standard).transpose().map_err(Into::into);
        let err = preset.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BankError>(),
            Some(BankError::InterestRateOutOfRange { .. })
        ));
    }
}
