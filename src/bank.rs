use std::collections::BTreeMap;
use std::fmt;

use chrono::Utc;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use tracing::{debug, info, instrument};

use crate::config::BankConfig;
use crate::decimal::Money;
use crate::errors::{BankError, Result};
use crate::events::{Event, EventStore};
use crate::facilities::{BankView, InstallmentLoan, SavingsAccount};
use crate::payments::{DecisionTable, PaymentProcessable};
use crate::processor::{MonthEndReport, MonthlyProcessor};
use crate::types::{AccountNumber, LoanId, LoanStatus, PaymentOutcome};

/// customer with one savings account and up to the configured number of loans
#[derive(Debug, Clone)]
pub struct Customer {
    pub account: AccountNumber,
    pub name: String,
    pub savings: SavingsAccount,
    /// closed loans stay here and keep their slot
    pub loans: Vec<InstallmentLoan>,
    pub events: EventStore,
}

impl Customer {
    pub fn loan(&self, loan_id: LoanId) -> Option<&InstallmentLoan> {
        self.loans.iter().find(|loan| loan.id == loan_id)
    }

    /// statement block for this customer
    pub fn statement(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Customer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Customer: {} (Account #{})", self.name, self.account)?;
        writeln!(f, "Savings balance: ${}", self.savings.balance())?;

        for loan in &self.loans {
            let suffix = match loan.status() {
                LoanStatus::Open => "",
                LoanStatus::Delinquent => " (Delinquent)",
                LoanStatus::Closed => " (Closed)",
            };
            writeln!(f, "Loan #{} balance: ${}{}", loan.id, loan.balance(), suffix)?;
            writeln!(f, "Minimum payment due: ${}", loan.minimum_due())?;
        }

        writeln!(f, "Recent Activity:")?;
        for line in self.events.activity() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

/// customer registry and entry point for every banking operation
pub struct Bank {
    config: BankConfig,
    table: DecisionTable,
    processor: MonthlyProcessor,
    time: SafeTimeProvider,
    customers: BTreeMap<AccountNumber, Customer>,
    next_account: AccountNumber,
    month: u32,
}

impl Bank {
    /// create a bank whose simulation clock starts now
    pub fn new(config: BankConfig) -> Result<Self> {
        Self::with_time(config, SafeTimeProvider::new(TimeSource::Test(Utc::now())))
    }

    /// create a bank on a caller-supplied clock
    pub fn with_time(config: BankConfig, time: SafeTimeProvider) -> Result<Self> {
        config.validate()?;
        let table = DecisionTable::from_config(&config);

        info!(
            loan_rate = %config.loan_rate(),
            savings_rate = %config.savings_rate(),
            "bank opened"
        );

        Ok(Self {
            next_account: config.first_account_number,
            processor: MonthlyProcessor::new(table.clone()),
            table,
            config,
            time,
            customers: BTreeMap::new(),
            month: 1,
        })
    }

    pub fn config(&self) -> &BankConfig {
        &self.config
    }

    pub fn time(&self) -> &SafeTimeProvider {
        &self.time
    }

    /// current month, starting at 1
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn customer(&self, account: AccountNumber) -> Result<&Customer> {
        self.customers
            .get(&account)
            .ok_or(BankError::CustomerNotFound { account })
    }

    /// customers in account number order
    pub fn customers(&self) -> impl Iterator<Item = &Customer> {
        self.customers.values()
    }

    #[instrument(skip(self))]
    pub fn create_customer(&mut self, name: &str) -> Result<AccountNumber> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BankError::InvalidCustomerName);
        }

        let account = self.next_account;
        self.next_account += 1;
        let now = self.time.now();

        let mut events = EventStore::new();
        events.emit(Event::CustomerCreated {
            account,
            name: name.to_string(),
            timestamp: now,
        });

        self.customers.insert(
            account,
            Customer {
                account,
                name: name.to_string(),
                savings: SavingsAccount::open(account, self.config.savings_rate(), now),
                loans: Vec::new(),
                events,
            },
        );

        info!(account, "customer created");
        Ok(account)
    }

    /// deposit into savings, returning the new balance
    #[instrument(skip(self))]
    pub fn deposit(&mut self, account: AccountNumber, amount: Money) -> Result<Money> {
        let customer = self
            .customers
            .get_mut(&account)
            .ok_or(BankError::CustomerNotFound { account })?;
        let balance = customer.savings.deposit(amount, &self.time, &mut customer.events)?;
        debug!(%balance, "deposit accepted");
        Ok(balance)
    }

    /// withdraw from savings; an overdraw is logged on the customer and returned as an error
    #[instrument(skip(self))]
    pub fn withdraw(&mut self, account: AccountNumber, amount: Money) -> Result<Money> {
        let customer = self
            .customers
            .get_mut(&account)
            .ok_or(BankError::CustomerNotFound { account })?;
        let balance = customer.savings.withdraw(amount, &self.time, &mut customer.events)?;
        debug!(%balance, "withdrawal accepted");
        Ok(balance)
    }

    /// check the customer still has a free loan slot
    pub fn check_loan_slot(&self, account: AccountNumber) -> Result<()> {
        let limit = self.config.limits.max_loans_per_customer;
        if self.customer(account)?.loans.len() >= limit {
            return Err(BankError::LoanLimitReached { account, limit });
        }
        Ok(())
    }

    /// open a new loan, returning its id
    #[instrument(skip(self))]
    pub fn initiate_loan(&mut self, account: AccountNumber, principal: Money) -> Result<LoanId> {
        self.check_loan_slot(account)?;
        self.config.check_principal(principal)?;

        let customer = self
            .customers
            .get_mut(&account)
            .ok_or(BankError::CustomerNotFound { account })?;
        let loan_id = customer.loans.len() as LoanId + 1;
        let loan = InstallmentLoan::originate(
            account,
            loan_id,
            principal,
            &self.table,
            &self.time,
            &mut customer.events,
        );
        let minimum_due = loan.minimum_due();
        customer.loans.push(loan);

        info!(loan_id, %minimum_due, "loan opened");
        Ok(loan_id)
    }

    /// route a payment to one loan
    #[instrument(skip(self))]
    pub fn apply_payment(
        &mut self,
        account: AccountNumber,
        loan_id: LoanId,
        amount: Money,
    ) -> Result<PaymentOutcome> {
        let customer = self
            .customers
            .get_mut(&account)
            .ok_or(BankError::CustomerNotFound { account })?;
        let loan = customer
            .loans
            .iter_mut()
            .find(|loan| loan.id == loan_id)
            .ok_or(BankError::LoanNotFound { account, loan_id })?;

        let outcome = loan.apply_payment(amount, &self.time, &mut customer.events)?;
        if let PaymentOutcome::PaidOff { applied } = outcome {
            info!(%applied, "loan paid off");
        }
        Ok(outcome)
    }

    /// run the month-end tick for every customer
    pub fn advance_month(&mut self) -> MonthEndReport {
        self.month += 1;
        let now = self.processor.advance_clock(&self.time);
        self.processor.process(self.customers.values_mut(), self.month, now)
    }

    pub fn current_balance(&self, account: AccountNumber, loan_id: LoanId) -> Result<Money> {
        Ok(self.loan(account, loan_id)?.balance())
    }

    pub fn current_minimum_due(&self, account: AccountNumber, loan_id: LoanId) -> Result<Money> {
        Ok(self.loan(account, loan_id)?.minimum_due())
    }

    pub fn current_state(&self, account: AccountNumber, loan_id: LoanId) -> Result<LoanStatus> {
        Ok(self.loan(account, loan_id)?.status())
    }

    pub fn loan(&self, account: AccountNumber, loan_id: LoanId) -> Result<&InstallmentLoan> {
        self.customer(account)?
            .loan(loan_id)
            .ok_or(BankError::LoanNotFound { account, loan_id })
    }

    /// statements for every customer, in account order
    pub fn statements(&self) -> String {
        let mut out = format!("--- Month {} Statements ---\n", self.month);
        for customer in self.customers.values() {
            out.push_str(&customer.to_string());
            out.push('\n');
        }
        out
    }

    pub fn view(&self) -> BankView {
        BankView::from_bank(self)
    }

    /// pretty-printed json of the whole registry
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        self.view().to_json_pretty()
    }
}
