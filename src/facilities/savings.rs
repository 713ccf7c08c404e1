use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::errors::{BankError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{AccrualEngine, MonthlyAccrual};
use crate::payments::validate_amount;
use crate::state::SavingsState;
use crate::types::AccountNumber;

/// savings account, one per customer
#[derive(Debug, Clone)]
pub struct SavingsAccount {
    pub annual_rate: Rate,
    pub state: SavingsState,
}

impl SavingsAccount {
    pub fn open(account: AccountNumber, annual_rate: Rate, opened: DateTime<Utc>) -> Self {
        Self {
            annual_rate,
            state: SavingsState::new(account, opened),
        }
    }

    pub fn balance(&self) -> Money {
        self.state.balance
    }

    /// add funds, returning the new balance
    pub fn deposit(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Money> {
        validate_amount(amount)?;

        let (Some(balance), Some(total_deposited)) = (
            self.state.balance.checked_add(amount),
            self.state.total_deposited.checked_add(amount),
        ) else {
            return Err(BankError::AmountOverflow { balance: self.state.balance, amount });
        };
        self.state.balance = balance;
        self.state.total_deposited = total_deposited;

        events.emit(Event::Deposited {
            account: self.state.account,
            amount,
            new_balance: self.state.balance,
            timestamp: time_provider.now(),
        });

        Ok(self.state.balance)
    }

    /// take funds out; a withdrawal above the balance is declined and logged
    pub fn withdraw(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<Money> {
        validate_amount(amount)?;

        let now = time_provider.now();
        if amount > self.state.balance {
            events.emit(Event::WithdrawalDeclined {
                account: self.state.account,
                requested: amount,
                available: self.state.balance,
                timestamp: now,
            });
            return Err(BankError::InsufficientFunds {
                available: self.state.balance,
                requested: amount,
            });
        }

        self.state.balance -= amount;
        self.state.total_withdrawn += amount;

        events.emit(Event::Withdrew {
            account: self.state.account,
            amount,
            new_balance: self.state.balance,
            timestamp: now,
        });

        Ok(self.state.balance)
    }

    /// one month of interest at the savings rate, not yet credited
    pub fn plan_interest(&self, now: DateTime<Utc>) -> MonthlyAccrual {
        AccrualEngine::new(self.annual_rate).accrue(self.state.balance, now)
    }

    pub fn credit_interest(&mut self, accrual: &MonthlyAccrual, month: u32, events: &mut EventStore) {
        self.state.balance = accrual.balance_after;
        self.state.total_interest += accrual.interest_amount;

        if accrual.interest_amount.is_positive() {
            events.emit(Event::SavingsInterestCredited {
                account: self.state.account,
                amount: accrual.interest_amount,
                new_balance: self.state.balance,
                month,
            });
        }

        debug!(
            account = self.state.account,
            interest = %accrual.interest_amount,
            balance = %self.state.balance,
            "savings interest credited"
        );
    }
}
