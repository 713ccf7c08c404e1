use chrono::{DateTime, Utc};
use tracing::warn;

use crate::decimal::{Money, Rate};
use crate::interest::InterestCalculator;

/// engine for accruing simple monthly interest at a fixed annual rate
#[derive(Debug, Clone, Copy)]
pub struct AccrualEngine {
    pub annual_rate: Rate,
}

impl AccrualEngine {
    pub fn new(annual_rate: Rate) -> Self {
        Self { annual_rate }
    }

    /// apply one month of interest to a balance. interest that would push
    /// the balance past the decimal range is dropped for the month
    pub fn accrue(&self, balance: Money, date: DateTime<Utc>) -> MonthlyAccrual {
        let interest = self.monthly_interest(balance);
        let (interest_amount, balance_after) = match balance.checked_add(interest) {
            Some(after) => (interest, after),
            None => {
                warn!(%balance, %interest, "interest not representable, skipped");
                (Money::ZERO, balance)
            }
        };

        MonthlyAccrual {
            date,
            principal_base: balance,
            interest_amount,
            balance_after,
            annual_rate: self.annual_rate,
        }
    }
}

impl InterestCalculator for AccrualEngine {
    fn monthly_interest(&self, balance: Money) -> Money {
        if !balance.is_positive() {
            return Money::ZERO;
        }
        balance.monthly_interest(self.annual_rate)
    }
}

/// monthly accrual record
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyAccrual {
    pub date: DateTime<Utc>,
    pub principal_base: Money,
    pub interest_amount: Money,
    pub balance_after: Money,
    pub annual_rate: Rate,
}
