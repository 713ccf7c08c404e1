use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{AccountNumber, LoanId, LoanStatus};

/// installment loan state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanState {
    // identification
    pub loan_id: LoanId,
    pub account: AccountNumber,

    // balances
    pub principal_original: Money,
    pub balance: Money,
    /// balance the current cycle started with, before its payments
    pub opening_balance: Money,
    pub minimum_due: Money,

    // cycle tracking
    pub payment_this_cycle: Money,
    pub was_delinquent: bool,

    // totals
    pub total_paid: Money,
    pub total_interest: Money,
    pub total_fees: Money,
    pub late_fee_count: u32,

    // dates
    pub origination_date: DateTime<Utc>,
    pub last_interest_accrual: DateTime<Utc>,
    pub closed_date: Option<DateTime<Utc>>,
    pub last_status_change: DateTime<Utc>,

    pub status: LoanStatus,
}

impl LoanState {
    pub fn new(
        loan_id: LoanId,
        account: AccountNumber,
        principal: Money,
        minimum_due: Money,
        origination_date: DateTime<Utc>,
    ) -> Self {
        Self {
            loan_id,
            account,
            principal_original: principal,
            balance: principal,
            opening_balance: principal,
            minimum_due,
            payment_this_cycle: Money::ZERO,
            was_delinquent: false,
            total_paid: Money::ZERO,
            total_interest: Money::ZERO,
            total_fees: Money::ZERO,
            late_fee_count: 0,
            origination_date,
            last_interest_accrual: origination_date,
            closed_date: None,
            last_status_change: origination_date,
            status: LoanStatus::Open,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.status == LoanStatus::Closed
    }

    pub fn can_accept_payment(&self) -> bool {
        self.status.is_active()
    }

    pub fn update_status(&mut self, new_status: LoanStatus, timestamp: DateTime<Utc>) {
        if self.status != new_status {
            self.status = new_status;
            self.last_status_change = timestamp;
        }
    }

    /// record an accepted payment
    pub fn record_payment(&mut self, amount: Money) {
        self.balance -= amount;
        self.payment_this_cycle += amount;
        self.total_paid += amount;
    }

    /// move to the terminal state
    pub fn close(&mut self, timestamp: DateTime<Utc>) {
        self.balance = Money::ZERO;
        self.minimum_due = Money::ZERO;
        self.was_delinquent = false;
        self.closed_date = Some(timestamp);
        self.update_status(LoanStatus::Closed, timestamp);
    }
}

/// savings account state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsState {
    pub account: AccountNumber,
    pub balance: Money,
    pub total_deposited: Money,
    pub total_withdrawn: Money,
    pub total_interest: Money,
    pub opened_date: DateTime<Utc>,
}

impl SavingsState {
    pub fn new(account: AccountNumber, opened_date: DateTime<Utc>) -> Self {
        Self {
            account,
            balance: Money::ZERO,
            total_deposited: Money::ZERO,
            total_withdrawn: Money::ZERO,
            total_interest: Money::ZERO,
            opened_date,
        }
    }
}

/// state snapshot for audit trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub snapshot_id: Uuid,
    pub loan_id: LoanId,
    pub timestamp: DateTime<Utc>,
    pub state: LoanState,
    pub trigger: String,
}

impl StateSnapshot {
    pub fn capture(state: &LoanState, timestamp: DateTime<Utc>, trigger: String) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            loan_id: state.loan_id,
            timestamp,
            state: state.clone(),
            trigger,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_loan_state() {
        let now = Utc::now();
        let state = LoanState::new(1, 1000, Money::from_major(10_000), Money::from_major(200), now);

        assert_eq!(state.balance, Money::from_major(10_000));
        assert_eq!(state.opening_balance, state.balance);
        assert_eq!(state.status, LoanStatus::Open);
        assert!(state.can_accept_payment());
        assert!(!state.was_delinquent);
    }

    #[test]
    fn test_record_payment_accumulates() {
        let mut state = LoanState::new(1, 1000, Money::from_major(1_000), Money::from_major(18), Utc::now());
        state.record_payment(Money::from_major(5));
        state.record_payment(Money::from_major(7));

        assert_eq!(state.balance, Money::from_major(988));
        assert_eq!(state.payment_this_cycle, Money::from_major(12));
        assert_eq!(state.total_paid, Money::from_major(12));
    }

    #[test]
    fn test_close_zeroes_everything() {
        let now = Utc::now();
        let mut state = LoanState::new(2, 1000, Money::from_major(500), Money::from_major(10), now);
        state.was_delinquent = true;
        state.close(now);

        assert!(state.is_closed());
        assert!(!state.can_accept_payment());
        assert_eq!(state.balance, Money::ZERO);
        assert_eq!(state.minimum_due, Money::ZERO);
        assert_eq!(state.closed_date, Some(now));
    }

    #[test]
    fn test_snapshot_has_unique_id() {
        let now = Utc::now();
        let state = LoanState::new(1, 1000, Money::from_major(500), Money::from_major(10), now);
        let a = StateSnapshot::capture(&state, now, "origination".to_string());
        let b = StateSnapshot::capture(&state, now, "origination".to_string());
        assert_ne!(a.snapshot_id, b.snapshot_id);
        assert_eq!(a.loan_id, 1);
    }
}
