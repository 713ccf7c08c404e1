use serde::{Deserialize, Serialize};
use std::fmt;

use crate::decimal::Money;

/// customer account number, assigned from 1000 upward
pub type AccountNumber = u32;

/// loan identifier, unique per customer (1..=3)
pub type LoanId = u32;

/// loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// performing, last cycle met its minimum
    Open,
    /// last cycle's payment missed the minimum due
    Delinquent,
    /// paid off, terminal
    Closed,
}

impl LoanStatus {
    /// whether the monthly tick still services this loan
    pub fn is_active(&self) -> bool {
        !matches!(self, LoanStatus::Closed)
    }
}

impl fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LoanStatus::Open => "Open",
            LoanStatus::Delinquent => "Delinquent",
            LoanStatus::Closed => "Closed",
        };
        f.write_str(label)
    }
}

/// what happened to a payment handed to a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentOutcome {
    /// applied in full or clamped to the payoff amount
    Applied {
        applied: Money,
        remaining_balance: Money,
    },
    /// applied and brought the balance to zero
    PaidOff {
        applied: Money,
    },
    /// loan already closed, nothing recorded
    Ignored,
}

impl PaymentOutcome {
    pub fn applied(&self) -> Money {
        match self {
            PaymentOutcome::Applied { applied, .. } | PaymentOutcome::PaidOff { applied } => *applied,
            PaymentOutcome::Ignored => Money::ZERO,
        }
    }
}
