pub mod decision;
pub mod minimum;

use hourglass_rs::SafeTimeProvider;

use crate::decimal::Money;
use crate::errors::{BankError, Result};
use crate::events::EventStore;
use crate::types::PaymentOutcome;

pub use decision::{Conditions, CycleInput, Decision, DecisionTable, Rule};
pub use minimum::{MinimumPayment, MinimumPaymentCalculator};

/// split of a payment against an outstanding balance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentApplication {
    /// part of the payment that reduces the balance
    pub applied: Money,
    /// part above the payoff amount, never taken
    pub excess: Money,
    pub remaining_balance: Money,
}

impl PaymentApplication {
    /// clamp a payment to the payoff amount
    pub fn against(balance: Money, amount: Money) -> Self {
        let applied = amount.min(balance.max(Money::ZERO));
        Self {
            applied,
            excess: amount.saturating_sub(applied),
            remaining_balance: balance - applied,
        }
    }

    pub fn pays_off(&self) -> bool {
        !self.remaining_balance.is_positive()
    }
}

/// reject amounts that can never be valid for a money movement
pub fn validate_amount(amount: Money) -> Result<()> {
    if amount.is_negative() {
        return Err(BankError::InvalidAmount { amount });
    }
    Ok(())
}

/// trait for accounts that take payments between monthly ticks
pub trait PaymentProcessable {
    fn apply_payment(
        &mut self,
        amount: Money,
        time_provider: &SafeTimeProvider,
        events: &mut EventStore,
    ) -> Result<PaymentOutcome>;
}
