use crate::config::MinimumPaymentPolicy;
use crate::decimal::{Money, Rate};

/// minimum payment breakdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinimumPayment {
    pub principal_component: Money,
    pub interest_component: Money,
    pub penalty_component: Money,
    /// what the customer must pay next cycle
    pub amount: Money,
}

/// calculator for the monthly minimum due
#[derive(Debug, Clone)]
pub struct MinimumPaymentCalculator {
    policy: MinimumPaymentPolicy,
    annual_rate: Rate,
}

impl MinimumPaymentCalculator {
    pub fn new(policy: MinimumPaymentPolicy, annual_rate: Rate) -> Self {
        Self { policy, annual_rate }
    }

    pub fn annual_rate(&self) -> Rate {
        self.annual_rate
    }

    /// base minimum: a share of the post-interest balance plus one month of
    /// interest on the balance the cycle opened with, floored, never above what is owed
    pub fn base(&self, opening_balance: Money, balance_after_interest: Money) -> MinimumPayment {
        self.calculate(opening_balance, balance_after_interest, Money::ZERO)
    }

    /// minimum with a penalty carried into it; the penalty is already part of `owed`
    pub fn calculate(
        &self,
        opening_balance: Money,
        balance_after_interest: Money,
        penalty: Money,
    ) -> MinimumPayment {
        if !balance_after_interest.is_positive() {
            return MinimumPayment {
                principal_component: Money::ZERO,
                interest_component: Money::ZERO,
                penalty_component: Money::ZERO,
                amount: Money::ZERO,
            };
        }

        let principal_component = balance_after_interest.percentage(self.policy.principal_percentage);
        let interest_component = opening_balance.max(Money::ZERO).monthly_interest(self.annual_rate);
        let base = (principal_component + interest_component)
            .max(self.policy.floor)
            .min(balance_after_interest);

        let owed = balance_after_interest + penalty;

        MinimumPayment {
            principal_component,
            interest_component,
            penalty_component: penalty,
            amount: (base + penalty).min(owed),
        }
    }

    /// minimum asked for at origination, before any interest has accrued
    pub fn at_origination(&self, principal: Money) -> MinimumPayment {
        self.base(principal, principal)
    }
}
