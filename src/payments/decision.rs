//! Monthly delinquency decision table.
//!
//! Conditions evaluated once per cycle:
//! - C1: the loan entered the cycle delinquent
//! - C2: payments this cycle fell short of the minimum due
//! - C3: payments this cycle covered the minimum due
//!
//! | rule              | C1 | C2 | C3 | late fee | next minimum | next delinquent |
//! |-------------------|----|----|----|----------|--------------|-----------------|
//! | PaidOff           | -  | -  | -  | none     | zero         | no              |
//! | CurrentPaid       | N  | N  | Y  | none     | base         | no              |
//! | FirstSlip         | N  | Y  | N  | none     | base         | yes             |
//! | Cured             | Y  | N  | Y  | none     | base         | no              |
//! | RepeatDelinquency | Y  | Y  | N  | flat fee | base + fee   | yes             |

use serde::{Deserialize, Serialize};

use crate::config::BankConfig;
use crate::decimal::Money;
use crate::payments::minimum::{MinimumPayment, MinimumPaymentCalculator};

/// the closed set of rules a cycle can land on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rule {
    PaidOff,
    CurrentPaid,
    FirstSlip,
    Cured,
    RepeatDelinquency,
}

/// evaluated conditions for one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conditions {
    pub was_delinquent: bool,
    pub underpaid: bool,
    pub covers_minimum: bool,
}

impl Conditions {
    pub fn evaluate(was_delinquent: bool, payment_made: Money, minimum_due: Money) -> Self {
        Self {
            was_delinquent,
            underpaid: payment_made < minimum_due,
            covers_minimum: payment_made >= minimum_due,
        }
    }
}

impl Rule {
    /// rule key for a set of conditions on a loan that still owes money
    pub fn classify(conditions: Conditions) -> Rule {
        match (conditions.was_delinquent, conditions.underpaid, conditions.covers_minimum) {
            (false, false, true) => Rule::CurrentPaid,
            (false, true, _) => Rule::FirstSlip,
            (true, false, true) => Rule::Cured,
            (true, true, _) => Rule::RepeatDelinquency,
            // underpaid and covered are exclusive; a cycle that is neither is treated as paid
            (false, false, false) => Rule::CurrentPaid,
            (true, false, false) => Rule::Cured,
        }
    }

    pub fn charges_late_fee(&self) -> bool {
        matches!(self, Rule::RepeatDelinquency)
    }

    pub fn leaves_delinquent(&self) -> bool {
        matches!(self, Rule::FirstSlip | Rule::RepeatDelinquency)
    }
}

/// inputs to one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleInput {
    pub was_delinquent: bool,
    pub payment_made: Money,
    pub minimum_due: Money,
    pub opening_balance: Money,
    pub balance_after_interest: Money,
}

/// outputs of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub rule: Rule,
    pub late_fee: Money,
    pub next_minimum: MinimumPayment,
    pub next_delinquent: bool,
}

impl Decision {
    pub fn next_minimum_due(&self) -> Money {
        self.next_minimum.amount
    }
}

/// pure decision table engine
#[derive(Debug, Clone)]
pub struct DecisionTable {
    minimum: MinimumPaymentCalculator,
    late_fee: Money,
}

impl DecisionTable {
    pub fn new(minimum: MinimumPaymentCalculator, late_fee: Money) -> Self {
        Self { minimum, late_fee }
    }

    pub fn from_config(config: &BankConfig) -> Self {
        Self::new(
            MinimumPaymentCalculator::new(config.minimum_payment.clone(), config.loan_rate()),
            config.fee_config.late_fee,
        )
    }

    pub fn minimum_calculator(&self) -> &MinimumPaymentCalculator {
        &self.minimum
    }

    /// decide fee, next minimum and next delinquency flag for one cycle
    pub fn evaluate(&self, input: CycleInput) -> Decision {
        if !input.balance_after_interest.is_positive() {
            return Decision {
                rule: Rule::PaidOff,
                late_fee: Money::ZERO,
                next_minimum: self.minimum.base(input.opening_balance, Money::ZERO),
                next_delinquent: false,
            };
        }

        let conditions = Conditions::evaluate(input.was_delinquent, input.payment_made, input.minimum_due);
        let rule = Rule::classify(conditions);

        match rule {
            Rule::CurrentPaid | Rule::FirstSlip | Rule::Cured => Decision {
                rule,
                late_fee: Money::ZERO,
                next_minimum: self.minimum.base(input.opening_balance, input.balance_after_interest),
                next_delinquent: rule.leaves_delinquent(),
            },
            Rule::RepeatDelinquency => Decision {
                rule,
                late_fee: self.late_fee,
                next_minimum: self.minimum.calculate(
                    input.opening_balance,
                    input.balance_after_interest,
                    self.late_fee,
                ),
                next_delinquent: true,
            },
            Rule::PaidOff => Decision {
                rule,
                late_fee: Money::ZERO,
                next_minimum: self.minimum.base(input.opening_balance, Money::ZERO),
                next_delinquent: false,
            },
        }
    }
}
