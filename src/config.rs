use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{BankError, Result};
use crate::types::AccountNumber;

/// bank-wide configuration, fixed for the lifetime of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankConfig {
    pub rates: RateConfig,
    pub minimum_payment: MinimumPaymentPolicy,
    pub fee_config: FeeConfig,
    pub limits: BankLimits,
    pub first_account_number: AccountNumber,
}

/// annual rates; the savings rate is derived once from the loan rate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateConfig {
    pub loan_annual_rate: Rate,
    pub savings_annual_rate: Rate,
    /// savings rate = loan rate / savings_divisor
    pub savings_divisor: u32,
}

/// minimum payment formula parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MinimumPaymentPolicy {
    /// share of the post-interest balance due each month, in percent
    pub principal_percentage: Decimal,
    /// smallest minimum ever asked for (capped by the amount owed)
    pub floor: Money,
}

/// fee configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeConfig {
    /// flat fee charged when a delinquent loan is underpaid again
    pub late_fee: Money,
}

/// validation ranges
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankLimits {
    pub minimum_loan_rate: Rate,
    pub maximum_loan_rate: Rate,
    pub minimum_principal: Money,
    pub maximum_principal: Money,
    pub max_loans_per_customer: usize,
}

impl Default for MinimumPaymentPolicy {
    fn default() -> Self {
        Self {
            principal_percentage: dec!(1),
            floor: Money::from_major(10),
        }
    }
}

impl Default for FeeConfig {
    fn default() -> Self {
        Self {
            late_fee: Money::from_major(50),
        }
    }
}

impl Default for BankLimits {
    fn default() -> Self {
        Self {
            minimum_loan_rate: Rate::from_percentage(6),
            maximum_loan_rate: Rate::from_percentage(18),
            minimum_principal: Money::from_major(500),
            maximum_principal: Money::from_major(50_000),
            max_loans_per_customer: 3,
        }
    }
}

impl BankConfig {
    /// create the standard configuration for a loan rate given in percent (e.g. 12.25)
    pub fn standard(loan_rate_percent: Decimal) -> Result<Self> {
        Self::with_loan_rate(Rate::from_percentage_decimal(loan_rate_percent))
    }

    /// create the standard configuration for a loan rate
    pub fn with_loan_rate(loan_annual_rate: Rate) -> Result<Self> {
        let savings_divisor = 4;
        let config = Self {
            rates: RateConfig {
                loan_annual_rate,
                savings_annual_rate: loan_annual_rate.fraction_of(savings_divisor),
                savings_divisor,
            },
            minimum_payment: MinimumPaymentPolicy::default(),
            fee_config: FeeConfig::default(),
            limits: BankLimits::default(),
            first_account_number: 1000,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn loan_rate(&self) -> Rate {
        self.rates.loan_annual_rate
    }

    pub fn savings_rate(&self) -> Rate {
        self.rates.savings_annual_rate
    }

    /// check the configuration is internally consistent
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        let rate = self.rates.loan_annual_rate;

        if rate < limits.minimum_loan_rate || rate > limits.maximum_loan_rate {
            return Err(BankError::InterestRateOutOfRange {
                rate,
                minimum: limits.minimum_loan_rate,
                maximum: limits.maximum_loan_rate,
            });
        }

        if self.rates.savings_divisor == 0 {
            return Err(BankError::InvalidConfiguration {
                message: "savings divisor must be non-zero".to_string(),
            });
        }

        if self.rates.savings_annual_rate != rate.fraction_of(self.rates.savings_divisor) {
            return Err(BankError::InvalidConfiguration {
                message: "savings rate must be derived from the loan rate".to_string(),
            });
        }

        if limits.minimum_principal > limits.maximum_principal {
            return Err(BankError::InvalidConfiguration {
                message: format!(
                    "principal range is empty: {} > {}",
                    limits.minimum_principal, limits.maximum_principal
                ),
            });
        }

        if limits.max_loans_per_customer == 0 {
            return Err(BankError::InvalidConfiguration {
                message: "customers must be allowed at least one loan".to_string(),
            });
        }

        if self.fee_config.late_fee.is_negative() || self.minimum_payment.floor.is_negative() {
            return Err(BankError::InvalidConfiguration {
                message: "fees and floors cannot be negative".to_string(),
            });
        }

        Ok(())
    }

    /// check a requested principal against the configured range
    pub fn check_principal(&self, amount: Money) -> Result<()> {
        let limits = &self.limits;
        if amount < limits.minimum_principal || amount > limits.maximum_principal {
            return Err(BankError::PrincipalOutOfRange {
                amount,
                minimum: limits.minimum_principal,
                maximum: limits.maximum_principal,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_savings_rate_is_quarter_of_loan_rate() {
        let config = BankConfig::standard(dec!(12)).unwrap();
        assert_eq!(config.loan_rate(), Rate::from_percentage(12));
        assert_eq!(config.savings_rate(), Rate::from_percentage(3));
    }

    #[test]
    fn test_rate_bounds_inclusive() {
        assert!(BankConfig::standard(dec!(6.0)).is_ok());
        assert!(BankConfig::standard(dec!(18.0)).is_ok());
        assert!(BankConfig::standard(dec!(12.25)).is_ok());
    }

    #[test]
    fn test_rate_out_of_range_rejected() {
        let low = BankConfig::standard(dec!(5.75));
        assert!(matches!(low, Err(BankError::InterestRateOutOfRange { .. })));

        let high = BankConfig::standard(dec!(18.25));
        assert!(matches!(high, Err(BankError::InterestRateOutOfRange { .. })));
    }

    #[test]
    fn test_principal_range() {
        let config = BankConfig::standard(dec!(12)).unwrap();
        assert!(config.check_principal(Money::from_major(500)).is_ok());
        assert!(config.check_principal(Money::from_major(50_000)).is_ok());
        assert!(config.check_principal(Money::from_major(499)).is_err());
        assert!(config.check_principal(Money::from_major(50_001)).is_err());
    }

    #[test]
    fn test_tampered_savings_rate_fails_validation() {
        let mut config = BankConfig::standard(dec!(12)).unwrap();
        config.rates.savings_annual_rate = Rate::from_percentage(5);
        assert!(matches!(config.validate(), Err(BankError::InvalidConfiguration { .. })));
    }
}
