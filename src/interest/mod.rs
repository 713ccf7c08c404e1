pub mod accrual;

use crate::decimal::Money;

pub use accrual::{AccrualEngine, MonthlyAccrual};

/// trait for interest calculations
pub trait InterestCalculator {
    /// one month of interest on a balance, rounded to the cent
    fn monthly_interest(&self, balance: Money) -> Money;
}
