pub mod bank;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod facilities;
pub mod interest;
pub mod menu;
pub mod payments;
pub mod processor;
pub mod state;
pub mod types;

// re-export key types
pub use bank::{Bank, Customer};
pub use config::{BankConfig, BankLimits, FeeConfig, MinimumPaymentPolicy, RateConfig};
pub use decimal::{Money, Rate};
pub use errors::{BankError, Result};
pub use events::{Event, EventStore};
pub use facilities::{InstallmentLoan, SavingsAccount};
pub use interest::{AccrualEngine, InterestCalculator, MonthlyAccrual};
pub use payments::{Decision, DecisionTable, MinimumPaymentCalculator, Rule};
pub use processor::{MonthEndReport, MonthlyProcessor};
pub use types::{AccountNumber, LoanId, LoanStatus, PaymentOutcome};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
