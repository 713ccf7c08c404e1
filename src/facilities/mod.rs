pub mod installment_loan;
pub mod savings;
pub mod serialization;

pub use installment_loan::{CyclePlan, InstallmentLoan};
pub use savings::SavingsAccount;
pub use serialization::{BankView, CustomerView, LoanView, SavingsView};
