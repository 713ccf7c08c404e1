/// serialization support for the bank registry
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bank::{Bank, Customer};
use crate::decimal::{Money, Rate};
use crate::facilities::{InstallmentLoan, SavingsAccount};
use crate::types::{AccountNumber, LoanId, LoanStatus};

/// serializable view of the whole bank
#[derive(Debug, Serialize, Deserialize)]
pub struct BankView {
    pub month: u32,
    pub as_of: DateTime<Utc>,
    pub loan_annual_rate: Rate,
    pub savings_annual_rate: Rate,
    pub customers: Vec<CustomerView>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerView {
    pub account: AccountNumber,
    pub name: String,
    pub savings: SavingsView,
    pub loans: Vec<LoanView>,
    pub activity: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SavingsView {
    pub balance: Money,
    pub annual_rate: Rate,
    pub total_deposited: Money,
    pub total_withdrawn: Money,
    pub total_interest: Money,
}

/// serializable view of one loan
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub loan_id: LoanId,
    pub status: LoanStatus,
    pub annual_rate: Rate,
    pub principal_original: Money,
    pub balance: Money,
    pub minimum_due: Money,
    pub payment_this_cycle: Money,
    pub delinquent: bool,
    pub totals: LoanTotalsView,
    pub origination_date: DateTime<Utc>,
    pub last_interest_accrual: DateTime<Utc>,
    pub closed_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoanTotalsView {
    pub paid: Money,
    pub interest: Money,
    pub fees: Money,
    pub late_fee_count: u32,
}

impl BankView {
    pub fn from_bank(bank: &Bank) -> Self {
        BankView {
            month: bank.month(),
            as_of: bank.time().now(),
            loan_annual_rate: bank.config().loan_rate(),
            savings_annual_rate: bank.config().savings_rate(),
            customers: bank.customers().map(CustomerView::from_customer).collect(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl CustomerView {
    pub fn from_customer(customer: &Customer) -> Self {
        CustomerView {
            account: customer.account,
            name: customer.name.clone(),
            savings: SavingsView::from_savings(&customer.savings),
            loans: customer.loans.iter().map(LoanView::from_loan).collect(),
            activity: customer.events.activity(),
        }
    }
}

impl SavingsView {
    pub fn from_savings(savings: &SavingsAccount) -> Self {
        SavingsView {
            balance: savings.state.balance,
            annual_rate: savings.annual_rate,
            total_deposited: savings.state.total_deposited,
            total_withdrawn: savings.state.total_withdrawn,
            total_interest: savings.state.total_interest,
        }
    }
}

impl LoanView {
    pub fn from_loan(loan: &InstallmentLoan) -> Self {
        let state = &loan.state;
        LoanView {
            loan_id: loan.id,
            status: state.status,
            annual_rate: loan.annual_rate,
            principal_original: state.principal_original,
            balance: state.balance,
            minimum_due: state.minimum_due,
            payment_this_cycle: state.payment_this_cycle,
            delinquent: state.was_delinquent,
            totals: LoanTotalsView {
                paid: state.total_paid,
                interest: state.total_interest,
                fees: state.total_fees,
                late_fee_count: state.late_fee_count,
            },
            origination_date: state.origination_date,
            last_interest_accrual: state.last_interest_accrual,
            closed_date: state.closed_date,
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BankConfig;
    use crate::events::EventStore;
    use crate::payments::DecisionTable;
    use hourglass_rs::{SafeTimeProvider, TimeSource};
    use rust_decimal_macros::dec;

    #[test]
    fn test_loan_view_serializes_money_as_strings() {
        let config = BankConfig::standard(dec!(10)).unwrap();
        let table = DecisionTable::from_config(&config);
        let time = SafeTimeProvider::new(TimeSource::Test(Utc::now()));
        let mut events = EventStore::new();
        let loan = InstallmentLoan::originate(1000, 1, Money::from_major(1_000), &table, &time, &mut events);

        let json = LoanView::from_loan(&loan).to_json_pretty().unwrap();
        assert!(json.contains("\"balance\": \"1000.00\""));
        assert!(json.contains("\"minimum_due\": \"18.33\""));
        assert!(json.contains("\"status\": \"Open\""));

        let parsed: LoanView = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.balance, Money::from_major(1_000));
        assert_eq!(parsed.last_interest_accrual, parsed.origination_date);
        assert!(parsed.closed_date.is_none());
    }
}
