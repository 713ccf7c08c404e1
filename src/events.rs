use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{AccountNumber, LoanId, LoanStatus};

/// all events that can be emitted against a customer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // customer events
    CustomerCreated {
        account: AccountNumber,
        name: String,
        timestamp: DateTime<Utc>,
    },

    // savings events
    Deposited {
        account: AccountNumber,
        amount: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    Withdrew {
        account: AccountNumber,
        amount: Money,
        new_balance: Money,
        timestamp: DateTime<Utc>,
    },
    WithdrawalDeclined {
        account: AccountNumber,
        requested: Money,
        available: Money,
        timestamp: DateTime<Utc>,
    },
    SavingsInterestCredited {
        account: AccountNumber,
        amount: Money,
        new_balance: Money,
        month: u32,
    },

    // loan events
    LoanOpened {
        account: AccountNumber,
        loan_id: LoanId,
        principal: Money,
        minimum_due: Money,
        timestamp: DateTime<Utc>,
    },
    PaymentReceived {
        account: AccountNumber,
        loan_id: LoanId,
        amount: Money,
        remaining_balance: Money,
        timestamp: DateTime<Utc>,
    },
    LoanClosed {
        account: AccountNumber,
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    InterestAccrued {
        account: AccountNumber,
        loan_id: LoanId,
        amount: Money,
        month: u32,
    },
    LateFeeApplied {
        account: AccountNumber,
        loan_id: LoanId,
        fee_amount: Money,
        month: u32,
    },
    MinimumPaymentSet {
        account: AccountNumber,
        loan_id: LoanId,
        amount: Money,
        month: u32,
    },
    StatusChanged {
        account: AccountNumber,
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        month: u32,
    },
}

impl Event {
    /// line shown under "Recent Activity" on a statement, if the event is customer-facing
    pub fn activity_line(&self) -> Option<String> {
        match self {
            Event::Deposited { amount, .. } => Some(format!("Deposited ${}", amount)),
            Event::Withdrew { amount, .. } => Some(format!("Withdrew ${}", amount)),
            Event::WithdrawalDeclined { requested, .. } => {
                Some(format!("Failed withdrawal of ${} (insufficient funds)", requested))
            }
            Event::LoanOpened { loan_id, principal, .. } => {
                Some(format!("Opened loan #{} for ${}", loan_id, principal))
            }
            Event::PaymentReceived { loan_id, amount, .. } => {
                Some(format!("Paid ${} on loan #{}", amount, loan_id))
            }
            Event::LateFeeApplied { loan_id, fee_amount, .. } => {
                Some(format!("Late fee of ${} charged on loan #{}", fee_amount, loan_id))
            }
            Event::LoanClosed { loan_id, .. } => Some(format!("Loan #{} closed.", loan_id)),
            Event::CustomerCreated { .. }
            | Event::SavingsInterestCredited { .. }
            | Event::InterestAccrued { .. }
            | Event::MinimumPaymentSet { .. }
            | Event::StatusChanged { .. } => None,
        }
    }
}

/// append-only event log for one customer
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn extend(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// customer-facing activity lines in the order they happened
    pub fn activity(&self) -> Vec<String> {
        self.events.iter().filter_map(Event::activity_line).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_lines() {
        let now = Utc::now();
        let mut store = EventStore::new();
        store.emit(Event::CustomerCreated { account: 1000, name: "Dan".to_string(), timestamp: now });
        store.emit(Event::LoanOpened {
            account: 1000,
            loan_id: 1,
            principal: Money::from_major(10_000),
            minimum_due: Money::from_major(200),
            timestamp: now,
        });
        store.emit(Event::InterestAccrued { account: 1000, loan_id: 1, amount: Money::from_major(100), month: 1 });
        store.emit(Event::PaymentReceived {
            account: 1000,
            loan_id: 1,
            amount: Money::from_major(6),
            remaining_balance: Money::from_major(10_094),
            timestamp: now,
        });
        store.emit(Event::LoanClosed { account: 1000, loan_id: 1, timestamp: now });

        assert_eq!(store.len(), 5);
        assert_eq!(
            store.activity(),
            vec![
                "Opened loan #1 for $10000.00".to_string(),
                "Paid $6.00 on loan #1".to_string(),
                "Loan #1 closed.".to_string(),
            ]
        );
    }

    #[test]
    fn test_savings_activity_lines() {
        let now = Utc::now();
        let deposit = Event::Deposited {
            account: 1000,
            amount: Money::from_str_exact("99.996").unwrap(),
            new_balance: Money::from_major(100),
            timestamp: now,
        };
        assert_eq!(deposit.activity_line().unwrap(), "Deposited $100.00");

        let declined = Event::WithdrawalDeclined {
            account: 1000,
            requested: Money::from_major(6_000),
            available: Money::from_major(5_000),
            timestamp: now,
        };
        assert!(declined.activity_line().unwrap().starts_with("Failed withdrawal"));
    }
}
