use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{AccountNumber, LoanId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BankError {
    #[error("no such customer: account #{account}")]
    CustomerNotFound {
        account: AccountNumber,
    },

    #[error("loan #{loan_id} not found for account #{account}")]
    LoanNotFound {
        account: AccountNumber,
        loan_id: LoanId,
    },

    #[error("loan limit reached: account #{account} already has {limit} loans")]
    LoanLimitReached {
        account: AccountNumber,
        limit: usize,
    },

    #[error("loan amount out of range: {amount} not within [{minimum}, {maximum}]")]
    PrincipalOutOfRange {
        amount: Money,
        minimum: Money,
        maximum: Money,
    },

    #[error("interest rate out of range: {rate} not within [{minimum}, {maximum}]")]
    InterestRateOutOfRange {
        rate: Rate,
        minimum: Rate,
        maximum: Rate,
    },

    #[error("invalid amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Money,
        requested: Money,
    },

    #[error("amount overflow: {amount} cannot be added to {balance}")]
    AmountOverflow {
        balance: Money,
        amount: Money,
    },

    #[error("invalid customer name")]
    InvalidCustomerName,

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, BankError>;
