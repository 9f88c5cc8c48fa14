use crate::domain::gate::{CycleToken, Signal};
use crate::domain::money::{Amount, Balance, Currency};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WalletError {
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Completion gate is already awaiting {0}")]
    GateBusy(CycleToken),
    #[error("Duplicate {signal} reported for {cycle}")]
    DuplicateSignal { cycle: CycleToken, signal: Signal },
    #[error("Completion gate closed")]
    GateClosed,
}

pub type Result<T> = std::result::Result<T, WalletError>;

/// Failure values delivered by a backend mutation channel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds { available: Balance, requested: Amount },
    #[error("Currency mismatch: wallet holds {wallet}, request is in {requested}")]
    CurrencyMismatch {
        wallet: Currency,
        requested: Currency,
    },
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(String),
    #[error("Backend rejected request: {0}")]
    Rejected(String),
}
