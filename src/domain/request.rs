use super::money::Money;
use crate::error::{Result, WalletError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TOP_UP_MIN: Decimal = dec!(1.00);
pub const TOP_UP_MAX: Decimal = dec!(5000.00);
pub const TRANSFER_MAX: Decimal = dec!(10000.00);
pub const RECIPIENT_MAX_LEN: usize = 64;
pub const NOTE_MAX_LEN: usize = 140;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum FlowKind {
    TopUp,
    Transfer,
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowKind::TopUp => f.write_str("topup"),
            FlowKind::Transfer => f.write_str("transfer"),
        }
    }
}

/// A form submission that can be checked before any backend call is made.
pub trait Submission: fmt::Debug + Clone + Send + Sync + 'static {
    const KIND: FlowKind;

    fn money(&self) -> Money;

    /// Rejects malformed or out-of-range input. A request that fails here never
    /// arms a completion gate.
    fn validate(&self) -> Result<()>;
}

/// How a top-up is paid for.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy, Default)]
#[serde(rename_all = "snake_case")]
pub enum FundingSource {
    #[default]
    Card,
    BankTransfer,
    PayNow,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TopUpRequest {
    pub money: Money,
    #[serde(default)]
    pub source: FundingSource,
}

impl TopUpRequest {
    pub fn new(money: Money) -> Self {
        Self {
            money,
            source: FundingSource::default(),
        }
    }

    pub fn with_source(mut self, source: FundingSource) -> Self {
        self.source = source;
        self
    }
}

impl Submission for TopUpRequest {
    const KIND: FlowKind = FlowKind::TopUp;

    fn money(&self) -> Money {
        self.money
    }

    fn validate(&self) -> Result<()> {
        let value = self.money.amount.value();
        if value < TOP_UP_MIN || value > TOP_UP_MAX {
            return Err(WalletError::ValidationError(format!(
                "Top-up amount must be between {TOP_UP_MIN} and {TOP_UP_MAX} {}",
                self.money.currency
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct TransferRequest {
    pub recipient: String,
    pub money: Money,
    #[serde(default)]
    pub note: Option<String>,
}

impl TransferRequest {
    pub fn new(recipient: impl Into<String>, money: Money) -> Self {
        Self {
            recipient: recipient.into(),
            money,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

impl Submission for TransferRequest {
    const KIND: FlowKind = FlowKind::Transfer;

    fn money(&self) -> Money {
        self.money
    }

    fn validate(&self) -> Result<()> {
        let recipient = self.recipient.trim();
        if recipient.is_empty() {
            return Err(WalletError::ValidationError(
                "Recipient is required".to_string(),
            ));
        }
        if recipient.chars().count() > RECIPIENT_MAX_LEN {
            return Err(WalletError::ValidationError(format!(
                "Recipient must be at most {RECIPIENT_MAX_LEN} characters"
            )));
        }
        if self.money.amount.value() > TRANSFER_MAX {
            return Err(WalletError::ValidationError(format!(
                "Transfer amount must not exceed {TRANSFER_MAX} {}",
                self.money.currency
            )));
        }
        if let Some(note) = &self.note
            && note.chars().count() > NOTE_MAX_LEN
        {
            return Err(WalletError::ValidationError(format!(
                "Note must be at most {NOTE_MAX_LEN} characters"
            )));
        }
        Ok(())
    }
}
