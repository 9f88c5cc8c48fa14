use super::money::{Amount, Currency, Money};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The payload a backend returns once it has committed a top-up or transfer.
///
/// `amount` is authoritative: it is what the backend actually moved, which the
/// success view shows instead of what the user typed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
    pub amount: Amount,
    pub currency: Currency,
}

impl Receipt {
    pub fn new(transaction_id: impl Into<String>, created_at: DateTime<Utc>, money: Money) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            created_at,
            amount: money.amount,
            currency: money.currency,
        }
    }

    pub fn money(&self) -> Money {
        Money {
            amount: self.amount,
            currency: self.currency,
        }
    }
}
