use crate::domain::money::{Currency, Money};
use crate::domain::request::{FlowKind, FundingSource, TopUpRequest, TransferRequest};
use crate::error::{Result, WalletError};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a submission script: `flow,amount,currency,recipient,note[,source]`.
///
/// `amount` is parsed from its text so the written scale survives.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct ScriptedSubmission {
    pub flow: FlowKind,
    #[serde(with = "rust_decimal::serde::str")]
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(default)]
    pub recipient: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
    /// Top-ups only; defaults to card.
    #[serde(default)]
    pub source: Option<FundingSource>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum ScriptedRequest {
    TopUp(TopUpRequest),
    Transfer(TransferRequest),
}

impl ScriptedSubmission {
    /// Builds the typed request. Amount validation happens here; the per-flow
    /// rules are left to the flow itself.
    pub fn into_request(self) -> Result<ScriptedRequest> {
        let money = Money::new(self.amount, self.currency)?;
        match self.flow {
            FlowKind::TopUp => Ok(ScriptedRequest::TopUp(
                TopUpRequest::new(money).with_source(self.source.unwrap_or_default()),
            )),
            FlowKind::Transfer => {
                let recipient = self.recipient.ok_or_else(|| {
                    WalletError::ValidationError("Transfer missing recipient".to_string())
                })?;
                Ok(ScriptedRequest::Transfer(TransferRequest {
                    recipient,
                    money,
                    note: self.note,
                }))
            }
        }
    }
}

/// Reads scripted submissions from a CSV source.
///
/// Whitespace is trimmed and short records are accepted, so trailing optional
/// columns may be left out.
pub struct SubmissionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> SubmissionReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily deserializes each row.
    pub fn submissions(self) -> impl Iterator<Item = Result<ScriptedSubmission>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(WalletError::from))
    }
}
