use crate::application::driver::GateView;
use crate::domain::money::{Amount, Currency, Money};
use crate::domain::receipt::Receipt;
use crate::domain::request::FlowKind;
use crate::error::{MutationError, Result};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
    Invalid,
    /// The gate was reset or re-armed before the cycle settled.
    Cancelled,
}

/// One output row describing how a scripted submission ended.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct OutcomeRecord {
    pub flow: FlowKind,
    pub status: OutcomeStatus,
    pub transaction_id: Option<String>,
    pub amount: Option<Amount>,
    pub currency: Option<Currency>,
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl OutcomeRecord {
    /// Builds a record from the view a gate settled on.
    ///
    /// A success reports the backend's authoritative amount; anything else reports
    /// the amount that was requested.
    pub fn settled(
        flow: FlowKind,
        requested: Money,
        view: &GateView<Receipt, MutationError>,
        elapsed: Duration,
    ) -> Self {
        let mut record = Self {
            flow,
            status: OutcomeStatus::Cancelled,
            transaction_id: None,
            amount: Some(requested.amount),
            currency: Some(requested.currency),
            error: None,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        };
        match view {
            GateView::Success { result, .. } => {
                record.status = OutcomeStatus::Success;
                record.transaction_id = Some(result.transaction_id.clone());
                record.amount = Some(result.amount);
                record.currency = Some(result.currency);
            }
            GateView::Failed { error, .. } => {
                record.status = OutcomeStatus::Failed;
                record.error = Some(error.to_string());
            }
            GateView::Idle | GateView::Processing { .. } => {}
        }
        record
    }

    /// Builds a record for a submission rejected before reaching the backend.
    pub fn invalid(flow: FlowKind, error: &impl std::fmt::Display) -> Self {
        Self {
            flow,
            status: OutcomeStatus::Invalid,
            transaction_id: None,
            amount: None,
            currency: None,
            error: Some(error.to_string()),
            elapsed_ms: 0,
        }
    }
}

pub struct OutcomeWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> OutcomeWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write(&mut self, record: &OutcomeRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
