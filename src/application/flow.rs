use super::driver::{GateDriver, GateView};
use crate::config::GateConfig;
use crate::domain::gate::CycleToken;
use crate::domain::ports::MutationChannel;
use crate::domain::receipt::Receipt;
use crate::domain::request::{Submission, TopUpRequest, TransferRequest};
use crate::error::{MutationError, Result};
use std::sync::Arc;
use tracing::instrument;

pub type SubmissionView = GateView<Receipt, MutationError>;

/// One submission dialog: validates a request, sends it through the backend
/// channel and holds the processing view open through a completion gate.
///
/// Top-up and transfer differ only in their request type.
pub struct SubmissionFlow<R: Submission> {
    channel: Arc<dyn MutationChannel<R>>,
    gate: GateDriver<Receipt, MutationError>,
}

pub type TopUpFlow = SubmissionFlow<TopUpRequest>;
pub type TransferFlow = SubmissionFlow<TransferRequest>;

impl<R: Submission> SubmissionFlow<R> {
    /// Creates a flow with its own completion gate.
    ///
    /// # Arguments
    ///
    /// * `channel` - The backend that commits each submitted request.
    /// * `config` - Gate settings, see [`GateDriver::new`].
    pub fn new(channel: Arc<dyn MutationChannel<R>>, config: &GateConfig) -> Self {
        Self {
            channel,
            gate: GateDriver::new(config),
        }
    }

    /// Validates `request` and, when valid, arms the gate and starts the backend
    /// call. Returns as soon as both are under way.
    #[instrument(skip(self), fields(kind = %R::KIND))]
    pub async fn submit(&self, request: R) -> Result<CycleToken> {
        request.validate()?;
        tracing::debug!(money = %request.money(), "submitting");

        let channel = Arc::clone(&self.channel);
        self.gate
            .run(async move { channel.submit(request).await })
            .await
    }

    /// Submits and waits for the cycle to settle.
    pub async fn submit_and_wait(&self, request: R) -> Result<SubmissionView> {
        let token = self.submit(request).await?;
        self.gate.settled(token).await
    }

    /// Dismisses the dialog.
    pub async fn close(&self) {
        self.gate.reset().await;
    }

    pub fn gate(&self) -> &GateDriver<Receipt, MutationError> {
        &self.gate
    }
}
