use super::receipt::Receipt;
use super::request::{TopUpRequest, TransferRequest};
use crate::error::MutationError;
use async_trait::async_trait;
use std::sync::Arc;

/// A backend write that resolves exactly once per call.
#[async_trait]
pub trait MutationChannel<R: Send + 'static>: Send + Sync {
    async fn submit(&self, request: R) -> Result<Receipt, MutationError>;
}

pub type TopUpChannel = Arc<dyn MutationChannel<TopUpRequest>>;
pub type TransferChannel = Arc<dyn MutationChannel<TransferRequest>>;
