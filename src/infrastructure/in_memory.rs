use crate::domain::money::{Balance, Currency, Money};
use crate::domain::ports::MutationChannel;
use crate::domain::receipt::Receipt;
use crate::domain::request::{FundingSource, TopUpRequest, TransferRequest};
use crate::error::MutationError;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug)]
struct WalletState {
    balance: Balance,
    history: Vec<Receipt>,
    funded: HashMap<FundingSource, Balance>,
    pending_failure: Option<String>,
}

/// A single-currency wallet backend held in memory.
///
/// Stands in for the remote wallet service: top-ups credit the balance, transfers
/// debit it, and every committed write yields a [`Receipt`] with a `TXN-<n>` id.
/// Clones share the same balance and history.
#[derive(Debug, Clone)]
pub struct InMemoryWallet {
    currency: Currency,
    latency: Duration,
    contacts: Arc<HashSet<String>>,
    state: Arc<RwLock<WalletState>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryWallet {
    /// Creates a new wallet with no latency and no contact restrictions.
    ///
    /// # Arguments
    ///
    /// * `currency` - The only currency this wallet accepts; other requests fail with
    ///   [`MutationError::CurrencyMismatch`].
    /// * `opening_balance` - The balance before any top-up or transfer.
    pub fn new(currency: Currency, opening_balance: Balance) -> Self {
        Self {
            currency,
            latency: Duration::ZERO,
            contacts: Arc::new(HashSet::new()),
            state: Arc::new(RwLock::new(WalletState {
                balance: opening_balance,
                history: Vec::new(),
                funded: HashMap::new(),
                pending_failure: None,
            })),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Delays every backend call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Restricts transfers to the given recipients. An empty list allows anyone.
    pub fn with_contacts<I, S>(mut self, contacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contacts = Arc::new(contacts.into_iter().map(Into::into).collect());
        self
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub async fn balance(&self) -> Balance {
        self.state.read().await.balance
    }

    pub async fn history(&self) -> Vec<Receipt> {
        self.state.read().await.history.clone()
    }

    /// Total credited by top-ups paid through `source`.
    pub async fn funded_from(&self, source: FundingSource) -> Balance {
        self.state
            .read()
            .await
            .funded
            .get(&source)
            .copied()
            .unwrap_or(Balance::ZERO)
    }

    /// Makes the next backend call fail with `reason`.
    pub async fn fail_next(&self, reason: impl Into<String>) {
        self.state.write().await.pending_failure = Some(reason.into());
    }

    fn next_transaction_id(&self) -> String {
        format!("TXN-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn check_currency(&self, money: &Money) -> Result<(), MutationError> {
        if money.currency != self.currency {
            return Err(MutationError::CurrencyMismatch {
                wallet: self.currency,
                requested: money.currency,
            });
        }
        Ok(())
    }

    fn commit(&self, state: &mut WalletState, money: Money) -> Receipt {
        let receipt = Receipt::new(self.next_transaction_id(), Utc::now(), money);
        state.history.push(receipt.clone());
        receipt
    }
}

#[async_trait]
impl MutationChannel<TopUpRequest> for InMemoryWallet {
    async fn submit(&self, request: TopUpRequest) -> Result<Receipt, MutationError> {
        tokio::time::sleep(self.latency).await;
        let mut state = self.state.write().await;
        if let Some(reason) = state.pending_failure.take() {
            return Err(MutationError::Rejected(reason));
        }
        self.check_currency(&request.money)?;

        let amount: Balance = request.money.amount.into();
        state.balance += amount;
        *state.funded.entry(request.source).or_insert(Balance::ZERO) += amount;
        let receipt = self.commit(&mut state, request.money);
        tracing::debug!(id = %receipt.transaction_id, source = ?request.source, balance = %state.balance, "top-up committed");
        Ok(receipt)
    }
}

#[async_trait]
impl MutationChannel<TransferRequest> for InMemoryWallet {
    async fn submit(&self, request: TransferRequest) -> Result<Receipt, MutationError> {
        tokio::time::sleep(self.latency).await;
        let mut state = self.state.write().await;
        if let Some(reason) = state.pending_failure.take() {
            return Err(MutationError::Rejected(reason));
        }
        self.check_currency(&request.money)?;

        let recipient = request.recipient.trim();
        if !self.contacts.is_empty() && !self.contacts.contains(recipient) {
            return Err(MutationError::UnknownRecipient(recipient.to_string()));
        }

        let amount: Balance = request.money.amount.into();
        if state.balance < amount {
            return Err(MutationError::InsufficientFunds {
                available: state.balance,
                requested: request.money.amount,
            });
        }

        state.balance -= amount;
        let receipt = self.commit(&mut state, request.money);
        tracing::debug!(id = %receipt.transaction_id, %recipient, balance = %state.balance, "transfer committed");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Amount;
    use rust_decimal_macros::dec;

    fn sgd(value: rust_decimal::Decimal) -> Money {
        Money::new(value, Currency::Sgd).unwrap()
    }

    #[tokio::test]
    async fn test_top_up_credits_balance() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::ZERO);
        let receipt = wallet
            .submit(TopUpRequest::new(sgd(dec!(50.00))))
            .await
            .unwrap();

        assert_eq!(receipt.transaction_id, "TXN-1");
        assert_eq!(receipt.amount.value(), dec!(50.00));
        assert_eq!(wallet.balance().await, Balance::new(dec!(50.00)));
        assert_eq!(wallet.history().await, vec![receipt]);
    }

    #[tokio::test]
    async fn test_top_ups_are_tallied_by_funding_source() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::ZERO);
        wallet
            .submit(TopUpRequest::new(sgd(dec!(20))))
            .await
            .unwrap();
        let by_bank = TopUpRequest::new(sgd(dec!(30))).with_source(FundingSource::BankTransfer);
        wallet.submit(by_bank.clone()).await.unwrap();
        wallet.submit(by_bank).await.unwrap();

        assert_eq!(
            wallet.funded_from(FundingSource::Card).await,
            Balance::new(dec!(20))
        );
        assert_eq!(
            wallet.funded_from(FundingSource::BankTransfer).await,
            Balance::new(dec!(60))
        );
        assert_eq!(wallet.funded_from(FundingSource::PayNow).await, Balance::ZERO);
        assert_eq!(wallet.balance().await, Balance::new(dec!(80)));
    }

    #[tokio::test]
    async fn test_rejected_top_up_is_not_tallied() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::ZERO);
        wallet.fail_next("card declined").await;
        assert!(wallet.submit(TopUpRequest::new(sgd(dec!(5)))).await.is_err());
        assert_eq!(wallet.funded_from(FundingSource::Card).await, Balance::ZERO);
    }

    #[tokio::test]
    async fn test_transfer_debits_balance() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::new(dec!(100)));
        let receipt = wallet
            .submit(TransferRequest::new("alice", sgd(dec!(30))))
            .await
            .unwrap();

        assert_eq!(receipt.amount.value(), dec!(30));
        assert_eq!(wallet.balance().await, Balance::new(dec!(70)));
    }

    #[tokio::test]
    async fn test_transfer_insufficient_funds() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::new(dec!(10)));
        let err = wallet
            .submit(TransferRequest::new("alice", sgd(dec!(30))))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            MutationError::InsufficientFunds {
                available: Balance::new(dec!(10)),
                requested: Amount::new(dec!(30)).unwrap(),
            }
        );
        assert_eq!(
            err.to_string(),
            "Insufficient funds: available 10.00, requested 30.00"
        );
        assert_eq!(wallet.balance().await, Balance::new(dec!(10)));
        assert!(wallet.history().await.is_empty());
    }

    #[tokio::test]
    async fn test_transfer_unknown_recipient() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::new(dec!(100)))
            .with_contacts(["alice", "bob"]);
        let err = wallet
            .submit(TransferRequest::new("mallory", sgd(dec!(5))))
            .await
            .unwrap_err();
        assert_eq!(err, MutationError::UnknownRecipient("mallory".to_string()));

        assert!(
            wallet
                .submit(TransferRequest::new("bob", sgd(dec!(5))))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_currency_mismatch() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::ZERO);
        let money = Money::new(dec!(5), Currency::Usd).unwrap();
        let err = wallet.submit(TopUpRequest::new(money)).await.unwrap_err();
        assert!(matches!(err, MutationError::CurrencyMismatch { .. }));
    }

    #[tokio::test]
    async fn test_fail_next_is_one_shot() {
        let wallet = InMemoryWallet::new(Currency::Sgd, Balance::ZERO);
        wallet.fail_next("service unavailable").await;

        let err = wallet
            .submit(TopUpRequest::new(sgd(dec!(5))))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            MutationError::Rejected("service unavailable".to_string())
        );

        let receipt = wallet
            .submit(TopUpRequest::new(sgd(dec!(5))))
            .await
            .unwrap();
        assert_eq!(receipt.transaction_id, "TXN-1");
    }
}
