use rust_decimal_macros::dec;
use std::sync::Arc;
use walletgate::domain::money::{Balance, Currency, Money};
use walletgate::domain::ports::{MutationChannel, TopUpChannel, TransferChannel};
use walletgate::domain::request::{TopUpRequest, TransferRequest};
use walletgate::infrastructure::in_memory::InMemoryWallet;

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_channels_as_trait_objects() {
    let wallet = InMemoryWallet::new(Currency::Sgd, Balance::new(dec!(100.0)));
    let top_up: TopUpChannel = Arc::new(wallet.clone());
    let transfer: TransferChannel = Arc::new(wallet.clone());

    let money = Money::new(dec!(10.00), Currency::Sgd).unwrap();

    // Verify Send + Sync by spawning tasks
    let top_up_handle = tokio::spawn(async move {
        top_up.submit(TopUpRequest::new(money)).await.unwrap()
    });
    let transfer_handle = tokio::spawn(async move {
        transfer
            .submit(TransferRequest::new("alice", money))
            .await
            .unwrap()
    });

    let top_up_receipt = top_up_handle.await.unwrap();
    let transfer_receipt = transfer_handle.await.unwrap();
    assert_ne!(top_up_receipt.transaction_id, transfer_receipt.transaction_id);

    assert_eq!(wallet.balance().await, Balance::new(dec!(100.0)));
    assert_eq!(wallet.history().await.len(), 2);
}
