#![allow(dead_code)]

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::future::Future;
use std::io::Error;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use walletgate::domain::money::{Currency, Money};
use walletgate::domain::receipt::Receipt;
use walletgate::error::MutationError;

pub fn ms(millis: u64) -> Duration {
    Duration::from_millis(millis)
}

pub fn sgd(value: Decimal) -> Money {
    Money::new(value, Currency::Sgd).unwrap()
}

pub fn receipt(id: &str, amount: Decimal) -> Receipt {
    let created_at = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
        .unwrap()
        .with_timezone(&Utc);
    Receipt::new(id, created_at, sgd(amount))
}

/// A backend call that resolves with `outcome` after `delay`.
pub fn resolve_after(
    delay: Duration,
    outcome: Result<Receipt, MutationError>,
) -> impl Future<Output = Result<Receipt, MutationError>> + Send + 'static {
    async move {
        tokio::time::sleep(delay).await;
        outcome
    }
}

/// Asserts that `start.elapsed()` landed on `millis`, allowing for the timer
/// wheel's one-millisecond rounding.
pub fn assert_elapsed(start: Instant, millis: u64) {
    let elapsed = start.elapsed();
    assert!(
        elapsed >= ms(millis) && elapsed <= ms(millis + 1),
        "expected ~{millis}ms, got {elapsed:?}"
    );
}

pub fn write_script(path: &Path, rows: &[[&str; 5]]) -> Result<(), Error> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["flow", "amount", "currency", "recipient", "note"])?;
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}
