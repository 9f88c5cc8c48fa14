use clap::Parser;
use miette::{IntoDiagnostic, Result};
use rust_decimal::Decimal;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;
use walletgate::application::flow::{TopUpFlow, TransferFlow};
use walletgate::config::{DEFAULT_MIN_DISPLAY_MS, GateConfig};
use walletgate::domain::money::{Balance, Currency};
use walletgate::domain::ports::{TopUpChannel, TransferChannel};
use walletgate::domain::request::{FlowKind, FundingSource, Submission};
use walletgate::infrastructure::in_memory::InMemoryWallet;
use walletgate::interfaces::csv::outcome_writer::{OutcomeRecord, OutcomeWriter};
use walletgate::interfaces::csv::submission_reader::{ScriptedRequest, SubmissionReader};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Scripted submissions CSV file (flow,amount,currency,recipient,note[,source])
    input: PathBuf,

    /// Minimum time the processing view stays up, in milliseconds
    #[arg(long, env = "WALLETGATE_MIN_DISPLAY_MS", default_value_t = DEFAULT_MIN_DISPLAY_MS)]
    min_display_ms: u64,

    /// Simulated backend latency, in milliseconds
    #[arg(long, default_value_t = 0)]
    latency_ms: u64,

    /// Opening wallet balance
    #[arg(long, default_value = "0")]
    opening_balance: Decimal,

    /// Wallet currency
    #[arg(long, default_value = "SGD")]
    currency: Currency,

    /// Known transfer recipients, comma separated. Empty allows anyone.
    #[arg(long, value_delimiter = ',')]
    contacts: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = GateConfig::from_millis(cli.min_display_ms);

    let wallet = InMemoryWallet::new(cli.currency, Balance::new(cli.opening_balance))
        .with_latency(Duration::from_millis(cli.latency_ms))
        .with_contacts(cli.contacts);
    let top_up_channel: TopUpChannel = Arc::new(wallet.clone());
    let transfer_channel: TransferChannel = Arc::new(wallet.clone());
    let top_up = TopUpFlow::new(top_up_channel, &config);
    let transfer = TransferFlow::new(transfer_channel, &config);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = SubmissionReader::new(file);
    let stdout = io::stdout();
    let mut writer = OutcomeWriter::new(stdout.lock());

    for row in reader.submissions() {
        let submission = match row {
            Ok(submission) => submission,
            Err(e) => {
                tracing::error!("Error reading submission: {}", e);
                continue;
            }
        };
        let flow = submission.flow;

        let record = match submission.into_request() {
            Ok(ScriptedRequest::TopUp(request)) => {
                let requested = request.money();
                let started = Instant::now();
                match top_up.submit_and_wait(request).await {
                    Ok(view) => OutcomeRecord::settled(flow, requested, &view, started.elapsed()),
                    Err(e) => OutcomeRecord::invalid(flow, &e),
                }
            }
            Ok(ScriptedRequest::Transfer(request)) => {
                let requested = request.money();
                let started = Instant::now();
                match transfer.submit_and_wait(request).await {
                    Ok(view) => OutcomeRecord::settled(flow, requested, &view, started.elapsed()),
                    Err(e) => OutcomeRecord::invalid(flow, &e),
                }
            }
            Err(e) => OutcomeRecord::invalid(flow, &e),
        };

        if record.error.is_some() {
            tracing::warn!(%flow, "submission did not succeed: {:?}", record.error);
        }
        writer.write(&record).into_diagnostic()?;

        // Each row is its own dialog session.
        match flow {
            FlowKind::TopUp => top_up.close().await,
            FlowKind::Transfer => transfer.close().await,
        }
    }

    writer.flush().into_diagnostic()?;
    let balance = wallet.balance().await;
    tracing::info!(%balance, "script finished");
    for source in [
        FundingSource::Card,
        FundingSource::BankTransfer,
        FundingSource::PayNow,
    ] {
        let funded = wallet.funded_from(source).await;
        tracing::info!(?source, %funded, "topped up");
    }
    Ok(())
}
