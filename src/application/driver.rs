use crate::config::GateConfig;
use crate::domain::gate::{CompletionGate, CycleToken, Phase, Transition};
use crate::error::{Result, WalletError};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

/// What the presentation layer renders for a gate.
#[derive(Debug, Clone, PartialEq)]
pub enum GateView<P, E> {
    Idle,
    Processing { cycle: CycleToken },
    Success { cycle: CycleToken, result: P },
    Failed { cycle: CycleToken, error: E },
}

impl<P, E> GateView<P, E> {
    pub fn cycle(&self) -> Option<CycleToken> {
        match self {
            GateView::Idle => None,
            GateView::Processing { cycle }
            | GateView::Success { cycle, .. }
            | GateView::Failed { cycle, .. } => Some(*cycle),
        }
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, GateView::Processing { .. })
    }
}

struct DriverState<P, E> {
    gate: CompletionGate<P, E>,
    timer: Option<JoinHandle<()>>,
}

impl<P, E> DriverState<P, E> {
    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

struct Shared<P, E> {
    min_display: Duration,
    state: Mutex<DriverState<P, E>>,
    view: watch::Sender<GateView<P, E>>,
}

/// Drives a [`CompletionGate`] on the tokio runtime.
///
/// The driver arms the minimum-display timer, runs the backend call next to it and
/// funnels both completions through the gate. Transitions are serialized by a
/// single mutex, so the join is evaluated by whichever callback arrives second.
/// Each state change is published as a [`GateView`].
pub struct GateDriver<P, E> {
    shared: Arc<Shared<P, E>>,
}

impl<P, E> Clone for GateDriver<P, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P, E> GateDriver<P, E>
where
    P: Clone + Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
{
    /// Creates an idle driver.
    ///
    /// # Arguments
    ///
    /// * `config` - Supplies the minimum display time every armed cycle waits for
    ///   before it may complete.
    pub fn new(config: &GateConfig) -> Self {
        let (view, _) = watch::channel(GateView::Idle);
        Self {
            shared: Arc::new(Shared {
                min_display: config.min_display,
                state: Mutex::new(DriverState {
                    gate: CompletionGate::new(),
                    timer: None,
                }),
                view,
            }),
        }
    }

    /// Starts a cycle and schedules its minimum-display timer.
    ///
    /// Returns without waiting. The backend call is the caller's to run; see
    /// [`GateDriver::run`] for the combined form.
    pub async fn arm(&self) -> Result<CycleToken> {
        let mut state = self.shared.state.lock().await;
        let token = state.gate.arm()?;
        state.cancel_timer();

        let shared = Arc::clone(&self.shared);
        let delay = self.shared.min_display;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            shared.min_time_elapsed(token).await;
        }));

        self.shared.publish(GateView::Processing { cycle: token });
        tracing::debug!(%token, ?delay, "completion gate armed");
        Ok(token)
    }

    /// Arms the gate and runs `mutation` concurrently with the timer.
    pub async fn run<F>(&self, mutation: F) -> Result<CycleToken>
    where
        F: Future<Output = std::result::Result<P, E>> + Send + 'static,
    {
        let token = self.arm().await?;
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            let outcome = mutation.await;
            if let Err(e) = shared.resolve(token, outcome).await {
                tracing::error!(%token, "backend resolution rejected: {}", e);
            }
        });
        Ok(token)
    }

    pub async fn report_api_success(&self, token: CycleToken, payload: P) -> Result<Transition> {
        self.shared.resolve(token, Ok(payload)).await
    }

    pub async fn report_api_failure(&self, token: CycleToken, error: E) -> Result<Transition> {
        self.shared.resolve(token, Err(error)).await
    }

    /// Returns the gate to `Idle`, e.g. when the hosting dialog is dismissed.
    ///
    /// The pending timer is cancelled. An in-flight backend call keeps running, but
    /// its resolution no longer reaches the gate.
    pub async fn reset(&self) {
        let mut state = self.shared.state.lock().await;
        let previous = state.gate.current_cycle();
        state.gate.reset();
        state.cancel_timer();
        self.shared.publish(GateView::Idle);
        if let Some(token) = previous {
            tracing::debug!(%token, "completion gate reset");
        }
    }

    pub async fn phase(&self) -> Phase {
        self.shared.state.lock().await.gate.phase()
    }

    /// A copy of the gate's current state.
    pub async fn snapshot(&self) -> CompletionGate<P, E> {
        self.shared.state.lock().await.gate.clone()
    }

    pub fn view(&self) -> GateView<P, E> {
        GateView::clone(&self.shared.view.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<GateView<P, E>> {
        self.shared.view.subscribe()
    }

    /// Waits until the view for `token` leaves `Processing`.
    ///
    /// Resolves with `Success` or `Failed` for that cycle, or with whatever view
    /// replaced it if the gate was reset or re-armed first.
    pub async fn settled(&self, token: CycleToken) -> Result<GateView<P, E>> {
        let mut views = self.subscribe();
        let view = views
            .wait_for(|view| !matches!(view, GateView::Processing { cycle } if *cycle == token))
            .await
            .map_err(|_| WalletError::GateClosed)?;
        Ok(GateView::clone(&view))
    }
}

impl<P, E> Shared<P, E>
where
    P: Clone + Send + Sync + 'static,
    E: Clone + fmt::Display + Send + Sync + 'static,
{
    fn publish(&self, view: GateView<P, E>) {
        self.view.send_replace(view);
    }

    async fn min_time_elapsed(&self, token: CycleToken) {
        let mut state = self.state.lock().await;
        match state.gate.on_min_time_elapsed(token) {
            Ok(transition) => self.apply(&mut state, token, transition),
            Err(e) => tracing::warn!(%token, "timer signal rejected: {}", e),
        }
    }

    async fn resolve(
        &self,
        token: CycleToken,
        outcome: std::result::Result<P, E>,
    ) -> Result<Transition> {
        let mut state = self.state.lock().await;
        let transition = match outcome {
            Ok(payload) => state.gate.report_api_success(token, payload)?,
            Err(error) => state.gate.report_api_failure(token, error)?,
        };
        self.apply(&mut state, token, transition);
        Ok(transition)
    }

    fn apply(&self, state: &mut DriverState<P, E>, token: CycleToken, transition: Transition) {
        match transition {
            Transition::Pending => {
                tracing::trace!(%token, "waiting for the other completion condition");
            }
            Transition::Completed => {
                if let Some(result) = state.gate.result().cloned() {
                    self.publish(GateView::Success {
                        cycle: token,
                        result,
                    });
                }
                tracing::info!(%token, "completion gate completed");
            }
            Transition::Failed => {
                state.cancel_timer();
                if let Some(error) = state.gate.error().cloned() {
                    tracing::warn!(%token, "submission failed: {}", error);
                    self.publish(GateView::Failed {
                        cycle: token,
                        error,
                    });
                }
            }
            Transition::Stale => {
                tracing::debug!(%token, "ignoring signal from a stale cycle");
            }
        }
    }
}
