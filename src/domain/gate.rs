//! Dual-condition completion gate.
//!
//! A gate holds a submission's "processing" state open until two independent
//! conditions have both fired: a minimum display timer and the backend's
//! confirmation. A backend failure ends the cycle straight away.
//!
//! The gate is a plain synchronous state machine. It owns no timer and no task;
//! whoever drives it (see `application::driver`) schedules the timer and reports
//! both conditions through the named operations below. Every operation takes the
//! [`CycleToken`] returned by [`CompletionGate::arm`], so a callback from a cycle
//! that was reset or superseded is recognised and dropped.

use crate::error::{Result, WalletError};
use std::fmt;

/// Identifies one submit-to-resolution cycle of a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CycleToken(u64);

impl CycleToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CycleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cycle #{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Awaiting,
    Completed,
}

/// The callbacks that can report into a gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    MinTimeElapsed,
    ApiSuccess,
    ApiFailure,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::MinTimeElapsed => f.write_str("minimum-time signal"),
            Signal::ApiSuccess => f.write_str("backend success"),
            Signal::ApiFailure => f.write_str("backend failure"),
        }
    }
}

/// What a reported signal did to the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Recorded; the other condition is still outstanding.
    Pending,
    /// Both conditions hold; the result is now visible.
    Completed,
    /// The backend rejected; the gate is back in `Idle` with the error set.
    Failed,
    /// The signal belongs to a cycle that is no longer current and was ignored.
    Stale,
}

#[derive(Debug, Clone)]
pub struct CompletionGate<P, E> {
    phase: Phase,
    cycle: u64,
    min_time_elapsed: bool,
    api_complete: bool,
    result: Option<P>,
    error: Option<E>,
}

impl<P, E> Default for CompletionGate<P, E> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            cycle: 0,
            min_time_elapsed: false,
            api_complete: false,
            result: None,
            error: None,
        }
    }
}

impl<P, E> CompletionGate<P, E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new cycle and returns its token.
    ///
    /// Arming a `Completed` gate starts over from a clean slate. Arming while a
    /// cycle is still `Awaiting` is refused.
    pub fn arm(&mut self) -> Result<CycleToken> {
        if self.phase == Phase::Awaiting {
            return Err(WalletError::GateBusy(CycleToken(self.cycle)));
        }
        self.cycle += 1;
        self.clear();
        self.phase = Phase::Awaiting;
        Ok(CycleToken(self.cycle))
    }

    /// Records the backend's confirmed payload.
    pub fn report_api_success(&mut self, token: CycleToken, payload: P) -> Result<Transition> {
        if !self.is_current(token) {
            return Ok(Transition::Stale);
        }
        self.ensure_unresolved(token, Signal::ApiSuccess)?;
        if self.phase != Phase::Awaiting {
            return Ok(Transition::Stale);
        }
        self.result = Some(payload);
        self.api_complete = true;
        Ok(self.join())
    }

    /// Records a backend rejection. The minimum display time does not apply.
    pub fn report_api_failure(&mut self, token: CycleToken, error: E) -> Result<Transition> {
        if !self.is_current(token) {
            return Ok(Transition::Stale);
        }
        self.ensure_unresolved(token, Signal::ApiFailure)?;
        if self.phase != Phase::Awaiting {
            return Ok(Transition::Stale);
        }
        self.min_time_elapsed = false;
        self.error = Some(error);
        self.phase = Phase::Idle;
        Ok(Transition::Failed)
    }

    /// Records that the minimum display time has passed.
    pub fn on_min_time_elapsed(&mut self, token: CycleToken) -> Result<Transition> {
        if !self.is_current(token) {
            return Ok(Transition::Stale);
        }
        if self.min_time_elapsed || self.phase == Phase::Completed {
            return Err(WalletError::DuplicateSignal {
                cycle: token,
                signal: Signal::MinTimeElapsed,
            });
        }
        // A timer outliving a failed cycle is late, not duplicated.
        if self.phase != Phase::Awaiting {
            return Ok(Transition::Stale);
        }
        self.min_time_elapsed = true;
        Ok(self.join())
    }

    /// Returns the gate to `Idle` and invalidates every outstanding token.
    pub fn reset(&mut self) {
        self.cycle += 1;
        self.clear();
        self.phase = Phase::Idle;
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The confirmed payload, visible only once the gate has completed.
    pub fn result(&self) -> Option<&P> {
        match self.phase {
            Phase::Completed => self.result.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        self.error.as_ref()
    }

    pub fn min_time_elapsed(&self) -> bool {
        self.min_time_elapsed
    }

    pub fn api_complete(&self) -> bool {
        self.api_complete
    }

    /// The token of the armed cycle, if one is awaiting or completed.
    pub fn current_cycle(&self) -> Option<CycleToken> {
        match self.phase {
            Phase::Idle if self.error.is_none() => None,
            _ => Some(CycleToken(self.cycle)),
        }
    }

    fn is_current(&self, token: CycleToken) -> bool {
        token.0 == self.cycle
    }

    fn ensure_unresolved(&self, token: CycleToken, signal: Signal) -> Result<()> {
        if self.api_complete || self.result.is_some() || self.error.is_some() {
            return Err(WalletError::DuplicateSignal {
                cycle: token,
                signal,
            });
        }
        Ok(())
    }

    fn join(&mut self) -> Transition {
        if self.min_time_elapsed && self.api_complete && self.phase == Phase::Awaiting {
            self.phase = Phase::Completed;
            self.min_time_elapsed = false;
            self.api_complete = false;
            Transition::Completed
        } else {
            Transition::Pending
        }
    }

    fn clear(&mut self) {
        self.min_time_elapsed = false;
        self.api_complete = false;
        self.result = None;
        self.error = None;
    }
}
