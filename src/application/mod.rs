//! Application layer.
//!
//! `GateDriver` runs a completion gate on the tokio runtime: it owns the timer task,
//! serializes both completion callbacks behind one mutex and publishes views over a
//! `watch` channel. `SubmissionFlow` builds the top-up and transfer dialogs on top.

pub mod driver;
pub mod flow;
