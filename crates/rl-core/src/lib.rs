//! rl-core
//!
//! The pure reducer pipeline: normalize, classify, apply the
//! ignore predicate, build a Spec candidate, and run the Period Reducer
//! state machine, plus the Ingest Orchestrator that drives a batch of
//! events through all of the above. Nothing in this crate touches a
//! database or the network — that's `rl-persistence` and `rl-api`. Every
//! function here takes already-loaded state and returns what changed,
//! which is what makes it unit-testable without a database.

pub mod classifier;
pub mod errors;
pub mod ignore;
pub mod normalizer;
pub mod orchestrator;
pub mod projector;
pub mod reducer;
pub mod spec_build;

pub use classifier::{classify, Decision};
pub use errors::ReduceError;
pub use ignore::is_event_ignored;
pub use normalizer::normalize;
pub use orchestrator::{apply_batch, BatchOutcome, OrchestratorError, ResourceTransaction, StopReason, TxOutcome};
pub use projector::{clamp_period, intersects};
pub use reducer::{apply, check_watermark, ReducerOutcome};
pub use spec_build::build_spec;
