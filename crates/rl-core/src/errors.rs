use thiserror::Error;

/// Errors raised while normalizing, classifying, or reducing a single event.
/// Propagation to a batch-level outcome is handled by the orchestrator.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReduceError {
    #[error("malformed event: {0}")]
    Malformed(String),

    #[error("unsupported event type")]
    Unsupported,

    #[error("event ignored")]
    Ignored,

    #[error("event too old")]
    EventTooOld,

    #[error("multiple open periods")]
    MultipleOpenPeriods,
}
