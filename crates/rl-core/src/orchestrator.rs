//! Ingest Orchestrator.
//!
//! Storage-agnostic: drives normalize → classify → {skip|error|continue}
//! and delegates the DB-touching half of each event (resource get-or-create,
//! spec get-or-create, period reduction, commit) to a `ResourceTransaction`
//! implementation. `rl-persistence` provides the real Postgres one; tests
//! can provide an in-memory fake.

use rl_domain::{NormalizedEvent, RawEvent, ResourceKind};

use crate::classifier::{classify, Decision};
use crate::errors::ReduceError;
use crate::normalizer::normalize;

/// One fully-committed unit of work per handled event: lock the resource,
/// resolve its spec, run the Period Reducer, and commit — or report why it
/// didn't happen.
pub trait ResourceTransaction {
    type Error;

    fn apply_event(&mut self, kind: ResourceKind, event: &NormalizedEvent) -> Result<(), TxOutcome<Self::Error>>;
}

/// The non-success outcomes a `ResourceTransaction` can report for one
/// event. `Reduce` carries the subset of `ReduceError` that can occur this
/// deep in the pipeline (malformed/unsupported are rejected earlier).
#[derive(Debug)]
pub enum TxOutcome<E> {
    Reduce(ReduceError),
    Store(E),
}

/// Why a batch stopped early without an error status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Ignored,
    EventTooOld,
}

/// The batch-level result, mapped by the HTTP layer to 204/202 status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchOutcome {
    /// All events applied: 204.
    AllApplied,
    /// Stopped at `at_index`: 202.
    Stopped { at_index: usize, reason: StopReason },
}

/// Fatal batch-level errors: 400 for malformed/unsupported, 409 for an
/// invariant violation, 5xx for anything the store surfaces.
#[derive(Debug)]
pub enum OrchestratorError<E> {
    Malformed(String),
    Unsupported,
    MultipleOpenPeriods,
    Store(E),
}

/// Drives one batch of raw events through the pipeline in order. An empty
/// batch is rejected by the caller with a 400 before this is ever called.
pub fn apply_batch<T: ResourceTransaction>(raw_events: Vec<RawEvent>, tx: &mut T) -> Result<BatchOutcome, OrchestratorError<T::Error>> {
    for (index, raw) in raw_events.into_iter().enumerate() {
        let event = match normalize(raw) {
            Ok(e) => e,
            Err(ReduceError::Malformed(msg)) => return Err(OrchestratorError::Malformed(msg)),
            Err(other) => return Err(OrchestratorError::Malformed(other.to_string())),
        };

        let kind = match classify(&event.event_type) {
            Decision::Handled(kind) => kind,
            Decision::Ignored => return Ok(BatchOutcome::Stopped { at_index: index, reason: StopReason::Ignored }),
            Decision::Unsupported => return Err(OrchestratorError::Unsupported),
        };

        match tx.apply_event(kind, &event) {
            Ok(()) => continue,
            Err(TxOutcome::Reduce(ReduceError::Ignored)) => {
                return Ok(BatchOutcome::Stopped { at_index: index, reason: StopReason::Ignored })
            }
            Err(TxOutcome::Reduce(ReduceError::EventTooOld)) => {
                return Ok(BatchOutcome::Stopped { at_index: index, reason: StopReason::EventTooOld })
            }
            Err(TxOutcome::Reduce(ReduceError::MultipleOpenPeriods)) => return Err(OrchestratorError::MultipleOpenPeriods),
            Err(TxOutcome::Reduce(ReduceError::Malformed(msg))) => return Err(OrchestratorError::Malformed(msg)),
            Err(TxOutcome::Reduce(ReduceError::Unsupported)) => return Err(OrchestratorError::Unsupported),
            Err(TxOutcome::Store(e)) => return Err(OrchestratorError::Store(e)),
        }
    }

    Ok(BatchOutcome::AllApplied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rl_domain::event::{TRAIT_TYPE_STRING, TRAIT_TYPE_TIMESTAMP};
    use std::collections::BTreeMap;

    struct FakeTx {
        applied: Vec<(ResourceKind, String)>,
        next_results: std::collections::VecDeque<Result<(), TxOutcome<String>>>,
    }

    impl ResourceTransaction for FakeTx {
        type Error = String;

        fn apply_event(&mut self, kind: ResourceKind, event: &NormalizedEvent) -> Result<(), TxOutcome<Self::Error>> {
            self.applied.push((kind, event.event_type.clone()));
            self.next_results.pop_front().unwrap_or(Ok(()))
        }
    }

    fn instance_raw(resource_id: &str) -> RawEvent {
        RawEvent {
            generated: "2020-06-07T01:42:54.736337".to_string(),
            event_type: "compute.instance.exists".to_string(),
            traits: vec![
                ("created_at".to_string(), TRAIT_TYPE_TIMESTAMP, serde_json::json!("2020-06-07T01:42:52")),
                ("resource_id".to_string(), TRAIT_TYPE_STRING, serde_json::json!(resource_id)),
                ("project_id".to_string(), TRAIT_TYPE_STRING, serde_json::json!("p")),
                ("instance_type".to_string(), TRAIT_TYPE_STRING, serde_json::json!("v1-standard-1")),
                ("state".to_string(), TRAIT_TYPE_STRING, serde_json::json!("ACTIVE")),
            ],
        }
    }

    #[test]
    fn unsupported_event_type_aborts_whole_batch() {
        let raw = RawEvent { generated: "2020-06-07T01:42:54".to_string(), event_type: "identity.user.created".to_string(), traits: vec![] };
        let mut tx = FakeTx { applied: vec![], next_results: Default::default() };
        let err = apply_batch(vec![raw], &mut tx).unwrap_err();
        assert!(matches!(err, OrchestratorError::Unsupported));
        assert!(tx.applied.is_empty());
    }

    #[test]
    fn ignored_event_type_stops_batch_without_touching_store() {
        let ignored = RawEvent { generated: "2020-06-07T01:42:54".to_string(), event_type: "service.update".to_string(), traits: vec![] };
        let next = instance_raw("r2");
        let mut tx = FakeTx { applied: vec![], next_results: Default::default() };
        let outcome = apply_batch(vec![ignored, next], &mut tx).unwrap();
        assert_eq!(outcome, BatchOutcome::Stopped { at_index: 0, reason: StopReason::Ignored });
        assert!(tx.applied.is_empty(), "later events in the batch must not be processed");
    }

    #[test]
    fn store_ignored_event_stops_batch_at_that_index() {
        let mut results = std::collections::VecDeque::new();
        results.push_back(Err(TxOutcome::Reduce(ReduceError::Ignored)));
        let mut tx = FakeTx { applied: vec![], next_results: results };
        let outcome = apply_batch(vec![instance_raw("r1"), instance_raw("r2")], &mut tx).unwrap();
        assert_eq!(outcome, BatchOutcome::Stopped { at_index: 0, reason: StopReason::Ignored });
        assert_eq!(tx.applied.len(), 1, "second event must not run after the stop");
    }

    #[test]
    fn multiple_open_periods_surfaces_as_a_batch_error() {
        let mut results = std::collections::VecDeque::new();
        results.push_back(Err(TxOutcome::Reduce(ReduceError::MultipleOpenPeriods)));
        let mut tx = FakeTx { applied: vec![], next_results: results };
        let err = apply_batch(vec![instance_raw("r1")], &mut tx).unwrap_err();
        assert!(matches!(err, OrchestratorError::MultipleOpenPeriods));
    }

    #[test]
    fn all_events_applied_reports_success() {
        let mut tx = FakeTx { applied: vec![], next_results: Default::default() };
        let outcome = apply_batch(vec![instance_raw("r1"), instance_raw("r2")], &mut tx).unwrap();
        assert_eq!(outcome, BatchOutcome::AllApplied);
        assert_eq!(tx.applied.len(), 2);
    }

    #[test]
    fn empty_traits_map_used_only_to_satisfy_type() {
        let _ = BTreeMap::<String, rl_domain::TraitValue>::new();
    }
}
