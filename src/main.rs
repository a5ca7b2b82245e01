//! In-memory walkthrough of the reducer state machine, no database
//! involved: create, stale-event rejection, spec-change split, and
//! deletion, each applied against a `HashMap`-backed resource store.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use rl_core::{apply, build_spec, check_watermark, classify, is_event_ignored, normalize, Decision, ReducerOutcome};
use rl_domain::{RawEvent, ResourceState, Spec, SpecId};

/// Minimal in-memory Spec Store: linear scan plus dedup, good enough for a
/// demo that never runs concurrently.
#[derive(Default)]
struct MemorySpecStore {
    specs: Vec<Spec>,
}

impl MemorySpecStore {
    fn get_or_create(&mut self, spec: Spec) -> SpecId {
        if let Some(idx) = self.specs.iter().position(|s| *s == spec) {
            return SpecId(idx as i64 + 1);
        }
        self.specs.push(spec);
        SpecId(self.specs.len() as i64)
    }
}

fn ts(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).expect("fixture timestamp").with_timezone(&Utc)
}

fn instance_event(generated: &str, instance_type: &str, state: &str, created_at: Option<&str>, deleted_at: Option<&str>) -> RawEvent {
    let mut traits = vec![
        ("resource_id".to_string(), 1, serde_json::json!("r")),
        ("project_id".to_string(), 1, serde_json::json!("p")),
        ("instance_type".to_string(), 1, serde_json::json!(instance_type)),
        ("state".to_string(), 1, serde_json::json!(state)),
    ];
    if let Some(c) = created_at {
        traits.push(("created_at".to_string(), 4, serde_json::json!(c)));
    }
    if let Some(d) = deleted_at {
        traits.push(("deleted_at".to_string(), 4, serde_json::json!(d)));
    }
    RawEvent { generated: generated.to_string(), event_type: "compute.instance.exists".to_string(), traits }
}

/// Applies one event against the demo's single-resource in-memory state,
/// printing what the reducer decided. Mirrors the shape of
/// `PgResourceTransaction::apply_event` but against a `HashMap` instead of
/// Postgres.
fn apply_demo_event(spec_store: &mut MemorySpecStore, state: &mut HashMap<&'static str, ResourceState>, key: &'static str, raw: RawEvent) {
    let normalized = match normalize(raw) {
        Ok(n) => n,
        Err(e) => {
            println!("  -> malformed: {e:?}");
            return;
        }
    };

    let kind = match classify(&normalized.event_type) {
        Decision::Handled(kind) => kind,
        Decision::Ignored => {
            println!("  -> ignored by classifier");
            return;
        }
        Decision::Unsupported => {
            println!("  -> unsupported event type");
            return;
        }
    };

    let entry = state.entry(key).or_insert_with(|| ResourceState::empty(normalized.generated));

    if check_watermark(entry.updated_at, normalized.generated).is_err() {
        println!("  -> 202: event older than current watermark, rejected");
        return;
    }

    if is_event_ignored(kind, &normalized) {
        println!("  -> 202: ignored by per-kind predicate");
        return;
    }

    let spec = build_spec(kind, &normalized).expect("demo fixtures carry required traits");
    let spec_id = spec_store.get_or_create(spec);

    let created_at_or_launched_at = normalized.trait_timestamp("created_at").or_else(|| normalized.trait_timestamp("launched_at"));
    let deleted_at = normalized.trait_timestamp("deleted_at");

    match apply(entry, normalized.generated, created_at_or_launched_at, deleted_at, spec_id) {
        Ok(ReducerOutcome::Bootstrapped) => println!("  -> bootstrapped first period"),
        Ok(ReducerOutcome::Closed) => println!("  -> closed the open period"),
        Ok(ReducerOutcome::Split) => println!("  -> split: closed current period, opened a new one"),
        Ok(ReducerOutcome::NoOp) => println!("  -> no-op, watermark advanced"),
        Err(e) => println!("  -> reducer error: {e:?}"),
    }
}

fn print_state(state: &HashMap<&'static str, ResourceState>, key: &'static str) {
    let Some(resource) = state.get(key) else {
        println!("  (no resource yet)");
        return;
    };
    for (i, period) in resource.periods.iter().enumerate() {
        println!("  period[{i}]: started_at={}, ended_at={:?}, spec_id={:?}", period.started_at, period.ended_at, period.spec_id);
    }
}

fn main() {
    println!("Resource Lifecycle Ledger — in-memory scenario walkthrough");
    println!("============================================================");

    let mut spec_store = MemorySpecStore::default();
    let mut state: HashMap<&'static str, ResourceState> = HashMap::new();

    println!("\nScenario A — single instance create");
    apply_demo_event(
        &mut spec_store,
        &mut state,
        "scenario-a",
        instance_event("2020-06-07T01:42:54.736337Z", "v1-standard-1", "ACTIVE", Some("2020-06-07T01:42:52Z"), None),
    );
    print_state(&state, "scenario-a");

    println!("\nScenario B — stale event rejection");
    apply_demo_event(
        &mut spec_store,
        &mut state,
        "scenario-b",
        instance_event("2020-06-07T01:42:54Z", "v1-standard-1", "ACTIVE", Some("2020-06-07T01:42:00Z"), None),
    );
    apply_demo_event(
        &mut spec_store,
        &mut state,
        "scenario-b",
        instance_event("2020-06-07T01:40:54Z", "v1-standard-1", "ACTIVE", Some("2020-06-07T01:42:00Z"), None),
    );
    print_state(&state, "scenario-b");

    println!("\nScenario C — spec change splits the open period");
    let t1 = "2020-06-07T01:00:00Z";
    let t2 = ts(t1) + Duration::hours(1);
    apply_demo_event(&mut spec_store, &mut state, "scenario-c", instance_event(t1, "v1-standard-1", "ACTIVE", Some(t1), None));
    apply_demo_event(
        &mut spec_store,
        &mut state,
        "scenario-c",
        instance_event(&t2.to_rfc3339(), "v1-standard-2", "ACTIVE", None, None),
    );
    print_state(&state, "scenario-c");

    println!("\nScenario D — deletion closes the open period");
    let created = "2020-06-07T02:00:00Z";
    let deleted = ts(created) + Duration::hours(1);
    apply_demo_event(&mut spec_store, &mut state, "scenario-d", instance_event(created, "v1-standard-1", "ACTIVE", Some(created), None));
    apply_demo_event(
        &mut spec_store,
        &mut state,
        "scenario-d",
        instance_event(&deleted.to_rfc3339(), "v1-standard-1", "deleted", None, Some(&deleted.to_rfc3339())),
    );
    print_state(&state, "scenario-d");

    println!("\nDone. Run rl-cli against a real Postgres database to drive the same");
    println!("reducer through the HTTP endpoints instead of this in-memory harness.");
}
