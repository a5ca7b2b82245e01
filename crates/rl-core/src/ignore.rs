//! Per-kind `is_event_ignored` predicate, evaluated after a resource has
//! been located/created, once the event's resource kind is known.

use rl_domain::{NormalizedEvent, ResourceKind};

pub fn is_event_ignored(kind: ResourceKind, event: &NormalizedEvent) -> bool {
    match kind {
        ResourceKind::Instance => {
            let state_is_deleted = event.trait_str("state") == Some("deleted");
            let no_deleted_at = !event.has_trait("deleted_at");
            if state_is_deleted && no_deleted_at {
                return true;
            }
            !event.has_trait("created_at") && !event.has_trait("launched_at")
        }
        ResourceKind::Volume => matches!(event.trait_str("state"), Some("creating") | Some("deleting")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn event(pairs: &[(&str, &str)]) -> NormalizedEvent {
        let mut traits = BTreeMap::new();
        for (k, v) in pairs {
            traits.insert(k.to_string(), rl_domain::TraitValue::Str(v.to_string()));
        }
        NormalizedEvent { generated: chrono::Utc::now(), event_type: "x".to_string(), traits }
    }

    #[test]
    fn instance_delete_announcement_without_deleted_at_is_ignored() {
        let e = event(&[("state", "deleted"), ("created_at", "2020-01-01T00:00:00")]);
        assert!(is_event_ignored(ResourceKind::Instance, &e));
    }

    #[test]
    fn instance_delete_with_deleted_at_is_not_ignored() {
        let mut e = event(&[("state", "deleted"), ("created_at", "2020-01-01T00:00:00")]);
        e.traits.insert("deleted_at".to_string(), rl_domain::TraitValue::Str("2020-01-01T01:00:00".to_string()));
        assert!(!is_event_ignored(ResourceKind::Instance, &e));
    }

    #[test]
    fn instance_without_created_or_launched_is_ignored() {
        let e = event(&[("state", "ACTIVE")]);
        assert!(is_event_ignored(ResourceKind::Instance, &e));
    }

    #[test]
    fn volume_transient_states_are_ignored() {
        assert!(is_event_ignored(ResourceKind::Volume, &event(&[("state", "creating")])));
        assert!(is_event_ignored(ResourceKind::Volume, &event(&[("state", "deleting")])));
        assert!(!is_event_ignored(ResourceKind::Volume, &event(&[("state", "available")])));
    }
}
