//! Event Classifier.
//!
//! Table-driven: adding a resource kind is one new table entry — no
//! inheritance hierarchy, a match over a fixed, closed set of prefixes.

use rl_domain::ResourceKind;

/// The classifier's decision for one event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Handled(ResourceKind),
    Ignored,
    Unsupported,
}

/// Exact-match and prefix ignore list. Checked only after the
/// more specific `compute.instance.` / `volume.` rules have been tried, so
/// `compute.` (general) never shadows `compute.instance.`.
const IGNORED_PREFIXES: &[&str] = &[
    "aggregate.",
    "compute_task.",
    "compute.",
    "flavor.",
    "keypair.",
    "libvirt.",
    "metrics.",
    "scheduler.",
    "server_group.",
    "service.",
];

const IGNORED_EXACT: &[&str] = &["volume.usage"];

/// Classifies an `event_type` string into a resource kind, an ignore, or an
/// unsupported-type rejection.
pub fn classify(event_type: &str) -> Decision {
    if event_type.starts_with("compute.instance.") {
        return Decision::Handled(ResourceKind::Instance);
    }

    // Handled iff it starts with `volume.` and isn't exactly `volume.usage`.
    if event_type.starts_with("volume.") {
        return if IGNORED_EXACT.contains(&event_type) { Decision::Ignored } else { Decision::Handled(ResourceKind::Volume) };
    }

    if IGNORED_EXACT.contains(&event_type) || IGNORED_PREFIXES.iter().any(|p| event_type.starts_with(p)) {
        return Decision::Ignored;
    }

    Decision::Unsupported
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_prefix_wins_over_general_compute_ignore() {
        assert_eq!(classify("compute.instance.exists"), Decision::Handled(ResourceKind::Instance));
        assert_eq!(classify("compute.instance.delete.start"), Decision::Handled(ResourceKind::Instance));
    }

    #[test]
    fn general_compute_is_ignored() {
        assert_eq!(classify("compute.metrics.update"), Decision::Ignored);
    }

    #[test]
    fn volume_family_is_handled_except_usage() {
        assert_eq!(classify("volume.exists"), Decision::Handled(ResourceKind::Volume));
        assert_eq!(classify("volume.delete.start"), Decision::Handled(ResourceKind::Volume));
        assert_eq!(classify("volume.usage"), Decision::Ignored);
    }

    #[test]
    fn known_ignore_prefixes() {
        for prefix in IGNORED_PREFIXES {
            assert_eq!(classify(&format!("{prefix}whatever")), Decision::Ignored, "{prefix}");
        }
    }

    #[test]
    fn unknown_event_type_is_unsupported() {
        assert_eq!(classify("identity.user.created"), Decision::Unsupported);
    }
}
