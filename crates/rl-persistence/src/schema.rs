//! Diesel schema for the resource ledger.
//!
//! Tables:
//! - `resources`: one row per `(kind, uuid)`, carrying the `updated_at`
//!   watermark (invariant R1).
//! - `periods`: the half-open interval sequence owned by a resource,
//!   `spec_id` referencing whichever spec table matches the resource's kind
//!   (no cross-table FK — the kind never changes once a resource exists, so
//!   the join target is always unambiguous at query time).
//! - `instance_specs` / `volume_specs`: deduplicated, immutable attribute
//!   bundles (invariant S1), one table per `Spec` variant.

diesel::table! {
    resources (id) {
        id -> BigInt,
        kind -> Text,
        uuid -> Text,
        project -> Text,
        updated_at -> BigInt,
    }
}

diesel::table! {
    periods (id) {
        id -> BigInt,
        resource_id -> BigInt,
        started_at -> BigInt,
        ended_at -> Nullable<BigInt>,
        spec_id -> BigInt,
    }
}

diesel::table! {
    instance_specs (id) {
        id -> BigInt,
        instance_type -> Text,
        state -> Text,
    }
}

diesel::table! {
    volume_specs (id) {
        id -> BigInt,
        volume_type -> Text,
        volume_size -> BigInt,
        state -> Text,
    }
}

diesel::joinable!(periods -> resources (resource_id));
diesel::allow_tables_to_appear_in_same_query!(resources, periods, instance_specs, volume_specs,);
