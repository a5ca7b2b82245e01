//! rl-domain
//!
//! Value types for the resource-lifecycle ledger: the Resource/Period/Spec
//! data model, plus the transient Event shape events arrive in. No
//! persistence, no classification/reduction logic — those live in
//! `rl-core` and `rl-persistence`.

pub mod error;
pub mod event;
pub mod resource;
pub mod resource_kind;
pub mod spec;

pub use error::DomainError;
pub use event::{NormalizedEvent, RawEvent, TraitValue};
pub use resource::{LoadedPeriod, LoadedResource, Period, ResourceKey, ResourceState};
pub use resource_kind::ResourceKind;
pub use spec::{InstanceSpec, Spec, SpecId, VolumeSpec};
