use serde::{Deserialize, Serialize};

/// Internal identifier of a persisted, deduplicated Spec row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpecId(pub i64);

/// `OS::Nova::Server` configuration attributes. Immutable once created;
/// two periods referencing an equal tuple share one row (invariant S1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSpec {
    pub instance_type: String,
    pub state: String,
}

/// `OS::Cinder::Volume` configuration attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeSpec {
    pub volume_type: String,
    pub volume_size: i64,
    pub state: String,
}

/// A deduplicated, immutable bundle of configuration attributes describing
/// the shape of a resource during a period. A sum type, not a class
/// hierarchy: adding a resource kind is one new variant plus one table
/// entry in the classifier, never a subclass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Spec {
    Instance(InstanceSpec),
    Volume(VolumeSpec),
}

impl Spec {
    pub fn serialize_fields(&self) -> serde_json::Value {
        match self {
            Spec::Instance(s) => serde_json::json!({
                "instance_type": s.instance_type,
                "state": s.state,
            }),
            Spec::Volume(s) => serde_json::json!({
                "volume_type": s.volume_type,
                "volume_size": s.volume_size,
                "state": s.state,
            }),
        }
    }
}
