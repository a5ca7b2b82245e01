use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// The discriminant under which a Resource is tracked.
///
/// Mirrors the upstream platform's `OS::Nova::Server` / `OS::Cinder::Volume`
/// polymorphic discriminant strings for storage and JSON, without carrying
/// an inheritance hierarchy: a closed enum, matched on, rather than a class
/// per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Instance,
    Volume,
}

impl Serialize for ResourceKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_str())
    }
}

impl<'de> Deserialize<'de> for ResourceKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        ResourceKind::from_wire_str(&s).ok_or_else(|| DeError::custom(format!("unknown resource kind: {s}")))
    }
}

impl ResourceKind {
    pub const fn wire_str(self) -> &'static str {
        match self {
            ResourceKind::Instance => "OS::Nova::Server",
            ResourceKind::Volume => "OS::Cinder::Volume",
        }
    }

    pub fn from_wire_str(s: &str) -> Option<Self> {
        match s {
            "OS::Nova::Server" => Some(ResourceKind::Instance),
            "OS::Cinder::Volume" => Some(ResourceKind::Volume),
            _ => None,
        }
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_str())
    }
}
