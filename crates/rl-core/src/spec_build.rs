//! Spec candidate construction: projecting the attributes a Spec variant is
//! keyed by out of an event's traits. The get-or-create dedup itself is a
//! storage concern (`rl-persistence`).

use rl_domain::{InstanceSpec, NormalizedEvent, ResourceKind, Spec};

use crate::errors::ReduceError;

pub fn build_spec(kind: ResourceKind, event: &NormalizedEvent) -> Result<Spec, ReduceError> {
    match kind {
        ResourceKind::Instance => {
            let instance_type = required_str(event, "instance_type")?;
            let state = required_str(event, "state")?;
            Ok(Spec::Instance(InstanceSpec { instance_type, state }))
        }
        ResourceKind::Volume => {
            let volume_type = required_str(event, "volume_type")?;
            let state = required_str(event, "state")?;
            let volume_size = event
                .trait_int("volume_size")
                .ok_or_else(|| ReduceError::Malformed("missing trait: volume_size".to_string()))?;
            Ok(Spec::Volume(rl_domain::VolumeSpec { volume_type, volume_size, state }))
        }
    }
}

fn required_str(event: &NormalizedEvent, name: &str) -> Result<String, ReduceError> {
    event
        .trait_str(name)
        .map(str::to_string)
        .ok_or_else(|| ReduceError::Malformed(format!("missing trait: {name}")))
}
