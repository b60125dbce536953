// Save/restore brackets around host camera transforms. The host's authored
// transform is put back whatever the bracketed closure returns.

use uuvr_api::{HostEngine, HostError, ObjectId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedTransform {
    pub position: [f32; 3],
    pub rotation: [f32; 4],
}

pub fn with_saved_local_transform<H, T, E, F>(host: &mut H, object: ObjectId, f: F) -> Result<T, E>
    where H: HostEngine + ?Sized,
          E: From<HostError>,
          F: FnOnce(&mut H, &SavedTransform) -> Result<T, E>
{
    let saved = SavedTransform {
        position: host.local_position(object)?,
        rotation: host.local_rotation(object)?,
    };
    let result = f(host, &saved);
    let restored = host.set_local_position(object, saved.position)
                       .and_then(|_| host.set_local_rotation(object, saved.rotation));
    match (result, restored) {
        (Err(e), _) => Err(e),
        (Ok(_), Err(e)) => Err(e.into()),
        (Ok(value), Ok(())) => Ok(value),
    }
}

/// World rotation swapped in for the duration of a host render pass that
/// starts and ends in separate callbacks.
#[derive(Debug)]
#[must_use]
pub struct RotationOverride {
    object: ObjectId,
    saved: [f32; 4],
}

impl RotationOverride {
    pub fn begin<H: HostEngine + ?Sized>(host: &mut H, object: ObjectId, rotation: [f32; 4])
                                         -> Result<RotationOverride, HostError> {
        let saved = host.world_rotation(object)?;
        host.set_world_rotation(object, rotation)?;
        Ok(RotationOverride {
            object: object,
            saved: saved,
        })
    }

    pub fn end<H: HostEngine + ?Sized>(self, host: &mut H) -> Result<(), HostError> {
        host.set_world_rotation(self.object, self.saved)
    }
}
