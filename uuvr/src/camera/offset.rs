use crate::arena::HelperArena;
use euclid::{Angle, Rotation3D, Vector3D};
use uuvr_api::{quat_from_rotation, rotation_from_quat, HostEngine, HostError, ObjectId, PoseRotation};

const IDENTITY_ROTATION: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

// Yaw-only rotation facing the same way as `rotation`, with pitch and roll
// dropped. None when looking straight up or down.
pub fn horizon_aligned_rotation(rotation: &[f32; 4]) -> Option<[f32; 4]> {
    let forward = rotation_from_quat(rotation).transform_vector3d(Vector3D::new(0.0, 0.0, 1.0));
    if forward.x.abs() < 1e-6 && forward.z.abs() < 1e-6 {
        return None;
    }
    let heading: PoseRotation = Rotation3D::around_y(Angle::radians(forward.x.atan2(forward.z)));
    Some(quat_from_rotation(&heading))
}

/// Node between a host camera and its tracking camera. Carries the user's
/// position offset and optionally keeps the tracking space level.
pub struct VRCameraOffset {
    object: ObjectId,
    parent: ObjectId,
}

impl VRCameraOffset {
    pub fn create(host: &mut dyn HostEngine, arena: &mut HelperArena, parent: ObjectId,
                  position_offset: [f32; 3]) -> Result<VRCameraOffset, HostError> {
        let object = arena.create_object(host, "VrCameraOffset", Some(parent))?;
        host.set_local_position(object, position_offset)?;
        Ok(VRCameraOffset {
            object: object,
            parent: parent,
        })
    }

    pub fn object(&self) -> ObjectId {
        self.object
    }

    pub fn set_position_offset(&self, host: &mut dyn HostEngine, offset: [f32; 3]) -> Result<(), HostError> {
        host.set_local_position(self.object, offset)
    }

    pub fn update(&self, host: &mut dyn HostEngine, align_to_horizon: bool) -> Result<(), HostError> {
        if align_to_horizon {
            let parent_rotation = host.world_rotation(self.parent)?;
            if let Some(rotation) = horizon_aligned_rotation(&parent_rotation) {
                return host.set_world_rotation(self.object, rotation);
            }
        }
        host.set_local_rotation(self.object, IDENTITY_ROTATION)
    }
}
