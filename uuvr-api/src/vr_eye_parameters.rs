use crate::{VRFieldOfView, VRPose, VRTextureBounds};

// Everything needed to render and submit one eye. Rebuilt each time a
// session starts and dropped with it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VREyeParameters {
    // Raw projection tangents
    pub field_of_view: VRFieldOfView,

    // Column-major projection for the camera's clip planes
    pub projection_matrix: [f32; 16],

    // Offset of the eye from the head, in head space
    pub eye_to_head: VRPose,

    // Part of the eye texture the compositor samples
    pub texture_bounds: VRTextureBounds,
}

impl Default for VREyeParameters {
    fn default() -> VREyeParameters {
        VREyeParameters {
            field_of_view: VRFieldOfView::default(),
            projection_matrix: identity_matrix!(),
            eye_to_head: VRPose::IDENTITY,
            texture_bounds: VRTextureBounds::full(),
        }
    }
}
