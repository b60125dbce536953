use crate::keyboard::KeyCode;
use uuvr_api::VRApi;

/// How a host camera follows the headset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum CameraTrackingMode {
    // Head rotation written straight into the camera's local rotation.
    Absolute,
    // View matrix copied from a hidden tracking camera.
    RelativeMatrix,
    // World rotation swapped with the tracking camera's around each frame render.
    RelativeTransform,
    // A separate child camera renders and the host camera is muted.
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum TogglerPreference {
    Auto,
    NativeFlag,
    PluginLoader,
    ManualSession,
}

/// Settings already resolved by the plugin's config loader.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
#[cfg_attr(feature = "serde-serialization", serde(default))]
pub struct UuvrConfig {
    pub camera_tracking: CameraTrackingMode,
    // Also call SetStereoViewMatrix in RelativeMatrix mode. Fixes culling on
    // some renderers, breaks shadows on others.
    pub relative_camera_set_stereo_view: bool,
    pub preferred_vr_api: VRApi,
    pub toggler_preference: TogglerPreference,
    pub world_scale: f32,
    pub camera_position_offset: [f32; 3],
    pub align_camera_to_horizon: bool,
    pub override_depth: bool,
    pub vr_camera_depth: f32,
    pub mirror_to_screen: bool,
    pub positional_tracking: bool,
    pub flip_texture_vertically: bool,
    pub toggle_vr_key: KeyCode,
    pub start_with_vr_enabled: bool,
}

impl Default for UuvrConfig {
    fn default() -> UuvrConfig {
        UuvrConfig {
            camera_tracking: CameraTrackingMode::RelativeMatrix,
            relative_camera_set_stereo_view: false,
            preferred_vr_api: VRApi::OpenVR,
            toggler_preference: TogglerPreference::Auto,
            world_scale: 1.0,
            camera_position_offset: [0.0, 0.0, 0.0],
            align_camera_to_horizon: false,
            override_depth: false,
            vr_camera_depth: 1.0,
            mirror_to_screen: true,
            positional_tracking: false,
            flip_texture_vertically: true,
            toggle_vr_key: KeyCode::F3,
            start_with_vr_enabled: true,
        }
    }
}

impl UuvrConfig {
    // Smaller eye distance makes the world look bigger.
    pub fn eye_distance_multiplier(&self) -> f32 {
        if self.world_scale > 0.0 {
            1.0 / self.world_scale
        } else {
            warn!("Ignoring non-positive world scale {}", self.world_scale);
            1.0
        }
    }
}
