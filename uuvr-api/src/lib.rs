#[macro_use]
macro_rules! identity_matrix {
    () => ([1.0, 0.0, 0.0, 0.0,  0.0, 1.0, 0.0, 0.0,  0.0, 0.0, 1.0, 0.0,  0.0, 0.0, 0.0, 1.0]);
}

extern crate euclid;
#[cfg(feature = "utils")]
extern crate time;

#[cfg(feature = "serde-serialization")]
#[macro_use]
extern crate serde_derive;

pub mod utils;

pub mod vr_capabilities;
pub mod vr_error;
pub mod vr_eye;
pub mod vr_eye_parameters;
pub mod vr_field_view;
pub mod vr_host;
pub mod vr_layer;
pub mod vr_matrix;
pub mod vr_pose;
pub mod vr_pose_table;
pub mod vr_runtime;

pub use vr_capabilities::{HostArchitecture, HostCapabilities, NativeVrSupport, RenderThreadModel,
                          VRApi, XrManagementSupport};
pub use vr_error::{HostError, VRCompositorError, VRFrameError, VRInitError, VRToggleError};
pub use vr_eye::VREye;
pub use vr_eye_parameters::VREyeParameters;
pub use vr_field_view::VRFieldOfView;
pub use vr_host::{CameraClearFlags, CameraId, FrameStage, HostCamera, HostCameraInfo, HostColorSpace,
                  HostEngine, HostGraphics, HostScene, HostXr, ObjectId, RenderEventFunc, RenderEventQueue,
                  RenderTextureDesc, StereoTargetEye, TextureId, XrLoaderId, XrLoaderSettings};
pub use vr_layer::{VRColorSpace, VRTextureBounds, VRTextureHandle};
pub use vr_matrix::{HmdMatrix34, HmdMatrix44};
pub use vr_pose::{from_vector, quat_from_rotation, rotation_from_quat, to_vector, yaw_rotation,
                  PoseRotation, PoseTransform, PoseVector, VRPose};
pub use vr_pose_table::{VRDevicePoseTable, VRFramePoses, VRTrackedDevicePose,
                        MAX_TRACKED_DEVICE_COUNT, TRACKED_DEVICE_INDEX_HMD};
pub use vr_runtime::{VRRuntime, VRRuntimeCreator, VRSessionHandle};
