//! Capability surface of the host engine.
//!
//! The host owns every object it hands out. The VR pipeline only refers to
//! them through the copyable ids below and never destroys anything it did
//! not create itself.

use crate::{HostCapabilities, HostError, VREye, VRTextureHandle};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CameraId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XrLoaderId(pub u64);

// StereoTargetEyeMask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StereoTargetEye {
    None,
    Left,
    Right,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraClearFlags {
    Skybox,
    SolidColor,
    Depth,
    Nothing,
}

/// Read-only view of a host camera, fetched fresh whenever it is needed.
#[derive(Debug, Clone, PartialEq)]
pub struct HostCameraInfo {
    pub name: String,
    pub object: ObjectId,
    pub is_active_and_enabled: bool,
    pub target_texture: Option<TextureId>,
    pub stereo_target_eye: StereoTargetEye,
    pub depth: f32,
    pub culling_mask: i32,
    pub clear_flags: CameraClearFlags,
    pub near_clip: f32,
    pub far_clip: f32,
    pub allow_hdr: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTextureDesc {
    pub width: u32,
    pub height: u32,
    // ARGBHalf when set, ARGB32 otherwise
    pub hdr: bool,
    pub anti_aliasing: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostColorSpace {
    Gamma,
    Linear,
}

/// Native callback run by the host's render thread for each queued event id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderEventFunc(pub usize);

/// The host's low-level graphics command queue (`GL.IssuePluginEvent`).
/// Events run on the render thread in submission order.
pub trait RenderEventQueue: Send + Sync {
    fn issue_plugin_event(&self, func: RenderEventFunc, event_id: i32);

    // Returns once every event queued so far has run.
    fn synchronize(&self);
}

/// Settings of an injected XR-management loader.
#[derive(Debug, Clone, PartialEq)]
pub enum XrLoaderSettings {
    OpenVR {
        app_key: String,
        scene_application: bool,
        multi_pass: bool,
        mirror_right_eye: bool,
    },
    OpenXR {
        multi_pass: bool,
    },
}

pub trait HostScene {
    // Active, enabled cameras in the loaded scenes.
    fn active_cameras(&self) -> Vec<CameraId>;
    fn camera_info(&self, camera: CameraId) -> Result<HostCameraInfo, HostError>;
    fn main_camera(&self) -> Option<CameraId>;
    fn current_camera(&self) -> Option<CameraId>;

    fn create_object(&mut self, name: &str, parent: Option<ObjectId>) -> Result<ObjectId, HostError>;
    fn destroy_object(&mut self, object: ObjectId) -> Result<(), HostError>;
    fn set_object_active(&mut self, object: ObjectId, active: bool) -> Result<(), HostError>;
    fn add_camera(&mut self, object: ObjectId) -> Result<CameraId, HostError>;

    fn local_position(&self, object: ObjectId) -> Result<[f32; 3], HostError>;
    fn set_local_position(&mut self, object: ObjectId, position: [f32; 3]) -> Result<(), HostError>;
    fn local_rotation(&self, object: ObjectId) -> Result<[f32; 4], HostError>;
    fn set_local_rotation(&mut self, object: ObjectId, rotation: [f32; 4]) -> Result<(), HostError>;
    fn world_rotation(&self, object: ObjectId) -> Result<[f32; 4], HostError>;
    fn set_world_rotation(&mut self, object: ObjectId, rotation: [f32; 4]) -> Result<(), HostError>;
}

pub trait HostCamera {
    // Camera.CopyFrom
    fn copy_camera_settings(&mut self, from: CameraId, to: CameraId) -> Result<(), HostError>;
    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool) -> Result<(), HostError>;
    fn set_culling_mask(&mut self, camera: CameraId, mask: i32) -> Result<(), HostError>;
    fn set_clear_flags(&mut self, camera: CameraId, flags: CameraClearFlags) -> Result<(), HostError>;
    fn set_depth(&mut self, camera: CameraId, depth: f32) -> Result<(), HostError>;
    fn set_field_of_view(&mut self, camera: CameraId, degrees: f32) -> Result<(), HostError>;
    fn set_aspect(&mut self, camera: CameraId, aspect: f32) -> Result<(), HostError>;

    // Column-major matrices, as the host stores them.
    fn world_to_camera_matrix(&self, camera: CameraId) -> Result<[f32; 16], HostError>;
    fn set_world_to_camera_matrix(&mut self, camera: CameraId, matrix: [f32; 16]) -> Result<(), HostError>;
    fn reset_world_to_camera_matrix(&mut self, camera: CameraId) -> Result<(), HostError>;
    fn stereo_view_matrix(&self, camera: CameraId, eye: VREye) -> Result<[f32; 16], HostError>;
    fn set_stereo_view_matrix(&mut self, camera: CameraId, eye: VREye, matrix: [f32; 16]) -> Result<(), HostError>;
    fn set_projection_matrix(&mut self, camera: CameraId, matrix: [f32; 16]) -> Result<(), HostError>;
    fn reset_projection_matrix(&mut self, camera: CameraId) -> Result<(), HostError>;

    /// Eye being rendered by the current pass, `None` for a mono pass.
    fn stereo_active_eye(&self, camera: CameraId) -> Option<VREye>;
    fn set_target_texture(&mut self, camera: CameraId, texture: Option<TextureId>) -> Result<(), HostError>;
    fn render(&mut self, camera: CameraId) -> Result<(), HostError>;
}

pub trait HostGraphics {
    fn create_render_texture(&mut self, desc: &RenderTextureDesc) -> Result<TextureId, HostError>;
    fn destroy_render_texture(&mut self, texture: TextureId) -> Result<(), HostError>;
    fn native_texture_ptr(&self, texture: TextureId) -> Result<VRTextureHandle, HostError>;
    // None restores the back buffer.
    fn set_render_target(&mut self, texture: Option<TextureId>) -> Result<(), HostError>;
    fn blit_to_screen(&mut self, texture: TextureId) -> Result<(), HostError>;
    // QualitySettings.antiAliasing, 0 when disabled
    fn anti_aliasing(&self) -> u32;
    fn active_color_space(&self) -> HostColorSpace;
    fn render_event_queue(&self) -> Option<Arc<dyn RenderEventQueue>>;
}

pub trait HostXr {
    // XRSettings.enabled
    fn set_native_vr_enabled(&mut self, enabled: bool) -> Result<(), HostError>;
    // InputTracking.GetLocalRotation(CenterEye), when the host tracks a headset.
    fn head_local_rotation(&self) -> Option<[f32; 4]>;

    fn create_xr_loader(&mut self, settings: &XrLoaderSettings) -> Result<XrLoaderId, HostError>;
    // Registers the loader with a fresh manager and runs InitializeLoaderSync.
    // Returns whether the manager ended up with an active loader.
    fn initialize_loader_sync(&mut self, loader: XrLoaderId) -> Result<bool, HostError>;
    fn start_subsystems(&mut self, loader: XrLoaderId) -> Result<(), HostError>;
    fn loader_initialize(&mut self, loader: XrLoaderId) -> bool;
    fn loader_start(&mut self, loader: XrLoaderId) -> bool;
    fn loader_stop(&mut self, loader: XrLoaderId) -> bool;
    fn loader_deinitialize(&mut self, loader: XrLoaderId) -> bool;
}

/// Everything the VR pipeline needs from the host engine.
pub trait HostEngine: HostScene + HostCamera + HostGraphics + HostXr {
    /// Probed once when the context is created.
    fn probe_capabilities(&self) -> HostCapabilities;
}

/// Host callback the pipeline is being driven from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStage {
    Update,
    FixedUpdate,
    LateUpdate,
    BeforeRender,
    PreCull(CameraId),
    PreRender(CameraId),
    BeginFrameRendering,
    EndFrameRendering,
    EndOfFrame,
}
