use crate::{RenderEventQueue, VRColorSpace, VRCompositorError, VREye, VRFieldOfView,
            VRFrameError, VRFramePoses, VRInitError, VRPose, VRTextureBounds, VRTextureHandle};
use std::sync::Arc;

/// Token for an initialized runtime session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VRSessionHandle(pub u32);

/// Native VR runtime: session lifetime, display queries, pose wait and submit.
///
/// Methods below `wait_get_poses` are render-thread events. Implementations
/// marshal them onto the host's render thread when the host has one.
pub trait VRRuntime: Send {
    fn is_runtime_installed(&self) -> bool;

    fn is_hmd_present(&self) -> bool;

    fn init(&mut self) -> Result<VRSessionHandle, VRInitError>;

    fn shutdown(&mut self, session: VRSessionHandle);

    // (width, height) in pixels for one eye.
    fn recommended_render_target_size(&self) -> (u32, u32);

    fn projection_raw(&self, eye: VREye) -> VRFieldOfView;

    fn eye_to_head_transform(&self, eye: VREye) -> VRPose;

    // Column-major, DirectX clip space.
    fn projection_matrix(&self, eye: VREye, near: f32, far: f32) -> [f32; 16];

    // Blocks until the compositor releases the next frame. At most once per
    // frame, before any eye is rendered.
    fn wait_get_poses(&mut self) -> Result<VRFramePoses, VRFrameError>;

    fn submit(&mut self, eye: VREye, texture: VRTextureHandle, bounds: &VRTextureBounds)
              -> Result<(), VRCompositorError>;

    // Registers the bounds used for every later submit.
    fn set_submit_params(&mut self, left: &VRTextureBounds, right: &VRTextureBounds);

    fn set_color_space(&mut self, color_space: VRColorSpace);

    fn flush(&mut self);

    fn post_present_handoff(&mut self);
}

pub trait VRRuntimeCreator {
    // A fresh runtime per session. The queue is the host's render event
    // queue, when it has one.
    fn new_runtime(&self, queue: Option<Arc<dyn RenderEventQueue>>) -> Box<dyn VRRuntime>;
}
