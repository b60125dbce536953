use super::binding as openvr;
use super::constants;
use super::library::OpenVRLibrary;
use std::ffi::CStr;
use std::ptr;
use std::sync::Arc;
use uuvr_api::utils;
use uuvr_api::{RenderEventFunc, RenderEventQueue, VRColorSpace, VRCompositorError, VRDevicePoseTable,
               VREye, VRFieldOfView, VRFramePoses, VRFrameError, VRInitError, VRPose, VRRuntime,
               VRSessionHandle, VRTextureBounds, VRTextureHandle, VRTrackedDevicePose,
               MAX_TRACKED_DEVICE_COUNT};
use uuvr_api::vr_error::VR_INIT_ERROR_NONE;

/// How render-thread work reaches the compositor.
enum RenderThreadDispatch {
    // Through the host's command queue and the Unity hooks' event function.
    Queued {
        queue: Arc<dyn RenderEventQueue>,
        func: RenderEventFunc,
    },
    // Compositor called from the calling thread.
    Direct,
}

impl RenderThreadDispatch {
    fn select(queue: Option<Arc<dyn RenderEventQueue>>,
              func: Option<RenderEventFunc>) -> Result<RenderThreadDispatch, &'static str> {
        match (queue, func) {
            (Some(queue), Some(func)) => Ok(RenderThreadDispatch::Queued {
                queue: queue,
                func: func,
            }),
            // Calling the compositor directly would run it off the host's render thread.
            (Some(_), None) => Err("host renders on a plugin event queue but the render event hooks are missing"),
            (None, _) => Ok(RenderThreadDispatch::Direct),
        }
    }
}

// OpenVR runtime implementation
pub struct OpenVRRuntime {
    lib: Option<OpenVRLibrary>,
    load_error: Option<String>,
    system: *mut openvr::VR_IVRSystem_FnTable,
    compositor: *mut openvr::VR_IVRCompositor_FnTable,
    dispatch: RenderThreadDispatch,
    session: Option<VRSessionHandle>,
    // Stamped on every Texture_t submitted directly.
    color_space: VRColorSpace,
}

unsafe impl Send for OpenVRRuntime {}

impl OpenVRRuntime {
    pub fn new(queue: Option<Arc<dyn RenderEventQueue>>) -> OpenVRRuntime {
        let (lib, load_error) = match unsafe { OpenVRLibrary::new() } {
            Ok(lib) => (Some(lib), None),
            Err(e) => {
                warn!("Error loading {}: {}", constants::OPENVR_LIBRARY_NAME, e);
                (None, Some(e.to_string()))
            },
        };

        let func = lib.as_ref()
                      .and_then(|lib| lib.hooks.as_ref())
                      .and_then(|hooks| unsafe { (*hooks.get_render_event_func)() })
                      .map(|func| RenderEventFunc(func as usize));
        let (lib, load_error, dispatch) = match RenderThreadDispatch::select(queue, func) {
            Ok(dispatch) => (lib, load_error, dispatch),
            Err(reason) => {
                warn!("{}", reason);
                (None, Some(reason.to_owned()), RenderThreadDispatch::Direct)
            },
        };

        OpenVRRuntime {
            lib: lib,
            load_error: load_error,
            system: ptr::null_mut(),
            compositor: ptr::null_mut(),
            dispatch: dispatch,
            session: None,
            color_space: VRColorSpace::Auto,
        }
    }

    fn library(&self) -> Result<&OpenVRLibrary, VRInitError> {
        match self.lib {
            Some(ref lib) => Ok(lib),
            None => Err(VRInitError::LibraryNotFound(self.load_error.clone().unwrap_or_default())),
        }
    }

    fn system(&self) -> Option<&openvr::VR_IVRSystem_FnTable> {
        unsafe { self.system.as_ref() }
    }

    fn compositor(&self) -> Option<&openvr::VR_IVRCompositor_FnTable> {
        unsafe { self.compositor.as_ref() }
    }

    fn init_error(lib: &OpenVRLibrary, code: openvr::EVRInitError) -> VRInitError {
        let description = unsafe {
            let raw = (*lib.init_error_description)(code);
            if raw.is_null() {
                String::new()
            } else {
                CStr::from_ptr(raw).to_string_lossy().into_owned()
            }
        };
        VRInitError::from_code(code, description)
    }

    unsafe fn interface<T>(lib: &OpenVRLibrary, name: &[u8]) -> Result<*mut T, VRInitError> {
        let mut error = VR_INIT_ERROR_NONE;
        let table = (*lib.get_interface)(name.as_ptr() as *const _, &mut error) as *mut T;
        if error != VR_INIT_ERROR_NONE {
            return Err(OpenVRRuntime::init_error(lib, error));
        }
        if table.is_null() {
            return Err(VRInitError::InitError {
                code: error,
                description: format!("{} returned no function table",
                                     String::from_utf8_lossy(&name[..name.len() - 1])),
            });
        }
        Ok(table)
    }

    fn issue(&self, event_id: i32) -> bool {
        match self.dispatch {
            RenderThreadDispatch::Queued { ref queue, func } => {
                queue.issue_plugin_event(func, event_id);
                true
            },
            RenderThreadDispatch::Direct => false,
        }
    }

    fn read_poses(&self) -> Result<VRFramePoses, VRFrameError> {
        let mut render = [openvr::TrackedDevicePose_t::default(); MAX_TRACKED_DEVICE_COUNT];
        let mut game = [openvr::TrackedDevicePose_t::default(); MAX_TRACKED_DEVICE_COUNT];

        let result = match self.dispatch {
            RenderThreadDispatch::Queued { ref queue, func } => {
                queue.issue_plugin_event(func, constants::EVENT_WAIT_GET_POSES);
                // The poses are only there once the queued wait has returned.
                queue.synchronize();
                match self.compositor().and_then(|c| c.GetLastPoses) {
                    Some(get_last_poses) => unsafe {
                        get_last_poses(render.as_mut_ptr(), constants::K_UNMAXTRACKEDDEVICECOUNT,
                                       game.as_mut_ptr(), constants::K_UNMAXTRACKEDDEVICECOUNT)
                    },
                    None => return Err(VRFrameError::NoSession),
                }
            },
            RenderThreadDispatch::Direct => {
                match self.compositor().and_then(|c| c.WaitGetPoses) {
                    Some(wait_get_poses) => unsafe {
                        wait_get_poses(render.as_mut_ptr(), constants::K_UNMAXTRACKEDDEVICECOUNT,
                                       game.as_mut_ptr(), constants::K_UNMAXTRACKEDDEVICECOUNT)
                    },
                    None => return Err(VRFrameError::NoSession),
                }
            },
        };

        if result != 0 {
            return Err(VRFrameError::PoseWait(VRCompositorError(result)));
        }
        Ok(VRFramePoses {
            render: pose_table(&render),
            game: pose_table(&game),
        })
    }
}

impl Drop for OpenVRRuntime {
    fn drop(&mut self) {
        if let Some(session) = self.session {
            self.shutdown(session);
        }
    }
}

impl VRRuntime for OpenVRRuntime {
    fn is_runtime_installed(&self) -> bool {
        self.lib.as_ref().map_or(false, |lib| unsafe { (*lib.is_runtime_installed)() })
    }

    fn is_hmd_present(&self) -> bool {
        self.lib.as_ref().map_or(false, |lib| unsafe { (*lib.is_hmd_present)() })
    }

    fn init(&mut self) -> Result<VRSessionHandle, VRInitError> {
        if let Some(session) = self.session {
            return Ok(session);
        }

        let (system, compositor) = {
            let lib = self.library()?;
            let mut error = VR_INIT_ERROR_NONE;
            unsafe {
                (*lib.init_internal)(&mut error, constants::APPLICATION_TYPE_SCENE);
            }
            if error != VR_INIT_ERROR_NONE {
                return Err(OpenVRRuntime::init_error(lib, error));
            }

            let tables = unsafe {
                match OpenVRRuntime::interface::<openvr::VR_IVRSystem_FnTable>(lib, constants::IVRSYSTEM_FNTABLE) {
                    Ok(system) => OpenVRRuntime::interface::<openvr::VR_IVRCompositor_FnTable>(
                        lib, constants::IVRCOMPOSITOR_FNTABLE).map(|compositor| (system, compositor)),
                    Err(e) => Err(e),
                }
            };
            match tables {
                Ok(tables) => tables,
                Err(e) => {
                    unsafe { (*lib.shutdown_internal)() };
                    return Err(e);
                },
            }
        };

        self.system = system;
        self.compositor = compositor;
        let session = VRSessionHandle(utils::new_id());
        self.session = Some(session);
        info!("OpenVR initialized, render thread dispatch: {}",
              if let RenderThreadDispatch::Queued { .. } = self.dispatch { "queued" } else { "direct" });
        Ok(session)
    }

    fn shutdown(&mut self, session: VRSessionHandle) {
        if self.session != Some(session) {
            return;
        }
        self.session = None;
        self.system = ptr::null_mut();
        self.compositor = ptr::null_mut();
        if let Some(ref lib) = self.lib {
            unsafe { (*lib.shutdown_internal)() };
        }
    }

    fn recommended_render_target_size(&self) -> (u32, u32) {
        let (mut width, mut height) = (0, 0);
        if let Some(f) = self.system().and_then(|s| s.GetRecommendedRenderTargetSize) {
            unsafe { f(&mut width, &mut height) };
        }
        (width, height)
    }

    fn projection_raw(&self, eye: VREye) -> VRFieldOfView {
        let mut fov = VRFieldOfView::default();
        if let Some(f) = self.system().and_then(|s| s.GetProjectionRaw) {
            unsafe { f(eye as i32, &mut fov.left, &mut fov.right, &mut fov.top, &mut fov.bottom) };
        }
        fov
    }

    fn eye_to_head_transform(&self, eye: VREye) -> VRPose {
        match self.system().and_then(|s| s.GetEyeToHeadTransform) {
            Some(f) => VRPose::from_runtime_matrix34(&unsafe { f(eye as i32) }),
            None => VRPose::IDENTITY,
        }
    }

    fn projection_matrix(&self, eye: VREye, near: f32, far: f32) -> [f32; 16] {
        match self.system().and_then(|s| s.GetProjectionMatrix) {
            Some(f) => unsafe { f(eye as i32, near, far) }.to_column_major(),
            None => VRPose::IDENTITY.to_column_major(),
        }
    }

    fn wait_get_poses(&mut self) -> Result<VRFramePoses, VRFrameError> {
        if self.session.is_none() {
            return Err(VRFrameError::NoSession);
        }
        self.read_poses()
    }

    fn submit(&mut self, eye: VREye, texture: VRTextureHandle, bounds: &VRTextureBounds)
              -> Result<(), VRCompositorError> {
        let event = match eye {
            VREye::Left => constants::EVENT_SUBMIT_LEFT,
            VREye::Right => constants::EVENT_SUBMIT_RIGHT,
        };
        // The hook submits with the params registered in set_submit_params.
        if self.issue(event) {
            return Ok(());
        }

        let submit = match self.compositor().and_then(|c| c.Submit) {
            Some(submit) => submit,
            None => return Ok(()),
        };
        let mut texture = openvr::Texture_t {
            handle: texture.0 as *mut _,
            eType: constants::TEXTURE_TYPE_DIRECTX,
            eColorSpace: self.color_space as i32,
        };
        let mut bounds = texture_bounds_to_openvr(bounds);
        match unsafe { submit(eye as i32, &mut texture, &mut bounds, constants::SUBMIT_DEFAULT) } {
            0 => Ok(()),
            code => Err(VRCompositorError(code)),
        }
    }

    fn set_submit_params(&mut self, left: &VRTextureBounds, right: &VRTextureBounds) {
        if let RenderThreadDispatch::Queued { .. } = self.dispatch {
            if let Some(hooks) = self.lib.as_ref().and_then(|lib| lib.hooks.as_ref()) {
                unsafe {
                    (*hooks.set_submit_params)(texture_bounds_to_openvr(left),
                                               texture_bounds_to_openvr(right),
                                               constants::SUBMIT_DEFAULT)
                };
            }
        }
    }

    fn set_color_space(&mut self, color_space: VRColorSpace) {
        self.color_space = color_space;
        if let RenderThreadDispatch::Queued { .. } = self.dispatch {
            if let Some(hooks) = self.lib.as_ref().and_then(|lib| lib.hooks.as_ref()) {
                unsafe { (*hooks.set_color_space)(color_space as i32) };
            }
        }
    }

    fn flush(&mut self) {
        // Direct calls already reach the compositor in order.
        self.issue(constants::EVENT_FLUSH);
    }

    fn post_present_handoff(&mut self) {
        if self.session.is_none() || self.issue(constants::EVENT_POST_PRESENT_HANDOFF) {
            return;
        }
        if let Some(f) = self.compositor().and_then(|c| c.PostPresentHandoff) {
            unsafe { f() };
        }
    }
}

fn texture_bounds_to_openvr(bounds: &VRTextureBounds) -> openvr::VRTextureBounds_t {
    openvr::VRTextureBounds_t {
        uMin: bounds.u_min,
        vMin: bounds.v_min,
        uMax: bounds.u_max,
        vMax: bounds.v_max,
    }
}

// Runtime pose in host space. Velocity is a vector and flips z; angular
// velocity is an axial vector and flips x and y instead.
fn tracked_pose_from_openvr(pose: &openvr::TrackedDevicePose_t) -> VRTrackedDevicePose {
    let v = &pose.vVelocity.v;
    let w = &pose.vAngularVelocity.v;
    VRTrackedDevicePose {
        pose: VRPose::from_runtime_matrix34(&pose.mDeviceToAbsoluteTracking),
        velocity: [v[0], v[1], -v[2]],
        angular_velocity: [-w[0], -w[1], w[2]],
        is_valid: pose.bPoseIsValid,
        is_connected: pose.bDeviceIsConnected,
    }
}

fn pose_table(poses: &[openvr::TrackedDevicePose_t; MAX_TRACKED_DEVICE_COUNT]) -> VRDevicePoseTable {
    let mut converted = [VRTrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT];
    for (out, pose) in converted.iter_mut().zip(poses.iter()) {
        *out = tracked_pose_from_openvr(pose);
    }
    VRDevicePoseTable::new(converted)
}
