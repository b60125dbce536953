//! Manual render and submit loop.
//!
//! Runs once per host frame at end of frame: waits for poses, renders the
//! chosen host camera once per eye into a private texture and hands each eye
//! to the compositor. Any error in the middle of a frame shuts the session
//! down and the loop stays terminated.

use crate::arena::HelperArena;
use crate::camera::bracket::with_saved_local_transform;
use crate::config::UuvrConfig;
use uuvr_api::{CameraId, HostColorSpace, HostEngine, ObjectId, RenderTextureDesc, TextureId,
               VRColorSpace, VREye, VREyeParameters, VRFieldOfView, VRFrameError, VRFramePoses,
               VRPose, VRRuntime, VRSessionHandle, VRTextureBounds, VRTextureHandle, VRToggleError};
use uuvr_api::{from_vector, to_vector};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VRSubmitLoopSettings {
    pub mirror_to_screen: bool,
    pub eye_distance_multiplier: f32,
    pub positional_tracking: bool,
    pub flip_texture_vertically: bool,
}

impl VRSubmitLoopSettings {
    pub fn from_config(config: &UuvrConfig) -> VRSubmitLoopSettings {
        VRSubmitLoopSettings {
            mirror_to_screen: config.mirror_to_screen,
            eye_distance_multiplier: config.eye_distance_multiplier(),
            positional_tracking: config.positional_tracking,
            flip_texture_vertically: config.flip_texture_vertically,
        }
    }
}

impl Default for VRSubmitLoopSettings {
    fn default() -> VRSubmitLoopSettings {
        VRSubmitLoopSettings::from_config(&UuvrConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VRLoopStatus {
    Running,
    Terminated,
}

pub struct VRSubmitLoop {
    runtime: Box<dyn VRRuntime>,
    session: Option<VRSessionHandle>,
    camera: CameraId,
    camera_object: ObjectId,
    camera_was_enabled: bool,
    eyes: [VREyeParameters; 2],
    texture: TextureId,
    texture_handle: VRTextureHandle,
    arena: HelperArena,
    settings: VRSubmitLoopSettings,
    poses: VRFramePoses,
    head_pose: Option<VRPose>,
    status: VRLoopStatus,
    released: bool,
}

impl VRSubmitLoop {
    /// Starts a session on `runtime` and prepares `camera` for manual rendering.
    pub fn start(host: &mut dyn HostEngine,
                 mut runtime: Box<dyn VRRuntime>,
                 camera: CameraId,
                 settings: VRSubmitLoopSettings) -> Result<VRSubmitLoop, VRToggleError> {
        if !runtime.is_hmd_present() {
            return Err(uuvr_api::VRInitError::HmdNotPresent.into());
        }
        if !runtime.is_runtime_installed() {
            return Err(uuvr_api::VRInitError::RuntimeNotInstalled.into());
        }

        let session = runtime.init()?;
        let mut arena = HelperArena::new();
        match VRSubmitLoop::set_up(host, &mut *runtime, &mut arena, camera, &settings) {
            Ok(prepared) => {
                info!("VR session started, rendering from camera {:?}", camera);
                Ok(VRSubmitLoop {
                    runtime: runtime,
                    session: Some(session),
                    camera: camera,
                    camera_object: prepared.camera_object,
                    camera_was_enabled: prepared.camera_was_enabled,
                    eyes: prepared.eyes,
                    texture: prepared.texture,
                    texture_handle: prepared.texture_handle,
                    arena: arena,
                    settings: settings,
                    poses: VRFramePoses::default(),
                    head_pose: None,
                    status: VRLoopStatus::Running,
                    released: false,
                })
            },
            Err(e) => {
                runtime.shutdown(session);
                arena.release(host);
                Err(e.into())
            },
        }
    }

    fn set_up(host: &mut dyn HostEngine,
              runtime: &mut dyn VRRuntime,
              arena: &mut HelperArena,
              camera: CameraId,
              settings: &VRSubmitLoopSettings) -> Result<PreparedCamera, uuvr_api::HostError> {
        let info = host.camera_info(camera)?;
        let (width, height) = runtime.recommended_render_target_size();

        let mut eyes = [VREyeParameters::default(); 2];
        let bounds = VRTextureBounds::for_target(settings.flip_texture_vertically);
        for eye in VREye::BOTH.iter() {
            let parameters = &mut eyes[eye.index()];
            parameters.field_of_view = runtime.projection_raw(*eye);
            parameters.projection_matrix = runtime.projection_matrix(*eye, info.near_clip, info.far_clip);
            parameters.texture_bounds = bounds;
        }
        runtime.set_submit_params(&eyes[0].texture_bounds, &eyes[1].texture_bounds);

        let anti_aliasing = match host.anti_aliasing() {
            0 => 1,
            samples => samples,
        };
        let texture = arena.create_render_texture(host, &RenderTextureDesc {
            width: width,
            height: height,
            hdr: info.allow_hdr,
            anti_aliasing: anti_aliasing,
        })?;
        let texture_handle = host.native_texture_ptr(texture)?;

        let color_space = if info.allow_hdr && host.active_color_space() == HostColorSpace::Gamma {
            VRColorSpace::Gamma
        } else {
            VRColorSpace::Auto
        };
        runtime.set_color_space(color_space);

        let (aspect, field_of_view) = VRFieldOfView::combined_aspect_and_fov(&eyes[0].field_of_view,
                                                                            &eyes[1].field_of_view);
        host.set_field_of_view(camera, field_of_view)?;
        host.set_aspect(camera, aspect)?;
        // Rendered by hand from now on.
        host.set_camera_enabled(camera, false)?;

        debug!("Eye texture {}x{}, fov {} aspect {}", width, height, field_of_view, aspect);

        Ok(PreparedCamera {
            camera_object: info.object,
            camera_was_enabled: info.is_active_and_enabled,
            eyes: eyes,
            texture: texture,
            texture_handle: texture_handle,
        })
    }

    pub fn status(&self) -> VRLoopStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == VRLoopStatus::Running
    }

    pub fn camera(&self) -> CameraId {
        self.camera
    }

    pub fn settings(&self) -> &VRSubmitLoopSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: VRSubmitLoopSettings) {
        self.settings = settings;
    }

    pub fn eye_parameters(&self, eye: VREye) -> &VREyeParameters {
        &self.eyes[eye.index()]
    }

    // Copy of the poses fetched for the last frame.
    pub fn pose_snapshot(&self) -> VRFramePoses {
        self.poses
    }

    pub fn head_pose(&self) -> Option<VRPose> {
        self.head_pose
    }

    // Update and FixedUpdate: hand the frame back as soon as possible after present.
    pub fn update(&mut self) {
        if self.is_running() {
            self.runtime.post_present_handoff();
        }
    }

    /// Renders and submits one frame. Called once per host frame, at end of frame.
    pub fn end_of_frame(&mut self, host: &mut dyn HostEngine) -> VRLoopStatus {
        if !self.is_running() {
            return self.status;
        }

        if let Err(e) = self.render_frame(host) {
            error!("VR frame failed, shutting down the VR session: {}", e);
            if let Err(e) = host.set_render_target(None) {
                warn!("Failed to reset the render target: {}", e);
            }
            self.shutdown_session();
            self.status = VRLoopStatus::Terminated;
        }
        self.status
    }

    fn render_frame(&mut self, host: &mut dyn HostEngine) -> Result<(), VRFrameError> {
        if self.session.is_none() {
            return Err(VRFrameError::NoSession);
        }

        host.set_render_target(Some(self.texture))?;

        let eye_to_head = [self.runtime.eye_to_head_transform(VREye::Left),
                           self.runtime.eye_to_head_transform(VREye::Right)];
        self.poses = self.runtime.wait_get_poses()?;
        let head = self.poses.render.hmd().ok_or(VRFrameError::InvalidHeadPose)?;
        self.head_pose = Some(head);

        for eye in VREye::BOTH.iter() {
            let parameters = &mut self.eyes[eye.index()];
            parameters.eye_to_head = eye_to_head[eye.index()];

            let offset = eye_to_head[eye.index()].with_scaled_position(self.settings.eye_distance_multiplier);
            self.render_eye(host, *eye, &head, &offset)?;

            match *eye {
                VREye::Left => {
                    // Get the GPU started early to avoid bubbles at the top of the frame.
                    self.runtime.flush();
                    self.submit(VREye::Left);
                },
                VREye::Right => self.submit(VREye::Right),
            }
        }

        if self.settings.mirror_to_screen {
            host.blit_to_screen(self.texture)?;
        }
        host.set_render_target(None)?;
        Ok(())
    }

    fn render_eye(&mut self, host: &mut dyn HostEngine, eye: VREye, head: &VRPose, offset: &VRPose)
                  -> Result<(), VRFrameError> {
        let info = host.camera_info(self.camera)?;
        let eye_pose = head.compose(offset);
        let position_offset = if self.settings.positional_tracking {
            eye_pose.position
        } else {
            head.rotate_vector(&offset.position)
        };
        // Clip planes may change between frames.
        let projection = self.runtime.projection_matrix(eye, info.near_clip, info.far_clip);
        self.eyes[eye.index()].projection_matrix = projection;
        let camera = self.camera;
        let object = self.camera_object;
        let texture = self.texture;

        with_saved_local_transform(host, object, |host, saved| {
            let position = to_vector(&saved.position) + to_vector(&position_offset);
            host.set_local_position(object, from_vector(&position))?;
            host.set_local_rotation(object, eye_pose.orientation)?;
            host.set_projection_matrix(camera, projection)?;
            host.set_target_texture(camera, Some(texture))?;
            host.render(camera)?;
            Ok(())
        })
    }

    fn submit(&mut self, eye: VREye) {
        let bounds = self.eyes[eye.index()].texture_bounds;
        if let Err(e) = self.runtime.submit(eye, self.texture_handle, &bounds) {
            warn!("Skipping {:?} eye this frame: {}", eye, e);
        }
    }

    fn shutdown_session(&mut self) {
        if let Some(session) = self.session.take() {
            self.runtime.shutdown(session);
            info!("VR session shut down");
        }
    }

    /// Ends the session and gives the camera back to the host. Safe to call
    /// more than once, and after the loop terminated itself.
    pub fn stop(&mut self, host: &mut dyn HostEngine) {
        self.shutdown_session();
        self.status = VRLoopStatus::Terminated;
        if self.released {
            return;
        }
        self.released = true;

        let camera = self.camera;
        let restore = host.set_target_texture(camera, None)
                          .and_then(|_| host.reset_projection_matrix(camera))
                          .and_then(|_| host.set_camera_enabled(camera, self.camera_was_enabled));
        if let Err(e) = restore {
            warn!("Failed to restore camera {:?} after VR: {}", camera, e);
        }
        self.arena.release(host);
    }
}

struct PreparedCamera {
    camera_object: ObjectId,
    camera_was_enabled: bool,
    eyes: [VREyeParameters; 2],
    texture: TextureId,
    texture_handle: VRTextureHandle,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockHost, MockVRRuntime, MockVRState, MockVRStatePtr};
    use std::sync::{Arc, Mutex};
    use uuvr_api::HostScene;

    fn runtime() -> (Box<dyn VRRuntime>, MockVRStatePtr) {
        let state: MockVRStatePtr = Arc::new(Mutex::new(MockVRState::default()));
        (Box::new(MockVRRuntime::new(state.clone())), state)
    }

    #[test]
    fn start_prepares_camera_and_texture() {
        let mut host = MockHost::new();
        host.color_space = HostColorSpace::Gamma;
        let camera = host.add_scene_camera("Main Camera");
        host.camera_mut(camera).unwrap().allow_hdr = true;
        let (runtime, state) = runtime();

        let submit_loop = VRSubmitLoop::start(&mut host, runtime, camera, VRSubmitLoopSettings::default()).unwrap();
        assert!(submit_loop.is_running());

        let desc = *host.textures.values().next().unwrap();
        assert_eq!(desc, RenderTextureDesc {
            width: 1512,
            height: 1680,
            hdr: true,
            anti_aliasing: 1,
        });
        let state = state.lock().unwrap();
        assert_eq!(state.color_space, Some(VRColorSpace::Gamma));
        let flipped = VRTextureBounds::flipped_vertically();
        assert_eq!(state.submit_params, Some((flipped, flipped)));

        let mock_camera = host.camera(camera).unwrap();
        assert!(!mock_camera.enabled);
        let (aspect, fov) = VRFieldOfView::combined_aspect_and_fov(&state.field_of_view[0], &state.field_of_view[1]);
        assert_eq!(mock_camera.field_of_view, fov);
        assert_eq!(mock_camera.aspect, aspect);
    }

    #[test]
    fn eye_descriptors_keep_rendered_projection() {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let (runtime, _) = runtime();
        let mut submit_loop = VRSubmitLoop::start(&mut host, runtime, camera, VRSubmitLoopSettings::default()).unwrap();
        let identity: [f32; 16] = [1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0];
        assert_ne!(submit_loop.eye_parameters(VREye::Left).projection_matrix, identity);

        host.camera_mut(camera).unwrap().far_clip = 50.0;
        assert_eq!(submit_loop.end_of_frame(&mut host), VRLoopStatus::Running);
        assert_eq!(host.renders.len(), 2);
        for (render, eye) in host.renders.iter().zip(VREye::BOTH.iter()) {
            assert_eq!(render.projection, Some(submit_loop.eye_parameters(*eye).projection_matrix));
        }
        assert_ne!(submit_loop.eye_parameters(VREye::Left).projection_matrix,
                   submit_loop.eye_parameters(VREye::Right).projection_matrix);
    }

    #[test]
    fn stop_restores_camera_once() {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let (runtime, state) = runtime();
        let mut submit_loop = VRSubmitLoop::start(&mut host, runtime, camera, VRSubmitLoopSettings::default()).unwrap();
        assert_eq!(submit_loop.end_of_frame(&mut host), VRLoopStatus::Running);

        submit_loop.stop(&mut host);
        submit_loop.stop(&mut host);
        assert_eq!(submit_loop.status(), VRLoopStatus::Terminated);
        assert_eq!(state.lock().unwrap().shutdown_calls, 1);
        assert!(host.camera(camera).unwrap().enabled);
        assert!(host.textures.is_empty());

        // Nothing reaches the runtime once stopped.
        assert_eq!(submit_loop.end_of_frame(&mut host), VRLoopStatus::Terminated);
        submit_loop.update();
        assert_eq!(state.lock().unwrap().wait_calls, 1);
        assert_eq!(state.lock().unwrap().handoffs, 0);
    }

    #[test]
    fn pose_wait_failure_terminates_before_rendering() {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let (runtime, state) = runtime();
        let mut submit_loop = VRSubmitLoop::start(&mut host, runtime, camera, VRSubmitLoopSettings::default()).unwrap();
        state.lock().unwrap().pose_wait_error = Some(106);

        assert_eq!(submit_loop.end_of_frame(&mut host), VRLoopStatus::Terminated);
        assert!(host.renders.is_empty());
        assert!(state.lock().unwrap().submit_attempts.is_empty());
        assert!(state.lock().unwrap().active_session.is_none());
        assert_eq!(host.render_target, None);
    }

    #[test]
    fn invalid_head_pose_terminates() {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let (runtime, state) = runtime();
        let mut submit_loop = VRSubmitLoop::start(&mut host, runtime, camera, VRSubmitLoopSettings::default()).unwrap();
        state.lock().unwrap().head_pose_valid = false;

        assert_eq!(submit_loop.end_of_frame(&mut host), VRLoopStatus::Terminated);
        assert!(submit_loop.head_pose().is_none());
    }

    #[test]
    fn failed_set_up_shuts_session_down() {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let object = host.camera_object(camera);
        let (runtime, state) = runtime();
        // The camera goes away between selection and set up.
        host.destroy_object(object).unwrap();

        let result = VRSubmitLoop::start(&mut host, runtime, camera, VRSubmitLoopSettings::default());
        assert!(result.is_err());
        let state = state.lock().unwrap();
        assert_eq!((state.init_calls, state.shutdown_calls), (1, 1));
        assert!(host.textures.is_empty());
    }

    #[test]
    fn positional_tracking_moves_camera_with_head() {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let (runtime, state) = runtime();
        let settings = VRSubmitLoopSettings {
            positional_tracking: true,
            ..Default::default()
        };
        let mut submit_loop = VRSubmitLoop::start(&mut host, runtime, camera, settings).unwrap();
        submit_loop.end_of_frame(&mut host);

        let head_y = state.lock().unwrap().head_pose.position[1];
        assert_eq!(host.renders.len(), 2);
        assert!(host.renders.iter().all(|r| (r.world_pose.position[1] - head_y).abs() < 1e-6));
        assert_eq!(host.local_position(host.camera_object(camera)).unwrap(), [0.0, 0.0, 0.0]);
    }
}
