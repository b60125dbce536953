//! Process-wide entry point driven by the host's frame callbacks.

use crate::camera::VRCameraManager;
use crate::config::UuvrConfig;
use crate::keyboard::{KeyStateSource, KeyboardKey, OsKeyState};
use crate::submit_loop::VRLoopStatus;
use crate::vr_manager::VRTogglerManager;
use uuvr_api::{CameraId, FrameStage, HostCapabilities, HostEngine, HostError, VRRuntimeCreator};

pub struct UuvrContext {
    config: UuvrConfig,
    capabilities: HostCapabilities,
    manager: VRTogglerManager,
    cameras: VRCameraManager,
    toggle_key: KeyboardKey,
    key_source: Box<dyn KeyStateSource>,
}

impl UuvrContext {
    /// Probes the host once and picks how VR gets toggled for the rest of
    /// the process.
    pub fn new(host: &dyn HostEngine, config: UuvrConfig, creator: Box<dyn VRRuntimeCreator>) -> UuvrContext {
        let capabilities = host.probe_capabilities();
        debug!("Host capabilities: {:?}", capabilities);
        UuvrContext {
            manager: VRTogglerManager::new(capabilities, &config, creator),
            cameras: VRCameraManager::new(),
            toggle_key: KeyboardKey::new(config.toggle_vr_key),
            key_source: Box::new(OsKeyState),
            capabilities: capabilities,
            config: config,
        }
    }

    #[cfg(feature = "openvr")]
    pub fn with_openvr(host: &dyn HostEngine, config: UuvrConfig) -> UuvrContext {
        UuvrContext::new(host, config, crate::vr_manager::default_runtime_creator())
    }

    pub fn with_key_source(mut self, source: Box<dyn KeyStateSource>) -> UuvrContext {
        self.key_source = source;
        self
    }

    pub fn config(&self) -> &UuvrConfig {
        &self.config
    }

    pub fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    pub fn manager(&self) -> &VRTogglerManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut VRTogglerManager {
        &mut self.manager
    }

    pub fn cameras(&self) -> &VRCameraManager {
        &self.cameras
    }

    pub fn ignore_camera(&mut self, camera: CameraId) {
        self.cameras.ignore_camera(camera);
    }

    pub fn set_config(&mut self, config: UuvrConfig) {
        self.manager.apply_config(&config);
        self.toggle_key.set_key(config.toggle_vr_key);
        self.config = config;
    }

    pub fn start(&mut self, host: &mut dyn HostEngine) -> bool {
        if self.config.start_with_vr_enabled {
            self.set_vr_enabled(host, true)
        } else {
            false
        }
    }

    pub fn is_vr_enabled(&self) -> bool {
        self.manager.is_vr_enabled()
    }

    pub fn set_vr_enabled(&mut self, host: &mut dyn HostEngine, enabled: bool) -> bool {
        let enabled = self.manager.set_vr_enabled(host, enabled);
        if !enabled {
            self.cameras.detach_all(host);
        }
        enabled
    }

    pub fn toggle_vr(&mut self, host: &mut dyn HostEngine) -> bool {
        let enabled = !self.is_vr_enabled();
        self.set_vr_enabled(host, enabled)
    }

    pub fn shutdown(&mut self, host: &mut dyn HostEngine) {
        self.set_vr_enabled(host, false);
        self.cameras.detach_all(host);
    }

    pub fn on_frame_stage(&mut self, host: &mut dyn HostEngine, stage: FrameStage) {
        match stage {
            FrameStage::Update => {
                if self.toggle_key.update_is_down(&*self.key_source) {
                    self.toggle_vr(host);
                }
                if let Some(submit_loop) = self.manager.submit_loop() {
                    submit_loop.update();
                }
                if self.cameras_active() {
                    self.cameras.prune(host);
                    self.cameras.discover(host, &self.config);
                    let result = self.cameras.update(host, &self.config);
                    self.check_cameras(host, result);
                }
            },
            FrameStage::FixedUpdate => {
                if let Some(submit_loop) = self.manager.submit_loop() {
                    submit_loop.update();
                }
            },
            FrameStage::LateUpdate | FrameStage::BeforeRender => self.track(host, None),
            FrameStage::PreCull(camera) | FrameStage::PreRender(camera) => self.track(host, Some(camera)),
            FrameStage::BeginFrameRendering => {
                if self.cameras_active() {
                    let result = self.cameras.begin_frame_rendering(host);
                    self.check_cameras(host, result);
                }
            },
            FrameStage::EndFrameRendering => {
                if self.cameras_active() {
                    let result = self.cameras.end_frame_rendering(host);
                    self.check_cameras(host, result);
                }
            },
            FrameStage::EndOfFrame => {
                let status = match self.manager.submit_loop() {
                    Some(submit_loop) => submit_loop.end_of_frame(host),
                    None => return,
                };
                if status == VRLoopStatus::Terminated {
                    self.manager.session_lost(host);
                    self.cameras.detach_all(host);
                }
            },
        }
    }

    // Controllers only run while the host itself renders in stereo.
    fn cameras_active(&self) -> bool {
        self.manager.is_vr_enabled() && self.manager.drives_host_stereo()
    }

    fn track(&mut self, host: &mut dyn HostEngine, only: Option<CameraId>) {
        if !self.cameras_active() {
            return;
        }
        let head = host.head_local_rotation();
        let result = self.cameras.track(host, &self.config, head, only);
        self.check_cameras(host, result);
    }

    fn check_cameras(&mut self, host: &mut dyn HostEngine, result: Result<(), HostError>) {
        if let Err(e) = result {
            error!("VR camera update failed, disabling VR: {}", e);
            self.manager.session_lost(host);
            self.cameras.detach_all(host);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockHost, MockRuntimeCreator, MockVRControlMsg, MockVRState, MockVRStatePtr};
    use crate::config::TogglerPreference;
    use crate::keyboard::KeyCode;
    use approx::assert_relative_eq;
    use std::cell::Cell;
    use std::rc::Rc;
    use std::sync::{Arc, Mutex};
    use uuvr_api::{HostScene, VREye, VRInitError, VRToggleError, XrManagementSupport};

    const FRAME: [FrameStage; 4] = [FrameStage::Update, FrameStage::LateUpdate, FrameStage::BeforeRender,
                                    FrameStage::EndOfFrame];

    fn manual_session(host: &mut MockHost, config: UuvrConfig) -> (UuvrContext, MockVRStatePtr) {
        let state: MockVRStatePtr = Arc::new(Mutex::new(MockVRState::default()));
        let config = UuvrConfig {
            toggler_preference: TogglerPreference::ManualSession,
            ..config
        };
        let creator = Box::new(MockRuntimeCreator::with_state(state.clone()));
        (UuvrContext::new(host, config, creator), state)
    }

    fn run_frame(context: &mut UuvrContext, host: &mut MockHost) {
        for stage in FRAME.iter() {
            context.on_frame_stage(host, *stage);
        }
    }

    #[test]
    fn missing_hmd_fails_enable_without_native_calls() {
        let mut host = MockHost::new();
        let main = host.add_scene_camera("Main Camera");
        let (mut context, state) = manual_session(&mut host, UuvrConfig::default());
        state.lock().unwrap().handle_msg(MockVRControlMsg::SetHmdPresent(false));

        assert!(!context.start(&mut host));
        assert!(!context.is_vr_enabled());
        run_frame(&mut context, &mut host);

        let state = state.lock().unwrap();
        assert_eq!(state.init_calls, 0);
        assert!(state.submit_attempts.is_empty());
        assert!(host.camera(main).unwrap().enabled);
        assert!(host.textures.is_empty());
    }

    fn assert_enable_fails_with(msg: MockVRControlMsg, expected: VRInitError, init_calls: usize) {
        let mut host = MockHost::new();
        let main = host.add_scene_camera("Main Camera");
        let (mut context, state) = manual_session(&mut host, UuvrConfig::default());
        state.lock().unwrap().handle_msg(msg);

        assert!(!context.set_vr_enabled(&mut host, true));
        assert!(!context.is_vr_enabled());
        assert_eq!(context.manager().last_error(), Some(&VRToggleError::Init(expected)));
        assert!(context.manager_mut().submit_loop().is_none());

        let state = state.lock().unwrap();
        assert_eq!(state.init_calls, init_calls);
        assert_eq!(state.active_session, None);
        assert_eq!(state.native_frame_calls(), 0);
        assert!(host.camera(main).unwrap().enabled);
        assert!(host.textures.is_empty());
    }

    #[test]
    fn enable_reports_missing_hmd() {
        assert_enable_fails_with(MockVRControlMsg::SetHmdPresent(false), VRInitError::HmdNotPresent, 0);
    }

    #[test]
    fn enable_reports_missing_runtime() {
        assert_enable_fails_with(MockVRControlMsg::SetRuntimeInstalled(false), VRInitError::RuntimeNotInstalled, 0);
    }

    #[test]
    fn enable_reports_runtime_init_error() {
        let expected = VRInitError::InitError {
            code: 110,
            description: "mock init error 110".into(),
        };
        assert_enable_fails_with(MockVRControlMsg::SetInitError(Some(110)), expected, 1);
    }

    #[test]
    fn enable_succeeds_once_init_error_clears() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        let (mut context, state) = manual_session(&mut host, UuvrConfig::default());
        state.lock().unwrap().handle_msg(MockVRControlMsg::SetInitError(Some(108)));

        assert!(!context.set_vr_enabled(&mut host, true));
        assert_eq!(context.manager().last_error(), Some(&VRToggleError::Init(VRInitError::HmdNotPresent)));

        state.lock().unwrap().handle_msg(MockVRControlMsg::SetInitError(None));
        assert!(context.set_vr_enabled(&mut host, true));
        assert!(context.is_vr_enabled());
        assert_eq!(context.manager().last_error(), None);
        assert!(state.lock().unwrap().active_session.is_some());
    }

    #[test]
    fn failed_right_eye_submit_keeps_loop_running() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        let (mut context, state) = manual_session(&mut host, UuvrConfig::default());
        state.lock().unwrap().handle_msg(MockVRControlMsg::SetSubmitError(VREye::Right, Some(101)));

        assert!(context.start(&mut host));
        run_frame(&mut context, &mut host);
        run_frame(&mut context, &mut host);

        {
            let state = state.lock().unwrap();
            assert_eq!(state.submit_attempts, vec![VREye::Left, VREye::Right, VREye::Left, VREye::Right]);
            assert_eq!(state.presented, vec![VREye::Left, VREye::Left]);
            assert_eq!(state.wait_calls, 2);
            assert_eq!(state.flushes, 2);
            assert!(state.active_session.is_some());
        }
        assert!(context.is_vr_enabled());
        assert_eq!(context.manager_mut().submit_loop().map(|l| l.is_running()), Some(true));
        assert_eq!(host.blits, 2);
        assert_eq!(host.render_target, None);
    }

    #[test]
    fn render_failure_mid_frame_shuts_session_down() {
        let mut host = MockHost::new();
        let main = host.add_scene_camera("Main Camera");
        let (mut context, state) = manual_session(&mut host, UuvrConfig::default());
        // Left eye renders, right eye fails.
        host.fail_render_after = Some(1);

        assert!(context.start(&mut host));
        run_frame(&mut context, &mut host);

        assert!(!context.is_vr_enabled());
        let calls = {
            let state = state.lock().unwrap();
            assert_eq!(state.presented, vec![VREye::Left]);
            assert_eq!(state.shutdown_calls, 1);
            assert!(state.active_session.is_none());
            state.native_frame_calls()
        };

        run_frame(&mut context, &mut host);
        context.on_frame_stage(&mut host, FrameStage::FixedUpdate);
        assert_eq!(state.lock().unwrap().native_frame_calls(), calls);

        let camera = host.camera(main).unwrap();
        assert!(camera.enabled);
        assert_eq!(camera.target_texture, None);
        assert_eq!(camera.projection, None);
        assert!(host.textures.is_empty());
        assert_eq!(host.render_target, None);
    }

    #[test]
    fn eyes_render_at_scaled_offsets() {
        let mut host = MockHost::new();
        let main = host.add_scene_camera("Main Camera");
        let object = host.camera_object(main);
        host.set_local_position(object, [1.0, 0.0, 0.0]).unwrap();
        let config = UuvrConfig {
            world_scale: 2.0,
            ..Default::default()
        };
        let (mut context, state) = manual_session(&mut host, config);

        assert!(context.start(&mut host));
        context.on_frame_stage(&mut host, FrameStage::EndOfFrame);

        let eye_x = state.lock().unwrap().eye_to_head[VREye::Right.index()].position[0];
        assert_eq!(host.renders.len(), 2);
        assert_relative_eq!(host.renders[0].world_pose.position[0], 1.0 - eye_x * 0.5, epsilon = 1e-6);
        assert_relative_eq!(host.renders[1].world_pose.position[0], 1.0 + eye_x * 0.5, epsilon = 1e-6);
        assert!(host.renders.iter().all(|r| r.projection.is_some() && r.target_texture.is_some()));
        assert_eq!(host.local_position(object).unwrap(), [1.0, 0.0, 0.0]);

        let head = state.lock().unwrap().head_pose;
        let submit_loop = context.manager_mut().submit_loop().unwrap();
        assert_eq!(submit_loop.head_pose(), Some(head));
        assert_eq!(submit_loop.pose_snapshot().render.hmd(), Some(head));
    }

    #[test]
    fn handoff_follows_update_and_fixed_update() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        let (mut context, state) = manual_session(&mut host, UuvrConfig::default());

        assert!(context.start(&mut host));
        context.on_frame_stage(&mut host, FrameStage::Update);
        context.on_frame_stage(&mut host, FrameStage::FixedUpdate);
        context.on_frame_stage(&mut host, FrameStage::FixedUpdate);
        assert_eq!(state.lock().unwrap().handoffs, 3);
    }

    #[test]
    fn disable_enable_reuses_set_up() {
        let mut host = MockHost::new();
        host.capabilities.xr_management = XrManagementSupport::Available {
            openvr_loader: true,
            openxr_loader: true,
        };
        let mut context = UuvrContext::new(&host, UuvrConfig::default(), MockRuntimeCreator::new());

        assert!(context.set_vr_enabled(&mut host, true));
        assert!(!context.set_vr_enabled(&mut host, false));
        assert!(context.set_vr_enabled(&mut host, true));

        let count = |name: &str| host.loader_calls.iter().filter(|&&c| c == name).count();
        assert_eq!(count("create"), 1);
        assert_eq!(count("initialize_loader_sync"), 1);
        assert_eq!(count("start"), 2);
        assert_eq!(count("stop"), 1);
    }

    struct SharedKey(Rc<Cell<bool>>);

    impl KeyStateSource for SharedKey {
        fn is_down(&self, key: KeyCode) -> bool {
            key == KeyCode::F3 && self.0.get()
        }
    }

    #[test]
    fn toggle_key_switches_native_vr() {
        let mut host = MockHost::new();
        host.capabilities.native_vr = uuvr_api::NativeVrSupport::Available { asset_patch_applied: true };
        let pressed = Rc::new(Cell::new(false));
        let mut context = UuvrContext::new(&host, UuvrConfig::default(), MockRuntimeCreator::new())
            .with_key_source(Box::new(SharedKey(pressed.clone())));

        pressed.set(true);
        context.on_frame_stage(&mut host, FrameStage::Update);
        context.on_frame_stage(&mut host, FrameStage::Update);
        assert!(host.native_vr_enabled);

        pressed.set(false);
        context.on_frame_stage(&mut host, FrameStage::Update);
        pressed.set(true);
        context.on_frame_stage(&mut host, FrameStage::Update);
        assert!(!host.native_vr_enabled);
        assert!(!context.is_vr_enabled());
    }

    #[test]
    fn broken_controller_disables_vr_once() {
        let mut host = MockHost::new();
        host.capabilities.native_vr = uuvr_api::NativeVrSupport::Available { asset_patch_applied: true };
        let main = host.add_scene_camera("Main Camera");
        let mut context = UuvrContext::new(&host, UuvrConfig::default(), MockRuntimeCreator::new());

        assert!(context.start(&mut host));
        context.on_frame_stage(&mut host, FrameStage::Update);
        assert_eq!(context.cameras().controller_count(), 1);
        context.on_frame_stage(&mut host, FrameStage::PreCull(main));

        // Something else in the scene destroys the hidden tracking camera.
        let tracking = context.cameras().controllers()[0].tracking_camera();
        let tracking_object = host.camera_object(tracking);
        host.destroy_object(tracking_object).unwrap();

        context.on_frame_stage(&mut host, FrameStage::LateUpdate);
        assert!(!context.is_vr_enabled());
        assert!(!host.native_vr_enabled);
        assert_eq!(context.cameras().controller_count(), 0);
        assert!(host.camera(main).unwrap().world_to_camera.is_none());

        // Pass-through from now on.
        context.on_frame_stage(&mut host, FrameStage::Update);
        assert_eq!(context.cameras().controller_count(), 0);
    }
}
