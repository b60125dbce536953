use super::{lock, MockVRControlMsg, MockVRStatePtr};
use uuvr_api::{HmdMatrix44, MAX_TRACKED_DEVICE_COUNT, TRACKED_DEVICE_INDEX_HMD, VRColorSpace,
               VRCompositorError, VRDevicePoseTable, VREye, VRFieldOfView, VRFrameError,
               VRFramePoses, VRInitError, VRPose, VRRuntime, VRSessionHandle, VRTextureBounds,
               VRTextureHandle, VRTrackedDevicePose};
use uuvr_api::utils;

// Mock runtime data. Simulates a virtual HTC Vive.
pub struct MockVRState {
    pub hmd_present: bool,
    pub runtime_installed: bool,
    pub init_error: Option<i32>,
    pub submit_error: [Option<i32>; 2],
    pub pose_wait_error: Option<i32>,
    pub head_pose: VRPose,
    pub head_pose_valid: bool,
    pub eye_to_head: [VRPose; 2],
    pub field_of_view: [VRFieldOfView; 2],
    pub render_target_size: (u32, u32),

    pub active_session: Option<VRSessionHandle>,
    // Whether the last runtime created was handed a render event queue.
    pub event_queue_given: bool,
    pub init_calls: usize,
    pub shutdown_calls: usize,
    pub wait_calls: usize,
    pub submit_attempts: Vec<VREye>,
    pub presented: Vec<VREye>,
    pub flushes: usize,
    pub handoffs: usize,
    pub submit_params: Option<(VRTextureBounds, VRTextureBounds)>,
    pub color_space: Option<VRColorSpace>,
}

impl Default for MockVRState {
    fn default() -> MockVRState {
        MockVRState {
            hmd_present: true,
            runtime_installed: true,
            init_error: None,
            submit_error: [None, None],
            pose_wait_error: None,
            head_pose: VRPose::new([0.0, 1.7, 0.0], [0.0, 0.0, 0.0, 1.0]),
            head_pose_valid: true,
            eye_to_head: [VRPose::new([-0.0359, 0.0, 0.015], [0.0, 0.0, 0.0, 1.0]),
                          VRPose::new([0.0359, 0.0, 0.015], [0.0, 0.0, 0.0, 1.0])],
            field_of_view: [VRFieldOfView { left: -1.3953, right: 1.2464, top: -1.4700, bottom: 1.4630 },
                            VRFieldOfView { left: -1.2465, right: 1.3945, top: -1.4623, bottom: 1.4718 }],
            render_target_size: (1512, 1680),
            active_session: None,
            event_queue_given: false,
            init_calls: 0,
            shutdown_calls: 0,
            wait_calls: 0,
            submit_attempts: Vec::new(),
            presented: Vec::new(),
            flushes: 0,
            handoffs: 0,
            submit_params: None,
            color_space: None,
        }
    }
}

impl MockVRState {
    pub fn handle_msg(&mut self, msg: MockVRControlMsg) {
        match msg {
            MockVRControlMsg::SetHmdPresent(present) => self.hmd_present = present,
            MockVRControlMsg::SetRuntimeInstalled(installed) => self.runtime_installed = installed,
            MockVRControlMsg::SetInitError(code) => self.init_error = code,
            MockVRControlMsg::SetSubmitError(eye, code) => self.submit_error[eye.index()] = code,
            MockVRControlMsg::SetPoseWaitError(code) => self.pose_wait_error = code,
            MockVRControlMsg::SetHeadPose(pose) => self.head_pose = pose,
            MockVRControlMsg::SetHeadPoseValid(valid) => self.head_pose_valid = valid,
        }
    }

    // Calls that reach the compositor once a session is up.
    pub fn native_frame_calls(&self) -> usize {
        self.wait_calls + self.submit_attempts.len() + self.flushes + self.handoffs
    }
}

pub struct MockVRRuntime {
    state: MockVRStatePtr,
}

impl MockVRRuntime {
    pub fn new(state: MockVRStatePtr) -> MockVRRuntime {
        MockVRRuntime {
            state: state,
        }
    }
}

impl VRRuntime for MockVRRuntime {
    fn is_runtime_installed(&self) -> bool {
        lock(&self.state).runtime_installed
    }

    fn is_hmd_present(&self) -> bool {
        lock(&self.state).hmd_present
    }

    fn init(&mut self) -> Result<VRSessionHandle, VRInitError> {
        let mut state = lock(&self.state);
        state.init_calls += 1;
        if !state.runtime_installed {
            return Err(VRInitError::RuntimeNotInstalled);
        }
        if !state.hmd_present {
            return Err(VRInitError::HmdNotPresent);
        }
        if let Some(code) = state.init_error {
            return Err(VRInitError::from_code(code, format!("mock init error {}", code)));
        }
        let session = VRSessionHandle(utils::new_id());
        state.active_session = Some(session);
        Ok(session)
    }

    fn shutdown(&mut self, session: VRSessionHandle) {
        let mut state = lock(&self.state);
        state.shutdown_calls += 1;
        if state.active_session == Some(session) {
            state.active_session = None;
        }
    }

    fn recommended_render_target_size(&self) -> (u32, u32) {
        lock(&self.state).render_target_size
    }

    fn projection_raw(&self, eye: VREye) -> VRFieldOfView {
        lock(&self.state).field_of_view[eye.index()]
    }

    fn eye_to_head_transform(&self, eye: VREye) -> VRPose {
        lock(&self.state).eye_to_head[eye.index()]
    }

    fn projection_matrix(&self, eye: VREye, near: f32, far: f32) -> [f32; 16] {
        let fov = self.projection_raw(eye);
        let idx = 1.0 / (fov.right - fov.left);
        let idy = 1.0 / (fov.bottom - fov.top);
        let sx = fov.right + fov.left;
        let sy = fov.bottom + fov.top;
        HmdMatrix44 {
            m: [[2.0 * idx, 0.0, sx * idx, 0.0],
                [0.0, 2.0 * idy, sy * idy, 0.0],
                [0.0, 0.0, far / (near - far), far * near / (near - far)],
                [0.0, 0.0, -1.0, 0.0]],
        }.to_column_major()
    }

    fn wait_get_poses(&mut self) -> Result<VRFramePoses, VRFrameError> {
        let mut state = lock(&self.state);
        if state.active_session.is_none() {
            return Err(VRFrameError::NoSession);
        }
        state.wait_calls += 1;
        if let Some(code) = state.pose_wait_error {
            return Err(VRFrameError::PoseWait(VRCompositorError(code)));
        }

        let mut poses = [VRTrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT];
        poses[TRACKED_DEVICE_INDEX_HMD] = VRTrackedDevicePose {
            pose: state.head_pose,
            is_valid: state.head_pose_valid,
            is_connected: true,
            ..Default::default()
        };
        let table = VRDevicePoseTable::new(poses);
        Ok(VRFramePoses {
            render: table,
            game: table,
        })
    }

    fn submit(&mut self, eye: VREye, _texture: VRTextureHandle, _bounds: &VRTextureBounds)
              -> Result<(), VRCompositorError> {
        let mut state = lock(&self.state);
        state.submit_attempts.push(eye);
        if let Some(code) = state.submit_error[eye.index()] {
            return Err(VRCompositorError(code));
        }
        state.presented.push(eye);
        Ok(())
    }

    fn set_submit_params(&mut self, left: &VRTextureBounds, right: &VRTextureBounds) {
        lock(&self.state).submit_params = Some((*left, *right));
    }

    fn set_color_space(&mut self, color_space: VRColorSpace) {
        lock(&self.state).color_space = Some(color_space);
    }

    fn flush(&mut self) {
        lock(&self.state).flushes += 1;
    }

    fn post_present_handoff(&mut self) {
        lock(&self.state).handoffs += 1;
    }
}
