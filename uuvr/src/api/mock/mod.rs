mod host;
mod runtime;

pub use self::host::{MockCamera, MockHost, MockObject, MockRender};
pub use self::runtime::{MockVRRuntime, MockVRState};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuvr_api::{RenderEventQueue, VREye, VRPose, VRRuntime, VRRuntimeCreator};

pub type MockVRStatePtr = Arc<Mutex<MockVRState>>;

// Scripted runtime for tests and for running the pipeline without a headset.
pub struct MockRuntimeCreator {
    state: MockVRStatePtr,
}

impl MockRuntimeCreator {
    pub fn new() -> Box<dyn VRRuntimeCreator> {
        Box::new(MockRuntimeCreator::with_state(Default::default()))
    }

    // Every runtime created shares `state`, so a test can steer and inspect them.
    pub fn with_state(state: MockVRStatePtr) -> MockRuntimeCreator {
        MockRuntimeCreator {
            state: state,
        }
    }

    pub fn state_handle(&self) -> MockVRStatePtr {
        self.state.clone()
    }
}

impl VRRuntimeCreator for MockRuntimeCreator {
    fn new_runtime(&self, queue: Option<Arc<dyn RenderEventQueue>>) -> Box<dyn VRRuntime> {
        lock(&self.state).event_queue_given = queue.is_some();
        Box::new(MockVRRuntime::new(self.state.clone()))
    }
}

pub enum MockVRControlMsg {
    SetHmdPresent(bool),
    SetRuntimeInstalled(bool),
    SetInitError(Option<i32>),
    SetSubmitError(VREye, Option<i32>),
    SetPoseWaitError(Option<i32>),
    SetHeadPose(VRPose),
    SetHeadPoseValid(bool),
}

pub(crate) fn lock(state: &MockVRStatePtr) -> MutexGuard<MockVRState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
