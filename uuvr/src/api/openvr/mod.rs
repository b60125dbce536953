mod binding;
mod constants;
mod library;
mod runtime;

pub use self::runtime::OpenVRRuntime;

use std::sync::Arc;
use uuvr_api::{RenderEventQueue, VRRuntime, VRRuntimeCreator};

pub struct OpenVRRuntimeCreator;

impl OpenVRRuntimeCreator {
    pub fn new() -> Box<dyn VRRuntimeCreator> {
        Box::new(OpenVRRuntimeCreator)
    }
}

impl VRRuntimeCreator for OpenVRRuntimeCreator {
    fn new_runtime(&self, queue: Option<Arc<dyn RenderEventQueue>>) -> Box<dyn VRRuntime> {
        Box::new(OpenVRRuntime::new(queue))
    }
}
