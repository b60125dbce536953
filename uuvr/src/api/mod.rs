#[cfg(any(test, feature = "mock"))]
mod mock;
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{MockCamera, MockHost, MockObject, MockRender, MockRuntimeCreator, MockVRControlMsg,
                     MockVRRuntime, MockVRState, MockVRStatePtr};

#[cfg(feature = "openvr")]
mod openvr;
#[cfg(feature = "openvr")]
pub use self::openvr::{OpenVRRuntime, OpenVRRuntimeCreator};
