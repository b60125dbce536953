//! Runtime VR retrofit for Unity games: tracks the headset through the host
//! cameras, toggles VR on and off, and when the host has no usable XR stack,
//! renders and submits frames to OpenVR by hand.

extern crate euclid;
#[cfg(feature = "openvr")]
extern crate libloading;
#[macro_use]
extern crate log;
#[cfg(feature = "serde-serialization")]
#[macro_use]
extern crate serde_derive;
#[cfg(windows)]
extern crate winapi;

pub mod api;
mod arena;
pub mod camera;
pub mod config;
mod context;
pub mod keyboard;
pub mod submit_loop;
pub mod toggler;
mod vr_manager;

pub use uuvr_api::*;
pub use arena::HelperArena;
pub use config::{CameraTrackingMode, TogglerPreference, UuvrConfig};
pub use context::UuvrContext;
pub use submit_loop::{VRLoopStatus, VRSubmitLoop, VRSubmitLoopSettings};
#[cfg(feature = "openvr")]
pub use vr_manager::default_runtime_creator;
pub use vr_manager::{VRActivationStrategy, VRTogglerManager};
