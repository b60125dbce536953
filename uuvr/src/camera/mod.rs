pub mod bracket;
mod controller;
mod discovery;
pub mod offset;

pub use self::controller::VRCameraController;
pub use self::discovery::VRCameraManager;
