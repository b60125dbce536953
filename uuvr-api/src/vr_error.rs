use thiserror::Error;

/// Failure to bring up a VR session. Fatal to the current enable attempt only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VRInitError {
    #[error("VR runtime library could not be loaded: {0}")]
    LibraryNotFound(String),
    #[error("VR runtime is not installed")]
    RuntimeNotInstalled,
    #[error("no head-mounted display is connected")]
    HmdNotPresent,
    #[error("VR runtime init failed with error {code}: {description}")]
    InitError { code: i32, description: String },
}

// EVRInitError values the session start path tells apart.
pub const VR_INIT_ERROR_NONE: i32 = 0;
pub const VR_INIT_ERROR_INSTALLATION_NOT_FOUND: i32 = 100;
pub const VR_INIT_ERROR_HMD_NOT_FOUND: i32 = 108;

impl VRInitError {
    pub fn from_code(code: i32, description: String) -> VRInitError {
        match code {
            VR_INIT_ERROR_INSTALLATION_NOT_FOUND => VRInitError::RuntimeNotInstalled,
            VR_INIT_ERROR_HMD_NOT_FOUND => VRInitError::HmdNotPresent,
            _ => VRInitError::InitError {
                code: code,
                description: description,
            },
        }
    }
}

/// Raw EVRCompositorError code. Non-fatal: the affected eye is skipped for the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("compositor error {0}")]
pub struct VRCompositorError(pub i32);

/// Error on a host engine call made on behalf of the VR pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("host object {0} was destroyed")]
    ObjectDestroyed(u64),
    #[error("host does not support {0}")]
    Unsupported(&'static str),
    #[error("camera render failed: {0}")]
    RenderFailed(String),
    #[error("{0}")]
    Internal(String),
}

/// Unrecoverable error in the middle of a frame. Tears the session down.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VRFrameError {
    #[error("no active VR session")]
    NoSession,
    #[error("waiting for poses failed: {0}")]
    PoseWait(#[source] VRCompositorError),
    #[error("head pose is not valid")]
    InvalidHeadPose,
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Why a VR toggle attempt did not reach the requested state.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VRToggleError {
    #[error("VR set up failed: {0}")]
    SetUpFailed(String),
    #[error("VR set up failed earlier and has not been retried")]
    SetUpPreviouslyFailed,
    #[error("{strategy} cannot run on this host: {reason}")]
    CapabilityMismatch { strategy: &'static str, reason: String },
    #[error(transparent)]
    Init(#[from] VRInitError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("XR loader failed to {0}")]
    Loader(String),
    #[error("no camera available to render VR from")]
    NoCamera,
}
