use crate::utils;
use crate::VRPose;

// k_unMaxTrackedDeviceCount
pub const MAX_TRACKED_DEVICE_COUNT: usize = 64;
// k_unTrackedDeviceIndex_Hmd
pub const TRACKED_DEVICE_INDEX_HMD: usize = 0;

/// One tracked device as reported by the runtime for a frame, already in host space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRTrackedDevicePose {
    pub pose: VRPose,
    pub velocity: [f32; 3],
    pub angular_velocity: [f32; 3],
    pub is_valid: bool,
    pub is_connected: bool,
}

/// Fixed-size table of device poses refreshed wholesale once per frame.
///
/// The table is `Copy`: readers always hold their own snapshot, so a refresh
/// can never tear what a consumer is looking at.
#[derive(Clone, Copy)]
pub struct VRDevicePoseTable {
    poses: [VRTrackedDevicePose; MAX_TRACKED_DEVICE_COUNT],
    // Milliseconds, see utils::timestamp
    pub timestamp: f64,
}

impl Default for VRDevicePoseTable {
    fn default() -> VRDevicePoseTable {
        VRDevicePoseTable {
            poses: [VRTrackedDevicePose::default(); MAX_TRACKED_DEVICE_COUNT],
            timestamp: 0.0,
        }
    }
}

impl ::std::fmt::Debug for VRDevicePoseTable {
    fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
        f.debug_struct("VRDevicePoseTable")
         .field("hmd", &self.poses[TRACKED_DEVICE_INDEX_HMD])
         .field("timestamp", &self.timestamp)
         .finish()
    }
}

impl VRDevicePoseTable {
    pub fn new(poses: [VRTrackedDevicePose; MAX_TRACKED_DEVICE_COUNT]) -> VRDevicePoseTable {
        VRDevicePoseTable {
            poses: poses,
            timestamp: utils::timestamp(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&VRTrackedDevicePose> {
        self.poses.get(index)
    }

    pub fn set(&mut self, index: usize, pose: VRTrackedDevicePose) {
        if let Some(slot) = self.poses.get_mut(index) {
            *slot = pose;
        }
    }

    /// Head pose, only when the runtime reported it as valid this frame.
    pub fn hmd(&self) -> Option<VRPose> {
        let hmd = &self.poses[TRACKED_DEVICE_INDEX_HMD];
        if hmd.is_valid {
            Some(hmd.pose)
        } else {
            None
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &VRTrackedDevicePose> {
        self.poses.iter()
    }
}

/// Result of one `WaitGetPoses`: poses predicted for this frame's photons,
/// and poses predicted for the next frame's game logic.
#[derive(Debug, Clone, Copy, Default)]
pub struct VRFramePoses {
    pub render: VRDevicePoseTable,
    pub game: VRDevicePoseTable,
}
