use super::VRToggleStrategy;
use crate::vr_manager::VRActivationStrategy;
use uuvr_api::{HostCapabilities, HostEngine, NativeVrSupport, VRToggleError};

// Built-in stereo rendering behind a single host flag. Only works once the
// asset patch has listed a VR device in the build settings.
pub struct NativeFlagStrategy {
    capabilities: HostCapabilities,
}

impl NativeFlagStrategy {
    pub fn new(capabilities: HostCapabilities) -> NativeFlagStrategy {
        NativeFlagStrategy {
            capabilities: capabilities,
        }
    }
}

impl VRToggleStrategy for NativeFlagStrategy {
    fn kind(&self) -> VRActivationStrategy {
        VRActivationStrategy::NativeFlag
    }

    fn set_up(&mut self, _host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        let reason = match self.capabilities.native_vr {
            NativeVrSupport::Unavailable => "built-in VR support is not compiled into this build",
            NativeVrSupport::Available { asset_patch_applied: false } => "the build settings list no VR device",
            NativeVrSupport::Available { asset_patch_applied: true } => return Ok(()),
        };
        Err(VRToggleError::CapabilityMismatch {
            strategy: "native flag",
            reason: reason.into(),
        })
    }

    fn enable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        host.set_native_vr_enabled(true)?;
        Ok(())
    }

    fn disable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        host.set_native_vr_enabled(false)?;
        Ok(())
    }
}
