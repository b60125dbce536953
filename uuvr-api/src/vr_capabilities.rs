// Host features the VR toggle strategies depend on. Probed once at start up;
// the answers do not change for the lifetime of the process.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VRApi {
    OpenVR,
    OpenXR,
}

// Built-in stereo rendering (XRSettings.enabled).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeVrSupport {
    Unavailable,
    // The asset patch lists a VR device in the build settings. Without it,
    // flipping the flag does nothing.
    Available { asset_patch_applied: bool },
}

// Pluggable XR-management loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XrManagementSupport {
    Unavailable,
    Available { openvr_loader: bool, openxr_loader: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderThreadModel {
    // No separate render thread: render events may be called directly.
    Explicit,
    // Render events must go through the host's plugin event queue.
    PluginEventQueue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostArchitecture {
    X86,
    X64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostCapabilities {
    pub native_vr: NativeVrSupport,
    pub xr_management: XrManagementSupport,
    pub render_thread: RenderThreadModel,
    pub architecture: HostArchitecture,
}

impl HostCapabilities {
    pub fn native_flag_usable(&self) -> bool {
        match self.native_vr {
            NativeVrSupport::Available { asset_patch_applied } => asset_patch_applied,
            NativeVrSupport::Unavailable => false,
        }
    }

    pub fn supports_loader(&self, api: VRApi) -> bool {
        match (self.xr_management, api) {
            (XrManagementSupport::Available { openvr_loader, .. }, VRApi::OpenVR) => openvr_loader,
            // The OpenXR loader has no 32-bit runtime.
            (XrManagementSupport::Available { openxr_loader, .. }, VRApi::OpenXR) => {
                openxr_loader && self.architecture == HostArchitecture::X64
            },
            (XrManagementSupport::Unavailable, _) => false,
        }
    }
}

impl Default for HostCapabilities {
    // A stripped build: only the manual session can run.
    fn default() -> HostCapabilities {
        HostCapabilities {
            native_vr: NativeVrSupport::Unavailable,
            xr_management: XrManagementSupport::Unavailable,
            render_thread: RenderThreadModel::PluginEventQueue,
            architecture: HostArchitecture::X64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openxr_loader_refused_on_x86() {
        let mut caps = HostCapabilities {
            xr_management: XrManagementSupport::Available { openvr_loader: true, openxr_loader: true },
            ..Default::default()
        };
        assert!(caps.supports_loader(VRApi::OpenXR));
        caps.architecture = HostArchitecture::X86;
        assert!(!caps.supports_loader(VRApi::OpenXR));
        assert!(caps.supports_loader(VRApi::OpenVR));
    }

    #[test]
    fn native_flag_needs_asset_patch() {
        let mut caps = HostCapabilities::default();
        assert!(!caps.native_flag_usable());
        caps.native_vr = NativeVrSupport::Available { asset_patch_applied: false };
        assert!(!caps.native_flag_usable());
        caps.native_vr = NativeVrSupport::Available { asset_patch_applied: true };
        assert!(caps.native_flag_usable());
    }
}
