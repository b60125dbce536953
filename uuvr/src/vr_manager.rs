use crate::config::{TogglerPreference, UuvrConfig};
use crate::submit_loop::VRSubmitLoop;
use crate::toggler::{ManualSessionStrategy, NativeFlagStrategy, PluginLoaderStrategy,
                     VRToggleStrategy, VRToggler};
use uuvr_api::{HostCapabilities, HostEngine, VRApi, VRRuntimeCreator, VRToggleError};

#[cfg(feature = "openvr")]
use crate::api::OpenVRRuntimeCreator;

/// The one way this process turns VR on. Picked once, never switched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VRActivationStrategy {
    NativeFlag,
    PluginLoader(VRApi),
    ManualSession,
}

impl VRActivationStrategy {
    // An explicit preference is honoured even when the probe says it cannot
    // work; the mismatch then surfaces as a failed set up.
    pub fn select(capabilities: &HostCapabilities, config: &UuvrConfig) -> VRActivationStrategy {
        match config.toggler_preference {
            TogglerPreference::NativeFlag => VRActivationStrategy::NativeFlag,
            TogglerPreference::PluginLoader => VRActivationStrategy::PluginLoader(config.preferred_vr_api),
            TogglerPreference::ManualSession => VRActivationStrategy::ManualSession,
            TogglerPreference::Auto => {
                if capabilities.supports_loader(config.preferred_vr_api) {
                    VRActivationStrategy::PluginLoader(config.preferred_vr_api)
                } else if capabilities.native_flag_usable() {
                    VRActivationStrategy::NativeFlag
                } else {
                    VRActivationStrategy::ManualSession
                }
            },
        }
    }
}

// Runtime used by the manual session when the embedder does not bring one.
#[cfg(feature = "openvr")]
pub fn default_runtime_creator() -> Box<dyn VRRuntimeCreator> {
    OpenVRRuntimeCreator::new()
}

// Single entry point for turning VR on and off
pub struct VRTogglerManager {
    toggler: VRToggler,
    // Why the most recent toggle did not reach the requested state.
    last_error: Option<VRToggleError>,
}

impl VRTogglerManager {
    pub fn new(capabilities: HostCapabilities,
               config: &UuvrConfig,
               creator: Box<dyn VRRuntimeCreator>) -> VRTogglerManager {
        let activation = VRActivationStrategy::select(&capabilities, config);
        info!("Using {:?} to toggle VR", activation);

        let strategy: Box<dyn VRToggleStrategy> = match activation {
            VRActivationStrategy::NativeFlag => Box::new(NativeFlagStrategy::new(capabilities)),
            VRActivationStrategy::PluginLoader(api) => Box::new(PluginLoaderStrategy::new(api, capabilities)),
            VRActivationStrategy::ManualSession => {
                Box::new(ManualSessionStrategy::new(creator, capabilities.render_thread, config))
            },
        };

        VRTogglerManager {
            toggler: VRToggler::new(strategy),
            last_error: None,
        }
    }

    pub fn activation(&self) -> VRActivationStrategy {
        self.toggler.strategy().kind()
    }

    pub fn is_vr_enabled(&self) -> bool {
        self.toggler.is_vr_enabled()
    }

    pub fn drives_host_stereo(&self) -> bool {
        self.toggler.strategy().drives_host_stereo()
    }

    pub fn toggler(&self) -> &VRToggler {
        &self.toggler
    }

    // Returns the state actually reached. Failures are logged here and
    // never reach the host.
    pub fn set_vr_enabled(&mut self, host: &mut dyn HostEngine, enabled: bool) -> bool {
        match self.toggler.set_vr_enabled(host, enabled) {
            Ok(state) => {
                info!("VR {}", if state { "enabled" } else { "disabled" });
                self.last_error = None;
                state
            },
            Err(e) => {
                error!("Failed to {} VR: {}", if enabled { "enable" } else { "disable" }, e);
                self.last_error = Some(e);
                self.toggler.is_vr_enabled()
            },
        }
    }

    pub fn last_error(&self) -> Option<&VRToggleError> {
        self.last_error.as_ref()
    }

    pub fn toggle_vr(&mut self, host: &mut dyn HostEngine) -> bool {
        let enabled = !self.is_vr_enabled();
        self.set_vr_enabled(host, enabled)
    }

    pub fn retry_set_up(&mut self) {
        self.toggler.retry_set_up();
    }

    pub fn session_lost(&mut self, host: &mut dyn HostEngine) {
        self.toggler.session_lost(host);
    }

    pub fn apply_config(&mut self, config: &UuvrConfig) {
        self.toggler.strategy_mut().apply_config(config);
    }

    pub fn submit_loop(&mut self) -> Option<&mut VRSubmitLoop> {
        self.toggler.strategy_mut().submit_loop()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuvr_api::{HostArchitecture, NativeVrSupport, XrManagementSupport};

    fn modern_host() -> HostCapabilities {
        HostCapabilities {
            xr_management: XrManagementSupport::Available { openvr_loader: true, openxr_loader: true },
            ..Default::default()
        }
    }

    #[test]
    fn auto_prefers_plugin_loader() {
        let config = UuvrConfig::default();
        assert_eq!(VRActivationStrategy::select(&modern_host(), &config),
                   VRActivationStrategy::PluginLoader(VRApi::OpenVR));
    }

    #[test]
    fn auto_falls_back_in_order() {
        let mut config = UuvrConfig::default();
        config.preferred_vr_api = VRApi::OpenXR;

        let mut caps = modern_host();
        caps.architecture = HostArchitecture::X86;
        caps.native_vr = NativeVrSupport::Available { asset_patch_applied: true };
        assert_eq!(VRActivationStrategy::select(&caps, &config), VRActivationStrategy::NativeFlag);

        caps.native_vr = NativeVrSupport::Available { asset_patch_applied: false };
        assert_eq!(VRActivationStrategy::select(&caps, &config), VRActivationStrategy::ManualSession);
    }

    #[test]
    fn explicit_preference_wins() {
        let mut config = UuvrConfig::default();
        config.toggler_preference = TogglerPreference::NativeFlag;
        assert_eq!(VRActivationStrategy::select(&HostCapabilities::default(), &config),
                   VRActivationStrategy::NativeFlag);
    }
}
