use super::VRToggleStrategy;
use crate::vr_manager::VRActivationStrategy;
use uuvr_api::{HostArchitecture, HostCapabilities, HostEngine, VRApi, VRToggleError,
               XrLoaderId, XrLoaderSettings};

pub const OPENVR_APP_KEY: &str = "uuvr";

// Injects an XR-management loader and drives its lifecycle.
pub struct PluginLoaderStrategy {
    api: VRApi,
    capabilities: HostCapabilities,
    loader: Option<XrLoaderId>,
}

impl PluginLoaderStrategy {
    pub fn new(api: VRApi, capabilities: HostCapabilities) -> PluginLoaderStrategy {
        PluginLoaderStrategy {
            api: api,
            capabilities: capabilities,
            loader: None,
        }
    }

    pub fn loader_settings(api: VRApi) -> XrLoaderSettings {
        match api {
            VRApi::OpenVR => XrLoaderSettings::OpenVR {
                app_key: OPENVR_APP_KEY.into(),
                scene_application: true,
                multi_pass: true,
                mirror_right_eye: true,
            },
            VRApi::OpenXR => XrLoaderSettings::OpenXR {
                multi_pass: true,
            },
        }
    }

    fn loader(&self) -> Result<XrLoaderId, VRToggleError> {
        self.loader.ok_or_else(|| VRToggleError::Loader("run before set up".into()))
    }
}

impl VRToggleStrategy for PluginLoaderStrategy {
    fn kind(&self) -> VRActivationStrategy {
        VRActivationStrategy::PluginLoader(self.api)
    }

    fn set_up(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        if !self.capabilities.supports_loader(self.api) {
            let reason = if self.api == VRApi::OpenXR && self.capabilities.architecture == HostArchitecture::X86 {
                "the OpenXR loader does not run in 32-bit processes".to_owned()
            } else {
                format!("no {:?} loader for this host's XR management", self.api)
            };
            return Err(VRToggleError::CapabilityMismatch {
                strategy: "plugin loader",
                reason: reason,
            });
        }

        let loader = host.create_xr_loader(&PluginLoaderStrategy::loader_settings(self.api))?;
        if !host.initialize_loader_sync(loader)? {
            return Err(VRToggleError::Loader("initialize, maybe the headset was not ready".into()));
        }
        info!("{:?} XR loader initialized", self.api);
        self.loader = Some(loader);
        Ok(())
    }

    fn enable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        let loader = self.loader()?;
        host.start_subsystems(loader)?;
        let initialized = host.loader_initialize(loader);
        let started = host.loader_start(loader);
        if initialized && started {
            Ok(())
        } else {
            Err(VRToggleError::Loader("start".into()))
        }
    }

    fn disable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        let loader = self.loader()?;
        let stopped = host.loader_stop(loader);
        let deinitialized = host.loader_deinitialize(loader);
        if stopped && deinitialized {
            Ok(())
        } else {
            Err(VRToggleError::Loader("stop".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHost;
    use uuvr_api::XrManagementSupport;

    fn caps(architecture: HostArchitecture) -> HostCapabilities {
        HostCapabilities {
            xr_management: XrManagementSupport::Available { openvr_loader: true, openxr_loader: true },
            architecture: architecture,
            ..Default::default()
        }
    }

    #[test]
    fn openxr_refused_on_x86() {
        let mut host = MockHost::new();
        let mut strategy = PluginLoaderStrategy::new(VRApi::OpenXR, caps(HostArchitecture::X86));
        match strategy.set_up(&mut host) {
            Err(VRToggleError::CapabilityMismatch { .. }) => {},
            other => panic!("unexpected set up result {:?}", other),
        }
        assert!(host.loader_calls.is_empty());
    }

    #[test]
    fn drives_loader_lifecycle() {
        let mut host = MockHost::new();
        let mut strategy = PluginLoaderStrategy::new(VRApi::OpenVR, caps(HostArchitecture::X64));
        assert!(strategy.set_up(&mut host).is_ok());
        assert!(strategy.enable_vr(&mut host).is_ok());
        assert!(strategy.disable_vr(&mut host).is_ok());
        assert_eq!(host.loader_calls,
                   vec!["create", "initialize_loader_sync", "start_subsystems",
                        "initialize", "start", "stop", "deinitialize"]);
        assert_eq!(host.loader_settings, Some(PluginLoaderStrategy::loader_settings(VRApi::OpenVR)));
    }

    #[test]
    fn inactive_loader_fails_set_up() {
        let mut host = MockHost::new();
        host.loader_becomes_active = false;
        let mut strategy = PluginLoaderStrategy::new(VRApi::OpenVR, caps(HostArchitecture::X64));
        match strategy.set_up(&mut host) {
            Err(VRToggleError::Loader(_)) => {},
            other => panic!("unexpected set up result {:?}", other),
        }
    }
}
