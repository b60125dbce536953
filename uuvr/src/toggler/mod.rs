//! VR on/off switching.
//!
//! A [`VRToggler`] wraps one [`VRToggleStrategy`] for the lifetime of the
//! process and owns the `Disabled -> SettingUp -> Enabled` state machine:
//! set up runs lazily on the first enable attempt and its outcome is
//! remembered, so a failed set up is never silently retried.

mod manual_session;
mod native_flag;
mod plugin_loader;

pub use self::manual_session::ManualSessionStrategy;
pub use self::native_flag::NativeFlagStrategy;
pub use self::plugin_loader::PluginLoaderStrategy;

use crate::config::UuvrConfig;
use crate::submit_loop::VRSubmitLoop;
use crate::vr_manager::VRActivationStrategy;
use uuvr_api::{HostEngine, VRToggleError};

pub trait VRToggleStrategy {
    fn kind(&self) -> VRActivationStrategy;

    fn set_up(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError>;

    fn enable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError>;

    fn disable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError>;

    // Whether the host renders stereo itself, so its cameras need VR controllers.
    fn drives_host_stereo(&self) -> bool {
        true
    }

    fn apply_config(&mut self, _config: &UuvrConfig) {}

    fn submit_loop(&mut self) -> Option<&mut VRSubmitLoop> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VRToggleState {
    Disabled,
    SettingUp,
    Enabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetUpState {
    Pending,
    Ready,
    Failed,
}

pub struct VRToggler {
    strategy: Box<dyn VRToggleStrategy>,
    set_up: SetUpState,
    state: VRToggleState,
}

impl VRToggler {
    pub fn new(strategy: Box<dyn VRToggleStrategy>) -> VRToggler {
        VRToggler {
            strategy: strategy,
            set_up: SetUpState::Pending,
            state: VRToggleState::Disabled,
        }
    }

    pub fn is_vr_enabled(&self) -> bool {
        self.state == VRToggleState::Enabled
    }

    pub fn state(&self) -> VRToggleState {
        self.state
    }

    pub fn set_up_failed(&self) -> bool {
        self.set_up == SetUpState::Failed
    }

    pub fn strategy(&self) -> &dyn VRToggleStrategy {
        &*self.strategy
    }

    pub fn strategy_mut(&mut self) -> &mut dyn VRToggleStrategy {
        &mut *self.strategy
    }

    /// Moves towards `enabled` and returns the state actually reached.
    pub fn set_vr_enabled(&mut self, host: &mut dyn HostEngine, enabled: bool) -> Result<bool, VRToggleError> {
        if enabled == self.is_vr_enabled() {
            return Ok(enabled);
        }

        if enabled {
            self.ensure_set_up(host)?;
            match self.strategy.enable_vr(host) {
                Ok(()) => {
                    self.state = VRToggleState::Enabled;
                    Ok(true)
                },
                Err(e) => {
                    self.state = VRToggleState::Disabled;
                    Err(e)
                },
            }
        } else {
            self.strategy.disable_vr(host)?;
            self.state = VRToggleState::Disabled;
            Ok(false)
        }
    }

    // Allows the next enable attempt to run set up again.
    pub fn retry_set_up(&mut self) {
        if self.set_up == SetUpState::Failed {
            self.set_up = SetUpState::Pending;
        }
    }

    // The session died underneath us. Tear the strategy down and report VR off
    // even if tearing down fails.
    pub fn session_lost(&mut self, host: &mut dyn HostEngine) {
        if let Err(e) = self.strategy.disable_vr(host) {
            warn!("Error while disabling VR after losing the session: {}", e);
        }
        self.state = VRToggleState::Disabled;
    }

    fn ensure_set_up(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        match self.set_up {
            SetUpState::Ready => Ok(()),
            SetUpState::Failed => Err(VRToggleError::SetUpPreviouslyFailed),
            SetUpState::Pending => {
                self.state = VRToggleState::SettingUp;
                let result = self.strategy.set_up(host);
                self.state = VRToggleState::Disabled;
                match result {
                    Ok(()) => {
                        self.set_up = SetUpState::Ready;
                        Ok(())
                    },
                    Err(e) => {
                        self.set_up = SetUpState::Failed;
                        Err(e)
                    },
                }
            },
        }
    }
}
