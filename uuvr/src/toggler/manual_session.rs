use super::VRToggleStrategy;
use crate::config::UuvrConfig;
use crate::submit_loop::{VRSubmitLoop, VRSubmitLoopSettings};
use crate::vr_manager::VRActivationStrategy;
use uuvr_api::{HostEngine, RenderThreadModel, VRRuntimeCreator, VRToggleError};

// Bypasses the host's XR stack and runs the runtime session ourselves,
// rendering the main camera once per eye from the submit loop.
pub struct ManualSessionStrategy {
    creator: Box<dyn VRRuntimeCreator>,
    render_thread: RenderThreadModel,
    settings: VRSubmitLoopSettings,
    submit_loop: Option<VRSubmitLoop>,
}

impl ManualSessionStrategy {
    pub fn new(creator: Box<dyn VRRuntimeCreator>,
               render_thread: RenderThreadModel,
               config: &UuvrConfig) -> ManualSessionStrategy {
        ManualSessionStrategy {
            creator: creator,
            render_thread: render_thread,
            settings: VRSubmitLoopSettings::from_config(config),
            submit_loop: None,
        }
    }
}

impl VRToggleStrategy for ManualSessionStrategy {
    fn kind(&self) -> VRActivationStrategy {
        VRActivationStrategy::ManualSession
    }

    fn set_up(&mut self, _host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        Ok(())
    }

    fn enable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        let camera = match host.main_camera().or_else(|| host.current_camera()) {
            Some(camera) => camera,
            None => {
                warn!("Failed to find a suitable camera for the VR session");
                return Err(VRToggleError::NoCamera);
            },
        };

        // Compositor calls must not leave the host's render thread when it has one.
        let queue = match self.render_thread {
            RenderThreadModel::Explicit => None,
            RenderThreadModel::PluginEventQueue => match host.render_event_queue() {
                Some(queue) => Some(queue),
                None => {
                    return Err(VRToggleError::CapabilityMismatch {
                        strategy: "manual session",
                        reason: "host renders on a plugin event queue it does not expose".into(),
                    });
                },
            },
        };

        let runtime = self.creator.new_runtime(queue);
        let submit_loop = VRSubmitLoop::start(host, runtime, camera, self.settings)?;
        self.submit_loop = Some(submit_loop);
        Ok(())
    }

    fn disable_vr(&mut self, host: &mut dyn HostEngine) -> Result<(), VRToggleError> {
        if let Some(mut submit_loop) = self.submit_loop.take() {
            submit_loop.stop(host);
        }
        Ok(())
    }

    fn drives_host_stereo(&self) -> bool {
        false
    }

    fn apply_config(&mut self, config: &UuvrConfig) {
        self.settings = VRSubmitLoopSettings::from_config(config);
        if let Some(ref mut submit_loop) = self.submit_loop {
            submit_loop.set_settings(self.settings);
        }
    }

    fn submit_loop(&mut self) -> Option<&mut VRSubmitLoop> {
        self.submit_loop.as_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{MockHost, MockRuntimeCreator, MockVRControlMsg, MockVRStatePtr};
    use crate::submit_loop::VRLoopStatus;
    use std::sync::Arc;
    use uuvr_api::{RenderEventFunc, RenderEventQueue, VRInitError};

    fn strategy_for(render_thread: RenderThreadModel) -> (ManualSessionStrategy, MockVRStatePtr) {
        let creator = MockRuntimeCreator::with_state(Default::default());
        let state = creator.state_handle();
        (ManualSessionStrategy::new(Box::new(creator), render_thread, &UuvrConfig::default()), state)
    }

    fn strategy() -> (ManualSessionStrategy, MockVRStatePtr) {
        strategy_for(RenderThreadModel::Explicit)
    }

    struct NullQueue;

    impl RenderEventQueue for NullQueue {
        fn issue_plugin_event(&self, _func: RenderEventFunc, _event_id: i32) {}

        fn synchronize(&self) {}
    }

    #[test]
    fn event_queue_host_without_queue_is_refused() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        let (mut strategy, state) = strategy_for(RenderThreadModel::PluginEventQueue);

        assert!(matches!(strategy.enable_vr(&mut host), Err(VRToggleError::CapabilityMismatch { .. })));
        assert!(strategy.submit_loop().is_none());
        assert_eq!(state.lock().unwrap().init_calls, 0);
    }

    #[test]
    fn runtime_gets_queue_only_on_event_queue_hosts() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        host.event_queue = Some(Arc::new(NullQueue));

        let (mut strategy, state) = strategy_for(RenderThreadModel::PluginEventQueue);
        strategy.enable_vr(&mut host).unwrap();
        assert!(state.lock().unwrap().event_queue_given);
        strategy.disable_vr(&mut host).unwrap();

        let (mut strategy, state) = strategy_for(RenderThreadModel::Explicit);
        strategy.enable_vr(&mut host).unwrap();
        assert!(!state.lock().unwrap().event_queue_given);
        strategy.disable_vr(&mut host).unwrap();
    }

    #[test]
    fn enable_needs_a_camera() {
        let mut host = MockHost::new();
        let (mut strategy, state) = strategy();
        assert!(matches!(strategy.enable_vr(&mut host), Err(VRToggleError::NoCamera)));
        assert_eq!(state.lock().unwrap().init_calls, 0);
    }

    #[test]
    fn runtime_init_error_leaves_no_loop() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        let (mut strategy, state) = strategy();
        state.lock().unwrap().handle_msg(MockVRControlMsg::SetInitError(Some(108)));

        assert_eq!(strategy.enable_vr(&mut host).err(), Some(VRToggleError::Init(VRInitError::HmdNotPresent)));
        assert!(strategy.submit_loop().is_none());
        assert_eq!(state.lock().unwrap().init_calls, 1);
    }

    #[test]
    fn enable_and_disable_own_the_loop() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        let (mut strategy, state) = strategy();

        strategy.enable_vr(&mut host).unwrap();
        assert!(!strategy.drives_host_stereo());
        assert_eq!(strategy.submit_loop().map(|l| l.status()), Some(VRLoopStatus::Running));

        strategy.disable_vr(&mut host).unwrap();
        assert!(strategy.submit_loop().is_none());
        assert_eq!(state.lock().unwrap().shutdown_calls, 1);
        // Nothing left to stop.
        strategy.disable_vr(&mut host).unwrap();
        assert_eq!(state.lock().unwrap().shutdown_calls, 1);
    }

    #[test]
    fn config_reaches_running_loop() {
        let mut host = MockHost::new();
        host.add_scene_camera("Main Camera");
        let (mut strategy, _) = strategy();
        strategy.enable_vr(&mut host).unwrap();

        let config = UuvrConfig {
            world_scale: 2.0,
            ..Default::default()
        };
        strategy.apply_config(&config);
        let settings = strategy.submit_loop().map(|l| *l.settings());
        assert_eq!(settings.map(|s| s.eye_distance_multiplier), Some(0.5));
    }
}
