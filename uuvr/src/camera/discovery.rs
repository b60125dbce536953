use super::VRCameraController;
use crate::config::UuvrConfig;
use std::collections::HashSet;
use uuvr_api::{CameraId, HostEngine, HostError, StereoTargetEye};

/// Finds the cameras that should follow the headset and keeps one
/// controller per camera.
#[derive(Default)]
pub struct VRCameraManager {
    controllers: Vec<VRCameraController>,
    ignored: HashSet<CameraId>,
    highest_depth: Option<CameraId>,
}

impl VRCameraManager {
    pub fn new() -> VRCameraManager {
        VRCameraManager::default()
    }

    pub fn controller_count(&self) -> usize {
        self.controllers.len()
    }

    pub fn controllers(&self) -> &[VRCameraController] {
        &self.controllers
    }

    pub fn is_tracked(&self, camera: CameraId) -> bool {
        self.controllers.iter().any(|c| c.camera() == camera)
    }

    pub fn ignore_camera(&mut self, camera: CameraId) {
        self.ignored.insert(camera);
    }

    pub fn is_ignored(&self, camera: CameraId) -> bool {
        self.ignored.contains(&camera)
    }

    // Host camera of the controller rendering on top.
    pub fn highest_depth_camera(&self) -> Option<CameraId> {
        self.highest_depth
    }

    /// Attaches a controller to every eligible camera not seen before.
    /// Returns how many were attached.
    pub fn discover(&mut self, host: &mut dyn HostEngine, config: &UuvrConfig) -> usize {
        let mut attached = 0;
        for camera in host.active_cameras() {
            if self.is_tracked(camera) || self.is_ignored(camera) {
                continue;
            }
            let info = match host.camera_info(camera) {
                Ok(info) => info,
                Err(_) => continue,
            };
            if info.target_texture.is_some() || info.stereo_target_eye == StereoTargetEye::None {
                continue;
            }

            info!("Creating VR camera {}", info.name);
            match VRCameraController::attach(host, camera, config) {
                Ok(controller) => {
                    self.ignored.insert(controller.tracking_camera());
                    self.controllers.push(controller);
                    attached += 1;
                },
                Err(e) => {
                    warn!("Failed to create VR camera {}, ignoring it: {}", info.name, e);
                    self.ignored.insert(camera);
                },
            }
        }
        attached
    }

    // Drops controllers whose camera the host destroyed.
    pub fn prune(&mut self, host: &dyn HostEngine) {
        let (alive, destroyed): (Vec<_>, Vec<_>) = self.controllers
                                                       .drain(..)
                                                       .partition(|c| host.camera_info(c.camera()).is_ok());
        self.controllers = alive;
        for controller in destroyed {
            self.ignored.remove(&controller.tracking_camera());
            if self.highest_depth == Some(controller.camera()) {
                self.highest_depth = None;
            }
            controller.forget();
        }
    }

    pub fn update(&mut self, host: &mut dyn HostEngine, config: &UuvrConfig) -> Result<(), HostError> {
        for controller in self.controllers.iter_mut() {
            controller.update(host, config)?;
        }

        let mut highest: Option<(CameraId, f32)> = None;
        for controller in &self.controllers {
            let depth = host.camera_info(controller.camera_in_use())?.depth;
            if highest.map_or(true, |(_, d)| depth > d) {
                highest = Some((controller.camera(), depth));
            }
        }
        self.highest_depth = highest.map(|(camera, _)| camera);
        Ok(())
    }

    /// Tracks every controller, or only the one owning `only` (either its
    /// host camera or its tracking camera).
    pub fn track(&mut self, host: &mut dyn HostEngine, config: &UuvrConfig, head: Option<[f32; 4]>,
                 only: Option<CameraId>) -> Result<(), HostError> {
        for controller in self.controllers.iter_mut() {
            let selected = only.map_or(true, |camera| {
                controller.camera() == camera || controller.tracking_camera() == camera
            });
            if selected {
                controller.track(host, config, head)?;
            }
        }
        Ok(())
    }

    pub fn begin_frame_rendering(&mut self, host: &mut dyn HostEngine) -> Result<(), HostError> {
        for controller in self.controllers.iter_mut() {
            controller.begin_frame_rendering(host)?;
        }
        Ok(())
    }

    pub fn end_frame_rendering(&mut self, host: &mut dyn HostEngine) -> Result<(), HostError> {
        for controller in self.controllers.iter_mut() {
            controller.end_frame_rendering(host)?;
        }
        Ok(())
    }

    /// Gives every camera back to the host. Cameras stay eligible for the
    /// next discovery.
    pub fn detach_all(&mut self, host: &mut dyn HostEngine) {
        for controller in self.controllers.drain(..) {
            self.ignored.remove(&controller.tracking_camera());
            controller.detach(host);
        }
        self.highest_depth = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHost;
    use uuvr_api::{HostCamera, HostGraphics, HostScene, RenderTextureDesc};

    #[test]
    fn attaches_once_per_camera() {
        let mut host = MockHost::new();
        let main = host.add_scene_camera("Main Camera");
        let config = UuvrConfig::default();
        let mut cameras = VRCameraManager::new();

        assert_eq!(cameras.discover(&mut host, &config), 1);
        // The tracking camera shows up as an active camera now and must be skipped.
        assert_eq!(cameras.discover(&mut host, &config), 0);
        assert_eq!(cameras.controller_count(), 1);
        assert!(cameras.is_tracked(main));
    }

    #[test]
    fn skips_ineligible_cameras() {
        let mut host = MockHost::new();
        let config = UuvrConfig::default();
        let mut cameras = VRCameraManager::new();

        let ui = host.add_scene_camera("UI Camera");
        host.camera_mut(ui).unwrap().stereo_target_eye = StereoTargetEye::None;
        let minimap = host.add_scene_camera("Minimap");
        let texture = host.create_render_texture(&RenderTextureDesc {
            width: 256,
            height: 256,
            hdr: false,
            anti_aliasing: 1,
        }).unwrap();
        host.set_target_texture(minimap, Some(texture)).unwrap();
        let ignored = host.add_scene_camera("Photo Mode");
        cameras.ignore_camera(ignored);
        let disabled = host.add_scene_camera("Disabled");
        host.set_camera_enabled(disabled, false).unwrap();

        assert_eq!(cameras.discover(&mut host, &config), 0);
        assert_eq!(cameras.controller_count(), 0);
    }

    #[test]
    fn destroyed_cameras_are_pruned() {
        let mut host = MockHost::new();
        let config = UuvrConfig::default();
        let mut cameras = VRCameraManager::new();
        let first = host.add_scene_camera("First");
        host.add_scene_camera("Second");
        assert_eq!(cameras.discover(&mut host, &config), 2);

        let object = host.camera_object(first);
        host.destroy_object(object).unwrap();
        cameras.prune(&host);
        assert_eq!(cameras.controller_count(), 1);
        assert!(!cameras.is_tracked(first));
    }

    #[test]
    fn highest_depth_follows_camera_depth() {
        let mut host = MockHost::new();
        let config = UuvrConfig::default();
        let mut cameras = VRCameraManager::new();
        let low = host.add_scene_camera("Low");
        let high = host.add_scene_camera("High");
        host.set_depth(low, -1.0).unwrap();
        host.set_depth(high, 2.0).unwrap();

        cameras.discover(&mut host, &config);
        cameras.update(&mut host, &config).unwrap();
        assert_eq!(cameras.highest_depth_camera(), Some(high));
    }

    #[test]
    fn detach_all_restores_scene() {
        let mut host = MockHost::new();
        let config = UuvrConfig::default();
        let mut cameras = VRCameraManager::new();
        let main = host.add_scene_camera("Main Camera");
        cameras.discover(&mut host, &config);
        cameras.update(&mut host, &config).unwrap();
        cameras.track(&mut host, &config, Some([0.0, 0.38268343, 0.0, 0.9238795]), None).unwrap();

        cameras.detach_all(&mut host);
        assert_eq!(cameras.controller_count(), 0);
        assert_eq!(host.objects.len(), 1);
        assert!(host.camera(main).unwrap().world_to_camera.is_none());

        // Eligible again once VR comes back.
        assert_eq!(cameras.discover(&mut host, &config), 1);
    }
}
