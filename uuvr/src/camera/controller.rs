use super::bracket::RotationOverride;
use super::offset::VRCameraOffset;
use crate::arena::HelperArena;
use crate::config::{CameraTrackingMode, UuvrConfig};
use uuvr_api::utils;
use uuvr_api::{CameraClearFlags, CameraId, HostEngine, HostError, ObjectId, VREye};

// Keeps the muted tracking camera behind everything else.
const MUTED_TRACKING_CAMERA_DEPTH: f32 = -100.0;

/// Makes one host camera follow the headset.
///
/// The host camera is never owned. Everything the controller adds to the
/// scene (the offset node and the hidden tracking camera under it) lives in
/// its arena and goes away on `detach`. Every per-frame entry point is
/// idempotent: calling it again in the same frame leaves the same state.
pub struct VRCameraController {
    id: u32,
    camera: CameraId,
    object: ObjectId,
    arena: HelperArena,
    offset: VRCameraOffset,
    tracking_object: ObjectId,
    tracking_camera: CameraId,
    mode: CameraTrackingMode,
    saved_culling_mask: Option<i32>,
    rotation_override: Option<RotationOverride>,
    matrix_overridden: bool,
}

impl VRCameraController {
    pub fn attach(host: &mut dyn HostEngine, camera: CameraId, config: &UuvrConfig)
                  -> Result<VRCameraController, HostError> {
        let info = host.camera_info(camera)?;
        let mut arena = HelperArena::new();

        let helpers = VRCameraOffset::create(host, &mut arena, info.object, config.camera_position_offset)
            .and_then(|offset| {
                let (tracking_object, tracking_camera) =
                    arena.create_camera(host, "VrChildCamera", Some(offset.object()))?;
                host.copy_camera_settings(camera, tracking_camera)?;
                Ok((offset, tracking_object, tracking_camera))
            });

        match helpers {
            Ok((offset, tracking_object, tracking_camera)) => Ok(VRCameraController {
                id: utils::new_id(),
                camera: camera,
                object: info.object,
                arena: arena,
                offset: offset,
                tracking_object: tracking_object,
                tracking_camera: tracking_camera,
                mode: config.camera_tracking,
                saved_culling_mask: None,
                rotation_override: None,
                matrix_overridden: false,
            }),
            Err(e) => {
                arena.release(host);
                Err(e)
            },
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn camera(&self) -> CameraId {
        self.camera
    }

    pub fn tracking_camera(&self) -> CameraId {
        self.tracking_camera
    }

    pub fn mode(&self) -> CameraTrackingMode {
        self.mode
    }

    // The camera whose output actually reaches the headset.
    pub fn camera_in_use(&self) -> CameraId {
        match self.mode {
            CameraTrackingMode::Child => self.tracking_camera,
            _ => self.camera,
        }
    }

    pub fn owns_object(&self, object: ObjectId) -> bool {
        self.arena.owns_object(object)
    }

    /// Once per host Update.
    pub fn update(&mut self, host: &mut dyn HostEngine, config: &UuvrConfig) -> Result<(), HostError> {
        if config.override_depth {
            host.set_depth(self.camera, config.vr_camera_depth)?;
        }

        if config.camera_tracking != self.mode {
            debug!("Camera {:?} switching from {:?} to {:?}", self.camera, self.mode, config.camera_tracking);
            self.leave_mode(host)?;
            self.mode = config.camera_tracking;
        }

        host.set_object_active(self.tracking_object, self.mode != CameraTrackingMode::Absolute)?;
        self.offset.set_position_offset(host, config.camera_position_offset)?;
        self.offset.update(host, config.align_camera_to_horizon)?;

        if self.mode == CameraTrackingMode::Child {
            let parent = host.camera_info(self.camera)?;
            let mask = *self.saved_culling_mask.get_or_insert(parent.culling_mask);
            host.set_culling_mask(self.tracking_camera, mask)?;
            host.set_clear_flags(self.tracking_camera, parent.clear_flags)?;
            host.set_depth(self.tracking_camera, parent.depth)?;
            // Keeps the host camera running for game scripts while rendering nothing.
            host.set_culling_mask(self.camera, 0)?;
        } else {
            host.set_culling_mask(self.tracking_camera, 0)?;
            host.set_clear_flags(self.tracking_camera, CameraClearFlags::Nothing)?;
            host.set_depth(self.tracking_camera, MUTED_TRACKING_CAMERA_DEPTH)?;
        }
        Ok(())
    }

    /// Applies the head rotation. Runs from late update, before render,
    /// pre-cull and pre-render.
    pub fn track(&mut self, host: &mut dyn HostEngine, config: &UuvrConfig, head: Option<[f32; 4]>)
                 -> Result<(), HostError> {
        if let Some(rotation) = head {
            let target = match self.mode {
                CameraTrackingMode::Absolute => self.object,
                _ => self.tracking_object,
            };
            host.set_local_rotation(target, rotation)?;
        }

        if self.mode == CameraTrackingMode::RelativeMatrix {
            // Mono passes render with the right eye's view.
            let eye = host.stereo_active_eye(self.camera).unwrap_or(VREye::Right);
            let view = host.stereo_view_matrix(self.tracking_camera, eye)?;
            host.set_world_to_camera_matrix(self.camera, view)?;
            self.matrix_overridden = true;
            if config.relative_camera_set_stereo_view {
                host.set_stereo_view_matrix(self.camera, eye, view)?;
            }
        }
        Ok(())
    }

    pub fn begin_frame_rendering(&mut self, host: &mut dyn HostEngine) -> Result<(), HostError> {
        if self.mode != CameraTrackingMode::RelativeTransform || self.rotation_override.is_some() {
            return Ok(());
        }
        let rotation = host.world_rotation(self.tracking_object)?;
        self.rotation_override = Some(RotationOverride::begin(host, self.object, rotation)?);
        Ok(())
    }

    pub fn end_frame_rendering(&mut self, host: &mut dyn HostEngine) -> Result<(), HostError> {
        match self.rotation_override.take() {
            Some(rotation_override) => rotation_override.end(host),
            None => Ok(()),
        }
    }

    fn leave_mode(&mut self, host: &mut dyn HostEngine) -> Result<(), HostError> {
        self.end_frame_rendering(host)?;
        if let Some(mask) = self.saved_culling_mask.take() {
            host.set_culling_mask(self.camera, mask)?;
        }
        if self.matrix_overridden {
            host.reset_world_to_camera_matrix(self.camera)?;
            self.matrix_overridden = false;
        }
        Ok(())
    }

    /// Gives the host camera back as it was and destroys the helpers.
    pub fn detach(mut self, host: &mut dyn HostEngine) {
        if let Err(e) = self.leave_mode(host) {
            warn!("Failed to restore camera {:?}: {}", self.camera, e);
        }
        self.arena.release(host);
    }

    // The host destroyed the camera, and the helpers with it.
    pub fn forget(self) {
        debug!("Dropping VR camera controller {} for destroyed camera {:?}", self.id, self.camera);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHost;
    use approx::assert_relative_eq;
    use uuvr_api::yaw_rotation;
    use uuvr_api::{HostCamera, HostScene};

    fn config(mode: CameraTrackingMode) -> UuvrConfig {
        UuvrConfig {
            camera_tracking: mode,
            ..Default::default()
        }
    }

    fn attached(mode: CameraTrackingMode) -> (MockHost, CameraId, VRCameraController) {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let controller = VRCameraController::attach(&mut host, camera, &config(mode)).unwrap();
        (host, camera, controller)
    }

    #[test]
    fn attach_builds_tracking_rig_under_camera() {
        let (host, camera, controller) = attached(CameraTrackingMode::RelativeMatrix);
        let object = host.camera_object(camera);

        let offsets = host.children(object);
        assert_eq!(offsets.len(), 1);
        assert_eq!(host.object(offsets[0]).unwrap().name, "VrCameraOffset");

        let tracking = host.camera_object(controller.tracking_camera());
        assert_eq!(host.object(tracking).unwrap().parent, Some(offsets[0]));
        assert_eq!(host.object(tracking).unwrap().name, "VrChildCamera");
    }

    #[test]
    fn absolute_mode_rotates_host_camera() {
        let (mut host, camera, mut controller) = attached(CameraTrackingMode::Absolute);
        let cfg = config(CameraTrackingMode::Absolute);
        controller.update(&mut host, &cfg).unwrap();

        let head = yaw_rotation(0.4);
        controller.track(&mut host, &cfg, Some(head)).unwrap();
        controller.track(&mut host, &cfg, Some(head)).unwrap();

        assert_eq!(host.local_rotation(host.camera_object(camera)).unwrap(), head);
        let tracking = host.camera_object(controller.tracking_camera());
        assert!(!host.object(tracking).unwrap().active);
    }

    #[test]
    fn relative_matrix_copies_active_eye_view() {
        let (mut host, camera, mut controller) = attached(CameraTrackingMode::RelativeMatrix);
        let mut cfg = config(CameraTrackingMode::RelativeMatrix);
        controller.update(&mut host, &cfg).unwrap();
        controller.track(&mut host, &cfg, Some(yaw_rotation(-0.3))).unwrap();

        // No active eye means a mono pass, which uses the right eye.
        let right = host.stereo_view_matrix(controller.tracking_camera(), VREye::Right).unwrap();
        assert_eq!(host.world_to_camera_matrix(camera).unwrap(), right);
        assert_eq!(host.camera(camera).unwrap().stereo_view, [None, None]);

        cfg.relative_camera_set_stereo_view = true;
        host.camera_mut(camera).unwrap().active_eye = Some(VREye::Left);
        controller.track(&mut host, &cfg, Some(yaw_rotation(-0.3))).unwrap();
        let left = host.stereo_view_matrix(controller.tracking_camera(), VREye::Left).unwrap();
        assert_eq!(host.world_to_camera_matrix(camera).unwrap(), left);
        assert_eq!(host.camera(camera).unwrap().stereo_view[VREye::Left.index()], Some(left));
    }

    #[test]
    fn child_mode_mutes_host_camera_until_detach() {
        let (mut host, camera, mut controller) = attached(CameraTrackingMode::Child);
        host.set_culling_mask(camera, 0x55).unwrap();
        host.set_depth(camera, 3.0).unwrap();
        host.set_clear_flags(camera, CameraClearFlags::SolidColor).unwrap();

        let cfg = config(CameraTrackingMode::Child);
        controller.update(&mut host, &cfg).unwrap();
        controller.update(&mut host, &cfg).unwrap();

        let tracking = host.camera(controller.tracking_camera()).unwrap().clone();
        assert_eq!(tracking.culling_mask, 0x55);
        assert_eq!(tracking.depth, 3.0);
        assert_eq!(tracking.clear_flags, CameraClearFlags::SolidColor);
        assert_eq!(host.camera(camera).unwrap().culling_mask, 0);
        assert_eq!(controller.camera_in_use(), controller.tracking_camera());

        controller.detach(&mut host);
        assert_eq!(host.camera(camera).unwrap().culling_mask, 0x55);
        assert_eq!(host.objects.len(), 1);
        assert_eq!(host.cameras.len(), 1);
    }

    #[test]
    fn other_modes_mute_tracking_camera() {
        let (mut host, _, mut controller) = attached(CameraTrackingMode::RelativeMatrix);
        controller.update(&mut host, &config(CameraTrackingMode::RelativeMatrix)).unwrap();

        let tracking = host.camera(controller.tracking_camera()).unwrap();
        assert_eq!(tracking.culling_mask, 0);
        assert_eq!(tracking.clear_flags, CameraClearFlags::Nothing);
        assert_eq!(tracking.depth, MUTED_TRACKING_CAMERA_DEPTH);
    }

    #[test]
    fn relative_transform_override_restored() {
        let (mut host, camera, mut controller) = attached(CameraTrackingMode::RelativeTransform);
        let object = host.camera_object(camera);
        let authored = yaw_rotation(0.2);
        host.set_local_rotation(object, authored).unwrap();

        let cfg = config(CameraTrackingMode::RelativeTransform);
        controller.update(&mut host, &cfg).unwrap();
        controller.track(&mut host, &cfg, Some(yaw_rotation(0.9))).unwrap();

        // The tracking camera hangs under the host camera, so its world rotation
        // has to be read before the host camera takes it over.
        let tracked = host.world_rotation(host.camera_object(controller.tracking_camera())).unwrap();
        let dot = |a: [f32; 4], b: [f32; 4]| -> f32 { a.iter().zip(b.iter()).map(|(x, y)| x * y).sum() };
        assert_relative_eq!(dot(tracked, yaw_rotation(1.1)).abs(), 1.0, epsilon = 1e-5);

        controller.begin_frame_rendering(&mut host).unwrap();
        controller.begin_frame_rendering(&mut host).unwrap();
        assert_relative_eq!(dot(host.world_rotation(object).unwrap(), tracked).abs(), 1.0, epsilon = 1e-5);
        controller.end_frame_rendering(&mut host).unwrap();
        assert_eq!(host.local_rotation(object).unwrap(), authored);

        // A frame that never reaches its end callback is undone on detach.
        controller.begin_frame_rendering(&mut host).unwrap();
        controller.detach(&mut host);
        assert_eq!(host.local_rotation(object).unwrap(), authored);
    }

    #[test]
    fn mode_switch_resets_view_matrix() {
        let (mut host, camera, mut controller) = attached(CameraTrackingMode::RelativeMatrix);
        let cfg = config(CameraTrackingMode::RelativeMatrix);
        controller.update(&mut host, &cfg).unwrap();
        controller.track(&mut host, &cfg, Some(yaw_rotation(1.0))).unwrap();
        assert!(host.camera(camera).unwrap().world_to_camera.is_some());

        controller.update(&mut host, &config(CameraTrackingMode::Absolute)).unwrap();
        assert!(host.camera(camera).unwrap().world_to_camera.is_none());
        assert_eq!(controller.mode(), CameraTrackingMode::Absolute);
    }

    #[test]
    fn depth_override_applied_on_update() {
        let (mut host, camera, mut controller) = attached(CameraTrackingMode::RelativeMatrix);
        let cfg = UuvrConfig {
            override_depth: true,
            vr_camera_depth: 7.0,
            ..Default::default()
        };
        controller.update(&mut host, &cfg).unwrap();
        assert_eq!(host.camera(camera).unwrap().depth, 7.0);
    }
}
