use std::collections::BTreeMap;
use std::sync::Arc;
use uuvr_api::{CameraClearFlags, CameraId, HostCamera, HostCameraInfo, HostCapabilities,
               HostColorSpace, HostEngine, HostError, HostGraphics, HostScene, HostXr, ObjectId,
               RenderEventQueue, RenderTextureDesc, RenderThreadModel, StereoTargetEye, TextureId,
               VREye, VRPose, VRTextureHandle, XrLoaderId, XrLoaderSettings};
use uuvr_api::{quat_from_rotation, rotation_from_quat};

// Half the default interpupillary distance used for host-side stereo matrices.
const MOCK_HALF_IPD: f32 = 0.032;

#[derive(Debug, Clone, PartialEq)]
pub struct MockObject {
    pub name: String,
    pub parent: Option<ObjectId>,
    pub active: bool,
    pub position: [f32; 3],
    pub rotation: [f32; 4],
    pub camera: Option<CameraId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MockCamera {
    pub object: ObjectId,
    pub enabled: bool,
    pub target_texture: Option<TextureId>,
    pub stereo_target_eye: StereoTargetEye,
    pub depth: f32,
    pub culling_mask: i32,
    pub clear_flags: CameraClearFlags,
    pub near_clip: f32,
    pub far_clip: f32,
    pub allow_hdr: bool,
    pub field_of_view: f32,
    pub aspect: f32,
    pub world_to_camera: Option<[f32; 16]>,
    pub stereo_view: [Option<[f32; 16]>; 2],
    pub projection: Option<[f32; 16]>,
    pub active_eye: Option<VREye>,
}

impl MockCamera {
    fn new(object: ObjectId) -> MockCamera {
        MockCamera {
            object: object,
            enabled: true,
            target_texture: None,
            stereo_target_eye: StereoTargetEye::Both,
            depth: 0.0,
            culling_mask: -1,
            clear_flags: CameraClearFlags::Skybox,
            near_clip: 0.3,
            far_clip: 1000.0,
            allow_hdr: false,
            field_of_view: 60.0,
            aspect: 16.0 / 9.0,
            world_to_camera: None,
            stereo_view: [None, None],
            projection: None,
            active_eye: None,
        }
    }
}

/// One `render` call as seen by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct MockRender {
    pub camera: CameraId,
    pub world_pose: VRPose,
    pub target_texture: Option<TextureId>,
    pub projection: Option<[f32; 16]>,
}

/// In-memory host engine: a flat scene graph with cameras, render textures
/// and an XR-management surface that records what was asked of it.
pub struct MockHost {
    pub objects: BTreeMap<ObjectId, MockObject>,
    pub cameras: BTreeMap<CameraId, MockCamera>,
    pub textures: BTreeMap<TextureId, RenderTextureDesc>,
    pub capabilities: HostCapabilities,
    pub main_camera: Option<CameraId>,
    pub current_camera: Option<CameraId>,
    pub head_rotation: Option<[f32; 4]>,
    pub native_vr_enabled: bool,
    pub render_target: Option<TextureId>,
    pub blits: usize,
    pub renders: Vec<MockRender>,
    // Every render after this many successful ones fails.
    pub fail_render_after: Option<usize>,
    pub anti_aliasing: u32,
    pub color_space: HostColorSpace,
    pub loader_calls: Vec<&'static str>,
    pub loader_settings: Option<XrLoaderSettings>,
    pub loader_becomes_active: bool,
    pub event_queue: Option<Arc<dyn RenderEventQueue>>,
    next_id: u64,
}

impl MockHost {
    pub fn new() -> MockHost {
        MockHost {
            objects: BTreeMap::new(),
            cameras: BTreeMap::new(),
            textures: BTreeMap::new(),
            capabilities: HostCapabilities {
                render_thread: RenderThreadModel::Explicit,
                ..Default::default()
            },
            main_camera: None,
            current_camera: None,
            head_rotation: None,
            native_vr_enabled: false,
            render_target: None,
            blits: 0,
            renders: Vec::new(),
            fail_render_after: None,
            anti_aliasing: 0,
            color_space: HostColorSpace::Linear,
            loader_calls: Vec::new(),
            loader_settings: None,
            loader_becomes_active: true,
            event_queue: None,
            next_id: 1,
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Adds a root object carrying an enabled stereo camera. The first one
    /// becomes the main camera.
    pub fn add_scene_camera(&mut self, name: &str) -> CameraId {
        let id = self.next_id();
        let object = ObjectId(id);
        self.objects.insert(object, MockObject {
            name: name.to_owned(),
            parent: None,
            active: true,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            camera: None,
        });
        let camera = self.attach_camera(object);
        if self.main_camera.is_none() {
            self.main_camera = Some(camera);
        }
        camera
    }

    pub fn camera_object(&self, camera: CameraId) -> ObjectId {
        self.cameras[&camera].object
    }

    pub fn camera(&self, camera: CameraId) -> Option<&MockCamera> {
        self.cameras.get(&camera)
    }

    pub fn camera_mut(&mut self, camera: CameraId) -> Option<&mut MockCamera> {
        self.cameras.get_mut(&camera)
    }

    pub fn object(&self, object: ObjectId) -> Option<&MockObject> {
        self.objects.get(&object)
    }

    pub fn children(&self, parent: ObjectId) -> Vec<ObjectId> {
        self.objects.iter()
            .filter(|&(_, o)| o.parent == Some(parent))
            .map(|(id, _)| *id)
            .collect()
    }

    pub fn world_pose(&self, object: ObjectId) -> Result<VRPose, HostError> {
        let o = self.get_object(object)?;
        let local = VRPose {
            position: o.position,
            orientation: o.rotation,
        };
        match o.parent {
            Some(parent) => Ok(self.world_pose(parent)?.compose(&local)),
            None => Ok(local),
        }
    }

    fn attach_camera(&mut self, object: ObjectId) -> CameraId {
        let camera = CameraId(self.next_id());
        self.cameras.insert(camera, MockCamera::new(object));
        if let Some(o) = self.objects.get_mut(&object) {
            o.camera = Some(camera);
        }
        camera
    }

    fn get_object(&self, object: ObjectId) -> Result<&MockObject, HostError> {
        self.objects.get(&object).ok_or(HostError::ObjectDestroyed(object.0))
    }

    fn get_object_mut(&mut self, object: ObjectId) -> Result<&mut MockObject, HostError> {
        self.objects.get_mut(&object).ok_or(HostError::ObjectDestroyed(object.0))
    }

    fn get_camera(&self, camera: CameraId) -> Result<&MockCamera, HostError> {
        self.cameras.get(&camera).ok_or(HostError::ObjectDestroyed(camera.0))
    }

    fn get_camera_mut(&mut self, camera: CameraId) -> Result<&mut MockCamera, HostError> {
        self.cameras.get_mut(&camera).ok_or(HostError::ObjectDestroyed(camera.0))
    }

    fn active_in_hierarchy(&self, object: ObjectId) -> bool {
        match self.objects.get(&object) {
            Some(o) => o.active && o.parent.map_or(true, |parent| self.active_in_hierarchy(parent)),
            None => false,
        }
    }

    fn parent_world_rotation(&self, object: ObjectId) -> Result<Option<[f32; 4]>, HostError> {
        match self.get_object(object)?.parent {
            Some(parent) => Ok(Some(self.world_rotation(parent)?)),
            None => Ok(None),
        }
    }
}

impl HostScene for MockHost {
    fn active_cameras(&self) -> Vec<CameraId> {
        self.cameras.iter()
            .filter(|&(_, c)| c.enabled && self.active_in_hierarchy(c.object))
            .map(|(id, _)| *id)
            .collect()
    }

    fn camera_info(&self, camera: CameraId) -> Result<HostCameraInfo, HostError> {
        let c = self.get_camera(camera)?;
        let object = self.get_object(c.object)?;
        Ok(HostCameraInfo {
            name: object.name.clone(),
            object: c.object,
            is_active_and_enabled: c.enabled && self.active_in_hierarchy(c.object),
            target_texture: c.target_texture,
            stereo_target_eye: c.stereo_target_eye,
            depth: c.depth,
            culling_mask: c.culling_mask,
            clear_flags: c.clear_flags,
            near_clip: c.near_clip,
            far_clip: c.far_clip,
            allow_hdr: c.allow_hdr,
        })
    }

    fn main_camera(&self) -> Option<CameraId> {
        self.main_camera.filter(|camera| self.cameras.contains_key(camera))
    }

    fn current_camera(&self) -> Option<CameraId> {
        self.current_camera.filter(|camera| self.cameras.contains_key(camera))
    }

    fn create_object(&mut self, name: &str, parent: Option<ObjectId>) -> Result<ObjectId, HostError> {
        if let Some(parent) = parent {
            self.get_object(parent)?;
        }
        let object = ObjectId(self.next_id());
        self.objects.insert(object, MockObject {
            name: name.to_owned(),
            parent: parent,
            active: true,
            position: [0.0; 3],
            rotation: [0.0, 0.0, 0.0, 1.0],
            camera: None,
        });
        Ok(object)
    }

    // Destroys the object with its whole subtree, cameras included.
    fn destroy_object(&mut self, object: ObjectId) -> Result<(), HostError> {
        let removed = self.objects.remove(&object).ok_or(HostError::ObjectDestroyed(object.0))?;
        if let Some(camera) = removed.camera {
            self.cameras.remove(&camera);
        }
        for child in self.children(object) {
            self.destroy_object(child)?;
        }
        Ok(())
    }

    fn set_object_active(&mut self, object: ObjectId, active: bool) -> Result<(), HostError> {
        self.get_object_mut(object)?.active = active;
        Ok(())
    }

    fn add_camera(&mut self, object: ObjectId) -> Result<CameraId, HostError> {
        if self.get_object(object)?.camera.is_some() {
            return Err(HostError::Internal(format!("object {:?} already has a camera", object)));
        }
        Ok(self.attach_camera(object))
    }

    fn local_position(&self, object: ObjectId) -> Result<[f32; 3], HostError> {
        Ok(self.get_object(object)?.position)
    }

    fn set_local_position(&mut self, object: ObjectId, position: [f32; 3]) -> Result<(), HostError> {
        self.get_object_mut(object)?.position = position;
        Ok(())
    }

    fn local_rotation(&self, object: ObjectId) -> Result<[f32; 4], HostError> {
        Ok(self.get_object(object)?.rotation)
    }

    fn set_local_rotation(&mut self, object: ObjectId, rotation: [f32; 4]) -> Result<(), HostError> {
        self.get_object_mut(object)?.rotation = rotation;
        Ok(())
    }

    fn world_rotation(&self, object: ObjectId) -> Result<[f32; 4], HostError> {
        let local = self.get_object(object)?.rotation;
        match self.parent_world_rotation(object)? {
            Some(parent) => {
                let world = rotation_from_quat(&local).then(&rotation_from_quat(&parent));
                Ok(quat_from_rotation(&world.normalize()))
            },
            None => Ok(local),
        }
    }

    fn set_world_rotation(&mut self, object: ObjectId, rotation: [f32; 4]) -> Result<(), HostError> {
        let local = match self.parent_world_rotation(object)? {
            Some(parent) => {
                let local = rotation_from_quat(&rotation).then(&rotation_from_quat(&parent).inverse());
                quat_from_rotation(&local.normalize())
            },
            None => rotation,
        };
        self.set_local_rotation(object, local)
    }
}

impl HostCamera for MockHost {
    fn copy_camera_settings(&mut self, from: CameraId, to: CameraId) -> Result<(), HostError> {
        let source = self.get_camera(from)?.clone();
        let target = self.get_camera_mut(to)?;
        target.stereo_target_eye = source.stereo_target_eye;
        target.depth = source.depth;
        target.culling_mask = source.culling_mask;
        target.clear_flags = source.clear_flags;
        target.near_clip = source.near_clip;
        target.far_clip = source.far_clip;
        target.allow_hdr = source.allow_hdr;
        target.field_of_view = source.field_of_view;
        target.aspect = source.aspect;
        Ok(())
    }

    fn set_camera_enabled(&mut self, camera: CameraId, enabled: bool) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.enabled = enabled;
        Ok(())
    }

    fn set_culling_mask(&mut self, camera: CameraId, mask: i32) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.culling_mask = mask;
        Ok(())
    }

    fn set_clear_flags(&mut self, camera: CameraId, flags: CameraClearFlags) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.clear_flags = flags;
        Ok(())
    }

    fn set_depth(&mut self, camera: CameraId, depth: f32) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.depth = depth;
        Ok(())
    }

    fn set_field_of_view(&mut self, camera: CameraId, degrees: f32) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.field_of_view = degrees;
        Ok(())
    }

    fn set_aspect(&mut self, camera: CameraId, aspect: f32) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.aspect = aspect;
        Ok(())
    }

    fn world_to_camera_matrix(&self, camera: CameraId) -> Result<[f32; 16], HostError> {
        let c = self.get_camera(camera)?;
        match c.world_to_camera {
            Some(matrix) => Ok(matrix),
            None => Ok(self.world_pose(c.object)?.inverse().to_column_major()),
        }
    }

    fn set_world_to_camera_matrix(&mut self, camera: CameraId, matrix: [f32; 16]) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.world_to_camera = Some(matrix);
        Ok(())
    }

    fn reset_world_to_camera_matrix(&mut self, camera: CameraId) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.world_to_camera = None;
        Ok(())
    }

    fn stereo_view_matrix(&self, camera: CameraId, eye: VREye) -> Result<[f32; 16], HostError> {
        let c = self.get_camera(camera)?;
        if let Some(matrix) = c.stereo_view[eye.index()] {
            return Ok(matrix);
        }
        let offset = match eye {
            VREye::Left => -MOCK_HALF_IPD,
            VREye::Right => MOCK_HALF_IPD,
        };
        let eye_pose = self.world_pose(c.object)?.compose(&VRPose::new([offset, 0.0, 0.0], [0.0, 0.0, 0.0, 1.0]));
        Ok(eye_pose.inverse().to_column_major())
    }

    fn set_stereo_view_matrix(&mut self, camera: CameraId, eye: VREye, matrix: [f32; 16]) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.stereo_view[eye.index()] = Some(matrix);
        Ok(())
    }

    fn set_projection_matrix(&mut self, camera: CameraId, matrix: [f32; 16]) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.projection = Some(matrix);
        Ok(())
    }

    fn reset_projection_matrix(&mut self, camera: CameraId) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.projection = None;
        Ok(())
    }

    fn stereo_active_eye(&self, camera: CameraId) -> Option<VREye> {
        self.cameras.get(&camera).and_then(|c| c.active_eye)
    }

    fn set_target_texture(&mut self, camera: CameraId, texture: Option<TextureId>) -> Result<(), HostError> {
        self.get_camera_mut(camera)?.target_texture = texture;
        Ok(())
    }

    fn render(&mut self, camera: CameraId) -> Result<(), HostError> {
        if let Some(limit) = self.fail_render_after {
            if self.renders.len() >= limit {
                return Err(HostError::RenderFailed(format!("camera {:?} failed to render", camera)));
            }
        }
        let c = self.get_camera(camera)?;
        let render = MockRender {
            camera: camera,
            world_pose: self.world_pose(c.object)?,
            target_texture: c.target_texture,
            projection: c.projection,
        };
        self.renders.push(render);
        Ok(())
    }
}

impl HostGraphics for MockHost {
    fn create_render_texture(&mut self, desc: &RenderTextureDesc) -> Result<TextureId, HostError> {
        let texture = TextureId(self.next_id());
        self.textures.insert(texture, *desc);
        Ok(texture)
    }

    fn destroy_render_texture(&mut self, texture: TextureId) -> Result<(), HostError> {
        self.textures.remove(&texture).map(|_| ()).ok_or(HostError::ObjectDestroyed(texture.0))
    }

    fn native_texture_ptr(&self, texture: TextureId) -> Result<VRTextureHandle, HostError> {
        if !self.textures.contains_key(&texture) {
            return Err(HostError::ObjectDestroyed(texture.0));
        }
        Ok(VRTextureHandle(0x1000 + texture.0 as usize))
    }

    fn set_render_target(&mut self, texture: Option<TextureId>) -> Result<(), HostError> {
        if let Some(texture) = texture {
            if !self.textures.contains_key(&texture) {
                return Err(HostError::ObjectDestroyed(texture.0));
            }
        }
        self.render_target = texture;
        Ok(())
    }

    fn blit_to_screen(&mut self, texture: TextureId) -> Result<(), HostError> {
        if !self.textures.contains_key(&texture) {
            return Err(HostError::ObjectDestroyed(texture.0));
        }
        self.blits += 1;
        Ok(())
    }

    fn anti_aliasing(&self) -> u32 {
        self.anti_aliasing
    }

    fn active_color_space(&self) -> HostColorSpace {
        self.color_space
    }

    fn render_event_queue(&self) -> Option<Arc<dyn RenderEventQueue>> {
        self.event_queue.clone()
    }
}

impl HostXr for MockHost {
    fn set_native_vr_enabled(&mut self, enabled: bool) -> Result<(), HostError> {
        self.native_vr_enabled = enabled;
        Ok(())
    }

    fn head_local_rotation(&self) -> Option<[f32; 4]> {
        self.head_rotation
    }

    fn create_xr_loader(&mut self, settings: &XrLoaderSettings) -> Result<XrLoaderId, HostError> {
        self.loader_calls.push("create");
        self.loader_settings = Some(settings.clone());
        Ok(XrLoaderId(self.next_id()))
    }

    fn initialize_loader_sync(&mut self, _loader: XrLoaderId) -> Result<bool, HostError> {
        self.loader_calls.push("initialize_loader_sync");
        Ok(self.loader_becomes_active)
    }

    fn start_subsystems(&mut self, _loader: XrLoaderId) -> Result<(), HostError> {
        self.loader_calls.push("start_subsystems");
        Ok(())
    }

    fn loader_initialize(&mut self, _loader: XrLoaderId) -> bool {
        self.loader_calls.push("initialize");
        true
    }

    fn loader_start(&mut self, _loader: XrLoaderId) -> bool {
        self.loader_calls.push("start");
        true
    }

    fn loader_stop(&mut self, _loader: XrLoaderId) -> bool {
        self.loader_calls.push("stop");
        true
    }

    fn loader_deinitialize(&mut self, _loader: XrLoaderId) -> bool {
        self.loader_calls.push("deinitialize");
        true
    }
}

impl HostEngine for MockHost {
    fn probe_capabilities(&self) -> HostCapabilities {
        self.capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use uuvr_api::yaw_rotation;

    #[test]
    fn world_rotation_follows_parent_chain() {
        let mut host = MockHost::new();
        let root = host.create_object("root", None).unwrap();
        let child = host.create_object("child", Some(root)).unwrap();
        host.set_local_rotation(root, yaw_rotation(0.5)).unwrap();
        host.set_world_rotation(child, yaw_rotation(1.25)).unwrap();

        let local = host.local_rotation(child).unwrap();
        let expected = yaw_rotation(0.75);
        let dot: f32 = local.iter().zip(expected.iter()).map(|(a, b)| a * b).sum();
        assert_relative_eq!(dot.abs(), 1.0, epsilon = 1e-5);
        let world = host.world_rotation(child).unwrap();
        let dot: f32 = world.iter().zip(yaw_rotation(1.25).iter()).map(|(a, b)| a * b).sum();
        assert_relative_eq!(dot.abs(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn destroying_parent_removes_subtree_cameras() {
        let mut host = MockHost::new();
        let camera = host.add_scene_camera("Main Camera");
        let object = host.camera_object(camera);
        let child = host.create_object("child", Some(object)).unwrap();
        let child_camera = host.add_camera(child).unwrap();

        host.destroy_object(object).unwrap();
        assert!(host.camera(camera).is_none());
        assert!(host.camera(child_camera).is_none());
        assert!(host.objects.is_empty());
    }
}
