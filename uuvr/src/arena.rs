use uuvr_api::{CameraId, HostEngine, HostError, ObjectId, RenderTextureDesc, TextureId};

/// Owns the helper objects one component created in the host scene.
///
/// Host objects are never registered here; releasing the arena destroys
/// exactly what it created, children before parents.
#[derive(Debug, Default)]
pub struct HelperArena {
    objects: Vec<ObjectId>,
    textures: Vec<TextureId>,
}

impl HelperArena {
    pub fn new() -> HelperArena {
        HelperArena::default()
    }

    pub fn create_object<H: HostEngine + ?Sized>(&mut self, host: &mut H, name: &str, parent: Option<ObjectId>)
                                                 -> Result<ObjectId, HostError> {
        let object = host.create_object(name, parent)?;
        self.objects.push(object);
        Ok(object)
    }

    pub fn create_camera<H: HostEngine + ?Sized>(&mut self, host: &mut H, name: &str, parent: Option<ObjectId>)
                                                 -> Result<(ObjectId, CameraId), HostError> {
        let object = self.create_object(host, name, parent)?;
        let camera = host.add_camera(object)?;
        Ok((object, camera))
    }

    pub fn create_render_texture<H: HostEngine + ?Sized>(&mut self, host: &mut H, desc: &RenderTextureDesc)
                                                         -> Result<TextureId, HostError> {
        let texture = host.create_render_texture(desc)?;
        self.textures.push(texture);
        Ok(texture)
    }

    pub fn owns_object(&self, object: ObjectId) -> bool {
        self.objects.contains(&object)
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty() && self.textures.is_empty()
    }

    // Destroys everything. Failures are logged and the rest is still released.
    pub fn release<H: HostEngine + ?Sized>(&mut self, host: &mut H) {
        for texture in self.textures.drain(..) {
            if let Err(e) = host.destroy_render_texture(texture) {
                warn!("Failed to destroy render texture {:?}: {}", texture, e);
            }
        }
        while let Some(object) = self.objects.pop() {
            if let Err(e) = host.destroy_object(object) {
                warn!("Failed to destroy helper object {:?}: {}", object, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHost;
    use uuvr_api::HostScene;

    #[test]
    fn release_destroys_only_owned_objects() {
        let mut host = MockHost::new();
        let main = host.add_scene_camera("Main Camera");
        let parent = host.camera_object(main);
        let mut arena = HelperArena::new();

        let offset = arena.create_object(&mut host, "VrCameraOffset", Some(parent)).unwrap();
        let (child, _) = arena.create_camera(&mut host, "VrChildCamera", Some(offset)).unwrap();
        arena.create_render_texture(&mut host, &RenderTextureDesc {
            width: 64,
            height: 64,
            hdr: false,
            anti_aliasing: 1,
        }).unwrap();
        assert!(arena.owns_object(child));
        assert!(!arena.owns_object(parent));
        assert_eq!(host.objects.len(), 3);

        arena.release(&mut host);
        assert!(arena.is_empty());
        assert_eq!(host.objects.len(), 1);
        assert!(host.textures.is_empty());
        assert!(host.camera(main).is_some());
    }

    #[test]
    fn release_survives_objects_destroyed_by_host() {
        let mut host = MockHost::new();
        let mut arena = HelperArena::new();
        let root = arena.create_object(&mut host, "Helper", None).unwrap();
        arena.create_object(&mut host, "Nested", Some(root)).unwrap();
        host.destroy_object(root).unwrap();

        arena.release(&mut host);
        assert!(arena.is_empty());
        assert!(host.objects.is_empty());
    }
}
