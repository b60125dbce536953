// Interface versions, NUL terminated for GetGenericInterface.
pub const IVRSYSTEM_FNTABLE: &[u8] = b"FnTable:IVRSystem_019\0";
pub const IVRCOMPOSITOR_FNTABLE: &[u8] = b"FnTable:IVRCompositor_022\0";

// EVRApplicationType::VRApplication_Scene
pub const APPLICATION_TYPE_SCENE: i32 = 1;
// ETextureType::TextureType_DirectX
pub const TEXTURE_TYPE_DIRECTX: i32 = 0;
// EVRSubmitFlags::Submit_Default
pub const SUBMIT_DEFAULT: i32 = 0;

pub const K_UNMAXTRACKEDDEVICECOUNT: u32 = 64;

// Event ids understood by the render event function of the Unity hooks.
pub const EVENT_WAIT_GET_POSES: i32 = 201510020;
pub const EVENT_SUBMIT_LEFT: i32 = 201510021;
pub const EVENT_SUBMIT_RIGHT: i32 = 201510022;
pub const EVENT_FLUSH: i32 = 201510023;
pub const EVENT_POST_PRESENT_HANDOFF: i32 = 201510024;

#[cfg(windows)]
pub const OPENVR_LIBRARY_NAME: &str = "openvr_api.dll";
#[cfg(not(windows))]
pub const OPENVR_LIBRARY_NAME: &str = "libopenvr_api.so";
