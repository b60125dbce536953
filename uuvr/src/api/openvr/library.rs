use libloading as lib;
#[cfg(unix)]
use libloading::os::unix::Symbol as Symbol;
#[cfg(windows)]
use libloading::os::windows::Symbol as Symbol;

use super::binding::*;
use super::constants;

pub struct OpenVRLibrary {
    _lib: lib::Library,
    pub init_internal: Symbol<VRInitInternal>,
    pub shutdown_internal: Symbol<VRShutdownInternal>,
    pub is_hmd_present: Symbol<VRIsHmdPresent>,
    pub is_runtime_installed: Symbol<VRIsRuntimeInstalled>,
    pub get_interface: Symbol<VRGetGenericInterface>,
    pub init_error_description: Symbol<VRGetInitErrorDescription>,
    pub hooks: Option<OpenVRUnityHooks>,
}

pub struct OpenVRUnityHooks {
    pub get_render_event_func: Symbol<UnityHooksGetRenderEventFunc>,
    pub set_submit_params: Symbol<UnityHooksSetSubmitParams>,
    pub set_color_space: Symbol<UnityHooksSetColorSpace>,
}

impl OpenVRLibrary {
    pub unsafe fn new() -> Result<OpenVRLibrary, lib::Error> {
        let lib = lib::Library::new(constants::OPENVR_LIBRARY_NAME)?;
        let init_internal = lib.get::<VRInitInternal>(b"VR_InitInternal\0")?.into_raw();
        let shutdown_internal = lib.get::<VRShutdownInternal>(b"VR_ShutdownInternal\0")?.into_raw();
        let is_hmd_present = lib.get::<VRIsHmdPresent>(b"VR_IsHmdPresent\0")?.into_raw();
        let is_runtime_installed = lib.get::<VRIsRuntimeInstalled>(b"VR_IsRuntimeInstalled\0")?.into_raw();
        let get_interface = lib.get::<VRGetGenericInterface>(b"VR_GetGenericInterface\0")?.into_raw();
        let init_error_description =
            lib.get::<VRGetInitErrorDescription>(b"VR_GetVRInitErrorAsEnglishDescription\0")?.into_raw();
        let hooks = OpenVRLibrary::load_hooks(&lib);

        Ok(OpenVRLibrary {
            _lib: lib,
            init_internal: init_internal,
            shutdown_internal: shutdown_internal,
            is_hmd_present: is_hmd_present,
            is_runtime_installed: is_runtime_installed,
            get_interface: get_interface,
            init_error_description: init_error_description,
            hooks: hooks,
        })
    }

    unsafe fn load_hooks(lib: &lib::Library) -> Option<OpenVRUnityHooks> {
        match OpenVRLibrary::get_hooks(lib) {
            Ok(hooks) => Some(hooks),
            Err(e) => {
                debug!("OpenVR library has no Unity render hooks: {}", e);
                None
            },
        }
    }

    unsafe fn get_hooks(lib: &lib::Library) -> Result<OpenVRUnityHooks, lib::Error> {
        let get_render_event_func =
            lib.get::<UnityHooksGetRenderEventFunc>(b"UnityHooks_GetRenderEventFunc\0")?.into_raw();
        let set_submit_params = lib.get::<UnityHooksSetSubmitParams>(b"UnityHooks_SetSubmitParams\0")?.into_raw();
        let set_color_space = lib.get::<UnityHooksSetColorSpace>(b"UnityHooks_SetColorSpace\0")?.into_raw();
        Ok(OpenVRUnityHooks {
            get_render_event_func: get_render_event_func,
            set_submit_params: set_submit_params,
            set_color_space: set_color_space,
        })
    }
}
