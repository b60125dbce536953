// Hand-written subset of the OpenVR flat API. Function tables only declare
// their leading entries; they are only ever accessed through pointers handed
// out by the runtime.
#![allow(non_camel_case_types, non_snake_case, dead_code)]

use std::os::raw::{c_char, c_void};
use uuvr_api::{HmdMatrix34, HmdMatrix44};

pub type EVRInitError = i32;
pub type EVRCompositorError = i32;
pub type EVREye = i32;
pub type EColorSpace = i32;
pub type EVRSubmitFlags = i32;
pub type ETrackingUniverseOrigin = i32;
pub type TrackedDeviceIndex_t = u32;

pub type HmdMatrix34_t = HmdMatrix34;
pub type HmdMatrix44_t = HmdMatrix44;

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct HmdVector3_t {
    pub v: [f32; 3],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct DistortionCoordinates_t {
    pub rfRed: [f32; 2],
    pub rfGreen: [f32; 2],
    pub rfBlue: [f32; 2],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct TrackedDevicePose_t {
    pub mDeviceToAbsoluteTracking: HmdMatrix34_t,
    pub vVelocity: HmdVector3_t,
    pub vAngularVelocity: HmdVector3_t,
    pub eTrackingResult: i32,
    pub bPoseIsValid: bool,
    pub bDeviceIsConnected: bool,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct Texture_t {
    pub handle: *mut c_void,
    pub eType: i32,
    pub eColorSpace: EColorSpace,
}

#[repr(C)]
#[derive(Debug, Clone, Copy, Default)]
pub struct VRTextureBounds_t {
    pub uMin: f32,
    pub vMin: f32,
    pub uMax: f32,
    pub vMax: f32,
}

#[repr(C)]
pub struct VR_IVRSystem_FnTable {
    pub GetRecommendedRenderTargetSize: Option<unsafe extern "system" fn(*mut u32, *mut u32)>,
    pub GetProjectionMatrix: Option<unsafe extern "system" fn(EVREye, f32, f32) -> HmdMatrix44_t>,
    pub GetProjectionRaw: Option<unsafe extern "system" fn(EVREye, *mut f32, *mut f32, *mut f32, *mut f32)>,
    pub ComputeDistortion: Option<unsafe extern "system" fn(EVREye, f32, f32, *mut DistortionCoordinates_t) -> bool>,
    pub GetEyeToHeadTransform: Option<unsafe extern "system" fn(EVREye) -> HmdMatrix34_t>,
}

#[repr(C)]
pub struct VR_IVRCompositor_FnTable {
    pub SetTrackingSpace: Option<unsafe extern "system" fn(ETrackingUniverseOrigin)>,
    pub GetTrackingSpace: Option<unsafe extern "system" fn() -> ETrackingUniverseOrigin>,
    pub WaitGetPoses: Option<unsafe extern "system" fn(*mut TrackedDevicePose_t, u32,
                                                        *mut TrackedDevicePose_t, u32) -> EVRCompositorError>,
    pub GetLastPoses: Option<unsafe extern "system" fn(*mut TrackedDevicePose_t, u32,
                                                        *mut TrackedDevicePose_t, u32) -> EVRCompositorError>,
    pub GetLastPoseForTrackedDeviceIndex: Option<unsafe extern "system" fn(TrackedDeviceIndex_t,
                                                                            *mut TrackedDevicePose_t,
                                                                            *mut TrackedDevicePose_t)
                                                                            -> EVRCompositorError>,
    pub Submit: Option<unsafe extern "system" fn(EVREye, *mut Texture_t, *mut VRTextureBounds_t,
                                                  EVRSubmitFlags) -> EVRCompositorError>,
    pub ClearLastSubmittedFrame: Option<unsafe extern "system" fn()>,
    pub PostPresentHandoff: Option<unsafe extern "system" fn()>,
}

// openvr_api.dll exports
pub type VRInitInternal = unsafe extern "C" fn(*mut EVRInitError, i32) -> isize;
pub type VRShutdownInternal = unsafe extern "C" fn();
pub type VRIsHmdPresent = unsafe extern "C" fn() -> bool;
pub type VRIsRuntimeInstalled = unsafe extern "C" fn() -> bool;
pub type VRGetGenericInterface = unsafe extern "C" fn(*const c_char, *mut EVRInitError) -> isize;
pub type VRGetInitErrorDescription = unsafe extern "C" fn(EVRInitError) -> *const c_char;

// Unity render hooks, only present in the openvr_api build shipped with Unity.
pub type UnityRenderingEvent = unsafe extern "system" fn(i32);
pub type UnityHooksGetRenderEventFunc = unsafe extern "system" fn() -> Option<UnityRenderingEvent>;
pub type UnityHooksSetSubmitParams = unsafe extern "system" fn(VRTextureBounds_t, VRTextureBounds_t, EVRSubmitFlags);
pub type UnityHooksSetColorSpace = unsafe extern "system" fn(EColorSpace);
