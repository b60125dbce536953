// Portion of a texture sampled by the compositor, in UV space.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRTextureBounds {
    pub u_min: f32,
    pub v_min: f32,
    pub u_max: f32,
    pub v_max: f32,
}

impl Default for VRTextureBounds {
    fn default() -> VRTextureBounds {
        VRTextureBounds::full()
    }
}

impl VRTextureBounds {
    pub fn full() -> VRTextureBounds {
        VRTextureBounds {
            u_min: 0.0,
            v_min: 0.0,
            u_max: 1.0,
            v_max: 1.0,
        }
    }

    // DirectX-style targets are stored upside down.
    pub fn flipped_vertically() -> VRTextureBounds {
        VRTextureBounds {
            u_min: 0.0,
            v_min: 1.0,
            u_max: 1.0,
            v_max: 0.0,
        }
    }

    pub fn for_target(flip_vertically: bool) -> VRTextureBounds {
        if flip_vertically {
            VRTextureBounds::flipped_vertically()
        } else {
            VRTextureBounds::full()
        }
    }
}

// Native texture pointer handed to the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VRTextureHandle(pub usize);

// EColorSpace
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VRColorSpace {
    Auto = 0,
    Gamma = 1,
    Linear = 2,
}

impl Default for VRColorSpace {
    fn default() -> VRColorSpace {
        VRColorSpace::Auto
    }
}
