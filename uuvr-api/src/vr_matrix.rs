/// Row-major 3x4 matrix in the VR runtime's layout (`HmdMatrix34_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct HmdMatrix34 {
    pub m: [[f32; 4]; 3],
}

/// Row-major 4x4 matrix in the VR runtime's layout (`HmdMatrix44_t`).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct HmdMatrix44 {
    pub m: [[f32; 4]; 4],
}

impl Default for HmdMatrix34 {
    fn default() -> HmdMatrix34 {
        HmdMatrix34 {
            m: [[1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0]],
        }
    }
}

impl Default for HmdMatrix44 {
    fn default() -> HmdMatrix44 {
        HmdMatrix44 {
            m: [[1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [0.0, 0.0, 0.0, 1.0]],
        }
    }
}

impl HmdMatrix34 {
    /// Column-major 4x4 copy, the layout the host engine stores matrices in.
    #[inline]
    pub fn to_column_major(&self) -> [f32; 16] {
        let m = &self.m;
        [m[0][0], m[1][0], m[2][0], 0.0,
         m[0][1], m[1][1], m[2][1], 0.0,
         m[0][2], m[1][2], m[2][2], 0.0,
         m[0][3], m[1][3], m[2][3], 1.0]
    }

    #[inline]
    pub fn rotation(&self) -> [[f32; 3]; 3] {
        let m = &self.m;
        [[m[0][0], m[0][1], m[0][2]],
         [m[1][0], m[1][1], m[1][2]],
         [m[2][0], m[2][1], m[2][2]]]
    }

    #[inline]
    pub fn translation(&self) -> [f32; 3] {
        [self.m[0][3], self.m[1][3], self.m[2][3]]
    }
}

impl HmdMatrix44 {
    /// Column-major copy. Element order matches the host's `m00..m33` fields
    /// read row by row, which is how runtime projection matrices are handed over.
    #[inline]
    pub fn to_column_major(&self) -> [f32; 16] {
        let m = &self.m;
        [m[0][0], m[1][0], m[2][0], m[3][0],
         m[0][1], m[1][1], m[2][1], m[3][1],
         m[0][2], m[1][2], m[2][2], m[3][2],
         m[0][3], m[1][3], m[2][3], m[3][3]]
    }

    #[inline]
    pub fn upper_34(&self) -> HmdMatrix34 {
        HmdMatrix34 {
            m: [self.m[0], self.m[1], self.m[2]],
        }
    }
}

/// Flips between the runtime's right-handed basis and the host's left-handed
/// one by negating the z column and the z row (their shared term cancels out).
/// The operation is its own inverse.
pub fn flip_handedness_34(m: &HmdMatrix34) -> HmdMatrix34 {
    let m = &m.m;
    HmdMatrix34 {
        m: [[m[0][0], m[0][1], -m[0][2], m[0][3]],
            [m[1][0], m[1][1], -m[1][2], m[1][3]],
            [-m[2][0], -m[2][1], m[2][2], -m[2][3]]],
    }
}

/// 4x4 counterpart of [`flip_handedness_34`]; the bottom row's z term is negated too.
pub fn flip_handedness_44(m: &HmdMatrix44) -> HmdMatrix44 {
    let upper = flip_handedness_34(&m.upper_34());
    let last = m.m[3];
    HmdMatrix44 {
        m: [upper.m[0], upper.m[1], upper.m[2], [last[0], last[1], -last[2], last[3]]],
    }
}
