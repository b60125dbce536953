// Eye index as the VR runtime numbers them (EVREye).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub enum VREye {
    Left = 0,
    Right = 1,
}

impl VREye {
    pub const BOTH: [VREye; 2] = [VREye::Left, VREye::Right];

    #[inline]
    pub fn index(&self) -> usize {
        *self as usize
    }
}
