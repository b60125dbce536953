// The VRFieldOfView represents the raw projection of one eye, as given by
// the tangents of the half angles from the eye's center point.
// Left and top are usually negative.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRFieldOfView {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl Default for VRFieldOfView {
    fn default() -> VRFieldOfView {
        VRFieldOfView {
            left: -1.0,
            right: 1.0,
            top: -1.0,
            bottom: 1.0,
        }
    }
}

impl VRFieldOfView {
    /// Largest horizontal and vertical half-angle tangents covering both eyes.
    pub fn combined_tangents(left: &VRFieldOfView, right: &VRFieldOfView) -> (f32, f32) {
        let x = (-left.left).max(left.right).max(-right.left).max(right.right);
        let y = (-left.top).max(left.bottom).max(-right.top).max(right.bottom);
        (x, y)
    }

    // Aspect ratio and vertical field of view (degrees) for a mono camera
    // that sees everything either eye sees.
    pub fn combined_aspect_and_fov(left: &VRFieldOfView, right: &VRFieldOfView) -> (f32, f32) {
        let (x, y) = VRFieldOfView::combined_tangents(left, right);
        (x / y, (2.0 * y.atan()).to_degrees())
    }
}
