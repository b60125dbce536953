use crate::vr_matrix::{flip_handedness_34, flip_handedness_44, HmdMatrix34, HmdMatrix44};
use euclid::{Angle, RigidTransform3D, Rotation3D, UnknownUnit, Vector3D};
use std::ops::Mul;

pub type PoseRotation = Rotation3D<f32, UnknownUnit, UnknownUnit>;
pub type PoseTransform = RigidTransform3D<f32, UnknownUnit, UnknownUnit>;
pub type PoseVector = Vector3D<f32, UnknownUnit>;

/// Rigid transform of a tracked device or eye, in host (left-handed) space.
///
/// `orientation` is an `(x, y, z, w)` unit quaternion. The math goes through
/// euclid's `RigidTransform3D`; the plain arrays are what crosses the host
/// and runtime boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialization", derive(Deserialize, Serialize))]
pub struct VRPose {
    pub position: [f32; 3],
    pub orientation: [f32; 4],
}

impl Default for VRPose {
    fn default() -> VRPose {
        VRPose::IDENTITY
    }
}

/// Unit rotation for an `(x, y, z, w)` quaternion. A zero quaternion maps to
/// the identity.
pub fn rotation_from_quat(q: &[f32; 4]) -> PoseRotation {
    let [x, y, z, w] = *q;
    if x * x + y * y + z * z + w * w == 0.0 {
        return Rotation3D::identity();
    }
    Rotation3D::quaternion(x, y, z, w).normalize()
}

pub fn quat_from_rotation(rotation: &PoseRotation) -> [f32; 4] {
    [rotation.i, rotation.j, rotation.k, rotation.r]
}

// Rotation of `angle` radians about the host's up (Y) axis.
pub fn yaw_rotation(angle: f32) -> [f32; 4] {
    quat_from_rotation(&Rotation3D::around_y(Angle::radians(angle)))
}

#[inline]
pub fn to_vector(v: &[f32; 3]) -> PoseVector {
    Vector3D::new(v[0], v[1], v[2])
}

#[inline]
pub fn from_vector(v: &PoseVector) -> [f32; 3] {
    [v.x, v.y, v.z]
}

// Row-major rotation matrix (m[row][col]) to a unit rotation. The largest
// component comes from the trace or the largest diagonal term, the others from
// the off-diagonal terms (the antisymmetric ones carry the sign of w), so half
// turns stay well conditioned. Negative radicands from float noise clamp to zero.
fn rotation_from_matrix(m: &[[f32; 3]; 3]) -> PoseRotation {
    let trace = m[0][0] + m[1][1] + m[2][2];

    let q = if trace > 0.0 {
        let s = f32::max(0.0, trace + 1.0).sqrt() * 2.0;
        [(m[2][1] - m[1][2]) / s,
         (m[0][2] - m[2][0]) / s,
         (m[1][0] - m[0][1]) / s,
         0.25 * s]
    } else if m[0][0] > m[1][1] && m[0][0] > m[2][2] {
        let s = f32::max(1e-12, 1.0 + m[0][0] - m[1][1] - m[2][2]).sqrt() * 2.0;
        [0.25 * s,
         (m[0][1] + m[1][0]) / s,
         (m[0][2] + m[2][0]) / s,
         (m[2][1] - m[1][2]) / s]
    } else if m[1][1] > m[2][2] {
        let s = f32::max(1e-12, 1.0 + m[1][1] - m[0][0] - m[2][2]).sqrt() * 2.0;
        [(m[0][1] + m[1][0]) / s,
         0.25 * s,
         (m[1][2] + m[2][1]) / s,
         (m[0][2] - m[2][0]) / s]
    } else {
        let s = f32::max(1e-12, 1.0 + m[2][2] - m[0][0] - m[1][1]).sqrt() * 2.0;
        [(m[0][2] + m[2][0]) / s,
         (m[1][2] + m[2][1]) / s,
         0.25 * s,
         (m[1][0] - m[0][1]) / s]
    };

    rotation_from_quat(&q)
}

impl VRPose {
    pub const IDENTITY: VRPose = VRPose {
        position: [0.0, 0.0, 0.0],
        orientation: [0.0, 0.0, 0.0, 1.0],
    };

    pub fn new(position: [f32; 3], orientation: [f32; 4]) -> VRPose {
        VRPose {
            position: position,
            orientation: quat_from_rotation(&rotation_from_quat(&orientation)),
        }
    }

    pub fn from_rotation(orientation: [f32; 4]) -> VRPose {
        VRPose::new([0.0; 3], orientation)
    }

    pub fn from_rigid(transform: &PoseTransform) -> VRPose {
        VRPose {
            position: from_vector(&transform.translation),
            orientation: quat_from_rotation(&transform.rotation.normalize()),
        }
    }

    pub fn rotation(&self) -> PoseRotation {
        rotation_from_quat(&self.orientation)
    }

    /// Rotation first, then translation.
    pub fn to_rigid(&self) -> PoseTransform {
        RigidTransform3D::new(self.rotation(), to_vector(&self.position))
    }

    /// Converts a runtime device-to-tracking matrix into host space.
    pub fn from_runtime_matrix34(matrix: &HmdMatrix34) -> VRPose {
        VRPose::from_host_matrix34(&flip_handedness_34(matrix))
    }

    /// Same as [`VRPose::from_runtime_matrix34`]; the bottom row carries no pose data.
    pub fn from_runtime_matrix44(matrix: &HmdMatrix44) -> VRPose {
        let host = flip_handedness_44(matrix);
        VRPose::from_host_matrix34(&host.upper_34())
    }

    pub fn to_runtime_matrix34(&self) -> HmdMatrix34 {
        flip_handedness_34(&self.to_host_matrix34())
    }

    pub fn to_runtime_matrix44(&self) -> HmdMatrix44 {
        let host = self.to_host_matrix34();
        flip_handedness_44(&HmdMatrix44 {
            m: [host.m[0], host.m[1], host.m[2], [0.0, 0.0, 0.0, 1.0]],
        })
    }

    /// Applies `other` in this pose's frame (parent * child).
    pub fn compose(&self, other: &VRPose) -> VRPose {
        VRPose::from_rigid(&other.to_rigid().then(&self.to_rigid()))
    }

    pub fn inverse(&self) -> VRPose {
        VRPose::from_rigid(&self.to_rigid().inverse())
    }

    /// Linear interpolation of the position, shortest-arc slerp of the orientation.
    pub fn interpolate(a: &VRPose, b: &VRPose, t: f32) -> VRPose {
        let from = a.rotation();
        let mut to = b.rotation();
        if from.i * to.i + from.j * to.j + from.k * to.k + from.r * to.r < 0.0 {
            to = Rotation3D::quaternion(-to.i, -to.j, -to.k, -to.r);
        }

        let start = to_vector(&a.position);
        let position = start + (to_vector(&b.position) - start) * t;
        VRPose {
            position: from_vector(&position),
            orientation: quat_from_rotation(&from.slerp(&to, t).normalize()),
        }
    }

    pub fn rotate_vector(&self, vector: &[f32; 3]) -> [f32; 3] {
        from_vector(&self.rotation().transform_vector3d(to_vector(vector)))
    }

    pub fn transform_point(&self, point: &[f32; 3]) -> [f32; 3] {
        from_vector(&(to_vector(&self.position) + to_vector(&self.rotate_vector(point))))
    }

    pub fn with_scaled_position(&self, scale: f32) -> VRPose {
        VRPose {
            position: from_vector(&(to_vector(&self.position) * scale)),
            orientation: self.orientation,
        }
    }

    /// Column-major host TRS matrix with unit scale.
    pub fn to_column_major(&self) -> [f32; 16] {
        self.to_host_matrix34().to_column_major()
    }

    fn from_host_matrix34(host: &HmdMatrix34) -> VRPose {
        VRPose {
            position: host.translation(),
            orientation: quat_from_rotation(&rotation_from_matrix(&host.rotation())),
        }
    }

    fn to_host_matrix34(&self) -> HmdMatrix34 {
        // Columns are the rotated basis vectors.
        let x = self.rotate_vector(&[1.0, 0.0, 0.0]);
        let y = self.rotate_vector(&[0.0, 1.0, 0.0]);
        let z = self.rotate_vector(&[0.0, 0.0, 1.0]);
        let p = &self.position;
        HmdMatrix34 {
            m: [[x[0], y[0], z[0], p[0]],
                [x[1], y[1], z[1], p[1]],
                [x[2], y[2], z[2], p[2]]],
        }
    }
}

impl Mul for VRPose {
    type Output = VRPose;

    fn mul(self, rhs: VRPose) -> VRPose {
        self.compose(&rhs)
    }
}
