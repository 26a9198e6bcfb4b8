/// Homogeneous pose construction and composition helpers
use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, Unit, Vector3};

/// A 4x4 homogeneous rigid transform.
///
/// The upper-left 3x3 block is always a proper rotation (orthonormal,
/// determinant +1) for poses produced by this crate.
pub type Pose = Matrix4<f64>;

/// Squared sine below which a downward direction counts as exactly -Z.
const ANTIPARALLEL_SIN_SQUARED: f64 = 1e-24;

/// One of the three principal axes of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalAxis {
    X,
    Y,
    Z,
}

impl CanonicalAxis {
    /// Pick the principal axis a declared joint axis is dominated by.
    ///
    /// Components are tested Z first, then Y, then X; the first whose
    /// magnitude exceeds 0.5 wins. The sign of the component is ignored.
    pub fn dominant(axis: &Vector3<f64>) -> Option<Self> {
        if axis.z.abs() > 0.5 {
            Some(Self::Z)
        } else if axis.y.abs() > 0.5 {
            Some(Self::Y)
        } else if axis.x.abs() > 0.5 {
            Some(Self::X)
        } else {
            None
        }
    }

    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Self::X => Vector3::x_axis(),
            Self::Y => Vector3::y_axis(),
            Self::Z => Vector3::z_axis(),
        }
    }
}

/// Transform builder for homogeneous poses
pub struct Transform;

impl Transform {
    /// Rotation from roll, pitch, yaw: `Rz(yaw) * Ry(pitch) * Rx(roll)`
    pub fn rpy_matrix(roll: f64, pitch: f64, yaw: f64) -> Pose {
        let rx = Rotation3::from_axis_angle(&Vector3::x_axis(), roll);
        let ry = Rotation3::from_axis_angle(&Vector3::y_axis(), pitch);
        let rz = Rotation3::from_axis_angle(&Vector3::z_axis(), yaw);

        (rz * ry * rx).to_homogeneous()
    }

    pub fn translation_matrix(x: f64, y: f64, z: f64) -> Pose {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Static pose of a URDF `<origin xyz=".." rpy="..">`
    pub fn origin_matrix(xyz: &Vector3<f64>, rpy: &Vector3<f64>) -> Pose {
        Self::translation_matrix(xyz.x, xyz.y, xyz.z) * Self::rpy_matrix(rpy.x, rpy.y, rpy.z)
    }

    /// Rotation about a single principal axis
    pub fn canonical_rotation(axis: CanonicalAxis, angle: f64) -> Pose {
        Rotation3::from_axis_angle(&axis.unit(), angle).to_homogeneous()
    }

    /// Rotation about an arbitrary axis; identity for a zero axis
    pub fn axis_angle_rotation(axis: &Vector3<f64>, angle: f64) -> Pose {
        match Unit::try_new(*axis, f64::EPSILON) {
            Some(unit) => Rotation3::from_axis_angle(&unit, angle).to_homogeneous(),
            None => Matrix4::identity(),
        }
    }

    /// Minimal rotation taking +Z onto `direction` (Rodrigues' formula).
    ///
    /// A direction pointing straight down is handled as a half turn about X,
    /// since the cross product with +Z vanishes there.
    pub fn align_z(direction: &Unit<Vector3<f64>>) -> Matrix3<f64> {
        let z = Vector3::z();
        let direction = direction.into_inner();
        let cos = z.dot(&direction);
        let v = z.cross(&direction);
        let sin_squared = v.norm_squared();

        if cos < 0.0 && sin_squared < ANTIPARALLEL_SIN_SQUARED {
            return Matrix3::from_diagonal(&Vector3::new(1.0, -1.0, -1.0));
        }

        // 1 / (1 + cos) == (1 - cos) / sin², which stays accurate near -Z
        let scale = if cos >= 0.0 {
            1.0 / (1.0 + cos)
        } else {
            (1.0 - cos) / sin_squared
        };
        let skew = v.cross_matrix();
        Matrix3::identity() + skew + skew * skew * scale
    }

    /// Pose with the given rotation block placed at `position`
    pub fn from_parts(rotation: &Matrix3<f64>, position: &Point3<f64>) -> Pose {
        let mut pose = rotation.to_homogeneous();
        pose.fixed_view_mut::<3, 1>(0, 3).copy_from(&position.coords);
        pose
    }

    /// Translation component of a pose as a point
    pub fn position(pose: &Pose) -> Point3<f64> {
        Point3::new(pose[(0, 3)], pose[(1, 3)], pose[(2, 3)])
    }

    /// Whether the rotation block is orthonormal with determinant +1
    pub fn is_rigid(pose: &Pose, epsilon: f64) -> bool {
        let rotation = pose.fixed_view::<3, 3>(0, 0).into_owned();
        let gram = rotation.transpose() * rotation;
        (gram - Matrix3::identity()).norm() < epsilon
            && (rotation.determinant() - 1.0).abs() < epsilon
    }
}
