//! Forward kinematics over a [`KinematicModel`].
//!
//! Poses are composed down the chain in document order. Each joint
//! contributes its static origin followed by a rotation for the supplied
//! angle; angles are used as given and never clamped to the joint limits.

use nalgebra::{Matrix4, Point3};

use crate::error::EvalError;
use crate::model::{JointSpec, KinematicModel};
use crate::transform::{CanonicalAxis, Pose, Transform};

/// How a joint's declared axis is turned into a rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisConvention {
    /// Rotate about whichever principal axis dominates the declared one
    /// (see [`CanonicalAxis::dominant`]); identity when none does.
    #[default]
    Canonical,
    /// Rotate about the normalized declared axis.
    General,
}

/// World pose of every joint frame, one per joint, in joint order.
///
/// Pose `i` places `links[i + 1]`; the base link sits at identity and has
/// no entry.
///
/// # Errors
///
/// Returns [`EvalError::AngleCount`] if `angles` does not hold exactly one
/// value per joint.
pub fn compute_transforms(model: &KinematicModel, angles: &[f64]) -> Result<Vec<Pose>, EvalError> {
    compute_transforms_with(model, angles, AxisConvention::Canonical)
}

/// [`compute_transforms`] with an explicit axis convention.
///
/// # Errors
///
/// Same as [`compute_transforms`].
pub fn compute_transforms_with(
    model: &KinematicModel,
    angles: &[f64],
    convention: AxisConvention,
) -> Result<Vec<Pose>, EvalError> {
    let joints = model.joints();
    if angles.len() != joints.len() {
        return Err(EvalError::AngleCount {
            expected: joints.len(),
            actual: angles.len(),
        });
    }

    let mut cumulative = Matrix4::identity();
    let mut poses = Vec::with_capacity(joints.len());

    for (joint, &angle) in joints.iter().zip(angles) {
        cumulative = cumulative * joint.origin.pose() * joint_rotation(joint, angle, convention);
        poses.push(cumulative);
    }

    Ok(poses)
}

/// Rotation contributed by a joint at `angle`.
///
/// Applied regardless of the declared joint kind.
pub fn joint_rotation(joint: &JointSpec, angle: f64, convention: AxisConvention) -> Pose {
    match convention {
        AxisConvention::Canonical => match CanonicalAxis::dominant(&joint.axis) {
            Some(axis) => Transform::canonical_rotation(axis, angle),
            None => Matrix4::identity(),
        },
        AxisConvention::General => Transform::axis_angle_rotation(&joint.axis, angle),
    }
}

/// Base origin followed by the translation of every pose.
pub fn joint_positions(poses: &[Pose]) -> Vec<Point3<f64>> {
    std::iter::once(Point3::origin())
        .chain(poses.iter().map(Transform::position))
        .collect()
}
