//! Immutable kinematic model of a serial manipulator.
//!
//! A [`KinematicModel`] keeps joints and links in document order. The
//! index-alignment convention is: `links[0]` is the fixed base, and
//! `joints[i]` produces the pose that places `links[i + 1]`. Parent and
//! child names are recorded but never cross-checked against the link list.

use std::f64::consts::PI;

use nalgebra::Vector3;

use crate::transform::{Pose, Transform};

/// Local placement of a joint or visual relative to its parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Origin {
    /// Translation in meters.
    pub xyz: Vector3<f64>,
    /// Roll, pitch, yaw in radians.
    pub rpy: Vector3<f64>,
}

impl Origin {
    pub fn new(xyz: Vector3<f64>, rpy: Vector3<f64>) -> Self {
        Self { xyz, rpy }
    }

    pub fn identity() -> Self {
        Self {
            xyz: Vector3::zeros(),
            rpy: Vector3::zeros(),
        }
    }

    pub fn pose(&self) -> Pose {
        Transform::origin_matrix(&self.xyz, &self.rpy)
    }
}

impl Default for Origin {
    fn default() -> Self {
        Self::identity()
    }
}

/// Joint type as declared in the description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JointKind {
    Revolute,
    Fixed,
    /// Any other declared type (`continuous`, `prismatic`, ...), kept verbatim.
    Other(String),
}

impl JointKind {
    pub fn from_type_str(s: &str) -> Self {
        match s {
            "revolute" => Self::Revolute,
            "fixed" => Self::Fixed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Revolute => "revolute",
            Self::Fixed => "fixed",
            Self::Other(s) => s,
        }
    }
}

/// Angle limits of a joint in radians.
///
/// The engine never clamps to these; front-ends do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointLimits {
    pub lower: f64,
    pub upper: f64,
}

impl JointLimits {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    pub fn clamp(&self, angle: f64) -> f64 {
        angle.max(self.lower).min(self.upper)
    }

    pub fn center(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    pub fn span(&self) -> f64 {
        self.upper - self.lower
    }
}

impl Default for JointLimits {
    fn default() -> Self {
        Self {
            lower: -PI,
            upper: PI,
        }
    }
}

/// A joint connecting two links.
#[derive(Debug, Clone, PartialEq)]
pub struct JointSpec {
    pub name: String,
    pub kind: JointKind,
    pub parent: String,
    pub child: String,
    pub origin: Origin,
    /// Rotation axis as declared; not normalized.
    pub axis: Vector3<f64>,
    pub limits: JointLimits,
}

impl JointSpec {
    /// Create a joint with identity origin, +Z axis and ±π limits.
    pub fn new(
        name: impl Into<String>,
        kind: JointKind,
        parent: impl Into<String>,
        child: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: parent.into(),
            child: child.into(),
            origin: Origin::identity(),
            axis: Vector3::z(),
            limits: JointLimits::default(),
        }
    }

    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_axis(mut self, axis: Vector3<f64>) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_limits(mut self, limits: JointLimits) -> Self {
        self.limits = limits;
        self
    }
}

/// Primitive shape of a link visual.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualGeometry {
    Cylinder { radius: f64, length: f64 },
    Box { size: Vector3<f64> },
    /// External mesh; rendered as a small placeholder box.
    Mesh { filename: String },
}

/// Visual of a link: a shape and its placement in the link frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    pub geometry: VisualGeometry,
    pub origin: Origin,
}

/// A rigid link of the arm.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkSpec {
    pub name: String,
    pub visual: Option<Visual>,
}

impl LinkSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visual: None,
        }
    }

    pub fn with_visual(mut self, geometry: VisualGeometry, origin: Origin) -> Self {
        self.visual = Some(Visual { geometry, origin });
        self
    }
}

/// Ordered joints and links of a serial manipulator.
///
/// Built once by the loader (or [`KinematicModel::new`]) and read-only
/// afterwards, so a single model can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct KinematicModel {
    name: Option<String>,
    joints: Vec<JointSpec>,
    links: Vec<LinkSpec>,
}

impl KinematicModel {
    pub fn new(name: Option<String>, joints: Vec<JointSpec>, links: Vec<LinkSpec>) -> Self {
        Self {
            name,
            joints,
            links,
        }
    }

    /// Robot name from the `<robot name="..">` attribute, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn joints(&self) -> &[JointSpec] {
        &self.joints
    }

    pub fn links(&self) -> &[LinkSpec] {
        &self.links
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn joint(&self, name: &str) -> Option<&JointSpec> {
        self.joints.iter().find(|j| j.name == name)
    }

    pub fn link(&self, name: &str) -> Option<&LinkSpec> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Angle vector with every joint at zero.
    pub fn home(&self) -> Vec<f64> {
        vec![0.0; self.joints.len()]
    }
}
