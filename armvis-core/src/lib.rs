//! armvis core library - robot description, kinematics and scene geometry
//!
//! This library holds the stateless pieces shared by every front-end:
//! URDF loading, forward kinematics, shape tessellation and scene assembly.
//! Nothing here draws; front-ends consume the [`RenderPrimitive`] list
//! returned by [`evaluate`].

pub mod error;
pub mod geometry;
pub mod kinematics;
pub mod loader;
pub mod model;
pub mod scene;
pub mod tessellate;
pub mod transform;

// Re-export commonly used types
pub use error::{EvalError, ParseError};
pub use geometry::{Color, PrimitiveKind, RenderPrimitive};
pub use kinematics::{compute_transforms, compute_transforms_with, joint_positions, AxisConvention};
pub use loader::{load, parse_str};
pub use model::{
    JointKind, JointLimits, JointSpec, KinematicModel, LinkSpec, Origin, Visual, VisualGeometry,
};
pub use scene::{evaluate, evaluate_with, RenderMode, SceneConfig};
pub use transform::{CanonicalAxis, Pose, Transform};
