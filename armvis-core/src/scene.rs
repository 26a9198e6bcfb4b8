//! Scene assembly: model + angles + mode → ordered render primitives.
//!
//! Primitive order is part of the contract, since front-ends identify
//! primitives by position:
//!
//! - [`RenderMode::Detailed`]: the base link visual (if any), then every
//!   other link visual in chain order, then one polyline through the joint
//!   positions.
//! - [`RenderMode::Skeleton`]: one connector per non-degenerate segment in
//!   chain order, then one marker per joint position (base first, end
//!   effector last).

use std::fmt;
use std::str::FromStr;

use nalgebra::Matrix4;

use crate::error::EvalError;
use crate::geometry::{Color, RenderPrimitive};
use crate::kinematics::{compute_transforms, joint_positions};
use crate::model::KinematicModel;
use crate::tessellate;

/// Link palette of the detailed view.
pub const LINK_PALETTE: [Color; 6] = [
    Color::rgb(0x1f, 0x77, 0xb4),
    Color::rgb(0xff, 0x7f, 0x0e),
    Color::rgb(0x2c, 0xa0, 0x2c),
    Color::rgb(0xd6, 0x27, 0x28),
    Color::rgb(0x94, 0x67, 0xbd),
    Color::rgb(0x8c, 0x56, 0x4b),
];

/// Segment palette of the skeleton view.
pub const CONNECTOR_PALETTE: [Color; 6] = [
    Color::rgb(0x34, 0x98, 0xdb),
    Color::rgb(0x2e, 0xcc, 0x71),
    Color::rgb(0xf1, 0xc4, 0x0f),
    Color::rgb(0xe6, 0x7e, 0x22),
    Color::rgb(0x9b, 0x59, 0xb6),
    Color::rgb(0x1a, 0xbc, 0x9c),
];

/// Joint marker palette of the skeleton view.
pub const MARKER_PALETTE: [Color; 7] = [
    Color::rgb(0x2c, 0x3e, 0x50),
    Color::rgb(0xe7, 0x4c, 0x3c),
    Color::rgb(0xe7, 0x4c, 0x3c),
    Color::rgb(0xe7, 0x4c, 0x3c),
    Color::rgb(0xe7, 0x4c, 0x3c),
    Color::rgb(0xe7, 0x4c, 0x3c),
    Color::rgb(0xe7, 0x4c, 0x3c),
];

/// Presentation mode of a scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Connectors between joint positions plus joint markers.
    #[default]
    Skeleton,
    /// Link visuals from the description plus a joint polyline.
    Detailed,
}

impl RenderMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Skeleton => Self::Detailed,
            Self::Detailed => Self::Skeleton,
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skeleton => f.write_str("skeleton"),
            Self::Detailed => f.write_str("detailed"),
        }
    }
}

impl FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skeleton" => Ok(Self::Skeleton),
            "detailed" => Ok(Self::Detailed),
            other => Err(format!("unknown render mode '{other}' (expected skeleton or detailed)")),
        }
    }
}

/// Colors and sizes used when assembling a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    /// Detailed view: the first link after the base takes `link_palette[0]`,
    /// the next `link_palette[1]`, wrapping around.
    pub link_palette: Vec<Color>,
    /// Detailed view: color of the base link.
    pub base_color: Color,
    /// Detailed view: color of the joint polyline.
    pub overlay_color: Color,
    /// Detailed view: opacity of link visuals.
    pub link_opacity: f32,
    /// Detailed view: edge of the cube standing in for mesh visuals.
    pub placeholder_size: f64,
    /// Skeleton view: segment `k` takes `connector_palette[k % len]`.
    pub connector_palette: Vec<Color>,
    /// Skeleton view: joint `k` takes `marker_palette[k % len]`.
    pub marker_palette: Vec<Color>,
    pub connector_radius: f64,
    pub marker_size: f64,
    pub skeleton_opacity: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            link_palette: LINK_PALETTE.to_vec(),
            base_color: Color::rgb(0x80, 0x80, 0x80),
            overlay_color: Color::rgb(0, 0, 0),
            link_opacity: 0.7,
            placeholder_size: 0.05,
            connector_palette: CONNECTOR_PALETTE.to_vec(),
            marker_palette: MARKER_PALETTE.to_vec(),
            connector_radius: 0.015,
            marker_size: 0.03,
            skeleton_opacity: 1.0,
        }
    }
}

fn pick(palette: &[Color], index: usize, fallback: Color) -> Color {
    if palette.is_empty() {
        fallback
    } else {
        palette[index % palette.len()]
    }
}

/// Evaluate the model at `angles` with the default [`SceneConfig`].
///
/// # Errors
///
/// Returns [`EvalError::AngleCount`] if `angles` does not hold one value per
/// joint.
pub fn evaluate(
    model: &KinematicModel,
    angles: &[f64],
    mode: RenderMode,
) -> Result<Vec<RenderPrimitive>, EvalError> {
    evaluate_with(model, angles, mode, &SceneConfig::default())
}

/// Evaluate the model at `angles` with explicit presentation settings.
///
/// # Errors
///
/// Same as [`evaluate`].
pub fn evaluate_with(
    model: &KinematicModel,
    angles: &[f64],
    mode: RenderMode,
    config: &SceneConfig,
) -> Result<Vec<RenderPrimitive>, EvalError> {
    let transforms = compute_transforms(model, angles)?;

    let primitives = match mode {
        RenderMode::Detailed => detailed(model, &transforms, config),
        RenderMode::Skeleton => skeleton(&transforms, config),
    };
    Ok(primitives)
}

fn detailed(
    model: &KinematicModel,
    transforms: &[Matrix4<f64>],
    config: &SceneConfig,
) -> Vec<RenderPrimitive> {
    let mut primitives = Vec::with_capacity(model.links().len() + 1);

    for (i, link) in model.links().iter().enumerate() {
        let Some(visual) = &link.visual else {
            tracing::trace!(link = %link.name, "link has no visual geometry");
            continue;
        };

        let (placement, color) = if i == 0 {
            (Matrix4::identity(), config.base_color)
        } else {
            match transforms.get(i - 1) {
                Some(pose) => (*pose, pick(&config.link_palette, i - 1, config.base_color)),
                None => {
                    tracing::debug!(link = %link.name, "no joint places this link");
                    continue;
                }
            }
        };

        let pose = placement * visual.origin.pose();
        primitives.push(
            tessellate::visual(&visual.geometry, &pose, color, config.placeholder_size)
                .with_label(format!("link:{}", link.name))
                .with_opacity(config.link_opacity),
        );
    }

    primitives.push(
        RenderPrimitive::polyline(joint_positions(transforms), config.overlay_color)
            .with_label("joints"),
    );
    primitives
}

fn skeleton(transforms: &[Matrix4<f64>], config: &SceneConfig) -> Vec<RenderPrimitive> {
    let positions = joint_positions(transforms);
    let mut primitives = Vec::with_capacity(2 * positions.len());

    for (k, pair) in positions.windows(2).enumerate() {
        let color = pick(&config.connector_palette, k, config.base_color);
        match tessellate::link_connector(&pair[0], &pair[1], config.connector_radius, color) {
            Some(connector) => primitives.push(
                connector
                    .with_label(format!("segment:{k}"))
                    .with_opacity(config.skeleton_opacity),
            ),
            None => tracing::debug!(segment = k, "degenerate segment skipped"),
        }
    }

    for (k, position) in positions.iter().enumerate() {
        let color = pick(&config.marker_palette, k, config.base_color);
        primitives.push(
            tessellate::joint_marker(position, config.marker_size, color)
                .with_label(format!("marker:{k}"))
                .with_opacity(config.skeleton_opacity),
        );
    }

    primitives
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PrimitiveKind;
    use crate::loader::parse_str;
    use crate::model::{JointKind, JointSpec, LinkSpec, Origin, VisualGeometry};
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};
    use std::f64::consts::FRAC_PI_2;

    const SIX_AXIS_ARM: &str = include_str!("../../urdf/six_axis_arm.urdf");

    fn arm() -> KinematicModel {
        parse_str(SIX_AXIS_ARM).expect("bundled arm should parse")
    }

    fn labels(primitives: &[RenderPrimitive]) -> Vec<&str> {
        primitives.iter().map(|p| p.label.as_str()).collect()
    }

    #[test]
    fn test_mode_parse_and_display() {
        assert_eq!("skeleton".parse::<RenderMode>(), Ok(RenderMode::Skeleton));
        assert_eq!("detailed".parse::<RenderMode>(), Ok(RenderMode::Detailed));
        assert!("wireframe".parse::<RenderMode>().is_err());
        assert_eq!(RenderMode::Detailed.to_string(), "detailed");
        assert_eq!(RenderMode::Skeleton.toggled(), RenderMode::Detailed);
    }

    #[test]
    fn test_skeleton_order() {
        let model = arm();
        let prims = evaluate(&model, &model.home(), RenderMode::Skeleton).expect("evaluate");
        assert_eq!(prims.len(), 6 + 7);
        assert_eq!(
            labels(&prims),
            [
                "segment:0", "segment:1", "segment:2", "segment:3", "segment:4", "segment:5",
                "marker:0", "marker:1", "marker:2", "marker:3", "marker:4", "marker:5", "marker:6",
            ]
        );
        assert_eq!(prims[0].color, CONNECTOR_PALETTE[0]);
        assert_eq!(prims[6].color, MARKER_PALETTE[0]);
        assert_eq!(prims[12].color, MARKER_PALETTE[6]);
    }

    #[test]
    fn test_skeleton_skips_coincident_joints() {
        let joints = vec![
            JointSpec::new("j0", JointKind::Revolute, "l0", "l1")
                .with_origin(Origin::new(Vector3::new(0.0, 0.0, 0.2), Vector3::zeros())),
            // no offset: joint 1 sits on top of joint 0
            JointSpec::new("j1", JointKind::Revolute, "l1", "l2"),
        ];
        let links = vec![LinkSpec::new("l0"), LinkSpec::new("l1"), LinkSpec::new("l2")];
        let model = KinematicModel::new(None, joints, links);

        let prims = evaluate(&model, &[0.0, 0.0], RenderMode::Skeleton).expect("evaluate");
        assert_eq!(labels(&prims), ["segment:0", "marker:0", "marker:1", "marker:2"]);
        assert!(prims
            .iter()
            .flat_map(|p| &p.vertices)
            .all(|v| v.iter().all(|c| c.is_finite())));
    }

    #[test]
    fn test_detailed_order_and_colors() {
        let model = arm();
        let prims = evaluate(&model, &model.home(), RenderMode::Detailed).expect("evaluate");
        assert_eq!(prims.len(), 7 + 1);
        assert_eq!(prims[0].label, "link:base_link");
        assert_eq!(prims[0].color, SceneConfig::default().base_color);
        assert_eq!(prims[1].label, "link:shoulder_link");
        assert_eq!(prims[1].color, LINK_PALETTE[0]);
        assert_eq!(prims[2].color, LINK_PALETTE[1]);
        assert_eq!(prims[6].label, "link:flange_link");
        assert_eq!(prims[6].color, LINK_PALETTE[5]);
        assert!(prims[..7].iter().all(|p| p.kind == PrimitiveKind::Mesh && p.opacity == 0.7));

        let overlay = &prims[7];
        assert_eq!(overlay.kind, PrimitiveKind::Polyline);
        assert_eq!(overlay.vertex_count(), 7);
        assert_relative_eq!(overlay.vertices[0], Point3::origin());
        assert_relative_eq!(overlay.vertices[6], Point3::new(0.0, 0.0, 0.61), epsilon = 1e-12);
    }

    #[test]
    fn test_detailed_places_links_by_joint_pose() {
        let model = arm();
        let mut angles = model.home();
        angles[1] = FRAC_PI_2;
        let prims = evaluate(&model, &angles, RenderMode::Detailed).expect("evaluate");

        // upper_arm_link is a box hanging off joint2 at z = 0.22; a quarter
        // turn about Y lays its top face along +X.
        let upper_arm = &prims[2];
        assert_eq!(upper_arm.label, "link:upper_arm_link");
        let max_x = upper_arm.vertices.iter().map(|v| v.x).fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(max_x, 0.13, epsilon = 1e-12);
        assert!(upper_arm.vertices.iter().all(|v| (v.z - 0.22).abs() <= 0.03 + 1e-12));
    }

    #[test]
    fn test_detailed_skips_links_without_visual_or_pose() {
        let joints = vec![JointSpec::new("j0", JointKind::Revolute, "l0", "l1")];
        let cyl = VisualGeometry::Cylinder {
            radius: 0.1,
            length: 0.1,
        };
        let links = vec![
            LinkSpec::new("l0"),
            LinkSpec::new("l1").with_visual(cyl.clone(), Origin::identity()),
            // a trailing link no joint places
            LinkSpec::new("l2").with_visual(cyl, Origin::identity()),
        ];
        let model = KinematicModel::new(None, joints, links);

        let prims = evaluate(&model, &[0.0], RenderMode::Detailed).expect("evaluate");
        assert_eq!(labels(&prims), ["link:l1", "joints"]);
    }

    #[test]
    fn test_custom_config() {
        let model = arm();
        let config = SceneConfig {
            connector_palette: vec![Color::rgb(1, 2, 3)],
            marker_palette: Vec::new(),
            skeleton_opacity: 0.25,
            ..SceneConfig::default()
        };
        let prims =
            evaluate_with(&model, &model.home(), RenderMode::Skeleton, &config).expect("evaluate");
        assert!(prims[..6].iter().all(|p| p.color == Color::rgb(1, 2, 3)));
        assert!(prims[6..].iter().all(|p| p.color == config.base_color));
        assert!(prims.iter().all(|p| p.opacity == 0.25));
    }

    #[test]
    fn test_angle_count_checked() {
        let model = arm();
        let err = evaluate(&model, &[0.0; 5], RenderMode::Detailed).expect_err("five angles");
        assert_eq!(err, EvalError::AngleCount { expected: 6, actual: 5 });
    }

    #[test]
    fn test_evaluate_is_bit_identical() {
        let model = arm();
        let angles = [0.3, -1.1, 0.7, -0.4, 1.9, -2.2];
        for mode in [RenderMode::Skeleton, RenderMode::Detailed] {
            let a = evaluate(&model, &angles, mode).expect("a");
            let b = evaluate(&model, &angles, mode).expect("b");
            assert_eq!(a, b);
        }
    }

    #[test]
    fn test_concurrent_evaluation() {
        let model = arm();
        let expected = evaluate(&model, &[0.5; 6], RenderMode::Detailed).expect("serial");

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(|| evaluate(&model, &[0.5; 6], RenderMode::Detailed)))
                .collect();
            for handle in handles {
                let prims = handle.join().expect("thread").expect("evaluate");
                assert_eq!(prims, expected);
            }
        });
    }
}
