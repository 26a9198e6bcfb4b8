//! Procedural tessellation of primitive shapes.
//!
//! Every builder is a pure function: it generates a fixed local-frame
//! template, moves it by the placement pose, and returns a fresh
//! [`RenderPrimitive`]. Vertex layouts are stable so index buffers can be
//! reasoned about by callers:
//!
//! - cylinder: bottom ring `0..20` (z = 0), top ring `20..40`
//!   (z = length), bottom center `40`, top center `41`
//! - box: bottom face `0..4` (z = 0), top face `4..8` (z = size.z)
//!
//! All triangles wind counter-clockwise when seen from outside.

use std::f64::consts::TAU;

use nalgebra::{Matrix4, Point3, Unit, Vector3};

use crate::geometry::{Color, RenderPrimitive};
use crate::model::VisualGeometry;
use crate::transform::{Pose, Transform};

/// Angular resolution of every cylinder.
pub const CYLINDER_SEGMENTS: usize = 20;

/// Connectors shorter than this are not emitted.
pub const DEGENERATE_SEGMENT_LENGTH: f64 = 1e-6;

/// Triangle faces of the box template, two per side.
const BOX_TRIANGLES: [[u32; 3]; 12] = [
    // bottom (-z)
    [0, 2, 1],
    [0, 3, 2],
    // top (+z)
    [4, 5, 6],
    [4, 6, 7],
    // front (-y)
    [0, 1, 5],
    [0, 5, 4],
    // back (+y)
    [2, 3, 7],
    [2, 7, 6],
    // right (+x)
    [1, 2, 6],
    [1, 6, 5],
    // left (-x)
    [3, 0, 4],
    [3, 4, 7],
];

/// Local-frame cylinder along +Z from `z = 0` to `z = length`.
pub fn cylinder_template(radius: f64, length: f64) -> (Vec<Point3<f64>>, Vec<[u32; 3]>) {
    let n = CYLINDER_SEGMENTS;
    let mut vertices = Vec::with_capacity(2 * n + 2);

    for z in [0.0, length] {
        for k in 0..n {
            let theta = TAU * k as f64 / n as f64;
            vertices.push(Point3::new(radius * theta.cos(), radius * theta.sin(), z));
        }
    }
    vertices.push(Point3::new(0.0, 0.0, 0.0));
    vertices.push(Point3::new(0.0, 0.0, length));

    let n = n as u32;
    let bottom_center = 2 * n;
    let top_center = 2 * n + 1;
    let mut triangles = Vec::with_capacity(4 * n as usize);

    for s in 0..n {
        let next = (s + 1) % n;
        // side quad split in two
        triangles.push([s, next, s + n]);
        triangles.push([next, next + n, s + n]);
    }
    for s in 0..n {
        let next = (s + 1) % n;
        triangles.push([bottom_center, next, s]);
        triangles.push([top_center, s + n, next + n]);
    }

    (vertices, triangles)
}

/// Local-frame cuboid resting on `z = 0`, centered in x and y.
pub fn box_template(size: &Vector3<f64>) -> (Vec<Point3<f64>>, Vec<[u32; 3]>) {
    let (hx, hy, h) = (size.x / 2.0, size.y / 2.0, size.z);
    let vertices = vec![
        Point3::new(-hx, -hy, 0.0),
        Point3::new(hx, -hy, 0.0),
        Point3::new(hx, hy, 0.0),
        Point3::new(-hx, hy, 0.0),
        Point3::new(-hx, -hy, h),
        Point3::new(hx, -hy, h),
        Point3::new(hx, hy, h),
        Point3::new(-hx, hy, h),
    ];

    (vertices, BOX_TRIANGLES.to_vec())
}

/// Closed 20-sided cylinder placed by `pose`.
pub fn cylinder(radius: f64, length: f64, pose: &Pose, color: Color) -> RenderPrimitive {
    let (vertices, triangles) = cylinder_template(radius, length);
    RenderPrimitive::placed(&vertices, &triangles, pose, color)
}

/// Cuboid placed by `pose`; its base sits on the pose's XY plane.
pub fn cuboid(size: &Vector3<f64>, pose: &Pose, color: Color) -> RenderPrimitive {
    let (vertices, triangles) = box_template(size);
    RenderPrimitive::placed(&vertices, &triangles, pose, color)
}

/// Cylinder spanning `start` to `end`.
///
/// Returns `None` when the endpoints are strictly closer than
/// [`DEGENERATE_SEGMENT_LENGTH`].
pub fn link_connector(
    start: &Point3<f64>,
    end: &Point3<f64>,
    radius: f64,
    color: Color,
) -> Option<RenderPrimitive> {
    let offset = end - start;
    let length = offset.norm();
    if length < DEGENERATE_SEGMENT_LENGTH {
        return None;
    }
    let direction = Unit::new_unchecked(offset / length);
    let pose = Transform::from_parts(&Transform::align_z(&direction), start);

    Some(cylinder(radius, length, &pose, color))
}

/// Axis-aligned cube of edge `size` centered on `position`.
pub fn joint_marker(position: &Point3<f64>, size: f64, color: Color) -> RenderPrimitive {
    let corner = Vector3::new(position.x, position.y, position.z - size / 2.0);
    let pose = Matrix4::new_translation(&corner);
    cuboid(&Vector3::repeat(size), &pose, color)
}

/// Tessellate a link visual; meshes become a placeholder cube of edge
/// `placeholder_size`.
pub fn visual(
    geometry: &VisualGeometry,
    pose: &Pose,
    color: Color,
    placeholder_size: f64,
) -> RenderPrimitive {
    match geometry {
        VisualGeometry::Cylinder { radius, length } => cylinder(*radius, *length, pose, color),
        VisualGeometry::Box { size } => cuboid(size, pose, color),
        VisualGeometry::Mesh { .. } => cuboid(&Vector3::repeat(placeholder_size), pose, color),
    }
}
