/// Render primitives handed to front-ends
use nalgebra::{Point3, Vector3};

use crate::transform::Pose;

/// An sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb`
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// How a primitive's vertex buffer is meant to be drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    /// Indexed triangles.
    Mesh,
    /// Points joined in order; the index buffer is empty.
    Polyline,
}

/// A renderable payload: world-space vertices, triangle indices, color and
/// opacity. Produced fresh on every evaluation and never cached.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPrimitive {
    pub kind: PrimitiveKind,
    /// Human-readable tag such as `link:upper_arm_link` or `marker:3`.
    pub label: String,
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<[u32; 3]>,
    pub color: Color,
    pub opacity: f32,
}

impl RenderPrimitive {
    pub fn mesh(vertices: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>, color: Color) -> Self {
        Self {
            kind: PrimitiveKind::Mesh,
            label: String::new(),
            vertices,
            triangles,
            color,
            opacity: 1.0,
        }
    }

    pub fn polyline(points: Vec<Point3<f64>>, color: Color) -> Self {
        Self {
            kind: PrimitiveKind::Polyline,
            label: String::new(),
            vertices: points,
            triangles: Vec::new(),
            color,
            opacity: 1.0,
        }
    }

    /// Build a mesh from a local-frame template, moving every vertex by `pose`
    pub fn placed(
        local: &[Point3<f64>],
        triangles: &[[u32; 3]],
        pose: &Pose,
        color: Color,
    ) -> Self {
        let vertices = local.iter().map(|p| pose.transform_point(p)).collect();
        Self::mesh(vertices, triangles.to_vec(), color)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Corner positions of every triangle
    pub fn triangle_corners(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.triangles.iter().map(|&[a, b, c]| {
            [
                self.vertices[a as usize],
                self.vertices[b as usize],
                self.vertices[c as usize],
            ]
        })
    }

    /// Calculate the face normal of a triangle from its winding
    pub fn face_normal(corners: &[Point3<f64>; 3]) -> Vector3<f64> {
        let edge1 = corners[1] - corners[0];
        let edge2 = corners[2] - corners[0];

        edge1.cross(&edge2).normalize()
    }

    /// Vertex positions as `[x0, y0, z0, x1, ...]` for GPU or JS buffers
    pub fn flat_vertices(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|p| [p.x as f32, p.y as f32, p.z as f32])
            .collect()
    }

    /// Triangle indices as `[i0, i1, i2, ...]`
    pub fn flat_indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }
}
