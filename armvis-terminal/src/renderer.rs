/// ASCII rasterizer for render primitives
use armvis_core::{PrimitiveKind, RenderPrimitive};
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point3, Vector3};
use std::io::Write;

use crate::camera::OrbitCamera;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Brightness floor so faces turned away from the light stay visible.
const AMBIENT: f32 = 0.15;

const POLYLINE_CHAR: char = 'o';

/// ASCII renderer that converts render primitives to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Character at a cell, mainly for inspection
    pub fn cell(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Number of cells holding something other than blank space
    pub fn covered_cells(&self) -> usize {
        self.char_buffer.iter().filter(|&&c| c != ' ').count()
    }

    /// Draw a whole scene: meshes first, then polylines on top of them.
    pub fn render_scene(&mut self, primitives: &[RenderPrimitive], camera: &OrbitCamera) {
        for primitive in primitives.iter().filter(|p| p.kind == PrimitiveKind::Mesh) {
            self.render_mesh(primitive, camera);
        }
        for primitive in primitives.iter().filter(|p| p.kind == PrimitiveKind::Polyline) {
            self.render_polyline(primitive, camera);
        }
    }

    pub fn render_mesh(&mut self, primitive: &RenderPrimitive, camera: &OrbitCamera) {
        let color = terminal_color(primitive);
        let light_dir = camera.eye_direction();

        for corners in primitive.triangle_corners() {
            let normal = RenderPrimitive::face_normal(&corners).cast::<f32>();
            if !normal.iter().all(|c| c.is_finite()) {
                continue;
            }
            self.render_triangle(&corners, &normal, &light_dir, color, camera);
        }
    }

    fn render_triangle(
        &mut self,
        corners: &[Point3<f64>; 3],
        normal: &Vector3<f32>,
        light_dir: &Vector3<f32>,
        color: Color,
        camera: &OrbitCamera,
    ) {
        let (width, height) = (self.width as u32, self.height as u32);

        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, corner) in screen_coords.iter_mut().zip(corners) {
            match camera.project_to_screen(&corner.cast::<f32>(), width, height) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        let diffuse = normal.dot(light_dir).max(0.0);
        let brightness = AMBIENT + (1.0 - AMBIENT) * diffuse;

        // Map brightness to character, never the blank one
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
        let char_index = char_index.clamp(1, LUMINOSITY_RAMP.len() - 1);
        let character = LUMINOSITY_RAMP[char_index];

        self.rasterize_triangle(&screen_coords, character, color);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box
        let min_x = v0.0.min(v1.0).min(v2.0).floor() as i32;
        let max_x = v0.0.max(v1.0).max(v2.0).ceil() as i32;
        let min_y = v0.1.min(v1.1).min(v2.1).floor() as i32;
        let max_y = v0.1.max(v1.1).max(v2.1).ceil() as i32;

        // Clip to screen bounds
        let min_x = min_x.max(0);
        let max_x = max_x.min(self.width as i32 - 1);
        let min_y = min_y.max(0);
        let max_y = max_y.min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                if let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                        self.plot(x as usize, y as usize, depth, character, color);
                    }
                }
            }
        }
    }

    /// Polylines are drawn over meshes regardless of depth.
    pub fn render_polyline(&mut self, primitive: &RenderPrimitive, camera: &OrbitCamera) {
        let color = terminal_color(primitive);
        let (width, height) = (self.width as u32, self.height as u32);
        let projected: Vec<Option<(f32, f32, f32)>> = primitive
            .vertices
            .iter()
            .map(|p| camera.project_to_screen(&p.cast::<f32>(), width, height))
            .collect();

        for pair in projected.windows(2) {
            if let (Some(a), Some(b)) = (pair[0], pair[1]) {
                self.draw_segment(a, b, color);
            }
        }
        for (x, y, _) in projected.into_iter().flatten() {
            self.overwrite(x as i32, y as i32, POLYLINE_CHAR, color);
        }
    }

    fn draw_segment(&mut self, a: (f32, f32, f32), b: (f32, f32, f32), color: Color) {
        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as i32;
        for step in 0..=steps {
            let t = step as f32 / steps as f32;
            let x = a.0 + (b.0 - a.0) * t;
            let y = a.1 + (b.1 - a.1) * t;
            self.overwrite(x as i32, y as i32, '.', color);
        }
    }

    fn plot(&mut self, x: usize, y: usize, depth: f32, character: char, color: Color) {
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    fn overwrite(&mut self, x: i32, y: i32, character: char, color: Color) {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return;
        }
        let idx = y as usize * self.width + x as usize;
        self.char_buffer[idx] = character;
        self.color_buffer[idx] = color;
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            let mut current = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
            if y + 1 < self.height {
                writer.queue(Print("\r\n"))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn terminal_color(primitive: &RenderPrimitive) -> Color {
    let c = primitive.color;
    Color::Rgb { r: c.r, g: c.g, b: c.b }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use armvis_core::{tessellate, Color as RgbColor};
    use nalgebra::Matrix4;

    const RED: RgbColor = RgbColor::rgb(255, 0, 0);

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let w = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).expect("valid");
        assert!(w.0 > 0.0 && w.1 > 0.0 && w.2 > 0.0);
        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (0.5, 0.5)).is_none());
    }

    #[test]
    fn test_mesh_covers_cells_with_its_color() {
        let camera = OrbitCamera::new(80, 40);
        let mut renderer = AsciiRenderer::new(80, 40);
        let cube = tessellate::joint_marker(&Point3::new(0.0, 0.0, 0.3), 0.2, RED);
        renderer.render_mesh(&cube, &camera);

        assert!(renderer.covered_cells() > 0);
        assert_eq!(renderer.cell(40, 20).map(|c| c != ' '), Some(true));
        assert_eq!(renderer.color_buffer[20 * 80 + 40], Color::Rgb { r: 255, g: 0, b: 0 });

        renderer.clear();
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_polyline_draws_over_mesh() {
        let camera = OrbitCamera::new(80, 40);
        let mut renderer = AsciiRenderer::new(80, 40);
        let cube = tessellate::cuboid(
            &nalgebra::Vector3::new(0.3, 0.3, 0.3),
            &Matrix4::new_translation(&nalgebra::Vector3::new(0.0, 0.0, 0.15)),
            RED,
        );
        let tip = Point3::new(0.05, 0.0, 0.31);
        let line = RenderPrimitive::polyline(
            vec![Point3::new(0.0, 0.0, 0.3), tip],
            RgbColor::rgb(255, 255, 255),
        );
        renderer.render_scene(&[line, cube], &camera);

        let (x, y, _) = camera.project_to_screen(&tip.cast::<f32>(), 80, 40).expect("in view");
        assert_eq!(renderer.cell(x as usize, y as usize), Some(POLYLINE_CHAR));
        let white = Color::Rgb { r: 255, g: 255, b: 255 };
        assert_eq!(renderer.color_buffer[y as usize * 80 + x as usize], white);
    }

    #[test]
    fn test_off_screen_geometry_is_ignored() {
        let camera = OrbitCamera::new(80, 40);
        let mut renderer = AsciiRenderer::new(80, 40);
        let far_away = tessellate::joint_marker(&Point3::new(100.0, 100.0, 100.0), 0.1, RED);
        renderer.render_mesh(&far_away, &camera);
        assert_eq!(renderer.covered_cells(), 0);
    }

    #[test]
    fn test_draw_writes_every_cell() {
        let renderer = AsciiRenderer::new(4, 2);
        let mut out = Vec::new();
        renderer.draw(&mut out).expect("draw to memory");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.matches(' ').count(), 8);
    }
}
