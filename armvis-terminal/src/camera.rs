/// Z-up orbit camera for terminal rendering
use nalgebra::{Matrix4, Point3, Vector3};

/// Terminal cells are roughly twice as tall as they are wide.
const CELL_ASPECT: f32 = 0.5;

const MIN_PITCH: f32 = -1.5;
const MAX_PITCH: f32 = 1.5;

/// Camera orbiting a fixed target, with +Z as world up
pub struct OrbitCamera {
    pub target: Point3<f32>,
    /// Angle around the Z axis, measured from +X.
    pub yaw: f32,
    /// Elevation above the XY plane.
    pub pitch: f32,
    pub distance: f32,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl OrbitCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            target: Point3::new(0.0, 0.0, 0.3),
            yaw: std::f32::consts::FRAC_PI_4,
            pitch: 0.35,
            distance: 1.6,
            fov: std::f32::consts::PI / 4.0, // 45 degrees
            aspect: width as f32 / height.max(1) as f32 * CELL_ASPECT,
            near: 0.05,
            far: 20.0,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        self.target + Vector3::new(cp * cy, cp * sy, sp) * self.distance
    }

    /// Unit vector from the target towards the eye
    pub fn eye_direction(&self) -> Vector3<f32> {
        (self.position() - self.target).normalize()
    }

    pub fn orbit(&mut self, dyaw: f32, dpitch: f32) {
        self.yaw = (self.yaw + dyaw).rem_euclid(std::f32::consts::TAU);
        self.pitch = (self.pitch + dpitch).clamp(MIN_PITCH, MAX_PITCH);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32 * CELL_ASPECT;
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position(), &self.target, &Vector3::z())
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_perspective(self.aspect, self.fov, self.near, self.far)
    }

    /// Project a world-space point to screen space as `(x, y, depth)`.
    ///
    /// Returns `None` for points outside the view volume.
    pub fn project_to_screen(
        &self,
        point: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection_matrix() * self.view_matrix();
        let ndc = mvp.transform_point(point);

        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }
        if ndc.x < -1.0 || ndc.x > 1.0 || ndc.y < -1.0 || ndc.y > 1.0 {
            return None;
        }

        let screen_x = (ndc.x + 1.0) * 0.5 * width as f32;
        let screen_y = (1.0 - ndc.y) * 0.5 * height as f32;

        Some((screen_x, screen_y, ndc.z))
    }
}
