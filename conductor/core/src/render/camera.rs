//! Perspective orbit camera
//!
//! The eye sits on a circle of fixed horizontal radius at a fixed height and
//! looks at the origin. Auto-rotation advances the azimuth at
//! `speed · 0.0167` rad/s, the per-second equivalent of an orbit control's
//! auto-rotate speed.

use glam::{Mat4, Vec3, Vec4Swizzles};

/// Radians per second per unit of auto-rotate speed
pub const AUTO_ROTATE_RATE: f32 = 0.0167;

/// A point projected into framebuffer pixel space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenPoint {
    /// Horizontal pixel coordinate
    pub x: f32,
    /// Vertical pixel coordinate (0 at the top)
    pub y: f32,
    /// Distance along the view direction (clip-space w)
    pub depth: f32,
}

/// Perspective camera orbiting the scene origin
#[derive(Clone, Debug)]
pub struct Camera {
    fov_y_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    orbit_radius: f32,
    height: f32,
    azimuth: f32,
    target: Vec3,
    auto_rotate: bool,
    auto_rotate_speed: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            fov_y_degrees: 75.0,
            aspect: 1.0,
            near: 0.1,
            far: 2000.0,
            orbit_radius: 55.0,
            height: 40.0,
            azimuth: 0.0,
            target: Vec3::ZERO,
            auto_rotate: true,
            auto_rotate_speed: 0.5,
        }
    }
}

impl Camera {
    /// Create a camera with the default orbit
    #[must_use]
    pub fn new(aspect: f32) -> Self {
        let mut camera = Self::default();
        camera.set_aspect(aspect);
        camera
    }

    /// Override the orbit geometry
    #[must_use]
    pub fn with_orbit(mut self, radius: f32, height: f32) -> Self {
        self.orbit_radius = radius;
        self.height = height;
        self
    }

    /// Aspect ratio (width / height)
    #[must_use]
    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Update the aspect ratio; non-finite or non-positive values are ignored
    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
        }
    }

    /// Vertical field of view in degrees
    #[must_use]
    pub fn fov_y_degrees(&self) -> f32 {
        self.fov_y_degrees
    }

    /// Whether auto-rotation is enabled
    #[must_use]
    pub fn auto_rotate(&self) -> bool {
        self.auto_rotate
    }

    /// Enable or disable auto-rotation
    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    /// Current auto-rotate speed
    #[must_use]
    pub fn auto_rotate_speed(&self) -> f32 {
        self.auto_rotate_speed
    }

    /// Set the auto-rotate speed
    pub fn set_auto_rotate_speed(&mut self, speed: f32) {
        self.auto_rotate_speed = speed;
    }

    /// Current azimuth in radians
    #[must_use]
    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    /// Advance auto-rotation by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        if self.auto_rotate {
            self.azimuth = crate::animation::wrap_phase(
                self.azimuth + self.auto_rotate_speed * AUTO_ROTATE_RATE * dt,
            );
        }
    }

    /// World-space eye position
    #[must_use]
    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.azimuth.sin() * self.orbit_radius,
            self.height,
            self.azimuth.cos() * self.orbit_radius,
        )
    }

    /// Combined projection · view matrix
    #[must_use]
    pub fn view_projection(&self) -> Mat4 {
        let view = Mat4::look_at_rh(self.eye(), self.target, Vec3::Y);
        let projection = Mat4::perspective_rh_gl(
            self.fov_y_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        projection * view
    }

    /// Project a world point into a `width × height` pixel grid
    ///
    /// Returns `None` for points behind the near plane or past the far
    /// plane. Points outside the viewport are still returned so that lines
    /// crossing the edge can be clipped by the rasterizer.
    #[must_use]
    pub fn project(&self, world: Vec3, width: usize, height: usize) -> Option<ScreenPoint> {
        self.project_with(&self.view_projection(), world, width, height)
    }

    /// Project using a precomputed view-projection matrix
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn project_with(
        &self,
        view_projection: &Mat4,
        world: Vec3,
        width: usize,
        height: usize,
    ) -> Option<ScreenPoint> {
        let clip = *view_projection * world.extend(1.0);
        if clip.w <= self.near {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        if ndc.z > 1.0 {
            return None;
        }
        Some(ScreenPoint {
            x: (ndc.x * 0.5 + 0.5) * width as f32,
            y: (1.0 - (ndc.y * 0.5 + 0.5)) * height as f32,
            depth: clip.w,
        })
    }

    /// Pixel radius of a world-space sphere of `radius` at `depth`
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pixel_radius(&self, radius: f32, depth: f32, height: usize) -> f32 {
        let half_fov = (self.fov_y_degrees.to_radians() * 0.5).tan();
        if depth <= 0.0 {
            return 0.0;
        }
        radius * (height as f32 * 0.5) / (half_fov * depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_projects_to_center() {
        let camera = Camera::new(800.0 / 600.0);
        let p = camera.project(Vec3::ZERO, 800, 600).unwrap();
        assert!((p.x - 400.0).abs() < 1e-2);
        assert!((p.y - 300.0).abs() < 1e-2);
        assert!(p.depth > 0.0);
    }

    #[test]
    fn test_point_behind_eye_is_culled() {
        let camera = Camera::new(1.0);
        let behind = camera.eye() * 2.0;
        assert!(camera.project(behind, 100, 100).is_none());
    }

    #[test]
    fn test_higher_points_project_higher() {
        let camera = Camera::new(1.0);
        let low = camera.project(Vec3::ZERO, 100, 100).unwrap();
        let high = camera.project(Vec3::new(0.0, 5.0, 0.0), 100, 100).unwrap();
        assert!(high.y < low.y);
    }

    #[test]
    fn test_auto_rotate_speed_scales_azimuth() {
        let mut camera = Camera::new(1.0);
        camera.set_auto_rotate_speed(2.0);
        camera.update(1.0);
        assert!((camera.azimuth() - 2.0 * AUTO_ROTATE_RATE).abs() < 1e-6);

        camera.set_auto_rotate(false);
        let before = camera.azimuth();
        camera.update(10.0);
        assert!((camera.azimuth() - before).abs() < f32::EPSILON);
    }

    #[test]
    fn test_set_aspect_ignores_invalid() {
        let mut camera = Camera::new(1.5);
        camera.set_aspect(0.0);
        camera.set_aspect(f32::NAN);
        assert!((camera.aspect() - 1.5).abs() < f32::EPSILON);
    }
}
