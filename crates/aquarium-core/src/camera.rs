//! Perspective camera used to turn a click into a picking ray.

use serde::{Deserialize, Serialize};

use crate::components::{Ray, Vec3};

/// Pixel size of the render surface
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        self.width / self.height
    }

    fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// Pixel coordinates, origin top-left, y down
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view
    pub fov_y_degrees: f32,
}

impl Default for Camera {
    fn default() -> Self {
        // Front view of the default tank
        Self::looking_at(Vec3::new(0.0, 0.0, 18.0), Vec3::ZERO)
    }
}

impl Camera {
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        Self {
            position,
            target,
            up: Vec3::Y,
            fov_y_degrees: 60.0,
        }
    }

    /// World-space ray through a pixel.
    ///
    /// `None` for an empty viewport or a degenerate camera (target at the
    /// eye, or `up` parallel to the view direction).
    pub fn ray_through(&self, point: ScreenPoint, viewport: Viewport) -> Option<Ray> {
        if !viewport.is_valid() || !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        let forward = (self.target - self.position).normalize();
        let right = forward.cross(&self.up).normalize();
        if forward.is_zero() || right.is_zero() {
            return None;
        }
        let up = right.cross(&forward);

        let ndc_x = 2.0 * point.x / viewport.width - 1.0;
        let ndc_y = 1.0 - 2.0 * point.y / viewport.height;
        let half_height = (self.fov_y_degrees.to_radians() * 0.5).tan();
        let half_width = half_height * viewport.aspect();

        let direction = forward + right * (ndc_x * half_width) + up * (ndc_y * half_height);
        Some(Ray::new(self.position, direction))
    }
}
