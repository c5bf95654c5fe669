use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// 2D vector type used throughout the simulation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };
    pub const Y: Self = Self { x: 0.0, y: 1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn normalized(&self) -> Self {
        let len = self.length();
        if len == 0.0 {
            Self::ZERO
        } else {
            Self::new(self.x / len, self.y / len)
        }
    }

    pub fn distance(self, rhs: Self) -> f32 {
        (self - rhs).length()
    }

    /// Angle of the vector relative to the X axis, in radians.
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    /// Rotates the vector counter-clockwise by `radians`.
    pub fn rotated(self, radians: f32) -> Self {
        let (sin, cos) = radians.sin_cos();
        Self::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    /// Rotates the vector counter-clockwise by `degrees`.
    pub fn rotated_deg(self, degrees: f32) -> Self {
        self.rotated(degrees.to_radians())
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from(value: (f32, f32)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl std::ops::Add for Vec2 {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub for Vec2 {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Self) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl std::ops::Mul<f32> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl std::ops::Mul<Vec2> for Vec2 {
    type Output = Self;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Self::new(self.x * rhs.x, self.y * rhs.y)
    }
}

impl std::ops::MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl std::ops::Div<f32> for Vec2 {
    type Output = Self;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl std::ops::Neg for Vec2 {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle anchored at its bottom-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_corner(position: Vec2, size: Vec2) -> Self {
        Self::new(position.x, position.y, size.x, size.y)
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// True when the rectangle has no area worth testing against.
    pub fn is_degenerate(&self) -> bool {
        self.width + self.height <= 0.0
    }

    /// Strict overlap test: touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Orthographic camera looking at `position` (the center of the view).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera2D {
    pub position: Vec2,
    pub zoom: f32,
}

impl Camera2D {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            zoom: 1.0,
        }
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position += delta;
    }

    /// Y-up projection of a `width` x `height` world window centered on the camera.
    pub fn view_projection(&self, width: f32, height: f32) -> Mat4 {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        let projection = Mat4::orthographic_rh_gl(-half_w, half_w, -half_h, half_h, -1.0, 1.0);

        let zoom = Mat4::from_scale(Vec3::new(self.zoom, self.zoom, 1.0));
        let translation =
            Mat4::from_translation(Vec3::new(-self.position.x, -self.position.y, 0.0));

        projection * zoom * translation
    }
}

impl Default for Camera2D {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec2, b: Vec2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn test_rotate_quarter_turn() {
        let v = Vec2::new(1.0, 0.0).rotated_deg(90.0);
        assert!(approx(v, Vec2::new(0.0, 1.0)));
    }

    #[test]
    fn test_rect_overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let touching = Rect::new(10.0, 0.0, 5.0, 5.0);
        let inside = Rect::new(9.0, 9.0, 5.0, 5.0);
        assert!(!a.overlaps(&touching));
        assert!(a.overlaps(&inside));
    }

    #[test]
    fn test_degenerate_rect() {
        assert!(Rect::new(3.0, 3.0, 0.0, 0.0).is_degenerate());
        assert!(!Rect::new(3.0, 3.0, 1.0, 0.0).is_degenerate());
    }

    #[test]
    fn test_view_projection_maps_camera_center_to_origin() {
        let camera = Camera2D::new(Vec2::new(64.0, 112.0));
        let m = camera.view_projection(128.0, 224.0);
        let p = m.project_point3(Vec3::new(64.0, 112.0, 0.0));
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        let corner = m.project_point3(Vec3::new(128.0, 224.0, 0.0));
        assert!((corner.x - 1.0).abs() < 1e-5 && (corner.y - 1.0).abs() < 1e-5);
    }
}
