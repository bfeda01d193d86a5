//! Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    Orthographic,
    #[default]
    Perspective,
}

impl ProjectionMode {
    pub fn toggled(self) -> Self {
        match self {
            Self::Orthographic => Self::Perspective,
            Self::Perspective => Self::Orthographic,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Orthographic => "Orthographic",
            Self::Perspective => "Perspective",
        }
    }
}

/// Static camera looking down -Z at the origin from `distance` units away
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub distance: f32,
    /// Vertical field of view in radians
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Half the visible height of the orthographic box
    pub ortho_half_height: f32,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            distance: 10.0,
            fov: 45.0f32.to_radians(),
            near: 0.1,
            far: 100.0,
            ortho_half_height: 5.0,
        }
    }

    /// World-space eye position, used for specular highlights
    pub fn eye_position(&self) -> Point3<f32> {
        Point3::new(0.0, 0.0, self.distance)
    }

    /// Create the view matrix (moves the world away from the eye)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(0.0, 0.0, -self.distance))
    }

    /// Create the projection matrix for a viewport aspect ratio (width / height)
    pub fn projection_matrix(&self, mode: ProjectionMode, aspect: f32) -> Matrix4<f32> {
        match mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(aspect, self.fov, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_height = self.ortho_half_height;
                let half_width = half_height * aspect;
                Matrix4::new_orthographic(
                    -half_width,
                    half_width,
                    -half_height,
                    half_height,
                    self.near,
                    self.far,
                )
            }
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn test_camera_creation() {
        let camera = Camera::new();
        assert_eq!(camera.distance, 10.0);
        assert!((camera.fov - std::f32::consts::FRAC_PI_4).abs() < 1e-6);
        assert_eq!(camera.eye_position(), Point3::new(0.0, 0.0, 10.0));
    }

    #[test]
    fn test_view_matrix() {
        let camera = Camera::new();
        let view = camera.view_matrix();
        let origin = view * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, Vector4::new(0.0, 0.0, -10.0, 1.0));
    }

    #[test]
    fn test_perspective_matches_gl_convention() {
        let camera = Camera::new();
        let aspect = 800.0 / 600.0;
        let p = camera.projection_matrix(ProjectionMode::Perspective, aspect);
        let f = 1.0 / (camera.fov / 2.0).tan();
        assert!((p[(0, 0)] - f / aspect).abs() < 1e-6);
        assert!((p[(1, 1)] - f).abs() < 1e-6);
        assert_eq!(p[(3, 2)], -1.0);
        assert_eq!(p[(3, 3)], 0.0);

        // Near and far planes land on -1 and 1 in NDC
        let near = p * Vector4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vector4::new(0.0, 0.0, -100.0, 1.0);
        assert!((near.z / near.w + 1.0).abs() < 1e-4);
        assert!((far.z / far.w - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_orthographic_box() {
        let camera = Camera::new();
        let aspect = 2.0;
        let p = camera.projection_matrix(ProjectionMode::Orthographic, aspect);
        let corner = p * Vector4::new(10.0, 5.0, -50.0, 1.0);
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y - 1.0).abs() < 1e-6);
        assert_eq!(corner.w, 1.0);
    }

    #[test]
    fn test_mode_toggle() {
        let mode = ProjectionMode::default();
        assert_eq!(mode, ProjectionMode::Perspective);
        assert_eq!(mode.toggled(), ProjectionMode::Orthographic);
        assert_eq!(mode.toggled().toggled(), mode);
    }
}
