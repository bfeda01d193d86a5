//! Model transformations for the spinning scene objects
use nalgebra::{Matrix4, Vector3};

/// Spin rate of every object about the world up axis
pub const SPIN_DEGREES_PER_SECOND: f32 = 50.0;

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation about +Y by `elapsed * SPIN_DEGREES_PER_SECOND` degrees.
    ///
    /// The angle is not wrapped; the trigonometric functions are periodic.
    pub fn spin_matrix(elapsed: f32) -> Matrix4<f32> {
        let angle = (elapsed * SPIN_DEGREES_PER_SECOND).to_radians();
        Matrix4::from_axis_angle(&Vector3::y_axis(), angle)
    }

    /// Create a translation matrix
    pub fn translation_matrix(offset: &Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(offset)
    }

    /// Place an object at `position`, spun about its own origin
    pub fn model_matrix(position: &Vector3<f32>, elapsed: f32) -> Matrix4<f32> {
        Self::translation_matrix(position) * Self::spin_matrix(elapsed)
    }

    /// Create a model-view-projection matrix
    pub fn mvp_matrix(
        model: &Matrix4<f32>,
        view: &Matrix4<f32>,
        projection: &Matrix4<f32>,
    ) -> Matrix4<f32> {
        projection * view * model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector4;

    #[test]
    fn test_identity_at_time_zero() {
        let matrix = Transform::spin_matrix(0.0);
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_quarter_turn() {
        // 1.8 s * 50 deg/s = 90 degrees; +X rotates onto -Z
        let matrix = Transform::spin_matrix(1.8);
        let x = matrix * Vector4::new(1.0, 0.0, 0.0, 0.0);
        assert!((x - Vector4::new(0.0, 0.0, -1.0, 0.0)).norm() < 1e-5);
    }

    #[test]
    fn test_spin_is_periodic() {
        // 7.2 s is exactly one revolution
        let a = Transform::spin_matrix(0.5);
        let b = Transform::spin_matrix(7.7);
        assert!((a - b).norm() < 1e-4);
    }

    #[test]
    fn test_model_spins_in_place() {
        let position = Vector3::new(-2.0, 0.0, 0.0);
        let model = Transform::model_matrix(&position, 3.0);
        let origin = model * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(origin, Vector4::new(-2.0, 0.0, 0.0, 1.0));
        // Rotation never moves points along the spin axis
        let up = model * Vector4::new(0.0, 1.0, 0.0, 1.0);
        assert!((up - Vector4::new(-2.0, 1.0, 0.0, 1.0)).norm() < 1e-6);
    }

    #[test]
    fn test_mvp_order() {
        let model = Transform::translation_matrix(&Vector3::new(1.0, 0.0, 0.0));
        let view = Transform::translation_matrix(&Vector3::new(0.0, 0.0, -10.0));
        let projection = Matrix4::from_diagonal_element(2.0);
        let mvp = Transform::mvp_matrix(&model, &view, &projection);
        let p = mvp * Vector4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!(p, Vector4::new(2.0, 0.0, -20.0, 2.0));
    }
}
