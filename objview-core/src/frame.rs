//! Per-frame view and projection computation
use nalgebra::Matrix4;

use crate::projection::{Camera, ProjectionMode};

/// Inputs sampled once per frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameState {
    /// Seconds since startup
    pub time: f32,
    pub width: u32,
    pub height: u32,
    pub mode: ProjectionMode,
}

/// Matrices shared by every object in a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameMatrices {
    pub view: Matrix4<f32>,
    pub projection: Matrix4<f32>,
}

impl FrameState {
    pub fn new(time: f32, width: u32, height: u32, mode: ProjectionMode) -> Self {
        Self {
            time,
            width,
            height,
            mode,
        }
    }

    /// Viewport aspect ratio; a zero dimension counts as 1
    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    pub fn matrices(&self, camera: &Camera) -> FrameMatrices {
        FrameMatrices {
            view: camera.view_matrix(),
            projection: camera.projection_matrix(self.mode, self.aspect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::perspective(ProjectionMode::Perspective)]
    #[case::orthographic(ProjectionMode::Orthographic)]
    fn test_matrices_are_deterministic(#[case] mode: ProjectionMode) {
        let camera = Camera::default();
        let frame = FrameState::new(1.25, 800, 600, mode);
        let first = frame.matrices(&camera);
        let second = frame.matrices(&camera);
        // Bit-for-bit
        assert_eq!(first, second);
        assert!(first
            .projection
            .iter()
            .zip(second.projection.iter())
            .all(|(a, b)| a.to_bits() == b.to_bits()));
    }

    #[test]
    fn test_mode_only_changes_projection() {
        let camera = Camera::default();
        let perspective = FrameState::new(3.0, 800, 600, ProjectionMode::Perspective);
        let orthographic = FrameState {
            mode: ProjectionMode::Orthographic,
            ..perspective
        };
        let a = perspective.matrices(&camera);
        let b = orthographic.matrices(&camera);
        assert_eq!(a.view, b.view);
        assert_ne!(a.projection, b.projection);
    }

    #[test]
    fn test_time_does_not_affect_camera() {
        let camera = Camera::default();
        let early = FrameState::new(0.0, 800, 600, ProjectionMode::Perspective);
        let late = FrameState { time: 42.0, ..early };
        assert_eq!(early.matrices(&camera), late.matrices(&camera));
    }

    #[test]
    fn test_aspect() {
        let frame = FrameState::new(0.0, 800, 600, ProjectionMode::Perspective);
        assert!((frame.aspect() - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_zero_sized_viewport_stays_finite() {
        let camera = Camera::default();
        let frame = FrameState::new(0.0, 0, 0, ProjectionMode::Perspective);
        assert_eq!(frame.aspect(), 1.0);
        assert!(frame.matrices(&camera).projection.iter().all(|v| v.is_finite()));
    }
}
