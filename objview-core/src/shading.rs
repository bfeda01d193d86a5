//! Light and material parameters shared by every object
use nalgebra::{Point3, Vector3};

use crate::backend::{uniform, UniformValue};

/// Single point light with a Phong material, fixed at startup
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingParams {
    pub light_position: Point3<f32>,
    pub light_color: Vector3<f32>,
    pub ambient_strength: f32,
    pub diffuse_strength: f32,
    pub specular_strength: f32,
    pub shininess: f32,
}

impl ShadingParams {
    /// Uniforms applied identically to every object each frame
    pub fn uniforms(&self) -> [(&'static str, UniformValue); 6] {
        [
            (uniform::LIGHT_POS, UniformValue::Vec3(self.light_position.coords)),
            (uniform::LIGHT_COLOR, UniformValue::Vec3(self.light_color)),
            (uniform::AMBIENT_STRENGTH, UniformValue::Float(self.ambient_strength)),
            (uniform::DIFFUSE_STRENGTH, UniformValue::Float(self.diffuse_strength)),
            (uniform::SPECULAR_STRENGTH, UniformValue::Float(self.specular_strength)),
            (uniform::SHININESS, UniformValue::Float(self.shininess)),
        ]
    }
}

impl Default for ShadingParams {
    fn default() -> Self {
        Self {
            light_position: Point3::new(1.2, 1.0, 2.0),
            light_color: Vector3::new(1.0, 1.0, 1.0),
            ambient_strength: 0.2,
            diffuse_strength: 0.7,
            specular_strength: 0.5,
            shininess: 32.0,
        }
    }
}
