//! Backend, program and registered meshes, rendered as one unit
use nalgebra::Vector3;

use crate::backend::{uniform, RenderBackend, UniformValue};
use crate::error::BackendError;
use crate::frame::{FrameMatrices, FrameState};
use crate::geometry::Mesh;
use crate::projection::Camera;
use crate::registry::MeshRegistry;
use crate::shading::ShadingParams;
use crate::transform::Transform;

/// Owns a render backend together with everything allocated on it.
///
/// Dropping the scene releases every mesh's buffers in registration order
/// and then the program, whichever way the owner exits.
pub struct Scene<B: RenderBackend> {
    backend: B,
    program: Option<B::Program>,
    registry: MeshRegistry<B::Buffers>,
}

impl<B: RenderBackend> Scene<B> {
    /// Compile the shading program on `backend`
    pub fn new(mut backend: B, vertex_source: &str, fragment_source: &str) -> Result<Self, BackendError> {
        let program = backend.compile_program(vertex_source, fragment_source)?;
        Ok(Self {
            backend,
            program: Some(program),
            registry: MeshRegistry::new(),
        })
    }

    pub fn add_mesh(
        &mut self,
        mesh: Mesh,
        position: Vector3<f32>,
        color: Vector3<f32>,
    ) -> Result<(), BackendError> {
        self.registry.add(&mut self.backend, mesh, position, color)?;
        Ok(())
    }

    pub fn registry(&self) -> &MeshRegistry<B::Buffers> {
        &self.registry
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Submit uniforms and draws for every registered mesh
    pub fn render(&mut self, frame: &FrameState, camera: &Camera, shading: &ShadingParams) {
        let Some(program) = self.program.as_ref() else {
            return;
        };
        let backend = &mut self.backend;
        let FrameMatrices { view, projection } = frame.matrices(camera);

        backend.begin_frame();
        backend.use_program(program);

        for (name, value) in shading.uniforms() {
            backend.set_uniform(program, name, value);
        }
        backend.set_uniform(program, uniform::VIEW, UniformValue::Mat4(view));
        backend.set_uniform(program, uniform::PROJECTION, UniformValue::Mat4(projection));
        backend.set_uniform(
            program,
            uniform::VIEW_POS,
            UniformValue::Vec3(camera.eye_position().coords),
        );

        for object in self.registry.objects() {
            let model = Transform::model_matrix(&object.mesh.position, frame.time);
            backend.set_uniform(program, uniform::MODEL, UniformValue::Mat4(model));
            backend.set_uniform(program, uniform::OBJECT_COLOR, UniformValue::Vec3(object.mesh.color));
            backend.draw(&object.buffers, object.mesh.indices.len());
        }
    }
}

impl<B: RenderBackend> Drop for Scene<B> {
    fn drop(&mut self) {
        self.registry.release_all(&mut self.backend);
        if let Some(program) = self.program.take() {
            self.backend.release_program(program);
        }
    }
}
