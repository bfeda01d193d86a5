//! Loaded meshes with their placement and backend buffers
use nalgebra::Vector3;

use crate::backend::RenderBackend;
use crate::error::BackendError;
use crate::geometry::Mesh;

/// A registered mesh and the buffers it was uploaded to
#[derive(Debug)]
pub struct SceneObject<H> {
    pub mesh: Mesh,
    pub buffers: H,
}

/// Meshes in draw order; each owns its own buffers
#[derive(Debug)]
pub struct MeshRegistry<H> {
    objects: Vec<SceneObject<H>>,
}

impl<H> MeshRegistry<H> {
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
        }
    }

    /// Place `mesh` and upload it to `backend`; uploads happen once per mesh
    pub fn add<B>(
        &mut self,
        backend: &mut B,
        mut mesh: Mesh,
        position: Vector3<f32>,
        color: Vector3<f32>,
    ) -> Result<&SceneObject<H>, BackendError>
    where
        B: RenderBackend<Buffers = H>,
    {
        mesh.position = position;
        mesh.color = color;
        let buffers = backend.upload_mesh(&mesh.vertices, &mesh.indices)?;
        log::debug!(
            "registered mesh #{}: {} vertices, {} indices at {:?}",
            self.objects.len(),
            mesh.vertices.len(),
            mesh.indices.len(),
            position
        );
        let index = self.objects.len();
        self.objects.push(SceneObject { mesh, buffers });
        Ok(&self.objects[index])
    }

    /// Meshes in insertion order
    pub fn all(&self) -> impl Iterator<Item = &Mesh> + '_ {
        self.objects.iter().map(|object| &object.mesh)
    }

    pub fn objects(&self) -> &[SceneObject<H>] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Release every buffer in insertion order, emptying the registry
    pub fn release_all<B>(&mut self, backend: &mut B)
    where
        B: RenderBackend<Buffers = H>,
    {
        for object in self.objects.drain(..) {
            backend.release_buffers(object.buffers);
        }
    }
}

impl<H> Default for MeshRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}
