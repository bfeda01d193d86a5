//! objview core library - mesh loading and the per-frame render pipeline
//!
//! This library covers OBJ parsing with vertex deduplication, the mesh
//! registry, camera and model transforms, Phong shading parameters, and the
//! frame loop that drives any window and render backend implementing the
//! traits in [`backend`].

pub mod app;
pub mod backend;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod input;
pub mod obj;
pub mod projection;
pub mod registry;
pub mod scene;
pub mod shading;
pub mod transform;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use app::{run, LoopOptions, RunSummary};
pub use backend::{Key, RenderBackend, UniformValue, Window};
pub use error::{BackendError, ObjError, ShaderStage};
pub use frame::{FrameMatrices, FrameState};
pub use geometry::{Mesh, Vertex};
pub use input::{process_input, InputActions, InputState, KeySnapshot};
pub use obj::{
    load_obj, load_obj_with, parse_obj, parse_obj_bytes_with, parse_obj_with, DedupStrategy,
};
pub use projection::{Camera, ProjectionMode};
pub use registry::{MeshRegistry, SceneObject};
pub use scene::Scene;
pub use shading::ShadingParams;
pub use transform::Transform;
