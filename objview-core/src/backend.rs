//! Interfaces to the windowing and rendering collaborators.
//!
//! The core never talks to a terminal or a graphics API directly; it drives
//! a [`Window`] for input, timing and presentation and a [`RenderBackend`]
//! for shader programs, mesh buffers and draw calls.

use nalgebra::{Matrix4, Vector3};

use crate::error::BackendError;
use crate::geometry::Vertex;

/// Uniform names understood by the Phong program
pub mod uniform {
    pub const MODEL: &str = "model";
    pub const VIEW: &str = "view";
    pub const PROJECTION: &str = "projection";
    pub const OBJECT_COLOR: &str = "objectColor";
    pub const LIGHT_POS: &str = "lightPos";
    pub const LIGHT_COLOR: &str = "lightColor";
    pub const VIEW_POS: &str = "viewPos";
    pub const AMBIENT_STRENGTH: &str = "ambientStrength";
    pub const DIFFUSE_STRENGTH: &str = "diffuseStrength";
    pub const SPECULAR_STRENGTH: &str = "specularStrength";
    pub const SHININESS: &str = "shininess";

    pub const ALL: [&str; 11] = [
        MODEL,
        VIEW,
        PROJECTION,
        OBJECT_COLOR,
        LIGHT_POS,
        LIGHT_COLOR,
        VIEW_POS,
        AMBIENT_STRENGTH,
        DIFFUSE_STRENGTH,
        SPECULAR_STRENGTH,
        SHININESS,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec3(Vector3<f32>),
    Mat4(Matrix4<f32>),
}

/// Keys the core asks the window about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    /// A character key, compared case-insensitively by implementations
    Char(char),
}

pub type ResizeCallback = Box<dyn FnMut(u32, u32)>;

/// Window, input and timing collaborator
pub trait Window {
    /// Process pending window events, updating key and size state
    fn poll_events(&mut self) -> Result<(), BackendError>;

    fn should_close(&self) -> bool;

    fn set_should_close(&mut self, close: bool);

    /// Present the rendered frame; may block to pace the frame rate
    fn swap_buffers(&mut self) -> Result<(), BackendError>;

    /// Drawable size in pixels (or pixel-equivalents)
    fn size(&self) -> (u32, u32);

    /// Seconds since the window was created
    fn elapsed_time(&self) -> f32;

    fn key_pressed(&self, key: Key) -> bool;

    /// Called with the new drawable size whenever it changes
    fn set_resize_callback(&mut self, callback: ResizeCallback);
}

/// Shader program, mesh buffer and draw collaborator
pub trait RenderBackend {
    type Program;
    type Buffers;

    /// Compile and link a program from vertex and fragment stage sources
    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<Self::Program, BackendError>;

    fn upload_mesh(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<Self::Buffers, BackendError>;

    fn set_viewport(&mut self, width: u32, height: u32);

    /// Clear color and depth for a new frame
    fn begin_frame(&mut self);

    fn use_program(&mut self, program: &Self::Program);

    /// Names the program does not declare are ignored
    fn set_uniform(&mut self, program: &Self::Program, name: &str, value: UniformValue);

    /// Draw `index_count` indices as a triangle list with the current program
    fn draw(&mut self, buffers: &Self::Buffers, index_count: usize);

    fn release_buffers(&mut self, buffers: Self::Buffers);

    fn release_program(&mut self, program: Self::Program);
}
