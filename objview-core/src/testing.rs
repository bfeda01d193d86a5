//! Recording collaborators for exercising the loop without a terminal.

use std::cell::RefCell;
use std::rc::Rc;

use crate::backend::{Key, RenderBackend, ResizeCallback, UniformValue, Window};
use crate::error::BackendError;
use crate::geometry::Vertex;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Compile,
    Upload { vertices: usize, indices: usize },
    Viewport(u32, u32),
    BeginFrame,
    UseProgram(u32),
    Uniform(String, UniformValue),
    Draw { buffers: usize, index_count: usize },
    ReleaseBuffers(usize),
    ReleaseProgram(u32),
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

#[derive(Debug, Default)]
pub struct RecordingBackend {
    pub log: CallLog,
    pub fail_compile: bool,
    pub fail_uploads: bool,
    /// Fail only the upload with this sequence number
    pub fail_upload_at: Option<usize>,
    pub uploads: usize,
}

impl RecordingBackend {
    pub fn calls(&self) -> Vec<Call> {
        self.log.borrow().clone()
    }

    pub fn clear(&self) {
        self.log.borrow_mut().clear();
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl RenderBackend for RecordingBackend {
    type Program = u32;
    type Buffers = usize;

    fn compile_program(&mut self, _vertex: &str, _fragment: &str) -> Result<u32, BackendError> {
        if self.fail_compile {
            return Err(BackendError::ShaderLink {
                log: "mock link failure".to_string(),
            });
        }
        self.record(Call::Compile);
        Ok(7)
    }

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<usize, BackendError> {
        let sequence = self.uploads;
        self.uploads += 1;
        if self.fail_uploads || self.fail_upload_at == Some(sequence) {
            return Err(BackendError::Upload("mock upload failure".to_string()));
        }
        self.record(Call::Upload {
            vertices: vertices.len(),
            indices: indices.len(),
        });
        Ok(sequence)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.record(Call::Viewport(width, height));
    }

    fn begin_frame(&mut self) {
        self.record(Call::BeginFrame);
    }

    fn use_program(&mut self, program: &u32) {
        self.record(Call::UseProgram(*program));
    }

    fn set_uniform(&mut self, _program: &u32, name: &str, value: UniformValue) {
        self.record(Call::Uniform(name.to_string(), value));
    }

    fn draw(&mut self, buffers: &usize, index_count: usize) {
        self.record(Call::Draw {
            buffers: *buffers,
            index_count,
        });
    }

    fn release_buffers(&mut self, buffers: usize) {
        self.record(Call::ReleaseBuffers(buffers));
    }

    fn release_program(&mut self, program: u32) {
        self.record(Call::ReleaseProgram(program));
    }
}

/// Window whose held keys follow a per-frame script
pub struct ScriptedWindow {
    /// Keys held on each frame; frames past the end hold nothing
    pub script: Vec<Vec<Key>>,
    /// Resize to the given size when this many polls have happened
    pub resize_after: Option<(usize, (u32, u32))>,
    pub presented: usize,
    polls: usize,
    size: (u32, u32),
    close: bool,
    on_resize: Option<ResizeCallback>,
}

impl ScriptedWindow {
    pub fn new(size: (u32, u32), script: Vec<Vec<Key>>) -> Self {
        Self {
            script,
            resize_after: None,
            presented: 0,
            polls: 0,
            size,
            close: false,
            on_resize: None,
        }
    }
}

impl Window for ScriptedWindow {
    fn poll_events(&mut self) -> Result<(), BackendError> {
        self.polls += 1;
        if let Some((after, size)) = self.resize_after {
            if after == self.polls {
                self.size = size;
                if let Some(callback) = self.on_resize.as_mut() {
                    callback(size.0, size.1);
                }
            }
        }
        Ok(())
    }

    fn should_close(&self) -> bool {
        self.close
    }

    fn set_should_close(&mut self, close: bool) {
        self.close = close;
    }

    fn swap_buffers(&mut self) -> Result<(), BackendError> {
        self.presented += 1;
        Ok(())
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn elapsed_time(&self) -> f32 {
        self.polls as f32 * 0.5
    }

    fn key_pressed(&self, key: Key) -> bool {
        self.script
            .get(self.polls)
            .is_some_and(|held| held.contains(&key))
    }

    fn set_resize_callback(&mut self, callback: ResizeCallback) {
        self.on_resize = Some(callback);
    }
}
