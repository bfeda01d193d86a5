//! Software rasterizer backend rendering into a character framebuffer
use nalgebra::{Matrix4, Point3, Vector3};
use objview_core::backend::uniform;
use objview_core::{BackendError, RenderBackend, Transform, UniformValue, Vertex};

use crate::framebuffer::{Cell, SharedFrameBuffer, CELL_ASPECT};
use crate::shader::{self, ProgramInfo};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Smallest clip-space w accepted before a vertex counts as behind the eye
const MIN_CLIP_W: f32 = 1e-5;

/// Handle to a linked program
#[derive(Debug, PartialEq, Eq)]
pub struct ProgramHandle(usize);

/// Handle to an uploaded vertex/index buffer pair
#[derive(Debug, PartialEq, Eq)]
pub struct BufferHandle(usize);

/// Uniform values as last set on a program
#[derive(Debug, Clone)]
struct Uniforms {
    model: Matrix4<f32>,
    view: Matrix4<f32>,
    projection: Matrix4<f32>,
    object_color: Vector3<f32>,
    light_pos: Vector3<f32>,
    light_color: Vector3<f32>,
    view_pos: Vector3<f32>,
    ambient_strength: f32,
    diffuse_strength: f32,
    specular_strength: f32,
    shininess: f32,
}

impl Default for Uniforms {
    fn default() -> Self {
        Self {
            model: Matrix4::identity(),
            view: Matrix4::identity(),
            projection: Matrix4::identity(),
            object_color: Vector3::zeros(),
            light_pos: Vector3::zeros(),
            light_color: Vector3::zeros(),
            view_pos: Vector3::zeros(),
            ambient_strength: 0.0,
            diffuse_strength: 0.0,
            specular_strength: 0.0,
            shininess: 0.0,
        }
    }
}

impl Uniforms {
    /// Store `value` under `name`; false if the name or type is not known
    fn assign(&mut self, name: &str, value: UniformValue) -> bool {
        match (name, value) {
            (uniform::MODEL, UniformValue::Mat4(m)) => self.model = m,
            (uniform::VIEW, UniformValue::Mat4(m)) => self.view = m,
            (uniform::PROJECTION, UniformValue::Mat4(m)) => self.projection = m,
            (uniform::OBJECT_COLOR, UniformValue::Vec3(v)) => self.object_color = v,
            (uniform::LIGHT_POS, UniformValue::Vec3(v)) => self.light_pos = v,
            (uniform::LIGHT_COLOR, UniformValue::Vec3(v)) => self.light_color = v,
            (uniform::VIEW_POS, UniformValue::Vec3(v)) => self.view_pos = v,
            (uniform::AMBIENT_STRENGTH, UniformValue::Float(f)) => self.ambient_strength = f,
            (uniform::DIFFUSE_STRENGTH, UniformValue::Float(f)) => self.diffuse_strength = f,
            (uniform::SPECULAR_STRENGTH, UniformValue::Float(f)) => self.specular_strength = f,
            (uniform::SHININESS, UniformValue::Float(f)) => self.shininess = f,
            _ => return false,
        }
        true
    }

    /// Phong light reaching a surface point, before the object color is applied
    fn light_at(&self, position: &Point3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
        let ambient = self.ambient_strength * self.light_color;

        let Some(norm) = normal.try_normalize(f32::EPSILON) else {
            return ambient;
        };
        let light_dir = (self.light_pos - position.coords)
            .try_normalize(f32::EPSILON)
            .unwrap_or(norm);
        let diff = norm.dot(&light_dir).max(0.0);
        let diffuse = self.diffuse_strength * diff * self.light_color;

        let view_dir = (self.view_pos - position.coords)
            .try_normalize(f32::EPSILON)
            .unwrap_or(norm);
        let reflect_dir = reflect(&-light_dir, &norm);
        let spec = view_dir.dot(&reflect_dir).max(0.0).powf(self.shininess);
        let specular = self.specular_strength * spec * self.light_color;

        ambient + diffuse + specular
    }
}

fn reflect(incident: &Vector3<f32>, normal: &Vector3<f32>) -> Vector3<f32> {
    incident - 2.0 * normal.dot(incident) * normal
}

struct ProgramSlot {
    info: ProgramInfo,
    uniforms: Uniforms,
}

struct MeshSlot {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

/// A vertex after the vertex stage
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    depth: f32,
    /// Reciprocal clip-space w, for perspective-correct interpolation
    inv_w: f32,
    world: Point3<f32>,
    normal: Vector3<f32>,
}

/// CPU implementation of the render backend.
///
/// Programs are validated WGSL; drawing evaluates the same Phong model per
/// covered cell, picks a glyph by light intensity and colors it with the lit
/// object color.
pub struct SoftwareBackend {
    target: SharedFrameBuffer,
    programs: Vec<Option<ProgramSlot>>,
    meshes: Vec<Option<MeshSlot>>,
    current: Option<usize>,
}

impl SoftwareBackend {
    pub fn new(target: SharedFrameBuffer) -> Self {
        Self {
            target,
            programs: Vec::new(),
            meshes: Vec::new(),
            current: None,
        }
    }

    pub fn live_buffers(&self) -> usize {
        self.meshes.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.iter().filter(|slot| slot.is_some()).count()
    }

    fn vertex_stage(
        uniforms: &Uniforms,
        mvp: &Matrix4<f32>,
        vertex: &Vertex,
        width: f32,
        height: f32,
    ) -> Option<ScreenVertex> {
        let position = vertex.position.to_homogeneous();
        let world = uniforms.model * position;
        let clip = mvp * position;
        if clip.w < MIN_CLIP_W {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        Some(ScreenVertex {
            x: (ndc.x + 1.0) * 0.5 * width,
            y: (1.0 - ndc.y) * 0.5 * height,
            depth: ndc.z,
            inv_w: clip.w.recip(),
            world: Point3::from(world.xyz()),
            normal: (uniforms.model * vertex.normal.to_homogeneous()).xyz(),
        })
    }

    fn rasterize_triangle(&self, uniforms: &Uniforms, v: [ScreenVertex; 3]) {
        let mut target = self.target.borrow_mut();
        let (width, height) = (target.width(), target.height());
        if width == 0 || height == 0 {
            return;
        }

        // Bounding box
        let min_x = v[0].x.min(v[1].x).min(v[2].x).floor().max(0.0) as usize;
        let max_x = v[0].x.max(v[1].x).max(v[2].x).ceil().min(width as f32 - 1.0);
        let min_y = v[0].y.min(v[1].y).min(v[2].y).floor().max(0.0) as usize;
        let max_y = v[0].y.max(v[1].y).max(v[2].y).ceil().min(height as f32 - 1.0);
        if max_x < 0.0 || max_y < 0.0 {
            return;
        }
        let (max_x, max_y) = (max_x as usize, max_y as usize);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) = barycentric(
                    (v[0].x, v[0].y),
                    (v[1].x, v[1].y),
                    (v[2].x, v[2].y),
                    (px, py),
                ) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v[0].depth + w1 * v[1].depth + w2 * v[2].depth;
                if !(-1.0..=1.0).contains(&depth) || !target.depth_test(x, y, depth) {
                    continue;
                }

                let [c0, c1, c2] =
                    perspective_weights([w0, w1, w2], [v[0].inv_w, v[1].inv_w, v[2].inv_w]);
                let world = Point3::from(
                    v[0].world.coords * c0 + v[1].world.coords * c1 + v[2].world.coords * c2,
                );
                let normal = v[0].normal * c0 + v[1].normal * c1 + v[2].normal * c2;
                target.set(x, y, shade(uniforms, &world, &normal));
            }
        }
    }
}

/// Screen-space barycentric weights corrected for perspective.
///
/// Depth is affine in screen space and uses the raw weights; world-space
/// attributes are affine in `1/w` instead.
fn perspective_weights(screen: [f32; 3], inv_w: [f32; 3]) -> [f32; 3] {
    let scaled = [screen[0] * inv_w[0], screen[1] * inv_w[1], screen[2] * inv_w[2]];
    let sum = scaled[0] + scaled[1] + scaled[2];
    if sum <= f32::EPSILON {
        return screen;
    }
    scaled.map(|weight| weight / sum)
}

/// Glyph from light intensity, color from the lit object color
fn shade(uniforms: &Uniforms, world: &Point3<f32>, normal: &Vector3<f32>) -> Cell {
    let light = uniforms.light_at(world, normal);
    let lit = light.component_mul(&uniforms.object_color);

    let intensity = (light.sum() / 3.0).clamp(0.0, 1.0);
    let steps = (LUMINOSITY_RAMP.len() - 1) as f32;
    // Covered cells never use the blank glyph
    let index = ((intensity * steps).round() as usize).clamp(1, LUMINOSITY_RAMP.len() - 1);

    Cell {
        glyph: LUMINOSITY_RAMP[index],
        color: [channel(lit.x), channel(lit.y), channel(lit.z)],
    }
}

fn channel(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl RenderBackend for SoftwareBackend {
    type Program = ProgramHandle;
    type Buffers = BufferHandle;

    fn compile_program(
        &mut self,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, BackendError> {
        let info = shader::compile_program(vertex_source, fragment_source)?;
        log::debug!(
            "linked program {} + {} with {} uniforms",
            info.vertex_entry,
            info.fragment_entry,
            info.uniforms.len()
        );
        self.programs.push(Some(ProgramSlot {
            info,
            uniforms: Uniforms::default(),
        }));
        Ok(ProgramHandle(self.programs.len() - 1))
    }

    fn upload_mesh(&mut self, vertices: &[Vertex], indices: &[u32]) -> Result<BufferHandle, BackendError> {
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(BackendError::Upload(format!(
                "index {bad} out of range for {} vertices",
                vertices.len()
            )));
        }
        self.meshes.push(Some(MeshSlot {
            vertices: vertices.to_vec(),
            indices: indices.to_vec(),
        }));
        Ok(BufferHandle(self.meshes.len() - 1))
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let rows = height / CELL_ASPECT;
        log::debug!("viewport {width}x{height} -> {width}x{rows} cells");
        self.target.borrow_mut().resize(width as usize, rows as usize);
    }

    fn begin_frame(&mut self) {
        self.target.borrow_mut().clear();
    }

    fn use_program(&mut self, program: &ProgramHandle) {
        self.current = Some(program.0);
    }

    fn set_uniform(&mut self, program: &ProgramHandle, name: &str, value: UniformValue) {
        let Some(Some(slot)) = self.programs.get_mut(program.0) else {
            return;
        };
        if !slot.info.declares(name) || !slot.uniforms.assign(name, value) {
            log::trace!("ignoring uniform `{name}`");
        }
    }

    fn draw(&mut self, buffers: &BufferHandle, index_count: usize) {
        let Some(Some(program)) = self.current.and_then(|id| self.programs.get(id)) else {
            return;
        };
        let Some(Some(mesh)) = self.meshes.get(buffers.0) else {
            return;
        };

        let (width, height) = {
            let target = self.target.borrow();
            (target.width() as f32, target.height() as f32)
        };
        let uniforms = &program.uniforms;
        let mvp = Transform::mvp_matrix(&uniforms.model, &uniforms.view, &uniforms.projection);
        let count = index_count.min(mesh.indices.len());

        for tri in mesh.indices[..count].chunks_exact(3) {
            let corners = [tri[0], tri[1], tri[2]].map(|index| {
                Self::vertex_stage(uniforms, &mvp, &mesh.vertices[index as usize], width, height)
            });
            // Triangles crossing the eye plane are dropped
            if let [Some(a), Some(b), Some(c)] = corners {
                self.rasterize_triangle(uniforms, [a, b, c]);
            }
        }
    }

    fn release_buffers(&mut self, buffers: BufferHandle) {
        if let Some(slot) = self.meshes.get_mut(buffers.0) {
            *slot = None;
        }
    }

    fn release_program(&mut self, program: ProgramHandle) {
        if self.current == Some(program.0) {
            self.current = None;
        }
        if let Some(slot) = self.programs.get_mut(program.0) {
            *slot = None;
        }
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
