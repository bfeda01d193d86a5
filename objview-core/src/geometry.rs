//! Geometry primitives for indexed meshes
use nalgebra::{Point3, Vector3};

/// A vertex with position and normal.
///
/// Equality is exact component-wise `f32` equality, which is what the
/// OBJ loader uses to merge corners into shared vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }

    pub fn from_parts(position: Point3<f32>, normal: Vector3<f32>) -> Self {
        Self { position, normal }
    }
}

/// An indexed triangle mesh placed in the world with a flat color
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Triangle list, three indices per triangle into `vertices`
    pub indices: Vec<u32>,
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            position: Vector3::zeros(),
            color: Vector3::zeros(),
        }
    }

    pub fn with_capacity(vertices: usize, indices: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            indices: Vec::with_capacity(indices),
            ..Self::new()
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Iterate the triangles as vertex triples.
    ///
    /// # Panics
    ///
    /// Panics when an index is out of range for `vertices`. Meshes from the
    /// OBJ loader and [`Mesh::cube`] always satisfy this.
    pub fn triangles(&self) -> impl Iterator<Item = [&Vertex; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                &self.vertices[tri[0] as usize],
                &self.vertices[tri[1] as usize],
                &self.vertices[tri[2] as usize],
            ]
        })
    }

    /// Create an indexed cube with flat per-face normals (24 vertices, 36 indices)
    pub fn cube(size: f32) -> Self {
        let half = size / 2.0;
        let mut mesh = Self::with_capacity(24, 36);

        // (normal, four corners counter-clockwise seen from outside)
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            // Front
            (
                [0.0, 0.0, 1.0],
                [[-half, -half, half], [half, -half, half], [half, half, half], [-half, half, half]],
            ),
            // Back
            (
                [0.0, 0.0, -1.0],
                [[half, -half, -half], [-half, -half, -half], [-half, half, -half], [half, half, -half]],
            ),
            // Top
            (
                [0.0, 1.0, 0.0],
                [[-half, half, half], [half, half, half], [half, half, -half], [-half, half, -half]],
            ),
            // Bottom
            (
                [0.0, -1.0, 0.0],
                [[-half, -half, -half], [half, -half, -half], [half, -half, half], [-half, -half, half]],
            ),
            // Right
            (
                [1.0, 0.0, 0.0],
                [[half, -half, half], [half, -half, -half], [half, half, -half], [half, half, half]],
            ),
            // Left
            (
                [-1.0, 0.0, 0.0],
                [[-half, -half, -half], [-half, -half, half], [-half, half, half], [-half, half, -half]],
            ),
        ];

        for (normal, corners) in faces {
            let base = mesh.vertices.len() as u32;
            for [x, y, z] in corners {
                mesh.vertices.push(Vertex::new(x, y, z, normal[0], normal[1], normal[2]));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}
