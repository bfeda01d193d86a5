//! Wavefront OBJ loader (positions, normals and faces) producing indexed meshes
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use nalgebra::{Point3, Vector3};
use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1, space0},
    combinator::{all_consuming, map_res, opt},
    number::complete::float,
    sequence::preceded,
    IResult,
};

use crate::error::ObjError;
use crate::geometry::{Mesh, Vertex};

/// How face corners that resolve to equal attributes are merged.
///
/// Both strategies keep the first-seen vertex and produce identical vertex
/// and index sequences. `LinearScan` compares every candidate against every
/// emitted vertex, which is quadratic in the number of unique vertices and
/// only suitable for meshes of a few thousand vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupStrategy {
    #[default]
    LinearScan,
    Hashed,
}

/// Parse OBJ text with the default deduplication strategy
pub fn parse_obj(source: &str) -> Result<Mesh, ObjError> {
    parse_obj_with(source, DedupStrategy::default())
}

/// Read and parse an OBJ file with the default deduplication strategy
pub fn load_obj(path: impl AsRef<Path>) -> Result<Mesh, ObjError> {
    load_obj_with(path, DedupStrategy::default())
}

pub fn load_obj_with(path: impl AsRef<Path>, strategy: DedupStrategy) -> Result<Mesh, ObjError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ObjError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mesh = parse_obj_bytes_with(&bytes, strategy)?;
    log::debug!(
        "loaded {}: {} vertices, {} triangles",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parse OBJ text.
///
/// Faces resolve their references against the records read so far and are
/// fan-triangulated; three-corner faces emit their corners in order.
pub fn parse_obj_with(source: &str, strategy: DedupStrategy) -> Result<Mesh, ObjError> {
    parse_obj_bytes_with(source.as_bytes(), strategy)
}

/// Parse raw OBJ file contents.
///
/// Only `v`, `vn` and `f` records have to be valid UTF-8; comments, object
/// names and other ignored lines may use any encoding.
pub fn parse_obj_bytes_with(source: &[u8], strategy: DedupStrategy) -> Result<Mesh, ObjError> {
    let mut raw = RawGeometry::default();
    let mut mesh = Mesh::new();
    let mut dedup = VertexDedup::new(strategy);
    let mut corners: Vec<u32> = Vec::new();
    let mut faces = 0usize;

    for (number, bytes) in lines(source).enumerate() {
        let line_no = number + 1;
        let line = match std::str::from_utf8(bytes) {
            Ok(line) => line,
            Err(_) if is_geometry_record(bytes) => {
                return Err(ObjError::malformed(line_no, "record is not valid UTF-8"));
            }
            Err(_) => continue,
        };
        let Ok((rest, key)) = keyword(line) else {
            continue; // blank line
        };

        match key {
            "v" => raw.positions.push(Point3::from(parse_vector3(rest, line_no)?)),
            "vn" => raw.normals.push(parse_vector3(rest, line_no)?),
            "f" => {
                let count = rest.split_whitespace().count();
                if count < 3 {
                    return Err(ObjError::malformed(
                        line_no,
                        format!("face needs at least 3 corners, found {count}"),
                    ));
                }

                corners.clear();
                for token in rest.split_whitespace() {
                    let candidate = raw.resolve(token, line_no)?;
                    let index = dedup
                        .index_of(&mut mesh.vertices, candidate)
                        .ok_or_else(|| ObjError::malformed(line_no, "vertex count exceeds u32 range"))?;
                    corners.push(index);
                }

                // Fan triangulation around the first corner
                for i in 2..corners.len() {
                    mesh.indices
                        .extend_from_slice(&[corners[0], corners[i - 1], corners[i]]);
                }
                faces += 1;
            }
            // Comments, texture coordinates, groups, materials...
            _ => {}
        }
    }

    log::debug!(
        "parsed OBJ: {} positions, {} normals, {} faces -> {} vertices, {} indices",
        raw.positions.len(),
        raw.normals.len(),
        faces,
        mesh.vertices.len(),
        mesh.indices.len()
    );

    Ok(mesh)
}

/// Lines split on `\n` with a trailing `\r` removed, like `str::lines`
fn lines(source: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = source.strip_suffix(b"\n").unwrap_or(source);
    let count = if source.is_empty() { 0 } else { usize::MAX };
    body.split(|&b| b == b'\n')
        .take(count)
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}

/// Whether a line starts with one of the record keywords the parser reads
fn is_geometry_record(line: &[u8]) -> bool {
    line.split(u8::is_ascii_whitespace)
        .find(|word| !word.is_empty())
        .is_some_and(|key| matches!(key, b"v" | b"vn" | b"f"))
}

/// Attribute records collected so far, 0-based
#[derive(Default)]
struct RawGeometry {
    positions: Vec<Point3<f32>>,
    normals: Vec<Vector3<f32>>,
}

impl RawGeometry {
    /// Resolve a `p/t/n` or `p//n` corner token into a candidate vertex
    fn resolve(&self, token: &str, line: usize) -> Result<Vertex, ObjError> {
        let (_, (p, n)) = all_consuming(corner)(token).map_err(|_| {
            ObjError::malformed(
                line,
                format!("invalid face corner `{token}`, expected p/t/n or p//n"),
            )
        })?;

        let position = lookup(&self.positions, p)
            .ok_or_else(|| out_of_range(line, "position", p, self.positions.len()))?;
        let normal = lookup(&self.normals, n)
            .ok_or_else(|| out_of_range(line, "normal", n, self.normals.len()))?;

        Ok(Vertex::from_parts(position, normal))
    }
}

fn lookup<T: Copy>(items: &[T], one_based: usize) -> Option<T> {
    one_based
        .checked_sub(1)
        .and_then(|i| items.get(i))
        .copied()
}

fn out_of_range(line: usize, kind: &str, index: usize, available: usize) -> ObjError {
    ObjError::malformed(
        line,
        format!("{kind} index {index} out of range (1..={available})"),
    )
}

/// Merges equal candidates into one emitted vertex, first seen wins
struct VertexDedup {
    strategy: DedupStrategy,
    seen: HashMap<[u32; 6], u32>,
}

impl VertexDedup {
    fn new(strategy: DedupStrategy) -> Self {
        Self {
            strategy,
            seen: HashMap::new(),
        }
    }

    /// Index of `candidate` in `vertices`, appending it if new.
    /// `None` if the vertex count would no longer fit in a `u32` index.
    fn index_of(&mut self, vertices: &mut Vec<Vertex>, candidate: Vertex) -> Option<u32> {
        match self.strategy {
            DedupStrategy::LinearScan => {
                if let Some(existing) = vertices.iter().position(|v| *v == candidate) {
                    return u32::try_from(existing).ok();
                }
                push(vertices, candidate)
            }
            DedupStrategy::Hashed => {
                // NaN never compares equal, so such a vertex is never reused
                let Some(key) = vertex_key(&candidate) else {
                    return push(vertices, candidate);
                };
                if let Some(&existing) = self.seen.get(&key) {
                    return Some(existing);
                }
                let index = push(vertices, candidate)?;
                self.seen.insert(key, index);
                Some(index)
            }
        }
    }
}

fn push(vertices: &mut Vec<Vertex>, vertex: Vertex) -> Option<u32> {
    let index = u32::try_from(vertices.len()).ok()?;
    vertices.push(vertex);
    Some(index)
}

/// Bit pattern that is equal exactly when the components compare equal
fn vertex_key(vertex: &Vertex) -> Option<[u32; 6]> {
    let p = vertex.position;
    let n = vertex.normal;
    let components = [p.x, p.y, p.z, n.x, n.y, n.z];
    if components.iter().any(|c| c.is_nan()) {
        return None;
    }
    // -0.0 == 0.0
    Some(components.map(|c| if c == 0.0 { 0 } else { c.to_bits() }))
}

fn keyword(input: &str) -> IResult<&str, &str> {
    preceded(space0, take_till1(|c: char| c.is_whitespace()))(input)
}

fn scalar(input: &str) -> IResult<&str, f32> {
    float(input)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(digit1, str::parse::<usize>)(input)
}

/// `p/t/n` with `t` optional; yields `(p, n)`
fn corner(input: &str) -> IResult<&str, (usize, usize)> {
    let (input, position) = index(input)?;
    let (input, _) = char('/')(input)?;
    let (input, _) = opt(digit1)(input)?;
    let (input, _) = char('/')(input)?;
    let (input, normal) = index(input)?;
    Ok((input, (position, normal)))
}

/// First three whitespace separated numbers; any further fields are ignored
fn parse_vector3(rest: &str, line: usize) -> Result<Vector3<f32>, ObjError> {
    let mut fields = rest.split_whitespace();
    let mut components = [0.0f32; 3];
    for (found, slot) in components.iter_mut().enumerate() {
        let token = fields.next().ok_or_else(|| {
            ObjError::malformed(line, format!("expected 3 coordinates, found {found}"))
        })?;
        let (_, value) = all_consuming(scalar)(token)
            .map_err(|_| ObjError::malformed(line, format!("`{token}` is not a number")))?;
        *slot = value;
    }
    Ok(Vector3::from(components))
}
