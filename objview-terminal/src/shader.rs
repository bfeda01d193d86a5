//! WGSL program compilation.
//!
//! Each stage is parsed and validated with naga. Linking checks that the
//! vertex stage produces every location the fragment stage consumes and
//! collects the uniform member names the program declares.

use std::collections::BTreeSet;

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, EntryPoint, Handle, Module, Type, TypeInner};
use objview_core::{BackendError, ShaderStage};

/// A linked program's interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramInfo {
    pub vertex_entry: String,
    pub fragment_entry: String,
    /// Uniform names across both stages
    pub uniforms: BTreeSet<String>,
}

impl ProgramInfo {
    pub fn declares(&self, name: &str) -> bool {
        self.uniforms.contains(name)
    }
}

struct CompiledStage {
    module: Module,
    entry: usize,
}

impl CompiledStage {
    fn entry_point(&self) -> &EntryPoint {
        &self.module.entry_points[self.entry]
    }
}

pub fn compile_program(vertex_source: &str, fragment_source: &str) -> Result<ProgramInfo, BackendError> {
    let vertex = compile_stage(vertex_source, ShaderStage::Vertex)?;
    let fragment = compile_stage(fragment_source, ShaderStage::Fragment)?;
    link(&vertex, &fragment)
}

fn compile_stage(source: &str, stage: ShaderStage) -> Result<CompiledStage, BackendError> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| BackendError::ShaderCompile {
        stage,
        log: e.emit_to_string(source),
    })?;

    let mut validator = Validator::new(ValidationFlags::all(), Capabilities::all());
    validator
        .validate(&module)
        .map_err(|e| BackendError::ShaderCompile {
            stage,
            log: format!("validation error: {e}"),
        })?;

    let naga_stage = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let entry = module
        .entry_points
        .iter()
        .position(|ep| ep.stage == naga_stage)
        .ok_or_else(|| BackendError::ShaderCompile {
            stage,
            log: format!("no @{stage} entry point"),
        })?;

    Ok(CompiledStage { module, entry })
}

fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<ProgramInfo, BackendError> {
    let produced = output_locations(&vertex.module, vertex.entry_point());
    let consumed = input_locations(&fragment.module, fragment.entry_point());

    let missing: Vec<String> = consumed
        .difference(&produced)
        .map(|location| location.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(BackendError::ShaderLink {
            log: format!(
                "fragment input location(s) {} not written by vertex entry point `{}`",
                missing.join(", "),
                vertex.entry_point().name
            ),
        });
    }

    let mut uniforms = BTreeSet::new();
    uniforms.extend(uniform_names(&vertex.module));
    uniforms.extend(uniform_names(&fragment.module));

    Ok(ProgramInfo {
        vertex_entry: vertex.entry_point().name.clone(),
        fragment_entry: fragment.entry_point().name.clone(),
        uniforms,
    })
}

fn output_locations(module: &Module, entry: &EntryPoint) -> BTreeSet<u32> {
    entry
        .function
        .result
        .as_ref()
        .map(|result| locations(module, result.ty, result.binding.as_ref()))
        .unwrap_or_default()
}

fn input_locations(module: &Module, entry: &EntryPoint) -> BTreeSet<u32> {
    entry
        .function
        .arguments
        .iter()
        .flat_map(|arg| locations(module, arg.ty, arg.binding.as_ref()))
        .collect()
}

/// Locations of a bound value, or of the members of an unbound struct
fn locations(module: &Module, ty: Handle<Type>, binding: Option<&Binding>) -> BTreeSet<u32> {
    match binding {
        Some(Binding::Location { location, .. }) => BTreeSet::from([*location]),
        Some(Binding::BuiltIn(_)) => BTreeSet::new(),
        None => match &module.types[ty].inner {
            TypeInner::Struct { members, .. } => members
                .iter()
                .filter_map(|member| match &member.binding {
                    Some(Binding::Location { location, .. }) => Some(*location),
                    _ => None,
                })
                .collect(),
            _ => BTreeSet::new(),
        },
    }
}

/// Members of uniform structs, or the variable name for plain uniforms
fn uniform_names(module: &Module) -> Vec<String> {
    let mut names = Vec::new();
    for (_, var) in module.global_variables.iter() {
        if var.space != AddressSpace::Uniform {
            continue;
        }
        match &module.types[var.ty].inner {
            TypeInner::Struct { members, .. } => {
                names.extend(members.iter().filter_map(|member| member.name.clone()));
            }
            _ => names.extend(var.name.clone()),
        }
    }
    names
}
