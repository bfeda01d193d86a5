//! Terminal frontend for objview.
//!
//! Renders OBJ models with a software rasterizer into a character
//! framebuffer and presents it through crossterm.

use std::fs;
use std::path::Path;

use anyhow::Context;
use objview_core::{
    load_obj_with, BackendError, Camera, DedupStrategy, RenderBackend, RunSummary, Scene,
    ShadingParams,
};

pub mod config;
pub mod framebuffer;
pub mod logging;
pub mod renderer;
pub mod shader;
pub mod window;

pub use config::{AppConfig, Args, ModelSpec};
pub use renderer::SoftwareBackend;
pub use window::{TerminalWindow, WindowOptions};

const WINDOW_TITLE: &str = "objview";

/// Main application struct for terminal rendering
pub struct TerminalApp {
    config: AppConfig,
    camera: Camera,
    shading: ShadingParams,
}

impl TerminalApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            camera: Camera::default(),
            shading: ShadingParams::default(),
        }
    }

    /// Open the terminal, load everything and run until closed.
    ///
    /// The terminal is restored before this returns, on success or error.
    pub fn run(&self) -> anyhow::Result<RunSummary> {
        let vertex_source = read_shader(&self.config.vertex_shader)?;
        let fragment_source = read_shader(&self.config.fragment_shader)?;

        let mut window = TerminalWindow::create(
            WINDOW_TITLE,
            WindowOptions {
                target_fps: self.config.target_fps,
            },
        )
        .context("initializing terminal")?;

        let backend = SoftwareBackend::new(window.surface());
        let mut scene = build_scene(backend, &vertex_source, &fragment_source)?;
        load_models(&mut scene, &self.config.models, self.config.dedup)?;

        let summary = objview_core::run(
            &mut window,
            &mut scene,
            &self.camera,
            &self.shading,
            &self.config.loop_options(),
        )
        .context("rendering")?;

        Ok(summary)
    }
}

/// Compile the shading program on `backend`
pub fn build_scene<B: RenderBackend>(
    backend: B,
    vertex_source: &str,
    fragment_source: &str,
) -> anyhow::Result<Scene<B>> {
    Scene::new(backend, vertex_source, fragment_source).context("compiling shader program")
}

/// Load every model in order and register it with the scene
pub fn load_models<B: RenderBackend>(
    scene: &mut Scene<B>,
    models: &[ModelSpec],
    dedup: DedupStrategy,
) -> anyhow::Result<()> {
    for model in models {
        let mesh = load_obj_with(&model.path, dedup)
            .with_context(|| format!("loading model {}", model.path.display()))?;
        log::info!(
            "{}: {} vertices, {} triangles",
            model.path.display(),
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        scene
            .add_mesh(mesh, model.position, model.color)
            .with_context(|| format!("uploading model {}", model.path.display()))?;
    }
    Ok(())
}

fn read_shader(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .map_err(|source| BackendError::ShaderSource {
            path: path.to_path_buf(),
            source,
        })
        .context("reading shader sources")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framebuffer::FrameBuffer;
    use clap::Parser;
    use objview_core::ObjError;
    use std::path::PathBuf;

    const VERTEX: &str = include_str!("../shaders/phong.vert.wgsl");
    const FRAGMENT: &str = include_str!("../shaders/phong.frag.wgsl");

    fn software_scene() -> Scene<SoftwareBackend> {
        build_scene(SoftwareBackend::new(FrameBuffer::shared(0, 0)), VERTEX, FRAGMENT).unwrap()
    }

    fn has_cause<E>(err: &anyhow::Error, check: impl Fn(&E) -> bool) -> bool
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        err.chain().any(|cause| cause.downcast_ref::<E>().is_some_and(&check))
    }

    #[test]
    fn test_missing_shader_fails_before_terminal_opens() {
        let args =
            Args::try_parse_from(["objview", "--vertex-shader", "no/such/shader.wgsl"]).unwrap();
        let err = TerminalApp::new(args.into()).run().unwrap_err();

        assert!(format!("{err:#}").contains("reading shader sources"));
        assert!(has_cause(&err, |e: &BackendError| matches!(
            e,
            BackendError::ShaderSource { path, .. } if path.ends_with("shader.wgsl")
        )));
    }

    #[test]
    fn test_bad_shader_names_compile_stage() {
        let backend = SoftwareBackend::new(FrameBuffer::shared(0, 0));
        let err = build_scene(backend, "fn broken( {", FRAGMENT).err().unwrap();

        assert_eq!(err.to_string(), "compiling shader program");
        assert!(has_cause(&err, |e: &BackendError| matches!(
            e,
            BackendError::ShaderCompile { .. }
        )));
    }

    #[test]
    fn test_missing_model_names_the_file() {
        let mut scene = software_scene();
        let models = config::layout(vec![PathBuf::from("no/such/model2.obj")]);
        let err = load_models(&mut scene, &models, DedupStrategy::LinearScan).unwrap_err();

        assert_eq!(err.to_string(), "loading model no/such/model2.obj");
        assert!(has_cause(&err, |e: &ObjError| matches!(e, ObjError::Io { .. })));
        assert!(scene.registry().is_empty());
    }

    #[test]
    fn test_models_register_in_order() {
        let path = std::env::temp_dir()
            .join(format!("objview-{}-triangle.obj", std::process::id()));
        fs::write(&path, "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n").unwrap();
        let paths = vec![path.clone(), path.clone()];

        let mut scene = software_scene();
        let result = load_models(&mut scene, &config::layout(paths), DedupStrategy::Hashed);
        fs::remove_file(&path).unwrap();
        result.unwrap();

        let positions: Vec<f32> = scene.registry().all().map(|mesh| mesh.position.x).collect();
        assert_eq!(positions, [-1.0, 1.0]);
        assert_eq!(scene.backend().live_buffers(), 2);
    }
}
