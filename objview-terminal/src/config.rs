//! Command line arguments and the resolved application configuration
use std::path::PathBuf;

use clap::Parser;
use env_logger::WriteStyle;
use nalgebra::Vector3;
use objview_core::{DedupStrategy, LoopOptions, ProjectionMode};

pub const DEFAULT_MODELS: [&str; 3] = ["model1.obj", "model2.obj", "model3.obj"];

const DEFAULT_VERTEX_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/phong.vert.wgsl");
const DEFAULT_FRAGMENT_SHADER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders/phong.frag.wgsl");

/// Horizontal distance between neighbouring models
const MODEL_SPACING: f32 = 2.0;

/// Object colors, assigned to models in order and repeated
const PALETTE: [[f32; 3]; 3] = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Dedup strategy selection for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliDedup {
    /// Compare each vertex against every emitted one
    #[default]
    Linear,
    /// Hash lookup on the vertex bit patterns
    Hashed,
}

impl From<CliDedup> for DedupStrategy {
    fn from(cli: CliDedup) -> Self {
        match cli {
            CliDedup::Linear => DedupStrategy::LinearScan,
            CliDedup::Hashed => DedupStrategy::Hashed,
        }
    }
}

/// Log coloring selection for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliColor {
    /// Color when stderr is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl From<CliColor> for WriteStyle {
    fn from(cli: CliColor) -> Self {
        match cli {
            CliColor::Auto => WriteStyle::Auto,
            CliColor::Always => WriteStyle::Always,
            CliColor::Never => WriteStyle::Never,
        }
    }
}

/// Render OBJ models side by side with Phong shading in the terminal.
#[derive(Parser, Debug)]
#[command(
    name = "objview",
    version,
    about = "Terminal OBJ viewer",
    long_about = "Loads OBJ models, lines them up along the X axis and renders them \
        spinning under a single point light.\n\n\
        CONTROLS:\n  \
        C        toggle perspective / orthographic\n  \
        Esc, Q   quit"
)]
pub struct Args {
    /// OBJ files to display, left to right
    #[arg(value_name = "MODEL")]
    pub models: Vec<PathBuf>,

    /// WGSL vertex stage source
    #[arg(long, default_value = DEFAULT_VERTEX_SHADER)]
    pub vertex_shader: PathBuf,

    /// WGSL fragment stage source
    #[arg(long, default_value = DEFAULT_FRAGMENT_SHADER)]
    pub fragment_shader: PathBuf,

    /// Start with the orthographic camera.
    #[arg(long)]
    pub orthographic: bool,

    /// Vertex deduplication strategy used while loading models.
    #[arg(long, default_value = "linear", value_enum)]
    pub dedup: CliDedup,

    /// Target frame rate.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(1..))]
    pub fps: u32,

    /// Exit after rendering N frames (useful for testing).
    #[arg(long)]
    pub max_frames: Option<u64>,

    /// Log filter in env_logger syntax; overrides RUST_LOG.
    #[arg(long, value_name = "FILTER")]
    pub log: Option<String>,

    /// Color log output.
    #[arg(long, default_value = "auto", value_enum)]
    pub color: CliColor,
}

/// One model to load and where to put it
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub path: PathBuf,
    pub position: Vector3<f32>,
    pub color: Vector3<f32>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub models: Vec<ModelSpec>,
    pub vertex_shader: PathBuf,
    pub fragment_shader: PathBuf,
    pub dedup: DedupStrategy,
    pub initial_mode: ProjectionMode,
    pub target_fps: u32,
    pub max_frames: Option<u64>,
    pub log_filter: Option<String>,
    pub log_style: WriteStyle,
}

impl AppConfig {
    pub fn loop_options(&self) -> LoopOptions {
        LoopOptions {
            initial_mode: self.initial_mode,
            max_frames: self.max_frames,
            ..LoopOptions::default()
        }
    }
}

impl From<Args> for AppConfig {
    fn from(args: Args) -> Self {
        let paths = if args.models.is_empty() {
            DEFAULT_MODELS.iter().map(PathBuf::from).collect()
        } else {
            args.models
        };

        Self {
            models: layout(paths),
            vertex_shader: args.vertex_shader,
            fragment_shader: args.fragment_shader,
            dedup: args.dedup.into(),
            initial_mode: if args.orthographic {
                ProjectionMode::Orthographic
            } else {
                ProjectionMode::Perspective
            },
            target_fps: args.fps,
            max_frames: args.max_frames,
            log_filter: args.log,
            log_style: args.color.into(),
        }
    }
}

/// Center the models on the origin along X and color them from the palette
pub fn layout(paths: Vec<PathBuf>) -> Vec<ModelSpec> {
    let center = (paths.len() as f32 - 1.0) / 2.0;
    paths
        .into_iter()
        .enumerate()
        .map(|(i, path)| ModelSpec {
            path,
            position: Vector3::new((i as f32 - center) * MODEL_SPACING, 0.0, 0.0),
            color: Vector3::from(PALETTE[i % PALETTE.len()]),
        })
        .collect()
}
