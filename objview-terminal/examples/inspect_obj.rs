//! Example: Print statistics for an OBJ file without opening the renderer
//!
//! Usage: cargo run --example inspect_obj -- path/to/model.obj [--dedup hashed]

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use objview_core::{load_obj_with, DedupStrategy};
use objview_terminal::config::CliDedup;

#[derive(Parser, Debug)]
#[command(about = "Print vertex, index and triangle counts for an OBJ file")]
struct Args {
    /// OBJ file to inspect
    path: PathBuf,

    /// Vertex deduplication strategy.
    #[arg(long, default_value = "linear", value_enum)]
    dedup: CliDedup,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let strategy = DedupStrategy::from(args.dedup);

    let start = Instant::now();
    let mesh = load_obj_with(&args.path, strategy)
        .with_context(|| format!("loading {}", args.path.display()))?;
    let elapsed = start.elapsed();

    println!("{} ({strategy:?}, {elapsed:.2?})", args.path.display());
    println!("  vertices:  {}", mesh.vertices.len());
    println!("  indices:   {}", mesh.indices.len());
    println!("  triangles: {}", mesh.triangle_count());
    if !mesh.vertices.is_empty() {
        println!(
            "  dedup ratio: {:.2} corners per vertex",
            mesh.indices.len() as f32 / mesh.vertices.len() as f32
        );
    }
    Ok(())
}
