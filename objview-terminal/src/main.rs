//! objview - spinning OBJ models in the terminal
//!
//! Controls:
//!   - C: Toggle perspective / orthographic camera
//!   - Q/ESC: Quit

use anyhow::Result;
use clap::Parser;
use objview_terminal::logging::{init_logging, LoggingConfig};
use objview_terminal::{AppConfig, Args, TerminalApp};

fn main() -> Result<()> {
    let config = AppConfig::from(Args::parse());

    init_logging(LoggingConfig {
        env_filter: config.log_filter.clone(),
        write_style: config.log_style,
    });
    log::info!(
        "{} model(s), dedup {:?}, starting {}",
        config.models.len(),
        config.dedup,
        config.initial_mode.name()
    );

    let summary = TerminalApp::new(config).run()?;

    println!(
        "Rendered {} frames, ended in {} mode",
        summary.frames,
        summary.mode.name()
    );
    Ok(())
}
