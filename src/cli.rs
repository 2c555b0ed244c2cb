// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::config::PresentModeSetting;

/// Every flag is optional; unset flags fall back to the config file, then defaults
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "ray-viewer")]
#[command(about = "Interactive WebGPU ray-tracing viewer", long_about = None)]
pub struct Cli {
    /// Scene preset (showcase, single-sphere)
    #[arg(long, env = "SCENE")]
    pub scene: Option<String>,

    /// Initial window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Camera movement per frame while a key is held
    #[arg(long)]
    pub speed: Option<f32>,

    /// Pointer units per radian of camera rotation
    #[arg(long)]
    pub sensitivity: Option<f32>,

    #[arg(long, value_enum)]
    pub present_mode: Option<PresentModeSetting>,

    /// Seconds between frame statistics log lines (0 disables them)
    #[arg(long)]
    pub stats_interval: Option<f32>,

    /// JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}
