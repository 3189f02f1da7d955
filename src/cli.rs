use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "smp-gen", version, about = "Styled Map Package generation CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level (error|warn|info|debug|trace)
    #[arg(long, default_value = "info")]
    pub log: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the tile ranges and counts a package would contain.
    Plan(PlanArgs),
    /// Package a pre-rendered {z}/{x}/{y} tile directory into an SMP.
    Pack(PackArgs),
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Extent north edge, WGS84 degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub north: f64,

    /// Extent south edge, WGS84 degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub south: f64,

    /// Extent east edge, WGS84 degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub east: f64,

    /// Extent west edge, WGS84 degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub west: f64,

    #[arg(long, default_value_t = 0)]
    pub min_zoom: u8,

    #[arg(long)]
    pub max_zoom: u8,
}

#[derive(Debug, Args)]
pub struct PackArgs {
    /// Directory holding {z}/{x}/{y}.<format> tiles.
    pub tiles: PathBuf,

    /// Output .smp path (defaults to the tile directory name + .smp).
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Package name written into the style document.
    #[arg(long, default_value = "map")]
    pub name: String,

    /// Tile image format (png|jpg|webp).
    #[arg(long, default_value = "png")]
    pub format: String,

    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}
