//! armvis - six-axis arm viewer for the terminal
//!
//! Controls:
//!   - 1-9: select a joint, +/-: move it within its limits
//!   - m: toggle skeleton/detailed view, p: next preset, d: demo motion
//!   - r: reset to home, arrow keys: orbit the camera, q/ESC: quit

use anyhow::{Context, Result};
use armvis_core::{parse_str, KinematicModel, RenderMode};
use armvis_terminal::{presets, AppOptions, TerminalApp};
use clap::Parser;
use std::path::PathBuf;

const BUNDLED_ARM: &str = include_str!("../../urdf/six_axis_arm.urdf");

#[derive(Parser)]
#[command(name = "armvis")]
#[command(about = "Interactive forward-kinematics viewer for URDF arms", long_about = None)]
struct Cli {
    /// URDF file to load (default: the bundled six-axis arm)
    urdf: Option<PathBuf>,

    /// Initial view: skeleton or detailed
    #[arg(short, long, default_value_t = RenderMode::Skeleton)]
    mode: RenderMode,

    /// Start from a named joint configuration
    #[arg(short, long)]
    preset: Option<String>,

    /// Start the automated demo motion
    #[arg(long)]
    demo: bool,

    /// Print the available presets and exit
    #[arg(long)]
    list_presets: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_presets {
        list_presets();
        return Ok(());
    }

    let model = load_model(cli.urdf.as_ref())?;

    let preset = match cli.preset.as_deref() {
        Some(name) => match presets::find(name) {
            Some((index, _)) => Some(index),
            None => anyhow::bail!("Unknown preset '{}' (try --list-presets)", name),
        },
        None => None,
    };

    let mut app = TerminalApp::new(
        model,
        AppOptions {
            mode: cli.mode,
            preset,
            demo: cli.demo,
        },
    )?;
    app.run()?;

    Ok(())
}

fn load_model(path: Option<&PathBuf>) -> Result<KinematicModel> {
    match path {
        Some(path) => armvis_core::load(path)
            .with_context(|| format!("Failed to load URDF from {}", path.display())),
        None => parse_str(BUNDLED_ARM).context("Bundled arm description is invalid"),
    }
}

fn list_presets() {
    println!("Available presets:");
    for preset in &presets::PRESETS {
        let angles: Vec<String> = preset.angles.iter().map(|a| format!("{a:.3}")).collect();
        println!("  {:<10} {}", preset.name, preset.description);
        println!("  {:<10} [{}]", "", angles.join(", "));
    }
}
