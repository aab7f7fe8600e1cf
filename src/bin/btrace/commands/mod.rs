mod batch;
mod height;
mod loading;
mod structure;
mod voxels;

use batch::run_batch;
use height::run_height;
use loading::run_loading;
use structure::run_structure;
use voxels::run_voxels;

use anyhow::{Context, Result};

use brush_trace::{
    AnalysisConfig, InterfaceMethod, InterfaceReference, ProfileSummary, RunFiles, StreamStats,
    interface_height, profile_trajectory,
};

use crate::cli::Command;
use crate::display::Context as DisplayContext;
use crate::io::{count_frames, open_trajectory};

pub fn dispatch(command: Command, ctx: DisplayContext) -> Result<()> {
    match command {
        Command::Height(args) => run_height(args, ctx),
        Command::Loading(args) => run_loading(args, ctx),
        Command::Voxels(args) => run_voxels(args, ctx),
        Command::Structure(args) => run_structure(args, ctx),
        Command::Batch(args) => run_batch(args, ctx),
    }
}

/// Outcome of the first streaming pass over a trajectory.
struct ProfilePass {
    summary: ProfileSummary,
    stats: StreamStats,
    particles_per_frame: usize,
}

fn profile_pass(files: &RunFiles, config: &AnalysisConfig) -> Result<ProfilePass> {
    let total_frames = count_frames(&files.trajectory)?;
    let mut reader = open_trajectory(&files.trajectory, config.expected_groups)?;
    let particles_per_frame = reader.particles_per_frame();
    let summary = profile_trajectory(reader.by_ref(), total_frames, config).with_context(|| {
        format!(
            "Profile pass over {} failed",
            files.trajectory.display()
        )
    })?;
    Ok(ProfilePass {
        summary,
        stats: reader.stats(),
        particles_per_frame,
    })
}

fn detect_interface(pass: &ProfilePass, config: &AnalysisConfig) -> Result<InterfaceReference> {
    interface_height(&pass.summary.averaged, config).context("Interface detection failed")
}

fn profile_substeps(pass: &ProfilePass) -> Vec<String> {
    let stats = &pass.stats;
    let mut steps = vec![
        format!(
            "Stream {} frames ({} particles each)",
            stats.frames, pass.particles_per_frame
        ),
        format!(
            "Average {} frames after {} warm-up",
            pass.summary.averaged.frames, pass.summary.averaged.skipped
        ),
    ];
    if stats.skipped_lines > 0 {
        steps.push(format!("Skip {} malformed particle lines", stats.skipped_lines));
    }
    if stats.truncated {
        steps.push("Drop truncated final frame".to_string());
    }
    steps
}

fn interface_substeps(reference: InterfaceReference, config: &AnalysisConfig) -> Vec<String> {
    let method = match config.interface {
        InterfaceMethod::Threshold { top_density, .. } => {
            format!("Threshold crossing below {}", top_density)
        }
        InterfaceMethod::Inflection { start_offset } => {
            format!("Inflection point after bin {}", start_offset)
        }
    };
    vec![method, format!("Interface height {:.3}", reference.height())]
}

fn run_substeps(files: &RunFiles) -> Vec<String> {
    let [lx, ly, lz] = files.dimensions.lengths();
    vec![
        format!("Read descriptor {}", files.descriptor.display()),
        format!("Box {:.1} × {:.1} × {:.1}", lx, ly, lz),
    ]
}
