use std::io::Write;

use anyhow::{Context, Result, anyhow};

use brush_trace::{ParticleKind, Spectrum2d, VoxelReport, accumulate_voxels, spatial_spectrum};

use crate::cli::{KindArg, VoxelArgs};
use crate::config::{build_analysis_config, voxel_size};
use crate::display::{
    Context as DisplayContext, Progress, print_profile_summary, print_run_info, print_voxel_summary,
};
use crate::io::{
    create_output, open_trajectory, output_label, resolve_run, write_spectrum, write_voxels,
};

use super::{detect_interface, interface_substeps, profile_pass, profile_substeps, run_substeps};

const TOTAL_STEPS: u8 = 5;

pub fn run_voxels(args: VoxelArgs, ctx: DisplayContext) -> Result<()> {
    let mut config = build_analysis_config(&args.analysis, Some(&args.interface))?;
    if let Some(values) = &args.voxel_size {
        config.voxel_size = voxel_size(values)?;
        config
            .validate()
            .context("Invalid analysis settings after applying --voxel-size")?;
    }

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Locating run files");
    let files = resolve_run(&args.run)?;
    progress.complete_with("Locating run files", &run_substeps(&files));

    progress.step("Averaging density profile");
    let pass = profile_pass(&files, &config)?;
    progress.complete_with("Averaging density profile", &profile_substeps(&pass));

    progress.step("Detecting interface");
    let reference = detect_interface(&pass, &config)?;
    progress.complete_with("Detecting interface", &interface_substeps(reference, &config));

    if ctx.interactive {
        print_run_info(&files, pass.particles_per_frame);
        print_profile_summary(&pass.summary, reference.height(), &pass.stats);
    }

    progress.step("Binning voxels");
    let mut reader = open_trajectory(&files.trajectory, None)?;
    let report =
        accumulate_voxels(&mut reader, files.dimensions, &config).context("Voxel pass failed")?;
    let spectrum = match args.spectrum_layer {
        Some(layer) => Some((layer, layer_spectrum(&report, layer, args.spectrum_kind)?)),
        None => None,
    };
    progress.complete_with("Binning voxels", &voxel_substeps(&report, &config.voxel_size));

    if ctx.interactive {
        print_voxel_summary(&report);
    }

    progress.step("Writing voxel grid");
    let mut written = Vec::new();
    let mut out = create_output(args.run.output.as_deref())?;
    write_voxels(&mut out, &report, reference.height()).context("Failed to write voxel grid")?;
    written.push(format!(
        "Write voxel grid → {}",
        output_label(args.run.output.as_deref())
    ));

    if let Some((layer, spectrum)) = &spectrum {
        match &args.spectrum_output {
            Some(path) => {
                let mut spectrum_out = create_output(Some(path))?;
                write_spectrum(&mut spectrum_out, spectrum, *layer)
                    .and_then(|()| spectrum_out.flush())
                    .context("Failed to write spectrum")?;
            }
            None => {
                write_spectrum(&mut out, spectrum, *layer).context("Failed to write spectrum")?;
            }
        }
        let target = args
            .spectrum_output
            .as_deref()
            .or(args.run.output.as_deref());
        written.push(format!("Write layer {} spectrum → {}", layer, output_label(target)));
    }
    out.flush().context("Failed to write voxel grid")?;
    progress.complete_with("Writing voxel grid", &written);

    progress.finish();

    Ok(())
}

fn layer_spectrum(report: &VoxelReport, layer: usize, kind: KindArg) -> Result<Spectrum2d> {
    let kind = match kind {
        KindArg::Monomer => ParticleKind::Monomer,
        KindArg::Nanoparticle => ParticleKind::Nanoparticle,
    };
    let [_, _, nz] = report.grid.shape();
    spatial_spectrum(&report.grid, layer, kind)
        .ok_or_else(|| anyhow!("Spectrum layer {} is outside the grid of {} layers", layer, nz))
}

fn voxel_substeps(report: &VoxelReport, voxel_size: &[f64; 3]) -> Vec<String> {
    let [nx, ny, nz] = report.grid.shape();
    let mut steps = vec![
        format!(
            "Skip {} warm-up frames, bin {}",
            report.warmup_frames, report.frames
        ),
        format!(
            "Grid {} × {} × {} of {} × {} × {}",
            nx, ny, nz, voxel_size[0], voxel_size[1], voxel_size[2]
        ),
    ];
    if report.out_of_bounds > 0 {
        steps.push(format!(
            "Fold {} positions back through the periodic box",
            report.out_of_bounds
        ));
    }
    if report.incomplete {
        steps.push("Trajectory shorter than the estimated frame count".to_string());
    }
    steps
}
