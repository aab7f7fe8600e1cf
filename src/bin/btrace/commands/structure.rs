use std::io::Write;

use anyhow::{Context, Result, bail};

use brush_trace::frame_structure;

use crate::cli::StructureArgs;
use crate::config::build_analysis_config;
use crate::display::{
    Context as DisplayContext, Progress, print_run_info, print_structure_summary,
};
use crate::io::{create_output, open_trajectory, output_label, resolve_run, write_histogram};

use super::{profile_pass, profile_substeps, run_substeps};

const TOTAL_STEPS: u8 = 4;

pub fn run_structure(args: StructureArgs, ctx: DisplayContext) -> Result<()> {
    let mut config = build_analysis_config(&args.analysis, None)?;
    if let Some(bins) = args.bins {
        config.rdp_bins = bins;
    }
    if let Some(fraction) = args.top_fraction {
        config.rdp_top_fraction = fraction;
    }
    config
        .validate()
        .context("Invalid structure settings")?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step("Locating run files");
    let files = resolve_run(&args.run)?;
    progress.complete_with("Locating run files", &run_substeps(&files));

    progress.step("Averaging density profile");
    let pass = profile_pass(&files, &config)?;
    progress.complete_with("Averaging density profile", &profile_substeps(&pass));

    if ctx.interactive {
        print_run_info(&files, pass.particles_per_frame);
    }

    progress.step("Measuring pair distances");
    let frames = pass.stats.frames;
    if frames == 0 {
        bail!("Trajectory {} holds no complete frame", files.trajectory.display());
    }
    let mut reader = open_trajectory(&files.trajectory, None)?;
    reader
        .skip_frames(frames - 1)
        .context("Failed to seek to the last frame")?;
    let Some(frame) = reader.next() else {
        bail!("Trajectory {} ended before its last frame", files.trajectory.display());
    };
    let frame = frame.context("Failed to read the last frame")?;
    let (cutoff, histogram) =
        frame_structure(&frame, &pass.summary.averaged.monomer, files.dimensions, &config)
            .context("Structure analysis failed")?;
    progress.complete_with(
        "Measuring pair distances",
        &[
            format!("Keep monomers of frame {} above z = {:.3}", frame.index, cutoff),
            format!(
                "Histogram {} pairs into {} bins",
                histogram.pairs(),
                histogram.counts.len()
            ),
        ],
    );

    if ctx.interactive {
        print_structure_summary(frame.index, cutoff, &histogram);
    }

    progress.step("Writing histogram");
    let mut out = create_output(args.run.output.as_deref())?;
    write_histogram(&mut out, &histogram, cutoff)
        .and_then(|()| out.flush())
        .context("Failed to write histogram")?;
    progress.complete_with(
        "Writing histogram",
        &[format!(
            "Write histogram → {}",
            output_label(args.run.output.as_deref())
        )],
    );

    progress.finish();

    Ok(())
}
