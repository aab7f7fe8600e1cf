use std::io::Write;

use anyhow::{Context, Result};

use crate::cli::HeightArgs;
use crate::config::build_analysis_config;
use crate::display::{Context as DisplayContext, Progress, print_profile_summary, print_run_info};
use crate::io::{create_output, output_label, resolve_run, write_profile};

use super::{detect_interface, interface_substeps, profile_pass, profile_substeps, run_substeps};

const TOTAL_STEPS: u8 = 4;

pub fn run_height(args: HeightArgs, ctx: DisplayContext) -> Result<()> {
    let config = build_analysis_config(&args.analysis, Some(&args.interface))?;

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

    progress.step("Writing profile");
    let mut out = create_output(args.run.output.as_deref())?;
    write_profile(
        &mut out,
        &pass.summary,
        config.bin_length,
        files.dimensions,
        reference.height(),
    )
    .and_then(|()| out.flush())
    .context("Failed to write profile")?;
    progress.complete_with(
        "Writing profile",
        &[format!("Write profile → {}", output_label(args.run.output.as_deref()))],
    );

    progress.finish();

    Ok(())
}
