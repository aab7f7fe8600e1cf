use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use brush_trace::{LoadingSeries, loading_pass};

use crate::cli::LoadingArgs;
use crate::config::build_analysis_config;
use crate::display::{
    Context as DisplayContext, Progress, print_loading_summary, print_profile_summary,
    print_run_info,
};
use crate::io::{
    create_output, open_trajectory, output_label, resolve_run, write_loading, write_tracks,
};

use super::{detect_interface, interface_substeps, profile_pass, profile_substeps, run_substeps};

const TOTAL_STEPS: u8 = 5;

pub fn run_loading(args: LoadingArgs, ctx: DisplayContext) -> Result<()> {
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

    progress.step("Classifying nanoparticles");
    let reader = open_trajectory(&files.trajectory, None)?;
    let series = loading_pass(reader, reference, config.np_radius, config.window_frames)
        .context("Loading pass failed")?;
    progress.complete_with("Classifying nanoparticles", &classify_substeps(&series));

    let (brush_phi, solvent_phi) = series.volume_fractions(files.dimensions);
    if ctx.interactive {
        print_loading_summary(&series, brush_phi, solvent_phi);
    }

    progress.step("Writing loading series");
    let mut out = create_output(args.run.output.as_deref())?;
    write_loading(&mut out, &series, files.dimensions)
        .and_then(|()| out.flush())
        .context("Failed to write loading series")?;
    let mut written = vec![format!(
        "Write loading series → {}",
        output_label(args.run.output.as_deref())
    )];
    if let Some(path) = &args.tracks {
        write_track_file(path, &series)?;
        written.push(format!("Write nanoparticle tracks → {}", output_label(Some(path))));
    }
    progress.complete_with("Writing loading series", &written);

    progress.finish();

    Ok(())
}

fn classify_substeps(series: &LoadingSeries) -> Vec<String> {
    vec![
        format!(
            "Apportion caps of radius {} across height {:.3}",
            series.radius,
            series.reference.height()
        ),
        format!(
            "Close {} windows over {} frames",
            series.windows.len(),
            series.frames
        ),
        format!("Track {} nanoparticles", series.tracks.len()),
    ]
}

fn write_track_file(path: &Path, series: &LoadingSeries) -> Result<()> {
    let mut out = create_output(Some(path))?;
    write_tracks(&mut out, series)
        .and_then(|()| out.flush())
        .with_context(|| format!("Failed to write tracks: {}", path.display()))
}
