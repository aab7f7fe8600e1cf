//! Tab-delimited text outputs. Comment lines start with `#` so the files
//! load directly into numpy or gnuplot.

use std::io::{self, Write};

use brush_trace::{
    LoadingSeries, ParticleKind, ProfileSummary, RadialHistogram, Spectrum2d, SystemDimensions,
    VoxelReport,
};

fn opt(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |v| format!("{v:.6}"))
}

/// Averaged and recent profiles, one row per bin.
pub fn write_profile(
    out: &mut impl Write,
    summary: &ProfileSummary,
    bin_length: f64,
    dims: SystemDimensions,
    interface_height: f64,
) -> io::Result<()> {
    writeln!(out, "# interface_height\t{interface_height:.6}")?;
    writeln!(
        out,
        "# frames\t{}\tskipped\t{}",
        summary.averaged.frames, summary.averaged.skipped
    )?;
    writeln!(out, "# mean_peak_z\t{}", opt(summary.averaged.mean_peak_z))?;
    writeln!(
        out,
        "# mean_chain_height\t{}",
        opt(summary.averaged.mean_chain_height)
    )?;
    writeln!(
        out,
        "z\tmonomer\tnanoparticle\tmonomer_density\tnanoparticle_density\trecent_monomer"
    )?;

    let area = dims.area();
    let monomer = &summary.averaged.monomer;
    let nanoparticle = &summary.averaged.nanoparticle;
    let monomer_density = monomer.to_density(area, bin_length);
    let nanoparticle_density = nanoparticle.to_density(area, bin_length);

    for i in 0..monomer.len() {
        writeln!(
            out,
            "{:.6}\t{:.6}\t{:.6}\t{:.6e}\t{:.6e}\t{:.6}",
            i as f64 * bin_length,
            monomer.bins[i],
            nanoparticle.bins[i],
            monomer_density.bins[i],
            nanoparticle_density.bins[i],
            summary.recent.bins.get(i).copied().unwrap_or(0.0),
        )?;
    }
    Ok(())
}

/// One row per loading window, fractions per frame of the window.
pub fn write_loading(
    out: &mut impl Write,
    series: &LoadingSeries,
    dims: SystemDimensions,
) -> io::Result<()> {
    let height = series.reference.height();
    writeln!(out, "# interface_height\t{height:.6}")?;
    writeln!(out, "# np_radius\t{:.6}", series.radius)?;
    writeln!(out, "frame\tinside\toutside\tembedding\tbrush_phi\tsolvent_phi")?;
    for window in &series.windows {
        let (brush, solvent) = window.volume_fractions(series.radius, dims, height);
        writeln!(
            out,
            "{}\t{:.6}\t{:.6}\t{}\t{}\t{}",
            window.first_frame,
            window.distribution.inside,
            window.distribution.outside,
            opt(window.embedding_ratio()),
            opt(brush),
            opt(solvent),
        )?;
    }
    Ok(())
}

/// Mean position and RMS fluctuation of every nanoparticle.
pub fn write_tracks(out: &mut impl Write, series: &LoadingSeries) -> io::Result<()> {
    writeln!(out, "np\tx\ty\tz\trms\tsamples")?;
    for (i, track) in series.tracks.iter().enumerate() {
        let [x, y, z] = track.mean;
        writeln!(
            out,
            "{i}\t{x:.6}\t{y:.6}\t{z:.6}\t{:.6}\t{}",
            track.rms, track.samples
        )?;
    }
    Ok(())
}

/// Non-empty voxels of the per-frame averaged grid.
pub fn write_voxels(
    out: &mut impl Write,
    report: &VoxelReport,
    interface_height: f64,
) -> io::Result<()> {
    let [nx, ny, nz] = report.grid.shape();
    writeln!(out, "# interface_height\t{interface_height:.6}")?;
    writeln!(out, "# shape\t{nx}\t{ny}\t{nz}")?;
    writeln!(
        out,
        "# frames\t{}\twarmup\t{}",
        report.frames, report.warmup_frames
    )?;
    writeln!(out, "x\ty\tz\tmonomer\tnanoparticle")?;
    for x in 0..nx {
        for y in 0..ny {
            for z in 0..nz {
                let monomer = report.grid.get(x, y, z, ParticleKind::Monomer);
                let nanoparticle = report.grid.get(x, y, z, ParticleKind::Nanoparticle);
                if monomer != 0.0 || nanoparticle != 0.0 {
                    writeln!(out, "{x}\t{y}\t{z}\t{monomer:.6}\t{nanoparticle:.6}")?;
                }
            }
        }
    }
    Ok(())
}

/// The spectrum as an `nx` by `ny` matrix.
pub fn write_spectrum(out: &mut impl Write, spectrum: &Spectrum2d, layer: usize) -> io::Result<()> {
    writeln!(out, "# spectrum_layer\t{layer}")?;
    for x in 0..spectrum.nx {
        let row: Vec<String> = (0..spectrum.ny)
            .map(|y| format!("{:.6}", spectrum.get(x, y)))
            .collect();
        writeln!(out, "{}", row.join("\t"))?;
    }
    Ok(())
}

pub fn write_histogram(
    out: &mut impl Write,
    histogram: &RadialHistogram,
    cutoff: f64,
) -> io::Result<()> {
    writeln!(out, "# z_cutoff\t{cutoff:.6}")?;
    writeln!(out, "# overflow\t{}", histogram.overflow)?;
    writeln!(out, "r\tcount")?;
    for (edge, count) in histogram.edges().zip(&histogram.counts) {
        writeln!(out, "{edge:.6}\t{count}")?;
    }
    Ok(())
}
