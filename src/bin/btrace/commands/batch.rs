use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use rayon::prelude::*;

use brush_trace::{
    AnalysisConfig, LoadingDistribution, RunFiles, RunKey, RunTable, interface_height,
    loading_pass, profile_trajectory,
};

use crate::cli::BatchArgs;
use crate::config::build_analysis_config;
use crate::display::{Context as DisplayContext, Progress, print_batch_summary};
use crate::io::{count_frames, create_output, open_trajectory, output_label};

const TOTAL_STEPS: u8 = 2;

/// Loading totals of one finished run.
#[derive(Debug, Clone, Copy)]
struct RunSummary {
    frames: usize,
    height: f64,
    radius: f64,
    total: LoadingDistribution,
    brush_phi: Option<f64>,
    solvent_phi: Option<f64>,
}

pub fn run_batch(args: BatchArgs, ctx: DisplayContext) -> Result<()> {
    let config = build_analysis_config(&args.analysis, Some(&args.interface))?;
    let radius_from_path = args.analysis.radius.is_none();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.jobs.unwrap_or(0))
        .build()
        .context("Failed to start worker threads")?;

    let mut progress = Progress::new(ctx.interactive, TOTAL_STEPS);

    progress.step(&format!("Analysing {} runs", args.dirs.len()));
    let outcomes: Vec<(PathBuf, Result<(RunKey, RunSummary)>)> = pool.install(|| {
        args.dirs
            .par_iter()
            .map(|dir| (dir.clone(), analyze_run(dir, &config, radius_from_path)))
            .collect()
    });

    let mut table: RunTable<RunSummary> = RunTable::new();
    let mut failures = Vec::new();
    for (dir, outcome) in outcomes {
        match outcome {
            Ok((key, summary)) => {
                if table.insert(key, summary).is_some() {
                    log::warn!("{}: run {} analysed twice, keeping the later", dir.display(), key);
                }
            }
            Err(e) => {
                log::error!("{}: {:#}", dir.display(), e);
                failures.push(format!("{}: {}", dir.display(), e));
            }
        }
    }
    let mut substeps = vec![format!(
        "Analysed {} runs on {} threads",
        table.len(),
        pool.current_num_threads()
    )];
    substeps.extend(failures.iter().map(|f| format!("Failed {}", f)));
    progress.complete_with(&format!("Analysing {} runs", args.dirs.len()), &substeps);

    if table.is_empty() {
        bail!("None of the {} run directories could be analysed", args.dirs.len());
    }

    if ctx.interactive {
        let rows: Vec<(RunKey, Option<f64>)> = table
            .iter()
            .map(|(key, summary)| (*key, summary.total.embedding_ratio()))
            .collect();
        print_batch_summary(&rows, failures.len());
    }

    progress.step("Writing run table");
    let mut out = create_output(args.output.as_deref())?;
    write_run_table(&mut out, &table)
        .and_then(|()| out.flush())
        .context("Failed to write run table")?;
    progress.complete_with(
        "Writing run table",
        &[format!(
            "Write {} rows → {}",
            table.len(),
            output_label(args.output.as_deref())
        )],
    );

    progress.finish();

    Ok(())
}

fn analyze_run(
    dir: &Path,
    config: &AnalysisConfig,
    radius_from_path: bool,
) -> Result<(RunKey, RunSummary)> {
    let key = RunKey::from_path(dir)
        .ok_or_else(|| anyhow!("path carries no Umin_/rad_/den_/NP_ run parameters"))?;

    let mut config = config.clone();
    if radius_from_path {
        config.np_radius = key.radius;
    }

    let files = RunFiles::locate(dir)
        .with_context(|| format!("Failed to locate run files in '{}'", dir.display()))?;

    let total_frames = count_frames(&files.trajectory)?;
    let first = open_trajectory(&files.trajectory, config.expected_groups)?;
    let summary =
        profile_trajectory(first, total_frames, &config).context("Profile pass failed")?;
    let reference =
        interface_height(&summary.averaged, &config).context("Interface detection failed")?;

    let second = open_trajectory(&files.trajectory, None)?;
    let series = loading_pass(second, reference, config.np_radius, config.window_frames)
        .context("Loading pass failed")?;
    let (brush_phi, solvent_phi) = series.volume_fractions(files.dimensions);

    log::info!(
        "{}: interface {:.3}, embedding {:?}",
        key,
        reference.height(),
        series.embedding_ratio()
    );

    Ok((
        key,
        RunSummary {
            frames: series.frames,
            height: reference.height(),
            radius: series.radius,
            total: series.total(),
            brush_phi,
            solvent_phi,
        },
    ))
}

fn write_run_table(out: &mut impl Write, table: &RunTable<RunSummary>) -> io::Result<()> {
    writeln!(
        out,
        "umin\tradius\tdensity\tgap\tlength\tnp\tframes\tinterface\tnp_radius\tinside\toutside\tembedding\tbrush_phi\tsolvent_phi"
    )?;
    for (key, run) in table {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{}\t{:.6}\t{:.6}\t{}\t{}\t{}",
            key.umin,
            key.radius,
            key.density,
            field(key.gap),
            field(key.length),
            key.np_count,
            run.frames,
            run.height,
            run.radius,
            run.total.inside,
            run.total.outside,
            field(run.total.embedding_ratio()),
            field(run.brush_phi),
            field(run.solvent_phi),
        )?;
    }
    Ok(())
}

fn field(value: Option<f64>) -> String {
    value.map_or_else(|| "nan".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(inside: f64, outside: f64) -> RunSummary {
        RunSummary {
            frames: 10,
            height: 40.0,
            radius: 2.0,
            total: LoadingDistribution { inside, outside },
            brush_phi: None,
            solvent_phi: Some(0.5),
        }
    }

    #[test]
    fn run_table_rows_follow_key_order() {
        let mut table = RunTable::new();
        for (path, inside) in [
            ("Umin_-0.1/rad_2/den_0.03/NP_64", 3.0),
            ("Umin_-0.2/rad_2/den_0.03/gap_1/NP_64", 1.0),
        ] {
            let key = RunKey::from_path(Path::new(path)).unwrap();
            table.insert(key, summary(inside, 1.0));
        }

        let mut buf = Vec::new();
        write_run_table(&mut buf, &table).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("umin\tradius\tdensity\tgap"));
        assert!(lines[1].starts_with("-0.2\t2\t0.03\t1\tnan\t64\t10\t40.000000\t2\t"));
        assert!(lines[2].starts_with("-0.1\t2\t0.03\tnan\tnan\t64\t"));
        assert!(lines[2].contains("\t0.75\tnan\t0.5"));
    }

    #[test]
    fn directory_without_parameters_is_rejected() {
        let err = analyze_run(Path::new("runs/plain"), &AnalysisConfig::default(), true)
            .unwrap_err();
        assert!(err.to_string().contains("run parameters"));
    }
}
