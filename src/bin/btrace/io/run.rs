use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use brush_trace::{RunFiles, TrajectoryReader};

use crate::cli::RunOptions;

/// Resolves descriptor, trajectory and box dimensions from the run options.
///
/// An explicit `--descriptor` wins over the run directory; without either,
/// the directory of `--trajectory` (or the current directory) is searched.
pub fn resolve_run(opts: &RunOptions) -> Result<RunFiles> {
    let mut files = match (&opts.descriptor, &opts.run_dir) {
        (Some(descriptor), _) => RunFiles::from_descriptor(descriptor.clone())
            .with_context(|| format!("Failed to read descriptor: {}", descriptor.display()))?,
        (None, Some(dir)) => locate(dir)?,
        (None, None) => {
            let dir = opts
                .trajectory
                .as_deref()
                .map(search_dir)
                .unwrap_or_else(|| PathBuf::from("."));
            locate(&dir)?
        }
    };

    if let Some(trajectory) = &opts.trajectory {
        files.trajectory = trajectory.clone();
    }
    Ok(files)
}

fn locate(dir: &Path) -> Result<RunFiles> {
    RunFiles::locate(dir)
        .with_context(|| format!("Failed to locate run files in '{}'", dir.display()))
}

fn search_dir(trajectory: &Path) -> PathBuf {
    match trajectory.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Opens a trajectory for one streaming pass.
pub fn open_trajectory(
    path: &Path,
    expected_groups: Option<usize>,
) -> Result<TrajectoryReader<BufReader<File>>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open trajectory: {}", path.display()))?;
    let reader = TrajectoryReader::new(BufReader::new(file))
        .with_context(|| format!("Failed to read trajectory header: {}", path.display()))?;
    Ok(reader.expected_groups(expected_groups))
}

/// Complete frames in a trajectory, counted without parsing particles.
pub fn count_frames(path: &Path) -> Result<usize> {
    open_trajectory(path, None)?
        .count_frames()
        .with_context(|| format!("Failed to count frames in {}", path.display()))
}
