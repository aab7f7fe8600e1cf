mod config;
mod error;
mod interface;
mod loading;
mod overlap;
mod profile;
mod structure;
mod voxel;

pub use config::{AnalysisConfig, InterfaceMethod};
pub use error::Error;
pub use interface::{
    default_start_index, detect_interface, gradient, inflection_height, threshold_height,
};
pub use loading::{LoadingSeries, LoadingWindow, NanoparticleTrack, loading_pass};
pub use overlap::{OverlapClassifier, cap_fraction, cap_volume, sphere_volume};
pub use profile::{AveragedProfile, EquilibratedAverage, ProfileBinning, RollingProfile};
pub use structure::{
    RadialHistogram, Spectrum2d, cumulative_cutoff, radial_distribution, spatial_spectrum,
};
pub use voxel::{VoxelAccumulator, VoxelReport};

use crate::io::error::Error as IoError;
use crate::io::trajectory::TrajectoryReader;
use crate::model::frame::Frame;
use crate::model::loading::InterfaceReference;
use crate::model::particle::ParticleKind;
use crate::model::profile::DensityProfile;
use crate::model::system::SystemDimensions;
use std::io::BufRead;

/// Equilibrated mean profile together with the rolling mean of the final
/// frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileSummary {
    pub averaged: AveragedProfile,
    /// Mean monomer profile of the last `profile_window` frames.
    pub recent: DensityProfile,
    /// Highest monomer z of every frame, in order.
    pub peaks: Vec<Option<f64>>,
}

/// Bins every frame and averages the profiles left after warm-up.
///
/// `total_frames` is the frame count of the whole trajectory (see
/// [`TrajectoryReader::count_frames`]); the warm-up is
/// `floor(total_frames * equil_percent)` frames.
pub fn profile_trajectory<I>(
    frames: I,
    total_frames: usize,
    config: &AnalysisConfig,
) -> Result<ProfileSummary, Error>
where
    I: IntoIterator<Item = Result<Frame, IoError>>,
{
    let binning = ProfileBinning::new(config.bin_length, config.max_height);
    let mut average = EquilibratedAverage::new(&binning, config.equil_percent, total_frames);
    let mut rolling = RollingProfile::new(config.profile_window, binning.total_bins());
    let mut peaks = Vec::new();

    for frame in frames {
        let profile = binning.profile_frame(&frame?);
        rolling.push(profile.monomer.clone());
        peaks.push(profile.peak_monomer_z);
        average.push(profile);
    }

    let averaged = average.finish()?;
    log::info!(
        "profile pass: {} frames averaged, {} skipped as warm-up",
        averaged.frames,
        averaged.skipped
    );
    Ok(ProfileSummary {
        averaged,
        recent: rolling.mean(),
        peaks,
    })
}

/// Interface height of an averaged monomer profile under `config.interface`.
pub fn interface_height(
    averaged: &AveragedProfile,
    config: &AnalysisConfig,
) -> Result<InterfaceReference, Error> {
    let height = detect_interface(&averaged.monomer, config.bin_length, &config.interface)?;
    log::info!("interface detected at height {height}");
    Ok(InterfaceReference(height))
}

/// Full loading analysis of one trajectory. `open` is called once per pass
/// over the same file: a frame count, the profile pass, then classification
/// against the detected interface.
pub fn measure_loading<R, F>(mut open: F, config: &AnalysisConfig) -> Result<LoadingSeries, Error>
where
    R: BufRead,
    F: FnMut() -> Result<TrajectoryReader<R>, IoError>,
{
    let total_frames = open()?.count_frames()?;
    let summary = profile_trajectory(open()?, total_frames, config)?;
    let reference = interface_height(&summary.averaged, config)?;
    loading_pass(open()?, reference, config.np_radius, config.window_frames)
}

/// Voxel pass over the equilibrated part of a trajectory.
pub fn accumulate_voxels<R: BufRead>(
    reader: &mut TrajectoryReader<R>,
    dims: SystemDimensions,
    config: &AnalysisConfig,
) -> Result<VoxelReport, Error> {
    VoxelAccumulator::new(
        dims,
        config.voxel_size,
        config.equil_percent,
        config.estimated_frames,
    )
    .accumulate(reader)
}

/// Pairwise monomer distances of one frame, restricted to the monomers
/// above the cumulative cutoff of `profile`.
pub fn frame_structure(
    frame: &Frame,
    profile: &DensityProfile,
    dims: SystemDimensions,
    config: &AnalysisConfig,
) -> Result<(f64, RadialHistogram), Error> {
    let cutoff = cumulative_cutoff(profile, config.bin_length, config.rdp_top_fraction)
        .ok_or(Error::EmptyProfile)?;
    let positions: Vec<[f64; 3]> = frame
        .of_kind(ParticleKind::Monomer)
        .map(|p| p.position)
        .collect();
    let histogram = radial_distribution(&positions, cutoff, config.rdp_bins, dims.lateral_span());
    Ok((cutoff, histogram))
}
