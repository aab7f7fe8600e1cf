//! Streaming analysis of polymer-brush and nanoparticle trajectory dumps.
//! It turns multi-gigabyte, append-only frame files into density profiles, a
//! detected brush interface height, nanoparticle loading inside and outside
//! the brush, and 3D voxel densities for structural analysis.
//!
//! # Features
//!
//! - **Streaming reader** – Frames are read one at a time with line-position
//!   framing; malformed particle lines are skipped and counted
//! - **Density profiles** – Equilibrated and rolling z profiles per particle kind
//! - **Interface detection** – Threshold crossing or inflection point of the
//!   monomer profile, with explicit failure when neither applies
//! - **Loading** – Spherical-cap apportioning of nanoparticles straddling the
//!   interface, embedding ratios and volume fractions
//! - **Voxels and structure** – Periodic-wrapped 3D occupancy grids, radial
//!   distance histograms and centred 2D spectra
//!
//! # Quick Start
//!
//! ```
//! use brush_trace::{AnalysisConfig, InterfaceMethod, TrajectoryReader};
//! use brush_trace::{interface_height, loading_pass, profile_trajectory};
//! use std::io::Cursor;
//!
//! // One chain of four monomers and two nanoparticles, repeated for 3 frames.
//! let frame = "7\nbrush\n\
//!              0 0 0 0\n\
//!              1 0 0 0.5\n1 0 0 1.5\n1 0 0 2.5\n1 0 0 3.5\n\
//!              2 0 0 1.0\n2 0 0 8.0\n";
//! let text = frame.repeat(3);
//!
//! let config = AnalysisConfig {
//!     bin_length: 1.0,
//!     max_height: 10.0,
//!     equil_percent: 0.0,
//!     interface: InterfaceMethod::Threshold {
//!         top_density: 1.0,
//!         min_start_index: Some(0),
//!     },
//!     np_radius: 0.5,
//!     ..Default::default()
//! };
//!
//! // Count frames without parsing them, so the warm-up is known up front.
//! let total = TrajectoryReader::new(Cursor::new(text.as_bytes()))?.count_frames()?;
//!
//! // First pass: averaged monomer profile and interface height.
//! let reader = TrajectoryReader::new(Cursor::new(text.as_bytes()))?;
//! let summary = profile_trajectory(reader, total, &config)?;
//! let reference = interface_height(&summary.averaged, &config)?;
//! assert_eq!(reference.height(), 4.0);
//!
//! // Second pass: classify nanoparticles against that height.
//! let reader = TrajectoryReader::new(Cursor::new(text.as_bytes()))?;
//! let series = loading_pass(reader, reference, config.np_radius, config.window_frames)?;
//! assert_eq!(series.windows.len(), 3);
//! assert_eq!(series.embedding_ratio(), Some(0.5));
//! # Ok::<(), brush_trace::AnalysisError>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] – Trajectory reader, `.mpd` descriptor parsing and run file layout
//! - [`AnalysisConfig`] – Every tunable of the analysis passes, TOML-loadable
//! - [`profile_trajectory`], [`interface_height`], [`loading_pass`],
//!   [`accumulate_voxels`], [`frame_structure`] – The analysis passes
//!
//! # Data Types
//!
//! - [`Particle`], [`ParticleKind`], [`Frame`] – Parsed trajectory records
//! - [`DensityProfile`], [`FrameProfile`] – Per-height counts
//! - [`LoadingDistribution`], [`InterfaceReference`] – Loading tallies
//! - [`VoxelGrid`], [`SystemDimensions`] – Spatial grids and box lengths
//! - [`RunKey`], [`RunTable`] – Parameter-keyed results of many runs

mod analysis;
mod model;

pub mod io;

pub use model::frame::Frame;
pub use model::loading::{InterfaceReference, LoadingDistribution};
pub use model::particle::{ParseParticleKindError, Particle, ParticleKind};
pub use model::profile::{DensityProfile, FrameProfile};
pub use model::run::{RunKey, RunTable};
pub use model::system::SystemDimensions;
pub use model::voxel::{VOXEL_KINDS, VoxelGrid};

pub use io::{RunFiles, StreamStats, TrajectoryReader};

pub use analysis::{
    AnalysisConfig, AveragedProfile, EquilibratedAverage, InterfaceMethod, LoadingSeries,
    LoadingWindow, NanoparticleTrack, OverlapClassifier, ProfileBinning, ProfileSummary,
    RadialHistogram, RollingProfile, Spectrum2d, VoxelAccumulator, VoxelReport,
    accumulate_voxels, cap_fraction, cap_volume, cumulative_cutoff, default_start_index,
    detect_interface, frame_structure, gradient, inflection_height, interface_height,
    loading_pass, measure_loading, profile_trajectory, radial_distribution, sphere_volume,
    spatial_spectrum, threshold_height,
};

pub use analysis::Error as AnalysisError;
pub use io::error::Error as IoError;
