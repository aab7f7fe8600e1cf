//! Readers for simulator output.
//!
//! - [`trajectory`] – Streaming frame reader over the multi-frame `.xyz` dump.
//! - [`descriptor`] – System dimensions from the `.mpd` descriptor and the
//!   naming convention tying a descriptor to its trajectory.

use std::fmt;

pub mod descriptor;
pub mod error;
pub mod trajectory;

pub use descriptor::{RunFiles, locate_descriptor, read_dimensions, trajectory_path};
pub use trajectory::{StreamStats, TrajectoryReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Trajectory,
    Descriptor,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Trajectory => write!(f, "trajectory"),
            Format::Descriptor => write!(f, "descriptor"),
        }
    }
}
