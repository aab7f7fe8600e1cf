//! Core data structures flowing through `brush-trace`.
//!
//! - [`particle`] – Tagged particle kinds and single particle records.
//! - [`frame`] – One timestep of a trajectory, with chain grouping.
//! - [`profile`] – Per-height counts for monomers and nanoparticles.
//! - [`loading`] – Inside/outside nanoparticle tallies and the interface height.
//! - [`voxel`] – Dense 3D occupancy grids.
//! - [`system`] – Simulation box dimensions.
//! - [`run`] – Parameter keys identifying simulation runs.
//!
//! Raw frames are transient; everything else is an aggregate built from a
//! stream of them by [`crate::analysis`].

pub mod frame;
pub mod loading;
pub mod particle;
pub mod profile;
pub mod run;
pub mod system;
pub mod voxel;
