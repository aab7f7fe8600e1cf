use super::error::Error;
use crate::io::trajectory::TrajectoryReader;
use crate::model::frame::Frame;
use crate::model::particle::ParticleKind;
use crate::model::system::SystemDimensions;
use crate::model::voxel::VoxelGrid;
use std::io::BufRead;

/// Per-frame average occupancy of a finished voxel pass.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelReport {
    pub grid: VoxelGrid,
    /// Post-warm-up frames binned.
    pub frames: usize,
    pub warmup_frames: usize,
    /// Monomer and nanoparticle records binned.
    pub particles: usize,
    /// Particles whose position needed a periodic correction.
    pub out_of_bounds: usize,
    /// Fewer frames were seen than the run was expected to write.
    pub incomplete: bool,
}

/// Bins monomers and nanoparticles of every equilibrated frame into a 3D
/// grid, folding positions that left the box back through the periodic
/// boundary.
#[derive(Debug, Clone)]
pub struct VoxelAccumulator {
    dims: [f64; 3],
    voxel_size: [f64; 3],
    estimated_frames: usize,
    warmup_frames: usize,
    grid: VoxelGrid,
    frames: usize,
    particles: usize,
    out_of_bounds: usize,
}

impl VoxelAccumulator {
    pub fn new(
        dims: SystemDimensions,
        voxel_size: [f64; 3],
        equil_percent: f64,
        estimated_frames: usize,
    ) -> Self {
        let lengths = dims.lengths();
        let shape = [0, 1, 2].map(|a| ((lengths[a] / voxel_size[a]).round() as usize).max(1));
        Self {
            dims: lengths,
            voxel_size,
            estimated_frames,
            warmup_frames: (estimated_frames as f64 * equil_percent).floor() as usize,
            grid: VoxelGrid::zeroed(shape),
            frames: 0,
            particles: 0,
            out_of_bounds: 0,
        }
    }

    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.grid.shape()
    }

    #[inline]
    pub fn warmup_frames(&self) -> usize {
        self.warmup_frames
    }

    /// First trajectory line past warm-up for `particles_per_frame`.
    #[inline]
    pub fn warmup_line(&self, particles_per_frame: usize) -> usize {
        self.warmup_frames * (particles_per_frame + 2)
    }

    /// Voxel of `position`, and whether a periodic correction was applied.
    pub fn voxel_index(&self, position: [f64; 3]) -> ([usize; 3], bool) {
        let shape = self.grid.shape();
        let mut wrapped = false;
        let mut index = [0usize; 3];
        for axis in 0..3 {
            let length = self.dims[axis];
            let mut c = position[axis];
            if c >= length {
                c -= length;
                wrapped = true;
            } else if c < 0.0 {
                c += length;
                wrapped = true;
            }
            let raw = (c / self.voxel_size[axis]).floor().max(0.0) as usize;
            index[axis] = raw.min(shape[axis] - 1);
        }
        (index, wrapped)
    }

    /// Bins one frame. Frames inside the warm-up are ignored; a frame's
    /// start line is `index * (particles_per_frame + 2)`, so comparing the
    /// index is the same as comparing the line.
    pub fn add_frame(&mut self, frame: &Frame) {
        if frame.index < self.warmup_frames {
            return;
        }
        for particle in &frame.particles {
            if particle.kind == ParticleKind::Separator {
                continue;
            }
            let (index, wrapped) = self.voxel_index(particle.position);
            if wrapped {
                self.out_of_bounds += 1;
            }
            self.grid.increment(index, particle.kind);
            self.particles += 1;
        }
        self.frames += 1;
    }

    /// Skips the warm-up without parsing it, then bins every remaining
    /// frame.
    pub fn accumulate<R: BufRead>(
        mut self,
        reader: &mut TrajectoryReader<R>,
    ) -> Result<VoxelReport, Error> {
        let skipped = reader.skip_frames(self.warmup_frames)?;
        log::debug!(
            "voxel pass: skipped {} warm-up frames (up to line {})",
            skipped,
            self.warmup_line(reader.particles_per_frame())
        );
        for frame in reader.by_ref() {
            self.add_frame(&frame?);
        }
        Ok(self.finish())
    }

    /// Turns counts into per-frame averages.
    pub fn finish(mut self) -> VoxelReport {
        if self.frames > 0 {
            self.grid.scale(1.0 / self.frames as f64);
        }
        let expected = self.estimated_frames.saturating_sub(self.warmup_frames);
        let incomplete = self.frames < expected;
        if incomplete {
            log::warn!(
                "voxel pass saw {} post-warm-up frames, expected {}",
                self.frames,
                expected
            );
        }
        if self.out_of_bounds > 0 {
            log::warn!(
                "{} particle positions were folded back into the box",
                self.out_of_bounds
            );
        }
        VoxelReport {
            grid: self.grid,
            frames: self.frames,
            warmup_frames: self.warmup_frames,
            particles: self.particles,
            out_of_bounds: self.out_of_bounds,
            incomplete,
        }
    }
}
