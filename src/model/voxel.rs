use super::particle::ParticleKind;

/// Number of particle kinds tracked per voxel (monomer, nanoparticle).
pub const VOXEL_KINDS: usize = 2;

/// Dense `[x, y, z, kind]` occupancy grid.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid {
    shape: [usize; 3],
    data: Vec<f64>,
}

impl VoxelGrid {
    pub fn zeroed(shape: [usize; 3]) -> Self {
        let len = shape[0] * shape[1] * shape[2] * VOXEL_KINDS;
        Self {
            shape,
            data: vec![0.0; len],
        }
    }

    #[inline]
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    #[inline]
    fn offset(&self, x: usize, y: usize, z: usize, slot: usize) -> usize {
        ((x * self.shape[1] + y) * self.shape[2] + z) * VOXEL_KINDS + slot
    }

    pub fn get(&self, x: usize, y: usize, z: usize, kind: ParticleKind) -> f64 {
        match kind.density_slot() {
            Some(slot) => self.data[self.offset(x, y, z, slot)],
            None => 0.0,
        }
    }

    /// Adds one count for `kind` at the voxel; separators are ignored.
    pub fn increment(&mut self, index: [usize; 3], kind: ParticleKind) {
        if let Some(slot) = kind.density_slot() {
            let offset = self.offset(index[0], index[1], index[2], slot);
            self.data[offset] += 1.0;
        }
    }

    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }

    pub fn sum_of(&self, kind: ParticleKind) -> f64 {
        match kind.density_slot() {
            Some(slot) => self.data.iter().skip(slot).step_by(VOXEL_KINDS).sum(),
            None => 0.0,
        }
    }

    /// The `x`-major `[nx * ny]` layer at height `z` for one kind.
    pub fn slice_xy(&self, z: usize, kind: ParticleKind) -> Vec<f64> {
        let [nx, ny, _] = self.shape;
        let mut out = Vec::with_capacity(nx * ny);
        for x in 0..nx {
            for y in 0..ny {
                out.push(self.get(x, y, z, kind));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_the_addressed_slot_only() {
        let mut grid = VoxelGrid::zeroed([2, 3, 4]);
        grid.increment([1, 2, 3], ParticleKind::Nanoparticle);
        grid.increment([1, 2, 3], ParticleKind::Monomer);
        grid.increment([0, 0, 0], ParticleKind::Monomer);
        grid.increment([0, 0, 0], ParticleKind::Separator);

        assert_eq!(grid.get(1, 2, 3, ParticleKind::Nanoparticle), 1.0);
        assert_eq!(grid.get(1, 2, 3, ParticleKind::Monomer), 1.0);
        assert_eq!(grid.get(0, 0, 0, ParticleKind::Monomer), 1.0);
        assert_eq!(grid.sum(), 3.0);
        assert_eq!(grid.sum_of(ParticleKind::Monomer), 2.0);
        assert_eq!(grid.sum_of(ParticleKind::Nanoparticle), 1.0);
    }

    #[test]
    fn slice_is_x_major() {
        let mut grid = VoxelGrid::zeroed([2, 2, 2]);
        grid.increment([1, 0, 1], ParticleKind::Monomer);
        let slice = grid.slice_xy(1, ParticleKind::Monomer);
        assert_eq!(slice, vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn scale_preserves_proportions() {
        let mut grid = VoxelGrid::zeroed([1, 1, 2]);
        grid.increment([0, 0, 0], ParticleKind::Monomer);
        grid.increment([0, 0, 1], ParticleKind::Monomer);
        grid.scale(0.25);
        assert!((grid.sum() - 0.5).abs() < 1e-12);
    }
}
