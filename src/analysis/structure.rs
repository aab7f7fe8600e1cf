use crate::model::particle::ParticleKind;
use crate::model::profile::DensityProfile;
use crate::model::voxel::VoxelGrid;
use rustfft::FftPlanner;
use rustfft::num_complex::Complex;

/// Height below which `1 - top_fraction` of the profile's mass lies.
///
/// Returns `bin_length * i` for the first bin `i` whose normalized
/// cumulative count reaches `1 - top_fraction`, or `None` when the profile
/// holds nothing.
pub fn cumulative_cutoff(
    profile: &DensityProfile,
    bin_length: f64,
    top_fraction: f64,
) -> Option<f64> {
    let total = profile.total();
    if profile.is_empty() || total <= 0.0 {
        return None;
    }
    let target = 1.0 - top_fraction;
    let mut running = 0.0;
    for (i, v) in profile.bins.iter().enumerate() {
        running += v;
        if running / total >= target {
            return Some(bin_length * i as f64);
        }
    }
    Some(bin_length * (profile.len() - 1) as f64)
}

/// Histogram of pairwise distances over `[0, span)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialHistogram {
    pub counts: Vec<usize>,
    pub bin_width: f64,
    /// Pairs at or beyond the span.
    pub overflow: usize,
}

impl RadialHistogram {
    pub fn pairs(&self) -> usize {
        self.counts.iter().sum::<usize>() + self.overflow
    }

    /// Lower edge of each bin.
    pub fn edges(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.counts.len()).map(|i| i as f64 * self.bin_width)
    }
}

/// Pairwise distance histogram of the positions lying above `z_cutoff`.
pub fn radial_distribution(
    positions: &[[f64; 3]],
    z_cutoff: f64,
    bins: usize,
    span: f64,
) -> RadialHistogram {
    let bins = bins.max(1);
    let bin_width = span / bins as f64;
    let kept: Vec<[f64; 3]> = positions
        .iter()
        .copied()
        .filter(|p| p[2] > z_cutoff)
        .collect();

    let mut counts = vec![0usize; bins];
    let mut overflow = 0;
    for (i, a) in kept.iter().enumerate() {
        for b in &kept[i + 1..] {
            let d = ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt();
            if d >= span || bin_width <= 0.0 {
                overflow += 1;
            } else {
                counts[((d / bin_width) as usize).min(bins - 1)] += 1;
            }
        }
    }

    RadialHistogram {
        counts,
        bin_width,
        overflow,
    }
}

/// Magnitude of a centred 2D spectrum, `x`-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum2d {
    pub nx: usize,
    pub ny: usize,
    pub magnitudes: Vec<f64>,
}

impl Spectrum2d {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f64 {
        self.magnitudes[x * self.ny + y]
    }

    /// Largest magnitude and its `(x, y)` position.
    pub fn peak(&self) -> Option<(usize, usize, f64)> {
        self.magnitudes
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, &m)| (i / self.ny, i % self.ny, m))
    }
}

/// Spectrum of the layer at height `z` for `kind`: mean removed, 2D DFT,
/// zero frequency moved to the centre. `None` if `z` is outside the grid.
pub fn spatial_spectrum(grid: &VoxelGrid, z: usize, kind: ParticleKind) -> Option<Spectrum2d> {
    let [nx, ny, nz] = grid.shape();
    if z >= nz || nx == 0 || ny == 0 {
        return None;
    }

    let slice = grid.slice_xy(z, kind);
    let mean = slice.iter().sum::<f64>() / slice.len() as f64;
    let mut buffer: Vec<Complex<f64>> = slice.iter().map(|v| Complex::new(v - mean, 0.0)).collect();

    let mut planner = FftPlanner::<f64>::new();
    // Rows are contiguous in the x-major layout.
    planner.plan_fft_forward(ny).process(&mut buffer);

    let mut columns = transpose(&buffer, nx, ny);
    planner.plan_fft_forward(nx).process(&mut columns);
    let spectrum = transpose(&columns, ny, nx);

    let mut magnitudes = vec![0.0; nx * ny];
    for x in 0..nx {
        for y in 0..ny {
            let sx = (x + nx / 2) % nx;
            let sy = (y + ny / 2) % ny;
            magnitudes[sx * ny + sy] = spectrum[x * ny + y].norm();
        }
    }

    Some(Spectrum2d { nx, ny, magnitudes })
}

fn transpose(data: &[Complex<f64>], rows: usize, cols: usize) -> Vec<Complex<f64>> {
    let mut out = vec![Complex::new(0.0, 0.0); data.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cutoff_splits_profile_mass() {
        let profile = DensityProfile::from_bins(vec![1.0, 1.0, 1.0, 1.0]);
        assert_eq!(cumulative_cutoff(&profile, 10.0, 0.5), Some(10.0));
        assert_eq!(cumulative_cutoff(&profile, 10.0, 0.0), Some(30.0));
        assert_eq!(cumulative_cutoff(&profile, 10.0, 0.9), Some(0.0));
        assert_eq!(cumulative_cutoff(&DensityProfile::zeroed(4), 10.0, 0.5), None);
    }

    #[test]
    fn radial_histogram_counts_pairs_above_cutoff() {
        let positions = [
            [0.0, 0.0, 10.0],
            [3.0, 4.0, 10.0],
            [0.0, 1.0, 10.0],
            [0.0, 0.0, 1.0],
        ];
        let h = radial_distribution(&positions, 5.0, 10, 10.0);
        assert_eq!(h.bin_width, 1.0);
        assert_eq!(h.pairs(), 3);
        assert_eq!(h.counts[1], 1);
        assert_eq!(h.counts[4], 1);
        assert_eq!(h.counts[5], 1);
        assert_eq!(h.overflow, 0);
    }

    #[test]
    fn distances_beyond_span_overflow() {
        let positions = [[0.0, 0.0, 1.0], [20.0, 0.0, 1.0], [1.0, 0.0, 1.0]];
        let h = radial_distribution(&positions, 0.0, 4, 8.0);
        assert_eq!(h.overflow, 2);
        assert_eq!(h.counts, vec![1, 0, 0, 0]);
        assert_eq!(h.edges().collect::<Vec<_>>(), vec![0.0, 2.0, 4.0, 6.0]);
    }

    #[test]
    fn constant_layer_has_flat_zero_spectrum() {
        let mut grid = VoxelGrid::zeroed([4, 6, 2]);
        for x in 0..4 {
            for y in 0..6 {
                grid.increment([x, y, 1], ParticleKind::Monomer);
            }
        }
        let spectrum = spatial_spectrum(&grid, 1, ParticleKind::Monomer).unwrap();
        assert_eq!(spectrum.magnitudes.len(), 24);
        assert!(spectrum.magnitudes.iter().all(|m| m.abs() < 1e-12));
    }

    #[test]
    fn alternating_rows_peak_at_shifted_nyquist() {
        let mut grid = VoxelGrid::zeroed([4, 4, 1]);
        for x in (0..4).step_by(2) {
            for y in 0..4 {
                grid.increment([x, y, 0], ParticleKind::Nanoparticle);
            }
        }
        let spectrum = spatial_spectrum(&grid, 0, ParticleKind::Nanoparticle).unwrap();
        let (px, py, peak) = spectrum.peak().unwrap();
        assert_eq!((px, py), (0, 2));
        assert!((peak - 8.0).abs() < 1e-9);
        let rest: f64 = spectrum.magnitudes.iter().sum::<f64>() - peak;
        assert!(rest.abs() < 1e-9);
    }

    #[test]
    fn layer_outside_grid_has_no_spectrum() {
        let grid = VoxelGrid::zeroed([2, 2, 2]);
        assert!(spatial_spectrum(&grid, 2, ParticleKind::Monomer).is_none());
    }
}
