/// Per-bin counts along z for one particle kind.
///
/// Values are `f64` so that averaged profiles share the type with raw ones.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DensityProfile {
    pub bins: Vec<f64>,
}

impl DensityProfile {
    /// Allocates a zeroed profile of `total_bins` bins.
    pub fn zeroed(total_bins: usize) -> Self {
        Self {
            bins: vec![0.0; total_bins],
        }
    }

    pub fn from_bins(bins: Vec<f64>) -> Self {
        Self { bins }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.bins.iter().sum()
    }

    /// Element-wise `self += other`. Lengths must match.
    pub fn add_assign(&mut self, other: &DensityProfile) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            *a += *b;
        }
    }

    /// Element-wise `self -= other`. Lengths must match.
    pub fn sub_assign(&mut self, other: &DensityProfile) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.bins.iter_mut().zip(&other.bins) {
            *a -= *b;
        }
    }

    pub fn scaled(&self, factor: f64) -> DensityProfile {
        DensityProfile {
            bins: self.bins.iter().map(|v| v * factor).collect(),
        }
    }

    /// Converts counts into number densities over slabs of `area * bin_length`.
    pub fn to_density(&self, area: f64, bin_length: f64) -> DensityProfile {
        self.scaled(1.0 / (area * bin_length))
    }
}

/// Monomer and nanoparticle profiles of a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameProfile {
    pub frame_index: usize,
    pub monomer: DensityProfile,
    pub nanoparticle: DensityProfile,
    /// Highest monomer z in the frame.
    pub peak_monomer_z: Option<f64>,
    /// Mean chain z-extent in the frame.
    pub mean_chain_height: Option<f64>,
}

impl FrameProfile {
    pub fn zeroed(frame_index: usize, total_bins: usize) -> Self {
        Self {
            frame_index,
            monomer: DensityProfile::zeroed(total_bins),
            nanoparticle: DensityProfile::zeroed(total_bins),
            peak_monomer_z: None,
            mean_chain_height: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroed_profile_has_requested_length() {
        let p = DensityProfile::zeroed(7);
        assert_eq!(p.len(), 7);
        assert_eq!(p.total(), 0.0);
    }

    #[test]
    fn add_and_sub_are_inverse() {
        let mut a = DensityProfile::from_bins(vec![1.0, 2.0, 3.0]);
        let b = DensityProfile::from_bins(vec![0.5, 0.5, 0.5]);
        a.add_assign(&b);
        assert_eq!(a.bins, vec![1.5, 2.5, 3.5]);
        a.sub_assign(&b);
        assert_eq!(a.bins, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn density_divides_by_slab_volume() {
        let p = DensityProfile::from_bins(vec![100.0, 50.0]);
        let d = p.to_density(10.0 * 10.0, 0.5);
        assert!((d.bins[0] - 2.0).abs() < 1e-12);
        assert!((d.bins[1] - 1.0).abs() < 1e-12);
    }
}
