use std::f64::consts::PI;

/// Nanoparticle volume split between the brush (`inside`) and the solvent
/// (`outside`) over one classification window.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LoadingDistribution {
    pub inside: f64,
    pub outside: f64,
}

impl LoadingDistribution {
    /// A fresh, zero-valued distribution.
    pub fn new() -> Self {
        Self {
            inside: 0.0,
            outside: 0.0,
        }
    }

    #[inline]
    pub fn total(&self) -> f64 {
        self.inside + self.outside
    }

    /// Fraction of classified nanoparticles inside the brush.
    pub fn embedding_ratio(&self) -> Option<f64> {
        let total = self.total();
        (total > 0.0).then(|| self.inside / total)
    }

    /// Nanoparticle volume fractions of the brush and solvent regions.
    ///
    /// The brush occupies `Lx * Ly * height`; the solvent the remainder of
    /// the box. A region with no volume yields `None` for that side.
    pub fn volume_fractions(
        &self,
        radius: f64,
        dims: [f64; 3],
        height: f64,
        frames: usize,
    ) -> (Option<f64>, Option<f64>) {
        let np_volume = 4.0 / 3.0 * PI * radius.powi(3);
        let area = dims[0] * dims[1];
        let per_frame = 1.0 / frames.max(1) as f64;
        let brush_volume = area * height;
        let solvent_volume = area * (dims[2] - height);
        let brush =
            (brush_volume > 0.0).then(|| self.inside * per_frame * np_volume / brush_volume);
        let solvent =
            (solvent_volume > 0.0).then(|| self.outside * per_frame * np_volume / solvent_volume);
        (brush, solvent)
    }
}

/// Interface height used as the inside/outside boundary.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct InterfaceReference(pub f64);

impl InterfaceReference {
    #[inline]
    pub fn height(self) -> f64 {
        self.0
    }
}
