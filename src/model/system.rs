/// Simulation box edge lengths `[Lx, Ly, Lz]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemDimensions(pub [f64; 3]);

impl SystemDimensions {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self([x, y, z])
    }

    #[inline]
    pub fn lengths(&self) -> [f64; 3] {
        self.0
    }

    /// Lateral area `Lx * Ly`.
    #[inline]
    pub fn area(&self) -> f64 {
        self.0[0] * self.0[1]
    }

    #[inline]
    pub fn volume(&self) -> f64 {
        self.0[0] * self.0[1] * self.0[2]
    }

    /// Largest lateral extent, the span of radial distance histograms.
    #[inline]
    pub fn lateral_span(&self) -> f64 {
        self.0[0].max(self.0[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_extents() {
        let dims = SystemDimensions::new(10.0, 12.0, 50.0);
        assert_eq!(dims.area(), 120.0);
        assert_eq!(dims.volume(), 6000.0);
        assert_eq!(dims.lateral_span(), 12.0);
    }
}
