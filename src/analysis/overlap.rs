use crate::model::loading::{InterfaceReference, LoadingDistribution};
use std::f64::consts::PI;

/// Volume of a spherical cap of height `h` cut from a sphere of radius `r`.
#[inline]
pub fn cap_volume(r: f64, h: f64) -> f64 {
    PI * h * h / 3.0 * (3.0 * r - h)
}

#[inline]
pub fn sphere_volume(r: f64) -> f64 {
    4.0 / 3.0 * PI * r.powi(3)
}

/// Share of a sphere's volume in a cap of height `h`, with `h` clamped to
/// `[0, 2r]`. A zero radius has no cap.
pub fn cap_fraction(r: f64, h: f64) -> f64 {
    if r <= 0.0 {
        return 0.0;
    }
    let h = h.clamp(0.0, 2.0 * r);
    cap_volume(r, h) / sphere_volume(r)
}

/// Splits nanoparticles between the brush and the solvent, crediting a
/// particle that straddles the interface by the volume on each side.
#[derive(Debug, Clone)]
pub struct OverlapClassifier {
    reference: InterfaceReference,
    radius: f64,
    current: LoadingDistribution,
    classified: usize,
}

impl OverlapClassifier {
    pub fn new(reference: InterfaceReference, radius: f64) -> Self {
        Self {
            reference,
            radius,
            current: LoadingDistribution::new(),
            classified: 0,
        }
    }

    #[inline]
    pub fn reference(&self) -> InterfaceReference {
        self.reference
    }

    /// Adds one nanoparticle centred at height `z` to the current window and
    /// returns the share credited inside.
    pub fn classify(&mut self, z: f64) -> f64 {
        let reference = self.reference.height();
        let r = self.radius;
        let inside = if z <= reference {
            let depth = reference - z;
            if depth >= r {
                1.0
            } else {
                // Cap poking out above the interface.
                1.0 - cap_fraction(r, z + r - reference)
            }
        } else {
            let lift = z - reference;
            if lift >= r {
                0.0
            } else {
                // Cap still below the interface.
                cap_fraction(r, r - lift)
            }
        };
        self.current.inside += inside;
        self.current.outside += 1.0 - inside;
        self.classified += 1;
        inside
    }

    /// Nanoparticles classified in the current window.
    #[inline]
    pub fn classified(&self) -> usize {
        self.classified
    }

    pub fn current(&self) -> &LoadingDistribution {
        &self.current
    }

    /// Hands out the current window and starts a fresh one.
    pub fn take_window(&mut self) -> LoadingDistribution {
        self.classified = 0;
        std::mem::replace(&mut self.current, LoadingDistribution::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn cap_fraction_bounds_and_half() {
        assert_eq!(cap_fraction(2.0, 0.0), 0.0);
        assert!(f64_eq(cap_fraction(2.0, 4.0), 1.0));
        assert!(f64_eq(cap_fraction(2.0, 2.0), 0.5));
        assert_eq!(cap_fraction(2.0, -1.0), 0.0);
        assert!(f64_eq(cap_fraction(2.0, 9.0), 1.0));
        assert_eq!(cap_fraction(0.0, 1.0), 0.0);
    }

    #[test]
    fn cap_fraction_is_monotone_in_height() {
        let mut last = 0.0;
        for step in 0..=40 {
            let f = cap_fraction(2.0, step as f64 * 0.1);
            assert!(f >= last);
            assert!((0.0..=1.0).contains(&f));
            last = f;
        }
    }

    #[test]
    fn deep_particle_counts_fully_inside() {
        let mut c = OverlapClassifier::new(InterfaceReference(100.0), 2.0);
        assert_eq!(c.classify(95.0), 1.0);
        assert_eq!(c.current().inside, 1.0);
        assert_eq!(c.current().outside, 0.0);
    }

    #[test]
    fn straddling_particle_below_interface_is_split() {
        let mut c = OverlapClassifier::new(InterfaceReference(100.0), 2.0);
        c.classify(99.0);
        let d = c.current();
        let f = cap_fraction(2.0, 1.0);
        assert!(f > 0.0 && f < 0.5);
        assert!(f64_eq(f, 5.0 / 32.0));
        assert!(f64_eq(d.outside, f));
        assert!(f64_eq(d.inside, 1.0 - f));
    }

    #[test]
    fn straddling_particle_above_interface_is_split() {
        let mut c = OverlapClassifier::new(InterfaceReference(100.0), 2.0);
        let inside = c.classify(101.0);
        assert!(f64_eq(inside, cap_fraction(2.0, 1.0)));
        assert!(f64_eq(c.current().outside, 1.0 - inside));
    }

    #[test]
    fn particle_in_solvent_counts_fully_outside() {
        let mut c = OverlapClassifier::new(InterfaceReference(100.0), 2.0);
        assert_eq!(c.classify(102.0), 0.0);
        assert_eq!(c.current().outside, 1.0);
    }

    #[test]
    fn particle_centred_on_interface_is_halved() {
        let mut c = OverlapClassifier::new(InterfaceReference(50.0), 3.0);
        assert!(f64_eq(c.classify(50.0), 0.5));
    }

    #[test]
    fn window_conserves_classified_count() {
        let mut c = OverlapClassifier::new(InterfaceReference(10.0), 1.5);
        for z in [0.0, 9.1, 9.9, 10.0, 10.4, 11.2, 30.0] {
            c.classify(z);
        }
        assert_eq!(c.classified(), 7);
        let window = c.take_window();
        assert!(f64_eq(window.total(), 7.0));
        assert!(window.inside >= 0.0 && window.outside >= 0.0);

        assert_eq!(c.classified(), 0);
        assert_eq!(c.current().total(), 0.0);
        c.classify(0.0);
        assert_eq!(c.current().total(), 1.0);
        assert!(f64_eq(window.total(), 7.0));
    }
}
