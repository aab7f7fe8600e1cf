use super::particle::{Particle, ParticleKind};

/// One timestep of a trajectory: the particle records that parsed cleanly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Zero-based frame number in the file.
    pub index: usize,
    /// Zero-based line number of the frame's count line.
    pub start_line: usize,
    pub particles: Vec<Particle>,
}

impl Frame {
    pub fn new(index: usize, start_line: usize) -> Self {
        Self {
            index,
            start_line,
            particles: Vec::new(),
        }
    }

    #[inline]
    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn of_kind(&self, kind: ParticleKind) -> impl Iterator<Item = &Particle> {
        self.particles.iter().filter(move |p| p.kind == kind)
    }

    pub fn count_of(&self, kind: ParticleKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Highest monomer z in the frame, if any monomer is present.
    pub fn peak_monomer_z(&self) -> Option<f64> {
        self.of_kind(ParticleKind::Monomer)
            .map(Particle::z)
            .fold(None, |acc, z| Some(acc.map_or(z, |m: f64| m.max(z))))
    }

    /// Splits the frame into chains; every separator record opens a new group.
    ///
    /// Records preceding the first separator form their own leading group.
    pub fn groups(&self) -> Vec<&[Particle]> {
        let mut groups = Vec::new();
        let mut start = 0;
        for (i, particle) in self.particles.iter().enumerate() {
            if particle.kind == ParticleKind::Separator && i > start {
                groups.push(&self.particles[start..i]);
                start = i;
            }
        }
        if start < self.particles.len() {
            groups.push(&self.particles[start..]);
        }
        groups
    }

    /// z-extent of each chain: last monomer z minus the z of the group's
    /// first record. Groups without monomers have no extent.
    pub fn chain_heights(&self) -> Vec<f64> {
        self.groups()
            .into_iter()
            .filter_map(|g| {
                let first = g.first()?;
                let last = g.iter().rev().find(|p| p.kind == ParticleKind::Monomer)?;
                Some(last.z() - first.z())
            })
            .collect()
    }

    /// Mean chain z-extent of the frame.
    pub fn mean_chain_height(&self) -> Option<f64> {
        let heights = self.chain_heights();
        (!heights.is_empty()).then(|| heights.iter().sum::<f64>() / heights.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(kind: ParticleKind, z: f64) -> Particle {
        Particle::new(kind, [0.0, 0.0, z])
    }

    fn chain_frame() -> Frame {
        let mut frame = Frame::new(0, 0);
        frame.particles = vec![
            p(ParticleKind::Separator, 0.0),
            p(ParticleKind::Monomer, 1.0),
            p(ParticleKind::Monomer, 4.0),
            p(ParticleKind::Separator, 0.5),
            p(ParticleKind::Monomer, 2.5),
            p(ParticleKind::Nanoparticle, 9.0),
        ];
        frame
    }

    #[test]
    fn groups_split_on_separators() {
        let frame = chain_frame();
        let groups = frame.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].len(), 3);
    }

    #[test]
    fn leading_records_without_separator_form_a_group() {
        let mut frame = Frame::new(0, 0);
        frame.particles = vec![
            p(ParticleKind::Monomer, 1.0),
            p(ParticleKind::Separator, 0.0),
            p(ParticleKind::Monomer, 2.0),
        ];
        assert_eq!(frame.groups().len(), 2);
    }

    #[test]
    fn chain_heights_measure_first_to_last() {
        let frame = chain_frame();
        let heights = frame.chain_heights();
        assert_eq!(heights.len(), 2);
        assert!((heights[0] - 4.0).abs() < 1e-12);
        assert!((heights[1] - 2.0).abs() < 1e-12);
        assert!((frame.mean_chain_height().unwrap() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn groups_without_monomers_have_no_height() {
        let mut frame = Frame::new(0, 0);
        frame.particles = vec![
            p(ParticleKind::Separator, 0.0),
            p(ParticleKind::Nanoparticle, 5.0),
        ];
        assert!(frame.chain_heights().is_empty());
        assert_eq!(frame.mean_chain_height(), None);
    }

    #[test]
    fn peak_monomer_ignores_other_kinds() {
        let frame = chain_frame();
        assert_eq!(frame.peak_monomer_z(), Some(4.0));
        assert_eq!(Frame::new(0, 0).peak_monomer_z(), None);
    }

    #[test]
    fn counts_by_kind() {
        let frame = chain_frame();
        assert_eq!(frame.count_of(ParticleKind::Monomer), 3);
        assert_eq!(frame.count_of(ParticleKind::Nanoparticle), 1);
        assert_eq!(frame.count_of(ParticleKind::Separator), 2);
    }
}
