use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported particle type code: '{0}'")]
pub struct ParseParticleKindError(String);

/// Particle species as encoded in the first field of a trajectory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ParticleKind {
    /// Chain separator record (type code `0`).
    Separator = 0,
    /// Polymer chain monomer (type code `1`).
    Monomer = 1,
    /// Mobile spherical nanoparticle (type code `2`).
    Nanoparticle = 2,
}

impl ParticleKind {
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Slot of this kind in per-kind accumulators, `None` for separators.
    pub fn density_slot(self) -> Option<usize> {
        match self {
            ParticleKind::Separator => None,
            ParticleKind::Monomer => Some(0),
            ParticleKind::Nanoparticle => Some(1),
        }
    }
}

impl fmt::Display for ParticleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParticleKind::Separator => write!(f, "separator"),
            ParticleKind::Monomer => write!(f, "monomer"),
            ParticleKind::Nanoparticle => write!(f, "nanoparticle"),
        }
    }
}

impl FromStr for ParticleKind {
    type Err = ParseParticleKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "0" => Ok(ParticleKind::Separator),
            "1" => Ok(ParticleKind::Monomer),
            "2" => Ok(ParticleKind::Nanoparticle),
            _ => Err(ParseParticleKindError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub kind: ParticleKind,
    pub position: [f64; 3],
}

impl Particle {
    pub fn new(kind: ParticleKind, position: [f64; 3]) -> Self {
        Self { kind, position }
    }

    #[inline]
    pub fn z(&self) -> f64 {
        self.position[2]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_type_codes() {
        assert_eq!("0".parse::<ParticleKind>(), Ok(ParticleKind::Separator));
        assert_eq!("1".parse::<ParticleKind>(), Ok(ParticleKind::Monomer));
        assert_eq!("2".parse::<ParticleKind>(), Ok(ParticleKind::Nanoparticle));
    }

    #[test]
    fn rejects_unknown_type_codes() {
        assert!("3".parse::<ParticleKind>().is_err());
        assert!("1.0".parse::<ParticleKind>().is_err());
        assert!("".parse::<ParticleKind>().is_err());
    }

    #[test]
    fn density_slots_skip_separators() {
        assert_eq!(ParticleKind::Separator.density_slot(), None);
        assert_eq!(ParticleKind::Monomer.density_slot(), Some(0));
        assert_eq!(ParticleKind::Nanoparticle.density_slot(), Some(1));
    }

    #[test]
    fn code_roundtrips_through_display_order() {
        assert_eq!(ParticleKind::Nanoparticle.code(), 2);
        assert_eq!(ParticleKind::Monomer.to_string(), "monomer");
    }
}
