use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Parameters identifying one simulation run.
///
/// Run directories encode these as `<name>_<value>` path components, e.g.
/// `Umin_-0.175/rad_2/den_0.03/gap_0/len_32/NP_128`.
#[derive(Debug, Clone, Copy)]
pub struct RunKey {
    pub umin: f64,
    pub radius: f64,
    pub density: f64,
    pub gap: Option<f64>,
    pub length: Option<f64>,
    pub np_count: usize,
}

impl RunKey {
    /// Reads the key from the components of a run directory path.
    ///
    /// `Umin`, `rad`, `den` and `NP` are required; `gap` and `len` are
    /// optional. The first occurrence of a name wins.
    pub fn from_path(path: &Path) -> Option<Self> {
        let mut umin = None;
        let mut radius = None;
        let mut density = None;
        let mut gap = None;
        let mut length = None;
        let mut np_count = None;

        for component in path.components() {
            let Some(part) = component.as_os_str().to_str() else {
                continue;
            };
            let Some((name, value)) = part.split_once('_') else {
                continue;
            };
            match name {
                "Umin" if umin.is_none() => umin = value.parse::<f64>().ok(),
                "rad" if radius.is_none() => radius = value.parse::<f64>().ok(),
                "den" if density.is_none() => density = value.parse::<f64>().ok(),
                "gap" if gap.is_none() => gap = value.parse::<f64>().ok(),
                "len" if length.is_none() => length = value.parse::<f64>().ok(),
                "NP" if np_count.is_none() => np_count = value.parse::<usize>().ok(),
                _ => {}
            }
        }

        Some(Self {
            umin: umin?,
            radius: radius?,
            density: density?,
            gap,
            length,
            np_count: np_count?,
        })
    }

    fn cmp_opt(a: Option<f64>, b: Option<f64>) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) => a.total_cmp(&b),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

impl PartialEq for RunKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RunKey {}

impl PartialOrd for RunKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RunKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.umin
            .total_cmp(&other.umin)
            .then_with(|| self.radius.total_cmp(&other.radius))
            .then_with(|| self.density.total_cmp(&other.density))
            .then_with(|| Self::cmp_opt(self.gap, other.gap))
            .then_with(|| Self::cmp_opt(self.length, other.length))
            .then_with(|| self.np_count.cmp(&other.np_count))
    }
}

impl fmt::Display for RunKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Umin {} · r {} · σ {}",
            self.umin, self.radius, self.density
        )?;
        if let Some(gap) = self.gap {
            write!(f, " · gap {gap}")?;
        }
        if let Some(length) = self.length {
            write!(f, " · len {length}")?;
        }
        write!(f, " · NP {}", self.np_count)
    }
}

/// Results of many runs, iterated in key order.
pub type RunTable<T> = BTreeMap<RunKey, T>;
