use super::config::InterfaceMethod;
use super::error::Error;
use crate::model::profile::DensityProfile;

/// Reads the interface height off an averaged monomer profile.
///
/// Returns `bin_length * i` for the bin `i` picked by `method`. Methods never
/// fall back to one another; a profile without an acceptable bin is an error.
pub fn detect_interface(
    profile: &DensityProfile,
    bin_length: f64,
    method: &InterfaceMethod,
) -> Result<f64, Error> {
    if profile.is_empty() {
        return Err(Error::EmptyProfile);
    }
    match *method {
        InterfaceMethod::Threshold {
            top_density,
            min_start_index,
        } => {
            let start = min_start_index.unwrap_or_else(|| default_start_index(bin_length));
            threshold_height(profile, bin_length, top_density, start)
        }
        InterfaceMethod::Inflection { start_offset } => {
            inflection_height(profile, bin_length, start_offset)
        }
    }
}

/// Bins at or before `floor(1 / bin_length) + 1` sit on the grafting surface
/// and are never taken as the interface.
pub fn default_start_index(bin_length: f64) -> usize {
    (1.0 / bin_length).floor() as usize + 1
}

/// First bin after `start_index` whose value is below `top_density`.
pub fn threshold_height(
    profile: &DensityProfile,
    bin_length: f64,
    top_density: f64,
    start_index: usize,
) -> Result<f64, Error> {
    profile
        .bins
        .iter()
        .enumerate()
        .skip(start_index.saturating_add(1))
        .find(|(_, v)| **v < top_density)
        .map(|(i, _)| bin_length * i as f64)
        .ok_or(Error::ThresholdNotFound {
            top_density,
            start_index,
        })
}

/// Bin of steepest descent past `start_offset`, accepted only if the second
/// gradient is negative on the two bins below it and positive on the two
/// above.
pub fn inflection_height(
    profile: &DensityProfile,
    bin_length: f64,
    start_offset: usize,
) -> Result<f64, Error> {
    let g1 = gradient(&profile.bins);
    let g2 = gradient(&g1);

    let Some(index) = argmin_from(&g1, start_offset) else {
        return Err(Error::InflectionRejected {
            index: start_offset,
        });
    };

    let concave_below = index >= 2 && g2[index - 2] < 0.0 && g2[index - 1] < 0.0;
    let convex_above = index + 2 < g2.len() && g2[index + 1] > 0.0 && g2[index + 2] > 0.0;
    if concave_below && convex_above {
        Ok(bin_length * index as f64)
    } else {
        Err(Error::InflectionRejected { index })
    }
}

/// Unit-spaced gradient: central differences inside, one-sided at the ends.
pub fn gradient(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    match n {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let mut out = Vec::with_capacity(n);
            out.push(values[1] - values[0]);
            for i in 1..n - 1 {
                out.push((values[i + 1] - values[i - 1]) / 2.0);
            }
            out.push(values[n - 1] - values[n - 2]);
            out
        }
    }
}

// First index of the minimum, ties resolved towards the lower bin.
fn argmin_from(values: &[f64], start: usize) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .skip(start)
        .fold(None, |best: Option<(usize, f64)>, (i, &v)| match best {
            Some((_, b)) if b <= v => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}
