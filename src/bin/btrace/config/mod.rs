use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use brush_trace::{AnalysisConfig, InterfaceMethod};

use crate::cli::{AnalysisOptions, InterfaceMethodArg, InterfaceOptions};

/// Loads `--config` (or the defaults) and applies the flag overrides on top.
pub fn build_analysis_config(
    analysis: &AnalysisOptions,
    interface: Option<&InterfaceOptions>,
) -> Result<AnalysisConfig> {
    let mut config = match &analysis.config {
        Some(path) => load_config_file(path)?,
        None => AnalysisConfig::default(),
    };

    apply_analysis_overrides(&mut config, analysis);
    if let Some(interface) = interface {
        config.interface = merge_interface(config.interface, interface);
    }

    config
        .validate()
        .context("Invalid analysis settings after applying command-line overrides")?;
    Ok(config)
}

fn load_config_file(path: &Path) -> Result<AnalysisConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    AnalysisConfig::from_toml_str(&text)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

fn apply_analysis_overrides(config: &mut AnalysisConfig, opts: &AnalysisOptions) {
    if let Some(v) = opts.bin_length {
        config.bin_length = v;
    }
    if let Some(v) = opts.max_height {
        config.max_height = v;
    }
    if let Some(v) = opts.equil {
        config.equil_percent = v;
    }
    if let Some(v) = opts.radius {
        config.np_radius = v;
    }
    if let Some(v) = opts.window {
        config.window_frames = v;
    }
    if let Some(v) = opts.profile_window {
        config.profile_window = v;
    }
    if let Some(v) = opts.estimated_frames {
        config.estimated_frames = v;
    }
    if opts.expected_groups.is_some() {
        config.expected_groups = opts.expected_groups;
    }
}

/// Switching method keeps nothing from the old one; flags for the other
/// method are ignored.
fn merge_interface(current: InterfaceMethod, opts: &InterfaceOptions) -> InterfaceMethod {
    let method = match (opts.method, current) {
        (None, current) => current,
        (Some(InterfaceMethodArg::Threshold), current @ InterfaceMethod::Threshold { .. }) => {
            current
        }
        (Some(InterfaceMethodArg::Inflection), current @ InterfaceMethod::Inflection { .. }) => {
            current
        }
        (Some(InterfaceMethodArg::Threshold), _) => InterfaceMethod::default(),
        (Some(InterfaceMethodArg::Inflection), _) => InterfaceMethod::Inflection { start_offset: 0 },
    };

    match method {
        InterfaceMethod::Threshold {
            top_density,
            min_start_index,
        } => InterfaceMethod::Threshold {
            top_density: opts.top_density.unwrap_or(top_density),
            min_start_index: opts.min_start.or(min_start_index),
        },
        InterfaceMethod::Inflection { start_offset } => InterfaceMethod::Inflection {
            start_offset: opts.start_offset.unwrap_or(start_offset),
        },
    }
}

/// Parses a `--voxel-size` triple.
pub fn voxel_size(values: &[f64]) -> Result<[f64; 3]> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        [v] => Ok([*v, *v, *v]),
        _ => bail!(
            "--voxel-size takes one edge length or three (X,Y,Z), got {} values",
            values.len()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let config = build_analysis_config(&AnalysisOptions::default(), None).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn flags_override_fields() {
        let opts = AnalysisOptions {
            bin_length: Some(2.0),
            radius: Some(3.5),
            window: Some(4),
            expected_groups: Some(16),
            ..Default::default()
        };
        let config = build_analysis_config(&opts, None).unwrap();
        assert_eq!(config.bin_length, 2.0);
        assert_eq!(config.np_radius, 3.5);
        assert_eq!(config.window_frames, 4);
        assert_eq!(config.expected_groups, Some(16));
        assert_eq!(config.max_height, AnalysisConfig::default().max_height);
    }

    #[test]
    fn invalid_override_is_rejected() {
        let opts = AnalysisOptions {
            equil: Some(1.5),
            ..Default::default()
        };
        assert!(build_analysis_config(&opts, None).is_err());
    }

    #[test]
    fn switching_method_applies_its_own_flags() {
        let opts = InterfaceOptions {
            method: Some(InterfaceMethodArg::Inflection),
            top_density: Some(0.3),
            start_offset: Some(4),
            ..Default::default()
        };
        let merged = merge_interface(InterfaceMethod::default(), &opts);
        assert_eq!(merged, InterfaceMethod::Inflection { start_offset: 4 });
    }

    #[test]
    fn threshold_flags_refine_current_method() {
        let opts = InterfaceOptions {
            top_density: Some(0.25),
            ..Default::default()
        };
        let current = InterfaceMethod::Threshold {
            top_density: 1.0,
            min_start_index: Some(3),
        };
        assert_eq!(
            merge_interface(current, &opts),
            InterfaceMethod::Threshold {
                top_density: 0.25,
                min_start_index: Some(3),
            }
        );
    }

    #[test]
    fn voxel_size_accepts_one_or_three_values() {
        assert_eq!(voxel_size(&[2.0]).unwrap(), [2.0, 2.0, 2.0]);
        assert_eq!(voxel_size(&[1.0, 2.0, 3.0]).unwrap(), [1.0, 2.0, 3.0]);
        assert!(voxel_size(&[1.0, 2.0]).is_err());
    }
}
