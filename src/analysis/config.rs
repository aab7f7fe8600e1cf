//! Configuration for trajectory analysis passes.
//!
//! [`AnalysisConfig`] gathers every tunable of the profile, interface,
//! loading, voxel and structure passes. It deserializes from TOML with every
//! field optional:
//!
//! ```toml
//! bin_length = 10.0
//! equil_percent = 0.2
//! np_radius = 2.0
//!
//! [interface]
//! method = "inflection"
//! start_offset = 3
//! ```

use super::error::Error;
use serde::Deserialize;

/// How the interface height is read off an averaged monomer profile.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum InterfaceMethod {
    /// First bin past `min_start_index` whose value drops below
    /// `top_density`.
    Threshold {
        #[serde(default = "default_top_density")]
        top_density: f64,
        /// Defaults to `floor(1 / bin_length) + 1` when unset.
        #[serde(default)]
        min_start_index: Option<usize>,
    },
    /// Steepest descent of the profile, accepted only when the curvature
    /// changes sign around it.
    Inflection {
        #[serde(default)]
        start_offset: usize,
    },
}

fn default_top_density() -> f64 {
    1.0
}

impl Default for InterfaceMethod {
    fn default() -> Self {
        InterfaceMethod::Threshold {
            top_density: default_top_density(),
            min_start_index: None,
        }
    }
}

/// Settings shared by all analysis passes.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Height of one profile bin.
    pub bin_length: f64,
    /// Profiles cover `[0, max_height)`.
    pub max_height: f64,
    /// Leading fraction of the trajectory treated as warm-up.
    pub equil_percent: f64,
    pub interface: InterfaceMethod,
    /// Nanoparticle radius used for overlap classification.
    pub np_radius: f64,
    /// Frames merged into one loading window.
    pub window_frames: usize,
    /// Profiles kept by the rolling average.
    pub profile_window: usize,
    /// Voxel edge lengths along x, y and z.
    pub voxel_size: [f64; 3],
    /// Frames the simulator was expected to write.
    pub estimated_frames: usize,
    /// Separator-delimited chains expected per frame, if known.
    pub expected_groups: Option<usize>,
    /// Bins of the radial distance histogram.
    pub rdp_bins: usize,
    /// Fraction of monomers, counted from the top, kept for structure analysis.
    pub rdp_top_fraction: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            bin_length: 10.0,
            max_height: 1000.0,
            equil_percent: 0.2,
            interface: InterfaceMethod::default(),
            np_radius: 2.0,
            window_frames: 1,
            profile_window: 20,
            voxel_size: [1.0, 1.0, 1.0],
            estimated_frames: 1000,
            expected_groups: None,
            rdp_bins: 100,
            rdp_top_fraction: 0.5,
        }
    }
}

impl AnalysisConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(toml: &str) -> Result<Self, Error> {
        let config: AnalysisConfig = toml::from_str(toml)?;
        config.validate()?;
        Ok(config)
    }

    /// Number of profile bins, `floor(max_height / bin_length)`.
    pub fn total_bins(&self) -> usize {
        (self.max_height / self.bin_length).floor() as usize
    }

    /// Rejects values no pass can work with.
    pub fn validate(&self) -> Result<(), Error> {
        positive("bin_length", self.bin_length)?;
        positive("max_height", self.max_height)?;
        if self.total_bins() == 0 {
            return Err(Error::invalid_config(
                "max_height",
                format!(
                    "{} is shorter than one bin of {}",
                    self.max_height, self.bin_length
                ),
            ));
        }
        fraction("equil_percent", self.equil_percent)?;
        fraction("rdp_top_fraction", self.rdp_top_fraction)?;
        if !self.np_radius.is_finite() || self.np_radius < 0.0 {
            return Err(Error::invalid_config(
                "np_radius",
                format!("must be a non-negative length, got {}", self.np_radius),
            ));
        }
        for v in self.voxel_size {
            positive("voxel_size", v)?;
        }
        nonzero("window_frames", self.window_frames)?;
        nonzero("profile_window", self.profile_window)?;
        nonzero("estimated_frames", self.estimated_frames)?;
        nonzero("rdp_bins", self.rdp_bins)?;
        if self.expected_groups == Some(0) {
            return Err(Error::invalid_config("expected_groups", "must be at least 1"));
        }
        if let InterfaceMethod::Threshold { top_density, .. } = self.interface {
            if !top_density.is_finite() {
                return Err(Error::invalid_config(
                    "interface.top_density",
                    "must be a finite number",
                ));
            }
        }
        Ok(())
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), Error> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_config(
            field,
            format!("must be positive, got {value}"),
        ))
    }
}

fn fraction(field: &'static str, value: f64) -> Result<(), Error> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(
            field,
            format!("must lie in [0, 1), got {value}"),
        ))
    }
}

fn nonzero(field: &'static str, value: usize) -> Result<(), Error> {
    if value > 0 {
        Ok(())
    } else {
        Err(Error::invalid_config(field, "must be at least 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_TOML: &str = include_str!("../../resources/analysis.toml");

    #[test]
    fn default_config_values() {
        let config = AnalysisConfig::default();
        assert_eq!(config.bin_length, 10.0);
        assert_eq!(config.max_height, 1000.0);
        assert_eq!(config.equil_percent, 0.2);
        assert_eq!(config.np_radius, 2.0);
        assert_eq!(config.window_frames, 1);
        assert_eq!(config.profile_window, 20);
        assert_eq!(config.voxel_size, [1.0; 3]);
        assert_eq!(config.estimated_frames, 1000);
        assert_eq!(config.expected_groups, None);
        assert_eq!(config.rdp_bins, 100);
        assert_eq!(config.rdp_top_fraction, 0.5);
        assert_eq!(
            config.interface,
            InterfaceMethod::Threshold {
                top_density: 1.0,
                min_start_index: None
            }
        );
        assert_eq!(config.total_bins(), 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bundled_example_matches_defaults() {
        let config = AnalysisConfig::from_toml_str(EXAMPLE_TOML).unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = AnalysisConfig::from_toml_str("").unwrap();
        assert_eq!(config, AnalysisConfig::default());
    }

    #[test]
    fn parses_inflection_method() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            bin_length = 0.5
            np_radius = 3.0

            [interface]
            method = "inflection"
            start_offset = 4
            "#,
        )
        .unwrap();
        assert_eq!(config.bin_length, 0.5);
        assert_eq!(config.np_radius, 3.0);
        assert_eq!(
            config.interface,
            InterfaceMethod::Inflection { start_offset: 4 }
        );
    }

    #[test]
    fn threshold_fields_default_individually() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [interface]
            method = "threshold"
            min_start_index = 0
            "#,
        )
        .unwrap();
        assert_eq!(
            config.interface,
            InterfaceMethod::Threshold {
                top_density: 1.0,
                min_start_index: Some(0)
            }
        );
    }

    #[test]
    fn errors_on_invalid_toml() {
        let result = AnalysisConfig::from_toml_str("not valid [[[toml");
        assert!(matches!(result, Err(Error::ConfigParse(_))));
    }

    #[test]
    fn errors_on_unknown_field() {
        assert!(AnalysisConfig::from_toml_str("bin_width = 2.0").is_err());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases: Vec<(&str, AnalysisConfig)> = vec![
            (
                "bin_length",
                AnalysisConfig {
                    bin_length: 0.0,
                    ..Default::default()
                },
            ),
            (
                "equil_percent",
                AnalysisConfig {
                    equil_percent: 1.0,
                    ..Default::default()
                },
            ),
            (
                "np_radius",
                AnalysisConfig {
                    np_radius: -1.0,
                    ..Default::default()
                },
            ),
            (
                "window_frames",
                AnalysisConfig {
                    window_frames: 0,
                    ..Default::default()
                },
            ),
            (
                "max_height",
                AnalysisConfig {
                    max_height: 5.0,
                    ..Default::default()
                },
            ),
            (
                "voxel_size",
                AnalysisConfig {
                    voxel_size: [1.0, 0.0, 1.0],
                    ..Default::default()
                },
            ),
        ];
        for (field, config) in cases {
            match config.validate() {
                Err(Error::InvalidConfig { field: f, .. }) => assert_eq!(f, field),
                other => panic!("expected invalid {field}, got {other:?}"),
            }
        }
    }
}
