use crate::io::{Format, error::Error};
use crate::model::system::SystemDimensions;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Zero-based line of the descriptor holding `label x y z` box lengths.
const DIMENSIONS_LINE: usize = 9;

const DESCRIPTOR_EXTENSION: &str = "mpd";

/// Reads the box lengths from a `.mpd` system descriptor.
pub fn read_dimensions<R: BufRead>(reader: R) -> Result<SystemDimensions, Error> {
    let line = reader
        .lines()
        .nth(DIMENSIONS_LINE)
        .transpose()?
        .ok_or_else(|| {
            Error::parse(
                Format::Descriptor,
                DIMENSIONS_LINE + 1,
                "descriptor ended before the dimensions line",
            )
        })?;

    let tokens: Vec<_> = line.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(Error::parse(
            Format::Descriptor,
            DIMENSIONS_LINE + 1,
            format!("expected 'label x y z', found {} fields", tokens.len()),
        ));
    }

    let mut lengths = [0.0; 3];
    for (axis, token) in lengths.iter_mut().zip(&tokens[1..4]) {
        *axis = token.parse::<f64>().map_err(|_| {
            Error::parse(
                Format::Descriptor,
                DIMENSIONS_LINE + 1,
                format!("invalid box length '{token}'"),
            )
        })?;
        if axis.is_nan() || *axis <= 0.0 {
            return Err(Error::parse(
                Format::Descriptor,
                DIMENSIONS_LINE + 1,
                format!("box length must be positive, got {token}"),
            ));
        }
    }
    Ok(SystemDimensions(lengths))
}

/// Finds the single `.mpd` descriptor of a run directory.
pub fn locate_descriptor(dir: &Path) -> Result<PathBuf, Error> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file()
            && path
                .extension()
                .is_some_and(|ext| ext == DESCRIPTOR_EXTENSION)
        {
            found.push(path);
        }
    }

    match found.len() {
        0 => Err(Error::MissingDescriptor {
            dir: dir.to_path_buf(),
        }),
        1 => Ok(found.remove(0)),
        count => Err(Error::AmbiguousDescriptor {
            dir: dir.to_path_buf(),
            count,
        }),
    }
}

/// Files of one run directory and the box they describe.
#[derive(Debug, Clone, PartialEq)]
pub struct RunFiles {
    pub descriptor: PathBuf,
    pub trajectory: PathBuf,
    pub dimensions: SystemDimensions,
}

impl RunFiles {
    /// Locates the descriptor of `dir`, reads its dimensions and derives the
    /// trajectory path.
    pub fn locate(dir: &Path) -> Result<Self, Error> {
        let descriptor = locate_descriptor(dir)?;
        Self::from_descriptor(descriptor)
    }

    pub fn from_descriptor(descriptor: PathBuf) -> Result<Self, Error> {
        let dimensions = read_dimensions(BufReader::new(File::open(&descriptor)?))?;
        Ok(Self {
            trajectory: trajectory_path(&descriptor),
            descriptor,
            dimensions,
        })
    }
}

/// The trajectory written alongside a descriptor: `frames_<stem>.xyz`.
pub fn trajectory_path(descriptor: &Path) -> PathBuf {
    let stem = descriptor
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    descriptor.with_file_name(format!("frames_{stem}.xyz"))
}
