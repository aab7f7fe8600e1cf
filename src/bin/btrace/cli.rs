use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "btrace",
    about = "Polymer brush and nanoparticle trajectory analysis",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Averaged monomer profile and interface height
    #[command(visible_alias = "h")]
    Height(HeightArgs),

    /// Nanoparticle loading inside and outside the brush
    #[command(visible_alias = "l")]
    Loading(LoadingArgs),

    /// 3D voxel densities over the equilibrated frames
    #[command(visible_alias = "v")]
    Voxels(VoxelArgs),

    /// Radial distance histogram of the top of the brush
    #[command(visible_alias = "s")]
    Structure(StructureArgs),

    /// Loading summary over many run directories
    #[command(visible_alias = "b")]
    Batch(BatchArgs),
}

impl Command {
    pub fn quiet(&self) -> bool {
        match self {
            Command::Height(args) => args.run.quiet,
            Command::Loading(args) => args.run.quiet,
            Command::Voxels(args) => args.run.quiet,
            Command::Structure(args) => args.run.quiet,
            Command::Batch(args) => args.quiet,
        }
    }
}

/// Locating the files of one run, shared by all single-run commands.
#[derive(Args)]
pub struct RunOptions {
    /// Run directory holding exactly one `.mpd` descriptor
    #[arg(value_name = "RUN_DIR")]
    pub run_dir: Option<PathBuf>,

    /// Descriptor file (overrides the lookup in RUN_DIR)
    #[arg(short, long, value_name = "FILE")]
    pub descriptor: Option<PathBuf>,

    /// Trajectory file (defaults to frames_<descriptor stem>.xyz)
    #[arg(short, long, value_name = "FILE")]
    pub trajectory: Option<PathBuf>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

/// Configuration file and per-field overrides.
#[derive(Args, Default)]
#[command(next_help_heading = "Analysis")]
pub struct AnalysisOptions {
    /// Analysis settings (TOML file)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Height of one profile bin
    #[arg(long, value_name = "LEN")]
    pub bin_length: Option<f64>,

    /// Profiles cover [0, max-height)
    #[arg(long, value_name = "LEN")]
    pub max_height: Option<f64>,

    /// Leading fraction of frames treated as warm-up
    #[arg(long, value_name = "FRAC")]
    pub equil: Option<f64>,

    /// Nanoparticle radius
    #[arg(long, value_name = "LEN")]
    pub radius: Option<f64>,

    /// Frames merged into one loading window
    #[arg(long, value_name = "N")]
    pub window: Option<usize>,

    /// Profiles kept by the rolling average
    #[arg(long, value_name = "N")]
    pub profile_window: Option<usize>,

    /// Frames the simulator was expected to write
    #[arg(long, value_name = "N")]
    pub estimated_frames: Option<usize>,

    /// Chains expected per frame (warns on mismatch)
    #[arg(long, value_name = "N")]
    pub expected_groups: Option<usize>,
}

#[derive(Args, Default)]
#[command(next_help_heading = "Interface Detection")]
pub struct InterfaceOptions {
    /// Detection method
    #[arg(long, value_name = "METHOD")]
    pub method: Option<InterfaceMethodArg>,

    /// Threshold density the monomer profile must drop below
    #[arg(long, value_name = "DENSITY")]
    pub top_density: Option<f64>,

    /// First bin searched by the threshold method
    #[arg(long, value_name = "INDEX")]
    pub min_start: Option<usize>,

    /// Leading bins ignored by the inflection method
    #[arg(long, value_name = "BINS")]
    pub start_offset: Option<usize>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InterfaceMethodArg {
    /// First bin whose density drops below --top-density
    Threshold,
    /// Steepest descent with a curvature sign change
    Inflection,
}

#[derive(Args)]
pub struct HeightArgs {
    #[command(flatten)]
    pub run: RunOptions,

    #[command(flatten)]
    pub analysis: AnalysisOptions,

    #[command(flatten)]
    pub interface: InterfaceOptions,
}

#[derive(Args)]
pub struct LoadingArgs {
    #[command(flatten)]
    pub run: RunOptions,

    #[command(flatten)]
    pub analysis: AnalysisOptions,

    #[command(flatten)]
    pub interface: InterfaceOptions,

    /// Also write per-nanoparticle mean positions and fluctuations
    #[arg(long, value_name = "FILE")]
    pub tracks: Option<PathBuf>,
}

#[derive(Args)]
pub struct VoxelArgs {
    #[command(flatten)]
    pub run: RunOptions,

    #[command(flatten)]
    pub analysis: AnalysisOptions,

    #[command(flatten)]
    pub interface: InterfaceOptions,

    /// Voxel edge lengths (X,Y,Z)
    #[arg(long, value_name = "X,Y,Z", value_delimiter = ',')]
    pub voxel_size: Option<Vec<f64>>,

    /// Write the centred 2D spectrum of this z layer
    #[arg(long, value_name = "Z")]
    pub spectrum_layer: Option<usize>,

    /// Particle kind of the spectrum layer
    #[arg(long, value_name = "KIND", default_value = "monomer")]
    pub spectrum_kind: KindArg,

    /// Spectrum output file (stdout after the grid if omitted)
    #[arg(long, value_name = "FILE")]
    pub spectrum_output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum KindArg {
    #[default]
    Monomer,
    Nanoparticle,
}

#[derive(Args)]
pub struct StructureArgs {
    #[command(flatten)]
    pub run: RunOptions,

    #[command(flatten)]
    pub analysis: AnalysisOptions,

    /// Bins of the distance histogram
    #[arg(long, value_name = "N")]
    pub bins: Option<usize>,

    /// Fraction of monomers, from the top, kept for the histogram
    #[arg(long, value_name = "FRAC")]
    pub top_fraction: Option<f64>,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Run directories, named with Umin_/rad_/den_/NP_ components
    #[arg(value_name = "RUN_DIR", required = true)]
    pub dirs: Vec<PathBuf>,

    #[command(flatten)]
    pub analysis: AnalysisOptions,

    #[command(flatten)]
    pub interface: InterfaceOptions,

    /// Worker threads (all cores if omitted)
    #[arg(short, long, value_name = "N")]
    pub jobs: Option<usize>,

    /// Output file (stdout if omitted)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
