use super::error::Error;
use super::overlap::OverlapClassifier;
use crate::io::error::Error as IoError;
use crate::model::frame::Frame;
use crate::model::loading::{InterfaceReference, LoadingDistribution};
use crate::model::particle::ParticleKind;
use crate::model::system::SystemDimensions;

/// Loading accumulated over consecutive frames.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingWindow {
    pub first_frame: usize,
    pub frames: usize,
    pub distribution: LoadingDistribution,
}

impl LoadingWindow {
    #[inline]
    pub fn embedding_ratio(&self) -> Option<f64> {
        self.distribution.embedding_ratio()
    }

    /// Per-frame brush and solvent volume fractions of this window.
    pub fn volume_fractions(
        &self,
        radius: f64,
        dims: SystemDimensions,
        height: f64,
    ) -> (Option<f64>, Option<f64>) {
        self.distribution
            .volume_fractions(radius, dims.lengths(), height, self.frames)
    }
}

/// Mean position and RMS displacement of one nanoparticle, identified by
/// its order within each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NanoparticleTrack {
    pub mean: [f64; 3],
    pub rms: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct TrackSums {
    position: [f64; 3],
    squared: f64,
    samples: usize,
}

impl TrackSums {
    fn add(&mut self, p: [f64; 3]) {
        for (s, c) in self.position.iter_mut().zip(p) {
            *s += c;
        }
        self.squared += p[0] * p[0] + p[1] * p[1] + p[2] * p[2];
        self.samples += 1;
    }

    fn finish(&self) -> NanoparticleTrack {
        let n = self.samples.max(1) as f64;
        let mean = self.position.map(|s| s / n);
        let mean_sq = mean[0] * mean[0] + mean[1] * mean[1] + mean[2] * mean[2];
        NanoparticleTrack {
            mean,
            rms: (self.squared / n - mean_sq).max(0.0).sqrt(),
            samples: self.samples,
        }
    }
}

/// Result of classifying every nanoparticle of a trajectory against a fixed
/// interface height.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadingSeries {
    pub reference: InterfaceReference,
    pub radius: f64,
    pub windows: Vec<LoadingWindow>,
    pub tracks: Vec<NanoparticleTrack>,
    pub frames: usize,
}

impl LoadingSeries {
    /// Sum over all windows.
    pub fn total(&self) -> LoadingDistribution {
        self.windows
            .iter()
            .fold(LoadingDistribution::new(), |mut acc, w| {
                acc.inside += w.distribution.inside;
                acc.outside += w.distribution.outside;
                acc
            })
    }

    pub fn embedding_ratio(&self) -> Option<f64> {
        self.total().embedding_ratio()
    }

    /// Per-frame volume fractions over the whole series.
    pub fn volume_fractions(&self, dims: SystemDimensions) -> (Option<f64>, Option<f64>) {
        self.total().volume_fractions(
            self.radius,
            dims.lengths(),
            self.reference.height(),
            self.frames,
        )
    }
}

/// Classifies the nanoparticles of every frame, closing a window every
/// `window_frames` frames. A trailing short window is kept.
pub fn loading_pass<I>(
    frames: I,
    reference: InterfaceReference,
    radius: f64,
    window_frames: usize,
) -> Result<LoadingSeries, Error>
where
    I: IntoIterator<Item = Result<Frame, IoError>>,
{
    let window_frames = window_frames.max(1);
    let mut classifier = OverlapClassifier::new(reference, radius);
    let mut windows = Vec::new();
    let mut sums: Vec<TrackSums> = Vec::new();
    let mut total_frames = 0;
    let mut window_start = 0;
    let mut in_window = 0;

    for frame in frames {
        let frame = frame?;
        if in_window == 0 {
            window_start = frame.index;
        }
        for (slot, np) in frame.of_kind(ParticleKind::Nanoparticle).enumerate() {
            classifier.classify(np.z());
            if slot == sums.len() {
                sums.push(TrackSums::default());
            }
            sums[slot].add(np.position);
        }
        total_frames += 1;
        in_window += 1;

        if in_window == window_frames {
            windows.push(LoadingWindow {
                first_frame: window_start,
                frames: in_window,
                distribution: classifier.take_window(),
            });
            in_window = 0;
        }
    }

    if in_window > 0 {
        windows.push(LoadingWindow {
            first_frame: window_start,
            frames: in_window,
            distribution: classifier.take_window(),
        });
    }

    if total_frames == 0 {
        return Err(Error::NoFrames { stage: "loading" });
    }

    log::info!(
        "loading pass: {} frames in {} windows against interface {}",
        total_frames,
        windows.len(),
        reference.height()
    );

    Ok(LoadingSeries {
        reference,
        radius,
        windows,
        tracks: sums.iter().map(TrackSums::finish).collect(),
        frames: total_frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::particle::Particle;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn frame(index: usize, nps: &[[f64; 3]]) -> Result<Frame, IoError> {
        let mut f = Frame::new(index, index * 10);
        f.particles
            .push(Particle::new(ParticleKind::Monomer, [0.0, 0.0, 1.0]));
        for &p in nps {
            f.particles.push(Particle::new(ParticleKind::Nanoparticle, p));
        }
        Ok(f)
    }

    #[test]
    fn windows_conserve_nanoparticle_count() {
        let frames = vec![
            frame(0, &[[0.0, 0.0, 95.0], [0.0, 0.0, 99.0]]),
            frame(1, &[[0.0, 0.0, 101.0], [0.0, 0.0, 150.0]]),
            frame(2, &[[0.0, 0.0, 50.0], [0.0, 0.0, 100.0]]),
        ];
        let series = loading_pass(frames, InterfaceReference(100.0), 2.0, 2).unwrap();
        assert_eq!(series.frames, 3);
        assert_eq!(series.windows.len(), 2);
        assert_eq!(series.windows[0].first_frame, 0);
        assert_eq!(series.windows[0].frames, 2);
        assert!(f64_eq(series.windows[0].distribution.total(), 4.0));
        assert_eq!(series.windows[1].first_frame, 2);
        assert_eq!(series.windows[1].frames, 1);
        assert!(f64_eq(series.windows[1].distribution.total(), 2.0));
        assert!(f64_eq(series.windows[1].distribution.inside, 1.5));
        assert!(f64_eq(series.total().total(), 6.0));
    }

    #[test]
    fn single_frame_windows_by_default() {
        let frames = vec![frame(0, &[[0.0, 0.0, 10.0]]), frame(1, &[[0.0, 0.0, 300.0]])];
        let series = loading_pass(frames, InterfaceReference(100.0), 2.0, 1).unwrap();
        assert_eq!(series.windows.len(), 2);
        assert_eq!(series.windows[0].embedding_ratio(), Some(1.0));
        assert_eq!(series.windows[1].embedding_ratio(), Some(0.0));
        assert_eq!(series.embedding_ratio(), Some(0.5));
    }

    #[test]
    fn tracks_follow_nanoparticle_order() {
        let frames = vec![
            frame(0, &[[0.0, 0.0, 10.0], [5.0, 5.0, 5.0]]),
            frame(1, &[[2.0, 0.0, 10.0], [5.0, 5.0, 5.0]]),
        ];
        let series = loading_pass(frames, InterfaceReference(100.0), 1.0, 1).unwrap();
        assert_eq!(series.tracks.len(), 2);
        assert_eq!(series.tracks[0].mean, [1.0, 0.0, 10.0]);
        assert!(f64_eq(series.tracks[0].rms, 1.0));
        assert!(f64_eq(series.tracks[1].rms, 0.0));
        assert_eq!(series.tracks[1].samples, 2);
    }

    #[test]
    fn empty_trajectory_is_an_error() {
        let frames: Vec<Result<Frame, IoError>> = Vec::new();
        let result = loading_pass(frames, InterfaceReference(1.0), 1.0, 1);
        assert!(matches!(result, Err(Error::NoFrames { .. })));
    }

    #[test]
    fn reader_errors_propagate() {
        let frames = vec![
            frame(0, &[]),
            Err(IoError::parse(crate::io::Format::Trajectory, 3, "boom")),
        ];
        let result = loading_pass(frames, InterfaceReference(1.0), 1.0, 1);
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn series_volume_fractions_are_per_frame() {
        let frames = vec![frame(0, &[[0.0, 0.0, 1.0]]), frame(1, &[[0.0, 0.0, 1.0]])];
        let series = loading_pass(frames, InterfaceReference(10.0), 1.0, 1).unwrap();
        let dims = SystemDimensions::new(10.0, 10.0, 20.0);
        let (brush, solvent) = series.volume_fractions(dims);
        let v = 4.0 / 3.0 * std::f64::consts::PI;
        assert!(f64_eq(brush.unwrap(), v / 1000.0));
        assert_eq!(solvent, Some(0.0));
    }
}
