use super::error::Error;
use crate::model::frame::Frame;
use crate::model::particle::ParticleKind;
use crate::model::profile::{DensityProfile, FrameProfile};
use std::collections::VecDeque;

/// Fixed-width z binning shared by every profile of one analysis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProfileBinning {
    bin_length: f64,
    total_bins: usize,
}

impl ProfileBinning {
    /// Bins of width `bin_length` covering `[0, max_height)`; at least one.
    pub fn new(bin_length: f64, max_height: f64) -> Self {
        let total_bins = ((max_height / bin_length).floor() as usize).max(1);
        Self {
            bin_length,
            total_bins,
        }
    }

    #[inline]
    pub fn bin_length(&self) -> f64 {
        self.bin_length
    }

    #[inline]
    pub fn total_bins(&self) -> usize {
        self.total_bins
    }

    /// `floor(z / bin_length)` clamped into the profile.
    #[inline]
    pub fn bin_index(&self, z: f64) -> usize {
        let raw = (z / self.bin_length).floor().max(0.0) as usize;
        raw.min(self.total_bins - 1)
    }

    /// Bins the monomers and nanoparticles of one frame.
    pub fn profile_frame(&self, frame: &Frame) -> FrameProfile {
        let mut profile = FrameProfile::zeroed(frame.index, self.total_bins);
        for particle in &frame.particles {
            let bins = match particle.kind {
                ParticleKind::Monomer => &mut profile.monomer.bins,
                ParticleKind::Nanoparticle => &mut profile.nanoparticle.bins,
                ParticleKind::Separator => continue,
            };
            bins[self.bin_index(particle.z())] += 1.0;
        }
        profile.peak_monomer_z = frame.peak_monomer_z();
        profile.mean_chain_height = frame.mean_chain_height();
        profile
    }
}

/// Element-wise mean of the frame profiles left after warm-up.
#[derive(Debug, Clone, PartialEq)]
pub struct AveragedProfile {
    pub monomer: DensityProfile,
    pub nanoparticle: DensityProfile,
    /// Frames that entered the mean.
    pub frames: usize,
    /// Leading frames discarded as warm-up.
    pub skipped: usize,
    /// Mean of the per-frame highest monomer z over the averaged frames.
    pub mean_peak_z: Option<f64>,
    /// Mean chain z-extent over the averaged frames.
    pub mean_chain_height: Option<f64>,
}

/// Running mean of the frame profiles past the warm-up.
///
/// The warm-up length is fixed up front from the number of frames the
/// trajectory holds, so only the running sums are kept while streaming.
#[derive(Debug, Clone)]
pub struct EquilibratedAverage {
    warmup: usize,
    seen: usize,
    monomer: DensityProfile,
    nanoparticle: DensityProfile,
    peak: RunningMean,
    chain_height: RunningMean,
}

impl EquilibratedAverage {
    /// Averager for a trajectory of `total_frames` frames, skipping the first
    /// `floor(total_frames * equil_percent)`.
    pub fn new(binning: &ProfileBinning, equil_percent: f64, total_frames: usize) -> Self {
        Self {
            warmup: (total_frames as f64 * equil_percent).floor() as usize,
            seen: 0,
            monomer: DensityProfile::zeroed(binning.total_bins()),
            nanoparticle: DensityProfile::zeroed(binning.total_bins()),
            peak: RunningMean::default(),
            chain_height: RunningMean::default(),
        }
    }

    pub fn push(&mut self, profile: FrameProfile) {
        debug_assert_eq!(profile.monomer.len(), self.monomer.len());
        self.seen += 1;
        if self.seen <= self.warmup {
            return;
        }
        self.monomer.add_assign(&profile.monomer);
        self.nanoparticle.add_assign(&profile.nanoparticle);
        self.peak.push(profile.peak_monomer_z);
        self.chain_height.push(profile.mean_chain_height);
    }

    /// Frames pushed so far, warm-up included.
    #[inline]
    pub fn len(&self) -> usize {
        self.seen
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seen == 0
    }

    #[inline]
    pub fn warmup(&self) -> usize {
        self.warmup
    }

    pub fn finish(self) -> Result<AveragedProfile, Error> {
        let skipped = self.warmup.min(self.seen);
        let frames = self.seen - skipped;
        if frames == 0 {
            return Err(Error::NoFrames {
                stage: "profile averaging",
            });
        }

        let scale = 1.0 / frames as f64;
        Ok(AveragedProfile {
            monomer: self.monomer.scaled(scale),
            nanoparticle: self.nanoparticle.scaled(scale),
            frames,
            skipped,
            mean_peak_z: self.peak.mean(),
            mean_chain_height: self.chain_height.mean(),
        })
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct RunningMean {
    sum: f64,
    count: usize,
}

impl RunningMean {
    fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.sum += v;
            self.count += 1;
        }
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Running mean over the most recent `window` profiles.
#[derive(Debug, Clone)]
pub struct RollingProfile {
    window: usize,
    recent: VecDeque<DensityProfile>,
    sum: DensityProfile,
}

impl RollingProfile {
    pub fn new(window: usize, total_bins: usize) -> Self {
        let window = window.max(1);
        Self {
            window,
            recent: VecDeque::with_capacity(window),
            sum: DensityProfile::zeroed(total_bins),
        }
    }

    /// Adds a profile, evicting the oldest once the window is full, and
    /// returns the mean of the profiles now held.
    pub fn push(&mut self, profile: DensityProfile) -> DensityProfile {
        if self.recent.len() == self.window {
            if let Some(oldest) = self.recent.pop_front() {
                self.sum.sub_assign(&oldest);
            }
        }
        self.sum.add_assign(&profile);
        self.recent.push_back(profile);
        self.mean()
    }

    pub fn mean(&self) -> DensityProfile {
        if self.recent.is_empty() {
            return DensityProfile::zeroed(self.sum.len());
        }
        self.sum.scaled(1.0 / self.recent.len() as f64)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.recent.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.recent.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.recent.len() == self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::particle::Particle;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn frame(index: usize, monomer_z: &[f64], np_z: &[f64]) -> Frame {
        let mut frame = Frame::new(index, 0);
        frame
            .particles
            .push(Particle::new(ParticleKind::Separator, [0.0; 3]));
        for &z in monomer_z {
            frame
                .particles
                .push(Particle::new(ParticleKind::Monomer, [0.0, 0.0, z]));
        }
        for &z in np_z {
            frame
                .particles
                .push(Particle::new(ParticleKind::Nanoparticle, [0.0, 0.0, z]));
        }
        frame
    }

    #[test]
    fn bin_count_and_index_clamping() {
        let binning = ProfileBinning::new(10.0, 1000.0);
        assert_eq!(binning.total_bins(), 100);
        assert_eq!(binning.bin_index(0.0), 0);
        assert_eq!(binning.bin_index(9.999), 0);
        assert_eq!(binning.bin_index(10.0), 1);
        assert_eq!(binning.bin_index(-3.0), 0);
        assert_eq!(binning.bin_index(1000.0), 99);
        assert_eq!(binning.bin_index(5.0e6), 99);
    }

    #[test]
    fn frame_profile_bins_each_kind_and_skips_separators() {
        let binning = ProfileBinning::new(10.0, 50.0);
        let f = frame(3, &[1.0, 2.0, 15.0, 49.0], &[25.0]);
        let profile = binning.profile_frame(&f);
        assert_eq!(profile.frame_index, 3);
        assert_eq!(profile.monomer.bins, vec![2.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(profile.nanoparticle.bins, vec![0.0, 0.0, 1.0, 0.0, 0.0]);
        assert_eq!(profile.peak_monomer_z, Some(49.0));
        assert_eq!(profile.mean_chain_height, Some(49.0));
        assert_eq!(profile.monomer.total() + profile.nanoparticle.total(), 5.0);
    }

    #[test]
    fn binning_the_same_frame_twice_is_identical() {
        let binning = ProfileBinning::new(2.5, 100.0);
        let f = frame(0, &[0.1, 7.7, 33.3, 99.9, 150.0], &[12.0, 64.0]);
        assert_eq!(binning.profile_frame(&f), binning.profile_frame(&f));
    }

    #[test]
    fn equilibrated_average_skips_leading_fraction() {
        let binning = ProfileBinning::new(10.0, 30.0);
        let mut avg = EquilibratedAverage::new(&binning, 0.2, 5);
        avg.push(binning.profile_frame(&frame(0, &[1.0, 1.0, 1.0, 1.0], &[])));
        for i in 1..5 {
            avg.push(binning.profile_frame(&frame(i, &[1.0, 11.0], &[21.0])));
        }
        let result = avg.finish().unwrap();
        assert_eq!(result.skipped, 1);
        assert_eq!(result.frames, 4);
        assert_eq!(result.monomer.bins, vec![1.0, 1.0, 0.0]);
        assert_eq!(result.nanoparticle.bins, vec![0.0, 0.0, 1.0]);
        assert!(f64_eq(result.mean_peak_z.unwrap(), 11.0));
        assert!(f64_eq(result.mean_chain_height.unwrap(), 11.0));
    }

    #[test]
    fn equilibrated_average_without_frames_is_an_error() {
        let binning = ProfileBinning::new(10.0, 30.0);
        let avg = EquilibratedAverage::new(&binning, 0.5, 0);
        assert!(matches!(avg.finish(), Err(Error::NoFrames { .. })));
    }

    #[test]
    fn equilibrated_average_state_does_not_grow_with_frames() {
        let binning = ProfileBinning::new(1.0, 1000.0);
        let mut avg = EquilibratedAverage::new(&binning, 0.2, 5000);
        assert_eq!(avg.warmup(), 1000);
        for i in 0..5000 {
            avg.push(binning.profile_frame(&frame(i, &[0.5, 2.5], &[])));
        }
        assert_eq!(avg.len(), 5000);
        assert_eq!(avg.monomer.len(), 1000);
        assert_eq!(avg.nanoparticle.len(), 1000);
        assert_eq!(avg.monomer.bins[0], 4000.0);

        let result = avg.finish().unwrap();
        assert_eq!(result.skipped, 1000);
        assert_eq!(result.frames, 4000);
        assert_eq!(result.monomer.bins[0], 1.0);
        assert_eq!(result.monomer.bins[2], 1.0);
    }

    #[test]
    fn short_trajectory_averages_what_arrived_after_warmup() {
        let binning = ProfileBinning::new(10.0, 30.0);
        let mut avg = EquilibratedAverage::new(&binning, 0.5, 4);
        avg.push(binning.profile_frame(&frame(0, &[1.0], &[])));
        avg.push(binning.profile_frame(&frame(1, &[1.0], &[])));
        assert!(matches!(avg.clone().finish(), Err(Error::NoFrames { .. })));
        avg.push(binning.profile_frame(&frame(2, &[11.0], &[])));
        let result = avg.finish().unwrap();
        assert_eq!((result.skipped, result.frames), (2, 1));
        assert_eq!(result.monomer.bins, vec![0.0, 1.0, 0.0]);
    }

    #[test]
    fn rolling_profile_keeps_last_window() {
        let mut rolling = RollingProfile::new(2, 2);
        let m = rolling.push(DensityProfile::from_bins(vec![2.0, 0.0]));
        assert_eq!(m.bins, vec![2.0, 0.0]);
        let m = rolling.push(DensityProfile::from_bins(vec![4.0, 2.0]));
        assert_eq!(m.bins, vec![3.0, 1.0]);
        assert!(rolling.is_full());
        let m = rolling.push(DensityProfile::from_bins(vec![0.0, 6.0]));
        assert_eq!(m.bins, vec![2.0, 4.0]);
        assert_eq!(rolling.len(), 2);
    }
}
