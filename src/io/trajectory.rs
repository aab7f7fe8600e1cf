use crate::io::{Format, error::Error};
use crate::model::frame::Frame;
use crate::model::particle::{Particle, ParticleKind};
use std::io::BufRead;

/// Counters describing what a [`TrajectoryReader`] saw and tolerated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub lines_read: usize,
    /// Particle lines dropped for a bad field count, type code or coordinate.
    pub skipped_lines: usize,
    pub frames: usize,
    pub skipped_frames: usize,
    pub count_mismatches: usize,
    pub header_mismatches: usize,
    pub group_mismatches: usize,
    /// Set when the input ended inside a frame.
    pub truncated: bool,
}

/// Forward-only frame reader over a trajectory dump.
///
/// Every frame occupies exactly `particles_per_frame + 2` lines: a count
/// line, a header line and one line per particle. Frame boundaries are
/// derived from line positions alone, so a malformed particle line is
/// dropped without shifting any later frame.
pub struct TrajectoryReader<R> {
    reader: R,
    particles_per_frame: usize,
    header: Option<String>,
    expected_groups: Option<usize>,
    line: String,
    line_no: usize,
    next_frame: usize,
    stats: StreamStats,
    done: bool,
}

impl<R: BufRead> TrajectoryReader<R> {
    /// Opens a trajectory whose first two lines carry the particle count and
    /// the header name.
    pub fn new(reader: R) -> Result<Self, Error> {
        let mut this = Self::unprimed(reader, 0);

        if this.read_line()? == 0 {
            return Err(Error::parse(Format::Trajectory, 1, "missing particle count line"));
        }
        let count = this.line.trim();
        let particles_per_frame = count.parse::<usize>().map_err(|_| {
            Error::parse(
                Format::Trajectory,
                1,
                format!("invalid particle count '{count}'"),
            )
        })?;
        if particles_per_frame == 0 {
            return Err(Error::parse(
                Format::Trajectory,
                1,
                "particle count must be positive",
            ));
        }
        this.particles_per_frame = particles_per_frame;

        if this.read_line()? == 0 {
            return Err(Error::parse(Format::Trajectory, 2, "missing header line"));
        }
        this.header = Some(this.line.trim().to_string());

        Ok(this)
    }

    /// Opens a trajectory with an externally known particle count. The first
    /// line is read as the count line of frame 0.
    pub fn with_particles_per_frame(
        reader: R,
        particles_per_frame: usize,
    ) -> Result<Self, Error> {
        if particles_per_frame == 0 {
            return Err(Error::parse(
                Format::Trajectory,
                0,
                "particle count must be positive",
            ));
        }
        Ok(Self::unprimed(reader, particles_per_frame))
    }

    fn unprimed(reader: R, particles_per_frame: usize) -> Self {
        Self {
            reader,
            particles_per_frame,
            header: None,
            expected_groups: None,
            line: String::new(),
            line_no: 0,
            next_frame: 0,
            stats: StreamStats::default(),
            done: false,
        }
    }

    /// Flags frames whose separator-delimited group count differs from
    /// `groups`.
    pub fn expected_groups(mut self, groups: Option<usize>) -> Self {
        self.expected_groups = groups;
        self
    }

    #[inline]
    pub fn particles_per_frame(&self) -> usize {
        self.particles_per_frame
    }

    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    #[inline]
    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    /// Lines per frame, count and header included.
    #[inline]
    pub fn period(&self) -> usize {
        self.particles_per_frame + 2
    }

    fn read_line(&mut self) -> Result<usize, Error> {
        self.line.clear();
        let n = self.reader.read_line(&mut self.line)?;
        if n > 0 {
            self.line_no += 1;
            self.stats.lines_read += 1;
        }
        Ok(n)
    }

    fn frame_start(&self) -> usize {
        self.next_frame * self.period()
    }

    fn end_of_input(&mut self, partial: bool) {
        if partial {
            self.stats.truncated = true;
            log::debug!(
                "trajectory ended inside frame {} (line {}); partial frame dropped",
                self.next_frame,
                self.line_no
            );
        }
        self.done = true;
    }

    /// Consumes up to `n` whole frames without parsing their particle lines.
    /// Returns the number of frames actually passed over.
    pub fn skip_frames(&mut self, n: usize) -> Result<usize, Error> {
        let mut skipped = 0;
        while skipped < n && !self.done {
            let end = self.frame_start() + self.period();
            let mut partial = false;
            while self.line_no < end {
                if self.read_line()? == 0 {
                    self.end_of_input(partial);
                    return Ok(skipped);
                }
                partial = true;
            }
            self.next_frame += 1;
            self.stats.skipped_frames += 1;
            skipped += 1;
        }
        Ok(skipped)
    }

    /// Counts the complete frames left in the input without parsing any
    /// particle line. A trailing partial frame is not counted.
    pub fn count_frames(mut self) -> Result<usize, Error> {
        self.skip_frames(usize::MAX)
    }

    fn check_count_line(&mut self) {
        let count = self.line.trim();
        if count.parse::<usize>().ok() != Some(self.particles_per_frame) {
            self.stats.count_mismatches += 1;
            log::warn!(
                "frame {} (line {}): count line '{}' disagrees with {} particles per frame",
                self.next_frame,
                self.line_no,
                count,
                self.particles_per_frame
            );
        }
    }

    fn check_header_line(&mut self) {
        let header = self.line.trim();
        let Some(expected) = self.header.as_deref() else {
            self.header = Some(header.to_string());
            return;
        };
        if expected != header {
            self.stats.header_mismatches += 1;
            log::warn!(
                "frame {} (line {}): header '{}' differs from '{}'",
                self.next_frame,
                self.line_no,
                header,
                expected
            );
        }
    }

    fn parse_particle(&self) -> Result<Particle, String> {
        let mut fields = self.line.split_whitespace();
        let (Some(code), Some(x), Some(y), Some(z), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            let count = self.line.split_whitespace().count();
            return Err(format!("expected 4 fields, found {count}"));
        };
        let kind = code.parse::<ParticleKind>().map_err(|e| e.to_string())?;
        let coord = |s: &str| {
            s.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("invalid coordinate '{s}'"))
        };
        Ok(Particle::new(kind, [coord(x)?, coord(y)?, coord(z)?]))
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, Error> {
        let start = self.frame_start();
        let mut partial = self.line_no > start;

        if self.line_no == start {
            if self.read_line()? == 0 {
                self.end_of_input(false);
                return Ok(None);
            }
            partial = !self.line.trim().is_empty();
            if partial && (self.next_frame > 0 || self.header.is_none()) {
                self.check_count_line();
            }
        }
        if self.line_no == start + 1 {
            if self.read_line()? == 0 {
                self.end_of_input(partial);
                return Ok(None);
            }
            partial = true;
            self.check_header_line();
        }

        let mut frame = Frame::new(self.next_frame, start);
        frame.particles.reserve(self.particles_per_frame);
        while self.line_no < start + self.period() {
            if self.read_line()? == 0 {
                self.end_of_input(partial);
                return Ok(None);
            }
            match self.parse_particle() {
                Ok(particle) => frame.particles.push(particle),
                Err(details) => {
                    self.stats.skipped_lines += 1;
                    log::warn!("line {}: skipped particle record: {}", self.line_no, details);
                }
            }
        }

        if let Some(expected) = self.expected_groups {
            let found = frame.groups().len();
            if found != expected {
                self.stats.group_mismatches += 1;
                log::warn!(
                    "frame {}: found {} groups, expected {}",
                    frame.index,
                    found,
                    expected
                );
            }
        }

        self.next_frame += 1;
        self.stats.frames += 1;
        Ok(Some(frame))
    }
}

impl<R: BufRead> Iterator for TrajectoryReader<R> {
    type Item = Result<Frame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_frame() {
            Ok(frame) => frame.map(Ok),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn reader(text: &str) -> TrajectoryReader<Cursor<&[u8]>> {
        TrajectoryReader::new(Cursor::new(text.as_bytes())).expect("reader")
    }

    const TWO_FRAMES: &str = "\
4
brush
1 0.0 0.0 1.0
1 0.0 0.0
2 0.0 0.0 5.0
0 0.0 0.0 0.0
4
brush
1\t0.0\t0.0\t2.0
1 0.0 0.0 3.0
2 1.0 1.0 1.0
1 0.0 0.0 4.0
";

    #[test]
    fn reads_count_and_header() {
        let r = reader(TWO_FRAMES);
        assert_eq!(r.particles_per_frame(), 4);
        assert_eq!(r.header(), Some("brush"));
        assert_eq!(r.period(), 6);
    }

    #[test]
    fn malformed_line_is_skipped_and_parsing_continues() {
        let mut r = reader(TWO_FRAMES);
        let first = r.next().unwrap().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.start_line, 0);
        assert_eq!(first.particle_count(), 3);
        assert_eq!(first.particles[1].kind, ParticleKind::Nanoparticle);

        let second = r.next().unwrap().unwrap();
        assert_eq!(second.index, 1);
        assert_eq!(second.start_line, 6);
        assert_eq!(second.particle_count(), 4);
        assert_eq!(second.particles[0].position, [0.0, 0.0, 2.0]);

        assert!(r.next().is_none());
        let stats = r.stats();
        assert_eq!(stats.skipped_lines, 1);
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.lines_read, 12);
        assert!(!stats.truncated);
    }

    #[test]
    fn unknown_type_code_and_bad_coordinate_are_skipped() {
        let text = "2\nh\n7 0 0 1\n1 0 zero 1\n";
        let mut r = reader(text);
        let frame = r.next().unwrap().unwrap();
        assert!(frame.particles.is_empty());
        assert_eq!(r.stats().skipped_lines, 2);
    }

    #[test]
    fn partial_trailing_frame_is_dropped() {
        let text = "2\nh\n1 0 0 1\n1 0 0 2\n2\nh\n1 0 0 3\n";
        let mut r = reader(text);
        assert!(r.next().unwrap().is_ok());
        assert!(r.next().is_none());
        assert!(r.stats().truncated);
        assert_eq!(r.stats().frames, 1);
    }

    #[test]
    fn trailing_blank_line_is_not_truncation() {
        let text = "1\nh\n1 0 0 1\n\n";
        let mut r = reader(text);
        assert!(r.next().unwrap().is_ok());
        assert!(r.next().is_none());
        assert!(!r.stats().truncated);
    }

    #[test]
    fn mismatched_count_and_header_are_flagged() {
        let text = "1\nh\n1 0 0 1\n3\nother\n1 0 0 2\n";
        let frames: Vec<_> = reader(text).collect();
        assert_eq!(frames.len(), 2);
        let mut r = reader(text);
        while r.next().is_some() {}
        assert_eq!(r.stats().count_mismatches, 1);
        assert_eq!(r.stats().header_mismatches, 1);
    }

    #[test]
    fn group_count_mismatch_is_flagged() {
        let text = "4\nh\n0 0 0 0\n1 0 0 1\n0 0 0 0\n1 0 0 1\n";
        let mut r = reader(text).expected_groups(Some(3));
        assert_eq!(r.next().unwrap().unwrap().groups().len(), 2);
        assert_eq!(r.stats().group_mismatches, 1);
    }

    #[test]
    fn skip_frames_passes_over_whole_frames() {
        let mut r = reader(TWO_FRAMES);
        assert_eq!(r.skip_frames(1).unwrap(), 1);
        let frame = r.next().unwrap().unwrap();
        assert_eq!(frame.index, 1);
        assert_eq!(frame.particle_count(), 4);
        assert_eq!(r.stats().skipped_lines, 0);
        assert_eq!(r.skip_frames(5).unwrap(), 0);
    }

    #[test]
    fn count_frames_ignores_trailing_partial_frame() {
        assert_eq!(reader(TWO_FRAMES).count_frames().unwrap(), 2);
        let text = "2\nh\n1 0 0 1\n1 0 0 2\n2\nh\n1 0 0 3\n";
        assert_eq!(reader(text).count_frames().unwrap(), 1);
    }

    #[test]
    fn external_count_reads_first_line_as_frame_line() {
        let text = "2\nh\n1 0 0 1\n2 0 0 2\n";
        let mut r = TrajectoryReader::with_particles_per_frame(Cursor::new(text.as_bytes()), 2)
            .expect("reader");
        let frame = r.next().unwrap().unwrap();
        assert_eq!(frame.particle_count(), 2);
        assert_eq!(r.header(), Some("h"));
        assert_eq!(r.stats().count_mismatches, 0);
    }

    #[test]
    fn zero_external_count_is_rejected() {
        let input = Cursor::new(b"1 0 0 1\n".as_slice());
        let err = TrajectoryReader::with_particles_per_frame(input, 0)
            .err()
            .expect("error");
        assert!(matches!(err, Error::Parse { line: 0, .. }));
    }

    #[test]
    fn non_finite_coordinates_are_skipped() {
        let text = "4\nh\n2 0 0 99.0\n2 0 0 nan\n1 inf 0 1\n1 0 -infinity 1\n";
        let mut r = reader(text);
        let frame = r.next().unwrap().unwrap();
        assert_eq!(frame.particle_count(), 1);
        assert_eq!(frame.particles[0].position, [0.0, 0.0, 99.0]);
        assert_eq!(r.stats().skipped_lines, 3);
    }

    #[test]
    fn invalid_particle_count_is_fatal() {
        let err = TrajectoryReader::new(Cursor::new(b"abc\nh\n".as_slice()))
            .err()
            .expect("error");
        assert!(matches!(err, Error::Parse { line: 1, .. }));
    }

    #[test]
    fn empty_input_is_fatal() {
        assert!(TrajectoryReader::new(Cursor::new(b"".as_slice())).is_err());
    }
}
