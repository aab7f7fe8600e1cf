use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 59) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
        source = cause.source();
    }

    if let Some(hints) = HintCollector::collect(err) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn collect(err: &Error) -> Option<Vec<String>> {
        let mut collector = Self {
            hints: Vec::new(),
            has_typed_hints: false,
        };

        collector.collect_analysis_hints(err);
        collector.collect_io_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        if collector.hints.is_empty() {
            None
        } else {
            Some(collector.hints)
        }
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn collect_analysis_hints(&mut self, err: &Error) {
        use brush_trace::AnalysisError;

        let Some(analysis_err) = err.chain().find_map(|e| e.downcast_ref::<AnalysisError>())
        else {
            return;
        };

        self.has_typed_hints = true;

        match analysis_err {
            AnalysisError::ConfigParse(_) => {
                self.add("The config file has invalid TOML syntax or an unknown key");
                self.add("Compare it against resources/analysis.toml");
            }

            AnalysisError::InvalidConfig { field, .. } => {
                self.add(format!("Adjust '{}' in the config file or its flag", field));
                self.add("Lengths must be positive and fractions lie in [0, 1)");
            }

            AnalysisError::ThresholdNotFound { top_density, .. } => {
                self.add(format!(
                    "The averaged monomer profile never dropped below {}",
                    top_density
                ));
                self.add("Raise --top-density or lower --min-start");
                self.add("Or try --method inflection");
                self.add("Check that --max-height covers the whole brush");
            }

            AnalysisError::InflectionRejected { .. } => {
                self.add("The steepest descent is not flanked by a curvature change");
                self.add("Increase --start-offset to skip the grafting layer");
                self.add("Or try --method threshold");
                self.add("A coarser --bin-length smooths noisy profiles");
            }

            AnalysisError::NoFrames { stage } => {
                self.add(format!("Every frame was skipped before the {} finished", stage));
                self.add("Lower --equil or check that the trajectory is not truncated");
            }

            AnalysisError::EmptyProfile => {
                self.add("The averaged monomer profile holds no particles");
                self.add("Check --max-height and that the trajectory contains monomers");
            }

            AnalysisError::Io(io_err) => {
                self.add_io_hints(io_err);
            }
        }
    }

    fn collect_io_hints(&mut self, err: &Error) {
        use brush_trace::IoError;

        let Some(io_err) = err.chain().find_map(|e| e.downcast_ref::<IoError>()) else {
            return;
        };

        self.has_typed_hints = true;
        self.add_io_hints(io_err);
    }

    fn add_io_hints(&mut self, io_err: &brush_trace::IoError) {
        use brush_trace::IoError;

        match io_err {
            IoError::Io { source } => {
                self.collect_std_io_hints(source);
            }

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} of the {} file",
                    line, format
                ));
                self.add_format_specific_parse_hints(*format);
            }

            IoError::MissingDescriptor { .. } => {
                self.add("Each run directory needs exactly one .mpd descriptor");
                self.add("Pass the descriptor explicitly with --descriptor");
            }

            IoError::AmbiguousDescriptor { .. } => {
                self.add("Several .mpd files make the run ambiguous");
                self.add("Select one with --descriptor");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("The trajectory is expected at frames_<descriptor stem>.xyz");
                self.add("Use --trajectory if it lives elsewhere");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::InvalidData => {
                self.add("File contains invalid or corrupt data");
                self.add("Verify the file is plain text and not compressed");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of file encountered");
                self.add("The file may be truncated or incomplete");
            }

            ErrorKind::WriteZero => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            ErrorKind::BrokenPipe => {
                self.add("Broken pipe: output consumer terminated");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn add_format_specific_parse_hints(&mut self, format: brush_trace::io::Format) {
        use brush_trace::io::Format;

        match format {
            Format::Trajectory => {
                self.add("Each frame starts with the particle count, then a header line");
                self.add("Particle lines hold: type x y z");
            }

            Format::Descriptor => {
                self.add("Line 10 of the .mpd must read: label Lx Ly Lz");
                self.add("Box lengths must be positive numbers");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Verify the file exists and is readable");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            self.add("Ensure you have the required access rights");
            return;
        }

        if msg.contains("terminal") {
            self.add("Write the output to a file with -o/--output");
            self.add("Or pipe it into another program");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    let mut text = String::new();

    text.push_str(&err.to_string());

    let mut source = err.source();
    while let Some(cause) = source {
        text.push('\n');
        text.push_str(&cause.to_string());
        source = cause.source();
    }

    text.to_lowercase()
}
