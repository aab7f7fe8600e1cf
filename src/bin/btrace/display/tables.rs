use std::io::{self, Write};

use brush_trace::{
    LoadingSeries, ParticleKind, ProfileSummary, RadialHistogram, RunFiles, RunKey, StreamStats,
    VoxelReport,
};

use crate::util::text::truncate;

const INDENT: &str = "      ";

const BOX_INNER_WIDTH: usize = 62;
const SAFE_TABLE_WIDTH: usize = BOX_INNER_WIDTH - INDENT.len();

pub fn print_run_info(files: &RunFiles, particles_per_frame: usize) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let [lx, ly, lz] = files.dimensions.lengths();
    let rows = vec![
        ("Descriptor", file_name(&files.descriptor)),
        ("Trajectory", file_name(&files.trajectory)),
        ("Box", format!("{:.1} × {:.1} × {:.1}", lx, ly, lz)),
        ("Particles/Frame", format!("{}", particles_per_frame)),
    ];

    print_kv_table(&mut out, "Run", &rows);
}

pub fn print_profile_summary(summary: &ProfileSummary, interface_height: f64, stats: &StreamStats) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let averaged = &summary.averaged;
    let mut rows = vec![
        ("Frames Read", format!("{}", stats.frames)),
        ("Averaged", format!("{}", averaged.frames)),
        ("Warm-up", format!("{}", averaged.skipped)),
        ("Interface", format!("{:.3}", interface_height)),
    ];
    if let Some(peak) = averaged.mean_peak_z {
        rows.push(("Mean Peak z", format!("{:.3}", peak)));
    }
    if let Some(height) = averaged.mean_chain_height {
        rows.push(("Chain Height", format!("{:.3}", height)));
    }
    push_stream_flags(&mut rows, stats);

    print_kv_table(&mut out, "Density Profile", &rows);
}

pub fn print_loading_summary(series: &LoadingSeries, brush_phi: Option<f64>, solvent_phi: Option<f64>) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let total = series.total();
    let rows = vec![
        ("Interface", format!("{:.3}", series.reference.height())),
        ("Windows", format!("{}", series.windows.len())),
        ("Inside", format!("{:.2}", total.inside)),
        ("Outside", format!("{:.2}", total.outside)),
        ("Embedding", percent(series.embedding_ratio())),
        ("Brush φ", scientific(brush_phi)),
        ("Solvent φ", scientific(solvent_phi)),
        ("Tracked NPs", format!("{}", series.tracks.len())),
    ];

    print_kv_table(&mut out, "Nanoparticle Loading", &rows);
}

pub fn print_voxel_summary(report: &VoxelReport) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let [nx, ny, nz] = report.grid.shape();
    let mut rows = vec![
        ("Grid", format!("{} × {} × {}", nx, ny, nz)),
        ("Frames Binned", format!("{}", report.frames)),
        ("Warm-up", format!("{}", report.warmup_frames)),
        (
            "Monomers/Frame",
            format!("{:.1}", report.grid.sum_of(ParticleKind::Monomer)),
        ),
        (
            "NPs/Frame",
            format!("{:.1}", report.grid.sum_of(ParticleKind::Nanoparticle)),
        ),
    ];
    if report.out_of_bounds > 0 {
        rows.push(("Wrapped", format!("{}", report.out_of_bounds)));
    }
    if report.incomplete {
        rows.push(("Status", "incomplete".to_string()));
    }

    print_kv_table(&mut out, "Voxel Grid", &rows);
}

pub fn print_structure_summary(frame_index: usize, cutoff: f64, histogram: &RadialHistogram) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let peak = histogram
        .counts
        .iter()
        .enumerate()
        .max_by_key(|(_, c)| **c)
        .map(|(i, _)| i as f64 * histogram.bin_width);
    let rows = vec![
        ("Frame", format!("{}", frame_index)),
        ("z Cutoff", format!("{:.3}", cutoff)),
        ("Pairs", format!("{}", histogram.pairs())),
        ("Overflow", format!("{}", histogram.overflow)),
        ("Mode r", peak.map_or_else(|| "-".to_string(), |r| format!("{:.3}", r))),
    ];

    print_kv_table(&mut out, "Radial Distribution", &rows);
}

/// Embedding ratio of every run, ordered by run key.
pub fn print_batch_summary(rows: &[(RunKey, Option<f64>)], failures: usize) {
    let stderr = io::stderr();
    let mut out = stderr.lock();

    let name_w = 24usize;
    let sep_overhead = 5;
    let dist_w = SAFE_TABLE_WIDTH.saturating_sub(name_w + sep_overhead);
    let max_bar_width = dist_w.saturating_sub(8).min(20);

    let _ = writeln!(out, "{}┌─ Embedding by Run ─┐", INDENT);
    let _ = writeln!(
        out,
        "{}┌{name_line}┬{dist_line}┐",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<name_w$} │ {:<dist_w$} │",
        INDENT,
        "Run",
        "Embedding",
        name_w = name_w,
        dist_w = dist_w
    );
    let _ = writeln!(
        out,
        "{}├{name_line}┼{dist_line}┤",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );

    for (key, ratio) in rows {
        let cell = match ratio {
            Some(r) => format!("{}  {:>5.1}%", make_bar(r * 100.0, max_bar_width), r * 100.0),
            None => "no nanoparticles".to_string(),
        };
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:<dist_w$} │",
            INDENT,
            truncate(&key.to_string(), name_w),
            cell,
            name_w = name_w,
            dist_w = dist_w
        );
    }

    if failures > 0 {
        let _ = writeln!(
            out,
            "{}│ {:<name_w$} │ {:<dist_w$} │",
            INDENT,
            "...",
            format!("({} runs failed)", failures),
            name_w = name_w,
            dist_w = dist_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{name_line}┴{dist_line}┘",
        INDENT,
        name_line = "─".repeat(name_w + 2),
        dist_line = "─".repeat(dist_w + 2)
    );
}

fn push_stream_flags(rows: &mut Vec<(&str, String)>, stats: &StreamStats) {
    if stats.skipped_lines > 0 {
        rows.push(("Skipped Lines", format!("{}", stats.skipped_lines)));
    }
    let mismatches = stats.count_mismatches + stats.header_mismatches + stats.group_mismatches;
    if mismatches > 0 {
        rows.push(("Mismatches", format!("{}", mismatches)));
    }
    if stats.truncated {
        rows.push(("Last Frame", "truncated".to_string()));
    }
}

fn print_kv_table(out: &mut impl Write, title: &str, rows: &[(&str, String)]) {
    let key_w = 16usize;
    let sep_overhead = 6;
    let val_w = SAFE_TABLE_WIDTH.saturating_sub(key_w + sep_overhead);

    let _ = writeln!(
        out,
        "{}┌─ {} ─┐",
        INDENT,
        truncate(title, SAFE_TABLE_WIDTH - 6)
    );
    let _ = writeln!(
        out,
        "{}┌{k_line}┬{v_line}┐",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
    let _ = writeln!(
        out,
        "{}│ {:<key_w$} │ {:>val_w$} │",
        INDENT,
        "Metric",
        "Value",
        key_w = key_w,
        val_w = val_w
    );
    let _ = writeln!(
        out,
        "{}├{k_line}┼{v_line}┤",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );

    for (key, val) in rows {
        let _ = writeln!(
            out,
            "{}│ {:<key_w$} │ {:>val_w$} │",
            INDENT,
            truncate(key, key_w),
            truncate(val, val_w),
            key_w = key_w,
            val_w = val_w
        );
    }

    let _ = writeln!(
        out,
        "{}└{k_line}┴{v_line}┘",
        INDENT,
        k_line = "─".repeat(key_w + 2),
        v_line = "─".repeat(val_w + 2)
    );
}

fn make_bar(pct: f64, max_width: usize) -> String {
    let filled = (((pct / 100.0) * max_width as f64).round() as usize).min(max_width);
    let empty = max_width.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .unwrap_or(path.as_os_str())
        .to_string_lossy()
        .into_owned()
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

fn scientific(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3e}", v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_is_clamped_to_width() {
        assert_eq!(make_bar(50.0, 4), "██░░");
        assert_eq!(make_bar(150.0, 4), "████");
        assert_eq!(make_bar(0.0, 3), "░░░");
    }

    #[test]
    fn kv_table_lines_share_one_width() {
        let mut buf = Vec::new();
        print_kv_table(
            &mut buf,
            "Run",
            &[("Box", "10.0 × 10.0 × 80.0".to_string()), ("Frames", "12".to_string())],
        );
        let text = String::from_utf8(buf).unwrap();
        let widths: Vec<usize> = text
            .lines()
            .skip(1)
            .map(|l| l.chars().count())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]));
        assert!(text.contains("│ Frames"));
    }
}
