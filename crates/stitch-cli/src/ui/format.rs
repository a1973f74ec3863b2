//! Formatting for sizes, durations and command summaries.

use owo_colors::OwoColorize;
use std::time::Duration;
use stitch_bundler::BuildReport;
use stitch_bundler::minify::MinifyReport;

use super::colors_enabled;

/// Bytes in the largest unit that keeps the value at or above 1.
///
/// ```
/// use stitch_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1536), "1.50 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

/// `50ms`, `1.50s` or `2m 5s`.
pub fn format_duration(duration: Duration) -> String {
    let millis = duration.as_millis();
    if millis < 1000 {
        format!("{}ms", millis)
    } else if millis < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn summary_line(label: &str, value: String) {
    if colors_enabled() {
        eprintln!("  {} {}", label.bold(), value.green());
    } else {
        eprintln!("  {} {}", label, value);
    }
}

pub fn print_build_summary(report: &BuildReport) {
    summary_line("Modules:", report.modules.to_string());
    summary_line(
        "Output:",
        format!("{} files, {}", report.files, format_size(report.bytes)),
    );
    summary_line("Time:", format_duration(report.elapsed));
}

pub fn print_minify_summary(report: &MinifyReport, elapsed: Duration) {
    summary_line(
        "Minified:",
        format!(
            "{} scripts, {} stylesheets, {} SVGs ({} copied)",
            report.scripts, report.styles, report.vectors, report.copied
        ),
    );
    summary_line(
        "Size:",
        format!(
            "{} -> {}",
            format_size(report.bytes_before),
            format_size(report.bytes_after)
        ),
    );
    summary_line("Time:", format_duration(elapsed));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1_572_864), "1.50 MB");
        assert_eq!(format_size(2_147_483_648), "2.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_print_summaries() {
        print_build_summary(&BuildReport {
            files: 3,
            bytes: 2048,
            modules: 2,
            elapsed: Duration::from_millis(120),
        });
        print_minify_summary(&MinifyReport::default(), Duration::from_secs(2));
    }
}
