//! Input expansion and batch reporting.

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use agcodecs::{ImageFormat, Status};

/// Expand input patterns into a deduplicated list of PNG/WebP files.
///
/// Accepts glob patterns, plain paths, and directories (searched
/// recursively). Duplicates are dropped by canonical path and the result is
/// sorted largest first so parallel workers finish together.
pub fn expand_inputs(patterns: &[String]) -> anyhow::Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut files = Vec::new();

    for pattern in patterns {
        if pattern.contains(['*', '?', '[']) {
            for entry in glob::glob(pattern)? {
                let path = entry?;
                if path.is_file() && is_image(&path) {
                    push_unique(path, &mut seen, &mut files);
                }
            }
        } else {
            let path = PathBuf::from(pattern);
            if path.is_dir() {
                collect_dir(&path, &mut seen, &mut files);
            } else if path.is_file() {
                push_unique(path, &mut seen, &mut files);
            } else {
                anyhow::bail!("not a file or directory: {}", path.display());
            }
        }
    }

    files.sort_by_cached_key(|p| std::cmp::Reverse(p.metadata().map(|m| m.len()).unwrap_or(0)));
    Ok(files)
}

/// Whether the extension names a decodable format.
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        .is_some()
}

fn push_unique(path: PathBuf, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    if let Ok(canonical) = path.canonicalize() {
        if seen.insert(canonical) {
            files.push(path);
        }
    }
}

fn collect_dir(dir: &Path, seen: &mut HashSet<PathBuf>, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "cannot read directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_dir(&path, seen, files);
        } else if path.is_file() && is_image(&path) {
            push_unique(path, seen, files);
        }
    }
}

/// Result of processing a single file.
#[derive(Debug)]
pub struct FileResult {
    pub input_path: PathBuf,
    pub input_size: u64,
    pub dimensions: Option<(u32, u32)>,
    pub output_size: Option<u64>,
    pub output_path: Option<PathBuf>,
    pub skipped: bool,
    /// Codec status; `Success` unless decode or encode failed.
    pub status: Status,
    pub error: Option<String>,
    pub duration: Duration,
}

/// Accumulated batch processing summary.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<FileResult>,
}

impl BatchSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: FileResult) {
        self.results.push(result);
    }

    pub fn total_input_size(&self) -> u64 {
        self.results.iter().map(|r| r.input_size).sum()
    }

    pub fn total_output_size(&self) -> u64 {
        self.results.iter().filter_map(|r| r.output_size).sum()
    }

    pub fn success_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.error.is_none() && !r.skipped)
            .count()
    }

    pub fn skip_count(&self) -> usize {
        self.results.iter().filter(|r| r.skipped).count()
    }

    pub fn error_count(&self) -> usize {
        self.results.iter().filter(|r| r.error.is_some()).count()
    }

    /// Print a human-readable summary table, largest input first.
    pub fn print_report(&self) {
        if self.results.is_empty() {
            println!("No files processed.");
            return;
        }

        println!(
            "{:<32} {:>11} {:>10} {:>10} {:>8} {:>8}",
            "File", "Size", "Input", "Output", "Change", "Time"
        );
        println!("{}", "-".repeat(84));

        for r in &self.results {
            let name = short_name(&r.input_path);
            let dims = r
                .dimensions
                .map(|(w, h)| format!("{w}x{h}"))
                .unwrap_or_default();

            if let Some(err) = &r.error {
                println!(
                    "{:<32} {:>11} {:>10} {} ({})",
                    name,
                    dims,
                    format_size(r.input_size),
                    err,
                    r.status
                );
            } else if r.skipped {
                println!(
                    "{:<32} {:>11} {:>10} {:>10}",
                    name,
                    dims,
                    format_size(r.input_size),
                    "skipped"
                );
            } else if let Some(out_size) = r.output_size {
                println!(
                    "{:<32} {:>11} {:>10} {:>10} {:>8} {:>8}",
                    name,
                    dims,
                    format_size(r.input_size),
                    format_size(out_size),
                    percent_change(r.input_size, out_size),
                    format_duration(r.duration),
                );
            }
        }

        println!("{}", "-".repeat(84));
        let total_in = self.total_input_size();
        let total_out = self.total_output_size();
        println!(
            "{} processed, {} skipped, {} errors | {} -> {} ({})",
            self.success_count(),
            self.skip_count(),
            self.error_count(),
            format_size(total_in),
            format_size(total_out),
            percent_change(total_in, total_out),
        );
    }

    /// Write results as CSV.
    pub fn write_csv(&self, path: &Path) -> anyhow::Result<()> {
        let mut f = std::io::BufWriter::new(std::fs::File::create(path)?);
        writeln!(
            f,
            "input,width,height,input_size,output,output_size,change_pct,duration_ms,status,status_code"
        )?;
        for r in &self.results {
            let status = if r.skipped {
                "skipped"
            } else {
                r.status.as_str()
            };
            let (w, h) = r.dimensions.unwrap_or((0, 0));
            let out_path = r
                .output_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let out_size = r.output_size.unwrap_or(0);
            let change = match r.output_size {
                Some(out) if r.input_size > 0 => {
                    (out as f64 - r.input_size as f64) / r.input_size as f64 * 100.0
                }
                _ => 0.0,
            };
            writeln!(
                f,
                "{},{w},{h},{},{out_path},{out_size},{change:.1},{},{status},{}",
                r.input_path.display(),
                r.input_size,
                r.duration.as_millis(),
                r.status.code(),
            )?;
        }
        f.flush()?;
        Ok(())
    }
}

fn short_name(path: &Path) -> String {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
    let chars: Vec<char> = name.chars().collect();
    if chars.len() > 30 {
        let tail: String = chars[chars.len() - 28..].iter().collect();
        format!("..{tail}")
    } else {
        name.to_string()
    }
}

/// Signed size change as a percentage of `before`.
pub fn percent_change(before: u64, after: u64) -> String {
    if before == 0 {
        return "N/A".to_string();
    }
    let pct = (after as f64 - before as f64) / before as f64 * 100.0;
    format!("{pct:+.1}%")
}

fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms >= 1000 {
        format!("{:.1}s", ms as f64 / 1000.0)
    } else {
        format!("{ms}ms")
    }
}

/// Format a byte size into a human-readable string.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, status: Status, output_size: Option<u64>) -> FileResult {
        FileResult {
            input_path: PathBuf::from(name),
            input_size: 1000,
            dimensions: Some((4, 2)),
            output_size,
            output_path: output_size.map(|_| PathBuf::from("out.png")),
            skipped: false,
            status,
            error: (status != Status::Success).then(|| status.to_string()),
            duration: Duration::from_millis(12),
        }
    }

    #[test]
    fn sizes_and_changes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(percent_change(1000, 750), "-25.0%");
        assert_eq!(percent_change(0, 10), "N/A");
    }

    #[test]
    fn counts() {
        let mut summary = BatchSummary::new();
        summary.push(result("a.png", Status::Success, Some(800)));
        summary.push(result("b.webp", Status::ReadingPastEnd, None));
        assert_eq!(summary.success_count(), 1);
        assert_eq!(summary.error_count(), 1);
        assert_eq!(summary.total_output_size(), 800);
    }

    #[test]
    fn csv_carries_status() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let mut summary = BatchSummary::new();
        summary.push(result("a.png", Status::Success, Some(800)));
        summary.push(result("b.webp", Status::InvalidFormat, None));
        summary.write_csv(&path).unwrap();

        let csv = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "a.png,4,2,1000,out.png,800,-20.0,12,success,0");
        assert!(lines[2].ends_with(",invalid format,6"));
    }

    #[test]
    fn expands_directories_and_skips_other_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.png"), b"x").unwrap();
        std::fs::write(dir.path().join("b.webp"), b"xx").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"xxx").unwrap();

        let files = expand_inputs(&[dir.path().display().to_string()]).unwrap();
        assert_eq!(files.len(), 2);
        assert!(files[0].ends_with("b.webp"));
    }
}
