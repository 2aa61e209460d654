//! Output path resolution. Every output is a PNG.

use std::path::{Path, PathBuf};

use agcodecs::ImageFormat;
use anyhow::{Context, bail};

/// Resolved output configuration.
pub struct OutputConfig {
    pub target_dir: Option<PathBuf>,
    pub target_file: Option<PathBuf>,
    pub in_place: bool,
    pub suffix: String,
    pub force: bool,
    pub dry_run: bool,
}

impl OutputConfig {
    /// Create from CLI args.
    pub fn new(
        output: Option<&str>,
        in_place: bool,
        suffix: &str,
        force: bool,
        dry_run: bool,
    ) -> anyhow::Result<Self> {
        if in_place && !force {
            bail!("--in-place requires --force to confirm overwriting originals");
        }

        let (target_dir, target_file) = match output {
            Some(o) => {
                let path = PathBuf::from(o);
                if o.ends_with('/') || o.ends_with('\\') || path.is_dir() {
                    (Some(path), None)
                } else {
                    (None, Some(path))
                }
            }
            None => (None, None),
        };

        Ok(Self {
            target_dir,
            target_file,
            in_place,
            suffix: suffix.to_string(),
            force,
            dry_run,
        })
    }

    /// Resolve the output path for a given input file.
    ///
    /// `--in-place` keeps the input path only for PNG inputs; a WebP input
    /// is replaced by a sibling `.png`.
    pub fn resolve(&self, input: &Path, input_count: usize) -> anyhow::Result<PathBuf> {
        if self.in_place {
            if is_png_path(input) {
                return Ok(input.to_path_buf());
            }
            return Ok(input.with_extension(png_extension()));
        }

        if let Some(ref target) = self.target_file {
            if input_count > 1 {
                bail!("-o with a file path only works for a single input file (got {input_count})");
            }
            return Ok(target.clone());
        }

        if let Some(ref dir) = self.target_dir {
            return Ok(dir.join(self.output_filename(input)));
        }

        let parent = input.parent().unwrap_or(Path::new("."));
        Ok(parent.join(self.output_filename(input)))
    }

    /// Stem + suffix + `.png`.
    fn output_filename(&self, input: &Path) -> String {
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");
        format!("{stem}{}.{}", self.suffix, png_extension())
    }

    /// Check if the output path is writable (won't clobber without --force).
    pub fn check_writable(&self, input: &Path, output: &Path) -> anyhow::Result<()> {
        if self.dry_run {
            return Ok(());
        }

        if !self.in_place {
            if let (Ok(ci), Ok(co)) = (input.canonicalize(), output.canonicalize()) {
                if ci == co {
                    bail!(
                        "output would overwrite input: {}\nUse --in-place --force or --suffix",
                        input.display()
                    );
                }
            }
        }

        if output.exists() && !self.force && !self.in_place {
            bail!(
                "output already exists: {}\nUse --force to overwrite",
                output.display()
            );
        }

        Ok(())
    }

    /// Create parent directories for the output path.
    pub fn ensure_parent(output: &Path) -> anyhow::Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("creating directory: {}", parent.display()))?;
            }
        }
        Ok(())
    }
}

fn png_extension() -> &'static str {
    ImageFormat::Png.extensions().first().copied().unwrap_or("png")
}

fn is_png_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(ImageFormat::from_extension)
        == Some(ImageFormat::Png)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(output: Option<&str>, suffix: &str) -> OutputConfig {
        OutputConfig::new(output, false, suffix, false, false).unwrap()
    }

    #[test]
    fn webp_input_becomes_png_sibling() {
        let out = config(None, "").resolve(Path::new("shots/a.webp"), 1).unwrap();
        assert_eq!(out, PathBuf::from("shots/a.png"));
    }

    #[test]
    fn suffix_and_directory() {
        let out = config(Some("out/"), "-l9")
            .resolve(Path::new("shots/a.png"), 3)
            .unwrap();
        assert_eq!(out, PathBuf::from("out/a-l9.png"));
    }

    #[test]
    fn single_file_target_rejects_batches() {
        assert!(config(Some("x.png"), "").resolve(Path::new("a.png"), 2).is_err());
    }

    #[test]
    fn in_place_needs_force() {
        assert!(OutputConfig::new(None, true, "", false, false).is_err());
        let cfg = OutputConfig::new(None, true, "", true, false).unwrap();
        assert_eq!(
            cfg.resolve(Path::new("a.webp"), 1).unwrap(),
            PathBuf::from("a.png")
        );
        assert_eq!(
            cfg.resolve(Path::new("b.PNG"), 1).unwrap(),
            PathBuf::from("b.PNG")
        );
    }
}
