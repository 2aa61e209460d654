//! Re-encode pipeline: decode PNG/WebP to RGBA8, encode as PNG.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;

use agcodecs::{CodecError, EncodeConfig, Status};
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::ProcessArgs;
use crate::batch::{self, BatchSummary, FileResult};
use crate::output::OutputConfig;

/// Run the `process` subcommand.
pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    let config = args.encode_config();
    config.validate().context("invalid encoder options")?;

    let files = batch::expand_inputs(&args.files)?;
    if files.is_empty() {
        anyhow::bail!("no image files found");
    }

    let output_config = OutputConfig::new(
        args.output.as_deref(),
        args.in_place,
        &args.suffix,
        args.force,
        args.dry_run,
    )?;

    tracing::info!(
        files = files.len(),
        strategy = ?config.strategy(),
        filters = config.filters,
        resolution = config.resolution,
        "processing"
    );

    let input_count = files.len();
    let summary = Mutex::new(BatchSummary::new());
    let job = Job {
        args: &args,
        config: &config,
        output: &output_config,
        input_count,
    };

    if files.len() == 1 {
        let result = job.process_one(&files[0]);
        report_single(&result, args.dry_run);
        lock(&summary).push(result);
    } else {
        let jobs = args.jobs.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        });
        let pool = rayon::ThreadPoolBuilder::new().num_threads(jobs).build()?;

        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
                .progress_chars("=>-"),
        );

        pool.install(|| {
            files.par_iter().for_each(|path| {
                let result = job.process_one(path);
                if let Some(ref err) = result.error {
                    pb.println(format!("error: {}: {}", path.display(), err));
                }
                lock(&summary).push(result);
                pb.inc(1);
            });
        });

        pb.finish_and_clear();
    }

    let summary = summary
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if args.report {
        summary.print_report();
    }

    if let Some(ref csv_path) = args.csv {
        summary.write_csv(csv_path)?;
        eprintln!("CSV report written to {}", csv_path.display());
    }

    if summary.error_count() > 0 && !args.report {
        eprintln!(
            "{} of {} files had errors",
            summary.error_count(),
            summary.results.len()
        );
    }

    Ok(())
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn report_single(result: &FileResult, dry_run: bool) {
    if let Some(ref err) = result.error {
        eprintln!("error: {}: {}", result.input_path.display(), err);
    } else if result.skipped {
        eprintln!("skipped (output would be larger)");
    } else if !dry_run {
        if let (Some(out_size), Some(out_path)) = (result.output_size, &result.output_path) {
            eprintln!(
                "{} -> {} ({}, {})",
                batch::format_size(result.input_size),
                batch::format_size(out_size),
                out_path.display(),
                batch::percent_change(result.input_size, out_size),
            );
        }
    }
}

/// Why a file failed: a codec status, or an I/O or path problem.
enum Failure {
    Codec(CodecError),
    Other(anyhow::Error),
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Other(e)
    }
}

struct Outcome {
    dimensions: (u32, u32),
    output_path: PathBuf,
    output_size: u64,
    skipped: bool,
}

/// Settings shared by every file of a run.
struct Job<'a> {
    args: &'a ProcessArgs,
    config: &'a EncodeConfig,
    output: &'a OutputConfig,
    input_count: usize,
}

impl Job<'_> {
    /// Process a single file, catching errors into a `FileResult`.
    fn process_one(&self, input: &Path) -> FileResult {
        let start = Instant::now();
        let input_size = input.metadata().map(|m| m.len()).unwrap_or(0);
        let mut result = FileResult {
            input_path: input.to_path_buf(),
            input_size,
            dimensions: None,
            output_size: None,
            output_path: None,
            skipped: false,
            status: Status::Success,
            error: None,
            duration: Default::default(),
        };

        match self.process_inner(input) {
            Ok(outcome) => {
                result.dimensions = Some(outcome.dimensions);
                result.output_size = Some(outcome.output_size);
                result.output_path = Some(outcome.output_path);
                result.skipped = outcome.skipped;
            }
            Err(Failure::Codec(e)) => {
                result.status = e.status();
                result.error = Some(e.to_string());
            }
            Err(Failure::Other(e)) => {
                result.status = Status::Failed;
                result.error = Some(format!("{e:#}"));
            }
        }
        result.duration = start.elapsed();
        tracing::debug!(
            input = %input.display(),
            status = %result.status,
            ms = result.duration.as_millis() as u64,
            "file done"
        );
        result
    }

    fn process_inner(&self, input: &Path) -> Result<Outcome, Failure> {
        let data =
            std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
        let input_size = data.len() as u64;

        let image = agcodecs::decode_image(&data, false).map_err(Failure::Codec)?;
        let dimensions = (image.width(), image.height());
        let encoded = agcodecs::encode_pixels(&image, self.config).map_err(Failure::Codec)?;
        let output_size = encoded.len() as u64;

        if self.args.skip_if_larger && output_size >= input_size {
            return Ok(Outcome {
                dimensions,
                output_path: input.to_path_buf(),
                output_size,
                skipped: true,
            });
        }

        let output_path = self.output.resolve(input, self.input_count)?;
        self.output.check_writable(input, &output_path)?;

        if self.output.dry_run {
            eprintln!(
                "dry-run: {} -> {} ({})",
                input.display(),
                output_path.display(),
                batch::format_size(output_size),
            );
        } else {
            OutputConfig::ensure_parent(&output_path)?;
            std::fs::write(&output_path, &encoded)
                .with_context(|| format!("writing {}", output_path.display()))?;
        }

        Ok(Outcome {
            dimensions,
            output_path,
            output_size,
            skipped: false,
        })
    }
}
