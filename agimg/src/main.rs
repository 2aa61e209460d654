//! agimg: PNG/WebP inspector and PNG re-encoder.
//!
//! `info` probes headers, `decode` dumps raw RGBA8, and `process` re-encodes
//! PNG or WebP inputs as PNG with a chosen compression level, filter mask,
//! and resolution.

mod batch;
mod decode;
mod info;
mod output;
mod process;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Arguments for the `process` subcommand.
#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Input files, directories, or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    // --- Output ---
    /// Output file or directory (dir/ with trailing slash for batch).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Overwrite input files in place (requires --force).
    #[arg(long)]
    pub in_place: bool,

    /// Filename suffix before extension (default: none).
    #[arg(long, default_value = "")]
    pub suffix: String,

    /// Allow overwriting existing files.
    #[arg(long)]
    pub force: bool,

    /// Show what would be done without writing files.
    #[arg(long)]
    pub dry_run: bool,

    // --- Encoder ---
    /// Compression level: 1-9 for the configurable encoder, 0 or below for
    /// the fast encoder, -1 for its fastest mode.
    #[arg(
        short = 'l',
        long,
        env = "AGIMG_COMPRESSION_LEVEL",
        default_value_t = agcodecs::DEFAULT_COMPRESSION_LEVEL,
        allow_hyphen_values = true
    )]
    pub level: i32,

    /// Allowed row filters: a comma list of none,sub,up,avg,paeth,all,off or
    /// a numeric libpng mask.
    #[arg(long, env = "AGIMG_FILTERS", default_value = "all", value_parser = parse_filters)]
    pub filters: u32,

    /// Resolution in pixels per inch (0 omits pHYs).
    #[arg(long, env = "AGIMG_RESOLUTION", default_value_t = 0)]
    pub resolution: u32,

    // --- Batch ---
    /// Number of parallel workers (default: CPU count).
    #[arg(short = 'j', long)]
    pub jobs: Option<usize>,

    /// Print summary report after batch processing.
    #[arg(long)]
    pub report: bool,

    /// Write CSV report to file.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Skip writing output if it would be larger than input.
    #[arg(long)]
    pub skip_if_larger: bool,
}

/// Arguments for the `info` subcommand.
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Input files, directories, or glob patterns.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `decode` subcommand.
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Input image.
    pub input: PathBuf,

    /// Destination for the raw RGBA8 bytes.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Premultiply color by alpha.
    #[arg(long)]
    pub premultiplied: bool,

    /// Only accept this input format.
    #[arg(short, long, value_enum)]
    pub format: Option<FormatArg>,

    /// Refuse images with more pixels than this.
    #[arg(long)]
    pub max_pixels: Option<u64>,

    /// Allow overwriting an existing output file.
    #[arg(long)]
    pub force: bool,
}

/// Input image format.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    Png,
    Webp,
}

impl FormatArg {
    pub fn to_image_format(self) -> agcodecs::ImageFormat {
        match self {
            FormatArg::Png => agcodecs::ImageFormat::Png,
            FormatArg::Webp => agcodecs::ImageFormat::WebP,
        }
    }
}

impl ProcessArgs {
    /// Encoder configuration from the command line.
    pub fn encode_config(&self) -> agcodecs::EncodeConfig {
        agcodecs::EncodeConfig::new()
            .with_compression_level(self.level)
            .with_filters(self.filters)
            .with_resolution(self.resolution)
    }
}

/// Parse a filter list such as `sub,paeth`, or a numeric mask (`0xF8`, `248`).
fn parse_filters(s: &str) -> Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).map_err(|e| format!("invalid mask {s}: {e}"));
    }
    if let Ok(mask) = s.parse::<u32>() {
        return Ok(mask);
    }

    let mut mask = agcodecs::PNG_NO_FILTERS;
    for name in s.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        mask |= match name.to_ascii_lowercase().as_str() {
            "off" => agcodecs::PNG_NO_FILTERS,
            "none" => agcodecs::PNG_FILTER_NONE,
            "sub" => agcodecs::PNG_FILTER_SUB,
            "up" => agcodecs::PNG_FILTER_UP,
            "avg" => agcodecs::PNG_FILTER_AVG,
            "paeth" => agcodecs::PNG_FILTER_PAETH,
            "all" => agcodecs::PNG_ALL_FILTERS,
            other => return Err(format!("unknown filter: {other}")),
        };
    }
    Ok(mask)
}

/// Install the log subscriber. `RUST_LOG` overrides the default `warn` level.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Dispatch CLI arguments.
///
/// Known subcommands parse normally; anything else is treated as `process`
/// arguments so bare files re-encode with defaults.
fn main() -> anyhow::Result<()> {
    init_logging();
    agcodecs::init();

    let args: Vec<String> = std::env::args().collect();
    let first_arg = args.get(1).map(|s| s.as_str());
    match first_arg {
        Some("process") => process::run(ProcessArgs::parse_from(&args[1..])),
        Some("info") => info::run(InfoArgs::parse_from(&args[1..])),
        Some("decode") => decode::run(DecodeArgs::parse_from(&args[1..])),
        Some("help" | "--help" | "-h") | None => {
            print_help();
            Ok(())
        }
        Some("--version" | "-V") => {
            println!("agimg {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Some(_) => {
            let cmd = ProcessArgs::parse_from(
                std::iter::once("process".to_string()).chain(args[1..].iter().cloned()),
            );
            process::run(cmd)
        }
    }
}

fn print_help() {
    eprintln!(
        "\
agimg {}: PNG/WebP inspector and PNG re-encoder

USAGE:
    agimg [COMMAND] [OPTIONS] <FILES>...

COMMANDS:
    process    Re-encode PNG/WebP inputs as PNG (default)
    info       Probe and display image headers
    decode     Dump raw RGBA8 pixels

Bare files default to `process` at compression level 6 with all filters.

EXAMPLES:
    agimg photo.webp                             Write photo.png next to the input
    agimg photo.png -l 9 --filters paeth -o small.png
    agimg process shots/ -l -1 -o /tmp/fast/ --report --csv report.csv
    agimg info *.png --json
    agimg decode icon.png -o icon.rgba --premultiplied

ENVIRONMENT:
    AGIMG_COMPRESSION_LEVEL, AGIMG_FILTERS, AGIMG_RESOLUTION   process defaults
    RUST_LOG                                                   log filter (default: warn)

Run `agimg <command> --help` for full options.",
        env!("CARGO_PKG_VERSION")
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_names() {
        assert_eq!(parse_filters("all"), Ok(agcodecs::PNG_ALL_FILTERS));
        assert_eq!(parse_filters("off"), Ok(agcodecs::PNG_NO_FILTERS));
        assert_eq!(
            parse_filters("sub, Paeth"),
            Ok(agcodecs::PNG_FILTER_SUB | agcodecs::PNG_FILTER_PAETH)
        );
        assert!(parse_filters("lzw").is_err());
    }

    #[test]
    fn filter_masks() {
        assert_eq!(parse_filters("0xF8"), Ok(0xF8));
        assert_eq!(parse_filters("32"), Ok(agcodecs::PNG_FILTER_UP));
    }

    #[test]
    fn process_defaults() {
        let args = ProcessArgs::parse_from(["process", "a.png"]);
        let config = args.encode_config();
        assert_eq!(config.filters, agcodecs::PNG_ALL_FILTERS);
        assert_eq!(config.resolution, 0);
    }

    #[test]
    fn negative_level_accepted() {
        let args = ProcessArgs::parse_from(["process", "-l", "-1", "a.png"]);
        assert_eq!(
            args.encode_config().strategy(),
            agcodecs::Strategy::Fast { fastest: true }
        );
    }
}
