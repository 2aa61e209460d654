//! Raw RGBA8 dump.

use agcodecs::{DecodeRequest, Limits};
use anyhow::{Context, bail};

use crate::DecodeArgs;
use crate::output::OutputConfig;

/// Run the `decode` subcommand.
pub fn run(args: DecodeArgs) -> anyhow::Result<()> {
    let data = std::fs::read(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;

    if args.output.exists() && !args.force {
        bail!(
            "output already exists: {}\nUse --force to overwrite",
            args.output.display()
        );
    }

    let limits = Limits {
        max_pixels: args.max_pixels,
        ..Limits::default()
    };
    let mut request = DecodeRequest::new(&data)
        .with_premultiplied(args.premultiplied)
        .with_limits(&limits);
    if let Some(format) = args.format {
        request = request.with_format(format.to_image_format());
    }

    let image = request.decode().map_err(|e| {
        anyhow::anyhow!("decoding {}: {e} (status {})", args.input.display(), e.status().code())
    })?;
    let (width, height) = (image.width(), image.height());

    OutputConfig::ensure_parent(&args.output)?;
    std::fs::write(&args.output, image.as_bytes())
        .with_context(|| format!("writing {}", args.output.display()))?;

    eprintln!(
        "{width}x{height} RGBA8 ({}) -> {}",
        if image.is_premultiplied() {
            "premultiplied"
        } else {
            "straight"
        },
        args.output.display()
    );
    Ok(())
}
