//! Image inspection: probe headers without decoding pixels.

use std::path::Path;

use serde::Serialize;

use crate::InfoArgs;
use crate::batch;

/// Run the `info` subcommand.
pub fn run(args: InfoArgs) -> anyhow::Result<()> {
    let files = batch::expand_inputs(&args.files)?;

    if files.is_empty() {
        anyhow::bail!("no image files found");
    }

    let multi = files.len() > 1;

    for (i, path) in files.iter().enumerate() {
        if multi && !args.json {
            if i > 0 {
                println!();
            }
            println!("{}:", path.display());
        }

        match inspect_file(path) {
            Ok(info) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&info)?);
                } else {
                    print_info(&info);
                }
            }
            Err(e) => {
                eprintln!("  error: {e}");
            }
        }
    }

    Ok(())
}

/// Probe a single file and return structured info.
fn inspect_file(path: &Path) -> anyhow::Result<ImageInfoDisplay> {
    let data = std::fs::read(path)?;
    let info = agcodecs::probe(&data)?;

    Ok(ImageInfoDisplay {
        path: path.display().to_string(),
        format: format!("{:?}", info.format),
        mime_type: info.format.mime_type().to_string(),
        width: info.width,
        height: info.height,
        has_alpha: info.has_alpha,
        has_animation: info.has_animation,
        frame_count: info.frame_count,
        bit_depth: info.bit_depth,
        file_size: data.len() as u64,
    })
}

#[derive(Debug, Serialize)]
struct ImageInfoDisplay {
    path: String,
    format: String,
    mime_type: String,
    width: Option<u32>,
    height: Option<u32>,
    has_alpha: Option<bool>,
    has_animation: Option<bool>,
    frame_count: Option<u32>,
    bit_depth: Option<u8>,
    file_size: u64,
}

fn yes_no(flag: Option<bool>) -> &'static str {
    match flag {
        Some(true) => "yes",
        Some(false) => "no",
        None => "unknown",
    }
}

fn print_info(info: &ImageInfoDisplay) {
    println!("  Format:       {} ({})", info.format, info.mime_type);
    match (info.width, info.height) {
        (Some(w), Some(h)) => println!("  Dimensions:   {w}x{h}"),
        _ => println!("  Dimensions:   unknown (truncated header)"),
    }
    if let Some(depth) = info.bit_depth {
        println!("  Bit depth:    {depth}");
    }
    println!("  Alpha:        {}", yes_no(info.has_alpha));
    if info.has_animation == Some(true) {
        print!("  Animation:    yes");
        if let Some(count) = info.frame_count {
            print!(" ({count} frames)");
        }
        println!(" (not decodable)");
    }
    println!("  File size:    {}", batch::format_size(info.file_size));
}
