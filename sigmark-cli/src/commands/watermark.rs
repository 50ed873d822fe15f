//! Watermark embed/extract commands.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use sigmark_core::watermark::{is_supported_format, parse_fields};
use sigmark_core::{Config, WatermarkCodec, WatermarkPayload};
use tracing::info;

use crate::utils::{print_json, read_input, watermarked_path, write_output};

#[derive(Subcommand)]
pub enum WatermarkCommand {
    /// Embed an OWNER;DATE;ID record into an image (output is always PNG)
    Embed {
        /// Path to the source image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Owner recorded in the watermark
        #[arg(long)]
        owner: String,

        /// Where to write the watermarked PNG (defaults to <FILE>.watermarked.png)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,

        /// Fail instead of truncating when the image is too small
        #[arg(long)]
        strict: bool,
    },

    /// Extract the hidden text from an image
    Extract {
        /// Path to the watermarked image
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
struct ExtractOutput {
    found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    fields: BTreeMap<String, String>,
}

/// Execute a watermark subcommand.
pub fn execute(config: &Config, command: WatermarkCommand, quiet: bool) -> Result<()> {
    let codec = WatermarkCodec::new(config.watermark_encoding);

    match command {
        WatermarkCommand::Embed {
            file,
            owner,
            output,
            strict,
        } => {
            let content = read_input(&file)?;
            if !is_supported_format(&content) {
                bail!(
                    "Failed to read file as an image (PNG, JPEG, GIF or BMP): {}",
                    file.display()
                );
            }

            let payload = WatermarkPayload::new(owner.as_str());
            let text = payload.to_string();
            let outcome = if strict {
                codec.embed_image_bytes_checked(&content, &text)
            } else {
                codec.embed_image_bytes(&content, &text)
            }
            .context("Failed to embed watermark")?;

            let out = output.unwrap_or_else(|| watermarked_path(&file));
            write_output(&out, outcome.as_bytes())?;
            info!(owner = %owner, id = %payload.id, "Embedded watermark");

            if !quiet {
                println!("{} {}", "Watermarked:".green().bold(), out.display());
                println!("   {} {}", "Payload:".dimmed(), text);
            }
            Ok(())
        }
        WatermarkCommand::Extract { file, json } => {
            let content = read_input(&file)?;
            let text = codec
                .extract_image_bytes(&content)
                .context("Failed to read file as an image")?;

            let fields = text.as_deref().map(parse_fields).unwrap_or_default();

            if json {
                return print_json(&ExtractOutput {
                    found: text.is_some(),
                    text,
                    fields,
                });
            }

            match text {
                Some(text) => {
                    println!("{text}");
                    if !quiet {
                        for (key, value) in &fields {
                            eprintln!("   {} {}", format!("{key}:").dimmed(), value);
                        }
                    }
                }
                None => {
                    if !quiet {
                        eprintln!("{}", "No watermark found in the image".yellow());
                    }
                }
            }
            Ok(())
        }
    }
}
