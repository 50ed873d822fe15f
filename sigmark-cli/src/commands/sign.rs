//! Sign command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use sigmark_core::{
    Config, ContentHasher, EmbedOutcome, Validity, WatermarkCodec, WatermarkPayload,
};
use tracing::{info, warn};

use crate::utils::{
    format_timestamp, load_engine, print_json, read_input, watermarked_path, write_output,
};

pub struct SignArgs {
    pub file: PathBuf,
    pub days: Option<i64>,
    pub months: Option<i64>,
    pub watermark: Option<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignOutput {
    hash: String,
    signature: String,
    valid_until: i64,
    watermarked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    fingerprint: String,
}

/// Execute the sign command.
///
/// With `--watermark` the provenance record is embedded first and the
/// signature covers the watermarked bytes that were written out.
pub fn execute(config: &Config, args: SignArgs) -> Result<()> {
    let engine = load_engine(config)?;
    let content = read_input(&args.file)?;

    let validity = if args.days.is_some() || args.months.is_some() {
        Validity::resolve(args.days, args.months)
    } else {
        config.default_validity
    };

    let mut written = None;
    let signed_bytes = match &args.watermark {
        Some(owner) => {
            let codec = WatermarkCodec::new(config.watermark_encoding);
            let payload = WatermarkPayload::new(owner.as_str());
            match codec
                .embed_image_bytes(&content, &payload.to_string())
                .context("Failed to embed watermark")?
            {
                EmbedOutcome::Embedded(png) => {
                    let out = args
                        .output
                        .clone()
                        .unwrap_or_else(|| watermarked_path(&args.file));
                    write_output(&out, &png)?;
                    info!(owner = %owner, id = %payload.id, "Embedded watermark");
                    written = Some(out);
                    png
                }
                EmbedOutcome::PassedThrough(original) => {
                    warn!(path = %args.file.display(), "Not an image, signing without watermark");
                    original
                }
            }
        }
        None => content,
    };

    let digest = ContentHasher::hash(&signed_bytes);
    let token = engine
        .sign_digest(&digest, validity)
        .context("Failed to sign content")?;

    let output = SignOutput {
        hash: digest.to_base64(),
        signature: token.to_string(),
        valid_until: token.expiry_millis(),
        watermarked: written.is_some(),
        output: written.as_ref().map(|p| p.display().to_string()),
        fingerprint: engine.verifier().fingerprint(),
    };

    if args.json {
        return print_json(&output);
    }

    if args.quiet {
        println!("{}", output.signature);
        return Ok(());
    }

    println!();
    println!("{}", "Signed".green().bold());
    println!();
    println!("   {} {}", "File:".dimmed(), args.file.display());
    if let Some(path) = &written {
        println!("   {} {}", "Watermarked:".dimmed(), path.display());
    }
    println!("   {} {}", "Hash:".dimmed(), output.hash);
    println!(
        "   {} {}",
        "Valid until:".dimmed(),
        format_timestamp(output.valid_until)
    );
    println!("   {} {}", "Key:".dimmed(), output.fingerprint);
    println!();
    println!("{}", output.signature);

    Ok(())
}
