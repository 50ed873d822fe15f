//! Verify command implementation.

use std::path::PathBuf;

use anyhow::{bail, Result};
use colored::Colorize;
use serde::Serialize;
use sigmark_core::watermark::is_supported_format;
use sigmark_core::{Config, ContentHasher, TokenStatus, WatermarkCodec};
use tracing::{debug, info};

use crate::utils::{format_timestamp, load_verifier, print_json, read_input};

pub struct VerifyArgs {
    pub file: PathBuf,
    pub token: String,
    pub public_key: Option<String>,
    pub extract: bool,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOutput<'a> {
    valid: bool,
    hash: String,
    #[serde(flatten)]
    status: &'a TokenStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    watermark: Option<String>,
}

/// Execute the verify command.
///
/// Exits non-zero unless the token is authentic, unexpired and bound to
/// this file's digest.
pub fn execute(config: &Config, args: VerifyArgs) -> Result<()> {
    let verifier = load_verifier(args.public_key.as_deref(), config)?;
    let content = read_input(&args.file)?;

    let digest = ContentHasher::hash(&content);
    let status = verifier.check(digest.to_base64().as_bytes(), &args.token);
    debug!(digest = %digest, ?status, "Checked token");

    let watermark = if args.extract && is_supported_format(&content) {
        let codec = WatermarkCodec::new(config.watermark_encoding);
        codec.extract_image_bytes(&content).ok().flatten()
    } else {
        None
    };

    if args.json {
        print_json(&VerifyOutput {
            valid: status.is_valid(),
            hash: digest.to_base64(),
            status: &status,
            watermark: watermark.clone(),
        })?;
    } else if !args.quiet {
        print_status(&status);
        if args.extract {
            match &watermark {
                Some(text) => println!("   {} {}", "Watermark:".dimmed(), text),
                None => println!("   {} {}", "Watermark:".dimmed(), "none found".yellow()),
            }
        }
        println!();
    }

    if !status.is_valid() {
        bail!("Signature verification failed: {}", status.description());
    }

    info!(path = %args.file.display(), "Verification successful");
    Ok(())
}

fn print_status(status: &TokenStatus) {
    println!();
    match status {
        TokenStatus::Valid { expires_at } => {
            println!("{}", "VALID".green().bold());
            println!();
            println!("   {} {}", "Signature:".dimmed(), "Authentic".green());
            println!(
                "   {} {}",
                "Expires:".dimmed(),
                format_timestamp(*expires_at)
            );
        }
        TokenStatus::Expired { expired_at } => {
            println!("{}", "EXPIRED".yellow().bold());
            println!();
            println!(
                "   {} {}",
                "Expired at:".dimmed(),
                format_timestamp(*expired_at)
            );
        }
        TokenStatus::Invalid => {
            println!("{}", "INVALID".red().bold());
            println!();
            println!(
                "   {} {}",
                "Signature:".dimmed(),
                "Does not match this file and key".red()
            );
        }
        TokenStatus::Malformed { reason } => {
            println!("{}", "MALFORMED".red().bold());
            println!();
            println!("   {} {}", "Reason:".dimmed(), reason);
        }
    }
}
