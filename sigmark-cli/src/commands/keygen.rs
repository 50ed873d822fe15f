//! Keygen command implementation.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use sigmark_core::config::{PRIVATE_KEY_ENV, PUBLIC_KEY_ENV};
use sigmark_core::SignatureEngine;
use tracing::info;

use crate::utils::print_json;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct KeygenOutput<'a> {
    private_key: &'a str,
    public_key: &'a str,
    fingerprint: String,
}

/// Execute the keygen command.
///
/// The private half goes to stdout; redirect it somewhere safe.
pub fn execute(json: bool) -> Result<()> {
    let engine = SignatureEngine::generate();
    let material = engine
        .export_key_material()
        .context("Failed to export generated key")?;

    let private_key = material.private_key.as_deref().unwrap_or_default();
    let public_key = material.public_key.as_deref().unwrap_or_default();
    let fingerprint = engine.verifier().fingerprint();

    info!(fingerprint = %fingerprint, "Generated P-256 key pair");

    if json {
        return print_json(&KeygenOutput {
            private_key,
            public_key,
            fingerprint,
        });
    }

    println!("{PRIVATE_KEY_ENV}={private_key}");
    println!("{PUBLIC_KEY_ENV}={public_key}");
    eprintln!("{} {}", "Fingerprint:".dimmed(), fingerprint.cyan());

    Ok(())
}
