//! Common utility functions shared across CLI commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{TimeZone, Utc};
use sigmark_core::{Config, SignatureEngine, SignatureVerifier};
use tracing::{debug, info};

/// Read a whole input file into memory.
pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    debug!(path = %path.display(), len = bytes.len(), "Read input");
    Ok(bytes)
}

/// Write output bytes, creating or truncating the file.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes)
        .with_context(|| format!("Failed to write file: {}", path.display()))?;
    info!(path = %path.display(), len = bytes.len(), "Wrote output");
    Ok(())
}

/// Default destination for a watermarked copy.
///
/// Transforms `photo.jpg` into `photo.watermarked.png`: the embedded copy is
/// always PNG regardless of the input format.
pub fn watermarked_path(file: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    file.with_file_name(format!("{stem}.watermarked.png"))
}

/// Build the signing engine from the environment.
///
/// Without complete key material a throwaway key pair is generated, which
/// cannot produce tokens anyone else can check later.
pub fn load_engine(config: &Config) -> Result<SignatureEngine> {
    let engine = SignatureEngine::from_key_material(&config.key_material)
        .context("Failed to load signing key")?;
    debug!(origin = ?engine.origin(), fingerprint = %engine.verifier().fingerprint(), "Loaded engine");
    Ok(engine)
}

/// Resolve the verifier for a check: an explicit public key wins over the
/// configured engine key.
pub fn load_verifier(public_key: Option<&str>, config: &Config) -> Result<SignatureVerifier> {
    match public_key {
        Some(encoded) => SignatureVerifier::from_public_key_base64(encoded)
            .context("Invalid public key argument"),
        None => Ok(load_engine(config)?.verifier().clone()),
    }
}

/// Format a Unix timestamp (milliseconds) as a human-readable UTC string.
pub fn format_timestamp(timestamp_ms: i64) -> String {
    match Utc.timestamp_millis_opt(timestamp_ms) {
        chrono::LocalResult::Single(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        _ => format!("{timestamp_ms}ms"),
    }
}

/// Print a value as pretty JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watermarked_path() {
        assert_eq!(
            watermarked_path(Path::new("shots/photo.jpg")),
            PathBuf::from("shots/photo.watermarked.png")
        );
        assert_eq!(
            watermarked_path(Path::new("noext")),
            PathBuf::from("noext.watermarked.png")
        );
    }

    #[test]
    fn test_format_timestamp() {
        // 2024-01-15 12:30:45.123 UTC
        let formatted = format_timestamp(1_705_321_845_123);
        assert!(formatted.contains("2024-01-15"));
        assert!(formatted.contains("UTC"));
    }

    #[test]
    fn test_explicit_public_key_wins() {
        let engine = SignatureEngine::generate();
        let encoded = engine.verifier().to_public_key_base64().unwrap();

        let verifier = load_verifier(Some(&encoded), &Config::default()).unwrap();
        assert_eq!(verifier.fingerprint(), engine.verifier().fingerprint());
    }

    #[test]
    fn test_bad_public_key_is_rejected() {
        assert!(load_verifier(Some("bm90IGEga2V5"), &Config::default()).is_err());
    }
}
