//! CLI integration tests for sigmark-cli.
//!
//! These tests run the actual binary and check outputs, exit codes, and
//! file artifacts.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Get a Command for the sigmark binary with no ambient key material.
fn sigmark() -> Command {
    let mut cmd = Command::cargo_bin("sigmark").unwrap();
    cmd.env_remove("SIGNATURE_PRIVATE_KEY")
        .env_remove("SIGNATURE_PUBLIC_KEY")
        .env_remove("SIGNATURE_VALIDITY_MS")
        .env_remove("WATERMARK_ENCODING")
        .env_remove("RUST_LOG");
    cmd
}

struct Keys {
    private_key: String,
    public_key: String,
}

fn keygen() -> Keys {
    let output = sigmark().args(["keygen", "--json"]).output().unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    Keys {
        private_key: json["privateKey"].as_str().unwrap().to_string(),
        public_key: json["publicKey"].as_str().unwrap().to_string(),
    }
}

/// A sigmark command with the given key pair configured.
fn with_keys(keys: &Keys) -> Command {
    let mut cmd = sigmark();
    cmd.env("SIGNATURE_PRIVATE_KEY", &keys.private_key)
        .env("SIGNATURE_PUBLIC_KEY", &keys.public_key);
    cmd
}

fn sign_json(keys: &Keys, file: &Path, extra: &[&str]) -> serde_json::Value {
    let output = with_keys(keys)
        .arg("sign")
        .arg(file)
        .arg("--json")
        .args(extra)
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    serde_json::from_slice(&output.stdout).unwrap()
}

fn write_png(path: &Path, width: u32, height: u32) {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x * 5) as u8, (y * 3) as u8, ((x ^ y) * 7) as u8, 255])
    });
    img.save(path).unwrap();
}

// ============================================================================
// Help and Version Tests
// ============================================================================

#[test]
fn test_help_displays_usage() {
    sigmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Expiry-bound content signatures"))
        .stdout(predicate::str::contains("sign"))
        .stdout(predicate::str::contains("collective"))
        .stdout(predicate::str::contains("watermark"));
}

#[test]
fn test_help_shows_exit_codes() {
    sigmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Exit codes:"))
        .stdout(predicate::str::contains("65"))
        .stdout(predicate::str::contains("78"));
}

#[test]
fn test_unknown_flag_is_usage_error() {
    sigmark().args(["sign", "--bogus"]).assert().code(64);
}

#[test]
fn test_days_and_months_conflict() {
    sigmark()
        .args(["sign", "file.txt", "--days", "1", "--months", "1"])
        .assert()
        .code(64);
}

#[test]
fn test_sign_help_shows_options() {
    sigmark()
        .args(["sign", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--days"))
        .stdout(predicate::str::contains("--months"))
        .stdout(predicate::str::contains("--watermark"));
}

// ============================================================================
// Keygen and Hash Tests
// ============================================================================

#[test]
fn test_keygen_prints_env_assignments() {
    sigmark()
        .arg("keygen")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("SIGNATURE_PRIVATE_KEY="))
        .stdout(predicate::str::contains("SIGNATURE_PUBLIC_KEY="))
        .stderr(predicate::str::contains("Fingerprint:"));
}

#[test]
fn test_hash_of_empty_file() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("empty.bin");
    fs::write(&file, b"").unwrap();

    // BLAKE3("") in base64
    sigmark()
        .arg("hash")
        .arg(&file)
        .assert()
        .success()
        .stdout("rxNJufX5oaagQE3qNtzJSZvLJcmtwRK3zJqTyuQfMmI=\n");
}

#[test]
fn test_hash_missing_file_is_input_error() {
    sigmark()
        .args(["hash", "/nonexistent/file.bin"])
        .assert()
        .code(66)
        .stderr(predicate::str::contains("Failed to read file"));
}

// ============================================================================
// Sign and Verify Tests
// ============================================================================

#[test]
fn test_sign_then_verify() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"quarterly report").unwrap();

    let keys = keygen();
    let signed = sign_json(&keys, &file, &["--days", "1"]);
    let token = signed["signature"].as_str().unwrap();

    assert_eq!(signed["watermarked"], false);
    assert!(token.contains(':'));

    with_keys(&keys)
        .arg("verify")
        .arg(&file)
        .arg(token)
        .assert()
        .success()
        .stdout(predicate::str::contains("VALID"));
}

#[test]
fn test_verify_with_explicit_public_key() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"shared with a partner").unwrap();

    let keys = keygen();
    let signed = sign_json(&keys, &file, &[]);

    // The verifying side only knows the public key
    sigmark()
        .arg("--quiet")
        .arg("verify")
        .arg(&file)
        .arg(signed["signature"].as_str().unwrap())
        .args(["--public-key", &keys.public_key])
        .assert()
        .success();
}

#[test]
fn test_verify_tampered_file_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"original content").unwrap();

    let keys = keygen();
    let signed = sign_json(&keys, &file, &[]);

    fs::write(&file, b"modified content").unwrap();

    with_keys(&keys)
        .arg("verify")
        .arg(&file)
        .arg(signed["signature"].as_str().unwrap())
        .assert()
        .code(65)
        .stdout(predicate::str::contains("INVALID"));
}

#[test]
fn test_verify_with_other_key_fails() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"content").unwrap();

    let signed = sign_json(&keygen(), &file, &[]);

    with_keys(&keygen())
        .arg("verify")
        .arg(&file)
        .arg(signed["signature"].as_str().unwrap())
        .assert()
        .code(65);
}

#[test]
fn test_verify_expired_token_reports_expiry() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"content").unwrap();

    let keys = keygen();
    let signed = sign_json(&keys, &file, &[]);
    let token = signed["signature"].as_str().unwrap();
    let (signature, _) = token.split_once(':').unwrap();

    // Expired long ago; expiry is checked before the signature
    let expired = format!("{signature}:1000");

    let output = with_keys(&keys)
        .arg("verify")
        .arg(&file)
        .arg(&expired)
        .arg("--json")
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(65));
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["status"], "expired");
}

#[test]
fn test_verify_malformed_token() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"content").unwrap();

    with_keys(&keygen())
        .arg("verify")
        .arg(&file)
        .arg("not-a-token")
        .assert()
        .code(65)
        .stdout(predicate::str::contains("MALFORMED"));
}

#[test]
fn test_sign_json_reports_requested_validity() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"content").unwrap();

    let keys = keygen();
    let one_day = sign_json(&keys, &file, &["--days", "1"]);
    let one_month = sign_json(&keys, &file, &["--months", "1"]);

    let day_expiry = one_day["validUntil"].as_i64().unwrap();
    let month_expiry = one_month["validUntil"].as_i64().unwrap();
    let delta = month_expiry - day_expiry;

    // 29 days apart, give or take the time between the two invocations
    let expected = 29 * 24 * 60 * 60 * 1000_i64;
    assert!((delta - expected).abs() < 60_000, "delta was {delta}");
}

#[test]
fn test_invalid_key_material_is_config_error() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("document.txt");
    fs::write(&file, b"content").unwrap();

    sigmark()
        .env("SIGNATURE_PRIVATE_KEY", "bm90IGEga2V5")
        .env("SIGNATURE_PUBLIC_KEY", "bm90IGEga2V5")
        .arg("sign")
        .arg(&file)
        .assert()
        .code(78);
}

// ============================================================================
// Watermark Tests
// ============================================================================

#[test]
fn test_watermark_embed_then_extract() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("photo.png");
    let marked = temp.path().join("marked.png");
    write_png(&source, 64, 64);

    sigmark()
        .args(["watermark", "embed"])
        .arg(&source)
        .args(["--owner", "Studio Nord", "--output"])
        .arg(&marked)
        .assert()
        .success();

    let output = sigmark()
        .args(["watermark", "extract", "--json"])
        .arg(&marked)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["found"], true);
    assert_eq!(json["fields"]["OWNER"], "Studio Nord");
    assert_eq!(json["fields"]["ID"].as_str().unwrap().len(), 8);
}

#[test]
fn test_watermark_strict_rejects_small_image() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("tiny.png");
    write_png(&source, 4, 4);

    sigmark()
        .args(["watermark", "embed"])
        .arg(&source)
        .args(["--owner", "Someone", "--strict"])
        .assert()
        .failure();

    assert!(!temp.path().join("tiny.watermarked.png").exists());
}

#[test]
fn test_watermark_embed_rejects_non_image() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("notes.txt");
    fs::write(&source, b"plain text").unwrap();

    sigmark()
        .args(["watermark", "embed"])
        .arg(&source)
        .args(["--owner", "Someone"])
        .assert()
        .code(66);
}

#[test]
fn test_sign_with_watermark_covers_marked_copy() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("photo.png");
    let marked = temp.path().join("photo.marked.png");
    write_png(&source, 64, 64);

    let keys = keygen();
    let out = marked.to_str().unwrap();
    let signed = sign_json(&keys, &source, &["--watermark", "Alice", "--output", out]);
    let token = signed["signature"].as_str().unwrap();
    assert_eq!(signed["watermarked"], true);

    with_keys(&keys)
        .arg("verify")
        .arg(&marked)
        .arg(token)
        .arg("--extract")
        .assert()
        .success()
        .stdout(predicate::str::contains("OWNER:Alice"));

    // The unwatermarked source is a different document
    with_keys(&keys)
        .arg("verify")
        .arg(&source)
        .arg(token)
        .assert()
        .code(65);
}

// ============================================================================
// Collective Tests
// ============================================================================

#[test]
fn test_collective_designer_brand_verify() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("design.png");
    write_png(&file, 32, 32);

    let designer = keygen();
    let brand = keygen();

    let output = with_keys(&designer)
        .arg("--quiet")
        .args(["collective", "designer"])
        .arg(&file)
        .output()
        .unwrap();
    assert!(output.status.success());
    let designer_token = String::from_utf8(output.stdout).unwrap().trim().to_string();

    let output = with_keys(&brand)
        .args(["collective", "brand"])
        .arg(&file)
        .args(["--designer-token", &designer_token])
        .output()
        .unwrap();
    assert!(output.status.success());
    let collective = String::from_utf8(output.stdout).unwrap().trim().to_string();
    assert_eq!(collective.split("||").count(), 3);

    let output = sigmark()
        .args(["collective", "verify", "--json"])
        .arg(&file)
        .arg(&collective)
        .args(["--designer-key", &designer.public_key])
        .args(["--brand-key", &brand.public_key])
        .output()
        .unwrap();
    assert!(output.status.success(), "{output:?}");
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["valid"], true);
    assert_eq!(json["designerValid"], true);
    assert_eq!(json["brandValid"], true);

    // Swapping the keys breaks both signatures
    sigmark()
        .args(["collective", "verify"])
        .arg(&file)
        .arg(&collective)
        .args(["--designer-key", &brand.public_key])
        .args(["--brand-key", &designer.public_key])
        .assert()
        .code(65);
}

#[test]
fn test_collective_verify_malformed_token() {
    let temp = TempDir::new().unwrap();
    let file = temp.path().join("design.bin");
    fs::write(&file, b"design").unwrap();

    with_keys(&keygen())
        .args(["collective", "verify"])
        .arg(&file)
        .arg("only||two")
        .assert()
        .code(65)
        .stderr(predicate::str::contains("Invalid collective signature format"));
}
