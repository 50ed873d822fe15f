//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a rejected token apart from a missing file or a bad
//! key without parsing stderr.

use sigmark_core::SigmarkError;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage error (invalid arguments).
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Token rejected: invalid, expired, malformed or bound to other content.
/// Maps to EX_DATAERR from sysexits.h.
pub const VERIFICATION_FAILED: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Key material or environment configuration is unusable.
/// Maps to EX_CONFIG from sysexits.h.
pub const CONFIG_ERROR: i32 = 78;

/// Represents an exit code with optional error context.
#[derive(Debug)]
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let typed = err.chain().find_map(|cause| cause.downcast_ref::<SigmarkError>());

        let code = match typed {
            Some(SigmarkError::KeyError(_)) | Some(SigmarkError::ConfigError(_)) => CONFIG_ERROR,
            Some(SigmarkError::TokenFormat(_)) => VERIFICATION_FAILED,
            _ => classify_message(&message),
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

// Classify error by inspecting the rendered chain
fn classify_message(message: &str) -> i32 {
    if message.contains("Failed to read file") {
        INPUT_ERROR
    } else if message.contains("verification failed") || message.contains("Invalid public key") {
        VERIFICATION_FAILED
    } else if message.contains("Failed to write") || message.contains("serialize") {
        IO_ERROR
    } else if message.contains("Invalid argument") {
        USAGE_ERROR
    } else {
        GENERAL_ERROR
    }
}
