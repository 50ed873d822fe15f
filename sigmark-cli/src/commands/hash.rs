//! Hash command implementation.

use std::path::PathBuf;

use anyhow::Result;
use sigmark_core::ContentHasher;

use crate::utils::read_input;

/// Print the base64 BLAKE3 digest of a file.
pub fn execute(file: PathBuf) -> Result<()> {
    let content = read_input(&file)?;
    println!("{}", ContentHasher::hash_base64(&content));
    Ok(())
}
