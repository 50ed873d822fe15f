//! Collective (designer + brand) signature commands.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use sigmark_core::{CollectiveSignatureProtocol, CollectiveVerification, Config, ContentHasher};
use tracing::info;

use crate::utils::{load_engine, load_verifier, print_json, read_input};

#[derive(Subcommand)]
pub enum CollectiveCommand {
    /// Designer step: sign a file and print the designer token
    Designer {
        /// Path to the file to sign
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Brand step: countersign a file and print the collective token
    Brand {
        /// Path to the file to sign
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Token produced by the designer step
        #[arg(long)]
        designer_token: String,
    },

    /// Verify a collective token against a file
    Verify {
        /// Path to the signed file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Collective token (<digest>||<designer-token>||<brand-token>)
        #[arg(value_name = "TOKEN")]
        token: String,

        /// Designer's base64 SPKI public key (defaults to the configured key)
        #[arg(long)]
        designer_key: Option<String>,

        /// Brand's base64 SPKI public key (defaults to the configured key)
        #[arg(long)]
        brand_key: Option<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DesignerOutput {
    hash: String,
    designer_token: String,
}

/// Execute a collective subcommand.
pub fn execute(config: &Config, command: CollectiveCommand, quiet: bool) -> Result<()> {
    match command {
        CollectiveCommand::Designer { file } => {
            let engine = load_engine(config)?;
            let digest = ContentHasher::hash(&read_input(&file)?);
            let token = CollectiveSignatureProtocol::compose_designer(&engine, &digest)
                .context("Failed to sign as designer")?;

            info!(digest = %digest, "Designer token issued");
            if quiet {
                println!("{token}");
                return Ok(());
            }
            print_json(&DesignerOutput {
                hash: digest.to_base64(),
                designer_token: token.to_string(),
            })
        }
        CollectiveCommand::Brand {
            file,
            designer_token,
        } => {
            let engine = load_engine(config)?;
            let digest = ContentHasher::hash(&read_input(&file)?);
            let token =
                CollectiveSignatureProtocol::compose_brand(&engine, &digest, &designer_token)
                    .context("Failed to countersign designer token")?;

            info!(digest = %digest, "Collective token issued");
            println!("{token}");
            Ok(())
        }
        CollectiveCommand::Verify {
            file,
            token,
            designer_key,
            brand_key,
            json,
        } => {
            let (designer, brand) = match (designer_key.as_deref(), brand_key.as_deref()) {
                (None, None) => {
                    let configured = load_verifier(None, config)?;
                    (configured.clone(), configured)
                }
                (designer, brand) => (
                    load_verifier(designer, config)?,
                    load_verifier(brand, config)?,
                ),
            };
            let protocol = CollectiveSignatureProtocol::new(designer, brand);

            let digest = ContentHasher::hash(&read_input(&file)?);
            let result = protocol.verify(&digest, &token);

            if json {
                print_json(&result)?;
            } else if !quiet {
                print_report(&result);
            }

            if !result.valid {
                bail!(
                    "Collective verification failed: {}",
                    result.message.as_deref().unwrap_or("one or more checks did not pass")
                );
            }
            Ok(())
        }
    }
}

fn print_report(result: &CollectiveVerification) {
    let mark = |ok: bool| {
        if ok {
            "valid".green()
        } else {
            "invalid".red()
        }
    };

    println!();
    if result.valid {
        println!("{}", "VALID".green().bold());
    } else {
        println!("{}", "INVALID".red().bold());
    }
    println!();
    println!("   {} {}", "Content hash:".dimmed(), mark(result.hash_valid));
    println!("   {} {}", "Designer:".dimmed(), mark(result.designer_valid));
    println!("   {} {}", "Brand:".dimmed(), mark(result.brand_valid));
    if let Some(message) = &result.message {
        println!("   {} {}", "Reason:".dimmed(), message);
    }
    println!();
}
