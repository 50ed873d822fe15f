//! Sigmark CLI - expiry-bound signatures and provenance watermarks.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod utils;

#[derive(Parser)]
#[command(name = "sigmark")]
#[command(author, version, about = "Expiry-bound content signatures and invisible watermarks", long_about = None)]
#[command(after_help = "Exit codes:
  0   Success
  1   General error
  64  Usage error
  65  Verification failed (invalid, expired or malformed token)
  66  Input file could not be read
  74  Output file could not be written
  78  Key material or configuration error")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress informational output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a P-256 key pair and print it as environment assignments
    Keygen {
        /// Print the key pair as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the base64 BLAKE3 digest of a file
    Hash {
        /// Path to the file to hash
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Sign a file's digest with an expiring signature
    Sign {
        /// Path to the file to sign
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Validity in days (default: 7)
        #[arg(long, conflicts_with = "months")]
        days: Option<i64>,

        /// Validity in 30-day months
        #[arg(long)]
        months: Option<i64>,

        /// Embed an OWNER;DATE;ID watermark for this owner before hashing
        #[arg(long, value_name = "OWNER")]
        watermark: Option<String>,

        /// Where to write the watermarked copy (defaults to <FILE>.watermarked.png)
        #[arg(short, long, value_name = "OUT", requires = "watermark")]
        output: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify a file against a signature token
    Verify {
        /// Path to the signed file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Signature token (<base64-signature>:<expiry-millis>)
        #[arg(value_name = "TOKEN")]
        token: String,

        /// Base64 SPKI public key to verify with (defaults to the configured key)
        #[arg(long)]
        public_key: Option<String>,

        /// Also extract and print the embedded watermark
        #[arg(long)]
        extract: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Two-party designer + brand signatures
    Collective {
        #[command(subcommand)]
        command: commands::collective::CollectiveCommand,
    },

    /// Embed or extract LSB watermarks
    Watermark {
        #[command(subcommand)]
        command: commands::watermark::WatermarkCommand,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = sigmark_core::Config::from_env();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Keygen { json } => commands::keygen::execute(json),
        Commands::Hash { file } => commands::hash::execute(file),
        Commands::Sign {
            file,
            days,
            months,
            watermark,
            output,
            json,
        } => commands::sign::execute(
            &config,
            commands::sign::SignArgs {
                file,
                days,
                months,
                watermark,
                output,
                json,
                quiet,
            },
        ),
        Commands::Verify {
            file,
            token,
            public_key,
            extract,
            json,
        } => commands::verify::execute(
            &config,
            commands::verify::VerifyArgs {
                file,
                token,
                public_key,
                extract,
                json,
                quiet,
            },
        ),
        Commands::Collective { command } => commands::collective::execute(&config, command, quiet),
        Commands::Watermark { command } => commands::watermark::execute(&config, command, quiet),
    }
}

fn main() -> std::process::ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version arrive here too, on stdout
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            let _ = err.print();
            return std::process::ExitCode::from(code as u8);
        }
    };
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => std::process::ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            let exit = exit_codes::ExitCode::from_anyhow(&err);
            if let Some(message) = &exit.message {
                eprintln!("{} {}", "error:".red().bold(), message);
            }
            std::process::ExitCode::from(exit.code as u8)
        }
    }
}
