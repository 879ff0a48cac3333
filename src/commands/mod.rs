//! CLI subcommand handlers.
//!
//! Each module handles one subcommand group: argument validation,
//! persistence calls, and human-readable rendering on stdout.

pub mod history;
pub mod query;
pub mod run;
pub mod serve;
pub mod subgraph;

use crate::error::{ProbeError, Result};
use std::io::Read;
use std::path::PathBuf;

/// Resolves template text from an inline argument, a file, or stdin.
///
/// An inline argument of `-` reads stdin, mirroring common CLI habits.
pub(crate) fn read_text_input(inline: Option<String>, file: Option<PathBuf>) -> Result<String> {
    if let Some(path) = file {
        return std::fs::read_to_string(&path).map_err(|e| {
            ProbeError::query(format!("Failed to read {}: {e}", path.display()))
        });
    }

    match inline {
        Some(text) if text == "-" => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| ProbeError::query(format!("Failed to read stdin: {e}")))?;
            Ok(buf)
        }
        Some(text) => Ok(text),
        None => Err(ProbeError::query(
            "No query template given. Pass it inline, via --file, or as '-' for stdin",
        )),
    }
}
