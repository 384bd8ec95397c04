//! CLI Module
//!
//! Command-line interface for the EDAI editor.

pub mod commands;

use clap::Parser;
use std::path::PathBuf;

/// EDAI - edit playback settings embedded in a WAV container
#[derive(Parser, Debug)]
#[command(name = "edai")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// EDAI or other audio file to open; prompted for when omitted
    pub path: Option<PathBuf>,
}
