//! EDAI - editable playback settings embedded in WAV files
//!
//! An EDAI file is an ordinary WAV container that also carries a signature
//! and a base64 JSON configuration at fixed offsets. Players that know
//! nothing about EDAI still play the audio; this crate reads the settings,
//! lets the user change them from a terminal menu and renders playback
//! through external tools.
//!
//! # Architecture
//!
//! - [`container`]: byte layout, detection, metadata codec, conversion
//! - [`config`]: the persisted configuration model
//! - [`pipeline`]: configuration to renderer arguments
//! - [`tools`]: ffmpeg/ffprobe/player contracts and system implementations
//! - [`menu`]: the interactive state machine
//! - [`cli`]: argument parsing and session orchestration

pub mod cli;
pub mod config;
pub mod container;
pub mod error;
pub mod menu;
pub mod pipeline;
pub mod tools;

pub use config::{ConfigModel, EDAI_VERSION};
pub use container::{DecodeOutcome, EdaiContainer};
pub use error::{EdaiError, MetadataError, Result};
pub use menu::{ExitStatus, MenuMachine, Prompter, Session};
pub use tools::{Toolbox, ToolConfig};
