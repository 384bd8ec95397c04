//! External tool contracts
//!
//! EDAI never decodes or renders audio itself. These traits describe what it
//! needs from the outside world; the `System*` implementations shell out to
//! ffmpeg, ffprobe and a terminal player.

mod ffmpeg;
mod player;
mod probe;
mod scratch;

use std::env;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use log::debug;

use crate::error::{EdaiError, Result};

pub use ffmpeg::{FfmpegRenderer, FfmpegTranscoder, FfprobeProber};
pub use player::SystemPlayer;
pub use probe::{format_bit_rate, format_duration, StreamInfo};
pub use scratch::render_target;

/// Reads stream information for display.
pub trait Prober {
    fn probe(&self, path: &Path) -> Result<StreamInfo>;
}

/// Produces a canonical WAV file from arbitrary audio.
pub trait Transcoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()>;
}

/// Runs the renderer with a complete argument list (input, filters, output).
pub trait Renderer {
    fn render(&self, args: &[OsString]) -> Result<()>;
}

/// Plays a file, blocking until playback ends.
pub trait Player {
    fn play(&self, path: &Path) -> Result<()>;
}

/// Locations of the external programs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
    pub player: PathBuf,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            ffprobe: PathBuf::from("ffprobe"),
            player: PathBuf::from(player::DEFAULT_PLAYER),
        }
    }
}

impl ToolConfig {
    /// Read `EDAI_FFMPEG`, `EDAI_FFPROBE` and `EDAI_PLAYER`, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            ffmpeg: env_path("EDAI_FFMPEG").unwrap_or(defaults.ffmpeg),
            ffprobe: env_path("EDAI_FFPROBE").unwrap_or(defaults.ffprobe),
            player: env_path("EDAI_PLAYER").unwrap_or(defaults.player),
        }
    }

    /// Verify every tool can be launched.
    ///
    /// Only a failure to start the process counts as missing; exit status is
    /// ignored because players commonly exit non-zero for `-help`.
    pub fn preflight(&self) -> Result<()> {
        let checks = [
            (&self.player, "-help"),
            (&self.ffmpeg, "-version"),
            (&self.ffprobe, "-version"),
        ];

        let missing: Vec<String> = checks
            .iter()
            .filter(|(program, arg)| !is_launchable(program, arg))
            .map(|(program, _)| program.display().to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(EdaiError::MissingTools { tools: missing })
        }
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

fn is_launchable(program: &Path, arg: &str) -> bool {
    let status = Command::new(program)
        .arg(arg)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(_) => true,
        Err(e) if e.kind() == ErrorKind::NotFound => false,
        Err(e) => {
            debug!("{} could not be launched: {}", program.display(), e);
            false
        }
    }
}

/// The four collaborators a session drives.
pub struct Toolbox {
    pub prober: Box<dyn Prober>,
    pub transcoder: Box<dyn Transcoder>,
    pub renderer: Box<dyn Renderer>,
    pub player: Box<dyn Player>,
}

impl Toolbox {
    /// Toolbox backed by the configured system programs.
    pub fn system(config: &ToolConfig) -> Self {
        Self {
            prober: Box::new(FfprobeProber::new(&config.ffprobe)),
            transcoder: Box::new(FfmpegTranscoder::new(&config.ffmpeg)),
            renderer: Box::new(FfmpegRenderer::new(&config.ffmpeg)),
            player: Box::new(SystemPlayer::new(&config.player)),
        }
    }
}
