//! ffmpeg / ffprobe backed tools

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use log::{debug, warn};
use serde::Deserialize;

use super::{Prober, Renderer, StreamInfo, Transcoder};
use crate::error::{EdaiError, Result};

/// Converts any input ffmpeg understands into a WAV file.
pub struct FfmpegTranscoder {
    program: PathBuf,
}

impl FfmpegTranscoder {
    pub fn new(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
        }
    }
}

impl Transcoder for FfmpegTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        let mut command = Command::new(&self.program);
        command
            .arg("-y")
            .arg("-i")
            .arg(input)
            .args(["-f", "wav"])
            .arg(output);

        let result = run_silenced(&mut command, &self.program)?;
        if !result.status.success() {
            return Err(EdaiError::ConversionFailed {
                path: input.to_path_buf(),
                reason: failure_reason(&result),
            });
        }
        Ok(())
    }
}

/// Renders the playback pipeline with ffmpeg.
pub struct FfmpegRenderer {
    program: PathBuf,
}

impl FfmpegRenderer {
    pub fn new(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
        }
    }
}

/// The render target already exists as an empty temp file, so overwrite it.
fn overwrite_args(args: &[OsString]) -> Vec<OsString> {
    let mut full = Vec::with_capacity(args.len() + 1);
    full.push(OsString::from("-y"));
    full.extend_from_slice(args);
    full
}

impl Renderer for FfmpegRenderer {
    fn render(&self, args: &[OsString]) -> Result<()> {
        let mut command = Command::new(&self.program);
        command.args(overwrite_args(args));

        let result = run_silenced(&mut command, &self.program).map_err(|e| {
            EdaiError::RenderFailed {
                reason: e.to_string(),
            }
        })?;
        if !result.status.success() {
            return Err(EdaiError::RenderFailed {
                reason: failure_reason(&result),
            });
        }
        Ok(())
    }
}

/// Reads stream details with ffprobe, falling back to the WAV header.
pub struct FfprobeProber {
    program: PathBuf,
}

impl FfprobeProber {
    pub fn new(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
        }
    }

    fn probe_with_ffprobe(&self, path: &Path) -> Result<StreamInfo> {
        let output = Command::new(&self.program)
            .arg("-i")
            .arg(path)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .map_err(|e| EdaiError::ToolLaunch {
                tool: self.program.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(EdaiError::ProbeFailed {
                reason: format!("ffprobe exited with {}", output.status),
            });
        }

        parse_probe_output(&output.stdout)
    }
}

impl Prober for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<StreamInfo> {
        match self.probe_with_ffprobe(path) {
            Ok(info) => Ok(info),
            Err(e) => {
                warn!("ffprobe failed for {}: {}", path.display(), e);
                StreamInfo::from_wav_header(path)
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProbeReport {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

/// ffprobe reports most numbers as strings.
#[derive(Debug, Deserialize)]
struct ProbeStream {
    sample_rate: Option<String>,
    bits_per_sample: Option<u16>,
    channels: Option<u16>,
    bit_rate: Option<String>,
    duration: Option<String>,
}

fn parse_probe_output(stdout: &[u8]) -> Result<StreamInfo> {
    let report: ProbeReport = serde_json::from_slice(stdout)?;
    let stream = report
        .streams
        .into_iter()
        .next()
        .ok_or_else(|| EdaiError::ProbeFailed {
            reason: "no streams reported".to_string(),
        })?;

    Ok(StreamInfo {
        sample_rate: parse_field(stream.sample_rate.as_deref()).unwrap_or(0),
        bits_per_sample: stream.bits_per_sample.unwrap_or(0),
        channels: stream.channels.unwrap_or(0),
        bit_rate: parse_field(stream.bit_rate.as_deref()).unwrap_or(0),
        duration_secs: parse_field(stream.duration.as_deref()).unwrap_or(0.0),
    })
}

fn parse_field<T: std::str::FromStr>(value: Option<&str>) -> Option<T> {
    value.and_then(|v| v.trim().parse().ok())
}

fn run_silenced(command: &mut Command, program: &Path) -> Result<Output> {
    debug!("running {:?}", command);
    command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .map_err(|e| EdaiError::ToolLaunch {
            tool: program.display().to_string(),
            source: e,
        })
}

fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.trim().lines().last() {
        Some(line) if !line.is_empty() => format!("{} ({})", output.status, line),
        _ => output.status.to_string(),
    }
}
