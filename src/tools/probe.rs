//! Stream information shown in the menu header and the About screen.

use std::fmt;
use std::path::Path;

use hound::WavReader;

use crate::error::{EdaiError, Result};

/// What the prober reports about the first audio stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub channels: u16,
    /// Bits per second.
    pub bit_rate: u64,
    pub duration_secs: f64,
}

impl StreamInfo {
    /// Read the RIFF header directly.
    ///
    /// Used when ffprobe is unavailable or returns nothing usable. Only the
    /// header is parsed, so this works on any PCM WAV including EDAI files.
    pub fn from_wav_header(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path).map_err(|e| EdaiError::ProbeFailed {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let spec = reader.spec();

        let frames = reader.duration() as f64;
        let duration_secs = if spec.sample_rate > 0 {
            frames / spec.sample_rate as f64
        } else {
            0.0
        };

        Ok(Self {
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            channels: spec.channels,
            bit_rate: spec.sample_rate as u64 * spec.bits_per_sample as u64 * spec.channels as u64,
            duration_secs,
        })
    }

    pub fn channel_label(&self) -> String {
        match self.channels {
            1 => "Mono".to_string(),
            2 => "Stereo".to_string(),
            n => format!("{} channels", n),
        }
    }
}

impl fmt::Display for StreamInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {}-bit, {}, {}, {}",
            self.sample_rate,
            self.bits_per_sample,
            self.channel_label(),
            format_bit_rate(self.bit_rate),
            format_duration(self.duration_secs)
        )
    }
}

/// `1411200` -> `1411 kbps`; rates of 1000 and below stay in bps.
pub fn format_bit_rate(bits: u64) -> String {
    if bits > 1000 {
        format!("{} kbps", (bits as f64 / 1000.0).round() as u64)
    } else {
        format!("{} bps", bits)
    }
}

/// Seconds as `HH:MM:SS`, truncating fractions. Hours do not wrap.
pub fn format_duration(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
