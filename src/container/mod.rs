//! EDAI container: a WAV file carrying a signature and an embedded configuration
//!
//! Layout (absolute offsets):
//! - `[0x000..0x004]` `RIFF`
//! - `[0x008..0x00C]` `WAVE`
//! - `[0x100..0x110]` `\0EDAI-AudioFile\0`
//! - `[0x1000]`       sentinel, `0x00` when no configuration has been saved
//! - `[0x1000..]`     `|` + base64(JSON) + `|`, at most 40960 base64 bytes

pub mod codec;

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use tempfile::TempPath;

use crate::config::ConfigModel;
use crate::error::{EdaiError, Result};
use crate::tools::Transcoder;

pub use codec::{decode, detect, DecodeOutcome};

pub const RIFF_OFFSET: usize = 0x0;
pub const RIFF_TAG: [u8; 4] = *b"RIFF";
pub const WAVE_OFFSET: usize = 0x8;
pub const WAVE_TAG: [u8; 4] = *b"WAVE";

/// Offset of the 16-byte signature region.
pub const SIGNATURE_OFFSET: usize = 0x100;
/// Signature text, null-padded to 16 bytes.
pub const SIGNATURE: [u8; 16] = *b"\0EDAI-AudioFile\0";

/// Offset of the sentinel byte / opening delimiter.
pub const METADATA_OFFSET: usize = 0x1000;
/// First byte of base64 text.
pub const BLOB_OFFSET: usize = METADATA_OFFSET + 1;
/// Sentinel value meaning "no metadata written yet".
pub const NO_METADATA: u8 = 0x00;
pub const DELIMITER: u8 = b'|';
/// Largest base64 text the container accepts.
pub const MAX_ENCODED_LEN: usize = 40960;

/// Extension given to converted files.
pub const EDAI_EXTENSION: &str = "edai";
/// Extension of the transcoder's intermediate output.
pub const INTERMEDIATE_EXTENSION: &str = "edaitmp";

/// An open container: the file path and its full contents.
#[derive(Debug, Clone)]
pub struct EdaiContainer {
    path: PathBuf,
    bytes: Vec<u8>,
}

impl EdaiContainer {
    /// Wrap bytes that will be persisted to `path`.
    pub fn from_bytes(path: impl Into<PathBuf>, bytes: Vec<u8>) -> Self {
        Self {
            path: path.into(),
            bytes,
        }
    }

    /// Read a file into memory. No validation is done here; see [`detect`].
    pub fn read(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| EdaiError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(Self::from_bytes(path, bytes))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the buffer carries the EDAI signature.
    pub fn is_edai(&self) -> bool {
        detect(&self.bytes)
    }

    /// Decode the embedded configuration.
    pub fn decode(&self) -> DecodeOutcome {
        decode(&self.bytes)
    }

    /// Stamp and embed `config`, then write the whole buffer back to disk.
    ///
    /// Nothing is modified when the configuration is too large.
    pub fn save(&mut self, config: &mut ConfigModel) -> Result<()> {
        let encoded = codec::encode(config)?;
        codec::apply_blob(&mut self.bytes, &encoded);
        debug!(
            "embedded {} byte blob into {}",
            encoded.len(),
            self.path.display()
        );
        self.persist()
    }

    fn persist(&self) -> Result<()> {
        fs::write(&self.path, &self.bytes).map_err(|e| EdaiError::FileWriteError {
            path: self.path.clone(),
            source: e,
        })
    }

    /// Where [`convert`](Self::convert) writes the container for `source`.
    pub fn destination_for(source: &Path) -> PathBuf {
        source.with_extension(EDAI_EXTENSION)
    }

    /// Synthesize a container from arbitrary audio.
    ///
    /// The source is transcoded to `<stem>.edaitmp`, stamped, and written to
    /// `<stem>.edai` beside it. The intermediate file is always removed and
    /// the source is never touched. Neither path may be the source itself.
    pub fn convert(source: &Path, transcoder: &dyn Transcoder) -> Result<Self> {
        let destination = Self::destination_for(source);
        let intermediate_path = source.with_extension(INTERMEDIATE_EXTENSION);
        if destination == source || intermediate_path == source {
            return Err(EdaiError::DestinationConflict {
                path: source.to_path_buf(),
            });
        }
        if destination.exists() {
            warn!("replacing existing {}", destination.display());
        }

        let intermediate = TempPath::from_path(intermediate_path);
        transcoder
            .transcode(source, &intermediate)
            .map_err(|e| match e {
                EdaiError::ConversionFailed { .. } => e,
                other => EdaiError::ConversionFailed {
                    path: source.to_path_buf(),
                    reason: other.to_string(),
                },
            })?;

        let mut bytes = fs::read(&intermediate).map_err(|e| EdaiError::FileReadError {
            path: intermediate.to_path_buf(),
            source: e,
        })?;
        codec::stamp_signature(&mut bytes);

        let container = Self::from_bytes(destination, bytes);
        container.persist()?;
        info!(
            "converted {} -> {}",
            source.display(),
            container.path.display()
        );

        Ok(container)
    }
}
