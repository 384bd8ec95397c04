//! Byte-level codec for the EDAI container
//!
//! All functions here operate on a plain byte buffer; file handling lives in
//! [`EdaiContainer`](super::EdaiContainer).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use log::debug;

use super::{
    BLOB_OFFSET, DELIMITER, MAX_ENCODED_LEN, METADATA_OFFSET, NO_METADATA, RIFF_OFFSET, RIFF_TAG,
    SIGNATURE, SIGNATURE_OFFSET, WAVE_OFFSET, WAVE_TAG,
};
use crate::config::ConfigModel;
use crate::error::{EdaiError, MetadataError, Result};

/// Result of reading the metadata region of a container.
#[derive(Debug)]
pub enum DecodeOutcome {
    /// Sentinel is `0x00`: nothing has been saved yet.
    Empty,
    /// A blob was present and parsed.
    Loaded(ConfigModel),
    /// A blob was present but could not be read back.
    Corrupt(MetadataError),
}

impl DecodeOutcome {
    /// The configuration to edit, falling back to defaults when nothing usable was stored.
    pub fn into_config(self) -> ConfigModel {
        match self {
            DecodeOutcome::Loaded(config) => config,
            DecodeOutcome::Empty | DecodeOutcome::Corrupt(_) => ConfigModel::default(),
        }
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, DecodeOutcome::Corrupt(_))
    }
}

/// True iff the buffer carries the RIFF/WAVE tags and the EDAI signature.
pub fn detect(bytes: &[u8]) -> bool {
    region(bytes, RIFF_OFFSET, RIFF_TAG.len()) == Some(&RIFF_TAG[..])
        && region(bytes, WAVE_OFFSET, WAVE_TAG.len()) == Some(&WAVE_TAG[..])
        && region(bytes, SIGNATURE_OFFSET, SIGNATURE.len()) == Some(&SIGNATURE[..])
}

fn region(bytes: &[u8], offset: usize, len: usize) -> Option<&[u8]> {
    bytes.get(offset..offset + len)
}

/// Read the configuration blob, if any.
pub fn decode(bytes: &[u8]) -> DecodeOutcome {
    match bytes.get(METADATA_OFFSET) {
        None | Some(&NO_METADATA) => return DecodeOutcome::Empty,
        Some(_) => {}
    }

    let text = match blob_text(bytes) {
        Some(text) => text,
        None => {
            return DecodeOutcome::Corrupt(MetadataError::Unterminated {
                limit: MAX_ENCODED_LEN + 1,
            })
        }
    };

    match parse_blob(text) {
        Ok(config) => DecodeOutcome::Loaded(config),
        Err(e) => {
            debug!("metadata blob rejected: {}", e);
            DecodeOutcome::Corrupt(e)
        }
    }
}

/// Bytes between the opening delimiter and the first closing `|`.
///
/// The scan covers at most `MAX_ENCODED_LEN + 1` bytes, which is enough for
/// the largest legal blob plus its closing delimiter.
fn blob_text(bytes: &[u8]) -> Option<&[u8]> {
    let window_end = bytes.len().min(BLOB_OFFSET + MAX_ENCODED_LEN + 1);
    let window = bytes.get(BLOB_OFFSET..window_end)?;
    let len = window.iter().position(|&b| b == DELIMITER)?;
    Some(&window[..len])
}

fn parse_blob(text: &[u8]) -> std::result::Result<ConfigModel, MetadataError> {
    let raw = STANDARD.decode(text)?;
    let json = String::from_utf8(raw)?;
    Ok(serde_json::from_str(&json)?)
}

/// Reject encoded blobs longer than the container allows.
pub fn check_encoded_len(len: usize) -> Result<()> {
    if len > MAX_ENCODED_LEN {
        return Err(EdaiError::ConfigTooLarge {
            overage: len - MAX_ENCODED_LEN,
        });
    }
    Ok(())
}

/// Serialize and base64-encode a configuration as-is.
pub fn encode_blob(config: &ConfigModel) -> Result<String> {
    let json = serde_json::to_string(config)?;
    let encoded = STANDARD.encode(json.as_bytes());
    check_encoded_len(encoded.len())?;
    Ok(encoded)
}

/// Stamp save metadata into the configuration, then encode it.
pub fn encode(config: &mut ConfigModel) -> Result<String> {
    config.stamp(Utc::now());
    encode_blob(config)
}

/// Write `|<encoded>|` at the metadata offset.
///
/// Bytes left over from a longer previous blob are zeroed so the region only
/// ever holds one blob. The buffer grows if it is too short to hold the blob.
pub fn apply_blob(bytes: &mut Vec<u8>, encoded: &str) {
    let previous_end = match bytes.get(METADATA_OFFSET) {
        Some(&b) if b != NO_METADATA => {
            blob_text(bytes).map(|text| BLOB_OFFSET + text.len() + 1)
        }
        _ => None,
    };

    let mut framed = Vec::with_capacity(encoded.len() + 2);
    framed.push(DELIMITER);
    framed.extend_from_slice(encoded.as_bytes());
    framed.push(DELIMITER);

    let new_end = METADATA_OFFSET + framed.len();
    if bytes.len() < new_end {
        bytes.resize(new_end, 0);
    }
    bytes[METADATA_OFFSET..new_end].copy_from_slice(&framed);

    if let Some(previous_end) = previous_end {
        if previous_end > new_end {
            debug!("zeroing {} stale metadata bytes", previous_end - new_end);
            bytes[new_end..previous_end].fill(0);
        }
    }
}

/// Stamp the signature and mark the metadata region empty.
pub fn stamp_signature(bytes: &mut Vec<u8>) {
    if bytes.len() <= METADATA_OFFSET {
        bytes.resize(METADATA_OFFSET + 1, 0);
    }
    bytes[SIGNATURE_OFFSET..SIGNATURE_OFFSET + SIGNATURE.len()].copy_from_slice(&SIGNATURE);
    bytes[METADATA_OFFSET] = NO_METADATA;
}
