//! Configuration embedded in an EDAI container
//!
//! The configuration travels as camelCase JSON. Every field has a default so
//! that blobs written by older versions (or hand-edited ones missing fields)
//! still decode.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Version stamped into `metadata.lastSaveVersion` on every save.
pub const EDAI_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Editable settings stored inside a container.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigModel {
    /// Planned effects, in application order.
    #[serde(default)]
    pub effects: Vec<EffectSpec>,

    /// Planned split points, in file order.
    #[serde(default)]
    pub splits: Vec<SplitPoint>,

    /// EDAI Spatial Surround toggle.
    #[serde(default)]
    pub spatial: bool,

    /// Target format for conversion; `None` keeps the source format.
    #[serde(default)]
    pub conversion: Option<ConversionTarget>,

    /// Stamped on every save; absent until the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<SaveMetadata>,

    /// Unknown fields preserved for forward compatibility.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// A planned effect. Reserved: nothing renders effects yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectSpec {
    /// Effect type (e.g. "gain", "reverb").
    #[serde(rename = "type")]
    pub effect_type: String,

    /// Effect-specific parameters.
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
}

/// A planned split. Reserved: nothing splits files yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SplitPoint {
    /// Position from the start of the audio, in milliseconds.
    pub position_ms: u64,
}

/// Requested output format for the converter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionTarget {
    /// Container/codec name understood by ffmpeg (e.g. "flac", "mp3").
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bit_depth: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channels: Option<u8>,
}

impl fmt::Display for ConversionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format)?;
        if let Some(rate) = self.sample_rate {
            write!(f, ", {} Hz", rate)?;
        }
        if let Some(bits) = self.bit_depth {
            write!(f, ", {}-bit", bits)?;
        }
        if let Some(channels) = self.channels {
            write!(f, ", {} ch", channels)?;
        }
        Ok(())
    }
}

/// Save provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMetadata {
    /// EDAI version that wrote the blob.
    pub last_save_version: String,

    /// Save time in milliseconds since the Unix epoch.
    pub last_save_date: i64,
}

impl ConfigModel {
    /// Record who saved this configuration and when.
    pub fn stamp(&mut self, at: DateTime<Utc>) {
        self.metadata = Some(SaveMetadata {
            last_save_version: EDAI_VERSION.to_string(),
            last_save_date: at.timestamp_millis(),
        });
    }

    /// Flip the spatial surround toggle, returning the new value.
    pub fn toggle_spatial(&mut self) -> bool {
        self.spatial = !self.spatial;
        self.spatial
    }

    /// Human-readable label for the conversion setting.
    pub fn format_label(&self) -> String {
        match &self.conversion {
            Some(target) => target.to_string(),
            None => "(default)".to_string(),
        }
    }
}
