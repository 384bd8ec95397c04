//! Playback pipeline
//!
//! Turns a configuration into the renderer's argument list. Stages run in
//! list order:
//! 1. Pulsator (slow amplitude modulation of the dry signal)
//! 2. Echo (applied after pulsation so it does not modulate the echo tail)
//!
//! Effects, splits and conversion are stored but do not render yet.

use std::ffi::OsString;
use std::fmt;
use std::path::Path;

use crate::config::ConfigModel;

/// Pulsation rate of the spatial surround stage.
pub const SURROUND_PULSE_HZ: f64 = 0.015;

/// A single `-af` filter stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterStage {
    /// `apulsator=hz=<hz>`
    Pulsator { hz: f64 },
    /// `aecho=<in_gain>:<out_gain>:<delay_ms>:<decay>`
    Echo {
        in_gain: f64,
        out_gain: f64,
        delay_ms: u32,
        decay: f64,
    },
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterStage::Pulsator { hz } => write!(f, "apulsator=hz={}", hz),
            FilterStage::Echo {
                in_gain,
                out_gain,
                delay_ms,
                decay,
            } => write!(
                f,
                "aecho={:.1}:{:.1}:{}:{:.1}",
                in_gain, out_gain, delay_ms, decay
            ),
        }
    }
}

/// The two stages that make up EDAI Spatial Surround, in order.
pub fn spatial_stages() -> [FilterStage; 2] {
    [
        FilterStage::Pulsator {
            hz: SURROUND_PULSE_HZ,
        },
        FilterStage::Echo {
            in_gain: 1.0,
            out_gain: 0.7,
            delay_ms: 20,
            decay: 0.5,
        },
    ]
}

/// Filter stages implied by a configuration, in render order.
pub fn filter_stages(config: &ConfigModel) -> Vec<FilterStage> {
    let mut stages = Vec::new();

    if config.spatial {
        stages.extend(spatial_stages());
    }

    // effects, splits and conversion have no rendering yet

    stages
}

/// Full renderer argument list: input, filter stages, output.
pub fn build_playback_args(config: &ConfigModel, input: &Path, output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-i".into(), input.as_os_str().to_os_string()];

    for stage in filter_stages(config) {
        args.push("-af".into());
        args.push(stage.to_string().into());
    }

    args.push(output.as_os_str().to_os_string());
    args
}
