//! Render output that must not outlive the play action.

use tempfile::{Builder, TempPath};

use crate::error::Result;

/// A fresh `edai-*.wav` path in the system temp directory, removed on drop.
pub fn render_target() -> Result<TempPath> {
    let file = Builder::new().prefix("edai-").suffix(".wav").tempfile()?;
    Ok(file.into_temp_path())
}
