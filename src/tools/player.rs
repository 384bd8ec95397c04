//! Terminal playback

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use log::debug;

use super::Player;
use crate::error::{EdaiError, Result};

pub(super) const DEFAULT_PLAYER: &str = "mplayer";

/// Silences every mplayer module except the status line.
const MPLAYER_MSGLEVEL: &str = "all=5:global=0:cplayer=0:gplayer=0:vo=0:ao=0:demuxer=0:ds=0:demux=0:header=0:avsync=0:autoq=0:cfgparser=0:decaudio=0:decvideo=0:seek=0:win32=0:open=0:dvd=0:parsees=0:lirc=0:stream=0:cache=0:mencoder=0:xacodec=0:tv=0:osdep=0:spudec=0:playtree=0:input=0:vfilter=0:osd=0:network=0:cpudetect=0:codeccfg=0";

/// Runs a player with the terminal attached so its controls work.
pub struct SystemPlayer {
    program: PathBuf,
}

impl SystemPlayer {
    pub fn new(program: &Path) -> Self {
        Self {
            program: program.to_path_buf(),
        }
    }

    fn is_mplayer(&self) -> bool {
        self.program
            .file_stem()
            .is_some_and(|stem| stem == DEFAULT_PLAYER)
    }

    /// Arguments for playing `path`. Custom players only receive the path.
    pub fn args_for(&self, path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();
        if self.is_mplayer() {
            args.push("-msgcolor".into());
            args.push("-msglevel".into());
            args.push(MPLAYER_MSGLEVEL.into());
            args.push("-nosub".into());
            args.push("-noautosub".into());
        }
        args.push(path.as_os_str().to_os_string());
        args
    }
}

impl Player for SystemPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        let args = self.args_for(path);
        debug!("playing with {} {:?}", self.program.display(), args);

        let status = Command::new(&self.program)
            .args(&args)
            .status()
            .map_err(|e| EdaiError::ToolLaunch {
                tool: self.program.display().to_string(),
                source: e,
            })?;

        if !status.success() {
            return Err(EdaiError::PlaybackFailed {
                reason: format!("{} exited with {}", self.program.display(), status),
            });
        }
        Ok(())
    }
}
