//! Session orchestration
//!
//! Resolves the input file, turns it into a container (converting when
//! needed), loads its configuration and hands over to the menus.

use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::container::{DecodeOutcome, EdaiContainer};
use crate::error::{EdaiError, Result};
use crate::menu::{ExitStatus, MenuMachine, Prompter, Session, UNKNOWN_STREAM};
use crate::tools::Toolbox;

const PATH_PROMPT: &str = "Enter the path to an EDAI or other audio file:";

fn exists(path: &Path) -> Result<bool> {
    path.try_exists().map_err(|e| EdaiError::PathCheck {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Pick the file to edit.
///
/// A path given on the command line must exist. Without one, the user is
/// asked until an existing path is entered; `None` means they cancelled.
pub fn resolve_input(arg: Option<&Path>, prompter: &mut dyn Prompter) -> Result<Option<PathBuf>> {
    if let Some(path) = arg {
        if !exists(path)? {
            return Err(EdaiError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok(Some(path.to_path_buf()));
    }

    loop {
        let entered = match prompter.text(PATH_PROMPT)? {
            Some(entered) => entered,
            None => return Ok(None),
        };

        let path = PathBuf::from(entered);
        if !path.as_os_str().is_empty() && exists(&path)? {
            return Ok(Some(path));
        }
        prompter.say("File not found")?;
    }
}

/// Open `path` as a container, converting foreign audio first, and load
/// its configuration and stream description.
pub fn open_session(path: &Path, tools: &Toolbox, prompter: &mut dyn Prompter) -> Result<Session> {
    let mut container = EdaiContainer::read(path)?;

    if !container.is_edai() {
        prompter.say("File is not an EDAI file, converting it to EDAI...")?;
        let destination = EdaiContainer::destination_for(path);
        if destination.exists() {
            prompter.say(&format!(
                "Replacing existing {} and the settings saved in it.",
                destination.display()
            ))?;
        }
        container = EdaiContainer::convert(path, tools.transcoder.as_ref())?;
        prompter.say("Conversion completed.")?;
    }

    let config = match container.decode() {
        DecodeOutcome::Empty => Default::default(),
        DecodeOutcome::Loaded(config) => config,
        DecodeOutcome::Corrupt(e) => {
            warn!("metadata in {} is corrupt: {}", container.path().display(), e);
            prompter.say(&format!(
                "Warning: the saved settings could not be read ({}). Starting with default settings.",
                e
            ))?;
            Default::default()
        }
    };

    let stream = match tools.prober.probe(container.path()) {
        Ok(info) => info.to_string(),
        Err(e) => {
            warn!("probe failed for {}: {}", container.path().display(), e);
            UNKNOWN_STREAM.to_string()
        }
    };

    Ok(Session::new(container, config, stream))
}

/// Run one full session and report how it ended.
pub fn run(path_arg: Option<&Path>, tools: &Toolbox, prompter: &mut dyn Prompter) -> Result<ExitStatus> {
    let path = match resolve_input(path_arg, prompter)? {
        Some(path) => path,
        None => return Ok(ExitStatus::Aborted),
    };
    info!("opening {}", path.display());

    let session = open_session(&path, tools, prompter)?;
    let mut machine = MenuMachine::new(session, tools, prompter);
    machine.run()
}
