//! Interactive editing state machine
//!
//! Two states, driven by one synchronous prompt per step:
//!
//! ```text
//! MainMenu --Spatial--> SpatialSubmenu --Back--> MainMenu
//!    |                       |
//!    |                       +--ToggleSurround--> SpatialSubmenu
//!    +--Quit--> save, exit 0
//!    +--(cancel)--> exit 1 (either state)
//! ```
//!
//! Play, About and the unimplemented editors always return to `MainMenu`.

pub mod prompt;

use std::path::Path;

use log::{info, warn};

use crate::config::ConfigModel;
use crate::container::EdaiContainer;
use crate::error::{Result, EXIT_ABORTED, EXIT_OK};
use crate::pipeline::build_playback_args;
use crate::tools::{render_target, Toolbox};

pub use prompt::{Prompter, TerminalPrompter};

/// Shown in place of a stream description when probing fails.
pub const UNKNOWN_STREAM: &str = "Unknown stream";

/// Everything one editing session owns.
#[derive(Debug)]
pub struct Session {
    pub container: EdaiContainer,
    pub config: ConfigModel,
    /// Stream description for headers; probed once per session.
    pub stream: String,
}

impl Session {
    pub fn new(container: EdaiContainer, config: ConfigModel, stream: String) -> Self {
        Self {
            container,
            config,
            stream,
        }
    }

    pub fn path(&self) -> &Path {
        self.container.path()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    MainMenu,
    SpatialSubmenu,
}

/// Main menu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MainChoice {
    Quit,
    Play,
    Effects,
    Splitter,
    Spatial,
    Converter,
    About,
}

impl MainChoice {
    pub const ALL: [MainChoice; 7] = [
        MainChoice::Quit,
        MainChoice::Play,
        MainChoice::Effects,
        MainChoice::Splitter,
        MainChoice::Spatial,
        MainChoice::Converter,
        MainChoice::About,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            MainChoice::Quit => "Quit",
            MainChoice::Play => "Play audio file",
            MainChoice::Effects => "Effects",
            MainChoice::Splitter => "Splitter",
            MainChoice::Spatial => "Spatial audio",
            MainChoice::Converter => "Converter",
            MainChoice::About => "About this file",
        }
    }
}

/// Spatial submenu entries, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialChoice {
    Back,
    ToggleSurround,
}

impl SpatialChoice {
    pub const ALL: [SpatialChoice; 2] = [SpatialChoice::Back, SpatialChoice::ToggleSurround];
}

/// Editors that are listed but not built yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Effects,
    Splitter,
    Converter,
}

impl Feature {
    pub fn name(&self) -> &'static str {
        match self {
            Feature::Effects => "Effects",
            Feature::Splitter => "Splitter",
            Feature::Converter => "Converter",
        }
    }
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Configuration written back to the container.
    Saved,
    /// A prompt was cancelled; nothing was written.
    Aborted,
}

impl ExitStatus {
    pub fn code(&self) -> u8 {
        match self {
            ExitStatus::Saved => EXIT_OK,
            ExitStatus::Aborted => EXIT_ABORTED,
        }
    }
}

/// Result of one transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Go to this state next.
    Continue(MenuState),
    /// Stayed in `MainMenu` after selecting an editor that does not exist yet.
    NotImplemented(Feature),
    /// The session is over.
    Exit(ExitStatus),
}

/// Drives a [`Session`] through the menus.
pub struct MenuMachine<'a> {
    session: Session,
    tools: &'a Toolbox,
    prompter: &'a mut dyn Prompter,
}

impl<'a> MenuMachine<'a> {
    pub fn new(session: Session, tools: &'a Toolbox, prompter: &'a mut dyn Prompter) -> Self {
        Self {
            session,
            tools,
            prompter,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    /// Run from `MainMenu` until the session exits.
    pub fn run(&mut self) -> Result<ExitStatus> {
        let mut state = MenuState::MainMenu;
        loop {
            let step = self.step(state)?;
            match step {
                Step::Exit(status) => return Ok(status),
                Step::Continue(next) => state = next,
                Step::NotImplemented(_) => state = MenuState::MainMenu,
            }
        }
    }

    /// Prompt once in `state` and apply the answer.
    pub fn step(&mut self, state: MenuState) -> Result<Step> {
        match state {
            MenuState::MainMenu => {
                let choice = self.prompt_main()?;
                self.apply_main(choice)
            }
            MenuState::SpatialSubmenu => {
                let choice = self.prompt_spatial()?;
                self.apply_spatial(choice)
            }
        }
    }

    fn prompt_main(&mut self) -> Result<Option<MainChoice>> {
        let titles: Vec<String> = MainChoice::ALL
            .iter()
            .map(|c| c.title().to_string())
            .collect();
        let picked = self.prompter.select(&self.session.stream, &titles)?;
        Ok(picked.and_then(|i| MainChoice::ALL.get(i).copied()))
    }

    fn prompt_spatial(&mut self) -> Result<Option<SpatialChoice>> {
        let titles = vec![
            "Back".to_string(),
            format!(
                "[{}] EDAI Spatial Surround",
                on_off(self.session.config.spatial)
            ),
        ];
        let picked = self.prompter.select("Spatial audio", &titles)?;
        Ok(picked.and_then(|i| SpatialChoice::ALL.get(i).copied()))
    }

    /// Apply a main menu answer. `None` means the prompt was cancelled.
    pub fn apply_main(&mut self, choice: Option<MainChoice>) -> Result<Step> {
        let choice = match choice {
            Some(choice) => choice,
            None => return Ok(self.abort()),
        };

        match choice {
            MainChoice::Quit => {
                self.session.container.save(&mut self.session.config)?;
                info!("saved {}", self.session.path().display());
                Ok(Step::Exit(ExitStatus::Saved))
            }
            MainChoice::Play => {
                self.play()?;
                Ok(Step::Continue(MenuState::MainMenu))
            }
            MainChoice::About => {
                self.about()?;
                Ok(Step::Continue(MenuState::MainMenu))
            }
            MainChoice::Spatial => Ok(Step::Continue(MenuState::SpatialSubmenu)),
            MainChoice::Effects => self.not_implemented(Feature::Effects),
            MainChoice::Splitter => self.not_implemented(Feature::Splitter),
            MainChoice::Converter => self.not_implemented(Feature::Converter),
        }
    }

    /// Apply a spatial submenu answer. `None` means the prompt was cancelled.
    pub fn apply_spatial(&mut self, choice: Option<SpatialChoice>) -> Result<Step> {
        match choice {
            None => Ok(self.abort()),
            Some(SpatialChoice::Back) => Ok(Step::Continue(MenuState::MainMenu)),
            Some(SpatialChoice::ToggleSurround) => {
                let on = self.session.config.toggle_spatial();
                info!("spatial surround {}", on_off(on));
                Ok(Step::Continue(MenuState::SpatialSubmenu))
            }
        }
    }

    fn abort(&self) -> Step {
        info!("prompt cancelled, discarding unsaved changes");
        Step::Exit(ExitStatus::Aborted)
    }

    fn not_implemented(&mut self, feature: Feature) -> Result<Step> {
        self.prompter
            .say(&format!("{} is not available yet.", feature.name()))?;
        Ok(Step::NotImplemented(feature))
    }

    /// Render the current settings to a temp file and play it.
    ///
    /// Render and playback failures are reported and the menu continues.
    /// The temp file is removed either way.
    fn play(&mut self) -> Result<()> {
        self.prompter.say("Rendering file... Please wait.")?;

        let target = render_target()?;
        let args = build_playback_args(&self.session.config, self.session.path(), &target);

        if let Err(e) = self.tools.renderer.render(&args) {
            warn!("render failed: {}", e);
            self.prompter.say(&format!(
                "An error occurred while rendering the file. Make sure all of your settings are configured properly and try again. ({})",
                e
            ))?;
            return Ok(());
        }

        if let Err(e) = self.tools.player.play(&target) {
            warn!("playback failed: {}", e);
            self.prompter.say(&e.to_string())?;
        }

        Ok(())
    }

    fn about(&mut self) -> Result<()> {
        for line in about_lines(&self.session) {
            self.prompter.say(&line)?;
        }
        Ok(())
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "ON"
    } else {
        "OFF"
    }
}

/// Read-only summary of the session.
pub fn about_lines(session: &Session) -> Vec<String> {
    let config = &session.config;
    let splits_suffix = if config.splits.is_empty() {
        " (default)"
    } else {
        ""
    };

    vec![
        "---------------------------------".to_string(),
        session.path().display().to_string(),
        session.stream.clone(),
        format!("  - EDAI Spatial Surround: {}", on_off(config.spatial)),
        format!("  - Effects: {}", config.effects.len()),
        format!("  - Splits: {}{}", config.splits.len(), splits_suffix),
        format!("  - Format: {}", config.format_label()),
        "---------------------------------".to_string(),
    ]
}
