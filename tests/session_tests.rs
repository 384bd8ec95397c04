//! Session Tests
//!
//! End-to-end runs of the orchestrator and menus against scripted input and
//! in-process stand-ins for ffmpeg, ffprobe and the player.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use edai::cli::commands;
use edai::container::{self, codec, DecodeOutcome, EdaiContainer};
use edai::menu::{ExitStatus, Prompter, UNKNOWN_STREAM};
use edai::tools::{Player, Prober, Renderer, StreamInfo, Toolbox, Transcoder};
use edai::{EdaiError, Result};
use tempfile::tempdir;

// === Test doubles ===

/// Answers prompts from a script and records everything shown.
#[derive(Default)]
struct ScriptedPrompter {
    selections: VecDeque<Option<usize>>,
    texts: VecDeque<Option<String>>,
    menus: Vec<(String, Vec<String>)>,
    said: Vec<String>,
}

impl ScriptedPrompter {
    fn selecting(selections: &[Option<usize>]) -> Self {
        Self {
            selections: selections.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn said_containing(&self, needle: &str) -> usize {
        self.said.iter().filter(|line| line.contains(needle)).count()
    }
}

impl Prompter for ScriptedPrompter {
    fn select(&mut self, message: &str, choices: &[String]) -> Result<Option<usize>> {
        self.menus.push((message.to_string(), choices.to_vec()));
        Ok(self.selections.pop_front().flatten())
    }

    fn text(&mut self, _message: &str) -> Result<Option<String>> {
        Ok(self.texts.pop_front().flatten())
    }

    fn say(&mut self, line: &str) -> Result<()> {
        self.said.push(line.to_string());
        Ok(())
    }
}

struct CopyTranscoder;

impl Transcoder for CopyTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        fs::copy(input, output)?;
        Ok(())
    }
}

struct FailingTranscoder;

impl Transcoder for FailingTranscoder {
    fn transcode(&self, input: &Path, output: &Path) -> Result<()> {
        fs::write(output, b"partial")?;
        Err(EdaiError::ConversionFailed {
            path: input.to_path_buf(),
            reason: "exit status: 1".to_string(),
        })
    }
}

struct FixedProber;

impl Prober for FixedProber {
    fn probe(&self, _path: &Path) -> Result<StreamInfo> {
        Ok(StreamInfo {
            sample_rate: 44100,
            bits_per_sample: 16,
            channels: 2,
            bit_rate: 1_411_200,
            duration_secs: 205.0,
        })
    }
}

struct FailingProber;

impl Prober for FailingProber {
    fn probe(&self, _path: &Path) -> Result<StreamInfo> {
        Err(EdaiError::ProbeFailed {
            reason: "no streams".to_string(),
        })
    }
}

/// Writes the last argument as the rendered file and records the call.
///
/// A failing renderer still leaves partial output behind, like ffmpeg does.
struct RecordingRenderer {
    calls: Rc<RefCell<Vec<Vec<OsString>>>>,
    fail: bool,
}

impl Renderer for RecordingRenderer {
    fn render(&self, args: &[OsString]) -> Result<()> {
        self.calls.borrow_mut().push(args.to_vec());
        if let Some(output) = args.last() {
            fs::write(output, b"rendered")?;
        }
        if self.fail {
            return Err(EdaiError::RenderFailed {
                reason: "exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Records the path it was asked to play and whether it existed then.
struct RecordingPlayer {
    played: Rc<RefCell<Vec<(PathBuf, bool)>>>,
    fail: bool,
}

impl Player for RecordingPlayer {
    fn play(&self, path: &Path) -> Result<()> {
        self.played
            .borrow_mut()
            .push((path.to_path_buf(), path.exists()));
        if self.fail {
            return Err(EdaiError::PlaybackFailed {
                reason: "mplayer exited with exit status: 1".to_string(),
            });
        }
        Ok(())
    }
}

struct Harness {
    tools: Toolbox,
    renders: Rc<RefCell<Vec<Vec<OsString>>>>,
    played: Rc<RefCell<Vec<(PathBuf, bool)>>>,
}

impl Harness {
    fn new() -> Self {
        Self::build(Box::new(CopyTranscoder), Box::new(FixedProber), false)
    }

    fn build(transcoder: Box<dyn Transcoder>, prober: Box<dyn Prober>, render_fails: bool) -> Self {
        Self::with_player(transcoder, prober, render_fails, false)
    }

    fn with_player(
        transcoder: Box<dyn Transcoder>,
        prober: Box<dyn Prober>,
        render_fails: bool,
        player_fails: bool,
    ) -> Self {
        let renders = Rc::new(RefCell::new(Vec::new()));
        let played = Rc::new(RefCell::new(Vec::new()));
        let tools = Toolbox {
            prober,
            transcoder,
            renderer: Box::new(RecordingRenderer {
                calls: Rc::clone(&renders),
                fail: render_fails,
            }),
            player: Box::new(RecordingPlayer {
                played: Rc::clone(&played),
                fail: player_fails,
            }),
        };
        Self {
            tools,
            renders,
            played,
        }
    }
}

// === Fixtures ===

/// A short stereo 16-bit WAV, large enough to span the metadata offset.
fn write_wav(path: &Path) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for i in 0..8000i32 {
        let sample = ((i % 200) - 100) as i16 * 100;
        writer.write_sample(sample).unwrap();
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

/// A stamped container with no saved configuration.
fn write_container(path: &Path) -> Vec<u8> {
    let wav = path.with_extension("wav");
    write_wav(&wav);
    let mut bytes = fs::read(&wav).unwrap();
    fs::remove_file(&wav).unwrap();
    codec::stamp_signature(&mut bytes);
    fs::write(path, &bytes).unwrap();
    bytes
}

fn reload_config(path: &Path) -> edai::ConfigModel {
    match EdaiContainer::read(path).unwrap().decode() {
        DecodeOutcome::Loaded(config) => config,
        other => panic!("expected saved configuration, got {:?}", other),
    }
}

// === Conversion ===

#[test]
fn test_open_converts_plain_wav() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("song.wav");
    write_wav(&source);
    let original = fs::read(&source).unwrap();

    let harness = Harness::new();
    let mut prompter = ScriptedPrompter::default();
    let session = commands::open_session(&source, &harness.tools, &mut prompter).unwrap();

    let converted = dir.path().join("song.edai");
    assert_eq!(session.path(), converted);
    assert_eq!(
        prompter.said,
        vec![
            "File is not an EDAI file, converting it to EDAI...",
            "Conversion completed."
        ]
    );

    let bytes = fs::read(&converted).unwrap();
    assert!(container::detect(&bytes));
    assert_eq!(bytes[container::METADATA_OFFSET], container::NO_METADATA);
    assert_eq!(&bytes[0..4], b"RIFF");

    assert_eq!(fs::read(&source).unwrap(), original);
    assert!(!dir.path().join("song.edaitmp").exists());
    assert_eq!(session.config, edai::ConfigModel::default());
}

#[test]
fn test_conversion_announces_replaced_container() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("song.wav");
    write_wav(&source);
    let harness = Harness::new();

    let mut first = ScriptedPrompter::selecting(&[Some(4), Some(1), Some(0), Some(0)]);
    commands::run(Some(&source), &harness.tools, &mut first).unwrap();
    assert_eq!(first.said_containing("Replacing existing"), 0);
    assert!(reload_config(&dir.path().join("song.edai")).spatial);

    let mut second = ScriptedPrompter::default();
    let session = commands::open_session(&source, &harness.tools, &mut second).unwrap();

    assert_eq!(second.said_containing("Replacing existing"), 1);
    assert!(!session.config.spatial);
}

#[test]
fn test_edaitmp_source_is_never_removed() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("take.edaitmp");
    write_wav(&source);
    let original = fs::read(&source).unwrap();

    let harness = Harness::build(Box::new(FailingTranscoder), Box::new(FixedProber), false);
    let mut prompter = ScriptedPrompter::default();

    let result = commands::run(Some(&source), &harness.tools, &mut prompter);

    assert!(matches!(result, Err(EdaiError::DestinationConflict { .. })));
    assert_eq!(fs::read(&source).unwrap(), original);
}

#[test]
fn test_conversion_failure_is_fatal() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("broken.mp3");
    fs::write(&source, b"ID3 not really audio").unwrap();

    let harness = Harness::build(Box::new(FailingTranscoder), Box::new(FixedProber), false);
    let mut prompter = ScriptedPrompter::selecting(&[Some(0)]);

    let result = commands::run(Some(&source), &harness.tools, &mut prompter);

    match result {
        Err(e) => {
            assert!(matches!(e, EdaiError::ConversionFailed { .. }));
            assert_eq!(e.exit_code(), 2);
        }
        Ok(status) => panic!("expected conversion failure, got {:?}", status),
    }
    assert!(!dir.path().join("broken.edaitmp").exists());
    assert!(!dir.path().join("broken.edai").exists());
    assert!(prompter.menus.is_empty());
}

#[test]
fn test_missing_path_argument() {
    let dir = tempdir().unwrap();
    let harness = Harness::new();
    let mut prompter = ScriptedPrompter::default();

    let result = commands::run(
        Some(&dir.path().join("absent.wav")),
        &harness.tools,
        &mut prompter,
    );
    assert!(matches!(result, Err(EdaiError::FileNotFound { .. })));
}

#[test]
fn test_cancelled_path_prompt_aborts() {
    let harness = Harness::new();
    let mut prompter = ScriptedPrompter::default();

    let status = commands::run(None, &harness.tools, &mut prompter).unwrap();
    assert_eq!(status, ExitStatus::Aborted);
}

// === Loading ===

#[test]
fn test_corrupt_metadata_falls_back_with_warning() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    let mut bytes = write_container(&path);
    let start = container::METADATA_OFFSET;
    bytes[start..start + 6].copy_from_slice(b"|!!!!|");
    fs::write(&path, &bytes).unwrap();

    let harness = Harness::new();
    let mut prompter = ScriptedPrompter::default();
    let session = commands::open_session(&path, &harness.tools, &mut prompter).unwrap();

    assert_eq!(session.config, edai::ConfigModel::default());
    assert_eq!(prompter.said_containing("Warning"), 1);
}

#[test]
fn test_probe_failure_shows_unknown_stream() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);

    let harness = Harness::build(Box::new(CopyTranscoder), Box::new(FailingProber), false);
    let mut prompter = ScriptedPrompter::selecting(&[None]);

    let status = commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();

    assert_eq!(status, ExitStatus::Aborted);
    assert_eq!(prompter.menus[0].0, UNKNOWN_STREAM);
}

// === Menus ===

#[test]
fn test_toggle_then_quit_persists_spatial() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);

    let harness = Harness::new();
    // Spatial audio, toggle, back, quit
    let mut prompter = ScriptedPrompter::selecting(&[Some(4), Some(1), Some(0), Some(0)]);

    let status = commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();

    assert_eq!(status, ExitStatus::Saved);
    assert_eq!(prompter.menus[1].1[1], "[OFF] EDAI Spatial Surround");
    assert_eq!(prompter.menus[2].1[1], "[ON] EDAI Spatial Surround");

    let saved = reload_config(&path);
    assert!(saved.spatial);
    let metadata = saved.metadata.unwrap();
    assert_eq!(metadata.last_save_version, edai::EDAI_VERSION);
    assert!(metadata.last_save_date > 0);
}

#[test]
fn test_abort_discards_changes() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    let before = write_container(&path);

    let harness = Harness::new();
    // Spatial audio, toggle, cancel
    let mut prompter = ScriptedPrompter::selecting(&[Some(4), Some(1), None]);

    let status = commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();

    assert_eq!(status, ExitStatus::Aborted);
    assert_eq!(status.code(), 1);
    assert_eq!(fs::read(&path).unwrap(), before);
}

#[test]
fn test_play_renders_plays_and_cleans_up() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);

    let harness = Harness::new();
    // Spatial audio, toggle, back, play, quit
    let mut prompter =
        ScriptedPrompter::selecting(&[Some(4), Some(1), Some(0), Some(1), Some(0)]);

    let status = commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();
    assert_eq!(status, ExitStatus::Saved);

    let renders = harness.renders.borrow();
    assert_eq!(renders.len(), 1);
    let args = &renders[0];
    assert_eq!(args[1].as_os_str(), path.as_os_str());
    assert!(args.contains(&OsString::from("apulsator=hz=0.015")));
    assert!(args.contains(&OsString::from("aecho=1.0:0.7:20:0.5")));

    let played = harness.played.borrow();
    assert_eq!(played.len(), 1);
    let (played_path, existed) = &played[0];
    assert!(*existed);
    assert_eq!(played_path.as_os_str(), args.last().unwrap().as_os_str());
    assert!(!played_path.exists());
}

#[test]
fn test_render_failure_returns_to_main_menu() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);

    let harness = Harness::build(Box::new(CopyTranscoder), Box::new(FixedProber), true);
    // Play, quit
    let mut prompter = ScriptedPrompter::selecting(&[Some(1), Some(0)]);

    let status = commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();

    assert_eq!(status, ExitStatus::Saved);
    assert_eq!(prompter.said_containing("An error occurred while rendering"), 1);
    assert!(harness.played.borrow().is_empty());
    assert!(!reload_config(&path).spatial);

    let renders = harness.renders.borrow();
    let output = Path::new(renders[0].last().unwrap());
    assert!(!output.exists());
}

#[test]
fn test_player_failure_returns_to_main_menu() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);

    let harness = Harness::with_player(
        Box::new(CopyTranscoder),
        Box::new(FixedProber),
        false,
        true,
    );
    // Play, quit
    let mut prompter = ScriptedPrompter::selecting(&[Some(1), Some(0)]);

    let status = commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();

    assert_eq!(status, ExitStatus::Saved);
    assert_eq!(prompter.menus.len(), 2);
    assert_eq!(prompter.said_containing("Playback failed"), 1);

    let played = harness.played.borrow();
    assert_eq!(played.len(), 1);
    assert!(!played[0].0.exists());
}

#[test]
fn test_unbuilt_editors_change_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);

    let harness = Harness::new();
    // Effects, splitter, converter, quit
    let mut prompter = ScriptedPrompter::selecting(&[Some(2), Some(3), Some(5), Some(0)]);

    let status = commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();

    assert_eq!(status, ExitStatus::Saved);
    assert_eq!(prompter.said_containing("is not available yet"), 3);
    assert_eq!(prompter.menus.len(), 4);

    let mut saved = reload_config(&path);
    saved.metadata = None;
    assert_eq!(saved, edai::ConfigModel::default());
}

#[test]
fn test_about_summary() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);

    let harness = Harness::new();
    // About, cancel
    let mut prompter = ScriptedPrompter::selecting(&[Some(6), None]);

    commands::run(Some(&path), &harness.tools, &mut prompter).unwrap();

    assert_eq!(prompter.said_containing(&path.display().to_string()), 1);
    assert_eq!(
        prompter.said_containing("44100 Hz, 16-bit, Stereo, 1411 kbps, 00:03:25"),
        1
    );
    assert!(prompter.said.contains(&"  - EDAI Spatial Surround: OFF".to_string()));
    assert!(prompter.said.contains(&"  - Splits: 0 (default)".to_string()));
    assert!(prompter.said.contains(&"  - Format: (default)".to_string()));
}

#[test]
fn test_saved_settings_survive_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("take.edai");
    write_container(&path);
    let harness = Harness::new();

    let mut first = ScriptedPrompter::selecting(&[Some(4), Some(1), Some(0), Some(0)]);
    commands::run(Some(&path), &harness.tools, &mut first).unwrap();

    let mut second = ScriptedPrompter::default();
    let session = commands::open_session(&path, &harness.tools, &mut second).unwrap();
    assert!(session.config.spatial);
    assert!(second.said.is_empty());
}
