//! Persistent application settings (`air_braille.json`).
//!
//! Every section uses `#[serde(default)]`, so a partial file is filled in
//! from defaults and written back with the new fields on the next load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use braille_cell::EngineConfig;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

pub const DEFAULT_PATH: &str = "air_braille.json";

// ════════════════════════════════════════════════════════════════════════════
// Choices
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum DotLayout {
    /// Classic cells, dots 1–6, capital sign 46.
    #[default]
    SixDot,
    /// Computer Braille, dots 1–8.
    EightDot,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum KeyOutput {
    /// Type produced text to stdout.
    #[default]
    Stdout,
    /// Produce text without typing it.
    None,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Synthetic frames for a scripted list of codes.
    #[default]
    Simulate,
    /// JSON-lines detection frames from a file or stdin.
    Jsonl,
    /// JSON-lines detection frames from a spawned detector process.
    Detector,
    /// LeapMotion controller (`leap` feature).
    Leap,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VoiceKind {
    /// Announcements go to the log only.
    #[default]
    Log,
    /// Run an external text-to-speech program per announcement.
    Command,
    /// MIDI earcons (`midi` feature).
    Chime,
}

// ════════════════════════════════════════════════════════════════════════════
// Sections
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub layout: DotLayout,
    /// Custom table; the built-in German table for `layout` when unset.
    pub table:  Option<PathBuf>,
    pub keys:   KeyOutput,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { layout: DotLayout::SixDot, table: None, keys: KeyOutput::Stdout }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub source:            InputKind,
    /// JSON-lines file; stdin when unset or `-`.
    pub path:              Option<PathBuf>,
    /// Detector program followed by its arguments.
    pub detector:          Vec<String>,
    /// Codes shown one after another by the simulation source.
    pub script:            Vec<String>,
    /// Frames per scripted code; `threshold + 1` when unset.
    pub frames_per_code:   Option<usize>,
    /// Rest-pose frames between scripted codes.
    pub rest_frames:       usize,
    pub frame_interval_ms: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            source:            InputKind::Simulate,
            path:              None,
            detector:          vec!["python3".to_string(), "hand_detect.py".to_string()],
            // Capital sign, then "hallo" in 6-dot, both thumbs out on every cell.
            script:            ["0469", "01259", "019", "01239", "01239", "01359"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            frames_per_code:   None,
            rest_frames:       0,
            frame_interval_ms: 33,
        }
    }
}

/// Fixed phrases spoken by the feedback voice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub start:   String,
    pub unknown: String,
    pub visible: String,
    pub hidden:  String,
}

impl Default for Messages {
    fn default() -> Self {
        Messages {
            start:   "Starting detection ...".to_string(),
            unknown: "Zeichen nicht bekannt!".to_string(),
            visible: "OK".to_string(),
            hidden:  "NO".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackConfig {
    pub voice:    VoiceKind,
    /// Speech program for [`VoiceKind::Command`]; the phrase is appended.
    pub command:  Vec<String>,
    pub messages: Messages,
}

impl Default for FeedbackConfig {
    fn default() -> Self {
        FeedbackConfig {
            voice:    VoiceKind::Log,
            command:  vec!["espeak".to_string()],
            messages: Messages::default(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// AppConfig
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub engine:   EngineConfig,
    pub output:   OutputConfig,
    pub input:    InputConfig,
    pub feedback: FeedbackConfig,
    pub gui:      bool,
}

impl AppConfig {
    /// Load `path`, falling back to defaults when it is missing or malformed.
    ///
    /// The result is always saved back so the file lists every field.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            match serde_json::from_str::<AppConfig>(&content) {
                Ok(c) => {
                    info!(path = %path.display(), "loaded configuration");
                    c
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed configuration, using defaults");
                    AppConfig::default()
                }
            }
        } else {
            info!(path = %path.display(), "no configuration file, creating defaults");
            AppConfig::default()
        };

        config.save(path)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Frames each scripted code is held for.
    pub fn frames_per_code(&self) -> usize {
        self.input.frames_per_code.unwrap_or(self.engine.threshold.saturating_add(1))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use braille_cell::InputMode;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("air_braille_{}_{}", std::process::id(), name));
        fs::create_dir_all(&dir).unwrap();
        dir.join("air_braille.json")
    }

    #[test]
    fn missing_file_creates_defaults() {
        let path = scratch("missing");
        let _ = fs::remove_file(&path);
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn partial_file_is_completed_and_saved_back() {
        let path = scratch("partial");
        fs::write(&path, r#"{"engine": {"threshold": 4, "mode": "continuous"}, "gui": true}"#).unwrap();
        let cfg = AppConfig::load(&path).unwrap();
        assert_eq!(cfg.engine.threshold, 4);
        assert_eq!(cfg.engine.mode, InputMode::Continuous);
        assert_eq!(cfg.engine.stretch_angle_deg, 120.0);
        assert!(cfg.gui);
        assert_eq!(cfg.feedback.messages.unknown, "Zeichen nicht bekannt!");

        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("\"messages\""));
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let path = scratch("malformed");
        fs::write(&path, "{ engine: ").unwrap();
        assert_eq!(AppConfig::load(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn frames_per_code_follows_threshold() {
        let mut cfg = AppConfig::default();
        assert_eq!(cfg.frames_per_code(), 11);
        cfg.input.frames_per_code = Some(3);
        assert_eq!(cfg.frames_per_code(), 3);
        cfg.input.frames_per_code = None;
        cfg.engine.threshold = usize::MAX;
        assert_eq!(cfg.frames_per_code(), usize::MAX);
    }

    #[test]
    fn enums_use_snake_case() {
        assert_eq!(serde_json::to_string(&DotLayout::EightDot).unwrap(), "\"eight_dot\"");
        let kind: InputKind = serde_json::from_str("\"detector\"").unwrap();
        assert_eq!(kind, InputKind::Detector);
    }
}
