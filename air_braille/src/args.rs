use std::path::PathBuf;

use braille_cell::{CodePolicy, InputMode};
use clap::{ArgAction, Parser};

use crate::settings::{AppConfig, DotLayout, InputKind, KeyOutput, VoiceKind, DEFAULT_PATH};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Settings file (created with defaults when missing)
    #[arg(short, long, default_value = DEFAULT_PATH)]
    pub config: PathBuf,

    /// Emit whenever the modal code changes instead of waiting for both thumbs
    #[arg(long)]
    pub continuous: bool,

    /// Bent fingers mark the dots instead of stretched ones
    #[arg(long)]
    pub invert: bool,

    /// Frames per vote / window length
    #[arg(short, long)]
    pub threshold: Option<usize>,

    /// Minimum joint angle (degrees) for a stretched finger
    #[arg(long)]
    pub angle: Option<f32>,

    /// Braille dot layout
    #[arg(long, value_enum)]
    pub layout: Option<DotLayout>,

    /// Custom Braille table (JSON)
    #[arg(long)]
    pub table: Option<PathBuf>,

    /// Where detection frames come from
    #[arg(short, long, value_enum)]
    pub input: Option<InputKind>,

    /// JSON-lines file for `--input jsonl` (`-` for stdin)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Detector command line for `--input detector`
    #[arg(long)]
    pub detector: Option<String>,

    /// Comma-separated codes for `--input simulate`, e.g. "019,01239"
    #[arg(long)]
    pub script: Option<String>,

    /// Feedback voice
    #[arg(long, value_enum)]
    pub voice: Option<VoiceKind>,

    /// Do not type produced text
    #[arg(long)]
    pub no_keys: bool,

    /// Open the landmark debug window (`gui` feature)
    #[arg(long)]
    pub gui: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Only warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Overlay command-line choices on loaded settings.
    pub fn apply(&self, cfg: &mut AppConfig) {
        if self.continuous { cfg.engine.mode = InputMode::Continuous; }
        if self.invert     { cfg.engine.policy = CodePolicy::from_invert_flag(true); }
        if let Some(t) = self.threshold { cfg.engine.threshold = t; }
        if let Some(a) = self.angle     { cfg.engine.stretch_angle_deg = a; }
        if let Some(l) = self.layout    { cfg.output.layout = l; }
        if let Some(p) = &self.table    { cfg.output.table = Some(p.clone()); }
        if self.no_keys { cfg.output.keys = KeyOutput::None; }

        if let Some(i) = self.input  { cfg.input.source = i; }
        if let Some(p) = &self.file  { cfg.input.path = Some(p.clone()); }
        if let Some(d) = &self.detector {
            cfg.input.detector = d.split_whitespace().map(str::to_string).collect();
        }
        if let Some(s) = &self.script {
            cfg.input.script = s
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(v) = self.voice { cfg.feedback.voice = v; }
        if self.gui { cfg.gui = true; }
    }

    /// Default log filter for the verbosity flags.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "warn",
            (_, 0)    => "info",
            (_, 1)    => "debug",
            _         => "trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("air_braille").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_leave_settings_alone() {
        let mut cfg = AppConfig::default();
        parse(&[]).apply(&mut cfg);
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn overrides_engine_and_output() {
        let mut cfg = AppConfig::default();
        parse(&["--continuous", "--invert", "-t", "4", "--angle", "135", "--layout", "eight-dot", "--no-keys"])
            .apply(&mut cfg);
        assert_eq!(cfg.engine.mode, InputMode::Continuous);
        assert_eq!(cfg.engine.policy, CodePolicy::Inverted);
        assert_eq!(cfg.engine.threshold, 4);
        assert_eq!(cfg.engine.stretch_angle_deg, 135.0);
        assert_eq!(cfg.output.layout, DotLayout::EightDot);
        assert_eq!(cfg.output.keys, KeyOutput::None);
    }

    #[test]
    fn script_and_detector_are_split() {
        let mut cfg = AppConfig::default();
        parse(&["--script", "019, 01239,,0469", "--detector", "python3 detect.py --cam 1"]).apply(&mut cfg);
        assert_eq!(cfg.input.script, ["019", "01239", "0469"]);
        assert_eq!(cfg.input.detector, ["python3", "detect.py", "--cam", "1"]);
    }

    #[test]
    fn verbosity_maps_to_level() {
        assert_eq!(parse(&[]).log_level(), "info");
        assert_eq!(parse(&["-v"]).log_level(), "debug");
        assert_eq!(parse(&["-vv"]).log_level(), "trace");
        assert_eq!(parse(&["-q"]).log_level(), "warn");
    }
}
