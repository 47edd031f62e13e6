//! Detection-frame sources: recorded JSON lines, a live detector process,
//! scripted simulation, and LeapMotion hardware.
//!
//! Every source runs on its own thread and delivers [`DetectionFrame`]s over
//! a `mpsc` channel. The consumer never learns where frames came from; the
//! channel disconnecting means the source is exhausted.
//!
//! ## Line format
//!
//! ```text
//! {"hands":[{"index":0,"score":0.98,"label":"Left","landmarks":[{"x":0.41,"y":0.62,"z":-0.01}, …21]}, …]}
//! ```
//!
//! Blank lines, `#` comments and other non-JSON chatter (a detector's `READY`
//! banner, say) are skipped.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use std::process::{Child, ChildStdout, Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use braille_cell::{synthetic, BrailleCode, DetectionFrame, Point3, SlotMap};
use tracing::{debug, info, warn};

// ════════════════════════════════════════════════════════════════════════════
// FrameSource trait
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can deliver [`DetectionFrame`]s over a channel.
pub trait FrameSource: Send + 'static {
    fn name(&self) -> &str;

    /// Produce frames until exhausted or the receiver hangs up.
    fn run(self: Box<Self>, tx: Sender<DetectionFrame>);
}

/// Spawn a frame source on its own thread and return the receiving end.
pub fn spawn_frame_source(source: Box<dyn FrameSource>) -> Receiver<DetectionFrame> {
    let (tx, rx) = mpsc::channel();
    info!(source = source.name(), "starting frame source");
    thread::spawn(move || source.run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// Line parsing
// ════════════════════════════════════════════════════════════════════════════

/// Parse one line; `Ok(None)` for lines that carry no frame.
pub fn parse_frame_line(line: &str) -> serde_json::Result<Option<DetectionFrame>> {
    let line = line.trim();
    if !line.starts_with('{') {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Forward every frame in `reader` to `tx`.
fn pump<R: BufRead>(name: &str, reader: R, tx: &Sender<DetectionFrame>, pace: Option<Duration>) {
    for (n, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l)  => l,
            Err(e) => {
                warn!(source = name, error = %e, "read failed, stopping");
                return;
            }
        };
        match parse_frame_line(&line) {
            Ok(Some(frame)) => {
                if tx.send(frame).is_err() { return; }
                if let Some(p) = pace { thread::sleep(p); }
            }
            Ok(None) => debug!(source = name, line = n + 1, "skipping non-frame line"),
            Err(e)   => warn!(source = name, line = n + 1, error = %e, "malformed frame line"),
        }
    }
    info!(source = name, "end of input");
}

// ════════════════════════════════════════════════════════════════════════════
// JsonLinesSource: recorded frames
// ════════════════════════════════════════════════════════════════════════════

/// Frames from a JSON-lines file or stdin.
pub struct JsonLinesSource {
    name:   String,
    reader: Box<dyn BufRead + Send>,
    pace:   Option<Duration>,
}

impl JsonLinesSource {
    pub fn from_reader<R: BufRead + Send + 'static>(name: &str, reader: R) -> Self {
        JsonLinesSource { name: name.to_string(), reader: Box::new(reader), pace: None }
    }

    /// Open `path`, or stdin for `None` / `-`.
    pub fn open(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) if p != Path::new("-") => {
                let file = File::open(p).with_context(|| format!("opening frames {}", p.display()))?;
                Ok(JsonLinesSource::from_reader(&p.display().to_string(), BufReader::new(file)))
            }
            _ => Ok(JsonLinesSource::from_reader("stdin", BufReader::new(io::stdin()))),
        }
    }

    /// Sleep between frames, to replay a recording at camera speed.
    pub fn paced(mut self, interval: Duration) -> Self {
        self.pace = Some(interval);
        self
    }
}

impl FrameSource for JsonLinesSource {
    fn name(&self) -> &str { &self.name }

    fn run(self: Box<Self>, tx: Sender<DetectionFrame>) {
        let JsonLinesSource { name, reader, pace } = *self;
        pump(&name, reader, &tx, pace);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorProcess: live landmark detector
// ════════════════════════════════════════════════════════════════════════════

/// An external hand-landmark detector that prints one JSON frame per line
/// on stdout. Its stderr is passed through.
pub struct DetectorProcess {
    name:   String,
    child:  Child,
    stdout: BufReader<ChildStdout>,
}

impl DetectorProcess {
    pub fn spawn(command: &[String]) -> Result<Self> {
        let Some((program, args)) = command.split_first() else {
            bail!("empty detector command");
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("starting detector {:?}", program))?;
        let stdout = child.stdout.take().context("detector stdout not captured")?;

        info!(command = %command.join(" "), pid = child.id(), "detector started");
        Ok(DetectorProcess { name: program.clone(), child, stdout: BufReader::new(stdout) })
    }
}

impl FrameSource for DetectorProcess {
    fn name(&self) -> &str { &self.name }

    fn run(self: Box<Self>, tx: Sender<DetectionFrame>) {
        let DetectorProcess { name, mut child, stdout } = *self;
        pump(&name, stdout, &tx, None);

        // Receiver gone or stdout closed: make sure the detector goes too.
        let _ = child.kill();
        match child.wait() {
            Ok(status) => info!(source = %name, %status, "detector exited"),
            Err(e)     => warn!(source = %name, error = %e, "detector wait failed"),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ScriptedSource: simulation
// ════════════════════════════════════════════════════════════════════════════

/// Renders a list of codes into synthetic two-hand frames, each held for a
/// fixed number of frames. Needs no camera or detector.
pub struct ScriptedSource {
    codes:       Vec<BrailleCode>,
    slots:       SlotMap,
    hold_frames: usize,
    rest_frames: usize,
    interval:    Duration,
}

impl ScriptedSource {
    pub fn new(codes: Vec<BrailleCode>, slots: SlotMap, hold_frames: usize) -> Self {
        ScriptedSource { codes, slots, hold_frames, rest_frames: 0, interval: Duration::ZERO }
    }

    /// Parse codes such as `"01259"`.
    pub fn from_script(script: &[String], slots: SlotMap, hold_frames: usize) -> Result<Self> {
        let codes = script
            .iter()
            .map(|s| s.parse::<BrailleCode>().with_context(|| format!("script code {:?}", s)))
            .collect::<Result<Vec<_>>>()?;
        Ok(ScriptedSource::new(codes, slots, hold_frames))
    }

    /// Frames of the empty code shown after each scripted code.
    pub fn with_rest(mut self, frames: usize) -> Self {
        self.rest_frames = frames;
        self
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Every frame this source will send, in order.
    pub fn frames(&self) -> impl Iterator<Item = DetectionFrame> + '_ {
        let rest = synthetic::frame_for_code(&BrailleCode::EMPTY, &self.slots);
        self.codes.iter().flat_map(move |code| {
            let shown = synthetic::frame_for_code(code, &self.slots);
            std::iter::repeat(shown)
                .take(self.hold_frames)
                .chain(std::iter::repeat(rest.clone()).take(self.rest_frames))
        })
    }
}

impl FrameSource for ScriptedSource {
    fn name(&self) -> &str { "simulation" }

    fn run(self: Box<Self>, tx: Sender<DetectionFrame>) {
        for frame in self.frames() {
            if tx.send(frame).is_err() { return; }
            if !self.interval.is_zero() { thread::sleep(self.interval); }
        }
        info!(codes = self.codes.len(), "simulation script finished");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapFrameSource: real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Millimetres of Leap space mapped onto the unit landmark range.
pub const LEAP_RANGE_MM: f32 = 400.0;

/// Map a Leap position (mm, y up from the device) to landmark space, viewed
/// from above: Leap x → x, Leap z → y, height → z.
pub fn leap_to_landmark(x: f32, y: f32, z: f32) -> Point3 {
    Point3::new(0.5 + x / LEAP_RANGE_MM, 0.5 + z / LEAP_RANGE_MM, -y / LEAP_RANGE_MM)
}

/// Frame source backed by a real LeapMotion controller.
///
/// Requires the `leap` feature flag and the LeapC shared library installed.
/// Each tracked hand becomes a 21-point [`braille_cell::DetectedHand`]:
/// the wrist is the middle finger's metacarpal base, each digit contributes
/// the bases of its proximal, intermediate and distal bones plus the tip.
#[cfg(feature = "leap")]
pub struct LeapFrameSource;

#[cfg(feature = "leap")]
impl FrameSource for LeapFrameSource {
    fn name(&self) -> &str { "leap" }

    fn run(self: Box<Self>, tx: Sender<DetectionFrame>) {
        use braille_cell::DetectedHand;
        use leaprs::*;

        let mut connection = match Connection::create(ConnectionConfig::default()) {
            Ok(c)  => c,
            Err(e) => {
                warn!(error = ?e, "cannot create LeapC connection");
                return;
            }
        };
        if let Err(e) = connection.open() {
            warn!(error = ?e, "cannot open LeapMotion device");
            return;
        }

        loop {
            let msg = match connection.poll(100) {
                Ok(m)  => m,
                Err(_) => continue,
            };

            if let Event::Tracking(frame) = msg.event() {
                let hands = frame
                    .hands()
                    .enumerate()
                    .filter_map(|(i, hand)| {
                        let digits: Vec<_> = hand.digits().collect();
                        if digits.len() < 5 { return None; }

                        let wrist = digits[2].metacarpal().prev_joint();
                        let mut landmarks = vec![leap_to_landmark(wrist.x, wrist.y, wrist.z)];
                        for d in &digits {
                            for j in [
                                d.proximal().prev_joint(),
                                d.intermediate().prev_joint(),
                                d.distal().prev_joint(),
                                d.distal().next_joint(),
                            ] {
                                landmarks.push(leap_to_landmark(j.x, j.y, j.z));
                            }
                        }
                        let label = if hand.hand_type() == HandType::Right { "Right" } else { "Left" };
                        Some(DetectedHand {
                            index: i as u32,
                            score: 1.0,
                            label: label.to_string(),
                            landmarks,
                        })
                    })
                    .collect();

                if tx.send(DetectionFrame::new(hands)).is_err() { return; }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use braille_cell::FingerStates;
    use std::io::Cursor;

    fn code(s: &str) -> BrailleCode { s.parse().unwrap() }

    fn collect(source: Box<dyn FrameSource>) -> Vec<DetectionFrame> {
        spawn_frame_source(source).iter().collect()
    }

    #[test]
    fn parse_skips_chatter() {
        assert_eq!(parse_frame_line("").unwrap(), None);
        assert_eq!(parse_frame_line("READY").unwrap(), None);
        assert_eq!(parse_frame_line("# recorded 2024").unwrap(), None);
        assert_eq!(parse_frame_line(r#"{"hands": []}"#).unwrap(), Some(DetectionFrame::default()));
        assert!(parse_frame_line("{\"hands\": [").is_err());
    }

    #[test]
    fn json_lines_round_trip_through_channel() {
        let frame = synthetic::frame(Some(FingerStates::all_stretched()), Some(FingerStates::default()));
        let text = format!(
            "READY\n{}\n{{broken\n\n{}\n",
            serde_json::to_string(&frame).unwrap(),
            r#"{"hands": []}"#,
        );
        let frames = collect(Box::new(JsonLinesSource::from_reader("test", Cursor::new(text))));
        assert_eq!(frames, vec![frame, DetectionFrame::default()]);
    }

    #[test]
    fn landmark_z_defaults_to_zero() {
        let line = r#"{"hands":[{"label":"Left","landmarks":[{"x":0.1,"y":0.2}]}]}"#;
        let frame = parse_frame_line(line).unwrap().unwrap();
        assert_eq!(frame.hands[0].landmarks[0], Point3::new(0.1, 0.2, 0.0));
        assert_eq!(frame.hands[0].index, 0);
    }

    #[test]
    fn script_holds_each_code_then_rests() {
        let slots = SlotMap::default();
        let src = ScriptedSource::new(vec![code("019"), code("01239")], slots, 3).with_rest(2);
        let frames: Vec<_> = src.frames().collect();
        assert_eq!(frames.len(), 10);
        assert_eq!(frames[0], synthetic::frame_for_code(&code("019"), &slots));
        assert_eq!(frames[3], synthetic::frame_for_code(&BrailleCode::EMPTY, &slots));
        assert_eq!(frames[5], synthetic::frame_for_code(&code("01239"), &slots));
        assert_eq!(collect(Box::new(src)).len(), 10);
    }

    #[test]
    fn bad_script_code_is_rejected() {
        let script = vec!["019".to_string(), "0x9".to_string()];
        assert!(ScriptedSource::from_script(&script, SlotMap::default(), 3).is_err());
    }

    #[test]
    fn empty_detector_command_is_rejected() {
        assert!(DetectorProcess::spawn(&[]).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn detector_output_is_streamed() {
        let cmd: Vec<String> = ["sh", "-c", r#"echo READY; echo '{"hands": []}'; echo '{"hands": []}'"#]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let frames = collect(Box::new(DetectorProcess::spawn(&cmd).unwrap()));
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn leap_mapping_centres_the_device() {
        assert_eq!(leap_to_landmark(0.0, 200.0, 0.0), Point3::new(0.5, 0.5, -0.5));
        let p = leap_to_landmark(-100.0, 0.0, 40.0);
        assert!((p.x - 0.25).abs() < 1e-6 && (p.y - 0.6).abs() < 1e-6);
    }
}
