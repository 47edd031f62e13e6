//! Top-level application loop.
//!
//! [`AirBraille`] owns the [`Engine`], the write handler and the feedback
//! sink. It turns each [`FrameReport`] into user-facing effects: typed text,
//! spoken confirmations and visibility cues.

use std::sync::mpsc::Receiver;

use braille_cell::{BrailleCode, Decision, DetectionFrame, Engine, FrameReport, VisibilityChange};
use braille_write::{WriteError, WriteHandler, CAPITAL_ANNOUNCEMENT};
use tracing::{debug, info, warn};

use crate::feedback::{Announcement, Feedback};

/// Whether produced text is worth speaking as-is.
fn speakable(text: &str) -> bool {
    !text.is_empty() && text.chars().all(char::is_alphanumeric)
}

// ════════════════════════════════════════════════════════════════════════════
// AirBraille
// ════════════════════════════════════════════════════════════════════════════

pub struct AirBraille<W: WriteHandler, F: Feedback> {
    engine:     Engine,
    writer:     W,
    feedback:   F,
    transcript: String,
    last_code:  Option<BrailleCode>,
    last_frame: DetectionFrame,
    pub status: String,
}

impl<W: WriteHandler, F: Feedback> AirBraille<W, F> {
    pub fn new(engine: Engine, writer: W, feedback: F) -> Self {
        let status = format!(
            "{:?} mode, {} handler, threshold {}",
            engine.config().mode,
            writer.name(),
            engine.config().threshold,
        );
        AirBraille {
            engine,
            writer,
            feedback,
            transcript: String::new(),
            last_code:  None,
            last_frame: DetectionFrame::default(),
            status,
        }
    }

    /// Announce the start of detection.
    pub fn start(&mut self) {
        info!(status = %self.status, "detection started");
        self.feedback.announce(Announcement::Started);
    }

    // ── process one frame ────────────────────────────────────────────────

    pub fn handle_frame(&mut self, frame: &DetectionFrame) -> FrameReport {
        let report = self.engine.process(frame);

        match report.visibility {
            Some(VisibilityChange::Visible) => self.feedback.announce(Announcement::HandsVisible),
            Some(VisibilityChange::Hidden)  => self.feedback.announce(Announcement::HandsHidden),
            None => {}
        }
        if report.code.is_some() {
            self.last_code = report.code;
        }
        if let Some(decision) = report.decision {
            self.handle_decision(decision);
        }

        self.last_frame = frame.clone();
        report
    }

    fn handle_decision(&mut self, decision: Decision) {
        match decision {
            Decision::Write(dots)  => self.write(dots),
            Decision::Hold(code)   => debug!(%code, "no confirmation, holding"),
            Decision::Hotkey(code) => {
                info!(%code, "hotkey requested, none bound");
                self.status = format!("hotkey {}", code);
            }
        }
    }

    fn write(&mut self, dots: BrailleCode) {
        match self.writer.write(&dots) {
            Ok(text) if speakable(&text) => {
                info!(%dots, text = %text, "written");
                self.status = format!("{} -> {}", dots, text);
                if text != CAPITAL_ANNOUNCEMENT {
                    self.transcript.push_str(&text);
                }
                self.feedback.announce(Announcement::Text(text));
            }
            Ok(text) => {
                info!(%dots, text = %text, "written, not speakable");
                self.status = format!("{} -> {:?}", dots, text);
                self.transcript.push_str(&text);
                self.feedback.announce(Announcement::Unknown);
            }
            Err(WriteError::NoMapping(pattern)) => {
                info!(dots = %pattern, "no character for cell");
                self.status = format!("{} -> ?", pattern);
                self.feedback.announce(Announcement::Unknown);
            }
            Err(e) => {
                warn!(%dots, error = %e, "write failed");
                self.status = format!("{} -> error", dots);
                self.feedback.announce(Announcement::Unknown);
            }
        }
    }

    // ── accessors for the render loop and tests ──────────────────────────

    pub fn engine(&self)     -> &Engine              { &self.engine }
    pub fn writer(&self)     -> &W                   { &self.writer }
    pub fn feedback(&self)   -> &F                   { &self.feedback }
    pub fn last_code(&self)  -> Option<BrailleCode>  { self.last_code }
    pub fn last_frame(&self) -> &DetectionFrame      { &self.last_frame }

    /// Text typed so far. The capital-sign cue is spoken, not typed, so it
    /// is left out.
    pub fn transcript(&self) -> &str { &self.transcript }
}

// ════════════════════════════════════════════════════════════════════════════
// run(): headless loop
// ════════════════════════════════════════════════════════════════════════════

/// Process frames until the source is exhausted.
pub fn run<W: WriteHandler, F: Feedback>(app: &mut AirBraille<W, F>, frames: Receiver<DetectionFrame>) {
    app.start();
    for frame in frames {
        app.handle_frame(&frame);
    }
    info!(frames = app.engine().frames_processed(), "frame source closed");
}

/// Process frames while drawing the debug view; `Q` or `Esc` stops early.
#[cfg(feature = "gui")]
pub fn run_with_view<W: WriteHandler, F: Feedback>(
    app:    &mut AirBraille<W, F>,
    frames: Receiver<DetectionFrame>,
) -> anyhow::Result<()> {
    use std::sync::mpsc::TryRecvError;

    use crate::visualizer::Visualizer;

    let mut vis = Visualizer::new(app.engine().config().clone())?;
    app.start();

    while vis.poll_input() {
        loop {
            match frames.try_recv() {
                Ok(frame) => { app.handle_frame(&frame); }
                Err(TryRecvError::Empty)        => break,
                Err(TryRecvError::Disconnected) => {
                    info!("frame source closed");
                    return Ok(());
                }
            }
        }
        let engine = app.engine();
        vis.render(app.last_frame(), app.last_code(), engine.is_visible(), engine.aggregator().phase(), &app.status);
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
