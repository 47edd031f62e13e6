//! Audio feedback on a worker thread.
//!
//! The frame loop never waits for speech: announcements go over a channel to
//! a [`Speaker`] thread that renders them with a [`Voice`].
//!
//! | Voice | Output |
//! |---|---|
//! | [`LogVoice`]     | `info!` line per phrase |
//! | [`CommandVoice`] | runs a TTS program (e.g. `espeak`) with the phrase as last argument |
//! | `ChimeVoice`     | short MIDI earcons, `midi` feature |

use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, info, warn};

use crate::settings::{FeedbackConfig, Messages, VoiceKind};

// ════════════════════════════════════════════════════════════════════════════
// Announcement
// ════════════════════════════════════════════════════════════════════════════

/// Something the user should hear.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Announcement {
    /// Detection loop started.
    Started,
    /// Both hands became usable.
    HandsVisible,
    /// Hands lost.
    HandsHidden,
    /// Text produced by the write handler.
    Text(String),
    /// The confirmed cell has no character.
    Unknown,
}

impl Announcement {
    /// The phrase to speak.
    pub fn phrase<'a>(&'a self, messages: &'a Messages) -> &'a str {
        match self {
            Announcement::Started      => &messages.start,
            Announcement::HandsVisible => &messages.visible,
            Announcement::HandsHidden  => &messages.hidden,
            Announcement::Text(t)      => t,
            Announcement::Unknown      => &messages.unknown,
        }
    }
}

/// Fire-and-forget sink for announcements.
pub trait Feedback {
    fn announce(&mut self, announcement: Announcement);
}

/// Records announcements in order.
impl Feedback for Vec<Announcement> {
    fn announce(&mut self, announcement: Announcement) { self.push(announcement); }
}

// ════════════════════════════════════════════════════════════════════════════
// Voice: how a phrase becomes sound
// ════════════════════════════════════════════════════════════════════════════

pub trait Voice: Send {
    /// Render one announcement; may block until playback ends.
    fn speak(&mut self, announcement: &Announcement, phrase: &str);
}

// ── log ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default)]
pub struct LogVoice;

impl Voice for LogVoice {
    fn speak(&mut self, _announcement: &Announcement, phrase: &str) {
        info!(phrase, "speak");
    }
}

// ── external TTS program ──────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct CommandVoice {
    program: String,
    args:    Vec<String>,
}

impl CommandVoice {
    /// `command[0]` is the program, the rest are fixed leading arguments.
    pub fn new(command: &[String]) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(CommandVoice { program: program.clone(), args: args.to_vec() })
    }
}

impl Voice for CommandVoice {
    fn speak(&mut self, _announcement: &Announcement, phrase: &str) {
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(phrase)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .status();
        match status {
            Ok(s) if s.success() => debug!(phrase, "spoken"),
            Ok(s)  => warn!(program = %self.program, status = %s, "speech program failed"),
            Err(e) => warn!(program = %self.program, error = %e, "cannot run speech program"),
        }
    }
}

// ── MIDI earcons (feature = "midi") ───────────────────────────────────────

#[cfg(feature = "midi")]
pub use chime::ChimeVoice;

#[cfg(feature = "midi")]
mod chime {
    use std::thread;
    use std::time::Duration;

    use tracing::{info, warn};

    use super::{Announcement, Voice};

    trait MidiOut: Send {
        fn note_on(&mut self,  channel: u8, note: u8, velocity: u8);
        fn note_off(&mut self, channel: u8, note: u8);
    }

    struct MidirOut {
        conn: midir::MidiOutputConnection,
    }

    impl MidiOut for MidirOut {
        fn note_on(&mut self, channel: u8, note: u8, velocity: u8) {
            let _ = self.conn.send(&[0x90 | (channel & 0x0F), note, velocity]);
        }
        fn note_off(&mut self, channel: u8, note: u8) {
            let _ = self.conn.send(&[0x80 | (channel & 0x0F), note, 0]);
        }
    }

    struct NullOut;
    impl MidiOut for NullOut {
        fn note_on(&mut self, _ch: u8, _n: u8, _v: u8) {}
        fn note_off(&mut self, _ch: u8, _n: u8)        {}
    }

    /// First available MIDI output port, or a silent stand-in.
    fn open_midi_output() -> Box<dyn MidiOut> {
        let midi_out = match midir::MidiOutput::new("air_braille") {
            Ok(m)  => m,
            Err(e) => {
                warn!(error = %e, "MIDI init failed, chimes are silent");
                return Box::new(NullOut);
            }
        };
        let ports = midi_out.ports();
        let Some(port) = ports.first() else {
            warn!("no MIDI output ports, chimes are silent");
            return Box::new(NullOut);
        };
        let name = midi_out.port_name(port).unwrap_or_else(|_| "unknown".to_string());
        match midi_out.connect(port, "air-braille-chime") {
            Ok(conn) => {
                info!(port = %name, "chimes on MIDI port");
                Box::new(MidirOut { conn })
            }
            Err(e) => {
                warn!(port = %name, error = %e, "MIDI connect failed, chimes are silent");
                Box::new(NullOut)
            }
        }
    }

    /// Note sequence for an announcement.
    pub(super) fn earcon(announcement: &Announcement) -> &'static [u8] {
        match announcement {
            Announcement::Started      => &[60, 64, 67],
            Announcement::HandsVisible => &[67, 72],
            Announcement::HandsHidden  => &[72, 67],
            Announcement::Text(_)      => &[76],
            Announcement::Unknown      => &[48, 47],
        }
    }

    pub struct ChimeVoice {
        out:     Box<dyn MidiOut>,
        channel: u8,
        note:    Duration,
    }

    impl ChimeVoice {
        pub fn open() -> Self {
            ChimeVoice { out: open_midi_output(), channel: 0, note: Duration::from_millis(120) }
        }
    }

    impl Voice for ChimeVoice {
        fn speak(&mut self, announcement: &Announcement, _phrase: &str) {
            for &n in earcon(announcement) {
                self.out.note_on(self.channel, n, 96);
                thread::sleep(self.note);
                self.out.note_off(self.channel, n);
            }
        }
    }
}

/// Build the voice selected in `cfg`, falling back to [`LogVoice`].
pub fn open_voice(cfg: &FeedbackConfig) -> Box<dyn Voice> {
    match cfg.voice {
        VoiceKind::Log => Box::new(LogVoice),
        VoiceKind::Command => match CommandVoice::new(&cfg.command) {
            Some(v) => Box::new(v),
            None => {
                warn!("empty speech command, logging announcements instead");
                Box::new(LogVoice)
            }
        },
        #[cfg(feature = "midi")]
        VoiceKind::Chime => Box::new(ChimeVoice::open()),
        #[cfg(not(feature = "midi"))]
        VoiceKind::Chime => {
            warn!("chime voice needs the `midi` feature, logging announcements instead");
            Box::new(LogVoice)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Speaker: the feedback thread
// ════════════════════════════════════════════════════════════════════════════

enum SpeakerCommand {
    Say(Announcement),
    Quit,
}

/// Handle to the speech thread. Dropping it speaks whatever is queued, then
/// joins the thread.
pub struct Speaker {
    cmd_tx: Sender<SpeakerCommand>,
    handle: Option<JoinHandle<()>>,
}

impl Speaker {
    pub fn spawn(voice: Box<dyn Voice>, messages: Messages) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel::<SpeakerCommand>();
        let handle = thread::spawn(move || speaker_thread(voice, messages, cmd_rx));
        Speaker { cmd_tx, handle: Some(handle) }
    }

    pub fn from_config(cfg: &FeedbackConfig) -> Self {
        Speaker::spawn(open_voice(cfg), cfg.messages.clone())
    }
}

impl Feedback for Speaker {
    fn announce(&mut self, announcement: Announcement) {
        let _ = self.cmd_tx.send(SpeakerCommand::Say(announcement));
    }
}

impl Drop for Speaker {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(SpeakerCommand::Quit);
        if let Some(h) = self.handle.take() {
            let _ = h.join();
        }
    }
}

fn speaker_thread(mut voice: Box<dyn Voice>, messages: Messages, cmd_rx: Receiver<SpeakerCommand>) {
    for cmd in cmd_rx {
        match cmd {
            SpeakerCommand::Say(a) => voice.speak(&a, a.phrase(&messages)),
            SpeakerCommand::Quit   => return,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<String>>>);

    impl Voice for Recorder {
        fn speak(&mut self, _a: &Announcement, phrase: &str) {
            self.0.lock().unwrap().push(phrase.to_string());
        }
    }

    #[test]
    fn phrases_come_from_messages() {
        let m = Messages::default();
        assert_eq!(Announcement::Started.phrase(&m), "Starting detection ...");
        assert_eq!(Announcement::Unknown.phrase(&m), "Zeichen nicht bekannt!");
        assert_eq!(Announcement::HandsVisible.phrase(&m), "OK");
        assert_eq!(Announcement::HandsHidden.phrase(&m), "NO");
        assert_eq!(Announcement::Text("ä".into()).phrase(&m), "ä");
    }

    #[test]
    fn speaker_flushes_queue_on_drop() {
        let rec = Recorder::default();
        let mut speaker = Speaker::spawn(Box::new(rec.clone()), Messages::default());
        speaker.announce(Announcement::Started);
        speaker.announce(Announcement::Text("a".into()));
        speaker.announce(Announcement::Unknown);
        drop(speaker);
        assert_eq!(*rec.0.lock().unwrap(), ["Starting detection ...", "a", "Zeichen nicht bekannt!"]);
    }

    #[test]
    fn command_voice_needs_a_program() {
        assert!(CommandVoice::new(&[]).is_none());
        let v = CommandVoice::new(&["espeak".to_string(), "-v".to_string(), "de".to_string()]).unwrap();
        assert_eq!(v.program, "espeak");
        assert_eq!(v.args, ["-v", "de"]);
    }

    #[cfg(unix)]
    #[test]
    fn command_voice_runs_program() {
        // `true` ignores its arguments and succeeds.
        let mut v = CommandVoice::new(&["true".to_string()]).unwrap();
        v.speak(&Announcement::Started, "Starting detection ...");
    }

    #[test]
    fn recording_feedback_keeps_order() {
        let mut log: Vec<Announcement> = Vec::new();
        log.announce(Announcement::HandsVisible);
        log.announce(Announcement::HandsHidden);
        assert_eq!(log, [Announcement::HandsVisible, Announcement::HandsHidden]);
    }

    #[cfg(feature = "midi")]
    #[test]
    fn earcons_differ_for_visibility() {
        assert_ne!(chime::earcon(&Announcement::HandsVisible), chime::earcon(&Announcement::HandsHidden));
    }
}
