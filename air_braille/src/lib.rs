//! # air_braille
//!
//! Type Braille in the air: both hands held up in front of a camera (or a
//! LeapMotion controller), each finger one slot of a Braille cell. The cell is
//! debounced over several frames, typed through a write handler and confirmed
//! by voice.
//!
//! ## Gesture → Action mapping (confirm mode)
//!
//! | Pose | Action |
//! |---|---|
//! | Fingers for the dots, **both** thumbs out | Type the cell, speak the character |
//! | Fingers for the dots, thumbs in | Hold: still composing, nothing happens |
//! | Exactly one thumb out | Hotkey (logged, none bound) |
//! | Capital sign `46` (6-dot) | Next letter is upper case, "Shift" is spoken |
//! | Hands appear / disappear for 5 frames | "OK" / "NO" |
//!
//! In continuous mode (`--continuous`) a cell is typed whenever the most
//! frequent code in the sliding window changes; thumbs are ignored.
//!
//! ## Frame sources
//!
//! | `--input` | Frames from |
//! |---|---|
//! | `simulate` (default) | synthetic hands spelling a scripted list of codes |
//! | `jsonl` | JSON lines from `--file` or stdin |
//! | `detector` | a spawned landmark detector printing JSON lines |
//! | `leap` | LeapMotion hardware (`leap` feature) |
//!
//! ## Feature flags
//!
//! * `gui`: landmark debug window (minifb).
//! * `midi`: chime voice over the first MIDI output port (midir).
//! * `leap`: LeapMotion hardware via LeapC (leaprs).

pub mod app;
pub mod args;
pub mod feedback;
pub mod settings;
pub mod source;
#[cfg(feature = "gui")]
pub mod visualizer;
