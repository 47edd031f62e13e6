//! air_braille: command-line entry point.

use std::io;
use std::path::Path;
use std::time::Duration;

use air_braille::app::{self, AirBraille};
use air_braille::args::Args;
use air_braille::feedback::Speaker;
use air_braille::settings::{AppConfig, DotLayout, InputKind, KeyOutput};
use air_braille::source::{spawn_frame_source, DetectorProcess, FrameSource, JsonLinesSource, ScriptedSource};
use anyhow::{Context, Result};
use braille_cell::Engine;
use braille_write::{BrailleTable, EightDotHandler, KeySink, NullKeys, SixDotHandler, StdoutKeys, WriteHandler};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    let args = Args::parse();
    init_tracing(args.log_level());

    // Stdout carries the typed text; everything else goes to stderr.
    eprintln!();
    eprintln!("╔══════════════════════════════════════════════════════════════╗");
    eprintln!("║            AirBraille: two-hand Braille in the air           ║");
    eprintln!("╚══════════════════════════════════════════════════════════════╝");
    eprintln!();

    if let Err(e) = run(args) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(args: Args) -> Result<()> {
    let mut cfg = AppConfig::load(&args.config)?;
    args.apply(&mut cfg);

    let engine  = Engine::new(cfg.engine.clone()).context("invalid engine settings")?;
    let writer  = open_writer(&cfg)?;
    let source  = open_source(&cfg)?;
    let speaker = Speaker::from_config(&cfg.feedback);

    info!(
        mode = ?cfg.engine.mode,
        policy = ?cfg.engine.policy,
        threshold = cfg.engine.threshold,
        input = ?cfg.input.source,
        "configured",
    );

    let frames  = spawn_frame_source(source);
    let mut app = AirBraille::new(engine, writer, speaker);

    #[cfg(feature = "gui")]
    if cfg.gui {
        return app::run_with_view(&mut app, frames);
    }
    #[cfg(not(feature = "gui"))]
    if cfg.gui {
        tracing::warn!("debug view needs the `gui` feature, running headless");
    }
    app::run(&mut app, frames);
    Ok(())
}

fn open_writer(cfg: &AppConfig) -> Result<Box<dyn WriteHandler>> {
    let table = match (&cfg.output.table, cfg.output.layout) {
        (Some(path), _)           => BrailleTable::load(path)?,
        (None, DotLayout::SixDot)   => BrailleTable::six_dot_german()?,
        (None, DotLayout::EightDot) => BrailleTable::eight_dot_german()?,
    };
    info!(table = table.name(), entries = table.len(), layout = ?cfg.output.layout, "braille table ready");

    let keys: Box<dyn KeySink> = match cfg.output.keys {
        KeyOutput::Stdout => Box::new(StdoutKeys),
        KeyOutput::None   => Box::new(NullKeys),
    };
    let writer: Box<dyn WriteHandler> = match cfg.output.layout {
        DotLayout::SixDot   => Box::new(SixDotHandler::new(table, keys)),
        DotLayout::EightDot => Box::new(EightDotHandler::new(table, keys)),
    };
    Ok(writer)
}

fn open_source(cfg: &AppConfig) -> Result<Box<dyn FrameSource>> {
    let interval = Duration::from_millis(cfg.input.frame_interval_ms);
    let source: Box<dyn FrameSource> = match cfg.input.source {
        InputKind::Simulate => Box::new(
            ScriptedSource::from_script(&cfg.input.script, cfg.engine.slots, cfg.frames_per_code())?
                .with_rest(cfg.input.rest_frames)
                .with_interval(interval),
        ),
        InputKind::Jsonl => {
            let path = cfg.input.path.as_deref();
            let source = JsonLinesSource::open(path)?;
            match path {
                // Replay recordings at camera speed; live stdin is not paced.
                Some(p) if p != Path::new("-") => Box::new(source.paced(interval)),
                _ => Box::new(source),
            }
        }
        InputKind::Detector => Box::new(DetectorProcess::spawn(&cfg.input.detector)?),
        #[cfg(feature = "leap")]
        InputKind::Leap => Box::new(air_braille::source::LeapFrameSource),
        #[cfg(not(feature = "leap"))]
        InputKind::Leap => anyhow::bail!("LeapMotion input needs the `leap` feature"),
    };
    Ok(source)
}
