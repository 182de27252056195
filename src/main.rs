// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tokio::runtime;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vidseq::config::DEFAULT_CONFIG_FILE;
use vidseq::media::{
    resolve_duration, thumbnail_url, CommandLog, DurationLookup, RecordingTransport, YouTubeDataApi,
};
use vidseq::sequencer::CellState;
use vidseq::session::FileStore;
use vidseq::timing::format_time;
use vidseq::{
    AppConfig, ControlAction, Engine, EngineEvent, SessionSnapshot, SessionStore, TimeSignature,
    TransportRack, NUM_ROWS, NUM_STEPS,
};

fn print_usage() {
    println!("VIDSEQ - Video Clip Step Sequencer");
    println!();
    println!("Usage: vidseq [--config PATH] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  show                     Print the stored session");
    println!("  toggle <ROW> <COL>       Cycle a grid cell (off -> play -> stop)");
    println!("  bpm <N>                  Set tempo (60-200)");
    println!("  swing <N>                Set swing (0-100)");
    println!("  signature <B/N>          Set time signature (3/4, 4/4, 6/8, 7/8)");
    println!("  row <ROW> <FIELD> <VAL>  Edit a row: name, media, start, end, rate, gain");
    println!("  thumb <ROW>              Print a row's thumbnail URL");
    println!("  play <STEPS>             Run the sequencer headless for STEPS steps");
    println!("  reset                    Replace the session with defaults");
    println!("  help                     Show this help message");
    println!();
    println!("Config defaults to ./{}", DEFAULT_CONFIG_FILE);
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, what: &str) -> Result<T> {
    let raw = args
        .get(index)
        .ok_or_else(|| anyhow!("Missing {}. Run with help for usage.", what))?;
    raw.parse()
        .map_err(|_| anyhow!("Invalid {}: {}", what, raw))
}

fn duration_lookup(config: &AppConfig) -> Option<Arc<dyn DurationLookup>> {
    match config.api_key() {
        Some(key) => Some(Arc::new(YouTubeDataApi::new(key))),
        None => {
            info!(env = %config.api_key_env, "no API key set, clip durations will not be looked up");
            None
        }
    }
}

fn cell_glyph(state: CellState) -> char {
    match state {
        CellState::Off => '.',
        CellState::Play => 'P',
        CellState::Stop => 'S',
    }
}

fn show(session: &SessionSnapshot) {
    println!(
        "BPM {}  Swing {}  Time {}",
        session.bpm, session.swing, session.time_signature
    );
    println!();
    for (index, row) in session.rows.iter().enumerate() {
        let glyphs: String = (0..NUM_STEPS)
            .map(|col| cell_glyph(session.grid.state_at(index, col)))
            .collect();
        let media = if row.has_media() { row.media_ref.as_str() } else { "-" };
        println!(
            "{} {:<12} {}  {} - {}  x{:.2}  vol {:.2}  {}",
            index,
            row.name,
            glyphs,
            format_time(row.start_offset),
            format_time(row.end_offset),
            row.playback_rate,
            row.gain,
            media
        );
    }
}

fn edit_row(session: &mut SessionSnapshot, args: &[String], config: &AppConfig) -> Result<()> {
    let row: usize = parse_arg(args, 1, "row")?;
    let field = args
        .get(2)
        .ok_or_else(|| anyhow!("Missing field. Run with help for usage."))?;
    let value = args.get(3).map(String::as_str).unwrap_or("");
    let target = session.row_mut(row)?;

    match field.as_str() {
        "name" => target.set_name(value),
        "media" => {
            target.set_media_ref(value)?;
            if target.has_media() && !target.has_end() {
                if let Some(lookup) = duration_lookup(config) {
                    let rt = runtime::Builder::new_current_thread().enable_all().build()?;
                    if let Some(seconds) = rt.block_on(resolve_duration(&target.media_ref, lookup.as_ref())) {
                        target.set_end_offset(seconds)?;
                        println!("End set to clip length {}", format_time(seconds));
                    }
                }
            }
        }
        "start" => target.set_start_time(value)?,
        "end" => target.set_end_time(value)?,
        "rate" => target.set_playback_rate(parse_arg(args, 3, "rate")?)?,
        "gain" => target.set_gain(parse_arg(args, 3, "gain")?)?,
        other => bail!("Unknown row field: {}", other),
    }
    Ok(())
}

fn play_headless(store: FileStore, config: &AppConfig, steps: usize) -> Result<()> {
    let log = CommandLog::new();
    let mut rack = TransportRack::new();
    for row in 0..NUM_ROWS {
        rack.attach(row, Box::new(RecordingTransport::new(row, log.clone())));
    }

    let mut engine = Engine::new(Box::new(store), rack, config);
    if let Some(lookup) = duration_lookup(config) {
        engine = engine.with_lookup(lookup);
    }
    let mut events = engine.subscribe();
    let handle = engine.handle();

    let rt = runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start runtime")?;

    rt.block_on(async move {
        let task = tokio::spawn(engine.run());
        handle.send(ControlAction::Play);

        let mut fired = 0;
        while fired < steps {
            match events.recv().await {
                Some(EngineEvent::Step(state)) => {
                    fired += 1;
                    let active = state
                        .active_row
                        .map(|row| row.to_string())
                        .unwrap_or_else(|| "-".to_string());
                    println!("step {}  active row {}", state.step_label(), active);
                }
                Some(_) => {}
                None => break,
            }
        }

        handle.stop();
        handle.quit();
        task.await.context("Engine task failed")?;
        Ok::<_, anyhow::Error>(())
    })?;

    println!();
    println!("{} transport commands issued", log.commands().len());
    for (row, command) in log.commands() {
        println!("  row {}: {}", row, command);
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut config_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if let Some(pos) = args.iter().position(|a| a == "--config") {
        let path = args
            .get(pos + 1)
            .ok_or_else(|| anyhow!("--config needs a path"))?
            .clone();
        config_path = PathBuf::from(path);
        args.drain(pos..=pos + 1);
    }

    let config = AppConfig::load(&config_path)?;
    init_logging(&config.log_level);

    if args.is_empty() {
        println!("VIDSEQ - Video Clip Step Sequencer");
        println!("Run with help for usage information");
        return Ok(());
    }

    let mut store = FileStore::new(&config.storage_path);
    let mut session = store.load();

    match args[0].as_str() {
        "show" => {
            show(&session);
            return Ok(());
        }
        "thumb" => {
            let row: usize = parse_arg(&args, 1, "row")?;
            match thumbnail_url(&session.row(row)?.media_ref) {
                Some(url) => println!("{}", url),
                None => println!("Row {} has no video", row),
            }
            return Ok(());
        }
        "play" => {
            let steps: usize = parse_arg(&args, 1, "step count")?;
            return play_headless(store, &config, steps);
        }
        "help" | "--help" => {
            print_usage();
            return Ok(());
        }
        "toggle" => {
            let row = parse_arg(&args, 1, "row")?;
            let col = parse_arg(&args, 2, "column")?;
            let state = session.toggle_cell(row, col)?;
            println!("Cell {},{} is now {:?}", row, col, state);
        }
        "bpm" => session.set_bpm(parse_arg(&args, 1, "bpm")?)?,
        "swing" => session.set_swing(parse_arg(&args, 1, "swing")?)?,
        "signature" => {
            let text: String = parse_arg(&args, 1, "time signature")?;
            let signature = TimeSignature::parse(&text)
                .ok_or_else(|| anyhow!("Invalid time signature: {}", text))?;
            session.set_time_signature(signature)?;
        }
        "row" => edit_row(&mut session, &args, &config)?,
        "reset" => session = SessionSnapshot::default(),
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            return Ok(());
        }
    }

    store
        .save(&session)
        .with_context(|| format!("Failed to save session to {:?}", store.path()))?;
    show(&session);
    Ok(())
}
