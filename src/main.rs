//! notecraft - compile melody notation into Standard MIDI Files.
//!
//! # Usage
//!
//! ```bash
//! notecraft song.json                  # writes song.mid
//! notecraft song.json -o out.mid --tempo 90
//! notecraft --notation "C E G - 8( C E G C^1 )" -o arpeggio.mid
//! notecraft --inspect out.mid          # list tempo and note events
//! ```
//!
//! Set `RUST_LOG=debug` for parser and emitter tracing.

use anyhow::{bail, Context, Result};
use notecraft::midi::{self, MidiEvent};
use notecraft::music::{DEFAULT_OCTAVE, DEFAULT_VELOCITY};
use notecraft::{validate_notation, Score, Song, Track};
use std::path::{Path, PathBuf};

/// What the invocation should do.
enum Mode {
    /// Compile a JSON score file.
    Score(PathBuf),
    /// Compile a single notation string as a one-track song.
    Notation(String),
    /// Print the events of an existing MIDI file.
    Inspect(PathBuf),
}

/// Command-line options for the application.
struct CliOptions {
    mode: Mode,
    output: Option<PathBuf>,
    /// Overrides the score's tempo.
    tempo: Option<u32>,
    /// Skip the strict notation pre-filter.
    no_validate: bool,
}

fn print_help(program: &str) {
    eprintln!("notecraft - compile melody notation into MIDI files");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} <score.json> [OPTIONS]", program);
    eprintln!("  {} --notation <STRING> [OPTIONS]", program);
    eprintln!("  {} --inspect <file.mid>", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -o, --output PATH    Output file (default: score name with .mid)");
    eprintln!("  -t, --tempo BPM      Override the tempo");
    eprintln!("      --no-validate    Skip strict notation checks");
    eprintln!("  -h, --help           Print this help message");
}

impl CliOptions {
    /// Parses command-line arguments.
    fn parse() -> Result<Self> {
        let args: Vec<String> = std::env::args().collect();
        let program = args.first().map(String::as_str).unwrap_or("notecraft");
        let mut mode: Option<Mode> = None;
        let mut output: Option<PathBuf> = None;
        let mut tempo: Option<u32> = None;
        let mut no_validate = false;

        let mut iter = args.iter().skip(1);
        while let Some(arg) = iter.next() {
            let mut value = || {
                iter.next()
                    .cloned()
                    .with_context(|| format!("{} requires an argument", arg))
            };
            match arg.as_str() {
                "--notation" | "-n" => mode = Some(Mode::Notation(value()?)),
                "--inspect" | "-i" => mode = Some(Mode::Inspect(PathBuf::from(value()?))),
                "--output" | "-o" => output = Some(PathBuf::from(value()?)),
                "--tempo" | "-t" => {
                    let raw = value()?;
                    tempo = Some(raw.parse().with_context(|| format!("invalid tempo: {}", raw))?);
                }
                "--no-validate" => no_validate = true,
                "--help" | "-h" => {
                    print_help(program);
                    std::process::exit(0);
                }
                other if other.starts_with('-') => {
                    eprintln!("Unknown option: {}", other);
                    eprintln!("Use --help for usage information");
                    std::process::exit(1);
                }
                other => mode = Some(Mode::Score(PathBuf::from(other))),
            }
        }

        let Some(mode) = mode else {
            print_help(program);
            std::process::exit(1);
        };

        Ok(Self {
            mode,
            output,
            tempo,
            no_validate,
        })
    }
}

fn compile_score(path: &Path, cli: &CliOptions) -> Result<(Song, PathBuf)> {
    let score = Score::load(path).with_context(|| format!("Failed to read score {:?}", path))?;
    let song = score
        .compile(!cli.no_validate)
        .with_context(|| format!("Failed to compile {:?}", path))?;
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| path.with_extension("mid"));
    Ok((song, output))
}

fn compile_notation(notation: &str, cli: &CliOptions) -> Result<(Song, PathBuf)> {
    if !cli.no_validate {
        validate_notation(notation).context("Invalid notation")?;
    }
    let track = Track::from_notation(notation, DEFAULT_OCTAVE, DEFAULT_VELOCITY)
        .context("Failed to parse notation")?;
    let mut song = Song::default();
    song.add_track(track);
    let output = cli.output.clone().unwrap_or_else(|| PathBuf::from("out.mid"));
    Ok((song, output))
}

fn inspect(path: &Path) -> Result<()> {
    let inspection =
        midi::read_file(path).with_context(|| format!("Failed to read {:?}", path))?;
    println!(
        "{} tracks, {} ticks per quarter",
        inspection.track_count, inspection.ticks_per_quarter
    );
    for e in &inspection.events {
        match e.event {
            MidiEvent::SetTempo { micros_per_quarter } => println!(
                "track {:>2} tick {:>6}  tempo    {} us/quarter",
                e.track, e.tick, micros_per_quarter
            ),
            MidiEvent::NoteOn { pitch, velocity } => println!(
                "track {:>2} tick {:>6}  note-on  {:<4} vel {}",
                e.track,
                e.tick,
                midi::note_to_name(pitch),
                velocity
            ),
            MidiEvent::NoteOff { pitch, velocity } => println!(
                "track {:>2} tick {:>6}  note-off {:<4} vel {}",
                e.track,
                e.tick,
                midi::note_to_name(pitch),
                velocity
            ),
        }
    }
    Ok(())
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = CliOptions::parse()?;

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let (mut song, output) = match &cli.mode {
        Mode::Inspect(path) => return inspect(path),
        Mode::Score(path) => compile_score(path, &cli)?,
        Mode::Notation(notation) => compile_notation(notation, &cli)?,
    };

    if let Some(tempo) = cli.tempo {
        if tempo == 0 {
            bail!("tempo must be positive");
        }
        song.set_tempo(tempo);
    }

    song.write(&output)
        .with_context(|| format!("Failed to write {:?}", output))?;
    println!(
        "Wrote {} ({} tracks, {:.2} quarter notes)",
        output.display(),
        song.track_count(),
        song.duration()
    );
    Ok(())
}
