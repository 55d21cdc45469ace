//! griha - command line front end for the room-scan property engine
//!
//! # Usage
//!
//! ```bash
//! # Create the property file (or open the existing one)
//! griha init
//!
//! # Scan a room from a recorded segment log
//! griha scan --name "My Room" --floor "Ground Floor" --segments scans/rect.yaml
//!
//! # Export a floor plan
//! RUST_LOG=debug griha export --format pdf --output plan.pdf
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use log::warn;

use griha_scan::config::GrihaConfig;
use griha_scan::{
    ExportFormat, FeedOutcome, PropertyEngine, Result, RoomId, RoomKind, ScanMethod, SegmentLog,
    SessionError, SessionState,
};

/// Room-scan property engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Property file (default: <document_dir>/<file_name> from the config)
    #[arg(short, long, global = true)]
    property: Option<PathBuf>,

    /// Configuration file path (default: configs/griha.yaml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the property file, or open it if it already exists
    Init,

    /// Add an unscanned room
    AddRoom {
        #[arg(long)]
        name: String,
        #[arg(long)]
        floor: String,
        /// room, plot or exterior
        #[arg(long, default_value = "room")]
        kind: RoomKind,
    },

    /// Scan a room from a YAML segment log and save the result
    Scan {
        #[arg(long)]
        name: String,
        #[arg(long)]
        floor: String,
        /// Used when the room does not exist yet
        #[arg(long, default_value = "room")]
        kind: RoomKind,
        /// Capture method (default: the log's method, else wall-touch)
        #[arg(long)]
        method: Option<ScanMethod>,
        /// Segment log file
        #[arg(long)]
        segments: PathBuf,
    },

    /// Print floors and rooms
    List,

    /// Report the first pair of overlapping rooms
    Overlaps,

    /// Export the property
    Export {
        /// pdf, pdf-room-areas, pdf-wall-measurements, esx or csv
        #[arg(long)]
        format: ExportFormat,
        /// Output file (default: property path with the format's extension)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| writeln!(buf, "[{}] {}", record.level(), record.args()))
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => GrihaConfig::load(path)?,
        None => GrihaConfig::load_default()?,
    };
    let property = args
        .property
        .clone()
        .unwrap_or_else(|| config.property.path());

    let mut engine = PropertyEngine::new(config);
    open_or_create(&mut engine, &property)?;

    match args.command {
        Command::Init => {
            let document = engine.property()?;
            let document = document.read();
            println!(
                "{}: {} floors, {} rooms",
                property.display(),
                document.floors().len(),
                document.room_count()
            );
        }
        Command::AddRoom { name, floor, kind } => {
            let id = engine.add_room(&name, &floor, kind)?;
            engine.save()?;
            println!("Added '{}' on {} ({})", name, floor, id);
        }
        Command::Scan {
            name,
            floor,
            kind,
            method,
            segments,
        } => scan(&engine, &name, &floor, kind, method, &segments)?,
        Command::List => list(&engine)?,
        Command::Overlaps => match engine.find_overlapping_rooms()? {
            Some(overlap) => {
                let document = engine.property()?;
                let document = document.read();
                let name = |id: RoomId| {
                    document
                        .room(id)
                        .map_or_else(|| id.to_string(), |r| r.name().to_string())
                };
                println!(
                    "'{}' and '{}' overlap on {}",
                    name(overlap.first),
                    name(overlap.second),
                    overlap.floor
                );
            }
            None => println!("No overlapping rooms"),
        },
        Command::Export { format, output } => {
            let output = output.unwrap_or_else(|| property.with_extension(format.extension()));
            export(&engine, format, &output)?;
        }
    }
    Ok(())
}

/// Open the property if its file exists, otherwise create it.
fn open_or_create(engine: &mut PropertyEngine, path: &Path) -> Result<()> {
    if path.exists() {
        engine.load_property(path)
    } else {
        engine.create_property(path)
    }
}

fn scan(
    engine: &PropertyEngine,
    name: &str,
    floor: &str,
    kind: RoomKind,
    method: Option<ScanMethod>,
    segments: &Path,
) -> Result<()> {
    let recording = SegmentLog::load(segments)?;
    let method = method.or(recording.method).unwrap_or(ScanMethod::WallTouch);

    let existing = engine
        .property()?
        .read()
        .find_room(name, floor)
        .map(|r| r.id());
    let room = match existing {
        Some(id) => id,
        None => engine.add_room(name, floor, kind)?,
    };

    let worker = engine.spawn_scan_worker(room, method)?;
    let mut ready = false;
    for (i, segment) in recording.to_segments().into_iter().enumerate() {
        match worker.feed(segment)? {
            FeedOutcome::Accepted(status) => ready = status.is_ready_to_close(),
            FeedOutcome::Rejected(err) => println!("segment {} skipped: {}", i, err),
        }
    }

    if !ready {
        worker.cancel()?;
        worker.join()?;
        warn!("Outline of '{}' did not close; nothing saved", name);
        return Err(SessionError::NotReady {
            state: SessionState::Recording,
        }
        .into());
    }

    let boundary = worker.commit()?;
    worker.join()?;
    engine.save()?;
    println!(
        "Scanned '{}' on {}: {} walls, {:.2} m², perimeter {:.2} m",
        name,
        floor,
        boundary.len(),
        boundary.area(),
        boundary.perimeter()
    );
    Ok(())
}

fn list(engine: &PropertyEngine) -> Result<()> {
    let document = engine.property()?;
    let document = document.read();
    let details = document.details().address_line();
    if !details.is_empty() {
        println!("{}", details);
    }
    for floor in document.floors() {
        println!("{} ({:.2} m²)", floor.name(), floor.area());
        for room in floor.rooms() {
            match (room.area(), room.scan_method()) {
                (Some(area), Some(method)) => println!(
                    "  {:<24} {:<9} {:>8.2} m²  {}",
                    room.name(),
                    room.kind().as_str(),
                    area,
                    method
                ),
                _ => println!("  {:<24} {:<9} not scanned", room.name(), room.kind().as_str()),
            }
        }
    }
    Ok(())
}

fn export(engine: &PropertyEngine, format: ExportFormat, output: &Path) -> Result<()> {
    let warnings = engine.export_to(format, output)?;
    if let Some(message) = warnings {
        println!("{}", message);
    }
    println!("Exported {} to {}", format, output.display());
    Ok(())
}
