use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gerber_plotter::{Extents, GerberLayer, LayerSet, ParseOptions};
use log::{error, info};

const DEMO_SOURCE: &str = include_str!("../assets/demo.gbr");

#[derive(Parser, Debug)]
#[command(author, version, about = "Print the extents of Gerber layers", long_about = None)]
struct Args {
    /// Gerber files to read, the built-in demo board is used when none are given.
    files: Vec<PathBuf>,

    /// Report every skipped or unrecognized command.
    #[arg(short, long)]
    verbose: bool,

    /// Fail on unresolved aperture references.
    #[arg(short, long)]
    strict: bool,
}

fn describe(extents: &Extents) -> String {
    match extents.bounding_box() {
        None => "empty".to_string(),
        Some(bbox) => format!(
            "({:.3}, {:.3}) -> ({:.3}, {:.3}), {:.3} x {:.3} mm",
            bbox.min.x,
            bbox.min.y,
            bbox.max.x,
            bbox.max.y,
            extents.width(),
            extents.height()
        ),
    }
}

fn print_layer(name: &str, layer: &GerberLayer) {
    println!("{}", name);
    println!("  units:      {:?}", layer.units());
    println!("  primitives: {}", layer.primitives().len());
    println!("  extents:    {}", describe(layer.extents()));
    println!("  summary:    {}", layer.summary());
    for diagnostic in layer.diagnostics() {
        println!("    {}", diagnostic);
    }
}

fn main() -> ExitCode {
    env_logger::init(); // Log to stderr (optional).

    let args = Args::parse();
    let options = ParseOptions::default()
        .with_verbose(args.verbose)
        .with_strict(args.strict);

    let mut sources = vec![];
    for path in &args.files {
        match fs::read_to_string(path) {
            Ok(source) => sources.push((path.display().to_string(), source)),
            Err(cause) => {
                error!("Error reading file {:?}: {}", path, cause);
                return ExitCode::FAILURE;
            }
        }
    }
    if sources.is_empty() {
        info!("no files given, using the demo board");
        sources.push(("demo.gbr".to_string(), DEMO_SOURCE.to_string()));
    }

    let set = {
        profiling::scope!("parse");
        LayerSet::parse(&sources, &options)
    };
    let set = match set {
        Ok(set) => set,
        Err(cause) => {
            eprintln!("{}", cause);
            return ExitCode::FAILURE;
        }
    };

    for named in set.layers() {
        print_layer(&named.name, &named.layer);
    }
    println!("board: {}", describe(set.extents()));

    ExitCode::SUCCESS
}
