use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
};

use anyhow::Context;
use clap::Parser;
use memsize::{
    memsize::{LayoutTable, SizeReport, Sizer},
    runtime::{
        gc::GcHeap,
        json::{ImportOptions, from_json},
    },
};

#[derive(Parser, Debug)]
#[command(name = "memsize")]
#[command(version)]
#[command(about = "Estimate the memory footprint of a JSON document loaded as heap objects", long_about = None)]
struct Args {
    /// JSON input file, or `-` for stdin.
    input: Option<PathBuf>,

    /// Load JSON arrays as lists instead of vectors.
    #[arg(long)]
    lists: bool,

    /// Print a per-kind breakdown.
    #[arg(long)]
    report: bool,

    /// Print the layout constants and exit.
    #[arg(long)]
    layout: bool,

    /// Collect garbage left by the import, then print allocator statistics.
    #[arg(long)]
    heap_stats: bool,

    /// Emit JSON instead of tables.
    #[arg(long)]
    json: bool,

    #[arg(short, long, default_value = "warn")]
    log_level: String,
}

fn main() {
    let args = Args::parse();
    setup_logging(&args.log_level);

    if let Err(err) = run(&args) {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

fn setup_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => log::LevelFilter::Trace,
        "debug" => log::LevelFilter::Debug,
        "info" => log::LevelFilter::Info,
        "warn" => log::LevelFilter::Warn,
        "error" => log::LevelFilter::Error,
        _ => log::LevelFilter::Warn,
    };

    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();
}

fn run(args: &Args) -> anyhow::Result<()> {
    let layout = LayoutTable::global();
    if args.layout {
        if args.json {
            println!("{}", serde_json::to_string_pretty(layout)?);
        } else {
            print!("{}", layout.render());
        }
        return Ok(());
    }

    let Some(input) = &args.input else {
        anyhow::bail!("missing input file (use `-` for stdin)");
    };
    let source = read_input(input)?;
    let document: serde_json::Value =
        serde_json::from_str(&source).with_context(|| format!("parsing {}", input.display()))?;

    let mut heap = GcHeap::new();
    let root = from_json(
        &mut heap,
        &document,
        ImportOptions {
            arrays_as_lists: args.lists,
        },
    );
    log::info!("loaded {} heap objects", heap.live_count());

    let sizer = Sizer::with_layout(&heap, layout);
    let name = input.display().to_string();
    let report = SizeReport::build(&sizer, &[(name.as_str(), root)])?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.report {
        print!("{}", report.render());
    } else {
        println!("{}", report.total);
    }

    if args.heap_stats {
        print!("{}", heap.collect(&[root]).render());
    }
    Ok(())
}

fn read_input(path: &PathBuf) -> anyhow::Result<String> {
    if path.as_os_str() == "-" {
        let mut source = String::new();
        io::stdin()
            .read_to_string(&mut source)
            .context("reading stdin")?;
        return Ok(source);
    }
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}
