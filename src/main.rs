//! structr: resolve a YAML/JSON document against declared override handlers.
#![allow(clippy::multiple_crate_versions)]

use clap::Parser;
use std::io;
use std::path::PathBuf;
use structr::config::Config;
use structr::report::SectionReport;
use structr::{Builder, Value};

#[derive(Parser)]
#[command(name = "structr")]
#[command(about = "Resolve YAML/JSON documents into typed section trees", long_about = None)]
struct Args {
    /// Document to resolve (YAML or JSON)
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Handler configuration file (defaults to ./structr.toml)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Name of the root section
    #[arg(long, short = 'n')]
    name: Option<String>,

    /// Trace every section through construction hooks
    #[arg(long)]
    hooks: bool,

    /// Print leaf section paths instead of the full tree
    #[arg(long)]
    leaves: bool,
}

fn main() -> io::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let cfg = match &args.config {
        Some(path) => Config::from_path(path),
        None => Config::load(),
    }
    .map_err(io::Error::other)?;

    let (registry, handlers) = cfg.registry().map_err(io::Error::other)?;
    if handlers.is_empty() {
        log::warn!("no root handlers declared; every key becomes a section");
    }

    let text = std::fs::read_to_string(&args.path)?;
    let document: Value = serde_yaml::from_str(&text)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    let name = args.name.unwrap_or(cfg.root_name);
    let tree = Builder::new(&registry, &handlers)
        .run_hooks(args.hooks || cfg.run_hooks)
        .build(&name, &document)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    log::info!(
        "resolved {} sections from {}",
        tree.len(),
        args.path.display()
    );

    let report = SectionReport::from_tree(&tree);
    if args.leaves {
        for path in report.leaf_paths() {
            println!("{path}");
        }
    } else {
        let json = serde_json::to_string_pretty(&report).map_err(io::Error::other)?;
        println!("{json}");
    }

    Ok(())
}
