use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;

use snapsort_core::{sort, SortOptions};

#[derive(Parser)]
#[command(name = "snapsort", version, about = "Sort photos into dated directories by their EXIF metadata")]
struct Cli {
    /// Directory to read files from (default: the executable's directory)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory to move files into (default: <input>/sorted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Increase log detail (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn configure_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| writeln!(buf, "{}\t{}", record.level(), record.args()))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    configure_logging(cli.verbose);
    let t_total = Instant::now();

    let input_dir = match cli.input {
        Some(dir) => dir,
        None => std::env::current_exe()
            .context("locating the executable")?
            .parent()
            .map(PathBuf::from)
            .context("executable has no parent directory")?,
    };
    let output_root = cli.output.unwrap_or_else(|| input_dir.join("sorted"));

    log::info!("Input path: {}", input_dir.display());
    log::info!("Output path: {}", output_root.display());

    let options = SortOptions {
        input_dir,
        output_root,
    };
    let result = sort(&options)?;

    eprintln!(
        "Done! {} files examined, {} moved, {} skipped, {} errors ({:.2}s)",
        result.examined,
        result.moved,
        result.skipped,
        result.errors,
        t_total.elapsed().as_secs_f64()
    );

    Ok(())
}
