use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use trackunpack::track::{ExtractOptions, TrackFile, TrackInfo};

#[derive(Parser, Debug)]
#[command(name = "trackunpack", version, about = "Decompress LZMA-packed game track files")]
struct Cli {
    /// Track file to decompress
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,

    /// Print what was detected instead of decompressing
    #[arg(long)]
    inspect: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Prepend the container header and HEND terminator to the output
    #[arg(long)]
    keep_header: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    log::debug!("Parsed CLI options: {:?}", cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let track = TrackFile::open(&cli.input)?;

    // ── Inspect ──────────────────────────────────────────────────────────────
    if cli.inspect {
        let info = track.inspect();
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&info)?);
        } else {
            print_info(&cli.input, &info);
        }
        return Ok(());
    }

    // ── Extract ──────────────────────────────────────────────────────────────
    let opts = ExtractOptions { keep_header: cli.keep_header };
    let report = track.extract(&opts)?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Decompressed: {}", report.output.display());
    }
    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn print_info(path: &Path, info: &TrackInfo) {
    let opt = |v: Option<usize>| v.map(|n| n.to_string()).unwrap_or_else(|| "—".into());

    println!("── Track ────────────────────────────────────────────────");
    println!("  Path           {}", path.display());
    println!("  Size           {} B", info.size);
    println!("  Format         {}", info.format.name());
    println!("  Payload start  {}", opt(info.payload_start));
    println!("  Header         {} B  {}", opt(info.header_len), info.header_preview);
    println!("  Payload        {} B", opt(info.payload_len));
    match info.properties {
        Some(p) => println!(
            "  Properties     lc={} lp={} pb={} dict={} B",
            p.lc, p.lp, p.pb, p.dict_size
        ),
        None => println!("  Properties     —"),
    }
    match info.declared_size {
        Some(n) => println!("  Declared size  {} B", n),
        None    => println!("  Declared size  —"),
    }
    if info.already_decompressed {
        println!("  Note           HEND terminator found; file looks decompressed already");
    }
    println!("  Output         {}", info.output_name);
}
