use std::{
    io::{BufWriter, Write as _},
    path::PathBuf,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "trellis", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scene document and print one JSON line of placements per frame.
    Resolve(ResolveArgs),
    /// Decompose a column-major 4x4 matrix and rebuild it.
    Decompose(DecomposeArgs),
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Override the number of frames to run.
    #[arg(long)]
    frames: Option<u64>,
}

#[derive(Parser, Debug)]
struct DecomposeArgs {
    /// Sixteen whitespace- or comma-separated numbers, column-major.
    #[arg(long)]
    matrix: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Resolve(args) => cmd_resolve(args),
        Command::Decompose(args) => cmd_decompose(args),
    }
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let doc = trellis::SceneDocument::from_path(&args.in_path)?;
    let mut scene = trellis::Scene::build(&doc)
        .with_context(|| format!("build scene '{}'", args.in_path.display()))?;
    let frames = args.frames.unwrap_or_else(|| scene.frames());

    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for frame in 0..frames {
        let report = scene.step(frame)?;
        serde_json::to_writer(&mut out, &report).context("write frame report")?;
        out.write_all(b"\n")?;
    }
    out.flush()?;

    tracing::info!(frames, "resolved");
    Ok(())
}

fn cmd_decompose(args: DecomposeArgs) -> anyhow::Result<()> {
    let values = args
        .matrix
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("invalid matrix entry '{s}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;
    let values: [f64; 16] = values
        .try_into()
        .map_err(|v: Vec<f64>| anyhow::anyhow!("expected 16 matrix entries, got {}", v.len()))?;

    let matrix = trellis::Matrix(values);
    let parts = matrix.interpret();
    let rebuilt = trellis::Matrix::build(&parts);
    let report = serde_json::json!({
        "decomposition": parts,
        "normalized_rotation": trellis::normalize_rotation(parts.rotate),
        "rebuilt": rebuilt,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
