use std::path::PathBuf;

use anyhow::bail;
use clap::{Parser, Subcommand};

use jobicons::{BatchSummary, BlendOptions, OutputLayout, XivApiClient};

#[derive(Parser, Debug)]
#[command(name = "jobicons", version)]
struct Cli {
    /// Root directory for all descriptors, icons, and blended output.
    #[arg(long, default_value = ".")]
    root: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download class/job metadata and icons from the API.
    Fetch(FetchArgs),
    /// Blend each class/job's action icons into one image.
    Blend(BlendArgs),
    /// Paste each class/job's icon onto its blended image.
    Overlay,
}

#[derive(Parser, Debug)]
struct FetchArgs {
    /// Base URL of the metadata API.
    #[arg(long, default_value = jobicons::DEFAULT_BASE_URL)]
    base_url: String,
}

#[derive(Parser, Debug)]
struct BlendArgs {
    /// Also blend trait icons (own, then parent's).
    #[arg(long)]
    include_traits: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let layout = OutputLayout::new(cli.root);

    let summary = match cli.cmd {
        Command::Fetch(args) => {
            let api = XivApiClient::new(args.base_url);
            jobicons::fetch::run(&api, &layout)?
        }
        Command::Blend(args) => jobicons::blend::run(
            &layout,
            BlendOptions {
                include_traits: args.include_traits,
            },
        )?,
        Command::Overlay => jobicons::overlay::run(&layout)?,
    };

    report(&summary)
}

fn report(summary: &BatchSummary) -> anyhow::Result<()> {
    eprintln!("{} entities processed", summary.processed.len());
    if !summary.all_ok() {
        bail!("{} entities failed: {}", summary.failed.len(), summary.failed.join(", "));
    }
    Ok(())
}
