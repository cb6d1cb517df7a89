use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::Command;

#[derive(Parser)]
#[command(name = "xtask", about = "Workspace automation for cityscape")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run fmt, clippy and tests, then a short headless stream
    Check,
    /// Run cargo fmt --check on all crates
    Fmt,
    /// Run clippy on all crates
    Clippy,
    /// Run all tests
    Test,
    /// Run the section streaming benchmarks
    Bench,
    /// Stream the city headlessly through the CLI
    Smoke {
        /// Frames to simulate
        #[arg(long, default_value_t = 1200)]
        frames: u64,
        /// RNG seed
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            cargo("fmt", &["fmt", "--all", "--", "--check"])?;
            clippy()?;
            cargo("test", &["test", "--workspace"])?;
            smoke(600, 42)?;
        }
        Commands::Fmt => cargo("fmt", &["fmt", "--all", "--", "--check"])?,
        Commands::Clippy => clippy()?,
        Commands::Test => cargo("test", &["test", "--workspace"])?,
        Commands::Bench => cargo(
            "bench",
            &["bench", "-p", "cityscape-stream", "--bench", "bench_section_stream"],
        )?,
        Commands::Smoke { frames, seed } => smoke(frames, seed)?,
    }

    Ok(())
}

fn clippy() -> Result<()> {
    cargo(
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    )
}

fn smoke(frames: u64, seed: u64) -> Result<()> {
    let frames = frames.to_string();
    let seed = seed.to_string();
    cargo(
        "smoke run",
        &[
            "run",
            "--release",
            "-p",
            "cityscape-cli",
            "--",
            "run",
            "--frames",
            &frames,
            "--seed",
            &seed,
            "--report-every",
            "0",
        ],
    )
}

fn cargo(label: &str, args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        anyhow::bail!("cargo {label} failed");
    }
    Ok(())
}
