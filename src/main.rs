// src/main.rs
use anyhow::Result;
use clap::Parser;
use studynotes::cli::args::Args;
use tracing::Level;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Deploy-time settings may come from a local .env file
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging based on verbosity
    let filter = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("studynotes={}", filter).parse()?),
        )
        .init();

    studynotes::run(args)
}
