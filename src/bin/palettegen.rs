//! Palette generator CLI
//!
//! Command-line front end for extracting, saving and sharing color palettes
//! with the palettegen library.

#[cfg(feature = "cli")]
use palettegen::cli;

#[cfg(feature = "cli")]
#[tokio::main]
async fn main() -> anyhow::Result<std::process::ExitCode> {
    cli::main().await
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Please rebuild with --features cli");
    std::process::exit(1);
}
