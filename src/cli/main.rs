//! Palette generator CLI
//!
//! Extracts palettes from images and manages the signed-in user's saved
//! palettes in the local JSON store.

use super::config::CliConfigBuilder;
use crate::{
    error::PaletteError,
    export::{share_palette, ExportFormatter, ExportKind},
    extractor::{ColorExtractor, ImageHandle, RemoteExtractor},
    mock::{showcase_palettes, MockExtractor},
    service::PaletteService,
    share::{share_menu, FileShareSheet, MenuStyle},
    store::JsonFilePaletteStore,
    tracing_config::{events, init_cli_tracing, spans, TracingFormat},
    types::{Palette, PaletteId},
};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, Instrument};

/// Extract, save and share color palettes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "palettegen")]
pub struct Cli {
    /// Enable verbose logging (-v: DEBUG, -vv: TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, value_enum, default_value = "console", global = true)]
    pub log_format: CliLogFormat,

    /// Signed-in user id [default: $PALETTEGEN_USER]
    #[arg(long, global = true, value_name = "ID")]
    pub user: Option<String>,

    /// Display name recorded on saved palettes [default: $PALETTEGEN_USER_NAME]
    #[arg(long, global = true, value_name = "NAME")]
    pub user_name: Option<String>,

    /// Directory holding the palette store [default: platform data directory]
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Extract a palette from an image (use "-" for stdin)
    Extract {
        #[arg(value_name = "IMAGE")]
        image: String,

        /// Use the built-in placeholder palette instead of the remote provider
        #[arg(long)]
        mock: bool,

        /// Save the extracted palette under this name
        #[arg(long, value_name = "NAME")]
        save: Option<String>,

        /// Number of colors kept (1-5)
        #[arg(long)]
        max_colors: Option<usize>,
    },

    /// List saved palettes, most recent first
    List,

    /// Delete a saved palette
    Delete {
        #[arg(value_name = "ID")]
        id: String,
    },

    /// Export a saved or showcase palette
    Export {
        #[arg(value_name = "ID")]
        id: String,

        /// Representation to export; asks interactively when omitted
        #[arg(short, long, value_enum)]
        format: Option<CliExportFormat>,

        /// File or directory receiving the export [default: stdout]
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Menu presentation used when asking interactively
        #[arg(long, value_enum)]
        menu: Option<CliMenuStyle>,
    },

    /// Show the built-in example palettes
    Showcase,

    /// Print how many palettes the user has saved
    Count,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliExportFormat {
    Text,
    Colors,
    Image,
}

impl From<CliExportFormat> for ExportKind {
    fn from(format: CliExportFormat) -> Self {
        match format {
            CliExportFormat::Text => Self::Text,
            CliExportFormat::Colors => Self::ColorsOnly,
            CliExportFormat::Image => Self::Image,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliLogFormat {
    /// Colored human-readable output
    Console,
    /// Plain output without colors
    Compact,
    /// One JSON object per event
    #[cfg(feature = "tracing-json")]
    Json,
}

impl From<CliLogFormat> for TracingFormat {
    fn from(format: CliLogFormat) -> Self {
        match format {
            CliLogFormat::Console => Self::Console,
            CliLogFormat::Compact => Self::Compact,
            #[cfg(feature = "tracing-json")]
            CliLogFormat::Json => Self::Json,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum CliMenuStyle {
    Sheet,
    Dialog,
}

impl From<CliMenuStyle> for MenuStyle {
    fn from(style: CliMenuStyle) -> Self {
        match style {
            CliMenuStyle::Sheet => Self::ActionSheet,
            CliMenuStyle::Dialog => Self::Dialog,
        }
    }
}

pub async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_cli_tracing(cli.verbose, cli.log_format.into())
        .context("Failed to initialize tracing")?;

    match run(&cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("❌ {}", failure_message(&e));
            Ok(ExitCode::FAILURE)
        },
    }
}

/// The single error line shown to the user
fn failure_message(error: &anyhow::Error) -> String {
    match error.downcast_ref::<PaletteError>() {
        Some(palette_error) => palette_error.user_message(),
        None => format!("{:#}", error),
    }
}

async fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Command::Showcase => {
            for palette in showcase_palettes() {
                print_palette(&palette);
            }
            Ok(())
        },
        Command::Extract {
            image,
            mock,
            save,
            max_colors,
        } => extract(cli, image, *mock, save.as_deref(), *max_colors).await,
        Command::List => list(cli).await,
        Command::Delete { id } => delete(cli, id).await,
        Command::Count => {
            let session = CliConfigBuilder::session_from_cli(cli);
            let count = palette_service(cli)?
                .count_palettes(&session)
                .await
                .context("Failed to count palettes")?;
            println!("{}", count);
            Ok(())
        },
        Command::Export {
            id,
            format,
            output,
            menu,
        } => export(cli, id, *format, output.clone(), *menu).await,
    }
}

fn palette_service(cli: &Cli) -> Result<PaletteService> {
    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    debug!(store = %config.store_path().display(), "Opening palette store");
    Ok(PaletteService::new(Arc::new(JsonFilePaletteStore::new(
        config.store_path(),
    ))))
}

async fn read_image(image: &str) -> Result<ImageHandle> {
    if image == "-" {
        let mut bytes = Vec::new();
        std::io::stdin()
            .read_to_end(&mut bytes)
            .context("Failed to read image from stdin")?;
        return Ok(ImageHandle::Bytes(bytes));
    }
    Ok(ImageHandle::Path(PathBuf::from(image)))
}

fn spinner(message: &str) -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

async fn extract(
    cli: &Cli,
    image: &str,
    mock: bool,
    save: Option<&str>,
    max_colors: Option<usize>,
) -> Result<()> {
    let session = CliConfigBuilder::session_from_cli(cli);
    if save.is_some() {
        session.require_user()?;
    }

    let handle = read_image(image).await?;

    let extractor: Box<dyn ColorExtractor> = if mock {
        Box::new(MockExtractor::new())
    } else {
        let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
        let extractor_config = CliConfigBuilder::extractor_config(&config, max_colors)
            .context("Invalid extractor configuration")?;
        Box::new(RemoteExtractor::new(extractor_config).context("Failed to create extractor")?)
    };

    let pb = spinner("Analizando colores...")?;
    let span = spans::extraction(extractor.name(), &handle.to_string());
    let result = extractor.extract(&handle).instrument(span).await;
    pb.finish_and_clear();

    let palette = match result {
        Ok(palette) => palette,
        Err(e) => {
            events::error_with_context(&e, "extraction");
            return Err(anyhow::Error::new(e)
                .context(format!("Failed to extract colors from {}", handle)));
        },
    };

    print_palette(&palette);
    println!("📋 {}", ExportFormatter::clipboard_text(&palette));

    if let Some(name) = save {
        let id = palette_service(cli)?
            .save_palette(&session, &palette, name)
            .await
            .context("Failed to save palette")?;
        events::progress(&format!("Paleta guardada exitosamente ({})", id), "✅");
    }

    Ok(())
}

async fn list(cli: &Cli) -> Result<()> {
    let session = CliConfigBuilder::session_from_cli(cli);
    let palettes = palette_service(cli)?
        .list_palettes(&session)
        .await
        .context("Failed to list palettes")?;

    if palettes.is_empty() {
        println!("No tienes paletas guardadas");
        return Ok(());
    }

    for palette in &palettes {
        print_palette(palette);
    }
    Ok(())
}

async fn delete(cli: &Cli, id: &str) -> Result<()> {
    let session = CliConfigBuilder::session_from_cli(cli);
    palette_service(cli)?
        .delete_palette(&session, &PaletteId::new(id))
        .await
        .with_context(|| format!("Failed to delete palette {}", id))?;
    info!("Deleted palette {}", id);
    Ok(())
}

async fn find_palette(cli: &Cli, id: &str) -> Result<Palette> {
    let id = PaletteId::new(id);
    if let Some(palette) = showcase_palettes()
        .into_iter()
        .find(|p| p.id.as_ref() == Some(&id))
    {
        return Ok(palette);
    }

    let session = CliConfigBuilder::session_from_cli(cli);
    palette_service(cli)?
        .find_palette(&session, &id)
        .await
        .context("Failed to load palette")?
        .with_context(|| format!("Palette {} not found", id))
}

async fn export(
    cli: &Cli,
    id: &str,
    format: Option<CliExportFormat>,
    output: Option<PathBuf>,
    menu: Option<CliMenuStyle>,
) -> Result<()> {
    let palette = find_palette(cli, id).await?;

    let kind = match format {
        Some(format) => ExportKind::from(format),
        None => {
            let style = menu.map_or_else(MenuStyle::native, MenuStyle::from);
            let reader = std::io::BufReader::new(std::io::stdin());
            let choice = share_menu(style, reader, std::io::stderr())
                .choose(&palette.name)
                .context("Failed to read export choice")?;
            match choice {
                Some(kind) => kind,
                None => {
                    info!("Export cancelled");
                    return Ok(());
                },
            }
        },
    };

    let config = CliConfigBuilder::from_cli(cli).context("Failed to build configuration")?;
    let sheet = FileShareSheet::new(output);
    let span = spans::export(&kind.to_string(), &palette.name);
    share_palette(&palette, &palette.name, kind, &config.export_dir, &sheet)
        .instrument(span)
        .await
        .with_context(|| format!("Failed to export palette {}", id))?;
    Ok(())
}

fn print_palette(palette: &Palette) {
    let title = if palette.name.is_empty() {
        "Paleta extraída"
    } else {
        palette.name.as_str()
    };
    println!("🎨 {} ({} colores)", title, palette.color_count());
    if let Some(id) = &palette.id {
        println!("   id: {}  ·  {}", id, palette.created_at_display());
    }
    for (index, color) in palette.colors.iter().enumerate() {
        println!(
            "  {}. {}  {:<20} {:>5}%",
            index + 1,
            color.display_hex(),
            color.name,
            crate::color::format_percentage(color.percentage)
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extract() {
        let cli = Cli::try_parse_from([
            "palettegen",
            "-vv",
            "--user",
            "u1",
            "extract",
            "photo.jpg",
            "--mock",
            "--save",
            "Arena",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.user.as_deref(), Some("u1"));
        assert_eq!(
            cli.command,
            Command::Extract {
                image: "photo.jpg".to_string(),
                mock: true,
                save: Some("Arena".to_string()),
                max_colors: None,
            }
        );
    }

    #[test]
    fn test_parse_export() {
        let cli = Cli::try_parse_from([
            "palettegen",
            "export",
            "abc",
            "--format",
            "colors",
            "--output",
            "/tmp/out",
            "--menu",
            "sheet",
        ])
        .unwrap();

        match cli.command {
            Command::Export {
                id,
                format,
                output,
                menu,
            } => {
                assert_eq!(id, "abc");
                assert_eq!(format.map(ExportKind::from), Some(ExportKind::ColorsOnly));
                assert_eq!(output, Some(PathBuf::from("/tmp/out")));
                assert_eq!(menu.map(MenuStyle::from), Some(MenuStyle::ActionSheet));
            },
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["palettegen", "list", "--user", "u9", "-v"]).unwrap();
        assert_eq!(cli.command, Command::List);
        assert_eq!(cli.user.as_deref(), Some("u9"));
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["palettegen", "export", "abc", "--format", "pdf"]).is_err());
        assert!(Cli::try_parse_from(["palettegen"]).is_err());
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::try_parse_from(["palettegen", "list"]).unwrap();
        assert_eq!(TracingFormat::from(cli.log_format), TracingFormat::Console);

        let cli = Cli::try_parse_from(["palettegen", "count", "--log-format", "compact"]).unwrap();
        assert_eq!(TracingFormat::from(cli.log_format), TracingFormat::Compact);
        assert!(Cli::try_parse_from(["palettegen", "list", "--log-format", "xml"]).is_err());
    }

    #[tokio::test]
    async fn test_save_without_user_fails_before_extracting() {
        let dir = tempfile::TempDir::new().unwrap();
        let cli = Cli::try_parse_from([
            "palettegen",
            "--user",
            " ",
            "--data-dir",
            dir.path().to_str().unwrap(),
            "extract",
            "missing.jpg",
            "--save",
            "Arena",
        ])
        .unwrap();

        let err = run(&cli).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PaletteError>(),
            Some(PaletteError::AuthenticationRequired)
        ));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_failure_message_is_single_line() {
        let localized =
            anyhow::Error::new(PaletteError::NoColorsFound).context("Failed to extract");
        assert_eq!(
            failure_message(&localized),
            "No se pudieron extraer colores de la imagen"
        );

        let plain = anyhow::anyhow!("disk full").context("Failed to save palette");
        assert_eq!(failure_message(&plain), "Failed to save palette: disk full");
    }

    #[tokio::test]
    async fn test_showcase_export_needs_no_user() {
        let cli = Cli::try_parse_from(["palettegen", "export", "showcase-2"]).unwrap();
        let palette = find_palette(&cli, "showcase-2").await.unwrap();
        assert_eq!(palette.name, "Café Latte");
    }
}
