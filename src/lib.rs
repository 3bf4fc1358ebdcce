#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::unused_async)]

//! # Palette Generator Library
//!
//! Turns a photo into a small palette of dominant colors using a remote
//! color-analysis provider, keeps a per-user collection of saved palettes,
//! and renders palettes as plain text, hex listings or SVG swatch images
//! for sharing.
//!
//! ## Features
//!
//! - **Remote Extraction**: multipart upload to an Imagga-compatible `/colors` endpoint
//! - **Canonical Palettes**: `#RRGGBB` codes, at most five swatches, bounded percentages
//! - **Owner-Scoped Storage**: save, list (most recent first) and delete per user
//! - **Exports**: text, hex-only and SVG renderings with automatic artifact cleanup
//! - **Offline Mode**: deterministic mock palette and built-in showcase palettes
//! - **CLI Integration**: optional command-line interface (enable with `cli` feature)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use palettegen::{extract_palette_from_bytes, ExportFormatter, ExtractorConfig};
//!
//! # async fn example(upload: Vec<u8>) -> anyhow::Result<()> {
//! let config = ExtractorConfig::builder()
//!     .credentials("api-key", "api-secret")
//!     .build()?;
//!
//! let palette = extract_palette_from_bytes(upload, &config).await?;
//! println!("{}", ExportFormatter::text(&palette, "Mi Paleta")?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Saving Palettes
//!
//! ```rust
//! use palettegen::{
//!     mock_palette, CurrentUser, InMemoryPaletteStore, PaletteService, SessionContext,
//! };
//! use std::sync::Arc;
//!
//! # async fn example() -> palettegen::Result<()> {
//! let service = PaletteService::new(Arc::new(InMemoryPaletteStore::new()));
//! let session = SessionContext::signed_in(CurrentUser::new("user-1"));
//!
//! service.save_palette(&session, &mock_palette(), "Arena").await?;
//! assert_eq!(service.list_palettes(&session).await?.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ### Feature Flags
//!
//! - `cli` (default): command-line interface, progress spinner and subscriber setup
//! - `tracing-json`: JSON log output for the CLI subscriber
//!
//! ### Library-Only Usage
//!
//! ```toml
//! [dependencies]
//! palettegen = { version = "0.1", default-features = false }
//! ```

#[cfg(feature = "cli")]
pub mod cli;
pub mod color;
pub mod config;
pub mod error;
pub mod export;
pub mod extractor;
pub mod mock;
pub mod normalize;
pub mod service;
pub mod session;
pub mod share;
pub mod store;
pub mod tracing_config;
pub mod types;

use tokio::io::AsyncRead;

// Public API exports
pub use config::{AppConfig, ExtractorConfig, ExtractorConfigBuilder};
pub use error::{PaletteError, Result};
pub use export::{share_palette, ExportArtifact, ExportFormatter, ExportKind};
pub use extractor::{ColorExtractor, ImageHandle, RemoteExtractor};
pub use mock::{mock_palette, showcase_palettes, MockExtractor};
pub use normalize::PaletteNormalizer;
pub use service::PaletteService;
pub use session::{CurrentUser, IdentityProvider, InMemoryIdentity, SessionContext};
pub use share::{FileShareSheet, MenuStyle, ShareMenu, ShareRequest, ShareSheet};
pub use store::{InMemoryPaletteStore, JsonFilePaletteStore, NewPalette, PaletteStore};
pub use tracing_config::{events, spans, TracingConfig, TracingFormat};
pub use types::{ColorEntry, Palette, PaletteId, RawColor, MAX_COLORS};

#[cfg(feature = "cli")]
pub use tracing_config::init_cli_tracing;

/// Extract a palette from encoded image bytes
///
/// The bytes are uploaded as-is; the provider does the decoding.
pub async fn extract_palette_from_bytes(
    image_bytes: Vec<u8>,
    config: &ExtractorConfig,
) -> Result<Palette> {
    RemoteExtractor::new(config.clone())?
        .extract(&ImageHandle::Bytes(image_bytes))
        .await
}

/// Extract a palette from an image file
pub async fn extract_palette_from_path<P: Into<std::path::PathBuf>>(
    path: P,
    config: &ExtractorConfig,
) -> Result<Palette> {
    RemoteExtractor::new(config.clone())?
        .extract(&ImageHandle::Path(path.into()))
        .await
}

/// Extract a palette from an async reader stream
///
/// ```rust,no_run
/// use palettegen::{extract_palette_from_reader, ExtractorConfig};
/// use tokio::fs::File;
///
/// # async fn example(config: ExtractorConfig) -> anyhow::Result<()> {
/// let file = File::open("photo.jpg").await?;
/// let palette = extract_palette_from_reader(file, &config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn extract_palette_from_reader<R: AsyncRead + Unpin>(
    mut reader: R,
    config: &ExtractorConfig,
) -> Result<Palette> {
    let mut buffer = Vec::new();
    tokio::io::AsyncReadExt::read_to_end(&mut reader, &mut buffer)
        .await
        .map_err(|e| {
            PaletteError::unknown_extraction(format!("Failed to read image stream: {}", e))
        })?;

    extract_palette_from_bytes(buffer, config).await
}
