//! Palette export rendering and the share flow
//!
//! Three pure renderers turn a canonical palette into a plain-text listing,
//! a compact hex listing, or SVG markup. [`share_palette`] writes the chosen
//! rendering to a transient [`ExportArtifact`], hands it to the platform
//! [`ShareSheet`], and deletes the artifact on every exit path.

use crate::{
    color::{display_hex, format_percentage},
    error::{PaletteError, Result},
    share::{ShareRequest, ShareSheet},
    types::Palette,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Name used when an export is requested without one
pub const DEFAULT_EXPORT_NAME: &str = "Mi Paleta";

const HEADER_EMOJI: &str = "🎨";
const FOOTER: &str = "📱 Generado con Generador de Paletas";
const SVG_FOOTER: &str = "Generado con Generador de Paletas";
const FALLBACK_COLOR_NAME: &str = "Sin nombre";

const SVG_WIDTH: u32 = 400;
const SVG_HEIGHT: u32 = 200;
const SWATCH_SIZE: u32 = 80;

/// Export representations offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExportKind {
    /// Numbered listing with names and percentages
    Text,
    /// Hex codes only
    ColorsOnly,
    /// SVG swatch image
    Image,
}

impl ExportKind {
    /// All kinds in menu order
    pub const ALL: [ExportKind; 3] = [Self::Text, Self::ColorsOnly, Self::Image];

    /// Fixed suffix appended to the sanitized palette name
    #[must_use]
    pub fn file_suffix(self) -> &'static str {
        match self {
            Self::Text => "_palette.txt",
            Self::ColorsOnly => "_colors.txt",
            Self::Image => "_palette.svg",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Text | Self::ColorsOnly => "text/plain",
            Self::Image => "image/svg+xml",
        }
    }

    /// Title of the platform share dialog
    #[must_use]
    pub fn dialog_title(self, palette_name: &str) -> String {
        match self {
            Self::Text => format!("Compartir {}", palette_name),
            Self::ColorsOnly => format!("Compartir colores de {}", palette_name),
            Self::Image => format!("Compartir imagen de {}", palette_name),
        }
    }
}

impl std::fmt::Display for ExportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::ColorsOnly => write!(f, "colors"),
            Self::Image => write!(f, "image"),
        }
    }
}

fn export_name(palette_name: &str) -> &str {
    let trimmed = palette_name.trim();
    if trimmed.is_empty() {
        DEFAULT_EXPORT_NAME
    } else {
        trimmed
    }
}

fn color_name(name: &str) -> &str {
    if name.trim().is_empty() {
        FALLBACK_COLOR_NAME
    } else {
        name
    }
}

fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Service rendering palettes into shareable representations
pub struct ExportFormatter;

impl ExportFormatter {
    fn ensure_colors(palette: &Palette) -> Result<()> {
        if palette.is_empty() {
            Err(PaletteError::EmptyPaletteExport)
        } else {
            Ok(())
        }
    }

    fn banner(palette_name: &str, body: &str) -> String {
        format!(
            "{} {}\n\n{}\n\n{}",
            HEADER_EMOJI,
            export_name(palette_name),
            body,
            FOOTER
        )
    }

    /// Numbered plain-text listing
    ///
    /// ```rust
    /// use palettegen::{export::ExportFormatter, types::{ColorEntry, Palette}};
    ///
    /// let palette = Palette::transient(vec![ColorEntry {
    ///     hex: "#ABCDEF".to_string(),
    ///     name: "Foo".to_string(),
    ///     percentage: 12.34,
    /// }]);
    /// assert_eq!(
    ///     ExportFormatter::text(&palette, "P").unwrap(),
    ///     "🎨 P\n\n1. #ABCDEF - Foo (12.3%)\n\n📱 Generado con Generador de Paletas"
    /// );
    /// ```
    ///
    /// # Errors
    /// - `EmptyPaletteExport` when the palette has no colors
    pub fn text(palette: &Palette, palette_name: &str) -> Result<String> {
        Self::ensure_colors(palette)?;

        let lines: Vec<String> = palette
            .colors
            .iter()
            .enumerate()
            .map(|(index, color)| {
                format!(
                    "{}. {} - {} ({}%)",
                    index + 1,
                    display_hex(&color.hex),
                    color_name(&color.name),
                    format_percentage(color.percentage)
                )
            })
            .collect();

        Ok(Self::banner(palette_name, &lines.join("\n")))
    }

    /// Upper-cased hex codes joined with `" • "`, without banners
    ///
    /// # Errors
    /// - `EmptyPaletteExport` when the palette has no colors
    pub fn hex_codes(palette: &Palette) -> Result<String> {
        Self::ensure_colors(palette)?;

        Ok(palette
            .colors
            .iter()
            .map(|c| display_hex(&c.hex))
            .collect::<Vec<_>>()
            .join(" • "))
    }

    /// Compact hex-only listing between the header and footer banners
    ///
    /// # Errors
    /// - `EmptyPaletteExport` when the palette has no colors
    pub fn hex_list(palette: &Palette, palette_name: &str) -> Result<String> {
        let codes = Self::hex_codes(palette)?;
        Ok(Self::banner(palette_name, &codes))
    }

    /// Fixed-layout SVG: a title above one row of equal-width swatches
    ///
    /// # Errors
    /// - `EmptyPaletteExport` when the palette has no colors
    pub fn svg(palette: &Palette, palette_name: &str) -> Result<String> {
        Self::ensure_colors(palette)?;

        let center = SVG_WIDTH / 2;
        let mut svg = format!(
            "<svg width=\"{w}\" height=\"{h}\" xmlns=\"http://www.w3.org/2000/svg\">\n\
             \x20 <rect width=\"{w}\" height=\"{h}\" fill=\"#f5f5f5\"/>\n\
             \x20 <text x=\"{c}\" y=\"30\" text-anchor=\"middle\" font-family=\"Arial\" font-size=\"16\" font-weight=\"bold\" fill=\"#333\">{title}</text>\n",
            w = SVG_WIDTH,
            h = SVG_HEIGHT,
            c = center,
            title = xml_escape(export_name(palette_name)),
        );

        for (index, color) in palette.colors.iter().enumerate() {
            let x = index as u32 * SWATCH_SIZE;
            let label_x = x + SWATCH_SIZE / 2;
            let hex = display_hex(&color.hex);
            svg.push_str(&format!(
                "  <rect x=\"{x}\" y=\"50\" width=\"{s}\" height=\"{s}\" fill=\"{hex}\"/>\n\
                 \x20 <text x=\"{lx}\" y=\"145\" text-anchor=\"middle\" font-family=\"Arial\" font-size=\"10\" fill=\"#333\">{hex}</text>\n\
                 \x20 <text x=\"{lx}\" y=\"160\" text-anchor=\"middle\" font-family=\"Arial\" font-size=\"8\" fill=\"#666\">{name}</text>\n\
                 \x20 <text x=\"{lx}\" y=\"175\" text-anchor=\"middle\" font-family=\"Arial\" font-size=\"8\" fill=\"#666\">{pct}%</text>\n",
                x = x,
                s = SWATCH_SIZE,
                lx = label_x,
                hex = hex,
                name = xml_escape(color_name(&color.name)),
                pct = format_percentage(color.percentage),
            ));
        }

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"195\" text-anchor=\"middle\" font-family=\"Arial\" font-size=\"10\" fill=\"#999\">{}</text>\n</svg>\n",
            center, SVG_FOOTER
        ));

        Ok(svg)
    }

    /// Render the representation for `kind`
    ///
    /// # Errors
    /// - `EmptyPaletteExport` when the palette has no colors
    pub fn render(kind: ExportKind, palette: &Palette, palette_name: &str) -> Result<String> {
        match kind {
            ExportKind::Text => Self::text(palette, palette_name),
            ExportKind::ColorsOnly => Self::hex_list(palette, palette_name),
            ExportKind::Image => Self::svg(palette, palette_name),
        }
    }

    /// Clipboard value for a whole palette: upper-cased hex codes joined with `", "`
    #[must_use]
    pub fn clipboard_text(palette: &Palette) -> String {
        palette
            .colors
            .iter()
            .map(|c| display_hex(&c.hex))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Artifact file name: every non-alphanumeric character becomes `_`
    ///
    /// ```rust
    /// use palettegen::export::{ExportFormatter, ExportKind};
    ///
    /// assert_eq!(
    ///     ExportFormatter::file_name("Mi Paleta!", ExportKind::Image),
    ///     "Mi_Paleta__palette.svg"
    /// );
    /// ```
    #[must_use]
    pub fn file_name(palette_name: &str, kind: ExportKind) -> String {
        let stem: String = export_name(palette_name)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        format!("{}{}", stem, kind.file_suffix())
    }
}

/// Transient export file, deleted when dropped
///
/// Two concurrent exports of the same palette name and kind share a file
/// name and can collide.
#[derive(Debug)]
pub struct ExportArtifact {
    path: PathBuf,
}

impl ExportArtifact {
    /// Write `contents` to `{dir}/{file_name}`
    ///
    /// # Errors
    /// - Directory cannot be created or file cannot be written
    pub async fn create(
        dir: &Path,
        palette_name: &str,
        kind: ExportKind,
        contents: &str,
    ) -> Result<Self> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| PaletteError::file_io_error("create export directory", dir, &e))?;

        let path = dir.join(ExportFormatter::file_name(palette_name, kind));
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| PaletteError::file_io_error("write export artifact", &path, &e))?;

        log::debug!("Wrote {} artifact to {}", kind, path.display());
        Ok(Self { path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ExportArtifact {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => log::debug!("Removed export artifact {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {},
            Err(e) => crate::tracing_config::events::cleanup_failed(&self.path, &e),
        }
    }
}

/// Render, write, share and clean up one export
///
/// # Errors
/// - `EmptyPaletteExport` when the palette has no colors
/// - `ShareUnavailable` when the platform cannot share
/// - I/O errors writing the artifact, or the share sheet's own failure
#[instrument(skip(palette, export_dir, sheet), fields(colors = palette.color_count()))]
pub async fn share_palette(
    palette: &Palette,
    palette_name: &str,
    kind: ExportKind,
    export_dir: &Path,
    sheet: &dyn ShareSheet,
) -> Result<()> {
    let contents = ExportFormatter::render(kind, palette, palette_name)?;

    if !sheet.is_available().await {
        return Err(PaletteError::ShareUnavailable);
    }

    let name = export_name(palette_name);
    let artifact = ExportArtifact::create(export_dir, name, kind, &contents).await?;
    let request = ShareRequest {
        path: artifact.path(),
        mime_type: kind.mime_type(),
        dialog_title: kind.dialog_title(name),
    };

    debug!(path = %artifact.path().display(), "Presenting share sheet");
    sheet.share(&request).await?;
    info!(kind = %kind, "Palette shared");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ColorEntry;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::TempDir;

    fn color(hex: &str, name: &str, percentage: f64) -> ColorEntry {
        ColorEntry {
            hex: hex.to_string(),
            name: name.to_string(),
            percentage,
        }
    }

    fn sample() -> Palette {
        Palette::transient(vec![
            color("#f5f5dc", "Beige", 35.0),
            color("#DEB887", "Burlywood", 24.96),
        ])
    }

    struct RecordingSheet {
        available: bool,
        fail: bool,
        seen: Mutex<Vec<(PathBuf, String, String, bool)>>,
    }

    impl RecordingSheet {
        fn new(available: bool, fail: bool) -> Self {
            Self {
                available,
                fail,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ShareSheet for RecordingSheet {
        async fn is_available(&self) -> bool {
            self.available
        }

        async fn share(&self, request: &ShareRequest<'_>) -> Result<()> {
            let contents = std::fs::read_to_string(request.path).unwrap_or_default();
            self.seen.lock().unwrap().push((
                request.path.to_path_buf(),
                request.mime_type.to_string(),
                request.dialog_title.clone(),
                !contents.is_empty(),
            ));
            if self.fail {
                Err(PaletteError::unknown_extraction("dismissed with error"))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_text_export_exact_format() {
        let palette = Palette::transient(vec![color("#ABCDEF", "Foo", 12.34)]);
        assert_eq!(
            ExportFormatter::text(&palette, "P").unwrap(),
            "🎨 P\n\n1. #ABCDEF - Foo (12.3%)\n\n📱 Generado con Generador de Paletas"
        );
    }

    #[test]
    fn test_text_export_numbering_and_zero_percentage() {
        let palette = Palette::transient(vec![
            color("#f5f5dc", "Beige", 35.0),
            color("#000000", "Black", 0.0),
        ]);
        let text = ExportFormatter::text(&palette, "Arena").unwrap();
        assert!(text.contains("1. #F5F5DC - Beige (35.0%)"));
        assert!(text.contains("2. #000000 - Black (0%)"));
    }

    #[test]
    fn test_hex_codes_uppercase_and_prefix() {
        let palette = Palette::transient(vec![color("abc123", "", 0.0), color("#DEF456", "", 0.0)]);
        assert_eq!(
            ExportFormatter::hex_codes(&palette).unwrap(),
            "#ABC123 • #DEF456"
        );
        assert_eq!(
            ExportFormatter::hex_list(&palette, "P").unwrap(),
            "🎨 P\n\n#ABC123 • #DEF456\n\n📱 Generado con Generador de Paletas"
        );
    }

    #[test]
    fn test_empty_palette_is_rejected_by_every_renderer() {
        let empty = Palette::empty();
        for kind in ExportKind::ALL {
            assert!(matches!(
                ExportFormatter::render(kind, &empty, "P"),
                Err(PaletteError::EmptyPaletteExport)
            ));
        }
    }

    #[test]
    fn test_svg_layout() {
        let svg = ExportFormatter::svg(&sample(), "Beach & <Sun>").unwrap();
        assert!(svg.starts_with("<svg width=\"400\" height=\"200\""));
        assert!(svg.contains("Beach &amp; &lt;Sun&gt;"));
        assert!(svg.contains(
            "<rect x=\"0\" y=\"50\" width=\"80\" height=\"80\" fill=\"#F5F5DC\"/>"
        ));
        assert!(svg.contains(
            "<rect x=\"80\" y=\"50\" width=\"80\" height=\"80\" fill=\"#DEB887\"/>"
        ));
        assert!(svg.contains(">25.0%</text>"));
        assert!(svg.contains(">Burlywood</text>"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg, ExportFormatter::svg(&sample(), "Beach & <Sun>").unwrap());
    }

    #[test]
    fn test_clipboard_text() {
        assert_eq!(ExportFormatter::clipboard_text(&sample()), "#F5F5DC, #DEB887");
    }

    #[test]
    fn test_file_names() {
        assert_eq!(
            ExportFormatter::file_name("Café Latte", ExportKind::Text),
            "Caf__Latte_palette.txt"
        );
        assert_eq!(
            ExportFormatter::file_name("", ExportKind::ColorsOnly),
            "Mi_Paleta_colors.txt"
        );
    }

    #[test]
    fn test_kind_metadata() {
        assert_eq!(ExportKind::Image.mime_type(), "image/svg+xml");
        assert_eq!(ExportKind::ColorsOnly.mime_type(), "text/plain");
        assert_eq!(
            ExportKind::ColorsOnly.dialog_title("Arena"),
            "Compartir colores de Arena"
        );
    }

    #[tokio::test]
    async fn test_artifact_removed_on_drop() {
        let dir = TempDir::new().unwrap();
        let artifact = ExportArtifact::create(dir.path(), "Arena", ExportKind::Text, "hola")
            .await
            .unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.file_name().unwrap(), "Arena_palette.txt");

        drop(artifact);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_share_palette_cleans_up_after_success() {
        let dir = TempDir::new().unwrap();
        let sheet = RecordingSheet::new(true, false);

        share_palette(&sample(), "Arena", ExportKind::Image, dir.path(), &sheet)
            .await
            .unwrap();

        let seen = sheet.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        let (path, mime, title, had_contents) = &seen[0];
        assert_eq!(mime, "image/svg+xml");
        assert_eq!(title, "Compartir imagen de Arena");
        assert!(had_contents);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_share_palette_cleans_up_after_failure() {
        let dir = TempDir::new().unwrap();
        let sheet = RecordingSheet::new(true, true);

        let result = share_palette(&sample(), "Arena", ExportKind::Text, dir.path(), &sheet).await;
        assert!(result.is_err());
        assert!(!dir.path().join("Arena_palette.txt").exists());
    }

    #[tokio::test]
    async fn test_share_palette_requires_available_sheet() {
        let dir = TempDir::new().unwrap();
        let sheet = RecordingSheet::new(false, false);

        let result = share_palette(&sample(), "Arena", ExportKind::Text, dir.path(), &sheet).await;
        assert!(matches!(result, Err(PaletteError::ShareUnavailable)));
        assert!(sheet.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_share_into_export_dir_is_rejected() {
        let dir = TempDir::new().unwrap();
        let sheet = crate::share::FileShareSheet::new(Some(dir.path().to_path_buf()));

        let result = share_palette(&sample(), "Arena", ExportKind::Text, dir.path(), &sheet).await;
        assert!(matches!(result, Err(PaletteError::InvalidConfig(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_share_empty_palette_never_writes() {
        let dir = TempDir::new().unwrap();
        let sheet = RecordingSheet::new(true, false);

        let result =
            share_palette(&Palette::empty(), "Arena", ExportKind::Text, dir.path(), &sheet).await;
        assert!(matches!(result, Err(PaletteError::EmptyPaletteExport)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
