//! Platform share collaborators
//!
//! [`ShareSheet`] hands a written export artifact to whatever the host uses
//! for sharing. [`ShareMenu`] asks the user which export representation to
//! produce; hosts pick one of two presentation strategies through
//! [`MenuStyle`].

use crate::{
    error::{PaletteError, Result},
    export::ExportKind,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// One share invocation
#[derive(Debug, Clone)]
pub struct ShareRequest<'a> {
    /// Export artifact, valid until `share` returns
    pub path: &'a Path,
    pub mime_type: &'static str,
    pub dialog_title: String,
}

/// Platform share capability
#[async_trait]
pub trait ShareSheet: Send + Sync {
    /// Whether the platform can share at all
    async fn is_available(&self) -> bool;

    /// Present the artifact to the user; resolves when the sheet is dismissed
    async fn share(&self, request: &ShareRequest<'_>) -> Result<()>;
}

/// Share sheet for terminal hosts
///
/// Copies the artifact to a destination (a directory or a file path), or
/// prints its contents to stdout when no destination is configured.
#[derive(Debug, Clone, Default)]
pub struct FileShareSheet {
    destination: Option<PathBuf>,
}

impl FileShareSheet {
    #[must_use]
    pub fn new(destination: Option<PathBuf>) -> Self {
        Self { destination }
    }

    /// Print artifacts to stdout
    #[must_use]
    pub fn stdout() -> Self {
        Self { destination: None }
    }

    /// Copy destination for `source`; `None` prints to stdout
    fn target_for(&self, source: &Path) -> Option<PathBuf> {
        let destination = self.destination.as_ref()?;
        if destination.is_dir() {
            source.file_name().map(|name| destination.join(name))
        } else {
            Some(destination.clone())
        }
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}

#[async_trait]
impl ShareSheet for FileShareSheet {
    async fn is_available(&self) -> bool {
        true
    }

    async fn share(&self, request: &ShareRequest<'_>) -> Result<()> {
        log::info!("{} ({})", request.dialog_title, request.mime_type);

        match self.target_for(request.path) {
            Some(target) => {
                // The artifact is deleted once sharing returns
                if is_same_file(&target, request.path) {
                    return Err(PaletteError::invalid_config(format!(
                        "Export destination '{}' is the temporary export file itself",
                        target.display()
                    )));
                }
                tokio::fs::copy(request.path, &target)
                    .await
                    .map_err(|e| PaletteError::file_io_error("copy export to", &target, &e))?;
                log::info!("Export saved to {}", target.display());
            },
            None => {
                let contents = tokio::fs::read_to_string(request.path)
                    .await
                    .map_err(|e| PaletteError::file_io_error("read export", request.path, &e))?;
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", contents)?;
                stdout.flush()?;
            },
        }
        Ok(())
    }
}

/// Presentation strategy of the export-choice menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuStyle {
    /// Bottom sheet with a title and an indexed option list
    ActionSheet,
    /// Modal dialog with labelled buttons
    Dialog,
}

impl MenuStyle {
    /// Style native to the platform this binary was built for
    #[must_use]
    pub fn native() -> Self {
        if cfg!(any(target_os = "ios", target_os = "macos")) {
            Self::ActionSheet
        } else {
            Self::Dialog
        }
    }
}

/// Asks the user which export representation to produce
pub trait ShareMenu: Send {
    /// Present the choice for `palette_name`; `None` means the user cancelled
    fn choose(&mut self, palette_name: &str) -> Result<Option<ExportKind>>;
}

const CANCEL_LABEL: &str = "Cancelar";

fn sheet_label(kind: ExportKind) -> &'static str {
    match kind {
        ExportKind::Text => "Compartir como texto",
        ExportKind::ColorsOnly => "Solo colores",
        ExportKind::Image => "Como imagen",
    }
}

fn button_label(kind: ExportKind) -> &'static str {
    match kind {
        ExportKind::Text => "Como texto",
        ExportKind::ColorsOnly => "Solo colores",
        ExportKind::Image => "Como imagen",
    }
}

fn read_answer<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Action-sheet menu: option 0 cancels, options 1-3 pick a representation
pub struct ActionSheetMenu<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead + Send, W: Write + Send> ActionSheetMenu<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead + Send, W: Write + Send> ShareMenu for ActionSheetMenu<R, W> {
    fn choose(&mut self, palette_name: &str) -> Result<Option<ExportKind>> {
        writeln!(self.writer, "Compartir paleta \"{}\"", palette_name)?;
        writeln!(self.writer, "  0. {}", CANCEL_LABEL)?;
        for (index, kind) in ExportKind::ALL.iter().enumerate() {
            writeln!(self.writer, "  {}. {}", index + 1, sheet_label(*kind))?;
        }
        write!(self.writer, "> ")?;
        self.writer.flush()?;

        let Some(answer) = read_answer(&mut self.reader)? else {
            return Ok(None);
        };

        Ok(answer
            .parse::<usize>()
            .ok()
            .and_then(|index| index.checked_sub(1))
            .and_then(|index| ExportKind::ALL.get(index).copied()))
    }
}

/// Dialog menu: the user types a button label or its number
pub struct DialogMenu<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead + Send, W: Write + Send> DialogMenu<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead + Send, W: Write + Send> ShareMenu for DialogMenu<R, W> {
    fn choose(&mut self, palette_name: &str) -> Result<Option<ExportKind>> {
        writeln!(self.writer, "Compartir Paleta")?;
        writeln!(
            self.writer,
            "Selecciona cómo quieres compartir \"{}\"",
            palette_name
        )?;

        let buttons: Vec<String> = std::iter::once(CANCEL_LABEL)
            .chain(ExportKind::ALL.iter().map(|k| button_label(*k)))
            .enumerate()
            .map(|(index, label)| format!("[{}] {}", index, label))
            .collect();
        writeln!(self.writer, "{}", buttons.join("  "))?;
        write!(self.writer, "> ")?;
        self.writer.flush()?;

        let Some(answer) = read_answer(&mut self.reader)? else {
            return Ok(None);
        };

        if let Ok(index) = answer.parse::<usize>() {
            return Ok(index
                .checked_sub(1)
                .and_then(|i| ExportKind::ALL.get(i).copied()));
        }

        Ok(ExportKind::ALL
            .iter()
            .copied()
            .find(|kind| button_label(*kind).eq_ignore_ascii_case(&answer)))
    }
}

/// Build the menu for `style` over the given terminal streams
pub fn share_menu<'a, R, W>(style: MenuStyle, reader: R, writer: W) -> Box<dyn ShareMenu + 'a>
where
    R: BufRead + Send + 'a,
    W: Write + Send + 'a,
{
    match style {
        MenuStyle::ActionSheet => Box::new(ActionSheetMenu::new(reader, writer)),
        MenuStyle::Dialog => Box::new(DialogMenu::new(reader, writer)),
    }
}
