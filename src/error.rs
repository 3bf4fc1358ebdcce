//! Error types for palette extraction, persistence and export operations

use thiserror::Error;

/// Result type alias for palette operations
pub type Result<T> = std::result::Result<T, PaletteError>;

/// Error taxonomy shared by every palette operation
///
/// None of these are fatal to the host application. Each user-triggered
/// operation (extract, save, delete, share, sign-in, sign-up) is expected to
/// catch its own failure, show [`PaletteError::user_message`] and leave prior
/// state untouched.
#[derive(Error, Debug)]
pub enum PaletteError {
    /// The color-analysis provider answered with a non-2xx status
    #[error("Transport error: provider returned HTTP {status_code}")]
    Transport { status_code: u16 },

    /// The provider response carried no usable `result.colors.image_colors`
    #[error("No colors found in provider response")]
    NoColorsFound,

    /// Any other fault while building, sending or reading an extraction request
    #[error("Extraction failed: {0}")]
    UnknownExtraction(String),

    /// An export was requested for a palette without colors
    #[error("Cannot export a palette without colors")]
    EmptyPaletteExport,

    /// The operation needs a signed-in user and none is present
    #[error("Authentication required")]
    AuthenticationRequired,

    /// The identity collaborator rejected a sign-in or sign-up attempt
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Opaque failure reported by the storage collaborator
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Palette failed save-time validation
    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    /// The platform offers no share mechanism
    #[error("Sharing is not available on this device")]
    ShareUnavailable,

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PaletteError {
    /// Create a new transport error for an HTTP status
    pub fn transport(status_code: u16) -> Self {
        Self::Transport { status_code }
    }

    /// Create a new unknown extraction error
    pub fn unknown_extraction<S: Into<String>>(msg: S) -> Self {
        Self::UnknownExtraction(msg.into())
    }

    /// Create a new persistence error
    pub fn persistence<S: Into<String>>(msg: S) -> Self {
        Self::Persistence(msg.into())
    }

    /// Create a new invalid palette error
    pub fn invalid_palette<S: Into<String>>(msg: S) -> Self {
        Self::InvalidPalette(msg.into())
    }

    /// Create a new authentication error
    pub fn authentication<S: Into<String>>(msg: S) -> Self {
        Self::Authentication(msg.into())
    }

    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create configuration error naming the parameter and its valid range
    pub fn config_value_error<T: std::fmt::Display>(
        parameter: &str,
        value: T,
        valid_range: &str,
        recommended: Option<T>,
    ) -> Self {
        let recommendation = match recommended {
            Some(rec) => format!(" Recommended: {}", rec),
            None => String::new(),
        };

        Self::InvalidConfig(format!(
            "Invalid {}: {} (valid range: {}).{}",
            parameter, value, valid_range, recommendation
        ))
    }

    /// True for the three errors the remote extractor can produce
    #[must_use]
    pub fn is_extraction_error(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::NoColorsFound | Self::UnknownExtraction(_)
        )
    }

    /// Localized message shown by the UI action handler that caught this error
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport { status_code } => format!("Error HTTP: {}", status_code),
            Self::NoColorsFound => "No se pudieron extraer colores de la imagen".to_string(),
            Self::UnknownExtraction(msg) if msg.is_empty() => "Error desconocido".to_string(),
            Self::UnknownExtraction(msg) => msg.clone(),
            Self::EmptyPaletteExport => "No hay colores para compartir".to_string(),
            Self::AuthenticationRequired => "Usuario no autenticado".to_string(),
            Self::Authentication(msg) => msg.clone(),
            Self::Persistence(msg) => format!("Error de almacenamiento: {}", msg),
            Self::InvalidPalette(msg) => msg.clone(),
            Self::ShareUnavailable => {
                "Tu dispositivo no soporta la función de compartir".to_string()
            },
            Self::InvalidConfig(msg) => format!("Configuración inválida: {}", msg),
            Self::Io(_) => "No se pudo completar la operación".to_string(),
        }
    }
}
