//! Subscriber setup plus span and event helpers shared by the library and CLI
//!
//! The library only emits events; installing a subscriber is left to the
//! binary (or to embedders through [`TracingConfig::init`]).

#[cfg(feature = "cli")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TracingFormat {
    /// Colored human-readable output (CLI default)
    Console,
    /// Plain output for CI logs
    Compact,
    /// One JSON object per event
    #[cfg(feature = "tracing-json")]
    Json,
}

/// Tracing configuration builder
#[derive(Debug)]
pub struct TracingConfig {
    /// Verbosity level (maps to log levels)
    pub verbosity: u8,
    pub format: TracingFormat,
    /// Environment filter string (overrides verbosity if set)
    pub env_filter: Option<String>,
    /// Identifier logged once at startup for correlating a CLI run
    pub session_id: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            verbosity: 0,
            format: TracingFormat::Console,
            env_filter: None,
            session_id: None,
        }
    }
}

impl TracingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_env_filter<S: Into<String>>(mut self, filter: S) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    pub fn with_session_id<S: Into<String>>(mut self, session_id: S) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Convert verbosity level to tracing filter string
    pub fn verbosity_to_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Install the global subscriber
    #[cfg(feature = "cli")]
    pub fn init(self) -> anyhow::Result<()> {
        use tracing_subscriber::fmt;

        let filter = match &self.env_filter {
            Some(env_filter) => EnvFilter::try_new(env_filter)?,
            None => EnvFilter::try_new(self.verbosity_to_filter())?,
        };
        let registry = Registry::default().with(filter);

        match self.format {
            TracingFormat::Console => {
                let fmt_layer = fmt::layer()
                    .with_ansi(true)
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            TracingFormat::Compact => {
                let fmt_layer = fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .compact();
                registry.with(fmt_layer).try_init()?;
            },
            #[cfg(feature = "tracing-json")]
            TracingFormat::Json => {
                let fmt_layer = fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr);
                registry.with(fmt_layer).try_init()?;
            },
        }

        if let Some(session_id) = &self.session_id {
            tracing::debug!(session_id = %session_id, "🎨 Palette session started");
        }

        Ok(())
    }
}

/// CLI tracing settings; `RUST_LOG` wins over `-v` flags
pub fn cli_tracing_config(verbosity: u8, format: TracingFormat) -> TracingConfig {
    let mut config = TracingConfig::new()
        .with_verbosity(verbosity)
        .with_format(format)
        .with_session_id(uuid::Uuid::new_v4().to_string());

    if let Ok(filter) = std::env::var("RUST_LOG") {
        config = config.with_env_filter(filter);
    }
    config
}

/// Initialize tracing with CLI defaults
#[cfg(feature = "cli")]
pub fn init_cli_tracing(verbosity: u8, format: TracingFormat) -> anyhow::Result<()> {
    cli_tracing_config(verbosity, format).init()
}

/// Span creation helpers for palette operations
pub mod spans {
    use tracing::{Level, Span};

    /// Span around one extraction request
    pub fn extraction(extractor: &str, image: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "extraction",
            extractor = %extractor,
            image = %image
        )
    }

    /// Span around a store call
    pub fn persistence(operation: &str, owner_id: &str) -> Span {
        tracing::span!(
            Level::DEBUG,
            "persistence",
            operation = %operation,
            owner_id = %owner_id
        )
    }

    /// Span around one export and share
    pub fn export(kind: &str, palette_name: &str) -> Span {
        tracing::span!(
            Level::INFO,
            "export",
            kind = %kind,
            palette_name = %palette_name
        )
    }
}

/// Event helpers for common logging patterns
pub mod events {
    use tracing::{error, info, warn};

    /// User-facing progress update
    pub fn progress(message: &str, emoji: &str) {
        info!("{} {}", emoji, message);
    }

    pub fn error_with_context(error: &dyn std::error::Error, context: &str) {
        error!(
            error = %error,
            context = %context,
            "❌ Operation failed"
        );
    }

    /// A transient file could not be removed
    pub fn cleanup_failed(path: &std::path::Path, error: &dyn std::error::Error) {
        warn!(
            path = %path.display(),
            error = %error,
            "⚠️  Cleanup failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_mapping() {
        assert_eq!(TracingConfig::new().with_verbosity(0).verbosity_to_filter(), "info");
        assert_eq!(TracingConfig::new().with_verbosity(1).verbosity_to_filter(), "debug");
        assert_eq!(TracingConfig::new().with_verbosity(2).verbosity_to_filter(), "trace");
        assert_eq!(TracingConfig::new().with_verbosity(7).verbosity_to_filter(), "trace");
    }

    #[test]
    fn test_config_builder() {
        let config = TracingConfig::new()
            .with_verbosity(1)
            .with_format(TracingFormat::Compact)
            .with_env_filter("palettegen=trace")
            .with_session_id("run-1");

        assert_eq!(config.verbosity, 1);
        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.env_filter.as_deref(), Some("palettegen=trace"));
        assert_eq!(config.session_id.as_deref(), Some("run-1"));
    }

    #[test]
    fn test_cli_config_keeps_requested_format() {
        let config = cli_tracing_config(2, TracingFormat::Compact);
        assert_eq!(config.format, TracingFormat::Compact);
        assert_eq!(config.verbosity, 2);
        assert!(config.session_id.is_some());
    }

    #[test]
    fn test_spans_construct_without_subscriber() {
        let _ = spans::extraction("remote", "photo.jpg");
        let _ = spans::persistence("list", "u1");
        let _ = spans::export("text", "Arena");
    }
}
