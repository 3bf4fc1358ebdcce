//! Remote palette extraction against the color-analysis provider
//!
//! This module builds an authenticated multipart request from an image,
//! submits it once to the provider's `/colors` endpoint, and turns the
//! `result.colors.image_colors` list into a normalized [`Palette`].
//! No retry is attempted; failures surface to the caller immediately.

use crate::{
    config::ExtractorConfig,
    error::{PaletteError, Result},
    normalize::PaletteNormalizer,
    types::{Palette, RawColor},
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::{
    header::AUTHORIZATION,
    multipart::{Form, Part},
    Client,
};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Multipart field carrying the image bytes
pub const IMAGE_FIELD: &str = "image";
/// File name announced for the uploaded image
pub const IMAGE_FILE_NAME: &str = "image.jpg";
/// Content type announced for the uploaded image
pub const IMAGE_MIME: &str = "image/jpeg";

/// JSON pointer to the provider's ordered color list
const IMAGE_COLORS_POINTER: &str = "/result/colors/image_colors";

/// Opaque handle to image bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageHandle {
    /// Image stored on the local filesystem
    Path(PathBuf),
    /// Image already held in memory
    Bytes(Vec<u8>),
}

impl ImageHandle {
    /// Load the referenced image bytes
    ///
    /// No format validation happens here; the provider is the source of truth
    /// for rejecting malformed images.
    ///
    /// # Errors
    /// - File cannot be read
    /// - Image is empty
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        let bytes = match self {
            Self::Path(path) => tokio::fs::read(path)
                .await
                .map_err(|e| PaletteError::file_io_error("read image file", path, &e))?,
            Self::Bytes(bytes) => bytes.clone(),
        };

        if bytes.is_empty() {
            return Err(PaletteError::unknown_extraction(format!(
                "Image is empty: {}",
                self
            )));
        }

        Ok(bytes)
    }
}

impl std::fmt::Display for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<{} bytes in memory>", bytes.len()),
        }
    }
}

impl From<PathBuf> for ImageHandle {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<u8>> for ImageHandle {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

/// Source of palettes for an image
///
/// The remote provider and the mock generator both implement this, so hosts
/// choose the source explicitly instead of silently falling back.
#[async_trait]
pub trait ColorExtractor: Send + Sync {
    /// Extract a normalized palette from an image
    ///
    /// # Errors
    /// - `Transport` for a non-2xx provider status
    /// - `NoColorsFound` when the response carries no colors
    /// - `UnknownExtraction` for any other fault
    async fn extract(&self, image: &ImageHandle) -> Result<Palette>;

    /// Short name used in logs and diagnostics
    fn name(&self) -> &'static str;
}

/// One entry of `result.colors.image_colors`
///
/// Fields are read leniently: a missing or mistyped field is `None` and the
/// normalizer fills in its default.
#[derive(Debug, Clone, Default)]
struct ProviderColor {
    html_code: Option<String>,
    percent: Option<f64>,
    closest_palette_color_parent: Option<String>,
    closest_palette_color: Option<String>,
    name: Option<String>,
}

fn text_field(entry: &Value, key: &str) -> Option<String> {
    entry.get(key).and_then(Value::as_str).map(str::to_string)
}

fn number_field(entry: &Value, key: &str) -> Option<f64> {
    match entry.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl ProviderColor {
    fn from_value(entry: &Value) -> Self {
        Self {
            html_code: text_field(entry, "html_code"),
            percent: number_field(entry, "percent"),
            closest_palette_color_parent: text_field(entry, "closest_palette_color_parent"),
            closest_palette_color: text_field(entry, "closest_palette_color"),
            name: text_field(entry, "name"),
        }
    }

    /// First non-empty name in provider priority order
    fn best_name(&self) -> Option<String> {
        [
            &self.closest_palette_color_parent,
            &self.closest_palette_color,
            &self.name,
        ]
        .into_iter()
        .flatten()
        .find(|n| !n.trim().is_empty())
        .cloned()
    }

    fn into_raw(self) -> RawColor {
        RawColor {
            name: self.best_name(),
            hex: self.html_code,
            percentage: self.percent,
        }
    }
}

/// Build the `Authorization` header value for a key/secret pair
///
/// ```rust
/// use palettegen::extractor::basic_auth_header;
///
/// assert_eq!(basic_auth_header("key", "secret"), "Basic a2V5OnNlY3JldA==");
/// ```
#[must_use]
pub fn basic_auth_header(api_key: &str, api_secret: &str) -> String {
    format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", api_key, api_secret))
    )
}

/// Parse a provider response body into raw colors
///
/// Keeps the first `max_colors` entries in provider order; extras are
/// discarded, never re-sorted.
///
/// # Errors
/// - `UnknownExtraction` when the body is not JSON
/// - `NoColorsFound` when the color list is missing, not a list or empty
pub fn parse_colors_response(body: &str, max_colors: usize) -> Result<Vec<RawColor>> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        PaletteError::unknown_extraction(format!("Invalid provider response: {}", e))
    })?;

    let entries = value
        .pointer(IMAGE_COLORS_POINTER)
        .and_then(Value::as_array)
        .ok_or(PaletteError::NoColorsFound)?;

    if entries.is_empty() {
        return Err(PaletteError::NoColorsFound);
    }

    Ok(entries
        .iter()
        .take(max_colors)
        .map(|entry| ProviderColor::from_value(entry).into_raw())
        .collect())
}

/// Extractor backed by the remote color-analysis provider
#[derive(Debug)]
pub struct RemoteExtractor {
    client: Client,
    config: ExtractorConfig,
    auth_header: String,
}

impl RemoteExtractor {
    /// Create a new remote extractor
    ///
    /// # Errors
    /// - Invalid configuration (missing credentials, bad URL)
    /// - Failed to create HTTP client
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            PaletteError::invalid_config(format!("Failed to create HTTP client: {}", e))
        })?;

        let auth_header = basic_auth_header(&config.api_key, &config.api_secret);
        Ok(Self {
            client,
            config,
            auth_header,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Submit the image and return the raw response body
    async fn submit(&self, bytes: Vec<u8>) -> Result<String> {
        let url = self.config.colors_endpoint();
        debug!(url = %url, size = bytes.len(), "Submitting image to color provider");

        let part = Part::bytes(bytes)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_MIME)
            .map_err(|e| PaletteError::unknown_extraction(e.to_string()))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .multipart(form)
            .send()
            .await
            .map_err(|e| PaletteError::unknown_extraction(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Color provider rejected request");
            return Err(PaletteError::transport(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| PaletteError::unknown_extraction(e.to_string()))
    }
}

#[async_trait]
impl ColorExtractor for RemoteExtractor {
    #[instrument(skip(self, image), fields(image = %image))]
    async fn extract(&self, image: &ImageHandle) -> Result<Palette> {
        let bytes = image.read_bytes().await.map_err(|e| match e {
            PaletteError::UnknownExtraction(_) => e,
            other => PaletteError::unknown_extraction(other.to_string()),
        })?;

        let body = self.submit(bytes).await?;
        let raw = parse_colors_response(&body, self.config.max_colors)?;
        let palette = PaletteNormalizer::normalize(raw);

        info!(colors = palette.color_count(), "Palette extracted");
        Ok(palette)
    }

    fn name(&self) -> &'static str {
        "remote"
    }
}
