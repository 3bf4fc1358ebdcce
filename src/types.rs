//! Core palette data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum number of swatches a palette may hold
pub const MAX_COLORS: usize = 5;

/// Label used when the provider supplies no usable color name
pub const DEFAULT_COLOR_NAME: &str = "Color";

/// One swatch within a palette
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// Canonical `#RRGGBB` code
    pub hex: String,
    /// Human-readable label, never empty
    pub name: String,
    /// Estimated share of the source image, in `[0, 100]`
    pub percentage: f64,
}

impl ColorEntry {
    /// Upper-cased hex code for display and clipboard use
    #[must_use]
    pub fn display_hex(&self) -> String {
        crate::color::display_hex(&self.hex)
    }
}

/// Identifier assigned to a palette by the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaletteId(String);

impl PaletteId {
    #[must_use]
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// Fresh random identifier for stores that assign their own ids
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaletteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaletteId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PaletteId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An ordered sequence of color entries plus save metadata
///
/// In-memory palettes produced by an extractor have no `id`, owner or
/// timestamp; those are filled in by the persistence collaborator on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Palette {
    /// Assigned on save, absent for transient palettes
    pub id: Option<PaletteId>,
    /// User-chosen name, empty until the palette is saved
    pub name: String,
    /// Identity of the creating user, set at save time
    pub owner_id: Option<String>,
    /// Display name of the creating user at save time
    pub owner_name: Option<String>,
    /// Swatches in provider relevance order, at most [`MAX_COLORS`]
    pub colors: Vec<ColorEntry>,
    /// Assigned by the persistence collaborator
    pub created_at: Option<DateTime<Utc>>,
}

impl Palette {
    /// Build an unsaved palette from already-normalized colors
    #[must_use]
    pub fn transient(colors: Vec<ColorEntry>) -> Self {
        Self {
            id: None,
            name: String::new(),
            owner_id: None,
            owner_name: None,
            colors,
            created_at: None,
        }
    }

    /// Empty placeholder shown before an extraction completes
    #[must_use]
    pub fn empty() -> Self {
        Self::transient(Vec::new())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[must_use]
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Whether the palette has been persisted
    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Sum of all swatch percentages (provider rounding means this need not be 100)
    #[must_use]
    pub fn total_percentage(&self) -> f64 {
        self.colors.iter().map(|c| c.percentage).sum()
    }

    /// Save timestamp formatted for listings
    #[must_use]
    pub fn created_at_display(&self) -> String {
        match self.created_at {
            Some(ts) => ts.format("%-d %b %Y, %H:%M").to_string(),
            None => "Fecha desconocida".to_string(),
        }
    }
}

/// One provider-supplied (or mock) color before normalization
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColor {
    pub hex: Option<String>,
    pub name: Option<String>,
    pub percentage: Option<f64>,
}

impl RawColor {
    #[must_use]
    pub fn new<H: Into<String>, N: Into<String>>(hex: H, name: N, percentage: f64) -> Self {
        Self {
            hex: Some(hex.into()),
            name: Some(name.into()),
            percentage: Some(percentage),
        }
    }
}

impl From<ColorEntry> for RawColor {
    fn from(entry: ColorEntry) -> Self {
        Self {
            hex: Some(entry.hex),
            name: Some(entry.name),
            percentage: Some(entry.percentage),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(hex: &str, percentage: f64) -> ColorEntry {
        ColorEntry {
            hex: hex.to_string(),
            name: "Tan".to_string(),
            percentage,
        }
    }

    #[test]
    fn test_transient_palette() {
        let palette = Palette::transient(vec![entry("#d2b48c", 60.0), entry("#F4A460", 39.5)]);
        assert!(!palette.is_saved());
        assert!(!palette.is_empty());
        assert_eq!(palette.color_count(), 2);
        assert!((palette.total_percentage() - 99.5).abs() < f64::EPSILON);
        assert_eq!(palette.colors[0].display_hex(), "#D2B48C");
    }

    #[test]
    fn test_created_at_display() {
        let mut palette = Palette::empty();
        assert_eq!(palette.created_at_display(), "Fecha desconocida");

        palette.created_at = Some(Utc.with_ymd_and_hms(2024, 3, 7, 18, 5, 0).unwrap());
        assert_eq!(palette.created_at_display(), "7 Mar 2024, 18:05");
    }

    #[test]
    fn test_palette_id_roundtrip_through_json() {
        let id = PaletteId::new("abc");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"abc\"");
        assert_eq!(id.to_string(), "abc");
        assert_ne!(PaletteId::generate(), PaletteId::generate());
    }
}
