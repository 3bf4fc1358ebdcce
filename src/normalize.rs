//! Palette normalization service
//!
//! Every palette produced by an extractor, the mock generator or read back
//! from storage passes through here before it is shown, saved or exported,
//! so downstream consumers never re-check hex prefixes or bounds.

use crate::{
    color::normalize_hex,
    error::{PaletteError, Result},
    types::{ColorEntry, Palette, RawColor, DEFAULT_COLOR_NAME, MAX_COLORS},
};

/// Service that reshapes raw colors into the canonical [`Palette`]
pub struct PaletteNormalizer;

impl PaletteNormalizer {
    /// Normalize raw colors into a transient palette
    ///
    /// Keeps input order, truncates to [`MAX_COLORS`], never deduplicates and
    /// never rounds percentages. An empty input yields an empty palette,
    /// which is valid for display but rejected by [`Self::validate_for_save`].
    ///
    /// # Examples
    /// ```rust
    /// use palettegen::{normalize::PaletteNormalizer, types::RawColor};
    ///
    /// let palette = PaletteNormalizer::normalize(vec![RawColor::new("abc123", "Teal", 12.34)]);
    /// assert_eq!(palette.colors[0].hex, "#abc123");
    /// assert_eq!(palette.colors[0].percentage, 12.34);
    /// ```
    #[must_use]
    pub fn normalize(raw: Vec<RawColor>) -> Palette {
        Palette::transient(Self::normalize_colors(raw))
    }

    /// Normalize and truncate a color sequence without wrapping it in a palette
    #[must_use]
    pub fn normalize_colors(raw: Vec<RawColor>) -> Vec<ColorEntry> {
        let total = raw.len();
        if total > MAX_COLORS {
            log::debug!("Truncating {} colors to {}", total, MAX_COLORS);
        }

        raw.into_iter()
            .take(MAX_COLORS)
            .map(Self::normalize_entry)
            .collect()
    }

    /// Re-apply normalization to a palette read back from storage, keeping its metadata
    #[must_use]
    pub fn renormalize(palette: Palette) -> Palette {
        let colors = palette.colors.into_iter().map(RawColor::from).collect();
        Palette {
            colors: Self::normalize_colors(colors),
            ..palette
        }
    }

    /// Canonicalize a single raw color
    #[must_use]
    pub fn normalize_entry(raw: RawColor) -> ColorEntry {
        let hex = normalize_hex(raw.hex.as_deref().unwrap_or_default());
        let name = raw
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_COLOR_NAME.to_string());
        let percentage = Self::clamp_percentage(raw.percentage.unwrap_or(0.0));

        ColorEntry {
            hex,
            name,
            percentage,
        }
    }

    /// Bound a percentage to `[0, 100]`; non-finite values become 0
    #[must_use]
    pub fn clamp_percentage(percentage: f64) -> f64 {
        if percentage.is_finite() {
            percentage.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    /// Check that a palette can be saved under `name`, returning the trimmed name
    ///
    /// # Errors
    /// - Name empty after trimming
    /// - Palette has no colors
    pub fn validate_for_save(palette: &Palette, name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PaletteError::invalid_palette(
                "Por favor ingresa un nombre para la paleta",
            ));
        }

        if palette.is_empty() {
            return Err(PaletteError::invalid_palette(
                "La paleta no tiene colores para guardar",
            ));
        }

        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(hex: &str, pct: f64) -> RawColor {
        RawColor::new(hex, "Swatch", pct)
    }

    #[test]
    fn test_prefixes_and_keeps_existing_prefix() {
        let palette = PaletteNormalizer::normalize(vec![raw("abc123", 10.0), raw("#DEF456", 5.0)]);
        let hexes: Vec<&str> = palette.colors.iter().map(|c| c.hex.as_str()).collect();
        assert_eq!(hexes, vec!["#abc123", "#DEF456"]);
    }

    #[test]
    fn test_truncates_to_cap_preserving_order() {
        let input: Vec<RawColor> = (0..8)
            .map(|i| raw(&format!("00000{}", i), f64::from(i)))
            .collect();

        let palette = PaletteNormalizer::normalize(input);
        assert_eq!(palette.colors.len(), MAX_COLORS);
        for (i, color) in palette.colors.iter().enumerate() {
            assert_eq!(color.hex, format!("#00000{}", i));
        }
    }

    #[test]
    fn test_does_not_deduplicate() {
        let palette =
            PaletteNormalizer::normalize(vec![raw("#FFFFFF", 40.0), raw("#ffffff", 10.0)]);
        assert_eq!(palette.colors.len(), 2);
    }

    #[test]
    fn test_default_name_and_percentage() {
        let entry = PaletteNormalizer::normalize_entry(RawColor {
            hex: Some("123456".to_string()),
            name: Some("   ".to_string()),
            percentage: None,
        });
        assert_eq!(entry.name, DEFAULT_COLOR_NAME);
        assert_eq!(entry.percentage, 0.0);
    }

    #[test]
    fn test_percentage_passed_through_unrounded_but_bounded() {
        let palette = PaletteNormalizer::normalize(vec![
            raw("#111111", 12.3456),
            raw("#222222", 150.0),
            raw("#333333", -2.0),
        ]);
        assert_eq!(palette.colors[0].percentage, 12.3456);
        assert_eq!(palette.colors[1].percentage, 100.0);
        assert_eq!(palette.colors[2].percentage, 0.0);
    }

    #[test]
    fn test_empty_input_is_transient_empty_palette() {
        let palette = PaletteNormalizer::normalize(Vec::new());
        assert!(palette.is_empty());
        assert!(PaletteNormalizer::validate_for_save(&palette, "Playa").is_err());
    }

    #[test]
    fn test_validate_for_save() {
        let palette = PaletteNormalizer::normalize(vec![raw("#F5F5DC", 100.0)]);
        assert_eq!(
            PaletteNormalizer::validate_for_save(&palette, "  Playa  ").unwrap(),
            "Playa"
        );

        let err = PaletteNormalizer::validate_for_save(&palette, "   ").unwrap_err();
        assert!(matches!(err, PaletteError::InvalidPalette(_)));
    }

    #[test]
    fn test_renormalize_keeps_metadata() {
        let mut palette = PaletteNormalizer::normalize(vec![raw("#F5F5DC", 100.0)]);
        palette.name = "Arena".to_string();
        palette.colors[0].hex = "f5f5dc".to_string();

        let fixed = PaletteNormalizer::renormalize(palette);
        assert_eq!(fixed.name, "Arena");
        assert_eq!(fixed.colors[0].hex, "#f5f5dc");
    }
}
