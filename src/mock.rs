//! Deterministic placeholder palettes for development and offline demos
//!
//! Nothing here is used automatically when remote extraction fails. Hosts
//! opt in explicitly, so "no palette" stays distinguishable from "fake
//! palette".

use crate::{
    error::Result,
    extractor::{ColorExtractor, ImageHandle},
    normalize::PaletteNormalizer,
    types::{Palette, RawColor},
};
use async_trait::async_trait;

/// Warm neutral swatch set returned by [`mock_palette`]
const MOCK_COLORS: [(&str, &str, f64); 5] = [
    ("#F5F5DC", "Beige", 35.0),
    ("#DEB887", "Burlywood", 25.0),
    ("#D2B48C", "Tan", 20.0),
    ("#F4A460", "Sandy Brown", 15.0),
    ("#CD853F", "Peru", 5.0),
];

/// Curated palettes shown on the exploration surface
const SHOWCASE: [(&str, &str, [&str; 5]); 3] = [
    (
        "showcase-1",
        "Sunset Beach",
        ["#F5F5DC", "#F4A460", "#DEB887", "#D2B48C", "#8D6E63"],
    ),
    (
        "showcase-2",
        "Café Latte",
        ["#D2B48C", "#F5F5DC", "#5D4037", "#DEB887", "#F4A460"],
    ),
    (
        "showcase-3",
        "Tierra y Arena",
        ["#DEB887", "#F5F5DC", "#8D6E63", "#D2B48C", "#F4A460"],
    ),
];

/// Five fixed warm-neutral entries whose percentages sum to 100
///
/// ```rust
/// use palettegen::mock::mock_palette;
///
/// let palette = mock_palette();
/// assert_eq!(palette.colors.len(), 5);
/// assert_eq!(palette.total_percentage(), 100.0);
/// ```
#[must_use]
pub fn mock_palette() -> Palette {
    let raw = MOCK_COLORS
        .iter()
        .map(|(hex, name, pct)| RawColor::new(*hex, *name, *pct))
        .collect();
    PaletteNormalizer::normalize(raw)
}

/// Built-in example palettes with fixed ids and no owner
///
/// The showcase carries no percentages; each swatch gets an equal share.
#[must_use]
pub fn showcase_palettes() -> Vec<Palette> {
    SHOWCASE
        .iter()
        .map(|(id, name, hexes)| {
            let share = 100.0 / hexes.len() as f64;
            let raw = hexes
                .iter()
                .map(|hex| RawColor {
                    hex: Some((*hex).to_string()),
                    name: None,
                    percentage: Some(share),
                })
                .collect();

            let mut palette = PaletteNormalizer::normalize(raw);
            palette.id = Some((*id).into());
            palette.name = (*name).to_string();
            palette
        })
        .collect()
}

/// Extractor that ignores its input and returns [`mock_palette`]
#[derive(Debug, Default, Clone, Copy)]
pub struct MockExtractor;

impl MockExtractor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ColorExtractor for MockExtractor {
    async fn extract(&self, image: &ImageHandle) -> Result<Palette> {
        tracing::debug!(image = %image, "Returning mock palette");
        Ok(mock_palette())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
