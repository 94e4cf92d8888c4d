//! Viewer configuration: which assets can be picked and which colors the
//! palette offers.

use std::path::PathBuf;

use crate::{error::ViewerResult, gfx::color::Color};

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    /// Candidate asset URLs; the first one is loaded on start
    pub asset_urls: Vec<String>,
    pub palette: Vec<Color>,
    /// Directory relative asset URLs are resolved against
    pub base_dir: PathBuf,
}

impl ViewerConfig {
    /// Config with the given assets and the default palette
    pub fn new<I, S>(asset_urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            asset_urls: asset_urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = palette;
        self
    }

    /// Replaces the palette with colors parsed from `#rgb`/`#rrggbb` strings.
    pub fn with_palette_hex<I, S>(mut self, palette: I) -> ViewerResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.palette = palette
            .into_iter()
            .map(|hex| Color::from_hex(hex.as_ref()))
            .collect::<Result<_, _>>()?;
        Ok(self)
    }

    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }

    /// Color initially shown in the color picker
    pub fn initial_color(&self) -> Color {
        self.palette.first().copied().unwrap_or_default()
    }
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            asset_urls: [
                "models/Chair.glb",
                "models/GeoPlanter.glb",
                "models/Mixer.glb",
                "models/RobotExpressive.glb",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            palette: vec![
                Color::from_hex_u32(0xff0000),
                Color::from_hex_u32(0x00ff00),
                Color::from_hex_u32(0x0000ff),
            ],
            base_dir: PathBuf::from("."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewerError;

    #[test]
    fn test_default_config_lists_bundled_models() {
        let config = ViewerConfig::default();
        assert_eq!(config.asset_urls[0], "models/Chair.glb");
        assert_eq!(config.asset_urls.len(), 4);
        assert_eq!(config.initial_color().to_hex(), "#ff0000");
    }

    #[test]
    fn test_palette_hex_rejects_bad_entries() {
        let result = ViewerConfig::new(["a.glb"]).with_palette_hex(["#fff", "nope"]);
        assert!(matches!(result, Err(ViewerError::InvalidColor(_))));
    }

    #[test]
    fn test_empty_palette_falls_back_to_white() {
        let config = ViewerConfig::new(Vec::<String>::new()).with_palette(Vec::new());
        assert_eq!(config.initial_color(), Color::WHITE);
    }
}
