use crate::core::{
    config::TileConfig,
    constants::{DEFAULT_ATTRIBUTION, DEFAULT_TILE_URL},
    geo::TileCoord,
};

/// Trait representing anything that can produce tile URLs for a given coordinate.
pub trait TileSource: Send + Sync {
    /// Build a URL for the requested `coord`, which is already wrapped and clamped.
    fn url(&self, coord: TileCoord) -> String;

    /// Credit line the provider requires to be shown on the map.
    fn attribution(&self) -> &str;
}

/// Source that fills `{z}`, `{x}` and `{y}` in a URL template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplateSource {
    template: String,
    attribution: String,
}

impl UrlTemplateSource {
    pub fn new(template: impl Into<String>, attribution: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            attribution: attribution.into(),
        }
    }

    /// The default OpenStreetMap tile server.
    pub fn openstreetmap() -> Self {
        Self::new(DEFAULT_TILE_URL, DEFAULT_ATTRIBUTION)
    }

    pub fn from_config(config: &TileConfig) -> Self {
        Self::new(config.url_template.clone(), config.attribution.clone())
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Default for UrlTemplateSource {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

impl TileSource for UrlTemplateSource {
    fn url(&self, coord: TileCoord) -> String {
        self.template
            .replace("{z}", &coord.z.to_string())
            .replace("{x}", &coord.x.to_string())
            .replace("{y}", &coord.y.to_string())
    }

    fn attribution(&self) -> &str {
        &self.attribution
    }
}
