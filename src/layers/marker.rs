use crate::{
    core::{geo::LatLng, projection},
    MapError, Result,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A point of interest owned by the host.
///
/// The renderer only reads `id` and `position`; `name` and `address` are the
/// display payload shown in the popup card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub position: LatLng,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
}

impl Marker {
    pub fn new(id: impl Into<String>, position: LatLng) -> Self {
        Self {
            id: id.into(),
            position,
            name: String::new(),
            address: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    /// Markers with non-finite coordinates are skipped by rendering and hit-testing
    pub fn is_renderable(&self) -> bool {
        self.position.is_finite()
    }

    /// Position ready for projection
    pub fn projected_position(&self) -> LatLng {
        projection::normalize(self.position)
    }

    /// Label for lists and popups, falling back to the id
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// Parses a JSON array of markers
pub fn markers_from_json(json: &str) -> Result<Vec<Marker>> {
    Ok(serde_json::from_str(json)?)
}

/// Reads a JSON array of markers from disk
pub fn load_markers(path: impl AsRef<Path>) -> Result<Vec<Marker>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    markers_from_json(&json).map_err(|e| match e {
        MapError::Serialization(inner) => {
            MapError::Config(format!("{}: {}", path.display(), inner))
        }
        other => other,
    })
}

/// Visual state of a marker, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MarkerState {
    Default,
    Hovered,
    Clicked,
    Selected,
}

impl MarkerState {
    /// Resolves the state of `id`: selected > clicked > hovered > default
    pub fn resolve(
        id: &str,
        selected: Option<&str>,
        clicked: Option<&str>,
        hovered: Option<&str>,
    ) -> Self {
        if selected == Some(id) {
            MarkerState::Selected
        } else if clicked == Some(id) {
            MarkerState::Clicked
        } else if hovered == Some(id) {
            MarkerState::Hovered
        } else {
            MarkerState::Default
        }
    }

    pub fn is_active(&self) -> bool {
        *self != MarkerState::Default
    }
}
