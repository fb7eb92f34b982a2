use crate::{
    core::constants::{PIN_SIZE, PIN_SIZE_ACTIVE},
    layers::marker::MarkerState,
    rendering::context::{Color, Stroke},
};
use serde::{Deserialize, Serialize};

/// Style for marker pins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerStyle {
    /// Pin diameter in the default state
    pub size: f32,
    /// Pin diameter when hovered, clicked or selected
    pub active_size: f32,
    pub default_color: Color,
    pub clicked_color: Color,
    pub selected_color: Color,
    /// Hovered pins keep the default colour and only grow
    pub outline_color: Color,
    pub outline_width: f32,
    pub glyph_color: Color,
    pub shadow_color: Color,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: PIN_SIZE,
            active_size: PIN_SIZE_ACTIVE,
            default_color: Color::rgb(0xfb, 0x92, 0x3c),
            clicked_color: Color::rgb(0xf9, 0x73, 0x16),
            selected_color: Color::rgb(0xea, 0x58, 0x0c),
            outline_color: Color::WHITE,
            outline_width: 3.0,
            glyph_color: Color::WHITE,
            shadow_color: Color::rgba(0, 0, 0, 51),
        }
    }
}

/// Resolved geometry and colours for one pin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinStyle {
    pub diameter: f32,
    pub fill: Color,
    pub outline: Stroke,
    pub glyph: Color,
    pub shadow: Color,
}

impl MarkerStyle {
    pub fn pin(&self, state: MarkerState) -> PinStyle {
        let fill = match state {
            MarkerState::Selected => self.selected_color,
            MarkerState::Clicked => self.clicked_color,
            MarkerState::Hovered | MarkerState::Default => self.default_color,
        };
        let diameter = if state.is_active() {
            self.active_size
        } else {
            self.size
        };
        PinStyle {
            diameter,
            fill,
            outline: Stroke::new(self.outline_width, self.outline_color),
            glyph: self.glyph_color,
            shadow: self.shadow_color,
        }
    }
}
