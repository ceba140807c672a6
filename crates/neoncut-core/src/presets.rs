// crates/neoncut-core/src/presets.rs
//
// Built-in one-click looks offered by the side panel. Each preset is just a
// VisualPatch, so applying one goes through the ordinary commit path and is
// undoable like any other property edit.

use crate::patch::{TextStylePatch, VisualPatch};

pub struct TextPreset {
    pub name:        &'static str,
    pub font_size:   f32,
    pub color:       [u8; 4],
    pub font_family: &'static str,
}

pub const TEXT_PRESETS: &[TextPreset] = &[
    TextPreset { name: "Default Text", font_size: 120.0, color: [0xff, 0xff, 0xff, 0xff], font_family: "Arial" },
    TextPreset { name: "Yellow Bold",  font_size: 140.0, color: [0xfa, 0xcc, 0x15, 0xff], font_family: "Impact" },
    TextPreset { name: "Neon Blue",    font_size: 130.0, color: [0x22, 0xd3, 0xee, 0xff], font_family: "Verdana" },
    TextPreset { name: "Red Warning",  font_size: 150.0, color: [0xef, 0x44, 0x44, 0xff], font_family: "Arial" },
    TextPreset { name: "Subtle Grey",  font_size:  80.0, color: [0xa1, 0xa1, 0xaa, 0xff], font_family: "Courier New" },
];

impl TextPreset {
    pub fn patch(&self) -> VisualPatch {
        VisualPatch {
            text: Some(TextStylePatch {
                content:     None,
                font_size:   Some(self.font_size),
                color:       Some(self.color),
                font_family: Some(self.font_family.to_string()),
            }),
            ..VisualPatch::default()
        }
    }
}

/// Color-grade preset: brightness, contrast, saturation, hue.
pub struct FilterPreset {
    pub name:       &'static str,
    pub brightness: f32,
    pub contrast:   f32,
    pub saturation: f32,
    pub hue:        f32,
}

pub const FILTER_PRESETS: &[FilterPreset] = &[
    FilterPreset { name: "None",    brightness: 1.0, contrast: 1.0, saturation: 1.0, hue:   0.0 },
    FilterPreset { name: "Vivid",   brightness: 1.1, contrast: 1.2, saturation: 1.3, hue:   0.0 },
    FilterPreset { name: "Noir",    brightness: 1.0, contrast: 1.2, saturation: 0.0, hue:   0.0 },
    FilterPreset { name: "Vintage", brightness: 0.9, contrast: 0.9, saturation: 0.8, hue:  30.0 },
    FilterPreset { name: "Cool",    brightness: 1.0, contrast: 1.0, saturation: 1.0, hue: 180.0 },
    FilterPreset { name: "Warm",    brightness: 1.1, contrast: 1.0, saturation: 1.2, hue: -20.0 },
];

impl FilterPreset {
    pub fn patch(&self) -> VisualPatch {
        VisualPatch {
            brightness: Some(self.brightness),
            contrast:   Some(self.contrast),
            saturation: Some(self.saturation),
            hue:        Some(self.hue),
            ..VisualPatch::default()
        }
    }
}

/// Fade-in / fade-out pair.
pub fn fade_patch(fade_in: f64, fade_out: f64) -> VisualPatch {
    VisualPatch { fade_in: Some(fade_in), fade_out: Some(fade_out), ..VisualPatch::default() }
}

pub fn text_preset(name: &str) -> Option<&'static TextPreset> {
    TEXT_PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

pub fn filter_preset(name: &str) -> Option<&'static FilterPreset> {
    FILTER_PRESETS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::VisualProperties;

    #[test]
    fn noir_desaturates_without_touching_position() {
        let mut v = VisualProperties { x: 40.0, ..VisualProperties::default() };
        filter_preset("noir").unwrap().patch().apply_to(&mut v);
        assert_eq!(v.saturation, 0.0);
        assert_eq!(v.contrast, 1.2);
        assert_eq!(v.x, 40.0);
    }

    #[test]
    fn text_preset_sets_style_but_keeps_content() {
        let mut v = VisualProperties::default();
        v.text.content = Some("Hello".into());
        text_preset("Yellow Bold").unwrap().patch().apply_to(&mut v);
        assert_eq!(v.text.font_family, "Impact");
        assert_eq!(v.text.content.as_deref(), Some("Hello"));
    }

    #[test]
    fn unknown_preset_is_none() {
        assert!(filter_preset("Sepia").is_none());
    }
}
