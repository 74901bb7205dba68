use plate_protocol::PlateColor;
use serde::{Deserialize, Serialize};

/// Diagram geometry and typography. Lengths are CSS pixels (96 per inch)
/// unless the field says otherwise; `well_radius` and `line_spacing` are
/// fractions of `cell_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub cell_size: f32,
    pub well_radius: f32,
    pub max_chars_per_line: usize,
    pub line_spacing: f32,
    pub max_font_size_pt: f32,
    pub min_font_size_pt: f32,
    pub axis_font_size_pt: f32,
    pub font_family: String,
    pub outline_color: PlateColor,
    pub label_color: PlateColor,
    pub background: PlateColor,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            cell_size: 50.0,
            well_radius: 0.4,
            max_chars_per_line: 6,
            line_spacing: 0.15,
            max_font_size_pt: 10.0,
            min_font_size_pt: 6.0,
            axis_font_size_pt: 10.0,
            font_family: "Arial, Helvetica, sans-serif".to_string(),
            outline_color: PlateColor::BLACK,
            label_color: PlateColor::BLACK,
            background: PlateColor::WHITE,
        }
    }
}

impl RenderSettings {
    pub fn radius_px(&self) -> f32 {
        self.well_radius * self.cell_size
    }

    pub fn line_spacing_px(&self) -> f32 {
        self.line_spacing * self.cell_size
    }
}

/// Points to CSS pixels.
pub fn pt_to_px(pt: f32) -> f32 {
    pt * 96.0 / 72.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: RenderSettings =
            serde_json::from_str(r##"{"cell_size": 40.0, "outline_color": "#808080"}"##).unwrap();
        assert_eq!(settings.cell_size, 40.0);
        assert_eq!(settings.max_chars_per_line, 6);
        assert_eq!(settings.outline_color, PlateColor::rgb(128, 128, 128));
        assert_eq!(settings.radius_px(), 16.0);
    }

    #[test]
    fn test_pt_to_px() {
        assert_eq!(pt_to_px(72.0), 96.0);
        assert_eq!(pt_to_px(9.0), 12.0);
    }
}
