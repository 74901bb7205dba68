//! Validated color values.
//!
//! Colors arrive as free text from the user (hex codes, CSS names, the short
//! matplotlib-style aliases). They are validated once here; the rest of the
//! workspace only ever handles a [`PlateColor`].

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("empty color")]
    Empty,
    #[error("'{0}' is not a recognizable color")]
    Unrecognized(String),
}

/// An RGBA color that passed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlateColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PlateColor {
    pub const WHITE: PlateColor = PlateColor::rgb(255, 255, 255);
    pub const BLACK: PlateColor = PlateColor::rgb(0, 0, 0);
    pub const NONE: PlateColor = PlateColor {
        r: 0,
        g: 0,
        b: 0,
        a: 0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn parse(text: &str) -> Result<Self, ColorError> {
        let norm = text.trim().to_ascii_lowercase();
        if norm.is_empty() {
            return Err(ColorError::Empty);
        }
        let unrecognized = || ColorError::Unrecognized(text.trim().to_string());
        if let Some(hex) = norm.strip_prefix('#') {
            return parse_hex(hex).ok_or_else(unrecognized);
        }
        if norm == "none" {
            return Ok(Self::NONE);
        }
        if let Some(rgb) = named_color(&norm) {
            return Ok(Self::rgb(rgb[0], rgb[1], rgb[2]));
        }
        parse_gray_level(&norm).ok_or_else(unrecognized)
    }

    /// Boundary validation: invalid or empty input becomes white, together
    /// with a warning for the user.
    pub fn parse_or_default(text: &str) -> (Self, Option<String>) {
        match Self::parse(text) {
            Ok(color) => (color, None),
            Err(e) => (
                Self::WHITE,
                Some(format!("Invalid color ({e}). Defaulting to white color.")),
            ),
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn opacity(&self) -> f32 {
        self.a as f32 / 255.0
    }

    /// `#rrggbb`, ignoring alpha. Suitable for SVG `fill` attributes.
    pub fn to_rgb_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_hex(&self) -> String {
        if self.is_opaque() {
            self.to_rgb_hex()
        } else {
            format!("{}{:02x}", self.to_rgb_hex(), self.a)
        }
    }
}

impl Default for PlateColor {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for PlateColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for PlateColor {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for PlateColor {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlateColor> for String {
    fn from(value: PlateColor) -> Self {
        value.to_hex()
    }
}

fn parse_hex(hex: &str) -> Option<PlateColor> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let digits = hex.as_bytes();
    let nibble = |i: usize| (digits[i] as char).to_digit(16).map(|v| v as u8);
    let byte = |i: usize| Some(nibble(i)? * 16 + nibble(i + 1)?);
    match hex.len() {
        3 | 4 => {
            let short = |i: usize| nibble(i).map(|v| v * 17);
            let a = if hex.len() == 4 { short(3)? } else { 255 };
            Some(PlateColor {
                r: short(0)?,
                g: short(1)?,
                b: short(2)?,
                a,
            })
        }
        6 | 8 => {
            let a = if hex.len() == 8 { byte(6)? } else { 255 };
            Some(PlateColor {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
                a,
            })
        }
        _ => None,
    }
}

// A float in [0, 1], exponent notation included, is a gray level.
fn parse_gray_level(text: &str) -> Option<PlateColor> {
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | '+' | '-'))
    {
        return None;
    }
    let level = text.parse::<f32>().ok()?;
    if !(0.0..=1.0).contains(&level) {
        return None;
    }
    let v = (level * 255.0).round() as u8;
    Some(PlateColor::rgb(v, v, v))
}

fn named_color(name: &str) -> Option<[u8; 3]> {
    let name = match name {
        "c0" => "tab:blue",
        "c1" => "tab:orange",
        "c2" => "tab:green",
        "c3" => "tab:red",
        "c4" => "tab:purple",
        "c5" => "tab:brown",
        "c6" => "tab:pink",
        "c7" => "tab:gray",
        "c8" => "tab:olive",
        "c9" => "tab:cyan",
        "tab:grey" => "tab:gray",
        other => other,
    };
    BASE_COLORS
        .iter()
        .chain(PALETTE_COLORS.iter())
        .chain(CSS_COLORS.iter())
        .find(|(key, _)| *key == name)
        .map(|(_, rgb)| *rgb)
}

// Single-letter shorthands.
const BASE_COLORS: &[(&str, [u8; 3])] = &[
    ("b", [0, 0, 255]),
    ("g", [0, 128, 0]),
    ("r", [255, 0, 0]),
    ("c", [0, 191, 191]),
    ("m", [191, 0, 191]),
    ("y", [191, 191, 0]),
    ("k", [0, 0, 0]),
    ("w", [255, 255, 255]),
];

const PALETTE_COLORS: &[(&str, [u8; 3])] = &[
    ("tab:blue", [0x1f, 0x77, 0xb4]),
    ("tab:orange", [0xff, 0x7f, 0x0e]),
    ("tab:green", [0x2c, 0xa0, 0x2c]),
    ("tab:red", [0xd6, 0x27, 0x28]),
    ("tab:purple", [0x94, 0x67, 0xbd]),
    ("tab:brown", [0x8c, 0x56, 0x4b]),
    ("tab:pink", [0xe3, 0x77, 0xc2]),
    ("tab:gray", [0x7f, 0x7f, 0x7f]),
    ("tab:olive", [0xbc, 0xbd, 0x22]),
    ("tab:cyan", [0x17, 0xbe, 0xcf]),
];

const CSS_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("grey", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(PlateColor::parse("#FF0000").unwrap(), PlateColor::rgb(255, 0, 0));
        assert_eq!(PlateColor::parse("#0f0").unwrap(), PlateColor::rgb(0, 255, 0));
        let translucent = PlateColor::parse("#0000ff80").unwrap();
        assert_eq!(translucent.a, 0x80);
        assert_eq!(translucent.to_hex(), "#0000ff80");
        assert_eq!(PlateColor::parse("#abcd").unwrap().a, 0xdd);
        assert!(PlateColor::parse("#12345").is_err());
        assert!(PlateColor::parse("#gggggg").is_err());
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!(PlateColor::parse(" SteelBlue ").unwrap().to_hex(), "#4682b4");
        assert_eq!(PlateColor::parse("k").unwrap(), PlateColor::BLACK);
        assert_eq!(PlateColor::parse("C1").unwrap().to_hex(), "#ff7f0e");
        assert_eq!(PlateColor::parse("tab:grey").unwrap().to_hex(), "#7f7f7f");
        assert_eq!(PlateColor::parse("0.5").unwrap(), PlateColor::rgb(128, 128, 128));
        assert!(PlateColor::parse("1.5").is_err());
        assert!(PlateColor::parse("-0.5").is_err());
    }

    #[test]
    fn test_parse_float_gray_and_none() {
        assert_eq!(PlateColor::parse("1e-1").unwrap(), PlateColor::rgb(26, 26, 26));
        assert_eq!(PlateColor::parse("1E0").unwrap(), PlateColor::WHITE);
        assert!(PlateColor::parse("2e0").is_err());
        let none = PlateColor::parse("None").unwrap();
        assert_eq!(none, PlateColor::NONE);
        assert!(!none.is_opaque());
        assert_eq!(none.to_hex(), "#00000000");
    }

    #[test]
    fn test_invalid_color_defaults_to_white_with_warning() {
        let (color, warning) = PlateColor::parse_or_default("notacolor");
        assert_eq!(color, PlateColor::WHITE);
        assert!(warning.unwrap().contains("Defaulting to white"));

        let (color, warning) = PlateColor::parse_or_default("");
        assert_eq!(color, PlateColor::WHITE);
        assert!(warning.is_some());

        let (color, warning) = PlateColor::parse_or_default("#FF0000");
        assert_eq!(color, PlateColor::rgb(255, 0, 0));
        assert!(warning.is_none());
    }

    #[test]
    fn test_serde_as_hex() {
        let json = serde_json::to_string(&PlateColor::rgb(1, 2, 3)).unwrap();
        assert_eq!(json, "\"#010203\"");
        let back: PlateColor = serde_json::from_str("\"navy\"").unwrap();
        assert_eq!(back, PlateColor::rgb(0, 0, 128));
        assert!(serde_json::from_str::<PlateColor>("\"nope\"").is_err());
    }
}
