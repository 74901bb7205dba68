//! SVG to pixels via resvg.

use crate::error::RenderError;
use crate::plate::PlateDiagram;
use image::RgbaImage;
use resvg::{tiny_skia, usvg};
use std::sync::{Arc, OnceLock};

/// Diagram units are CSS pixels.
pub const SVG_UNITS_PER_INCH: f32 = 96.0;

/// Upper bound on raster pixels (400 MB as RGBA).
pub const MAX_RASTER_PIXELS: u64 = 100_000_000;

static FONT_DATABASE: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

// System fonts are scanned once per process.
fn font_database() -> Arc<usvg::fontdb::Database> {
    FONT_DATABASE
        .get_or_init(|| {
            let mut fontdb = usvg::fontdb::Database::new();
            fontdb.load_system_fonts();
            log::debug!("Loaded {} font face(s) for rasterization", fontdb.len());
            Arc::new(fontdb)
        })
        .clone()
}

/// Raster size in pixels of `diagram` at `dpi`.
pub fn raster_size(diagram: &PlateDiagram, dpi: f32) -> (u32, u32) {
    let scale = dpi / SVG_UNITS_PER_INCH;
    (
        (diagram.width() * scale).ceil().max(1.0) as u32,
        (diagram.height() * scale).ceil().max(1.0) as u32,
    )
}

/// Renders the diagram at `dpi` over its opaque background color.
pub fn rasterize(diagram: &PlateDiagram, dpi: f32) -> Result<RgbaImage, RenderError> {
    if !dpi.is_finite() || dpi <= 0.0 {
        return Err(RenderError::InvalidDpi(dpi));
    }
    let options = usvg::Options {
        fontdb: font_database(),
        ..usvg::Options::default()
    };
    let tree = usvg::Tree::from_str(&diagram.to_svg_string(), &options)?;

    let (width, height) = raster_size(diagram, dpi);
    if width as u64 * height as u64 > MAX_RASTER_PIXELS {
        return Err(RenderError::TooLarge { width, height });
    }
    let mut pixmap =
        tiny_skia::Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;
    let bg = diagram.background();
    pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, 255));

    let scale = dpi / SVG_UNITS_PER_INCH;
    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    log::debug!("Rasterized plate diagram at {dpi} dpi to {width}x{height} px");

    // Opaque background, so premultiplied and straight alpha coincide.
    RgbaImage::from_raw(width, height, pixmap.take()).ok_or(RenderError::Pixmap { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plate::{WellAppearance, render_plate};
    use crate::settings::RenderSettings;
    use plate_protocol::{PlateColor, WellId};

    fn red_a1(well: WellId) -> WellAppearance {
        if well.label() == "A1" {
            WellAppearance::new(PlateColor::rgb(255, 0, 0), "")
        } else {
            WellAppearance::empty()
        }
    }

    #[test]
    fn test_rasterize_scales_with_dpi() {
        let settings = RenderSettings::default();
        let diagram = render_plate(&red_a1, &settings);
        let image = rasterize(&diagram, 48.0).unwrap();
        assert_eq!(
            (image.width(), image.height()),
            raster_size(&diagram, 48.0)
        );
        assert_eq!(image.width(), (diagram.width() / 2.0).ceil() as u32);
    }

    #[test]
    fn test_rasterize_paints_well_fill() {
        let settings = RenderSettings::default();
        let diagram = render_plate(&red_a1, &settings);
        let image = rasterize(&diagram, 96.0).unwrap();
        let (cx, cy) = crate::plate::well_center(WellId::parse("A1").unwrap(), &settings);
        let pixel = image.get_pixel(cx as u32, cy as u32);
        assert_eq!(pixel.0, [255, 0, 0, 255]);
        let (cx, cy) = crate::plate::well_center(WellId::parse("B2").unwrap(), &settings);
        let pixel = image.get_pixel(cx as u32, cy as u32);
        assert_eq!(pixel.0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_rasterize_refuses_oversized_raster() {
        let diagram = render_plate(&red_a1, &RenderSettings::default());
        assert!(matches!(
            rasterize(&diagram, 65_535.0),
            Err(RenderError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_rasterize_rejects_bad_dpi() {
        let diagram = render_plate(&red_a1, &RenderSettings::default());
        assert!(matches!(
            rasterize(&diagram, 0.0),
            Err(RenderError::InvalidDpi(_))
        ));
    }
}
