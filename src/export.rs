//! CSV and JPEG export of the current plate.

use crate::registry::CategoryRegistry;
use crate::resolver;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use image::{Rgb, RgbImage, RgbaImage, imageops};
use plate_protocol::{COLUMN_COUNT, PlateColor, ROW_LETTERS, WellId};
use plate_render::{PlateDiagram, RenderError, rasterize};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

// Channel difference still treated as background when cropping.
const CROP_TOLERANCE: u8 = 8;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("CSV writer error: {0}")]
    CsvWriter(String),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),
    #[error("dpi {0} does not fit the JPEG density header")]
    DpiOutOfRange(u32),
    #[error("could not write '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// What goes into the grid cells of the CSV.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CsvFill {
    #[default]
    Blank,
    CategoryNames,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub dpi: u32,
    pub jpeg_quality: u8,
    pub crop_padding_in: f32,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dpi: 300,
            jpeg_quality: 90,
            crop_padding_in: 0.1,
        }
    }
}

/// Header row `,1,...,12`, then one row per plate row `A` to `H`.
pub fn plate_csv(registry: &CategoryRegistry, fill: CsvFill) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(vec![]);
    let mut header = vec![String::new()];
    header.extend((1..=COLUMN_COUNT).map(|c| c.to_string()));
    writer.write_record(&header)?;

    for (row_index, letter) in ROW_LETTERS.iter().enumerate() {
        let mut record = vec![letter.to_string()];
        for column_index in 0..COLUMN_COUNT {
            let cell = match (fill, WellId::from_indices(row_index, column_index)) {
                (CsvFill::CategoryNames, Some(well)) => resolver::resolve(registry, well).label,
                _ => String::new(),
            };
            record.push(cell);
        }
        writer.write_record(&record)?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::CsvWriter(e.to_string()))
}

/// Smallest rectangle holding every non-background pixel, grown by `pad`
/// pixels and clamped to the image. Returns `(x, y, width, height)`.
pub fn content_bounds(image: &RgbImage, background: PlateColor, pad: u32) -> (u32, u32, u32, u32) {
    let bg = [background.r, background.g, background.b];
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, pixel) in image.enumerate_pixels() {
        let differs = pixel
            .0
            .iter()
            .zip(bg.iter())
            .any(|(p, b)| p.abs_diff(*b) > CROP_TOLERANCE);
        if !differs {
            continue;
        }
        bounds = Some(match bounds {
            None => (x, y, x, y),
            Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
        });
    }
    let Some((x0, y0, x1, y1)) = bounds else {
        return (0, 0, image.width(), image.height());
    };
    let left = x0.saturating_sub(pad);
    let top = y0.saturating_sub(pad);
    let right = x1.saturating_add(pad).min(image.width() - 1);
    let bottom = y1.saturating_add(pad).min(image.height() - 1);
    (left, top, right - left + 1, bottom - top + 1)
}

fn flatten(rgba: &RgbaImage, background: PlateColor) -> RgbImage {
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let blend = |c: u8, bg: u8| {
            ((c as u32 * a as u32 + bg as u32 * (255 - a as u32)) / 255) as u8
        };
        rgb.put_pixel(
            x,
            y,
            Rgb([blend(r, background.r), blend(g, background.g), blend(b, background.b)]),
        );
    }
    rgb
}

/// Rasterizes the diagram, crops it to its content and encodes a JPEG that
/// records the resolution in its density header.
pub fn plate_jpeg(diagram: &PlateDiagram, settings: &ExportSettings) -> Result<Vec<u8>, ExportError> {
    let density = u16::try_from(settings.dpi).map_err(|_| ExportError::DpiOutOfRange(settings.dpi))?;
    let rgba = rasterize(diagram, settings.dpi as f32)?;
    let background = diagram.background();
    let rgb = flatten(&rgba, background);

    // Padding past the raster edge crops nothing, so clamp it there.
    let pad_px = (settings.crop_padding_in.max(0.0) * settings.dpi as f32).round();
    let pad = pad_px.min(rgb.width().max(rgb.height()) as f32) as u32;
    let (x, y, width, height) = content_bounds(&rgb, background, pad);
    let cropped = imageops::crop_imm(&rgb, x, y, width, height).to_image();
    log::debug!(
        "Cropped {}x{} raster to {width}x{height} at ({x}, {y})",
        rgb.width(),
        rgb.height()
    );

    let mut bytes = vec![];
    {
        let mut encoder =
            JpegEncoder::new_with_quality(&mut bytes, settings.jpeg_quality.clamp(1, 100));
        encoder.set_pixel_density(PixelDensity::dpi(density));
        encoder.encode_image(&cropped)?;
    }
    Ok(bytes)
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    std::fs::write(path, bytes).map_err(|source| ExportError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn write_csv(
    path: &Path,
    registry: &CategoryRegistry,
    fill: CsvFill,
) -> Result<usize, ExportError> {
    let bytes = plate_csv(registry, fill)?;
    write_bytes(path, &bytes)?;
    log::info!("Wrote plate CSV ({} bytes) to '{}'", bytes.len(), path.display());
    Ok(bytes.len())
}

pub fn write_jpeg(
    path: &Path,
    diagram: &PlateDiagram,
    settings: &ExportSettings,
) -> Result<usize, ExportError> {
    let bytes = plate_jpeg(diagram, settings)?;
    write_bytes(path, &bytes)?;
    log::info!(
        "Wrote plate JPEG ({} bytes, {} dpi) to '{}'",
        bytes.len(),
        settings.dpi,
        path.display()
    );
    Ok(bytes.len())
}
