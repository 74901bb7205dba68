use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("could not parse plate SVG: {0}")]
    Svg(#[from] resvg::usvg::Error),
    #[error("invalid raster resolution {0} dpi")]
    InvalidDpi(f32),
    #[error("a {width}x{height} raster is too large, lower the dpi")]
    TooLarge { width: u32, height: u32 },
    #[error("could not allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
}
