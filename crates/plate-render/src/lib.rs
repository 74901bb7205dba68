//! Headless rendering of a 96-well plate layout: an SVG diagram built from
//! per-well appearances, plus rasterization of that diagram.

pub mod error;
pub mod label;
pub mod plate;
pub mod raster;
pub mod settings;

pub use error::RenderError;
pub use label::{LabelLayout, layout_label, wrap_label};
pub use plate::{PlateDiagram, WellAppearance, WellSource, canvas_size, render_plate, well_center};
pub use raster::{MAX_RASTER_PIXELS, SVG_UNITS_PER_INCH, raster_size, rasterize};
pub use settings::{RenderSettings, pt_to_px};
