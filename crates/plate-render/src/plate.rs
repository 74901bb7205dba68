use crate::label::layout_label;
use crate::settings::{RenderSettings, pt_to_px};
use plate_protocol::{COLUMN_COUNT, PlateColor, ROW_COUNT, ROW_LETTERS, WellId};
use svg::Document;
use svg::node::element::{Circle, Group, Line, Rectangle, Text};

const MARGIN_LEFT: f32 = 44.0;
const MARGIN_TOP: f32 = 16.0;
const MARGIN_RIGHT: f32 = 16.0;
const MARGIN_BOTTOM: f32 = 40.0;
const TICK_LENGTH: f32 = 5.0;
const TICK_LABEL_GAP: f32 = 4.0;

/// What a single well looks like once its owner has been resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WellAppearance {
    pub color: PlateColor,
    pub label: String,
}

impl WellAppearance {
    pub fn new(color: PlateColor, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
        }
    }

    /// Unassigned: white, no label.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Anything that can tell the renderer how each well should look.
pub trait WellSource {
    fn appearance(&self, well: WellId) -> WellAppearance;
}

impl<F> WellSource for F
where
    F: Fn(WellId) -> WellAppearance,
{
    fn appearance(&self, well: WellId) -> WellAppearance {
        self(well)
    }
}

/// A rendered plate, kept as an SVG document until someone serializes or
/// rasterizes it. Sizes are CSS pixels.
#[derive(Debug, Clone)]
pub struct PlateDiagram {
    document: Document,
    width: f32,
    height: f32,
    background: PlateColor,
    labelled_wells: usize,
}

impl PlateDiagram {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn background(&self) -> PlateColor {
        self.background
    }

    pub fn labelled_wells(&self) -> usize {
        self.labelled_wells
    }

    pub fn to_svg_string(&self) -> String {
        self.document.to_string()
    }
}

pub fn canvas_size(settings: &RenderSettings) -> (f32, f32) {
    (
        MARGIN_LEFT + settings.cell_size * COLUMN_COUNT as f32 + MARGIN_RIGHT,
        MARGIN_TOP + settings.cell_size * ROW_COUNT as f32 + MARGIN_BOTTOM,
    )
}

/// Row A is the top row regardless of iteration order.
pub fn well_center(well: WellId, settings: &RenderSettings) -> (f32, f32) {
    (
        column_x(well.column_index(), settings),
        row_y(well.row_index(), settings),
    )
}

fn column_x(column_index: usize, settings: &RenderSettings) -> f32 {
    MARGIN_LEFT + (column_index as f32 + 0.5) * settings.cell_size
}

fn row_y(row_index: usize, settings: &RenderSettings) -> f32 {
    MARGIN_TOP + (row_index as f32 + 0.5) * settings.cell_size
}

fn axis_text(content: String, x: f32, y: f32, anchor: &str, settings: &RenderSettings) -> Text {
    Text::new(content)
        .set("x", x)
        .set("y", y)
        .set("text-anchor", anchor)
        .set("dominant-baseline", "central")
        .set("font-family", settings.font_family.as_str())
        .set("font-size", pt_to_px(settings.axis_font_size_pt))
        .set("fill", settings.label_color.to_rgb_hex())
}

fn draw_axes(mut doc: Document, settings: &RenderSettings) -> Document {
    let plot_width = settings.cell_size * COLUMN_COUNT as f32;
    let plot_height = settings.cell_size * ROW_COUNT as f32;
    let plot_bottom = MARGIN_TOP + plot_height;
    let stroke = settings.outline_color.to_rgb_hex();

    doc = doc.add(
        Rectangle::new()
            .set("x", MARGIN_LEFT)
            .set("y", MARGIN_TOP)
            .set("width", plot_width)
            .set("height", plot_height)
            .set("fill", "none")
            .set("stroke", stroke.as_str())
            .set("stroke-width", 1),
    );

    let label_offset = TICK_LENGTH + TICK_LABEL_GAP + pt_to_px(settings.axis_font_size_pt) * 0.5;
    for column_index in 0..COLUMN_COUNT {
        let x = column_x(column_index, settings);
        doc = doc
            .add(
                Line::new()
                    .set("x1", x)
                    .set("y1", plot_bottom)
                    .set("x2", x)
                    .set("y2", plot_bottom + TICK_LENGTH)
                    .set("stroke", stroke.as_str())
                    .set("stroke-width", 1),
            )
            .add(axis_text(
                (column_index + 1).to_string(),
                x,
                plot_bottom + label_offset,
                "middle",
                settings,
            ));
    }

    for (row_index, letter) in ROW_LETTERS.iter().enumerate() {
        let y = row_y(row_index, settings);
        doc = doc
            .add(
                Line::new()
                    .set("x1", MARGIN_LEFT - TICK_LENGTH)
                    .set("y1", y)
                    .set("x2", MARGIN_LEFT)
                    .set("y2", y)
                    .set("stroke", stroke.as_str())
                    .set("stroke-width", 1),
            )
            .add(axis_text(
                letter.to_string(),
                MARGIN_LEFT - TICK_LENGTH - TICK_LABEL_GAP,
                y,
                "end",
                settings,
            ));
    }
    doc
}

fn draw_well(well: WellId, appearance: &WellAppearance, settings: &RenderSettings) -> Group {
    let (cx, cy) = well_center(well, settings);
    let mut circle = Circle::new()
        .set("id", format!("well-{well}"))
        .set("cx", cx)
        .set("cy", cy)
        .set("r", settings.radius_px())
        .set("fill", appearance.color.to_rgb_hex())
        .set("stroke", settings.outline_color.to_rgb_hex())
        .set("stroke-width", 1);
    if !appearance.color.is_opaque() {
        circle = circle.set("fill-opacity", appearance.color.opacity());
    }
    let mut group = Group::new().add(circle);

    if let Some(layout) = layout_label(&appearance.label, settings) {
        let font_px = pt_to_px(layout.font_size_pt);
        for (line, offset) in layout.lines.iter().zip(layout.offsets.iter()) {
            group = group.add(
                Text::new(line.clone())
                    .set("x", cx)
                    .set("y", cy + offset)
                    .set("text-anchor", "middle")
                    .set("dominant-baseline", "central")
                    .set("font-family", settings.font_family.as_str())
                    .set("font-size", font_px)
                    .set("fill", settings.label_color.to_rgb_hex()),
            );
        }
    }
    group
}

pub fn render_plate<S: WellSource + ?Sized>(source: &S, settings: &RenderSettings) -> PlateDiagram {
    let (width, height) = canvas_size(settings);
    let mut doc = Document::new()
        .set("viewBox", (0, 0, width, height))
        .set("width", width)
        .set("height", height)
        .add(
            Rectangle::new()
                .set("x", 0)
                .set("y", 0)
                .set("width", width)
                .set("height", height)
                .set("fill", settings.background.to_rgb_hex()),
        );

    let mut labelled_wells = 0usize;
    for well in WellId::all() {
        let appearance = source.appearance(well);
        if !appearance.label.trim().is_empty() {
            labelled_wells += 1;
        }
        doc = doc.add(draw_well(well, &appearance, settings));
    }
    doc = draw_axes(doc, settings);

    log::debug!(
        "Rendered plate diagram {width}x{height} px with {labelled_wells} labelled well(s)"
    );

    PlateDiagram {
        document: doc,
        width,
        height,
        background: settings.background,
        labelled_wells,
    }
}
