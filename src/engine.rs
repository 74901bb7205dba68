use crate::{
    error::EngineError,
    export::{self, CsvFill, ExportSettings},
    registry::CategoryRegistry,
};
use itertools::Itertools;
use plate_protocol::{COLUMN_COUNT, PlateColor, ROW_LETTERS, WELL_COUNT, WellId};
use plate_render::{PlateDiagram, RenderSettings, render_plate};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

pub type OpId = String;
pub type RunId = String;

/// What assigning a well that another category already owns does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapPolicy {
    /// Keep both claims; the earlier category wins when resolving.
    #[default]
    Allow,
    /// Refuse the assignment.
    Reject,
    /// Take the wells away from their current owners first.
    Reassign,
}

impl OverlapPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Allow => "allow",
            Self::Reject => "reject",
            Self::Reassign => "reassign",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "allow" => Some(Self::Allow),
            "reject" => Some(Self::Reject),
            "reassign" => Some(Self::Reassign),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateParameters {
    pub overlap_policy: OverlapPolicy,
    pub render: RenderSettings,
    pub export: ExportSettings,
}

/// Everything a session knows. Lives as long as the session; never saved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlateState {
    pub registry: CategoryRegistry,
    #[serde(default)]
    pub parameters: PlateParameters,
}

impl PlateState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&self) -> PlateDiagram {
        render_plate(&self.registry, &self.parameters.render)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    AssignWells {
        name: String,
        color: String,
        wells: Vec<String>,
    },
    ResetWell {
        well: String,
    },
    SetParameter {
        name: String,
        value: Value,
    },
    ExportCsv {
        path: String,
        #[serde(default)]
        fill: CsvFill,
    },
    ExportImage {
        path: String,
        #[serde(default)]
        dpi: Option<u32>,
    },
}

fn default_run_id() -> RunId {
    "workflow".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    #[serde(default = "default_run_id")]
    pub run_id: RunId,
    pub ops: Vec<Operation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpResult {
    pub op_id: OpId,
    pub changed: bool,
    pub warnings: Vec<String>,
    pub messages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationRecord {
    pub run_id: RunId,
    pub op: Operation,
    pub result: OpResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Capabilities {
    pub protocol_version: String,
    pub rows: Vec<String>,
    pub columns: usize,
    pub supported_operations: Vec<String>,
    pub supported_parameters: Vec<String>,
    pub supported_export_formats: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub color: String,
    pub wells: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSummary {
    pub category_count: usize,
    pub assigned_well_count: usize,
    pub free_well_count: usize,
    pub overlap_policy: OverlapPolicy,
    pub categories: Vec<CategorySummary>,
}

// Inches.
const MAX_CROP_PADDING_IN: f32 = 10.0;

const SUPPORTED_PARAMETERS: &[&str] = &[
    "overlap_policy",
    "dpi",
    "jpeg_quality",
    "crop_padding_in",
    "cell_size",
    "well_radius",
    "max_chars_per_line",
    "line_spacing",
    "max_font_size_pt",
    "min_font_size_pt",
    "font_family",
    "outline_color",
];

pub trait Engine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError>;
    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError>;
    fn snapshot(&self) -> &PlateState;
}

#[derive(Debug, Clone, Default)]
pub struct PlateEngine {
    state: PlateState,
    journal: Vec<OperationRecord>,
    op_counter: u64,
}

impl PlateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_state(state: PlateState) -> Self {
        Self {
            state,
            ..Self::default()
        }
    }

    pub fn into_state(self) -> PlateState {
        self.state
    }

    pub fn state(&self) -> &PlateState {
        &self.state
    }

    pub fn capabilities() -> Capabilities {
        Capabilities {
            protocol_version: "v1".to_string(),
            rows: ROW_LETTERS.iter().map(|c| c.to_string()).collect(),
            columns: COLUMN_COUNT,
            supported_operations: vec![
                "AssignWells".to_string(),
                "ResetWell".to_string(),
                "SetParameter".to_string(),
                "ExportCsv".to_string(),
                "ExportImage".to_string(),
            ],
            supported_parameters: SUPPORTED_PARAMETERS.iter().map(|s| s.to_string()).collect(),
            supported_export_formats: vec!["CSV".to_string(), "JPEG".to_string()],
        }
    }

    pub fn operation_log(&self) -> &[OperationRecord] {
        &self.journal
    }

    pub fn render(&self) -> PlateDiagram {
        self.state.render()
    }

    pub fn summarize_state(&self) -> StateSummary {
        let categories = self
            .state
            .registry
            .list_active()
            .into_iter()
            .map(|c| CategorySummary {
                name: c.name().to_string(),
                color: c.color().to_hex(),
                wells: c.well_labels(),
            })
            .collect::<Vec<_>>();
        let assigned = self.state.registry.assigned_well_count();
        StateSummary {
            category_count: categories.len(),
            assigned_well_count: assigned,
            free_well_count: WELL_COUNT - assigned,
            overlap_policy: self.state.parameters.overlap_policy,
            categories,
        }
    }

    /// One "Category: .., Color: .., Wells: .." line per active category.
    pub fn display_lines(&self) -> Vec<String> {
        self.state
            .registry
            .list_active()
            .into_iter()
            .map(|c| c.display_line())
            .collect()
    }

    /// Plate as text: each well shows the 1-based position of its owning
    /// category in the display order, `.` when free.
    pub fn text_grid(&self) -> String {
        let registry = &self.state.registry;
        let mut out = format!(
            "   {}\n",
            (1..=COLUMN_COUNT).map(|c| format!("{c:>3}")).join("")
        );
        for (row_index, letter) in ROW_LETTERS.iter().enumerate() {
            let cells = (0..COLUMN_COUNT)
                .map(|column_index| {
                    WellId::from_indices(row_index, column_index)
                        .and_then(|well| registry.iter().position(|c| c.contains(well)))
                        .map(|idx| format!("{:>3}", idx + 1))
                        .unwrap_or_else(|| format!("{:>3}", "."))
                })
                .join("");
            out.push_str(&format!("{letter}  {cells}\n"));
        }
        out
    }

    fn next_op_id(&mut self) -> OpId {
        self.op_counter += 1;
        format!("op-{}", self.op_counter)
    }

    fn parse_wells(labels: &[String]) -> Result<Vec<WellId>, EngineError> {
        let mut wells: Vec<WellId> = Vec::with_capacity(labels.len());
        for label in labels {
            let well = WellId::parse(label)?;
            if !wells.contains(&well) {
                wells.push(well);
            }
        }
        Ok(wells)
    }

    fn value_f32(name: &str, value: &Value) -> Result<f32, EngineError> {
        value
            .as_f64()
            .filter(|v| v.is_finite())
            .map(|v| v as f32)
            .ok_or_else(|| EngineError::invalid_input(format!("{name} requires a number")))
    }

    fn value_positive_f32(name: &str, value: &Value) -> Result<f32, EngineError> {
        let v = Self::value_f32(name, value)?;
        if v <= 0.0 {
            return Err(EngineError::invalid_input(format!("{name} must be > 0")));
        }
        Ok(v)
    }

    fn value_u64(name: &str, value: &Value) -> Result<u64, EngineError> {
        value.as_u64().ok_or_else(|| {
            EngineError::invalid_input(format!("{name} requires a non-negative integer"))
        })
    }

    fn value_str<'a>(name: &str, value: &'a Value) -> Result<&'a str, EngineError> {
        value
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EngineError::invalid_input(format!("{name} requires a non-empty string")))
    }

    fn set_parameter(&mut self, name: &str, value: &Value) -> Result<String, EngineError> {
        let params = &mut self.state.parameters;
        match name {
            "overlap_policy" => {
                let text = Self::value_str(name, value)?;
                params.overlap_policy = OverlapPolicy::parse(text).ok_or_else(|| {
                    EngineError::invalid_input(format!(
                        "Unknown overlap policy '{text}', expected allow, reject or reassign"
                    ))
                })?;
            }
            "dpi" => {
                let dpi = Self::value_u64(name, value)?;
                if dpi == 0 || dpi > u16::MAX as u64 {
                    return Err(EngineError::invalid_input(format!(
                        "dpi must be within 1..={}",
                        u16::MAX
                    )));
                }
                params.export.dpi = dpi as u32;
            }
            "jpeg_quality" => {
                let quality = Self::value_u64(name, value)?;
                if !(1..=100).contains(&quality) {
                    return Err(EngineError::invalid_input("jpeg_quality must be within 1..=100"));
                }
                params.export.jpeg_quality = quality as u8;
            }
            "crop_padding_in" => {
                let pad = Self::value_f32(name, value)?;
                if !(0.0..=MAX_CROP_PADDING_IN).contains(&pad) {
                    return Err(EngineError::invalid_input(format!(
                        "crop_padding_in must be within 0..={MAX_CROP_PADDING_IN}"
                    )));
                }
                params.export.crop_padding_in = pad;
            }
            "cell_size" => params.render.cell_size = Self::value_positive_f32(name, value)?,
            "well_radius" => {
                let radius = Self::value_positive_f32(name, value)?;
                if radius > 0.5 {
                    return Err(EngineError::invalid_input(
                        "well_radius is a fraction of the cell and must be <= 0.5",
                    ));
                }
                params.render.well_radius = radius;
            }
            "max_chars_per_line" => {
                let width = Self::value_u64(name, value)?;
                if width == 0 {
                    return Err(EngineError::invalid_input("max_chars_per_line must be >= 1"));
                }
                params.render.max_chars_per_line = width as usize;
            }
            "line_spacing" => {
                let spacing = Self::value_f32(name, value)?;
                if spacing < 0.0 {
                    return Err(EngineError::invalid_input("line_spacing must be >= 0"));
                }
                params.render.line_spacing = spacing;
            }
            "max_font_size_pt" => {
                params.render.max_font_size_pt = Self::value_positive_f32(name, value)?
            }
            "min_font_size_pt" => {
                params.render.min_font_size_pt = Self::value_positive_f32(name, value)?
            }
            "font_family" => params.render.font_family = Self::value_str(name, value)?.to_string(),
            "outline_color" => {
                let text = Self::value_str(name, value)?;
                params.render.outline_color = PlateColor::parse(text)
                    .map_err(|e| EngineError::invalid_input(format!("outline_color: {e}")))?;
            }
            other => {
                return Err(EngineError::invalid_input(format!(
                    "Unknown parameter '{other}'. Supported: {}",
                    SUPPORTED_PARAMETERS.join(", ")
                )));
            }
        }
        Ok(format!("Set parameter '{name}' to {value}"))
    }

    fn apply_internal(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let mut result = OpResult {
            op_id: self.next_op_id(),
            changed: false,
            warnings: vec![],
            messages: vec![],
        };

        match op {
            Operation::AssignWells { name, color, wells } => {
                let name = name.trim().to_string();
                if name.is_empty() || wells.is_empty() {
                    log::debug!("Ignoring assignment without a name or without wells");
                    return Ok(result);
                }
                let wells = Self::parse_wells(&wells)?;
                let (color, warning) = PlateColor::parse_or_default(&color);
                if let Some(warning) = warning {
                    log::warn!("{warning}");
                    result.warnings.push(warning);
                }

                let registry = &mut self.state.registry;
                let claimed = registry.claimed_wells(&wells);
                if !claimed.is_empty() {
                    let claimed_text = claimed.iter().join(", ");
                    match self.state.parameters.overlap_policy {
                        OverlapPolicy::Allow => result.messages.push(format!(
                            "Well(s) {claimed_text} already assigned; the earlier category keeps precedence"
                        )),
                        OverlapPolicy::Reject => {
                            return Err(EngineError::invalid_input(format!(
                                "Well(s) {claimed_text} already assigned to another category"
                            )));
                        }
                        OverlapPolicy::Reassign => {
                            registry.release_wells(&claimed);
                            result
                                .messages
                                .push(format!("Reassigned well(s) {claimed_text} to '{name}'"));
                        }
                    }
                }

                registry.add_category(&name, color, &wells);
                result.changed = true;
                result.messages.push(format!(
                    "Assigned {} well(s) to '{name}' ({color})",
                    wells.len()
                ));
            }
            Operation::ResetWell { well } => {
                let well = WellId::parse(&well)?;
                match self.state.registry.remove_well_from_all(well) {
                    Some(category) => {
                        result.changed = true;
                        result
                            .messages
                            .push(format!("Well {well} has been reset."));
                        log::debug!("Removed {well} from '{category}'");
                    }
                    None => result.messages.push(format!("Well {well} is not assigned")),
                }
            }
            Operation::SetParameter { name, value } => {
                let message = self.set_parameter(&name, &value)?;
                result.changed = true;
                result.messages.push(message);
            }
            Operation::ExportCsv { path, fill } => {
                let bytes = export::write_csv(Path::new(&path), &self.state.registry, fill)?;
                result
                    .messages
                    .push(format!("Wrote plate layout CSV ({bytes} bytes) to '{path}'"));
            }
            Operation::ExportImage { path, dpi } => {
                let mut settings = self.state.parameters.export.clone();
                if let Some(dpi) = dpi {
                    settings.dpi = dpi;
                }
                let diagram = self.render();
                let bytes = export::write_jpeg(Path::new(&path), &diagram, &settings)?;
                result.messages.push(format!(
                    "Wrote plate layout JPEG ({bytes} bytes, {} dpi) to '{path}'",
                    settings.dpi
                ));
            }
        }

        Ok(result)
    }
}

impl Engine for PlateEngine {
    fn apply(&mut self, op: Operation) -> Result<OpResult, EngineError> {
        let run_id = "interactive".to_string();
        let result = self.apply_internal(op.clone())?;
        self.journal.push(OperationRecord {
            run_id,
            op,
            result: result.clone(),
        });
        Ok(result)
    }

    fn apply_workflow(&mut self, wf: Workflow) -> Result<Vec<OpResult>, EngineError> {
        let mut results = Vec::new();
        for op in &wf.ops {
            let result = self.apply_internal(op.clone())?;
            self.journal.push(OperationRecord {
                run_id: wf.run_id.clone(),
                op: op.clone(),
                result: result.clone(),
            });
            results.push(result);
        }
        Ok(results)
    }

    fn snapshot(&self) -> &PlateState {
        &self.state
    }
}

/// Handler form of [`Engine::apply`]: state in, state out. A failed
/// operation leaves the returned state as it was passed in.
pub fn handle(state: PlateState, op: Operation) -> (PlateState, Result<OpResult, EngineError>) {
    let mut engine = PlateEngine::from_state(state);
    let result = engine.apply(op);
    (engine.into_state(), result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use serde_json::json;

    fn assign(name: &str, color: &str, wells: &[&str]) -> Operation {
        Operation::AssignWells {
            name: name.to_string(),
            color: color.to_string(),
            wells: wells.iter().map(|w| w.to_string()).collect(),
        }
    }

    fn reset(well: &str) -> Operation {
        Operation::ResetWell {
            well: well.to_string(),
        }
    }

    #[test]
    fn test_assign_and_resolve() {
        let mut engine = PlateEngine::new();
        let res = engine.apply(assign("X", "#00ff00", &["A1", "A2"])).unwrap();
        assert!(res.changed);
        assert!(res.warnings.is_empty());
        let registry = &engine.state().registry;
        for label in ["A1", "A2"] {
            let appearance = crate::resolver::resolve(registry, WellId::parse(label).unwrap());
            assert_eq!(appearance.label, "X");
            assert_eq!(appearance.color, PlateColor::rgb(0, 255, 0));
        }
    }

    #[test]
    fn test_invalid_color_warns_and_defaults_to_white() {
        let mut engine = PlateEngine::new();
        let res = engine.apply(assign("X", "notacolor", &["C4"])).unwrap();
        assert_eq!(res.warnings.len(), 1);
        assert_eq!(
            engine.state().registry.list_active()[0].color(),
            PlateColor::WHITE
        );
    }

    #[test]
    fn test_empty_name_or_wells_is_silent_noop() {
        let mut engine = PlateEngine::new();
        let res = engine.apply(assign("", "#ff0000", &["A1"])).unwrap();
        assert!(!res.changed);
        assert!(res.warnings.is_empty() && res.messages.is_empty());
        let res = engine.apply(assign("X", "#ff0000", &[])).unwrap();
        assert!(!res.changed);
        assert!(engine.state().registry.is_empty());
        let res = engine.apply(assign("  ", "#ff0000", &["Z9"])).unwrap();
        assert!(!res.changed);
        assert!(res.warnings.is_empty() && res.messages.is_empty());
        assert!(engine.state().registry.is_empty());
    }

    #[test]
    fn test_malformed_well_is_rejected_without_change() {
        let mut engine = PlateEngine::new();
        let err = engine.apply(assign("X", "red", &["A1", "J7"])).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(engine.state().registry.is_empty());
        assert!(engine.operation_log().is_empty());
    }

    #[test]
    fn test_reset_messages() {
        let mut engine = PlateEngine::new();
        engine.apply(assign("X", "red", &["A1", "A2"])).unwrap();
        let res = engine.apply(reset("A1")).unwrap();
        assert!(res.changed);
        assert_eq!(res.messages, vec!["Well A1 has been reset.".to_string()]);
        let res = engine.apply(reset("A1")).unwrap();
        assert!(!res.changed);
        assert_eq!(res.messages, vec!["Well A1 is not assigned".to_string()]);
    }

    #[test]
    fn test_overlap_allow_keeps_first_owner() {
        let mut engine = PlateEngine::new();
        engine.apply(assign("first", "red", &["A1"])).unwrap();
        let res = engine.apply(assign("second", "blue", &["A1", "A2"])).unwrap();
        assert!(res.messages[0].contains("earlier category keeps precedence"));
        let registry = &engine.state().registry;
        assert_eq!(registry.len(), 2);
        let owner = crate::resolver::owner(registry, WellId::parse("A1").unwrap()).unwrap();
        assert_eq!(owner.name(), "first");
    }

    #[test]
    fn test_overlap_reject_leaves_state_unchanged() {
        let mut engine = PlateEngine::new();
        engine
            .apply(Operation::SetParameter {
                name: "overlap_policy".to_string(),
                value: json!("reject"),
            })
            .unwrap();
        engine.apply(assign("first", "red", &["A1"])).unwrap();
        let before = engine.state().clone();
        assert!(engine.apply(assign("second", "blue", &["A2", "A1"])).is_err());
        assert_eq!(engine.state(), &before);
    }

    #[test]
    fn test_overlap_reassign_moves_wells_and_prunes() {
        let mut engine = PlateEngine::new();
        engine
            .apply(Operation::SetParameter {
                name: "overlap_policy".to_string(),
                value: json!("Reassign"),
            })
            .unwrap();
        engine.apply(assign("first", "red", &["A1"])).unwrap();
        engine.apply(assign("keep", "green", &["B1", "B2"])).unwrap();
        engine.apply(assign("second", "blue", &["A1", "B1"])).unwrap();
        let summary = engine.summarize_state();
        let names = summary
            .categories
            .iter()
            .map(|c| c.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["keep", "second"]);
        assert_eq!(summary.categories[0].wells, vec!["B2".to_string()]);
        assert_eq!(summary.assigned_well_count, 3);
    }

    #[test]
    fn test_set_parameter_validation() {
        let mut engine = PlateEngine::new();
        let set = |name: &str, value: Value| Operation::SetParameter {
            name: name.to_string(),
            value,
        };
        engine.apply(set("dpi", json!(150))).unwrap();
        engine.apply(set("max_chars_per_line", json!(8))).unwrap();
        engine.apply(set("outline_color", json!("gray"))).unwrap();
        let params = &engine.state().parameters;
        assert_eq!(params.export.dpi, 150);
        assert_eq!(params.render.max_chars_per_line, 8);
        assert_eq!(params.render.outline_color, PlateColor::rgb(128, 128, 128));

        assert!(engine.apply(set("dpi", json!(0))).is_err());
        assert!(engine.apply(set("crop_padding_in", json!(1e9))).is_err());
        assert!(engine.apply(set("crop_padding_in", json!(-0.1))).is_err());
        engine.apply(set("crop_padding_in", json!(0.5))).unwrap();
        assert_eq!(engine.state().parameters.export.crop_padding_in, 0.5);
        assert!(engine.apply(set("well_radius", json!(0.9))).is_err());
        assert!(engine.apply(set("outline_color", json!("nope"))).is_err());
        assert!(engine.apply(set("bogus", json!(1))).is_err());
    }

    #[test]
    fn test_oversized_image_export_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.jpeg");
        let mut engine = PlateEngine::new();
        let err = engine
            .apply(Operation::ExportImage {
                path: path.display().to_string(),
                dpi: Some(65_535),
            })
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
        assert!(!path.exists());
    }

    #[test]
    fn test_handle_threads_state() {
        let state = PlateState::new();
        let (state, res) = handle(state, assign("Control", "#FF0000", &["A1", "B1"]));
        assert!(res.unwrap().changed);
        let (state, res) = handle(state, reset("Z1"));
        assert!(res.is_err());
        assert_eq!(state.registry.list_active()[0].well_labels(), vec!["A1", "B1"]);
    }

    #[test]
    fn test_workflow_from_json() {
        let json_text = r##"{
            "ops": [
                {"AssignWells": {"name": "Blank", "color": "#cccccc", "wells": ["H1", "H2"]}},
                {"ResetWell": {"well": "H2"}}
            ]
        }"##;
        let workflow: Workflow = serde_json::from_str(json_text).unwrap();
        assert_eq!(workflow.run_id, "workflow");
        let mut engine = PlateEngine::new();
        let results = engine.apply_workflow(workflow).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(engine.operation_log().len(), 2);
        assert_eq!(engine.display_lines(), vec!["Category: Blank, Color: #cccccc, Wells: H1"]);
    }

    #[test]
    fn test_text_grid_marks_owner_index() {
        let mut engine = PlateEngine::new();
        engine.apply(assign("a", "red", &["A1"])).unwrap();
        engine.apply(assign("b", "blue", &["A2", "H12"])).unwrap();
        let grid = engine.text_grid();
        let lines = grid.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 9);
        assert!(lines[1].starts_with("A    1  2  ."));
        assert!(lines[8].ends_with("  2"));
    }

    #[test]
    fn test_export_operations_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("layout.csv");
        let jpeg_path = dir.path().join("layout.jpeg");
        let mut engine = PlateEngine::new();
        engine.apply(assign("Control", "red", &["A1"])).unwrap();
        engine
            .apply(Operation::ExportCsv {
                path: csv_path.display().to_string(),
                fill: CsvFill::Blank,
            })
            .unwrap();
        let res = engine
            .apply(Operation::ExportImage {
                path: jpeg_path.display().to_string(),
                dpi: Some(72),
            })
            .unwrap();
        assert!(!res.changed);
        assert!(csv_path.exists());
        assert!(std::fs::metadata(&jpeg_path).unwrap().len() > 0);
    }
}
