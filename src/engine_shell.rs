use crate::engine::{Engine, Operation, PlateEngine, Workflow};
use crate::export::CsvFill;
use plate_protocol::parse_well_selection;
use serde_json::{Value, json};
use std::fs;

#[derive(Debug, Clone, PartialEq)]
pub enum ShellCommand {
    Help,
    Capabilities,
    List,
    Show,
    Assign {
        name: String,
        color: String,
        wells: Vec<String>,
    },
    Reset { well: String },
    SetParameter { name: String, value: Value },
    ExportCsv { path: String, fill: CsvFill },
    ExportImage { path: String, dpi: Option<u32> },
    Op { payload: String },
    Workflow { payload: String },
}

#[derive(Debug, Clone)]
pub struct ShellRunResult {
    pub state_changed: bool,
    pub output: Value,
}

impl ShellCommand {
    pub fn preview(&self) -> String {
        match self {
            Self::Help => "show shell command help".to_string(),
            Self::Capabilities => "inspect engine capabilities".to_string(),
            Self::List => "list active categories".to_string(),
            Self::Show => "show the plate as a text grid".to_string(),
            Self::Assign { name, color, wells } => {
                format!("assign {} well(s) to '{name}' in {color}", wells.len())
            }
            Self::Reset { well } => format!("reset well {well}"),
            Self::SetParameter { name, value } => format!("set parameter '{name}' to {value}"),
            Self::ExportCsv { path, fill } => format!("export {fill:?} CSV grid to '{path}'"),
            Self::ExportImage { path, dpi } => {
                let dpi = dpi
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "default".to_string());
                format!("export JPEG to '{path}' at {dpi} dpi")
            }
            Self::Op { .. } => "apply one engine operation from JSON".to_string(),
            Self::Workflow { .. } => "apply engine workflow from JSON".to_string(),
        }
    }

    pub fn is_state_mutating(&self) -> bool {
        matches!(
            self,
            Self::Assign { .. }
                | Self::Reset { .. }
                | Self::SetParameter { .. }
                | Self::Op { .. }
                | Self::Workflow { .. }
        )
    }
}

pub fn shell_help_text() -> &'static str {
    "Plate shell commands:\n\
help\n\
capabilities\n\
list\n\
show\n\
assign NAME COLOR WELLS...\n\
reset WELL\n\
set-parameter NAME VALUE\n\
export-csv PATH [--names]\n\
export-image PATH [--dpi N]\n\
op <operation-json-or-@file>\n\
workflow <workflow-json-or-@file>\n\
WELLS are labels like A1, comma separated lists or ranges like A1:B3"
}

fn parse_json_payload(raw: &str) -> Result<String, String> {
    if let Some(path) = raw.strip_prefix('@') {
        fs::read_to_string(path).map_err(|e| format!("Could not read JSON file '{path}': {e}"))
    } else {
        Ok(raw.to_string())
    }
}

/// Numbers and booleans stay typed; anything else is taken as a string.
fn parse_parameter_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) if !value.is_object() && !value.is_array() => value,
        _ => Value::String(raw.to_string()),
    }
}

fn token_error(command: &str) -> String {
    format!("Invalid '{command}' usage. Try: help")
}

fn expect_no_args(tokens: &[String], command: ShellCommand) -> Result<ShellCommand, String> {
    if tokens.len() == 1 {
        Ok(command)
    } else {
        Err(token_error(&tokens[0]))
    }
}

pub fn parse_shell_tokens(tokens: &[String]) -> Result<ShellCommand, String> {
    if tokens.is_empty() {
        return Err("Missing shell command".to_string());
    }
    let cmd = tokens[0].as_str();
    match cmd {
        "help" | "-h" | "--help" => Ok(ShellCommand::Help),
        "capabilities" => expect_no_args(tokens, ShellCommand::Capabilities),
        "list" => expect_no_args(tokens, ShellCommand::List),
        "show" => expect_no_args(tokens, ShellCommand::Show),
        "assign" => {
            if tokens.len() < 4 {
                return Err(token_error(cmd));
            }
            let selection = tokens[3..].join(" ");
            let wells = parse_well_selection(&selection)
                .map_err(|e| format!("Invalid well selection '{selection}': {e}"))?
                .into_iter()
                .map(|w| w.label())
                .collect();
            Ok(ShellCommand::Assign {
                name: tokens[1].clone(),
                color: tokens[2].clone(),
                wells,
            })
        }
        "reset" => {
            if tokens.len() == 2 {
                Ok(ShellCommand::Reset {
                    well: tokens[1].clone(),
                })
            } else {
                Err(token_error(cmd))
            }
        }
        "set-parameter" | "set" => {
            if tokens.len() != 3 {
                return Err(token_error(cmd));
            }
            Ok(ShellCommand::SetParameter {
                name: tokens[1].clone(),
                value: parse_parameter_value(&tokens[2]),
            })
        }
        "export-csv" => {
            let (path, fill) = match &tokens[1..] {
                [path] => (path, CsvFill::Blank),
                [path, flag] if flag == "--names" => (path, CsvFill::CategoryNames),
                _ => return Err(token_error(cmd)),
            };
            Ok(ShellCommand::ExportCsv {
                path: path.clone(),
                fill,
            })
        }
        "export-image" => {
            let (path, dpi) = match &tokens[1..] {
                [path] => (path, None),
                [path, flag, value] if flag == "--dpi" => {
                    let dpi = value
                        .parse::<u32>()
                        .map_err(|_| format!("Invalid --dpi value '{value}'"))?;
                    (path, Some(dpi))
                }
                _ => return Err(token_error(cmd)),
            };
            Ok(ShellCommand::ExportImage {
                path: path.clone(),
                dpi,
            })
        }
        "op" => {
            let payload = tokens[1..].join(" ");
            if payload.trim().is_empty() {
                return Err("Missing operation JSON".to_string());
            }
            Ok(ShellCommand::Op { payload })
        }
        "workflow" => {
            let payload = tokens[1..].join(" ");
            if payload.trim().is_empty() {
                return Err("Missing workflow JSON".to_string());
            }
            Ok(ShellCommand::Workflow { payload })
        }
        other => Err(format!("Unknown shell command '{other}'. Try: help")),
    }
}

pub fn parse_shell_line(line: &str) -> Result<ShellCommand, String> {
    let tokens = split_shell_words(line)?;
    parse_shell_tokens(&tokens)
}

pub fn split_shell_words(line: &str) -> Result<Vec<String>, String> {
    #[derive(Clone, Copy, PartialEq, Eq)]
    enum Mode {
        Normal,
        SingleQuoted,
        DoubleQuoted,
    }

    fn escaped(chars: &mut std::str::Chars<'_>) -> Result<char, String> {
        chars
            .next()
            .ok_or_else(|| "Dangling '\\' at end of shell command".to_string())
    }

    let mut out = Vec::new();
    let mut current = String::new();
    let mut mode = Mode::Normal;
    let mut chars = line.chars();

    while let Some(ch) = chars.next() {
        match mode {
            Mode::Normal => match ch {
                '\'' => mode = Mode::SingleQuoted,
                '"' => mode = Mode::DoubleQuoted,
                '\\' => current.push(escaped(&mut chars)?),
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        out.push(std::mem::take(&mut current));
                    }
                }
                _ => current.push(ch),
            },
            Mode::SingleQuoted => {
                if ch == '\'' {
                    mode = Mode::Normal;
                } else {
                    current.push(ch);
                }
            }
            Mode::DoubleQuoted => {
                if ch == '"' {
                    mode = Mode::Normal;
                } else if ch == '\\' {
                    current.push(escaped(&mut chars)?);
                } else {
                    current.push(ch);
                }
            }
        }
    }

    if mode != Mode::Normal {
        return Err("Unterminated quoted string in shell command".to_string());
    }
    if !current.is_empty() {
        out.push(current);
    }
    if out.is_empty() {
        return Err("Empty shell command".to_string());
    }
    Ok(out)
}

fn apply_op(engine: &mut PlateEngine, op: Operation) -> Result<ShellRunResult, String> {
    let op_result = engine.apply(op).map_err(|e| e.to_string())?;
    Ok(ShellRunResult {
        state_changed: op_result.changed,
        output: json!({ "result": op_result }),
    })
}

pub fn execute_shell_command(
    engine: &mut PlateEngine,
    command: &ShellCommand,
) -> Result<ShellRunResult, String> {
    let result = match command {
        ShellCommand::Help => ShellRunResult {
            state_changed: false,
            output: json!({ "help": shell_help_text() }),
        },
        ShellCommand::Capabilities => ShellRunResult {
            state_changed: false,
            output: serde_json::to_value(PlateEngine::capabilities())
                .map_err(|e| format!("Could not serialize capabilities: {e}"))?,
        },
        ShellCommand::List => ShellRunResult {
            state_changed: false,
            output: json!({
                "categories": engine.display_lines(),
                "summary": engine.summarize_state(),
            }),
        },
        ShellCommand::Show => ShellRunResult {
            state_changed: false,
            output: json!({
                "grid": engine.text_grid(),
                "legend": engine.display_lines(),
            }),
        },
        ShellCommand::Assign { name, color, wells } => apply_op(
            engine,
            Operation::AssignWells {
                name: name.clone(),
                color: color.clone(),
                wells: wells.clone(),
            },
        )?,
        ShellCommand::Reset { well } => {
            apply_op(engine, Operation::ResetWell { well: well.clone() })?
        }
        ShellCommand::SetParameter { name, value } => apply_op(
            engine,
            Operation::SetParameter {
                name: name.clone(),
                value: value.clone(),
            },
        )?,
        ShellCommand::ExportCsv { path, fill } => apply_op(
            engine,
            Operation::ExportCsv {
                path: path.clone(),
                fill: *fill,
            },
        )?,
        ShellCommand::ExportImage { path, dpi } => apply_op(
            engine,
            Operation::ExportImage {
                path: path.clone(),
                dpi: *dpi,
            },
        )?,
        ShellCommand::Op { payload } => {
            let json_text = parse_json_payload(payload)?;
            let op: Operation = serde_json::from_str(&json_text)
                .map_err(|e| format!("Invalid operation JSON: {e}"))?;
            apply_op(engine, op)?
        }
        ShellCommand::Workflow { payload } => {
            let json_text = parse_json_payload(payload)?;
            let workflow: Workflow = serde_json::from_str(&json_text)
                .map_err(|e| format!("Invalid workflow JSON: {e}"))?;
            let results = engine.apply_workflow(workflow).map_err(|e| e.to_string())?;
            ShellRunResult {
                state_changed: results.iter().any(|r| r.changed),
                output: json!({ "results": results }),
            }
        }
    };
    Ok(result)
}
