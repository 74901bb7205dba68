use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use plate_planner::{
    about,
    engine::{Engine, Operation, PlateEngine, Workflow},
    engine_shell::{execute_shell_command, parse_shell_line, shell_help_text},
    export::CsvFill,
};
use rustyline::{DefaultEditor, error::ReadlineError};
use serde::Serialize;
use std::fs;

/// Plan the layout of a 96-well plate and export it as CSV or JPEG.
#[derive(Parser, Debug)]
#[command(name = "plate_cli", disable_version_flag = true)]
struct Cli {
    /// Print version and build information
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive session with the plate shell
    Shell,
    /// Apply a workflow to a fresh plate, then export it
    Run {
        /// Workflow JSON, or @file.json
        workflow: String,
        /// Write the blank layout CSV here
        #[arg(long)]
        csv: Option<String>,
        /// Write the plate JPEG here
        #[arg(long)]
        image: Option<String>,
        /// Resolution of the JPEG export
        #[arg(long)]
        dpi: Option<u32>,
    },
    /// Print engine capabilities as JSON
    Capabilities,
}

fn load_json_arg(value: &str) -> Result<String> {
    if let Some(path) = value.strip_prefix('@') {
        fs::read_to_string(path).with_context(|| format!("Could not read JSON file '{path}'"))
    } else {
        Ok(value.to_string())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Could not serialize JSON output")?;
    println!("{text}");
    Ok(())
}

fn run_workflow(
    workflow: &str,
    csv: Option<String>,
    image: Option<String>,
    dpi: Option<u32>,
) -> Result<()> {
    let json_text = load_json_arg(workflow)?;
    let workflow: Workflow =
        serde_json::from_str(&json_text).context("Invalid workflow JSON")?;

    let mut engine = PlateEngine::new();
    let mut results = engine.apply_workflow(workflow)?;
    if let Some(path) = csv {
        results.push(engine.apply(Operation::ExportCsv {
            path,
            fill: CsvFill::Blank,
        })?);
    }
    if let Some(path) = image {
        results.push(engine.apply(Operation::ExportImage { path, dpi })?);
    }

    for line in engine.display_lines() {
        println!("{line}");
    }
    for warning in results.iter().flat_map(|r| r.warnings.iter()) {
        eprintln!("warning: {warning}");
    }
    print_json(&engine.summarize_state())
}

fn run_shell() -> Result<()> {
    let mut engine = PlateEngine::new();
    let mut rl = DefaultEditor::new()?;
    println!("{}", shell_help_text());

    loop {
        match rl.readline("plate> ") {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    break;
                }
                rl.add_history_entry(line)?;

                let outcome = parse_shell_line(line)
                    .and_then(|cmd| execute_shell_command(&mut engine, &cmd));
                match outcome {
                    Ok(result) => {
                        if let Some(grid) = result.output.get("grid").and_then(|v| v.as_str()) {
                            print!("{grid}");
                        } else {
                            print_json(&result.output)?;
                        }
                    }
                    Err(e) => println!("Error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => bail!(err),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if cli.version {
        println!("{}", about::version_cli_text());
        return Ok(());
    }

    match cli.command {
        Some(Command::Shell) => run_shell(),
        Some(Command::Run {
            workflow,
            csv,
            image,
            dpi,
        }) => run_workflow(&workflow, csv, image, dpi),
        Some(Command::Capabilities) => print_json(&PlateEngine::capabilities()),
        None => bail!("Missing command. Try: plate_cli --help"),
    }
}
