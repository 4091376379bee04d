//! Generate Shell Gate JSON Schemas
//!
//! Writes JSON schemas for the request, result and settings documents to `docs/`
//! (or the directory given as the first argument).

use schemars::Schema;
use shell_gate::utils::logging::init_logging;
use shell_gate::{CommandRequest, ExecutionResult, Settings};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// File name and schema for every published document.
pub fn schemas() -> Vec<(&'static str, Schema)> {
    vec![
        (
            "command-request-schema.json",
            schemars::schema_for!(CommandRequest),
        ),
        (
            "execution-result-schema.json",
            schemars::schema_for!(ExecutionResult),
        ),
        ("settings-schema.json", schemars::schema_for!(Settings)),
    ]
}

/// Render every schema as pretty-printed JSON, paired with its file name.
pub fn generate_schema_json() -> Result<Vec<(&'static str, String)>, serde_json::Error> {
    schemas()
        .into_iter()
        .map(|(name, schema)| Ok((name, serde_json::to_string_pretty(&schema)?)))
        .collect()
}

/// Parse the output directory from command line arguments.
/// Returns the first argument as a PathBuf, or defaults to "docs".
pub fn parse_output_dir<I, S>(mut args: I) -> PathBuf
where
    I: Iterator<Item = S>,
    S: Into<String>,
{
    args.nth(1)
        .map(|s| PathBuf::from(s.into()))
        .unwrap_or_else(|| PathBuf::from("docs"))
}

/// Write one schema into `output_dir`, creating the directory if needed.
pub fn write_schema_to_file(
    output_dir: &Path,
    file_name: &str,
    schema_json: &str,
) -> Result<PathBuf, std::io::Error> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(file_name);
    fs::write(&path, schema_json)?;
    Ok(path)
}

/// First `max_lines` lines of a schema, indented for terminal output.
pub fn generate_preview(schema_json: &str, max_lines: usize) -> String {
    let total_lines = schema_json.lines().count();

    let mut preview = String::new();
    for line in schema_json.lines().take(max_lines) {
        preview.push_str(&format!("    {}\n", line));
    }

    if total_lines > max_lines {
        preview.push_str(&format!(
            "    ... and {} more lines\n",
            total_lines - max_lines
        ));
    }

    preview
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info", false)?;

    let output_dir = parse_output_dir(env::args());

    for (file_name, schema_json) in generate_schema_json()? {
        let path = write_schema_to_file(&output_dir, file_name, &schema_json)?;
        println!("✓ Generated JSON Schema at: {}", path.display());
        println!("  Schema size: {} bytes", schema_json.len());
        println!("  Preview:");
        print!("{}", generate_preview(&schema_json, 5));
    }

    Ok(())
}
