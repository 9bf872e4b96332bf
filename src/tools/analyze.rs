//! analyze_code tool — line-prefix structure report.
//!
//! Counts lines whose trimmed content starts with an import, function, or
//! class marker. A deliberate low-fidelity heuristic, not a parser: good
//! enough for the model to reason about file shape, cheap enough to run on
//! anything.

use std::path::Path;

use anyhow::Result;

use crate::server::ToolDefinition;

/// Line prefixes counted as imports.
const IMPORT_MARKERS: &[&str] = &["import ", "from ", "use ", "#include", "require("];
/// Line prefixes counted as function definitions.
const FUNCTION_MARKERS: &[&str] = &["def ", "fn ", "pub fn ", "function ", "async def "];
/// Line prefixes counted as class definitions.
const CLASS_MARKERS: &[&str] = &["class ", "struct ", "pub struct "];

/// Sample import lines included in the report.
const MAX_SAMPLE_IMPORTS: usize = 5;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "analyze_code".to_owned(),
        description: "Analyze code structure: line count plus import, function, and class \
            counts based on a line-prefix heuristic."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the code file to analyze"
                }
            },
            "required": ["file_path"]
        }),
    }
}

fn starts_with_any(line: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| line.starts_with(m))
}

/// Analyze the file at the literal path — no container resolution here.
pub fn execute(workspace: &Path, file_path: &str) -> Result<String> {
    let path = workspace.join(file_path);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => return Ok(format!("Error analyzing code: {file_path}: {e}")),
    };

    let lines: Vec<&str> = content.split('\n').collect();
    let line_count = lines.len();

    let imports: Vec<&str> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| starts_with_any(l, IMPORT_MARKERS))
        .collect();
    let functions = lines
        .iter()
        .filter(|l| starts_with_any(l.trim(), FUNCTION_MARKERS))
        .count();
    let classes = lines
        .iter()
        .filter(|l| starts_with_any(l.trim(), CLASS_MARKERS))
        .count();

    let mut report = format!(
        "Code Analysis for '{file_path}':\n\
         - Total lines: {line_count}\n\
         - Imports: {}\n\
         - Functions: {functions}\n\
         - Classes: {classes}\n",
        imports.len()
    );

    if !imports.is_empty() {
        report.push_str("\nImports found:\n");
        for import in imports.iter().take(MAX_SAMPLE_IMPORTS) {
            report.push_str(&format!("  {import}\n"));
        }
    }

    Ok(report)
}
