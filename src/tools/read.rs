//! read_file tool — file reading with project-container resolution.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::server::ToolDefinition;
use crate::tools::project;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "read_file".to_owned(),
        description: "Read the contents of an existing file. Searches the literal path, \
            then the project folders under the workspace."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to read"
                }
            },
            "required": ["file_path"]
        }),
    }
}

/// Read a file, searching project containers when the literal path is
/// absent. Returns the raw contents on success.
pub fn execute(workspace: &Path, file_path: &str) -> Result<String> {
    let Some(resolved) = project::resolve_existing(workspace, file_path) else {
        return Ok(format!(
            "Error: file '{file_path}' not found (searched the workspace and project folders)"
        ));
    };

    let content = std::fs::read_to_string(&resolved)
        .with_context(|| format!("failed to read {}", resolved.display()))?;

    Ok(content)
}
