//! write_file tool — overwrite an existing file.
//!
//! Deliberately refuses to create new paths: creation (and the directory
//! inference that goes with it) belongs to `create_file`. A model that
//! gets the not-found error here is expected to retry with `create_file`.

use std::path::Path;

use anyhow::Result;

use crate::server::ToolDefinition;
use crate::tools::project;
use crate::util::atomic::atomic_write;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "write_file".to_owned(),
        description: "Write/update content in an existing file, overwriting its contents. \
            Fails if the file does not exist — use create_file for new files."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path of the file to write to"
                },
                "content": {
                    "type": "string",
                    "description": "Content to write to the file"
                }
            },
            "required": ["file_path", "content"]
        }),
    }
}

/// Overwrite an existing file, using the same resolution search as
/// `read_file`.
pub fn execute(workspace: &Path, file_path: &str, content: &str) -> Result<String> {
    let Some(resolved) = project::resolve_existing(workspace, file_path) else {
        return Ok(format!(
            "Error: file '{file_path}' not found. Use create_file to create new files."
        ));
    };

    atomic_write(&resolved, content)?;

    tracing::debug!(path = %resolved.display(), bytes = content.len(), "file updated");
    Ok(format!("File '{file_path}' updated successfully."))
}
