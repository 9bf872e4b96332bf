//! create_file tool — file creation with project-container inference.

use std::path::Path;

use anyhow::Result;

use crate::server::ToolDefinition;
use crate::tools::project;
use crate::util::atomic::atomic_write;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "create_file".to_owned(),
        description: "Create a new file with specified content. Automatically detects the \
            project type and creates an appropriate folder; an explicit path with a directory \
            separator is honored as-is."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "file_path": {
                    "type": "string",
                    "description": "Path where the file should be created"
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

/// Create a file, routing bare filenames into a project container.
///
/// `request` is the originating natural-language request; an explicit
/// location phrase in it overrides the keyword classifier. Paths that
/// already contain a separator skip inference entirely.
pub fn execute(workspace: &Path, file_path: &str, content: &str, request: &str) -> Result<String> {
    let relative = if file_path.contains('/') || file_path.contains('\\') {
        std::path::PathBuf::from(file_path)
    } else {
        match project::infer_destination(file_path, content, request) {
            Some(container) => container.join(file_path),
            None => std::path::PathBuf::from(file_path),
        }
    };

    let destination = workspace.join(&relative);
    atomic_write(&destination, content)?;

    tracing::debug!(path = %relative.display(), bytes = content.len(), "file created");
    Ok(format!("File '{}' created successfully.", relative.display()))
}
