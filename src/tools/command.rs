//! run_command tool — safety-gated shell execution.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context as _, Result};

use crate::safety;
use crate::server::ToolDefinition;

pub fn tool_definition() -> ToolDefinition {
    ToolDefinition {
        name: "run_command".to_owned(),
        description: "Execute safe system commands only (git, read-only package-manager \
            queries, version checks, directory listing). Dangerous operations are blocked."
            .to_owned(),
        input_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "cmd": {
                    "type": "string",
                    "description": "Safe system command to execute"
                }
            },
            "required": ["cmd"]
        }),
    }
}

/// Execute a shell command after a safety check.
///
/// A blocked command is not an error: the verdict's reason is the result
/// text, giving the model something to adjust to. Accepted commands run
/// via the host shell; only the exit code is reported, stdout/stderr are
/// discarded (the behavior the system prompt documents).
pub fn execute(workspace: &Path, cmd: &str) -> Result<String> {
    let verdict = safety::evaluate(cmd);
    if !verdict.allowed {
        tracing::info!(command = cmd, reason = verdict.reason, "command blocked");
        return Ok(verdict.reason);
    }

    tracing::debug!(command = cmd, "executing command");

    let status = Command::new("sh")
        .arg("-c")
        .arg(cmd)
        .current_dir(workspace)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .with_context(|| format!("failed to spawn: {cmd}"))?;

    let exit_code = status.code().unwrap_or(-1);
    Ok(format!("Command executed with exit code: {exit_code}"))
}
