//! Tool registry — a fixed set of operations the agent can invoke.
//!
//! Tools are a closed enum ([`ToolKind`]), not a string-keyed map: dispatch
//! is one `match`, and the unknown-name error path is explicit in
//! [`ToolInvocation::from_step`]. Every tool returns plain text — a success
//! description or an `Error: …` description — and never lets an error
//! escape its boundary. The [`Toolbox`] wraps dispatch one more time so
//! even an unexpected internal failure becomes a text observation and the
//! conversation can always continue.

pub mod analyze;
pub mod command;
pub mod create;
pub mod project;
pub mod read;
pub mod write;

use std::path::PathBuf;

use tracing::debug;

use crate::server::ToolDefinition;

/// The fixed set of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    RunCommand,
    CreateFile,
    ReadFile,
    WriteFile,
    AnalyzeCode,
}

impl ToolKind {
    /// All tools, in the order they are listed to clients.
    pub const ALL: [Self; 5] = [
        Self::RunCommand,
        Self::CreateFile,
        Self::ReadFile,
        Self::WriteFile,
        Self::AnalyzeCode,
    ];

    /// Look up a tool by its protocol name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "run_command" => Some(Self::RunCommand),
            "create_file" => Some(Self::CreateFile),
            "read_file" => Some(Self::ReadFile),
            "write_file" => Some(Self::WriteFile),
            "analyze_code" => Some(Self::AnalyzeCode),
            _ => None,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::RunCommand => "run_command",
            Self::CreateFile => "create_file",
            Self::ReadFile => "read_file",
            Self::WriteFile => "write_file",
            Self::AnalyzeCode => "analyze_code",
        }
    }

    /// Whether the raw step input splits into (path, content).
    const fn takes_content(self) -> bool {
        matches!(self, Self::CreateFile | Self::WriteFile)
    }
}

/// A resolved tool call, built from one TOOL step and consumed within the
/// same loop iteration.
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub kind: ToolKind,
    /// First argument: path for file tools, command line for `run_command`.
    pub arg: String,
    /// Second argument for two-argument tools (`create_file`, `write_file`).
    pub content: String,
}

impl ToolInvocation {
    /// Build an invocation from a TOOL step's name and raw input.
    ///
    /// Two-argument tools split the input on the first newline into
    /// (path, content). Missing or empty pieces are not silently ignored:
    /// the `Err` text becomes the observation and the loop continues.
    pub fn from_step(tool: Option<&str>, input: Option<&str>) -> Result<Self, String> {
        let name = tool.unwrap_or_default();
        if name.is_empty() {
            return Err("Error: TOOL step did not name a tool".to_owned());
        }

        let Some(kind) = ToolKind::from_name(name) else {
            let available: Vec<&str> = ToolKind::ALL.iter().map(|k| k.name()).collect();
            return Err(format!(
                "Error: Tool '{name}' not found. Available tools: {available:?}"
            ));
        };

        let raw_input = input.unwrap_or_default();
        if raw_input.is_empty() {
            return Err(format!("Error: No input provided for {name}"));
        }

        if kind.takes_content() {
            let (path, content) = match raw_input.split_once('\n') {
                Some((first, rest)) => (first.trim(), rest),
                None => (raw_input.trim(), ""),
            };
            if path.is_empty() {
                return Err(format!("Error: No file path provided for {name}"));
            }
            Ok(Self {
                kind,
                arg: path.to_owned(),
                content: content.to_owned(),
            })
        } else {
            Ok(Self {
                kind,
                arg: raw_input.to_owned(),
                content: String::new(),
            })
        }
    }
}

/// Dispatches tool invocations against a workspace directory.
pub struct Toolbox {
    /// Root for file operations and command working directory.
    workspace: PathBuf,
}

impl Toolbox {
    #[must_use]
    pub fn new(workspace: PathBuf) -> Self {
        Self { workspace }
    }

    #[must_use]
    pub fn workspace(&self) -> &std::path::Path {
        &self.workspace
    }

    /// List all tool definitions (name, description, JSON input schema).
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        vec![
            command::tool_definition(),
            create::tool_definition(),
            read::tool_definition(),
            write::tool_definition(),
            analyze::tool_definition(),
        ]
    }

    /// Invoke a tool and return its text result.
    ///
    /// `request` is the originating user request, consulted only by
    /// `create_file` for destination inference. Any internal failure is
    /// converted to an `Error: …` text here — this function never fails.
    #[must_use]
    pub fn invoke(&self, invocation: &ToolInvocation, request: &str) -> String {
        debug!(tool = invocation.kind.name(), arg = %invocation.arg, "dispatching tool call");

        let result = match invocation.kind {
            ToolKind::RunCommand => command::execute(&self.workspace, &invocation.arg),
            ToolKind::CreateFile => create::execute(
                &self.workspace,
                &invocation.arg,
                &invocation.content,
                request,
            ),
            ToolKind::ReadFile => read::execute(&self.workspace, &invocation.arg),
            ToolKind::WriteFile => {
                write::execute(&self.workspace, &invocation.arg, &invocation.content)
            }
            ToolKind::AnalyzeCode => analyze::execute(&self.workspace, &invocation.arg),
        };

        result.unwrap_or_else(|e| {
            format!(
                "Error executing tool {}: {e:#}",
                invocation.kind.name()
            )
        })
    }
}
