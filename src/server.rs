//! MCP server — stdio transport, JSON-RPC 2.0, newline-delimited.
//!
//! Exposes the tool registry and the conversation loop over the Model
//! Context Protocol. Reads one JSON-RPC request per line from stdin and
//! writes one response per line to stdout (logging goes to stderr).
//!
//! Protocol flow:
//! 1. Client sends `initialize` → server responds with capabilities
//! 2. Client sends `notifications/initialized`
//! 3. `tools/list` → tool definitions; `tools/call` → execute one tool
//! 4. `assistant/ask` → run the full conversation loop
//! 5. Client closes stdin → server exits

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::agent::{Agent, AgentConfig};
use crate::provider::OpenAiClient;
use crate::tools::{ToolInvocation, ToolKind, Toolbox};

/// Maximum size of a single JSON-RPC line (10 MiB).
const MAX_LINE_BYTES: usize = 10 * 1024 * 1024;

/// MCP protocol revision this server implements.
const PROTOCOL_VERSION: &str = "2024-11-05";

// ---------------------------------------------------------------------------
// JSON-RPC 2.0 types
// ---------------------------------------------------------------------------

/// JSON-RPC 2.0 request.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub id: Option<serde_json::Value>,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 response.
#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// MCP protocol types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServerInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolsCapability {
    list_changed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InitializeResult {
    protocol_version: String,
    capabilities: ServerCapabilities,
    server_info: ServerInfo,
}

/// Tool definition for `tools/list`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolsListResult {
    tools: Vec<ToolDefinition>,
}

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

/// Content item in a `tools/call` response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

/// `tools/call` result.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    pub content: Vec<ContentItem>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

#[derive(Debug, Deserialize)]
struct AskParams {
    user_input: String,
    api_key: String,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Serialize)]
struct AskResult {
    response: String,
    data: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Working directory for file operations and command execution.
    pub workspace: PathBuf,
    /// Turn cap handed to the conversation loop.
    pub max_turns: usize,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            workspace: PathBuf::from("."),
            max_turns: AgentConfig::default().max_turns,
        }
    }
}

/// MCP server state. One instance per transport session; the initialized
/// flag lives here, not in a process-wide global.
pub struct McpServer {
    toolbox: Toolbox,
    agent_config: AgentConfig,
    initialized: bool,
}

impl McpServer {
    #[must_use]
    pub fn new(config: &McpServerConfig) -> Self {
        Self {
            toolbox: Toolbox::new(config.workspace.clone()),
            agent_config: AgentConfig {
                max_turns: config.max_turns,
            },
            initialized: false,
        }
    }

    /// Dispatch one JSON-RPC request. `None` means no response is written
    /// (notifications).
    pub fn dispatch(&mut self, req: &JsonRpcRequest) -> Option<JsonRpcResponse> {
        match req.method.as_str() {
            "initialize" => Some(self.handle_initialize(req)),
            "notifications/initialized" => {
                info!("client initialized");
                None
            }
            "ping" => Some(success_response(req.id.clone(), &serde_json::json!({}))),
            "tools/list" => Some(self.require_init(req, Self::handle_tools_list)),
            "tools/call" => Some(self.require_init(req, Self::handle_tools_call)),
            "assistant/ask" => Some(self.require_init(req, Self::handle_ask)),
            _ => {
                warn!(method = req.method, "unknown method");
                Some(error_response(
                    req.id.clone(),
                    -32601,
                    &format!("method not found: {}", req.method),
                ))
            }
        }
    }

    fn require_init(
        &mut self,
        req: &JsonRpcRequest,
        handler: fn(&mut Self, &JsonRpcRequest) -> JsonRpcResponse,
    ) -> JsonRpcResponse {
        if self.initialized {
            handler(self, req)
        } else {
            error_response(req.id.clone(), -32603, "server not initialized")
        }
    }

    fn handle_initialize(&mut self, req: &JsonRpcRequest) -> JsonRpcResponse {
        if self.initialized {
            return error_response(req.id.clone(), -32603, "server already initialized");
        }
        self.initialized = true;

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_owned(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: "step-coder".to_owned(),
                version: env!("CARGO_PKG_VERSION").to_owned(),
            },
        };
        success_response(req.id.clone(), &result)
    }

    fn handle_tools_list(&mut self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.toolbox.definitions(),
        };
        success_response(req.id.clone(), &result)
    }

    /// Execute one tool with named JSON arguments.
    ///
    /// Tool failures are successful JSON-RPC responses with
    /// `isError: true` — only malformed params produce an RPC error.
    fn handle_tools_call(&mut self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let params: ToolCallParams = match serde_json::from_value(req.params.clone()) {
            Ok(p) => p,
            Err(e) => {
                return error_response(
                    req.id.clone(),
                    -32602,
                    &format!("invalid tools/call params: {e}"),
                );
            }
        };

        let Some(kind) = ToolKind::from_name(&params.name) else {
            return error_response(
                req.id.clone(),
                -32601,
                &format!("tool not found: {}", params.name),
            );
        };

        let str_arg = |key: &str| -> String {
            params
                .arguments
                .get(key)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_owned()
        };

        let invocation = ToolInvocation {
            kind,
            arg: match kind {
                ToolKind::RunCommand => str_arg("cmd"),
                _ => str_arg("file_path"),
            },
            content: str_arg("content"),
        };

        if invocation.arg.is_empty() {
            return error_response(
                req.id.clone(),
                -32602,
                &format!("missing required argument for {}", params.name),
            );
        }

        let text = self.toolbox.invoke(&invocation, "");
        let result = ToolCallResult {
            is_error: text.starts_with("Error") || text.starts_with("Blocked"),
            content: vec![ContentItem {
                content_type: "text".to_owned(),
                text,
            }],
        };
        success_response(req.id.clone(), &result)
    }

    /// Run the conversation loop for one user request.
    ///
    /// API-key shape is validated here, at the service boundary — the core
    /// only ever sees a ready-to-use credential.
    fn handle_ask(&mut self, req: &JsonRpcRequest) -> JsonRpcResponse {
        let params: AskParams = match serde_json::from_value(req.params.clone()) {
            Ok(p) => p,
            Err(e) => {
                return error_response(
                    req.id.clone(),
                    -32602,
                    &format!("invalid assistant/ask params: {e}"),
                );
            }
        };

        if params.user_input.is_empty() {
            return error_response(req.id.clone(), -32602, "user_input is required");
        }
        let api_key = params.api_key.trim();
        if !(api_key.starts_with("sk-") && api_key.len() >= 40) {
            return error_response(req.id.clone(), -32602, "invalid API key format");
        }

        let model = OpenAiClient::new(api_key, params.model.as_deref());
        let agent = Agent::new(
            Toolbox::new(self.toolbox.workspace().to_path_buf()),
            self.agent_config.clone(),
        );

        let run = agent.run(&model, &params.user_input, None);
        let response = match run.reply {
            Ok(reply) => reply,
            Err(e) => format!("Error: {e}"),
        };

        let result = AskResult {
            response,
            data: serde_json::json!({}),
        };
        success_response(req.id.clone(), &result)
    }
}

// ---------------------------------------------------------------------------
// Transport loop
// ---------------------------------------------------------------------------

/// Run the MCP server on stdin/stdout until stdin closes.
///
/// # Errors
///
/// Returns an error if stdin/stdout I/O fails fatally.
pub fn run_mcp_server(config: &McpServerConfig) -> Result<()> {
    info!(
        workspace = %config.workspace.display(),
        max_turns = config.max_turns,
        "step-coder MCP server starting"
    );

    let mut server = McpServer::new(config);
    let stdin = std::io::stdin();
    let mut reader = std::io::BufReader::new(stdin.lock());
    let mut stdout = std::io::stdout().lock();
    let mut line_buf = String::new();

    loop {
        line_buf.clear();
        let bytes_read = read_line_limited(&mut reader, &mut line_buf, MAX_LINE_BYTES)
            .context("failed to read from stdin")?;

        // EOF — client closed stdin, clean exit.
        if bytes_read == 0 {
            info!("stdin closed, shutting down");
            break;
        }

        let trimmed = line_buf.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!(raw = trimmed, "received request");

        let request: JsonRpcRequest = match serde_json::from_str(trimmed) {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "invalid JSON-RPC request");
                let resp = error_response(None, -32700, &format!("parse error: {e}"));
                write_response(&mut stdout, &resp)?;
                continue;
            }
        };

        if request.jsonrpc != "2.0" {
            let resp = error_response(
                request.id.clone(),
                -32600,
                &format!(
                    "invalid request: jsonrpc version must be \"2.0\", got \"{}\"",
                    request.jsonrpc
                ),
            );
            write_response(&mut stdout, &resp)?;
            continue;
        }

        // Per JSON-RPC 2.0, notifications (no id) never receive a response.
        let is_notification = request.id.is_none();
        let response = server.dispatch(&request);

        if is_notification {
            debug!(method = request.method, "notification handled (no response)");
            continue;
        }

        if let Some(resp) = response {
            write_response(&mut stdout, &resp)?;
        }
    }

    info!("step-coder MCP server stopped");
    Ok(())
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn success_response(id: Option<serde_json::Value>, result: &impl Serialize) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(v) => JsonRpcResponse {
            jsonrpc: "2.0".to_owned(),
            id,
            result: Some(v),
            error: None,
        },
        Err(e) => {
            error!(error = %e, "failed to serialize success response");
            JsonRpcResponse {
                jsonrpc: "2.0".to_owned(),
                id,
                result: None,
                error: Some(JsonRpcError {
                    code: -32603,
                    message: format!("internal error: failed to serialize result: {e}"),
                    data: None,
                }),
            }
        }
    }
}

fn error_response(id: Option<serde_json::Value>, code: i64, message: &str) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0".to_owned(),
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_owned(),
            data: None,
        }),
    }
}

/// Write a JSON-RPC response as a single line to stdout.
fn write_response(out: &mut impl Write, resp: &JsonRpcResponse) -> Result<()> {
    let json = serde_json::to_string(resp).context("failed to serialize response")?;
    debug!(response = json, "sending response");
    out.write_all(json.as_bytes())
        .context("failed to write to stdout")?;
    out.write_all(b"\n")
        .context("failed to write newline to stdout")?;
    out.flush().context("failed to flush stdout")?;
    Ok(())
}

/// Read a line from `reader` into `buf`, stopping at newline or `max_bytes`.
///
/// Returns the number of bytes read (0 = EOF). If the line exceeds
/// `max_bytes`, the rest of the line is consumed and discarded, and an
/// error is returned.
fn read_line_limited(
    reader: &mut impl BufRead,
    buf: &mut String,
    max_bytes: usize,
) -> Result<usize> {
    let mut total = 0usize;
    loop {
        let available = reader.fill_buf().context("stdin fill_buf failed")?;
        if available.is_empty() {
            return Ok(total); // EOF
        }
        let (consumed, found_newline) = match available.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (available.len(), false),
        };
        if total + consumed > max_bytes {
            reader.consume(consumed);
            if !found_newline {
                // Drain the oversized line before erroring out.
                loop {
                    let rest = reader.fill_buf().context("stdin fill_buf failed")?;
                    if rest.is_empty() {
                        break;
                    }
                    let eat = match rest.iter().position(|&b| b == b'\n') {
                        Some(pos) => {
                            reader.consume(pos + 1);
                            break;
                        }
                        None => rest.len(),
                    };
                    reader.consume(eat);
                }
            }
            anyhow::bail!("line exceeds maximum size ({max_bytes} bytes)");
        }
        let chunk = std::str::from_utf8(&available[..consumed])
            .context("non-UTF-8 data on stdin")?;
        buf.push_str(chunk);
        total += consumed;
        reader.consume(consumed);
        if found_newline {
            return Ok(total);
        }
    }
}
