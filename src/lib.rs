//! `step-coder` — step-protocol coding assistant agent.
//!
//! Drives a language model through a structured step protocol
//! (PLAN / TOOL / OUTPUT), dispatches a small fixed set of file-system and
//! shell tools, and feeds observations back until the model produces a
//! final answer. Shell commands pass a safety filter before execution.
//! Exposed over the Model Context Protocol (JSON-RPC 2.0 on stdio,
//! newline-delimited).
//!
//! # Tools
//!
//! - `run_command` — safety-gated shell execution (exit code only)
//! - `create_file` — file creation with project-container inference
//! - `read_file` — file reading with container resolution
//! - `write_file` — overwrite-only file update
//! - `analyze_code` — line-prefix structure report
//!
//! # Architecture
//!
//! ```text
//! stdin (JSON-RPC) → McpServer ─┬→ Toolbox → tool implementations
//!                               └→ Agent loop → ChatModel (HTTP)
//!                                       ↓            ↑
//!                                   Toolbox → observation appended
//! stdout (JSON-RPC) ←───────────────────────────────┘
//! ```

pub mod agent;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod safety;
pub mod server;
pub mod tools;
pub mod util;

pub use agent::{Agent, AgentConfig, RunResult};
pub use error::{AgentError, AgentResult};
pub use server::run_mcp_server;
