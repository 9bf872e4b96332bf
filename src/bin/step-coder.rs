//! step-coder -- standalone MCP coding assistant agent.
//!
//! Usage: step-coder --workspace <path> [--max-turns <n>]

fn main() -> anyhow::Result<()> {
    // Initialize tracing to stderr so it does not interfere with MCP stdio.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let workspace = flag_value("--workspace").unwrap_or_else(|| ".".to_string());
    let workspace = std::path::Path::new(&workspace).canonicalize()?;

    let max_turns = flag_value("--max-turns")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(|| step_coder::AgentConfig::default().max_turns);

    let config = step_coder::server::McpServerConfig {
        workspace,
        max_turns,
    };

    step_coder::run_mcp_server(&config)
}

fn flag_value(flag: &str) -> Option<String> {
    std::env::args().skip_while(|a| a != flag).nth(1)
}
