//! Conversation loop — the agent core.
//!
//! Owns the message history for one run: query the model, parse the step
//! it emitted, route it (plan / tool / output), append the observation,
//! repeat. Strictly sequential — exactly one model call, one parse, and at
//! most one tool invocation per iteration, no speculative or parallel
//! execution. The loop ends when the model emits OUTPUT, a protocol or
//! transport failure occurs, or the turn cap is hit.

use tracing::{debug, info, warn};

use crate::error::{AgentError, AgentResult};
use crate::protocol::{parse_step, StepKind, StepRecord};
use crate::provider::{ChatModel, Message, Role};
use crate::tools::{Toolbox, ToolInvocation};

/// System instruction seeded as the first message of every conversation.
pub const SYSTEM_PROMPT: &str = r#"You're an expert AI Coding Assistant that helps with programming tasks using chain of thought reasoning.
You work on START, PLAN and OUTPUT steps.
You need to first PLAN what needs to be done. The PLAN can be multiple steps.
Once you think enough PLAN has been done, finally you can give an OUTPUT.
You can also call tools if required from the list of available tools.
For every tool call wait for the observe step which is the output from the called tool.

Rules:
- Strictly follow the given JSON output format.
- Only run one step at a time.
- The sequence of steps is START (where user gives an input), PLAN (that can repeat) and finally OUTPUT.
- Always think step by step about coding problems.
- Break down complex coding tasks into manageable steps.

Output JSON Format:
{ "step": "START" | "PLAN" | "OUTPUT" | "TOOL", "content": "string", "tool": "string", "input": "string" }

Available Tools:
- run_command(cmd): Execute SAFE system commands only (git, read-only package-manager queries, version checks, directory listing). Dangerous operations are blocked; only the exit code is reported.
- create_file(file_path, content): Create a new file. Input is the file path, a newline, then the content. Project folders (todo_app, web_app, python_project, ...) are created automatically for bare filenames.
- read_file(file_path): Read an existing file. Project folders are searched when the literal path is absent.
- write_file(file_path, content): Overwrite an existing file. Input is the file path, a newline, then the content. Fails if the file does not exist - use create_file instead.
- analyze_code(file_path): Report line, import, function and class counts for a code file.

Example:
START: Analyze the code in main.py
PLAN: { "step": "PLAN", "content": "User wants me to analyze their main.py file" }
TOOL: { "step": "TOOL", "tool": "analyze_code", "input": "main.py" }
OBSERVE: { "step": "OBSERVE", "tool": "analyze_code", "output": "Code Analysis for 'main.py': ..." }
OUTPUT: { "step": "OUTPUT", "content": "main.py has 25 lines with 3 imports, 2 functions and 1 class." }
"#;

/// Loop configuration. Constructed per agent instance; there is no
/// process-wide mutable state.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Maximum model calls before the run is abandoned with
    /// [`AgentError::TurnLimit`]. The reference behavior was unbounded,
    /// which lets a misbehaving model loop forever.
    pub max_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self { max_turns: 25 }
    }
}

/// The outcome of one run: the final answer (or the error that ended the
/// run) plus the full message trail, observations included, for audit.
#[derive(Debug)]
pub struct RunResult {
    pub reply: AgentResult<String>,
    pub history: Vec<Message>,
}

/// The agent core: a toolbox bound to a workspace plus loop configuration.
pub struct Agent {
    toolbox: Toolbox,
    config: AgentConfig,
}

impl Agent {
    #[must_use]
    pub fn new(toolbox: Toolbox, config: AgentConfig) -> Self {
        Self { toolbox, config }
    }

    /// Run one conversation to completion.
    ///
    /// `history` carries over prior turns; when absent (or not seeded) the
    /// system instruction is inserted first. The history is owned by this
    /// invocation — the caller's copy is never mutated.
    #[must_use]
    pub fn run(
        &self,
        model: &dyn ChatModel,
        user_query: &str,
        history: Option<Vec<Message>>,
    ) -> RunResult {
        let mut history = history.unwrap_or_default();
        if !matches!(history.first(), Some(m) if m.role == Role::System) {
            history.insert(0, Message::new(Role::System, SYSTEM_PROMPT));
        }
        history.push(Message::new(Role::User, user_query));

        for turn in 1..=self.config.max_turns {
            debug!(turn, "requesting model step");

            let raw = match model.complete(&history) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(error = %e, "model request failed, ending run");
                    return RunResult {
                        reply: Err(AgentError::Transport(format!("{e:#}"))),
                        history,
                    };
                }
            };
            history.push(Message::new(Role::Assistant, raw.clone()));

            let step = match parse_step(&raw) {
                Ok(step) => step,
                Err(e) => {
                    warn!(error = %e, "unparseable model step, ending run");
                    return RunResult {
                        reply: Err(e),
                        history,
                    };
                }
            };

            match step.kind() {
                Ok(StepKind::Plan) => {
                    debug!(content = step.content.as_deref().unwrap_or(""), "plan step");
                }
                Ok(StepKind::Tool) => {
                    let observation = self.observe(&step, user_query);
                    history.push(observation);
                }
                Ok(StepKind::Output) => {
                    let reply = step.content.unwrap_or_default();
                    info!(turns = turn, "run complete");
                    return RunResult {
                        reply: Ok(reply),
                        history,
                    };
                }
                Err(e) => {
                    warn!(step = %step.step, "unrecognized step kind, ending run");
                    return RunResult {
                        reply: Err(e),
                        history,
                    };
                }
            }
        }

        warn!(limit = self.config.max_turns, "turn limit exceeded");
        RunResult {
            reply: Err(AgentError::TurnLimit {
                limit: self.config.max_turns,
            }),
            history,
        }
    }

    /// Execute one TOOL step and wrap the result as an observation message.
    ///
    /// Tool failures of any kind (unknown name, missing input, execution
    /// error) become the observation text — the loop always continues after
    /// a tool step.
    fn observe(&self, step: &StepRecord, user_query: &str) -> Message {
        let tool = step.tool.as_deref().unwrap_or_default();
        let input = step.input.as_deref().unwrap_or_default();

        let output = match ToolInvocation::from_step(step.tool.as_deref(), step.input.as_deref()) {
            Ok(invocation) => self.toolbox.invoke(&invocation, user_query),
            Err(error_text) => {
                warn!(tool, "tool invocation rejected: {error_text}");
                error_text
            }
        };

        let payload = serde_json::json!({
            "step": "OBSERVE",
            "tool": tool,
            "input": input,
            "output": output,
        });
        Message::new(Role::Observation, payload.to_string())
    }
}
