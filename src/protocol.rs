//! Step protocol — the structured decision object the model emits each turn.
//!
//! Every model response must decode as one JSON object of the shape
//! `{ "step": "START" | "PLAN" | "TOOL" | "OUTPUT", "content"?, "tool"?, "input"? }`.
//! A decode failure is terminal for the current run: the loop exits
//! immediately surfacing the raw text, it does not retry.

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult};

/// The kind of step the model chose for this turn.
///
/// `START` is the model acknowledging the user input; it is treated
/// exactly like `PLAN` (record and continue).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Plan,
    Tool,
    Output,
}

/// One parsed decision object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepRecord {
    /// Step identifier as emitted by the model (e.g. "PLAN", "TOOL").
    pub step: String,
    /// Free-text content for PLAN/OUTPUT steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Tool name for TOOL steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    /// Raw tool input for TOOL steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,
}

impl StepRecord {
    /// Classify the step identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnrecognizedStep`] for identifiers outside the
    /// protocol. The reference behavior fell through silently; an explicit
    /// error is the safer contract.
    pub fn kind(&self) -> AgentResult<StepKind> {
        match self.step.to_uppercase().as_str() {
            "START" | "PLAN" => Ok(StepKind::Plan),
            "TOOL" => Ok(StepKind::Tool),
            "OUTPUT" => Ok(StepKind::Output),
            _ => Err(AgentError::UnrecognizedStep {
                kind: self.step.clone(),
            }),
        }
    }
}

/// Parse one model response into a [`StepRecord`].
///
/// # Errors
///
/// Returns [`AgentError::Protocol`] carrying the raw text and the decode
/// error when the response is not a conforming step object.
pub fn parse_step(raw: &str) -> AgentResult<StepRecord> {
    serde_json::from_str(raw).map_err(|e| AgentError::Protocol {
        raw: raw.to_owned(),
        reason: e.to_string(),
    })
}

/// JSON Schema for the step object, sent to the model as a structured
/// output constraint.
#[must_use]
pub fn step_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "step": {
                "type": "string",
                "description": "The ID of the step. One of START, PLAN, TOOL, OUTPUT."
            },
            "content": {
                "type": ["string", "null"],
                "description": "The optional string content for the step"
            },
            "tool": {
                "type": ["string", "null"],
                "description": "The ID of the tool to call"
            },
            "input": {
                "type": ["string", "null"],
                "description": "The input params for the tool"
            }
        },
        "required": ["step"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_step() {
        let step = parse_step(r#"{"step":"PLAN","content":"think first"}"#)
            .expect("valid step");
        assert_eq!(step.kind().expect("known kind"), StepKind::Plan);
        assert_eq!(step.content.as_deref(), Some("think first"));
    }

    #[test]
    fn start_is_treated_as_plan() {
        let step = parse_step(r#"{"step":"START","content":"hi"}"#).expect("valid step");
        assert_eq!(step.kind().expect("known kind"), StepKind::Plan);
    }

    #[test]
    fn parses_tool_step_with_input() {
        let step = parse_step(
            r#"{"step":"TOOL","tool":"analyze_code","input":"main.py"}"#,
        )
        .expect("valid step");
        assert_eq!(step.kind().expect("known kind"), StepKind::Tool);
        assert_eq!(step.tool.as_deref(), Some("analyze_code"));
        assert_eq!(step.input.as_deref(), Some("main.py"));
    }

    #[test]
    fn malformed_json_is_a_protocol_error() {
        let err = parse_step("not json at all").expect_err("must fail");
        match err {
            AgentError::Protocol { raw, .. } => assert_eq!(raw, "not json at all"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_step_kind_is_an_explicit_error() {
        let step = parse_step(r#"{"step":"REFLECT"}"#).expect("decodes fine");
        let err = step.kind().expect_err("must be rejected");
        match err {
            AgentError::UnrecognizedStep { kind } => assert_eq!(kind, "REFLECT"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
