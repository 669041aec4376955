//! Single-agent task runner: one persona, one task, optional function tools
//! and a structured JSON answer.

use std::future::Future;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::services::llm_provider::{ChatMessage, ChatModel, ChatRequest, LLMError, ToolSpec};

const MAX_TOOL_ROUNDS: usize = 4;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LLMError),
    #[error("agent returned no output")]
    EmptyOutput,
}

/// What the model produced: the requested structure, or plain text when the
/// reply could not be read as that structure.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutcome<T> {
    Structured(T),
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct AgentSpec {
    pub role: &'static str,
    pub goal: &'static str,
    pub backstory: &'static str,
    pub task: String,
    pub expected_output: &'static str,
}

impl AgentSpec {
    fn system_prompt(&self) -> String {
        format!(
            "You are {}.\n{}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }

    fn task_prompt(&self) -> String {
        format!(
            "{}\n\nThis is the expected criteria for your final answer: {}\n\
             Respond with a single JSON object and nothing else.",
            self.task, self.expected_output
        )
    }
}

/// Function tools an agent may call while working on its task.
pub trait Toolbox: Send + Sync {
    fn specs(&self) -> Vec<ToolSpec>;

    /// Runs a tool and returns the text handed back to the model. Tool
    /// failures are reported in the text, never as errors.
    fn invoke(&self, name: &str, arguments: &str) -> impl Future<Output = String> + Send;
}

pub struct NoTools;

impl Toolbox for NoTools {
    fn specs(&self) -> Vec<ToolSpec> {
        Vec::new()
    }

    async fn invoke(&self, name: &str, _arguments: &str) -> String {
        format!("Unknown tool: {name}")
    }
}

pub async fn run_agent<M, B, T>(
    model: &M,
    spec: &AgentSpec,
    toolbox: &B,
) -> Result<AgentOutcome<T>, AgentError>
where
    M: ChatModel,
    B: Toolbox,
    T: DeserializeOwned,
{
    let mut messages = vec![
        ChatMessage::system(spec.system_prompt()),
        ChatMessage::user(spec.task_prompt()),
    ];
    let tools = toolbox.specs();

    for round in 0..=MAX_TOOL_ROUNDS {
        // Last round forces a final answer.
        let offer_tools = round < MAX_TOOL_ROUNDS && !tools.is_empty();
        let request = ChatRequest {
            messages: messages.clone(),
            tools: if offer_tools { tools.clone() } else { Vec::new() },
            json_output: true,
        };

        let response = model.chat(&request).await?;
        let message = response.first_message().cloned().ok_or(AgentError::EmptyOutput)?;

        if offer_tools && !message.tool_calls.is_empty() {
            let calls = message.tool_calls.clone();
            messages.push(message);
            for call in calls {
                let result = toolbox.invoke(&call.function.name, &call.function.arguments).await;
                tracing::debug!(agent = spec.role, tool = %call.function.name, "tool call completed");
                messages.push(ChatMessage::tool_result(call.id, result));
            }
            continue;
        }

        let content = message.text().trim();
        if content.is_empty() {
            return Err(AgentError::EmptyOutput);
        }

        return Ok(match parse_structured::<T>(content) {
            Some(value) => AgentOutcome::Structured(value),
            None => {
                tracing::warn!(agent = spec.role, "agent output was not valid structured JSON");
                AgentOutcome::Raw(content.to_string())
            }
        });
    }

    Err(AgentError::EmptyOutput)
}

/// Reads a JSON object out of model text, tolerating code fences and prose
/// around the object.
pub fn parse_structured<T: DeserializeOwned>(raw: &str) -> Option<T> {
    let text = strip_code_fence(raw.trim());
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let rest = rest.trim();
    rest.strip_suffix("```").unwrap_or(rest).trim()
}


#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::testing::{json_reply, tool_call_reply, ScriptedModel};
    use super::*;
    use crate::services::llm_provider::ToolSpec;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        answer: String,
    }

    fn spec() -> AgentSpec {
        AgentSpec {
            role: "Tester",
            goal: "answer",
            backstory: "You answer questions.",
            task: "Say hi".into(),
            expected_output: "{\"answer\": string}",
        }
    }

    struct EchoTools;

    impl Toolbox for EchoTools {
        fn specs(&self) -> Vec<ToolSpec> {
            vec![ToolSpec {
                name: "echo",
                description: "echo the input",
                parameters: serde_json::json!({"type": "object"}),
            }]
        }

        async fn invoke(&self, name: &str, arguments: &str) -> String {
            format!("{name}:{arguments}")
        }
    }

    #[test]
    fn test_parse_structured_plain() {
        let parsed: Option<Answer> = parse_structured(r#"{"answer": "hi"}"#);
        assert_eq!(parsed, Some(Answer { answer: "hi".into() }));
    }

    #[test]
    fn test_parse_structured_fenced() {
        let parsed: Option<Answer> = parse_structured("```json\n{\"answer\": \"hi\"}\n```");
        assert_eq!(parsed, Some(Answer { answer: "hi".into() }));
    }

    #[test]
    fn test_parse_structured_with_prose() {
        let parsed: Option<Answer> = parse_structured("Sure! {\"answer\": \"hi\"} Hope that helps.");
        assert_eq!(parsed, Some(Answer { answer: "hi".into() }));
    }

    #[test]
    fn test_parse_structured_rejects_text() {
        let parsed: Option<Answer> = parse_structured("just words");
        assert!(parsed.is_none());
    }

    #[tokio::test]
    async fn test_run_agent_structured() {
        let model = ScriptedModel::new(vec![json_reply(serde_json::json!({"answer": "hi"}))]);
        let outcome: AgentOutcome<Answer> = run_agent(&model, &spec(), &NoTools).await.unwrap();
        assert_eq!(outcome, AgentOutcome::Structured(Answer { answer: "hi".into() }));

        let requests = model.requests.lock().unwrap();
        assert!(requests[0].json_output);
        assert!(requests[0].tools.is_empty());
        assert_eq!(requests[0].messages[0].role, "system");
    }

    #[tokio::test]
    async fn test_run_agent_raw_fallback() {
        let model = ScriptedModel::new(vec![ChatMessage::assistant("hello there")]);
        let outcome: AgentOutcome<Answer> = run_agent(&model, &spec(), &NoTools).await.unwrap();
        assert_eq!(outcome, AgentOutcome::Raw("hello there".into()));
    }

    #[tokio::test]
    async fn test_run_agent_empty_output() {
        let model = ScriptedModel::new(vec![ChatMessage::assistant("  ")]);
        let result: Result<AgentOutcome<Answer>, _> = run_agent(&model, &spec(), &NoTools).await;
        assert!(matches!(result, Err(AgentError::EmptyOutput)));
    }

    #[tokio::test]
    async fn test_run_agent_executes_tool_calls() {
        let model = ScriptedModel::new(vec![
            tool_call_reply("call_1", "echo", serde_json::json!({"x": 1})),
            json_reply(serde_json::json!({"answer": "done"})),
        ]);
        let outcome: AgentOutcome<Answer> = run_agent(&model, &spec(), &EchoTools).await.unwrap();
        assert_eq!(outcome, AgentOutcome::Structured(Answer { answer: "done".into() }));

        let requests = model.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        let tool_message = requests[1].messages.last().unwrap();
        assert_eq!(tool_message.role, "tool");
        assert_eq!(tool_message.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(tool_message.text(), "echo:{\"x\":1}");
    }

    #[tokio::test]
    async fn test_run_agent_stops_offering_tools() {
        let mut replies: Vec<ChatMessage> = (0..MAX_TOOL_ROUNDS)
            .map(|i| tool_call_reply(&format!("call_{i}"), "echo", serde_json::json!({})))
            .collect();
        replies.push(json_reply(serde_json::json!({"answer": "finally"})));
        let model = ScriptedModel::new(replies);

        let outcome: AgentOutcome<Answer> = run_agent(&model, &spec(), &EchoTools).await.unwrap();
        assert_eq!(outcome, AgentOutcome::Structured(Answer { answer: "finally".into() }));
        assert_eq!(model.request_count(), MAX_TOOL_ROUNDS + 1);
        assert!(model.requests.lock().unwrap().last().unwrap().tools.is_empty());
    }
}
