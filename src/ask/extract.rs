use crate::api::Message;
use serde::Deserialize;
use serde_json::Value;

/// Tool name that marks a content block as an interactive question request.
pub const ASK_TOOL_NAME: &str = "AskUserQuestion";

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionOption {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Question {
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default, rename = "multiSelect")]
    pub multi_select: bool,
}

/// An interactive question-set embedded in one message, scoped to the
/// lifetime of one presentation.
#[derive(Debug, Clone)]
pub struct AskRequest {
    pub tool_use_id: String,
    pub questions: Vec<Question>,
}

/// Scan a message's content blocks for question-tool calls. Pure; non-array
/// or absent content yields an empty result, never an error. Requests whose
/// question list comes up empty are dropped.
#[must_use]
pub fn extract_ask_requests(message: &Message) -> Vec<AskRequest> {
    let Some(blocks) = message.payload.get("content").and_then(Value::as_array) else {
        return Vec::new();
    };

    blocks
        .iter()
        .filter(|block| block.get("name").and_then(Value::as_str) == Some(ASK_TOOL_NAME))
        .filter_map(|block| {
            let questions: Vec<Question> = block
                .get("input")
                .and_then(|input| input.get("questions"))
                .and_then(Value::as_array)
                .map(|entries| {
                    entries
                        .iter()
                        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                        .collect()
                })
                .unwrap_or_default();
            if questions.is_empty() {
                return None;
            }
            Some(AskRequest {
                tool_use_id: block
                    .get("id")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string(),
                questions,
            })
        })
        .collect()
}
