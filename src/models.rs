use serde::{Deserialize, Serialize};

// What the model extracted from a description
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExternalAnalysis {
    #[serde(default)]
    pub what: Option<String>,
    #[serde(default)]
    pub whom: Option<String>,
    #[serde(default)]
    pub r#where: Option<String>,
}

// Response body for a validated description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub score: u8,
    pub has_what: bool,
    pub has_whom: bool,
    pub has_where: bool,
    pub missing: Vec<String>,
    pub analysis: ExternalAnalysis,
    pub suggestions: Vec<String>,
}

// Chat completions request format
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub n: u8,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

// Chat completions response format
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}
