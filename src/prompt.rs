pub const TEMPERATURE: f32 = 0.3;
pub const MAX_TOKENS: u32 = 200;

// One completion request - the prompt pair plus sampling settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    pub fn for_description(description: &str) -> Self {
        Self {
            system: system_prompt().to_string(),
            user: user_prompt(description),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        }
    }
}

pub fn system_prompt() -> &'static str {
    "You are a business analyst. Respond only with valid JSON."
}

pub fn user_prompt(description: &str) -> String {
    format!(
        r#"You are a STRICT business description validator. Only mark information as present if it is EXPLICITLY stated in the description. Never infer or assume anything that is not directly mentioned.

Business description:
"{description}"

For each category, return the exact wording from the description if it is explicitly stated, otherwise return null:

1. WHAT: the service or product, only if explicitly mentioned (e.g. "web development", "plumbing", "marketing"). A plain statement such as "I make websites" counts as WHAT.

2. WHOM: the target customers or clients, only if explicitly mentioned (e.g. "for small businesses", "homeowners", "tech startups"). Do not infer this from the service.

3. WHERE: the location or geographic area, only if explicitly mentioned (e.g. "in Austin", "Texas", "Bay Area", "nationwide"). Do not infer this from anything else.

Be extremely strict. Anything not explicitly mentioned is null.

Respond ONLY with valid JSON:
{{
  "what": "exact service/product mentioned or null",
  "whom": "exact target customer mentioned or null",
  "where": "exact location mentioned or null"
}}"#
    )
}
