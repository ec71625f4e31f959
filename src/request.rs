//! StartVoiceChat request payload model
//!
//! Field names on the wire are fixed by the OpenAPI schema and emitted by
//! crate::encode; these types only carry the values.

#[derive(Debug, Clone, PartialEq)]
pub struct StartVoiceChatRequest {
    pub app_id: String,
    pub room_id: String,
    pub task_id: String,
    pub config: Config,
    pub agent_config: AgentConfig,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Config {
    pub asr_config: Option<ProviderConfig>,
    pub tts_config: Option<ProviderConfig>,
    pub llm_config: Option<LlmConfig>,
    pub interrupt_mode: Option<i64>,
}

/// Speech provider selection plus its free-form parameter bag. The bag shape
/// is provider-specific and not validated here.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderConfig {
    pub provider: String,
    pub provider_params: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub mode: String,
    pub end_point_id: String,
    pub max_tokens: Option<i64>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub thinking_type: Option<String>,
    pub history_length: Option<i64>,
    pub system_messages: Option<Vec<String>>,
    pub user_prompts: Option<Vec<UserPrompt>>,
    pub vision_config: Option<VisionConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserPrompt {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct VisionConfig {
    pub enable: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub target_user_id: Vec<String>,
    pub user_id: String,
    pub welcome_message: Option<String>,
    pub enable_conversation_state_callback: Option<bool>,
}

/// JSON-ish value for provider parameter bags.
///
/// `Object` keeps entries as an ordered list of pairs so the encoded output
/// is deterministic within a process. `Other` is the catch-all for shapes
/// with no JSON mapping; it encodes as a quoted string rather than failing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(Vec<(String, Value)>),
    Other(String),
}

impl Value {
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v))
                .collect(),
        )
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::Array(v.into_iter().map(Into::into).collect())
    }
}
