//! Canonical JSON encoder for the StartVoiceChat request body
//!
//! Key order is part of the wire contract, so the body is assembled by hand
//! rather than through a generic serializer whose map ordering is
//! unspecified. The output of a single `encode` call is the exact byte
//! sequence that gets hashed into the canonical request and sent as the HTTP
//! body; it must never be re-serialized.

use crate::request::{
    AgentConfig, Config, LlmConfig, ProviderConfig, StartVoiceChatRequest, UserPrompt, Value,
};

/// Serialize a request into its canonical JSON form. Total and pure: the
/// same value always yields byte-identical output, and no value shape fails.
pub fn encode(req: &StartVoiceChatRequest) -> String {
    let mut out = String::new();
    out.push('{');
    out.push_str("\"AppId\":");
    push_json_string(&mut out, &req.app_id);
    out.push_str(",\"RoomId\":");
    push_json_string(&mut out, &req.room_id);
    out.push_str(",\"TaskId\":");
    push_json_string(&mut out, &req.task_id);
    out.push_str(",\"Config\":");
    encode_config(&mut out, &req.config);
    out.push_str(",\"AgentConfig\":");
    encode_agent(&mut out, &req.agent_config);
    out.push('}');
    out
}

fn encode_config(out: &mut String, config: &Config) {
    out.push('{');
    let mut first = true;
    if let Some(asr) = &config.asr_config {
        sep(out, &mut first);
        out.push_str("\"ASRConfig\":");
        encode_provider_config(out, asr);
    }
    if let Some(tts) = &config.tts_config {
        sep(out, &mut first);
        out.push_str("\"TTSConfig\":");
        encode_provider_config(out, tts);
    }
    if let Some(llm) = &config.llm_config {
        sep(out, &mut first);
        out.push_str("\"LLMConfig\":");
        encode_llm_config(out, llm);
    }
    if let Some(mode) = config.interrupt_mode {
        sep(out, &mut first);
        out.push_str("\"InterruptMode\":");
        out.push_str(&mode.to_string());
    }
    out.push('}');
}

fn encode_provider_config(out: &mut String, pc: &ProviderConfig) {
    out.push('{');
    out.push_str("\"Provider\":");
    push_json_string(out, &pc.provider);
    out.push_str(",\"ProviderParams\":");
    encode_value(out, &pc.provider_params);
    out.push('}');
}

fn encode_llm_config(out: &mut String, llm: &LlmConfig) {
    out.push('{');
    out.push_str("\"Mode\":");
    push_json_string(out, &llm.mode);
    out.push_str(",\"EndPointId\":");
    push_json_string(out, &llm.end_point_id);
    if let Some(v) = llm.max_tokens {
        out.push_str(",\"MaxTokens\":");
        out.push_str(&v.to_string());
    }
    if let Some(v) = llm.temperature {
        out.push_str(",\"Temperature\":");
        out.push_str(&v.to_string());
    }
    if let Some(v) = llm.top_p {
        out.push_str(",\"TopP\":");
        out.push_str(&v.to_string());
    }
    if let Some(v) = &llm.thinking_type {
        out.push_str(",\"ThinkingType\":");
        push_json_string(out, v);
    }
    if let Some(v) = llm.history_length {
        out.push_str(",\"HistoryLength\":");
        out.push_str(&v.to_string());
    }
    if let Some(v) = &llm.system_messages {
        out.push_str(",\"SystemMessages\":");
        encode_string_list(out, v);
    }
    if let Some(v) = &llm.user_prompts {
        out.push_str(",\"UserPrompts\":");
        encode_user_prompts(out, v);
    }
    if let Some(v) = &llm.vision_config {
        out.push_str(",\"VisionConfig\":{\"Enable\":");
        out.push_str(if v.enable { "true" } else { "false" });
        out.push('}');
    }
    out.push('}');
}

fn encode_user_prompts(out: &mut String, prompts: &[UserPrompt]) {
    out.push('[');
    for (idx, prompt) in prompts.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        out.push_str("{\"Role\":");
        push_json_string(out, &prompt.role);
        out.push_str(",\"Content\":");
        push_json_string(out, &prompt.content);
        out.push('}');
    }
    out.push(']');
}

fn encode_agent(out: &mut String, agent: &AgentConfig) {
    out.push('{');
    out.push_str("\"TargetUserId\":");
    encode_string_list(out, &agent.target_user_id);
    out.push_str(",\"UserId\":");
    push_json_string(out, &agent.user_id);
    if let Some(v) = &agent.welcome_message {
        out.push_str(",\"WelcomeMessage\":");
        push_json_string(out, v);
    }
    if let Some(v) = agent.enable_conversation_state_callback {
        out.push_str(",\"EnableConversationStateCallback\":");
        out.push_str(if v { "true" } else { "false" });
    }
    out.push('}');
}

fn encode_string_list(out: &mut String, list: &[String]) {
    out.push('[');
    for (idx, item) in list.iter().enumerate() {
        if idx > 0 {
            out.push(',');
        }
        push_json_string(out, item);
    }
    out.push(']');
}

/// Recursive encoding for the open provider-parameter bag. Null entries are
/// skipped inside containers; unknown shapes (`Value::Other`) degrade to a
/// quoted string so encoding stays total over arbitrary provider payloads.
fn encode_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(v) => out.push_str(if *v { "true" } else { "false" }),
        Value::Int(v) => out.push_str(&v.to_string()),
        Value::Float(v) => out.push_str(&v.to_string()),
        Value::String(v) => push_json_string(out, v),
        Value::Array(items) => {
            out.push('[');
            let mut first = true;
            for item in items {
                if matches!(item, Value::Null) {
                    continue;
                }
                sep(out, &mut first);
                encode_value(out, item);
            }
            out.push(']');
        }
        Value::Object(entries) => {
            out.push('{');
            let mut first = true;
            for (key, item) in entries {
                if matches!(item, Value::Null) {
                    continue;
                }
                sep(out, &mut first);
                push_json_string(out, key);
                out.push(':');
                encode_value(out, item);
            }
            out.push('}');
        }
        Value::Other(v) => push_json_string(out, v),
    }
}

fn sep(out: &mut String, first: &mut bool) {
    if *first {
        *first = false;
    } else {
        out.push(',');
    }
}

fn push_json_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            // everything else passes through as raw UTF-8
            _ => out.push(c),
        }
    }
    out.push('"');
}
