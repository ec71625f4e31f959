//! rtc:StartVoiceChat API client

pub const ACTION: &str = "StartVoiceChat";
pub const VERSION: &str = "2024-12-01";
pub const SERVICE_NAME: &str = "rtc";
pub const DEFAULT_REGION: &str = "cn-north-1";
pub const DEFAULT_HOST: &str = "rtc.volcengineapi.com";

/// Long-lived API credentials. Read-only after construction; the secret key
/// is redacted from `Debug` output and never appears on the wire (only HMAC
/// derivations of it do).
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key_id: String,
    pub secret_access_key: secrecy::SecretString,
    pub session_token: Option<String>,
}

impl Credentials {
    pub fn new(access_key_id: &str, secret_access_key: &str, session_token: Option<&str>) -> Self {
        Self {
            access_key_id: access_key_id.to_owned(),
            secret_access_key: secrecy::SecretString::new(secret_access_key.to_owned()),
            session_token: session_token.map(str::to_owned),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub region: String,
    pub host: String,
    pub timeout: Option<std::time::Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: DEFAULT_REGION.to_owned(),
            host: DEFAULT_HOST.to_owned(),
            timeout: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartVoiceChatResponse {
    pub result: String,
    pub request_id: Option<String>,
    /// Verbatim response body, retained for diagnostics even when the
    /// result/request id fields are missing.
    pub raw_body: String,
}

#[derive(Debug)]
pub struct Response {
    pub status: reqwest::StatusCode,
    pub body: String,
}

/// Narrow seam to the HTTP library. Implementations own pooling, TLS, and
/// timeouts; a timeout configured on the transport must abort the in-flight
/// socket operation.
pub trait Transport {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<Response, crate::error::Error>;
}

pub struct ReqwestTransport {
    http_client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<std::time::Duration>) -> Result<Self, crate::error::Error> {
        let mut builder = reqwest::blocking::ClientBuilder::new();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http_client: builder.build()?,
        })
    }
}

impl Transport for ReqwestTransport {
    fn post(
        &self,
        url: &str,
        headers: &[(String, String)],
        body: &str,
    ) -> Result<Response, crate::error::Error> {
        let mut request = self.http_client.post(url).body(body.to_owned());
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;
        Ok(Response { status, body })
    }
}

pub struct Client {
    transport: Box<dyn Transport + Send + Sync>,
    credentials: Credentials,
    config: Config,
}

impl Client {
    pub fn new(credentials: Credentials, config: Config) -> Result<Self, crate::error::Error> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(
            Box::new(transport),
            credentials,
            config,
        ))
    }

    pub fn with_transport(
        transport: Box<dyn Transport + Send + Sync>,
        credentials: Credentials,
        config: Config,
    ) -> Self {
        Self {
            transport,
            credentials,
            config,
        }
    }

    /// One-shot call: encode once, hash, sign with a fresh timestamp, POST.
    /// Blocks the calling thread for the duration of the round trip. Nothing
    /// is cached between calls; a retry needs a fresh signature anyway.
    pub fn start_voice_chat(
        &self,
        request: &crate::request::StartVoiceChatRequest,
    ) -> Result<StartVoiceChatResponse, crate::error::Error> {
        let body = crate::encode::encode(request);
        let body_sha256_hex = crate::sign::sha256_hex_string(body.as_bytes());
        let x_date = crate::time::now_x_date();

        let signed = crate::sign::sign(
            &crate::sign::SigningParams {
                host: &self.config.host,
                action: ACTION,
                version: VERSION,
                region: &self.config.region,
                service: SERVICE_NAME,
                method: "POST",
                credentials: &self.credentials,
            },
            &body_sha256_hex,
            &x_date,
        )?;

        tracing::debug!(url = %signed.url, x_date = %x_date, "calling StartVoiceChat");
        let response = self.transport.post(&signed.url, &signed.headers, &body)?;

        if !response.status.is_success() {
            return Err(crate::error::Error::ApiError(
                response.status,
                response.body,
            ));
        }
        Ok(parse_response(response.body))
    }
}

/// Lenient extraction over the response tree; the server does not guarantee
/// a fixed schema. Missing fields yield defaults rather than an error, and
/// the raw body is kept verbatim.
fn parse_response(raw_body: String) -> StartVoiceChatResponse {
    let tree = serde_json::from_str::<serde_json::Value>(&raw_body).ok();

    let result = tree
        .as_ref()
        .and_then(|tree| find_string_field(tree, "Result"))
        .or_else(|| {
            tree.as_ref()
                .and_then(|tree| find_string_field(tree, "result"))
        })
        .unwrap_or_default();
    let request_id = tree
        .as_ref()
        .and_then(|tree| find_string_field(tree, "RequestId"));

    StartVoiceChatResponse {
        result,
        request_id,
        raw_body,
    }
}

/// Depth-first scan for the first string value under `key`, case-sensitive.
/// Matches in nested objects are accepted; this mirrors the loose field scan
/// the service contract tolerates.
fn find_string_field(value: &serde_json::Value, key: &str) -> Option<String> {
    match value {
        serde_json::Value::Object(map) => {
            if let Some(serde_json::Value::String(found)) = map.get(key) {
                return Some(found.clone());
            }
            map.values().find_map(|nested| find_string_field(nested, key))
        }
        serde_json::Value::Array(items) => {
            items.iter().find_map(|nested| find_string_field(nested, key))
        }
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct RecordedCall {
        url: String,
        headers: Vec<(String, String)>,
        body: String,
    }

    /// Transport double returning a canned response and recording requests.
    struct StaticTransport {
        status: reqwest::StatusCode,
        body: &'static str,
        calls: std::sync::Arc<std::sync::Mutex<Vec<RecordedCall>>>,
    }

    impl StaticTransport {
        fn new(
            status: reqwest::StatusCode,
            body: &'static str,
        ) -> (Self, std::sync::Arc<std::sync::Mutex<Vec<RecordedCall>>>) {
            let calls = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
            (
                Self {
                    status,
                    body,
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    impl Transport for StaticTransport {
        fn post(
            &self,
            url: &str,
            headers: &[(String, String)],
            body: &str,
        ) -> Result<Response, crate::error::Error> {
            self.calls.lock().unwrap().push(RecordedCall {
                url: url.to_owned(),
                headers: headers.to_vec(),
                body: body.to_owned(),
            });
            Ok(Response {
                status: self.status,
                body: self.body.to_owned(),
            })
        }
    }

    fn make_test_request() -> crate::request::StartVoiceChatRequest {
        crate::request::StartVoiceChatRequest {
            app_id: "app-1".to_owned(),
            room_id: "room-1".to_owned(),
            task_id: "task-1".to_owned(),
            config: crate::request::Config::default(),
            agent_config: crate::request::AgentConfig {
                target_user_id: vec!["user-1".to_owned()],
                user_id: "bot-1".to_owned(),
                welcome_message: None,
                enable_conversation_state_callback: None,
            },
        }
    }

    fn make_test_client(transport: StaticTransport) -> Client {
        Client::with_transport(
            Box::new(transport),
            Credentials::new("testAccessKey", "testSecretKey", None),
            Config::default(),
        )
    }

    #[test]
    fn test_start_voice_chat_success() {
        let (transport, calls) = StaticTransport::new(
            reqwest::StatusCode::OK,
            r#"{"Result":"ok","RequestId":"abc-123"}"#,
        );
        let client = make_test_client(transport);

        let response = client.start_voice_chat(&make_test_request()).unwrap();
        assert_eq!(response.result, "ok");
        assert_eq!(response.request_id.as_deref(), Some("abc-123"));
        assert_eq!(response.raw_body, r#"{"Result":"ok","RequestId":"abc-123"}"#);

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(
            calls[0].url,
            "https://rtc.volcengineapi.com?Action=StartVoiceChat&Version=2024-12-01",
        );
    }

    #[test]
    fn test_start_voice_chat_signs_the_sent_body() {
        let (transport, calls) = StaticTransport::new(reqwest::StatusCode::OK, "{}");
        let client = make_test_client(transport);
        let request = make_test_request();

        client.start_voice_chat(&request).unwrap();

        let calls = calls.lock().unwrap();
        let call = &calls[0];
        // the body that went out is the canonical encoding, byte for byte
        assert_eq!(call.body, crate::encode::encode(&request));

        let headers: std::collections::HashMap<&str, &str> = call
            .headers
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        assert_eq!(headers["Host"], DEFAULT_HOST);
        assert_eq!(headers["Content-Type"], "application/json");
        assert!(headers["Authorization"].starts_with(
            "HMAC-SHA256 Credential=testAccessKey/",
        ));
        assert!(headers["Authorization"].contains("SignedHeaders=host;x-date"));
        assert_eq!(headers["X-Date"].len(), 16);
        assert!(!headers.contains_key("X-Security-Token"));
    }

    #[test]
    fn test_start_voice_chat_sends_session_token() {
        let (transport, calls) = StaticTransport::new(reqwest::StatusCode::OK, "{}");
        let client = Client::with_transport(
            Box::new(transport),
            Credentials::new("testAccessKey", "testSecretKey", Some("token-1")),
            Config::default(),
        );

        client.start_voice_chat(&make_test_request()).unwrap();

        let calls = calls.lock().unwrap();
        assert!(calls[0]
            .headers
            .iter()
            .any(|(k, v)| k == "X-Security-Token" && v == "token-1"));
    }

    #[test]
    fn test_start_voice_chat_http_failure() {
        let (transport, _) = StaticTransport::new(
            reqwest::StatusCode::FORBIDDEN,
            r#"{"Error":"AccessDenied"}"#,
        );
        let client = make_test_client(transport);

        let err = client.start_voice_chat(&make_test_request()).unwrap_err();
        match err {
            crate::error::Error::ApiError(status, body) => {
                assert_eq!(status, reqwest::StatusCode::FORBIDDEN);
                assert_eq!(body, r#"{"Error":"AccessDenied"}"#);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_response_uppercase_fields() {
        let response =
            parse_response(r#"{"Result":"ok","RequestId":"abc-123"}"#.to_owned());
        assert_eq!(response.result, "ok");
        assert_eq!(response.request_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_parse_response_lowercase_result() {
        let response = parse_response(r#"{"result":"ok"}"#.to_owned());
        assert_eq!(response.result, "ok");
        assert_eq!(response.request_id, None);
    }

    #[test]
    fn test_parse_response_uppercase_wins_over_lowercase() {
        let response =
            parse_response(r#"{"result":"lower","Result":"upper"}"#.to_owned());
        assert_eq!(response.result, "upper");
    }

    #[test]
    fn test_parse_response_missing_fields() {
        let body = r#"{"Data":{"foo":1}}"#;
        let response = parse_response(body.to_owned());
        assert_eq!(response.result, "");
        assert_eq!(response.request_id, None);
        assert_eq!(response.raw_body, body);
    }

    #[test]
    fn test_parse_response_nested_fields() {
        let response =
            parse_response(r#"{"Data":{"Result":"ok","RequestId":"abc-123"}}"#.to_owned());
        assert_eq!(response.result, "ok");
        assert_eq!(response.request_id.as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_parse_response_non_json_body() {
        let response = parse_response("not json".to_owned());
        assert_eq!(response.result, "");
        assert_eq!(response.request_id, None);
        assert_eq!(response.raw_body, "not json");
    }

    #[test]
    fn test_parse_response_ignores_non_string_values() {
        let response = parse_response(r#"{"Result":7,"result":"ok"}"#.to_owned());
        assert_eq!(response.result, "ok");
    }
}
