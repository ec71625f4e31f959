//! HMAC-SHA256 signer for Volcengine OpenAPI top-level actions
//!
//! Produces the canonical request, derives a request-scoped signing key from
//! the long-lived secret via an HMAC chain, and assembles the final
//! `Authorization` header and URL. The signed scope is fixed for this action:
//! two query parameters (`Action`, `Version`) and two headers
//! (`host`, `x-date`).

pub const ALGORITHM: &str = "HMAC-SHA256";
pub const SIGNED_HEADERS: &str = "host;x-date";
const CANONICAL_URI: &str = "/";

type HmacSha256 = hmac::Hmac<sha2::Sha256>;

#[derive(Debug)]
pub struct SigningParams<'a> {
    pub host: &'a str,
    pub action: &'a str,
    pub version: &'a str,
    pub region: &'a str,
    pub service: &'a str,
    pub method: &'a str,

    pub credentials: &'a crate::client::Credentials,
}

/// Finished output of the signer: the URL to POST to and the complete header
/// set, in emission order.
#[derive(Debug, PartialEq, Eq)]
pub struct SignedRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct SigningScope<'a> {
    pub x_date: &'a str,
    pub region: &'a str,
    pub service: &'a str,
}

impl<'a> std::fmt::Display for SigningScope<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}/request", self.x_date, self.region, self.service)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct StringToSign<'a> {
    pub scope: SigningScope<'a>,
    pub x_date: &'a str,
    pub hashed_creq: &'a str,
}

impl<'a> std::fmt::Display for StringToSign<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\n{}\n{}\n{}",
            ALGORITHM, self.x_date, self.scope, self.hashed_creq
        )
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct CanonicalRequest<'a> {
    pub method: String,
    pub query: String,
    pub host: &'a str,
    pub x_date: &'a str,
    pub payload_hash: &'a str,
}

impl<'a> std::fmt::Display for CanonicalRequest<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.method)?;
        writeln!(f, "{}", CANONICAL_URI)?;
        writeln!(f, "{}", self.query)?;

        // canonical headers, each line `\n`-terminated, fixed order
        writeln!(f, "host:{}", self.host)?;
        writeln!(f, "x-date:{}", self.x_date)?;
        writeln!(f)?;

        writeln!(f, "{SIGNED_HEADERS}")?;
        write!(f, "{}", self.payload_hash)?;
        Ok(())
    }
}

/// RFC 3986 unreserved characters pass through; everything else is
/// percent-encoded (space becomes `%20`, never `+`).
const URL_ENCODE_SET: percent_encoding::AsciiSet = percent_encoding::NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn url_encode(value: &str) -> String {
    percent_encoding::utf8_percent_encode(value, &URL_ENCODE_SET).to_string()
}

/// Percent-encode each pair and join sorted by key ascending.
pub fn canonical_query(params: &[(&str, &str)]) -> String {
    let mut pairs: Vec<(String, String)> = params
        .iter()
        .map(|(k, v)| (url_encode(k), url_encode(v)))
        .collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<String>>()
        .join("&")
}

fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
    use hmac::Mac as _;
    let mut mac =
        HmacSha256::new_from_slice(key).expect("HMAC-SHA256 accepts keys of any length");
    mac.update(message);
    mac.finalize().into_bytes().to_vec()
}

/// Iterated HMAC chain producing the request-scoped signing key. The first
/// message is the full X-Date timestamp string, not a calendar date.
pub fn derive_signing_key(
    secret_access_key: &str,
    x_date: &str,
    region: &str,
    service: &str,
) -> Vec<u8> {
    let k_date = hmac_sha256(secret_access_key.as_bytes(), x_date.as_bytes());
    let k_region = hmac_sha256(&k_date, region.as_bytes());
    let k_service = hmac_sha256(&k_region, service.as_bytes());
    hmac_sha256(&k_service, b"request")
}

pub fn sha256_hex_string(body: &[u8]) -> String {
    use sha2::Digest as _;
    let hash = sha2::Sha256::digest(body);
    base16ct::lower::encode_string(&hash)
}

pub fn sign(
    params: &SigningParams<'_>,
    body_sha256_hex: &str,
    x_date: &str,
) -> Result<SignedRequest, crate::error::Error> {
    use secrecy::ExposeSecret as _;

    if params.host.is_empty() {
        return Err(crate::error::Error::ConfigError(
            "host must not be empty".to_string(),
        ));
    }
    if params.region.is_empty() {
        return Err(crate::error::Error::ConfigError(
            "region must not be empty".to_string(),
        ));
    }
    if params.service.is_empty() {
        return Err(crate::error::Error::ConfigError(
            "service must not be empty".to_string(),
        ));
    }
    if params.credentials.access_key_id.is_empty() {
        return Err(crate::error::Error::ConfigError(
            "access key id must not be empty".to_string(),
        ));
    }
    if params.credentials.secret_access_key.expose_secret().is_empty() {
        return Err(crate::error::Error::ConfigError(
            "secret access key must not be empty".to_string(),
        ));
    }

    let query = canonical_query(&[("Action", params.action), ("Version", params.version)]);

    let creq = CanonicalRequest {
        method: params.method.to_uppercase(),
        query,
        host: params.host,
        x_date,
        payload_hash: body_sha256_hex,
    };
    tracing::trace!(canonical_request = %creq);

    let hashed_creq = sha256_hex_string(creq.to_string().as_bytes());
    let scope = SigningScope {
        x_date,
        region: params.region,
        service: params.service,
    };
    let sts = StringToSign {
        scope: scope.clone(),
        x_date,
        hashed_creq: &hashed_creq,
    };

    let signing_key = derive_signing_key(
        params.credentials.secret_access_key.expose_secret(),
        x_date,
        params.region,
        params.service,
    );
    let signature =
        base16ct::lower::encode_string(&hmac_sha256(&signing_key, sts.to_string().as_bytes()));

    let authorization = format!(
        "{} Credential={}/{}, SignedHeaders={}, Signature={}",
        ALGORITHM, params.credentials.access_key_id, scope, SIGNED_HEADERS, signature
    );

    let mut headers = vec![
        ("Host".to_string(), params.host.to_string()),
        ("X-Date".to_string(), x_date.to_string()),
        ("Authorization".to_string(), authorization),
        ("Content-Type".to_string(), "application/json".to_string()),
    ];
    if let Some(token) = params.credentials.session_token.as_deref() {
        if !token.trim().is_empty() {
            headers.push(("X-Security-Token".to_string(), token.to_string()));
        }
    }

    Ok(SignedRequest {
        url: format!("https://{}?{}", params.host, creq.query),
        headers,
    })
}
