//! X-Date timestamp formatting

/// `yyyyMMdd'T'HHmmss'Z'`, always UTC. The format carries second resolution
/// only; sub-second parts are truncated.
const X_DATE_FORMAT: &str = "%Y%m%dT%H%M%SZ";

pub fn x_date(time: chrono::DateTime<chrono::Utc>) -> String {
    time.format(X_DATE_FORMAT).to_string()
}

/// Current wall-clock time in X-Date form. Every signature derives from a
/// fresh call; the server rejects timestamps outside its validity window.
pub fn now_x_date() -> String {
    x_date(chrono::Utc::now())
}
