#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("API Error ({0}): {1}")]
    ApiError(reqwest::StatusCode, String),

    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
}
