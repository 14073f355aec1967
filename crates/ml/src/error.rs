use thiserror::Error;

#[derive(Debug, Error)]
pub enum MlError {
    #[error("model backend unavailable: {0}")]
    Unavailable(String),

    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("model returned empty output")]
    EmptyOutput,
}
