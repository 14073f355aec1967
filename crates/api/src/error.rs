use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use triage_pipeline::PipelineError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Nenhum texto de e-mail fornecido.")]
    MissingEmailText,

    #[error("Serviço de IA não disponível.")]
    ModelsUnavailable,

    #[error("Ocorreu um erro no processamento: {0}")]
    Processing(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingEmailText => StatusCode::BAD_REQUEST,
            Self::ModelsUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            Self::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(error: PipelineError) -> Self {
        match error {
            PipelineError::ModelsUnavailable(source) => {
                tracing::error!(error = %source, "model handles could not be loaded");
                Self::ModelsUnavailable
            }
            PipelineError::Inference(source) => {
                tracing::error!(error = %source, "email processing failed");
                Self::Processing(source.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
