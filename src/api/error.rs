use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

use super::validation::ParameterErrors;
use crate::problem::Problem;

pub const PROBLEM_BAD_PARAMETERS: &str = "delivery-options.local/problems/bad-parameters";
pub const PROBLEM_NO_OPTIONS: &str = "delivery-options.local/problems/no-options";
pub const PROBLEM_INTERNAL: &str = "delivery-options.local/server/internal-server-error";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad parameters: {0}")]
    BadParameters(ParameterErrors),
    #[error("query string could not be decoded: {0}")]
    MalformedQuery(String),
    #[error("no delivery options from {carriers} carriers")]
    NoOptions { carriers: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadParameters(_) | ApiError::MalformedQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::NoOptions { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing description. Internal causes are never included.
    pub fn problem(&self) -> Problem {
        match self {
            ApiError::BadParameters(errors) => Problem::new(
                PROBLEM_BAD_PARAMETERS,
                "Missing or malformed input parameters",
                errors.to_string(),
            ),
            ApiError::MalformedQuery(_) => Problem::new(
                PROBLEM_BAD_PARAMETERS,
                "Missing or malformed input parameters",
                "The query string could not be decoded",
            ),
            ApiError::NoOptions { carriers } => Problem::new(
                PROBLEM_NO_OPTIONS,
                "There are no delivery options available",
                format!(
                    "Despite querying {} providers, there are no options provided",
                    carriers
                ),
            ),
            ApiError::Internal(_) => Problem::new(
                PROBLEM_INTERNAL,
                "Internal server error",
                "The server failed to handle this request. Operators can find \
                 the cause in server telemetry using the problem instance",
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let mut problem = self.problem();

        if let ApiError::Internal(cause) = &self {
            let instance = format!("urn:uuid:{}", Uuid::now_v7());
            error!(%instance, %cause, "Request failed with internal error");
            problem = problem.with_instance(instance);
        }

        problem.with_status(status).into_response()
    }
}
