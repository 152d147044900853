//! RFC7807 problem details
//!
//! Every handler-level failure is reported to clients as a [`Problem`]
//! serialized with the `application/problem+json` content type.

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Content type that marks a body as a problem rather than ordinary JSON.
pub const CONTENT_TYPE: &str = "application/problem+json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub detail: String,
    #[serde(default, skip_serializing_if = "is_blank")]
    pub instance: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(str::is_empty)
}

impl Problem {
    pub fn new(
        kind: impl Into<String>,
        title: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            title: title.into(),
            detail: detail.into(),
            instance: None,
        }
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Pair the problem with a status so it can be returned from a handler.
    pub fn with_status(self, status: StatusCode) -> ProblemResponse {
        ProblemResponse {
            status,
            problem: self,
        }
    }
}

#[derive(Debug)]
pub struct ProblemResponse {
    pub status: StatusCode,
    pub problem: Problem,
}

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        // Json sets application/json; the header override below replaces it.
        let mut response = (self.status, Json(self.problem)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static(CONTENT_TYPE),
        );
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_instance_omitted_when_absent_or_empty() {
        let problem = Problem::new("example.local/problems/x", "Title", "Detail");
        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(
            value,
            json!({"type": "example.local/problems/x", "title": "Title", "detail": "Detail"})
        );

        let empty = problem.with_instance("");
        let value = serde_json::to_value(&empty).unwrap();
        assert!(value.get("instance").is_none());
    }

    #[test]
    fn test_instance_serialized_when_present() {
        let problem = Problem::new("t", "Title", "Detail").with_instance("urn:uuid:1");
        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(value["instance"], "urn:uuid:1");
        assert_eq!(value["type"], "t");
    }

    #[test]
    fn test_response_uses_problem_content_type() {
        let response = Problem::new("t", "Title", "Detail")
            .with_status(StatusCode::BAD_REQUEST)
            .into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            CONTENT_TYPE
        );
    }
}
