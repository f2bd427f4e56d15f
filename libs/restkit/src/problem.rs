//! RFC 9457 problem documents, the error body format of every Tradepost
//! endpoint.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Media type problem documents are served under.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// One problem document. `type`/`title`/`status`/`detail`/`instance` are the
/// RFC 9457 members; `code` and `request_id` are Tradepost extensions for
/// machine matching and log correlation.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(
    title = "Problem",
    description = "RFC 9457 Problem Details for HTTP APIs"
)]
pub struct Problem {
    /// Dereferenceable identifier of the problem kind.
    #[serde(rename = "type")]
    pub type_url: String,
    /// Short summary, stable per problem kind.
    pub title: String,
    /// HTTP status of this occurrence.
    pub status: u16,
    /// What went wrong in this specific occurrence.
    pub detail: String,
    /// Path of the request that produced the problem.
    pub instance: String,
    /// Application error code, e.g. `SWAPS_CONFLICT`.
    pub code: String,
    /// Correlates the response with server logs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            request_id: None,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }
}

/// Response wrapper: serializes the problem under its own status code and
/// the problem+json content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        // The header pair overrides the application/json that Json sets.
        (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
            )],
            axum::Json(self.0),
        )
            .into_response()
    }
}

/// 401 problem for identity extraction failures.
pub fn unauthorized(detail: impl Into<String>) -> ProblemResponse {
    ProblemResponse(Problem::new(
        StatusCode::UNAUTHORIZED,
        "Unauthorized",
        detail,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_carries_problem_status_and_media_type() {
        let resp = ProblemResponse(Problem::new(
            StatusCode::CONFLICT,
            "Conflict",
            "swap already decided",
        ))
        .into_response();

        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            APPLICATION_PROBLEM_JSON
        );
    }

    #[test]
    fn builders_fill_the_extension_members() {
        let p = Problem::new(StatusCode::CONFLICT, "Conflict", "swap already decided")
            .with_type("https://errors.tradepost.dev/SWAPS_CONFLICT")
            .with_code("SWAPS_CONFLICT")
            .with_instance("/api/swaps/123/status")
            .with_request_id("req-456");

        assert_eq!(p.status, 409);
        assert_eq!(p.type_url, "https://errors.tradepost.dev/SWAPS_CONFLICT");
        assert_eq!(p.code, "SWAPS_CONFLICT");
        assert_eq!(p.instance, "/api/swaps/123/status");
        assert_eq!(p.request_id.as_deref(), Some("req-456"));
    }

    #[test]
    fn unset_request_id_is_left_out_of_the_json() {
        let p = Problem::new(StatusCode::NOT_FOUND, "Not Found", "no such swap");
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("request_id").is_none());
        assert_eq!(json["type"], "about:blank");
        assert_eq!(json["status"], 404);
    }

    #[test]
    fn unauthorized_is_a_bare_401() {
        let resp = unauthorized("missing x-user-id header");
        assert_eq!(resp.0.status, 401);
        assert_eq!(resp.0.title, "Unauthorized");
        assert_eq!(resp.0.code, "");
    }
}
