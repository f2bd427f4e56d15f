use axum::http::StatusCode;
use restkit::problem::{Problem, ProblemResponse};

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> ProblemResponse {
    let problem = Problem::new(status, title, detail)
        .with_type(format!("https://errors.tradepost.dev/{}", code))
        .with_code(code)
        .with_instance(instance);

    // Add request ID from current tracing span if available
    let problem = if let Some(id) = tracing::Span::current().id() {
        problem.with_request_id(id.into_u64().to_string())
    } else {
        problem
    };

    ProblemResponse(problem)
}

use crate::domain::error::DomainError;

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::Validation { message } => from_parts(
            StatusCode::BAD_REQUEST,
            "SWAPS_VALIDATION",
            "Validation error",
            message.clone(),
            instance,
        ),
        DomainError::NotFound { entity, id } => from_parts(
            StatusCode::NOT_FOUND,
            "SWAPS_NOT_FOUND",
            "Not found",
            format!("{} with id {} was not found", entity, id),
            instance,
        ),
        DomainError::Forbidden { message } => from_parts(
            StatusCode::FORBIDDEN,
            "SWAPS_FORBIDDEN",
            "Forbidden",
            message.clone(),
            instance,
        ),
        DomainError::InvalidTransition { from, to } => from_parts(
            StatusCode::CONFLICT,
            "SWAPS_INVALID_TRANSITION",
            "Invalid transition",
            format!("cannot move a {} swap to {}", from, to),
            instance,
        ),
        DomainError::Conflict { message } => from_parts(
            StatusCode::CONFLICT,
            "SWAPS_CONFLICT",
            "Conflict",
            message.clone(),
            instance,
        ),
        DomainError::Dependency { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Backend dependency error");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SWAPS_DEPENDENCY",
                "Dependency error",
                "An upstream backend call failed",
                instance,
            )
        }
        DomainError::Storage { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Storage error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL",
                "Internal error",
                "An internal storage error occurred",
                instance,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::model::SwapStatus;
    use uuid::Uuid;

    #[test]
    fn taxonomy_maps_to_distinct_codes_and_statuses() {
        let cases: Vec<(DomainError, u16, &str)> = vec![
            (DomainError::validation("empty body"), 400, "SWAPS_VALIDATION"),
            (
                DomainError::swap_not_found(Uuid::new_v4()),
                404,
                "SWAPS_NOT_FOUND",
            ),
            (
                DomainError::forbidden("not a party"),
                403,
                "SWAPS_FORBIDDEN",
            ),
            (
                DomainError::invalid_transition(SwapStatus::Completed, SwapStatus::Rejected),
                409,
                "SWAPS_INVALID_TRANSITION",
            ),
            (DomainError::conflict("lost the race"), 409, "SWAPS_CONFLICT"),
            (
                DomainError::dependency("GET /items: HTTP 500"),
                500,
                "SWAPS_DEPENDENCY",
            ),
            (DomainError::storage("poisoned"), 500, "INTERNAL"),
        ];

        for (err, status, code) in cases {
            let problem = map_domain_error(&err, "/api/swaps").0;
            assert_eq!(problem.status, status, "{err}");
            assert_eq!(problem.code, code, "{err}");
            assert_eq!(problem.instance, "/api/swaps");
        }
    }

    #[test]
    fn conflict_and_invalid_transition_stay_distinguishable() {
        let race = map_domain_error(&DomainError::conflict("raced"), "/api/swaps/1/status").0;
        let illegal = map_domain_error(
            &DomainError::invalid_transition(SwapStatus::Rejected, SwapStatus::Accepted),
            "/api/swaps/1/status",
        )
        .0;
        assert_eq!(race.status, illegal.status);
        assert_ne!(race.code, illegal.code);
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let problem =
            map_domain_error(&DomainError::storage("dashmap shard panic"), "/api/swaps").0;
        assert!(!problem.detail.contains("dashmap"));
    }
}
