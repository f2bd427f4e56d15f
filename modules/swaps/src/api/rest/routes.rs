use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Extension, Router,
};
use utoipa::OpenApi;

use crate::api::rest::handlers;
use crate::domain::service::Service;

/// Build the module's REST router with the service attached as an extension.
///
/// Static segments (`mine`, `incoming`) are matched before the `{id}`
/// captures, so the route order below carries no precedence weight.
pub fn rest_router(service: Arc<Service>) -> Router {
    Router::new()
        .route("/api/swaps", post(handlers::create_swap))
        .route("/api/swaps/mine", get(handlers::list_mine))
        .route("/api/swaps/incoming", get(handlers::list_incoming))
        .route("/api/swaps/{id}/status", put(handlers::set_status))
        .route(
            "/api/swaps/{id}/messages",
            get(handlers::list_swap_messages).post(handlers::send_swap_message),
        )
        .route("/api/conversations", get(handlers::list_conversations))
        .route(
            "/api/conversations/{partner_id}/messages",
            get(handlers::list_partner_messages).post(handlers::send_partner_message),
        )
        .route("/api/admin/swaps", get(handlers::list_admin_swaps))
        .layer(Extension(service))
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tradepost Swaps API",
        description = "Swap request lifecycle and messaging for the campus marketplace",
        version = env!("CARGO_PKG_VERSION"),
    ),
    paths(
        handlers::create_swap,
        handlers::list_mine,
        handlers::list_incoming,
        handlers::set_status,
        handlers::list_swap_messages,
        handlers::send_swap_message,
        handlers::list_conversations,
        handlers::list_partner_messages,
        handlers::send_partner_message,
        handlers::list_admin_swaps,
    ),
    components(schemas(
        crate::api::rest::dto::CreateSwapReq,
        crate::api::rest::dto::SetStatusReq,
        crate::api::rest::dto::SendMessageReq,
        crate::api::rest::dto::SwapDto,
        crate::api::rest::dto::SwapOverviewDto,
        crate::api::rest::dto::SwapListDto,
        crate::api::rest::dto::MessageDto,
        crate::api::rest::dto::MessageListDto,
        crate::api::rest::dto::ConversationSummaryDto,
        crate::api::rest::dto::ConversationListDto,
        restkit::problem::Problem,
    )),
    tags(
        (name = "swaps", description = "Swap request lifecycle"),
        (name = "messages", description = "Conversations and messages"),
        (name = "admin", description = "Moderation endpoints"),
    )
)]
pub struct SwapsApiDoc;
