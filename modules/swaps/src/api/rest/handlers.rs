use std::sync::Arc;

use axum::{
    extract::Path,
    http::{StatusCode, Uri},
    response::Json,
    Extension,
};
use tracing::{error, info};
use uuid::Uuid;

use restkit::identity::{Identity, IdentityRole};
use restkit::problem::{Problem, ProblemResponse};

use crate::api::rest::dto::{
    ConversationListDto, ConversationSummaryDto, CreateSwapReq, MessageDto, MessageListDto,
    SendMessageReq, SetStatusReq, SwapDto, SwapListDto, SwapOverviewDto,
};
use crate::api::rest::error::{from_parts, map_domain_error};
use crate::contract::model::{Caller, Role, SwapStatus};
use crate::domain::service::Service;

fn caller_of(identity: &Identity) -> Caller {
    Caller {
        user_id: identity.user_id,
        role: match identity.role {
            IdentityRole::Admin => Role::Admin,
            IdentityRole::User => Role::User,
        },
    }
}

/// Create a swap request against an item
#[utoipa::path(
    post,
    path = "/api/swaps",
    tag = "swaps",
    request_body = CreateSwapReq,
    responses(
        (status = 201, description = "Created swap request", body = SwapDto),
        (status = 400, description = "Bad Request", body = Problem),
        (status = 404, description = "Item not found", body = Problem),
        (status = 409, description = "An active request already exists", body = Problem)
    )
)]
pub async fn create_swap(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Json(req_body): Json<CreateSwapReq>,
) -> Result<(StatusCode, Json<SwapDto>), ProblemResponse> {
    info!("Creating swap request: {:?}", req_body);

    match svc.create_swap(caller_of(&identity), req_body.into()).await {
        Ok(request) => Ok((StatusCode::CREATED, Json(SwapDto::from(request)))),
        Err(e) => {
            error!("Failed to create swap request: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List the caller's outgoing swap requests
#[utoipa::path(
    get,
    path = "/api/swaps/mine",
    tag = "swaps",
    responses(
        (status = 200, description = "Outgoing swap requests", body = SwapListDto),
        (status = 401, description = "Unauthorized", body = Problem)
    )
)]
pub async fn list_mine(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<SwapListDto>, ProblemResponse> {
    info!("Listing outgoing swaps");

    match svc.list_outgoing(caller_of(&identity)).await {
        Ok(rows) => {
            let swaps: Vec<SwapOverviewDto> = rows.iter().map(SwapOverviewDto::outgoing).collect();
            Ok(Json(SwapListDto {
                total: swaps.len(),
                swaps,
            }))
        }
        Err(e) => {
            error!("Failed to list outgoing swaps: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List swap requests against the caller's items
#[utoipa::path(
    get,
    path = "/api/swaps/incoming",
    tag = "swaps",
    responses(
        (status = 200, description = "Incoming swap requests", body = SwapListDto),
        (status = 401, description = "Unauthorized", body = Problem)
    )
)]
pub async fn list_incoming(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<SwapListDto>, ProblemResponse> {
    info!("Listing incoming swaps");

    match svc.list_incoming(caller_of(&identity)).await {
        Ok(rows) => {
            let swaps: Vec<SwapOverviewDto> = rows.iter().map(SwapOverviewDto::incoming).collect();
            Ok(Json(SwapListDto {
                total: swaps.len(),
                swaps,
            }))
        }
        Err(e) => {
            error!("Failed to list incoming swaps: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Apply a lifecycle transition to a swap request
#[utoipa::path(
    put,
    path = "/api/swaps/{id}/status",
    tag = "swaps",
    params(("id" = Uuid, Path, description = "Swap request id")),
    request_body = SetStatusReq,
    responses(
        (status = 200, description = "Updated swap request", body = SwapDto),
        (status = 403, description = "Actor may not apply this transition", body = Problem),
        (status = 404, description = "Swap not found", body = Problem),
        (status = 409, description = "Invalid transition or lost race", body = Problem)
    )
)]
pub async fn set_status(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req_body): Json<SetStatusReq>,
) -> Result<Json<SwapDto>, ProblemResponse> {
    info!("Setting swap {} status to {}", id, req_body.status);

    let next = match req_body.status.parse::<SwapStatus>() {
        Ok(next) => next,
        Err(e) => {
            return Err(from_parts(
                StatusCode::BAD_REQUEST,
                "SWAPS_VALIDATION",
                "Validation error",
                e.to_string(),
                uri.path(),
            ));
        }
    };

    match svc.set_status(caller_of(&identity), id, next).await {
        Ok(request) => Ok(Json(SwapDto::from(request))),
        Err(e) => {
            error!("Failed to set status on swap {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List the messages of a swap's conversation
#[utoipa::path(
    get,
    path = "/api/swaps/{id}/messages",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Swap request id")),
    responses(
        (status = 200, description = "Messages, oldest first", body = MessageListDto),
        (status = 403, description = "Caller is not a party", body = Problem),
        (status = 404, description = "Swap not found", body = Problem)
    )
)]
pub async fn list_swap_messages(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    uri: Uri,
) -> Result<Json<MessageListDto>, ProblemResponse> {
    info!("Listing messages for swap {}", id);

    match svc.list_swap_messages(caller_of(&identity), id).await {
        Ok(rows) => {
            let messages: Vec<MessageDto> = rows.into_iter().map(MessageDto::from).collect();
            Ok(Json(MessageListDto {
                total: messages.len(),
                messages,
            }))
        }
        Err(e) => {
            error!("Failed to list messages for swap {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Send a message in a swap's conversation
#[utoipa::path(
    post,
    path = "/api/swaps/{id}/messages",
    tag = "messages",
    params(("id" = Uuid, Path, description = "Swap request id")),
    request_body = SendMessageReq,
    responses(
        (status = 201, description = "Created message", body = MessageDto),
        (status = 400, description = "Empty body", body = Problem),
        (status = 403, description = "Caller is not a party", body = Problem),
        (status = 404, description = "Swap not found", body = Problem)
    )
)]
pub async fn send_swap_message(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(id): Path<Uuid>,
    Json(req_body): Json<SendMessageReq>,
) -> Result<(StatusCode, Json<MessageDto>), ProblemResponse> {
    info!("Sending message to swap {}", id);

    match svc
        .send_swap_message(caller_of(&identity), id, req_body.body)
        .await
    {
        Ok(message) => Ok((StatusCode::CREATED, Json(MessageDto::from(message)))),
        Err(e) => {
            error!("Failed to send message to swap {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List the caller's conversation inbox
#[utoipa::path(
    get,
    path = "/api/conversations",
    tag = "messages",
    responses(
        (status = 200, description = "Conversations, most recent first", body = ConversationListDto),
        (status = 401, description = "Unauthorized", body = Problem)
    )
)]
pub async fn list_conversations(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<ConversationListDto>, ProblemResponse> {
    info!("Listing conversations");

    match svc.list_conversations(caller_of(&identity)).await {
        Ok(rows) => {
            let conversations: Vec<ConversationSummaryDto> =
                rows.into_iter().map(ConversationSummaryDto::from).collect();
            Ok(Json(ConversationListDto {
                total: conversations.len(),
                conversations,
            }))
        }
        Err(e) => {
            error!("Failed to list conversations: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List the messages exchanged with one partner, across all swaps
#[utoipa::path(
    get,
    path = "/api/conversations/{partner_id}/messages",
    tag = "messages",
    params(("partner_id" = Uuid, Path, description = "The other participant")),
    responses(
        (status = 200, description = "Messages, oldest first", body = MessageListDto),
        (status = 404, description = "Partner not found", body = Problem)
    )
)]
pub async fn list_partner_messages(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(partner_id): Path<Uuid>,
    uri: Uri,
) -> Result<Json<MessageListDto>, ProblemResponse> {
    info!("Listing messages with partner {}", partner_id);

    match svc
        .list_partner_messages(caller_of(&identity), partner_id)
        .await
    {
        Ok(rows) => {
            let messages: Vec<MessageDto> = rows.into_iter().map(MessageDto::from).collect();
            Ok(Json(MessageListDto {
                total: messages.len(),
                messages,
            }))
        }
        Err(e) => {
            error!("Failed to list messages with partner {}: {}", partner_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// Send a direct message to a partner
#[utoipa::path(
    post,
    path = "/api/conversations/{partner_id}/messages",
    tag = "messages",
    params(("partner_id" = Uuid, Path, description = "The other participant")),
    request_body = SendMessageReq,
    responses(
        (status = 201, description = "Created message", body = MessageDto),
        (status = 400, description = "Empty body or self-addressed", body = Problem),
        (status = 404, description = "Partner not found", body = Problem)
    )
)]
pub async fn send_partner_message(
    uri: Uri,
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    Path(partner_id): Path<Uuid>,
    Json(req_body): Json<SendMessageReq>,
) -> Result<(StatusCode, Json<MessageDto>), ProblemResponse> {
    info!("Sending message to partner {}", partner_id);

    match svc
        .send_partner_message(caller_of(&identity), partner_id, req_body.body)
        .await
    {
        Ok(message) => Ok((StatusCode::CREATED, Json(MessageDto::from(message)))),
        Err(e) => {
            error!("Failed to send message to partner {}: {}", partner_id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

/// List every swap request (moderation)
#[utoipa::path(
    get,
    path = "/api/admin/swaps",
    tag = "admin",
    responses(
        (status = 200, description = "All swap requests, newest first", body = SwapListDto),
        (status = 403, description = "Admin role required", body = Problem)
    )
)]
pub async fn list_admin_swaps(
    Extension(svc): Extension<Arc<Service>>,
    identity: Identity,
    uri: Uri,
) -> Result<Json<SwapListDto>, ProblemResponse> {
    info!("Listing all swaps for moderation");

    match svc.list_all_swaps(caller_of(&identity)).await {
        Ok(rows) => {
            let swaps: Vec<SwapOverviewDto> = rows.iter().map(SwapOverviewDto::admin).collect();
            Ok(Json(SwapListDto {
                total: swaps.len(),
                swaps,
            }))
        }
        Err(e) => {
            error!("Failed to list all swaps: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
