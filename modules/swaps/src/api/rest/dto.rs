use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::contract::model::{
    ConversationSummary, Message, MessageView, NewSwapRequest, SwapOverview, SwapRequest,
};

/// REST DTO for creating a swap request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateSwapReq {
    pub item_id: Uuid,
    /// Optional note to the owner, shown on the incoming request.
    pub message: Option<String>,
}

/// REST DTO for applying a lifecycle transition
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetStatusReq {
    /// Target status (`accepted`, `rejected`, `cancelled`, `completed`).
    pub status: String,
}

/// REST DTO for sending a message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SendMessageReq {
    pub body: String,
}

/// REST DTO for a bare swap request
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwapDto {
    pub id: Uuid,
    pub item_id: Uuid,
    pub requester_id: Uuid,
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// REST DTO for a projected swap row with display fields. Which party
/// fields are filled depends on the view (outgoing/incoming/admin).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwapOverviewDto {
    pub id: Uuid,
    pub item_id: Uuid,
    pub requester_id: Uuid,
    pub owner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requester_email: Option<String>,
    /// Transitions the viewing user may apply right now.
    pub allowed_actions: Vec<String>,
}

/// REST DTO for swap list responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SwapListDto {
    pub swaps: Vec<SwapOverviewDto>,
    pub total: usize,
}

/// REST DTO for a chat message
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageDto {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub swap_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// REST DTO for message list responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageListDto {
    pub messages: Vec<MessageDto>,
    pub total: usize,
}

/// REST DTO for one conversation inbox row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationSummaryDto {
    pub partner_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_name: Option<String>,
    pub last_message_preview: String,
    pub last_message_at: DateTime<Utc>,
}

/// REST DTO for the conversation inbox
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConversationListDto {
    pub conversations: Vec<ConversationSummaryDto>,
    pub total: usize,
}

// Conversion implementations between REST DTOs and contract models

impl From<CreateSwapReq> for NewSwapRequest {
    fn from(req: CreateSwapReq) -> Self {
        Self {
            item_id: req.item_id,
            message: req.message,
        }
    }
}

impl From<SwapRequest> for SwapDto {
    fn from(request: SwapRequest) -> Self {
        Self {
            id: request.id,
            item_id: request.item_id,
            requester_id: request.requester_id,
            owner_id: request.owner_id,
            message: request.message,
            status: request.status.to_string(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

impl SwapOverviewDto {
    /// Fields common to every view; party display fields start empty.
    fn base(view: &SwapOverview) -> Self {
        let request = &view.request;
        Self {
            id: request.id,
            item_id: request.item_id,
            requester_id: request.requester_id,
            owner_id: request.owner_id,
            message: request.message.clone(),
            status: request.status.to_string(),
            created_at: request.created_at,
            updated_at: request.updated_at,
            item_title: view.item_title.clone(),
            owner_name: None,
            owner_email: None,
            requester_name: None,
            requester_email: None,
            allowed_actions: view.allowed_actions.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Requester-perspective row: annotates the owner.
    pub fn outgoing(view: &SwapOverview) -> Self {
        let mut dto = Self::base(view);
        dto.owner_name = view.owner.as_ref().map(|p| p.full_name.clone());
        dto
    }

    /// Owner-perspective row: annotates the requester, email included so
    /// the owner can follow up off-platform.
    pub fn incoming(view: &SwapOverview) -> Self {
        let mut dto = Self::base(view);
        dto.requester_name = view.requester.as_ref().map(|p| p.full_name.clone());
        dto.requester_email = view.requester.as_ref().map(|p| p.email.clone());
        dto
    }

    /// Moderation row: both parties fully annotated.
    pub fn admin(view: &SwapOverview) -> Self {
        let mut dto = Self::incoming(view);
        dto.owner_name = view.owner.as_ref().map(|p| p.full_name.clone());
        dto.owner_email = view.owner.as_ref().map(|p| p.email.clone());
        dto
    }
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            swap_id: message.swap_id,
            sender_id: message.sender_id,
            recipient_id: message.recipient_id,
            body: message.body,
            item_title: message.item_title,
            sender_name: None,
            created_at: message.created_at,
        }
    }
}

impl From<MessageView> for MessageDto {
    fn from(view: MessageView) -> Self {
        let mut dto = Self::from(view.message);
        dto.sender_name = view.sender_name;
        dto
    }
}

impl From<ConversationSummary> for ConversationSummaryDto {
    fn from(summary: ConversationSummary) -> Self {
        Self {
            partner_id: summary.partner_id,
            partner_name: summary.partner_name,
            last_message_preview: summary.last_message_preview,
            last_message_at: summary.last_message_at,
        }
    }
}
