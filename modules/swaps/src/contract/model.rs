use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Lifecycle status of a swap request.
///
/// `pending` is the sole initial state; `rejected`, `cancelled` and
/// `completed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwapStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
    Completed,
}

impl SwapStatus {
    /// Terminal states accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Completed)
    }

    /// Active requests block a second request for the same (item, requester) pair.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Pending | Self::Accepted)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        }
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown swap status: '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for SwapStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "cancelled" => Ok(Self::Cancelled),
            "completed" => Ok(Self::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Catalog status of an item, mirrored from the catalog collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemStatus {
    Available,
    Reserved,
    Exchanged,
    Hidden,
}

impl ItemStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Reserved => "reserved",
            Self::Exchanged => "exchanged",
            Self::Hidden => "hidden",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown item status: '{0}'")]
pub struct UnknownItemStatus(pub String);

impl FromStr for ItemStatus {
    type Err = UnknownItemStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "reserved" => Ok(Self::Reserved),
            "exchanged" => Ok(Self::Exchanged),
            "hidden" => Ok(Self::Hidden),
            other => Err(UnknownItemStatus(other.to_string())),
        }
    }
}

/// Pure swap request model for inter-module communication (no serde).
///
/// `owner_id` is a snapshot of the item's owner at creation time, not a
/// live join against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    pub id: Uuid,
    pub item_id: Uuid,
    pub requester_id: Uuid,
    pub owner_id: Uuid,
    pub message: Option<String>,
    pub status: SwapStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SwapRequest {
    /// Whether `user_id` is the requester or the owner.
    pub fn is_party(&self, user_id: Uuid) -> bool {
        user_id == self.requester_id || user_id == self.owner_id
    }

    /// The other party, if `user_id` is a party at all.
    pub fn counterparty(&self, user_id: Uuid) -> Option<Uuid> {
        if user_id == self.requester_id {
            Some(self.owner_id)
        } else if user_id == self.owner_id {
            Some(self.requester_id)
        } else {
            None
        }
    }
}

/// Data for creating a new swap request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSwapRequest {
    pub item_id: Uuid,
    pub message: Option<String>,
}

/// Role of the acting user, as established by the auth collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Admin,
}

/// The authenticated actor behind an operation. Identity is always passed
/// explicitly; nothing in this module reads ambient auth state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: Uuid,
    pub role: Role,
}

impl Caller {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::User,
        }
    }

    pub fn admin(user_id: Uuid) -> Self {
        Self {
            user_id,
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A single chat line. Immutable once created.
///
/// Every message carries both participants; `swap_id` and `item_title`
/// are present when the message was sent in the context of a swap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: Uuid,
    pub swap_id: Option<Uuid>,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub body: String,
    pub item_title: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// The participant other than `user_id`, assuming `user_id` is one of them.
    pub fn partner_of(&self, user_id: Uuid) -> Uuid {
        if self.sender_id == user_id {
            self.recipient_id
        } else {
            self.sender_id
        }
    }
}

/// A message annotated with the sender's display name for read views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub message: Message,
    pub sender_name: Option<String>,
}

/// Addressing for a conversation: all messages of one swap, or all
/// messages between two users regardless of swap/item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConversationKey {
    Swap(Uuid),
    /// Normalized so that `{a, b}` and `{b, a}` address the same conversation.
    Partner { a: Uuid, b: Uuid },
}

impl ConversationKey {
    pub fn swap(id: Uuid) -> Self {
        Self::Swap(id)
    }

    pub fn partner(x: Uuid, y: Uuid) -> Self {
        if x <= y {
            Self::Partner { a: x, b: y }
        } else {
            Self::Partner { a: y, b: x }
        }
    }
}

/// One row of the conversation inbox: the partner plus the latest message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationSummary {
    pub partner_id: Uuid,
    pub partner_name: Option<String>,
    pub last_message_preview: String,
    pub last_message_at: DateTime<Utc>,
}

/// Snapshot of a catalog item at lookup time. Referenced, never owned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSnapshot {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub status: ItemStatus,
}

/// Directory entry for a user referenced by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
}

/// A swap request annotated with display fields and the transitions the
/// viewing user may currently apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapOverview {
    pub request: SwapRequest,
    pub item_title: Option<String>,
    pub requester: Option<UserProfile>,
    pub owner: Option<UserProfile>,
    pub allowed_actions: Vec<SwapStatus>,
}
