//! The swap lifecycle state machine.
//!
//! Legal transitions live in one table; everything else derives from it:
//! transition checks, the Forbidden/InvalidTransition distinction, and the
//! allowed-actions annotation on projected rows. The check itself is a pure
//! function of (record, actor, target) so callers can reason about it
//! without touching storage.

use uuid::Uuid;

use crate::contract::model::{SwapRequest, SwapStatus};
use crate::domain::error::DomainError;

use SwapStatus::*;

/// Which side of a swap may drive a given transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActorRule {
    Owner,
    Requester,
    Either,
}

/// The side `user` plays on a given request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartyRole {
    Owner,
    Requester,
}

impl ActorRule {
    fn permits(self, role: PartyRole) -> bool {
        matches!(
            (self, role),
            (ActorRule::Either, _)
                | (ActorRule::Owner, PartyRole::Owner)
                | (ActorRule::Requester, PartyRole::Requester)
        )
    }
}

/// Deployment policy knobs for the transition table.
#[derive(Debug, Clone, Copy)]
pub struct LifecyclePolicy {
    /// When false the `accepted -> cancelled` row is absent from the table,
    /// so the attempt fails as an invalid transition rather than forbidden.
    pub allow_cancel_accepted: bool,
}

impl Default for LifecyclePolicy {
    fn default() -> Self {
        Self {
            allow_cancel_accepted: true,
        }
    }
}

/// (from, to, who may apply it). Terminal states have no outgoing rows.
const TRANSITIONS: &[(SwapStatus, SwapStatus, ActorRule)] = &[
    (Pending, Accepted, ActorRule::Owner),
    (Pending, Rejected, ActorRule::Owner),
    (Pending, Cancelled, ActorRule::Requester),
    (Accepted, Completed, ActorRule::Owner),
    (Accepted, Cancelled, ActorRule::Either),
];

fn row(from: SwapStatus, to: SwapStatus, policy: &LifecyclePolicy) -> Option<ActorRule> {
    if from == Accepted && to == Cancelled && !policy.allow_cancel_accepted {
        return None;
    }
    TRANSITIONS
        .iter()
        .find(|(f, t, _)| *f == from && *t == to)
        .map(|(_, _, rule)| *rule)
}

/// The role `user` plays on `request`, if any.
pub fn party_role(request: &SwapRequest, user: Uuid) -> Option<PartyRole> {
    if user == request.owner_id {
        Some(PartyRole::Owner)
    } else if user == request.requester_id {
        Some(PartyRole::Requester)
    } else {
        None
    }
}

/// Validate that `actor` may move `request` to `next`.
///
/// Check order: a non-party actor is `Forbidden` before anything else; a
/// transition with no table row for the current state is
/// `InvalidTransition`; a present row whose rule excludes the actor's side
/// is `Forbidden`.
pub fn check(
    request: &SwapRequest,
    actor: Uuid,
    next: SwapStatus,
    policy: &LifecyclePolicy,
) -> Result<(), DomainError> {
    let role = party_role(request, actor)
        .ok_or_else(|| DomainError::forbidden("not a party to this swap"))?;

    let rule = row(request.status, next, policy)
        .ok_or_else(|| DomainError::invalid_transition(request.status, next))?;

    if !rule.permits(role) {
        return Err(DomainError::forbidden(format!(
            "only the {} may move a {} swap to {}",
            match rule {
                ActorRule::Owner => "item owner",
                ActorRule::Requester => "requester",
                ActorRule::Either => "parties",
            },
            request.status,
            next
        )));
    }

    Ok(())
}

/// The transitions `viewer` may currently apply to `request`. Empty for
/// non-parties and for terminal states.
pub fn allowed_for(
    request: &SwapRequest,
    viewer: Uuid,
    policy: &LifecyclePolicy,
) -> Vec<SwapStatus> {
    let Some(role) = party_role(request, viewer) else {
        return Vec::new();
    };
    TRANSITIONS
        .iter()
        .filter(|(from, to, _)| {
            *from == request.status
                && row(*from, *to, policy).is_some_and(|rule| rule.permits(role))
        })
        .map(|(_, to, _)| *to)
        .collect()
}
