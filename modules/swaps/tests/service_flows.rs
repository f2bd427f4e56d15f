use std::sync::Arc;

use anyhow::Result;
use uuid::Uuid;

use swaps::contract::client::SwapsApi;
use swaps::contract::error::SwapsError;
use swaps::contract::model::{
    Caller, ItemSnapshot, ItemStatus, NewSwapRequest, SwapStatus, UserProfile,
};
use swaps::domain::error::DomainError;
use swaps::domain::ports::CatalogPort;
use swaps::domain::service::{Service, ServiceConfig};
use swaps::gateways::local::SwapsLocalClient;
use swaps::infra::backend::FixtureBackend;
use swaps::infra::storage::{InMemoryConversationStore, InMemorySwapLedger};

struct TestWorld {
    service: Arc<Service>,
    backend: Arc<FixtureBackend>,
    owner: Uuid,
    requester: Uuid,
    item: Uuid,
}

fn seed_world_with(config: ServiceConfig) -> TestWorld {
    let backend = Arc::new(FixtureBackend::new());
    let owner = Uuid::new_v4();
    let requester = Uuid::new_v4();
    let item = Uuid::new_v4();

    backend.seed_user(UserProfile {
        id: owner,
        full_name: "Dana Owner".to_string(),
        email: "dana@campus.edu".to_string(),
    });
    backend.seed_user(UserProfile {
        id: requester,
        full_name: "Riley Requester".to_string(),
        email: "riley@campus.edu".to_string(),
    });
    backend.seed_item(ItemSnapshot {
        id: item,
        owner_id: owner,
        title: "Noise-cancelling headphones".to_string(),
        status: ItemStatus::Available,
    });

    let service = Arc::new(Service::new(
        Arc::new(InMemorySwapLedger::new()),
        Arc::new(InMemoryConversationStore::new()),
        backend.clone(),
        backend.clone(),
        config,
    ));

    TestWorld {
        service,
        backend,
        owner,
        requester,
        item,
    }
}

fn seed_world() -> TestWorld {
    seed_world_with(ServiceConfig::default())
}

async fn item_status(world: &TestWorld, id: Uuid) -> ItemStatus {
    world
        .backend
        .item(id)
        .await
        .expect("fixture catalog lookup")
        .expect("item seeded")
        .status
}

#[tokio::test]
async fn accept_then_complete_pushes_item_states() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let created = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: Some("interested".to_string()),
            },
        )
        .await?;
    assert_eq!(created.status, SwapStatus::Pending);
    assert_eq!(created.owner_id, world.owner);

    // A pending request offers the owner accept and reject.
    let incoming = world.service.list_incoming(owner).await?;
    assert_eq!(incoming.len(), 1);
    assert_eq!(
        incoming[0].allowed_actions,
        vec![SwapStatus::Accepted, SwapStatus::Rejected]
    );
    assert_eq!(
        incoming[0].item_title.as_deref(),
        Some("Noise-cancelling headphones")
    );
    assert_eq!(
        incoming[0].requester.as_ref().map(|p| p.full_name.as_str()),
        Some("Riley Requester")
    );

    // The request sits on exactly one side of each party's ledger views.
    assert!(world.service.list_incoming(requester).await?.is_empty());
    assert!(world.service.list_outgoing(owner).await?.is_empty());
    assert_eq!(world.service.list_outgoing(requester).await?.len(), 1);

    let accepted = world
        .service
        .set_status(owner, created.id, SwapStatus::Accepted)
        .await?;
    assert_eq!(accepted.status, SwapStatus::Accepted);
    assert_eq!(item_status(&world, world.item).await, ItemStatus::Reserved);

    world
        .service
        .send_swap_message(requester, created.id, "when can we meet?".to_string())
        .await?;
    let thread = world.service.list_swap_messages(owner, created.id).await?;
    assert_eq!(thread.len(), 1);
    assert_eq!(thread[0].message.body, "when can we meet?");

    // Default policy lets either side cancel an accepted swap.
    let incoming = world.service.list_incoming(owner).await?;
    assert_eq!(
        incoming[0].allowed_actions,
        vec![SwapStatus::Completed, SwapStatus::Cancelled]
    );
    let outgoing = world.service.list_outgoing(requester).await?;
    assert_eq!(outgoing[0].allowed_actions, vec![SwapStatus::Cancelled]);

    let completed = world
        .service
        .set_status(owner, created.id, SwapStatus::Completed)
        .await?;
    assert_eq!(completed.status, SwapStatus::Completed);
    assert!(completed.updated_at >= completed.created_at);
    assert_eq!(item_status(&world, world.item).await, ItemStatus::Exchanged);

    // A completed trade is settled for good.
    let reopened = world
        .service
        .set_status(owner, created.id, SwapStatus::Rejected)
        .await;
    assert!(matches!(
        reopened,
        Err(DomainError::InvalidTransition { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn a_withdrawn_request_cannot_be_revived_by_the_owner() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let created = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;

    let withdrawn = world
        .service
        .set_status(requester, created.id, SwapStatus::Cancelled)
        .await?;
    assert_eq!(withdrawn.status, SwapStatus::Cancelled);

    let accept = world
        .service
        .set_status(owner, created.id, SwapStatus::Accepted)
        .await;
    assert!(matches!(accept, Err(DomainError::InvalidTransition { .. })));

    // The failed attempt leaves the stored status untouched.
    let outgoing = world.service.list_outgoing(requester).await?;
    assert_eq!(outgoing[0].request.status, SwapStatus::Cancelled);

    Ok(())
}

#[tokio::test]
async fn cancelling_an_accepted_swap_releases_the_item() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let created = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;
    world
        .service
        .set_status(owner, created.id, SwapStatus::Accepted)
        .await?;
    assert_eq!(item_status(&world, world.item).await, ItemStatus::Reserved);

    let cancelled = world
        .service
        .set_status(requester, created.id, SwapStatus::Cancelled)
        .await?;
    assert_eq!(cancelled.status, SwapStatus::Cancelled);
    assert_eq!(item_status(&world, world.item).await, ItemStatus::Available);

    Ok(())
}

#[tokio::test]
async fn a_rejected_request_frees_the_requester_to_ask_again() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let first = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;

    // While the first request is active a second one is a conflict.
    let duplicate = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await;
    assert!(matches!(duplicate, Err(DomainError::Conflict { .. })));

    world
        .service
        .set_status(owner, first.id, SwapStatus::Rejected)
        .await?;
    // Rejection leaves the item listed.
    assert_eq!(item_status(&world, world.item).await, ItemStatus::Available);

    let second = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;
    assert_ne!(second.id, first.id);
    assert_eq!(second.status, SwapStatus::Pending);

    Ok(())
}

#[tokio::test]
async fn create_swap_rejects_bad_requests() -> Result<()> {
    let world = seed_world();
    let owner = Caller::user(world.owner);
    let requester = Caller::user(world.requester);

    let missing = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: Uuid::new_v4(),
                message: None,
            },
        )
        .await;
    assert!(matches!(missing, Err(DomainError::NotFound { .. })));

    let own_item = world
        .service
        .create_swap(
            owner,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await;
    assert!(matches!(own_item, Err(DomainError::Validation { .. })));

    let hidden = Uuid::new_v4();
    world.backend.seed_item(ItemSnapshot {
        id: hidden,
        owner_id: world.owner,
        title: "Broken printer".to_string(),
        status: ItemStatus::Hidden,
    });
    let unavailable = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: hidden,
                message: None,
            },
        )
        .await;
    assert!(matches!(unavailable, Err(DomainError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn transitions_enforce_actor_and_state() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);
    let stranger = Caller::user(Uuid::new_v4());

    let created = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;

    // Only the owner decides a pending request.
    let by_requester = world
        .service
        .set_status(requester, created.id, SwapStatus::Accepted)
        .await;
    assert!(matches!(by_requester, Err(DomainError::Forbidden { .. })));

    // Only the requester withdraws a pending request.
    let by_owner = world
        .service
        .set_status(owner, created.id, SwapStatus::Cancelled)
        .await;
    assert!(matches!(by_owner, Err(DomainError::Forbidden { .. })));

    // Non-parties are rejected before the transition is even examined.
    let by_stranger = world
        .service
        .set_status(stranger, created.id, SwapStatus::Accepted)
        .await;
    assert!(matches!(by_stranger, Err(DomainError::Forbidden { .. })));

    let unknown = world
        .service
        .set_status(owner, Uuid::new_v4(), SwapStatus::Accepted)
        .await;
    assert!(matches!(unknown, Err(DomainError::NotFound { .. })));

    // Terminal states accept nothing further.
    world
        .service
        .set_status(owner, created.id, SwapStatus::Rejected)
        .await?;
    let after_terminal = world
        .service
        .set_status(owner, created.id, SwapStatus::Accepted)
        .await;
    assert!(matches!(
        after_terminal,
        Err(DomainError::InvalidTransition { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn racing_opposing_decisions_crowns_exactly_one_winner() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let created = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;

    let (accept, reject) = tokio::join!(
        world
            .service
            .set_status(owner, created.id, SwapStatus::Accepted),
        world
            .service
            .set_status(owner, created.id, SwapStatus::Rejected),
    );

    let winners = [accept.is_ok(), reject.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(winners, 1, "exactly one transition may land");

    let loser = if accept.is_ok() { reject } else { accept };
    assert!(matches!(
        loser,
        Err(DomainError::Conflict { .. }) | Err(DomainError::InvalidTransition { .. })
    ));

    let final_status = world
        .service
        .list_incoming(owner)
        .await?
        .remove(0)
        .request
        .status;
    assert!(
        final_status == SwapStatus::Accepted || final_status == SwapStatus::Rejected,
        "final state belongs to the winner, got {final_status}"
    );

    Ok(())
}

#[tokio::test]
async fn swap_conversations_are_party_scoped_and_ordered() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);
    let stranger = Caller::user(Uuid::new_v4());

    let created = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;

    world
        .service
        .send_swap_message(requester, created.id, "Still available?".to_string())
        .await?;
    world
        .service
        .send_swap_message(owner, created.id, "Yes, come by tomorrow.".to_string())
        .await?;

    let thread = world.service.list_swap_messages(requester, created.id).await?;
    assert_eq!(thread.len(), 2);
    assert_eq!(thread[0].message.body, "Still available?");
    assert_eq!(thread[1].message.body, "Yes, come by tomorrow.");
    // Swap-scoped messages carry the item title as a breadcrumb.
    assert_eq!(
        thread[0].message.item_title.as_deref(),
        Some("Noise-cancelling headphones")
    );
    assert_eq!(thread[0].message.swap_id, Some(created.id));
    assert_eq!(thread[1].sender_name.as_deref(), Some("Dana Owner"));

    let send = world
        .service
        .send_swap_message(stranger, created.id, "Let me in".to_string())
        .await;
    assert!(matches!(send, Err(DomainError::Forbidden { .. })));
    let read = world.service.list_swap_messages(stranger, created.id).await;
    assert!(matches!(read, Err(DomainError::Forbidden { .. })));

    Ok(())
}

#[tokio::test]
async fn partner_threads_span_swaps_and_direct_messages() -> Result<()> {
    let world = seed_world();
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let second_item = Uuid::new_v4();
    world.backend.seed_item(ItemSnapshot {
        id: second_item,
        owner_id: world.owner,
        title: "Mini fridge".to_string(),
        status: ItemStatus::Available,
    });

    let first = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;
    let second = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: second_item,
                message: None,
            },
        )
        .await?;

    world
        .service
        .send_swap_message(requester, first.id, "About the headphones".to_string())
        .await?;
    world
        .service
        .send_swap_message(requester, second.id, "About the fridge".to_string())
        .await?;
    world
        .service
        .send_partner_message(owner, world.requester, "Either works for me".to_string())
        .await?;

    // The partner view flattens both swap threads and the direct exchange.
    let thread = world
        .service
        .list_partner_messages(requester, world.owner)
        .await?;
    let bodies: Vec<&str> = thread.iter().map(|m| m.message.body.as_str()).collect();
    assert_eq!(
        bodies,
        vec!["About the headphones", "About the fridge", "Either works for me"]
    );
    assert_eq!(thread[0].message.item_title.as_deref(), Some("Noise-cancelling headphones"));
    assert_eq!(thread[1].message.item_title.as_deref(), Some("Mini fridge"));
    assert_eq!(thread[2].message.item_title, None);
    assert_eq!(thread[2].message.swap_id, None);

    // Messaging an unknown partner or yourself is refused.
    let unknown = world
        .service
        .send_partner_message(requester, Uuid::new_v4(), "hello?".to_string())
        .await;
    assert!(matches!(unknown, Err(DomainError::NotFound { .. })));
    let to_self = world
        .service
        .send_partner_message(requester, world.requester, "note to self".to_string())
        .await;
    assert!(matches!(to_self, Err(DomainError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn inbox_lists_partners_by_recency_with_previews() -> Result<()> {
    let config = ServiceConfig {
        preview_len: 12,
        ..ServiceConfig::default()
    };
    let world = seed_world_with(config);
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let third = Uuid::new_v4();
    world.backend.seed_user(UserProfile {
        id: third,
        full_name: "Sam Third".to_string(),
        email: "sam@campus.edu".to_string(),
    });

    world
        .service
        .send_partner_message(owner, world.requester, "An opening line that runs long".to_string())
        .await?;
    world
        .service
        .send_partner_message(owner, third, "Short".to_string())
        .await?;

    let inbox = world.service.list_conversations(owner).await?;
    assert_eq!(inbox.len(), 2);
    // Most recent exchange first.
    assert_eq!(inbox[0].partner_id, third);
    assert_eq!(inbox[0].partner_name.as_deref(), Some("Sam Third"));
    assert_eq!(inbox[0].last_message_preview, "Short");
    assert_eq!(inbox[1].partner_id, world.requester);
    assert_eq!(inbox[1].last_message_preview, "An opening l...");

    // A reply bumps the pair back to the top.
    world
        .service
        .send_partner_message(requester, world.owner, "Deal".to_string())
        .await?;
    let inbox = world.service.list_conversations(owner).await?;
    assert_eq!(inbox[0].partner_id, world.requester);
    assert_eq!(inbox[0].last_message_preview, "Deal");

    // The other side of the pair sees the same conversation.
    let theirs = world.service.list_conversations(requester).await?;
    assert_eq!(theirs.len(), 1);
    assert_eq!(theirs[0].partner_id, world.owner);
    assert_eq!(theirs[0].partner_name.as_deref(), Some("Dana Owner"));

    Ok(())
}

#[tokio::test]
async fn display_fields_degrade_when_the_backend_has_no_row() -> Result<()> {
    let world = seed_world();
    let ghost = Uuid::new_v4();
    let requester = Caller::user(ghost);
    let owner = Caller::user(world.owner);

    // The requester exists as an identity but has no directory row.
    world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;

    let incoming = world.service.list_incoming(owner).await?;
    assert_eq!(incoming.len(), 1);
    assert!(incoming[0].requester.is_none());
    assert_eq!(
        incoming[0].item_title.as_deref(),
        Some("Noise-cancelling headphones")
    );

    Ok(())
}

#[tokio::test]
async fn moderation_listing_is_admin_only_and_capped() -> Result<()> {
    let config = ServiceConfig {
        max_list_len: 2,
        ..ServiceConfig::default()
    };
    let world = seed_world_with(config);
    let requester = Caller::user(world.requester);

    for i in 0..3 {
        let item = Uuid::new_v4();
        world.backend.seed_item(ItemSnapshot {
            id: item,
            owner_id: world.owner,
            title: format!("Spare part #{i}"),
            status: ItemStatus::Available,
        });
        world
            .service
            .create_swap(
                requester,
                NewSwapRequest {
                    item_id: item,
                    message: None,
                },
            )
            .await?;
    }

    let denied = world.service.list_all_swaps(requester).await;
    assert!(matches!(denied, Err(DomainError::Forbidden { .. })));

    let all = world
        .service
        .list_all_swaps(Caller::admin(Uuid::new_v4()))
        .await?;
    assert_eq!(all.len(), 2, "admin listing honors the configured cap");
    // Newest first.
    assert!(all[0].request.created_at >= all[1].request.created_at);
    assert_eq!(
        all[0].requester.as_ref().map(|p| p.email.as_str()),
        Some("riley@campus.edu")
    );
    assert_eq!(
        all[0].owner.as_ref().map(|p| p.email.as_str()),
        Some("dana@campus.edu")
    );

    Ok(())
}

#[tokio::test]
async fn message_bodies_are_trimmed_and_bounded() -> Result<()> {
    let config = ServiceConfig {
        max_message_len: 16,
        ..ServiceConfig::default()
    };
    let world = seed_world_with(config);
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let created = world
        .service
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: Some("   ".to_string()),
            },
        )
        .await?;
    // A whitespace-only opening note is dropped rather than stored.
    assert_eq!(created.message, None);

    let empty = world
        .service
        .send_swap_message(requester, created.id, "   \n ".to_string())
        .await;
    assert!(matches!(empty, Err(DomainError::Validation { .. })));

    let long = world
        .service
        .send_swap_message(owner, created.id, "x".repeat(17))
        .await;
    assert!(matches!(long, Err(DomainError::Validation { .. })));

    let trimmed = world
        .service
        .send_swap_message(owner, created.id, "  fits fine  ".to_string())
        .await?;
    assert_eq!(trimmed.body, "fits fine");

    Ok(())
}

#[tokio::test]
async fn local_client_translates_domain_errors() -> Result<()> {
    let world = seed_world();
    let client: Arc<dyn SwapsApi> = Arc::new(SwapsLocalClient::new(world.service.clone()));
    let requester = Caller::user(world.requester);
    let owner = Caller::user(world.owner);

    let created = client
        .create_swap(
            requester,
            NewSwapRequest {
                item_id: world.item,
                message: None,
            },
        )
        .await?;

    let premature = client
        .set_status(owner, created.id, SwapStatus::Completed)
        .await;
    assert!(matches!(
        premature,
        Err(SwapsError::InvalidTransition { .. })
    ));

    let denied = client.list_all_swaps(requester).await;
    assert!(matches!(denied, Err(SwapsError::Forbidden { .. })));

    let accepted = client.set_status(owner, created.id, SwapStatus::Accepted).await?;
    assert_eq!(accepted.status, SwapStatus::Accepted);

    Ok(())
}
