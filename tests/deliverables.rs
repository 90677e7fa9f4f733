use agency_hub::domain::deliverable::{DeliverableKind, DeliverableStatus};
use agency_hub::realtime::EventHub;
use agency_hub::services::{ServiceError, clients, deliverables};
use serde_json::json;

mod common;

fn usage_of(
    repo: &agency_hub::repository::DieselRepository,
    client_id: i32,
    kind: DeliverableKind,
) -> (i32, i32) {
    let usage = deliverables::package_usage(repo, &common::admin(), client_id).unwrap();
    let row = usage.iter().find(|row| row.kind == kind).unwrap();
    (row.used, row.remaining)
}

#[test]
fn delivering_consumes_the_package_and_reopening_restores_it() {
    let db = common::TestDb::new("package_usage.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let client = clients::create_client(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Acme", "status": "active" })),
    )
    .unwrap();
    let client_id = client.id.get();
    deliverables::set_allocation(
        &repo,
        &hub,
        &admin,
        client_id,
        common::form(json!({ "kind": "video", "allocated": 1 })),
    )
    .unwrap();

    let create = |title: &str| {
        deliverables::create_deliverable(
            &repo,
            &hub,
            &admin,
            common::form(json!({ "client_id": client_id, "title": title, "kind": "video" })),
        )
        .unwrap()
    };
    let launch = create("Launch reel");
    let teaser = create("Teaser");
    assert_eq!(launch.status, DeliverableStatus::Backlog);

    let to = |status: &str| common::form(json!({ "status": status }));

    let delivered =
        deliverables::move_deliverable(&repo, &hub, &admin, launch.id.get(), to("delivered"))
            .unwrap();
    assert_eq!(delivered.status, DeliverableStatus::Delivered);
    assert!(delivered.completed_at.is_some());
    assert_eq!(usage_of(&repo, client_id, DeliverableKind::Video), (1, 0));

    let exhausted =
        deliverables::move_deliverable(&repo, &hub, &admin, teaser.id.get(), to("delivered"));
    assert!(matches!(exhausted, Err(ServiceError::Conflict(_))));

    let reopened =
        deliverables::move_deliverable(&repo, &hub, &admin, launch.id.get(), to("review"))
            .unwrap();
    assert!(reopened.completed_at.is_none());
    assert_eq!(usage_of(&repo, client_id, DeliverableKind::Video), (0, 1));

    deliverables::move_deliverable(&repo, &hub, &admin, teaser.id.get(), to("delivered")).unwrap();
    assert_eq!(usage_of(&repo, client_id, DeliverableKind::Video), (1, 0));
}

#[test]
fn untracked_kinds_complete_freely_and_board_has_every_column() {
    let db = common::TestDb::new("kanban_board.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let client = clients::create_client(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Globex" })),
    )
    .unwrap();
    let copy = deliverables::create_deliverable(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "client_id": client.id.get(), "title": "Newsletter", "kind": "copy" })),
    )
    .unwrap();
    deliverables::move_deliverable(
        &repo,
        &hub,
        &admin,
        copy.id.get(),
        common::form(json!({ "status": "delivered" })),
    )
    .unwrap();

    let board = deliverables::kanban_board(&repo, &admin, Default::default()).unwrap();
    assert_eq!(board.len(), DeliverableStatus::ALL.len());
    let delivered = board
        .iter()
        .find(|column| column.status == DeliverableStatus::Delivered)
        .unwrap();
    assert_eq!(delivered.deliverables.len(), 1);
}

#[test]
fn managers_only_touch_assigned_clients() {
    let db = common::TestDb::new("manager_scope.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();
    let manager = common::manager("max@agency.io");

    let client = clients::create_client(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Initech" })),
    )
    .unwrap();
    let payload = json!({ "client_id": client.id.get(), "title": "Logo", "kind": "design" });

    let denied = deliverables::create_deliverable(&repo, &hub, &manager, common::form(payload.clone()));
    assert!(matches!(denied, Err(ServiceError::Unauthorized)));

    let members = agency_hub::services::team::list_members(&repo, &admin).unwrap();
    let max = members
        .iter()
        .find(|member| member.email.as_str() == "max@agency.io")
        .unwrap();
    clients::assign_team(
        &repo,
        &hub,
        &admin,
        client.id.get(),
        common::form(json!({ "member_ids": [max.id.get()] })),
    )
    .unwrap();

    let created = deliverables::create_deliverable(&repo, &hub, &manager, common::form(payload));
    assert!(created.is_ok());
}

#[test]
fn delivered_kind_is_locked_until_reopened() {
    let db = common::TestDb::new("kind_lock.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let client = clients::create_client(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Acme" })),
    )
    .unwrap();
    let client_id = client.id.get();
    for kind in ["video", "design"] {
        deliverables::set_allocation(
            &repo,
            &hub,
            &admin,
            client_id,
            common::form(json!({ "kind": kind, "allocated": 5 })),
        )
        .unwrap();
    }

    let deliver = |title: &str, kind: &str| {
        let created = deliverables::create_deliverable(
            &repo,
            &hub,
            &admin,
            common::form(json!({ "client_id": client_id, "title": title, "kind": kind })),
        )
        .unwrap();
        deliverables::move_deliverable(
            &repo,
            &hub,
            &admin,
            created.id.get(),
            common::form(json!({ "status": "delivered" })),
        )
        .unwrap()
    };
    deliver("Logo", "design");
    let reel = deliver("Reel", "video");

    let relabel = deliverables::update_deliverable(
        &repo,
        &hub,
        &admin,
        reel.id.get(),
        common::form(json!({ "title": "Reel", "kind": "design" })),
    );
    assert!(matches!(relabel, Err(ServiceError::Conflict(_))));
    assert_eq!(usage_of(&repo, client_id, DeliverableKind::Design), (1, 4));
    assert_eq!(usage_of(&repo, client_id, DeliverableKind::Video), (1, 4));

    deliverables::move_deliverable(
        &repo,
        &hub,
        &admin,
        reel.id.get(),
        common::form(json!({ "status": "review" })),
    )
    .unwrap();
    let relabelled = deliverables::update_deliverable(
        &repo,
        &hub,
        &admin,
        reel.id.get(),
        common::form(json!({ "title": "Reel", "kind": "design" })),
    )
    .unwrap();
    assert_eq!(relabelled.kind, DeliverableKind::Design);
    assert_eq!(usage_of(&repo, client_id, DeliverableKind::Design), (1, 4));
    assert_eq!(usage_of(&repo, client_id, DeliverableKind::Video), (0, 5));
}

#[test]
fn repository_refuses_kind_change_of_delivered_work() {
    use agency_hub::domain::deliverable::UpdateDeliverable;
    use agency_hub::domain::types::{DeliverableTitle, WorkspaceId};
    use agency_hub::repository::DeliverableWriter;
    use agency_hub::repository::errors::RepositoryError;

    let db = common::TestDb::new("kind_lock_repo.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let client = clients::create_client(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Acme" })),
    )
    .unwrap();
    let created = deliverables::create_deliverable(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "client_id": client.id.get(), "title": "Reel", "kind": "video" })),
    )
    .unwrap();
    deliverables::move_deliverable(
        &repo,
        &hub,
        &admin,
        created.id.get(),
        common::form(json!({ "status": "delivered" })),
    )
    .unwrap();

    let result = repo.update_deliverable(
        created.id,
        WorkspaceId::new(1).unwrap(),
        &UpdateDeliverable {
            campaign_id: None,
            assignee_id: None,
            title: DeliverableTitle::new("Reel").unwrap(),
            kind: DeliverableKind::Copy,
            due_date: None,
        },
    );
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));
}
