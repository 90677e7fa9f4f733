use agency_hub::domain::deliverable::DeliverableStatus;
use agency_hub::realtime::EventHub;
use agency_hub::services::{ServiceError, clients, deliverables, users};
use serde_json::json;

mod common;

#[test]
fn migration_hands_over_open_work_and_deactivates() {
    let db = common::TestDb::new("member_migration.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let create = |name: &str, email: &str| {
        users::create_member(
            &repo,
            &hub,
            &admin,
            common::form(json!({ "name": name, "email": email, "role": "member" })),
        )
        .unwrap()
    };
    let leaving = create("Lea", "lea@agency.io");
    let taking_over = create("Tom", "tom@agency.io");

    let client = clients::create_client(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Acme" })),
    )
    .unwrap();
    clients::assign_team(
        &repo,
        &hub,
        &admin,
        client.id.get(),
        common::form(json!({ "member_ids": [leaving.id.get()] })),
    )
    .unwrap();

    let create_deliverable = |title: &str| {
        deliverables::create_deliverable(
            &repo,
            &hub,
            &admin,
            common::form(json!({
                "client_id": client.id.get(),
                "assignee_id": leaving.id.get(),
                "title": title,
                "kind": "design",
            })),
        )
        .unwrap()
    };
    let open = create_deliverable("Banner set");
    let done = create_deliverable("Logo");
    deliverables::move_deliverable(
        &repo,
        &hub,
        &admin,
        done.id.get(),
        common::form(json!({ "status": "delivered" })),
    )
    .unwrap();

    let report = users::migrate_member(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "from": leaving.id.get(), "to": taking_over.id.get() })),
    )
    .unwrap();
    assert_eq!(report.deliverables, 1);
    assert_eq!(report.clients, 1);

    let detail = clients::get_client(&repo, &admin, client.id.get()).unwrap();
    let team: Vec<i32> = detail.team.iter().map(|member| member.id.get()).collect();
    assert_eq!(team, vec![taking_over.id.get()]);

    let board = deliverables::list_deliverables(&repo, &admin, Default::default()).unwrap();
    let moved = board.iter().find(|d| d.id == open.id).unwrap();
    assert_eq!(moved.assignee_id, Some(taking_over.id));
    let kept = board.iter().find(|d| d.id == done.id).unwrap();
    assert_eq!(kept.status, DeliverableStatus::Delivered);
    assert_eq!(kept.assignee_id, Some(leaving.id));

    // Lea can no longer act in the workspace.
    let lea = common::staff("lea@agency.io", "Lea");
    let result = agency_hub::services::team::list_members(&repo, &lea);
    assert!(matches!(result, Err(ServiceError::Unauthorized)));
}

#[test]
fn invitations_are_single_use() {
    let db = common::TestDb::new("invitations.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let issued = users::invite_member(
        &repo,
        &admin,
        common::form(json!({ "email": "nina@agency.io", "role": "manager" })),
        24,
    )
    .unwrap();
    assert_eq!(users::list_invitations(&repo, &admin).unwrap().len(), 1);

    let nina = common::staff("nina@agency.io", "Nina");
    let stranger = common::staff("eve@agency.io", "Eve");
    let wrong = users::accept_invitation(
        &repo,
        &hub,
        &stranger,
        common::form(json!({ "token": issued.token.clone() })),
    );
    assert!(matches!(wrong, Err(ServiceError::Unauthorized)));

    let member = users::accept_invitation(
        &repo,
        &hub,
        &nina,
        common::form(json!({ "token": issued.token.clone() })),
    )
    .unwrap();
    assert!(member.is_active);

    let again = users::accept_invitation(
        &repo,
        &hub,
        &nina,
        common::form(json!({ "token": issued.token })),
    );
    assert!(matches!(again, Err(ServiceError::Conflict(_))));
    assert!(users::list_invitations(&repo, &admin).unwrap().is_empty());
}
