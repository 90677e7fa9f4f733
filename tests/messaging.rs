use agency_hub::domain::messaging::{ChannelKind, NewChannel};
use agency_hub::realtime::{EventHub, PresenceTracker};
use agency_hub::repository::MessagingWriter;
use agency_hub::services::{ServiceError, messaging, presence, users};
use serde_json::json;

mod common;

#[test]
fn unread_counts_follow_the_read_cursor() {
    let db = common::TestDb::new("unread_cursor.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let tracker = PresenceTracker::new();
    let admin = common::admin();
    let bob = common::staff("bob@agency.io", "Bob");

    let bob_member = users::create_member(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Bob", "email": "bob@agency.io", "role": "member" })),
    )
    .unwrap();
    let channel = messaging::create_channel(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "general", "kind": "public", "members": [bob_member.id.get()] })),
    )
    .unwrap();
    let channel_id = channel.id.get();

    let mut last = None;
    for body in ["Kickoff at 10", "Bring the mood boards"] {
        let message = messaging::post_message(
            &repo,
            &hub,
            &tracker,
            &admin,
            channel_id,
            common::form(json!({ "body": body })),
        )
        .unwrap();
        last = Some(message);
    }
    let last = last.unwrap();

    let summaries = messaging::list_channels(&repo, &bob).unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].unread, 2);
    // Own messages never count as unread.
    assert_eq!(messaging::list_channels(&repo, &admin).unwrap()[0].unread, 0);

    let advanced = messaging::mark_read(
        &repo,
        &hub,
        &bob,
        channel_id,
        common::form(json!({ "message_id": last.id.get() })),
    )
    .unwrap();
    assert!(advanced);
    assert_eq!(messaging::list_channels(&repo, &bob).unwrap()[0].unread, 0);

    let receipts = messaging::read_receipts(&repo, &admin, channel_id, last.id.get()).unwrap();
    assert_eq!(receipts.read_by, vec![bob_member.id]);

    let page = messaging::list_messages(&repo, &bob, channel_id, Default::default()).unwrap();
    assert_eq!(page.messages.len(), 2);
    assert_eq!(page.messages[0].id, last.id);
}

#[test]
fn direct_channels_are_reused_and_private_ones_closed() {
    let db = common::TestDb::new("direct_channels.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();
    let carol = common::staff("carol@agency.io", "Carol");

    let carol_member = users::create_member(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Carol", "email": "carol@agency.io", "role": "member" })),
    )
    .unwrap();
    let payload = json!({ "kind": "direct", "members": [carol_member.id.get()] });
    let first = messaging::create_channel(&repo, &hub, &admin, common::form(payload.clone())).unwrap();
    let second = messaging::create_channel(&repo, &hub, &admin, common::form(payload)).unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.kind, ChannelKind::Direct);

    let private = messaging::create_channel(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "leadership", "kind": "private" })),
    )
    .unwrap();
    let joined = messaging::join_channel(&repo, &carol, private.id.get());
    assert!(matches!(joined, Err(ServiceError::Unauthorized)));
}

#[test]
fn drafts_and_typing_are_per_member() {
    let db = common::TestDb::new("drafts_typing.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let tracker = PresenceTracker::new();
    let admin = common::admin();

    let channel = messaging::create_channel(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "general", "kind": "public" })),
    )
    .unwrap();
    let channel_id = channel.id.get();

    let saved = messaging::save_draft(
        &repo,
        &admin,
        channel_id,
        common::form(json!({ "body": "half a thought" })),
    )
    .unwrap();
    assert!(saved.is_some());
    assert!(messaging::get_draft(&repo, &admin, channel_id).unwrap().is_some());

    let cleared = messaging::save_draft(
        &repo,
        &admin,
        channel_id,
        common::form(json!({ "body": "   " })),
    )
    .unwrap();
    assert!(cleared.is_none());
    assert!(messaging::get_draft(&repo, &admin, channel_id).unwrap().is_none());

    messaging::save_draft(
        &repo,
        &admin,
        channel_id,
        common::form(json!({ "body": "done" })),
    )
    .unwrap();
    presence::typing(&repo, &hub, &tracker, &admin, channel_id).unwrap();
    assert_eq!(
        presence::typing_members(&repo, &tracker, &admin, channel_id)
            .unwrap()
            .members
            .len(),
        1
    );

    messaging::post_message(
        &repo,
        &hub,
        &tracker,
        &admin,
        channel_id,
        common::form(json!({ "body": "done" })),
    )
    .unwrap();
    assert!(
        presence::typing_members(&repo, &tracker, &admin, channel_id)
            .unwrap()
            .members
            .is_empty()
    );
    // Posting consumes the draft.
    assert!(messaging::get_draft(&repo, &admin, channel_id).unwrap().is_none());
}

#[test]
fn direct_channel_names_cannot_be_squatted() {
    let db = common::TestDb::new("direct_squat.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let carol_member = users::create_member(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Carol", "email": "carol@agency.io", "role": "member" })),
    )
    .unwrap();
    users::create_member(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Mallory", "email": "mallory@agency.io", "role": "member" })),
    )
    .unwrap();
    let mallory = common::staff("mallory@agency.io", "Mallory");

    let direct = messaging::create_channel(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "kind": "direct", "members": [carol_member.id.get()] })),
    )
    .unwrap();

    let squatted = messaging::create_channel(
        &repo,
        &hub,
        &mallory,
        common::form(json!({ "name": direct.name.as_str(), "kind": "public" })),
    );
    assert!(matches!(squatted, Err(ServiceError::Form(_))));

    let again = messaging::create_channel(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "kind": "direct", "members": [carol_member.id.get()] })),
    )
    .unwrap();
    assert_eq!(again.id, direct.id);
    assert_eq!(again.kind, ChannelKind::Direct);
}

#[test]
fn duplicate_direct_insert_returns_the_existing_channel() {
    let db = common::TestDb::new("direct_unique.db");
    let repo = db.repo();
    let hub = EventHub::new(16);
    let admin = common::admin();

    let carol_member = users::create_member(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "name": "Carol", "email": "carol@agency.io", "role": "member" })),
    )
    .unwrap();
    let direct = messaging::create_channel(
        &repo,
        &hub,
        &admin,
        common::form(json!({ "kind": "direct", "members": [carol_member.id.get()] })),
    )
    .unwrap();

    // Bypasses the service lookup, as a racing request would.
    let pair = NewChannel::try_new(
        direct.workspace_id,
        None,
        ChannelKind::Direct,
        direct.created_by,
        &[carol_member.id],
    )
    .unwrap();
    let raced = MessagingWriter::create_channel(&repo, &pair).unwrap();
    assert_eq!(raced.id, direct.id);
}
