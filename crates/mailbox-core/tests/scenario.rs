//! End-to-end flows over the in-memory store and identity provider.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use mailbox_auth::MemoryIdentity;
use mailbox_core::{
    Draft, FolderView, LoadState, LoginForm, SendError, Session, SessionSlot, SignUpForm,
    load_counts, log_in, send_mail, sign_up,
};
use mailbox_store::{Folder, MemoryStore};

async fn account(provider: &MemoryIdentity, slot: &SessionSlot, email: &str) -> Session {
    let form = SignUpForm {
        email: email.to_string(),
        password: "secret1".to_string(),
        confirm: "secret1".to_string(),
        agree: true,
    };
    sign_up(provider, &form).await.unwrap();
    log_in(
        provider,
        slot,
        &LoginForm {
            email: email.to_string(),
            password: "secret1".to_string(),
        },
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_send_read_delete() {
    let dir = tempfile::tempdir().unwrap();
    let provider = MemoryIdentity::new();
    let store = MemoryStore::new();

    let alice_slot = SessionSlot::new(dir.path().join("alice.json"));
    let bob_slot = SessionSlot::new(dir.path().join("bob.json"));
    let alice = account(&provider, &alice_slot, "a@x.com").await;
    let bob = account(&provider, &bob_slot, "b@y.com").await;

    let restored = alice_slot.load().await.unwrap();
    send_mail(
        &store,
        restored.as_ref(),
        &Draft::new("b@y.com", "Hi", "<p>Hello Bob</p>"),
    )
    .await
    .unwrap();

    let mut sent = FolderView::new(store.clone(), alice, Folder::Sent);
    sent.load().await;
    assert_eq!(sent.records().len(), 1);
    assert!(sent.records()[0].read);
    assert_eq!(sent.unread_count(), 0);

    let mut inbox = FolderView::new(store.clone(), bob.clone(), Folder::Inbox);
    inbox.load().await;
    assert_eq!(inbox.records().len(), 1);
    assert_eq!(inbox.unread_count(), 1);

    let id = inbox.records()[0].id.clone();
    let opened = inbox.open(&id).await.unwrap();
    assert_eq!(opened.from, "a@x.com");
    assert_eq!(opened.subject, "Hi");
    assert_eq!(inbox.unread_count(), 0);

    // A fresh view sees the persisted flag.
    let [bob_inbox, _] = load_counts(&store, &bob).await;
    assert_eq!((bob_inbox.total, bob_inbox.unread), (1, 0));

    inbox.delete(&id).await.unwrap();
    assert_eq!(inbox.state(), LoadState::Empty);

    // The sender's copy is independent of the recipient's.
    sent.refresh().await;
    assert_eq!(sent.records().len(), 1);
}

#[tokio::test]
async fn test_folders_are_per_user() {
    let store = MemoryStore::new();
    let sender = Session::new("first.last@x.com");

    send_mail(&store, Some(&sender), &Draft::new("c@d.org", "s", "m"))
        .await
        .unwrap();

    let mut own_sent = FolderView::new(store.clone(), sender, Folder::Sent);
    own_sent.load().await;
    assert_eq!(own_sent.records().len(), 1);

    let mut other = FolderView::new(store, Session::new("c@d.org"), Folder::Sent);
    other.load().await;
    assert_eq!(other.state(), LoadState::Empty);
}

proptest! {
    #[test]
    fn test_incomplete_draft_never_touches_store(
        to in prop_oneof![Just(String::new()), Just("  ".to_string()), "[a-z]{1,8}@y\\.com"],
        subject in prop_oneof![Just(String::new()), Just("\t".to_string()), "[a-z]{1,8}"],
        message in prop_oneof![Just(String::new()), "[a-z]{1,8}"],
        logged_in in any::<bool>(),
    ) {
        let draft = Draft::new(to, subject, message);
        prop_assume!(!draft.missing_fields().is_empty());

        let store = MemoryStore::new();
        let sender = Session::new("a@x.com");
        let result = tokio_test::block_on(send_mail(&store, logged_in.then_some(&sender), &draft));

        prop_assert!(matches!(result, Err(SendError::MissingFields(_))));
        prop_assert_eq!(store.calls(), 0);
    }
}
