use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::client::autosave::Autosave;
use crate::client::autosave::Autosaver;
use crate::client::autosave::DEBOUNCE;
use crate::client::autosave::Draft;
use crate::client::autosave::SaveState;
use crate::client::autosave::SaveTransport;
use crate::client::feed::FeedCursor;
use crate::client::feed::FeedPage;
use crate::storage::SortKey;
use crate::tests::helper;

/// Editor state for a freshly loaded note
async fn open_editor(app: &mut axum::Router, hash_id: &str) -> Autosave {
    let (_, note, _) = helper::single_note(app, hash_id).await;
    let note = note.unwrap();

    Autosave::new(
        hash_id,
        Draft::new(&note.title, &note.content),
        Some(note.updated_at),
    )
}

#[tokio::test]
async fn test_autosave_against_router() {
    let mut app = helper::setup_test_app();

    let session = helper::start_session(&mut app).await;
    let hash_id = helper::create_note(&mut app).await;

    let mut autosave = open_editor(&mut app, &hash_id).await;
    let mut transport = helper::RouterTransport {
        app: app.clone(),
        session: session.clone(),
    };

    let start = Instant::now();
    autosave.edit(Draft::new("", "Shopping list for today"), start);

    let request = autosave.poll(start + DEBOUNCE).unwrap();
    let outcome = transport.save(&request).await;
    autosave.resolve(outcome, start + DEBOUNCE);

    assert_eq!(SaveState::Success, autosave.state());
    assert_eq!("Auto-saved!", autosave.label());

    let (_, note, _) = helper::single_note(&mut app, &hash_id).await;
    let note = note.unwrap();
    assert_eq!("Shopping", note.title);
    assert_eq!(Some(note.updated_at.as_str()), autosave.expected_updated_at());
}

#[tokio::test]
async fn test_autosave_conflict_between_editors() {
    let mut app = helper::setup_test_app();

    let session = helper::start_session(&mut app).await;
    let hash_id = helper::create_note(&mut app).await;

    // an editor based on a long gone version
    let (_, note, _) = helper::single_note(&mut app, &hash_id).await;
    let note = note.unwrap();
    let mut stale = Autosave::new(
        &hash_id,
        Draft::new(&note.title, &note.content),
        Some("2000-01-01 00:00:00".to_string()),
    );

    helper::save_note(&mut app, &session, &hash_id, "Written somewhere else").await;

    let mut transport = helper::RouterTransport {
        app: app.clone(),
        session,
    };
    let now = Instant::now();

    stale.edit(Draft::new("", "Written in the stale editor"), now);
    let request = stale.save_now().unwrap();
    let outcome = transport.save(&request).await;
    stale.resolve(outcome, now);

    assert_eq!(SaveState::Error, stale.state());
    let (_, note, _) = helper::single_note(&mut app, &hash_id).await;
    let server = note.unwrap();
    assert_eq!(Some(server.updated_at.as_str()), stale.conflict());
    assert_eq!("Written somewhere else", server.content);

    // keep the local draft
    let request = stale.overwrite().unwrap();
    let outcome = transport.save(&request).await;
    stale.resolve(outcome, now);
    assert_eq!(SaveState::Success, stale.state());

    let (_, note, _) = helper::single_note(&mut app, &hash_id).await;
    assert_eq!("Written in the stale editor", note.unwrap().content);
}

#[tokio::test]
async fn test_invalid_token_is_a_failed_save() {
    let mut app = helper::setup_test_app();

    let mut session = helper::start_session(&mut app).await;
    session.csrf_token = "expired".to_string();

    let hash_id = helper::create_note(&mut app).await;
    let mut autosave = open_editor(&mut app, &hash_id).await;
    let mut transport = helper::RouterTransport {
        app: app.clone(),
        session,
    };

    let now = Instant::now();
    autosave.edit(Draft::new("", "Never stored"), now);
    let request = autosave.save_now().unwrap();
    let outcome = transport.save(&request).await;
    autosave.resolve(outcome, now);

    assert_eq!(SaveState::Error, autosave.state());
    assert_eq!(Some("Invalid request. Please try again."), autosave.last_error());
    assert!(autosave.conflict().is_none());
    assert_eq!("Never stored", autosave.draft().content);
}

#[tokio::test(start_paused = true)]
async fn test_autosaver_against_router() {
    let mut app = helper::setup_test_app();

    let session = helper::start_session(&mut app).await;
    let hash_id = helper::create_note(&mut app).await;

    let autosave = open_editor(&mut app, &hash_id).await;
    let transport = helper::RouterTransport {
        app: app.clone(),
        session,
    };

    let (sender, receiver) = mpsc::channel(8);
    let handle = tokio::spawn(Autosaver::new(autosave, transport).run(receiver));

    sender.send(Draft::new("", "Typing")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(500)).await;
    sender.send(Draft::new("", "Typing along")).await.unwrap();
    tokio::time::sleep(Duration::from_millis(3500)).await;

    let (_, note, _) = helper::single_note(&mut app, &hash_id).await;
    assert_eq!("Typing along", note.unwrap().content);

    drop(sender);
    let autosave = handle.await.unwrap();
    assert!(!autosave.is_dirty());
}

#[tokio::test]
async fn test_feed_against_router() {
    let mut app = helper::setup_test_app();

    for _ in 0..23 {
        helper::create_note(&mut app).await;
    }

    let mut cursor = FeedCursor::new("", SortKey::Created);
    let base_url = crate::config::parse_base_url("http://localhost:6000/").unwrap();

    while let Some(request) = cursor.on_sentinel(true) {
        let url = request.to_url(&base_url).unwrap();
        let path_and_query = format!("{}?{}", url.path(), url.query().unwrap_or_default());

        let (_, body) = helper::get(&mut app, &path_and_query).await;
        let page = serde_json::from_slice::<FeedPage>(&body).unwrap();

        cursor.complete(page);
    }

    assert_eq!(23, cursor.notes().len());
    assert_eq!(23, cursor.offset());
    assert!(!cursor.has_more());
}
