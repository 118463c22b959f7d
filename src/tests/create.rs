use axum::http::Method;
use axum::http::StatusCode;

use crate::config::Config;
use crate::config::parse_base_url;
use crate::identifier;
use crate::tests::helper;

#[tokio::test]
async fn test_create() {
    let mut app = helper::setup_test_app();

    for method in [Method::GET, Method::POST] {
        let (status_code, location) = helper::maybe_create_note(&mut app, method).await;
        assert_eq!(StatusCode::SEE_OTHER, status_code);

        let location = location.unwrap();
        let hash_id = location
            .strip_prefix("http://localhost:6000/note/")
            .unwrap();
        assert!(identifier::is_valid(hash_id), "{hash_id}");

        let (status_code, note, _) = helper::single_note(&mut app, hash_id).await;
        assert_eq!(StatusCode::OK, status_code);
        assert_eq!("untitled", note.unwrap().title);
    }

    let (_, page) = helper::list_notes(&mut app, "/api/notes").await;
    assert_eq!(2, page.unwrap().total);
}

#[tokio::test]
async fn test_create_below_base_url() {
    let mut config = Config::with_secret("verysecret");
    config.base_url = parse_base_url("https://example.com/jotter").unwrap();

    let mut app = helper::setup_test_app_with_config(config);

    let (status_code, location) = helper::maybe_create_note(&mut app, Method::GET).await;
    assert_eq!(StatusCode::SEE_OTHER, status_code);
    assert!(
        location
            .unwrap()
            .starts_with("https://example.com/jotter/note/")
    );
}
