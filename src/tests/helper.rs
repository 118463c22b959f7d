use axum::Router;
use axum::body::Body;
use axum::body::Bytes;
use axum::http::Method;
use axum::http::Request;
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::http::header::COOKIE;
use axum::http::header::LOCATION;
use axum::http::header::SET_COOKIE;
use http_body_util::BodyExt;
use serde_json::Map;
use serde_json::Value;
use tower::Service;

use crate::client::autosave::SaveOutcome;
use crate::client::autosave::SaveRequest;
use crate::client::autosave::SaveTransport;
use crate::config::Config;
use crate::create_router;
use crate::storage::Memory;

/// Test helper version of Note struct
#[derive(Debug, PartialEq, Eq)]
pub struct Note {
    pub hash_id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Test helper version of a page of notes
#[derive(Debug)]
pub struct Page {
    pub notes: Vec<Note>,
    pub has_more: bool,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Cookie and CSRF token of a session
#[derive(Clone, Debug)]
pub struct Session {
    pub cookie: String,
    pub csrf_token: String,
}

/// Save form, fields left `None` are not sent
#[derive(Debug, Default)]
pub struct SaveForm<'a> {
    pub title: &'a str,
    pub content: &'a str,
    pub auto_save: bool,
    pub expected_updated_at: Option<&'a str>,
    pub csrf_token: Option<&'a str>,
}

/// Setup the Jotter app on memory storage
pub fn setup_test_app() -> Router {
    setup_test_app_with_config(Config::with_secret("verysecret"))
}

/// Setup the Jotter app on memory storage with a custom configuration
pub fn setup_test_app_with_config(config: Config) -> Router {
    create_router(Memory::new(), config)
}

/// Body of a response as JSON
pub fn to_json(body: &Bytes) -> Value {
    serde_json::from_slice::<Value>(&body[..]).unwrap()
}

pub async fn start_session(app: &mut Router) -> Session {
    let (status_code, set_cookie, body) = session(app, None).await;
    assert_eq!(StatusCode::OK, status_code);

    let cookie = set_cookie
        .and_then(|set_cookie| set_cookie.split(';').next().map(ToString::to_string))
        .unwrap();

    Session {
        cookie,
        csrf_token: get_csrf_token(&body),
    }
}

pub async fn session(
    app: &mut Router,
    cookie: Option<&str>,
) -> (StatusCode, Option<String>, Bytes) {
    let mut builder = Request::builder().method(Method::GET).uri("/api/session");

    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    let request = builder.body(Body::empty()).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .map(|header| header.to_str().unwrap().to_string());

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, set_cookie, body)
}

/// Plain `GET`, returns the raw body
pub async fn get(app: &mut Router, uri: &str) -> (StatusCode, Bytes) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, body)
}

/// Create a note, returns the location of the redirect
pub async fn maybe_create_note(app: &mut Router, method: Method) -> (StatusCode, Option<String>) {
    let request = Request::builder()
        .method(method)
        .uri("/create")
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();

    let status_code = response.status();
    let location = response
        .headers()
        .get(LOCATION)
        .map(|header| header.to_str().unwrap().to_string());

    (status_code, location)
}

/// Create a note, returns its public ID
pub async fn create_note(app: &mut Router) -> String {
    let (status_code, location) = maybe_create_note(app, Method::GET).await;
    assert_eq!(StatusCode::SEE_OTHER, status_code);

    location
        .and_then(|location| location.rsplit('/').next().map(ToString::to_string))
        .unwrap()
}

pub async fn single_note(
    app: &mut Router,
    hash_id: &str,
) -> (StatusCode, Option<Note>, Option<String>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(format!("/note/{hash_id}"))
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_note(&body))
        } else {
            None
        },
        if status_code == StatusCode::OK {
            None
        } else {
            Some(get_error_message(&body))
        },
    )
}

pub async fn list_notes(app: &mut Router, path_and_query: &str) -> (StatusCode, Option<Page>) {
    let request = Request::builder()
        .method(Method::GET)
        .uri(path_and_query)
        .body(Body::empty())
        .unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (
        status_code,
        if status_code == StatusCode::OK {
            Some(get_page(&body))
        } else {
            None
        },
    )
}

/// Post a raw form to a path, with an optional cookie
pub async fn post_form(
    app: &mut Router,
    uri: &str,
    cookie: Option<&str>,
    form: String,
) -> (StatusCode, Option<String>, Bytes) {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, mime::APPLICATION_WWW_FORM_URLENCODED.as_ref());

    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    let request = builder.body(Body::from(form)).unwrap();

    let response = app.call(request).await.unwrap();
    let status_code = response.status();

    let location = response
        .headers()
        .get(LOCATION)
        .map(|header| header.to_str().unwrap().to_string());

    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status_code, location, body)
}

/// Save a note, returns the JSON body
pub async fn maybe_save_note(
    app: &mut Router,
    session: &Session,
    hash_id: &str,
    form: &SaveForm<'_>,
) -> (StatusCode, Value) {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());

    serializer
        .append_pair(
            "csrf_token",
            form.csrf_token.unwrap_or(session.csrf_token.as_str()),
        )
        .append_pair("title", form.title)
        .append_pair("content", form.content)
        .append_pair("auto_save", if form.auto_save { "1" } else { "0" });

    if let Some(expected_updated_at) = form.expected_updated_at {
        serializer.append_pair("expected_updated_at", expected_updated_at);
    }

    let (status_code, _, body) = post_form(
        app,
        &format!("/note/{hash_id}"),
        Some(&session.cookie),
        serializer.finish(),
    )
    .await;

    (status_code, to_json(&body))
}

/// Save a note with just content
pub async fn save_note(app: &mut Router, session: &Session, hash_id: &str, content: &str) -> Value {
    let form = SaveForm {
        content,
        ..SaveForm::default()
    };

    let (status_code, body) = maybe_save_note(app, session, hash_id, &form).await;
    assert_eq!(StatusCode::OK, status_code, "{body}");

    body
}

/// Delete a note, returns the status and the location of the redirect
pub async fn maybe_delete_note(
    app: &mut Router,
    session: &Session,
    hash_id: &str,
    csrf_token: &str,
) -> (StatusCode, Option<String>) {
    let form = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("hash_id", hash_id)
        .append_pair("csrf_token", csrf_token)
        .finish();

    let (status_code, location, _) = post_form(app, "/delete", Some(&session.cookie), form).await;

    (status_code, location)
}

/// Saves through the router, the way a browser would post the editor
pub struct RouterTransport {
    pub app: Router,
    pub session: Session,
}

impl SaveTransport for RouterTransport {
    async fn save(&mut self, request: &SaveRequest) -> SaveOutcome {
        let (_, _, body) = post_form(
            &mut self.app,
            &format!("/{}", request.path()),
            Some(&self.session.cookie),
            request.to_form(&self.session.csrf_token),
        )
        .await;

        SaveOutcome::from_json(&body)
    }
}

fn value_to_note(note: &Map<String, Value>) -> Note {
    let field = |name: &str| note[name].as_str().map(ToString::to_string).unwrap();

    Note {
        hash_id: field("hash_id"),
        title: field("title"),
        content: field("content"),
        created_at: field("created_at"),
        updated_at: field("updated_at"),
    }
}

fn get_note(body: &Bytes) -> Note {
    to_json(body)["note"]
        .as_object()
        .map(value_to_note)
        .unwrap()
}

fn get_page(body: &Bytes) -> Page {
    let page = to_json(body);

    Page {
        notes: page["notes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|note| note.as_object().unwrap())
            .map(value_to_note)
            .collect(),
        has_more: page["hasMore"].as_bool().unwrap(),
        total: page["total"].as_u64().unwrap(),
        offset: page["offset"].as_u64().unwrap(),
        limit: page["limit"].as_u64().unwrap(),
    }
}

fn get_error_message(body: &Bytes) -> String {
    let error = to_json(body);

    assert_eq!(Some(false), error["success"].as_bool());

    error["message"].as_str().map(ToString::to_string).unwrap()
}

fn get_csrf_token(body: &Bytes) -> String {
    to_json(body)["csrf_token"]
        .as_str()
        .map(ToString::to_string)
        .unwrap()
}
