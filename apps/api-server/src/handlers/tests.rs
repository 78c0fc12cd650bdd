use std::path::Path;
use std::sync::Arc;

use actix_web::cookie::{Cookie, SameSite};
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header::ContentType};
use actix_web::{App, test, web};
use async_trait::async_trait;
use serde_json::{Value, json};

use chapel_core::domain::{Session, SessionToken};
use chapel_core::ports::{SessionStore, SessionStoreError};
use chapel_infra::{
    Argon2AdminVerifier, InMemoryPostRepository, InMemorySessionStore, LocalFileStore,
};

use super::configure_routes;
use crate::config::{SessionConfig, SessionStoreKind, UploadConfig};
use crate::state::AppState;

const COOKIE: &str = "chapel_sid";
const BOUNDARY: &str = "chapel-test-boundary";

fn state_with(sessions: Arc<dyn SessionStore>, upload_dir: &Path) -> AppState {
    let verifier = Argon2AdminVerifier::from_plaintext("admin", "secret").unwrap();

    AppState::from_parts(
        Arc::new(InMemoryPostRepository::new()),
        sessions,
        Arc::new(verifier),
        Arc::new(LocalFileStore::new(upload_dir, "/uploads")),
        SessionConfig {
            store: SessionStoreKind::Memory,
            ttl_hours: 24,
            cookie_name: COOKIE.to_string(),
            cookie_domain: None,
            secure: false,
            same_site: SameSite::Lax,
        },
        UploadConfig {
            dir: upload_dir.to_path_buf(),
            public_base_url: "/uploads".to_string(),
            max_bytes: 64,
        },
    )
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(configure_routes),
        )
        .await
    };
}

fn session_cookie(resp: &ServiceResponse) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == COOKIE)
        .map(|c| c.into_owned())
}

macro_rules! login {
    ($app:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/login")
            .set_json(json!({ "username": "admin", "password": "secret" }))
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        session_cookie(&resp).expect("login sets the session cookie")
    }};
}

macro_rules! check_auth {
    ($app:expr, $cookie:expr) => {{
        let mut req = test::TestRequest::get().uri("/api/check-auth");
        if let Some(cookie) = $cookie {
            req = req.cookie(cookie);
        }
        let body: Value = test::call_and_read_body_json($app, req.to_request()).await;
        body["authenticated"].as_bool().unwrap()
    }};
}

macro_rules! list {
    ($app:expr) => {{
        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let body: Value = test::call_and_read_body_json($app, req).await;
        body.as_array().unwrap().clone()
    }};
}

macro_rules! create {
    ($app:expr, $cookie:expr, $body:expr) => {{
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .cookie($cookie.clone())
            .set_json($body)
            .to_request();
        let resp = test::call_service($app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let post: Value = test::read_body_json(resp).await;
        post
    }};
}

fn multipart(parts: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, content_type, bytes) in parts {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"file\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(cookie: Option<&Cookie<'static>>, body: Vec<u8>) -> test::TestRequest {
    let req = test::TestRequest::post()
        .uri("/api/upload")
        .insert_header((
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body);
    match cookie {
        Some(cookie) => req.cookie(cookie.clone()),
        None => req,
    }
}

/// A session store whose backend is unreachable.
struct DownStore;

#[async_trait]
impl SessionStore for DownStore {
    async fn get(&self, _: &SessionToken) -> Result<Option<Session>, SessionStoreError> {
        Err(SessionStoreError::Connection("refused".to_string()))
    }

    async fn set(&self, _: &Session) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Connection("refused".to_string()))
    }

    async fn destroy(&self, _: &SessionToken) -> Result<(), SessionStoreError> {
        Err(SessionStoreError::Connection("refused".to_string()))
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        Err(SessionStoreError::Connection("refused".to_string()))
    }
}

/// A working session store that suspends once before every answer, like a networked backend.
#[derive(Default)]
struct YieldingStore(InMemorySessionStore);

#[async_trait]
impl SessionStore for YieldingStore {
    async fn get(&self, token: &SessionToken) -> Result<Option<Session>, SessionStoreError> {
        tokio::task::yield_now().await;
        self.0.get(token).await
    }

    async fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        tokio::task::yield_now().await;
        self.0.set(session).await
    }

    async fn destroy(&self, token: &SessionToken) -> Result<(), SessionStoreError> {
        tokio::task::yield_now().await;
        self.0.destroy(token).await
    }

    async fn purge_expired(&self) -> Result<u64, SessionStoreError> {
        tokio::task::yield_now().await;
        self.0.purge_expired().await
    }
}

#[actix_rt::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}

#[actix_rt::test]
async fn test_login_check_logout_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));

    assert!(!check_auth!(&app, None::<Cookie<'static>>));

    let cookie = login!(&app);
    assert_eq!(cookie.http_only(), Some(true));
    assert_eq!(cookie.path(), Some("/"));
    assert!(check_auth!(&app, Some(cookie.clone())));

    let req = test::TestRequest::post()
        .uri("/api/logout")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let removal = session_cookie(&resp).unwrap();
    assert_eq!(removal.value(), "");
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "success": true, "message": "Logout successful" }));

    assert!(!check_auth!(&app, Some(cookie.clone())));

    // Logging out twice is fine.
    let req = test::TestRequest::post()
        .uri("/api/logout")
        .cookie(cookie)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_wrong_password_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));

    let req = test::TestRequest::post()
        .uri("/api/login")
        .set_json(json!({ "username": "admin", "password": "guess" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&resp).is_none());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid credentials" }));
    assert!(!check_auth!(&app, None::<Cookie<'static>>));
}

#[actix_rt::test]
async fn test_login_rotates_the_session_token() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));

    let first = login!(&app);
    let req = test::TestRequest::post()
        .uri("/api/login")
        .cookie(first.clone())
        .set_json(json!({ "username": "admin", "password": "secret" }))
        .to_request();
    let second = session_cookie(&test::call_service(&app, req).await).unwrap();

    assert_ne!(first.value(), second.value());
    assert!(!check_auth!(&app, Some(first)));
    assert!(check_auth!(&app, Some(second)));
}

#[actix_rt::test]
async fn test_forged_cookie_is_not_authenticated() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));

    let forged = Cookie::new(COOKIE, SessionToken::generate().as_str().to_string());
    assert!(!check_auth!(&app, Some(forged.clone())));

    let req = test::TestRequest::delete()
        .uri("/api/posts/1")
        .cookie(forged)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_rt::test]
async fn test_session_store_outage_is_a_server_error() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(DownStore), dir.path()));

    let req = test::TestRequest::get()
        .uri("/api/check-auth")
        .cookie(Cookie::new(COOKIE, SessionToken::generate().as_str().to_string()))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Internal server error" }));
}

#[actix_rt::test]
async fn test_notice_scenario_requires_a_session() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let notice = json!({ "title": "공지", "date": "2024-01-10" });

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(&notice)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Unauthorized" }));
    assert!(list!(&app).is_empty());

    let cookie = login!(&app);
    let post = create!(&app, cookie, &notice);

    assert_eq!(post["title"], "공지");
    assert_eq!(post["date"], "2024-01-10");
    assert_eq!(post["content"], Value::Null);
    assert_eq!(post["image_url"], Value::Null);
    assert!(post["id"].as_i64().is_some());
    assert!(post["created_at"].is_string());

    let listed = list!(&app);
    assert_eq!(listed, vec![json!({ "id": post["id"].clone(), "title": "공지", "date": "2024-01-10" })]);
}

#[actix_rt::test]
async fn test_unauthenticated_writes_leave_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let cookie = login!(&app);
    let post = create!(&app, cookie, json!({ "title": "주보", "date": "2024-02-01" }));
    let id = post["id"].as_i64().unwrap();

    let update = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}"))
        .set_json(json!({ "title": "변경", "date": "2024-02-02" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, update).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let delete = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    assert_eq!(
        test::call_service(&app, delete).await.status(),
        StatusCode::UNAUTHORIZED
    );

    // The admin gate runs before validation.
    let invalid = test::TestRequest::post()
        .uri("/api/posts")
        .set_json(json!({ "title": "" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, invalid).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let unchanged: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(unchanged, post);
}

#[actix_rt::test]
async fn test_gate_wins_over_bad_input_with_a_slow_store() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(YieldingStore::default()), dir.path()));
    let stranger = Cookie::new(COOKIE, "0".repeat(32));

    let malformed = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(stranger.clone())
        .insert_header(ContentType::json())
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, malformed).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Unauthorized" }));

    for req in [
        test::TestRequest::put()
            .uri("/api/posts/abc")
            .cookie(stranger.clone())
            .set_json(json!({ "title": "x", "date": "2024-01-01" })),
        test::TestRequest::put()
            .uri("/api/posts/1")
            .cookie(stranger.clone())
            .insert_header(ContentType::plaintext())
            .set_payload("{not json"),
        test::TestRequest::delete().uri("/api/posts/abc"),
    ] {
        assert_eq!(
            test::call_service(&app, req.to_request()).await.status(),
            StatusCode::UNAUTHORIZED
        );
    }

    // Past the gate the same inputs get their usual answers.
    let cookie = login!(&app);
    let malformed = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(cookie.clone())
        .insert_header(ContentType::json())
        .set_payload("{not json")
        .to_request();
    assert_eq!(
        test::call_service(&app, malformed).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::delete()
        .uri("/api/posts/abc")
        .cookie(cookie.clone())
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );

    let post = create!(&app, cookie, json!({ "title": "느린 저장소", "date": "2024-05-01" }));
    assert_eq!(post["title"], "느린 저장소");
    assert_eq!(list!(&app).len(), 1);
}

#[actix_rt::test]
async fn test_validation_errors() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let cookie = login!(&app);

    let cases = [
        (json!({ "content": "본문" }), "Title is required"),
        (json!({ "title": "   " }), "Title is required"),
        (json!({ "title": "x", "date": "10/01/2024" }), "Date must be formatted as YYYY-MM-DD"),
    ];
    for (body, message) in cases {
        let req = test::TestRequest::post()
            .uri("/api/posts")
            .cookie(cookie.clone())
            .set_json(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], message);
    }

    let malformed = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(cookie.clone())
        .insert_header(ContentType::json())
        .set_payload("{\"title\":")
        .to_request();
    let resp = test::call_service(&app, malformed).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());

    assert!(list!(&app).is_empty());
}

#[actix_rt::test]
async fn test_list_orders_by_date_then_id_descending() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let cookie = login!(&app);

    let a = create!(&app, cookie, json!({ "title": "a", "date": "2024-01-01" }));
    create!(&app, cookie, json!({ "title": "b", "date": "2024-03-01" }));
    let c = create!(&app, cookie, json!({ "title": "c", "date": "2024-01-01" }));
    assert_ne!(a["id"], c["id"]);

    let titles: Vec<Value> = list!(&app).iter().map(|p| p["title"].clone()).collect();
    assert_eq!(titles, vec![json!("b"), json!("c"), json!("a")]);
    assert!(list!(&app).iter().all(|p| p.get("content").is_none()));
}

#[actix_rt::test]
async fn test_update_replaces_the_whole_post() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let cookie = login!(&app);

    let post = create!(
        &app,
        cookie,
        json!({
            "title": "원본",
            "content": "본문",
            "image_url": "/uploads/a.png",
            "date": "2024-01-10"
        })
    );
    let id = post["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}"))
        .cookie(cookie.clone())
        .set_json(json!({ "title": "수정됨", "date": "2024-01-11" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;

    assert_eq!(updated["id"], post["id"]);
    assert_eq!(updated["title"], "수정됨");
    assert_eq!(updated["date"], "2024-01-11");
    assert_eq!(updated["content"], Value::Null);
    assert_eq!(updated["image_url"], Value::Null);
    assert_eq!(updated["created_at"], post["created_at"]);

    // Update requires an explicit date.
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}"))
        .cookie(cookie)
        .set_json(json!({ "title": "날짜 없음" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}

#[actix_rt::test]
async fn test_missing_posts_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let cookie = login!(&app);
    let post = create!(&app, cookie, json!({ "title": "삭제할 글" }));
    let id = post["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri("/api/posts/999")
        .cookie(cookie.clone())
        .set_json(json!({ "title": "x", "date": "2024-01-01" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(list!(&app).len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "success": true, "message": "Post deleted" }));

    for uri in [format!("/api/posts/{id}"), "/api/posts/abc".to_string()] {
        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "error": "Post not found" }));
    }

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .cookie(cookie)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_rt::test]
async fn test_upload_stores_image_and_returns_url() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let cookie = login!(&app);

    let body = multipart(&[
        ("caption", "text/plain", &b"hello"[..]),
        ("image", "image/png", &b"\x89PNG\r\n\x1a\n"[..]),
    ]);
    let resp = test::call_service(&app, upload_request(Some(&cookie), body).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;

    let url = body["url"].as_str().unwrap();
    let name = url.strip_prefix("/uploads/").unwrap();
    assert!(name.ends_with(".png"));
    let stored = std::fs::read(dir.path().join(name)).unwrap();
    assert_eq!(stored, b"\x89PNG\r\n\x1a\n");
}

#[actix_rt::test]
async fn test_upload_rejections() {
    let dir = tempfile::tempdir().unwrap();
    let app = app!(state_with(Arc::new(InMemorySessionStore::new()), dir.path()));
    let cookie = login!(&app);
    let png: &[u8] = b"\x89PNG";

    let req = upload_request(None, multipart(&[("image", "image/png", png)])).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let rejected = [
        multipart(&[("image", "text/plain", &b"not an image"[..])]),
        multipart(&[("image", "image/svg+xml", &b"<svg/>"[..])]),
        multipart(&[("image", "image/png", &[0u8; 65][..])]),
        multipart(&[("image", "image/png", &b""[..])]),
        multipart(&[("notes", "text/plain", &b"no image here"[..])]),
    ];
    for body in rejected {
        let resp = test::call_service(&app, upload_request(Some(&cookie), body).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}
