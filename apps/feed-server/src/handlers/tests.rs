use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use feed_core::domain::{LinkBuilder, UserId};
use feed_infra::InMemoryStore;

use super::configure_routes;
use crate::config::{AppConfig, DEFAULT_IDENTITY_HEADER};
use crate::middleware::cors::cors;
use crate::state::AppState;

fn seeded_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::with_interests([
        (1, "Music"),
        (2, "Sports"),
        (3, "Art"),
    ]))
}

fn state(store: Arc<InMemoryStore>) -> AppState {
    let config = AppConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database: None,
        run_migrations: false,
        identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
        public_base_url: String::new(),
        cors_allowed_origins: vec!["*".to_string()],
    };
    AppState::from_ports(
        store.clone(),
        store.clone(),
        store,
        LinkBuilder::default(),
        &config,
        "feed-test",
    )
}

macro_rules! app {
    ($store:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(state($store)))
                .configure(configure_routes),
        )
        .await
    };
}

fn as_user(req: test::TestRequest, user: &str) -> test::TestRequest {
    req.insert_header((DEFAULT_IDENTITY_HEADER, user))
}

fn etag_of(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::ETAG)
        .expect("ETag header")
        .to_str()
        .unwrap()
        .to_string()
}

macro_rules! create_post {
    ($app:expr, $user:expr, $body:expr) => {{
        let req = as_user(test::TestRequest::post().uri("/posts"), $user)
            .set_json($body)
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let etag = etag_of(&resp);
        let post: Value = test::read_body_json(resp).await;
        (post, etag)
    }};
}

#[actix_web::test]
async fn test_create_then_read_returns_stable_etag() {
    let app = app!(seeded_store());

    let req = as_user(test::TestRequest::post().uri("/posts"), "alice")
        .set_json(json!({"title": "Hello", "body": "World", "interest_ids": [1]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created_tag = etag_of(&resp);
    let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap().to_string();
    let post: Value = test::read_body_json(resp).await;

    assert_eq!(post["likes_count"], 0);
    assert_eq!(post["created_by"], "alice");
    assert_eq!(post["interests"][0]["interest_name"], "Music");
    assert_eq!(location, format!("/posts/{}", post["post_id"]));
    assert_eq!(post["links"]["self"]["href"], location);
    assert_eq!(post["links"]["collection"]["href"], "/posts");

    // Reads need no identity and report the same tag.
    let resp = test::call_service(&app, test::TestRequest::get().uri(&location).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(etag_of(&resp), created_tag);

    let req = test::TestRequest::get()
        .uri(&location)
        .insert_header((header::IF_NONE_MATCH, created_tag.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(etag_of(&resp), created_tag);
}

#[actix_web::test]
async fn test_identity_header_is_required() {
    let app = app!(seeded_store());

    let req = test::TestRequest::post()
        .uri("/posts")
        .set_json(json!({"title": "Hello", "body": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = as_user(test::TestRequest::get().uri("/posts"), "   ").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/posts/feed").to_request()).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["status"], 401);
}

#[actix_web::test]
async fn test_update_requires_current_etag() {
    let app = app!(seeded_store());
    let (post, etag) = create_post!(app, "alice", json!({"title": "Hello", "body": "World"}));
    let uri = format!("/posts/{}", post["post_id"]);
    let replacement = json!({"title": "Hello again", "body": "Edited", "interest_ids": [2]});

    let req = as_user(test::TestRequest::put().uri(&uri), "alice")
        .set_json(&replacement)
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::PRECONDITION_REQUIRED
    );

    let req = as_user(test::TestRequest::put().uri(&uri), "alice")
        .insert_header((header::IF_MATCH, etag.as_str()))
        .set_json(&replacement)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let new_etag = etag_of(&resp);
    assert_ne!(new_etag, etag);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["title"], "Hello again");
    assert_eq!(updated["interests"][0]["interest_id"], 2);

    // The old tag is now stale.
    let req = as_user(test::TestRequest::put().uri(&uri), "bob")
        .insert_header((header::IF_MATCH, etag.as_str()))
        .set_json(&replacement)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

    // A missing post is reported before the missing tag.
    let req = as_user(test::TestRequest::put().uri("/posts/999"), "alice")
        .set_json(&replacement)
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_wildcard_if_match_accepts_current_version() {
    let app = app!(seeded_store());
    let (post, _) = create_post!(app, "alice", json!({"title": "Hello", "body": "World"}));
    let uri = format!("/posts/{}", post["post_id"]);

    let req = as_user(test::TestRequest::patch().uri(&uri), "alice")
        .insert_header((header::IF_MATCH, "*"))
        .set_json(json!({"title": "Anything goes"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["title"], "Anything goes");

    let req = as_user(test::TestRequest::delete().uri("/posts/999"), "alice")
        .insert_header((header::IF_MATCH, "*"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_patch_touches_only_supplied_fields() {
    let app = app!(seeded_store());
    let (post, etag) = create_post!(
        app,
        "alice",
        json!({"title": "Hello", "body": "World", "image_url": "https://img/1.png", "interest_ids": [1, 3]})
    );
    let uri = format!("/posts/{}", post["post_id"]);

    let req = as_user(test::TestRequest::patch().uri(&uri), "alice")
        .insert_header((header::IF_MATCH, format!("W/{etag}")))
        .set_json(json!({"body": "Changed", "image_url": null}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let patched: Value = test::read_body_json(resp).await;

    assert_eq!(patched["title"], "Hello");
    assert_eq!(patched["body"], "Changed");
    assert!(patched["image_url"].is_null());
    assert_eq!(patched["interests"].as_array().unwrap().len(), 2);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let current = etag_of(&resp);
    let req = as_user(test::TestRequest::patch().uri(&uri), "alice")
        .insert_header((header::IF_MATCH, current.as_str()))
        .set_json(json!({}))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_like_unlike_round_trip() {
    let app = app!(seeded_store());
    let (post, _) = create_post!(app, "author", json!({"title": "Hello", "body": "World", "interest_ids": [1]}));
    let post_id = post["post_id"].as_i64().unwrap();
    let uri = format!("/posts/{post_id}/like");

    for _ in 0..2 {
        let req = as_user(test::TestRequest::post().uri(&uri), "userA").to_request();
        let status: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(status, json!({"post_id": post_id, "likes_count": 1, "liked": true}));
    }

    let req = as_user(test::TestRequest::delete().uri(&uri), "userA").to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status, json!({"post_id": post_id, "likes_count": 0, "liked": false}));

    let req = as_user(test::TestRequest::post().uri("/posts/4242/like"), "userA").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_delete_then_delete_again_is_not_found() {
    let app = app!(seeded_store());
    let (post, etag) = create_post!(app, "alice", json!({"title": "Doomed", "body": ""}));
    let post_id = post["post_id"].as_i64().unwrap();
    let uri = format!("/posts/{post_id}");

    let req = as_user(test::TestRequest::delete().uri(&uri), "alice")
        .insert_header((header::IF_MATCH, etag.as_str()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({"status": "deleted", "post_id": post_id}));

    let req = as_user(test::TestRequest::delete().uri(&uri), "alice")
        .insert_header((header::IF_MATCH, etag.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = as_user(test::TestRequest::get().uri("/posts"), "alice").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 0);
}

#[actix_web::test]
async fn test_list_posts_envelope_and_validation() {
    let app = app!(seeded_store());
    for title in ["one", "two", "three"] {
        create_post!(app, "alice", json!({"title": title, "body": "text", "interest_ids": [2]}));
    }

    let req = as_user(test::TestRequest::get().uri("/posts?limit=2"), "bob").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ETAG));
    let page: Value = test::read_body_json(resp).await;

    assert_eq!(page["total"], 3);
    assert_eq!(page["limit"], 2);
    assert_eq!(page["has_more"], true);
    assert_eq!(page["items"][0]["title"], "three");
    assert_eq!(page["links"]["next"]["href"], "/posts?skip=2&limit=2");
    assert!(page["links"].get("prev").is_none());

    let req = as_user(
        test::TestRequest::get().uri("/posts?created_by=alice&interest_id=2&search=TW"),
        "bob",
    )
    .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "two");

    // Navigation links stay within the filtered collection.
    let req = as_user(
        test::TestRequest::get().uri("/posts?limit=1&interest_id=2&search=t"),
        "bob",
    )
    .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 2);
    assert_eq!(
        page["links"]["next"]["href"],
        "/posts?skip=1&limit=1&interest_id=2&search=t"
    );
    assert_eq!(
        page["links"]["last"]["href"],
        "/posts?skip=1&limit=1&interest_id=2&search=t"
    );

    let req = as_user(test::TestRequest::get().uri("/posts?skip=-1"), "bob").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

    let req = as_user(test::TestRequest::get().uri("/posts?limit=abc"), "bob").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_personalized_feed_follows_authors() {
    let store = seeded_store();
    store
        .follow(&UserId::parse("viewer").unwrap(), &UserId::parse("alice").unwrap())
        .await;
    let app = app!(store);

    create_post!(app, "alice", json!({"title": "from alice", "body": ""}));
    create_post!(app, "carol", json!({"title": "from carol", "body": ""}));

    let req = as_user(test::TestRequest::get().uri("/posts/feed"), "viewer").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["items"][0]["title"], "from alice");

    let req = as_user(test::TestRequest::get().uri("/posts/feed"), "loner").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["total"], 0);
    assert_eq!(page["items"], json!([]));
}

#[actix_web::test]
async fn test_interest_sub_resource() {
    let app = app!(seeded_store());
    let (post, etag) = create_post!(app, "alice", json!({"title": "Tagged", "body": "", "interest_ids": [2]}));
    let uri = format!("/posts/{}/interests", post["post_id"]);

    let req = as_user(test::TestRequest::post().uri(&uri), "alice")
        .insert_header((header::IF_MATCH, etag.as_str()))
        .set_json(json!({"interest_ids": [1]}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let etag = etag_of(&resp);
    let body: Value = test::read_body_json(resp).await;
    let ids: Vec<i64> = body["interests"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["interest_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2]);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(etag_of(&resp), etag);

    let req = as_user(test::TestRequest::delete().uri(&format!("{uri}/3")), "alice")
        .insert_header((header::IF_MATCH, etag.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = as_user(test::TestRequest::delete().uri(&format!("{uri}/1")), "alice")
        .insert_header((header::IF_MATCH, etag.as_str()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["interests"].as_array().unwrap().len(), 1);

    let catalog: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/interests").to_request()).await;
    let names: Vec<&str> = catalog
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["interest_name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Art", "Music", "Sports"]);
}

#[actix_web::test]
async fn test_malformed_body_is_problem_json() {
    let app = app!(seeded_store());

    let req = as_user(test::TestRequest::post().uri("/posts"), "alice")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let problem: Value = test::read_body_json(resp).await;
    assert_eq!(problem["title"], "Bad Request");
}

#[actix_web::test]
async fn test_health_reports_memory_storage() {
    let app = app!(seeded_store());

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let health: Value = test::read_body_json(resp).await;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["storage"], "memory");
    assert_eq!(health["service"], "feed-test");
}

#[actix_web::test]
async fn test_cors_exposes_entity_tag_and_location() {
    let app = test::init_service(
        App::new()
            .wrap(cors(&["*".to_string()]))
            .app_data(web::Data::new(state(seeded_store())))
            .configure(configure_routes),
    )
    .await;

    let req = as_user(test::TestRequest::post().uri("/posts"), "alice")
        .insert_header((header::ORIGIN, "https://app.example"))
        .set_json(json!({"title": "Hello", "body": "World"}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://app.example"
    );
    let exposed = resp
        .headers()
        .get(header::ACCESS_CONTROL_EXPOSE_HEADERS)
        .unwrap()
        .to_str()
        .unwrap()
        .to_ascii_lowercase();
    assert!(exposed.contains("etag"));
    assert!(exposed.contains("location"));

    let preflight = test::TestRequest::default()
        .method(actix_web::http::Method::OPTIONS)
        .uri("/posts/1")
        .insert_header((header::ORIGIN, "https://app.example"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH"))
        .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "if-match"))
        .to_request();
    let resp = test::call_service(&app, preflight).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
}

#[actix_web::test]
async fn test_cors_rejects_unlisted_origin() {
    let app = test::init_service(
        App::new()
            .wrap(cors(&["https://app.example".to_string()]))
            .app_data(web::Data::new(state(seeded_store())))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/interests")
        .insert_header((header::ORIGIN, "https://other.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

    let req = test::TestRequest::get()
        .uri("/interests")
        .insert_header((header::ORIGIN, "https://app.example"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "https://app.example"
    );
}
