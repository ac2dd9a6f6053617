use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};

use marquee_api::{
    db::{InMemoryCollectionStore, InMemoryRequestCounter},
    routes::{create_router, AppState},
    services::{
        HttpTransport, ResilientFetcher, RetryPolicy, TransportError, TransportResponse,
        UpstreamRequest,
    },
};

/// Replays queued outcomes in order, then keeps answering 500
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<TransportResponse, TransportError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HttpTransport for ScriptedTransport {
    async fn get(&self, _request: &UpstreamRequest) -> Result<TransportResponse, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(TransportResponse::new(500, Vec::new())))
    }
}

fn create_test_server(
    script: Vec<Result<TransportResponse, TransportError>>,
) -> (TestServer, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(script));
    let policy = RetryPolicy {
        max_retries: 4,
        base_delay: Duration::ZERO,
        max_delay: Duration::ZERO,
    };

    let state = AppState {
        fetcher: Arc::new(ResilientFetcher::new(transport.clone(), policy)),
        movie_catalog: UpstreamRequest {
            url: "https://movies.local/api/movies/".to_string(),
            credentials: None,
            verify_tls: true,
        },
        store: Arc::new(InMemoryCollectionStore::new()),
        request_counter: Arc::new(InMemoryRequestCounter::new()),
        favourite_genre_count: 3,
    };

    let server = TestServer::new(create_router(Arc::new(state))).unwrap();
    (server, transport)
}

fn user_header() -> HeaderName {
    HeaderName::from_static("x-user-id")
}

fn user(name: &'static str) -> HeaderValue {
    HeaderValue::from_static(name)
}

async fn create_collection(server: &TestServer, owner: &'static str, body: Value) -> String {
    let response = server
        .post("/api/v1/collections")
        .add_header(user_header(), user(owner))
        .json(&body)
        .await;
    response.assert_status(StatusCode::CREATED);

    let created: Value = response.json();
    created["collection_uuid"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let (server, _) = create_test_server(Vec::new());
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "status": "healthy" }));
}

#[tokio::test]
async fn test_request_id_echoed() {
    let (server, _) = create_test_server(Vec::new());
    let request_id = "1f0e4a52-8c3c-4f52-9d4a-2b8d0c1d9a77";

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(request_id),
        )
        .await;

    assert_eq!(response.header("x-request-id"), request_id);
}

#[tokio::test]
async fn test_movies_passes_catalog_through() {
    let catalog = json!({
        "count": 1,
        "next": null,
        "previous": null,
        "results": [{
            "title": "Queerama",
            "description": "Archive footage",
            "genres": "Documentary",
            "uuid": "57baf4f4-c9ef-4197-9e4f-acf04eae5b4d"
        }]
    });
    let body = serde_json::to_vec(&catalog).unwrap();
    let (server, transport) = create_test_server(vec![
        Ok(TransportResponse::new(503, Vec::new())),
        Ok(TransportResponse::new(200, body)),
    ]);

    let response = server.get("/api/v1/movies").await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), catalog);
    assert_eq!(transport.calls(), 2);
}

#[tokio::test]
async fn test_movies_reports_failure_after_retries() {
    let script = (0..5)
        .map(|_| Ok(TransportResponse::new(503, Vec::new())))
        .collect();
    let (server, transport) = create_test_server(script);

    let response = server.get("/api/v1/movies").await;

    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "message": "Failed to load movies, please try again.",
            "status_code": 503
        })
    );
    assert_eq!(transport.calls(), 5);
}

#[tokio::test]
async fn test_movies_does_not_retry_client_errors() {
    let (server, transport) =
        create_test_server(vec![Ok(TransportResponse::new(401, "unauthorized"))]);

    let response = server.get("/api/v1/movies").await;

    assert_eq!(response.json::<Value>()["status_code"], 401);
    assert_eq!(transport.calls(), 1);
}

#[tokio::test]
async fn test_collections_require_user() {
    let (server, _) = create_test_server(Vec::new());
    let response = server.get("/api/v1/collections").await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_and_list_collections_with_favourite_genres() {
    let (server, _) = create_test_server(Vec::new());

    create_collection(
        &server,
        "alice",
        json!({
            "title": "Weekend",
            "description": "Saturday night",
            "movies": [
                {
                    "uuid": "0b4b7c7e-5d0e-4c53-9a0e-0f3c2f7e6a01",
                    "title": "Heat",
                    "description": "Crime epic",
                    "genres": "Crime,Thriller"
                },
                {
                    "uuid": "0b4b7c7e-5d0e-4c53-9a0e-0f3c2f7e6a02",
                    "title": "Airplane!",
                    "description": "Spoof",
                    "genres": "Comedy"
                }
            ]
        }),
    )
    .await;
    create_collection(
        &server,
        "alice",
        json!({
            "title": "Noir",
            "description": "",
            "movies": [{
                "uuid": "0b4b7c7e-5d0e-4c53-9a0e-0f3c2f7e6a03",
                "title": "Chinatown",
                "description": "",
                "genres": "Crime,Mystery,Drama"
            }]
        }),
    )
    .await;

    let response = server
        .get("/api/v1/collections")
        .add_header(user_header(), user("alice"))
        .await;
    response.assert_status_ok();

    let listing: Value = response.json();
    assert_eq!(listing["is_success"], true);
    assert_eq!(listing["data"]["collection"].as_array().unwrap().len(), 2);
    assert_eq!(listing["data"]["collection"][0]["title"], "Weekend");
    assert!(listing["data"]["collection"][0].get("movies").is_none());
    assert_eq!(
        listing["favourite_genres"],
        json!(["Crime", "Thriller", "Comedy"])
    );
}

#[tokio::test]
async fn test_collection_detail_update_and_delete() {
    let (server, _) = create_test_server(Vec::new());

    let id = create_collection(
        &server,
        "alice",
        json!({
            "title": "Horror",
            "description": "Spooky",
            "movies": [{
                "uuid": "7a6c1a7e-3f3b-4f7c-8a41-2d4f7b0d9c10",
                "title": "Alien",
                "description": "In space",
                "genres": "Horror"
            }]
        }),
    )
    .await;
    let path = format!("/api/v1/collections/{}", id);

    let response = server
        .get(&path)
        .add_header(user_header(), user("alice"))
        .await;
    response.assert_status_ok();
    let detail: Value = response.json();
    assert_eq!(detail["title"], "Horror");
    assert_eq!(detail["movies"][0]["title"], "Alien");

    let response = server
        .patch(&path)
        .add_header(user_header(), user("alice"))
        .json(&json!({
            "description": "Very spooky",
            "movies": [{
                "uuid": "7a6c1a7e-3f3b-4f7c-8a41-2d4f7b0d9c10",
                "genres": "Horror,Sci-Fi"
            }]
        }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "details": "updated" }));

    let detail: Value = server
        .get(&path)
        .add_header(user_header(), user("alice"))
        .await
        .json();
    assert_eq!(detail["title"], "Horror");
    assert_eq!(detail["description"], "Very spooky");
    assert_eq!(detail["movies"][0]["genres"], "Horror,Sci-Fi");

    server
        .delete(&path)
        .add_header(user_header(), user("alice"))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .get(&path)
        .add_header(user_header(), user("alice"))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_with_unknown_movie_is_not_found() {
    let (server, _) = create_test_server(Vec::new());
    let id = create_collection(&server, "alice", json!({ "title": "Empty" })).await;

    server
        .put(&format!("/api/v1/collections/{}", id))
        .add_header(user_header(), user("alice"))
        .json(&json!({
            "movies": [{ "uuid": "9d1c1a7e-3f3b-4f7c-8a41-2d4f7b0d9c99", "title": "Ghost" }]
        }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_collections_hidden_from_other_users() {
    let (server, _) = create_test_server(Vec::new());
    let id = create_collection(&server, "alice", json!({ "title": "Mine" })).await;

    server
        .get(&format!("/api/v1/collections/{}", id))
        .add_header(user_header(), user("bob"))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let listing: Value = server
        .get("/api/v1/collections")
        .add_header(user_header(), user("bob"))
        .await
        .json();
    assert!(listing["data"]["collection"].as_array().unwrap().is_empty());
    assert_eq!(listing["favourite_genres"], json!([]));
}

#[tokio::test]
async fn test_create_collection_rejects_blank_title() {
    let (server, _) = create_test_server(Vec::new());

    server
        .post("/api/v1/collections")
        .add_header(user_header(), user("alice"))
        .json(&json!({ "title": "" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_count_and_reset() {
    let (server, _) = create_test_server(Vec::new());

    server.get("/health").await;
    server.get("/health").await;

    let count: Value = server.get("/api/v1/request-count").await.json();
    assert_eq!(count, json!({ "requests": 3 }));

    let response = server.post("/api/v1/request-count/reset").await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({ "message": "request count reset successfully" })
    );

    let count: Value = server.get("/api/v1/request-count").await.json();
    assert_eq!(count, json!({ "requests": 1 }));
}
