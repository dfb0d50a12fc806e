use anyhow::{Context, Result};
use std::time::Duration;

use tracing::info;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;

use super::responses::json_response;
use super::{log_requests, state::*, ApiError, ServerConfig};
use crate::book::BookDraft;
use crate::book_store::{BookStore, BookStoreError, BookStoreResult};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub backend: &'static str,
    pub books_count: Option<usize>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

/// Runs a store operation off the async runtime, the backends do blocking
/// file and database I/O while holding the store lock.
async fn with_store<T, F>(store: GuardedStore, op: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&dyn BookStore) -> BookStoreResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&*store))
        .await
        .map_err(|err| BookStoreError::storage("store task failed", err))?
        .map_err(ApiError::from)
}

async fn home(State(state): State<ServerState>) -> Response {
    let books_count = with_store(state.book_store.clone(), |store| store.list())
        .await
        .map(|books| books.len())
        .ok();
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        backend: state.backend_name,
        books_count,
    };
    json_response(StatusCode::OK, &stats)
}

async fn list_books(State(store): State<GuardedStore>) -> Result<Response, ApiError> {
    let books = with_store(store, |store| store.list()).await?;
    Ok(json_response(StatusCode::OK, &books))
}

async fn get_book(
    State(store): State<GuardedStore>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let book = with_store(store, move |store| store.get(&id)).await?;
    Ok(json_response(StatusCode::OK, &book))
}

async fn add_book(
    State(store): State<GuardedStore>,
    body: Result<Json<BookDraft>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(draft) = body?;
    let book = with_store(store, move |store| store.add(draft)).await?;
    info!("Added book {} ({:?})", book.id, book.title);
    Ok(json_response(StatusCode::CREATED, &book))
}

async fn edit_book(
    State(store): State<GuardedStore>,
    Path(id): Path<String>,
    body: Result<Json<BookDraft>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(draft) = body?;
    let book = with_store(store, move |store| store.edit(&id, draft)).await?;
    info!("Edited book {}", book.id);
    Ok(json_response(StatusCode::OK, &book))
}

async fn delete_book(
    State(store): State<GuardedStore>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let deleted_id = id.clone();
    with_store(store, move |store| store.delete(&id)).await?;
    info!("Deleted book {}", deleted_id);
    Ok(StatusCode::NO_CONTENT.into_response())
}

pub fn make_app(config: ServerConfig, book_store: GuardedStore) -> Router {
    let state = ServerState::new(config, book_store);

    Router::new()
        .route("/", get(home))
        .route("/books", get(list_books).post(add_book))
        .route(
            "/books/{id}",
            get(get_book).put(edit_book).delete(delete_book),
        )
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .with_state(state)
}

/// Serves the book API until the process receives ctrl-c.
pub async fn run_server(config: ServerConfig, book_store: GuardedStore) -> Result<()> {
    let address = format!("{}:{}", config.bind_address, config.port);
    let app = make_app(config, book_store);

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutting down");
            }
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::Book;
    use crate::book_store::StorageBackend;
    use crate::server::responses::JSON_CONTENT_TYPE;
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt; // for `oneshot`

    fn make_test_app(backend: StorageBackend) -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = backend
            .open(&temp_dir.path().join(backend.default_db_path()))
            .unwrap();
        let config = ServerConfig {
            requests_logging_level: crate::server::RequestsLoggingLevel::Body,
            ..ServerConfig::default()
        };
        (make_app(config, Arc::new(store)), temp_dir)
    }

    fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_owned()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn formats_uptime() {
        assert_eq!(format_uptime(Duration::from_secs(0)), "0d 00:00:00");
        assert_eq!(
            format_uptime(Duration::from_secs(2 * 86_400 + 3 * 3600 + 4 * 60 + 5)),
            "2d 03:04:05"
        );
    }

    #[tokio::test]
    async fn home_reports_backend_and_count() {
        for backend in [StorageBackend::Json, StorageBackend::Sqlite] {
            let (app, _temp_dir) = make_test_app(backend);

            let response = app
                .clone()
                .oneshot(json_request("POST", "/books", r#"{"title":"Dune"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);

            let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let stats: serde_json::Value = read_json(response).await;
            assert_eq!(stats["backend"], backend.to_string());
            assert_eq!(stats["books_count"], 1);
            assert!(stats["uptime"].as_str().unwrap().starts_with("0d "));
        }
    }

    #[tokio::test]
    async fn crud_statuses_and_content_type() {
        let (app, _temp_dir) = make_test_app(StorageBackend::Json);

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/books",
                r#"{"title":"Dune","pages":412,"price":9.99}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
        let created: Book = read_json(response).await;
        assert!(!created.id.is_empty());

        let uri = format!("/books/{}", created.id);
        let response = app
            .clone()
            .oneshot(empty_request("GET", &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json::<Book>(response).await, created);

        let response = app
            .clone()
            .oneshot(json_request("PUT", &uri, r#"{"title":"Dune Messiah"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let edited: Book = read_json(response).await;
        assert_eq!(edited.id, created.id);
        assert_eq!(edited.pages, 0);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        for method in ["GET", "DELETE"] {
            let response = app
                .clone()
                .oneshot(empty_request(method, &uri))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
            assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
        }

        let response = app
            .oneshot(json_request("PUT", &uri, r#"{"title":"Gone"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn rejects_unparseable_bodies_with_400() {
        let (app, _temp_dir) = make_test_app(StorageBackend::Sqlite);

        let bad_bodies = [
            "{not json",
            r#"{"title": 5}"#,
            r#"{"pages": -3}"#,
            r#"{"price": -1.5}"#,
            r#""just a string""#,
        ];
        for body in bad_bodies {
            let response = app
                .clone()
                .oneshot(json_request("POST", "/books", body))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
            let error: serde_json::Value = read_json(response).await;
            assert!(error["error"].is_string());
        }

        let missing_content_type = Request::builder()
            .method("POST")
            .uri("/books")
            .body(Body::from(r#"{"title":"Dune"}"#))
            .unwrap();
        let response = app.clone().oneshot(missing_content_type).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(empty_request("GET", "/books"))
            .await
            .unwrap();
        assert!(read_json::<Vec<Book>>(response).await.is_empty());
    }

    #[tokio::test]
    async fn storage_failure_is_500() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("library.json");
        let store = StorageBackend::Json.open(&db_path).unwrap();
        let app = make_app(ServerConfig::default(), Arc::new(store));

        std::fs::write(&db_path, "{ broken").unwrap();

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/books"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = app.oneshot(empty_request("GET", "/")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let stats: serde_json::Value = read_json(response).await;
        assert!(stats["books_count"].is_null());
    }
}
