use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use codealong::http::{AppState, router};
use codealong::model::{
    Author, AuthorId, AuthorName, Book, BookTitle, CreateAuthorError, CreateAuthorRequest,
    CreateBookError, CreateBookRequest, FindAllAuthorsError, FindAuthorError, FindAuthorRequest,
    FindBooksByAuthorRequest, FindBooksError, PopulatedBook, ResetError, ResetRequest,
};
use codealong::seed::{ROWLING, ROWLING_TITLES, TOLKIEN, TOLKIEN_TITLES, seed_database};
use codealong::sqlite::Sqlite;
use codealong::store::Repository;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn send(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, bytes.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let (status, body) = send(app, uri).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn seeded() -> Router {
    let store = Sqlite::in_memory().await.unwrap();
    seed_database(&store).await.unwrap();
    router(AppState::new(store))
}

async fn author_id(app: &Router, name: &str) -> i64 {
    let (_, authors) = get_json(app, "/authors").await;
    authors
        .as_array()
        .unwrap()
        .iter()
        .find(|author| author["name"] == name)
        .and_then(|author| author["_id"].as_i64())
        .unwrap()
}

fn titles(books: &Value) -> Vec<&str> {
    books
        .as_array()
        .unwrap()
        .iter()
        .map(|book| book["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn root_returns_greeting() {
    let app = seeded().await;
    let req = Request::builder().uri("/").body(Body::empty()).unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let content_type = res.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/plain"));
    let body = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"Hello, codealong material here!");
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let app = router(AppState::new(Sqlite::in_memory().await.unwrap()));

    assert_eq!(get_json(&app, "/authors").await, (StatusCode::OK, json!([])));
    assert_eq!(get_json(&app, "/books").await, (StatusCode::OK, json!([])));
}

#[tokio::test]
async fn seed_loads_two_authors_and_nine_books() {
    let app = seeded().await;

    let (status, authors) = get_json(&app, "/authors").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = authors
        .as_array()
        .unwrap()
        .iter()
        .map(|author| author["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, [TOLKIEN, ROWLING]);

    let (status, books) = get_json(&app, "/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(books.as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn author_is_returned_by_id() {
    let app = seeded().await;
    let id = author_id(&app, TOLKIEN).await;

    let (status, author) = get_json(&app, &format!("/authors/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(author, json!({ "_id": id, "name": TOLKIEN }));
}

#[tokio::test]
async fn unknown_or_malformed_author_is_not_found() {
    let app = seeded().await;
    let expected = json!({ "error": "Author not found!" });

    for uri in [
        "/authors/424242",
        "/authors/0",
        "/authors/01",
        "/authors/-1",
        "/authors/%FF",
        "/authors/%FF/books",
        "/authors/not-an-id",
        "/authors/5f3a1c2b9d8e7f6a5b4c3d2e",
        "/authors/424242/books",
        "/authors/not-an-id/books",
    ] {
        assert_eq!(
            get_json(&app, uri).await,
            (StatusCode::NOT_FOUND, expected.clone()),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn books_by_author_return_raw_references() {
    let app = seeded().await;
    let rowling = author_id(&app, ROWLING).await;
    let tolkien = author_id(&app, TOLKIEN).await;

    let (status, books) = get_json(&app, &format!("/authors/{rowling}/books")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&books), ROWLING_TITLES);
    for book in books.as_array().unwrap() {
        assert_eq!(book["author"], json!(rowling));
        assert!(book["_id"].is_i64());
    }

    let (status, books) = get_json(&app, &format!("/authors/{tolkien}/books")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&books), TOLKIEN_TITLES);
}

#[tokio::test]
async fn author_without_books_yields_empty_list() {
    let store = Sqlite::in_memory().await.unwrap();
    let name = AuthorName::new("Ted Chiang").unwrap();
    let author = store
        .create_author(&CreateAuthorRequest::new(name))
        .await
        .unwrap();
    let app = router(AppState::new(store));

    let uri = format!("/authors/{}/books", author.id());
    assert_eq!(get_json(&app, &uri).await, (StatusCode::OK, json!([])));
}

#[tokio::test]
async fn populated_books_resolve_to_retrievable_authors() {
    let app = seeded().await;

    let (_, books) = get_json(&app, "/books").await;
    for book in books.as_array().unwrap() {
        let author = &book["author"];
        assert!(author.is_object(), "{book}");
        let id = author["_id"].as_i64().unwrap();
        let (status, fetched) = get_json(&app, &format!("/authors/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(&fetched, author);
    }
}

#[tokio::test]
async fn dangling_reference_populates_as_null() {
    let store = Sqlite::in_memory().await.unwrap();
    let title = BookTitle::new("The Silmarillion").unwrap();
    let book = store
        .create_book(&CreateBookRequest::new(title, Some(AuthorId::new(77))))
        .await
        .unwrap();
    let app = router(AppState::new(store));

    let (status, books) = get_json(&app, "/books").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        books,
        json!([{ "_id": book.id().get(), "title": "The Silmarillion", "author": null }])
    );
}

#[tokio::test]
async fn repeated_reads_are_identical() {
    let app = seeded().await;

    assert_eq!(get_json(&app, "/books").await, get_json(&app, "/books").await);
    assert_eq!(
        get_json(&app, "/authors").await,
        get_json(&app, "/authors").await
    );
}

#[tokio::test]
async fn reseeding_replaces_books_instead_of_accumulating() {
    let store = Sqlite::in_memory().await.unwrap();
    seed_database(&store).await.unwrap();
    let first = store.find_all_authors().await.unwrap();
    seed_database(&store).await.unwrap();
    let app = router(AppState::new(store));

    let (_, authors) = get_json(&app, "/authors").await;
    assert_eq!(authors.as_array().unwrap().len(), 2);
    let (_, books) = get_json(&app, "/books").await;
    assert_eq!(books.as_array().unwrap().len(), 9);
    assert!(books.as_array().unwrap().iter().all(|b| b["author"].is_object()));

    for old in first {
        let (status, _) = send(&app, &format!("/authors/{}", old.id())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}

struct UnreachableStore;

fn unreachable() -> anyhow::Error {
    anyhow::anyhow!("connection refused")
}

#[async_trait]
impl Repository for UnreachableStore {
    async fn create_author(&self, _: &CreateAuthorRequest) -> Result<Author, CreateAuthorError> {
        Err(CreateAuthorError(unreachable()))
    }

    async fn create_book(&self, _: &CreateBookRequest) -> Result<Book, CreateBookError> {
        Err(CreateBookError(unreachable()))
    }

    async fn find_author(&self, _: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        Err(FindAuthorError::Other(unreachable()))
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        Err(FindAllAuthorsError(unreachable()))
    }

    async fn find_books_by_author(
        &self,
        _: &FindBooksByAuthorRequest,
    ) -> Result<Vec<Book>, FindBooksError> {
        Err(FindBooksError(unreachable()))
    }

    async fn find_all_books_populated(&self) -> Result<Vec<PopulatedBook>, FindBooksError> {
        Err(FindBooksError(unreachable()))
    }

    async fn reset(&self, _: &ResetRequest) -> Result<(), ResetError> {
        Err(ResetError(unreachable()))
    }
}

#[tokio::test]
async fn store_failures_are_server_errors_not_misses() {
    let app = router(AppState::new(UnreachableStore));
    let expected = json!({ "error": "Internal server error" });

    for uri in ["/authors", "/authors/1", "/authors/1/books", "/books"] {
        assert_eq!(
            get_json(&app, uri).await,
            (StatusCode::INTERNAL_SERVER_ERROR, expected.clone()),
            "{uri}"
        );
    }

    // A failed request does not take the router down.
    let (status, _) = send(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn seeding_an_unreachable_store_reports_failure() {
    assert!(seed_database(&UnreachableStore).await.is_err());
}
