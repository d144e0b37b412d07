use crate::http::AppState;
use crate::model::{
    Author, AuthorId, Book, FindAllAuthorsError, FindAuthorError, FindAuthorRequest,
    FindBooksByAuthorRequest, FindBooksError, PopulatedBook,
};
use crate::store::Repository;
use axum::extract::rejection::PathRejection;
use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

pub const GREETING: &str = "Hello, codealong material here!";
pub const AUTHOR_NOT_FOUND: &str = "Author not found!";

#[derive(Debug)]
pub struct ApiSuccess<T: Serialize>(StatusCode, Json<T>);

impl<T: Serialize> ApiSuccess<T> {
    pub const fn new(status: StatusCode, data: T) -> Self {
        Self(status, Json(data))
    }

    pub const fn ok(data: T) -> Self {
        Self::new(StatusCode::OK, data)
    }
}

impl<T: Serialize> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> axum::response::Response {
        (self.0, self.1).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
pub enum ApiError {
    InternalServerError(String),
    NotFound(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            Self::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

fn internal_error(cause: &anyhow::Error) -> ApiError {
    tracing::error!(error = ?cause, "Request failed");
    ApiError::InternalServerError("Internal server error".to_string())
}

impl From<FindAuthorError> for ApiError {
    fn from(err: FindAuthorError) -> Self {
        match err {
            FindAuthorError::NotFound { id } => {
                tracing::debug!(%id, "Author lookup missed");
                Self::NotFound(AUTHOR_NOT_FOUND.to_string())
            }
            FindAuthorError::Other(cause) => internal_error(&cause),
        }
    }
}

impl From<FindAllAuthorsError> for ApiError {
    fn from(err: FindAllAuthorsError) -> Self {
        internal_error(&err.0)
    }
}

impl From<FindBooksError> for ApiError {
    fn from(err: FindBooksError) -> Self {
        internal_error(&err.0)
    }
}

#[derive(Debug, Serialize)]
pub struct AuthorHttpResponse {
    #[serde(rename = "_id")]
    id: i64,
    name: String,
}

impl From<Author> for AuthorHttpResponse {
    fn from(value: Author) -> Self {
        Self {
            id: value.id().get(),
            name: value.name().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookHttpResponse {
    #[serde(rename = "_id")]
    id: i64,
    title: String,
    author: Option<i64>,
}

impl From<Book> for BookHttpResponse {
    fn from(value: Book) -> Self {
        Self {
            id: value.id().get(),
            title: value.title().to_string(),
            author: value.author().map(AuthorId::get),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PopulatedBookHttpResponse {
    #[serde(rename = "_id")]
    id: i64,
    title: String,
    author: Option<AuthorHttpResponse>,
}

impl From<PopulatedBook> for PopulatedBookHttpResponse {
    fn from(value: PopulatedBook) -> Self {
        Self {
            id: value.id().get(),
            title: value.title().to_string(),
            author: value.author().cloned().map(AuthorHttpResponse::from),
        }
    }
}

/// Client ids that cannot name a stored author, including segments that are
/// not even valid UTF-8, are reported the same way as ids that name nothing.
fn parse_author_id(path: Result<Path<String>, PathRejection>) -> Result<AuthorId, ApiError> {
    let raw = match path {
        Ok(Path(raw)) => raw,
        Err(rejection) => {
            tracing::debug!(%rejection, "Unreadable author id");
            return Err(ApiError::NotFound(AUTHOR_NOT_FOUND.to_string()));
        }
    };
    AuthorId::parse(&raw).ok_or_else(|| {
        tracing::debug!(id = %raw, "Malformed author id");
        ApiError::NotFound(AUTHOR_NOT_FOUND.to_string())
    })
}

pub async fn root() -> &'static str {
    GREETING
}

pub async fn find_all_authors<R: Repository>(
    State(state): State<AppState<R>>,
) -> Result<ApiSuccess<Vec<AuthorHttpResponse>>, ApiError> {
    state
        .repo
        .find_all_authors()
        .await
        .map_err(ApiError::from)
        .map(|authors| ApiSuccess::ok(authors.into_iter().map(Into::into).collect()))
}

pub async fn find_author<R: Repository>(
    State(state): State<AppState<R>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<ApiSuccess<AuthorHttpResponse>, ApiError> {
    let req = FindAuthorRequest::new(parse_author_id(id)?);
    state
        .repo
        .find_author(&req)
        .await
        .map_err(ApiError::from)
        .map(|author| ApiSuccess::ok(author.into()))
}

/// Resolves the author first so a missing author (404) is distinguishable
/// from an author without books (empty list).
pub async fn find_books_by_author<R: Repository>(
    State(state): State<AppState<R>>,
    id: Result<Path<String>, PathRejection>,
) -> Result<ApiSuccess<Vec<BookHttpResponse>>, ApiError> {
    let req = FindAuthorRequest::new(parse_author_id(id)?);
    let author = state.repo.find_author(&req).await?;
    tracing::debug!(id = %author.id(), name = %author.name(), "Listing books of author");

    let req = FindBooksByAuthorRequest::new(author.id());
    state
        .repo
        .find_books_by_author(&req)
        .await
        .map_err(ApiError::from)
        .map(|books| ApiSuccess::ok(books.into_iter().map(Into::into).collect()))
}

pub async fn find_all_books<R: Repository>(
    State(state): State<AppState<R>>,
) -> Result<ApiSuccess<Vec<PopulatedBookHttpResponse>>, ApiError> {
    state
        .repo
        .find_all_books_populated()
        .await
        .map_err(ApiError::from)
        .map(|books| ApiSuccess::ok(books.into_iter().map(Into::into).collect()))
}
