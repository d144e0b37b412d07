use crate::model::{
    Author, AuthorId, AuthorName, Book, BookId, BookTitle, CreateAuthorError,
    CreateAuthorRequest, CreateBookError, CreateBookRequest, FindAllAuthorsError,
    FindAuthorError, FindAuthorRequest, FindBooksByAuthorRequest, FindBooksError, PopulatedBook,
    ResetError, ResetRequest,
};
use crate::store::Repository;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};
use std::str::FromStr;

static MIGRATOR: Migrator = sqlx::migrate!();

#[derive(Debug, Clone)]
pub struct Sqlite {
    pool: SqlitePool,
}

impl Sqlite {
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str(url)
            .with_context(|| format!("Invalid database url {url}"))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePool::connect_with(opts)
            .await
            .with_context(|| format!("Failed to open database at {url}"))?;

        Self::migrate(pool).await
    }

    /// A private database that lives as long as the returned handle. The pool
    /// is pinned to one connection, since each SQLite in-memory connection is
    /// its own database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")
            .context("Invalid in-memory database url")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await
            .context("Failed to open in-memory database")?;

        Self::migrate(pool).await
    }

    async fn migrate(pool: SqlitePool) -> anyhow::Result<Self> {
        MIGRATOR
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;

        Ok(Self { pool })
    }
}

impl<'r> FromRow<'r, SqliteRow> for Author {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let name = row.try_get("name")?;

        let name = AuthorName::new_unchecked(name);
        Ok(Self::new(AuthorId::new(id), name))
    }
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let title = row.try_get("title")?;
        let author: Option<i64> = row.try_get("author_id")?;

        let title = BookTitle::new_unchecked(title);
        Ok(Self::new(BookId::new(id), title, author.map(AuthorId::new)))
    }
}

impl<'r> FromRow<'r, SqliteRow> for PopulatedBook {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id = row.try_get("id")?;
        let title = row.try_get("title")?;
        let author_id: Option<i64> = row.try_get("author_id")?;
        let author_name: Option<&str> = row.try_get("author_name")?;

        let title = BookTitle::new_unchecked(title);
        let author = match (author_id, author_name) {
            (Some(id), Some(name)) => Some(Author::new(
                AuthorId::new(id),
                AuthorName::new_unchecked(name),
            )),
            _ => None,
        };
        Ok(Self::new(BookId::new(id), title, author))
    }
}

#[async_trait]
impl Repository for Sqlite {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError> {
        let author = sqlx::query_as("INSERT INTO authors (name) VALUES (?) RETURNING id, name")
            .bind(req.name().as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context(format!(
                    r#"Failed to create author with name "{}""#,
                    req.name()
                ));
                CreateAuthorError(err)
            })?;

        Ok(author)
    }

    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError> {
        let book = sqlx::query_as(
            "INSERT INTO books (title, author_id) VALUES (?, ?) RETURNING id, title, author_id",
        )
        .bind(req.title().as_str())
        .bind(req.author().map(AuthorId::get))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context(format!(
                r#"Failed to create book with title "{}""#,
                req.title()
            ));
            CreateBookError(err)
        })?;

        Ok(book)
    }

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError> {
        let author = sqlx::query_as("SELECT id, name FROM authors WHERE id = ?")
            .bind(req.id().get())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                if matches!(err, sqlx::Error::RowNotFound) {
                    FindAuthorError::NotFound { id: req.id() }
                } else {
                    let err = anyhow!(err).context(format!(
                        r#"Failed to retrieve author with id "{}""#,
                        req.id()
                    ));
                    FindAuthorError::Other(err)
                }
            })?;

        Ok(author)
    }

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError> {
        let authors = sqlx::query_as("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|err| {
                let err = anyhow!(err).context("Failed to retrieve all authors");
                FindAllAuthorsError(err)
            })?;

        Ok(authors)
    }

    async fn find_books_by_author(
        &self,
        req: &FindBooksByAuthorRequest,
    ) -> Result<Vec<Book>, FindBooksError> {
        let books =
            sqlx::query_as("SELECT id, title, author_id FROM books WHERE author_id = ? ORDER BY id")
                .bind(req.author().get())
                .fetch_all(&self.pool)
                .await
                .map_err(|err| {
                    let err = anyhow!(err).context(format!(
                        r#"Failed to retrieve books of author with id "{}""#,
                        req.author()
                    ));
                    FindBooksError(err)
                })?;

        Ok(books)
    }

    async fn find_all_books_populated(&self) -> Result<Vec<PopulatedBook>, FindBooksError> {
        let books = sqlx::query_as(
            "SELECT b.id, b.title, a.id AS author_id, a.name AS author_name \
             FROM books b LEFT JOIN authors a ON a.id = b.author_id \
             ORDER BY b.id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|err| {
            let err = anyhow!(err).context("Failed to retrieve all books");
            FindBooksError(err)
        })?;

        Ok(books)
    }

    async fn reset(&self, req: &ResetRequest) -> Result<(), ResetError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin reset transaction")?;

        sqlx::query("DELETE FROM books")
            .execute(&mut *tx)
            .await
            .context("Failed to delete all books")?;
        sqlx::query("DELETE FROM authors")
            .execute(&mut *tx)
            .await
            .context("Failed to delete all authors")?;

        for author in req.authors() {
            let id: i64 = sqlx::query_scalar("INSERT INTO authors (name) VALUES (?) RETURNING id")
                .bind(author.name().as_str())
                .fetch_one(&mut *tx)
                .await
                .with_context(|| {
                    format!(r#"Failed to create author with name "{}""#, author.name())
                })?;

            for title in author.titles() {
                sqlx::query("INSERT INTO books (title, author_id) VALUES (?, ?)")
                    .bind(title.as_str())
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .with_context(|| format!(r#"Failed to create book with title "{title}""#))?;
            }
        }

        tx.commit()
            .await
            .context("Failed to commit reset transaction")?;

        Ok(())
    }
}
