use crate::model::{
    Author, Book, CreateAuthorError, CreateAuthorRequest, CreateBookError, CreateBookRequest,
    FindAllAuthorsError, FindAuthorError, FindAuthorRequest, FindBooksByAuthorRequest,
    FindBooksError, PopulatedBook, ResetError, ResetRequest,
};
use async_trait::async_trait;

#[async_trait]
pub trait Repository: Send + Sync + 'static {
    async fn create_author(&self, req: &CreateAuthorRequest) -> Result<Author, CreateAuthorError>;

    async fn create_book(&self, req: &CreateBookRequest) -> Result<Book, CreateBookError>;

    async fn find_author(&self, req: &FindAuthorRequest) -> Result<Author, FindAuthorError>;

    async fn find_all_authors(&self) -> Result<Vec<Author>, FindAllAuthorsError>;

    /// Books whose author reference equals the requested id, in insertion order.
    async fn find_books_by_author(
        &self,
        req: &FindBooksByAuthorRequest,
    ) -> Result<Vec<Book>, FindBooksError>;

    /// Every book with its author resolved; dangling references resolve to `None`.
    async fn find_all_books_populated(&self) -> Result<Vec<PopulatedBook>, FindBooksError>;

    /// Removes every book and author, then loads `req`. Either all of it
    /// lands or the store is left untouched.
    async fn reset(&self, req: &ResetRequest) -> Result<(), ResetError>;
}
