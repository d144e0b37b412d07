use thiserror::Error;

/// Store-assigned identifier of an [`Author`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AuthorId(i64);

impl AuthorId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Parses client input into an id. Only the canonical decimal form of a
    /// positive integer is accepted, so `01` is not an alias of `1`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.starts_with('0') || raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        raw.parse::<i64>().ok().filter(|id| *id > 0).map(Self)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AuthorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BookId(i64);

impl BookId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorName(String);

impl AuthorName {
    pub fn new(raw: &str) -> Result<Self, AuthorNameEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(AuthorNameEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AuthorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
#[error("Author name cannot be empty")]
pub struct AuthorNameEmptyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(raw: &str) -> Result<Self, BookTitleEmptyError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Err(BookTitleEmptyError)
        } else {
            Ok(Self(trimmed.into()))
        }
    }

    pub fn new_unchecked(raw: &str) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Error, Debug)]
#[error("Book title cannot be empty")]
pub struct BookTitleEmptyError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    id: AuthorId,
    name: AuthorName,
}

impl Author {
    pub const fn new(id: AuthorId, name: AuthorName) -> Self {
        Self { id, name }
    }

    pub const fn id(&self) -> AuthorId {
        self.id
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

/// A book as stored: the author is a bare reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    title: BookTitle,
    author: Option<AuthorId>,
}

impl Book {
    pub const fn new(id: BookId, title: BookTitle, author: Option<AuthorId>) -> Self {
        Self { id, title, author }
    }

    pub const fn id(&self) -> BookId {
        self.id
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn author(&self) -> Option<AuthorId> {
        self.author
    }
}

/// A book with its author reference resolved. `author` is `None` when the
/// book has no reference or the referenced author no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulatedBook {
    id: BookId,
    title: BookTitle,
    author: Option<Author>,
}

impl PopulatedBook {
    pub const fn new(id: BookId, title: BookTitle, author: Option<Author>) -> Self {
        Self { id, title, author }
    }

    pub const fn id(&self) -> BookId {
        self.id
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn author(&self) -> Option<&Author> {
        self.author.as_ref()
    }
}

#[derive(Debug)]
pub struct CreateAuthorRequest {
    name: AuthorName,
}

impl CreateAuthorRequest {
    pub const fn new(name: AuthorName) -> Self {
        Self { name }
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateAuthorError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct CreateBookRequest {
    title: BookTitle,
    author: Option<AuthorId>,
}

impl CreateBookRequest {
    pub const fn new(title: BookTitle, author: Option<AuthorId>) -> Self {
        Self { title, author }
    }

    pub const fn title(&self) -> &BookTitle {
        &self.title
    }

    pub const fn author(&self) -> Option<AuthorId> {
        self.author
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct CreateBookError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct FindAuthorRequest {
    id: AuthorId,
}

impl FindAuthorRequest {
    pub const fn new(id: AuthorId) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> AuthorId {
        self.id
    }
}

#[derive(Error, Debug)]
pub enum FindAuthorError {
    #[error("Author with id \"{id}\" does not exist")]
    NotFound { id: AuthorId },
    #[error(transparent)]
    Other(anyhow::Error),
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindAllAuthorsError(#[from] pub anyhow::Error);

#[derive(Debug)]
pub struct FindBooksByAuthorRequest {
    author: AuthorId,
}

impl FindBooksByAuthorRequest {
    pub const fn new(author: AuthorId) -> Self {
        Self { author }
    }

    pub const fn author(&self) -> AuthorId {
        self.author
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct FindBooksError(#[from] pub anyhow::Error);

/// An author and the titles to file under it.
#[derive(Debug)]
pub struct ResetAuthor {
    name: AuthorName,
    titles: Vec<BookTitle>,
}

impl ResetAuthor {
    pub const fn new(name: AuthorName, titles: Vec<BookTitle>) -> Self {
        Self { name, titles }
    }

    pub const fn name(&self) -> &AuthorName {
        &self.name
    }

    pub fn titles(&self) -> &[BookTitle] {
        &self.titles
    }
}

/// Replaces the whole store with the listed authors and their books. An
/// empty request just wipes it.
#[derive(Debug, Default)]
pub struct ResetRequest {
    authors: Vec<ResetAuthor>,
}

impl ResetRequest {
    pub const fn new(authors: Vec<ResetAuthor>) -> Self {
        Self { authors }
    }

    pub fn authors(&self) -> &[ResetAuthor] {
        &self.authors
    }
}

#[derive(Error, Debug)]
#[error(transparent)]
pub struct ResetError(#[from] pub anyhow::Error);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_id_parses_positive_integers() {
        assert_eq!(AuthorId::parse("1"), Some(AuthorId::new(1)));
        assert_eq!(AuthorId::parse("42"), Some(AuthorId::new(42)));
    }

    #[test]
    fn author_id_rejects_malformed_input() {
        for raw in [
            "",
            "0",
            "01",
            "0042",
            "-3",
            "+3",
            " 7",
            "abc",
            "5f3a1c2b9d8e7f6a5b4c3d2e",
            "99999999999999999999999",
        ] {
            assert_eq!(AuthorId::parse(raw), None, "{raw:?} should be rejected");
        }
    }

    #[test]
    fn author_name_is_trimmed() {
        let name = AuthorName::new("  J.K. Rowling ").unwrap();
        assert_eq!(name.as_str(), "J.K. Rowling");
    }

    #[test]
    fn blank_names_and_titles_are_rejected() {
        assert!(AuthorName::new("   ").is_err());
        assert!(BookTitle::new("").is_err());
    }
}
