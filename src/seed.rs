use crate::model::{AuthorName, BookTitle, ResetAuthor, ResetRequest};
use crate::store::Repository;
use anyhow::Context;

pub const TOLKIEN: &str = "J.R.R. Tolkien";
pub const ROWLING: &str = "J.K. Rowling";

pub const ROWLING_TITLES: [&str; 7] = [
    "Harry Potter and the Philosopher's Stone",
    "Harry Potter and the Chamber of Secrets",
    "Harry Potter and the Prisoner of Azkaban",
    "Harry Potter and the Goblet of Fire",
    "Harry Potter and the Order of the Phoenix",
    "Harry Potter and the Half-Blood Prince",
    "Harry Potter and the Deathly Hallows",
];

pub const TOLKIEN_TITLES: [&str; 2] = ["The Lord of the Rings", "The Hobbit"];

/// Wipes the store and loads the demo dataset in one transaction. Ids are
/// reassigned on every run.
pub async fn seed_database<R: Repository>(repo: &R) -> anyhow::Result<()> {
    tracing::info!("Resetting database");

    let req = ResetRequest::new(vec![
        seed_author(TOLKIEN, &TOLKIEN_TITLES)?,
        seed_author(ROWLING, &ROWLING_TITLES)?,
    ]);
    repo.reset(&req).await?;

    tracing::info!(
        authors = req.authors().len(),
        books = ROWLING_TITLES.len() + TOLKIEN_TITLES.len(),
        "Database seeded"
    );
    Ok(())
}

fn seed_author(name: &str, titles: &[&str]) -> anyhow::Result<ResetAuthor> {
    let name = AuthorName::new(name).context("Invalid seed author name")?;
    let titles = titles
        .iter()
        .map(|title| BookTitle::new(title).context("Invalid seed book title"))
        .collect::<anyhow::Result<_>>()?;
    Ok(ResetAuthor::new(name, titles))
}
