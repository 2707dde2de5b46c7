//! Knowledge articles and favorites.

use serde::Serialize;
use time::OffsetDateTime;

use crate::{Error, database_id::ArticleID};

/// A short article about personal finance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    /// The ID of the article.
    pub id: ArticleID,
    pub title: String,
    /// A sentence or two shown in listings.
    pub summary: String,
    /// The full text of the article.
    pub content: String,
    /// A free text topic, e.g. "saving" or "investing".
    pub category: String,
    /// When the article was added, in UTC.
    pub created_at: OffsetDateTime,
}

/// The fields needed to add an article.
#[derive(Debug, Clone, PartialEq)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub content: String,
    pub category: String,
    pub created_at: OffsetDateTime,
}

impl NewArticle {
    /// Check that the text fields are not blank and trim them.
    ///
    /// # Errors
    ///
    /// Returns [Error::Validation] naming the first blank field.
    pub fn validate(mut self) -> Result<Self, Error> {
        for (name, value) in [
            ("title", &mut self.title),
            ("summary", &mut self.summary),
            ("content", &mut self.content),
            ("category", &mut self.category),
        ] {
            *value = value.trim().to_owned();

            if value.is_empty() {
                return Err(Error::Validation(format!("article {name} cannot be empty")));
            }
        }

        Ok(self)
    }
}

/// The result of adding an article to a user's favorites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteOutcome {
    /// The article was not a favorite before and now is.
    Added,
    /// The article was already a favorite, nothing changed.
    AlreadyFavorited,
}
