//! Database operations for articles and favorites.

use rusqlite::{Connection, Row};
use time::UtcOffset;

use crate::{
    Error, UserID,
    database_id::ArticleID,
    knowledge::{Article, FavoriteOutcome, NewArticle},
    pagination::{Page, limit_offset},
};

const ARTICLE_COLUMNS: &str = "id, title, summary, content, category, created_at";

/// Create the article and favorite tables.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_knowledge_tables(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS knowledge (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                summary TEXT NOT NULL,
                content TEXT NOT NULL,
                category TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_knowledge_category_created
                ON knowledge(category, created_at);

            CREATE TABLE IF NOT EXISTS user_knowledge (
                user_id INTEGER NOT NULL REFERENCES user(id) ON DELETE CASCADE,
                knowledge_id INTEGER NOT NULL REFERENCES knowledge(id) ON DELETE CASCADE,
                PRIMARY KEY (user_id, knowledge_id)
            );",
    )
}

/// Add an article to the knowledge base.
///
/// # Errors
///
/// Returns [Error::Validation] if a field is blank or [Error::SqlError] if the insert fails.
pub fn create_article(article: NewArticle, connection: &Connection) -> Result<Article, Error> {
    let article = article.validate()?;
    let created_at = article.created_at.to_offset(UtcOffset::UTC);

    connection
        .prepare(&format!(
            "INSERT INTO knowledge (title, summary, content, category, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING {ARTICLE_COLUMNS}"
        ))?
        .query_row(
            (
                &article.title,
                &article.summary,
                &article.content,
                &article.category,
                created_at,
            ),
            map_article_row,
        )
        .map_err(|error| error.into())
}

/// Get the article with `article_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such article.
pub fn get_article(article_id: ArticleID, connection: &Connection) -> Result<Article, Error> {
    connection
        .prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM knowledge WHERE id = :id"
        ))?
        .query_row(&[(":id", &article_id)], map_article_row)
        .map_err(|error| error.into())
}

/// Get every article, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn get_all_articles(connection: &Connection) -> Result<Vec<Article>, Error> {
    connection
        .prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM knowledge ORDER BY created_at DESC, id DESC"
        ))?
        .query_map([], map_article_row)?
        .map(|maybe_article| maybe_article.map_err(Error::from))
        .collect()
}

/// Get one page of articles, newest first, optionally only those in `category`.
///
/// # Errors
///
/// Returns [Error::Validation] if `page` or `page_size` is zero, or
/// [Error::SqlError] if a query fails.
pub fn list_articles(
    category: Option<&str>,
    page: u64,
    page_size: u64,
    connection: &Connection,
) -> Result<Page<Article>, Error> {
    let (limit, offset) = limit_offset(page, page_size)?;

    let total: i64 = connection.query_row(
        "SELECT COUNT(id) FROM knowledge WHERE ?1 IS NULL OR category = ?1",
        [category],
        |row| row.get(0),
    )?;

    let items = connection
        .prepare(&format!(
            "SELECT {ARTICLE_COLUMNS} FROM knowledge
             WHERE ?1 IS NULL OR category = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3"
        ))?
        .query_map((category, limit, offset), map_article_row)?
        .map(|maybe_article| maybe_article.map_err(Error::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Page {
        items,
        page,
        page_size,
        total: total as u64,
    })
}

/// The distinct article categories in alphabetical order.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn list_article_categories(connection: &Connection) -> Result<Vec<String>, Error> {
    connection
        .prepare("SELECT DISTINCT category FROM knowledge ORDER BY category ASC")?
        .query_map([], |row| row.get(0))?
        .map(|maybe_category| maybe_category.map_err(Error::from))
        .collect()
}

/// Add the article to the user's favorites if it is not there already.
///
/// # Errors
///
/// Returns [Error::NotFound] if there is no such article.
pub fn favorite_article(
    user_id: UserID,
    article_id: ArticleID,
    connection: &Connection,
) -> Result<FavoriteOutcome, Error> {
    get_article(article_id, connection)?;

    let rows_inserted = connection.execute(
        "INSERT OR IGNORE INTO user_knowledge (user_id, knowledge_id) VALUES (?1, ?2)",
        (user_id.as_i64(), article_id),
    )?;

    if rows_inserted == 0 {
        Ok(FavoriteOutcome::AlreadyFavorited)
    } else {
        Ok(FavoriteOutcome::Added)
    }
}

/// Whether the user has added the article to their favorites.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn is_favorite(
    user_id: UserID,
    article_id: ArticleID,
    connection: &Connection,
) -> Result<bool, Error> {
    connection
        .query_row(
            "SELECT EXISTS (
                SELECT 1 FROM user_knowledge WHERE user_id = ?1 AND knowledge_id = ?2
            )",
            (user_id.as_i64(), article_id),
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// The user's favorite articles, newest first.
///
/// # Errors
///
/// Returns [Error::SqlError] if the query fails.
pub fn list_favorite_articles(
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Article>, Error> {
    connection
        .prepare(
            "SELECT k.id, k.title, k.summary, k.content, k.category, k.created_at
             FROM knowledge k
             INNER JOIN user_knowledge uk ON uk.knowledge_id = k.id
             WHERE uk.user_id = ?1
             ORDER BY k.created_at DESC, k.id DESC",
        )?
        .query_map([user_id.as_i64()], map_article_row)?
        .map(|maybe_article| maybe_article.map_err(Error::from))
        .collect()
}

fn map_article_row(row: &Row) -> Result<Article, rusqlite::Error> {
    Ok(Article {
        id: row.get(0)?,
        title: row.get(1)?,
        summary: row.get(2)?,
        content: row.get(3)?,
        category: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod knowledge_db_tests {
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        knowledge::{FavoriteOutcome, NewArticle},
        test_utils::{create_test_user, get_test_connection},
    };

    use super::{
        create_article, favorite_article, get_all_articles, get_article, is_favorite,
        list_article_categories, list_articles, list_favorite_articles,
    };

    fn article(title: &str, category: &str, created_at: OffsetDateTime) -> NewArticle {
        NewArticle {
            title: title.to_owned(),
            summary: format!("About {title}"),
            content: format!("All about {title}."),
            category: category.to_owned(),
            created_at,
        }
    }

    #[test]
    fn create_and_get_article() {
        let connection = get_test_connection();

        let created = create_article(
            article("Budgeting 101", "budgeting", datetime!(2024-01-01 9:30 UTC)),
            &connection,
        )
        .unwrap();

        assert_eq!(created.created_at, datetime!(2024-01-01 9:30 UTC));
        assert_eq!(get_article(created.id, &connection), Ok(created));
    }

    #[test]
    fn get_missing_article_is_not_found() {
        let connection = get_test_connection();

        assert_eq!(get_article(1, &connection), Err(Error::NotFound));
    }

    #[test]
    fn list_articles_newest_first_with_category_filter() {
        let connection = get_test_connection();
        let old = create_article(
            article("Old", "saving", datetime!(2023-01-01 0:00 UTC)),
            &connection,
        )
        .unwrap();
        let new = create_article(
            article("New", "saving", datetime!(2024-01-01 0:00 UTC)),
            &connection,
        )
        .unwrap();
        let other = create_article(
            article("Other", "investing", datetime!(2023-06-01 0:00 UTC)),
            &connection,
        )
        .unwrap();

        let all = list_articles(None, 1, 10, &connection).unwrap();
        let saving = list_articles(Some("saving"), 1, 10, &connection).unwrap();
        let second_page = list_articles(None, 2, 2, &connection).unwrap();

        assert_eq!(all.items, vec![new.clone(), other.clone(), old.clone()]);
        assert_eq!(saving.items, vec![new, old.clone()]);
        assert_eq!(saving.total, 2);
        assert_eq!(second_page.items, vec![old]);
        assert_eq!(second_page.total, 3);
        assert_eq!(get_all_articles(&connection).unwrap().len(), 3);
        assert_eq!(
            list_article_categories(&connection),
            Ok(vec!["investing".to_owned(), "saving".to_owned()])
        );
        assert_eq!(other.category, "investing");
    }

    #[test]
    fn favorite_article_is_idempotent() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);
        let article = create_article(
            article("Budgeting 101", "budgeting", datetime!(2024-01-01 0:00 UTC)),
            &connection,
        )
        .unwrap();

        assert_eq!(is_favorite(user_id, article.id, &connection), Ok(false));
        assert_eq!(
            favorite_article(user_id, article.id, &connection),
            Ok(FavoriteOutcome::Added)
        );
        assert_eq!(
            favorite_article(user_id, article.id, &connection),
            Ok(FavoriteOutcome::AlreadyFavorited)
        );
        assert_eq!(is_favorite(user_id, article.id, &connection), Ok(true));
        assert_eq!(
            list_favorite_articles(user_id, &connection),
            Ok(vec![article])
        );
    }

    #[test]
    fn favorite_missing_article_is_not_found() {
        let connection = get_test_connection();
        let user_id = create_test_user("alice", &connection);

        assert_eq!(
            favorite_article(user_id, 42, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn favorites_are_per_user() {
        let connection = get_test_connection();
        let alice = create_test_user("alice", &connection);
        let bob = create_test_user("bob", &connection);
        let article = create_article(
            article("Budgeting 101", "budgeting", datetime!(2024-01-01 0:00 UTC)),
            &connection,
        )
        .unwrap();

        favorite_article(alice, article.id, &connection).unwrap();

        assert_eq!(is_favorite(bob, article.id, &connection), Ok(false));
        assert_eq!(list_favorite_articles(bob, &connection), Ok(vec![]));
    }
}
