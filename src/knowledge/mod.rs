//! A small library of personal finance articles that users can browse and favorite.

mod db;
mod domain;
mod list;
mod recommend;
mod view;

pub use db::{
    create_article, create_knowledge_tables, favorite_article, get_all_articles, get_article,
    is_favorite, list_article_categories, list_articles, list_favorite_articles,
};
pub use domain::{Article, FavoriteOutcome, NewArticle};
pub use list::{article_card, get_knowledge_page};
pub use recommend::recommend_articles;
pub use view::{favorite_article_endpoint, get_article_page};
