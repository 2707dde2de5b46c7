use rand::{Rng, seq::SliceRandom};

use crate::knowledge::Article;

/// Pick up to `count` distinct articles uniformly at random.
///
/// Fewer than `count` articles are returned only when there are not enough
/// to choose from. The order of the result is random too.
pub fn recommend_articles<R: Rng + ?Sized>(
    articles: &[Article],
    count: usize,
    rng: &mut R,
) -> Vec<Article> {
    articles.choose_multiple(rng, count).cloned().collect()
}
