// Lexical similarity ranking over recipe text.
// Documents are vectorized with TF-IDF and ranked by cosine similarity.

pub mod stopwords;
pub mod tfidf;

pub use tfidf::{tokenize, SparseVector, TfIdfModel};

/// A candidate position in the ranked corpus with its similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ranked {
    pub index: usize,
    pub score: f64,
}

/// Order scores descending, keeping corpus order among ties, and keep the top `k`
pub fn top_k(scores: &[f64], exclude: Option<usize>, k: usize) -> Vec<Ranked> {
    let mut ranked: Vec<Ranked> = scores
        .iter()
        .enumerate()
        .filter(|(index, _)| Some(*index) != exclude)
        .map(|(index, &score)| Ranked { index, score })
        .collect();

    // Vec::sort_by is stable
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(k);
    ranked
}

/// Rank every document against free query text
pub fn rank_by_text(model: &TfIdfModel, query: &str, k: usize) -> Vec<Ranked> {
    let query = model.transform(&query.to_lowercase());
    top_k(&model.similarities(&query), None, k)
}

/// Position of the first document whose name equals `title`, ignoring case
pub fn find_seed<'a, I>(names: I, title: &str) -> Option<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let wanted = title.trim().to_lowercase();
    names
        .into_iter()
        .position(|name| name.trim().to_lowercase() == wanted)
}

/// Rank every other document against the vector of the document at `seed`.
///
/// The seed is scored like any other row and then left out of the result.
/// An out-of-range seed yields an empty ranking.
pub fn rank_like(model: &TfIdfModel, seed: usize, k: usize) -> Vec<Ranked> {
    let Some(query) = model.row(seed) else {
        return Vec::new();
    };
    top_k(&model.similarities(query), Some(seed), k)
}

/// Recommend documents similar to the one named `title`; empty when no name matches
pub fn rank_like_title<'a, I>(model: &TfIdfModel, names: I, title: &str, k: usize) -> Vec<Ranked>
where
    I: IntoIterator<Item = &'a str>,
{
    match find_seed(names, title) {
        Some(seed) => rank_like(model, seed, k),
        None => Vec::new(),
    }
}
