use std::collections::{BTreeMap, BTreeSet};

use crate::similarity::stopwords::is_stop_word;

/// Sparse term-weight vector; entries are sorted by term index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w * w).sum::<f64>().sqrt()
    }

    pub fn dot(&self, other: &SparseVector) -> f64 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0;
        while i < self.entries.len() && j < other.entries.len() {
            let (a_idx, a_w) = self.entries[i];
            let (b_idx, b_w) = other.entries[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    /// Cosine similarity; 0 when either vector has zero norm
    pub fn cosine(&self, other: &SparseVector) -> f64 {
        let denom = self.norm() * other.norm();
        if denom == 0.0 {
            return 0.0;
        }
        self.dot(other) / denom
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for (_, w) in &mut self.entries {
                *w /= norm;
            }
        }
    }
}

/// Lowercase and split into runs of two or more word characters, dropping stop words
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.chars().count() >= 2)
        .filter(|t| !is_stop_word(t))
        .map(str::to_string)
        .collect()
}

/// TF-IDF vector space fitted on a fixed set of documents.
///
/// The vocabulary is ordered lexicographically so that the same documents
/// always produce the same term indices and weights. Weights use the
/// smoothed inverse document frequency `ln((1 + n) / (1 + df)) + 1`
/// and each document row is scaled to unit length.
#[derive(Debug, Clone, Default)]
pub struct TfIdfModel {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
    rows: Vec<SparseVector>,
}

impl TfIdfModel {
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let tokenized: Vec<Vec<String>> = documents.iter().map(|d| tokenize(d.as_ref())).collect();

        let mut doc_freq: BTreeMap<&str, usize> = BTreeMap::new();
        for tokens in &tokenized {
            let unique: BTreeSet<&str> = tokens.iter().map(String::as_str).collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (idx, (term, df)) in doc_freq.into_iter().enumerate() {
            vocabulary.insert(term.to_string(), idx);
            idf.push(((1.0 + n) / (1.0 + df as f64)).ln() + 1.0);
        }

        let mut model = Self {
            vocabulary,
            idf,
            rows: Vec::new(),
        };
        model.rows = tokenized.iter().map(|tokens| model.weigh(tokens)).collect();
        model
    }

    fn weigh(&self, tokens: &[String]) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in tokens {
            // Out-of-vocabulary terms carry no weight
            if let Some(&idx) = self.vocabulary.get(token) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector {
            entries: counts
                .into_iter()
                .map(|(idx, tf)| (idx, tf * self.idf[idx]))
                .collect(),
        };
        vector.normalize();
        vector
    }

    /// Project free text into this vector space without growing the vocabulary
    pub fn transform(&self, text: &str) -> SparseVector {
        self.weigh(&tokenize(text))
    }

    /// Pre-computed vector of the document at `index`
    pub fn row(&self, index: usize) -> Option<&SparseVector> {
        self.rows.get(index)
    }

    /// Cosine similarity of `query` against every document, in corpus order
    pub fn similarities(&self, query: &SparseVector) -> Vec<f64> {
        self.rows.iter().map(|row| row.cosine(query)).collect()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.vocabulary.get(term).map(|&idx| self.idf[idx])
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Chicken Soup with c(\"broth\", \"carrot\") & a 2x pinch"),
            vec!["chicken", "soup", "broth", "carrot", "2x", "pinch"]
        );
        assert!(tokenize("the and of").is_empty());
    }

    #[test]
    fn test_fit_builds_sorted_vocabulary() {
        let model = TfIdfModel::fit(&["carrot broth", "broth apple"]);
        assert_eq!(model.vocabulary_size(), 3);
        assert_eq!(model.len(), 2);

        // "broth" appears everywhere so it weighs less than rarer terms
        let broth = model.idf("broth").unwrap();
        let apple = model.idf("apple").unwrap();
        assert!((broth - 1.0).abs() < 1e-12);
        assert!(apple > broth);
        assert!((apple - ((3.0f64 / 2.0).ln() + 1.0)).abs() < 1e-12);
    }

    #[test]
    fn test_rows_are_unit_length() {
        let model = TfIdfModel::fit(&["chicken broth carrot", "broth carrot celery celery"]);
        for i in 0..model.len() {
            assert!((model.row(i).unwrap().norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_identical_corpora_give_identical_weights() {
        let docs = ["veggie soup broth", "chicken soup", "apple pie"];
        let a = TfIdfModel::fit(&docs);
        let b = TfIdfModel::fit(&docs);
        for i in 0..docs.len() {
            assert_eq!(a.row(i), b.row(i));
        }
    }

    #[test]
    fn test_transform_ignores_unknown_terms() {
        let model = TfIdfModel::fit(&["chicken broth"]);
        let q = model.transform("quantum broth xyzzy");
        assert_eq!(q.entries().len(), 1);
        assert_eq!(model.vocabulary_size(), 2);

        let unknown = model.transform("the of zebra");
        assert!(unknown.is_empty());
        assert_eq!(model.similarities(&unknown), vec![0.0]);
    }

    #[test]
    fn test_zero_norm_cosine_is_zero() {
        let model = TfIdfModel::fit(&["the", "broth"]);
        assert!(model.row(0).unwrap().is_empty());
        let q = model.transform("broth");
        let sims = model.similarities(&q);
        assert_eq!(sims[0], 0.0);
        assert!((sims[1] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_corpus() {
        let model = TfIdfModel::fit::<&str>(&[]);
        assert!(model.is_empty());
        assert!(model.similarities(&model.transform("anything")).is_empty());
    }
}
