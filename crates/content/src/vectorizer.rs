//! TF-IDF vectorization of item descriptors.
//!
//! ## Algorithm
//! 1. Tokenize every descriptor: lowercase, split on anything that is not
//!    alphanumeric or `_`, keep tokens of two or more characters, drop
//!    English stop-words. `Action|Sci-Fi` becomes `action`, `sci`, `fi`.
//! 2. Vocabulary = every surviving term, sorted, so term indices only depend
//!    on the corpus.
//! 3. `idf(t) = ln((1 + n) / (1 + df(t))) + 1` where `df(t)` counts the
//!    documents containing `t`.
//! 4. Each document becomes `count(t) * idf(t)` per term, L2-normalized.
//!    A document with no vocabulary terms is the zero vector.

use crate::error::{ContentError, Result};
use crate::stop_words::is_stop_word;
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, instrument};

/// Minimum token length (in characters) kept by the tokenizer
const MIN_TOKEN_CHARS: usize = 2;

/// Sparse vector stored as parallel, index-sorted arrays
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    indices: Vec<usize>,
    values: Vec<f32>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs; pairs are sorted by index and
    /// zero values dropped
    pub fn from_pairs(mut pairs: Vec<(usize, f32)>) -> Self {
        pairs.retain(|&(_, v)| v != 0.0);
        pairs.sort_unstable_by_key(|&(i, _)| i);
        let (indices, values) = pairs.into_iter().unzip();
        Self { indices, values }
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        self.indices.iter().copied().zip(self.values.iter().copied())
    }

    /// Weight stored for `index`, 0 when absent
    pub fn get(&self, index: usize) -> f32 {
        match self.indices.binary_search(&index) {
            Ok(pos) => self.values[pos],
            Err(_) => 0.0,
        }
    }

    pub fn norm(&self) -> f32 {
        self.values.iter().map(|v| v * v).sum::<f32>().sqrt()
    }

    /// Dot product by merging the two sorted index lists.
    ///
    /// Products are summed in ascending index order for both operands, so
    /// `a.dot(&b)` and `b.dot(&a)` are bit-identical.
    pub fn dot(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut sum = 0.0f32;
        while i < self.indices.len() && j < other.indices.len() {
            match self.indices[i].cmp(&other.indices[j]) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    sum += self.values[i] * other.values[j];
                    i += 1;
                    j += 1;
                }
            }
        }
        sum
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for v in &mut self.values {
                *v /= norm;
            }
        }
    }
}

/// Split `text` into lowercase vocabulary candidates
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| w.chars().count() >= MIN_TOKEN_CHARS)
        .filter(|w| !is_stop_word(w))
        .map(str::to_string)
        .collect()
}

/// Fitted TF-IDF model: vocabulary plus per-term inverse document frequency
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    vocabulary: HashMap<String, usize>,
    /// Terms in index order
    terms: Vec<String>,
    idf: Vec<f32>,
    documents: usize,
}

impl TfIdfVectorizer {
    /// Learn vocabulary and IDF weights from the full descriptor corpus
    ///
    /// Fails with `EmptyCatalog` when the corpus holds no documents.
    pub fn fit(corpus: &[&str]) -> Result<Self> {
        if corpus.is_empty() {
            return Err(ContentError::EmptyCatalog);
        }

        // BTreeMap keeps terms sorted for deterministic indices
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        for doc in corpus {
            let unique: HashSet<String> = tokenize(doc).into_iter().collect();
            for term in unique {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let n = corpus.len() as f64;
        let mut vocabulary = HashMap::with_capacity(doc_freq.len());
        let mut terms = Vec::with_capacity(doc_freq.len());
        let mut idf = Vec::with_capacity(doc_freq.len());
        for (index, (term, df)) in doc_freq.into_iter().enumerate() {
            idf.push((((1.0 + n) / (1.0 + df as f64)).ln() + 1.0) as f32);
            vocabulary.insert(term.clone(), index);
            terms.push(term);
        }

        debug!(
            "Fitted TF-IDF over {} documents, vocabulary size {}",
            corpus.len(),
            terms.len()
        );

        Ok(Self {
            vocabulary,
            terms,
            idf,
            documents: corpus.len(),
        })
    }

    /// Fit on `corpus` and vectorize every document of it, in order
    #[instrument(skip(corpus), fields(documents = corpus.len()))]
    pub fn fit_transform(corpus: &[&str]) -> Result<(Self, Vec<SparseVector>)> {
        let vectorizer = Self::fit(corpus)?;
        let vectors = corpus.iter().map(|doc| vectorizer.transform(doc)).collect();
        Ok((vectorizer, vectors))
    }

    /// Vectorize one document against the fitted vocabulary.
    ///
    /// Terms outside the vocabulary are ignored.
    pub fn transform(&self, document: &str) -> SparseVector {
        let mut counts: HashMap<usize, f32> = HashMap::new();
        for token in tokenize(document) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let pairs = counts
            .into_iter()
            .map(|(index, count)| (index, count * self.idf[index]))
            .collect();

        let mut vector = SparseVector::from_pairs(pairs);
        vector.normalize();
        vector
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    /// Number of documents the model was fitted on
    pub fn documents(&self) -> usize {
        self.documents
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn term(&self, index: usize) -> Option<&str> {
        self.terms.get(index).map(String::as_str)
    }

    pub fn idf(&self, term: &str) -> Option<f32> {
        self.term_index(term).map(|i| self.idf[i])
    }
}
