use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::ops::AddAssign;

use super::tokenizer::tokenize;

/// Dense TF-IDF weights over a fitted vocabulary
///
/// Vectors produced by [`TfidfVectorizer::transform`] have unit Euclidean
/// norm, or are all zeros when the document had no vocabulary terms.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentVector(Vec<f64>);

impl DocumentVector {
    pub fn zeros(dims: usize) -> Self {
        Self(vec![0.0; dims])
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Euclidean norm
    pub fn norm(&self) -> f64 {
        self.0.iter().map(|w| w * w).sum::<f64>().sqrt()
    }

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|w| *w == 0.0)
    }

    /// Scales to unit length. A zero vector stays zero.
    pub fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            for w in &mut self.0 {
                *w /= norm;
            }
        }
    }

    /// Dot product. For two unit vectors this is their cosine similarity.
    pub fn dot(&self, other: &DocumentVector) -> f64 {
        self.0.iter().zip(&other.0).map(|(a, b)| a * b).sum()
    }
}

impl AddAssign<&DocumentVector> for DocumentVector {
    fn add_assign(&mut self, other: &DocumentVector) {
        for (w, o) in self.0.iter_mut().zip(&other.0) {
            *w += o;
        }
    }
}

impl From<Vec<f64>> for DocumentVector {
    fn from(weights: Vec<f64>) -> Self {
        Self(weights)
    }
}

/// TF-IDF model fitted on a corpus of documents
///
/// `fit` assigns vocabulary indices in first-seen order across the corpus
/// and computes a smoothed IDF per term; `transform` maps any document onto
/// that vocabulary. Terms outside the vocabulary are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// term → dimension index, contiguous over `0..idf.len()`
    vocabulary: HashMap<String, usize>,
    /// IDF weight per dimension
    idf: Vec<f64>,
    /// Number of documents the model was fitted on
    doc_count: usize,
}

impl TfidfVectorizer {
    /// Fits vocabulary and IDF table on `documents`.
    ///
    /// Document frequency counts a term once per document. IDF is
    /// `ln(N / (1 + df)) + 1`, which stays positive for every fitted term.
    /// An empty corpus yields an empty model.
    pub fn fit<S: AsRef<str>>(documents: &[S]) -> Self {
        let mut vocabulary: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: Vec<usize> = Vec::new();

        for document in documents {
            let mut seen: HashSet<String> = HashSet::new();
            for token in tokenize(document.as_ref()) {
                if !seen.insert(token.clone()) {
                    continue;
                }
                let next = doc_freq.len();
                let idx = *vocabulary.entry(token).or_insert(next);
                if idx == next {
                    doc_freq.push(1);
                } else {
                    doc_freq[idx] += 1;
                }
            }
        }

        let n = documents.len() as f64;
        let idf = doc_freq
            .iter()
            .map(|&df| (n / (1.0 + df as f64)).ln() + 1.0)
            .collect();

        Self {
            vocabulary,
            idf,
            doc_count: documents.len(),
        }
    }

    /// Maps each document to its L2-normalized TF-IDF vector
    pub fn transform<S: AsRef<str>>(&self, documents: &[S]) -> Vec<DocumentVector> {
        documents
            .iter()
            .map(|document| self.transform_one(document.as_ref()))
            .collect()
    }

    /// Raw term count times IDF per vocabulary term, then L2-normalized
    pub fn transform_one(&self, document: &str) -> DocumentVector {
        let mut tf: HashMap<String, f64> = HashMap::new();
        for token in tokenize(document) {
            *tf.entry(token).or_insert(0.0) += 1.0;
        }

        let mut vector = DocumentVector::zeros(self.vocabulary_size());
        for (term, count) in &tf {
            if let Some(&idx) = self.vocabulary.get(term) {
                vector.0[idx] = count * self.idf[idx];
            }
        }

        vector.normalize();
        vector
    }

    pub fn vocabulary_size(&self) -> usize {
        self.idf.len()
    }

    /// True when fitting produced no terms; no similarity can be computed
    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    pub fn doc_count(&self) -> usize {
        self.doc_count
    }

    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.index_of(term).map(|idx| self.idf[idx])
    }
}
