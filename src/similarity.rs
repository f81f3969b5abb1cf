//! Corpus-relative TF-IDF cosine similarity between articles.
//!
//! Every run builds its own vocabulary and IDF weights from the articles it
//! was handed, so the same pair of stories can score differently when
//! compared inside two different collections.
//!
//! Weighting follows the usual smoothed scheme:
//!
//! ```text
//! idf(t)    = ln((1 + n) / (1 + df(t))) + 1
//! w(t, d)   = count(t, d) * idf(t)
//! score     = cos(w(d1), w(d2))
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

/// Tokens are runs of at least two word characters.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").unwrap());

static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "across", "after", "afterwards", "again", "against", "all",
        "almost", "alone", "along", "already", "also", "although", "always", "am", "among",
        "amongst", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
        "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
        "becomes", "been", "before", "beforehand", "behind", "being", "below", "beside",
        "besides", "between", "beyond", "both", "but", "by", "can", "cannot", "could", "did",
        "do", "does", "done", "down", "due", "during", "each", "either", "else", "elsewhere",
        "enough", "etc", "even", "ever", "every", "everyone", "everything", "everywhere",
        "except", "few", "for", "former", "formerly", "from", "further", "had", "has", "have",
        "he", "hence", "her", "here", "hereafter", "hereby", "herein", "hers", "herself", "him",
        "himself", "his", "how", "however", "ie", "if", "in", "indeed", "into", "is", "it",
        "its", "itself", "just", "last", "latter", "least", "less", "many", "may", "me",
        "meanwhile", "might", "more", "moreover", "most", "mostly", "much", "must", "my",
        "myself", "neither", "never", "nevertheless", "next", "no", "nobody", "none", "nor",
        "not", "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only",
        "onto", "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over",
        "own", "per", "perhaps", "please", "rather", "re", "same", "several", "she", "should",
        "since", "so", "some", "somehow", "someone", "something", "sometime", "sometimes",
        "somewhere", "still", "such", "than", "that", "the", "their", "them", "themselves",
        "then", "thence", "there", "thereafter", "thereby", "therefore", "therein", "these",
        "they", "this", "those", "though", "through", "throughout", "thus", "to", "together",
        "too", "toward", "towards", "under", "until", "up", "upon", "us", "very", "via", "was",
        "we", "well", "were", "what", "whatever", "when", "whence", "whenever", "where",
        "whereas", "whereby", "wherein", "whether", "which", "while", "who", "whoever", "whole",
        "whom", "whose", "why", "will", "with", "within", "without", "would", "yet", "you",
        "your", "yours", "yourself", "yourselves",
    ]
    .into_iter()
    .collect()
});

/// Split text into lowercase tokens, dropping English stop-words.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|t| !STOP_WORDS.contains(t))
        .map(str::to_string)
        .collect()
}

/// Symmetric `n × n` table of pairwise scores in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    n: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// A matrix in which no pair is similar.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            scores: vec![0.0; n * n],
        }
    }

    /// Build a matrix from a scoring function over `i < j`; the result is
    /// mirrored so `score(i, j) == score(j, i)`.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            for j in (i + 1)..n {
                let s = f(i, j).clamp(0.0, 1.0);
                m.scores[i * n + j] = s;
                m.scores[j * n + i] = s;
            }
        }
        m
    }

    pub fn len(&self) -> usize {
        self.n
    }

    /// Score for the pair `(i, j)`. The diagonal and out-of-range pairs score 0.
    pub fn score(&self, i: usize, j: usize) -> f64 {
        if i == j || i >= self.n || j >= self.n {
            return 0.0;
        }
        self.scores[i * self.n + j]
    }
}

/// Sparse, L2-normalized TF-IDF vector keyed by vocabulary index.
type SparseVector = HashMap<usize, f64>;

fn cosine(a: &SparseVector, b: &SparseVector) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter_map(|(term, wa)| large.get(term).map(|wb| wa * wb))
        .sum::<f64>()
        .clamp(0.0, 1.0)
}

/// Score every pair of documents in `texts` against each other.
///
/// A single document, or a collection in which every document is empty
/// after tokenization, yields an all-zero matrix.
#[instrument(level = "debug", skip_all, fields(docs = texts.len()))]
pub fn pairwise_similarity<S: AsRef<str>>(texts: &[S]) -> SimilarityMatrix {
    let n = texts.len();
    if n < 2 {
        return SimilarityMatrix::zeros(n);
    }

    let tokenized: Vec<Vec<String>> = texts.iter().map(|t| tokenize(t.as_ref())).collect();

    let mut vocabulary: HashMap<&str, usize> = HashMap::new();
    let mut doc_freq: Vec<usize> = Vec::new();
    let mut counts: Vec<HashMap<usize, f64>> = Vec::with_capacity(n);

    for tokens in &tokenized {
        let mut tf: HashMap<usize, f64> = HashMap::new();
        for tok in tokens {
            let next = vocabulary.len();
            let idx = *vocabulary.entry(tok.as_str()).or_insert(next);
            if idx == doc_freq.len() {
                doc_freq.push(0);
            }
            *tf.entry(idx).or_default() += 1.0;
        }
        for idx in tf.keys() {
            doc_freq[*idx] += 1;
        }
        counts.push(tf);
    }

    if vocabulary.is_empty() {
        debug!("Every document is empty after tokenization");
        return SimilarityMatrix::zeros(n);
    }

    let idf: Vec<f64> = doc_freq
        .iter()
        .map(|df| ((1.0 + n as f64) / (1.0 + *df as f64)).ln() + 1.0)
        .collect();

    let vectors: Vec<SparseVector> = counts
        .into_iter()
        .map(|tf| {
            let mut v: SparseVector = tf
                .into_iter()
                .map(|(idx, count)| (idx, count * idf[idx]))
                .collect();
            let norm = v.values().map(|w| w * w).sum::<f64>().sqrt();
            if norm > f64::EPSILON {
                v.values_mut().for_each(|w| *w /= norm);
            }
            v
        })
        .collect();

    debug!(vocabulary = vocabulary.len(), "Built TF-IDF vectors");
    SimilarityMatrix::from_fn(n, |i, j| cosine(&vectors[i], &vectors[j]))
}
