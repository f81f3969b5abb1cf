//! Duplicate-story clustering.
//!
//! A single greedy left-to-right sweep: the first unconsumed article opens a
//! cluster and swallows every later unconsumed article that scores at or
//! above [`DUPLICATE_THRESHOLD`] against it. Duplicates are never compared
//! with each other and no centroid is recomputed, so the result depends on
//! input order.

use crate::models::ArticleRecord;
use crate::similarity::{SimilarityMatrix, pairwise_similarity};
use tracing::{debug, info, instrument, warn};

/// Minimum cosine score for two articles to count as the same story.
pub const DUPLICATE_THRESHOLD: f64 = 0.85;

/// Cluster `records` with TF-IDF similarity and return one representative per
/// story, in the order the clusters were opened.
#[instrument(level = "info", skip_all, fields(input = records.len()))]
pub fn consolidate(records: Vec<ArticleRecord>) -> Vec<ArticleRecord> {
    let records: Vec<ArticleRecord> = records
        .into_iter()
        .filter(|r| {
            if !r.has_content() {
                warn!(url = %r.url, "Dropping article without content before clustering");
            }
            r.has_content()
        })
        .collect();

    match records.len() {
        0 => Vec::new(),
        1 => consolidate_with(records, &SimilarityMatrix::zeros(1), DUPLICATE_THRESHOLD),
        _ => {
            let texts: Vec<String> = records.iter().map(ArticleRecord::similarity_text).collect();
            let scores = pairwise_similarity(&texts);
            let out = consolidate_with(records, &scores, DUPLICATE_THRESHOLD);
            info!(output = out.len(), "Consolidated duplicate stories");
            out
        }
    }
}

/// The clustering sweep over precomputed scores.
///
/// `scores` must be indexed the same way as `records`.
pub fn consolidate_with(
    records: Vec<ArticleRecord>,
    scores: &SimilarityMatrix,
    threshold: f64,
) -> Vec<ArticleRecord> {
    debug_assert_eq!(scores.len(), records.len());
    // `None` marks a consumed slot.
    let mut slots: Vec<Option<ArticleRecord>> = records.into_iter().map(Some).collect();
    let mut representatives = Vec::new();

    for i in 0..slots.len() {
        let Some(mut seed) = slots[i].take() else {
            continue;
        };
        if seed.urls.first() != Some(&seed.url) {
            seed.urls = vec![seed.url.clone()];
        }

        for j in (i + 1)..slots.len() {
            if slots[j].is_none() {
                continue;
            }
            let score = scores.score(i, j);
            if score < threshold {
                continue;
            }
            if let Some(duplicate) = slots[j].take() {
                debug!(seed = i, duplicate = j, score, url = %duplicate.url, "Merging duplicate story");
                merge_provenance(&mut seed, duplicate);
            }
        }

        representatives.push(seed);
    }

    representatives
}

/// Fold a consumed duplicate's URLs and source label into its representative.
fn merge_provenance(seed: &mut ArticleRecord, duplicate: ArticleRecord) {
    let ArticleRecord {
        url, urls, source, ..
    } = duplicate;

    for u in std::iter::once(url).chain(urls) {
        if !seed.urls.contains(&u) {
            seed.urls.push(u);
        }
    }

    if !source.is_empty() && !seed.source.contains(&source) {
        if seed.source.is_empty() {
            seed.source = source;
        } else {
            seed.source = format!("{}, {}", seed.source, source);
        }
    }
}
