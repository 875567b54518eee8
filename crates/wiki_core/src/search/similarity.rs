//! Shared-tag ranking.
//!
//! # Invariants
//! - The source page never ranks against itself; identity is the page id,
//!   never the title.
//! - Candidates with zero shared tags are dropped, not ranked last.
//! - Equal overlap keeps primary key order (creation order).

use crate::model::page::Page;
use std::cmp::Ordering;
use std::collections::HashSet;

/// One page similar to a source page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarPage {
    pub page: Page,
    /// Size of the tag intersection with the source page.
    pub shared_tags: usize,
}

/// Counts tags present in both sets.
pub fn shared_tag_count(left: &[String], right: &[String]) -> usize {
    let left: HashSet<&str> = left.iter().map(String::as_str).collect();
    right
        .iter()
        .map(String::as_str)
        .collect::<HashSet<_>>()
        .intersection(&left)
        .count()
}

/// Ranks `candidates` by shared tags with `source`, most overlap first.
pub fn rank_by_shared_tags(source: &Page, candidates: Vec<Page>) -> Vec<SimilarPage> {
    let mut ranked = candidates
        .into_iter()
        .filter(|candidate| !is_same_page(source, candidate))
        .filter_map(|candidate| {
            let shared_tags = shared_tag_count(source.tags(), candidate.tags());
            (shared_tags > 0).then_some(SimilarPage {
                page: candidate,
                shared_tags,
            })
        })
        .collect::<Vec<_>>();

    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(left: &SimilarPage, right: &SimilarPage) -> Ordering {
    right
        .shared_tags
        .cmp(&left.shared_tags)
        .then_with(|| left.page.id().cmp(&right.page.id()))
}

fn is_same_page(source: &Page, candidate: &Page) -> bool {
    matches!((source.id(), candidate.id()), (Some(left), Some(right)) if left == right)
}
