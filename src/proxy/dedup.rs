//! Merging of per-source candidate sets

use crate::proxy::models::CandidateEndpoint;
use std::collections::HashSet;

pub struct Deduplicator;

impl Deduplicator {
    /// Union of all candidate sets. Input order does not matter.
    pub fn merge<I>(sets: I) -> HashSet<CandidateEndpoint>
    where
        I: IntoIterator<Item = HashSet<CandidateEndpoint>>,
    {
        let mut merged = HashSet::new();
        for set in sets {
            merged.extend(set);
        }
        merged
    }
}
