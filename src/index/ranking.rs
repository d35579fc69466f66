use super::SearchResult;

/// Score transform and ordering applied to every normalized result list.
///
/// The service normally answers in relevance order; results are re-sorted
/// regardless of which response encoding produced them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingPolicy;

impl RankingPolicy {
    /// `1.0 - distance`, unclamped.
    pub fn similarity(distance: f64) -> f64 {
        1.0 - distance
    }

    /// Sort by `similarity_score` descending. Order among equal scores is
    /// unspecified.
    pub fn rank(&self, results: &mut [SearchResult]) {
        results.sort_unstable_by(|a, b| b.similarity_score.total_cmp(&a.similarity_score));
    }

    /// Rank, then keep at most `limit` results.
    pub fn rank_top(&self, mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
        self.rank(&mut results);
        results.truncate(limit);
        results
    }
}
