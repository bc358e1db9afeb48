use crate::core::scoring::{calculate_score, generate_warnings};
use crate::models::{RankingPolicy, Requester, StructuredResponse, TriState};

/// Number of responses that receive a rank
pub const RANKED_SLOTS: usize = 3;

/// Warning attached to every response that is not available
pub const NOT_AVAILABLE_WARNING: &str = "Not available";

/// Result of the ranking process
#[derive(Debug, Clone)]
pub struct RankingOutcome {
    /// Available responses by score, then the rest in input order
    pub results: Vec<StructuredResponse>,
    pub available_count: usize,
}

impl RankingOutcome {
    /// Ranked responses in rank order
    pub fn top(&self) -> impl Iterator<Item = &StructuredResponse> {
        self.results.iter().filter(|r| r.rank.is_some())
    }
}

/// Scores, orders and annotates landlord responses for a requester
///
/// # Pipeline Stages
/// 1. Partition by availability
/// 2. Score available responses
/// 3. Stable sort by score (ties keep input order)
/// 4. Rank the first three
/// 5. Attach warnings; unavailable responses go to the tail
#[derive(Debug, Clone)]
pub struct RankingEngine {
    policy: RankingPolicy,
    default_budget_max: u32,
}

impl RankingEngine {
    pub fn new(policy: RankingPolicy, default_budget_max: u32) -> Self {
        Self {
            policy,
            default_budget_max,
        }
    }

    pub fn with_default_policy() -> Self {
        Self::new(RankingPolicy::default(), crate::models::SearchConfig::default().default_budget_max)
    }

    pub fn policy(&self) -> &RankingPolicy {
        &self.policy
    }

    pub fn rank_results(
        &self,
        responses: Vec<StructuredResponse>,
        requester: &Requester,
    ) -> RankingOutcome {
        tracing::info!(requester = %requester.name, "Ranking {} results", responses.len());

        let (mut available, mut unavailable): (Vec<_>, Vec<_>) = responses
            .into_iter()
            .partition(|r| r.availability() == TriState::Yes);

        if available.is_empty() {
            tracing::warn!(requester = %requester.name, "No available accommodations found");
        }

        for response in &mut available {
            response.score = Some(calculate_score(
                response,
                requester,
                &self.policy,
                self.default_budget_max,
            ));
            response.warnings =
                generate_warnings(response, requester, &self.policy, self.default_budget_max);
            response.rank = None;
        }

        // sort_by is stable, equal scores keep their input order
        available.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for (index, response) in available.iter_mut().take(RANKED_SLOTS).enumerate() {
            response.rank = Some(index as u8 + 1);
        }

        for response in &mut unavailable {
            response.score = None;
            response.rank = None;
            response.warnings = NOT_AVAILABLE_WARNING.to_string();
        }

        let available_count = available.len();
        let mut results = available;
        results.append(&mut unavailable);

        tracing::info!(
            requester = %requester.name,
            top = ?results
                .iter()
                .take_while(|r| r.rank.is_some())
                .map(|r| r.address.as_deref().unwrap_or("N/A"))
                .collect::<Vec<_>>(),
            "Ranked results"
        );

        RankingOutcome {
            results,
            available_count,
        }
    }
}

impl Default for RankingEngine {
    fn default() -> Self {
        Self::with_default_policy()
    }
}
