use std::cmp::Ordering;

use crate::models::Candidate;

// --- Score normalization ---

/// Normalized relevance score, clamped to [0, 1]. The backend's weighting
/// can push raw scores past 1.0; every comparison, filter, badge, and
/// percentage in the client goes through this, never the raw fields.
pub fn effective_score(candidate: &Candidate) -> f64 {
    candidate
        .final_score
        .or(candidate.score)
        .unwrap_or(0.0)
        .clamp(0.0, 1.0)
}

// --- Classification ---

/// Fixed quality bands over the normalized score, used for badges and the
/// score-distribution summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Band {
    pub fn classify(score: f64) -> Band {
        if score >= 0.8 {
            Band::Excellent
        } else if score >= 0.6 {
            Band::Good
        } else if score >= 0.4 {
            Band::Fair
        } else {
            Band::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::Excellent => "Excellent",
            Band::Good => "Good",
            Band::Fair => "Fair",
            Band::Poor => "Poor",
        }
    }
}

// --- Filtering ---

/// User-adjustable view predicate. Lives for the duration of a results
/// view and is carried across consecutive searches; only tearing the view
/// down resets it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Case-insensitive substring against city-else-country.
    pub location: String,
    /// Inclusive lower bound on the normalized score; 0 disables the clause.
    pub min_score: f64,
    /// Inclusive upper bound on monthly-else-hourly rate.
    pub max_rate: Option<f64>,
    /// Case-insensitive substring against the raw comma-joined job types.
    pub job_type: String,
    /// A record with no rate at all compares as 0 and passes any max-rate
    /// bound. Set this to drop such records instead.
    pub exclude_rateless: bool,
}

impl FilterState {
    /// All active clauses must pass.
    pub fn matches(&self, candidate: &Candidate) -> bool {
        if !self.location.is_empty() {
            let location = candidate.location_text().to_lowercase();
            if !location.contains(&self.location.to_lowercase()) {
                return false;
            }
        }

        if self.min_score > 0.0 && effective_score(candidate) < self.min_score {
            return false;
        }

        if let Some(max_rate) = self.max_rate {
            if self.exclude_rateless && !candidate.has_rate() {
                return false;
            }
            if candidate.rate() > max_rate {
                return false;
            }
        }

        if !self.job_type.is_empty() {
            match candidate.job_types.as_deref() {
                Some(types) if !types.is_empty() => {
                    if !types.to_lowercase().contains(&self.job_type.to_lowercase()) {
                        return false;
                    }
                }
                _ => return false,
            }
        }

        true
    }

    pub fn is_active(&self) -> bool {
        !self.location.is_empty()
            || self.min_score > 0.0
            || self.max_rate.is_some()
            || !self.job_type.is_empty()
    }
}

// --- Sorting ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    Score,
    Rate,
    Views,
    Name,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Score => "score",
            SortKey::Rate => "rate",
            SortKey::Views => "views",
            SortKey::Name => "name",
        }
    }

    pub fn cycle(self) -> SortKey {
        match self {
            SortKey::Score => SortKey::Rate,
            SortKey::Rate => SortKey::Views,
            SortKey::Views => SortKey::Name,
            SortKey::Name => SortKey::Score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn toggle(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

fn sort_name(candidate: &Candidate) -> String {
    format!(
        "{} {}",
        candidate.first_name.as_deref().unwrap_or(""),
        candidate.last_name.as_deref().unwrap_or("")
    )
}

fn numeric_key(candidate: &Candidate, key: SortKey) -> f64 {
    match key {
        SortKey::Score => effective_score(candidate),
        SortKey::Rate => candidate.rate(),
        SortKey::Views => candidate.views_count(),
        SortKey::Name => 0.0,
    }
}

/// Trinary comparator: returns Greater or Less, never Equal. Equal keys
/// fall through to Less, and the stable sort keeps them in input order.
fn compare(a: &Candidate, b: &Candidate, spec: SortSpec) -> Ordering {
    let (a_greater, a_less) = match spec.key {
        SortKey::Name => {
            let (an, bn) = (sort_name(a), sort_name(b));
            (an > bn, an < bn)
        }
        key => {
            let (av, bv) = (numeric_key(a, key), numeric_key(b, key));
            (av > bv, av < bv)
        }
    };

    match spec.order {
        SortOrder::Asc => {
            if a_greater {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        SortOrder::Desc => {
            if a_less {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
    }
}

// --- View building ---

#[derive(Debug, Clone, Copy)]
pub struct RankedRow<'a> {
    /// 1-based display rank within the filtered, sorted view.
    pub rank: usize,
    pub candidate: &'a Candidate,
}

/// A "no recommendations" state is only reachable with an empty input set;
/// "no filter matches" only with a non-empty one.
#[derive(Debug)]
pub enum ResultsView<'a> {
    NoRecommendations,
    NoFilterMatches,
    Ranked(Vec<RankedRow<'a>>),
}

impl<'a> ResultsView<'a> {
    pub fn rows(&self) -> &[RankedRow<'a>] {
        match self {
            ResultsView::Ranked(rows) => rows,
            _ => &[],
        }
    }
}

/// Filter, sort, and rank a result set for display. Pure; re-run on every
/// change to the inputs.
pub fn build_view<'a>(
    candidates: &'a [Candidate],
    filter: &FilterState,
    sort: SortSpec,
) -> ResultsView<'a> {
    if candidates.is_empty() {
        return ResultsView::NoRecommendations;
    }

    let mut filtered: Vec<&Candidate> = candidates.iter().filter(|c| filter.matches(c)).collect();
    if filtered.is_empty() {
        return ResultsView::NoFilterMatches;
    }

    filtered.sort_by(|a, b| compare(a, b, sort));

    let rows = filtered
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| RankedRow {
            rank: i + 1,
            candidate,
        })
        .collect();
    ResultsView::Ranked(rows)
}

// --- Aggregate statistics ---

/// Summary over the FULL result set. Filters affect display grouping only,
/// never these numbers.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_matches: usize,
    pub average_score: f64,
    pub excellent: usize,
    pub good: usize,
    pub fair: usize,
    pub poor: usize,
}

pub fn summarize(candidates: &[Candidate]) -> Option<Summary> {
    if candidates.is_empty() {
        return None;
    }

    let mut summary = Summary {
        total_matches: candidates.len(),
        average_score: 0.0,
        excellent: 0,
        good: 0,
        fair: 0,
        poor: 0,
    };

    let mut score_sum = 0.0;
    for candidate in candidates {
        let score = effective_score(candidate);
        score_sum += score;
        match Band::classify(score) {
            Band::Excellent => summary.excellent += 1,
            Band::Good => summary.good += 1,
            Band::Fair => summary.fair += 1,
            Band::Poor => summary.poor += 1,
        }
    }
    summary.average_score = score_sum / candidates.len() as f64;

    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(score: f64) -> Candidate {
        Candidate {
            score: Some(score),
            ..Default::default()
        }
    }

    #[test]
    fn test_effective_score_clamps_to_unit_interval() {
        assert_eq!(effective_score(&scored(1.45)), 1.0);
        assert_eq!(effective_score(&scored(0.73)), 0.73);
        assert_eq!(effective_score(&scored(-0.2)), 0.0);
        assert_eq!(effective_score(&Candidate::default()), 0.0);
    }

    #[test]
    fn test_effective_score_prefers_final_score() {
        let c = Candidate {
            score: Some(0.4),
            final_score: Some(0.9),
            ..Default::default()
        };
        assert_eq!(effective_score(&c), 0.9);
    }

    #[test]
    fn test_band_boundaries() {
        assert_eq!(Band::classify(0.8), Band::Excellent);
        assert_eq!(Band::classify(0.79), Band::Good);
        assert_eq!(Band::classify(0.6), Band::Good);
        assert_eq!(Band::classify(0.59), Band::Fair);
        assert_eq!(Band::classify(0.4), Band::Fair);
        assert_eq!(Band::classify(0.39), Band::Poor);
    }

    #[test]
    fn test_location_filter_matches_city_else_country() {
        let c = Candidate {
            city: Some("New York".to_string()),
            country: Some("United States".to_string()),
            score: Some(0.5),
            ..Default::default()
        };
        let filter = FilterState {
            location: "new york".to_string(),
            ..Default::default()
        };
        assert!(filter.matches(&c));

        // City present, so country is not consulted.
        let filter = FilterState {
            location: "united".to_string(),
            ..Default::default()
        };
        assert!(!filter.matches(&c));
    }

    #[test]
    fn test_min_score_filter_is_inclusive() {
        let filter = FilterState {
            min_score: 0.6,
            ..Default::default()
        };
        assert!(filter.matches(&scored(0.6)));
        assert!(!filter.matches(&scored(0.59)));
    }

    #[test]
    fn test_max_rate_passes_rateless_by_default() {
        let rateless = scored(0.5);
        let filter = FilterState {
            max_rate: Some(1000.0),
            ..Default::default()
        };
        // No rate compares as 0, which is within any bound.
        assert!(filter.matches(&rateless));

        let strict = FilterState {
            max_rate: Some(1000.0),
            exclude_rateless: true,
            ..Default::default()
        };
        assert!(!strict.matches(&rateless));

        let priced = Candidate {
            monthly_rate: Some(2500.0),
            ..scored(0.5)
        };
        assert!(!filter.matches(&priced));
        let roomy = FilterState {
            max_rate: Some(2500.0),
            ..Default::default()
        };
        assert!(roomy.matches(&priced));
    }

    #[test]
    fn test_job_type_filter_requires_field() {
        let filter = FilterState {
            job_type: "freelance".to_string(),
            ..Default::default()
        };
        let tagged = Candidate {
            job_types: Some("Full-time, Freelance".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&tagged));
        // Records without the field fail an active job-type clause.
        assert!(!filter.matches(&Candidate::default()));
    }

    #[test]
    fn test_filtering_is_idempotent() {
        let candidates = vec![scored(0.9), scored(0.3), scored(0.7)];
        let filter = FilterState {
            min_score: 0.5,
            ..Default::default()
        };
        let once: Vec<bool> = candidates.iter().map(|c| filter.matches(c)).collect();
        let twice: Vec<bool> = candidates
            .iter()
            .filter(|c| filter.matches(c))
            .map(|c| filter.matches(c))
            .collect();
        assert_eq!(once, vec![true, false, true]);
        assert!(twice.iter().all(|m| *m));
        assert_eq!(twice.len(), 2);
    }

    #[test]
    fn test_sort_score_descending() {
        let candidates = vec![scored(0.9), scored(0.3), scored(0.6)];
        let view = build_view(&candidates, &FilterState::default(), SortSpec::default());
        let scores: Vec<f64> = view
            .rows()
            .iter()
            .map(|row| effective_score(row.candidate))
            .collect();
        assert_eq!(scores, vec![0.9, 0.6, 0.3]);
        let ranks: Vec<usize> = view.rows().iter().map(|row| row.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_sort_ties_keep_input_order() {
        let mut a = scored(0.5);
        a.first_name = Some("First".to_string());
        let mut b = scored(0.5);
        b.first_name = Some("Second".to_string());
        let candidates = vec![a, b];
        let view = build_view(&candidates, &FilterState::default(), SortSpec::default());
        let names: Vec<String> = view
            .rows()
            .iter()
            .map(|row| row.candidate.full_name())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_sort_by_name_ascending() {
        let mut a = scored(0.1);
        a.first_name = Some("Zoe".to_string());
        let mut b = scored(0.9);
        b.first_name = Some("Ada".to_string());
        let candidates = vec![a, b];
        let view = build_view(
            &candidates,
            &FilterState::default(),
            SortSpec {
                key: SortKey::Name,
                order: SortOrder::Asc,
            },
        );
        let names: Vec<String> = view
            .rows()
            .iter()
            .map(|row| row.candidate.full_name())
            .collect();
        assert_eq!(names, vec!["Ada", "Zoe"]);
    }

    #[test]
    fn test_summary_over_full_set_ignores_filters() {
        let candidates = vec![scored(0.9), scored(0.7), scored(0.5), scored(0.2)];
        let summary = summarize(&candidates).unwrap();
        assert_eq!(summary.total_matches, 4);
        assert_eq!(summary.excellent, 1);
        assert_eq!(summary.good, 1);
        assert_eq!(summary.fair, 1);
        assert_eq!(summary.poor, 1);
        assert!((summary.average_score - 0.575).abs() < 1e-9);

        // Filters change the view, not the summary.
        let filter = FilterState {
            min_score: 0.8,
            ..Default::default()
        };
        let view = build_view(&candidates, &filter, SortSpec::default());
        assert_eq!(view.rows().len(), 1);
        assert_eq!(summarize(&candidates).unwrap(), summary);
    }

    #[test]
    fn test_empty_and_filtered_out_states_are_distinct() {
        let view = build_view(&[], &FilterState::default(), SortSpec::default());
        assert!(matches!(view, ResultsView::NoRecommendations));

        let candidates = vec![scored(0.3)];
        let filter = FilterState {
            min_score: 0.9,
            ..Default::default()
        };
        let view = build_view(&candidates, &filter, SortSpec::default());
        assert!(matches!(view, ResultsView::NoFilterMatches));
    }

    #[test]
    fn test_summarize_empty_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_sort_key_cycle_covers_all_keys() {
        let mut key = SortKey::Score;
        let mut seen = Vec::new();
        for _ in 0..4 {
            seen.push(key);
            key = key.cycle();
        }
        assert_eq!(key, SortKey::Score);
        assert_eq!(
            seen,
            vec![SortKey::Score, SortKey::Rate, SortKey::Views, SortKey::Name]
        );
    }
}
