use crate::models::{AnimalRecord, MatchCounts, MatchResult, Pair};

/// Pairing state of one record during a matcher pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairState {
    Unmatched,
    Matched,
}

/// Greedy same-sex pair matcher
///
/// # Algorithm
/// 1. Sort records by (sex, age); ties keep normalized row order
/// 2. Walk the sorted list, skipping records already matched
/// 3. Candidates are unmatched records of the same sex, a different id,
///    and an age gap within the leeway
/// 4. With cross-genotype preference on, candidates of another genotype
///    win whenever at least one exists
/// 5. The smallest age gap wins, ties go to the earliest sorted position
///
/// Each pass is O(n²), fine for cohorts of a few hundred.
#[derive(Debug, Clone, Copy)]
pub struct PairMatcher {
    leeway_weeks: u32,
    prefer_cross_genotype: bool,
}

impl PairMatcher {
    pub fn new(leeway_weeks: u32, prefer_cross_genotype: bool) -> Self {
        Self {
            leeway_weeks,
            prefer_cross_genotype,
        }
    }

    /// Matcher configured from the genotype selection: cross-genotype
    /// pairs are preferred once more than one genotype is selected
    pub fn for_selection(leeway_weeks: u32, selected_genotypes: usize) -> Self {
        Self::new(leeway_weeks, selected_genotypes > 1)
    }

    pub fn leeway_weeks(&self) -> u32 {
        self.leeway_weeks
    }

    /// Pair up the records. `records` must be in normalized row order;
    /// unpaired animals are reported in that same order.
    pub fn match_records(&self, records: &[AnimalRecord]) -> MatchResult {
        // Stable sort of indices: equal (sex, age) keys keep row order
        let mut order: Vec<usize> = (0..records.len()).collect();
        order.sort_by(|&a, &b| {
            let (ra, rb) = (&records[a], &records[b]);
            ra.sex.cmp(&rb.sex).then_with(|| ra.age_weeks.cmp(&rb.age_weeks))
        });
        let sorted: Vec<&AnimalRecord> = order.iter().map(|&i| &records[i]).collect();

        let mut state = vec![PairState::Unmatched; sorted.len()];
        let mut pairs = Vec::new();

        for pivot in 0..sorted.len() {
            if state[pivot] == PairState::Matched {
                continue;
            }

            let Some(best) = self.best_candidate(&sorted, &state, pivot) else {
                continue;
            };

            state[pivot] = PairState::Matched;
            state[best] = PairState::Matched;

            tracing::debug!(
                first = %sorted[pivot].id,
                second = %sorted[best].id,
                "Paired animals"
            );
            pairs.push(Pair::new(sorted[pivot].clone(), sorted[best].clone()));
        }

        let mut matched = vec![false; records.len()];
        for (slot, &original) in order.iter().enumerate() {
            matched[original] = state[slot] == PairState::Matched;
        }
        let unpaired: Vec<AnimalRecord> = records
            .iter()
            .zip(matched)
            .filter(|(_, matched)| !matched)
            .map(|(record, _)| record.clone())
            .collect();

        tracing::info!(
            pairs = pairs.len(),
            unpaired = unpaired.len(),
            leeway_weeks = self.leeway_weeks,
            "Pairing pass complete"
        );

        let counts = MatchCounts {
            pair_count: pairs.len(),
            unpaired_count: unpaired.len(),
        };
        MatchResult { pairs, unpaired, counts }
    }

    fn best_candidate(&self, sorted: &[&AnimalRecord], state: &[PairState], pivot: usize) -> Option<usize> {
        let animal = sorted[pivot];

        let candidates: Vec<usize> = (0..sorted.len())
            .filter(|&i| {
                let other = sorted[i];
                i != pivot
                    && state[i] == PairState::Unmatched
                    && other.sex == animal.sex
                    && other.id != animal.id
                    && other.age_gap(animal) <= self.leeway_weeks
            })
            .collect();

        let pool = if self.prefer_cross_genotype {
            let cross: Vec<usize> = candidates
                .iter()
                .copied()
                .filter(|&i| sorted[i].genotype != animal.genotype)
                .collect();
            if cross.is_empty() {
                candidates
            } else {
                cross
            }
        } else {
            candidates
        };

        // min_by_key returns the first minimum, i.e. the earliest sorted slot
        pool.into_iter().min_by_key(|&i| sorted[i].age_gap(animal))
    }
}
