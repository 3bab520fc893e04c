use crate::core::error::CohortError;
use crate::core::splitter::round_robin;
use crate::models::{AnimalRecord, DistributionCounts, DistributionResult};

/// Stable sort by (sex, age). Equal keys keep their normalized row order.
pub fn sort_by_sex_and_age(records: &mut [AnimalRecord]) {
    records.sort_by(|a, b| a.sex.cmp(&b.sex).then_with(|| a.age_weeks.cmp(&b.age_weeks)));
}

/// Spread a single-genotype cohort evenly over the named groups
///
/// Records are sorted by (sex, age) and dealt round-robin, so group sizes
/// differ by at most one and each sex/age band is spread across groups.
pub fn distribute<S: AsRef<str>>(
    records: &[AnimalRecord],
    group_names: &[S],
) -> Result<DistributionResult, CohortError> {
    let mut sorted = records.to_vec();
    sort_by_sex_and_age(&mut sorted);

    let total = sorted.len();
    let groups = round_robin(sorted, group_names)?;

    tracing::info!(
        animals = total,
        groups = groups.len(),
        "Animals distributed among groups"
    );

    Ok(DistributionResult {
        groups,
        counts: DistributionCounts { total },
    })
}
