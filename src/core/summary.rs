use crate::models::{AnimalRecord, CohortOverview, Group, GroupMember, GroupSummary, Sex};
use std::collections::BTreeMap;

/// Per-group counts: total, sexes, and an age → sex histogram
///
/// Sexes other than male/female count toward the total only.
pub fn summarize_groups<T: GroupMember>(groups: &[Group<T>]) -> Vec<GroupSummary> {
    groups.iter().map(summarize_group).collect()
}

pub fn summarize_group<T: GroupMember>(group: &Group<T>) -> GroupSummary {
    let mut summary = GroupSummary {
        name: group.name.clone(),
        total: 0,
        males: 0,
        females: 0,
        age_histogram: BTreeMap::new(),
    };

    for animal in group.members.iter().flat_map(GroupMember::animals) {
        summary.total += 1;
        let bucket = summary.age_histogram.entry(animal.age_weeks).or_default();
        match animal.sex {
            Sex::Male => {
                summary.males += 1;
                bucket.males += 1;
            }
            Sex::Female => {
                summary.females += 1;
                bucket.females += 1;
            }
            Sex::Other(_) => {}
        }
    }

    summary
}

/// Cohort-wide counts by genotype and by sex label
pub fn overview(records: &[AnimalRecord]) -> CohortOverview {
    let mut by_genotype = BTreeMap::new();
    let mut by_sex = BTreeMap::new();
    for record in records {
        *by_genotype.entry(record.genotype.clone()).or_insert(0) += 1;
        *by_sex.entry(record.sex.to_string()).or_insert(0) += 1;
    }
    CohortOverview {
        total_animals: records.len(),
        by_genotype,
        by_sex,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Pair, SexCounts};

    #[test]
    fn test_summarize_animals() {
        let mut group = Group::new("G1");
        group.members = vec![
            AnimalRecord::new("A", Sex::Male, "WT", 10),
            AnimalRecord::new("B", Sex::Female, "WT", 10),
            AnimalRecord::new("C", Sex::parse(" FEMALE "), "WT", 12),
            AnimalRecord::new("D", Sex::parse("unknown"), "WT", 12),
        ];

        let summary = summarize_group(&group);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.males, 1);
        assert_eq!(summary.females, 2);
        assert_eq!(summary.age_histogram[&10], SexCounts { males: 1, females: 1 });
        // The unknown animal still opens its age bucket
        assert_eq!(summary.age_histogram[&12], SexCounts { males: 0, females: 1 });
    }

    #[test]
    fn test_pairs_count_both_animals() {
        let mut group = Group::new("Pairs");
        group.members = vec![Pair::new(
            AnimalRecord::new("A", Sex::Male, "WT", 10),
            AnimalRecord::new("B", Sex::Male, "KO", 11),
        )];

        let summaries = summarize_groups(&[group]);
        assert_eq!(summaries[0].total, 2);
        assert_eq!(summaries[0].males, 2);
        assert_eq!(summaries[0].age_histogram.len(), 2);
    }

    #[test]
    fn test_overview() {
        let records = vec![
            AnimalRecord::new("A", Sex::Male, "WT", 10),
            AnimalRecord::new("B", Sex::Female, "KO", 10),
            AnimalRecord::new("C", Sex::Female, "KO", 10),
        ];
        let overview = overview(&records);
        assert_eq!(overview.total_animals, 3);
        assert_eq!(overview.by_genotype["KO"], 2);
        assert_eq!(overview.by_sex["Female"], 2);
    }
}
