use crate::core::error::CohortError;
use crate::models::{Group, Pair};
use std::collections::HashSet;

/// Check a configured list of group names
///
/// The list must be non-empty, every name non-blank and unique after
/// trimming.
pub fn validate_group_names<S: AsRef<str>>(names: &[S]) -> Result<(), CohortError> {
    if names.is_empty() {
        return Err(CohortError::NoGroups);
    }

    let mut seen = HashSet::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let name = name.as_ref().trim();
        if name.is_empty() {
            return Err(CohortError::EmptyGroupNames { index });
        }
        if !seen.insert(name) {
            return Err(CohortError::DuplicateGroupName {
                name: name.to_string(),
            });
        }
    }
    Ok(())
}

/// Deal items into named groups: item `i` goes to group `i mod N`
pub fn round_robin<T, S: AsRef<str>>(
    items: impl IntoIterator<Item = T>,
    names: &[S],
) -> Result<Vec<Group<T>>, CohortError> {
    validate_group_names(names)?;

    let mut groups: Vec<Group<T>> = names.iter().map(|n| Group::new(n.as_ref().trim())).collect();
    let count = groups.len();
    for (i, item) in items.into_iter().enumerate() {
        groups
            .get_mut(i % count)
            .ok_or_else(|| CohortError::Internal(format!("group index {} out of range", i % count)))?
            .members
            .push(item);
    }
    Ok(groups)
}

/// Split pairs into named groups in the order the pairs were formed
pub fn split_into_groups<S: AsRef<str>>(pairs: &[Pair], names: &[S]) -> Result<Vec<Group<Pair>>, CohortError> {
    let groups = round_robin(pairs.iter().cloned(), names)?;
    tracing::info!(
        pairs = pairs.len(),
        groups = groups.len(),
        "Paired animals split into groups"
    );
    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimalRecord, Sex};

    fn pair(n: u32) -> Pair {
        Pair::new(
            AnimalRecord::new(format!("A{}", n), Sex::Male, "WT", n),
            AnimalRecord::new(format!("B{}", n), Sex::Male, "KO", n),
        )
    }

    #[test]
    fn test_split_round_robin() {
        let pairs: Vec<Pair> = (0..5).map(pair).collect();
        let groups = split_into_groups(&pairs, &["Control", "Treated"]).unwrap();

        assert_eq!(groups[0].name, "Control");
        assert_eq!(groups[0].len(), 3);
        assert_eq!(groups[1].len(), 2);
        assert_eq!(groups[0].members[1].first.id, "A2");
        assert_eq!(groups[1].members[0].first.id, "A1");
    }

    #[test]
    fn test_no_groups() {
        let names: [&str; 0] = [];
        assert_eq!(split_into_groups(&[pair(1)], &names).unwrap_err(), CohortError::NoGroups);
    }

    #[test]
    fn test_blank_group_name() {
        let err = split_into_groups(&[pair(1)], &["A", "  "]).unwrap_err();
        assert_eq!(err, CohortError::EmptyGroupNames { index: 1 });
    }

    #[test]
    fn test_duplicate_group_name() {
        let err = validate_group_names(&["A", " A"]).unwrap_err();
        assert_eq!(err, CohortError::DuplicateGroupName { name: "A".to_string() });
    }

    #[test]
    fn test_more_groups_than_items_leaves_empty_groups() {
        let groups = round_robin(vec![1, 2], &["a", "b", "c"]).unwrap();
        assert_eq!(groups.len(), 3);
        assert!(groups[2].is_empty());
    }
}
