use std::collections::BTreeMap;

use crate::models::ClosedEnum;

/// Partitions `records` by a closed-enum key.
///
/// Every value of `K::ALL` is present in the result, with an empty list when
/// nothing matched, and each group keeps the input order.
pub fn group_by<'a, T, K, F>(records: &'a [T], key: F) -> BTreeMap<K, Vec<&'a T>>
where
    K: ClosedEnum,
    F: Fn(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<&'a T>> =
        K::ALL.iter().map(|value| (*value, Vec::new())).collect();

    for record in records {
        groups.entry(key(record)).or_default().push(record);
    }

    groups
}

pub fn count_where<T, P>(records: &[T], predicate: P) -> usize
where
    P: Fn(&T) -> bool,
{
    records.iter().filter(|record| predicate(*record)).count()
}

/// Number of records per enum value, zero counts included.
pub fn count_by<T, K, F>(records: &[T], key: F) -> BTreeMap<K, usize>
where
    K: ClosedEnum,
    F: Fn(&T) -> K,
{
    group_by(records, key)
        .into_iter()
        .map(|(value, members)| (value, members.len()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::tests::sample_log;
    use crate::models::{Severity, SyncLog, SyncSource, SyncStatus};

    fn logs() -> Vec<SyncLog> {
        vec![
            sample_log("a", SyncSource::Coda, SyncStatus::Completed, "patients"),
            sample_log("b", SyncSource::Drchrono, SyncStatus::Failed, "patients"),
            sample_log("c", SyncSource::Coda, SyncStatus::Partial, "problems"),
            sample_log("d", SyncSource::Drchrono, SyncStatus::Completed, "allergies"),
        ]
    }

    #[test]
    fn groups_partition_without_loss_or_duplication() {
        let logs = logs();
        let groups = group_by(&logs, |log| log.source);

        let mut seen: Vec<&str> = groups
            .values()
            .flat_map(|members| members.iter().map(|log| log.id.as_str()))
            .collect();
        seen.sort_unstable();
        assert_eq!(seen, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_sections_are_present() {
        let logs = logs();
        let groups = group_by(&logs, |log| log.source);
        assert_eq!(groups.len(), SyncSource::ALL.len());
        assert!(groups[&SyncSource::Deepcura].is_empty());

        let empty: Vec<SyncLog> = Vec::new();
        let groups = group_by(&empty, |_| Severity::Low);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), Severity::ALL.to_vec());
    }

    #[test]
    fn groups_keep_input_order() {
        let logs = logs();
        let groups = group_by(&logs, |log| log.source);
        let drchrono: Vec<&str> = groups[&SyncSource::Drchrono]
            .iter()
            .map(|log| log.id.as_str())
            .collect();
        assert_eq!(drchrono, vec!["b", "d"]);
    }

    #[test]
    fn counts_cover_every_value() {
        let logs = logs();
        let counts = count_by(&logs, |log| log.status);
        assert_eq!(counts[&SyncStatus::Completed], 2);
        assert_eq!(counts[&SyncStatus::Running], 0);
        assert_eq!(counts.values().sum::<usize>(), logs.len());
        assert_eq!(count_where(&logs, |log| log.table_name == "patients"), 2);
    }

    #[test]
    fn repeated_grouping_is_identical() {
        let logs = logs();
        let first = group_by(&logs, |log| log.status);
        let second = group_by(&logs, |log| log.status);
        assert_eq!(first, second);
    }
}
