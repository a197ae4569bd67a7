//! Grouping resolved records into clusters of shared similarity keys.
//!
//! Two records belong to the same cluster when the matching service handed
//! both the identical key. Singletons are noise for a duplicate report, so
//! only groups of two or more members are emitted.

use serde::Serialize;

use crate::record::{Outcome, Resolution};

/// Two or more resolutions sharing one similarity key.
///
/// Members are in ascending batch order; clusters themselves come out in
/// ascending key order (byte order).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub key: String,
    pub members: Vec<Resolution>,
}

/// Group resolutions by identical similarity key.
///
/// Includes every resolution that carries a key, which covers lookups the
/// service answered with a non-success result code but a usable key.
///
/// # Algorithm
///
/// 1. Filter to keyed resolutions
/// 2. Sort by `(key, record.index)` so equal keys are adjacent and ties are
///    deterministic
/// 3. Walk the sorted run, flushing a group whenever the key changes
/// 4. Keep only groups with at least two members
///
/// One linear pass after the sort; re-running on the same input yields an
/// identical cluster sequence.
pub fn cluster(resolutions: &[Resolution]) -> Vec<Cluster> {
    cluster_where(resolutions, |r| r.key.is_some())
}

/// Like [`cluster`], but only full-success lookups participate. Keys returned
/// alongside a non-success result code are left out.
pub fn cluster_strict(resolutions: &[Resolution]) -> Vec<Cluster> {
    cluster_where(resolutions, |r| {
        r.outcome == Outcome::Success && r.key.is_some()
    })
}

fn cluster_where(resolutions: &[Resolution], keep: impl Fn(&Resolution) -> bool) -> Vec<Cluster> {
    let mut keyed: Vec<&Resolution> = resolutions.iter().filter(|&r| keep(r)).collect();
    keyed.sort_by(|a, b| {
        a.key
            .cmp(&b.key)
            .then_with(|| a.record.index.cmp(&b.record.index))
    });

    let mut clusters = Vec::new();
    let mut run: Vec<&Resolution> = Vec::new();

    for r in keyed {
        if run.last().is_some_and(|prev| prev.key != r.key) {
            flush(&mut run, &mut clusters);
        }
        run.push(r);
    }
    flush(&mut run, &mut clusters);

    clusters
}

fn flush(run: &mut Vec<&Resolution>, clusters: &mut Vec<Cluster>) {
    if run.len() >= 2 {
        clusters.push(Cluster {
            // Keyed resolutions only reach here, so the key is present.
            key: run[0].key.clone().unwrap_or_default(),
            members: run.iter().map(|r| (*r).clone()).collect(),
        });
    }
    run.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn keyed(index: usize, value: &str, key: &str) -> Resolution {
        Resolution::keyed(Record::new(index, value), key, Outcome::Success)
    }

    fn failed(index: usize, value: &str, outcome: Outcome) -> Resolution {
        Resolution::keyless(Record::new(index, value), outcome)
    }

    #[test]
    fn pair_of_variants_forms_one_cluster() {
        let rs = vec![
            keyed(0, "Acme Inc", "K1"),
            keyed(1, "ACME INC.", "K1"),
            keyed(2, "Staples", "K2"),
        ];
        let clusters = cluster(&rs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].key, "K1");
        let values: Vec<&str> = clusters[0]
            .members
            .iter()
            .map(|m| m.record.value.as_str())
            .collect();
        assert_eq!(values, vec!["Acme Inc", "ACME INC."]);
    }

    #[test]
    fn singletons_are_never_emitted() {
        let rs = vec![keyed(0, "Acme Inc", "K1"), keyed(1, "Staples", "K2")];
        assert!(cluster(&rs).is_empty());
    }

    #[test]
    fn three_way_cluster_keeps_input_order() {
        let rs = vec![
            keyed(2, "acme incorporated", "K9"),
            keyed(0, "Acme Inc", "K9"),
            keyed(1, "ACME INC.", "K9"),
        ];
        let clusters = cluster(&rs);
        assert_eq!(clusters.len(), 1);
        let indices: Vec<usize> = clusters[0].members.iter().map(|m| m.record.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn clusters_come_out_in_key_order() {
        let rs = vec![
            keyed(0, "z one", "ZZ"),
            keyed(1, "a one", "AA"),
            keyed(2, "z two", "ZZ"),
            keyed(3, "a two", "AA"),
            keyed(4, "m one", "MM"),
            keyed(5, "m two", "MM"),
        ];
        let clusters = cluster(&rs);
        let keys: Vec<&str> = clusters.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["AA", "MM", "ZZ"]);
    }

    #[test]
    fn keyless_resolutions_never_cluster() {
        let rs = vec![
            failed(0, "Bad Co", Outcome::TransportError),
            failed(1, "Worse Co", Outcome::DecodeError),
            failed(2, "Empty Co", Outcome::Empty),
        ];
        assert!(cluster(&rs).is_empty());
    }

    #[test]
    fn transport_failure_does_not_break_sibling_cluster() {
        let rs = vec![
            keyed(0, "Good Co", "K5"),
            failed(1, "Bad Co", Outcome::TransportError),
            keyed(2, "Good Co LLC", "K5"),
        ];
        let clusters = cluster(&rs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
    }

    #[test]
    fn non_success_code_key_clusters_by_default() {
        let rs = vec![
            keyed(0, "Acme Inc", "K1"),
            Resolution::keyed(Record::new(1, "Acme Ink"), "K1", Outcome::NonSuccessCode),
        ];
        let clusters = cluster(&rs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
    }

    #[test]
    fn strict_mode_drops_non_success_keys() {
        let rs = vec![
            keyed(0, "Acme Inc", "K1"),
            Resolution::keyed(Record::new(1, "Acme Ink"), "K1", Outcome::NonSuccessCode),
        ];
        assert!(cluster_strict(&rs).is_empty());

        let rs = vec![
            keyed(0, "Acme Inc", "K1"),
            keyed(1, "ACME INC.", "K1"),
            Resolution::keyed(Record::new(2, "Acme Ink"), "K1", Outcome::NonSuccessCode),
        ];
        let clusters = cluster_strict(&rs);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 2);
    }

    #[test]
    fn all_equal_key_pairs_land_in_the_same_cluster() {
        let rs = vec![
            keyed(0, "a", "K1"),
            keyed(1, "b", "K2"),
            keyed(2, "c", "K1"),
            keyed(3, "d", "K2"),
            keyed(4, "e", "K1"),
        ];
        let clusters = cluster(&rs);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].members.len(), 3); // K1
        assert_eq!(clusters[1].members.len(), 2); // K2
        for c in &clusters {
            assert!(c.members.iter().all(|m| m.key.as_deref() == Some(c.key.as_str())));
        }
    }

    #[test]
    fn clustering_is_idempotent() {
        let rs = vec![
            keyed(0, "Acme Inc", "K1"),
            keyed(1, "ACME INC.", "K1"),
            keyed(2, "Staples", "K2"),
            keyed(3, "Staples Inc", "K2"),
        ];
        let first = cluster(&rs);
        let second = cluster(&rs);
        assert_eq!(first, second);
    }

    #[test]
    fn empty_input_yields_no_clusters() {
        assert!(cluster(&[]).is_empty());
    }
}
