//! Tolerance-based clustering of scalar keys.
//!
//! Groups objects whose key values chain within a tolerance. Clusters
//! are formed over the sorted unique values, so the lower-coordinate
//! group wins deterministically when two groups sit within tolerance of
//! each other.

use std::collections::HashMap;

use itertools::Itertools;

use crate::geometry::{key_f64, KeyF64};

/// Cluster sorted values: consecutive values within `tolerance` chain
/// into one group.
pub(crate) fn cluster_list(mut xs: Vec<f64>, tolerance: f64) -> Vec<Vec<f64>> {
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    if tolerance == 0.0 || xs.len() < 2 {
        return xs.into_iter().map(|x| vec![x]).collect();
    }

    let mut groups: Vec<Vec<f64>> = Vec::new();
    let mut current = vec![xs[0]];
    let mut last = xs[0];
    for x in xs.into_iter().skip(1) {
        if x <= last + tolerance {
            current.push(x);
        } else {
            groups.push(std::mem::take(&mut current));
            current.push(x);
        }
        last = x;
    }
    groups.push(current);
    groups
}

/// Map each distinct value to the index of the cluster it falls in.
pub(crate) fn make_cluster_dict(values: Vec<f64>, tolerance: f64) -> HashMap<KeyF64, usize> {
    let mut unique = values;
    unique.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    unique.dedup();

    let mut dict = HashMap::new();
    for (idx, cluster) in cluster_list(unique, tolerance).into_iter().enumerate() {
        for val in cluster {
            dict.insert(key_f64(val), idx);
        }
    }
    dict
}

/// Cluster objects by a scalar key. Output groups are ordered by
/// ascending key; within a group the input order is preserved.
pub(crate) fn cluster_objects<T: Clone, F: Fn(&T) -> f64>(
    xs: &[T],
    key_fn: F,
    tolerance: f64,
) -> Vec<Vec<T>> {
    if xs.is_empty() {
        return Vec::new();
    }

    let values: Vec<f64> = xs.iter().map(&key_fn).collect();
    let dict = make_cluster_dict(values, tolerance);

    let mut tagged: Vec<(T, usize)> = xs
        .iter()
        .map(|x| {
            let id = dict.get(&key_f64(key_fn(x))).copied().unwrap_or(0);
            (x.clone(), id)
        })
        .collect();
    tagged.sort_by_key(|(_, id)| *id);

    tagged
        .into_iter()
        .chunk_by(|(_, id)| *id)
        .into_iter()
        .map(|(_, group)| group.map(|(item, _)| item).collect())
        .collect()
}
