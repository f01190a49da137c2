//! Step trace generation
//!
//! Each generator sorts `values` in place, permutes `ids` identically, and
//! returns the ordered steps a viewer needs to replay every comparison and
//! relocation the algorithm made.
//!
//! Replay relies on one invariant: before every step, the match named by
//! `ids[k]` sits in slot `k`. Swaps exchange two neighbouring slots, and merge
//! / partition steps relabel a contiguous range slot by slot.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entity::EntityId;
use crate::error::{Result, VisError};

/// One algorithm decision point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Matches in the algorithm's current scope
    pub highlighted: Vec<EntityId>,
    /// The one or two matches being compared (or the whole range for merges)
    pub compared: Vec<EntityId>,
    /// Whether the comparison exchanged the two compared matches
    #[serde(default)]
    pub swapped: bool,
    /// Range order after a merge or partition, slot-aligned with `compared`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merged: Option<Vec<EntityId>>,
}

impl Step {
    /// A pairwise comparison
    pub fn compare(highlighted: &[EntityId], a: EntityId, b: EntityId, swapped: bool) -> Self {
        Self {
            highlighted: highlighted.to_vec(),
            compared: vec![a, b],
            swapped,
            merged: None,
        }
    }

    /// Marker emitted when the algorithm enters a subrange
    pub fn enter(range: &[EntityId]) -> Self {
        Self {
            highlighted: range.to_vec(),
            compared: Vec::new(),
            swapped: false,
            merged: None,
        }
    }

    /// A range rewritten in one go (merge or partition)
    pub fn merge(before: &[EntityId], after: &[EntityId]) -> Self {
        Self {
            highlighted: before.to_vec(),
            compared: before.to_vec(),
            swapped: false,
            merged: Some(after.to_vec()),
        }
    }

    pub fn is_marker(&self) -> bool {
        self.compared.is_empty()
    }
}

/// Available sorting algorithms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortAlgorithm {
    #[default]
    Bubble,
    Insertion,
    Merge,
    Quick,
}

impl SortAlgorithm {
    pub const ALL: [SortAlgorithm; 4] = [
        SortAlgorithm::Bubble,
        SortAlgorithm::Insertion,
        SortAlgorithm::Merge,
        SortAlgorithm::Quick,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortAlgorithm::Bubble => "Bubble Sort",
            SortAlgorithm::Insertion => "Insertion Sort",
            SortAlgorithm::Merge => "Merge Sort",
            SortAlgorithm::Quick => "Quick Sort",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().trim_end_matches(" sort") {
            "bubble" => Some(SortAlgorithm::Bubble),
            "insertion" => Some(SortAlgorithm::Insertion),
            "merge" => Some(SortAlgorithm::Merge),
            "quick" => Some(SortAlgorithm::Quick),
            _ => None,
        }
    }

    /// Sort `values`/`ids` in place and return the trace
    pub fn generate<T: PartialOrd + Copy>(
        &self,
        values: &mut [T],
        ids: &mut [EntityId],
    ) -> Result<Vec<Step>> {
        match self {
            SortAlgorithm::Bubble => bubble_sort(values, ids),
            SortAlgorithm::Insertion => insertion_sort(values, ids),
            SortAlgorithm::Merge => merge_sort(values, ids),
            SortAlgorithm::Quick => quick_sort(values, ids),
        }
    }
}

/// Reject mismatched lengths and duplicate identifiers before touching anything
fn validate<T>(values: &[T], ids: &[EntityId]) -> Result<()> {
    if values.len() != ids.len() {
        return Err(VisError::invalid_input(format!(
            "{} values but {} ids",
            values.len(),
            ids.len()
        )));
    }
    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if !seen.insert(*id) {
            return Err(VisError::invalid_input(format!("duplicate id {id}")));
        }
    }
    Ok(())
}

/// Bubble sort with early exit after a pass without swaps
pub fn bubble_sort<T: PartialOrd + Copy>(values: &mut [T], ids: &mut [EntityId]) -> Result<Vec<Step>> {
    validate(values, ids)?;
    let n = values.len();
    let mut steps = Vec::new();

    for i in 0..n.saturating_sub(1) {
        let unsorted = n - 1 - i;
        let mut swapped_any = false;
        for j in 0..unsorted {
            // Strict: equal neighbours keep their order
            let swapped = values[j] > values[j + 1];
            steps.push(Step::compare(&ids[..unsorted], ids[j], ids[j + 1], swapped));
            if swapped {
                values.swap(j, j + 1);
                ids.swap(j, j + 1);
                swapped_any = true;
            }
        }
        if !swapped_any {
            break;
        }
    }

    log::debug!("bubble sort: {} matches, {} steps", n, steps.len());
    Ok(steps)
}

/// Insertion sort; every backward comparison of the key is one step
pub fn insertion_sort<T: PartialOrd + Copy>(
    values: &mut [T],
    ids: &mut [EntityId],
) -> Result<Vec<Step>> {
    validate(values, ids)?;
    let n = values.len();
    let mut steps = Vec::new();

    for i in 1..n {
        let key = values[i];
        let key_id = ids[i];
        // The key walks left one slot per shift, so ids[..=i] always matches
        // what is on screen
        let mut slot = i;
        while slot > 0 {
            let j = slot - 1;
            if values[j] <= key {
                steps.push(Step::compare(&ids[..=i], key_id, ids[j], false));
                break;
            }
            steps.push(Step::compare(&ids[..=i], key_id, ids[j], true));
            values.swap(j, slot);
            ids.swap(j, slot);
            slot = j;
        }
    }

    log::debug!("insertion sort: {} matches, {} steps", n, steps.len());
    Ok(steps)
}

/// Top-down merge sort over the whole slice
pub fn merge_sort<T: PartialOrd + Copy>(values: &mut [T], ids: &mut [EntityId]) -> Result<Vec<Step>> {
    validate(values, ids)?;
    let mut steps = Vec::new();
    if values.len() > 1 {
        merge_sort_range(values, ids, &mut steps, 0, values.len() - 1);
    }
    log::debug!("merge sort: {} matches, {} steps", values.len(), steps.len());
    Ok(steps)
}

/// Sort the inclusive range `[begin, end]`
fn merge_sort_range<T: PartialOrd + Copy>(
    values: &mut [T],
    ids: &mut [EntityId],
    steps: &mut Vec<Step>,
    begin: usize,
    end: usize,
) {
    if begin >= end {
        return;
    }
    let mid = begin + (end - begin) / 2;
    steps.push(Step::enter(&ids[begin..=mid]));
    merge_sort_range(values, ids, steps, begin, mid);
    steps.push(Step::enter(&ids[mid + 1..=end]));
    merge_sort_range(values, ids, steps, mid + 1, end);
    merge(values, ids, steps, begin, mid, end);
}

/// Merge the sorted runs `[left, mid]` and `(mid, right]`
fn merge<T: PartialOrd + Copy>(
    values: &mut [T],
    ids: &mut [EntityId],
    steps: &mut Vec<Step>,
    left: usize,
    mid: usize,
    right: usize,
) {
    let before = ids[left..=right].to_vec();
    let run_one: Vec<(T, EntityId)> = values[left..=mid]
        .iter()
        .copied()
        .zip(ids[left..=mid].iter().copied())
        .collect();
    let run_two: Vec<(T, EntityId)> = values[mid + 1..=right]
        .iter()
        .copied()
        .zip(ids[mid + 1..=right].iter().copied())
        .collect();

    let (mut a, mut b) = (0, 0);
    for k in left..=right {
        // Ties go to the left run
        let take_left = match (run_one.get(a), run_two.get(b)) {
            (Some(x), Some(y)) => x.0 <= y.0,
            (Some(_), None) => true,
            _ => false,
        };
        let (value, id) = if take_left {
            a += 1;
            run_one[a - 1]
        } else {
            b += 1;
            run_two[b - 1]
        };
        values[k] = value;
        ids[k] = id;
    }

    steps.push(Step::merge(&before, &ids[left..=right]));
}

/// Quick sort with Lomuto partitioning (pivot = last element of the range)
pub fn quick_sort<T: PartialOrd + Copy>(values: &mut [T], ids: &mut [EntityId]) -> Result<Vec<Step>> {
    validate(values, ids)?;
    let mut steps = Vec::new();
    if values.len() > 1 {
        quick_sort_range(values, ids, &mut steps, 0, values.len() - 1);
    }
    log::debug!("quick sort: {} matches, {} steps", values.len(), steps.len());
    Ok(steps)
}

fn quick_sort_range<T: PartialOrd + Copy>(
    values: &mut [T],
    ids: &mut [EntityId],
    steps: &mut Vec<Step>,
    low: usize,
    high: usize,
) {
    if low >= high {
        return;
    }
    let pivot = partition(values, ids, steps, low, high);
    steps.push(Step::enter(&ids[low..pivot]));
    if pivot > low {
        quick_sort_range(values, ids, steps, low, pivot - 1);
    }
    steps.push(Step::enter(&ids[pivot + 1..=high]));
    quick_sort_range(values, ids, steps, pivot + 1, high);
}

/// Partition `[start, end]` around `values[end]`; returns the pivot's final index
fn partition<T: PartialOrd + Copy>(
    values: &mut [T],
    ids: &mut [EntityId],
    steps: &mut Vec<Step>,
    start: usize,
    end: usize,
) -> usize {
    let before = ids[start..=end].to_vec();
    let pivot = values[end];
    // Next slot for an element smaller than the pivot
    let mut store = start;
    for i in start..end {
        if values[i] < pivot {
            values.swap(store, i);
            ids.swap(store, i);
            store += 1;
        }
    }
    values.swap(store, end);
    ids.swap(store, end);

    steps.push(Step::merge(&before, &ids[start..=end]));
    store
}
