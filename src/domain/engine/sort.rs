use std::borrow::Borrow;
use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};
use tracing::warn;

use crate::domain::engine::value::parse_float;
use crate::domain::entities::dataset::{as_record, cell, Record};
use crate::domain::entities::view::{SortDirection, SortSpec};

/// Returns `rows` ordered by `spec`; the input slice is left untouched.
///
/// With no sort column the rows come back in their original order. Ties keep
/// their original relative order in both directions.
pub fn sort_rows<'a, R: Borrow<Record>>(rows: &'a [R], spec: &SortSpec) -> Vec<&'a Record> {
    let sorted: Vec<&Record> = rows.iter().map(as_record).collect();
    let Some(column) = spec.column.as_deref() else {
        return sorted;
    };

    let keys: Vec<SortKey> = sorted.iter().map(|row| SortKey::of(row, column)).collect();
    let collation = TextCollation::root();
    let mut order: Vec<usize> = (0..sorted.len()).collect();
    merge_sort_by(&mut order, |&a, &b| {
        let ordering = collation.compare_keys(&keys[a], &keys[b]);
        match spec.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });

    order.into_iter().map(|idx| sorted[idx]).collect()
}

#[derive(Debug, Clone, PartialEq)]
struct SortKey {
    text: String,
    number: Option<f64>,
}

impl SortKey {
    fn of(row: &Record, column: &str) -> Self {
        let text = cell(row, column).to_display_string();
        Self {
            number: parse_float(&text),
            text: text.to_lowercase(),
        }
    }
}

struct TextCollation {
    collator: Option<Collator>,
}

impl TextCollation {
    fn root() -> Self {
        let collator = match Collator::try_new(&Default::default(), CollatorOptions::new()) {
            Ok(collator) => Some(collator),
            Err(err) => {
                warn!(%err, "root collation unavailable, comparing code points");
                None
            }
        };
        Self { collator }
    }

    /// Numbers compare numerically when both sides parse; anything else falls
    /// back to the collated lower-cased text.
    fn compare_keys(&self, a: &SortKey, b: &SortKey) -> Ordering {
        match (a.number, b.number) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => self.compare_text(&a.text, &b.text),
        }
    }

    fn compare_text(&self, a: &str, b: &str) -> Ordering {
        match &self.collator {
            Some(collator) => collator.compare(a, b),
            None => a.cmp(b),
        }
    }
}

// Mixed numeric/text keys can form cycles, so this must tolerate a comparator
// that is not a total order and still return a permutation.
fn merge_sort_by<T: Copy, F>(items: &mut [T], mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let mut scratch = items.to_vec();
    merge_sort_into(items, &mut scratch, &mut compare);
}

fn merge_sort_into<T: Copy, F>(items: &mut [T], scratch: &mut [T], compare: &mut F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len <= 1 {
        return;
    }
    let mid = len / 2;
    {
        let (left, right) = items.split_at_mut(mid);
        let (left_scratch, right_scratch) = scratch.split_at_mut(mid);
        merge_sort_into(left, left_scratch, compare);
        merge_sort_into(right, right_scratch, compare);
    }

    scratch[..len].copy_from_slice(items);
    let (left, right) = scratch[..len].split_at(mid);
    let (mut i, mut j) = (0, 0);
    for slot in items.iter_mut() {
        let take_left = match (left.get(i), right.get(j)) {
            (Some(l), Some(r)) => compare(r, l) != Ordering::Less,
            (Some(_), None) => true,
            _ => false,
        };
        if take_left {
            *slot = left[i];
            i += 1;
        } else {
            *slot = right[j];
            j += 1;
        }
    }
}
