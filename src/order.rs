//! Sibling ordering.
//!
//! Every sibling group is sorted independently, parents before children, so
//! a node's place among its siblings never depends on how its own children
//! end up ordered.
//!
//! ## Default comparison
//!
//! Given each item's resolved sort weight and earliest timestamp (history
//! creation time, else local creation time):
//!
//! - **Both weighted**: ascending weight, ties broken by ascending time.
//! - **One weighted**: the weight acts as a target slot. The weighted item is
//!   compared against the other item's original position index; if the two
//!   are equal the weighted item goes first, otherwise the smaller number
//!   goes first.
//! - **Neither weighted**: ascending time (oldest first).
//!
//! The one-weighted rule is not transitive for every input, so the sort here
//! is a plain stable merge sort that tolerates inconsistent comparisons
//! instead of `slice::sort_by`, which may panic on them.
//!
//! ## Caller-supplied comparison
//!
//! A [`CompareFn`] replaces the default entirely. It receives both items and
//! the configured front-matter prefix. Its first error aborts the sort and
//! fails the build.

use crate::tree::Item;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrderError {
    #[error("Custom comparison failed for '{left}' vs '{right}': {message}")]
    Compare {
        left: String,
        right: String,
        message: String,
    },
}

/// Replacement for [`default_compare`].
pub type CompareFn = dyn Fn(&Item, &Item, Option<&str>) -> Result<Ordering, OrderError> + Sync;

/// The built-in comparison. See the module docs.
pub fn default_compare(a: &Item, b: &Item) -> Ordering {
    let time_a = a.timestamps.earliest();
    let time_b = b.timestamps.earliest();

    match (a.options.sort, b.options.sort) {
        (Some(sort_a), Some(sort_b)) => sort_a.total_cmp(&sort_b).then(time_a.cmp(&time_b)),
        (Some(sort_a), None) => slot_compare(sort_a, b.position_index),
        (None, Some(sort_b)) => slot_compare(sort_b, a.position_index).reverse(),
        (None, None) => time_a.cmp(&time_b),
    }
}

/// Weighted item against an unweighted sibling's original index.
fn slot_compare(weight: f64, other_index: usize) -> Ordering {
    let other = other_index as f64;
    if weight == other {
        Ordering::Less
    } else {
        weight.total_cmp(&other)
    }
}

/// Sort `items` and every descendant group in place.
pub fn sort_tree(
    items: &mut Vec<Item>,
    custom: Option<&CompareFn>,
    prefix: Option<&str>,
) -> Result<(), OrderError> {
    let taken = std::mem::take(items);
    *items = match custom {
        Some(compare) => stable_sort_by(taken, |a, b| compare(a, b, prefix))?,
        None => stable_sort_by(taken, |a, b| Ok(default_compare(a, b)))?,
    };

    for item in items.iter_mut() {
        if item.is_folder {
            sort_tree(&mut item.children, custom, prefix)?;
        }
    }
    Ok(())
}

/// Stable top-down merge sort with a fallible comparison.
///
/// Equal elements keep their input order. Inconsistent comparisons produce
/// some permutation of the input rather than a panic.
pub fn stable_sort_by<T, F>(items: Vec<T>, mut compare: F) -> Result<Vec<T>, OrderError>
where
    F: FnMut(&T, &T) -> Result<Ordering, OrderError>,
{
    merge_sort(items, &mut compare)
}

fn merge_sort<T, F>(mut items: Vec<T>, compare: &mut F) -> Result<Vec<T>, OrderError>
where
    F: FnMut(&T, &T) -> Result<Ordering, OrderError>,
{
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, compare)?;
    let right = merge_sort(right, compare)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();

    loop {
        let take_right = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => compare(r, l)? == Ordering::Less,
            (Some(_), None) => false,
            (None, Some(_)) => true,
            (None, None) => break,
        };
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    Ok(merged)
}
