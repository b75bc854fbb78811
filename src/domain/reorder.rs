//! Moving a single element within an ordered list.
//!
//! These helpers are used identically for topics, subtopics and questions.

use std::{collections::HashSet, hash::Hash};

/// Returns a copy of `items` with the element at `from` moved to position
/// `to`.
///
/// This is a move, not a swap: every other element keeps its relative order.
/// The input is left untouched.
///
/// Returns `None` if either index is out of range.
#[must_use]
pub fn reorder<T: Clone>(items: &[T], from: usize, to: usize) -> Option<Vec<T>> {
    if from >= items.len() || to >= items.len() {
        return None;
    }

    let mut reordered = items.to_vec();
    let moved = reordered.remove(from);
    reordered.insert(to, moved);
    Some(reordered)
}

/// The index a dragged element ends up at when a drag library reports the
/// drop position as "insert before `to`", measured before the element is
/// removed from its old slot.
#[must_use]
pub const fn drop_index(from: usize, to: usize) -> usize {
    if from == to {
        from
    } else if to > from {
        to - 1
    } else {
        to
    }
}

/// Checks that `proposed` holds exactly the elements of `current` (compared
/// by `key`), each exactly once, in any order.
#[must_use]
pub fn is_permutation<T, K, F>(current: &[T], proposed: &[T], key: F) -> bool
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    if current.len() != proposed.len() {
        return false;
    }

    let expected: HashSet<K> = current.iter().map(&key).collect();
    let mut seen = HashSet::with_capacity(proposed.len());
    proposed.iter().all(|item| {
        let k = key(item);
        expected.contains(&k) && seen.insert(k)
    })
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    #[test]
    fn moves_first_to_last() {
        let topics = ["A", "B", "C"];
        assert_eq!(reorder(&topics, 0, 2).unwrap(), vec!["B", "C", "A"]);
    }

    #[test_case(0, 0, &[1, 2, 3, 4]; "no-op")]
    #[test_case(3, 0, &[4, 1, 2, 3]; "last to first")]
    #[test_case(1, 2, &[1, 3, 2, 4]; "adjacent forward")]
    #[test_case(2, 1, &[1, 3, 2, 4]; "adjacent backward")]
    #[test_case(0, 3, &[2, 3, 4, 1]; "first to last")]
    fn moves_single_element(from: usize, to: usize, expected: &[i32]) {
        assert_eq!(reorder(&[1, 2, 3, 4], from, to).unwrap(), expected);
    }

    #[test]
    fn preserves_length_multiset_and_relative_order() {
        let items: Vec<u32> = (0..7).collect();
        for from in 0..items.len() {
            for to in 0..items.len() {
                let moved = reorder(&items, from, to).unwrap();
                assert_eq!(moved.len(), items.len());
                assert_eq!(moved[to], items[from]);

                let mut sorted = moved.clone();
                sorted.sort_unstable();
                assert_eq!(sorted, items);

                let without_moved = |list: &[u32]| -> Vec<u32> {
                    list.iter().copied().filter(|&x| x != items[from]).collect()
                };
                assert_eq!(without_moved(&moved), without_moved(&items));
            }
        }
    }

    #[test]
    fn leaves_input_untouched() {
        let items = vec!["A".to_string(), "B".to_string(), "C".to_string()];
        let before = items.clone();
        let _ = reorder(&items, 2, 0);
        assert_eq!(items, before);
    }

    #[test_case(3, 0; "source out of range")]
    #[test_case(0, 3; "target out of range")]
    fn rejects_out_of_range(from: usize, to: usize) {
        assert!(reorder(&["A", "B", "C"], from, to).is_none());
    }

    #[test]
    fn empty_list_has_no_valid_move() {
        let empty: [u8; 0] = [];
        assert!(reorder(&empty, 0, 0).is_none());
    }

    #[test_case(2, 2, 2; "same index")]
    #[test_case(1, 4, 3; "target after source")]
    #[test_case(4, 1, 1; "target before source")]
    fn computes_drop_index(from: usize, to: usize, expected: usize) {
        assert_eq!(drop_index(from, to), expected);
    }

    #[test]
    fn permutation_check() {
        let current = ["a", "b", "c"];
        assert!(is_permutation(&current, &["c", "a", "b"], |s| *s));
        assert!(!is_permutation(&current, &["a", "b"], |s| *s));
        assert!(!is_permutation(&current, &["a", "a", "b"], |s| *s));
        assert!(!is_permutation(&current, &["a", "b", "d"], |s| *s));
    }
}
