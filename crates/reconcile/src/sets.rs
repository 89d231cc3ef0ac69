//! Set helpers for unordered string collections.

use std::collections::BTreeSet;

/// Whether two collections hold the same strings, ignoring order and
/// duplicates. A missing collection equals an empty one.
#[must_use]
pub fn is_set_equal<A, B>(a: Option<A>, b: Option<B>) -> bool
where
    A: IntoIterator,
    A::Item: AsRef<str>,
    B: IntoIterator,
    B::Item: AsRef<str>,
{
    to_set(a) == to_set(b)
}

fn to_set<I>(items: Option<I>) -> BTreeSet<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .flatten()
        .map(|s| s.as_ref().to_string())
        .collect()
}

/// Elements of `left` that are not in `right`.
#[must_use]
pub fn difference(left: &BTreeSet<String>, right: &BTreeSet<String>) -> BTreeSet<String> {
    left.difference(right).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_order_and_duplicates_ignored() {
        assert!(is_set_equal(Some(&["a", "b", "a"][..]), Some(&["b", "a"][..])));
        assert!(!is_set_equal(Some(&["a"][..]), Some(&["a", "b"][..])));
    }

    #[test]
    fn test_missing_equals_empty() {
        let none: Option<&[String]> = None;
        let empty: &[String] = &[];
        assert!(is_set_equal(none, none));
        assert!(is_set_equal(none, Some(empty)));
        assert!(!is_set_equal(none, Some(["x"])));
    }

    #[test]
    fn test_btree_sets() {
        let a = set(&["fsh_manage", "search"]);
        let b = set(&["search", "fsh_manage"]);
        assert!(is_set_equal(Some(&a), Some(&b)));
        assert!(!is_set_equal(Some(&a), None::<&BTreeSet<String>>));
    }

    #[test]
    fn test_difference() {
        let old = set(&["1.1.1.1/32", "1.1.1.2/32"]);
        let new = set(&["1.1.1.2/32", "1.1.1.3/32"]);
        assert_eq!(difference(&new, &old), set(&["1.1.1.3/32"]));
        assert_eq!(difference(&old, &new), set(&["1.1.1.1/32"]));
        assert!(difference(&old, &old).is_empty());
    }
}
