//! Enumeration of unordered directory pairs.
//!
//! Every root is compared against every other root exactly once. With `K`
//! roots this yields `K * (K - 1) / 2` pairs in the usual `i < j` order.

/// Index pairs `(i, j)` with `i < j < k`, in lexicographic order.
#[must_use]
pub fn pair_indices(k: usize) -> Vec<(usize, usize)> {
    let mut pairs = Vec::with_capacity(k.saturating_mul(k.saturating_sub(1)) / 2);
    for i in 0..k {
        for j in (i + 1)..k {
            pairs.push((i, j));
        }
    }
    pairs
}

/// All unordered pairs of `items`, in input order, with no self-pairs.
///
/// # Example
///
/// ```
/// use crossdupe::duplicates::generate_pairs;
///
/// let pairs = generate_pairs(&["a", "b", "c"]);
/// assert_eq!(pairs, vec![("a", "b"), ("a", "c"), ("b", "c")]);
/// ```
#[must_use]
pub fn generate_pairs<T: Clone>(items: &[T]) -> Vec<(T, T)> {
    pair_indices(items.len())
        .into_iter()
        .map(|(i, j)| (items[i].clone(), items[j].clone()))
        .collect()
}
