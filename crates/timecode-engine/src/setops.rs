//! Set operations over slices with a caller-supplied equality.
//!
//! Occurrence equality is not always `==` (reconciliation ignores a missing
//! start), so these take a predicate instead of requiring `Eq`/`Hash`. Every
//! operation is a pairwise scan, O(n·m); schedules hold tens to low hundreds
//! of occurrences. Results keep the order of `a`.

/// Elements of `a` that have an equal element in `b`.
pub fn intersection<T, F>(a: &[T], b: &[T], equal: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    a.iter()
        .filter(|x| b.iter().any(|y| equal(*x, y)))
        .cloned()
        .collect()
}

/// Elements of `a` that have no equal element in `b`.
pub fn difference<T, F>(a: &[T], b: &[T], equal: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    a.iter()
        .filter(|x| !b.iter().any(|y| equal(*x, y)))
        .cloned()
        .collect()
}

/// All of `a`, followed by the elements of `b` not already in `a`.
pub fn union<T, F>(a: &[T], b: &[T], equal: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut out = a.to_vec();
    out.extend(difference(b, a, equal));
    out
}

/// `items` with later duplicates removed.
pub fn distinct<T, F>(items: &[T], equal: F) -> Vec<T>
where
    T: Clone,
    F: Fn(&T, &T) -> bool,
{
    let mut out: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !out.iter().any(|kept| equal(kept, item)) {
            out.push(item.clone());
        }
    }
    out
}
